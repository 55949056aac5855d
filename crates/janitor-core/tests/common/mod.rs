//! Test doubles and common utilities for plugin construction contract tests
//!
//! The doubles record what the builders ask of them without touching any
//! network. `LogCapture` collects every tracing event emitted while a test's
//! scoped subscriber is installed.

#![allow(dead_code)]

use janitor_core::config::{ClientOptions, PluginConfig, ValidatedConfig};
use janitor_core::error::{Error, Result};
use janitor_core::traits::{
    AuthorityClients, ClientFactory, ComputeClient, DnsClient, PubsubClient,
    ResourceManagerClient, Session, SharedSession, TopicCreation,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// A captured log record
#[derive(Debug, Clone)]
pub struct Record {
    pub level: Level,
    pub message: String,
}

/// Layer collecting every event into a shared buffer
#[derive(Clone, Default)]
pub struct LogCapture {
    records: Arc<Mutex<Vec<Record>>>,
}

impl LogCapture {
    /// Install a capturing subscriber for the current thread
    pub fn install() -> (Self, tracing::subscriber::DefaultGuard) {
        let capture = Self::default();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    /// Records at error level
    pub fn errors(&self) -> Vec<Record> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.level == Level::ERROR)
            .cloned()
            .collect()
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.0 = value.to_string();
        }
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.records.lock().unwrap().push(Record {
            level: *event.metadata().level(),
            message: visitor.0,
        });
    }
}

/// Session that counts physical releases
#[derive(Debug)]
pub struct CountingSession {
    id: u64,
    closed: AtomicBool,
    releases: AtomicUsize,
}

impl CountingSession {
    pub fn new(id: u64) -> Arc<Self> {
        Arc::new(Self {
            id,
            closed: AtomicBool::new(false),
            releases: AtomicUsize::new(0),
        })
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Session for CountingSession {
    fn id(&self) -> u64 {
        self.id
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn close(&self) -> bool {
        if self.closed.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.releases.fetch_add(1, Ordering::SeqCst);
        true
    }
}

/// Pub/Sub double returning a scripted topic creation outcome
pub struct MockPubsubClient {
    outcome: TopicCreation,
    endpoint: String,
    emulated: bool,
    created: Mutex<Vec<String>>,
}

impl MockPubsubClient {
    pub fn created_topics(&self) -> Vec<String> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl PubsubClient for MockPubsubClient {
    async fn create_topic(&self, topic: &str) -> TopicCreation {
        self.created.lock().unwrap().push(topic.to_string());
        self.outcome.clone()
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn is_emulated(&self) -> bool {
        self.emulated
    }
}

pub struct MockDnsClient {
    project: String,
    base_url: String,
}

impl DnsClient for MockDnsClient {
    fn project(&self) -> &str {
        &self.project
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

pub struct MockCrmClient {
    session: SharedSession,
}

impl ResourceManagerClient for MockCrmClient {
    fn base_url(&self) -> &str {
        "https://crm.test/v1"
    }

    fn session(&self) -> &SharedSession {
        &self.session
    }
}

pub struct MockGceClient {
    session: SharedSession,
}

impl ComputeClient for MockGceClient {
    fn base_url(&self) -> &str {
        "https://gce.test/v1"
    }

    fn session(&self) -> &SharedSession {
        &self.session
    }
}

/// Factory double tracking every client it hands out
pub struct MockClientFactory {
    options: ClientOptions,
    topic_outcome: TopicCreation,
    fail_clients: bool,
    pub pubsub: Mutex<Option<Arc<MockPubsubClient>>>,
    pub sessions: Mutex<Vec<Arc<CountingSession>>>,
    calls: AtomicUsize,
}

impl MockClientFactory {
    pub fn new() -> Self {
        Self::with_options(ClientOptions::new())
    }

    pub fn with_options(options: ClientOptions) -> Self {
        Self {
            options,
            topic_outcome: TopicCreation::Created,
            fail_clients: false,
            pubsub: Mutex::new(None),
            sessions: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_topic_outcome(mut self, outcome: TopicCreation) -> Self {
        self.topic_outcome = outcome;
        self
    }

    pub fn failing_clients(mut self) -> Self {
        self.fail_clients = true;
        self
    }

    /// Number of client construction requests received
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn pubsub_client_built(&self) -> Option<Arc<MockPubsubClient>> {
        self.pubsub.lock().unwrap().clone()
    }

    fn enter(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_clients {
            return Err(Error::auth("keyfile could not be read"));
        }
        Ok(())
    }
}

impl ClientFactory for MockClientFactory {
    fn pubsub_client(&self, config: &ValidatedConfig) -> Result<Arc<dyn PubsubClient>> {
        self.enter()?;
        let endpoint = match self.options.pubsub_emulator_host() {
            Some(host) => format!("http://{host}"),
            None => format!("https://pubsub.test/{}", config.required("project")),
        };
        let client = Arc::new(MockPubsubClient {
            outcome: self.topic_outcome.clone(),
            endpoint,
            emulated: self.options.is_emulated(),
            created: Mutex::new(Vec::new()),
        });
        *self.pubsub.lock().unwrap() = Some(Arc::clone(&client));
        Ok(client)
    }

    fn dns_client(&self, config: &ValidatedConfig) -> Result<Arc<dyn DnsClient>> {
        self.enter()?;
        let project = config.required("project").to_string();
        Ok(Arc::new(MockDnsClient {
            base_url: format!("https://dns.test/projects/{project}"),
            project,
        }))
    }

    fn authority_clients(&self, _config: &ValidatedConfig) -> Result<AuthorityClients> {
        self.enter()?;
        let mut sessions = self.sessions.lock().unwrap();
        let counting = CountingSession::new(sessions.len() as u64 + 1);
        sessions.push(Arc::clone(&counting));

        let session: SharedSession = counting;
        Ok(AuthorityClients {
            crm: Arc::new(MockCrmClient {
                session: Arc::clone(&session),
            }),
            gce: Arc::new(MockGceClient {
                session: Arc::clone(&session),
            }),
            session,
        })
    }
}

/// Fully valid publisher configuration
pub fn publisher_config() -> PluginConfig {
    PluginConfig::new()
        .with("keyfile", "/etc/janitor/keyfile.json")
        .with("project", "test-example")
        .with("topic", "a-topic")
}

/// Fully valid reconciler configuration
pub fn reconciler_config() -> PluginConfig {
    PluginConfig::new()
        .with("keyfile", "/etc/janitor/keyfile.json")
        .with("project", "test-example")
}

/// Fully valid authority configuration
pub fn authority_config() -> PluginConfig {
    PluginConfig::new()
        .with("keyfile", "/etc/janitor/keyfile.json")
        .with("dns_zone", "example.com.")
}
