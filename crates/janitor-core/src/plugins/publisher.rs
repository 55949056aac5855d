//! Pub/Sub publisher plugin
//!
//! Required configuration: `keyfile`, `project`, `topic`.
//! Optional: `cleanup_timeout` (seconds, default 60).
//!
//! Building a publisher makes sure its topic exists. An existing topic is
//! fine; any other creation failure aborts the build.

use crate::channel::{ChannelRef, Message};
use crate::config::{
    self, CLEANUP_TIMEOUT, ConfigSchema, DEFAULT_CLEANUP_TIMEOUT_SECS, DefaultValue, OptionalKey,
    PluginConfig, RequiredKey,
};
use crate::error::{Error, Result};
use crate::plugins::{Plugin, PluginKind, logged};
use crate::traits::{ClientFactory, PubsubClient, TopicCreation};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Configuration schema for the publisher
pub const SCHEMA: ConfigSchema = ConfigSchema {
    kind: PluginKind::Publisher,
    required: &[
        RequiredKey {
            key: "keyfile",
            message: "The path to a Service Account JSON keyfile is required to \
                      authenticate for Google Cloud Pub/Sub.",
        },
        RequiredKey {
            key: "project",
            message: "The GCP project where Cloud Pub/Sub is located is required.",
        },
        RequiredKey {
            key: "topic",
            message: "A topic for the plugin to publish to in Cloud Pub/Sub is required.",
        },
    ],
    optional: &[OptionalKey {
        key: CLEANUP_TIMEOUT,
        default: DefaultValue::Seconds(DEFAULT_CLEANUP_TIMEOUT_SECS),
    }],
};

/// Fully-qualified topic name for `project`
///
/// Accepts a bare topic name or an already-qualified one; only the last path
/// segment is kept.
pub fn qualified_topic(project: &str, topic: &str) -> String {
    let short = topic.rsplit('/').next().unwrap_or(topic);
    format!("projects/{project}/topics/{short}")
}

/// Publishes change messages to a Pub/Sub topic
pub struct Publisher {
    client: Arc<dyn PubsubClient>,
    topic: String,
    cleanup_timeout: Duration,
    changes_channel: ChannelRef,
    messages: HashMap<String, Message>,
}

impl Publisher {
    /// Pub/Sub client
    pub fn client(&self) -> &Arc<dyn PubsubClient> {
        &self.client
    }

    /// Fully-qualified topic messages are published to
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Channel change messages are consumed from
    pub fn changes_channel(&self) -> &ChannelRef {
        &self.changes_channel
    }

    /// Messages published but not yet acknowledged
    pub fn in_flight(&self) -> usize {
        self.messages.len()
    }

    /// Whether any message is still in flight
    pub fn has_in_flight(&self) -> bool {
        !self.messages.is_empty()
    }
}

impl Plugin for Publisher {
    fn kind(&self) -> PluginKind {
        PluginKind::Publisher
    }

    fn cleanup_timeout(&self) -> Duration {
        self.cleanup_timeout
    }
}

impl std::fmt::Debug for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("topic", &self.topic)
            .field("endpoint", &self.client.endpoint())
            .field("cleanup_timeout", &self.cleanup_timeout)
            .field("in_flight", &self.messages.len())
            .finish()
    }
}

/// Builds a [`Publisher`]
pub struct PublisherBuilder<'a> {
    config: &'a PluginConfig,
    changes_channel: ChannelRef,
    factory: &'a dyn ClientFactory,
}

impl<'a> PublisherBuilder<'a> {
    /// Create a builder
    pub fn new(
        config: &'a PluginConfig,
        changes_channel: ChannelRef,
        factory: &'a dyn ClientFactory,
    ) -> Self {
        Self {
            config,
            changes_channel,
            factory,
        }
    }

    /// Validate, build the client, ensure the topic exists
    pub async fn build(self) -> Result<Publisher> {
        let config = config::validate(self.config, &SCHEMA)?;
        let client = self
            .factory
            .pubsub_client(&config)
            .map_err(|e| logged(PluginKind::Publisher, e))?;

        let topic = qualified_topic(config.required("project"), config.required("topic"));
        match client.create_topic(&topic).await {
            TopicCreation::Created => info!("Created topic \"{}\"", topic),
            TopicCreation::AlreadyExists => debug!("Topic \"{}\" already exists", topic),
            TopicCreation::Failed(reason) => {
                let msg = format!("Error trying to create topic \"{topic}\"");
                error!(plugin = %PluginKind::Publisher, reason = %reason, "{}", msg);
                return Err(Error::janitor(msg));
            }
        }

        Ok(Publisher {
            client,
            topic,
            cleanup_timeout: config.cleanup_timeout(),
            changes_channel: self.changes_channel,
            messages: HashMap::new(),
        })
    }
}

/// Validate configuration and build a [`Publisher`]
pub async fn get_publisher(
    config: &PluginConfig,
    changes_channel: ChannelRef,
    factory: &dyn ClientFactory,
) -> Result<Publisher> {
    PublisherBuilder::new(config, changes_channel, factory)
        .build()
        .await
}
