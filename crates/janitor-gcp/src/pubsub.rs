// # Cloud Pub/Sub Client
//
// Creates topics over the Pub/Sub REST API.
//
// ## API Reference
//
// - Create topic: PUT `/v1/projects/:project/topics/:topic`
//   - 2xx: created
//   - 409: the topic already exists
//
// ## Emulator Mode
//
// Against a local emulator the client talks plain HTTP to `http://host:port`
// and sends no credentials.

use crate::auth::AuthClient;
use crate::session::HttpSession;
use async_trait::async_trait;
use janitor_core::traits::{PubsubClient, TopicCreation};
use janitor_core::{Error, Result};
use std::sync::Arc;

/// Cloud Pub/Sub API base URL
pub const PUBSUB_API_BASE: &str = "https://pubsub.googleapis.com";

/// Pub/Sub client scoped to one project
pub struct GPubsubClient {
    project: String,
    endpoint: String,
    auth: Option<Arc<AuthClient>>,
    session: Arc<HttpSession>,
}

impl GPubsubClient {
    /// Client for the live service
    pub fn new(project: impl Into<String>, auth: Arc<AuthClient>, session: Arc<HttpSession>) -> Self {
        Self {
            project: project.into(),
            endpoint: PUBSUB_API_BASE.to_string(),
            auth: Some(auth),
            session,
        }
    }

    /// Client for a local emulator at `host` (`host:port`)
    pub fn emulated(project: impl Into<String>, host: &str, session: Arc<HttpSession>) -> Self {
        Self {
            project: project.into(),
            endpoint: format!("http://{host}"),
            auth: None,
            session,
        }
    }

    /// Project the client is scoped to
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Session requests are sent over
    pub fn session(&self) -> &Arc<HttpSession> {
        &self.session
    }

    /// REST URL of a fully-qualified topic
    pub fn topic_url(&self, topic: &str) -> String {
        format!("{}/v1/{}", self.endpoint, topic)
    }

    async fn put_topic(&self, topic: &str) -> Result<TopicCreation> {
        let mut request = self
            .session
            .client()?
            .put(self.topic_url(topic))
            .json(&serde_json::json!({}));
        if let Some(auth) = &self.auth {
            request = request.bearer_auth(auth.access_token().await?);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed: {e}")))?;

        let status = response.status().as_u16();
        let body = if response.status().is_success() {
            String::new()
        } else {
            response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string())
        };
        Ok(classify(status, &body))
    }
}

/// Map a create-topic response status to its outcome
pub(crate) fn classify(status: u16, body: &str) -> TopicCreation {
    match status {
        200..=299 => TopicCreation::Created,
        409 => TopicCreation::AlreadyExists,
        401 | 403 => TopicCreation::Failed(format!(
            "Authentication failed: invalid credentials or insufficient permissions. Status: {status}"
        )),
        _ => TopicCreation::Failed(format!("{status} - {body}")),
    }
}

#[async_trait]
impl PubsubClient for GPubsubClient {
    async fn create_topic(&self, topic: &str) -> TopicCreation {
        tracing::debug!(topic, endpoint = %self.endpoint, "Creating topic");
        match self.put_topic(topic).await {
            Ok(outcome) => outcome,
            Err(e) => TopicCreation::Failed(e.to_string()),
        }
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn is_emulated(&self) -> bool {
        self.auth.is_none()
    }
}

impl std::fmt::Debug for GPubsubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GPubsubClient")
            .field("project", &self.project)
            .field("endpoint", &self.endpoint)
            .field("emulated", &self.auth.is_none())
            .finish()
    }
}
