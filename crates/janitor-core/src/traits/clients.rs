// # API Client Traits
//
// The concrete clients live outside this crate (`janitor-gcp` for Google
// Cloud). Builders only depend on these traits.
//
// Client construction never performs network I/O. The only remote call a
// builder makes is `PubsubClient::create_topic`.

use crate::traits::session::SharedSession;
use async_trait::async_trait;

/// Outcome of an idempotent topic creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicCreation {
    /// The topic was created by this call
    Created,
    /// The topic existed already; not an error
    AlreadyExists,
    /// Creation failed for any other reason
    Failed(String),
}

impl TopicCreation {
    /// Whether the topic is usable after this outcome
    pub fn is_ok(&self) -> bool {
        !matches!(self, TopicCreation::Failed(_))
    }
}

/// Pub/Sub publisher client
#[async_trait]
pub trait PubsubClient: Send + Sync {
    /// Create a topic given its fully-qualified name
    /// (`projects/{project}/topics/{name}`)
    async fn create_topic(&self, topic: &str) -> TopicCreation;

    /// Base endpoint requests are sent to
    fn endpoint(&self) -> &str;

    /// Whether the client targets a local emulator
    fn is_emulated(&self) -> bool;
}

/// Cloud DNS client, scoped to a project
pub trait DnsClient: Send + Sync {
    /// Project hosting the managed zones
    fn project(&self) -> &str;

    /// Project-scoped base URL
    fn base_url(&self) -> &str;

    /// Prefix applied to managed zone names
    fn zone_prefix(&self) -> Option<&str> {
        None
    }

    /// Managed zone name for an absolute DNS zone
    ///
    /// The last label (empty for an absolute zone) is dropped and remaining
    /// dots become dashes. Reverse zones keep only their two most significant
    /// octets, behind a `reverse-` marker:
    ///
    /// - `example.com.` -> `example-com`
    /// - `30.20.10.in-addr.arpa.` -> `reverse-20-10`
    fn managed_zone(&self, zone: &str) -> String {
        let prefix = self
            .zone_prefix()
            .map(|p| format!("{p}-"))
            .unwrap_or_default();

        if zone.ends_with(".in-addr.arpa.") {
            // The suffix alone yields four labels: ["", "in-addr", "arpa", ""]
            let labels: Vec<&str> = zone.split('.').collect();
            let octets = &labels[labels.len().saturating_sub(5)..labels.len() - 3];
            return format!("{prefix}reverse-{}", octets.join("-"));
        }
        let head = zone.rsplit_once('.').map_or("", |(head, _)| head);
        format!("{prefix}{}", head.replace('.', "-"))
    }
}

/// Resource Manager client
pub trait ResourceManagerClient: Send + Sync {
    /// Base URL of the API
    fn base_url(&self) -> &str;

    /// Session this client sends requests over
    fn session(&self) -> &SharedSession;
}

/// Compute Engine client
pub trait ComputeClient: Send + Sync {
    /// Base URL of the API
    fn base_url(&self) -> &str;

    /// Session this client sends requests over
    fn session(&self) -> &SharedSession;
}
