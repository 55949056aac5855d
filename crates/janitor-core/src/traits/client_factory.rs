//! Client factory seam
//!
//! A [`ClientFactory`] turns validated configuration into ready API clients.
//! It resolves credentials and endpoints but performs no remote bootstrap;
//! that belongs to the builders.

use crate::config::ValidatedConfig;
use crate::error::Result;
use crate::traits::clients::{ComputeClient, DnsClient, PubsubClient, ResourceManagerClient};
use crate::traits::session::SharedSession;
use std::sync::Arc;

/// Clients backing an Authority plugin
///
/// Both clients are built on `session`; exactly one physical session exists.
pub struct AuthorityClients {
    /// The session shared by both clients
    pub session: SharedSession,
    /// Resource Manager client
    pub crm: Arc<dyn ResourceManagerClient>,
    /// Compute Engine client
    pub gce: Arc<dyn ComputeClient>,
}

/// Builds API clients for the plugin builders
pub trait ClientFactory: Send + Sync {
    /// Pub/Sub client scoped to the configured project
    fn pubsub_client(&self, config: &ValidatedConfig) -> Result<Arc<dyn PubsubClient>>;

    /// Cloud DNS client scoped to the configured project
    fn dns_client(&self, config: &ValidatedConfig) -> Result<Arc<dyn DnsClient>>;

    /// Resource Manager and Compute clients sharing one session
    fn authority_clients(&self, config: &ValidatedConfig) -> Result<AuthorityClients>;
}
