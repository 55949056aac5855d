//! Google Cloud client factory
//!
//! Turns validated plugin configuration into ready clients:
//!
//! - credentials come from the configured `keyfile`
//! - Pub/Sub targets the emulator when [`ClientOptions`] says so
//! - the Authority's two clients get one session between them
//!
//! Nothing here sends a request.

use crate::auth::{AuthClient, Credentials};
use crate::compute::{GCrmClient, GGceClient};
use crate::dns::GDnsClient;
use crate::pubsub::GPubsubClient;
use crate::session::HttpSession;
use janitor_core::config::{ClientOptions, ValidatedConfig};
use janitor_core::traits::{
    AuthorityClients, ClientFactory, DnsClient, PubsubClient, Session, SharedSession,
};
use janitor_core::Result;
use std::sync::Arc;
use tracing::debug;

/// Builds Google Cloud API clients
#[derive(Debug, Clone, Default)]
pub struct GcpClientFactory {
    options: ClientOptions,
}

impl GcpClientFactory {
    /// Create a factory with options resolved by the caller
    pub fn new(options: ClientOptions) -> Self {
        Self { options }
    }

    /// Create a factory, resolving options from the environment once
    pub fn from_env() -> Self {
        Self::new(ClientOptions::from_env())
    }

    /// Options in effect
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    fn auth_client(config: &ValidatedConfig, session: Arc<HttpSession>) -> Result<Arc<AuthClient>> {
        let credentials = Credentials::from_keyfile(&config.keyfile())?;
        Ok(Arc::new(AuthClient::new(credentials, config.scopes(), session)))
    }

    fn api_version(config: &ValidatedConfig) -> String {
        config.text("api_version").unwrap_or_else(|| "v1".to_string())
    }
}

impl ClientFactory for GcpClientFactory {
    fn pubsub_client(&self, config: &ValidatedConfig) -> Result<Arc<dyn PubsubClient>> {
        let project = config.required("project");
        let session = HttpSession::new()?;

        if let Some(host) = self.options.pubsub_emulator_host() {
            debug!(host, project, "Using Pub/Sub emulator");
            return Ok(Arc::new(GPubsubClient::emulated(project, host, session)));
        }

        let auth = Self::auth_client(config, Arc::clone(&session))?;
        Ok(Arc::new(GPubsubClient::new(project, auth, session)))
    }

    fn dns_client(&self, config: &ValidatedConfig) -> Result<Arc<dyn DnsClient>> {
        let session = HttpSession::new()?;
        let auth = Self::auth_client(config, Arc::clone(&session))?;

        Ok(Arc::new(GDnsClient::new(
            config.required("project"),
            &Self::api_version(config),
            config.text("default_zone_prefix"),
            auth,
            session,
        )))
    }

    fn authority_clients(&self, config: &ValidatedConfig) -> Result<AuthorityClients> {
        let session = HttpSession::new()?;
        let auth = Self::auth_client(config, Arc::clone(&session))?;

        let crm = GCrmClient::new(Arc::clone(&auth), Arc::clone(&session));
        let gce = GGceClient::new(&Self::api_version(config), auth, Arc::clone(&session));
        debug!(session = session.id(), "Built authority clients");

        Ok(AuthorityClients {
            session: session as SharedSession,
            crm: Arc::new(crm),
            gce: Arc::new(gce),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::tests::keyfile;
    use janitor_core::config::{self, PluginConfig};
    use janitor_core::plugins::PluginKind;
    use janitor_core::traits::same_session;
    use janitor_core::Error;

    fn validated(kind: PluginKind, raw: PluginConfig) -> ValidatedConfig {
        config::validate(&raw, kind.schema()).unwrap()
    }

    #[test]
    fn test_emulated_pubsub_needs_no_keyfile() {
        let factory = GcpClientFactory::new(ClientOptions::from_emulator_signal(Some("1".into())));
        let config = validated(
            PluginKind::Publisher,
            PluginConfig::new()
                .with("keyfile", "/nonexistent/keyfile.json")
                .with("project", "test-example")
                .with("topic", "a-topic"),
        );

        let client = factory.pubsub_client(&config).unwrap();
        assert!(client.is_emulated());
        assert_eq!(client.endpoint(), "http://localhost:8085");
    }

    #[test]
    fn test_live_pubsub_loads_keyfile() {
        let file = keyfile();
        let factory = GcpClientFactory::default();
        let config = validated(
            PluginKind::Publisher,
            PluginConfig::new()
                .with("keyfile", file.path().to_string_lossy().to_string())
                .with("project", "test-example")
                .with("topic", "a-topic"),
        );

        let client = factory.pubsub_client(&config).unwrap();
        assert!(!client.is_emulated());
        assert_eq!(client.endpoint(), crate::pubsub::PUBSUB_API_BASE);
    }

    #[test]
    fn test_live_pubsub_missing_keyfile() {
        let factory = GcpClientFactory::default();
        let config = validated(
            PluginKind::Publisher,
            PluginConfig::new()
                .with("keyfile", "/nonexistent/keyfile.json")
                .with("project", "test-example")
                .with("topic", "a-topic"),
        );

        let err = factory.pubsub_client(&config).err().unwrap();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[test]
    fn test_dns_client_scoping() {
        let file = keyfile();
        let factory = GcpClientFactory::default();
        let config = validated(
            PluginKind::Reconciler,
            PluginConfig::new()
                .with("keyfile", file.path().to_string_lossy().to_string())
                .with("project", "dns-project")
                .with("default_zone_prefix", "team"),
        );

        let client = factory.dns_client(&config).unwrap();
        assert_eq!(client.project(), "dns-project");
        assert_eq!(
            client.base_url(),
            "https://www.googleapis.com/dns/v1/projects/dns-project"
        );
        assert_eq!(client.managed_zone("example.com."), "team-example-com");
    }

    #[tokio::test]
    async fn test_authority_clients_share_session() {
        let file = keyfile();
        let factory = GcpClientFactory::default();
        let config = validated(
            PluginKind::Authority,
            PluginConfig::new()
                .with("keyfile", file.path().to_string_lossy().to_string())
                .with("dns_zone", "example.com."),
        );

        let clients = factory.authority_clients(&config).unwrap();
        assert!(same_session(clients.crm.session(), clients.gce.session()));
        assert!(same_session(&clients.session, clients.crm.session()));
        assert_eq!(clients.gce.base_url(), "https://www.googleapis.com/compute/v1");
        assert_eq!(clients.crm.base_url(), crate::compute::CRM_API_BASE);

        assert!(clients.crm.session().close().await);
        assert!(clients.gce.session().is_closed());
        assert!(!clients.session.close().await);
    }
}
