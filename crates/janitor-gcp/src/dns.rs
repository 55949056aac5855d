//! Cloud DNS client
//!
//! Scoped to the project hosting the managed zones. Managed zone naming is
//! provided by [`DnsClient::managed_zone`].

use crate::auth::AuthClient;
use crate::session::HttpSession;
use janitor_core::traits::DnsClient;
use std::sync::Arc;

/// Cloud DNS API base URL
pub const DNS_API_BASE: &str = "https://www.googleapis.com/dns";

/// Cloud DNS client
pub struct GDnsClient {
    project: String,
    base_url: String,
    zone_prefix: Option<String>,
    auth: Arc<AuthClient>,
    session: Arc<HttpSession>,
}

impl GDnsClient {
    /// Create a client for `project` against API `api_version`
    pub fn new(
        project: impl Into<String>,
        api_version: &str,
        zone_prefix: Option<String>,
        auth: Arc<AuthClient>,
        session: Arc<HttpSession>,
    ) -> Self {
        let project = project.into();
        Self {
            base_url: format!("{DNS_API_BASE}/{api_version}/projects/{project}"),
            project,
            zone_prefix,
            auth,
            session,
        }
    }
}

impl DnsClient for GDnsClient {
    fn project(&self) -> &str {
        &self.project
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn zone_prefix(&self) -> Option<&str> {
        self.zone_prefix.as_deref()
    }
}

impl std::fmt::Debug for GDnsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GDnsClient")
            .field("project", &self.project)
            .field("base_url", &self.base_url)
            .field("zone_prefix", &self.zone_prefix)
            .field("auth", &self.auth)
            .field("session", &self.session)
            .finish()
    }
}
