//! Resource Manager and Compute Engine clients
//!
//! Both are built on one [`HttpSession`] handed to them by the factory.
//! Closing the session through either client releases it for both.

use crate::auth::AuthClient;
use crate::session::HttpSession;
use janitor_core::traits::{ComputeClient, ResourceManagerClient, SharedSession};
use std::sync::Arc;

/// Resource Manager API base URL
pub const CRM_API_BASE: &str = "https://cloudresourcemanager.googleapis.com/v1";

/// Compute Engine API base URL
pub const GCE_API_BASE: &str = "https://www.googleapis.com/compute";

/// Resource Manager client
pub struct GCrmClient {
    base_url: String,
    auth: Arc<AuthClient>,
    session: SharedSession,
}

impl GCrmClient {
    /// Create a client over `http`
    pub fn new(auth: Arc<AuthClient>, http: Arc<HttpSession>) -> Self {
        Self {
            base_url: CRM_API_BASE.to_string(),
            auth,
            session: http,
        }
    }
}

impl ResourceManagerClient for GCrmClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn session(&self) -> &SharedSession {
        &self.session
    }
}

/// Compute Engine client
pub struct GGceClient {
    base_url: String,
    auth: Arc<AuthClient>,
    session: SharedSession,
}

impl GGceClient {
    /// Create a client for API `api_version` over `http`
    pub fn new(api_version: &str, auth: Arc<AuthClient>, http: Arc<HttpSession>) -> Self {
        Self {
            base_url: format!("{GCE_API_BASE}/{api_version}"),
            auth,
            session: http,
        }
    }
}

impl ComputeClient for GGceClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn session(&self) -> &SharedSession {
        &self.session
    }
}

impl std::fmt::Debug for GCrmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GCrmClient")
            .field("base_url", &self.base_url)
            .field("auth", &self.auth)
            .field("session", &self.session)
            .finish()
    }
}

impl std::fmt::Debug for GGceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GGceClient")
            .field("base_url", &self.base_url)
            .field("auth", &self.auth)
            .field("session", &self.session)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::tests::KEYFILE;
    use crate::auth::Credentials;

    fn auth(session: &Arc<HttpSession>) -> Arc<AuthClient> {
        let creds = Credentials::from_json(KEYFILE).unwrap();
        Arc::new(AuthClient::new(creds, Vec::new(), Arc::clone(session)))
    }

    #[test]
    fn test_debug_shows_account_but_not_key() {
        let session = HttpSession::new().unwrap();
        let crm = GCrmClient::new(auth(&session), Arc::clone(&session));
        let gce = GGceClient::new("beta", auth(&session), session);

        for debug_str in [format!("{crm:?}"), format!("{gce:?}")] {
            assert!(debug_str.contains("janitor@test-example.iam.gserviceaccount.com"));
            assert!(!debug_str.contains("not-a-real-key"));
        }
        assert!(format!("{gce:?}").contains("https://www.googleapis.com/compute/beta"));
    }
}
