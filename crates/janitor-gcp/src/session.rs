//! Shared HTTP session
//!
//! One `HttpSession` wraps one `reqwest::Client` (and its connection pool).
//! Several API clients may send requests over the same session; it is
//! released by a single explicit `close()`.

use async_trait::async_trait;
use janitor_core::traits::Session;
use janitor_core::{Error, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Default HTTP timeout for API requests (30 seconds)
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// A releasable HTTP session
pub struct HttpSession {
    id: u64,
    client: Mutex<Option<reqwest::Client>>,
}

impl HttpSession {
    /// Open a session with the default timeout
    ///
    /// Builds the connection pool only; no request is sent.
    pub fn new() -> Result<Arc<Self>> {
        Self::with_timeout(DEFAULT_HTTP_TIMEOUT)
    }

    /// Open a session with a custom request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Arc<Self>> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::client(format!("Failed to build HTTP client: {e}")))?;

        Ok(Arc::new(Self {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            client: Mutex::new(Some(client)),
        }))
    }

    /// HTTP client for one request
    ///
    /// Fails once the session is closed.
    pub fn client(&self) -> Result<reqwest::Client> {
        self.client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| Error::client(format!("HTTP session {} is closed", self.id)))
    }
}

#[async_trait]
impl Session for HttpSession {
    fn id(&self) -> u64 {
        self.id
    }

    fn is_closed(&self) -> bool {
        self.client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    async fn close(&self) -> bool {
        let released = self
            .client
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if released.is_some() {
            tracing::debug!(session = self.id, "HTTP session closed");
        }
        released.is_some()
    }
}

impl std::fmt::Debug for HttpSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSession")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .finish()
    }
}
