// # Network Session
//
// A session is the connection resource behind one or more API clients.
// The Authority plugin builds its Resource Manager and Compute clients on
// a single session; both hold the same `SharedSession` and release goes
// through one explicit `close()` call, never through `Drop`.

use async_trait::async_trait;
use std::sync::Arc;

/// Shared handle to a session
pub type SharedSession = Arc<dyn Session>;

/// A network session that is released explicitly
#[async_trait]
pub trait Session: Send + Sync + std::fmt::Debug {
    /// Process-unique identifier of the underlying session
    fn id(&self) -> u64;

    /// Whether the session has been released
    fn is_closed(&self) -> bool;

    /// Release the session
    ///
    /// Returns `true` only for the call that actually released it; later
    /// calls (through any handle) are no-ops returning `false`.
    async fn close(&self) -> bool;
}

/// Whether two handles point at the same session object
pub fn same_session(a: &SharedSession, b: &SharedSession) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
