//! Plugin builders
//!
//! Each plugin kind has a builder that runs the same protocol:
//!
//! 1. validate configuration against the kind's [`ConfigSchema`]
//! 2. build the API client(s) through a [`ClientFactory`]
//! 3. perform any one-time remote setup
//! 4. assemble the plugin around the caller's channel(s)
//!
//! A builder either returns a complete plugin or an error; nothing partially
//! built is ever handed out. Every error is logged once at error level.
//!
//! [`ConfigSchema`]: crate::config::ConfigSchema
//! [`ClientFactory`]: crate::traits::ClientFactory

pub mod authority;
pub mod publisher;
pub mod reconciler;

pub use authority::{Authority, AuthorityBuilder, get_authority};
pub use publisher::{Publisher, PublisherBuilder, get_publisher, qualified_topic};
pub use reconciler::{Reconciler, ReconcilerBuilder, get_reconciler};

use crate::config::ConfigSchema;
use crate::error::Error;
use std::fmt;
use std::time::Duration;
use tracing::error;

/// The kinds of plugin this crate builds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginKind {
    /// Publishes DNS changes to Pub/Sub
    Publisher,
    /// Compares desired record sets with Cloud DNS
    Reconciler,
    /// Produces desired record sets from Compute Engine
    Authority,
}

impl PluginKind {
    /// Short name used in logs
    pub fn name(self) -> &'static str {
        match self {
            PluginKind::Publisher => "publisher",
            PluginKind::Reconciler => "reconciler",
            PluginKind::Authority => "authority",
        }
    }

    /// Configuration schema for this kind
    pub fn schema(self) -> &'static ConfigSchema {
        match self {
            PluginKind::Publisher => &publisher::SCHEMA,
            PluginKind::Reconciler => &reconciler::SCHEMA,
            PluginKind::Authority => &authority::SCHEMA,
        }
    }
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Behaviour shared by every constructed plugin
pub trait Plugin: Send + Sync {
    /// Which kind of plugin this is
    fn kind(&self) -> PluginKind;

    /// How long cleanup waits for outstanding work
    fn cleanup_timeout(&self) -> Duration;
}

/// Log an error raised outside validation, then hand it back
pub(crate) fn logged(kind: PluginKind, err: Error) -> Error {
    error!(plugin = %kind, "{}", err);
    err
}
