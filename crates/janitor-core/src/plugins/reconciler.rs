//! Cloud DNS reconciler plugin
//!
//! Required configuration: `keyfile`, `project`.
//! Optional: `cleanup_timeout` (default 60), `api_version` (default `v1`),
//! `default_zone_prefix`, `scopes`.
//!
//! No remote setup is needed; the channels given to the builder are stored
//! as-is so the caller and the plugin share the same objects.

use crate::channel::ChannelRef;
use crate::config::{
    self, CLEANUP_TIMEOUT, ConfigSchema, DEFAULT_CLEANUP_TIMEOUT_SECS, DefaultValue, OptionalKey,
    PluginConfig, RequiredKey,
};
use crate::error::Result;
use crate::plugins::{Plugin, PluginKind, logged};
use crate::traits::{ClientFactory, DnsClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Configuration schema for the reconciler
pub const SCHEMA: ConfigSchema = ConfigSchema {
    kind: PluginKind::Reconciler,
    required: &[
        RequiredKey {
            key: "keyfile",
            message: "The path to a Service Account JSON keyfile is required to \
                      authenticate for Google Cloud DNS.",
        },
        RequiredKey {
            key: "project",
            message: "The GCP project where Cloud DNS is located is required.",
        },
    ],
    optional: &[
        OptionalKey {
            key: CLEANUP_TIMEOUT,
            default: DefaultValue::Seconds(DEFAULT_CLEANUP_TIMEOUT_SECS),
        },
        OptionalKey {
            key: "api_version",
            default: DefaultValue::Str("v1"),
        },
    ],
};

/// Validates desired record sets against Cloud DNS
pub struct Reconciler {
    dns_client: Arc<dyn DnsClient>,
    rrset_channel: ChannelRef,
    changes_channel: ChannelRef,
    cleanup_timeout: Duration,
}

impl Reconciler {
    /// Cloud DNS client
    pub fn dns_client(&self) -> &Arc<dyn DnsClient> {
        &self.dns_client
    }

    /// Channel desired record sets are consumed from
    pub fn rrset_channel(&self) -> &ChannelRef {
        &self.rrset_channel
    }

    /// Channel corrective changes are emitted to
    pub fn changes_channel(&self) -> &ChannelRef {
        &self.changes_channel
    }
}

impl Plugin for Reconciler {
    fn kind(&self) -> PluginKind {
        PluginKind::Reconciler
    }

    fn cleanup_timeout(&self) -> Duration {
        self.cleanup_timeout
    }
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("project", &self.dns_client.project())
            .field("cleanup_timeout", &self.cleanup_timeout)
            .finish()
    }
}

/// Builds a [`Reconciler`]
pub struct ReconcilerBuilder<'a> {
    config: &'a PluginConfig,
    rrset_channel: ChannelRef,
    changes_channel: ChannelRef,
    factory: &'a dyn ClientFactory,
}

impl<'a> ReconcilerBuilder<'a> {
    /// Create a builder
    pub fn new(
        config: &'a PluginConfig,
        rrset_channel: ChannelRef,
        changes_channel: ChannelRef,
        factory: &'a dyn ClientFactory,
    ) -> Self {
        Self {
            config,
            rrset_channel,
            changes_channel,
            factory,
        }
    }

    /// Validate and build the DNS client
    pub fn build(self) -> Result<Reconciler> {
        let config = config::validate(self.config, &SCHEMA)?;
        let dns_client = self
            .factory
            .dns_client(&config)
            .map_err(|e| logged(PluginKind::Reconciler, e))?;

        debug!(project = %dns_client.project(), "Reconciler ready");
        Ok(Reconciler {
            dns_client,
            rrset_channel: self.rrset_channel,
            changes_channel: self.changes_channel,
            cleanup_timeout: config.cleanup_timeout(),
        })
    }
}

/// Validate configuration and build a [`Reconciler`]
pub fn get_reconciler(
    config: &PluginConfig,
    rrset_channel: ChannelRef,
    changes_channel: ChannelRef,
    factory: &dyn ClientFactory,
) -> Result<Reconciler> {
    ReconcilerBuilder::new(config, rrset_channel, changes_channel, factory).build()
}
