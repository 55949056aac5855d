//! Compute Engine authority plugin
//!
//! Required configuration: `keyfile`, `dns_zone`.
//! Optional: `cleanup_timeout` (default 60), `api_version` (default `v1`),
//! `scopes`.
//!
//! `dns_zone` is expected to be absolute (`"example.com."`); only its
//! presence is checked.
//!
//! The Resource Manager and Compute clients run over one session. Whoever
//! shuts the plugin down calls [`Authority::close`] once; closing through
//! either client's session handle has the same effect.

use crate::channel::ChannelRef;
use crate::config::{
    self, CLEANUP_TIMEOUT, ConfigSchema, DEFAULT_CLEANUP_TIMEOUT_SECS, DefaultValue, OptionalKey,
    PluginConfig, RequiredKey,
};
use crate::error::Result;
use crate::plugins::{Plugin, PluginKind, logged};
use crate::traits::{AuthorityClients, ClientFactory, ComputeClient, ResourceManagerClient};
use crate::traits::{SharedSession, same_session};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Configuration schema for the authority
pub const SCHEMA: ConfigSchema = ConfigSchema {
    kind: PluginKind::Authority,
    required: &[
        RequiredKey {
            key: "keyfile",
            message: "The path to a Service Account JSON keyfile is required to \
                      authenticate to the GCE API.",
        },
        RequiredKey {
            key: "dns_zone",
            message: "The absolute DNS zone, i.e. \"example.com.\", is required to \
                      identify to which zone generated records should belong.",
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

/// Produces desired record sets from Compute Engine instances
pub struct Authority {
    crm_client: Arc<dyn ResourceManagerClient>,
    gce_client: Arc<dyn ComputeClient>,
    session: SharedSession,
    dns_zone: String,
    rrset_channel: ChannelRef,
    cleanup_timeout: Duration,
}

impl Authority {
    /// Resource Manager client
    pub fn crm_client(&self) -> &Arc<dyn ResourceManagerClient> {
        &self.crm_client
    }

    /// Compute Engine client
    pub fn gce_client(&self) -> &Arc<dyn ComputeClient> {
        &self.gce_client
    }

    /// Session shared by both clients
    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    /// Absolute zone generated records belong to
    pub fn dns_zone(&self) -> &str {
        &self.dns_zone
    }

    /// Channel desired record sets are emitted to
    pub fn rrset_channel(&self) -> &ChannelRef {
        &self.rrset_channel
    }

    /// Release the shared session
    ///
    /// Returns `true` if this call released it.
    pub async fn close(&self) -> bool {
        let released = self.session.close().await;
        if released {
            info!(session = self.session.id(), "Closed authority session");
        }
        released
    }
}

impl Plugin for Authority {
    fn kind(&self) -> PluginKind {
        PluginKind::Authority
    }

    fn cleanup_timeout(&self) -> Duration {
        self.cleanup_timeout
    }
}

impl std::fmt::Debug for Authority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authority")
            .field("dns_zone", &self.dns_zone)
            .field("session", &self.session)
            .field("cleanup_timeout", &self.cleanup_timeout)
            .finish()
    }
}

/// Builds an [`Authority`]
pub struct AuthorityBuilder<'a> {
    config: &'a PluginConfig,
    rrset_channel: ChannelRef,
    factory: &'a dyn ClientFactory,
}

impl<'a> AuthorityBuilder<'a> {
    /// Create a builder
    pub fn new(
        config: &'a PluginConfig,
        rrset_channel: ChannelRef,
        factory: &'a dyn ClientFactory,
    ) -> Self {
        Self {
            config,
            rrset_channel,
            factory,
        }
    }

    /// Validate and build both clients on one session
    pub fn build(self) -> Result<Authority> {
        let config = config::validate(self.config, &SCHEMA)?;
        let AuthorityClients { session, crm, gce } = self
            .factory
            .authority_clients(&config)
            .map_err(|e| logged(PluginKind::Authority, e))?;

        debug_assert!(same_session(&session, crm.session()));
        debug_assert!(same_session(&session, gce.session()));
        debug!(session = session.id(), "Authority clients share one session");

        Ok(Authority {
            crm_client: crm,
            gce_client: gce,
            session,
            dns_zone: config.required("dns_zone").to_string(),
            rrset_channel: self.rrset_channel,
            cleanup_timeout: config.cleanup_timeout(),
        })
    }
}

/// Validate configuration and build an [`Authority`]
pub fn get_authority(
    config: &PluginConfig,
    rrset_channel: ChannelRef,
    factory: &dyn ClientFactory,
) -> Result<Authority> {
    AuthorityBuilder::new(config, rrset_channel, factory).build()
}
