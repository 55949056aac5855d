// # janitor-core
//
// Plugin construction for the DNS janitor: the pipeline that keeps a Cloud
// DNS zone consistent with a source of truth.
//
// ## Architecture Overview
//
// - **config**: per-kind schemas and the single validation routine
// - **traits**: API client contracts and the `ClientFactory` seam
// - **plugins**: builders for the Publisher, Reconciler and Authority
// - **channel**: the FIFO queues plugins are wired to
//
// ## Construction Protocol
//
// 1. Validation happens before any remote call
// 2. Clients are built without network I/O
// 3. Remote bootstrap (topic creation) finishes before a plugin is returned
// 4. Failures are logged once and returned; nothing is retried here

pub mod channel;
pub mod config;
pub mod error;
pub mod plugins;
pub mod traits;

// Re-export core types for convenience
pub use channel::{Channel, ChannelRef, Message};
pub use config::{ClientOptions, ConfigSchema, PluginConfig, ValidatedConfig};
pub use error::{Error, Result};
pub use plugins::{
    Authority, Plugin, PluginKind, Publisher, Reconciler, get_authority, get_publisher,
    get_reconciler,
};
pub use traits::{
    AuthorityClients, ClientFactory, ComputeClient, DnsClient, PubsubClient,
    ResourceManagerClient, Session, SharedSession, TopicCreation,
};
