//! Client contracts consumed by the plugin builders
//!
//! - [`Session`]: a releasable network session, possibly shared by clients
//! - [`PubsubClient`], [`DnsClient`], [`ResourceManagerClient`],
//!   [`ComputeClient`]: the API clients a plugin is wired to
//! - [`ClientFactory`]: builds those clients from validated configuration

pub mod client_factory;
pub mod clients;
pub mod session;

pub use client_factory::{AuthorityClients, ClientFactory};
pub use clients::{ComputeClient, DnsClient, PubsubClient, ResourceManagerClient, TopicCreation};
pub use session::{Session, SharedSession, same_session};
