// # Google Cloud clients for the DNS janitor
//
// This crate provides the concrete `ClientFactory` used by the janitor
// plugin builders, plus the clients it hands out:
//
// - `GPubsubClient`: topic creation, live or against a local emulator
// - `GDnsClient`: Cloud DNS, scoped to a project
// - `GCrmClient` / `GGceClient`: Resource Manager and Compute, on one session
//
// ## Construction Rules
//
// - Building a client never sends a request
// - Credentials come from a service account keyfile
// - Emulator mode is decided by `ClientOptions`, resolved once by the caller
//
// ## API Reference
//
// - Pub/Sub: https://cloud.google.com/pubsub/docs/reference/rest
// - Cloud DNS: https://cloud.google.com/dns/docs/reference/v1
// - Resource Manager: https://cloud.google.com/resource-manager/reference/rest
// - Compute Engine: https://cloud.google.com/compute/docs/reference/rest/v1

pub mod auth;
pub mod compute;
pub mod dns;
pub mod factory;
pub mod pubsub;
pub mod session;

pub use auth::{AuthClient, Credentials};
pub use compute::{GCrmClient, GGceClient};
pub use dns::GDnsClient;
pub use factory::GcpClientFactory;
pub use pubsub::GPubsubClient;
pub use session::HttpSession;
