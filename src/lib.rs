//! Idempotent provisioning of a Directus schema over its REST API.
//!
//! The binary (`dprov`) resolves a bearer token, then drives the
//! [`orchestrator`] over a declarative [`schema::SchemaDef`]. Collections and
//! fields are created only when a lookup says they are missing; permission
//! grants and seed items are posted unconditionally.
pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod provision;
pub mod report;
pub mod schema;
pub mod seed;
pub mod transport;

pub use config::{Credentials, ProvisionConfig};
pub use error::ProvisionError;
pub use report::{OutcomeStatus, ResourceKind, ResourceOutcome, RunReport};
pub use schema::SchemaDef;
pub use transport::{HttpResponse, Transport, UreqTransport};
