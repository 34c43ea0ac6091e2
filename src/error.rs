//! Error taxonomy for provisioning runs.
//!
//! Only [`ProvisionError::Authentication`] stops a run. Every other variant is
//! absorbed by the provisioner and recorded in the run report.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProvisionError {
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error("transport: {0}")]
    Transport(String),
    #[error("remote rejected request with status {status}: {body}")]
    RemoteValidation { status: u16, body: String },
    #[error("unexpected response body: {0}")]
    Decode(String),
    #[error("invalid schema: {0}")]
    Schema(String),
}

impl ProvisionError {
    /// True for the one error class that must end the process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }
}

pub type Result<T, E = ProvisionError> = std::result::Result<T, E>;
