use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientCommandError {
    /// The doctor payload was not a valid JSON document.
    #[error("failed to parse doctor report: {0}")]
    DoctorPayload(#[from] serde_json::Error),
}
