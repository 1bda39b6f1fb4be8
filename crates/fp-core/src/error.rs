use thiserror::Error;

/// Failures surfaced by the planner. None of them are fatal: every path
/// leaves the in-memory document as it was.
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("layout document is not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("could not serialize layout document: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("save rejected by server (status {status})")]
    SaveRejected { status: u16 },

    #[error("network error: {0}")]
    Transport(String),

    #[error("resource catalog unavailable: {0}")]
    Catalog(String),
}
