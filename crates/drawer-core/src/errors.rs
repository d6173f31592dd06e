use thiserror::Error;

use crate::events::ActionId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DrawerError {
    #[error("action {0:?} is not available")]
    FeatureUnavailable(ActionId),
    #[error("action {0:?} already has a pending confirmation")]
    ConfirmationPending(ActionId),
    #[error("action {0:?} is already executing")]
    ActionBusy(ActionId),
    #[error("confirmation for {0:?} is no longer pending")]
    StaleConfirmation(ActionId),
    #[error("invalid stream parameters: {0}")]
    InvalidStreamParams(String),
    #[error("configuration error: {0}")]
    Config(String),
}

/// Reason string the recording backend reports for a duplicate start.
pub const RECORDING_ALREADY_IN_PROGRESS: &str = "Recording already in progress";

/// Failure reported by a recording or live-streaming session service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceFailure {
    #[error("already in progress")]
    AlreadyInProgress,
    #[error("{0}")]
    Other(String),
}

impl ServiceFailure {
    /// Classify a raw backend failure reason.
    pub fn from_reason(reason: &str) -> Self {
        if reason.trim() == RECORDING_ALREADY_IN_PROGRESS {
            Self::AlreadyInProgress
        } else {
            Self::Other(reason.to_string())
        }
    }
}
