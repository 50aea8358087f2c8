use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub title: String,
    pub description: String,
}

impl FieldError {
    pub fn new(field: &str, title: impl Into<String>, description: impl Into<String>) -> Self {
        FieldError {
            field: field.to_string(),
            title: title.into(),
            description: description.into(),
        }
    }
}

#[derive(Error, Debug, Serialize)]
pub enum LedgerError {
    #[error("You must be logged in to {0}")]
    NotSignedIn(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Transaction {0} not found")]
    TransactionNotFound(String),
    #[error("Invalid input for field `{0}`: {desc}", desc = .1.description)]
    InvalidInput(String, FieldError),
    #[error("{0}")]
    InvalidSplit(String),
    #[error("Participant {0} appears more than once")]
    DuplicateParticipant(String),
    #[error("Payer {0} is not among the participants")]
    PayerNotParticipant(String),
    #[error("Transaction {0} is settled and can no longer be edited")]
    TransactionSettled(String),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Logging error: {0}")]
    LoggingError(String),
    #[error("Session store error: {0}")]
    SessionStoreError(String),
    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),
    #[error("Transcription timed out after {0} attempts")]
    TranscriptionTimedOut(u32),
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

impl LedgerError {
    pub(crate) fn invalid(field: &str, title: impl Into<String>, description: impl Into<String>) -> Self {
        LedgerError::InvalidInput(field.to_string(), FieldError::new(field, title, description))
    }

    /// Validation errors are reported to the user and abort the operation
    /// without touching any state.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LedgerError::InvalidInput(..)
                | LedgerError::InvalidSplit(_)
                | LedgerError::DuplicateParticipant(_)
                | LedgerError::PayerNotParticipant(_)
                | LedgerError::TransactionSettled(_)
        )
    }
}
