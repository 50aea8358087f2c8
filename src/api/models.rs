use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::errors::{FieldError, LedgerError};
use crate::core::models::{
    chat::ChatMessage,
    group::{Group, GroupMember},
    transaction::Transaction,
    user::{SessionUser, Theme, UserProfile},
};
use crate::core::services::{Consistency, Persisted};

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ThemeRequest {
    pub theme: Theme,
}

#[derive(Serialize, ToSchema)]
pub struct SessionResponse {
    pub user: Option<SessionUser>,
    pub profile: Option<UserProfile>,
    pub theme: Theme,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub members: Vec<GroupMember>,
}

#[derive(Deserialize, ToSchema)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Deserialize, Serialize, ToSchema)]
pub struct VoiceOutput {
    pub enabled: bool,
}

#[derive(Serialize, ToSchema)]
pub struct ChatReply {
    /// Absent when the message was blank and ignored.
    pub reply: Option<ChatMessage>,
}

#[derive(Serialize, ToSchema)]
pub struct TransactionResponse {
    pub transaction: Transaction,
    pub consistency: Consistency,
}

impl From<Persisted<Transaction>> for TransactionResponse {
    fn from(p: Persisted<Transaction>) -> Self {
        TransactionResponse {
            transaction: p.value,
            consistency: p.consistency,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct DeleteResponse {
    pub removed: bool,
    pub consistency: Consistency,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettleWithUserResponse {
    pub settled_ids: Vec<String>,
    pub consistency: Consistency,
}

#[derive(Serialize, ToSchema)]
pub struct GroupResponse {
    pub group: Group,
    pub consistency: Consistency,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<FieldError>,
}

// Newtype wrapper for LedgerError to implement IntoResponse
pub struct ApiError(pub LedgerError);

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let message = self.0.to_string();
        let (status, field) = match self.0 {
            LedgerError::NotSignedIn(_) | LedgerError::InvalidCredentials => (StatusCode::UNAUTHORIZED, None),
            LedgerError::TransactionNotFound(_) => (StatusCode::NOT_FOUND, None),
            LedgerError::InvalidInput(_, field) => (StatusCode::BAD_REQUEST, Some(field)),
            LedgerError::InvalidSplit(_)
            | LedgerError::DuplicateParticipant(_)
            | LedgerError::PayerNotParticipant(_)
            | LedgerError::TransactionSettled(_) => (StatusCode::BAD_REQUEST, None),
            LedgerError::TranscriptionFailed(_) | LedgerError::TranscriptionTimedOut(_) => {
                (StatusCode::BAD_GATEWAY, None)
            }
            LedgerError::StorageError(_)
            | LedgerError::LoggingError(_)
            | LedgerError::SessionStoreError(_)
            | LedgerError::UnexpectedError(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
        };
        (status, Json(ErrorResponse { error: message, field })).into_response()
    }
}
