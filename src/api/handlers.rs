use crate::{
    api::models::*,
    core::{
        analytics::AnalyticsReport,
        balance::BalanceSummary,
        chat::ChatSession,
        models::{
            audit::AppLog,
            chat::ChatMessage,
            group::Group,
            transaction::{Transaction, TransactionPatch},
            user::SessionUser,
        },
        query::{AnalyticsFilter, ListFilter},
        services::{LedgerService, NewTransaction},
        session::AppContext,
    },
    infrastructure::{kv::KeyValueStore, logging::in_memory::InMemoryLogging, storage::in_memory::InMemoryRealtimeStore},
};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use std::sync::Arc;

pub type Ledger = LedgerService<InMemoryRealtimeStore, InMemoryLogging>;
pub type Session = AppContext<Box<dyn KeyValueStore>>;

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
    pub session: Arc<Session>,
    pub chat: Arc<ChatSession>,
}

impl AppState {
    async fn actor(&self, action: &str) -> Result<SessionUser, ApiError> {
        Ok(self.session.require_user(action).await?)
    }

    async fn session_response(&self) -> SessionResponse {
        SessionResponse {
            user: self.session.current_user().await,
            profile: self.session.profile().await,
            theme: self.session.theme().await,
        }
    }
}

// Define API routes
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/session", get(get_session).delete(logout))
        .route("/session/login", post(login))
        .route("/session/provider", post(login_with_provider))
        .route("/session/signup", post(signup))
        .route("/session/theme", axum::routing::put(set_theme))
        .route("/transactions", get(list_transactions).post(create_transaction))
        .route(
            "/transactions/{id}",
            get(get_transaction)
                .patch(update_transaction)
                .delete(delete_transaction),
        )
        .route("/transactions/{id}/settle", post(settle_transaction))
        .route("/users/{user_id}/settle", post(settle_with_user))
        .route("/groups", get(list_groups).post(create_group))
        .route("/balances", get(get_balances))
        .route("/analytics", get(get_analytics))
        .route("/chat", get(chat_history).post(send_chat).delete(clear_chat))
        .route("/chat/voice", post(send_voice))
        .route("/chat/voice-output", get(get_voice_output).put(set_voice_output))
        .route("/chat/microphone-denied", post(microphone_denied))
        .route("/logs", get(get_app_logs))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/session",
    responses(
        (status = 200, description = "Current session and theme", body = SessionResponse)
    )
)]
async fn get_session(State(state): State<AppState>) -> Json<SessionResponse> {
    Json(state.session_response().await)
}

#[utoipa::path(
    post,
    path = "/api/session/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = SessionResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let user = state.session.login(&req.email, &req.password).await?;
    state.ledger.load_for(&user).await;
    Ok(Json(state.session_response().await))
}

#[utoipa::path(
    post,
    path = "/api/session/provider",
    responses(
        (status = 200, description = "Login successful", body = SessionResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn login_with_provider(State(state): State<AppState>) -> Result<Json<SessionResponse>, ApiError> {
    let user = state.session.login_with_provider().await?;
    state.ledger.load_for(&user).await;
    Ok(Json(state.session_response().await))
}

#[utoipa::path(
    post,
    path = "/api/session/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = SessionResponse),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let user = state
        .session
        .signup(&req.email, &req.password, &req.display_name)
        .await?;
    state.ledger.load_for(&user).await;
    Ok((StatusCode::CREATED, Json(state.session_response().await)))
}

#[utoipa::path(
    delete,
    path = "/api/session",
    responses(
        (status = 204, description = "Logged out"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn logout(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.session.logout().await?;
    state.ledger.clear().await;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/api/session/theme",
    request_body = ThemeRequest,
    responses(
        (status = 200, description = "Theme saved", body = SessionResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn set_theme(
    State(state): State<AppState>,
    Json(req): Json<ThemeRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    state.session.set_theme(req.theme).await?;
    Ok(Json(state.session_response().await))
}

#[utoipa::path(
    get,
    path = "/api/transactions",
    params(
        ("search" = Option<String>, Query, description = "Case-insensitive match on title, description or category"),
        ("category" = Option<String>, Query, description = "Exact category"),
        ("status" = Option<String>, Query, description = "all | settled | pending"),
        ("sort" = Option<String>, Query, description = "date-desc | date-asc | amount-desc | amount-asc")
    ),
    responses(
        (status = 200, description = "Filtered and sorted transactions", body = Vec<Transaction>),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    )
)]
async fn list_transactions(
    State(state): State<AppState>,
    Query(filter): Query<ListFilter>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    state.actor("view transactions").await?;
    Ok(Json(state.ledger.list_view(&filter).await))
}

#[utoipa::path(
    get,
    path = "/api/transactions/{id}",
    params(
        ("id" = String, Path, description = "ID of the transaction")
    ),
    responses(
        (status = 200, description = "Transaction", body = Transaction),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 404, description = "Transaction not found", body = ErrorResponse)
    )
)]
async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Transaction>, ApiError> {
    state.actor("view a transaction").await?;
    Ok(Json(state.ledger.transaction(&id).await?))
}

#[utoipa::path(
    post,
    path = "/api/transactions",
    request_body = NewTransaction,
    responses(
        (status = 201, description = "Transaction created", body = TransactionResponse),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn create_transaction(
    State(state): State<AppState>,
    Json(req): Json<NewTransaction>,
) -> Result<(StatusCode, Json<TransactionResponse>), ApiError> {
    let actor = state.actor("create a transaction").await?;
    let created = state.ledger.create_transaction(&actor, req).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(
    patch,
    path = "/api/transactions/{id}",
    request_body = TransactionPatch,
    params(
        ("id" = String, Path, description = "ID of the transaction to update")
    ),
    responses(
        (status = 200, description = "Transaction updated", body = TransactionResponse),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 404, description = "Transaction not found", body = ErrorResponse)
    )
)]
async fn update_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<TransactionPatch>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let actor = state.actor("update a transaction").await?;
    let updated = state.ledger.update_transaction(&actor, &id, patch).await?;
    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/api/transactions/{id}",
    params(
        ("id" = String, Path, description = "ID of the transaction to delete")
    ),
    responses(
        (status = 200, description = "Transaction deleted", body = DeleteResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    )
)]
async fn delete_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let actor = state.actor("delete a transaction").await?;
    let deleted = state.ledger.delete_transaction(&actor, &id).await?;
    Ok(Json(DeleteResponse {
        removed: deleted.value,
        consistency: deleted.consistency,
    }))
}

#[utoipa::path(
    post,
    path = "/api/transactions/{id}/settle",
    params(
        ("id" = String, Path, description = "ID of the transaction to settle")
    ),
    responses(
        (status = 200, description = "Transaction settled", body = TransactionResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 404, description = "Transaction not found", body = ErrorResponse)
    )
)]
async fn settle_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let actor = state.actor("settle a transaction").await?;
    let settled = state.ledger.settle_transaction(&actor, &id).await?;
    Ok(Json(settled.into()))
}

#[utoipa::path(
    post,
    path = "/api/users/{user_id}/settle",
    params(
        ("user_id" = String, Path, description = "Counterparty to settle every open transaction with")
    ),
    responses(
        (status = 200, description = "Transactions settled", body = SettleWithUserResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    )
)]
async fn settle_with_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<SettleWithUserResponse>, ApiError> {
    let actor = state.actor("settle with a user").await?;
    let settled = state.ledger.settle_with_user(&actor, &user_id).await?;
    Ok(Json(SettleWithUserResponse {
        settled_ids: settled.value,
        consistency: settled.consistency,
    }))
}

#[utoipa::path(
    get,
    path = "/api/groups",
    responses(
        (status = 200, description = "Groups the user belongs to", body = Vec<Group>),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    )
)]
async fn list_groups(State(state): State<AppState>) -> Result<Json<Vec<Group>>, ApiError> {
    state.actor("view groups").await?;
    Ok(Json(state.ledger.groups().await))
}

#[utoipa::path(
    post,
    path = "/api/groups",
    request_body = CreateGroupRequest,
    responses(
        (status = 201, description = "Group created", body = GroupResponse),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    )
)]
async fn create_group(
    State(state): State<AppState>,
    Json(req): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<GroupResponse>), ApiError> {
    let actor = state.actor("create a group").await?;
    let created = state
        .ledger
        .create_group(&actor, req.name, req.description, req.members)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(GroupResponse {
            group: created.value,
            consistency: created.consistency,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/balances",
    responses(
        (status = 200, description = "What the user is owed and owes", body = BalanceSummary),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    )
)]
async fn get_balances(State(state): State<AppState>) -> Result<Json<BalanceSummary>, ApiError> {
    let actor = state.actor("view balances").await?;
    Ok(Json(state.ledger.balances(&actor.uid).await))
}

#[utoipa::path(
    get,
    path = "/api/analytics",
    params(
        ("search" = Option<String>, Query, description = "Case-insensitive match on title, description or category"),
        ("category" = Option<String>, Query, description = "Exact category"),
        ("currency" = Option<String>, Query, description = "Currency code"),
        ("period" = Option<String>, Query, description = "day | week | month"),
        ("utcOffsetMinutes" = Option<i32>, Query, description = "Caller's UTC offset; `day` starts at local midnight"),
        ("sort" = Option<String>, Query, description = "date-desc | date-asc | amount-desc | amount-asc")
    ),
    responses(
        (status = 200, description = "Analytics over the filtered transactions", body = AnalyticsReport),
        (status = 401, description = "Not signed in", body = ErrorResponse)
    )
)]
async fn get_analytics(
    State(state): State<AppState>,
    Query(filter): Query<AnalyticsFilter>,
) -> Result<Json<AnalyticsReport>, ApiError> {
    state.actor("view analytics").await?;
    Ok(Json(state.ledger.analytics(&filter, Utc::now()).await))
}

#[utoipa::path(
    get,
    path = "/api/chat",
    responses(
        (status = 200, description = "Chat history", body = Vec<ChatMessage>)
    )
)]
async fn chat_history(State(state): State<AppState>) -> Json<Vec<ChatMessage>> {
    Json(state.chat.history().await)
}

#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Advisor reply", body = ChatReply)
    )
)]
async fn send_chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> Json<ChatReply> {
    Json(ChatReply {
        reply: state.chat.send_text(&req.message).await,
    })
}

#[utoipa::path(
    post,
    path = "/api/chat/voice",
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Advisor reply to the recording", body = ChatMessage)
    )
)]
async fn send_voice(State(state): State<AppState>, audio: Bytes) -> Json<ChatMessage> {
    Json(state.chat.send_voice(&audio).await)
}

#[utoipa::path(
    delete,
    path = "/api/chat",
    responses(
        (status = 200, description = "History reset to the welcome message", body = Vec<ChatMessage>)
    )
)]
async fn clear_chat(State(state): State<AppState>) -> Json<Vec<ChatMessage>> {
    state.chat.clear().await;
    Json(state.chat.history().await)
}

#[utoipa::path(
    get,
    path = "/api/chat/voice-output",
    responses(
        (status = 200, description = "Whether replies are spoken", body = VoiceOutput)
    )
)]
async fn get_voice_output(State(state): State<AppState>) -> Json<VoiceOutput> {
    Json(VoiceOutput {
        enabled: state.chat.voice_output().await,
    })
}

#[utoipa::path(
    put,
    path = "/api/chat/voice-output",
    request_body = VoiceOutput,
    responses(
        (status = 200, description = "Voice output updated", body = VoiceOutput)
    )
)]
async fn set_voice_output(State(state): State<AppState>, Json(req): Json<VoiceOutput>) -> Json<VoiceOutput> {
    state.chat.set_voice_output(req.enabled).await;
    Json(VoiceOutput {
        enabled: state.chat.voice_output().await,
    })
}

#[utoipa::path(
    post,
    path = "/api/chat/microphone-denied",
    responses(
        (status = 200, description = "Notice added to the chat", body = ChatMessage)
    )
)]
async fn microphone_denied(State(state): State<AppState>) -> Json<ChatMessage> {
    Json(state.chat.microphone_denied().await)
}

#[utoipa::path(
    get,
    path = "/api/logs",
    responses(
        (status = 200, description = "Audit log of the signed-in user", body = Vec<AppLog>),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn get_app_logs(State(state): State<AppState>) -> Result<Json<Vec<AppLog>>, ApiError> {
    let actor = state.actor("view the audit log").await?;
    Ok(Json(state.ledger.logs(Some(&actor.uid)).await?))
}
