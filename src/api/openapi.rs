use utoipa::OpenApi;

use crate::{
    api::models::{
        ChatReply, ChatRequest, CreateGroupRequest, DeleteResponse, ErrorResponse, GroupResponse, LoginRequest,
        SessionResponse, SettleWithUserResponse, SignupRequest, ThemeRequest, TransactionResponse,
        VoiceOutput,
    },
    core::{
        analytics::{AnalyticsReport, CategorySummary, CurrencyTotal, MonthlySummary, SpendingTrend, WeekdaySummary},
        balance::BalanceSummary,
        errors::FieldError,
        models::{
            audit::AppLog,
            chat::{ChatMessage, ChatRole},
            group::{Group, GroupMember},
            transaction::{Participant, Transaction, TransactionPatch},
            user::{SessionUser, Theme, UserProfile},
        },
        query::{SortOption, StatusFilter, TimePeriod},
        services::{Consistency, NewTransaction},
        split::{ParticipantDraft, SplitPolicy},
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::get_session,
        super::handlers::login,
        super::handlers::login_with_provider,
        super::handlers::signup,
        super::handlers::logout,
        super::handlers::set_theme,
        super::handlers::list_transactions,
        super::handlers::get_transaction,
        super::handlers::create_transaction,
        super::handlers::update_transaction,
        super::handlers::delete_transaction,
        super::handlers::settle_transaction,
        super::handlers::settle_with_user,
        super::handlers::list_groups,
        super::handlers::create_group,
        super::handlers::get_balances,
        super::handlers::get_analytics,
        super::handlers::chat_history,
        super::handlers::send_chat,
        super::handlers::send_voice,
        super::handlers::clear_chat,
        super::handlers::get_voice_output,
        super::handlers::set_voice_output,
        super::handlers::microphone_denied,
        super::handlers::get_app_logs
    ),
    components(schemas(
        LoginRequest,
        SignupRequest,
        ThemeRequest,
        SessionResponse,
        CreateGroupRequest,
        ChatRequest,
        ChatReply,
        VoiceOutput,
        TransactionResponse,
        DeleteResponse,
        SettleWithUserResponse,
        GroupResponse,
        ErrorResponse,
        FieldError,
        SessionUser,
        UserProfile,
        Theme,
        Transaction,
        TransactionPatch,
        Participant,
        NewTransaction,
        ParticipantDraft,
        SplitPolicy,
        Consistency,
        Group,
        GroupMember,
        BalanceSummary,
        AnalyticsReport,
        CurrencyTotal,
        CategorySummary,
        MonthlySummary,
        WeekdaySummary,
        SpendingTrend,
        SortOption,
        StatusFilter,
        TimePeriod,
        ChatMessage,
        ChatRole,
        AppLog
    )),
    info(
        title = "Billshare API",
        description = "API for recording shared expenses, settling debts and getting spending advice",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
