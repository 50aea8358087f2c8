use axum::{Router, http::header, routing::get};
use billshare::{
    api::{
        handlers::{AppState, api_routes},
        openapi::ApiDoc,
    },
    config::CONFIG,
    core::{advisor::CannedAdvisor, chat::ChatSession, services::LedgerService, session::AppContext},
    infrastructure::{
        kv::{KeyValueStore, file::FileKeyValueStore, in_memory::InMemoryKeyValueStore},
        logging::in_memory::InMemoryLogging,
        speech::{
            in_memory::{InMemorySynthesizer, OfflineTranscriptionBackend},
            polling::PollingTranscriber,
        },
        storage::in_memory::InMemoryRealtimeStore,
    },
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(CONFIG.log_level.as_str())
        .init();
    info!("Starting with {:?}", *CONFIG);

    let kv: Box<dyn KeyValueStore> = match &CONFIG.session_store_path {
        Some(path) => Box::new(FileKeyValueStore::open(path)?),
        None => Box::new(InMemoryKeyValueStore::new()),
    };
    let session = Arc::new(AppContext::load(kv)?);

    let ledger = Arc::new(LedgerService::new(
        InMemoryRealtimeStore::new(),
        InMemoryLogging::new(),
        CONFIG.default_currency.clone(),
    ));
    let _subscriptions = ledger.subscribe().await?;
    if let Some(user) = session.current_user().await {
        ledger.load_for(&user).await;
    }

    let transcriber = PollingTranscriber::new(
        OfflineTranscriptionBackend,
        CONFIG.transcription_max_attempts,
        Duration::from_millis(CONFIG.transcription_poll_interval_ms),
    );
    let advisor = CannedAdvisor::by_name(&CONFIG.advisor).unwrap_or_else(|| {
        warn!("Unknown advisor `{}`, using the financial advisor", CONFIG.advisor);
        CannedAdvisor::financial()
    });
    let chat = ChatSession::new(Arc::new(advisor))
        .with_transcriber(Arc::new(transcriber))
        .with_synthesizer(Arc::new(InMemorySynthesizer::new()), CONFIG.voice_output);

    let state = AppState {
        ledger,
        session,
        chat: Arc::new(chat),
    };

    let app = Router::new()
        .route("/", get(|| async { "OK" }))
        .nest("/api", api_routes(state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    http::Method::GET,
                    http::Method::POST,
                    http::Method::PATCH,
                    http::Method::PUT,
                    http::Method::DELETE,
                ])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([127, 0, 0, 1], CONFIG.port));
    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
