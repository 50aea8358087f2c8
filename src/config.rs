use dotenv::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::fmt;
use std::path::PathBuf;

pub struct Config {
    pub port: u16,
    pub log_level: String,
    pub default_currency: String,
    /// JSON file backing the session store. Unset keeps the session in memory.
    pub session_store_path: Option<PathBuf>,
    pub transcription_max_attempts: u32,
    pub transcription_poll_interval_ms: u64,
    pub voice_output: bool,
    /// Canned advisor table used by the chat: `financial` or `ledger`.
    pub advisor: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("default_currency", &self.default_currency)
            .field(
                "session_store_path",
                &self.session_store_path.as_ref().map(|_| "<redacted>"),
            )
            .field("transcription_max_attempts", &self.transcription_max_attempts)
            .field("transcription_poll_interval_ms", &self.transcription_poll_interval_ms)
            .field("voice_output", &self.voice_output)
            .field("advisor", &self.advisor)
            .finish()
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    fn from_env() -> Self {
        dotenv().ok();

        Self {
            port: env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(3000),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            default_currency: env::var("DEFAULT_CURRENCY")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| "USD".to_string()),
            session_store_path: env::var("SESSION_STORE_PATH")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            transcription_max_attempts: env::var("TRANSCRIPTION_MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            transcription_poll_interval_ms: env::var("TRANSCRIPTION_POLL_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            voice_output: env::var("VOICE_OUTPUT")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(false),
            advisor: env::var("ADVISOR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| "financial".to_string()),
        }
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);
