//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use waitlist_infra::RateLimitConfig;
#[cfg(feature = "mongo")]
use waitlist_infra::MongoConfig;
#[cfg(feature = "sheets")]
use waitlist_infra::SheetsConfig;

/// Which subscriber store to run against.
#[derive(Debug)]
pub enum StoreBackend {
    #[cfg(feature = "mongo")]
    Mongo(MongoConfig),
    #[cfg(feature = "sheets")]
    Sheets(SheetsConfig),
    Memory,
    /// The selection cannot be served by this build or configuration.
    Unavailable {
        backend: &'static str,
        reason: String,
    },
}

impl StoreBackend {
    /// `STORE_BACKEND` wins; otherwise sheets when `SPREADSHEET_ID` is set,
    /// else mongo.
    pub fn from_env() -> Self {
        let selected = env::var("STORE_BACKEND")
            .map(|v| v.trim().to_lowercase())
            .unwrap_or_else(|_| {
                if env::var("SPREADSHEET_ID").is_ok() {
                    "sheets".to_string()
                } else {
                    "mongo".to_string()
                }
            });

        match selected.as_str() {
            "memory" => StoreBackend::Memory,
            "mongo" | "mongodb" => Self::mongo(),
            "sheets" | "google-sheets" => Self::sheets(),
            other => StoreBackend::Unavailable {
                backend: "unknown",
                reason: format!("unknown STORE_BACKEND '{}'", other),
            },
        }
    }

    #[cfg(feature = "mongo")]
    fn mongo() -> Self {
        StoreBackend::Mongo(MongoConfig::from_env())
    }

    #[cfg(not(feature = "mongo"))]
    fn mongo() -> Self {
        StoreBackend::Unavailable {
            backend: "mongo",
            reason: "built without the mongo feature".to_string(),
        }
    }

    #[cfg(feature = "sheets")]
    fn sheets() -> Self {
        match SheetsConfig::from_env() {
            Some(config) => StoreBackend::Sheets(config),
            None => StoreBackend::Unavailable {
                backend: "sheets",
                reason: "SPREADSHEET_ID is not set".to_string(),
            },
        }
    }

    #[cfg(not(feature = "sheets"))]
    fn sheets() -> Self {
        StoreBackend::Unavailable {
            backend: "sheets",
            reason: "built without the sheets feature".to_string(),
        }
    }
}

/// Application configuration.
#[derive(Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreBackend,
    pub rate_limit: RateLimitConfig,
    /// Shared rate limit counters; in-process counters when unset.
    pub redis_url: Option<String>,
    /// Take the client address from `Forwarded` / `X-Forwarded-For`.
    pub trust_proxy: bool,
    pub static_dir: PathBuf,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            store: StoreBackend::from_env(),
            rate_limit: RateLimitConfig::from_env(),
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            trust_proxy: env::var("TRUST_PROXY")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            static_dir: env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("public")),
        }
    }
}
