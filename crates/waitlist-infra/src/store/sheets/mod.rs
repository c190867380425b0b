//! Google Sheets subscriber store.
//!
//! The sheet is used as a two-column table: `Email` in column A and
//! `DateTime` in column B, with the header in row 1. There is no index and
//! no uniqueness constraint, so `insert` relies on the caller checking
//! `find_by_email` first.

mod auth;
mod client;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};

use waitlist_core::RepoError;
use waitlist_core::domain::{Subscriber, SubscriberEmail};
use waitlist_core::ports::SubscriberStore;

pub use auth::{AccessTokenSource, ServiceAccountKey, ServiceAccountTokenSource, StaticToken};
pub use client::SheetsClient;

const HEADER: [&str; 2] = ["Email", "DateTime"];
const DEFAULT_API_URL: &str = "https://sheets.googleapis.com";

/// Errors raised while talking to Google.
#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
    #[error("Credentials error: {0}")]
    Credentials(String),

    #[error("Failed to sign token assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sheets API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid Sheets API URL: {0}")]
    Url(String),
}

impl From<SheetsError> for RepoError {
    fn from(err: SheetsError) -> Self {
        RepoError::Query(err.to_string())
    }
}

/// Google Sheets store configuration.
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    /// Path to the service-account key file.
    pub credentials_path: PathBuf,
    /// Tab holding the table.
    pub sheet_name: String,
    pub api_base_url: String,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
}

impl SheetsConfig {
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            credentials_path: PathBuf::from("credentials.json"),
            sheet_name: "Sheet1".to_string(),
            api_base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Load configuration from environment variables.
    /// Returns `None` when `SPREADSHEET_ID` is not set.
    pub fn from_env() -> Option<Self> {
        let spreadsheet_id = std::env::var("SPREADSHEET_ID").ok()?;
        let defaults = Self::new(spreadsheet_id);

        Some(Self {
            credentials_path: std::env::var("GOOGLE_CREDENTIALS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.credentials_path.clone()),
            sheet_name: std::env::var("SHEET_NAME").unwrap_or(defaults.sheet_name.clone()),
            api_base_url: std::env::var("SHEETS_API_URL")
                .unwrap_or(defaults.api_base_url.clone()),
            timeout: Duration::from_secs(
                std::env::var("SHEETS_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
            ..defaults
        })
    }
}

/// Subscriber store on top of a Google spreadsheet.
pub struct SheetsSubscriberStore {
    client: SheetsClient,
    sheet_name: String,
}

impl SheetsSubscriberStore {
    /// Load the service-account key, authenticate, and verify the sheet.
    pub async fn connect(config: SheetsConfig) -> Result<Self, SheetsError> {
        tracing::info!(
            spreadsheet_id = %config.spreadsheet_id,
            sheet = %config.sheet_name,
            credentials = %config.credentials_path.display(),
            "Connecting to Google Sheets"
        );

        let key = ServiceAccountKey::from_file(&config.credentials_path).await?;
        let tokens = Arc::new(ServiceAccountTokenSource::new(key, config.timeout)?);

        Self::connect_with(config, tokens).await
    }

    /// Verify the sheet with an explicit token source.
    ///
    /// Reads the header row once; writes it if the sheet is empty.
    pub async fn connect_with(
        config: SheetsConfig,
        tokens: Arc<dyn AccessTokenSource>,
    ) -> Result<Self, SheetsError> {
        let client = SheetsClient::new(
            &config.api_base_url,
            config.spreadsheet_id,
            tokens,
            config.timeout,
        )?;

        let store = Self {
            client,
            sheet_name: config.sheet_name,
        };
        store.ensure_header().await?;

        Ok(store)
    }

    /// A1 range on the configured tab, quoting the tab name when needed.
    fn range(&self, cells: &str) -> String {
        if self.sheet_name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            format!("{}!{}", self.sheet_name, cells)
        } else {
            format!("'{}'!{}", self.sheet_name.replace('\'', "''"), cells)
        }
    }

    async fn ensure_header(&self) -> Result<(), SheetsError> {
        let range = self.range("A1:B1");
        let rows = self.client.get_values(&range).await?;

        if rows.iter().all(|row| row.is_empty()) {
            tracing::info!(sheet = %self.sheet_name, "Writing header row");
            let header: Vec<Vec<String>> = vec![HEADER.iter().map(|h| h.to_string()).collect()];
            self.client.update_values(&range, &header).await?;
        }

        Ok(())
    }
}

fn parse_created_at(cell: Option<&String>) -> DateTime<Utc> {
    cell.and_then(|value| DateTime::parse_from_rfc3339(value).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

#[async_trait]
impl SubscriberStore for SheetsSubscriberStore {
    fn is_connected(&self) -> bool {
        true
    }

    fn enforces_unique_email(&self) -> bool {
        false
    }

    async fn find_by_email(
        &self,
        email: &SubscriberEmail,
    ) -> Result<Option<Subscriber>, RepoError> {
        let rows = self.client.get_values(&self.range("A:B")).await?;

        let found = rows.iter().skip(1).find(|row| {
            row.first()
                .and_then(|cell| SubscriberEmail::parse(cell).ok())
                .is_some_and(|stored| &stored == email)
        });

        Ok(found.map(|row| Subscriber {
            email: email.clone(),
            created_at: parse_created_at(row.get(1)),
            ip_address: None,
            user_agent: None,
        }))
    }

    async fn insert(&self, subscriber: &Subscriber) -> Result<(), RepoError> {
        let row = vec![
            subscriber.email.as_str().to_string(),
            subscriber
                .created_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        ];

        self.client.append_rows(&self.range("A:B"), &[row]).await?;
        Ok(())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        let rows = self.client.get_values(&self.range("A:A")).await?;
        // Row 1 is the header; an entirely empty sheet has no header either.
        Ok(rows.len().saturating_sub(1) as u64)
    }
}
