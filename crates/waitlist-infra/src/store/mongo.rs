//! MongoDB subscriber store.
//!
//! A unique index on `email` makes the storage layer the authority on
//! duplicates, so concurrent inserts of the same address cannot both land.

use std::time::Duration;

use async_trait::async_trait;
use bson::doc;
use chrono::{DateTime, Utc};
use lazy_regex::regex_replace;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, IndexModel};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use waitlist_core::RepoError;
use waitlist_core::domain::{Subscriber, SubscriberEmail};
use waitlist_core::ports::SubscriberStore;

const DEFAULT_URL: &str = "mongodb://localhost:27017/falconlink";
const DEFAULT_DATABASE: &str = "falconlink";
const COLLECTION: &str = "emails";
const DUPLICATE_KEY: i32 = 11000;

/// MongoDB connection configuration.
#[derive(Debug)]
pub struct MongoConfig {
    /// Connection string, may embed credentials.
    pub url: SecretString,
    /// Database used when the connection string does not name one.
    pub default_database: String,
    pub server_selection_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            url: SecretString::from(DEFAULT_URL.to_string()),
            default_database: DEFAULT_DATABASE.to_string(),
            server_selection_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl MongoConfig {
    /// Load configuration from environment variables.
    ///
    /// `MONGODB_URL` wins over `MONGODB_URI`.
    pub fn from_env() -> Self {
        let url = std::env::var("MONGODB_URL")
            .or_else(|_| std::env::var("MONGODB_URI"))
            .unwrap_or_else(|_| DEFAULT_URL.to_string());

        Self {
            url: SecretString::from(url),
            ..Self::default()
        }
    }

    /// Connection string safe to log.
    pub fn redacted_url(&self) -> String {
        redact_connection_string(self.url.expose_secret())
    }
}

/// Replace `//user:password@` in a connection string with `//<credentials>@`.
pub fn redact_connection_string(url: &str) -> String {
    regex_replace!(r"//[^:]+:[^@]+@", url, "//<credentials>@").into_owned()
}

/// Stored document layout: `{email, createdAt, ipAddress?, userAgent?}`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriberDocument {
    email: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_agent: Option<String>,
}

impl From<&Subscriber> for SubscriberDocument {
    fn from(subscriber: &Subscriber) -> Self {
        Self {
            email: subscriber.email.as_str().to_string(),
            created_at: subscriber.created_at,
            ip_address: subscriber.ip_address.clone(),
            user_agent: subscriber.user_agent.clone(),
        }
    }
}

impl TryFrom<SubscriberDocument> for Subscriber {
    type Error = RepoError;

    fn try_from(document: SubscriberDocument) -> Result<Self, Self::Error> {
        let email = SubscriberEmail::parse(&document.email)
            .map_err(|e| RepoError::Query(format!("stored email is invalid: {}", e)))?;

        Ok(Self {
            email,
            created_at: document.created_at,
            ip_address: document.ip_address,
            user_agent: document.user_agent,
        })
    }
}

/// MongoDB-backed subscriber store.
pub struct MongoSubscriberStore {
    collection: Collection<SubscriberDocument>,
}

impl MongoSubscriberStore {
    /// Connect, verify the server answers a `ping`, and ensure the unique
    /// index on `email` exists.
    pub async fn connect(config: MongoConfig) -> Result<Self, mongodb::error::Error> {
        tracing::info!(url = %config.redacted_url(), "Connecting to MongoDB");

        let mut options = ClientOptions::parse(config.url.expose_secret()).await?;
        options.server_selection_timeout = Some(config.server_selection_timeout);
        options.connect_timeout = Some(config.connect_timeout);

        let database_name = options
            .default_database
            .clone()
            .unwrap_or(config.default_database);

        let client = Client::with_options(options)?;
        let database = client.database(&database_name);
        database.run_command(doc! { "ping": 1 }).await?;

        let collection = database.collection::<SubscriberDocument>(COLLECTION);
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        collection.create_index(index).await?;

        tracing::info!(database = %database_name, collection = COLLECTION, "MongoDB ready");

        Ok(Self { collection })
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => {
            write_error.code == DUPLICATE_KEY
        }
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY,
        _ => false,
    }
}

#[async_trait]
impl SubscriberStore for MongoSubscriberStore {
    fn is_connected(&self) -> bool {
        true
    }

    fn enforces_unique_email(&self) -> bool {
        true
    }

    async fn find_by_email(
        &self,
        email: &SubscriberEmail,
    ) -> Result<Option<Subscriber>, RepoError> {
        tracing::debug!(email = %email.masked(), "Finding subscriber by email");

        let document = self
            .collection
            .find_one(doc! { "email": email.as_str() })
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        document.map(Subscriber::try_from).transpose()
    }

    async fn insert(&self, subscriber: &Subscriber) -> Result<(), RepoError> {
        self.collection
            .insert_one(SubscriberDocument::from(subscriber))
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    RepoError::Constraint(format!("{} already exists", subscriber.email))
                } else {
                    RepoError::Query(e.to_string())
                }
            })?;

        Ok(())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        self.collection
            .count_documents(doc! {})
            .await
            .map_err(|e| RepoError::Query(e.to_string()))
    }
}
