//! Minimal client for the Sheets v4 `spreadsheets.values` API.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, Url};
use serde::{Deserialize, Serialize};

use super::SheetsError;
use super::auth::AccessTokenSource;

#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct ValueUpdate<'a> {
    values: &'a [Vec<String>],
}

pub struct SheetsClient {
    http: reqwest::Client,
    base_url: Url,
    spreadsheet_id: String,
    tokens: Arc<dyn AccessTokenSource>,
}

impl SheetsClient {
    pub fn new(
        base_url: &str,
        spreadsheet_id: impl Into<String>,
        tokens: Arc<dyn AccessTokenSource>,
        timeout: Duration,
    ) -> Result<Self, SheetsError> {
        let base_url = Url::parse(base_url).map_err(|e| SheetsError::Url(e.to_string()))?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url,
            spreadsheet_id: spreadsheet_id.into(),
            tokens,
        })
    }

    /// `<base>/v4/spreadsheets/<id>/values/<range><suffix>`
    fn values_url(&self, range: &str, suffix: &str) -> Result<Url, SheetsError> {
        let target = format!("{}{}", range, suffix);
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SheetsError::Url(self.base_url.to_string()))?
            .pop_if_empty()
            .extend([
                "v4",
                "spreadsheets",
                self.spreadsheet_id.as_str(),
                "values",
                target.as_str(),
            ]);
        Ok(url)
    }

    async fn request(&self, method: Method, url: Url) -> Result<RequestBuilder, SheetsError> {
        let token = self.tokens.access_token().await?;
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    async fn check(response: Response) -> Result<Response, SheetsError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        Err(SheetsError::Api {
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        })
    }

    /// Read a range as rows of formatted cell values. Trailing empty rows
    /// and cells are omitted by the API.
    pub async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        let url = self.values_url(range, "")?;
        let response = self.request(Method::GET, url).await?.send().await?;
        let body: ValueRange = Self::check(response).await?.json().await?;
        Ok(body.values)
    }

    /// Append rows after the last row of the table found in `range`.
    pub async fn append_rows(&self, range: &str, rows: &[Vec<String>]) -> Result<(), SheetsError> {
        let url = self.values_url(range, ":append")?;
        let response = self
            .request(Method::POST, url)
            .await?
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&ValueUpdate { values: rows })
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Overwrite the cells of `range`.
    pub async fn update_values(&self, range: &str, rows: &[Vec<String>]) -> Result<(), SheetsError> {
        let url = self.values_url(range, "")?;
        let response = self
            .request(Method::PUT, url)
            .await?
            .query(&[("valueInputOption", "RAW")])
            .json(&ValueUpdate { values: rows })
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
