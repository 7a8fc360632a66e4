//! HTTP client for the Sheets v4 `values` endpoints.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::auth::{ServiceAccountKey, TokenProvider};
use super::error::SheetsError;
use super::range::SheetRange;
use super::{Cells, SheetStore};

/// Base URL for the spreadsheets API.
const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets/";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: GoogleErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorDetail {
    message: String,
}

/// Reads and writes ranges of one spreadsheet on behalf of a service account.
pub struct SheetsClient {
    http: Client,
    base_url: Url,
    spreadsheet_id: Option<String>,
    tokens: TokenProvider,
}

impl SheetsClient {
    /// Creates a client for `spreadsheet_id`. Either argument may be absent; the
    /// resulting failures surface per request.
    pub fn new(
        spreadsheet_id: Option<String>,
        key: Option<ServiceAccountKey>,
    ) -> Result<Self, SheetsError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            tokens: TokenProvider::new(http.clone(), key),
            http,
            base_url: Url::parse(SHEETS_BASE_URL)?,
            spreadsheet_id,
        })
    }

    /// Builds `.../spreadsheets/{id}/values/{range}{suffix}` with each segment escaped.
    fn values_url(&self, range: &SheetRange, suffix: &str) -> Result<Url, SheetsError> {
        let id = self
            .spreadsheet_id
            .as_deref()
            .ok_or(SheetsError::NotConfigured)?;

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SheetsError::Network {
                message: format!("{} cannot be a base URL", self.base_url),
            })?
            .pop_if_empty()
            .push(id)
            .push("values")
            .push(&format!("{range}{suffix}"));

        Ok(url)
    }

    /// Turns a non-success response into [`SheetsError::Api`], preferring Google's own message.
    async fn check_status(response: Response) -> Result<Response, SheetsError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(SheetsError::Api {
            status,
            message: google_error_message(body),
        })
    }
}

#[async_trait]
impl SheetStore for SheetsClient {
    fn spreadsheet_id(&self) -> Option<&str> {
        self.spreadsheet_id.as_deref()
    }

    async fn read_range(&self, range: &SheetRange) -> Result<Cells, SheetsError> {
        let url = self.values_url(range, "")?;
        debug!(range = %range, "Reading range");

        let token = self.tokens.access_token().await?;
        let response = self.http.get(url).bearer_auth(token).send().await?;
        let body: ValueRange = Self::check_status(response).await?.json().await?;

        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    async fn append_row(&self, range: &SheetRange, row: Vec<Value>) -> Result<(), SheetsError> {
        let mut url = self.values_url(range, ":append")?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "INSERT_ROWS");
        debug!(range = %range, "Appending row");

        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&json!({ "values": [row] }))
            .send()
            .await?;
        Self::check_status(response).await?;

        Ok(())
    }

    async fn update_range(
        &self,
        range: &SheetRange,
        rows: Vec<Vec<Value>>,
    ) -> Result<(), SheetsError> {
        let mut url = self.values_url(range, "")?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED");
        debug!(range = %range, "Updating range");

        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .put(url)
            .bearer_auth(token)
            .json(&json!({ "values": rows }))
            .send()
            .await?;
        Self::check_status(response).await?;

        Ok(())
    }
}

/// Pulls `error.message` out of a Google error body, falling back to the raw text.
fn google_error_message(body: String) -> String {
    serde_json::from_str::<GoogleErrorBody>(&body)
        .map(|b| b.error.message)
        .unwrap_or(body)
}

/// Cells normally come back as formatted strings; anything else is kept as its JSON text.
pub(super) fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_url_escapes_range() {
        let client = SheetsClient::new(Some("sheet123".to_string()), None).unwrap();
        let url = client
            .values_url(&SheetRange::new("My Tab", "A:E"), ":append")
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/sheet123/values/'My%20Tab'!A:E:append"
        );
    }

    #[test]
    fn test_values_url_requires_id() {
        let client = SheetsClient::new(None, None).unwrap();
        assert!(matches!(
            client.values_url(&SheetRange::new("Course", "A1:ZZ999"), ""),
            Err(SheetsError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_read_without_id_skips_network() {
        let client = SheetsClient::new(None, None).unwrap();
        let err = client
            .read_range(&SheetRange::new("Course", "A1:ZZ999"))
            .await
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(json!("x")), "x");
        assert_eq!(cell_text(json!(3)), "3");
        assert_eq!(cell_text(Value::Null), "");
    }

    #[test]
    fn test_google_error_message_extracted() {
        let body = json!({
            "error": {
                "code": 400,
                "message": "Unable to parse range: 'Nope'!A:E",
                "status": "INVALID_ARGUMENT"
            }
        })
        .to_string();
        assert_eq!(google_error_message(body), "Unable to parse range: 'Nope'!A:E");
    }

    #[test]
    fn test_google_error_message_falls_back_to_body() {
        assert_eq!(google_error_message("Bad Gateway".to_string()), "Bad Gateway");
        assert_eq!(google_error_message(String::new()), "");
        assert_eq!(
            google_error_message(r#"{"error":"invalid_grant"}"#.to_string()),
            r#"{"error":"invalid_grant"}"#
        );
    }
}
