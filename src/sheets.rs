//! Google Sheets storage adapter.
//!
//! Talks straight to the Sheets v4 REST API. Each append authenticates with
//! a service-account JWT (RS256, signed with the key from the deployment
//! configuration), confirms the spreadsheet is reachable, lazily writes the
//! header row if the sheet is still blank, and appends the record's cells.
//!
//! Ranges deliberately omit the sheet name: the API then targets the first
//! visible sheet, which is where the study team expects the rows, and it
//! keeps the URLs free of characters that would need escaping.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use lambda_http::tracing;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::SheetsConfig;
use crate::record::SurveyResponse;
use crate::storage::Storage;

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Access tokens are requested with the maximum lifetime Google allows;
/// each Lambda invocation requests a fresh one anyway.
const TOKEN_LIFETIME_SECS: i64 = 3600;

pub struct SheetsStorage {
    http: reqwest::Client,
    config: SheetsConfig,
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct SpreadsheetInfo {
    properties: SpreadsheetProperties,
}

#[derive(Deserialize)]
struct SpreadsheetProperties {
    title: String,
}

#[derive(Deserialize, Default)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

impl SheetsStorage {
    pub fn new(config: SheetsConfig) -> Self {
        SheetsStorage {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Exchange a signed service-account assertion for a bearer token.
    async fn access_token(&self) -> Result<String> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            iss: &self.config.service_account_email,
            scope: SHEETS_SCOPE,
            aud: TOKEN_URL,
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        };

        let key = EncodingKey::from_rsa_pem(self.config.private_key.as_bytes())
            .context("service-account private key is not a valid RSA PEM key")?;
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &key)
            .context("failed to sign service-account JWT")?;

        let resp = self
            .http
            .post(TOKEN_URL)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .context("token endpoint unreachable")?;

        let status = resp.status();
        if !status.is_success() {
            bail!(
                "token exchange failed: HTTP {status}: {}",
                resp.text().await.unwrap_or_default()
            );
        }

        let token: TokenResponse = resp.json().await.context("malformed token response")?;
        Ok(token.access_token)
    }

    /// Fetch the spreadsheet title. Serves as the auth-and-reachability
    /// check before we start writing.
    async fn connect(&self, token: &str) -> Result<String> {
        let url = format!(
            "{API_BASE}/{}?fields=properties.title",
            self.config.sheet_id
        );

        let info: SpreadsheetInfo = self
            .get_json(token, &url)
            .await
            .context("failed to load spreadsheet info")?;
        Ok(info.properties.title)
    }

    /// Write the header row if row 1 of the first sheet is still empty.
    async fn ensure_header_row(&self, token: &str) -> Result<()> {
        let url = format!("{API_BASE}/{}/values/1:1", self.config.sheet_id);

        let header: ValueRange = self
            .get_json(token, &url)
            .await
            .context("failed to read header row")?;
        if !header.values.is_empty() {
            return Ok(());
        }

        let url = format!(
            "{API_BASE}/{}/values/1:1?valueInputOption=RAW",
            self.config.sheet_id
        );
        let body = json!({
            "range": "1:1",
            "majorDimension": "ROWS",
            "values": [SurveyResponse::columns()],
        });

        let resp = self
            .http
            .put(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .context("failed to write header row")?;
        self.check_status(resp, "header write").await?;

        tracing::info!("created header row");
        Ok(())
    }

    /// Append the record under whatever table starts at A1.
    async fn append_row(&self, token: &str, record: &SurveyResponse) -> Result<()> {
        let url = format!(
            "{API_BASE}/{}/values/A1:append?valueInputOption=RAW",
            self.config.sheet_id
        );
        let body = json!({
            "majorDimension": "ROWS",
            "values": [record.values()],
        });

        let resp = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .context("failed to append row")?;
        self.check_status(resp, "row append").await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, token: &str, url: &str) -> Result<T> {
        let resp = self.http.get(url).bearer_auth(token).send().await?;

        let status = resp.status();
        if !status.is_success() {
            bail!(
                "Sheets API returned HTTP {status}: {}",
                resp.text().await.unwrap_or_default()
            );
        }

        Ok(resp.json().await?)
    }

    async fn check_status(&self, resp: reqwest::Response, what: &str) -> Result<()> {
        let status = resp.status();
        if !status.is_success() {
            bail!(
                "{what} failed: HTTP {status}: {}",
                resp.text().await.unwrap_or_default()
            );
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for SheetsStorage {
    async fn append(&self, record: &SurveyResponse) -> Result<String> {
        let token = self.access_token().await?;

        let title = self.connect(&token).await?;
        tracing::info!(spreadsheet = %title, "connected to Google Sheet");

        self.ensure_header_row(&token).await?;
        self.append_row(&token, record).await?;

        tracing::info!(id = %record.id, "survey response saved to Google Sheets");
        Ok(record.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The network paths are exercised against the real API; these only pin
    // down the header-presence check on the wire format the API returns.

    #[test]
    fn empty_value_range_means_no_header() {
        let empty: ValueRange = serde_json::from_str(r#"{"range": "Sheet1!1:1"}"#).unwrap();
        assert!(empty.values.is_empty());

        let populated: ValueRange =
            serde_json::from_str(r#"{"range": "Sheet1!1:1", "values": [["Časovni_žig", "ID"]]}"#)
                .unwrap();
        assert!(!populated.values.is_empty());
    }
}
