//! HTTP client for the issuance ERP REST API.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::{
    query::{PaymentQuery, Query},
    types::{decode_list, PaymentRecord, VehicleRecord},
    Error,
};

const PAYMENTS_PATH: &str = "/api/payments";
const SYRIAN_VEHICLES_PATH: &str = "/api/vehicles/syrian";
const FOREIGN_VEHICLES_PATH: &str = "/api/vehicles/foreign";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the issuance ERP REST API.
///
/// The bearer token is handed in by the caller; the client never looks it
/// up on its own. Requests without a token are sent unauthenticated.
pub struct Client {
    http: reqwest::Client,
    /// Base URL for the API, without a trailing slash.
    base_api_url: String,
    token: Option<String>,
}

impl Client {
    /// Creates a client for `base_url` with the default timeout.
    pub fn new(base_url: &str) -> Result<Self, Error> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Creates a client for `base_url` with a custom request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::RequestFailed
            })?;
        Ok(Self {
            http,
            base_api_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Attaches a bearer token to every subsequent request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_api_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn get_url(&self, path: &str, query: Option<&impl Query>) -> Result<Url, Error> {
        let url = Url::parse(format!("{}{}", &self.base_api_url, path).as_str()).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            Error::InvalidUrl(format!("{}{}", &self.base_api_url, path))
        })?;
        Ok(match query {
            Some(query) => query.add_to_url(&url),
            None => url,
        })
    }

    async fn get_json(&self, url: Url) -> Result<Value, Error> {
        tracing::debug!("GET {}", url);
        let mut request = self
            .http
            .get(url)
            .header("accept", "application/json, text/plain, */*");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let resp = request.send().await.map_err(|e| {
            tracing::error!("Failed to get resource: {}", e);
            Error::RequestFailed
        })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::RequestFailed
        })?;

        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::error!("Request failed with status {}: {}", status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        serde_json::from_str::<Value>(&body).map_err(|e| {
            let snippet = truncate_body(&body);
            tracing::error!("Failed to parse resource: {} | body: {}", e, snippet);
            Error::RequestFailed
        })
    }

    async fn get_list<T, Q>(&self, path: &str, query: Option<&Q>) -> Result<Vec<T>, Error>
    where
        T: DeserializeOwned,
        Q: Query,
    {
        let url = self.get_url(path, query)?;
        let body = self.get_json(url).await?;
        Ok(decode_list(body))
    }

    /// Fetches payments matching the given query, unwrapped from their envelope.
    pub async fn get_payments(&self, query: &PaymentQuery) -> Result<Vec<PaymentRecord>, Error> {
        self.get_list::<PaymentRecord, PaymentQuery>(PAYMENTS_PATH, Some(query))
            .await
    }

    /// Fetches the domestic vehicle registry.
    pub async fn get_syrian_vehicles(&self) -> Result<Vec<VehicleRecord>, Error> {
        self.get_list::<VehicleRecord, PaymentQuery>(SYRIAN_VEHICLES_PATH, None)
            .await
    }

    /// Fetches the foreign vehicle registry.
    pub async fn get_foreign_vehicles(&self) -> Result<Vec<VehicleRecord>, Error> {
        self.get_list::<VehicleRecord, PaymentQuery>(FOREIGN_VEHICLES_PATH, None)
            .await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = Client::new("http://localhost:5000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
        assert!(!client.has_token());
    }

    #[test]
    fn token_is_attached() {
        let client = Client::new("http://localhost:5000").unwrap().with_token("abc");
        assert!(client.has_token());
    }

    #[test]
    fn invalid_base_url_is_reported() {
        let client = Client::new("not a url").unwrap();
        let err = client
            .get_url(PAYMENTS_PATH, None::<&PaymentQuery>)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let body = "ب".repeat(1500);
        let out = truncate_body(&body);
        assert!(out.ends_with("...[truncated]"));
    }
}
