//! The two cloud REST dialects and their shared HTTP plumbing.
//!
//! Framing, retries, and rate limiting are deliberately not part of the
//! core contract; the client below only builds JSON requests and surfaces
//! failures verbatim.

pub mod developer;
pub mod platform;

use std::time::Duration;

use log::debug;
use serde_json::Value;

use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

/// Both dialects authenticate with the same header.
const API_KEY_HEADER: &str = "govee-api-key";

/// Thin JSON-over-HTTP client with an API-key default header.
pub(crate) struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let mut value = reqwest::header::HeaderValue::from_str(api_key)
            .map_err(|_| Error::Config("API key contains invalid header characters".into()))?;
        value.set_sensitive(true);

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(API_KEY_HEADER, value);

        let http = reqwest::Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::http("build client", e))?;

        Ok(ApiClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {url}");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::http("get", e))?;
        Self::parse(resp).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!("PUT {url}");

        let resp = self
            .http
            .put(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::http("put", e))?;
        Self::parse(resp).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {url}");

        let resp = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::http("post", e))?;
        Self::parse(resp).await
    }

    async fn parse(resp: reqwest::Response) -> Result<Value> {
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| Error::http("read body", e))?;

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        serde_json::from_str(&body).map_err(Error::JsonLoad)
    }
}
