use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Failure modes of a single store exchange. `Unavailable` covers transport
/// faults (connect, timeout); the rest are responses the store did send.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("schedule store unreachable: {0}")]
    Unavailable(String),

    #[error("store rejected a duplicate row: {0}")]
    UniqueViolation(String),

    #[error("store rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("malformed store payload: {0}")]
    Malformed(String),
}

pub struct StoreClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl StoreClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.store_url.clone(),
            api_key: config.store_api_key.clone(),
        }
    }

    fn get_headers(&self, prefer: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.api_key).unwrap());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(prefer_value) = prefer {
            headers.insert("Prefer", HeaderValue::from_str(prefer_value).unwrap());
        }

        headers
    }

    /// One request-response exchange with the store. Writes that want the
    /// affected rows back pass `Prefer: return=representation` so the row
    /// count is the length of the returned array.
    pub async fn request<T>(&self, method: Method, path: &str,
                            body: Option<Value>, prefer: Option<&str>)
                            -> Result<T, StoreError>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let headers = self.get_headers(prefer);

        let mut req = self.client.request(method, &url)
            .headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Store error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                409 => StoreError::UniqueViolation(error_text),
                _ => StoreError::Rejected { status: status.as_u16(), body: error_text },
            });
        }

        let data = response.json::<T>().await
            .map_err(|e| StoreError::Malformed(e.to_string()))?;
        Ok(data)
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}
