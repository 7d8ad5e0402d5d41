//! Core HTTP operations against the catalog API
//!
//! This module provides the fundamental request operations shared by every
//! endpoint. Requests are single-attempt: a failure surfaces immediately to
//! the caller, which owns the decision of what to present or retry. Error
//! statuses always carry the response body so the API's own message is never
//! lost.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::errors::{ApiError, ApiResult, ErrorBody};

/// HTTP operations handler owning the shared connection pool
#[derive(Debug)]
pub struct HttpHandler {
    client: Client,
}

impl HttpHandler {
    /// Creates a new HttpHandler around a configured client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetches a URL and deserializes the JSON response body
    ///
    /// The bearer token, when given, is attached to this one request
    /// builder and nowhere else. The shared client never holds
    /// credentials, so concurrent calls with different tokens cannot
    /// observe each other's authorization header.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to fetch
    /// * `token` - Optional bearer token for this request only
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` for any response status >= 400, carrying
    /// the classified response body; `ApiError::Http` for transport and
    /// decode failures
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        token: Option<&str>,
    ) -> ApiResult<T> {
        let response = self.send(url, token).await?;
        let payload = response.json::<T>().await?;
        tracing::debug!("Fetched {}", url);
        Ok(payload)
    }

    /// Fetches a URL and returns the response body as text
    ///
    /// # Errors
    ///
    /// Same error contract as [`get_json`](Self::get_json)
    pub async fn get_text(&self, url: &Url, token: Option<&str>) -> ApiResult<String> {
        let response = self.send(url, token).await?;
        let text = response.text().await?;
        tracing::debug!("Fetched {}", url);
        Ok(text)
    }

    /// Performs the single GET attempt and rejects error statuses
    async fn send(&self, url: &Url, token: Option<&str>) -> ApiResult<Response> {
        let mut request = self.client.get(url.as_str());
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        Self::reject_error_status(response).await
    }

    /// Turns any status >= 400 into `ApiError::Status` with the body kept
    async fn reject_error_status(response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.as_u16() < 400 {
            return Ok(response);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let url = response.url().clone();
        let bytes = response.bytes().await.unwrap_or_default();
        let body = ErrorBody::from_parts(content_type.as_deref(), &bytes);

        tracing::warn!("Request to {} failed with HTTP {}", url, status);
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::client::config::ClientConfig;

    #[test]
    fn test_http_handler_creation() {
        let config = ClientConfig::default();
        let client = config.build_http_client().unwrap();
        let _handler = HttpHandler::new(client);
    }
}
