//! HTTP client wrapper for the backend
//!
//! Every request gets the current bearer token, the user id and an
//! `x-request-id` correlation header. A 401 from the backend clears the shared
//! credential store so the next caller sees an unauthenticated session.
//!
//! # Examples
//!
//! ```ignore
//! use backend_api::{ApiClient, ApiConfig, CredentialStore};
//!
//! let credentials = CredentialStore::shared();
//! credentials.set_token(token_from_identity_provider);
//! let client = ApiClient::new(ApiConfig::default(), credentials)?;
//! let page = client.applications().search(&Default::default()).await?;
//! ```

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::{
    config::ApiConfig,
    credentials::{Credentials, SharedCredentials},
    error::ApiError,
};

/// Header name for request correlation ID
pub const X_REQUEST_ID: &str = "x-request-id";

/// Header carrying the identity provider's user id
pub const X_USER_ID: &str = "x-user-id";

/// Backend API client
#[derive(Debug, Clone)]
pub struct ApiClient {
    inner: Client,
    config: ApiConfig,
    credentials: SharedCredentials,
}

impl ApiClient {
    /// Create a client sharing the given credential store
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client cannot be built.
    pub fn new(config: ApiConfig, credentials: SharedCredentials) -> Result<Self, ApiError> {
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ApiError::ConnectionFailed(e.to_string()))?;

        debug!(base_url = %config.base_url, "Initialized backend API client");

        Ok(Self {
            inner,
            config,
            credentials,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    #[must_use]
    pub const fn credentials(&self) -> &SharedCredentials {
        &self.credentials
    }

    /// Get a reference to the underlying reqwest client
    #[must_use]
    pub const fn inner(&self) -> &Client {
        &self.inner
    }

    /// Start a request with credentials and a fresh correlation ID attached
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .inner
            .request(method, self.config.url(path))
            .header(X_REQUEST_ID, Uuid::new_v4().to_string());
        authorize(builder, &self.credentials.snapshot())
    }

    #[instrument(skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::GET, path)).await?;
        decode(response).await
    }

    #[instrument(skip(self, query))]
    pub async fn get_json_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self
            .send(self.request(Method::GET, path).query(query))
            .await?;
        decode(response).await
    }

    #[instrument(skip(self, body))]
    pub async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self
            .send(self.request(Method::POST, path).json(body))
            .await?;
        decode(response).await
    }

    #[instrument(skip(self, body))]
    pub async fn put_json<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self
            .send(self.request(Method::PUT, path).json(body))
            .await?;
        decode(response).await
    }

    #[instrument(skip(self, body))]
    pub async fn patch_json<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self
            .send(self.request(Method::PATCH, path).json(body))
            .await?;
        decode(response).await
    }

    /// DELETE, ignoring any response body
    #[instrument(skip(self))]
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, path)).await?;
        Ok(())
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            debug!(status = %status, "Backend request succeeded");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(status = %status, "Backend request failed");

        Err(match status {
            StatusCode::UNAUTHORIZED => {
                self.credentials.clear();
                ApiError::Unauthorized
            },
            StatusCode::NOT_FOUND => ApiError::NotFound(error_message(&body, status)),
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited,
            _ => ApiError::ServerError {
                status: status.as_u16(),
                message: error_message(&body, status),
            },
        })
    }
}

/// Attach bearer token and user id headers from a credential snapshot
pub fn authorize(builder: RequestBuilder, credentials: &Credentials) -> RequestBuilder {
    let builder = match credentials.token() {
        Some(token) => builder.bearer_auth(token),
        None => builder,
    };
    match credentials.user_id() {
        Some(user_id) => builder.header(X_USER_ID, user_id),
        None => builder,
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::InvalidResponse(e.to_string()))
}

/// Best human-readable message from an error body
///
/// JSON bodies with `message`, `error` or `detail` strings use that field,
/// other bodies are used verbatim, empty bodies fall back to the status.
pub(crate) fn error_message(body: &str, status: StatusCode) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return format!("HTTP {}", status.as_u16());
    }
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str(trimmed) {
        for key in ["message", "error", "detail"] {
            if let Some(serde_json::Value::String(text)) = map.get(key) {
                return text.clone();
            }
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::CredentialStore;

    #[test]
    fn error_message_prefers_json_fields() {
        let status = StatusCode::BAD_REQUEST;
        assert_eq!(error_message(r#"{"message":"bad page"}"#, status), "bad page");
        assert_eq!(error_message(r#"{"detail":"nope"}"#, status), "nope");
        assert_eq!(error_message("plain failure\n", status), "plain failure");
        assert_eq!(error_message("  ", status), "HTTP 400");
        assert_eq!(error_message(r#"{"code":7}"#, status), r#"{"code":7}"#);
    }

    #[test]
    fn request_carries_credentials_and_correlation_id() {
        let store = CredentialStore::shared();
        store.set_token("tok");
        store.set_user_id("user-7");
        let client =
            ApiClient::new(ApiConfig::with_base_url("http://localhost:1/api"), store).unwrap();

        let request = client.request(Method::GET, "/users/me").build().unwrap();
        assert_eq!(request.url().as_str(), "http://localhost:1/api/users/me");
        assert_eq!(request.headers()["authorization"], "Bearer tok");
        assert_eq!(request.headers()[X_USER_ID], "user-7");
        assert!(request.headers().contains_key(X_REQUEST_ID));
    }

    #[test]
    fn anonymous_request_has_no_auth_headers() {
        let client = ApiClient::new(ApiConfig::default(), CredentialStore::shared()).unwrap();
        let request = client.request(Method::GET, "alerts").build().unwrap();
        assert!(!request.headers().contains_key("authorization"));
        assert!(!request.headers().contains_key(X_USER_ID));
    }

    #[test]
    fn client_debug() {
        let client = ApiClient::new(ApiConfig::default(), CredentialStore::shared()).unwrap();
        let debug = format!("{client:?}");
        assert!(debug.contains("ApiClient"));
    }
}
