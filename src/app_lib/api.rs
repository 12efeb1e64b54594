//! HTTP helpers for the identity API with consistent timeouts and error
//! handling. Feature clients go through [`ApiClient`] so every request gets the
//! same timeout policy, user agent and error mapping. Bearer tokens are
//! attached from caller-supplied secrets and never logged.

use super::{config::ConsoleConfig, errors::ConsoleError};
use reqwest::{Client, Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, instrument};

/// Maximum number of error body characters surfaced to the operator.
const MAX_ERROR_CHARS: usize = 200;

/// Error payload shape used by the backend: `{ "error", "message", "code" }`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Human readable reason, preferring `error` over `message`.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.error
            .as_deref()
            .or(self.message.as_deref())
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
    }

    #[must_use]
    pub fn has_code(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
    }
}

/// Failure of a single API call, before it is mapped to a domain error.
#[derive(Clone, Debug)]
pub enum ApiFailure {
    Transport(ConsoleError),
    Rejected { status: u16, body: ErrorBody, raw: String },
}

impl ApiFailure {
    /// Maps a refusal to `Http` with the server's reason, or `fallback` when the
    /// body carries none.
    #[must_use]
    pub fn or_reason(self, fallback: &str) -> ConsoleError {
        match self {
            Self::Rejected { status, body, .. } => ConsoleError::Http {
                status,
                message: body.reason().unwrap_or(fallback).to_string(),
            },
            Self::Transport(err) => err,
        }
    }
}

impl From<ApiFailure> for ConsoleError {
    fn from(failure: ApiFailure) -> Self {
        match failure {
            ApiFailure::Transport(err) => err,
            ApiFailure::Rejected { status, body, raw } => ConsoleError::Http {
                status,
                message: body
                    .reason()
                    .map_or_else(|| sanitize_body(&raw), sanitize_body),
            },
        }
    }
}

/// Thin wrapper around `reqwest::Client` bound to the configured API base URL.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Builds a client with the configured request timeout.
    ///
    /// # Errors
    /// Returns `ConsoleError::Config` if the HTTP client cannot be initialized.
    pub fn new(config: &ConsoleConfig) -> Result<Self, ConsoleError> {
        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(config.request_timeout())
            .build()
            .map_err(|err| ConsoleError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: config.api_base_url().to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        build_url_with_base(&self.base_url, path)
    }

    /// GET a JSON document.
    ///
    /// # Errors
    /// Returns `ApiFailure` on transport failure, non-2xx status or bad JSON.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        bearer: Option<&SecretString>,
    ) -> Result<T, ApiFailure> {
        let request = self.request(Method::GET, path, bearer);
        let response = send(request).await?;
        handle_json_response(response).await
    }

    /// GET a JSON document with query parameters.
    ///
    /// # Errors
    /// Returns `ApiFailure` on transport failure, non-2xx status or bad JSON.
    pub async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        bearer: Option<&SecretString>,
    ) -> Result<T, ApiFailure> {
        let request = self.request(Method::GET, path, bearer).query(query);
        let response = send(request).await?;
        handle_json_response(response).await
    }

    /// POST a JSON body and parse a JSON response.
    ///
    /// # Errors
    /// Returns `ApiFailure` on transport failure, non-2xx status or bad JSON.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&SecretString>,
    ) -> Result<T, ApiFailure> {
        let request = self.request(Method::POST, path, bearer).json(body);
        let response = send(request).await?;
        handle_json_response(response).await
    }

    /// POST a JSON body with extra headers, ignoring the response body.
    ///
    /// # Errors
    /// Returns `ApiFailure` on transport failure or non-2xx status.
    pub async fn post_json_with_headers<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        headers: &[(&str, &str)],
    ) -> Result<(), ApiFailure> {
        let mut request = self.request(Method::POST, path, None).json(body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let response = send(request).await?;
        handle_empty_response(response).await
    }

    /// PUT a JSON body and parse a JSON response.
    ///
    /// # Errors
    /// Returns `ApiFailure` on transport failure, non-2xx status or bad JSON.
    pub async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&SecretString>,
    ) -> Result<T, ApiFailure> {
        let request = self.request(Method::PUT, path, bearer).json(body);
        let response = send(request).await?;
        handle_json_response(response).await
    }

    /// PUT an empty JSON object, ignoring the response body.
    ///
    /// # Errors
    /// Returns `ApiFailure` on transport failure or non-2xx status.
    pub async fn put_empty(
        &self,
        path: &str,
        bearer: Option<&SecretString>,
    ) -> Result<(), ApiFailure> {
        let request = self
            .request(Method::PUT, path, bearer)
            .json(&serde_json::json!({}));
        let response = send(request).await?;
        handle_empty_response(response).await
    }

    /// DELETE a resource, ignoring the response body.
    ///
    /// # Errors
    /// Returns `ApiFailure` on transport failure or non-2xx status.
    pub async fn delete(&self, path: &str, bearer: Option<&SecretString>) -> Result<(), ApiFailure> {
        let request = self.request(Method::DELETE, path, bearer);
        let response = send(request).await?;
        handle_empty_response(response).await
    }

    /// DELETE a resource and parse a JSON response.
    ///
    /// # Errors
    /// Returns `ApiFailure` on transport failure, non-2xx status or bad JSON.
    pub async fn delete_json<T: DeserializeOwned>(
        &self,
        path: &str,
        bearer: Option<&SecretString>,
    ) -> Result<T, ApiFailure> {
        let request = self.request(Method::DELETE, path, bearer);
        let response = send(request).await?;
        handle_json_response(response).await
    }

    #[instrument(skip(self, bearer), fields(authenticated = bearer.is_some()))]
    fn request(&self, method: Method, path: &str, bearer: Option<&SecretString>) -> RequestBuilder {
        let url = self.url(path);
        debug!("{method} {url}");
        let builder = self.client.request(method, url);
        match bearer {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }
}

/// Builds a URL from an explicit base URL and the provided path.
fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

/// Validates an identifier before it is placed in a URL path.
pub(crate) fn path_id(id: &str, what: &str) -> Result<String, ConsoleError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(ConsoleError::Validation(format!("{what} id is required.")));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConsoleError::Validation(format!("Invalid {what} id.")));
    }
    Ok(trimmed.to_string())
}

/// Maps transport errors into console errors with timeout detection.
fn map_request_error(err: &reqwest::Error) -> ConsoleError {
    if err.is_timeout() {
        ConsoleError::Timeout("Request timed out. Please try again.".to_string())
    } else if err.is_decode() {
        ConsoleError::Parse(format!("Failed to decode response: {err}"))
    } else {
        ConsoleError::Network(format!("Unable to reach the server: {err}"))
    }
}

async fn send(request: RequestBuilder) -> Result<Response, ApiFailure> {
    request
        .send()
        .await
        .map_err(|err| ApiFailure::Transport(map_request_error(&err)))
}

async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiFailure> {
    if response.status().is_success() {
        let body = response
            .text()
            .await
            .map_err(|err| ApiFailure::Transport(map_request_error(&err)))?;
        serde_json::from_str(&body).map_err(|err| {
            ApiFailure::Transport(ConsoleError::Parse(format!(
                "Failed to decode response: {err}"
            )))
        })
    } else {
        Err(rejected(response).await)
    }
}

async fn handle_empty_response(response: Response) -> Result<(), ApiFailure> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(rejected(response).await)
    }
}

async fn rejected(response: Response) -> ApiFailure {
    let status = response.status().as_u16();
    let raw = response.text().await.unwrap_or_default();
    let body = serde_json::from_str::<ErrorBody>(&raw).unwrap_or_default();
    debug!(status, code = ?body.code, "request rejected");
    ApiFailure::Rejected { status, body, raw }
}

/// Trims and truncates error bodies for operator-facing messages.
pub(crate) fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
