//! REST client for the fleet backend.
//!
//! Every endpoint answers with the same envelope ([`ApiResponse`]). Callers
//! classify it with [`FetchOutcome`] so each request ends in exactly one of:
//! data to apply, a business error to show, or a transport failure.

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::RwLock;
use std::time::Duration;

use crate::config::ApiConfig;
use crate::error::{ConsoleError, ConsoleResult};

/// Business code for a successful call.
pub const SUCCESS_CODE: &str = "00";

/// Shown for business errors that carry no message.
pub const DEFAULT_BUSINESS_MESSAGE: &str = "요청을 처리하지 못했습니다.";

/// Shown for transport failures.
pub const GENERIC_FAILURE_MESSAGE: &str = "서버와 통신 중 오류가 발생했습니다.";

/// Response envelope shared by every endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub err_msg: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

impl ApiResponse {
    pub fn is_business_error(&self) -> bool {
        !self.success || self.code.as_deref().is_some_and(|c| c != SUCCESS_CODE)
    }

    /// Message to show for a business error.
    pub fn error_message(&self) -> String {
        [&self.err_msg, &self.message]
            .into_iter()
            .flatten()
            .find(|m| !m.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| DEFAULT_BUSINESS_MESSAGE.to_string())
    }

    pub fn outcome(self) -> FetchOutcome {
        if self.is_business_error() {
            FetchOutcome::Business(self.error_message())
        } else {
            FetchOutcome::Data(self.data.unwrap_or(Value::Null))
        }
    }
}

/// How a finished request resolves.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Payload to apply
    Data(Value),
    /// Server refused the request; prior state stays
    Business(String),
    /// The request itself failed
    Failure(ConsoleError),
}

impl FetchOutcome {
    /// Classify a finished request, logging failures.
    pub fn from_result(result: ConsoleResult<ApiResponse>) -> Self {
        match result {
            Ok(response) => {
                let outcome = response.outcome();
                if let Self::Business(ref message) = outcome {
                    tracing::warn!(message = %message, "business error");
                }
                outcome
            }
            Err(error) => {
                tracing::error!(error = %error, "request failed");
                Self::Failure(error)
            }
        }
    }
}

/// Decode a list payload: a bare array, an object with a `list` array, or null.
pub fn decode_rows<T: DeserializeOwned>(data: Value) -> ConsoleResult<Vec<T>> {
    match data {
        Value::Null => Ok(Vec::new()),
        Value::Object(mut map) if map.contains_key("list") => {
            let list = map.remove("list").unwrap_or(Value::Null);
            decode_rows(list)
        }
        other => Ok(serde_json::from_value(other)?),
    }
}

/// HTTP client bound to the backend base URL.
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> ConsoleResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of an endpoint.
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    pub fn set_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.token.write() {
            *guard = token;
        }
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// POST `params` as JSON to an endpoint.
    pub async fn fetch_data(&self, endpoint: &str, params: &Value) -> ConsoleResult<ApiResponse> {
        let url = self.url(endpoint);
        tracing::debug!(%url, "fetch");
        let response = self
            .authorize(self.client.post(&url))
            .json(params)
            .send()
            .await?;
        Self::read_envelope(response).await
    }

    /// Upload a file as multipart form data under the `file` field.
    pub async fn fetch_file_upload(&self, endpoint: &str, path: &Path) -> ConsoleResult<ApiResponse> {
        let url = self.url(endpoint);
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        tracing::debug!(%url, file = %file_name, size = bytes.len(), "upload");

        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));
        let response = self
            .authorize(self.client.post(&url))
            .multipart(form)
            .send()
            .await?;
        Self::read_envelope(response).await
    }

    async fn read_envelope(response: Response) -> ConsoleResult<ApiResponse> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ConsoleError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn login(&self, user_id: &str, password: &str) -> ConsoleResult<ApiResponse> {
        self.fetch_data("/auth/login", &json!({ "userId": user_id, "password": password }))
            .await
    }

    pub async fn refresh_token(&self) -> ConsoleResult<ApiResponse> {
        if self.token().is_none() {
            return Err(ConsoleError::NotLoggedIn);
        }
        self.fetch_data("/auth/refresh", &json!({})).await
    }

    /// End the server session of `token`. The local token is left alone.
    pub async fn logout(&self, token: String) -> ConsoleResult<ApiResponse> {
        let url = self.url("/auth/logout");
        tracing::debug!(%url, "logout");
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&json!({}))
            .send()
            .await?;
        Self::read_envelope(response).await
    }
}
