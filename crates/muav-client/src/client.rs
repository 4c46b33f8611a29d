//! Platform REST client.

use reqwest::{Client, RequestBuilder, Response, Url};
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};

use crate::error::ApiError;

/// Connection settings for the fleet platform.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Base URL every path is appended to, e.g. `https://localhost:4000/api`.
    pub base_url: String,
    /// Sent verbatim as the `Authorization` header when set.
    pub token: Option<String>,
    pub timeout: Duration,
    pub verify_tls: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "https://localhost:4000/api".to_string(),
            token: None,
            timeout: Duration::from_millis(5000),
            verify_tls: true,
        }
    }
}

/// HTTP client for the fleet platform API.
///
/// Every call is a single attempt bounded by the configured timeout.
#[derive(Debug, Clone)]
pub struct PlatformClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl PlatformClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let base_url = settings.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|err| ApiError::InvalidUrl {
            url: base_url.clone(),
            reason: err.to_string(),
        })?;

        let client = Client::builder()
            .timeout(settings.timeout)
            .danger_accept_invalid_certs(!settings.verify_tls)
            .build()
            .map_err(|source| ApiError::Transport {
                path: base_url.clone(),
                source,
            })?;

        let token = settings
            .token
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        Ok(Self {
            client,
            base_url,
            token,
            timeout: settings.timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token.as_deref() {
            Some(token) => request.header("Authorization", token),
            None => request,
        }
    }

    /// GET `path` with optional query parameters.
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, ApiError> {
        let mut request = self.client.get(self.url(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        self.execute("GET", path, self.apply_auth(request)).await
    }

    /// POST a JSON body to `path`.
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        let request = self
            .client
            .post(self.url(path))
            .header("Content-Type", "application/json")
            .json(body);
        self.execute("POST", path, self.apply_auth(request)).await
    }

    async fn execute(
        &self,
        method: &str,
        path: &str,
        request: RequestBuilder,
    ) -> Result<Value, ApiError> {
        let started = Instant::now();
        let result = match request.send().await {
            Ok(response) => read_response(path, response).await,
            Err(err) => Err(self.transport_error(path, err)),
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => tracing::debug!(method, path, elapsed_ms, "platform call ok"),
            Err(err) => tracing::warn!(method, path, elapsed_ms, error = %err, "platform call failed"),
        }
        result
    }

    fn transport_error(&self, path: &str, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout {
                path: path.to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            ApiError::Transport {
                path: path.to_string(),
                source: err,
            }
        }
    }
}

async fn read_response(path: &str, response: Response) -> Result<Value, ApiError> {
    let status = response.status();
    let is_json = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.contains("json"))
        .unwrap_or(false);
    let body = response.text().await.map_err(|source| ApiError::Transport {
        path: path.to_string(),
        source,
    })?;

    if !status.is_success() {
        return Err(ApiError::Upstream {
            path: path.to_string(),
            status: status.as_u16(),
            message: upstream_message(status.as_u16(), &body, status.canonical_reason()),
        });
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    match serde_json::from_str(&body) {
        Ok(value) => Ok(value),
        Err(source) if is_json => Err(ApiError::Decode {
            path: path.to_string(),
            source,
        }),
        Err(_) => Ok(Value::String(body)),
    }
}

/// A 500 carrying `{error}` or `{message}` is reported with the platform's own text.
fn upstream_message(status: u16, body: &str, reason: Option<&str>) -> String {
    if status == 500 {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
            let own = map
                .get("error")
                .or_else(|| map.get("message"))
                .and_then(Value::as_str);
            if let Some(message) = own {
                return message.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        reason.unwrap_or("request failed").to_string()
    } else {
        trimmed.to_string()
    }
}
