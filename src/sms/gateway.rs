//! IPPanel SMS gateway client.
//!
//! Thin reqwest wrapper over the IPPanel REST API (pattern send + credit).
//! Pattern sends retry up to [`MAX_ATTEMPTS`] times with a linear backoff of
//! `attempt` seconds; only transport and payload-shape failures are retried.
//! Provider HTTP errors (401/400/429/500 and business errors) are terminal.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// IPPanel REST API base.
pub const ENDPOINT: &str = "https://api2.ippanel.com/api/v1";

/// Reported in the User-Agent header so the provider knows the API level.
const CLIENT_VERSION: &str = "2.0.0";

/// Per-attempt HTTP timeout.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Total attempts for a pattern send (1 initial + 2 retries).
const MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("IPPanel API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("IPPanel API unauthorized (401) - check your API key. Response: {body}")]
    Unauthorized { body: String },

    #[error("IPPanel API bad request (400). Response: {body}")]
    BadRequest { body: String },

    #[error("IPPanel API rate limit exceeded (429). Response: {body}")]
    RateLimited { body: String },

    #[error("IPPanel API internal server error (500). Response: {body}")]
    ServerError { body: String },

    #[error("IPPanel API error (code {code}): {message}")]
    Api { code: i64, message: String },

    #[error("could not decode IPPanel response JSON: {body}")]
    MalformedResponse { body: String },

    #[error("IPPanel API returned empty data")]
    EmptyData,

    #[error("IPPanel API returned invalid message id")]
    InvalidMessageId,

    #[error("SMS send failed after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: Box<GatewayError>,
    },
}

impl GatewayError {
    /// Transport and payload-shape failures are worth another attempt;
    /// provider-signalled errors are not.
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayError::Transport(_)
                | GatewayError::MalformedResponse { .. }
                | GatewayError::EmptyData
                | GatewayError::InvalidMessageId
        )
    }
}

/// Envelope every IPPanel response uses.
#[derive(Debug, Deserialize)]
struct BaseResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    code: i64,
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendPatternRequest<'a> {
    code: &'a str,
    sender: &'a str,
    recipient: &'a str,
    variable: &'a HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    message_id: i64,
}

#[derive(Debug, Deserialize)]
struct CreditResponse {
    #[serde(default)]
    credit: f64,
}

/// IPPanel API client.
pub struct IppanelClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl IppanelClient {
    pub fn new(api_key: &str) -> Result<Self, GatewayError> {
        Self::with_base_url(api_key, ENDPOINT)
    }

    /// Client against a non-default base URL (mock servers in tests).
    pub fn with_base_url(api_key: &str, base_url: &str) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(format!("Ippanel/ApiClient/{} Rust", CLIENT_VERSION))
            .build()?;

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Performs one HTTP request and maps the status code to a typed result.
    async fn request<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<BaseResponse, GatewayError> {
        let url = format!("{}{}", self.base_url, path);

        let mut req = self
            .http
            .request(method, &url)
            .header("Apikey", &self.api_key)
            .header("Content-Type", "application/json");
        if let Some(body) = body {
            req = req.json(body);
        }

        let res = req.send().await?;
        let status = res.status();
        let raw = res.text().await?;

        match status {
            StatusCode::OK | StatusCode::CREATED => {
                serde_json::from_str(&raw).map_err(|_| GatewayError::MalformedResponse { body: raw })
            }
            StatusCode::INTERNAL_SERVER_ERROR => Err(GatewayError::ServerError { body: raw }),
            StatusCode::UNAUTHORIZED => Err(GatewayError::Unauthorized { body: raw }),
            StatusCode::BAD_REQUEST => Err(GatewayError::BadRequest { body: raw }),
            StatusCode::TOO_MANY_REQUESTS => Err(GatewayError::RateLimited { body: raw }),
            _ => {
                let parsed: BaseResponse =
                    serde_json::from_str(&raw).map_err(|_| GatewayError::MalformedResponse { body: raw })?;
                Err(parse_api_error(parsed))
            }
        }
    }

    /// Sends a pattern SMS, retrying transient failures with linear backoff.
    ///
    /// Returns the provider message id on success, or the terminal error
    /// (wrapping the last cause when all attempts were spent).
    pub async fn send_pattern(
        &self,
        pattern_code: &str,
        originator: &str,
        recipient: &str,
        variables: &HashMap<String, String>,
    ) -> Result<i64, GatewayError> {
        let payload = SendPatternRequest {
            code: pattern_code,
            sender: originator,
            recipient,
            variable: variables,
        };
        log::debug!(
            "🔍 SMS request: pattern={} sender={} recipient={}",
            pattern_code,
            originator,
            recipient
        );

        let mut attempt = 1;
        loop {
            log::info!("🔄 SMS attempt {}/{}", attempt, MAX_ATTEMPTS);

            match self.try_send(&payload).await {
                Ok(message_id) => {
                    log::info!("✅ SMS sent on attempt {} with message_id={}", attempt, message_id);
                    return Ok(message_id);
                }
                Err(e) if !e.is_retryable() => {
                    log::error!("❌ SMS attempt {} failed with terminal error: {}", attempt, e);
                    return Err(e);
                }
                Err(e) => {
                    if attempt == MAX_ATTEMPTS {
                        return Err(GatewayError::Exhausted {
                            attempts: MAX_ATTEMPTS,
                            source: Box::new(e),
                        });
                    }
                    log::warn!("⚠️ SMS attempt {} failed, retrying: {}", attempt, e);
                    tokio::time::sleep(Duration::from_secs(u64::from(attempt))).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn try_send(&self, payload: &SendPatternRequest<'_>) -> Result<i64, GatewayError> {
        let res = self
            .request(Method::POST, "/sms/pattern/normal/send", Some(payload))
            .await?;
        log::debug!("🔍 SMS response: status={} code={}", res.status, res.code);

        let data = match res.data {
            Some(data) if !data.is_null() => data,
            _ => return Err(GatewayError::EmptyData),
        };

        let body = data.to_string();
        let parsed: SendResponse =
            serde_json::from_value(data).map_err(|_| GatewayError::MalformedResponse { body })?;

        if parsed.message_id == 0 {
            return Err(GatewayError::InvalidMessageId);
        }
        Ok(parsed.message_id)
    }

    /// Current account balance. No retry; callers treat failures as advisory.
    pub async fn get_credit(&self) -> Result<f64, GatewayError> {
        let res = self
            .request::<()>(Method::GET, "/sms/accounting/credit/show", None)
            .await?;

        let data = res.data.ok_or(GatewayError::EmptyData)?;
        let body = data.to_string();
        let parsed: CreditResponse =
            serde_json::from_value(data).map_err(|_| GatewayError::MalformedResponse { body })?;
        Ok(parsed.credit)
    }
}

/// Extracts a business error from a decoded non-standard-status envelope.
fn parse_api_error(res: BaseResponse) -> GatewayError {
    let message = res
        .error_message
        .filter(|m| !m.is_empty())
        .or_else(|| {
            res.data
                .as_ref()
                .and_then(|d| d.get("error"))
                .map(|e| e.to_string())
        })
        .unwrap_or_else(|| res.status.clone());

    GatewayError::Api { code: res.code, message }
}
