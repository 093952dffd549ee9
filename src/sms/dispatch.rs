//! SMS dispatch orchestration.
//!
//! Stateless per call: picks the current pattern, validates the phone and
//! gateway configuration, and hands off to the gateway client. The dedup
//! cache is the caller's responsibility - dispatch never touches it.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::core::config::SmsConfig;
use crate::core::phone;
use crate::sms::gateway::{GatewayError, IppanelClient};
use crate::sms::patterns::PatternStore;

/// Template variable value used when the lead carries no user id.
const ANONYMOUS_USER: &str = "کاربر گرامی";

#[derive(Debug, Error)]
pub enum SmsError {
    #[error("invalid Iranian phone number: {0}")]
    InvalidPhone(String),

    #[error("SMS not configured: {0}")]
    NotConfigured(&'static str),

    #[error("failed to send SMS: {0}")]
    SendFailed(#[from] GatewayError),
}

/// Orchestrates pattern selection and gateway sends for lead events.
pub struct SmsDispatcher {
    config: SmsConfig,
    patterns: Arc<PatternStore>,
    gateway: Option<Arc<IppanelClient>>,
}

impl SmsDispatcher {
    /// Builds the dispatcher, creating a gateway client when an API key is present.
    pub fn new(config: SmsConfig, patterns: Arc<PatternStore>) -> Result<Self, GatewayError> {
        let gateway = if config.ippanel.api_key.is_empty() {
            log::warn!("⚠️ IPPanel API key not configured - SMS dispatch disabled");
            None
        } else {
            log::info!(
                "📡 IPPanel SMS client initialized (enabled={}, originator={})",
                config.enabled,
                config.ippanel.originator
            );
            Some(Arc::new(IppanelClient::new(&config.ippanel.api_key)?))
        };

        Ok(Self {
            config,
            patterns,
            gateway,
        })
    }

    /// Dispatcher with an injected gateway client (tests point it at a mock).
    pub fn with_gateway(config: SmsConfig, patterns: Arc<PatternStore>, gateway: Option<Arc<IppanelClient>>) -> Self {
        Self {
            config,
            patterns,
            gateway,
        }
    }

    /// Sends the current pattern SMS to a lead's phone.
    ///
    /// Returns `Ok(Some(message_id))` on a real send and `Ok(None)` when
    /// sending is administratively disabled.
    pub async fn send_pattern_sms(&self, phone_number: &str, user_id: &str) -> Result<Option<i64>, SmsError> {
        let pattern = self.patterns.current();

        log::info!(
            "📲 SMS dispatch initiated (phone={}, user_id={}, pattern={}, group={}, enabled={})",
            phone_number,
            user_id,
            pattern.code,
            pattern.group,
            self.config.enabled
        );

        if !phone::is_valid(phone_number) {
            return Err(SmsError::InvalidPhone(phone_number.to_string()));
        }

        if !self.config.enabled {
            log::warn!("📵 SMS disabled - skipping send (phone={})", phone_number);
            return Ok(None);
        }

        let Some(gateway) = self.gateway.as_ref() else {
            return Err(SmsError::NotConfigured("gateway client missing (check API key)"));
        };
        if self.config.ippanel.originator.is_empty() {
            return Err(SmsError::NotConfigured("originator not set"));
        }
        if !pattern.is_configured() {
            return Err(SmsError::NotConfigured("no pattern code configured"));
        }

        // Single template variable: the lead's user id, or a greeting placeholder.
        let code_value = if user_id.is_empty() {
            ANONYMOUS_USER.to_string()
        } else {
            user_id.to_string()
        };
        let variables = HashMap::from([("code".to_string(), code_value)]);

        let message_id = gateway
            .send_pattern(
                &pattern.code,
                &self.config.ippanel.originator,
                phone_number,
                &variables,
            )
            .await?;

        log::info!(
            "✅ SMS sent (phone={}, user_id={}, message_id={}, pattern={}, group={})",
            phone_number,
            user_id,
            message_id,
            pattern.code,
            pattern.group
        );
        Ok(Some(message_id))
    }

    /// Current account balance, when a gateway client exists.
    pub async fn credit(&self) -> Result<f64, SmsError> {
        let gateway = self
            .gateway
            .as_ref()
            .ok_or(SmsError::NotConfigured("gateway client missing (check API key)"))?;
        Ok(gateway.get_credit().await?)
    }
}
