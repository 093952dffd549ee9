//! Application configuration.
//!
//! Loaded once at startup from `config.yaml` merged with `LEADRELAY_*`
//! environment variables (e.g. `LEADRELAY_SMS__IPPANEL__API_KEY`). There is
//! no hot reload; mutable runtime state (current pattern index, dedup cache)
//! lives in its own components, not here.

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Default config file looked up relative to the working directory.
pub const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub sms: SmsConfig,
    pub telegram: TelegramConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,
    pub file_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmsConfig {
    /// Kill switch: when false, dispatch validates and logs but never sends.
    pub enabled: bool,
    pub ippanel: IppanelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IppanelConfig {
    pub api_key: String,
    /// Registered sender identity (originator line number).
    pub originator: String,
    /// Ordered pattern template codes the panel rotates through.
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token: String,
    /// Operator allow-list (Telegram user ids). Everyone else is ignored.
    pub admins: Vec<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            sms: SmsConfig::default(),
            telegram: TelegramConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: "leadrelay.log".to_string(),
        }
    }
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ippanel: IppanelConfig::default(),
        }
    }
}

impl Default for IppanelConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            originator: String::new(),
            patterns: Vec::new(),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            admins: Vec::new(),
        }
    }
}

impl Config {
    /// Loads configuration from `config.yaml` and `LEADRELAY_*` env vars.
    ///
    /// A missing config file is not an error; defaults plus environment
    /// variables apply.
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(CONFIG_FILE)
    }

    /// Loads configuration from an explicit YAML path (used by tests).
    pub fn load_from(path: &str) -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("LEADRELAY_").split("__"))
            .extract()
    }

    /// Server bind address in `host:port` form.
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl TelegramConfig {
    /// True when the given Telegram user id is on the operator allow-list.
    pub fn is_operator(&self, user_id: u64) -> bool {
        self.admins.contains(&user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn defaults_are_sane() {
        let cfg = Config::default();
        assert_eq!(cfg.server_address(), "0.0.0.0:8080");
        assert!(!cfg.sms.enabled);
        assert!(cfg.sms.ippanel.patterns.is_empty());
    }

    #[test]
    fn yaml_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::with_suffix(".yaml").unwrap();
        writeln!(
            file,
            "server:\n  port: 9090\nsms:\n  enabled: true\n  ippanel:\n    api_key: k\n    originator: '3000'\n    patterns: [p1, p2]\ntelegram:\n  admins: [76599340]"
        )
        .unwrap();

        let cfg = Config::load_from(file.path().to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert!(cfg.sms.enabled);
        assert_eq!(cfg.sms.ippanel.patterns, vec!["p1", "p2"]);
        assert!(cfg.telegram.is_operator(76599340));
        assert!(!cfg.telegram.is_operator(1));
    }
}
