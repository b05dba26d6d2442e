//! ControllerConfig - タイムアウトとリトライの設定
//!
//! JSON から読み込めます。未指定の項目はデフォルト値になります。
//!
//! ```json
//! { "lifetimeTimeoutMs": 1500, "retryAttempts": 4, "retryDelayMs": 250 }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::retry::RetryPolicy;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ControllerConfig {
    /// 起動/終了の確認を待つ時間
    pub lifetime_timeout_ms: u64,
    /// 詳細コールバックを待つ時間。過ぎたら「不明」扱い
    pub details_timeout_ms: u64,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    /// サービス初期化待ちのポーリング回数
    pub services_retry_attempts: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            lifetime_timeout_ms: 1500,
            details_timeout_ms: 1000,
            retry_attempts: 4,
            retry_delay_ms: 250,
            services_retry_attempts: 20,
        }
    }
}

impl ControllerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: ControllerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.lifetime_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "lifetimeTimeoutMs must be greater than zero".to_string(),
            ));
        }
        if self.retry_attempts == 0 {
            return Err(ConfigError::Invalid(
                "retryAttempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn lifetime_timeout(&self) -> Duration {
        Duration::from_millis(self.lifetime_timeout_ms)
    }

    pub fn details_timeout(&self) -> Duration {
        Duration::from_millis(self.details_timeout_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(self.retry_attempts, Duration::from_millis(self.retry_delay_ms))
    }

    pub fn services_retry_policy(&self) -> RetryPolicy {
        RetryPolicy::fixed(
            self.services_retry_attempts,
            Duration::from_millis(self.retry_delay_ms),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_host_timings() {
        let config = ControllerConfig::default();
        assert_eq!(config.lifetime_timeout(), Duration::from_millis(1500));
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert_eq!(config.services_retry_policy().attempts, 20);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ControllerConfig::from_json_str(r#"{ "retryDelayMs": 100 }"#).unwrap();
        assert_eq!(config.retry_delay_ms, 100);
        assert_eq!(config.lifetime_timeout_ms, 1500);
        assert_eq!(config.retry_policy().next_delay(1), Duration::from_millis(100));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = ControllerConfig::from_json_str(r#"{ "lifetimeTimeoutMs": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = ControllerConfig::from_json_str("{ nope").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = ControllerConfig::from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
