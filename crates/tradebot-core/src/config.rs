//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! 설정은 TOML 파일에서 로드되며 `TRADEBOT__` 접두사의
//! 환경 변수로 오버라이드할 수 있습니다.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// 거래 백엔드 모드.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeMode {
    /// 오프라인 시뮬레이션 거래소
    Simulated,
    /// Binance Futures REST 백엔드
    Binance,
}

impl Default for ExchangeMode {
    fn default() -> Self {
        Self::Simulated
    }
}

impl fmt::Display for ExchangeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExchangeMode::Simulated => write!(f, "simulated"),
            ExchangeMode::Binance => write!(f, "binance"),
        }
    }
}

impl FromStr for ExchangeMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "simulated" | "mock" => Ok(ExchangeMode::Simulated),
            "binance" => Ok(ExchangeMode::Binance),
            _ => Err(CoreError::Config(format!("unknown exchange mode: {}", s))),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    #[serde(default = "default_log_level")]
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Binance 백엔드 설정.
///
/// API 자격증명은 여기가 아니라 환경 변수
/// (`BINANCE_API_KEY` / `BINANCE_API_SECRET`)에서 로드됩니다.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BinanceSettings {
    /// 테스트넷 사용 여부
    #[serde(default = "default_testnet")]
    pub testnet: bool,
    /// 요청 타임아웃 (초)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// 수신 윈도우 (밀리초)
    #[serde(default = "default_recv_window")]
    pub recv_window: u64,
}

fn default_testnet() -> bool {
    true
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_recv_window() -> u64 {
    5000
}

impl Default for BinanceSettings {
    fn default() -> Self {
        Self {
            testnet: default_testnet(),
            timeout_secs: default_timeout_secs(),
            recv_window: default_recv_window(),
        }
    }
}

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 기본 거래 백엔드 모드
    #[serde(default)]
    pub mode: ExchangeMode,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Binance 백엔드 설정
    #[serde(default)]
    pub binance: BinanceSettings,
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일은 없어도 됩니다. 이 경우 기본값에 환경 변수만 적용됩니다.
    pub fn load<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("TRADEBOT")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> CoreResult<Self> {
        Self::load("config/default.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_mode_parse() {
        assert_eq!(
            "simulated".parse::<ExchangeMode>().unwrap(),
            ExchangeMode::Simulated
        );
        assert_eq!(
            "BINANCE".parse::<ExchangeMode>().unwrap(),
            ExchangeMode::Binance
        );
        assert!("kraken".parse::<ExchangeMode>().is_err());
    }

    #[test]
    fn test_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.mode, ExchangeMode::Simulated);
        assert_eq!(config.logging.level, "info");
        assert!(config.binance.testnet);
        assert_eq!(config.binance.recv_window, 5000);
    }

    #[test]
    fn test_load_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load("does/not/exist.toml").unwrap();
        assert_eq!(config.mode, ExchangeMode::Simulated);
    }
}
