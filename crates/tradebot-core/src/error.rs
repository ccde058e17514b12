//! 핵심 에러 타입.
//!
//! 이 모듈은 도메인 타입 파싱과 설정 로딩에서 발생하는 에러를 정의합니다.

use thiserror::Error;

/// 핵심 도메인 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 설정 에러
    #[error("Config error: {0}")]
    Config(String),

    /// 유효하지 않은 심볼 문자열
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// 유효하지 않은 주문 방향 문자열
    #[error("Invalid side: {0}")]
    InvalidSide(String),

    /// 유효하지 않은 주문 유형 문자열
    #[error("Invalid order type: {0}")]
    InvalidOrderType(String),

    /// 유효하지 않은 타임프레임 문자열
    #[error("Invalid timeframe: {0}")]
    InvalidTimeframe(String),

    /// 유효하지 않은 주문 유효 기간 문자열
    #[error("Invalid time in force: {0}")]
    InvalidTimeInForce(String),
}

/// 핵심 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::InvalidSymbol("???".to_string());
        assert_eq!(err.to_string(), "Invalid symbol: ???");

        let err = CoreError::InvalidSide("hold".to_string());
        assert_eq!(err.to_string(), "Invalid side: hold");
    }
}
