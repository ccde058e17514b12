//! 거래소 에러 타입.

use thiserror::Error;
use tradebot_core::CoreError;

/// 거래소 관련 에러.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// 심볼을 찾을 수 없음
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// 유효하지 않은 주문 유형
    #[error("Invalid order type: {0}")]
    InvalidOrderType(String),

    /// 유효하지 않은 주문 방향
    #[error("Invalid side: {0}")]
    InvalidSide(String),

    /// 유효하지 않은 수량
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    /// 잔고 부족
    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),

    /// 주문을 찾을 수 없음
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// 최종 상태의 주문은 취소 불가
    #[error("Cannot cancel closed order: {0}")]
    CannotCancelClosed(u64),

    /// 주문 거부됨
    #[error("Order rejected: {0}")]
    OrderRejected(String),

    /// 내부 불변식 위반 (프로그래밍 에러)
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// 네트워크/연결 에러
    #[error("Network error: {0}")]
    NetworkError(String),

    /// 인증/권한 에러
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 요청 한도 초과
    #[error("Rate limit exceeded")]
    RateLimited,

    /// API 에러 코드
    #[error("API error {code}: {message}")]
    ApiError { code: i32, message: String },

    /// 파싱/역직렬화 에러
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 타임스탬프 동기화 에러
    #[error("Timestamp error: {0}")]
    TimestampError(String),

    /// 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 알 수 없는 에러
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl ExchangeError {
    /// 재시도 가능한 에러인지 확인.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ExchangeError::NetworkError(_)
                | ExchangeError::RateLimited
                | ExchangeError::Timeout(_)
                | ExchangeError::TimestampError(_)
        )
    }

    /// 인증 에러인지 확인.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, ExchangeError::Unauthorized(_))
    }

    /// 재시도하면 안 되는 치명적 에러인지 확인.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ExchangeError::Unauthorized(_)
                | ExchangeError::InsufficientBalance(_)
                | ExchangeError::InvalidQuantity(_)
                | ExchangeError::OrderRejected(_)
                | ExchangeError::InvariantViolation(_)
        )
    }
}

impl From<CoreError> for ExchangeError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidSymbol(s) => ExchangeError::SymbolNotFound(s),
            CoreError::InvalidSide(s) => ExchangeError::InvalidSide(s),
            CoreError::InvalidOrderType(s) => ExchangeError::InvalidOrderType(s),
            other => ExchangeError::Unknown(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ExchangeError::Timeout(err.to_string())
        } else if err.is_connect() {
            ExchangeError::NetworkError(err.to_string())
        } else {
            ExchangeError::Unknown(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        ExchangeError::ParseError(err.to_string())
    }
}
