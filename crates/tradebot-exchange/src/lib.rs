//! 거래소 어댑터 및 백엔드 구현.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - `Exchange` trait: 통합 거래소 인터페이스
//! - 시뮬레이션 거래소 (원장, 주문 엔진, 합성 시장 데이터)
//! - Binance Futures REST 커넥터 (서명된 요청)
//! - 주문 응답 정규화

pub mod connector;
pub mod error;
pub mod normalize;
pub mod simulated;
pub mod traits;

pub use connector::{BinanceClient, BinanceConfig};
pub use error::*;
pub use normalize::OrderReport;
pub use simulated::{SimulatedConfig, SimulatedExchange};
pub use traits::*;
