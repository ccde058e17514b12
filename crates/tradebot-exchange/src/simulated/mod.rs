//! 오프라인 시뮬레이션 거래소.
//!
//! 네트워크 없이 전체 주문 수명주기를 재현합니다:
//! - `Ledger` - free/locked 잔고 원장
//! - `OrderEngine` - 주문 생성/취소/조회 상태 머신
//! - `MarketDataGenerator` - 합성 시세/호가창/캔들 생성기
//! - `SimulatedExchange` - 위 세 가지를 묶은 `Exchange` 구현

mod engine;
mod exchange;
mod ledger;
mod market;

pub use engine::OrderEngine;
pub use exchange::{SimulatedConfig, SimulatedExchange};
pub use ledger::Ledger;
pub use market::MarketDataGenerator;
