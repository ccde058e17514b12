//! 거래소 통합 인터페이스.
//!
//! 모든 백엔드(시뮬레이션, Binance)는 `Exchange` trait을 구현하고
//! 동일한 정규 타입(`OrderRecord`, `Balance`, `Ticker`, `OrderBook`,
//! `Candle`)을 반환합니다. 호출자는 백엔드를 구분할 필요가 없습니다.

use crate::error::ExchangeError;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tradebot_core::{Candle, OrderBook, OrderRecord, OrderRequest, Symbol, Ticker, Timeframe};

/// 거래소 작업을 위한 Result 타입.
pub type ExchangeResult<T> = Result<T, ExchangeError>;

/// 자산 잔고.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// 자산 이름 (예: "USDT")
    pub asset: String,
    /// 사용 가능 잔고
    pub free: Decimal,
    /// 주문에 예약된 잔고
    pub locked: Decimal,
}

impl Balance {
    /// 잔고가 0인 자산을 생성합니다.
    pub fn zero(asset: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            free: Decimal::ZERO,
            locked: Decimal::ZERO,
        }
    }

    /// 총 잔고 (free + locked). 파생 값이며 저장되지 않습니다.
    pub fn total(&self) -> Decimal {
        self.free + self.locked
    }
}

/// 통합 거래소 인터페이스.
#[async_trait]
pub trait Exchange: Send + Sync {
    /// 거래소 이름.
    fn name(&self) -> &str;

    /// 주문을 생성합니다.
    async fn create_order(&self, request: &OrderRequest) -> ExchangeResult<OrderRecord>;

    /// 주문을 취소하고 취소된 주문 레코드를 반환합니다.
    async fn cancel_order(&self, order_id: u64, symbol: &Symbol) -> ExchangeResult<OrderRecord>;

    /// 주문을 조회합니다.
    async fn fetch_order(&self, order_id: u64, symbol: &Symbol) -> ExchangeResult<OrderRecord>;

    /// 미체결 주문 목록을 조회합니다. 심볼로 필터링할 수 있습니다.
    async fn fetch_open_orders(&self, symbol: Option<&Symbol>) -> ExchangeResult<Vec<OrderRecord>>;

    /// 자산별 잔고를 조회합니다.
    async fn fetch_balance(&self) -> ExchangeResult<BTreeMap<String, Balance>>;

    /// 시세를 조회합니다.
    async fn fetch_ticker(&self, symbol: &Symbol) -> ExchangeResult<Ticker>;

    /// 호가창 스냅샷을 조회합니다.
    async fn fetch_order_book(
        &self,
        symbol: &Symbol,
        limit: Option<usize>,
    ) -> ExchangeResult<OrderBook>;

    /// OHLCV 캔들을 조회합니다.
    async fn fetch_ohlcv(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
        limit: Option<usize>,
    ) -> ExchangeResult<Vec<Candle>>;

    /// 연결/인증을 확인합니다. 잔고 조회가 성공하면 연결된 것으로 간주합니다.
    async fn test_connection(&self) -> bool {
        self.fetch_balance().await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_balance_total() {
        let balance = Balance {
            asset: "USDT".to_string(),
            free: dec!(9549.955),
            locked: dec!(450.045),
        };
        assert_eq!(balance.total(), dec!(10000));
    }

    #[test]
    fn test_balance_zero() {
        let balance = Balance::zero("ADA");
        assert_eq!(balance.asset, "ADA");
        assert_eq!(balance.total(), Decimal::ZERO);
    }
}
