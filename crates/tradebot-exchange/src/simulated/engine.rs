//! 주문 엔진.
//!
//! 원장과 주문 레지스트리를 소유하고 주문 수명주기를 구동합니다.
//! 시장가 주문은 즉시 전량 체결되고, 지정가 주문은 취소될 때까지
//! `Open` 상태로 대기합니다. 체결 시뮬레이션은 하지 않습니다.

use crate::error::ExchangeError;
use crate::traits::{Balance, ExchangeResult};
use crate::simulated::ledger::Ledger;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use tradebot_core::{
    OrderRecord, OrderRequest, OrderState, OrderType, Price, Side, Symbol,
};

/// 첫 주문에 부여되는 ID.
const FIRST_ORDER_ID: u64 = 1000;

/// 주문 생성/취소/조회 상태 머신.
#[derive(Debug)]
pub struct OrderEngine {
    ledger: Ledger,
    orders: BTreeMap<u64, OrderRecord>,
    next_id: u64,
    slippage_rate: Decimal,
}

impl OrderEngine {
    /// 초기 잔고와 슬리피지 비율로 엔진을 생성합니다.
    pub fn new(initial_balances: &HashMap<String, Decimal>, slippage_rate: Decimal) -> Self {
        Self {
            ledger: Ledger::new(initial_balances),
            orders: BTreeMap::new(),
            next_id: FIRST_ORDER_ID,
            slippage_rate,
        }
    }

    /// 주문을 생성합니다.
    ///
    /// 시장가 주문의 실행 가격은 `current_price`에 슬리피지를 적용한
    /// 값(매수 ×(1+s), 매도 ×(1−s))이며 즉시 전량 체결됩니다.
    /// 지정가 주문은 지정 가격으로 자금만 예약하고 `Open`으로 대기합니다.
    /// 예약 실패 시 잔고는 변경되지 않습니다.
    pub fn create_order(
        &mut self,
        request: &OrderRequest,
        current_price: Price,
    ) -> ExchangeResult<OrderRecord> {
        let exec_price = match request.order_type {
            OrderType::Market => match request.side {
                Side::Buy => current_price * (Decimal::ONE + self.slippage_rate),
                Side::Sell => current_price * (Decimal::ONE - self.slippage_rate),
            },
            OrderType::Limit => request
                .price
                .ok_or_else(|| ExchangeError::OrderRejected("limit order requires a price".to_string()))?,
        };

        // 매수는 호가 자산을 실행 가격 기준으로, 매도는 기준 자산을 예약
        match request.side {
            Side::Buy => self
                .ledger
                .reserve(&request.symbol.quote, request.amount * exec_price)?,
            Side::Sell => self.ledger.reserve(&request.symbol.base, request.amount)?,
        }

        let id = self.next_id;
        self.next_id += 1;

        let mut order = OrderRecord {
            id,
            symbol: request.symbol.clone(),
            side: request.side,
            order_type: request.order_type,
            price: exec_price,
            amount: request.amount,
            filled: Decimal::ZERO,
            remaining: request.amount,
            cost: request.amount * exec_price,
            average: exec_price,
            status: OrderState::Open,
            time_in_force: request.time_in_force,
            timestamp: Utc::now(),
        };

        if request.order_type == OrderType::Market {
            self.fill(&mut order)?;
        }

        self.orders.insert(id, order.clone());
        Ok(order)
    }

    /// 예약된 자금을 정산하고 반대 자산을 입금합니다 (전량 체결).
    fn fill(&mut self, order: &mut OrderRecord) -> ExchangeResult<()> {
        let quote_amount = order.amount * order.price;
        match order.side {
            Side::Buy => {
                self.ledger.settle(&order.symbol.quote, quote_amount)?;
                self.ledger.deposit(&order.symbol.base, order.amount);
            }
            Side::Sell => {
                self.ledger.settle(&order.symbol.base, order.amount)?;
                self.ledger.deposit(&order.symbol.quote, quote_amount);
            }
        }

        order.filled = order.amount;
        order.remaining = Decimal::ZERO;
        order.status = OrderState::Closed;
        Ok(())
    }

    /// 주문을 취소합니다.
    ///
    /// 미체결 예약을 해제하고 상태를 `Canceled`로 바꿉니다. 이미 최종
    /// 상태인 주문(체결 또는 재취소)은 `CannotCancelClosed`로 거부됩니다.
    pub fn cancel_order(&mut self, order_id: u64) -> ExchangeResult<OrderRecord> {
        let order = self
            .orders
            .get(&order_id)
            .cloned()
            .ok_or_else(|| ExchangeError::OrderNotFound(order_id.to_string()))?;

        if order.status.is_terminal() {
            return Err(ExchangeError::CannotCancelClosed(order_id));
        }

        match order.side {
            Side::Buy => self
                .ledger
                .release(&order.symbol.quote, order.remaining * order.price)?,
            Side::Sell => self.ledger.release(&order.symbol.base, order.remaining)?,
        }

        let order = self
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| ExchangeError::OrderNotFound(order_id.to_string()))?;
        order.status = OrderState::Canceled;
        order.remaining = Decimal::ZERO;
        Ok(order.clone())
    }

    /// 주문을 조회합니다.
    pub fn order(&self, order_id: u64) -> ExchangeResult<OrderRecord> {
        self.orders
            .get(&order_id)
            .cloned()
            .ok_or_else(|| ExchangeError::OrderNotFound(order_id.to_string()))
    }

    /// 미체결 주문을 ID 오름차순으로 반환합니다.
    pub fn open_orders(&self, symbol: Option<&Symbol>) -> Vec<OrderRecord> {
        self.orders
            .values()
            .filter(|o| o.status == OrderState::Open)
            .filter(|o| symbol.map_or(true, |s| &o.symbol == s))
            .cloned()
            .collect()
    }

    /// 전체 잔고를 반환합니다.
    pub fn balances(&self) -> BTreeMap<String, Balance> {
        self.ledger.balances()
    }

    /// 단일 자산 잔고를 반환합니다.
    pub fn balance(&self, asset: &str) -> Balance {
        self.ledger.get(asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn engine() -> OrderEngine {
        let mut balances = HashMap::new();
        balances.insert("USDT".to_string(), dec!(10000));
        balances.insert("BTC".to_string(), dec!(0.05));
        OrderEngine::new(&balances, dec!(0.001))
    }

    fn btc_usdt() -> Symbol {
        Symbol::new("BTC", "USDT")
    }

    #[test]
    fn test_market_buy_fills_immediately() {
        let mut engine = engine();
        let request = OrderRequest::market_buy(btc_usdt(), dec!(0.01));
        let order = engine.create_order(&request, dec!(45000)).unwrap();

        // 매수 슬리피지: 45000 × 1.001 = 45045
        assert_eq!(order.status, OrderState::Closed);
        assert_eq!(order.price, dec!(45045));
        assert_eq!(order.filled, dec!(0.01));
        assert_eq!(order.remaining, dec!(0));
        assert_eq!(order.cost, dec!(450.45));

        let usdt = engine.balance("USDT");
        assert_eq!(usdt.free, dec!(9549.55));
        assert_eq!(usdt.locked, dec!(0));
        assert_eq!(engine.balance("BTC").total(), dec!(0.06));
    }

    #[test]
    fn test_market_sell_applies_negative_slippage() {
        let mut engine = engine();
        let request = OrderRequest::market_sell(btc_usdt(), dec!(0.01));
        let order = engine.create_order(&request, dec!(45000)).unwrap();

        // 매도 슬리피지: 45000 × 0.999 = 44955
        assert_eq!(order.price, dec!(44955));
        assert_eq!(engine.balance("BTC").total(), dec!(0.04));
        assert_eq!(engine.balance("USDT").free, dec!(10449.55));
    }

    #[test]
    fn test_limit_order_rests_open() {
        let mut engine = engine();
        let request = OrderRequest::limit_buy(btc_usdt(), dec!(0.01), dec!(40000));
        let order = engine.create_order(&request, dec!(45000)).unwrap();

        assert_eq!(order.status, OrderState::Open);
        assert_eq!(order.filled, dec!(0));
        assert_eq!(order.remaining, dec!(0.01));

        let usdt = engine.balance("USDT");
        assert_eq!(usdt.free, dec!(9600));
        assert_eq!(usdt.locked, dec!(400));
        assert_eq!(engine.open_orders(None).len(), 1);
    }

    #[test]
    fn test_limit_order_without_price_rejected() {
        let mut engine = engine();
        let mut request = OrderRequest::limit_buy(btc_usdt(), dec!(0.01), dec!(40000));
        request.price = None;

        let err = engine.create_order(&request, dec!(45000)).unwrap_err();
        assert!(matches!(err, ExchangeError::OrderRejected(_)));
    }

    #[test]
    fn test_cancel_releases_reservation() {
        let mut engine = engine();
        let request = OrderRequest::limit_buy(btc_usdt(), dec!(0.01), dec!(40000));
        let order = engine.create_order(&request, dec!(45000)).unwrap();

        let canceled = engine.cancel_order(order.id).unwrap();
        assert_eq!(canceled.status, OrderState::Canceled);
        assert_eq!(canceled.remaining, dec!(0));

        let usdt = engine.balance("USDT");
        assert_eq!(usdt.free, dec!(10000));
        assert_eq!(usdt.locked, dec!(0));
    }

    #[test]
    fn test_double_cancel_fails() {
        let mut engine = engine();
        let request = OrderRequest::limit_sell(btc_usdt(), dec!(0.01), dec!(50000));
        let order = engine.create_order(&request, dec!(45000)).unwrap();

        engine.cancel_order(order.id).unwrap();
        let err = engine.cancel_order(order.id).unwrap_err();
        assert!(matches!(err, ExchangeError::CannotCancelClosed(_)));
    }

    #[test]
    fn test_cancel_filled_order_fails() {
        let mut engine = engine();
        let request = OrderRequest::market_buy(btc_usdt(), dec!(0.01));
        let order = engine.create_order(&request, dec!(45000)).unwrap();

        let err = engine.cancel_order(order.id).unwrap_err();
        assert!(matches!(err, ExchangeError::CannotCancelClosed(_)));
    }

    #[test]
    fn test_cancel_unknown_order_fails() {
        let mut engine = engine();
        let err = engine.cancel_order(9999).unwrap_err();
        assert!(matches!(err, ExchangeError::OrderNotFound(_)));
    }

    #[test]
    fn test_insufficient_balance_leaves_state_unchanged() {
        let mut engine = engine();
        let request = OrderRequest::market_sell(btc_usdt(), dec!(1));
        let err = engine.create_order(&request, dec!(45000)).unwrap_err();
        assert!(matches!(err, ExchangeError::InsufficientBalance(_)));

        assert_eq!(engine.balance("BTC").free, dec!(0.05));
        assert_eq!(engine.balance("USDT").free, dec!(10000));
        assert!(engine.open_orders(None).is_empty());
    }

    #[test]
    fn test_order_ids_increase_from_1000() {
        let mut engine = engine();
        let first = engine
            .create_order(&OrderRequest::market_buy(btc_usdt(), dec!(0.001)), dec!(45000))
            .unwrap();
        let second = engine
            .create_order(&OrderRequest::market_buy(btc_usdt(), dec!(0.001)), dec!(45000))
            .unwrap();

        assert_eq!(first.id, 1000);
        assert_eq!(second.id, 1001);
    }

    #[test]
    fn test_open_orders_filtered_by_symbol() {
        let mut engine = engine();
        engine
            .create_order(
                &OrderRequest::limit_buy(btc_usdt(), dec!(0.01), dec!(40000)),
                dec!(45000),
            )
            .unwrap();
        engine
            .create_order(
                &OrderRequest::limit_buy(Symbol::new("ETH", "USDT"), dec!(1), dec!(1500)),
                dec!(2500),
            )
            .unwrap();

        assert_eq!(engine.open_orders(None).len(), 2);
        assert_eq!(engine.open_orders(Some(&btc_usdt())).len(), 1);
    }
}
