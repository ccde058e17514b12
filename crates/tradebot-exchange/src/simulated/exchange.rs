//! 시뮬레이션 거래소.
//!
//! 주문 엔진과 시장 데이터 생성기를 하나의 `Exchange` 구현으로 묶습니다.
//! 네트워크 I/O가 전혀 없으며 모든 상태는 프로세스 메모리에만 존재합니다.

use crate::error::ExchangeError;
use crate::simulated::engine::OrderEngine;
use crate::simulated::market::MarketDataGenerator;
use crate::traits::{Balance, Exchange, ExchangeResult};
use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tradebot_core::{
    Candle, OrderBook, OrderRecord, OrderRequest, OrderType, Price, Symbol, Ticker, Timeframe,
};

/// 시뮬레이션 거래소 설정.
#[derive(Debug, Clone)]
pub struct SimulatedConfig {
    /// 초기 자산 잔고
    pub initial_balances: HashMap<String, Decimal>,
    /// 심볼별 초기 가격
    pub initial_prices: HashMap<Symbol, Price>,
    /// 호가 스프레드 비율
    pub spread_rate: Decimal,
    /// 시장가 슬리피지 비율
    pub slippage_rate: Decimal,
    /// 호가창 기본 깊이
    pub order_book_depth: usize,
    /// 생성할 캔들 수
    pub candle_count: usize,
    /// 캔들 타임프레임
    pub candle_timeframe: Timeframe,
}

impl Default for SimulatedConfig {
    fn default() -> Self {
        let mut initial_balances = HashMap::new();
        initial_balances.insert("USDT".to_string(), dec!(10000));
        initial_balances.insert("BTC".to_string(), dec!(0.05));
        initial_balances.insert("ETH".to_string(), dec!(1.5));
        initial_balances.insert("BNB".to_string(), dec!(10));

        let mut initial_prices = HashMap::new();
        initial_prices.insert(Symbol::new("BTC", "USDT"), dec!(45000));
        initial_prices.insert(Symbol::new("ETH", "USDT"), dec!(2500));
        initial_prices.insert(Symbol::new("BNB", "USDT"), dec!(450));
        initial_prices.insert(Symbol::new("ADA", "USDT"), dec!(1.20));
        initial_prices.insert(Symbol::new("SOL", "USDT"), dec!(180));

        Self {
            initial_balances,
            initial_prices,
            spread_rate: dec!(0.0005),
            slippage_rate: dec!(0.001),
            order_book_depth: 20,
            candle_count: 24,
            candle_timeframe: Timeframe::H1,
        }
    }
}

impl SimulatedConfig {
    /// 자산의 초기 잔고를 설정합니다.
    pub fn with_initial_balance(mut self, asset: impl Into<String>, amount: Decimal) -> Self {
        self.initial_balances.insert(asset.into(), amount);
        self
    }

    /// 심볼의 초기 가격을 설정합니다.
    pub fn with_initial_price(mut self, symbol: Symbol, price: Price) -> Self {
        self.initial_prices.insert(symbol, price);
        self
    }

    /// 슬리피지 비율을 설정합니다.
    pub fn with_slippage_rate(mut self, rate: Decimal) -> Self {
        self.slippage_rate = rate;
        self
    }

    /// 스프레드 비율을 설정합니다.
    pub fn with_spread_rate(mut self, rate: Decimal) -> Self {
        self.spread_rate = rate;
        self
    }
}

struct SimState {
    engine: OrderEngine,
    market: MarketDataGenerator,
}

/// 오프라인 시뮬레이션 거래소.
pub struct SimulatedExchange {
    order_book_depth: usize,
    state: RwLock<SimState>,
}

impl SimulatedExchange {
    /// 설정으로 시뮬레이션 거래소를 생성합니다.
    pub fn new(config: SimulatedConfig) -> Self {
        let engine = OrderEngine::new(&config.initial_balances, config.slippage_rate);
        let market = MarketDataGenerator::new(
            &config.initial_prices,
            config.spread_rate,
            config.candle_count,
            config.candle_timeframe,
        );

        Self {
            order_book_depth: config.order_book_depth,
            state: RwLock::new(SimState { engine, market }),
        }
    }

    fn validate(request: &OrderRequest) -> ExchangeResult<()> {
        if request.amount <= Decimal::ZERO {
            return Err(ExchangeError::InvalidQuantity(format!(
                "amount must be positive: {}",
                request.amount
            )));
        }
        if let Some(price) = request.price {
            if price <= Decimal::ZERO {
                return Err(ExchangeError::InvalidQuantity(format!(
                    "price must be positive: {}",
                    price
                )));
            }
        }
        if request.order_type == OrderType::Limit && request.price.is_none() {
            return Err(ExchangeError::OrderRejected(
                "limit order requires a price".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SimulatedExchange {
    fn default() -> Self {
        Self::new(SimulatedConfig::default())
    }
}

#[async_trait]
impl Exchange for SimulatedExchange {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn create_order(&self, request: &OrderRequest) -> ExchangeResult<OrderRecord> {
        Self::validate(request)?;

        let mut state = self.state.write().await;
        let current_price = state.market.current_price(&request.symbol)?;
        state.engine.create_order(request, current_price)
    }

    async fn cancel_order(&self, order_id: u64, _symbol: &Symbol) -> ExchangeResult<OrderRecord> {
        let mut state = self.state.write().await;
        state.engine.cancel_order(order_id)
    }

    async fn fetch_order(&self, order_id: u64, _symbol: &Symbol) -> ExchangeResult<OrderRecord> {
        let state = self.state.read().await;
        state.engine.order(order_id)
    }

    async fn fetch_open_orders(&self, symbol: Option<&Symbol>) -> ExchangeResult<Vec<OrderRecord>> {
        let state = self.state.read().await;
        Ok(state.engine.open_orders(symbol))
    }

    async fn fetch_balance(&self) -> ExchangeResult<BTreeMap<String, Balance>> {
        let state = self.state.read().await;
        Ok(state.engine.balances())
    }

    async fn fetch_ticker(&self, symbol: &Symbol) -> ExchangeResult<Ticker> {
        // 시세 조회는 가격을 전진시키므로 쓰기 잠금이 필요
        let mut state = self.state.write().await;
        state.market.ticker(symbol)
    }

    async fn fetch_order_book(
        &self,
        symbol: &Symbol,
        limit: Option<usize>,
    ) -> ExchangeResult<OrderBook> {
        let state = self.state.read().await;
        state
            .market
            .order_book(symbol, limit.unwrap_or(self.order_book_depth))
    }

    async fn fetch_ohlcv(
        &self,
        symbol: &Symbol,
        _timeframe: Timeframe,
        limit: Option<usize>,
    ) -> ExchangeResult<Vec<Candle>> {
        // 캔들 시계열은 설정된 타임프레임으로 고정되어 있음
        let state = self.state.read().await;
        state.market.ohlcv(symbol, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_order_rejects_zero_amount() {
        let exchange = SimulatedExchange::default();
        let request = OrderRequest::market_buy(Symbol::new("BTC", "USDT"), dec!(0));

        let err = exchange.create_order(&request).await.unwrap_err();
        assert!(matches!(err, ExchangeError::InvalidQuantity(_)));
    }

    #[tokio::test]
    async fn test_create_order_rejects_unknown_symbol() {
        let exchange = SimulatedExchange::default();
        let request = OrderRequest::market_buy(Symbol::new("XRP", "USDT"), dec!(1));

        let err = exchange.create_order(&request).await.unwrap_err();
        assert!(matches!(err, ExchangeError::SymbolNotFound(_)));
    }

    #[tokio::test]
    async fn test_default_seed_balances() {
        let exchange = SimulatedExchange::default();
        let balances = exchange.fetch_balance().await.unwrap();

        assert_eq!(balances["USDT"].free, dec!(10000));
        assert_eq!(balances["BTC"].free, dec!(0.05));
        assert_eq!(balances["ETH"].free, dec!(1.5));
        assert_eq!(balances["BNB"].free, dec!(10));
    }

    #[tokio::test]
    async fn test_config_builder_overrides() {
        let config = SimulatedConfig::default()
            .with_initial_balance("USDT", dec!(500))
            .with_initial_price(Symbol::new("XRP", "USDT"), dec!(0.5))
            .with_slippage_rate(dec!(0));
        let exchange = SimulatedExchange::new(config);

        let balances = exchange.fetch_balance().await.unwrap();
        assert_eq!(balances["USDT"].free, dec!(500));

        let ticker = exchange
            .fetch_ticker(&Symbol::new("XRP", "USDT"))
            .await
            .unwrap();
        assert!(ticker.last > dec!(0.49));
    }

    #[tokio::test]
    async fn test_connection_always_succeeds() {
        let exchange = SimulatedExchange::default();
        assert!(exchange.test_connection().await);
    }
}
