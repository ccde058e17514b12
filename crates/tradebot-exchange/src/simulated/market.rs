//! 합성 시장 데이터 생성기.
//!
//! 심볼별 기준 가격에서 시세, 호가창, 캔들을 합성합니다.
//! `ticker` 호출은 저장된 가격을 ±0.05% 범위의 랜덤 워크로 전진시키므로
//! 조회할 때마다 가격 시계열이 움직입니다. 캔들 시계열은 생성 시점에
//! 한 번만 만들어지며 이후 변하지 않습니다.

use crate::error::ExchangeError;
use crate::traits::ExchangeResult;
use chrono::{Duration, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use tradebot_core::{Candle, OrderBook, OrderBookLevel, Price, Symbol, Ticker, Timeframe};

/// 합성 시장 데이터 생성기.
#[derive(Debug)]
pub struct MarketDataGenerator {
    prices: HashMap<Symbol, Price>,
    candles: HashMap<Symbol, Vec<Candle>>,
    spread_rate: Decimal,
}

impl MarketDataGenerator {
    /// 초기 가격 맵으로 생성기를 만듭니다.
    ///
    /// 캔들 시계열은 심볼별로 `candle_count`개가 여기서 한 번 생성됩니다.
    pub fn new(
        initial_prices: &HashMap<Symbol, Price>,
        spread_rate: Decimal,
        candle_count: usize,
        candle_timeframe: Timeframe,
    ) -> Self {
        let candles = initial_prices
            .iter()
            .map(|(symbol, price)| {
                (
                    symbol.clone(),
                    generate_candles(symbol, *price, candle_count, candle_timeframe),
                )
            })
            .collect();

        Self {
            prices: initial_prices.clone(),
            candles,
            spread_rate,
        }
    }

    /// 심볼의 현재 가격을 반환합니다. 가격을 움직이지 않습니다.
    pub fn current_price(&self, symbol: &Symbol) -> ExchangeResult<Price> {
        self.prices
            .get(symbol)
            .copied()
            .ok_or_else(|| ExchangeError::SymbolNotFound(symbol.to_string()))
    }

    /// 시세를 생성합니다.
    ///
    /// 저장된 가격을 ±0.05% 범위의 랜덤 팩터로 전진시킨 뒤 그 가격을
    /// 기준으로 호가와 24시간 통계를 파생합니다.
    pub fn ticker(&mut self, symbol: &Symbol) -> ExchangeResult<Ticker> {
        let previous = self.current_price(symbol)?;

        let mut rng = rand::thread_rng();
        let price = previous * random_factor(&mut rng, 0.9995, 1.0005);
        self.prices.insert(symbol.clone(), price);

        let spread = price * self.spread_rate;
        let open = price * dec!(0.98);
        let change = price - open;
        let change_percent = if open.is_zero() {
            Decimal::ZERO
        } else {
            change / open * dec!(100)
        };

        Ok(Ticker {
            symbol: symbol.clone(),
            bid: price - spread,
            ask: price + spread,
            last: price,
            open_24h: open,
            high_24h: price * dec!(1.02),
            low_24h: price * dec!(0.98),
            change_24h: change,
            change_24h_percent: change_percent,
            base_volume: random_in(&mut rng, 1000.0, 10000.0, dec!(5000)),
            quote_volume: random_in(&mut rng, 50000.0, 500000.0, dec!(250000)),
            timestamp: Utc::now(),
        })
    }

    /// 호가창 스냅샷을 생성합니다.
    ///
    /// 레벨 i의 매수 호가는 `price × (1 − 0.0001·i)`, 매도 호가는
    /// `price × (1 + 0.0001·i)`이며 수량은 0.1~10 범위의 랜덤 값입니다.
    pub fn order_book(&self, symbol: &Symbol, depth: usize) -> ExchangeResult<OrderBook> {
        let price = self.current_price(symbol)?;
        let step = dec!(0.0001);
        let mut rng = rand::thread_rng();

        let mut bids = Vec::with_capacity(depth);
        let mut asks = Vec::with_capacity(depth);
        for i in 1..=depth {
            let offset = step * Decimal::from(i as u64);
            bids.push(OrderBookLevel {
                price: price * (Decimal::ONE - offset),
                quantity: random_in(&mut rng, 0.1, 10.0, dec!(1)),
            });
            asks.push(OrderBookLevel {
                price: price * (Decimal::ONE + offset),
                quantity: random_in(&mut rng, 0.1, 10.0, dec!(1)),
            });
        }

        Ok(OrderBook {
            symbol: symbol.clone(),
            bids,
            asks,
            timestamp: Utc::now(),
        })
    }

    /// 사전 생성된 캔들 시계열을 반환합니다. `limit`은 뒤에서부터 자릅니다.
    pub fn ohlcv(&self, symbol: &Symbol, limit: Option<usize>) -> ExchangeResult<Vec<Candle>> {
        let candles = self
            .candles
            .get(symbol)
            .ok_or_else(|| ExchangeError::SymbolNotFound(symbol.to_string()))?;

        match limit {
            Some(n) if n < candles.len() => Ok(candles[candles.len() - n..].to_vec()),
            _ => Ok(candles.clone()),
        }
    }
}

/// 현재 가격의 95%에서 시작하는 랜덤 워크 캔들 시계열을 생성합니다.
///
/// 각 캔들의 시가는 직전 캔들의 종가와 같습니다.
fn generate_candles(
    symbol: &Symbol,
    current_price: Price,
    count: usize,
    timeframe: Timeframe,
) -> Vec<Candle> {
    let mut rng = rand::thread_rng();
    let step = Duration::from_std(timeframe.duration()).unwrap_or_else(|_| Duration::hours(1));
    let mut open_time = Utc::now() - step * count as i32;
    let mut price = current_price * dec!(0.95);

    let mut candles = Vec::with_capacity(count);
    for _ in 0..count {
        let open = price;
        let close = open * random_factor(&mut rng, 0.98, 1.02);
        let body_high = open.max(close);
        let body_low = open.min(close);

        candles.push(Candle {
            symbol: symbol.clone(),
            timeframe,
            open_time,
            open,
            high: body_high * random_factor(&mut rng, 1.0, 1.02),
            low: body_low * random_factor(&mut rng, 0.98, 1.0),
            close,
            volume: random_in(&mut rng, 100.0, 1000.0, dec!(500)),
            close_time: open_time + step,
        });

        price = close;
        open_time += step;
    }

    candles
}

fn random_factor(rng: &mut impl Rng, low: f64, high: f64) -> Decimal {
    Decimal::from_f64_retain(rng.gen_range(low..high)).unwrap_or(Decimal::ONE)
}

fn random_in(rng: &mut impl Rng, low: f64, high: f64, fallback: Decimal) -> Decimal {
    Decimal::from_f64_retain(rng.gen_range(low..high)).unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> MarketDataGenerator {
        let mut prices = HashMap::new();
        prices.insert(Symbol::new("BTC", "USDT"), dec!(45000));
        prices.insert(Symbol::new("ETH", "USDT"), dec!(2500));
        MarketDataGenerator::new(&prices, dec!(0.0005), 24, Timeframe::H1)
    }

    #[test]
    fn test_unknown_symbol() {
        let mut gen = generator();
        let symbol = Symbol::new("XRP", "USDT");
        assert!(gen.current_price(&symbol).is_err());
        assert!(gen.ticker(&symbol).is_err());
        assert!(gen.order_book(&symbol, 20).is_err());
        assert!(gen.ohlcv(&symbol, None).is_err());
    }

    #[test]
    fn test_ticker_drift_within_band() {
        let mut gen = generator();
        let symbol = Symbol::new("BTC", "USDT");

        let before = gen.current_price(&symbol).unwrap();
        let ticker = gen.ticker(&symbol).unwrap();
        let after = gen.current_price(&symbol).unwrap();

        // 시세 조회가 저장된 가격을 전진시킴
        assert_eq!(ticker.last, after);
        assert!(after >= before * dec!(0.9995));
        assert!(after <= before * dec!(1.0005));
        assert!(ticker.bid < ticker.last);
        assert!(ticker.ask > ticker.last);
    }

    #[test]
    fn test_ticker_derived_fields() {
        let mut gen = generator();
        let symbol = Symbol::new("ETH", "USDT");
        let ticker = gen.ticker(&symbol).unwrap();

        assert_eq!(ticker.open_24h, ticker.last * dec!(0.98));
        assert_eq!(ticker.change_24h, ticker.last - ticker.open_24h);
        assert_eq!(ticker.high_24h, ticker.last * dec!(1.02));
    }

    #[test]
    fn test_order_book_shape() {
        let gen = generator();
        let symbol = Symbol::new("BTC", "USDT");
        let book = gen.order_book(&symbol, 20).unwrap();

        assert_eq!(book.bids.len(), 20);
        assert_eq!(book.asks.len(), 20);
        assert!(book.bids.windows(2).all(|w| w[0].price > w[1].price));
        assert!(book.asks.windows(2).all(|w| w[0].price < w[1].price));
        assert!(book.best_bid().unwrap() < book.best_ask().unwrap());

        for level in book.bids.iter().chain(book.asks.iter()) {
            assert!(level.quantity >= dec!(0.1));
            assert!(level.quantity <= dec!(10));
        }
    }

    #[test]
    fn test_candles_chain() {
        let gen = generator();
        let symbol = Symbol::new("BTC", "USDT");
        let candles = gen.ohlcv(&symbol, None).unwrap();

        assert_eq!(candles.len(), 24);
        for pair in candles.windows(2) {
            assert_eq!(pair[1].open, pair[0].close);
            assert_eq!(pair[1].open_time, pair[0].close_time);
        }
        for candle in &candles {
            assert!(candle.high >= candle.open.max(candle.close));
            assert!(candle.low <= candle.open.min(candle.close));
        }
    }

    #[test]
    fn test_candles_are_stable_and_limited() {
        let gen = generator();
        let symbol = Symbol::new("ETH", "USDT");

        let all = gen.ohlcv(&symbol, None).unwrap();
        let again = gen.ohlcv(&symbol, None).unwrap();
        assert_eq!(all[0].open, again[0].open);

        let tail = gen.ohlcv(&symbol, Some(5)).unwrap();
        assert_eq!(tail.len(), 5);
        assert_eq!(tail[4].close, all[23].close);
    }
}
