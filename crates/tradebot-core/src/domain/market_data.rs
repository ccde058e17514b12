//! 시장 데이터 타입 및 구조체.
//!
//! 이 모듈은 시장 데이터 관련 타입을 정의합니다:
//! - `Candle` - OHLCV 캔들스틱 데이터
//! - `Ticker` - 24시간 통계가 포함된 시세 데이터
//! - `OrderBook` - 호가창 데이터

use crate::types::{Price, Quantity, Symbol, Timeframe};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// OHLCV 캔들스틱 데이터.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    /// 거래 심볼
    pub symbol: Symbol,
    /// 타임프레임
    pub timeframe: Timeframe,
    /// 캔들 시작 시간
    pub open_time: DateTime<Utc>,
    /// 시가
    pub open: Price,
    /// 고가
    pub high: Price,
    /// 저가
    pub low: Price,
    /// 종가
    pub close: Price,
    /// 거래량 (기준 자산 단위)
    pub volume: Quantity,
    /// 캔들 종료 시간
    pub close_time: DateTime<Utc>,
}

impl Candle {
    /// 캔들 몸통 크기(절대값)를 반환합니다.
    pub fn body_size(&self) -> Decimal {
        (self.close - self.open).abs()
    }

    /// 캔들 범위(고가 - 저가)를 반환합니다.
    pub fn range(&self) -> Decimal {
        self.high - self.low
    }

    /// 양봉(종가 > 시가)인지 확인합니다.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// 음봉(종가 < 시가)인지 확인합니다.
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

/// 24시간 통계가 포함된 시세 데이터.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticker {
    /// 거래 심볼
    pub symbol: Symbol,
    /// 최우선 매수 호가
    pub bid: Price,
    /// 최우선 매도 호가
    pub ask: Price,
    /// 최근 체결가
    pub last: Price,
    /// 24시간 시가
    pub open_24h: Price,
    /// 24시간 최고가
    pub high_24h: Price,
    /// 24시간 최저가
    pub low_24h: Price,
    /// 24시간 가격 변동
    pub change_24h: Decimal,
    /// 24시간 변동률(%)
    pub change_24h_percent: Decimal,
    /// 24시간 거래량 (기준 자산 단위)
    pub base_volume: Quantity,
    /// 24시간 거래대금 (호가 자산 단위)
    pub quote_volume: Decimal,
    /// 타임스탬프
    pub timestamp: DateTime<Utc>,
}

impl Ticker {
    /// 매수/매도 스프레드를 반환합니다.
    pub fn spread(&self) -> Decimal {
        self.ask - self.bid
    }

    /// 중간 가격을 반환합니다.
    pub fn mid_price(&self) -> Decimal {
        (self.bid + self.ask) / Decimal::from(2)
    }
}

/// 호가창 가격 레벨.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBookLevel {
    /// 가격
    pub price: Price,
    /// 수량
    pub quantity: Quantity,
}

/// 호가창 데이터.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBook {
    /// 거래 심볼
    pub symbol: Symbol,
    /// 매수 호가 - 가격 내림차순 정렬
    pub bids: Vec<OrderBookLevel>,
    /// 매도 호가 - 가격 오름차순 정렬
    pub asks: Vec<OrderBookLevel>,
    /// 마지막 업데이트 타임스탬프
    pub timestamp: DateTime<Utc>,
}

impl OrderBook {
    /// 최우선 매수 호가를 반환합니다.
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.first().map(|l| l.price)
    }

    /// 최우선 매도 호가를 반환합니다.
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first().map(|l| l.price)
    }

    /// 스프레드를 반환합니다.
    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    /// 중간 가격을 반환합니다.
    pub fn mid_price(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some((bid + ask) / Decimal::from(2)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_candle() {
        let now = Utc::now();
        let candle = Candle {
            symbol: Symbol::new("BTC", "USDT"),
            timeframe: Timeframe::H1,
            open_time: now,
            open: dec!(50000),
            high: dec!(51000),
            low: dec!(49500),
            close: dec!(50500),
            volume: dec!(100),
            close_time: now,
        };

        assert!(candle.is_bullish());
        assert_eq!(candle.body_size(), dec!(500));
        assert_eq!(candle.range(), dec!(1500));
    }

    #[test]
    fn test_order_book() {
        let ob = OrderBook {
            symbol: Symbol::new("ETH", "USDT"),
            bids: vec![
                OrderBookLevel { price: dec!(2000), quantity: dec!(10) },
                OrderBookLevel { price: dec!(1999), quantity: dec!(20) },
            ],
            asks: vec![
                OrderBookLevel { price: dec!(2001), quantity: dec!(15) },
                OrderBookLevel { price: dec!(2002), quantity: dec!(25) },
            ],
            timestamp: Utc::now(),
        };

        assert_eq!(ob.best_bid(), Some(dec!(2000)));
        assert_eq!(ob.best_ask(), Some(dec!(2001)));
        assert_eq!(ob.spread(), Some(dec!(1)));
        assert_eq!(ob.mid_price(), Some(dec!(2000.5)));
    }

    #[test]
    fn test_ticker_spread() {
        let ticker = Ticker {
            symbol: Symbol::new("BTC", "USDT"),
            bid: dec!(50000),
            ask: dec!(50010),
            last: dec!(50005),
            open_24h: dec!(49000),
            high_24h: dec!(51000),
            low_24h: dec!(49000),
            change_24h: dec!(1005),
            change_24h_percent: dec!(2.05),
            base_volume: dec!(1000),
            quote_volume: dec!(50000000),
            timestamp: Utc::now(),
        };

        assert_eq!(ticker.spread(), dec!(10));
        assert_eq!(ticker.mid_price(), dec!(50005));
    }
}
