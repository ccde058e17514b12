//! 주문 타입 및 수명주기.
//!
//! 이 모듈은 주문 관련 타입을 정의합니다:
//! - `Side` - 주문 방향 (매수/매도)
//! - `OrderType` - 주문 유형 (시장가, 지정가)
//! - `OrderState` - 주문 상태 (open → closed/canceled)
//! - `TimeInForce` - 주문 유효 기간
//! - `OrderRequest` - 주문 요청
//! - `OrderRecord` - 모든 백엔드가 반환하는 정규 주문 레코드

use crate::error::CoreError;
use crate::types::{Price, Quantity, Symbol};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// 주문 방향 (매수 또는 매도).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// 매수
    Buy,
    /// 매도
    Sell,
}

impl Side {
    /// 반대 방향을 반환합니다.
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

impl FromStr for Side {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            _ => Err(CoreError::InvalidSide(s.to_string())),
        }
    }
}

/// 주문 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// 시장가 주문 - 현재 시장 가격으로 즉시 체결
    Market,
    /// 지정가 주문 - 지정 가격으로 대기
    Limit,
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::Market => write!(f, "MARKET"),
            OrderType::Limit => write!(f, "LIMIT"),
        }
    }
}

impl FromStr for OrderType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "market" => Ok(OrderType::Market),
            "limit" => Ok(OrderType::Limit),
            _ => Err(CoreError::InvalidOrderType(s.to_string())),
        }
    }
}

/// 주문 상태.
///
/// 수명주기: `Open` → `Closed` (전량 체결) 또는 `Canceled`.
/// `Closed`와 `Canceled`는 최종 상태입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderState {
    /// 접수되어 대기 중
    Open,
    /// 전량 체결됨
    Closed,
    /// 취소됨
    Canceled,
}

impl OrderState {
    /// 최종 상태인지 확인합니다.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderState::Closed | OrderState::Canceled)
    }
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderState::Open => write!(f, "OPEN"),
            OrderState::Closed => write!(f, "CLOSED"),
            OrderState::Canceled => write!(f, "CANCELED"),
        }
    }
}

/// 주문 유효 기간.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeInForce {
    /// 취소될 때까지 유효 (Good Till Cancelled)
    GTC,
    /// 즉시 체결 또는 취소 (Immediate Or Cancel)
    IOC,
    /// 전량 체결 또는 취소 (Fill Or Kill)
    FOK,
}

impl std::fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeInForce::GTC => write!(f, "GTC"),
            TimeInForce::IOC => write!(f, "IOC"),
            TimeInForce::FOK => write!(f, "FOK"),
        }
    }
}

impl FromStr for TimeInForce {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GTC" => Ok(TimeInForce::GTC),
            "IOC" => Ok(TimeInForce::IOC),
            "FOK" => Ok(TimeInForce::FOK),
            _ => Err(CoreError::InvalidTimeInForce(s.to_string())),
        }
    }
}

/// 새 주문 생성을 위한 주문 요청.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    /// 거래 심볼
    pub symbol: Symbol,
    /// 주문 방향
    pub side: Side,
    /// 주문 유형
    pub order_type: OrderType,
    /// 거래 수량 (기준 자산 단위)
    pub amount: Quantity,
    /// 지정가 (지정가 주문에 필수)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    /// 주문 유효 기간
    pub time_in_force: TimeInForce,
}

impl OrderRequest {
    /// 시장가 매수 주문을 생성합니다.
    pub fn market_buy(symbol: Symbol, amount: Quantity) -> Self {
        Self {
            symbol,
            side: Side::Buy,
            order_type: OrderType::Market,
            amount,
            price: None,
            time_in_force: TimeInForce::GTC,
        }
    }

    /// 시장가 매도 주문을 생성합니다.
    pub fn market_sell(symbol: Symbol, amount: Quantity) -> Self {
        Self {
            symbol,
            side: Side::Sell,
            order_type: OrderType::Market,
            amount,
            price: None,
            time_in_force: TimeInForce::GTC,
        }
    }

    /// 지정가 매수 주문을 생성합니다.
    pub fn limit_buy(symbol: Symbol, amount: Quantity, price: Price) -> Self {
        Self {
            symbol,
            side: Side::Buy,
            order_type: OrderType::Limit,
            amount,
            price: Some(price),
            time_in_force: TimeInForce::GTC,
        }
    }

    /// 지정가 매도 주문을 생성합니다.
    pub fn limit_sell(symbol: Symbol, amount: Quantity, price: Price) -> Self {
        Self {
            symbol,
            side: Side::Sell,
            order_type: OrderType::Limit,
            amount,
            price: Some(price),
            time_in_force: TimeInForce::GTC,
        }
    }

    /// 주문 유효 기간을 설정합니다.
    pub fn with_time_in_force(mut self, tif: TimeInForce) -> Self {
        self.time_in_force = tif;
        self
    }
}

/// 모든 백엔드가 반환하는 정규 주문 레코드.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    /// 주문 ID
    pub id: u64,
    /// 거래 심볼
    pub symbol: Symbol,
    /// 주문 방향
    pub side: Side,
    /// 주문 유형
    pub order_type: OrderType,
    /// 주문 가격 (시장가 주문은 실행 가격)
    pub price: Price,
    /// 원래 수량
    pub amount: Quantity,
    /// 체결된 수량
    pub filled: Quantity,
    /// 미체결 수량
    pub remaining: Quantity,
    /// 체결 금액 (호가 자산 단위)
    pub cost: Decimal,
    /// 평균 체결 가격
    pub average: Price,
    /// 현재 상태
    pub status: OrderState,
    /// 주문 유효 기간
    pub time_in_force: TimeInForce,
    /// 주문 생성 시각
    pub timestamp: DateTime<Utc>,
}

impl OrderRecord {
    /// 주문이 아직 취소 가능한지 확인합니다.
    pub fn is_open(&self) -> bool {
        self.status == OrderState::Open
    }

    /// 주문의 명목 가치를 반환합니다.
    pub fn notional_value(&self) -> Decimal {
        self.price * self.amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_order_request_builders() {
        let symbol = Symbol::new("BTC", "USDT");
        let request = OrderRequest::limit_buy(symbol, dec!(0.1), dec!(50000));

        assert_eq!(request.side, Side::Buy);
        assert_eq!(request.order_type, OrderType::Limit);
        assert_eq!(request.amount, dec!(0.1));
        assert_eq!(request.price, Some(dec!(50000)));
        assert_eq!(request.time_in_force, TimeInForce::GTC);
    }

    #[test]
    fn test_side_parse() {
        assert_eq!("BUY".parse::<Side>().unwrap(), Side::Buy);
        assert_eq!("sell".parse::<Side>().unwrap(), Side::Sell);
        assert!("hold".parse::<Side>().is_err());
    }

    #[test]
    fn test_order_type_parse() {
        assert_eq!("MARKET".parse::<OrderType>().unwrap(), OrderType::Market);
        assert_eq!("limit".parse::<OrderType>().unwrap(), OrderType::Limit);
        assert!("stop_loss".parse::<OrderType>().is_err());
    }

    #[test]
    fn test_order_state() {
        assert!(!OrderState::Open.is_terminal());
        assert!(OrderState::Closed.is_terminal());
        assert!(OrderState::Canceled.is_terminal());
        assert_eq!(OrderState::Canceled.to_string(), "CANCELED");
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }
}
