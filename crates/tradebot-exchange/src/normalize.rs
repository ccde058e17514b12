//! 주문 응답 정규화.
//!
//! 백엔드와 무관하게 동일한 필드 집합으로 주문을 표현하는
//! `OrderReport`를 정의합니다. CLI 출력과 JSON 직렬화에 사용됩니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tradebot_core::{OrderRecord, OrderType};

/// 정규화된 주문 보고서.
///
/// 심볼은 연결 형식("BTCUSDT"), 열거형 값은 대문자 문자열로
/// 직렬화됩니다. `timeInForce`는 지정가 주문에만 존재합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReport {
    /// 주문 ID
    pub order_id: u64,
    /// 연결 형식 심볼 (예: "BTCUSDT")
    pub symbol: String,
    /// 주문 방향 ("BUY" / "SELL")
    pub side: String,
    /// 주문 상태 ("OPEN" / "CLOSED" / "CANCELED")
    pub status: String,
    /// 주문 유형 ("MARKET" / "LIMIT")
    #[serde(rename = "type")]
    pub order_type: String,
    /// 주문 수량
    pub quantity: Decimal,
    /// 체결된 수량
    pub executed_qty: Decimal,
    /// 평균 체결 가격
    pub avg_price: Decimal,
    /// 누적 체결 금액 (호가 자산 단위)
    pub cumulative_quote_qty: Decimal,
    /// 주문 가격
    pub price: Decimal,
    /// 주문 유효 기간 (지정가 주문에만 존재)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_in_force: Option<String>,
}

impl From<&OrderRecord> for OrderReport {
    fn from(order: &OrderRecord) -> Self {
        let time_in_force = match order.order_type {
            OrderType::Limit => Some(order.time_in_force.to_string()),
            OrderType::Market => None,
        };

        Self {
            order_id: order.id,
            symbol: order.symbol.to_exchange_symbol(),
            side: order.side.to_string(),
            status: order.status.to_string(),
            order_type: order.order_type.to_string(),
            quantity: order.amount,
            executed_qty: order.filled,
            avg_price: order.average,
            cumulative_quote_qty: order.cost,
            price: order.price,
            time_in_force,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use tradebot_core::{OrderState, Side, Symbol, TimeInForce};

    fn sample_order(order_type: OrderType) -> OrderRecord {
        OrderRecord {
            id: 1001,
            symbol: Symbol::new("BTC", "USDT"),
            side: Side::Buy,
            order_type,
            price: dec!(45004.5),
            amount: dec!(0.01),
            filled: dec!(0.01),
            remaining: dec!(0),
            cost: dec!(450.045),
            average: dec!(45004.5),
            status: OrderState::Closed,
            time_in_force: TimeInForce::GTC,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_report_fields() {
        let report = OrderReport::from(&sample_order(OrderType::Market));
        assert_eq!(report.order_id, 1001);
        assert_eq!(report.symbol, "BTCUSDT");
        assert_eq!(report.side, "BUY");
        assert_eq!(report.status, "CLOSED");
        assert_eq!(report.order_type, "MARKET");
        assert_eq!(report.executed_qty, dec!(0.01));
        assert_eq!(report.cumulative_quote_qty, dec!(450.045));
        assert!(report.time_in_force.is_none());
    }

    #[test]
    fn test_report_limit_has_time_in_force() {
        let report = OrderReport::from(&sample_order(OrderType::Limit));
        assert_eq!(report.time_in_force.as_deref(), Some("GTC"));
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let report = OrderReport::from(&sample_order(OrderType::Market));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["orderId"], 1001);
        assert_eq!(json["type"], "MARKET");
        assert!(json.get("executedQty").is_some());
        assert!(json.get("cumulativeQuoteQty").is_some());
        assert!(json.get("timeInForce").is_none());
    }
}
