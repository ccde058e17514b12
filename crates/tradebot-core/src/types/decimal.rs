//! 정밀한 금융 계산을 위한 Decimal 별칭 및 유틸리티.

use rust_decimal::Decimal;

/// 금융 정밀도를 위한 가격 타입.
pub type Price = Decimal;

/// 주문 수량을 위한 타입.
pub type Quantity = Decimal;

/// Decimal 연산을 위한 확장 트레이트.
pub trait DecimalExt {
    /// 퍼센트 문자열로 변환합니다 (예: "5.25%").
    fn to_percentage_string(&self) -> String;

    /// 지정된 소수점 자릿수로 반올림합니다.
    fn round_dp(&self, dp: u32) -> Decimal;
}

impl DecimalExt for Decimal {
    fn to_percentage_string(&self) -> String {
        format!("{:.2}%", self)
    }

    fn round_dp(&self, dp: u32) -> Decimal {
        self.round_dp_with_strategy(dp, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_percentage_string() {
        assert_eq!(dec!(5.25).to_percentage_string(), "5.25%");
    }

    #[test]
    fn test_round_dp() {
        assert_eq!(DecimalExt::round_dp(&dec!(45004.505), 2), dec!(45004.51));
    }
}
