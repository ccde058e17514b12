//! 자산 잔고 원장.
//!
//! 자산별 free/locked 잔고를 관리합니다. 모든 이동은 네 가지 연산으로만
//! 일어납니다: `reserve`(주문 접수 시 잠금), `release`(취소 시 해제),
//! `settle`(체결 시 잠긴 자금 차감), `deposit`(체결 대금 입금).
//!
//! 불변식: 모든 관찰 시점에서 `free >= 0`, `locked >= 0`이며
//! total은 항상 free + locked의 파생 값입니다.

use crate::error::ExchangeError;
use crate::traits::{Balance, ExchangeResult};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

/// free/locked 잔고 원장.
#[derive(Debug, Clone)]
pub struct Ledger {
    accounts: HashMap<String, Balance>,
}

impl Ledger {
    /// 초기 잔고로 원장을 생성합니다. 모든 자산은 free 상태로 시작합니다.
    pub fn new(initial: &HashMap<String, Decimal>) -> Self {
        let accounts = initial
            .iter()
            .map(|(asset, amount)| {
                (
                    asset.clone(),
                    Balance {
                        asset: asset.clone(),
                        free: *amount,
                        locked: Decimal::ZERO,
                    },
                )
            })
            .collect();

        Self { accounts }
    }

    /// 자산 잔고를 조회합니다. 알 수 없는 자산은 0 잔고로 반환됩니다.
    pub fn get(&self, asset: &str) -> Balance {
        self.accounts
            .get(asset)
            .cloned()
            .unwrap_or_else(|| Balance::zero(asset))
    }

    /// 전체 잔고를 자산 이름순으로 반환합니다.
    pub fn balances(&self) -> BTreeMap<String, Balance> {
        self.accounts
            .iter()
            .map(|(asset, balance)| (asset.clone(), balance.clone()))
            .collect()
    }

    /// free 잔고를 locked로 이동합니다 (주문 접수).
    ///
    /// free가 부족하면 `InsufficientBalance`를 반환하고 잔고는 변경되지
    /// 않습니다.
    pub fn reserve(&mut self, asset: &str, amount: Decimal) -> ExchangeResult<()> {
        let balance = self
            .accounts
            .entry(asset.to_string())
            .or_insert_with(|| Balance::zero(asset));

        if balance.free < amount {
            return Err(ExchangeError::InsufficientBalance(format!(
                "{}: need {}, free {}",
                asset, amount, balance.free
            )));
        }

        balance.free -= amount;
        balance.locked += amount;
        Ok(())
    }

    /// locked 잔고를 free로 되돌립니다 (주문 취소).
    ///
    /// locked보다 많은 양의 해제는 호출자의 버그이므로
    /// `InvariantViolation`을 반환합니다.
    pub fn release(&mut self, asset: &str, amount: Decimal) -> ExchangeResult<()> {
        let balance = self
            .accounts
            .entry(asset.to_string())
            .or_insert_with(|| Balance::zero(asset));

        if balance.locked < amount {
            return Err(ExchangeError::InvariantViolation(format!(
                "release {} {} exceeds locked {}",
                amount, asset, balance.locked
            )));
        }

        balance.locked -= amount;
        balance.free += amount;
        Ok(())
    }

    /// locked 잔고를 차감합니다 (체결로 자금이 계정을 떠남).
    pub fn settle(&mut self, asset: &str, amount: Decimal) -> ExchangeResult<()> {
        let balance = self
            .accounts
            .entry(asset.to_string())
            .or_insert_with(|| Balance::zero(asset));

        if balance.locked < amount {
            return Err(ExchangeError::InvariantViolation(format!(
                "settle {} {} exceeds locked {}",
                amount, asset, balance.locked
            )));
        }

        balance.locked -= amount;
        Ok(())
    }

    /// free 잔고를 증가시킵니다 (체결 대금 입금).
    pub fn deposit(&mut self, asset: &str, amount: Decimal) {
        let balance = self
            .accounts
            .entry(asset.to_string())
            .or_insert_with(|| Balance::zero(asset));

        balance.free += amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ledger_with(asset: &str, amount: Decimal) -> Ledger {
        let mut initial = HashMap::new();
        initial.insert(asset.to_string(), amount);
        Ledger::new(&initial)
    }

    #[test]
    fn test_reserve_moves_free_to_locked() {
        let mut ledger = ledger_with("USDT", dec!(10000));
        ledger.reserve("USDT", dec!(450)).unwrap();

        let balance = ledger.get("USDT");
        assert_eq!(balance.free, dec!(9550));
        assert_eq!(balance.locked, dec!(450));
        assert_eq!(balance.total(), dec!(10000));
    }

    #[test]
    fn test_reserve_insufficient_leaves_balances_untouched() {
        let mut ledger = ledger_with("BTC", dec!(0.05));
        let err = ledger.reserve("BTC", dec!(1)).unwrap_err();
        assert!(matches!(err, ExchangeError::InsufficientBalance(_)));

        let balance = ledger.get("BTC");
        assert_eq!(balance.free, dec!(0.05));
        assert_eq!(balance.locked, dec!(0));
    }

    #[test]
    fn test_release_restores_free() {
        let mut ledger = ledger_with("USDT", dec!(1000));
        ledger.reserve("USDT", dec!(300)).unwrap();
        ledger.release("USDT", dec!(300)).unwrap();

        let balance = ledger.get("USDT");
        assert_eq!(balance.free, dec!(1000));
        assert_eq!(balance.locked, dec!(0));
    }

    #[test]
    fn test_release_over_locked_is_invariant_violation() {
        let mut ledger = ledger_with("USDT", dec!(1000));
        ledger.reserve("USDT", dec!(100)).unwrap();

        let err = ledger.release("USDT", dec!(200)).unwrap_err();
        assert!(matches!(err, ExchangeError::InvariantViolation(_)));
    }

    #[test]
    fn test_settle_and_deposit_transfer_value() {
        // 0.01 BTC를 450.045 USDT에 매수하는 체결 흐름
        let mut ledger = ledger_with("USDT", dec!(10000));
        ledger.reserve("USDT", dec!(450.045)).unwrap();
        ledger.settle("USDT", dec!(450.045)).unwrap();
        ledger.deposit("BTC", dec!(0.01));

        let usdt = ledger.get("USDT");
        assert_eq!(usdt.free, dec!(9549.955));
        assert_eq!(usdt.locked, dec!(0));
        assert_eq!(ledger.get("BTC").total(), dec!(0.01));
    }

    #[test]
    fn test_unknown_asset_reads_as_zero() {
        let ledger = ledger_with("USDT", dec!(1));
        let balance = ledger.get("XRP");
        assert_eq!(balance.free, dec!(0));
        assert_eq!(balance.locked, dec!(0));
    }
}
