//! 잔고/연결 확인 커맨드.

use anyhow::Context;
use rust_decimal::Decimal;
use tradebot_exchange::Exchange;

/// 자산 잔고를 조회합니다. 잔고가 0인 자산은 표시하지 않습니다.
pub async fn balance(exchange: &dyn Exchange) -> anyhow::Result<()> {
    let balances = exchange
        .fetch_balance()
        .await
        .context("balance lookup failed")?;

    println!("잔고 ({}):", exchange.name());
    println!("{:<8} {:>20} {:>20} {:>20}", "Asset", "Free", "Locked", "Total");

    let mut shown = 0;
    for balance in balances.values() {
        if balance.total() == Decimal::ZERO {
            continue;
        }
        println!(
            "{:<8} {:>20} {:>20} {:>20}",
            balance.asset,
            balance.free,
            balance.locked,
            balance.total()
        );
        shown += 1;
    }

    if shown == 0 {
        println!("(보유 자산 없음)");
    }
    Ok(())
}

/// 백엔드 연결과 인증을 확인합니다.
pub async fn test(exchange: &dyn Exchange) -> anyhow::Result<()> {
    println!("'{}' 연결 확인 중...", exchange.name());

    if exchange.test_connection().await {
        println!("연결 성공");
        Ok(())
    } else {
        anyhow::bail!("connection test failed for '{}'", exchange.name())
    }
}
