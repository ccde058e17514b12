//! 주문 생성/취소/조회 커맨드.

use std::io::{self, BufRead, Write};

use anyhow::Context;
use rust_decimal::Decimal;
use tradebot_core::{OrderRequest, Side, Symbol};
use tradebot_exchange::{Exchange, OrderReport};

/// 시장가 주문을 실행합니다.
pub async fn market(
    exchange: &dyn Exchange,
    symbol: &str,
    side: &str,
    quantity: Decimal,
    skip_confirm: bool,
) -> anyhow::Result<()> {
    let symbol = Symbol::parse(symbol)?;
    let request = match side.parse::<Side>()? {
        Side::Buy => OrderRequest::market_buy(symbol, quantity),
        Side::Sell => OrderRequest::market_sell(symbol, quantity),
    };

    place(exchange, &request, skip_confirm).await
}

/// 지정가 주문을 실행합니다.
pub async fn limit(
    exchange: &dyn Exchange,
    symbol: &str,
    side: &str,
    quantity: Decimal,
    price: Decimal,
    tif: &str,
    skip_confirm: bool,
) -> anyhow::Result<()> {
    let symbol = Symbol::parse(symbol)?;
    let time_in_force = tif.parse()?;
    let request = match side.parse::<Side>()? {
        Side::Buy => OrderRequest::limit_buy(symbol, quantity, price),
        Side::Sell => OrderRequest::limit_sell(symbol, quantity, price),
    }
    .with_time_in_force(time_in_force);

    place(exchange, &request, skip_confirm).await
}

async fn place(
    exchange: &dyn Exchange,
    request: &OrderRequest,
    skip_confirm: bool,
) -> anyhow::Result<()> {
    println!("주문 요청:");
    println!("  {:<16} {}", "Exchange", exchange.name());
    println!("  {:<16} {}", "Symbol", request.symbol);
    println!("  {:<16} {}", "Side", request.side);
    println!("  {:<16} {}", "Type", request.order_type);
    println!("  {:<16} {}", "Quantity", request.amount);
    if let Some(price) = request.price {
        println!("  {:<16} {}", "Price", price);
        println!("  {:<16} {}", "TimeInForce", request.time_in_force);
    }

    if !skip_confirm && !confirm()? {
        println!("주문이 취소되었습니다.");
        return Ok(());
    }

    let order = exchange
        .create_order(request)
        .await
        .context("order placement failed")?;
    tracing::info!(order_id = order.id, status = %order.status, "Order placed");

    println!();
    println!("주문 결과:");
    print_report(&OrderReport::from(&order));
    Ok(())
}

/// 주문을 취소합니다.
pub async fn cancel(exchange: &dyn Exchange, symbol: &str, order_id: u64) -> anyhow::Result<()> {
    let symbol = Symbol::parse(symbol)?;
    let order = exchange
        .cancel_order(order_id, &symbol)
        .await
        .context("order cancellation failed")?;
    tracing::info!(order_id = order.id, "Order canceled");

    println!("주문 취소 완료:");
    print_report(&OrderReport::from(&order));
    Ok(())
}

/// 주문 상태를 조회합니다.
pub async fn status(exchange: &dyn Exchange, symbol: &str, order_id: u64) -> anyhow::Result<()> {
    let symbol = Symbol::parse(symbol)?;
    let order = exchange
        .fetch_order(order_id, &symbol)
        .await
        .context("order lookup failed")?;

    let report = OrderReport::from(&order);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// 미체결 주문 목록을 조회합니다.
pub async fn open_orders(exchange: &dyn Exchange, symbol: Option<&str>) -> anyhow::Result<()> {
    let symbol = symbol.map(Symbol::parse).transpose()?;
    let orders = exchange
        .fetch_open_orders(symbol.as_ref())
        .await
        .context("open order lookup failed")?;

    if orders.is_empty() {
        println!("미체결 주문이 없습니다.");
        return Ok(());
    }

    println!(
        "{:<8} {:<12} {:<6} {:<8} {:>14} {:>14} {:>14}",
        "ID", "Symbol", "Side", "Type", "Price", "Amount", "Remaining"
    );
    for order in &orders {
        println!(
            "{:<8} {:<12} {:<6} {:<8} {:>14} {:>14} {:>14}",
            order.id,
            order.symbol.to_string(),
            order.side.to_string(),
            order.order_type.to_string(),
            order.price,
            order.amount,
            order.remaining
        );
    }
    Ok(())
}

/// 표준 입력에서 주문 실행 여부를 확인합니다 (y/엔터 = 예).
fn confirm() -> anyhow::Result<bool> {
    print!("\n주문을 실행하시겠습니까? [Y/n] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    let answer = answer.trim();
    Ok(answer.is_empty() || answer.eq_ignore_ascii_case("y"))
}

fn print_report(report: &OrderReport) {
    println!("  {:<16} {}", "OrderId", report.order_id);
    println!("  {:<16} {}", "Symbol", report.symbol);
    println!("  {:<16} {}", "Side", report.side);
    println!("  {:<16} {}", "Type", report.order_type);
    println!("  {:<16} {}", "Status", report.status);
    println!("  {:<16} {}", "Price", report.price);
    println!("  {:<16} {}", "Quantity", report.quantity);
    println!("  {:<16} {}", "ExecutedQty", report.executed_qty);
    println!("  {:<16} {}", "AvgPrice", report.avg_price);
    println!("  {:<16} {}", "CumQuoteQty", report.cumulative_quote_qty);
    if let Some(tif) = &report.time_in_force {
        println!("  {:<16} {}", "TimeInForce", tif);
    }
}
