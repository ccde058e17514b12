//! 시세/호가/캔들 조회 커맨드.

use anyhow::Context;
use tradebot_core::{Symbol, Timeframe};
use tradebot_exchange::Exchange;

/// 24시간 시세를 조회합니다.
pub async fn ticker(exchange: &dyn Exchange, symbol: &str) -> anyhow::Result<()> {
    let symbol = Symbol::parse(symbol)?;
    let ticker = exchange
        .fetch_ticker(&symbol)
        .await
        .context("ticker lookup failed")?;

    println!("시세 {} ({}):", ticker.symbol, exchange.name());
    println!("  {:<16} {}", "Last", ticker.last);
    println!("  {:<16} {}", "Bid", ticker.bid);
    println!("  {:<16} {}", "Ask", ticker.ask);
    println!("  {:<16} {}", "Spread", ticker.spread());
    println!("  {:<16} {}", "Open24h", ticker.open_24h);
    println!("  {:<16} {}", "High24h", ticker.high_24h);
    println!("  {:<16} {}", "Low24h", ticker.low_24h);
    println!(
        "  {:<16} {} ({}%)",
        "Change24h", ticker.change_24h, ticker.change_24h_percent
    );
    println!("  {:<16} {}", "BaseVolume", ticker.base_volume);
    println!("  {:<16} {}", "QuoteVolume", ticker.quote_volume);
    Ok(())
}

/// 호가창을 조회합니다.
pub async fn book(exchange: &dyn Exchange, symbol: &str, depth: usize) -> anyhow::Result<()> {
    let symbol = Symbol::parse(symbol)?;
    let book = exchange
        .fetch_order_book(&symbol, Some(depth))
        .await
        .context("order book lookup failed")?;

    println!("호가창 {} (상위 {}단계):", book.symbol, depth);
    println!("{:>20} {:>16} | {:>20} {:>16}", "BidPrice", "BidQty", "AskPrice", "AskQty");

    for i in 0..book.bids.len().max(book.asks.len()) {
        let (bid_price, bid_qty) = book
            .bids
            .get(i)
            .map(|l| (l.price.to_string(), l.quantity.to_string()))
            .unwrap_or_default();
        let (ask_price, ask_qty) = book
            .asks
            .get(i)
            .map(|l| (l.price.to_string(), l.quantity.to_string()))
            .unwrap_or_default();
        println!("{:>20} {:>16} | {:>20} {:>16}", bid_price, bid_qty, ask_price, ask_qty);
    }

    if let Some(spread) = book.spread() {
        println!("스프레드: {}", spread);
    }
    Ok(())
}

/// OHLCV 캔들을 조회합니다.
pub async fn candles(
    exchange: &dyn Exchange,
    symbol: &str,
    timeframe: &str,
    limit: usize,
) -> anyhow::Result<()> {
    let symbol = Symbol::parse(symbol)?;
    let timeframe = timeframe.parse::<Timeframe>()?;
    let candles = exchange
        .fetch_ohlcv(&symbol, timeframe, Some(limit))
        .await
        .context("candle lookup failed")?;

    println!("캔들 {} {} ({}개):", symbol, timeframe, candles.len());
    println!(
        "{:<22} {:>14} {:>14} {:>14} {:>14} {:>14}",
        "OpenTime", "Open", "High", "Low", "Close", "Volume"
    );
    for candle in &candles {
        println!(
            "{:<22} {:>14} {:>14} {:>14} {:>14} {:>14}",
            candle.open_time.format("%Y-%m-%d %H:%M:%S"),
            candle.open,
            candle.high,
            candle.low,
            candle.close,
            candle.volume
        );
    }
    Ok(())
}
