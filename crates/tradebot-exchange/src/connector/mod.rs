//! 실거래소 커넥터.

mod binance;

pub use binance::{BinanceClient, BinanceConfig};
