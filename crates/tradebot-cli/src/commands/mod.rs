//! CLI 서브커맨드 구현.

pub mod account;
pub mod market_data;
pub mod order;
