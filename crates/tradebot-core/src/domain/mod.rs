//! 도메인 모델.

pub mod market_data;
pub mod order;

pub use market_data::*;
pub use order::*;
