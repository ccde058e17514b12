//! 트레이딩 심볼 정의.
//!
//! 이 모듈은 거래 가능한 페어를 나타내는 `Symbol` 타입과
//! 문자열 형식("BTC/USDT", "BTCUSDT") 파싱을 정의합니다.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 연결형 심볼을 분해할 때 시도하는 호가 자산 접미사.
const KNOWN_QUOTES: [&str; 6] = ["USDT", "BUSD", "USDC", "BTC", "ETH", "BNB"];

/// 거래 가능한 페어를 나타내는 트레이딩 심볼.
///
/// 심볼은 기준 자산과 호가 자산으로 구성됩니다. 예: BTC/USDT.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    /// 기준 자산 (예: BTC)
    pub base: String,
    /// 호가 자산 (예: USDT)
    pub quote: String,
}

impl Symbol {
    /// 새 심볼을 생성합니다.
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into().to_uppercase(),
            quote: quote.into().to_uppercase(),
        }
    }

    /// 심볼 문자열을 파싱합니다.
    ///
    /// 두 가지 형식을 지원합니다:
    /// - 슬래시 형식: "BTC/USDT"
    /// - 연결 형식: "BTCUSDT" (알려진 호가 자산 접미사로 분해,
    ///   실패 시 마지막 4글자를 호가 자산으로 가정)
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let s = s.trim().to_uppercase();

        if let Some((base, quote)) = s.split_once('/') {
            if base.is_empty() || quote.is_empty() {
                return Err(CoreError::InvalidSymbol(s.clone()));
            }
            return Ok(Self::new(base, quote));
        }

        for quote in KNOWN_QUOTES {
            if let Some(base) = s.strip_suffix(quote) {
                if !base.is_empty() {
                    return Ok(Self::new(base, quote));
                }
            }
        }

        // 알려진 호가 자산이 아니면 4글자 접미사로 가정
        if s.len() > 4 && s.chars().all(|c| c.is_ascii_alphanumeric()) {
            let (base, quote) = s.split_at(s.len() - 4);
            return Ok(Self::new(base, quote));
        }

        Err(CoreError::InvalidSymbol(s))
    }

    /// 거래소 전송용 연결 형식을 반환합니다 (예: "BTCUSDT").
    pub fn to_exchange_symbol(&self) -> String {
        format!("{}{}", self.base, self.quote)
    }

    /// 표준 심볼 문자열 형식을 반환합니다 (예: "BTC/USDT").
    pub fn to_standard_string(&self) -> String {
        format!("{}/{}", self.base, self.quote)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

impl FromStr for Symbol {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_creation() {
        let symbol = Symbol::new("btc", "usdt");
        assert_eq!(symbol.base, "BTC");
        assert_eq!(symbol.quote, "USDT");
    }

    #[test]
    fn test_symbol_parse_slash() {
        let symbol = Symbol::parse("eth/usdt").unwrap();
        assert_eq!(symbol.base, "ETH");
        assert_eq!(symbol.quote, "USDT");
    }

    #[test]
    fn test_symbol_parse_concatenated() {
        let symbol = Symbol::parse("BTCUSDT").unwrap();
        assert_eq!(symbol.base, "BTC");
        assert_eq!(symbol.quote, "USDT");

        let symbol = Symbol::parse("ETHBTC").unwrap();
        assert_eq!(symbol.base, "ETH");
        assert_eq!(symbol.quote, "BTC");
    }

    #[test]
    fn test_symbol_parse_unknown_quote_fallback() {
        // 접미사가 알려진 호가 자산이 아니면 마지막 4글자로 분해
        let symbol = Symbol::parse("DOGEEURO").unwrap();
        assert_eq!(symbol.base, "DOGE");
        assert_eq!(symbol.quote, "EURO");
    }

    #[test]
    fn test_symbol_parse_invalid() {
        assert!(Symbol::parse("/USDT").is_err());
        assert!(Symbol::parse("BTC/").is_err());
        assert!(Symbol::parse("BTC").is_err());
    }

    #[test]
    fn test_symbol_display() {
        let symbol = Symbol::new("BTC", "USDT");
        assert_eq!(symbol.to_string(), "BTC/USDT");
        assert_eq!(symbol.to_exchange_symbol(), "BTCUSDT");
    }
}
