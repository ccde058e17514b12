//! Binance Futures 거래소 커넥터.
//!
//! USDT-M 선물 REST API (`/fapi/...`) 구현. 메인넷과 테스트넷을 모두
//! 지원하며 서명이 필요한 요청은 HMAC-SHA256으로 쿼리를 서명합니다.

#![allow(dead_code)] // API 응답 필드 전체 매핑 (일부만 사용)

use crate::error::ExchangeError;
use crate::traits::{Balance, Exchange, ExchangeResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use sha2::Sha256;
use std::collections::BTreeMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info};
use tradebot_core::{
    Candle, OrderBook, OrderBookLevel, OrderRecord, OrderRequest, OrderState, OrderType, Side,
    Symbol, Ticker, TimeInForce, Timeframe,
};

type HmacSha256 = Hmac<Sha256>;

// ============================================================================
// 설정
// ============================================================================

/// Binance 클라이언트 설정.
///
/// # 보안
/// - `Debug` 구현은 민감 정보(`api_key`, `api_secret`)를 마스킹합니다.
#[derive(Clone)]
pub struct BinanceConfig {
    /// API 키
    pub api_key: String,
    /// API 시크릿
    pub api_secret: String,
    /// 테스트넷 사용
    pub testnet: bool,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
    /// 수신 윈도우 (밀리초)
    pub recv_window: u64,
    /// 기본 URL 오버라이드 (프록시 또는 테스트용)
    pub base_url: Option<String>,
}

impl fmt::Debug for BinanceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let masked_key = if self.api_key.len() > 8 {
            format!(
                "{}...{}",
                &self.api_key[..4],
                &self.api_key[self.api_key.len() - 4..]
            )
        } else {
            "***REDACTED***".to_string()
        };

        f.debug_struct("BinanceConfig")
            .field("api_key", &masked_key)
            .field("api_secret", &"***REDACTED***")
            .field("testnet", &self.testnet)
            .field("timeout_secs", &self.timeout_secs)
            .field("recv_window", &self.recv_window)
            .finish()
    }
}

impl BinanceConfig {
    /// 새 설정 생성.
    pub fn new(api_key: String, api_secret: String) -> Self {
        Self {
            api_key,
            api_secret,
            testnet: true,
            timeout_secs: 30,
            recv_window: 5000,
            base_url: None,
        }
    }

    /// 테스트넷 사용 여부 설정.
    pub fn with_testnet(mut self, testnet: bool) -> Self {
        self.testnet = testnet;
        self
    }

    /// 요청 타임아웃 설정.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// 수신 윈도우 설정.
    pub fn with_recv_window(mut self, ms: u64) -> Self {
        self.recv_window = ms;
        self
    }

    /// 기본 URL을 오버라이드합니다.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// 환경 변수에서 생성.
    ///
    /// `BINANCE_API_KEY` / `BINANCE_API_SECRET`가 필요하며
    /// `BINANCE_TESTNET`(기본 true)로 테스트넷을 선택합니다.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("BINANCE_API_KEY").ok()?;
        let api_secret = std::env::var("BINANCE_API_SECRET").ok()?;
        let testnet = std::env::var("BINANCE_TESTNET")
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(true);

        Some(Self::new(api_key, api_secret).with_testnet(testnet))
    }

    /// REST API 기본 URL 반환.
    pub fn rest_base_url(&self) -> &str {
        if let Some(ref url) = self.base_url {
            return url;
        }
        if self.testnet {
            "https://testnet.binancefuture.com"
        } else {
            "https://fapi.binance.com"
        }
    }
}

// ============================================================================
// API 응답 타입
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FuturesOrderResponse {
    symbol: String,
    order_id: i64,
    status: String,
    side: String,
    #[serde(rename = "type")]
    order_type: String,
    price: String,
    avg_price: Option<String>,
    orig_qty: String,
    executed_qty: String,
    cum_quote: Option<String>,
    time_in_force: Option<String>,
    update_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FuturesAssetBalance {
    asset: String,
    wallet_balance: String,
    available_balance: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FuturesAccount {
    assets: Vec<FuturesAssetBalance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FuturesTicker24h {
    price_change: String,
    price_change_percent: String,
    last_price: String,
    open_price: String,
    high_price: String,
    low_price: String,
    volume: String,
    quote_volume: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FuturesBookTicker {
    bid_price: String,
    ask_price: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FuturesOrderBook {
    bids: Vec<[String; 2]>,
    asks: Vec<[String; 2]>,
}

#[derive(Debug, Deserialize)]
struct FuturesKline(
    i64,    // 0: Open time
    String, // 1: Open
    String, // 2: High
    String, // 3: Low
    String, // 4: Close
    String, // 5: Volume
    i64,    // 6: Close time
    String, // 7: Quote asset volume
    i64,    // 8: Number of trades
    String, // 9: Taker buy base asset volume
    String, // 10: Taker buy quote asset volume
    String, // 11: Ignore
);

#[derive(Debug, Deserialize)]
struct BinanceErrorBody {
    code: i32,
    msg: String,
}

// ============================================================================
// Binance 클라이언트
// ============================================================================

/// Binance Futures 거래소 클라이언트.
pub struct BinanceClient {
    config: BinanceConfig,
    client: Client,
}

impl BinanceClient {
    /// 새 Binance 클라이언트 생성.
    ///
    /// # Errors
    /// HTTP 클라이언트 생성에 실패하면 `ExchangeError::NetworkError`를 반환합니다.
    pub fn new(config: BinanceConfig) -> Result<Self, ExchangeError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ExchangeError::NetworkError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// 환경 변수에서 생성.
    pub fn from_env() -> Option<Self> {
        BinanceConfig::from_env().and_then(|config| Self::new(config).ok())
    }

    /// 현재 타임스탬프(밀리초) 반환.
    fn timestamp_ms() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }

    /// HMAC-SHA256으로 쿼리 문자열 서명.
    fn sign(&self, query: &str) -> String {
        // HMAC은 키 길이 제한이 없으므로 실패하지 않음
        let mut mac =
            HmacSha256::new_from_slice(self.config.api_secret.as_bytes()).expect("Invalid key");
        mac.update(query.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// 파라미터에서 쿼리 문자열 생성.
    fn build_query(params: &[(&str, String)]) -> String {
        params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }

    fn signed_query(&self, params: &[(&str, String)]) -> String {
        let mut all_params = params.to_vec();
        all_params.push(("recvWindow", self.config.recv_window.to_string()));
        all_params.push(("timestamp", Self::timestamp_ms().to_string()));

        let query = Self::build_query(&all_params);
        let signature = self.sign(&query);
        format!("{}&signature={}", query, signature)
    }

    /// 공개 API 요청 (인증 불필요).
    async fn public_get<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> ExchangeResult<T> {
        let url = format!("{}{}", self.config.rest_base_url(), endpoint);
        let query = Self::build_query(params);
        let full_url = if query.is_empty() {
            url
        } else {
            format!("{}?{}", url, query)
        };

        debug!("GET {}", full_url);

        let response = self
            .client
            .get(&full_url)
            .send()
            .await
            .map_err(|e| ExchangeError::NetworkError(e.to_string()))?;

        self.handle_response(response).await
    }

    /// 서명된 GET 요청.
    async fn signed_get<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> ExchangeResult<T> {
        let url = format!(
            "{}{}?{}",
            self.config.rest_base_url(),
            endpoint,
            self.signed_query(params)
        );

        debug!("GET (signed) {}", endpoint);

        let response = self
            .client
            .get(&url)
            .header("X-MBX-APIKEY", &self.config.api_key)
            .send()
            .await
            .map_err(|e| ExchangeError::NetworkError(e.to_string()))?;

        self.handle_response(response).await
    }

    /// 서명된 POST 요청.
    async fn signed_post<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> ExchangeResult<T> {
        let url = format!("{}{}", self.config.rest_base_url(), endpoint);
        let body = self.signed_query(params);

        debug!("POST (signed) {}", endpoint);

        let response = self
            .client
            .post(&url)
            .header("X-MBX-APIKEY", &self.config.api_key)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(|e| ExchangeError::NetworkError(e.to_string()))?;

        self.handle_response(response).await
    }

    /// 서명된 DELETE 요청.
    async fn signed_delete<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> ExchangeResult<T> {
        let url = format!(
            "{}{}?{}",
            self.config.rest_base_url(),
            endpoint,
            self.signed_query(params)
        );

        debug!("DELETE (signed) {}", endpoint);

        let response = self
            .client
            .delete(&url)
            .header("X-MBX-APIKEY", &self.config.api_key)
            .send()
            .await
            .map_err(|e| ExchangeError::NetworkError(e.to_string()))?;

        self.handle_response(response).await
    }

    /// API 응답 처리.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> ExchangeResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExchangeError::NetworkError(e.to_string()))?;

        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| {
                error!("Failed to parse response: {} - Body: {}", e, body);
                ExchangeError::ParseError(e.to_string())
            })
        } else if let Ok(err) = serde_json::from_str::<BinanceErrorBody>(&body) {
            Err(map_error_code(err.code, &err.msg))
        } else {
            Err(ExchangeError::ApiError {
                code: status.as_u16() as i32,
                message: body,
            })
        }
    }

    /// 주문 응답을 정규 주문 레코드로 변환.
    fn parse_order(resp: &FuturesOrderResponse) -> ExchangeResult<OrderRecord> {
        let symbol = Symbol::parse(&resp.symbol)?;
        let side: Side = resp.side.parse()?;
        let order_type: OrderType = resp.order_type.parse()?;

        let status = match resp.status.as_str() {
            "NEW" | "PARTIALLY_FILLED" => OrderState::Open,
            "FILLED" => OrderState::Closed,
            "CANCELED" | "EXPIRED" | "REJECTED" => OrderState::Canceled,
            other => {
                return Err(ExchangeError::ParseError(format!(
                    "unknown order status: {}",
                    other
                )))
            }
        };

        let amount = parse_decimal(&resp.orig_qty);
        let filled = parse_decimal(&resp.executed_qty);
        let price = parse_decimal(&resp.price);
        let average = resp
            .avg_price
            .as_deref()
            .map(parse_decimal)
            .filter(|p| !p.is_zero())
            .unwrap_or(price);
        let cost = resp
            .cum_quote
            .as_deref()
            .map(parse_decimal)
            .unwrap_or_else(|| filled * average);

        let time_in_force = resp
            .time_in_force
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(TimeInForce::GTC);

        let timestamp = resp
            .update_time
            .and_then(DateTime::from_timestamp_millis)
            .unwrap_or_else(Utc::now);

        Ok(OrderRecord {
            id: resp.order_id as u64,
            symbol,
            side,
            order_type,
            price,
            amount,
            filled,
            remaining: amount - filled,
            cost,
            average,
            status,
            time_in_force,
            timestamp,
        })
    }
}

/// Binance 에러 코드를 ExchangeError로 매핑.
fn map_error_code(code: i32, msg: &str) -> ExchangeError {
    match code {
        -1002 => ExchangeError::Unauthorized(msg.to_string()),
        -1003 => ExchangeError::RateLimited,
        -1013 => ExchangeError::InvalidQuantity(msg.to_string()),
        -1021 => ExchangeError::TimestampError(msg.to_string()),
        -1121 => ExchangeError::SymbolNotFound(msg.to_string()),
        -2010 => ExchangeError::InsufficientBalance(msg.to_string()),
        -2011 | -2013 => ExchangeError::OrderNotFound(msg.to_string()),
        _ => ExchangeError::ApiError {
            code,
            message: msg.to_string(),
        },
    }
}

/// 문자열에서 Decimal 파싱. 실패 시 0.
fn parse_decimal(s: &str) -> Decimal {
    s.parse().unwrap_or(Decimal::ZERO)
}

#[async_trait]
impl Exchange for BinanceClient {
    fn name(&self) -> &str {
        if self.config.testnet {
            "binance-testnet"
        } else {
            "binance"
        }
    }

    async fn create_order(&self, request: &OrderRequest) -> ExchangeResult<OrderRecord> {
        let mut params = vec![
            ("symbol", request.symbol.to_exchange_symbol()),
            ("side", request.side.to_string()),
            ("type", request.order_type.to_string()),
            ("quantity", request.amount.to_string()),
        ];

        if request.order_type == OrderType::Limit {
            let price = request.price.ok_or_else(|| {
                ExchangeError::OrderRejected("limit order requires a price".to_string())
            })?;
            params.push(("price", price.to_string()));
            params.push(("timeInForce", request.time_in_force.to_string()));
        }

        info!(
            "Placing {} {} order for {} {} @ {:?}",
            request.side, request.order_type, request.amount, request.symbol, request.price
        );

        let resp: FuturesOrderResponse = self.signed_post("/fapi/v1/order", &params).await?;

        info!("Order placed: {}", resp.order_id);
        Self::parse_order(&resp)
    }

    async fn cancel_order(&self, order_id: u64, symbol: &Symbol) -> ExchangeResult<OrderRecord> {
        let params = vec![
            ("symbol", symbol.to_exchange_symbol()),
            ("orderId", order_id.to_string()),
        ];

        let resp: FuturesOrderResponse = self.signed_delete("/fapi/v1/order", &params).await?;

        info!("Order {} canceled", order_id);
        Self::parse_order(&resp)
    }

    async fn fetch_order(&self, order_id: u64, symbol: &Symbol) -> ExchangeResult<OrderRecord> {
        let params = vec![
            ("symbol", symbol.to_exchange_symbol()),
            ("orderId", order_id.to_string()),
        ];

        let resp: FuturesOrderResponse = self.signed_get("/fapi/v1/order", &params).await?;
        Self::parse_order(&resp)
    }

    async fn fetch_open_orders(&self, symbol: Option<&Symbol>) -> ExchangeResult<Vec<OrderRecord>> {
        let params: Vec<(&str, String)> = match symbol {
            Some(s) => vec![("symbol", s.to_exchange_symbol())],
            None => vec![],
        };

        let resp: Vec<FuturesOrderResponse> =
            self.signed_get("/fapi/v1/openOrders", &params).await?;

        resp.iter().map(Self::parse_order).collect()
    }

    async fn fetch_balance(&self) -> ExchangeResult<BTreeMap<String, Balance>> {
        let resp: FuturesAccount = self.signed_get("/fapi/v2/account", &[]).await?;

        Ok(resp
            .assets
            .into_iter()
            .filter_map(|a| {
                let wallet = parse_decimal(&a.wallet_balance);
                let free = parse_decimal(&a.available_balance);
                if wallet.is_zero() {
                    return None;
                }
                let locked = (wallet - free).max(Decimal::ZERO);
                Some((
                    a.asset.clone(),
                    Balance {
                        asset: a.asset,
                        free,
                        locked,
                    },
                ))
            })
            .collect())
    }

    async fn fetch_ticker(&self, symbol: &Symbol) -> ExchangeResult<Ticker> {
        let exchange_symbol = symbol.to_exchange_symbol();

        let stats: FuturesTicker24h = self
            .public_get(
                "/fapi/v1/ticker/24hr",
                &[("symbol", exchange_symbol.clone())],
            )
            .await?;
        let book: FuturesBookTicker = self
            .public_get("/fapi/v1/ticker/bookTicker", &[("symbol", exchange_symbol)])
            .await?;

        Ok(Ticker {
            symbol: symbol.clone(),
            bid: parse_decimal(&book.bid_price),
            ask: parse_decimal(&book.ask_price),
            last: parse_decimal(&stats.last_price),
            open_24h: parse_decimal(&stats.open_price),
            high_24h: parse_decimal(&stats.high_price),
            low_24h: parse_decimal(&stats.low_price),
            change_24h: parse_decimal(&stats.price_change),
            change_24h_percent: parse_decimal(&stats.price_change_percent),
            base_volume: parse_decimal(&stats.volume),
            quote_volume: parse_decimal(&stats.quote_volume),
            timestamp: Utc::now(),
        })
    }

    async fn fetch_order_book(
        &self,
        symbol: &Symbol,
        limit: Option<usize>,
    ) -> ExchangeResult<OrderBook> {
        let params = vec![
            ("symbol", symbol.to_exchange_symbol()),
            ("limit", limit.unwrap_or(20).to_string()),
        ];

        let resp: FuturesOrderBook = self.public_get("/fapi/v1/depth", &params).await?;

        let to_levels = |levels: Vec<[String; 2]>| {
            levels
                .into_iter()
                .map(|[price, qty]| OrderBookLevel {
                    price: parse_decimal(&price),
                    quantity: parse_decimal(&qty),
                })
                .collect()
        };

        Ok(OrderBook {
            symbol: symbol.clone(),
            bids: to_levels(resp.bids),
            asks: to_levels(resp.asks),
            timestamp: Utc::now(),
        })
    }

    /// 공개 ping으로 연결을 확인한 뒤 서명된 잔고 조회로 인증을 확인합니다.
    async fn test_connection(&self) -> bool {
        let ping: ExchangeResult<serde_json::Value> = self.public_get("/fapi/v1/ping", &[]).await;
        if ping.is_err() {
            return false;
        }
        self.fetch_balance().await.is_ok()
    }

    async fn fetch_ohlcv(
        &self,
        symbol: &Symbol,
        timeframe: Timeframe,
        limit: Option<usize>,
    ) -> ExchangeResult<Vec<Candle>> {
        let params = vec![
            ("symbol", symbol.to_exchange_symbol()),
            ("interval", timeframe.to_binance_interval().to_string()),
            ("limit", limit.unwrap_or(24).to_string()),
        ];

        let resp: Vec<FuturesKline> = self.public_get("/fapi/v1/klines", &params).await?;

        Ok(resp
            .into_iter()
            .map(|k| Candle {
                symbol: symbol.clone(),
                timeframe,
                open_time: DateTime::from_timestamp_millis(k.0).unwrap_or_else(Utc::now),
                open: parse_decimal(&k.1),
                high: parse_decimal(&k.2),
                low: parse_decimal(&k.3),
                close: parse_decimal(&k.4),
                volume: parse_decimal(&k.5),
                close_time: DateTime::from_timestamp_millis(k.6).unwrap_or_else(Utc::now),
            })
            .collect())
    }
}
