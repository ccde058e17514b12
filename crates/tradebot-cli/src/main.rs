//! 트레이딩 클라이언트 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 시뮬레이션 모드에서 시장가 매수
//! tradebot market -s BTC/USDT -S buy -q 0.01
//!
//! # 지정가 매도 (확인 프롬프트 생략)
//! tradebot limit -s ETH/USDT -S sell -q 1.0 -p 2600 --yes
//!
//! # 미체결 주문/잔고/시세 조회
//! tradebot open-orders
//! tradebot balance
//! tradebot ticker -s BTC/USDT
//!
//! # Binance 테스트넷으로 연결 확인 (.env에 자격증명 필요)
//! tradebot --mode binance test
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tradebot_core::{init_logging, AppConfig, ExchangeMode, LogConfig};
use tradebot_exchange::{BinanceClient, BinanceConfig, Exchange, SimulatedConfig, SimulatedExchange};

mod commands;

#[derive(Parser)]
#[command(name = "tradebot")]
#[command(about = "Offline-first crypto trading client", long_about = None)]
#[command(version)]
struct Cli {
    /// 거래 백엔드 모드 (simulated | binance)
    #[arg(short, long, global = true)]
    mode: Option<String>,

    /// 주문 확인 프롬프트 생략
    #[arg(short = 'y', long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 시장가 주문 실행
    Market {
        /// 거래 심볼 (예: BTC/USDT 또는 BTCUSDT)
        #[arg(short, long)]
        symbol: String,

        /// 주문 방향 (buy | sell)
        #[arg(short = 'S', long)]
        side: String,

        /// 주문 수량 (기준 자산 단위)
        #[arg(short, long)]
        quantity: Decimal,
    },

    /// 지정가 주문 실행
    Limit {
        /// 거래 심볼 (예: BTC/USDT 또는 BTCUSDT)
        #[arg(short, long)]
        symbol: String,

        /// 주문 방향 (buy | sell)
        #[arg(short = 'S', long)]
        side: String,

        /// 주문 수량 (기준 자산 단위)
        #[arg(short, long)]
        quantity: Decimal,

        /// 지정가
        #[arg(short, long)]
        price: Decimal,

        /// 주문 유효 기간 (GTC | IOC | FOK)
        #[arg(long, default_value = "GTC")]
        tif: String,
    },

    /// 주문 취소
    Cancel {
        /// 거래 심볼
        #[arg(short, long)]
        symbol: String,

        /// 주문 ID
        #[arg(short, long)]
        order_id: u64,
    },

    /// 주문 상태 조회
    Status {
        /// 거래 심볼
        #[arg(short, long)]
        symbol: String,

        /// 주문 ID
        #[arg(short, long)]
        order_id: u64,
    },

    /// 미체결 주문 목록 조회
    OpenOrders {
        /// 심볼 필터 (생략 시 전체)
        #[arg(short, long)]
        symbol: Option<String>,
    },

    /// 자산 잔고 조회
    Balance,

    /// 시세 조회
    Ticker {
        /// 거래 심볼
        #[arg(short, long)]
        symbol: String,
    },

    /// 호가창 조회
    Book {
        /// 거래 심볼
        #[arg(short, long)]
        symbol: String,

        /// 호가 깊이
        #[arg(short, long, default_value_t = 20)]
        depth: usize,
    },

    /// OHLCV 캔들 조회
    Candles {
        /// 거래 심볼
        #[arg(short, long)]
        symbol: String,

        /// 타임프레임 (1m, 5m, 15m, 30m, 1h, 4h, 1d)
        #[arg(short, long, default_value = "1h")]
        timeframe: String,

        /// 캔들 수
        #[arg(short, long, default_value_t = 24)]
        limit: usize,
    },

    /// 백엔드 연결/인증 확인
    Test,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load_default().context("failed to load configuration")?;

    let log_format = config.logging.format.parse().unwrap_or_default();
    init_logging(LogConfig::new(&config.logging.level).with_format(log_format))
        .context("failed to initialize logging")?;

    let mode = match &cli.mode {
        Some(m) => m.parse::<ExchangeMode>()?,
        None => config.mode,
    };
    let exchange = build_exchange(mode, &config)?;

    tracing::debug!(mode = %mode, exchange = exchange.name(), "Backend selected");

    match cli.command {
        Commands::Market {
            symbol,
            side,
            quantity,
        } => commands::order::market(exchange.as_ref(), &symbol, &side, quantity, cli.yes).await,
        Commands::Limit {
            symbol,
            side,
            quantity,
            price,
            tif,
        } => {
            commands::order::limit(exchange.as_ref(), &symbol, &side, quantity, price, &tif, cli.yes)
                .await
        }
        Commands::Cancel { symbol, order_id } => {
            commands::order::cancel(exchange.as_ref(), &symbol, order_id).await
        }
        Commands::Status { symbol, order_id } => {
            commands::order::status(exchange.as_ref(), &symbol, order_id).await
        }
        Commands::OpenOrders { symbol } => {
            commands::order::open_orders(exchange.as_ref(), symbol.as_deref()).await
        }
        Commands::Balance => commands::account::balance(exchange.as_ref()).await,
        Commands::Ticker { symbol } => {
            commands::market_data::ticker(exchange.as_ref(), &symbol).await
        }
        Commands::Book { symbol, depth } => {
            commands::market_data::book(exchange.as_ref(), &symbol, depth).await
        }
        Commands::Candles {
            symbol,
            timeframe,
            limit,
        } => commands::market_data::candles(exchange.as_ref(), &symbol, &timeframe, limit).await,
        Commands::Test => commands::account::test(exchange.as_ref()).await,
    }
}

/// 선택된 모드에 맞는 백엔드를 생성합니다.
fn build_exchange(mode: ExchangeMode, config: &AppConfig) -> anyhow::Result<Box<dyn Exchange>> {
    match mode {
        ExchangeMode::Simulated => Ok(Box::new(SimulatedExchange::new(SimulatedConfig::default()))),
        ExchangeMode::Binance => {
            let binance_config = BinanceConfig::from_env()
                .context("BINANCE_API_KEY / BINANCE_API_SECRET not set")?
                .with_testnet(config.binance.testnet)
                .with_timeout_secs(config.binance.timeout_secs)
                .with_recv_window(config.binance.recv_window);

            Ok(Box::new(BinanceClient::new(binance_config)?))
        }
    }
}
