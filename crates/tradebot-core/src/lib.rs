//! # Tradebot Core
//!
//! 트레이딩 클라이언트의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - 주문 및 주문 수명주기 타입
//! - 시장 데이터 구조체 (캔들, 시세, 호가창)
//! - 심볼 및 타임프레임 정의
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
