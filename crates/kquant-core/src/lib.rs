//! # K-Quant Core
//!
//! 상장기업 재무 건전성 분석의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! - 연도별 재무제표와 재무 이력
//! - 시장 스냅샷 (시가총액, 상장주식수, 주가 시계열)
//! - 비교 대상 유니버스 테이블
//! - 카테고리별 지표 모음과 점수
//! - 스코어링 설정
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
