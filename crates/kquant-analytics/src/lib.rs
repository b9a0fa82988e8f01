//! 지표 계산 및 횡단면 스코어링 엔진.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 재무제표 기반 퀀트 지표 계산 (수익성, 안정성, 성장성, 현금흐름, 가치)
//! - 유니버스/업종 내 백분위 순위와 7개 카테고리 점수
//! - 가중 합산 최종 점수, 카테고리 해설, 종합 코멘트
//! - 데이터 수집 현황, 정합성 점검, 주가 요약
//! - 위 과정을 묶은 단일 종목 분석 파이프라인
//!
//! # 사용 예시
//!
//! ```ignore
//! use kquant_analytics::{AnalysisInput, QuantAnalyzer};
//!
//! let report = QuantAnalyzer::default().analyze(&input, &universe)?;
//! println!("{}", report.summary);
//! ```

pub mod calculator;
pub mod commentary;
pub mod consistency;
pub mod percentile;
pub mod price;
pub mod quality;
pub mod report;
pub mod scorer;

pub use calculator::{debt_ratio, growth_rate, MetricCalculator};
pub use commentary::{compose_comment, explanations, final_comment, Tier};
pub use consistency::{diff_pct, ConsistencyReport, Grade, MetricComparison};
pub use percentile::{percentile_rank, percentile_score, Population};
pub use price::PriceSummary;
pub use quality::{DataQualityReport, MissingAccount};
pub use report::{AnalysisInput, AnalysisReport, QuantAnalyzer, ScoreBreakdown};
pub use scorer::{ScoreSummary, Scorer};
