//! 단일 종목 분석 파이프라인.
//!
//! 재무 이력 검증 → 지표 계산 → 정합성 점검 → 유니버스 값 반영 → 시장/업종 채점 →
//! 해설 생성 순서로 진행하며, 결과를 하나의 [`AnalysisReport`]로 묶습니다.

use std::collections::BTreeMap;

use kquant_core::{
    decimal_from_f64, Category, CategoryScores, FinancialHistory, FinancialStatementYear,
    KQuantError, KQuantResult, MarketSnapshot, MetricSet, ScoringConfig, UniverseTable,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::calculator::MetricCalculator;
use crate::commentary;
use crate::consistency::ConsistencyReport;
use crate::percentile::Population;
use crate::price::PriceSummary;
use crate::quality::DataQualityReport;
use crate::scorer::Scorer;

// ================================================================================================
// Input
// ================================================================================================

/// 분석 입력 (종목 하나).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisInput {
    /// 종목코드
    pub ticker: String,
    /// 회사명
    #[serde(default)]
    pub corp_name: Option<String>,
    /// 연도별 재무제표 (순서 무관)
    pub statements: Vec<FinancialStatementYear>,
    /// 시장 스냅샷
    pub market: MarketSnapshot,
}

// ================================================================================================
// Report
// ================================================================================================

/// 카테고리별 점수 내역.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub category: Category,
    /// 배점 (가중치)
    pub weight: f64,
    /// 시장 전체 기준 점수 (소수점 1자리)
    pub market_score: Decimal,
    /// 동일 업종 기준 점수 (소수점 1자리)
    pub sector_score: Option<Decimal>,
    /// 최종 점수 기여분 `market_score * weight / 100` (소수점 2자리)
    pub contribution: Decimal,
    /// 점수 근거 지표
    pub description: String,
}

/// 분석 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub ticker: String,
    pub corp_name: Option<String>,
    /// 분석 기준 회계연도
    pub latest_year: i32,
    /// 유니버스 값 반영 후 지표
    pub metrics: MetricSet,
    /// 가중 합산 최종 점수
    pub final_score: f64,
    /// 한 줄 요약
    pub summary: String,
    /// 시장 전체 기준 카테고리 점수
    pub market_scores: CategoryScores,
    /// 동일 업종 기준 카테고리 점수 (업종 비교를 생략하면 `None`)
    pub sector_scores: Option<CategoryScores>,
    /// 업종 점수에 실제 사용된 모집단
    pub sector_population: Population,
    pub breakdown: Vec<ScoreBreakdown>,
    pub explanations: BTreeMap<Category, String>,
    /// 종합 코멘트
    pub comment: String,
    /// 정합성 점검 (종목이 유니버스에 없으면 `None`)
    pub consistency: Option<ConsistencyReport>,
    pub price: Option<PriceSummary>,
    pub data_quality: DataQualityReport,
}

impl AnalysisReport {
    /// 기여분 합계.
    pub fn breakdown_total(&self) -> Decimal {
        self.breakdown.iter().map(|b| b.contribution).sum()
    }

    /// 들여쓰기된 JSON 문자열.
    pub fn to_json_pretty(&self) -> KQuantResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// 카테고리 점수 근거 지표 설명.
pub fn category_description(category: Category) -> &'static str {
    match category {
        Category::Value => "PBR, PER (낮을수록 좋음), BPS",
        Category::Profitability => "EPS (높을수록 좋음), ROE",
        Category::Dividend => "배당수익률 (높을수록 좋음)",
        Category::GrowthPotential => "BPS (높을수록 좋음)",
        Category::Stability => "시가총액, 거래량 (높을수록 좋음)",
        Category::Growth => "매출액, 이익 성장률 (높을수록 좋음)",
        Category::CashFlow => "영업활동 현금흐름 (높을수록 좋음)",
    }
}

// ================================================================================================
// Analyzer
// ================================================================================================

/// 단일 종목 분석기.
#[derive(Debug, Clone)]
pub struct QuantAnalyzer {
    config: ScoringConfig,
    sector_view: bool,
}

impl Default for QuantAnalyzer {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

impl QuantAnalyzer {
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            config,
            sector_view: true,
        }
    }

    /// 동일 업종 채점 생략 여부.
    pub fn with_sector_view(mut self, enabled: bool) -> Self {
        self.sector_view = enabled;
        self
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// 종목 하나를 유니버스와 비교해 분석합니다.
    ///
    /// # 에러
    ///
    /// - 설정 검증 실패 (가중치 합계 등): [`KQuantError::Config`]
    /// - 재무 이력이 `min_history_years` 미만: [`KQuantError::InsufficientHistory`]
    /// - 연도 중복: [`KQuantError::DuplicateYear`]
    pub fn analyze(
        &self,
        input: &AnalysisInput,
        universe: &UniverseTable,
    ) -> KQuantResult<AnalysisReport> {
        let _span = kquant_core::analysis_span!("analyze", input.ticker).entered();

        self.config.validate()?;

        let required = self.config.min_history_years;
        if input.statements.len() < required {
            return Err(KQuantError::InsufficientHistory {
                required,
                provided: input.statements.len(),
            });
        }
        let history = FinancialHistory::new(input.statements.clone())?;
        let data_quality = DataQualityReport::from_history(&history);

        // 덮어쓰기 전 값으로 정합성 점검
        let derived = MetricCalculator::calculate(&history, &input.market);
        let (metrics, consistency) = match universe.get(&input.ticker) {
            Some(row) => {
                let consistency = ConsistencyReport::check(&input.ticker, &derived, universe)?;
                let mut metrics = derived;
                MetricCalculator::apply_reference(&mut metrics, row);
                (metrics, Some(consistency))
            }
            None => {
                debug!("Ticker not in universe, skipping reference override");
                (derived, None)
            }
        };

        let scorer = Scorer::new(input.ticker.as_str(), &metrics, universe)
            .with_config(self.config.clone());
        let summary = scorer.final_score();
        let sector_scores = self.sector_view.then(|| scorer.sector_scores());
        let sector_population = scorer.effective_population(Population::Sector);

        let breakdown = self.breakdown(&summary.category_scores, sector_scores.as_ref());
        let explanations = commentary::explanations(&scorer);
        let comment = commentary::compose_comment(
            &summary.category_scores,
            &scorer.neutral_categories(),
            &self.config,
        );

        info!(
            final_score = summary.final_score,
            population = ?sector_population,
            "Analysis completed"
        );

        Ok(AnalysisReport {
            ticker: input.ticker.clone(),
            corp_name: input.corp_name.clone(),
            latest_year: history.latest().year,
            final_score: summary.final_score,
            summary: summary.comment,
            market_scores: summary.category_scores,
            sector_scores,
            sector_population,
            breakdown,
            explanations,
            comment,
            consistency,
            price: PriceSummary::from_snapshot(&input.market),
            data_quality,
            metrics,
        })
    }

    fn breakdown(
        &self,
        market: &CategoryScores,
        sector: Option<&CategoryScores>,
    ) -> Vec<ScoreBreakdown> {
        let round = |value: f64, dp| decimal_from_f64(value, dp).unwrap_or_default();

        Category::ALL
            .into_iter()
            .map(|category| {
                let weight = self.config.weights.get(category);
                let score = market.get(category);
                ScoreBreakdown {
                    category,
                    weight,
                    market_score: round(score, 1),
                    sector_score: sector.map(|s| round(s.get(category), 1)),
                    contribution: round(score * weight / 100.0, 2),
                    description: category_description(category).to_string(),
                }
            })
            .collect()
    }
}
