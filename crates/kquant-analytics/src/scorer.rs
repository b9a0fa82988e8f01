//! 횡단면 스코어러.
//!
//! 종목의 지표를 유니버스(또는 동일 업종) 내 백분위로 환산해 7개 카테고리 점수와
//! 가중 합산 최종 점수를 계산합니다.
//!
//! # 카테고리 공식
//!
//! | 카테고리 | 점수 |
//! |---|---|
//! | 가치 | `0.4*PBR(↓) + 0.4*PER(↓) + 0.2*BPS(↑)` |
//! | 수익성 | `0.8*EPS(↑) + 0.2*min(ROE*3.33, 100)` (ROE 없으면 EPS만) |
//! | 배당 | `DIV(↑)` |
//! | 성장잠재력 | `BPS(↑)` |
//! | 안정성 | `(시가총액(↑) + 거래량(↑)) / 2` |
//! | 성장성 | 성장률별 `min(|g|*2, 100)`의 평균 |
//! | 현금흐름 | `min(OCF_시가총액비율*5, 100)` |
//!
//! ↑/↓는 백분위 방향(높을수록/낮을수록 좋음)입니다. 성장성과 현금흐름은 모집단과
//! 무관하게 크기 기반으로 계산합니다.

use kquant_core::{
    Category, CategoryScores, MetricKey, MetricSet, RankMetric, ScoringConfig, UniverseRow,
    UniverseTable,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::percentile::{percentile_rank, percentile_score, Population};

// ================================================================================================
// Types
// ================================================================================================

/// 최종 점수 요약.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    /// 가중 합산 점수 (0-100)
    pub final_score: f64,
    /// 카테고리별 점수
    pub category_scores: CategoryScores,
    /// 한 줄 요약
    pub comment: String,
}

/// 횡단면 스코어러.
///
/// 종목 하나의 채점 실행마다 새로 생성합니다. 지표 모음과 유니버스는 빌려 쓰며
/// 변경하지 않습니다.
#[derive(Debug, Clone)]
pub struct Scorer<'a> {
    ticker: String,
    metrics: &'a MetricSet,
    universe: &'a UniverseTable,
    config: ScoringConfig,
}

impl<'a> Scorer<'a> {
    /// 기본 설정으로 생성.
    pub fn new(
        ticker: impl Into<String>,
        metrics: &'a MetricSet,
        universe: &'a UniverseTable,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            metrics,
            universe,
            config: ScoringConfig::default(),
        }
    }

    /// 스코어링 설정 지정.
    ///
    /// 설정을 검증하지 않습니다. 코드에서 직접 만든 설정은 호출 측에서
    /// [`ScoringConfig::validate`]를 먼저 호출해야 합니다.
    /// [`QuantAnalyzer`](crate::QuantAnalyzer)는 분석 전에 검증합니다.
    pub fn with_config(mut self, config: ScoringConfig) -> Self {
        self.config = config;
        self
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn metrics(&self) -> &'a MetricSet {
        self.metrics
    }

    pub fn universe(&self) -> &'a UniverseTable {
        self.universe
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// 유니버스에서 이 종목의 행.
    pub fn universe_row(&self) -> Option<&'a UniverseRow> {
        self.universe.get(&self.ticker)
    }

    // ============================================================================================
    // 백분위 순위
    // ============================================================================================

    /// 시장 전체 기준 백분위 점수 (0-100).
    pub fn rank(&self, metric: RankMetric, lower_is_better: bool) -> f64 {
        self.rank_in(metric, lower_is_better, Population::Market)
    }

    /// 동일 업종 기준 백분위 점수 (0-100).
    ///
    /// 업종명이 없거나 업종 종목 수가 `sector_min_peers` 미만이면 시장 전체 기준입니다.
    pub fn sector_rank(&self, metric: RankMetric, lower_is_better: bool) -> f64 {
        self.rank_in(metric, lower_is_better, Population::Sector)
    }

    /// 지표 이름으로 시장 전체 백분위 점수 조회.
    ///
    /// 이름은 유니버스 컬럼명(`"PER"`, `"시가총액"`) 또는 영문 이름(`"market_cap"`)과
    /// 정확히 일치해야 하며, 알 수 없는 이름은 0점입니다.
    pub fn rank_by_name(&self, name: &str, lower_is_better: bool) -> f64 {
        match name.parse::<RankMetric>() {
            Ok(metric) => self.rank(metric, lower_is_better),
            Err(_) => {
                debug!(ticker = %self.ticker, name, "Unknown rank metric");
                0.0
            }
        }
    }

    /// 지정 모집단 기준 백분위 점수.
    ///
    /// 다음 경우 0점입니다.
    /// - 종목이 유니버스에 없음
    /// - 종목의 해당 컬럼 값이 없음
    /// - 모집단에 유효한 값이 없음
    pub fn rank_in(
        &self,
        metric: RankMetric,
        lower_is_better: bool,
        population: Population,
    ) -> f64 {
        let Some(row) = self.universe_row() else {
            debug!(ticker = %self.ticker, %metric, "Ticker not in universe, rank is 0");
            return 0.0;
        };
        let Some(target) = row.value(metric) else {
            debug!(ticker = %self.ticker, %metric, "Missing value, rank is 0");
            return 0.0;
        };

        let pct = match self.sector_label(population) {
            Some(sector) => percentile_rank(
                self.universe
                    .sector_peers(sector)
                    .filter_map(|(_, r)| r.value(metric)),
                target,
            ),
            None => percentile_rank(
                self.universe.iter().filter_map(|(_, r)| r.value(metric)),
                target,
            ),
        };

        match pct {
            Some(pct) => percentile_score(pct, lower_is_better),
            None => {
                debug!(ticker = %self.ticker, %metric, "Empty population, rank is 0");
                0.0
            }
        }
    }

    /// 실제 적용되는 모집단.
    ///
    /// 업종 기준을 요청해도 업종 비교가 불가능하면 `Population::Market`을 반환합니다.
    pub fn effective_population(&self, requested: Population) -> Population {
        match self.sector_label(requested) {
            Some(_) => Population::Sector,
            None => Population::Market,
        }
    }

    /// 업종 기준 순위에 사용할 업종명. 시장 전체 기준이면 `None`.
    ///
    /// 종목 수는 값 누락 여부와 무관하게 업종명을 공유하는 행(자기 자신 포함)으로 셉니다.
    fn sector_label(&self, population: Population) -> Option<&'a str> {
        if population == Population::Market {
            return None;
        }

        let sector = self.universe_row()?.sector()?;
        let peers = self.universe.sector_peers(sector).count();
        if peers < self.config.sector_min_peers {
            debug!(
                ticker = %self.ticker,
                sector,
                peers,
                min_peers = self.config.sector_min_peers,
                "Too few sector peers, falling back to market"
            );
            return None;
        }
        Some(sector)
    }

    // ============================================================================================
    // 카테고리 점수
    // ============================================================================================

    /// 모집단 기준 7개 카테고리 점수.
    pub fn category_scores(&self, population: Population) -> CategoryScores {
        let _span =
            kquant_core::analysis_span!("category_scores", self.ticker, population).entered();

        let mut scores = CategoryScores::default();
        for category in Category::ALL {
            scores.set(category, self.category_score(category, population));
        }

        debug!(?scores, "Category scores computed");
        scores
    }

    /// 단일 카테고리 점수.
    pub fn category_score(&self, category: Category, population: Population) -> f64 {
        let rank = |metric, lower| self.rank_in(metric, lower, population);

        match category {
            Category::Value => {
                if !self.metrics.has_category(Category::Value) {
                    return self.config.neutral_score;
                }
                let w = &self.config.value_weights;
                w.pbr * rank(RankMetric::Pbr, true)
                    + w.per * rank(RankMetric::Per, true)
                    + w.bps * rank(RankMetric::Bps, false)
            }
            Category::Profitability => {
                let eps = rank(RankMetric::Eps, false);
                match self.metrics.number(Category::Profitability, MetricKey::Roe) {
                    Some(roe) => {
                        let w = &self.config.profitability_weights;
                        w.eps * eps + w.roe * self.capped(roe * self.config.roe_scale)
                    }
                    None => eps,
                }
            }
            Category::Dividend => rank(RankMetric::Div, false),
            Category::GrowthPotential => rank(RankMetric::Bps, false),
            Category::Stability => {
                (rank(RankMetric::MarketCap, false) + rank(RankMetric::Volume, false)) / 2.0
            }
            Category::Growth => self.growth_score(),
            Category::CashFlow => self.cash_flow_score(),
        }
    }

    /// 성장성: 성장률 크기 기반 점수 평균.
    fn growth_score(&self) -> f64 {
        let scores: Vec<f64> = self
            .growth_rates()
            .map(|g| self.capped(g.abs() * self.config.growth_scale))
            .collect();

        if scores.is_empty() {
            return self.config.neutral_score;
        }
        scores.iter().sum::<f64>() / scores.len() as f64
    }

    /// 현금흐름: OCF/시가총액 비율 기반 점수.
    fn cash_flow_score(&self) -> f64 {
        self.metrics
            .number(Category::CashFlow, MetricKey::CfoToMarketCap)
            .filter(|v| v.is_finite())
            .map(|ratio| self.capped(ratio * self.config.cash_flow_scale))
            .unwrap_or(self.config.neutral_score)
    }

    fn growth_rates(&self) -> impl Iterator<Item = f64> + '_ {
        MetricKey::GROWTH_RATES
            .into_iter()
            .filter_map(|key| self.metrics.number(Category::Growth, key))
            .filter(|g| g.is_finite())
    }

    fn capped(&self, score: f64) -> f64 {
        score.min(self.config.score_cap)
    }

    /// 데이터가 없어 중립 점수로 대체된 카테고리 (출력 순서).
    pub fn neutral_categories(&self) -> Vec<Category> {
        let mut categories = Vec::new();
        if !self.metrics.has_category(Category::Value) {
            categories.push(Category::Value);
        }
        if self.growth_rates().next().is_none() {
            categories.push(Category::Growth);
        }
        let has_cash_flow = self
            .metrics
            .number(Category::CashFlow, MetricKey::CfoToMarketCap)
            .is_some_and(|v| v.is_finite());
        if !has_cash_flow {
            categories.push(Category::CashFlow);
        }
        categories
    }

    // ============================================================================================
    // 최종 점수
    // ============================================================================================

    /// 가중 합산 점수 (`Σ score * weight / 100`).
    pub fn weighted_total(&self, scores: &CategoryScores) -> f64 {
        scores
            .iter()
            .map(|(category, score)| score * self.config.weights.get(category) / 100.0)
            .sum()
    }

    /// 시장 전체 기준 최종 점수.
    pub fn final_score(&self) -> ScoreSummary {
        let category_scores = self.category_scores(Population::Market);
        let final_score = self.weighted_total(&category_scores);

        info!(ticker = %self.ticker, final_score, "Final score computed");

        ScoreSummary {
            final_score,
            category_scores,
            comment: format!("시장 전체 백분위 기반 상대평가 점수: {:.1}점", final_score),
        }
    }

    /// 동일 업종 기준 카테고리 점수.
    pub fn sector_scores(&self) -> CategoryScores {
        self.category_scores(Population::Sector)
    }
}

// ================================================================================================
// Tests
// ================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn row(per: f64, pbr: f64) -> UniverseRow {
        UniverseRow {
            per: Some(per),
            pbr: Some(pbr),
            ..Default::default()
        }
    }

    fn universe() -> UniverseTable {
        UniverseTable::new()
            .with_row("A", row(5.0, 0.5))
            .with_row("B", row(10.0, 1.0))
            .with_row("C", row(15.0, 1.5))
            .with_row("D", row(20.0, 2.0))
    }

    #[test]
    fn test_rank_directions_complement() {
        let u = universe();
        let m = MetricSet::new();
        let scorer = Scorer::new("B", &m, &u);

        assert_eq!(scorer.rank(RankMetric::Per, false), 50.0);
        assert_eq!(scorer.rank(RankMetric::Per, true), 50.0);

        let scorer = Scorer::new("A", &m, &u);
        assert_eq!(scorer.rank(RankMetric::Per, true), 75.0);
        assert_eq!(scorer.rank(RankMetric::Per, false), 25.0);
    }

    #[test]
    fn test_rank_absent_ticker_is_zero() {
        let u = universe();
        let m = MetricSet::new();
        let scorer = Scorer::new("ZZZ", &m, &u);
        assert_eq!(scorer.rank(RankMetric::Per, true), 0.0);
        assert_eq!(scorer.rank(RankMetric::Per, false), 0.0);
    }

    #[test]
    fn test_rank_missing_column_is_zero() {
        let u = universe();
        let m = MetricSet::new();
        let scorer = Scorer::new("A", &m, &u);
        assert_eq!(scorer.rank(RankMetric::Div, false), 0.0);
        assert_eq!(scorer.rank(RankMetric::Div, true), 0.0);
    }

    #[test]
    fn test_single_row_population() {
        let u = UniverseTable::new().with_row("A", row(5.0, 0.5));
        let m = MetricSet::new();
        let scorer = Scorer::new("A", &m, &u);
        assert_eq!(scorer.rank(RankMetric::Per, false), 100.0);
        assert_eq!(scorer.rank(RankMetric::Per, true), 0.0);
    }

    #[test]
    fn test_rank_by_name() {
        let u = universe();
        let m = MetricSet::new();
        let scorer = Scorer::new("A", &m, &u);
        assert_eq!(scorer.rank_by_name("PER", true), 75.0);
        assert_eq!(scorer.rank_by_name("per", true), 75.0);
        assert_eq!(scorer.rank_by_name("PER_ratio", true), 0.0);
        assert_eq!(scorer.rank_by_name("ROE", false), 0.0);
    }

    #[test]
    fn test_sector_rank_without_label_falls_back() {
        let u = universe();
        let m = MetricSet::new();
        let scorer = Scorer::new("A", &m, &u);
        assert_eq!(
            scorer.sector_rank(RankMetric::Per, true),
            scorer.rank(RankMetric::Per, true)
        );
        assert_eq!(scorer.effective_population(Population::Sector), Population::Market);
    }

    #[test]
    fn test_value_neutral_when_category_absent() {
        let u = universe();
        let m = MetricSet::new();
        let scorer = Scorer::new("A", &m, &u);
        assert_eq!(scorer.category_score(Category::Value, Population::Market), 50.0);
        assert_eq!(scorer.category_score(Category::Growth, Population::Market), 50.0);
        assert_eq!(scorer.category_score(Category::CashFlow, Population::Market), 50.0);
        assert_eq!(
            scorer.neutral_categories(),
            vec![Category::Value, Category::Growth, Category::CashFlow]
        );
    }

    #[test]
    fn test_value_category_blend() {
        let u = universe();
        let m = MetricSet::new().with(Category::Value, MetricKey::Per, 5.0);
        let scorer = Scorer::new("A", &m, &u);
        // PBR 75, PER 75, BPS 누락 0
        let score = scorer.category_score(Category::Value, Population::Market);
        assert!((score - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_profitability_roe_blend_and_cap() {
        let u = UniverseTable::new().with_row(
            "A",
            UniverseRow {
                eps: Some(100.0),
                ..Default::default()
            },
        );
        let m = MetricSet::new().with(Category::Profitability, MetricKey::Roe, 50.0);
        let scorer = Scorer::new("A", &m, &u);
        // EPS 100점 * 0.8 + min(166.5, 100) * 0.2
        let score = scorer.category_score(Category::Profitability, Population::Market);
        assert!((score - 100.0).abs() < 1e-9);

        let m = MetricSet::new();
        let scorer = Scorer::new("A", &m, &u);
        assert_eq!(scorer.category_score(Category::Profitability, Population::Market), 100.0);
    }

    #[test]
    fn test_growth_score_uses_magnitude() {
        let u = UniverseTable::new();
        let m = MetricSet::new()
            .with(Category::Growth, MetricKey::RevenueGrowth, 10.0)
            .with(Category::Growth, MetricKey::OperatingIncomeGrowth, -20.0)
            .with(Category::Growth, MetricKey::NetIncomeGrowth, 80.0);
        let scorer = Scorer::new("A", &m, &u);
        // (20 + 40 + 100) / 3
        let score = scorer.category_score(Category::Growth, Population::Market);
        assert!((score - 160.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_cash_flow_score_capped() {
        let u = UniverseTable::new();
        let m = MetricSet::new().with(Category::CashFlow, MetricKey::CfoToMarketCap, 30.0);
        let scorer = Scorer::new("A", &m, &u);
        assert_eq!(scorer.category_score(Category::CashFlow, Population::Market), 100.0);

        let m = MetricSet::new().with(Category::CashFlow, MetricKey::CfoToMarketCap, 4.0);
        let scorer = Scorer::new("A", &m, &u);
        assert_eq!(scorer.category_score(Category::CashFlow, Population::Market), 20.0);
    }

    #[test]
    fn test_weighted_total_bounds() {
        let u = UniverseTable::new();
        let m = MetricSet::new();
        let scorer = Scorer::new("A", &m, &u);
        assert_eq!(scorer.weighted_total(&CategoryScores::uniform(100.0)), 100.0);
        assert_eq!(scorer.weighted_total(&CategoryScores::uniform(0.0)), 0.0);
    }

    #[test]
    fn test_final_score_comment_format() {
        let u = UniverseTable::new();
        let m = MetricSet::new();
        let scorer = Scorer::new("A", &m, &u);
        let summary = scorer.final_score();
        // 가치 50*20 + 성장성 50*10 + 현금흐름 50*5, 나머지 0
        assert!((summary.final_score - 17.5).abs() < 1e-9);
        assert_eq!(summary.comment, "시장 전체 백분위 기반 상대평가 점수: 17.5점");
    }

    #[test]
    fn test_custom_weights_are_applied() {
        let u = UniverseTable::new();
        let m = MetricSet::new();
        let mut config = ScoringConfig::default();
        config.weights.value = 40.0;
        config.weights.profitability = 0.0;
        let scorer = Scorer::new("A", &m, &u).with_config(config);
        let total = scorer.weighted_total(&scorer.category_scores(Population::Market));
        // 가치 50*40 + 성장성 50*10 + 현금흐름 50*5
        assert!((total - 27.5).abs() < 1e-9);
    }
}
