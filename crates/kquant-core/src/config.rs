//! 스코어링 설정.
//!
//! 카테고리 가중치, 업종 비교 최소 종목 수, 등급 임계값, 스케일 상수를 하나의 구조체로
//! 모아 스코어러 생성 시 주입합니다.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::Category;
use crate::error::{KQuantError, KQuantResult};

/// 카테고리 가중치 (합계 100).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CategoryWeights {
    /// 가치 (PBR, PER 기반)
    pub value: f64,
    /// 수익성 (EPS 기반)
    pub profitability: f64,
    /// 배당 (DIV 기반)
    pub dividend: f64,
    /// 성장잠재력 (BPS 기반)
    pub growth_potential: f64,
    /// 안정성 (시가총액, 거래량 기반)
    pub stability: f64,
    /// 성장성 (매출액, 이익 성장률 기반)
    pub growth: f64,
    /// 현금흐름 (영업활동 현금흐름 기반)
    pub cash_flow: f64,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            value: 20.0,
            profitability: 20.0,
            dividend: 15.0,
            growth_potential: 15.0,
            stability: 15.0,
            growth: 10.0,
            cash_flow: 5.0,
        }
    }
}

impl CategoryWeights {
    /// 카테고리 가중치 조회.
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Value => self.value,
            Category::Profitability => self.profitability,
            Category::Dividend => self.dividend,
            Category::GrowthPotential => self.growth_potential,
            Category::Stability => self.stability,
            Category::Growth => self.growth,
            Category::CashFlow => self.cash_flow,
        }
    }

    /// 가중치 합계.
    pub fn total(&self) -> f64 {
        Category::ALL.iter().map(|c| self.get(*c)).sum()
    }
}

/// 가치 카테고리 세부 가중치.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ValueWeights {
    pub pbr: f64,
    pub per: f64,
    pub bps: f64,
}

impl Default for ValueWeights {
    fn default() -> Self {
        Self {
            pbr: 0.4,
            per: 0.4,
            bps: 0.2,
        }
    }
}

/// 수익성 카테고리 세부 가중치 (ROE가 있을 때).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProfitabilityWeights {
    pub eps: f64,
    pub roe: f64,
}

impl Default for ProfitabilityWeights {
    fn default() -> Self {
        Self { eps: 0.8, roe: 0.2 }
    }
}

/// 카테고리 점수 등급 임계값.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TierThresholds {
    /// 매우 우수
    pub excellent: f64,
    /// 평균 이상
    pub above_average: f64,
    /// 평균 수준
    pub average: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            excellent: 80.0,
            above_average: 60.0,
            average: 40.0,
        }
    }
}

/// 투자자 관점 코멘트 임계값.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RemarkThresholds {
    /// 성장성 점수가 이 값 이상이면 성장주 코멘트
    pub growth_min: f64,
    /// 배당 점수가 이 값 미만이면 배당 매력 부족 코멘트
    pub dividend_max: f64,
    /// 안정성 점수가 이 값 미만이면 리스크 코멘트
    pub stability_max: f64,
}

impl Default for RemarkThresholds {
    fn default() -> Self {
        Self {
            growth_min: 70.0,
            dividend_max: 30.0,
            stability_max: 40.0,
        }
    }
}

/// 스코어링 전체 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// 카테고리 가중치
    pub weights: CategoryWeights,
    /// 가치 세부 가중치
    pub value_weights: ValueWeights,
    /// 수익성 세부 가중치
    pub profitability_weights: ProfitabilityWeights,
    /// ROE(%) → 점수 배율 (30% 이상이면 100점)
    pub roe_scale: f64,
    /// 성장률(%) → 점수 배율 (50% 이상이면 100점)
    pub growth_scale: f64,
    /// OCF/시가총액(%) → 점수 배율 (20% 이상이면 100점)
    pub cash_flow_scale: f64,
    /// 크기 기반 점수 상한
    pub score_cap: f64,
    /// 데이터가 없을 때의 중립 점수
    pub neutral_score: f64,
    /// 업종 내 비교를 위한 최소 종목 수 (미만이면 시장 전체 기준)
    pub sector_min_peers: usize,
    /// 분석 파이프라인이 요구하는 최소 재무 이력 연도 수
    pub min_history_years: usize,
    /// 등급 임계값
    pub tiers: TierThresholds,
    /// 투자자 관점 코멘트 임계값
    pub remarks: RemarkThresholds,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: CategoryWeights::default(),
            value_weights: ValueWeights::default(),
            profitability_weights: ProfitabilityWeights::default(),
            roe_scale: 3.33,
            growth_scale: 2.0,
            cash_flow_scale: 5.0,
            score_cap: 100.0,
            neutral_score: 50.0,
            sector_min_peers: 5,
            min_history_years: 2,
            tiers: TierThresholds::default(),
            remarks: RemarkThresholds::default(),
        }
    }
}

impl ScoringConfig {
    /// 설정 값 검증.
    ///
    /// - 카테고리 가중치 합계가 100이어야 함
    /// - 가중치와 배율은 음수일 수 없음
    /// - 등급 임계값은 내림차순이어야 함
    pub fn validate(&self) -> KQuantResult<()> {
        let total = self.weights.total();
        if (total - 100.0).abs() > 1e-9 {
            return Err(KQuantError::Config(format!(
                "카테고리 가중치 합계는 100이어야 합니다 (현재 {})",
                total
            )));
        }

        if let Some(c) = Category::ALL.iter().find(|c| self.weights.get(**c) < 0.0) {
            return Err(KQuantError::Config(format!("{} 가중치가 음수입니다", c)));
        }

        let scales = [
            ("roe_scale", self.roe_scale),
            ("growth_scale", self.growth_scale),
            ("cash_flow_scale", self.cash_flow_scale),
            ("score_cap", self.score_cap),
        ];
        if let Some((name, _)) = scales.iter().find(|(_, v)| *v < 0.0 || !v.is_finite()) {
            return Err(KQuantError::Config(format!("{}는 0 이상의 유한한 값이어야 합니다", name)));
        }

        let t = &self.tiers;
        if !(t.excellent >= t.above_average && t.above_average >= t.average) {
            return Err(KQuantError::Config(
                "등급 임계값은 excellent ≥ above_average ≥ average 순서여야 합니다".to_string(),
            ));
        }

        Ok(())
    }

    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 환경 변수는 `KQUANT__ROE_SCALE`, `KQUANT__WEIGHTS__VALUE` 형식으로 오버라이드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> KQuantResult<Self> {
        let builder = config::Config::builder()
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("KQUANT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::build(builder)
    }

    /// 기본 경로에서 설정을 로드합니다. 파일이 없으면 기본값을 사용합니다.
    pub fn load_default() -> KQuantResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/scoring").required(false))
            .add_source(
                config::Environment::with_prefix("KQUANT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::build(builder)
    }

    /// TOML 문자열에서 설정을 로드합니다.
    pub fn from_toml_str(toml: &str) -> KQuantResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml));

        Self::build(builder)
    }

    fn build(builder: config::ConfigBuilder<config::builder::DefaultState>) -> KQuantResult<Self> {
        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_100() {
        assert_eq!(CategoryWeights::default().total(), 100.0);
        assert!(ScoringConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_weight_sum() {
        let mut config = ScoringConfig::default();
        config.weights.cash_flow = 10.0;
        assert!(matches!(config.validate(), Err(KQuantError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_negative_scale() {
        let config = ScoringConfig {
            growth_scale: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unordered_tiers() {
        let mut config = ScoringConfig::default();
        config.tiers.average = 90.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ScoringConfig::from_toml_str(
            r#"
            sector_min_peers = 10

            [weights]
            value = 30.0
            growth = 0.0
            "#,
        )
        .unwrap();

        assert_eq!(config.sector_min_peers, 10);
        assert_eq!(config.weights.value, 30.0);
        assert_eq!(config.weights.profitability, 20.0);
        assert_eq!(config.roe_scale, 3.33);
    }

    #[test]
    fn test_toml_with_bad_sum_is_rejected() {
        let result = ScoringConfig::from_toml_str("[weights]\nvalue = 50.0\n");
        assert!(matches!(result, Err(KQuantError::Config(_))));
    }

    #[test]
    fn test_default_config_roundtrips_through_toml() {
        let text = toml::to_string(&ScoringConfig::default()).unwrap();
        let loaded = ScoringConfig::from_toml_str(&text).unwrap();
        assert_eq!(loaded, ScoringConfig::default());
    }
}
