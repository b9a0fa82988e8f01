//! 내부 계산 지표와 유니버스 공식 값의 정합성 점검.
//!
//! 유니버스 값으로 덮어쓰기 전의 PER, PBR, EPS, BPS를 비교합니다.

use std::fmt;

use kquant_core::{
    non_finite_f64, Category, KQuantError, KQuantResult, MetricKey, MetricSet, RankMetric,
    UniverseTable,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// 비교 대상 지표 (유니버스 컬럼, 지표 모음 위치).
const COMPARED: [(RankMetric, Category, MetricKey); 4] = [
    (RankMetric::Per, Category::Value, MetricKey::Per),
    (RankMetric::Pbr, Category::Value, MetricKey::Pbr),
    (RankMetric::Eps, Category::Profitability, MetricKey::Eps),
    (RankMetric::Bps, Category::Value, MetricKey::Bps),
];

/// 정합성 등급.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    /// 최대 차이율 < 5%
    Excellent,
    /// 최대 차이율 < 10%
    Acceptable,
    /// 최대 차이율 ≥ 10%
    Inconsistent,
}

impl Grade {
    /// 최대 차이율(%)로부터 등급 결정.
    pub fn from_diff(max_diff_pct: f64) -> Self {
        if max_diff_pct < 5.0 {
            Grade::Excellent
        } else if max_diff_pct < 10.0 {
            Grade::Acceptable
        } else {
            Grade::Inconsistent
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Grade::Excellent => "우수",
            Grade::Acceptable => "양호",
            Grade::Inconsistent => "문제",
        };
        f.write_str(label)
    }
}

/// 지표별 비교 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricComparison {
    pub metric: RankMetric,
    /// 유니버스 값
    #[serde(with = "non_finite_f64")]
    pub reference: f64,
    /// 내부 계산 값 (적자 기업의 PER/PBR은 +∞)
    #[serde(with = "non_finite_f64")]
    pub calculated: f64,
    /// 차이율 (%)
    #[serde(with = "non_finite_f64")]
    pub diff_pct: f64,
}

/// 정합성 점검 보고서.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub ticker: String,
    /// 양쪽 값이 모두 있는 지표만 포함
    pub comparisons: Vec<MetricComparison>,
    #[serde(with = "non_finite_f64")]
    pub max_diff_pct: f64,
    pub grade: Grade,
}

impl ConsistencyReport {
    /// 덮어쓰기 전 지표 모음을 유니버스 행과 비교합니다.
    ///
    /// # 에러
    ///
    /// 종목이 유니버스에 없으면 [`KQuantError::NotFound`].
    pub fn check(
        ticker: &str,
        derived: &MetricSet,
        universe: &UniverseTable,
    ) -> KQuantResult<Self> {
        let row = universe
            .get(ticker)
            .ok_or_else(|| KQuantError::NotFound(format!("유니버스에 종목 {} 없음", ticker)))?;

        let comparisons: Vec<MetricComparison> = COMPARED
            .into_iter()
            .filter_map(|(metric, category, key)| {
                let reference = row.value(metric)?;
                let calculated = derived.number(category, key)?;
                Some(MetricComparison {
                    metric,
                    reference,
                    calculated,
                    diff_pct: diff_pct(reference, calculated),
                })
            })
            .collect();

        let max_diff_pct = comparisons.iter().map(|c| c.diff_pct).fold(0.0, f64::max);
        let grade = Grade::from_diff(max_diff_pct);

        if grade == Grade::Inconsistent {
            warn!(ticker, max_diff_pct, "Derived valuation differs from universe reference");
        } else {
            info!(ticker, max_diff_pct, %grade, "Reference consistency checked");
        }

        Ok(Self {
            ticker: ticker.to_string(),
            comparisons,
            max_diff_pct,
            grade,
        })
    }
}

/// `|reference - calculated| / |reference| * 100`.
///
/// 기준값이 0이면 0, 계산값이 유한하지 않으면 +∞.
pub fn diff_pct(reference: f64, calculated: f64) -> f64 {
    if reference == 0.0 {
        return 0.0;
    }
    if !calculated.is_finite() {
        return f64::INFINITY;
    }
    (reference - calculated).abs() / reference.abs() * 100.0
}
