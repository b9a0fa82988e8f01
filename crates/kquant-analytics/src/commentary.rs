//! 점수 해설 및 종합 코멘트.
//!
//! 같은 입력에 대해 항상 같은 문장을 생성합니다.

use std::collections::BTreeMap;
use std::fmt;

use kquant_core::{
    Category, CategoryScores, MetricKey, MetricSet, MetricValue, RankMetric, ScoringConfig,
    TierThresholds,
};
use serde::{Deserialize, Serialize};

use crate::percentile::Population;
use crate::scorer::Scorer;

/// 종합 코멘트에서 카테고리를 나열하는 순서.
const COMMENT_ORDER: [Category; 7] = [
    Category::Value,
    Category::Profitability,
    Category::Growth,
    Category::Stability,
    Category::Dividend,
    Category::CashFlow,
    Category::GrowthPotential,
];

const CLOSING: &str =
    "전반적으로 강점과 약점이 혼재되어 있으니, 투자 목적과 성향에 따라 신중한 판단이 필요합니다.";

/// 카테고리 점수 등급.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    /// 매우 우수
    Excellent,
    /// 평균 이상
    AboveAverage,
    /// 평균 수준
    Average,
    /// 평균 미만
    BelowAverage,
}

impl Tier {
    /// 점수로부터 등급 결정.
    pub fn from_score(score: f64, thresholds: &TierThresholds) -> Self {
        if score >= thresholds.excellent {
            Tier::Excellent
        } else if score >= thresholds.above_average {
            Tier::AboveAverage
        } else if score >= thresholds.average {
            Tier::Average
        } else {
            Tier::BelowAverage
        }
    }

    /// 코멘트 서술부.
    pub fn phrase(&self) -> &'static str {
        match self {
            Tier::Excellent => "매우 우수한 편입니다.",
            Tier::AboveAverage => "업종 평균 이상입니다.",
            Tier::Average => "업종 평균 수준입니다.",
            Tier::BelowAverage => "업종 평균에 미치지 못합니다.",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Tier::Excellent => "매우 우수",
            Tier::AboveAverage => "평균 이상",
            Tier::Average => "평균 수준",
            Tier::BelowAverage => "평균 미만",
        };
        f.write_str(label)
    }
}

/// 카테고리 정의 문구.
pub fn definition(category: Category) -> &'static str {
    match category {
        Category::Value => "가치란, 기업의 자산과 이익에 비해 주가가 얼마나 저평가 또는 고평가되어 있는지를 나타냅니다. 일반적으로 PER, PBR이 낮을수록 저평가로 간주되어 투자 매력이 높다고 평가합니다.",
        Category::Profitability => "수익성이란, 기업이 자본과 매출을 얼마나 효율적으로 이익으로 전환하는지를 의미합니다. EPS, ROE, 영업이익률 등이 높을수록 수익성이 우수하다고 평가합니다.",
        Category::Dividend => "배당이란, 기업이 이익의 일부를 주주에게 현금 등으로 환원하는 정도를 의미합니다. 배당수익률(DIV), 주당배당금(DPS)이 높을수록 배당 매력이 높다고 평가합니다.",
        Category::GrowthPotential => "성장잠재력이란, 기업이 미래에 자산이나 이익을 얼마나 더 키울 수 있을지를 나타냅니다. BPS(주당순자산)가 높거나 증가세일수록 성장 잠재력이 높다고 평가합니다.",
        Category::Stability => "안정성이란, 기업이 외부 충격이나 경기 변동에도 버틸 수 있는 재무적 체력을 의미합니다. 시가총액이 크고 거래량이 많을수록 안정성이 높다고 평가합니다.",
        Category::Growth => "성장성이란, 기업의 매출, 이익 등이 얼마나 빠르게 증가하고 있는지를 의미합니다. 매출액, 영업이익, 당기순이익의 성장률이 높을수록 성장성이 우수하다고 평가합니다.",
        Category::CashFlow => "현금흐름이란, 기업이 실제로 벌어들이는 현금의 흐름을 의미합니다. 영업활동 현금흐름이 크고, 매출액이나 시가총액 대비 비율이 높을수록 재무적으로 건전하다고 평가합니다.",
    }
}

// ================================================================================================
// 카테고리별 해설
// ================================================================================================

/// 카테고리별 점수 산출 근거.
///
/// 지표 모음에 있는 카테고리만 포함합니다. 성장잠재력은 가치 카테고리의 BPS를,
/// 배당은 유니버스의 DIV 값을 근거로 합니다.
pub fn explanations(scorer: &Scorer<'_>) -> BTreeMap<Category, String> {
    let metrics = scorer.metrics();
    let row = scorer.universe_row();
    let show = |category, key| display(metrics, category, key);
    let mut out = BTreeMap::new();

    if metrics.has_category(Category::Value) {
        out.insert(
            Category::Value,
            format!(
                "[정의] {}\nPER: {}, PBR: {}, BPS: {}\n시장 내 PER 백분위: {:.1}점, PBR 백분위: {:.1}점. PER/PBR이 낮을수록 가치 점수가 높게 산출됩니다.",
                definition(Category::Value),
                show(Category::Value, MetricKey::Per),
                show(Category::Value, MetricKey::Pbr),
                show(Category::Value, MetricKey::Bps),
                scorer.rank(RankMetric::Per, true),
                scorer.rank(RankMetric::Pbr, true),
            ),
        );
        out.insert(
            Category::GrowthPotential,
            format!(
                "[정의] {}\nBPS: {}\n시장 내 BPS 백분위: {:.1}점. BPS가 높을수록 성장잠재력 점수가 높게 산출됩니다.",
                definition(Category::GrowthPotential),
                show(Category::Value, MetricKey::Bps),
                scorer.rank(RankMetric::Bps, false),
            ),
        );
    }

    if metrics.has_category(Category::Profitability) {
        out.insert(
            Category::Profitability,
            format!(
                "[정의] {}\nEPS: {}, ROE: {}, 영업이익률: {}\n시장 내 EPS 백분위: {:.1}점. EPS가 높을수록 수익성 점수가 높게 산출됩니다.",
                definition(Category::Profitability),
                show(Category::Profitability, MetricKey::Eps),
                show(Category::Profitability, MetricKey::Roe),
                show(Category::Profitability, MetricKey::OperatingMargin),
                scorer.rank(RankMetric::Eps, false),
            ),
        );
    }

    let div = metrics
        .number(Category::Dividend, MetricKey::Div)
        .or_else(|| row.and_then(|r| r.value(RankMetric::Div)));
    if metrics.has_category(Category::Dividend) || div.is_some() {
        let dps = metrics
            .number(Category::Dividend, MetricKey::Dps)
            .or_else(|| row.and_then(|r| r.value(RankMetric::Dps)));
        out.insert(
            Category::Dividend,
            format!(
                "[정의] {}\n배당수익률(DIV): {}, 주당배당금(DPS): {}\n시장 내 배당수익률 백분위: {:.1}점. 배당수익률이 높을수록 배당 점수가 높게 산출됩니다.",
                definition(Category::Dividend),
                display_opt(div),
                display_opt(dps),
                scorer.rank(RankMetric::Div, false),
            ),
        );
    }

    if metrics.has_category(Category::Stability) {
        let market_cap = metrics
            .number(Category::Stability, MetricKey::MarketCap)
            .or_else(|| row.and_then(|r| r.value(RankMetric::MarketCap)));
        let volume = metrics
            .number(Category::Stability, MetricKey::Volume)
            .or_else(|| row.and_then(|r| r.value(RankMetric::Volume)));
        out.insert(
            Category::Stability,
            format!(
                "[정의] {}\n시가총액: {}, 거래량: {}, 부채비율: {}%\n시장 내 시가총액 백분위: {:.1}점, 거래량 백분위: {:.1}점. 시가총액과 거래량이 높을수록 안정성 점수가 높게 산출됩니다.",
                definition(Category::Stability),
                display_opt(market_cap),
                display_opt(volume),
                show(Category::Stability, MetricKey::DebtRatio),
                scorer.rank(RankMetric::MarketCap, false),
                scorer.rank(RankMetric::Volume, false),
            ),
        );
    }

    if metrics.has_category(Category::Growth) {
        out.insert(
            Category::Growth,
            format!(
                "[정의] {}\n매출액증가율: {}%, 영업이익증가율: {}%, 당기순이익증가율: {}%\n성장률이 높을수록 성장성 점수가 높게 산출됩니다.",
                definition(Category::Growth),
                show(Category::Growth, MetricKey::RevenueGrowth),
                show(Category::Growth, MetricKey::OperatingIncomeGrowth),
                show(Category::Growth, MetricKey::NetIncomeGrowth),
            ),
        );
    }

    if metrics.has_category(Category::CashFlow) {
        out.insert(
            Category::CashFlow,
            format!(
                "[정의] {}\n영업현금흐름/매출액: {}%, 영업현금흐름/시가총액: {}%\n현금흐름 비율이 높을수록 현금흐름 점수가 높게 산출됩니다.",
                definition(Category::CashFlow),
                percent(metrics.number(Category::CashFlow, MetricKey::CfoToSales)),
                percent(metrics.number(Category::CashFlow, MetricKey::CfoToMarketCap)),
            ),
        );
    }

    out
}

fn display(metrics: &MetricSet, category: Category, key: MetricKey) -> String {
    metrics
        .get(category, key)
        .map(ToString::to_string)
        .unwrap_or_else(|| "N/A".to_string())
}

fn display_opt(value: Option<f64>) -> String {
    value
        .map(|v| MetricValue::Number(v).to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

fn percent(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "N/A".to_string())
}

// ================================================================================================
// 종합 코멘트
// ================================================================================================

/// 시장 전체 기준 종합 코멘트 (줄바꿈으로 구분된 문장들).
pub fn final_comment(scorer: &Scorer<'_>) -> String {
    let scores = scorer.category_scores(Population::Market);
    compose_comment(&scores, &scorer.neutral_categories(), scorer.config())
}

/// 카테고리 점수와 중립 점수로 대체된 카테고리 목록으로 코멘트를 구성합니다.
pub fn compose_comment(
    scores: &CategoryScores,
    neutral: &[Category],
    config: &ScoringConfig,
) -> String {
    let mut lines = Vec::with_capacity(COMMENT_ORDER.len() + 6);

    lines.push(format!("이 종목은 '{}' 측면에서 강점을 보입니다.", scores.strongest()));
    lines.push(format!(
        "반면 '{}' 카테고리에서는 상대적으로 약점을 가지고 있습니다.",
        scores.weakest()
    ));

    for category in COMMENT_ORDER {
        let score = scores.get(category);
        let tier = Tier::from_score(score, &config.tiers);
        lines.push(format!("{} 점수({:.1}점)는 {}", category, score, tier.phrase()));
    }

    let missing: Vec<&str> = COMMENT_ORDER
        .iter()
        .filter(|c| neutral.contains(c))
        .map(|c| c.label())
        .collect();
    if !missing.is_empty() {
        lines.push(format!(
            "다만 {} 항목의 데이터가 누락되어 평가에 한계가 있습니다.",
            missing.join(", ")
        ));
    }

    let remarks = &config.remarks;
    if scores.growth >= remarks.growth_min {
        lines.push("성장주 투자자에게는 긍정적인 신호로 해석될 수 있습니다.".to_string());
    }
    if scores.dividend < remarks.dividend_max {
        lines.push("배당투자 관점에서는 매력이 다소 떨어집니다.".to_string());
    }
    if scores.stability < remarks.stability_max {
        lines.push("재무적 안정성 측면에서 리스크가 존재할 수 있습니다.".to_string());
    }

    lines.push(CLOSING.to_string());
    lines.join("\n")
}
