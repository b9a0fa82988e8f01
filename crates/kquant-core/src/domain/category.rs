//! 평가 카테고리와 카테고리별 점수.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 7개 고정 평가 카테고리.
///
/// 선언 순서가 곧 보고서 출력 순서입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    /// 가치 (PBR, PER, BPS)
    #[serde(rename = "가치")]
    Value,
    /// 수익성 (EPS, ROE)
    #[serde(rename = "수익성")]
    Profitability,
    /// 배당 (DIV)
    #[serde(rename = "배당")]
    Dividend,
    /// 성장잠재력 (BPS)
    #[serde(rename = "성장잠재력")]
    GrowthPotential,
    /// 안정성 (시가총액, 거래량)
    #[serde(rename = "안정성")]
    Stability,
    /// 성장성 (매출액/이익 성장률)
    #[serde(rename = "성장성")]
    Growth,
    /// 현금흐름 (영업활동 현금흐름)
    #[serde(rename = "현금흐름")]
    CashFlow,
}

impl Category {
    /// 모든 카테고리 (출력 순서).
    pub const ALL: [Category; 7] = [
        Category::Value,
        Category::Profitability,
        Category::Dividend,
        Category::GrowthPotential,
        Category::Stability,
        Category::Growth,
        Category::CashFlow,
    ];

    /// 한글 카테고리명.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Value => "가치",
            Category::Profitability => "수익성",
            Category::Dividend => "배당",
            Category::GrowthPotential => "성장잠재력",
            Category::Stability => "안정성",
            Category::Growth => "성장성",
            Category::CashFlow => "현금흐름",
        }
    }

    /// 한글 카테고리명으로부터 파싱.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label.trim())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 카테고리별 점수 (각각 0-100).
///
/// 직렬화 시 [`Category`]와 같은 한글 카테고리명을 키로 사용합니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryScores {
    /// 가치
    #[serde(rename = "가치")]
    pub value: f64,
    /// 수익성
    #[serde(rename = "수익성")]
    pub profitability: f64,
    /// 배당
    #[serde(rename = "배당")]
    pub dividend: f64,
    /// 성장잠재력
    #[serde(rename = "성장잠재력")]
    pub growth_potential: f64,
    /// 안정성
    #[serde(rename = "안정성")]
    pub stability: f64,
    /// 성장성
    #[serde(rename = "성장성")]
    pub growth: f64,
    /// 현금흐름
    #[serde(rename = "현금흐름")]
    pub cash_flow: f64,
}

impl CategoryScores {
    /// 모든 카테고리에 같은 점수를 부여합니다.
    pub fn uniform(score: f64) -> Self {
        Self {
            value: score,
            profitability: score,
            dividend: score,
            growth_potential: score,
            stability: score,
            growth: score,
            cash_flow: score,
        }
    }

    /// 카테고리 점수 조회.
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

    /// 카테고리 점수 변경.
    pub fn set(&mut self, category: Category, score: f64) {
        let slot = match category {
            Category::Value => &mut self.value,
            Category::Profitability => &mut self.profitability,
            Category::Dividend => &mut self.dividend,
            Category::GrowthPotential => &mut self.growth_potential,
            Category::Stability => &mut self.stability,
            Category::Growth => &mut self.growth,
            Category::CashFlow => &mut self.cash_flow,
        };
        *slot = score;
    }

    /// (카테고리, 점수) 쌍을 출력 순서대로 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        Category::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    /// 가장 높은 점수의 카테고리. 동점이면 출력 순서상 앞선 카테고리.
    pub fn strongest(&self) -> Category {
        self.iter()
            .fold((Category::Value, f64::NEG_INFINITY), |best, (c, s)| {
                if s > best.1 {
                    (c, s)
                } else {
                    best
                }
            })
            .0
    }

    /// 가장 낮은 점수의 카테고리. 동점이면 출력 순서상 앞선 카테고리.
    pub fn weakest(&self) -> Category {
        self.iter()
            .fold((Category::Value, f64::INFINITY), |worst, (c, s)| {
                if s < worst.1 {
                    (c, s)
                } else {
                    worst
                }
            })
            .0
    }

    /// 카테고리명 → 점수 맵으로 변환.
    pub fn to_map(&self) -> BTreeMap<Category, f64> {
        self.iter().collect()
    }
}

impl Default for CategoryScores {
    fn default() -> Self {
        Self::uniform(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_labels_roundtrip() {
        for category in Category::ALL {
            assert_eq!(Category::from_label(category.label()), Some(category));
        }
        assert_eq!(Category::from_label("모멘텀"), None);
    }

    #[test]
    fn test_category_serializes_as_korean_label() {
        let json = serde_json::to_string(&Category::GrowthPotential).unwrap();
        assert_eq!(json, "\"성장잠재력\"");
    }

    #[test]
    fn test_scores_serialize_with_category_labels() {
        let mut scores = CategoryScores::uniform(0.0);
        scores.set(Category::GrowthPotential, 80.0);
        let json = serde_json::to_value(scores).unwrap();

        assert_eq!(json["성장잠재력"], 80.0);
        assert_eq!(json.as_object().map(|o| o.len()), Some(7));
        for category in Category::ALL {
            assert!(json.get(category.label()).is_some(), "{} 키 없음", category);
        }

        let back: CategoryScores = serde_json::from_value(json).unwrap();
        assert_eq!(back, scores);
    }

    #[test]
    fn test_strongest_and_weakest() {
        let mut scores = CategoryScores::uniform(50.0);
        scores.set(Category::Dividend, 90.0);
        scores.set(Category::CashFlow, 10.0);
        assert_eq!(scores.strongest(), Category::Dividend);
        assert_eq!(scores.weakest(), Category::CashFlow);
    }

    #[test]
    fn test_ties_resolve_to_first_category() {
        let scores = CategoryScores::uniform(70.0);
        assert_eq!(scores.strongest(), Category::Value);
        assert_eq!(scores.weakest(), Category::Value);
    }

    #[test]
    fn test_to_map_has_seven_entries() {
        let map = CategoryScores::uniform(1.0).to_map();
        assert_eq!(map.len(), 7);
        assert_eq!(map.get(&Category::Stability), Some(&1.0));
    }
}
