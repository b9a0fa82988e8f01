//! 카테고리별 퀀트 지표 모음.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use super::category::Category;
use crate::types::non_finite_f64;

/// 지표 이름.
///
/// 직렬화 시 한글 지표명을 사용합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MetricKey {
    #[serde(rename = "PER")]
    Per,
    #[serde(rename = "PBR")]
    Pbr,
    #[serde(rename = "BPS")]
    Bps,
    #[serde(rename = "ROE")]
    Roe,
    #[serde(rename = "영업이익률")]
    OperatingMargin,
    #[serde(rename = "EPS")]
    Eps,
    #[serde(rename = "DIV")]
    Div,
    #[serde(rename = "DPS")]
    Dps,
    #[serde(rename = "부채비율 (%)")]
    DebtRatio,
    #[serde(rename = "시가총액")]
    MarketCap,
    #[serde(rename = "거래량")]
    Volume,
    #[serde(rename = "매출액_성장률")]
    RevenueGrowth,
    #[serde(rename = "영업이익_성장률")]
    OperatingIncomeGrowth,
    #[serde(rename = "당기순이익_성장률")]
    NetIncomeGrowth,
    #[serde(rename = "CFO_매출액비율")]
    CfoToSales,
    #[serde(rename = "OCF_시가총액비율")]
    CfoToMarketCap,
}

impl MetricKey {
    /// 성장성 카테고리 지표.
    pub const GROWTH_RATES: [MetricKey; 3] = [
        MetricKey::RevenueGrowth,
        MetricKey::OperatingIncomeGrowth,
        MetricKey::NetIncomeGrowth,
    ];

    /// 한글 지표명.
    pub fn label(&self) -> &'static str {
        match self {
            MetricKey::Per => "PER",
            MetricKey::Pbr => "PBR",
            MetricKey::Bps => "BPS",
            MetricKey::Roe => "ROE",
            MetricKey::OperatingMargin => "영업이익률",
            MetricKey::Eps => "EPS",
            MetricKey::Div => "DIV",
            MetricKey::Dps => "DPS",
            MetricKey::DebtRatio => "부채비율 (%)",
            MetricKey::MarketCap => "시가총액",
            MetricKey::Volume => "거래량",
            MetricKey::RevenueGrowth => "매출액_성장률",
            MetricKey::OperatingIncomeGrowth => "영업이익_성장률",
            MetricKey::NetIncomeGrowth => "당기순이익_성장률",
            MetricKey::CfoToSales => "CFO_매출액비율",
            MetricKey::CfoToMarketCap => "OCF_시가총액비율",
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 지표 값 (수치 또는 표시용 문자열).
///
/// 무한대 수치는 `"inf"` 문자열로 직렬화되며, 다시 읽으면 `Text`가 되지만
/// [`MetricValue::as_f64`]는 같은 값을 돌려줍니다.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl Serialize for MetricValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            MetricValue::Number(v) => non_finite_f64::serialize(v, serializer),
            MetricValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl MetricValue {
    /// 수치로 해석합니다. 문자열은 파싱을 시도합니다 ("inf" 포함).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Number(v) => Some(*v),
            MetricValue::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Number(v)
    }
}

impl From<String> for MetricValue {
    fn from(s: String) -> Self {
        MetricValue::Text(s)
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Number(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{:.1}", v),
            MetricValue::Number(v) if v.is_finite() => write!(f, "{:.2}", v),
            MetricValue::Number(v) => write!(f, "{}", v),
            MetricValue::Text(s) => f.write_str(s),
        }
    }
}

/// 카테고리 → (지표 → 값) 매핑.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricSet {
    categories: BTreeMap<Category, BTreeMap<MetricKey, MetricValue>>,
}

impl MetricSet {
    /// 빈 지표 모음.
    pub fn new() -> Self {
        Self::default()
    }

    /// 지표 값 설정 (카테고리가 없으면 생성).
    pub fn insert(&mut self, category: Category, key: MetricKey, value: impl Into<MetricValue>) {
        self.categories
            .entry(category)
            .or_default()
            .insert(key, value.into());
    }

    /// 빌더 스타일 지표 설정.
    pub fn with(
        mut self,
        category: Category,
        key: MetricKey,
        value: impl Into<MetricValue>,
    ) -> Self {
        self.insert(category, key, value);
        self
    }

    /// 카테고리 전체를 교체합니다.
    pub fn replace_category(
        &mut self,
        category: Category,
        metrics: BTreeMap<MetricKey, MetricValue>,
    ) {
        self.categories.insert(category, metrics);
    }

    /// 카테고리 존재 여부.
    pub fn has_category(&self, category: Category) -> bool {
        self.categories.contains_key(&category)
    }

    /// 카테고리 지표 조회.
    pub fn category(&self, category: Category) -> Option<&BTreeMap<MetricKey, MetricValue>> {
        self.categories.get(&category)
    }

    /// 지표 값 조회.
    pub fn get(&self, category: Category, key: MetricKey) -> Option<&MetricValue> {
        self.categories.get(&category).and_then(|m| m.get(&key))
    }

    /// 지표 수치 조회.
    pub fn number(&self, category: Category, key: MetricKey) -> Option<f64> {
        self.get(category, key).and_then(MetricValue::as_f64)
    }

    /// (카테고리, 지표들) 순회.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &BTreeMap<MetricKey, MetricValue>)> {
        self.categories.iter().map(|(c, m)| (*c, m))
    }
}
