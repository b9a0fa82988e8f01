//! 비교 대상 유니버스 테이블.
//!
//! 종목코드 → 펀더멘털/시장 지표 행의 매핑입니다. 모든 수치 컬럼은 선택적이며,
//! 누락값은 0으로 채우지 않고 `None`으로 유지합니다.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// 순위 계산에 사용되는 유니버스 컬럼.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RankMetric {
    /// 주가수익비율
    Per,
    /// 주가순자산비율
    Pbr,
    /// 주당순이익
    Eps,
    /// 배당수익률
    Div,
    /// 주당배당금
    Dps,
    /// 주당순자산
    Bps,
    /// 시가총액
    MarketCap,
    /// 거래량
    Volume,
    /// 거래대금
    ValueTraded,
    /// 상장주식수
    SharesOutstanding,
}

impl RankMetric {
    /// 모든 컬럼.
    pub const ALL: [RankMetric; 10] = [
        RankMetric::Per,
        RankMetric::Pbr,
        RankMetric::Eps,
        RankMetric::Div,
        RankMetric::Dps,
        RankMetric::Bps,
        RankMetric::MarketCap,
        RankMetric::Volume,
        RankMetric::ValueTraded,
        RankMetric::SharesOutstanding,
    ];

    /// 유니버스 컬럼명 (KRX 표기).
    pub fn column(&self) -> &'static str {
        match self {
            RankMetric::Per => "PER",
            RankMetric::Pbr => "PBR",
            RankMetric::Eps => "EPS",
            RankMetric::Div => "DIV",
            RankMetric::Dps => "DPS",
            RankMetric::Bps => "BPS",
            RankMetric::MarketCap => "시가총액",
            RankMetric::Volume => "거래량",
            RankMetric::ValueTraded => "거래대금",
            RankMetric::SharesOutstanding => "상장주식수",
        }
    }

    fn english_name(&self) -> &'static str {
        match self {
            RankMetric::Per => "per",
            RankMetric::Pbr => "pbr",
            RankMetric::Eps => "eps",
            RankMetric::Div => "div",
            RankMetric::Dps => "dps",
            RankMetric::Bps => "bps",
            RankMetric::MarketCap => "market_cap",
            RankMetric::Volume => "volume",
            RankMetric::ValueTraded => "value_traded",
            RankMetric::SharesOutstanding => "shares_outstanding",
        }
    }
}

impl fmt::Display for RankMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for RankMetric {
    type Err = String;

    /// 컬럼명 또는 영문 이름과 정확히 일치해야 합니다 (영문은 대소문자 무시).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.column() == s || m.english_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown rank metric: {}", s))
    }
}

/// 유니버스의 한 종목 행.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UniverseRow {
    #[serde(rename = "PER", default)]
    pub per: Option<f64>,
    #[serde(rename = "PBR", default)]
    pub pbr: Option<f64>,
    #[serde(rename = "EPS", default)]
    pub eps: Option<f64>,
    #[serde(rename = "BPS", default)]
    pub bps: Option<f64>,
    #[serde(rename = "DIV", default)]
    pub div: Option<f64>,
    #[serde(rename = "DPS", default)]
    pub dps: Option<f64>,
    /// 시가총액
    #[serde(alias = "시가총액", default)]
    pub market_cap: Option<f64>,
    /// 거래량
    #[serde(alias = "거래량", default)]
    pub volume: Option<f64>,
    /// 거래대금
    #[serde(alias = "거래대금", default)]
    pub value_traded: Option<f64>,
    /// 상장주식수
    #[serde(alias = "상장주식수", default)]
    pub shares_outstanding: Option<f64>,
    /// 업종명
    #[serde(alias = "업종명", default)]
    pub sector: Option<String>,
}

impl UniverseRow {
    /// 컬럼 값 조회. NaN/무한대는 누락으로 취급합니다.
    pub fn value(&self, metric: RankMetric) -> Option<f64> {
        let raw = match metric {
            RankMetric::Per => self.per,
            RankMetric::Pbr => self.pbr,
            RankMetric::Eps => self.eps,
            RankMetric::Div => self.div,
            RankMetric::Dps => self.dps,
            RankMetric::Bps => self.bps,
            RankMetric::MarketCap => self.market_cap,
            RankMetric::Volume => self.volume,
            RankMetric::ValueTraded => self.value_traded,
            RankMetric::SharesOutstanding => self.shares_outstanding,
        };
        raw.filter(|v| v.is_finite())
    }

    /// 업종명 (공백 문자열은 누락으로 취급).
    pub fn sector(&self) -> Option<&str> {
        self.sector
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// PER, PBR이 모두 양수인지 확인합니다.
    pub fn has_positive_valuation(&self) -> bool {
        matches!(
            (self.value(RankMetric::Per), self.value(RankMetric::Pbr)),
            (Some(per), Some(pbr)) if per > 0.0 && pbr > 0.0
        )
    }
}

/// 파일 로딩용 레코드 (종목코드 + 행).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniverseRecord {
    /// 종목코드
    #[serde(alias = "티커")]
    pub ticker: String,
    #[serde(flatten)]
    pub row: UniverseRow,
}

/// 업종별 종목 수.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectorCount {
    /// 업종명
    pub sector: String,
    /// 종목 수
    pub count: usize,
}

/// 비교 대상 유니버스.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UniverseTable {
    rows: BTreeMap<String, UniverseRow>,
}

impl UniverseTable {
    /// 빈 유니버스 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 레코드 목록으로부터 생성합니다. 같은 종목코드가 반복되면 마지막 행이 남습니다.
    pub fn from_records(records: impl IntoIterator<Item = UniverseRecord>) -> Self {
        let mut table = Self::new();
        for record in records {
            if table.rows.contains_key(&record.ticker) {
                warn!(ticker = %record.ticker, "Duplicate universe row, keeping the last one");
            }
            table.insert(record.ticker, record.row);
        }
        table
    }

    /// 행 추가 (기존 행은 교체).
    pub fn insert(&mut self, ticker: impl Into<String>, row: UniverseRow) {
        self.rows.insert(ticker.into(), row);
    }

    /// 빌더 스타일 행 추가.
    pub fn with_row(mut self, ticker: impl Into<String>, row: UniverseRow) -> Self {
        self.insert(ticker, row);
        self
    }

    /// PER ≤ 0 또는 PBR ≤ 0 (또는 누락) 종목을 제거합니다.
    ///
    /// 제거된 종목 수를 반환합니다.
    pub fn retain_positive_valuations(&mut self) -> usize {
        let before = self.rows.len();
        self.rows.retain(|_, row| row.has_positive_valuation());
        let removed = before - self.rows.len();
        debug!(removed, remaining = self.rows.len(), "Filtered non-positive PER/PBR rows");
        removed
    }

    /// 종목 행 조회.
    pub fn get(&self, ticker: &str) -> Option<&UniverseRow> {
        self.rows.get(ticker)
    }

    /// 종목 포함 여부.
    pub fn contains(&self, ticker: &str) -> bool {
        self.rows.contains_key(ticker)
    }

    /// 종목 수.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 비어 있는지 확인.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// (종목코드, 행) 순회 (종목코드 오름차순).
    pub fn iter(&self) -> impl Iterator<Item = (&str, &UniverseRow)> {
        self.rows.iter().map(|(t, r)| (t.as_str(), r))
    }

    /// 특정 업종에 속한 (종목코드, 행) 순회.
    pub fn sector_peers<'a>(
        &'a self,
        sector: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a UniverseRow)> + 'a {
        self.iter().filter(move |(_, row)| row.sector() == Some(sector))
    }

    /// 업종별 종목 수 (업종명 오름차순).
    pub fn sectors(&self) -> Vec<SectorCount> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for (_, row) in self.iter() {
            if let Some(sector) = row.sector() {
                *counts.entry(sector).or_insert(0) += 1;
            }
        }
        counts
            .into_iter()
            .map(|(sector, count)| SectorCount {
                sector: sector.to_string(),
                count,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(per: f64, pbr: f64, sector: Option<&str>) -> UniverseRow {
        UniverseRow {
            per: Some(per),
            pbr: Some(pbr),
            sector: sector.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_rank_metric_from_str() {
        assert_eq!("PER".parse::<RankMetric>().unwrap(), RankMetric::Per);
        assert_eq!("시가총액".parse::<RankMetric>().unwrap(), RankMetric::MarketCap);
        assert_eq!("value_traded".parse::<RankMetric>().unwrap(), RankMetric::ValueTraded);
        assert_eq!("bps".parse::<RankMetric>().unwrap(), RankMetric::Bps);
        assert!("PER_ratio".parse::<RankMetric>().is_err());
        assert!("ROE".parse::<RankMetric>().is_err());
    }

    #[test]
    fn test_nan_value_is_missing() {
        let r = UniverseRow {
            eps: Some(f64::NAN),
            ..Default::default()
        };
        assert_eq!(r.value(RankMetric::Eps), None);
        assert_eq!(r.value(RankMetric::Bps), None);
    }

    #[test]
    fn test_retain_positive_valuations() {
        let mut table = UniverseTable::new()
            .with_row("A", row(10.0, 1.0, None))
            .with_row("B", row(-3.0, 1.0, None))
            .with_row("C", row(5.0, 0.0, None))
            .with_row("D", UniverseRow::default());

        let removed = table.retain_positive_valuations();
        assert_eq!(removed, 3);
        assert!(table.contains("A"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_sectors_and_peers() {
        let table = UniverseTable::new()
            .with_row("A", row(1.0, 1.0, Some("반도체")))
            .with_row("B", row(1.0, 1.0, Some("반도체")))
            .with_row("C", row(1.0, 1.0, Some("은행")))
            .with_row("D", row(1.0, 1.0, Some("  ")));

        let sectors = table.sectors();
        assert_eq!(sectors.len(), 2);
        assert_eq!(sectors[0].sector, "반도체");
        assert_eq!(sectors[0].count, 2);
        assert_eq!(table.sector_peers("은행").count(), 1);
        assert_eq!(table.get("D").and_then(|r| r.sector()), None);
    }

    #[test]
    fn test_record_deserializes_krx_column_names() {
        let json = r#"{"티커": "005930", "PER": 12.3, "PBR": 1.1, "시가총액": 1000.0, "업종명": "전기전자"}"#;
        let record: UniverseRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.ticker, "005930");
        assert_eq!(record.row.per, Some(12.3));
        assert_eq!(record.row.market_cap, Some(1000.0));
        assert_eq!(record.row.sector(), Some("전기전자"));
        assert_eq!(record.row.dps, None);
    }

    #[test]
    fn test_from_records_keeps_last_duplicate() {
        let records = vec![
            UniverseRecord {
                ticker: "A".to_string(),
                row: row(1.0, 1.0, None),
            },
            UniverseRecord {
                ticker: "A".to_string(),
                row: row(2.0, 1.0, None),
            },
        ];
        let table = UniverseTable::from_records(records);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("A").and_then(|r| r.per), Some(2.0));
    }
}
