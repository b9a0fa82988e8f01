//! 최근 1년 주가 요약.

use chrono::NaiveDate;
use kquant_core::{pct_change, MarketSnapshot, Percentage, Price, PricePoint};
use serde::{Deserialize, Serialize};

/// 주가 시계열 요약.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSummary {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// 첫 거래일 종가
    pub first_close: Price,
    /// 마지막 거래일 종가
    pub last_close: Price,
    /// 기간 최고 종가
    pub high: Price,
    /// 기간 최저 종가
    pub low: Price,
    /// 기간 수익률 (%, 소수점 2자리). 첫 종가가 0이면 `None`
    pub trailing_return: Option<Percentage>,
    /// 관측치 수
    pub observations: usize,
}

impl PriceSummary {
    /// 날짜 오름차순 시계열에서 요약을 계산합니다. 빈 시계열이면 `None`.
    pub fn from_series(series: &[PricePoint]) -> Option<Self> {
        let first = series.first()?;
        let last = series.last()?;

        let (high, low) = series.iter().fold((first.close, first.close), |(hi, lo), p| {
            (hi.max(p.close), lo.min(p.close))
        });

        Some(Self {
            start_date: first.date,
            end_date: last.date,
            first_close: first.close,
            last_close: last.close,
            high,
            low,
            trailing_return: pct_change(first.close, last.close),
            observations: series.len(),
        })
    }

    /// 시장 스냅샷의 주가 시계열 요약.
    pub fn from_snapshot(snapshot: &MarketSnapshot) -> Option<Self> {
        Self::from_series(&snapshot.price_series)
    }
}
