//! 종목별 시장 스냅샷.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Price;

/// 일별 종가.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    /// 거래일
    pub date: NaiveDate,
    /// 종가
    pub close: Price,
}

/// 분석 시점의 시장 데이터.
///
/// 시가총액과 상장주식수는 분석 기준일 값이고, 주가 시계열은 최근 1년을 포함합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// 시가총액 (원)
    pub market_cap: Decimal,
    /// 상장주식수
    pub shares_outstanding: i64,
    /// 최근 1년 종가 (날짜 오름차순)
    #[serde(default)]
    pub price_series: Vec<PricePoint>,
}

impl MarketSnapshot {
    /// 주가 시계열 없이 생성합니다.
    pub fn new(market_cap: Decimal, shares_outstanding: i64) -> Self {
        Self {
            market_cap,
            shares_outstanding,
            price_series: Vec::new(),
        }
    }

    /// 주가 시계열을 설정합니다. 날짜 오름차순으로 정렬됩니다.
    pub fn with_prices(mut self, mut prices: Vec<PricePoint>) -> Self {
        prices.sort_by_key(|p| p.date);
        self.price_series = prices;
        self
    }

    /// 비율 계산용 시가총액.
    pub fn market_cap_f64(&self) -> f64 {
        self.market_cap.to_f64().unwrap_or(0.0)
    }

    /// 비율 계산용 상장주식수.
    pub fn shares_f64(&self) -> f64 {
        self.shares_outstanding as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_with_prices_sorts_by_date() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        let snapshot = MarketSnapshot::new(dec!(300), 10).with_prices(vec![
            PricePoint { date: d(3), close: dec!(30) },
            PricePoint { date: d(1), close: dec!(10) },
        ]);
        assert_eq!(snapshot.price_series[0].date, d(1));
        assert_eq!(snapshot.market_cap_f64(), 300.0);
        assert_eq!(snapshot.shares_f64(), 10.0);
    }
}
