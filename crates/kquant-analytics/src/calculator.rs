//! 퀀트 지표 계산기.
//!
//! 재무 이력과 시장 스냅샷으로부터 카테고리별 지표를 산출합니다.
//! 유니버스와의 비교 없이 종목 자체 데이터만 사용합니다.
//!
//! # 지표
//!
//! | 카테고리 | 지표 | 분모가 0 이하일 때 |
//! |---|---|---|
//! | 수익성 | ROE, 영업이익률, EPS | 0 |
//! | 안정성 | 부채비율 (%) | +∞ (문자열 `"inf"`) |
//! | 성장성 | 매출액/영업이익/당기순이익 성장률 | 0 |
//! | 현금흐름 | CFO_매출액비율, OCF_시가총액비율 | 0 |
//! | 가치 | PER, PBR | +∞ |
//! | 가치 | BPS | 0 |

use std::collections::BTreeMap;

use kquant_core::{
    Category, FinancialHistory, FinancialStatementYear, MarketSnapshot, MetricKey, MetricSet,
    MetricValue, RankMetric, UniverseRow, UniverseTable,
};
use tracing::{debug, info};

// ================================================================================================
// Calculator
// ================================================================================================

/// 퀀트 지표 계산기.
pub struct MetricCalculator;

impl MetricCalculator {
    /// 모든 지표 계산.
    ///
    /// 가장 최근 연도(`latest`)와 직전 연도(`previous`)를 사용합니다.
    /// 1개년 이력이면 성장률은 모두 0입니다.
    pub fn calculate(history: &FinancialHistory, market: &MarketSnapshot) -> MetricSet {
        let latest = history.latest();

        let mut metrics = MetricSet::new();
        metrics.replace_category(
            Category::Profitability,
            Self::calculate_profitability(latest, market),
        );
        metrics.replace_category(Category::Stability, Self::calculate_stability(latest));
        metrics.replace_category(
            Category::Growth,
            Self::calculate_growth(latest, history.previous()),
        );
        metrics.replace_category(Category::CashFlow, Self::calculate_cash_flow(latest, market));
        metrics.replace_category(Category::Value, Self::calculate_value(latest, market));

        info!(
            year = latest.year,
            years = history.len(),
            "Derived metrics from financial statements"
        );
        metrics
    }

    /// 지표 계산 후 유니버스 공식 값을 반영합니다.
    ///
    /// 종목이 유니버스에 있으면 가치(PER, PBR, BPS)와 수익성(EPS)을 유니버스 값으로
    /// 덮어씁니다. 순위 계산 기준과 표시 값을 일치시키기 위함입니다.
    pub fn calculate_with_reference(
        history: &FinancialHistory,
        market: &MarketSnapshot,
        ticker: &str,
        universe: &UniverseTable,
    ) -> MetricSet {
        let mut metrics = Self::calculate(history, market);
        match universe.get(ticker) {
            Some(row) => Self::apply_reference(&mut metrics, row),
            None => debug!(ticker, "Ticker not in universe, keeping derived valuation metrics"),
        }
        metrics
    }

    /// 유니버스 행의 PER/PBR/BPS/EPS로 덮어쓰기.
    ///
    /// 유니버스 셀이 비어 있으면 계산된 값을 유지합니다.
    /// ROE, 영업이익률, 성장률, 현금흐름 비율은 변경하지 않습니다.
    pub fn apply_reference(metrics: &mut MetricSet, row: &UniverseRow) {
        let overrides = [
            (Category::Value, MetricKey::Per, RankMetric::Per),
            (Category::Value, MetricKey::Pbr, RankMetric::Pbr),
            (Category::Value, MetricKey::Bps, RankMetric::Bps),
            (Category::Profitability, MetricKey::Eps, RankMetric::Eps),
        ];

        for (category, key, column) in overrides {
            if let Some(value) = row.value(column) {
                metrics.insert(category, key, value);
            }
        }
    }

    // ============================================================================================
    // 카테고리별 계산
    // ============================================================================================

    /// 수익성: ROE, 영업이익률, EPS.
    fn calculate_profitability(
        latest: &FinancialStatementYear,
        market: &MarketSnapshot,
    ) -> BTreeMap<MetricKey, MetricValue> {
        let net_income = latest.net_income as f64;
        let equity = latest.total_equity as f64;
        let revenue = latest.revenue as f64;
        let shares = market.shares_f64();

        let roe = ratio_pct(net_income, equity).unwrap_or(0.0);
        let op_margin = ratio_pct(latest.operating_income as f64, revenue).unwrap_or(0.0);
        let eps = ratio(net_income, shares).unwrap_or(0.0);

        BTreeMap::from([
            (MetricKey::Roe, roe.into()),
            (MetricKey::OperatingMargin, op_margin.into()),
            (MetricKey::Eps, eps.into()),
        ])
    }

    /// 안정성: 부채비율 (%), 소수점 2자리 문자열.
    fn calculate_stability(latest: &FinancialStatementYear) -> BTreeMap<MetricKey, MetricValue> {
        let debt_ratio = debt_ratio(latest);
        BTreeMap::from([(MetricKey::DebtRatio, format!("{:.2}", debt_ratio).into())])
    }

    /// 성장성: 전년 대비 성장률.
    fn calculate_growth(
        latest: &FinancialStatementYear,
        previous: Option<&FinancialStatementYear>,
    ) -> BTreeMap<MetricKey, MetricValue> {
        let (sales, op, net) = match previous {
            Some(prev) => (
                growth_rate(latest.revenue, prev.revenue),
                growth_rate(latest.operating_income, prev.operating_income),
                growth_rate(latest.net_income, prev.net_income),
            ),
            None => {
                debug!(year = latest.year, "Single-year history, growth rates default to 0");
                (0.0, 0.0, 0.0)
            }
        };

        BTreeMap::from([
            (MetricKey::RevenueGrowth, sales.into()),
            (MetricKey::OperatingIncomeGrowth, op.into()),
            (MetricKey::NetIncomeGrowth, net.into()),
        ])
    }

    /// 현금흐름: 매출액/시가총액 대비 영업활동 현금흐름.
    fn calculate_cash_flow(
        latest: &FinancialStatementYear,
        market: &MarketSnapshot,
    ) -> BTreeMap<MetricKey, MetricValue> {
        let cfo = latest.operating_cashflow as f64;
        let cfo_sales = ratio_pct(cfo, latest.revenue as f64).unwrap_or(0.0);
        let cfo_market_cap = ratio_pct(cfo, market.market_cap_f64()).unwrap_or(0.0);

        BTreeMap::from([
            (MetricKey::CfoToSales, cfo_sales.into()),
            (MetricKey::CfoToMarketCap, cfo_market_cap.into()),
        ])
    }

    /// 가치: PER, PBR, BPS.
    fn calculate_value(
        latest: &FinancialStatementYear,
        market: &MarketSnapshot,
    ) -> BTreeMap<MetricKey, MetricValue> {
        let market_cap = market.market_cap_f64();
        let equity = latest.total_equity as f64;

        let per = ratio(market_cap, latest.net_income as f64).unwrap_or(f64::INFINITY);
        let pbr = ratio(market_cap, equity).unwrap_or(f64::INFINITY);
        let bps = ratio(equity, market.shares_f64()).unwrap_or(0.0);

        BTreeMap::from([
            (MetricKey::Per, per.into()),
            (MetricKey::Pbr, pbr.into()),
            (MetricKey::Bps, bps.into()),
        ])
    }
}

// ================================================================================================
// 공통 계산
// ================================================================================================

/// `numerator / denominator` (분모가 양수일 때만).
fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    (denominator > 0.0).then(|| numerator / denominator)
}

/// `numerator / denominator * 100` (분모가 양수일 때만).
fn ratio_pct(numerator: f64, denominator: f64) -> Option<f64> {
    ratio(numerator, denominator).map(|r| r * 100.0)
}

/// 부채비율 (%). 자본총계가 0 이하이면 +∞.
pub fn debt_ratio(statement: &FinancialStatementYear) -> f64 {
    ratio_pct(statement.total_liabilities as f64, statement.total_equity as f64)
        .unwrap_or(f64::INFINITY)
}

/// 전년 대비 성장률 (%).
///
/// 두 값이 모두 0이 아닐 때만 `(latest - previous) / |previous| * 100`,
/// 한쪽이라도 0이면 0을 반환합니다 (0을 거치는 변화는 의미 있는 비율이 아님).
pub fn growth_rate(latest: i64, previous: i64) -> f64 {
    if latest == 0 || previous == 0 {
        return 0.0;
    }
    let latest = latest as f64;
    let previous = previous as f64;
    (latest - previous) / previous.abs() * 100.0
}

// ================================================================================================
// Tests
// ================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn statement(year: i32) -> FinancialStatementYear {
        FinancialStatementYear::new(year)
    }

    fn history(years: Vec<FinancialStatementYear>) -> FinancialHistory {
        FinancialHistory::new(years).unwrap()
    }

    #[test]
    fn test_growth_rate_basic() {
        assert_eq!(growth_rate(150, 100), 50.0);
        assert_eq!(growth_rate(50, 100), -50.0);
    }

    #[test]
    fn test_growth_rate_from_negative_base_uses_abs() {
        // 적자 축소: -100 → -50 은 +50%
        assert_eq!(growth_rate(-50, -100), 50.0);
        // 흑자 전환: -100 → 100 은 +200%
        assert_eq!(growth_rate(100, -100), 200.0);
    }

    #[test]
    fn test_growth_rate_suppressed_through_zero() {
        assert_eq!(growth_rate(100, 0), 0.0);
        assert_eq!(growth_rate(0, 100), 0.0);
        assert_eq!(growth_rate(0, 0), 0.0);
    }

    #[test]
    fn test_debt_ratio_zero_equity_is_infinite() {
        let s = FinancialStatementYear {
            total_liabilities: 50,
            total_equity: 0,
            ..statement(2024)
        };
        assert_eq!(debt_ratio(&s), f64::INFINITY);

        let metrics = MetricCalculator::calculate(
            &history(vec![s]),
            &MarketSnapshot::new(dec!(100), 10),
        );
        assert_eq!(
            metrics.get(Category::Stability, MetricKey::DebtRatio),
            Some(&MetricValue::Text("inf".to_string()))
        );
    }

    #[test]
    fn test_debt_ratio_formatted_two_decimals() {
        let s = FinancialStatementYear {
            total_liabilities: 50,
            total_equity: 200,
            ..statement(2024)
        };
        let metrics =
            MetricCalculator::calculate(&history(vec![s]), &MarketSnapshot::new(dec!(100), 10));
        assert_eq!(
            metrics.get(Category::Stability, MetricKey::DebtRatio),
            Some(&MetricValue::Text("25.00".to_string()))
        );
    }

    #[test]
    fn test_value_metrics_with_losses() {
        let s = FinancialStatementYear {
            net_income: -10,
            total_equity: 0,
            ..statement(2024)
        };
        let metrics =
            MetricCalculator::calculate(&history(vec![s]), &MarketSnapshot::new(dec!(300), 10));
        assert_eq!(metrics.number(Category::Value, MetricKey::Per), Some(f64::INFINITY));
        assert_eq!(metrics.number(Category::Value, MetricKey::Pbr), Some(f64::INFINITY));
        assert_eq!(metrics.number(Category::Value, MetricKey::Bps), Some(0.0));
        assert_eq!(metrics.number(Category::Profitability, MetricKey::Roe), Some(0.0));
        assert_eq!(metrics.number(Category::Profitability, MetricKey::Eps), Some(-1.0));
    }

    #[test]
    fn test_zero_shares_and_revenue() {
        let s = FinancialStatementYear {
            net_income: 10,
            operating_income: 5,
            operating_cashflow: 7,
            total_equity: 100,
            ..statement(2024)
        };
        let metrics =
            MetricCalculator::calculate(&history(vec![s]), &MarketSnapshot::new(dec!(0), 0));
        assert_eq!(metrics.number(Category::Profitability, MetricKey::Eps), Some(0.0));
        assert_eq!(
            metrics.number(Category::Profitability, MetricKey::OperatingMargin),
            Some(0.0)
        );
        assert_eq!(metrics.number(Category::Value, MetricKey::Bps), Some(0.0));
        assert_eq!(metrics.number(Category::CashFlow, MetricKey::CfoToSales), Some(0.0));
        assert_eq!(metrics.number(Category::CashFlow, MetricKey::CfoToMarketCap), Some(0.0));
        // 시가총액 0 / 순이익 10
        assert_eq!(metrics.number(Category::Value, MetricKey::Per), Some(0.0));
    }

    #[test]
    fn test_single_year_growth_defaults_to_zero() {
        let s = FinancialStatementYear {
            revenue: 100,
            ..statement(2024)
        };
        let metrics =
            MetricCalculator::calculate(&history(vec![s]), &MarketSnapshot::new(dec!(1), 1));
        for key in MetricKey::GROWTH_RATES {
            assert_eq!(metrics.number(Category::Growth, key), Some(0.0));
        }
    }

    #[test]
    fn test_two_year_scenario() {
        let prev = FinancialStatementYear {
            revenue: 100,
            net_income: 10,
            operating_income: 8,
            total_equity: 200,
            total_liabilities: 50,
            operating_cashflow: 15,
            ..statement(2023)
        };
        let latest = FinancialStatementYear {
            revenue: 150,
            net_income: 20,
            operating_income: 12,
            ..prev.clone()
        };
        let latest = FinancialStatementYear { year: 2024, ..latest };

        let metrics = MetricCalculator::calculate(
            &history(vec![prev, latest]),
            &MarketSnapshot::new(dec!(300), 10),
        );

        assert_eq!(metrics.number(Category::Value, MetricKey::Per), Some(15.0));
        assert_eq!(metrics.number(Category::Value, MetricKey::Pbr), Some(1.5));
        assert_eq!(metrics.number(Category::Value, MetricKey::Bps), Some(20.0));
        assert_eq!(metrics.number(Category::Profitability, MetricKey::Roe), Some(10.0));
        assert_eq!(metrics.number(Category::Profitability, MetricKey::Eps), Some(2.0));
        assert_eq!(
            metrics.number(Category::Profitability, MetricKey::OperatingMargin),
            Some(8.0)
        );
        assert_eq!(metrics.number(Category::Growth, MetricKey::RevenueGrowth), Some(50.0));
        assert_eq!(metrics.number(Category::Growth, MetricKey::NetIncomeGrowth), Some(100.0));
        assert_eq!(
            metrics.number(Category::Growth, MetricKey::OperatingIncomeGrowth),
            Some(50.0)
        );
        assert_eq!(metrics.number(Category::CashFlow, MetricKey::CfoToSales), Some(10.0));
        assert_eq!(metrics.number(Category::CashFlow, MetricKey::CfoToMarketCap), Some(5.0));
    }

    #[test]
    fn test_reference_override_replaces_only_valuation() {
        let s = FinancialStatementYear {
            revenue: 100,
            net_income: 20,
            total_equity: 200,
            ..statement(2024)
        };
        let universe = UniverseTable::new().with_row(
            "005930",
            UniverseRow {
                per: Some(12.3),
                pbr: Some(0.9),
                bps: Some(55_000.0),
                eps: Some(4_000.0),
                ..Default::default()
            },
        );

        let metrics = MetricCalculator::calculate_with_reference(
            &history(vec![s]),
            &MarketSnapshot::new(dec!(300), 10),
            "005930",
            &universe,
        );

        assert_eq!(metrics.number(Category::Value, MetricKey::Per), Some(12.3));
        assert_eq!(metrics.number(Category::Value, MetricKey::Pbr), Some(0.9));
        assert_eq!(metrics.number(Category::Value, MetricKey::Bps), Some(55_000.0));
        assert_eq!(metrics.number(Category::Profitability, MetricKey::Eps), Some(4_000.0));
        // ROE는 내부 계산 유지
        assert_eq!(metrics.number(Category::Profitability, MetricKey::Roe), Some(10.0));
    }

    #[test]
    fn test_reference_missing_cell_keeps_derived_value() {
        let s = FinancialStatementYear {
            net_income: 20,
            total_equity: 200,
            ..statement(2024)
        };
        let universe = UniverseTable::new().with_row(
            "A",
            UniverseRow {
                per: Some(7.0),
                ..Default::default()
            },
        );
        let metrics = MetricCalculator::calculate_with_reference(
            &history(vec![s]),
            &MarketSnapshot::new(dec!(300), 10),
            "A",
            &universe,
        );
        assert_eq!(metrics.number(Category::Value, MetricKey::Per), Some(7.0));
        assert_eq!(metrics.number(Category::Value, MetricKey::Pbr), Some(1.5));
    }

    #[test]
    fn test_absent_ticker_keeps_derived_values() {
        let s = FinancialStatementYear {
            net_income: 20,
            total_equity: 200,
            ..statement(2024)
        };
        let metrics = MetricCalculator::calculate_with_reference(
            &history(vec![s]),
            &MarketSnapshot::new(dec!(300), 10),
            "999999",
            &UniverseTable::new(),
        );
        assert_eq!(metrics.number(Category::Value, MetricKey::Per), Some(15.0));
    }
}
