//! 재무 데이터 수집 현황.
//!
//! 계정과목 값이 0이면 수집기가 해당 항목을 찾지 못한 것으로 봅니다.

use kquant_core::{Account, FinancialHistory};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// 누락된 (연도, 계정과목).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingAccount {
    pub year: i32,
    pub account: Account,
}

/// 연도별 수집 현황 보고서.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQualityReport {
    /// 수집된 연도 (오름차순)
    pub years: Vec<i32>,
    /// 값이 0인 계정과목
    pub missing: Vec<MissingAccount>,
}

impl DataQualityReport {
    /// 재무 이력을 점검합니다.
    pub fn from_history(history: &FinancialHistory) -> Self {
        let accounts = Account::BALANCE_SHEET
            .into_iter()
            .chain(Account::INCOME_AND_CASHFLOW);

        let mut missing = Vec::new();
        for statement in history.years() {
            for account in accounts.clone() {
                if !statement.is_reported(account) {
                    missing.push(MissingAccount {
                        year: statement.year,
                        account,
                    });
                }
            }
        }

        let report = Self {
            years: history.years().iter().map(|s| s.year).collect(),
            missing,
        };
        for gap in report.missing_key_income() {
            warn!(year = gap.year, account = %gap.account, "Key income account not found");
        }
        report
    }

    /// 모든 계정과목이 수집되었는지 확인.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// 핵심 손익 항목(매출액, 영업이익, 당기순이익) 중 누락된 것.
    pub fn missing_key_income(&self) -> impl Iterator<Item = &MissingAccount> + '_ {
        self.missing
            .iter()
            .filter(|m| Account::KEY_INCOME.contains(&m.account))
    }

    /// 특정 연도에 누락된 계정과목.
    pub fn missing_in(&self, year: i32) -> Vec<Account> {
        self.missing
            .iter()
            .filter(|m| m.year == year)
            .map(|m| m.account)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kquant_core::FinancialStatementYear;

    fn full_year(year: i32) -> FinancialStatementYear {
        FinancialStatementYear {
            year,
            revenue: 1,
            operating_income: 1,
            pretax_income: 1,
            net_income: 1,
            current_assets: 1,
            noncurrent_assets: 1,
            total_assets: 1,
            current_liabilities: 1,
            noncurrent_liabilities: 1,
            total_liabilities: 1,
            paid_in_capital: 1,
            retained_earnings: 1,
            total_equity: 1,
            operating_cashflow: 1,
        }
    }

    #[test]
    fn test_complete_history() {
        let history = FinancialHistory::new(vec![full_year(2023), full_year(2024)]).unwrap();
        let report = DataQualityReport::from_history(&history);
        assert!(report.is_complete());
        assert_eq!(report.years, vec![2023, 2024]);
    }

    #[test]
    fn test_zero_sentinel_reported_per_year() {
        let mut latest = full_year(2024);
        latest.revenue = 0;
        latest.operating_cashflow = 0;
        let history = FinancialHistory::new(vec![latest, full_year(2023)]).unwrap();

        let report = DataQualityReport::from_history(&history);
        assert!(!report.is_complete());
        assert_eq!(report.missing.len(), 2);
        assert!(report.missing_in(2023).is_empty());
        assert_eq!(
            report.missing_in(2024),
            vec![Account::Revenue, Account::OperatingCashflow]
        );
        assert_eq!(report.missing_key_income().count(), 1);
    }

    #[test]
    fn test_empty_statement_misses_every_account() {
        let history = FinancialHistory::new(vec![FinancialStatementYear::new(2024)]).unwrap();
        let report = DataQualityReport::from_history(&history);
        assert_eq!(report.missing.len(), 14);
    }
}
