//! 연도별 재무제표 레코드와 재무 이력.
//!
//! 모든 금액은 원 단위 부호 있는 정수입니다. 데이터 수집기가 계정과목을 찾지 못하면
//! 값은 `0`으로 채워집니다 (키 누락이 아니라 0이 "찾을 수 없음"을 뜻합니다).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{KQuantError, KQuantResult};

/// 재무제표 계정과목.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Account {
    /// 유동자산
    CurrentAssets,
    /// 비유동자산
    NoncurrentAssets,
    /// 자산총계
    TotalAssets,
    /// 유동부채
    CurrentLiabilities,
    /// 비유동부채
    NoncurrentLiabilities,
    /// 부채총계
    TotalLiabilities,
    /// 자본금
    PaidInCapital,
    /// 이익잉여금
    RetainedEarnings,
    /// 자본총계
    TotalEquity,
    /// 매출액
    Revenue,
    /// 영업이익
    OperatingIncome,
    /// 법인세차감전순이익
    PretaxIncome,
    /// 당기순이익
    NetIncome,
    /// 영업활동 현금흐름
    OperatingCashflow,
}

impl Account {
    /// 재무상태표 항목.
    pub const BALANCE_SHEET: [Account; 9] = [
        Account::CurrentAssets,
        Account::NoncurrentAssets,
        Account::TotalAssets,
        Account::CurrentLiabilities,
        Account::NoncurrentLiabilities,
        Account::TotalLiabilities,
        Account::PaidInCapital,
        Account::RetainedEarnings,
        Account::TotalEquity,
    ];

    /// 손익계산서 및 현금흐름표 항목.
    pub const INCOME_AND_CASHFLOW: [Account; 5] = [
        Account::Revenue,
        Account::OperatingIncome,
        Account::PretaxIncome,
        Account::NetIncome,
        Account::OperatingCashflow,
    ];

    /// 성장성 계산에 쓰이는 핵심 손익 항목.
    pub const KEY_INCOME: [Account; 3] = [
        Account::Revenue,
        Account::OperatingIncome,
        Account::NetIncome,
    ];

    /// 한글 계정과목명.
    pub fn label(&self) -> &'static str {
        match self {
            Account::CurrentAssets => "유동자산",
            Account::NoncurrentAssets => "비유동자산",
            Account::TotalAssets => "자산총계",
            Account::CurrentLiabilities => "유동부채",
            Account::NoncurrentLiabilities => "비유동부채",
            Account::TotalLiabilities => "부채총계",
            Account::PaidInCapital => "자본금",
            Account::RetainedEarnings => "이익잉여금",
            Account::TotalEquity => "자본총계",
            Account::Revenue => "매출액",
            Account::OperatingIncome => "영업이익",
            Account::PretaxIncome => "법인세차감전순이익",
            Account::NetIncome => "당기순이익",
            Account::OperatingCashflow => "영업활동 현금흐름",
        }
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 한 회계연도의 주요 재무제표 값.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialStatementYear {
    /// 회계연도
    pub year: i32,
    /// 매출액
    #[serde(default)]
    pub revenue: i64,
    /// 영업이익
    #[serde(default)]
    pub operating_income: i64,
    /// 법인세차감전순이익
    #[serde(default)]
    pub pretax_income: i64,
    /// 당기순이익
    #[serde(default)]
    pub net_income: i64,
    /// 유동자산
    #[serde(default)]
    pub current_assets: i64,
    /// 비유동자산
    #[serde(default)]
    pub noncurrent_assets: i64,
    /// 자산총계
    #[serde(default)]
    pub total_assets: i64,
    /// 유동부채
    #[serde(default)]
    pub current_liabilities: i64,
    /// 비유동부채
    #[serde(default)]
    pub noncurrent_liabilities: i64,
    /// 부채총계
    #[serde(default)]
    pub total_liabilities: i64,
    /// 자본금
    #[serde(default)]
    pub paid_in_capital: i64,
    /// 이익잉여금
    #[serde(default)]
    pub retained_earnings: i64,
    /// 자본총계
    #[serde(default)]
    pub total_equity: i64,
    /// 영업활동 현금흐름
    #[serde(default)]
    pub operating_cashflow: i64,
}

impl FinancialStatementYear {
    /// 모든 계정이 0인 빈 레코드를 생성합니다.
    pub fn new(year: i32) -> Self {
        Self {
            year,
            ..Default::default()
        }
    }

    /// 계정과목 값 조회.
    pub fn amount(&self, account: Account) -> i64 {
        match account {
            Account::CurrentAssets => self.current_assets,
            Account::NoncurrentAssets => self.noncurrent_assets,
            Account::TotalAssets => self.total_assets,
            Account::CurrentLiabilities => self.current_liabilities,
            Account::NoncurrentLiabilities => self.noncurrent_liabilities,
            Account::TotalLiabilities => self.total_liabilities,
            Account::PaidInCapital => self.paid_in_capital,
            Account::RetainedEarnings => self.retained_earnings,
            Account::TotalEquity => self.total_equity,
            Account::Revenue => self.revenue,
            Account::OperatingIncome => self.operating_income,
            Account::PretaxIncome => self.pretax_income,
            Account::NetIncome => self.net_income,
            Account::OperatingCashflow => self.operating_cashflow,
        }
    }

    /// 계정과목이 수집되었는지 확인합니다 (0은 "찾을 수 없음").
    pub fn is_reported(&self, account: Account) -> bool {
        self.amount(account) != 0
    }
}

/// 연도 오름차순으로 정렬된 재무 이력 (최소 1개년, 연도 중복 없음).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinancialHistory {
    years: Vec<FinancialStatementYear>,
}

impl FinancialHistory {
    /// 재무제표 목록으로부터 이력을 생성합니다.
    ///
    /// 입력 순서와 무관하게 연도 오름차순으로 정렬합니다.
    ///
    /// # 에러
    ///
    /// - 빈 목록: [`KQuantError::EmptyHistory`]
    /// - 연도 중복: [`KQuantError::DuplicateYear`]
    pub fn new(mut years: Vec<FinancialStatementYear>) -> KQuantResult<Self> {
        if years.is_empty() {
            return Err(KQuantError::EmptyHistory);
        }

        years.sort_by_key(|s| s.year);
        if let Some(dup) = years.windows(2).find(|w| w[0].year == w[1].year) {
            return Err(KQuantError::DuplicateYear(dup[0].year));
        }

        Ok(Self { years })
    }

    /// 가장 최근 연도.
    pub fn latest(&self) -> &FinancialStatementYear {
        // new()가 비어 있지 않음을 보장
        &self.years[self.years.len() - 1]
    }

    /// 직전 연도 (2개년 이상일 때만).
    pub fn previous(&self) -> Option<&FinancialStatementYear> {
        self.years.len().checked_sub(2).map(|i| &self.years[i])
    }

    /// 수집된 연도 수.
    pub fn len(&self) -> usize {
        self.years.len()
    }

    /// 항상 false (빈 이력은 생성 불가).
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// 연도 오름차순 슬라이스.
    pub fn years(&self) -> &[FinancialStatementYear] {
        &self.years
    }
}

impl<'de> Deserialize<'de> for FinancialHistory {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let years = Vec::<FinancialStatementYear>::deserialize(deserializer)?;
        FinancialHistory::new(years).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn year(y: i32, revenue: i64) -> FinancialStatementYear {
        FinancialStatementYear {
            revenue,
            ..FinancialStatementYear::new(y)
        }
    }

    #[test]
    fn test_history_sorts_ascending() {
        let history = FinancialHistory::new(vec![year(2024, 3), year(2022, 1), year(2023, 2)])
            .unwrap();
        assert_eq!(history.latest().year, 2024);
        assert_eq!(history.previous().map(|p| p.year), Some(2023));
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_history_rejects_empty() {
        assert!(matches!(
            FinancialHistory::new(vec![]),
            Err(KQuantError::EmptyHistory)
        ));
    }

    #[test]
    fn test_history_rejects_duplicate_year() {
        let result = FinancialHistory::new(vec![year(2023, 1), year(2023, 2)]);
        assert!(matches!(result, Err(KQuantError::DuplicateYear(2023))));
    }

    #[test]
    fn test_single_year_has_no_previous() {
        let history = FinancialHistory::new(vec![year(2024, 1)]).unwrap();
        assert!(history.previous().is_none());
    }

    #[test]
    fn test_zero_means_not_reported() {
        let statement = year(2024, 0);
        assert!(!statement.is_reported(Account::Revenue));
        assert_eq!(statement.amount(Account::Revenue), 0);
    }

    #[test]
    fn test_missing_fields_deserialize_as_zero() {
        let statement: FinancialStatementYear =
            serde_json::from_str(r#"{"year": 2024, "revenue": 100}"#).unwrap();
        assert_eq!(statement.revenue, 100);
        assert_eq!(statement.total_equity, 0);
    }

    #[test]
    fn test_history_deserialize_validates() {
        let err = serde_json::from_str::<FinancialHistory>("[]").unwrap_err();
        assert!(err.to_string().contains("비어"));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn history_is_sorted_and_latest_is_max(
                years in prop::collection::btree_set(1990i32..2100, 1..12),
            ) {
                // 입력을 내림차순으로 뒤집어도 결과는 오름차순
                let statements: Vec<_> = years.iter().rev().map(|y| year(*y, 1)).collect();
                let history = FinancialHistory::new(statements).unwrap();

                let sorted: Vec<i32> = history.years().iter().map(|s| s.year).collect();
                prop_assert_eq!(&sorted, &years.iter().copied().collect::<Vec<_>>());
                prop_assert_eq!(Some(&history.latest().year), years.iter().next_back());
            }
        }
    }
}
