//! 가격 및 보고서 표시용 Decimal 유틸리티.
//!
//! 지표/점수 계산은 무한대 표현이 필요하므로 `f64`로 수행하고,
//! 가격과 보고서의 반올림된 표시 값만 `Decimal`을 사용합니다.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// 주가 타입.
pub type Price = Decimal;

/// 퍼센트 타입 (5.25 = 5.25%).
pub type Percentage = Decimal;

/// f64를 Decimal로 변환 후 지정 자릿수로 반올림.
///
/// NaN/무한대는 `None`을 반환합니다.
pub fn decimal_from_f64(value: f64, dp: u32) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero))
}

/// `from` 대비 `to`의 변화율 (%), 소수점 2자리.
///
/// `from`이 0이면 `None`.
pub fn pct_change(from: Price, to: Price) -> Option<Percentage> {
    if from.is_zero() {
        return None;
    }
    let pct = (to - from) / from * Decimal::ONE_HUNDRED;
    Some(pct.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decimal_from_f64() {
        assert_eq!(decimal_from_f64(12.346, 2), Some(dec!(12.35)));
        assert_eq!(decimal_from_f64(100.0, 1), Some(dec!(100.0)));
        assert_eq!(decimal_from_f64(f64::INFINITY, 2), None);
        assert_eq!(decimal_from_f64(f64::NAN, 2), None);
    }

    #[test]
    fn test_pct_change() {
        assert_eq!(pct_change(dec!(100), dec!(125)), Some(dec!(25.00)));
        assert_eq!(pct_change(dec!(200), dec!(150)), Some(dec!(-25.00)));
        assert_eq!(pct_change(dec!(0), dec!(10)), None);
    }
}
