//! 백분위 순위 계산.
//!
//! 동점은 평균 순위를 공유합니다 (행 순서와 무관).
//! `pct = 평균순위 / n`, 순위는 1부터 시작하므로 결과는 `(0, 1]` 범위입니다.

use serde::{Deserialize, Serialize};

/// 순위 비교 모집단.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Population {
    /// 유니버스 전체
    Market,
    /// 동일 업종 (종목 수가 부족하면 전체 시장으로 대체)
    Sector,
}

/// `target`의 모집단 내 백분위 (평균 순위 방식).
///
/// 유한하지 않은 값은 모집단에서 제외됩니다. 모집단이 비었거나 `target`이
/// 유한하지 않으면 `None`을 반환합니다.
///
/// `target`은 모집단에 포함된 값이어야 합니다 (자기 자신의 행).
pub fn percentile_rank<I>(population: I, target: f64) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    if !target.is_finite() {
        return None;
    }

    let mut n = 0usize;
    let mut below = 0usize;
    let mut equal = 0usize;
    for value in population.into_iter().filter(|v| v.is_finite()) {
        n += 1;
        if value < target {
            below += 1;
        } else if value == target {
            equal += 1;
        }
    }

    if n == 0 || equal == 0 {
        return None;
    }

    // 동점 구간 [below+1, below+equal]의 평균 순위
    let avg_rank = below as f64 + (equal as f64 + 1.0) / 2.0;
    Some(avg_rank / n as f64)
}

/// 백분위를 0-100 점수로 변환합니다.
pub fn percentile_score(percentile: f64, lower_is_better: bool) -> f64 {
    if lower_is_better {
        (1.0 - percentile) * 100.0
    } else {
        percentile * 100.0
    }
}
