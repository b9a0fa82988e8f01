//! 분석 시스템 전반에서 사용되는 공통 타입.

mod decimal;
pub mod serde_helpers;

pub use decimal::*;
pub use serde_helpers::non_finite_f64;
