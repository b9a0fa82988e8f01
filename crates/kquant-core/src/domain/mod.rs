//! 분석 대상 도메인 모델.

mod category;
mod market;
mod metrics;
mod statement;
mod universe;

pub use category::*;
pub use market::*;
pub use metrics::*;
pub use statement::*;
pub use universe::*;
