//! 무한대를 포함하는 `f64` 직렬화 헬퍼.
//!
//! JSON은 무한대/NaN을 표현하지 못해 serde_json이 `null`로 기록합니다.
//! 이 모듈은 유한하지 않은 값을 `"inf"`, `"-inf"`, `"NaN"` 문자열로 기록하고
//! 역직렬화 시 숫자와 문자열을 모두 받아들입니다.
//!
//! ```ignore
//! #[derive(Serialize, Deserialize)]
//! struct Comparison {
//!     #[serde(with = "kquant_core::types::non_finite_f64")]
//!     diff_pct: f64,
//! }
//!
//! // { "diff_pct": 12.5 } 또는 { "diff_pct": "inf" }
//! ```

/// `#[serde(with = "...")]`용 무한대 허용 `f64` 모듈.
pub mod non_finite_f64 {
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    /// 유한하면 숫자, 아니면 문자열로 직렬화.
    pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.collect_str(value)
        }
    }

    /// 숫자 또는 숫자 문자열 (`"inf"` 포함)을 역직렬화.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        match Value::deserialize(deserializer)? {
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| D::Error::custom("number out of f64 range")),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| D::Error::custom(format!("invalid float string: {}", s))),
            other => Err(D::Error::custom(format!(
                "expected number or float string, got {}",
                other
            ))),
        }
    }
}
