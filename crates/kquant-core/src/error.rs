//! 분석 시스템의 에러 타입.
//!
//! 스코어링 코어는 수치 입력에 대해 에러를 반환하지 않습니다.
//! 여기 정의된 에러는 입력 구성(재무 이력, 설정, 파일 로딩) 단계에서만 발생합니다.

use thiserror::Error;

/// 핵심 분석 에러.
#[derive(Debug, Error)]
pub enum KQuantError {
    /// 재무제표 이력이 비어 있음
    #[error("재무제표 이력이 비어 있습니다")]
    EmptyHistory,

    /// 같은 연도의 재무제표가 두 번 이상 제공됨
    #[error("중복된 재무제표 연도: {0}")]
    DuplicateYear(i32),

    /// 성장성 분석에 필요한 연도 수 부족
    #[error("재무 이력 부족: 필요 {required}개년, 제공 {provided}개년")]
    InsufficientHistory { required: usize, provided: usize },

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 찾을 수 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),
}

/// 분석 작업을 위한 Result 타입.
pub type KQuantResult<T> = Result<T, KQuantError>;

impl KQuantError {
    /// 호출자가 입력을 보완하면 다시 시도할 수 있는 에러인지 확인합니다.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            KQuantError::EmptyHistory
                | KQuantError::DuplicateYear(_)
                | KQuantError::InsufficientHistory { .. }
                | KQuantError::InvalidInput(_)
        )
    }
}

impl From<serde_json::Error> for KQuantError {
    fn from(err: serde_json::Error) -> Self {
        KQuantError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for KQuantError {
    fn from(err: config::ConfigError) -> Self {
        KQuantError::Config(err.to_string())
    }
}
