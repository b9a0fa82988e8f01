//! CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - JSON 입력 파일 로딩 (분석 입력, 유니버스, 스코어링 설정)
//! - 단일 종목 분석 보고서 출력
//! - 유니버스 업종 목록

pub mod commands;
