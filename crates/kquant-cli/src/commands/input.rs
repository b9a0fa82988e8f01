//! JSON 입력 파일 로딩.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use kquant_analytics::AnalysisInput;
use kquant_core::{ScoringConfig, UniverseRecord, UniverseTable};
use tracing::info;

/// 유니버스 파일 로딩.
///
/// `ticker`(또는 `티커`) 필드를 가진 행의 JSON 배열이어야 합니다.
/// PER, PBR이 양수가 아닌 종목은 제외합니다.
pub fn load_universe(path: &Path) -> Result<UniverseTable> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read universe file: {}", path.display()))?;
    parse_universe(&text).with_context(|| format!("Invalid universe file: {}", path.display()))
}

/// 유니버스 JSON 파싱.
pub fn parse_universe(json: &str) -> Result<UniverseTable> {
    let records: Vec<UniverseRecord> =
        serde_json::from_str(json).context("Failed to parse universe rows")?;
    let total = records.len();

    let mut universe = UniverseTable::from_records(records);
    let removed = universe.retain_positive_valuations();
    info!(total, removed, remaining = universe.len(), "Universe loaded");

    Ok(universe)
}

/// 분석 입력 파일 로딩.
pub fn load_input(path: &Path) -> Result<AnalysisInput> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;
    let input: AnalysisInput = serde_json::from_str(&text)
        .with_context(|| format!("Invalid input file: {}", path.display()))?;

    info!(
        ticker = %input.ticker,
        years = input.statements.len(),
        prices = input.market.price_series.len(),
        "Analysis input loaded"
    );
    Ok(input)
}

/// 스코어링 설정 로딩. 경로가 없으면 `config/scoring.toml`과 환경 변수를 사용합니다.
pub fn load_config(path: Option<&Path>) -> Result<ScoringConfig> {
    let config = match path {
        Some(path) => ScoringConfig::load(path)
            .with_context(|| format!("Failed to load scoring config: {}", path.display()))?,
        None => ScoringConfig::load_default().context("Failed to load default scoring config")?,
    };
    Ok(config)
}
