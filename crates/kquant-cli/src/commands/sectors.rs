//! 유니버스 업종 목록 명령.

use std::path::Path;

use anyhow::{Context, Result};
use kquant_core::{SectorCount, UniverseTable};

use super::analyze::OutputFormat;
use super::input::load_universe;

/// 업종별 종목 수를 출력합니다.
pub fn list_sectors(universe: &Path, format: OutputFormat, min_peers: usize) -> Result<usize> {
    let universe = load_universe(universe)?;
    let sectors = universe.sectors();

    let content = match format {
        OutputFormat::Table => format_table(&universe, &sectors, min_peers),
        OutputFormat::Json => {
            serde_json::to_string_pretty(&sectors).context("Failed to serialize to JSON")?
        }
    };
    println!("{}", content);

    Ok(sectors.len())
}

/// 테이블 형식 출력. 업종 비교가 가능한 업종(`min_peers` 이상)에 표시합니다.
fn format_table(universe: &UniverseTable, sectors: &[SectorCount], min_peers: usize) -> String {
    let mut output = String::new();

    output.push_str(&format!("{:<30} {:>8} {:>10}\n", "SECTOR", "COUNT", "COMPARABLE"));
    output.push_str(&"-".repeat(50));
    output.push('\n');

    for s in sectors {
        output.push_str(&format!(
            "{:<30} {:>8} {:>10}\n",
            s.sector,
            s.count,
            if s.count >= min_peers { "✓" } else { "✗" }
        ));
    }

    let labelled: usize = sectors.iter().map(|s| s.count).sum();
    output.push('\n');
    output.push_str(&format!(
        "Total: {} sectors, {} tickers ({} without sector)",
        sectors.len(),
        universe.len(),
        universe.len() - labelled
    ));

    output
}
