//! 단일 종목 분석 명령.

use std::path::PathBuf;

use anyhow::{Context, Result};
use kquant_analytics::{AnalysisReport, Population, QuantAnalyzer};
use tracing::info;

use super::input::{load_config, load_input, load_universe};

/// 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            _ => Err(anyhow::anyhow!("Invalid format: {}. Use: table, json", s)),
        }
    }
}

/// 분석 명령 설정.
#[derive(Debug)]
pub struct AnalyzeConfig {
    /// 분석 입력 파일 (재무제표 + 시장 스냅샷)
    pub input: PathBuf,
    /// 유니버스 파일
    pub universe: PathBuf,
    /// 스코어링 설정 파일
    pub config: Option<PathBuf>,
    /// 출력 형식
    pub format: OutputFormat,
    /// 동일 업종 채점 여부
    pub sector_view: bool,
}

/// 분석 실행 후 보고서를 stdout에 출력합니다.
pub fn analyze(config: AnalyzeConfig) -> Result<AnalysisReport> {
    let scoring = load_config(config.config.as_deref())?;
    let universe = load_universe(&config.universe)?;
    let input = load_input(&config.input)?;

    let report = QuantAnalyzer::new(scoring)
        .with_sector_view(config.sector_view)
        .analyze(&input, &universe)
        .with_context(|| format!("Analysis failed for {}", input.ticker))?;

    info!(ticker = %report.ticker, final_score = report.final_score, "Report ready");

    let content = match config.format {
        OutputFormat::Table => format_table(&report),
        OutputFormat::Json => report.to_json_pretty().context("Failed to serialize report")?,
    };
    println!("{}", content);

    Ok(report)
}

/// 사람이 읽는 보고서 형식.
pub fn format_table(report: &AnalysisReport) -> String {
    let mut output = String::new();

    let name = report.corp_name.as_deref().unwrap_or("-");
    output.push_str(&format!(
        "{} ({}) - {}년 기준\n",
        name, report.ticker, report.latest_year
    ));
    output.push_str(&format!(
        "종합 재무 건전성 점수: {:.1} / 100\n",
        report.final_score
    ));
    output.push_str(&format!("{}\n\n", report.summary));

    // 카테고리별 점수
    let sector_header = match report.sector_population {
        Population::Sector => "동일업종",
        Population::Market => "동일업종*",
    };
    output.push_str(&format!(
        "{:<10} {:>8} {:>10} {:>6} {:>8}  {}\n",
        "카테고리", "시장전체", sector_header, "배점", "기여", "설명"
    ));
    output.push_str(&"-".repeat(80));
    output.push('\n');
    for row in &report.breakdown {
        let sector = row
            .sector_score
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        output.push_str(&format!(
            "{:<10} {:>8} {:>10} {:>6.0} {:>8}  {}\n",
            row.category.label(),
            row.market_score.to_string(),
            sector,
            row.weight,
            row.contribution.to_string(),
            row.description
        ));
    }
    if report.sector_population == Population::Market && report.sector_scores.is_some() {
        output.push_str("* 업종 비교 대상이 부족해 시장 전체 기준으로 계산했습니다.\n");
    }

    // 정합성
    if let Some(consistency) = &report.consistency {
        output.push('\n');
        output.push_str(&format!(
            "데이터 정합성: {} (최대 차이율 {:.2}%)\n",
            consistency.grade, consistency.max_diff_pct
        ));
        for c in &consistency.comparisons {
            output.push_str(&format!(
                "  {}: 기준={:.2}, 계산={:.2}, 차이율={:.2}%\n",
                c.metric, c.reference, c.calculated, c.diff_pct
            ));
        }
    }

    // 주가
    if let Some(price) = &report.price {
        output.push('\n');
        output.push_str(&format!(
            "최근 1년 주가: {} ~ {} ({}일)\n",
            price.start_date, price.end_date, price.observations
        ));
        output.push_str(&format!(
            "  시작 {} / 종료 {} / 최고 {} / 최저 {} / 수익률 {}\n",
            price.first_close,
            price.last_close,
            price.high,
            price.low,
            price
                .trailing_return
                .map(|r| format!("{}%", r))
                .unwrap_or_else(|| "-".to_string())
        ));
    }

    // 수집 현황
    let key_missing: Vec<String> = report
        .data_quality
        .missing_key_income()
        .map(|m| format!("{}년 {}", m.year, m.account))
        .collect();
    output.push('\n');
    if key_missing.is_empty() {
        output.push_str("모든 필수 데이터가 정상적으로 수집되었습니다.\n");
    } else {
        output.push_str(&format!("누락된 데이터: {}\n", key_missing.join(", ")));
    }

    // 해설
    output.push('\n');
    for (category, text) in &report.explanations {
        output.push_str(&format!("[{}]\n{}\n\n", category, text));
    }

    output.push_str("종합 평가\n");
    output.push_str(&report.comment);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use kquant_analytics::AnalysisInput;
    use kquant_core::UniverseTable;

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("TABLE").unwrap(), OutputFormat::Table);
        assert_eq!(OutputFormat::parse("json").unwrap(), OutputFormat::Json);
        assert!(OutputFormat::parse("csv").is_err());
    }

    #[test]
    fn test_format_table_contains_sections() {
        let input: AnalysisInput = serde_json::from_str(
            r#"{
                "ticker": "A",
                "statements": [
                    {"year": 2023, "revenue": 100, "net_income": 10, "total_equity": 200},
                    {"year": 2024, "revenue": 150, "net_income": 20, "total_equity": 200}
                ],
                "market": {"market_cap": "300", "shares_outstanding": 10}
            }"#,
        )
        .unwrap();
        let report = QuantAnalyzer::default()
            .analyze(&input, &UniverseTable::new())
            .unwrap();

        let table = format_table(&report);
        assert!(table.starts_with("- (A) - 2024년 기준\n"));
        assert!(table.contains("카테고리"));
        assert!(table.contains(&format!("{}\n", "-".repeat(80))));
        assert!(table.contains("[가치]\n"));
        assert!(table.contains("시장 전체 백분위 기반 상대평가 점수"));
        assert!(table.contains("성장잠재력"));
        assert!(table.contains("누락된 데이터: 2023년 영업이익"));
        assert!(table.ends_with("신중한 판단이 필요합니다."));
    }
}
