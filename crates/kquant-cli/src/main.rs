//! K-Quant 분석 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 삼성전자 분석 (표 형식)
//! kquant analyze -i data/005930.json -u data/universe.json
//!
//! # 사용자 설정 + JSON 출력, 업종 비교 생략
//! kquant analyze -i data/005930.json -u data/universe.json -c config/scoring.toml --format json --no-sector
//!
//! # 유니버스 업종 목록
//! kquant sectors -u data/universe.json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kquant_core::{init_logging, LogConfig, LogFormat, ScoringConfig};
use tracing::{error, info};

use kquant_cli::commands::analyze::{analyze, AnalyzeConfig, OutputFormat};
use kquant_cli::commands::sectors::list_sectors;

#[derive(Parser)]
#[command(name = "kquant")]
#[command(about = "K-Quant analyzer - 상장기업 재무 건전성 상대평가", long_about = None)]
#[command(version)]
struct Cli {
    /// 로그 레벨 (RUST_LOG가 설정되어 있으면 무시)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// 로그 형식 (pretty, json, compact)
    #[arg(long, global = true, default_value = "compact")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 단일 종목 분석
    Analyze {
        /// 분석 입력 파일 (재무제표 + 시장 스냅샷, JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// 유니버스 파일 (JSON 배열)
        #[arg(short, long)]
        universe: PathBuf,

        /// 스코어링 설정 파일 (기본: config/scoring.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// 출력 형식 (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,

        /// 동일 업종 점수 계산 생략
        #[arg(long, default_value = "false")]
        no_sector: bool,
    },

    /// 유니버스 업종 목록 보기
    Sectors {
        /// 유니버스 파일 (JSON 배열)
        #[arg(short, long)]
        universe: PathBuf,

        /// 출력 형식 (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },
}

fn main() -> Result<()> {
    // .env 파일이 없어도 무시
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_format: LogFormat = cli
        .log_format
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    init_logging(LogConfig::new(cli.log_level.clone()).with_format(log_format))
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    match cli.command {
        Commands::Analyze {
            input,
            universe,
            config,
            format,
            no_sector,
        } => {
            let config = AnalyzeConfig {
                input,
                universe,
                config,
                format: OutputFormat::parse(&format)?,
                sector_view: !no_sector,
            };

            match analyze(config) {
                Ok(report) => {
                    info!(ticker = %report.ticker, "✅ Analysis finished");
                }
                Err(e) => {
                    error!("Analysis failed: {:#}", e);
                    return Err(e);
                }
            }
        }

        Commands::Sectors { universe, format } => {
            let format = OutputFormat::parse(&format)?;
            let min_peers = ScoringConfig::load_default()
                .context("Failed to load default scoring config")?
                .sector_min_peers;

            let count = list_sectors(&universe, format, min_peers)?;
            info!("✅ Listed {} sectors", count);
        }
    }

    Ok(())
}
