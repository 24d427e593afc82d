use anyhow::{anyhow, Context};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use milestone_checker::app::check_use_case::{process_records, CheckMilestonesUseCase};
use milestone_checker::app::ports::ReportOutputPort;
use milestone_checker::config::{load_motorways, Settings};
use milestone_checker::infra::overpass::parse_overpass_response;
use milestone_checker::infra::{JsonReportWriter, OverpassClient};
use milestone_checker::logging;
use milestone_checker::pipeline::MergeConfig;
use milestone_checker::types::{MotorwayReport, RunReport};

#[derive(Parser)]
#[command(name = "milestone_checker")]
#[command(about = "Checks motorway milestones on OpenStreetMap for gaps and doubles")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch milestones from Overpass and check every motorway
    Check {
        /// Motorway list (JSON)
        #[arg(long, default_value = "motorways.json")]
        motorways: PathBuf,
        /// Settings file (TOML)
        #[arg(long, default_value = "config.toml")]
        config: PathBuf,
        /// Report destination
        #[arg(long, default_value = "output.json")]
        output: PathBuf,
        /// Only check these motorways (comma-separated names)
        #[arg(long)]
        only: Option<String>,
        /// Indent the report
        #[arg(long)]
        pretty: bool,
    },
    /// Check one motorway against a saved Overpass response
    Offline {
        #[arg(long, default_value = "motorways.json")]
        motorways: PathBuf,
        /// Motorway name as listed in the motorway list
        #[arg(long)]
        name: String,
        /// Saved Overpass JSON response
        #[arg(long)]
        input: PathBuf,
        /// Report destination; printed to stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = milestone_checker::constants::DEFAULT_MERGE_DISTANCE_M)]
        merge_distance_m: f64,
    },
    /// Print the Overpass query used for a motorway
    Query {
        #[arg(long, default_value = "config.toml")]
        config: PathBuf,
        #[arg(long)]
        name: String,
    },
}

fn print_summary(report: &MotorwayReport) {
    let w = &report.warnings;
    println!("\n📊 {}:", report.name);
    println!("   Milestones: {} ({} suspicious)", w.milestones.len(), w.suspicious_count());
    println!("   Missing: {:?}", w.missing);
    println!("   Duplicated: {:?}", w.duplicated);
    println!("   Out of range: {:?}", w.out_of_range);
    println!("   Single: {:?}", w.single);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let _log_guard = logging::init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            motorways,
            config,
            output,
            only,
            pretty,
        } => {
            let settings = Settings::load(&config).context("loading settings")?;
            let mut motorways = load_motorways(&motorways).context("loading motorway list")?;
            if let Some(only) = only {
                let wanted: Vec<&str> = only.split(',').map(str::trim).collect();
                motorways.retain(|m| wanted.contains(&m.name.as_str()));
            }
            if motorways.is_empty() {
                return Err(anyhow!("no motorways selected"));
            }

            let source = Arc::new(OverpassClient::new(&settings)?);
            let writer = Arc::new(JsonReportWriter::new(&output).pretty(pretty));
            let use_case =
                CheckMilestonesUseCase::new(source, writer).with_merge_config(settings.merge_config());

            println!("🚀 Checking {} motorways...", motorways.len());
            let report = use_case.run(&motorways).await?;
            for motorway in &report.data {
                print_summary(motorway);
            }
            println!("\n💾 Report written to {}", output.display());
        }
        Commands::Offline {
            motorways,
            name,
            input,
            output,
            merge_distance_m,
        } => {
            let merge_config = MergeConfig::new(merge_distance_m).context("invalid --merge-distance-m")?;
            let motorway = load_motorways(&motorways)?
                .into_iter()
                .find(|m| m.name == name)
                .ok_or_else(|| anyhow!("motorway '{}' is not in {}", name, motorways.display()))?;
            let body = std::fs::read(&input).with_context(|| format!("reading {}", input.display()))?;
            let records = parse_overpass_response(&body)?;
            info!("Loaded {} milestones for {} from {}", records.len(), name, input.display());

            let motorway_report = process_records(&motorway, &records, &merge_config);
            print_summary(&motorway_report);

            let report = RunReport {
                date: Utc::now(),
                data: vec![motorway_report],
            };
            match output {
                Some(path) => {
                    let location = JsonReportWriter::new(path).pretty(true).write_report(&report).await?;
                    println!("\n💾 Report written to {}", location);
                }
                None => println!("{}", serde_json::to_string_pretty(&report)?),
            }
        }
        Commands::Query { config, name } => {
            let settings = Settings::load(&config)?;
            let client = OverpassClient::new(&settings)?;
            println!("{}", client.query_for(&name));
        }
    }

    Ok(())
}
