//! PGHD - dashboard data core CLI
//!
//! Drives the import/query/chart pipeline outside the interactive shell:
//! import the remote folder once, list patients, dump metric rows, or emit
//! chart JSON for a patient and a set of enabled metrics.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;

use pghd_core::{
    build_charts, patient_ids, run_metric_query, CedarClient, DashboardConfig, Importer,
    MetricFamily, MetricToggles, PlotRequest, IMPORT_CACHE,
};

#[derive(Parser)]
#[command(name = "pghd")]
#[command(version)]
#[command(about = "PGHD dashboard data core", long_about = None)]
struct Cli {
    /// Dashboard configuration file
    #[arg(long, default_value = "dashboard.yaml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full import pass and print a summary
    Import,
    /// List the patient identifiers present in the imported graph
    Patients,
    /// Print the rows of one metric query for a patient
    Query {
        /// Metric family (blood-pressure, heart-rate, steps, activity, sleep)
        family: String,
        /// Patient identifier
        #[arg(long)]
        patient: i64,
    },
    /// Emit chart JSON for a patient and a set of enabled metrics
    Plot {
        /// Patient identifier
        #[arg(long)]
        patient: i64,
        /// Enabled sub-metrics (default: all). Comma separated:
        /// pulse,systolic,diastolic,heart-rate,activity,steps,sleep
        #[arg(long, value_delimiter = ',')]
        metrics: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = DashboardConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let credential = config.resolve_credential()?;
    let client = CedarClient::new(
        config.api.base_url.clone(),
        config.api.folder_id.clone(),
        credential,
    );
    let importer = Importer::new(client);

    match cli.command {
        Commands::Import => {
            IMPORT_CACHE.invalidate();
            let (graph, report) = IMPORT_CACHE.get_or_import(&importer)?;
            let report = report.expect("fresh import always yields a report");
            println!(
                "{} {} instances, {} patient records, {} triples",
                "imported".green().bold(),
                report.instances_merged,
                report.patients_merged,
                report.triples
            );
            println!("graph now holds {} triples", graph.len()?);
        }
        Commands::Patients => {
            let (graph, _) = IMPORT_CACHE.get_or_import(&importer)?;
            let ids = patient_ids(&graph)?;
            if ids.is_empty() {
                println!("{}", "no patients in graph".yellow());
            }
            for id in ids {
                println!("{id}");
            }
        }
        Commands::Query { family, patient } => {
            let family: MetricFamily = family.parse()?;
            let (graph, _) = IMPORT_CACHE.get_or_import(&importer)?;
            let rows = run_metric_query(&graph, family, patient)?;
            println!(
                "{} {} rows for patient {}",
                family.to_string().cyan(),
                rows.len(),
                patient
            );
            for row in rows {
                let values: Vec<String> = row
                    .values
                    .iter()
                    .map(|(name, value)| format!("{name}={value}"))
                    .collect();
                println!("{}  {}", row.date, values.join("  "));
            }
        }
        Commands::Plot { patient, metrics } => {
            let toggles = parse_toggles(&metrics)?;
            let (graph, _) = IMPORT_CACHE.get_or_import(&importer)?;
            let request = PlotRequest {
                patient_id: patient,
                toggles,
            };
            let charts = build_charts(&graph, &request)?;
            println!("{}", serde_json::to_string_pretty(&charts)?);
        }
    }

    Ok(())
}

fn parse_toggles(metrics: &[String]) -> anyhow::Result<MetricToggles> {
    if metrics.is_empty() {
        return Ok(MetricToggles::all());
    }
    let mut toggles = MetricToggles::default();
    for metric in metrics {
        match metric.as_str() {
            "pulse" => toggles.pulse = true,
            "systolic" => toggles.systolic = true,
            "diastolic" => toggles.diastolic = true,
            "heart-rate" => toggles.resting_heart_rate = true,
            "activity" => toggles.activity = true,
            "steps" => toggles.step_count = true,
            "sleep" => toggles.sleep = true,
            other => anyhow::bail!("unknown metric: {other}"),
        }
    }
    Ok(toggles)
}
