//! Batch health metrics reporter.
//!
//! Loads a patient measurement CSV and writes a report to stdout or a file.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use health_metrics_core::{load_csv, ReportFormat, ReportGenerator};

#[derive(Debug, Parser)]
#[command(name = "health-metrics", version, about = "Derive and classify patient health metrics")]
struct Cli {
    /// Measurement CSV file
    input: PathBuf,

    /// Report format: text, markdown, json or csv
    #[arg(short, long, default_value_t = ReportFormat::Text)]
    format: ReportFormat,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only report these patients (repeatable)
    #[arg(short, long = "patient", value_name = "ID")]
    patients: Vec<String>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<String> {
    let db = load_csv(&cli.input)
        .with_context(|| format!("Failed to load {}", cli.input.display()))?;

    let generator = ReportGenerator::new(&db);
    let report = if cli.patients.is_empty() {
        generator.generate_all()
    } else {
        generator
            .generate_for(&cli.patients)
            .context("Failed to select patients")?
    };

    for patient in report.incomplete() {
        for message in &patient.skipped {
            warn!("{}", message);
        }
    }

    report
        .render(cli.format)
        .context("Failed to render report")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let rendered = run(&cli)?;

    match &cli.output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "Report written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .context("Failed to write report")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MEASUREMENTS: &str = "\
PatientID,Height_cm,Weight_kg,Waist_cm,Systolic_BP,Diastolic_BP
1001,170,65,75,118,76
1002,160,45,,125,75
";

    fn input(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("measurements.csv");
        fs::write(&path, MEASUREMENTS).unwrap();
        path
    }

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["health-metrics", "data.csv"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("data.csv"));
        assert_eq!(cli.format, ReportFormat::Text);
        assert!(cli.output.is_none());
        assert!(cli.patients.is_empty());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_parse_options() {
        let cli = Cli::try_parse_from([
            "health-metrics",
            "data.csv",
            "--format",
            "csv",
            "--patient",
            "1001",
            "--patient",
            "1002",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.format, ReportFormat::Csv);

        let cli = Cli::try_parse_from(["health-metrics", "data.csv", "-f", "md"]).unwrap();
        assert_eq!(cli.format, ReportFormat::Markdown);
        assert_eq!(cli.patients, vec!["1001", "1002"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_parse_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["health-metrics", "data.csv", "--format", "xml"]).is_err());
    }

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(0), "warn");
        assert_eq!(default_level(1), "info");
        assert_eq!(default_level(5), "trace");
    }

    #[test]
    fn test_run_json() {
        let dir = TempDir::new().unwrap();
        let path = input(&dir);
        let cli = Cli::try_parse_from([
            "health-metrics",
            path.to_str().unwrap(),
            "--format",
            "json",
        ])
        .unwrap();

        let rendered = run(&cli).unwrap();
        assert!(rendered.contains("\"patient_count\": 2"));
    }

    #[test]
    fn test_run_selected_patient() {
        let dir = TempDir::new().unwrap();
        let cli = Cli {
            input: input(&dir),
            format: ReportFormat::Csv,
            output: None,
            patients: vec!["1002".to_string()],
            verbose: 0,
        };

        let rendered = run(&cli).unwrap();
        assert_eq!(rendered.lines().count(), 2);
        assert!(rendered.lines().nth(1).unwrap().starts_with("1002,"));
    }

    #[test]
    fn test_run_unknown_patient_fails() {
        let dir = TempDir::new().unwrap();
        let cli = Cli {
            input: input(&dir),
            format: ReportFormat::Text,
            output: None,
            patients: vec!["9999".to_string()],
            verbose: 0,
        };

        assert!(run(&cli).is_err());
    }

    #[test]
    fn test_run_missing_input_fails() {
        let dir = TempDir::new().unwrap();
        let cli = Cli {
            input: dir.path().join("absent.csv"),
            format: ReportFormat::Text,
            output: None,
            patients: Vec::new(),
            verbose: 0,
        };

        let error = run(&cli).unwrap_err();
        assert!(error.to_string().starts_with("Failed to load"));
    }
}
