use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use churn_risk::config::Settings;
use churn_risk::predict::ScoringRequest;
use churn_risk::scoring::{RiskTier, ScoringConfig};
use churn_risk::{ConfigUpdateError, Outcome};

const EXIT_SUCCESS: i32 = 0;
const EXIT_INPUT: i32 = 2;
const EXIT_CONFIG: i32 = 4;
const EXIT_STALE: i32 = 5;
const EXIT_STATE: i32 = 6;

fn parse_tier(s: &str) -> Result<RiskTier, String> {
    s.parse::<RiskTier>().map_err(|e| e.to_string())
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write default settings and a default scoring config
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
    /// Check a draft scoring config and report every violation
    Validate {
        /// Draft scoring config (JSON)
        draft: PathBuf,
    },
    /// Validate a draft and make it the active scoring config
    Activate {
        /// Draft scoring config (JSON); its version must match the active one
        draft: PathBuf,
    },
    /// Score subjects against the active config
    Score {
        /// JSON array of {subjectId, features, observationCount}
        requests: PathBuf,
        /// Append the resulting predictions to the ledger
        #[arg(long)]
        record: bool,
        /// Show the per-factor breakdown under each subject
        #[arg(long)]
        explain: bool,
        /// Tab-separated output for scripting
        #[arg(long, conflicts_with = "explain")]
        tsv: bool,
    },
    /// Record an observed outcome for a subject
    Outcome {
        subject: String,
        /// The subject churned
        #[arg(long, conflicts_with = "retained", required_unless_present = "retained")]
        churned: bool,
        /// The subject was retained
        #[arg(long)]
        retained: bool,
        /// Observation time (RFC 3339); defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Evaluate recorded predictions against recorded outcomes
    Evaluate {
        /// Lowest tier counted as a churn prediction (overrides settings)
        #[arg(long, value_parser = parse_tier)]
        positive_tier: Option<RiskTier>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "churn-risk")]
#[command(about = "Churn risk scoring and prediction evaluation", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to settings file (defaults to ~/.config/churn-risk/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn fail(code: i32, message: String) -> ! {
    eprintln!("{}", message);
    std::process::exit(code);
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(file).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn resolve_paths(settings: &Settings, settings_path: Option<&Path>) -> Result<(PathBuf, PathBuf)> {
    Ok((
        settings.resolved_scoring_config_path(settings_path)?,
        settings.resolved_ledger_path(settings_path)?,
    ))
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = churn_risk::logging::init(cli.verbose) {
        eprintln!("Warning: {}", e);
    }

    if let Commands::Init { force } = cli.command {
        match churn_risk::config::run_init(cli.config.clone(), force) {
            Ok(summary) => {
                println!("Settings written to {}", summary.settings_path.display());
                println!(
                    "Scoring config written to {}",
                    summary.scoring_config_path.display()
                );
                std::process::exit(EXIT_SUCCESS);
            }
            Err(e) => fail(EXIT_STATE, format!("Init failed: {:#}", e)),
        }
    }

    let settings = match churn_risk::config::load_settings(cli.config.clone()) {
        Ok(s) => s,
        Err(e) => fail(EXIT_CONFIG, format!("Config error: {:#}", e)),
    };

    if let Some(threads) = settings.threads {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
        {
            eprintln!("Warning: could not size worker pool: {}", e);
        }
    }

    let (scoring_path, ledger_path) = match resolve_paths(&settings, cli.config.as_deref()) {
        Ok(p) => p,
        Err(e) => fail(EXIT_CONFIG, format!("Config error: {:#}", e)),
    };

    let code = match cli.command {
        Commands::Init { .. } => EXIT_SUCCESS,
        Commands::Validate { draft } => run_validate(&draft),
        Commands::Activate { draft } => run_activate(&draft, &scoring_path),
        Commands::Score {
            requests,
            record,
            explain,
            tsv,
        } => run_score(
            &requests,
            &scoring_path,
            &ledger_path,
            record,
            explain,
            tsv,
            cli.verbose,
        ),
        Commands::Outcome {
            subject,
            churned,
            retained: _,
            at,
        } => run_outcome(&ledger_path, subject, churned, at),
        Commands::Evaluate {
            positive_tier,
            json,
        } => run_evaluate(&settings, &ledger_path, positive_tier, json),
    };

    std::process::exit(code);
}

fn run_validate(draft_path: &Path) -> i32 {
    let draft: ScoringConfig = match read_json(draft_path) {
        Ok(d) => d,
        Err(e) => fail(EXIT_INPUT, format!("{:#}", e)),
    };

    match churn_risk::scoring::validate_config(draft) {
        Ok(active) => {
            println!(
                "Valid: {} factors ({} enabled), version {}",
                active.registry().len(),
                active.registry().active_factors().len(),
                active.version
            );
            EXIT_SUCCESS
        }
        Err(errors) => {
            eprintln!("Scoring config errors:");
            for error in errors.iter() {
                eprintln!("  - {}", error);
            }
            EXIT_CONFIG
        }
    }
}

fn run_activate(draft_path: &Path, scoring_path: &Path) -> i32 {
    let draft: ScoringConfig = match read_json(draft_path) {
        Ok(d) => d,
        Err(e) => fail(EXIT_INPUT, format!("{:#}", e)),
    };

    match churn_risk::store::activate_file(scoring_path, draft) {
        Ok(active) => {
            println!(
                "Activated scoring config version {} at {}",
                active.version,
                scoring_path.display()
            );
            EXIT_SUCCESS
        }
        Err(e) => match e.downcast_ref::<ConfigUpdateError>() {
            Some(ConfigUpdateError::StaleConfigVersion { .. }) => {
                eprintln!("{}. Re-read the active config and retry.", e);
                EXIT_STALE
            }
            Some(ConfigUpdateError::Invalid(errors)) => {
                eprintln!("Scoring config errors:");
                for error in errors.iter() {
                    eprintln!("  - {}", error);
                }
                EXIT_CONFIG
            }
            _ => {
                eprintln!("Activation failed: {:#}", e);
                EXIT_STATE
            }
        },
    }
}

fn run_score(
    requests_path: &Path,
    scoring_path: &Path,
    ledger_path: &Path,
    record: bool,
    explain: bool,
    tsv: bool,
    verbose: bool,
) -> i32 {
    let start_time = Instant::now();

    let active = match churn_risk::store::load_active_config(scoring_path) {
        Ok(a) => a,
        Err(e) => fail(EXIT_CONFIG, format!("Config error: {:#}", e)),
    };
    let requests: Vec<ScoringRequest> = match read_json(requests_path) {
        Ok(r) => r,
        Err(e) => fail(EXIT_INPUT, format!("{:#}", e)),
    };

    let results = churn_risk::predict::predict_batch(&requests, &active, Utc::now());

    let rows: Vec<churn_risk::output::ScoredSubject> = results
        .iter()
        .map(|(subject_id, result)| churn_risk::output::ScoredSubject {
            subject_id,
            result,
        })
        .collect();

    if tsv {
        println!("{}", churn_risk::output::format_tsv(&rows));
    } else {
        let use_colors = churn_risk::output::should_use_colors();
        if explain {
            for (idx, row) in rows.iter().enumerate() {
                println!(
                    "{}",
                    churn_risk::output::format_prediction_row(idx + 1, row, use_colors)
                );
                if let Ok(explained) = row.result {
                    println!(
                        "{}",
                        churn_risk::output::format_breakdown(&explained.breakdown, use_colors)
                    );
                }
            }
        } else {
            println!(
                "{}",
                churn_risk::output::format_prediction_table(&rows, use_colors)
            );
        }
    }

    if record {
        let predictions: Vec<_> = results
            .into_iter()
            .filter_map(|(_, result)| result.ok().map(|explained| explained.prediction))
            .collect();
        let recorded = predictions.len();
        let appended = churn_risk::store::append_to_ledger(ledger_path, |ledger| {
            for prediction in predictions {
                ledger.record_prediction(prediction);
            }
        });
        if let Err(e) = appended {
            fail(EXIT_STATE, format!("Ledger error: {:#}", e));
        }
        eprintln!("Recorded {} predictions to {}", recorded, ledger_path.display());
    }

    if verbose {
        eprintln!(
            "Scored {} subjects against config version {} in {:?}",
            requests.len(),
            active.version,
            start_time.elapsed()
        );
    }

    EXIT_SUCCESS
}

fn run_outcome(
    ledger_path: &Path,
    subject_id: String,
    churned: bool,
    at: Option<DateTime<Utc>>,
) -> i32 {
    let outcome = Outcome {
        subject_id,
        churned,
        observed_at: at.unwrap_or_else(Utc::now),
    };
    let summary = format!(
        "Recorded outcome for {}: {}",
        outcome.subject_id,
        if outcome.churned { "churned" } else { "retained" }
    );

    if let Err(e) =
        churn_risk::store::append_to_ledger(ledger_path, |ledger| ledger.record_outcome(outcome))
    {
        fail(EXIT_STATE, format!("Ledger error: {:#}", e));
    }
    println!("{}", summary);
    EXIT_SUCCESS
}

fn run_evaluate(
    settings: &Settings,
    ledger_path: &Path,
    positive_tier: Option<RiskTier>,
    json: bool,
) -> i32 {
    let ledger = match churn_risk::store::load_ledger(ledger_path) {
        Ok(l) => l,
        Err(e) => fail(EXIT_STATE, format!("Ledger error: {:#}", e)),
    };

    let report = churn_risk::evaluation::evaluate_records(
        ledger.predictions(),
        ledger.outcomes(),
        positive_tier.unwrap_or(settings.positive_tier),
        Utc::now(),
    );

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(s) => println!("{}", s),
            Err(e) => fail(EXIT_STATE, format!("Failed to serialize report: {}", e)),
        }
    } else {
        let use_colors = churn_risk::output::should_use_colors();
        println!("{}", churn_risk::output::format_report(&report, use_colors));
    }
    EXIT_SUCCESS
}
