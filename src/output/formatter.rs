use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::error::ScoringError;
use crate::evaluation::EvaluationReport;
use crate::predict::ExplainedPrediction;
use crate::scoring::{RiskTier, ScoreBreakdown};

/// A subject with the result of its scoring call, for display
pub struct ScoredSubject<'a> {
    pub subject_id: &'a str,
    pub result: &'a Result<ExplainedPrediction, ScoringError>,
}

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a score with three decimals ("0.560")
pub fn format_score(score: f64) -> String {
    format!("{:.3}", score)
}

/// Tier name padded to a fixed column, colored by severity
pub fn format_tier(tier: RiskTier, use_colors: bool) -> String {
    let padded = format!("{:<8}", tier.as_str());
    if !use_colors {
        return padded;
    }
    match tier {
        RiskTier::None => padded.dimmed().to_string(),
        RiskTier::Low => padded.green().to_string(),
        RiskTier::Medium => padded.yellow().to_string(),
        RiskTier::High => padded.red().to_string(),
        RiskTier::Critical => padded.red().bold().to_string(),
    }
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate to fit available width, accounting for Unicode
fn truncate(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

fn skip_reason(error: &ScoringError) -> String {
    match error {
        ScoringError::NoActiveFactors => "skipped: no usable factor values".to_string(),
        ScoringError::InsufficientDataPoints { observed, required } => {
            format!("skipped: {}/{} data points", observed, required)
        }
    }
}

const ROW_FIXED_WIDTH: usize = 4 + 5 + 2 + 8 + 2; // "99. " + score + gap + tier + gap

fn subject_width() -> Option<usize> {
    get_terminal_width().map(|w| {
        if w > ROW_FIXED_WIDTH + 10 {
            w - ROW_FIXED_WIDTH
        } else {
            20
        }
    })
}

fn format_row(index: usize, row: &ScoredSubject, width: Option<usize>, use_colors: bool) -> String {
    let index_str = format!("{:>2}.", index);
    let subject = match width {
        Some(width) => truncate(row.subject_id, width),
        None => row.subject_id.to_string(),
    };

    match row.result {
        Ok(explained) => {
            let prediction = &explained.prediction;
            let score = format_score(prediction.score);
            if use_colors {
                format!(
                    "{} {}  {}  {}",
                    index_str.dimmed(),
                    score.bold(),
                    format_tier(prediction.tier, true),
                    subject
                )
            } else {
                format!(
                    "{} {}  {}  {}",
                    index_str,
                    score,
                    format_tier(prediction.tier, false),
                    subject
                )
            }
        }
        Err(e) => {
            let reason = skip_reason(e);
            if use_colors {
                format!("{} {}  {}", index_str.dimmed(), subject, reason.dimmed())
            } else {
                format!("{} {}  {}", index_str, subject, reason)
            }
        }
    }
}

/// Format a single result line with a 1-based index
pub fn format_prediction_row(index: usize, row: &ScoredSubject, use_colors: bool) -> String {
    format_row(index, row, subject_width(), use_colors)
}

/// Format scoring results as a table: Index, Score, Tier, Subject
/// Subjects that could not be scored show the reason instead of score/tier.
pub fn format_prediction_table(rows: &[ScoredSubject], use_colors: bool) -> String {
    if rows.is_empty() {
        return "No subjects to score.".to_string();
    }

    let width = subject_width();
    rows.iter()
        .enumerate()
        .map(|(idx, row)| format_row(idx + 1, row, width, use_colors))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format scoring results as tab-separated values for scripting
/// Columns: subject, score, tier (no headers, no colors); skipped subjects
/// carry "-" for score and the error for tier.
pub fn format_tsv(rows: &[ScoredSubject]) -> String {
    rows.iter()
        .map(|row| match row.result {
            Ok(explained) => format!(
                "{}\t{}\t{}",
                row.subject_id,
                format_score(explained.prediction.score),
                explained.prediction.tier
            ),
            Err(e) => format!("{}\t-\t{}", row.subject_id, e),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Per-factor explanation of a score, one line per contributing factor
pub fn format_breakdown(breakdown: &ScoreBreakdown, use_colors: bool) -> String {
    let mut lines: Vec<String> = breakdown
        .factors
        .iter()
        .map(|c| {
            let line = format!(
                "    {:<24} w={:.2} v={:.2} -> {:+.3}",
                truncate(&c.label, 24),
                c.weight,
                c.value,
                c.share
            );
            if use_colors {
                line.dimmed().to_string()
            } else {
                line
            }
        })
        .collect();

    if !breakdown.skipped.is_empty() {
        lines.push(format!("    missing: {}", breakdown.skipped.join(", ")));
    }
    lines.join("\n")
}

fn percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

/// Confusion matrix and derived metrics for an evaluation run
pub fn format_report(report: &EvaluationReport, use_colors: bool) -> String {
    let s = &report.snapshot;
    let header = format!(
        "Evaluated {} predictions (positive tier: {} and above, {} pending)",
        s.total(),
        report.positive_tier,
        report.pending
    );
    let matrix = format!(
        "  TP {:>6}   FP {:>6}\n  FN {:>6}   TN {:>6}",
        s.true_positives, s.false_positives, s.false_negatives, s.true_negatives
    );
    let metrics = format!(
        "  accuracy {}  precision {}  recall {}  f1 {:.3}",
        percent(s.accuracy),
        percent(s.precision),
        percent(s.recall),
        s.f1
    );

    if use_colors {
        format!("{}\n{}\n{}", header.bold(), matrix, metrics.cyan())
    } else {
        format!("{}\n{}\n{}", header, matrix, metrics)
    }
}
