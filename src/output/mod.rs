pub mod formatter;

pub use formatter::{
    format_breakdown, format_prediction_row, format_prediction_table, format_report,
    format_score, format_tier, format_tsv, should_use_colors, ScoredSubject,
};
