pub mod formatter;

pub use formatter::{
    format_age, format_catalog, format_outcome, format_parameter_table, format_report,
    format_score, format_value, format_weight_summary, should_use_colors, truncate_text,
};
