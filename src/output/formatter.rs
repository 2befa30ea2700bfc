use chrono::{Duration, Utc};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::analysis::{AnalysisOutcome, AnalysisReport, WeightStatus};
use crate::catalog::{Catalog, ParameterDefinition, ParameterKind};
use crate::params::ParameterStore;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, accounting for Unicode
pub fn truncate_text(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Render a parameter value with its unit ("500 m", "7/10").
pub fn format_value(def: &ParameterDefinition, value: i64) -> String {
    match def.kind {
        ParameterKind::Distance => format!("{} m", value),
        ParameterKind::Scale => format!("{}/{}", value, def.max),
    }
}

/// Percentage with two decimals, or "n/a" when the service didn't report one.
pub fn format_score(score: Option<f64>) -> String {
    match score {
        Some(s) => format!("{:.2}%", s),
        None => "n/a".to_string(),
    }
}

fn format_count(count: Option<u64>) -> String {
    count.map_or_else(|| "n/a".to_string(), |c| c.to_string())
}

/// Format a duration into a human-readable age string
/// "2h" for hours, "3d" for days, "1w" for weeks
pub fn format_age(duration: Duration) -> String {
    let hours = duration.num_hours();
    let days = duration.num_days();
    let weeks = days / 7;

    if weeks >= 1 {
        format!("{}w", weeks)
    } else if days >= 1 {
        format!("{}d", days)
    } else if hours >= 1 {
        format!("{}h", hours)
    } else {
        let minutes = duration.num_minutes();
        if minutes >= 1 {
            format!("{}m", minutes)
        } else {
            "now".to_string()
        }
    }
}

/// The catalog as reference: id, name, kind, bounds, defaults.
pub fn format_catalog(catalog: &Catalog, use_colors: bool) -> String {
    catalog
        .list()
        .iter()
        .map(|def| {
            let bounds = format!("{}..{} {}", def.min, def.max, def.unit);
            let defaults = format!(
                "default {} @ {}%",
                format_value(def, def.default_value),
                def.default_weight
            );
            let inverted = if def.inverted { " (lower is better)" } else { "" };
            if use_colors {
                format!(
                    "{:<20} {}\n  {}: {}  {}{}\n  {}",
                    def.id.cyan(),
                    def.name.bold(),
                    def.kind.value_label(),
                    bounds,
                    defaults.dimmed(),
                    inverted,
                    def.description.dimmed()
                )
            } else {
                format!(
                    "{:<20} {}\n  {}: {}  {}{}\n  {}",
                    def.id,
                    def.name,
                    def.kind.value_label(),
                    bounds,
                    defaults,
                    inverted,
                    def.description
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// One line per parameter: index, active marker, name, value, weight.
/// Inactive rows are dimmed when colors are on.
pub fn format_parameter_table(store: &ParameterStore, use_colors: bool) -> String {
    let term_width = get_terminal_width();
    let value_width = 10;
    let weight_width = 4;
    // " 1. [x] " + value + weight + separators
    let fixed_width = 8 + value_width + weight_width + 4;
    let name_width = match term_width {
        Some(width) if width > fixed_width + 10 => (width - fixed_width).min(32),
        Some(_) => 20,
        None => 32,
    };

    store
        .iter()
        .enumerate()
        .map(|(idx, (def, state))| {
            let index_str = format!("{:>2}.", idx + 1);
            let marker = if state.active { "[x]" } else { "[ ]" };
            let name = truncate_text(def.name, name_width);
            let value = format_value(def, state.value);
            let line = format!(
                "{} {} {:<name_w$}  {:>value_w$}  {:>weight_w$}",
                index_str,
                marker,
                name,
                value,
                format!("{}%", state.weight),
                name_w = name_width,
                value_w = value_width,
                weight_w = weight_width,
            );

            if !use_colors {
                line
            } else if state.active {
                line.bold().to_string()
            } else {
                line.dimmed().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// "Total weight: 85% (3 active) - Add more parameters ..." colored by status.
pub fn format_weight_summary(store: &ParameterStore, use_colors: bool) -> String {
    let status = WeightStatus::of(store);
    let total = format!("{}%", store.total_weight());
    let line_tail = format!("({} active) - {}", store.active_count(), status.message());

    if !use_colors {
        return format!("Total weight: {} {}", total, line_tail);
    }

    let total = match status {
        WeightStatus::Ready => total.green().bold().to_string(),
        WeightStatus::Over(_) => total.red().bold().to_string(),
        WeightStatus::Under(_) | WeightStatus::NoneActive => total.yellow().bold().to_string(),
    };
    format!("Total weight: {} {}", total, line_tail)
}

/// Multi-line summary of a finished analysis.
pub fn format_outcome(outcome: &AnalysisOutcome, catalog: &Catalog, use_colors: bool) -> String {
    let mut lines = Vec::new();
    let age = format_age(Utc::now() - outcome.completed_at);

    let heading = "Analysis Results";
    if use_colors {
        lines.push(format!("{} {}", heading.bold(), format!("({})", age).dimmed()));
    } else {
        lines.push(format!("{} ({})", heading, age));
    }

    if let Some(message) = &outcome.response.message {
        lines.push(format!("  {}", message));
    }

    let score = format_score(outcome.best_score());
    let coords = outcome
        .best_coordinate()
        .map_or_else(|| "n/a".to_string(), |c| c.to_string());
    if use_colors {
        lines.push(format!("  Best location:   {}", outcome.best_name().bold()));
        lines.push(format!("  Coordinates:     {}", coords.cyan()));
        lines.push(format!("  Suitability:     {}", score.green().bold()));
    } else {
        lines.push(format!("  Best location:   {}", outcome.best_name()));
        lines.push(format!("  Coordinates:     {}", coords));
        lines.push(format!("  Suitability:     {}", score));
    }
    lines.push(format!(
        "  Locations:       {} analyzed, {} suitable",
        format_count(outcome.total_locations()),
        format_count(outcome.suitable_locations())
    ));

    if let Some(summary) = &outcome.response.analysis_summary {
        lines.push(format!(
            "  Scores:          average {}, median {}",
            format_score(summary.average_score),
            format_score(summary.median_score)
        ));
    }

    lines.push(String::new());
    lines.push(format!("  Weights used ({}%):", outcome.total_weight));
    for (id, weight) in &outcome.weights {
        let name = catalog.get(id).map(|d| d.name).unwrap_or(id.as_str());
        lines.push(format!("    {:<28} {:>3}%", name, weight));
    }

    if !outcome.response.top_locations.is_empty() {
        lines.push(String::new());
        lines.push("  Top locations:".to_string());
        for (idx, loc) in outcome.response.top_locations.iter().enumerate() {
            let score = loc
                .suitability_score
                .map(|s| format!("{:.2}", s))
                .unwrap_or_else(|| "n/a".to_string());
            lines.push(format!(
                "    {:>2}. {:>7}  {}",
                idx + 1,
                score,
                truncate_text(&loc.label(), 48)
            ));
        }
    }

    lines.join("\n")
}

/// Narrative report as plain paragraphs and bullet lists.
pub fn format_report(report: &AnalysisReport, use_colors: bool) -> String {
    let mut lines = Vec::new();
    if use_colors {
        lines.push(report.title.bold().to_string());
        lines.push(report.report_id.dimmed().to_string());
    } else {
        lines.push(report.title.clone());
        lines.push(report.report_id.clone());
    }
    lines.push(String::new());
    lines.push(report.summary_text());

    let sections = [
        ("Key findings", &report.key_findings),
        ("Recommendations", &report.recommendations),
    ];
    for (title, items) in sections {
        if items.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(format!("{}:", title));
        for item in items {
            lines.push(format!("  - {}", item));
        }
    }

    if !report.methodology.is_empty() {
        lines.push(String::new());
        lines.push("Methodology:".to_string());
        for (key, value) in &report.methodology {
            let value = value
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string());
            lines.push(format!("  {}: {}", key.replace('_', " "), value));
        }
    }

    lines.join("\n")
}
