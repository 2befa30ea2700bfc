use ratatui::prelude::*;
use ratatui::widgets::{Block, Cell, Clear, Gauge, Paragraph, Row, Table, Wrap};

use crate::analysis::{AnalysisOutcome, WeightStatus};
use crate::catalog::{MAX_WEIGHT, REQUIRED_TOTAL_WEIGHT};
use crate::output::{format_score, format_value, truncate_text};
use crate::tui::app::{App, InputMode};
use crate::tui::theme::ThemeColors;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Handle very small terminal sizes gracefully
    if area.height < 10 || area.width < 40 {
        let msg = Paragraph::new("Terminal too small").alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    // Layout: Title(1) + Table(fill) + Detail(2) + Gauge(3) + Status(1)
    let chunks = Layout::vertical([
        Constraint::Length(1), // Title bar
        Constraint::Fill(1),   // Parameter table
        Constraint::Length(2), // Selected parameter detail
        Constraint::Length(3), // Weight total
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    render_title(frame, chunks[0], app);
    render_table(frame, chunks[1], app);
    render_detail(frame, chunks[2], app);
    render_weight_gauge(frame, chunks[3], app);
    render_status_bar(frame, chunks[4], app);

    // Render overlays based on input mode
    match app.input_mode {
        InputMode::Help => render_help_popup(frame, &app.theme),
        InputMode::Results => {
            if let Some(outcome) = app.result() {
                render_results_popup(frame, outcome, app);
            }
        }
        InputMode::Normal => {}
    }

    // Analyzing overlay appears on top of everything
    if app.is_analyzing() {
        render_analyzing_overlay(frame, app);
    }
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let left = "Monasib - Restaurant Site Selection";
    let mut spans = vec![Span::styled(left, Style::default().fg(theme.title_color).bold())];

    let right = app.client.base_url().to_string();
    let padding_len = (area.width as usize).saturating_sub(left.len() + right.len());
    spans.push(Span::raw(" ".repeat(padding_len)));
    spans.push(Span::styled(right, Style::default().fg(theme.muted)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_table(frame: &mut Frame, area: Rect, app: &mut App) {
    let theme = &app.theme;

    let rows: Vec<Row> = app
        .store
        .iter()
        .enumerate()
        .map(|(idx, (def, state))| {
            let marker = if state.active {
                Span::styled("[x]", Style::default().fg(theme.active_marker).bold())
            } else {
                Span::styled("[ ]", Style::default().fg(theme.muted))
            };

            let mut weight_spans = vec![Span::raw(format!("{:>3}% ", state.weight))];
            weight_spans.extend(weight_bar(state.weight, 10, theme).spans);

            // Inactive rows are dimmed but still editable
            let fg = if state.active {
                Style::default()
            } else {
                Style::default().fg(theme.inactive_fg)
            };
            let row_style = if idx % 2 == 1 {
                fg.bg(theme.row_alt_bg)
            } else {
                fg
            };

            Row::new(vec![
                Cell::from(format!("{}.", idx + 1)).style(Style::default().fg(theme.index_color)),
                Cell::from(Line::from(marker)),
                Cell::from(def.name),
                Cell::from(format_value(def, state.value)),
                Cell::from(Line::from(weight_spans)),
            ])
            .style(row_style)
        })
        .collect();

    let widths = [
        Constraint::Length(4),  // Index: "10."
        Constraint::Length(4),  // Active marker
        Constraint::Fill(1),    // Name
        Constraint::Length(10), // Value: "2000 m"
        Constraint::Length(16), // Weight + bar: " 15% █████░░░░░"
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["#", "On", "Parameter", "Value", "Weight"])
                .style(theme.header_style)
                .bottom_margin(1),
        )
        .row_highlight_style(theme.row_selected);

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_detail(frame: &mut Frame, area: Rect, app: &App) {
    let Some((def, state)) = app.selected() else {
        return;
    };
    let theme = &app.theme;

    let mut heading = vec![
        Span::styled(def.kind.value_label(), Style::default().fg(theme.title_color)),
        Span::raw(format!(
            ": {} (range {} - {})",
            format_value(def, state.value),
            format_value(def, def.min),
            format_value(def, def.max)
        )),
    ];
    if def.inverted {
        heading.push(Span::styled(
            "  lower is better",
            Style::default().fg(theme.muted).italic(),
        ));
    }

    let lines = vec![
        Line::from(heading),
        Line::from(Span::styled(def.description, Style::default().fg(theme.muted))),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_weight_gauge(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let status = WeightStatus::of(&app.store);
    let total = app.store.total_weight();
    let color = theme.weight_color(status);

    let ratio = (f64::from(total) / f64::from(REQUIRED_TOTAL_WEIGHT)).min(1.0);
    let label = format!(
        "{}% of {}% ({} active) - {}",
        total,
        REQUIRED_TOTAL_WEIGHT,
        app.store.active_count(),
        status.message()
    );

    let gauge = Gauge::default()
        .block(Block::bordered().title(" Total Weight "))
        .gauge_style(Style::default().fg(color).bg(theme.bar_empty))
        .ratio(ratio)
        .label(Span::styled(label, Style::default().bold()));

    frame.render_widget(gauge, area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;

    let text = if let Some(flash) = &app.flash_message {
        let color = if flash.is_error {
            theme.flash_error
        } else {
            theme.flash_success
        };
        Line::from(Span::styled(flash.text.clone(), Style::default().fg(color)))
    } else {
        let hints: &[(&str, &str)] = match app.input_mode {
            InputMode::Results => &[
                ("g", ":geojson "),
                ("s", ":shapefile "),
                ("o", ":map "),
                ("Esc", ":dismiss"),
            ],
            _ => &[
                ("j/k", ":nav "),
                ("Space", ":toggle "),
                ("h/l", ":value "),
                ("-/+", ":weight "),
                ("Enter", ":analyze "),
                ("w", ":save "),
                ("?", ":help "),
                ("q", ":quit"),
            ],
        };

        let mut spans = Vec::new();
        for (i, (key, label)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(*key, Style::default().fg(theme.status_key_color)));
            spans.push(Span::raw(*label));
        }
        Line::from(spans)
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().bg(theme.status_bar_bg)),
        area,
    );
}

fn weight_bar(weight: u32, width: usize, theme: &ThemeColors) -> Line<'static> {
    let ratio = (f64::from(weight) / f64::from(MAX_WEIGHT)).min(1.0);
    let filled = (ratio * width as f64).round() as usize;
    let empty = width.saturating_sub(filled);

    let mut spans = Vec::new();
    if filled > 0 {
        spans.push(Span::styled(
            "█".repeat(filled),
            Style::default().fg(theme.bar_filled),
        ));
    }
    if empty > 0 {
        spans.push(Span::styled(
            "░".repeat(empty),
            Style::default().fg(theme.bar_empty),
        ));
    }

    Line::from(spans)
}

/// Create a centered rectangle with fixed width and height
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    // Clamp dimensions to area bounds
    let width = width.min(area.width);
    let height = height.min(area.height);

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect {
        x,
        y,
        width,
        height,
    }
}

fn results_lines(outcome: &AnalysisOutcome, app: &App) -> Vec<Line<'static>> {
    let theme = &app.theme;
    let label = |text: &'static str| Span::styled(text, Style::default().fg(theme.muted));
    let count = |c: Option<u64>| c.map_or_else(|| "n/a".to_string(), |c| c.to_string());

    let coords = outcome
        .best_coordinate()
        .map_or_else(|| "n/a".to_string(), |c| c.to_string());

    let mut lines = vec![
        Line::from(vec![
            label("Best location  "),
            Span::styled(outcome.best_name(), Style::default().bold()),
        ]),
        Line::from(vec![label("Coordinates    "), Span::raw(coords)]),
        Line::from(vec![
            label("Suitability    "),
            Span::styled(
                format_score(outcome.best_score()),
                Style::default().fg(theme.weight_ready).bold(),
            ),
        ]),
        Line::from(vec![
            label("Locations      "),
            Span::raw(format!(
                "{} analyzed, {} suitable",
                count(outcome.total_locations()),
                count(outcome.suitable_locations())
            )),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            format!("Weights used ({}%)", outcome.total_weight),
            Style::default().fg(theme.title_color),
        )),
    ];

    for (id, weight) in &outcome.weights {
        let name = app
            .store
            .catalog()
            .get(id)
            .map(|d| d.name.to_string())
            .unwrap_or_else(|_| id.clone());
        lines.push(Line::from(format!("  {:<28} {:>3}%", name, weight)));
    }

    let top = &outcome.response.top_locations;
    if !top.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Top locations",
            Style::default().fg(theme.title_color),
        )));
        for (idx, loc) in top.iter().take(5).enumerate() {
            let score = loc
                .suitability_score
                .map(|s| format!("{:.2}", s))
                .unwrap_or_else(|| "n/a".to_string());
            lines.push(Line::from(format!(
                "  {:>2}. {:>6}  {}",
                idx + 1,
                score,
                truncate_text(&loc.label(), 40)
            )));
        }
    }

    lines
}

fn render_results_popup(frame: &mut Frame, outcome: &AnalysisOutcome, app: &App) {
    let lines = results_lines(outcome, app);
    let height = (lines.len() as u16).saturating_add(4);
    let popup_area = centered_rect_fixed(64, height, frame.area());

    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(Span::styled(" Analysis Results ", app.theme.popup_title))
        .border_style(Style::default().fg(app.theme.popup_border))
        .style(Style::default().bg(app.theme.popup_bg));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let chunks = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).split(inner);
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), chunks[0]);

    let hint = Paragraph::new("g: GeoJSON | s: shapefile | o: open map | Esc: dismiss")
        .style(Style::default().fg(app.theme.muted));
    frame.render_widget(hint, chunks[1]);
}

/// Render the help overlay popup
fn render_help_popup(frame: &mut Frame, theme: &ThemeColors) {
    let popup_area = centered_rect_fixed(54, 22, frame.area());

    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(Span::styled(" Keyboard Shortcuts ", theme.popup_title))
        .border_style(Style::default().fg(theme.popup_border));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let key_style = Style::default().fg(theme.status_key_color).bold();
    let entries = [
        ("j / Down      ", "Move down"),
        ("k / Up        ", "Move up"),
        ("Space         ", "Include/exclude parameter"),
        ("h / Left      ", "Decrease value"),
        ("l / Right     ", "Increase value"),
        ("- / +         ", "Decrease/increase weight"),
        ("Enter         ", "Run analysis (weights must total 100%)"),
        ("v             ", "Show last results"),
        ("w             ", "Save parameters for next time"),
        ("R             ", "Reset parameters to defaults"),
        ("?             ", "Show/hide this help"),
        ("q / Ctrl-c    ", "Quit"),
        ("", ""),
        ("In results:", ""),
        ("g             ", "Export GeoJSON"),
        ("s             ", "Export zipped shapefile"),
        ("o             ", "Open best location on a map"),
        ("Esc           ", "Dismiss results"),
    ];

    let mut help_lines: Vec<Line> = entries
        .iter()
        .map(|(key, desc)| Line::from(vec![Span::styled(*key, key_style), Span::raw(*desc)]))
        .collect();
    help_lines.push(Line::from(""));
    help_lines.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().fg(theme.muted),
    )));

    frame.render_widget(Paragraph::new(help_lines), inner);
}

/// Render the spinner shown while a submission is in flight
fn render_analyzing_overlay(frame: &mut Frame, app: &App) {
    let popup_area = centered_rect_fixed(30, 3, frame.area());

    frame.render_widget(Clear, popup_area);

    let block = Block::bordered();
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    // Braille spinner animation
    let spinner_chars = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    let spinner = spinner_chars[app.spinner_frame % spinner_chars.len()];

    let text = Paragraph::new(format!("{} Analyzing...", spinner))
        .alignment(Alignment::Center)
        .style(Style::default().fg(app.theme.title_color));

    frame.render_widget(text, inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_bar_proportions() {
        let theme = ThemeColors::dark();
        let full = weight_bar(MAX_WEIGHT, 10, &theme);
        assert_eq!(full.spans.len(), 1);
        assert_eq!(full.spans[0].content, "█".repeat(10));

        let third = weight_bar(10, 9, &theme);
        assert_eq!(third.spans[0].content, "█".repeat(3));
        assert_eq!(third.spans[1].content, "░".repeat(6));
    }

    #[test]
    fn test_centered_rect_clamps_to_area() {
        let area = Rect::new(0, 0, 20, 10);
        let rect = centered_rect_fixed(40, 4, area);
        assert_eq!(rect.width, 20);
        assert_eq!(rect.y, 3);
    }
}
