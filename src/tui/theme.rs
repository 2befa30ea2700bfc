//! Centralized theme module for TUI colors and styles

use ratatui::prelude::*;

use crate::analysis::WeightStatus;
use crate::config::ThemeMode;

/// Complete color palette for the TUI
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Weight total (traffic light pattern)
    pub weight_ready: Color,
    pub weight_over: Color,
    pub weight_under: Color,

    // Weight bar colors
    pub bar_filled: Color,
    pub bar_empty: Color,

    // Table colors
    pub row_alt_bg: Color,
    pub index_color: Color,
    pub active_marker: Color,
    pub inactive_fg: Color,

    // Styles
    pub header_style: Style,
    pub row_selected: Style,

    // General colors
    pub muted: Color,
    pub title_color: Color,

    // Status bar colors
    pub status_bar_bg: Color,
    pub status_key_color: Color,
    pub flash_success: Color,
    pub flash_error: Color,

    // Popup overlay colors
    pub popup_border: Color,
    pub popup_title: Style,
    pub popup_bg: Color,
}

impl ThemeColors {
    /// Dark theme palette
    pub fn dark() -> Self {
        Self {
            weight_ready: Color::Green,
            weight_over: Color::Red,
            weight_under: Color::Yellow,
            bar_filled: Color::Cyan,
            bar_empty: Color::DarkGray,
            row_alt_bg: Color::Indexed(235),
            index_color: Color::DarkGray,
            active_marker: Color::Green,
            inactive_fg: Color::Gray,
            header_style: Style::new().bold(),
            row_selected: Style::new().reversed(),
            muted: Color::Gray,
            title_color: Color::Cyan,
            status_bar_bg: Color::Indexed(236),
            status_key_color: Color::Cyan,
            flash_success: Color::Green,
            flash_error: Color::Red,
            popup_border: Color::Cyan,
            popup_title: Style::new().fg(Color::Cyan).bold(),
            popup_bg: Color::Indexed(234),
        }
    }

    /// Light theme palette, darker hues for contrast on light backgrounds
    pub fn light() -> Self {
        Self {
            weight_ready: Color::Rgb(0, 128, 0),
            weight_over: Color::Rgb(180, 0, 0),
            weight_under: Color::Rgb(160, 110, 0),
            bar_filled: Color::Blue,
            bar_empty: Color::Indexed(250),
            row_alt_bg: Color::Indexed(255),
            index_color: Color::Indexed(244),
            active_marker: Color::Rgb(0, 128, 0),
            inactive_fg: Color::Indexed(240),
            header_style: Style::new().bold(),
            row_selected: Style::new().reversed(),
            muted: Color::Indexed(242),
            title_color: Color::Blue,
            status_bar_bg: Color::Indexed(253),
            status_key_color: Color::Blue,
            flash_success: Color::Rgb(0, 128, 0),
            flash_error: Color::Rgb(180, 0, 0),
            popup_border: Color::Blue,
            popup_title: Style::new().fg(Color::Blue).bold(),
            popup_bg: Color::Indexed(254),
        }
    }

    /// Green at exactly 100, red above, yellow below.
    pub fn weight_color(&self, status: WeightStatus) -> Color {
        match status {
            WeightStatus::Ready => self.weight_ready,
            WeightStatus::Over(_) => self.weight_over,
            WeightStatus::Under(_) | WeightStatus::NoneActive => self.weight_under,
        }
    }
}

/// Pick the palette for `mode`. `Auto` asks the terminal for its background
/// brightness and falls back to dark when it doesn't answer.
///
/// Must run before the terminal enters raw mode.
pub fn resolve_theme(mode: ThemeMode) -> ThemeColors {
    match mode {
        ThemeMode::Dark => ThemeColors::dark(),
        ThemeMode::Light => ThemeColors::light(),
        ThemeMode::Auto => match terminal_light::luma() {
            Ok(luma) if luma > 0.6 => ThemeColors::light(),
            Ok(_) => ThemeColors::dark(),
            Err(e) => {
                crate::diag_verbose!("Could not detect terminal background: {}", e);
                ThemeColors::dark()
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_color_traffic_light() {
        let theme = ThemeColors::dark();
        assert_eq!(theme.weight_color(WeightStatus::Ready), Color::Green);
        assert_eq!(theme.weight_color(WeightStatus::Over(120)), Color::Red);
        assert_eq!(theme.weight_color(WeightStatus::Under(35)), Color::Yellow);
        assert_eq!(theme.weight_color(WeightStatus::NoneActive), Color::Yellow);
    }

    #[test]
    fn test_explicit_modes_skip_detection() {
        assert_eq!(resolve_theme(ThemeMode::Light).title_color, Color::Blue);
        assert_eq!(resolve_theme(ThemeMode::Dark).title_color, Color::Cyan);
    }
}
