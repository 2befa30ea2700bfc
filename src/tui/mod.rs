pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::{App, AppPaths};
pub use theme::{resolve_theme, ThemeColors};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use event::{Event, EventHandler};

use crate::analysis::{AnalysisResponse, ScoringService};
use crate::error::ServiceError;
use crate::export::ExportFormat;

type PendingAnalysis = tokio::task::JoinHandle<Result<AnalysisResponse, ServiceError>>;

pub async fn run_tui(mut app: App) -> anyhow::Result<()> {
    // Hold stderr diagnostics while the TUI owns the terminal
    crate::diag::activate();

    // Init terminal (sets up panic hooks automatically)
    let mut terminal = ratatui::init();
    let mut events = EventHandler::new(100);

    let mut pending_analysis: Option<PendingAnalysis> = None;

    let result = loop {
        if let Err(e) = terminal.draw(|frame| ui::draw(frame, &mut app)) {
            break Err(e.into());
        }

        match events.next().await {
            Event::Key(key) => handle_key_event(&mut app, key),
            Event::Tick => {
                app.update_flash();
                app.advance_spinner();
            }
        }

        // Send a newly validated request on a background task
        if let Some(request) = app.take_pending_request() {
            let client = app.client.clone();
            pending_analysis = Some(tokio::spawn(async move { client.analyze(&request).await }));
        }

        // Check if the background submission has completed
        if pending_analysis
            .as_ref()
            .is_some_and(|handle| handle.is_finished())
        {
            if let Some(handle) = pending_analysis.take() {
                match handle.await {
                    Ok(reply) => app.finish_analysis(reply),
                    Err(e) => app.abort_analysis(format!("analysis task panicked: {}", e)),
                }
            }
        }

        if app.should_quit {
            break Ok(());
        }
    };

    // Restore terminal
    ratatui::restore();

    // Flush buffered diagnostics now that the terminal is restored
    for msg in crate::diag::drain() {
        eprintln!("{}", msg);
    }

    result
}

fn handle_key_event(app: &mut App, key: KeyEvent) {
    // Ctrl-c always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        app::InputMode::Normal => match key.code {
            KeyCode::Char('q') => app.should_quit = true,

            // Navigation
            KeyCode::Char('j') | KeyCode::Down => app.next_row(),
            KeyCode::Char('k') | KeyCode::Up => app.previous_row(),

            // Editing
            KeyCode::Char(' ') => app.toggle_selected(),
            KeyCode::Char('h') | KeyCode::Left => app.step_selected_value(-1),
            KeyCode::Char('l') | KeyCode::Right => app.step_selected_value(1),
            KeyCode::Char('-') | KeyCode::Char('_') => app.adjust_selected_weight(-1),
            KeyCode::Char('+') | KeyCode::Char('=') => app.adjust_selected_weight(1),

            // Analysis
            KeyCode::Enter => app.start_analysis(),
            KeyCode::Char('v') => app.show_results(),

            // Session
            KeyCode::Char('w') => app.save_session(),
            KeyCode::Char('R') => app.reset_parameters(),

            // Help
            KeyCode::Char('?') => app.show_help(),

            _ => {}
        },
        app::InputMode::Results => match key.code {
            KeyCode::Char('g') => app.export(ExportFormat::GeoJson),
            KeyCode::Char('s') => app.export(ExportFormat::Shapefile),
            KeyCode::Char('o') => app.open_map(),
            KeyCode::Esc => app.dismiss_results(),
            KeyCode::Char('q') => app.should_quit = true,
            _ => {}
        },
        app::InputMode::Help => {
            // Any key exits help
            app.dismiss_help();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisSession, ScoringClient};
    use crate::catalog::Catalog;
    use crate::params::ParameterStore;
    use std::time::Duration;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app() -> App {
        let dir = std::env::temp_dir().join(format!("monasib-keys-test-{}", std::process::id()));
        App::new(
            ParameterStore::initialize(Catalog::restaurant()),
            AnalysisSession::new(),
            ScoringClient::new("http://127.0.0.1:9", Duration::from_secs(1), 0).unwrap(),
            AppPaths {
                session: dir.join("session.json"),
                cache: dir.join("cache"),
                export_dir: dir.join("exports"),
            },
            ThemeColors::dark(),
        )
    }

    #[test]
    fn test_keys_drive_store() {
        let mut app = test_app();
        handle_key_event(&mut app, press(KeyCode::Char('j')));
        handle_key_event(&mut app, press(KeyCode::Char(' ')));
        handle_key_event(&mut app, press(KeyCode::Char('l')));
        handle_key_event(&mut app, press(KeyCode::Char('+')));

        let state = app.store.get("foot_traffic").unwrap();
        assert!(state.active);
        assert_eq!(state.value, 8);
        assert_eq!(state.weight, 21);
    }

    #[test]
    fn test_help_closes_on_any_key() {
        let mut app = test_app();
        handle_key_event(&mut app, press(KeyCode::Char('?')));
        assert_eq!(app.input_mode, app::InputMode::Help);
        handle_key_event(&mut app, press(KeyCode::Char('x')));
        assert_eq!(app.input_mode, app::InputMode::Normal);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_enter_with_bad_total_does_not_queue() {
        let mut app = test_app();
        handle_key_event(&mut app, press(KeyCode::Char(' ')));
        handle_key_event(&mut app, press(KeyCode::Enter));
        assert!(app.take_pending_request().is_none());
        assert!(app
            .flash_message
            .as_ref()
            .is_some_and(|f| f.text == "Total weight must equal 100%. Current total: 15%"));
    }
}
