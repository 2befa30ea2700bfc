use std::path::PathBuf;
use std::time::Instant;

use crate::analysis::{
    clear_last_outcome, store_last_outcome, AnalysisOutcome, AnalysisRequest, AnalysisResponse,
    AnalysisSession, ScoringClient,
};
use crate::catalog::ParameterDefinition;
use crate::error::{ServiceError, SubmitError};
use crate::export::{write_export, ExportFormat};
use crate::params::{save_session, ParameterState, ParameterStore};
use crate::tui::theme::ThemeColors;

const FLASH_SECS: u64 = 3;

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    Help,
    Results,
}

#[derive(Debug, Clone)]
pub struct Flash {
    pub text: String,
    pub is_error: bool,
    pub shown_at: Instant,
}

/// Where the app keeps things on disk.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub session: PathBuf,
    pub cache: PathBuf,
    pub export_dir: PathBuf,
}

pub struct App {
    pub store: ParameterStore,
    pub session: AnalysisSession,
    pub client: ScoringClient,
    pub paths: AppPaths,
    pub theme: ThemeColors,
    pub table_state: ratatui::widgets::TableState,
    pub input_mode: InputMode,
    pub flash_message: Option<Flash>,
    /// Request validated and waiting to be sent by the event loop
    pub pending_request: Option<AnalysisRequest>,
    pub should_quit: bool,
    pub spinner_frame: usize,
}

impl App {
    pub fn new(
        store: ParameterStore,
        session: AnalysisSession,
        client: ScoringClient,
        paths: AppPaths,
        theme: ThemeColors,
    ) -> Self {
        let mut table_state = ratatui::widgets::TableState::default();
        if !store.catalog().is_empty() {
            table_state.select(Some(0));
        }

        Self {
            store,
            session,
            client,
            paths,
            theme,
            table_state,
            input_mode: InputMode::Normal,
            flash_message: None,
            pending_request: None,
            should_quit: false,
            spinner_frame: 0,
        }
    }

    pub fn is_analyzing(&self) -> bool {
        self.session.is_analyzing()
    }

    pub fn next_row(&mut self) {
        let len = self.store.catalog().len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous_row(&mut self) {
        let len = self.store.catalog().len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(i));
    }

    pub fn selected(&self) -> Option<(&ParameterDefinition, &ParameterState)> {
        let i = self.table_state.selected()?;
        self.store.iter().nth(i)
    }

    fn selected_id(&self) -> Option<&'static str> {
        let i = self.table_state.selected()?;
        self.store.catalog().list().get(i).map(|def| def.id)
    }

    pub fn toggle_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        if let Err(e) = self.store.toggle(id) {
            self.show_error(e.to_string());
        }
    }

    /// Move the selected value one step (50 m or one level) in `direction`.
    pub fn step_selected_value(&mut self, direction: i64) {
        let Some((def, _)) = self.selected() else {
            return;
        };
        let (id, step) = (def.id, def.kind.step());
        if let Err(e) = self.store.adjust_value(id, direction * step) {
            self.show_error(e.to_string());
        }
    }

    pub fn adjust_selected_weight(&mut self, delta: i64) {
        let Some(id) = self.selected_id() else {
            return;
        };
        if let Err(e) = self.store.adjust_weight(id, delta) {
            self.show_error(e.to_string());
        }
    }

    /// Validate and queue a submission. Refusals become flash messages and
    /// leave the parameters untouched.
    pub fn start_analysis(&mut self) {
        match self.session.begin(&self.store) {
            Ok(request) => {
                self.pending_request = Some(request);
                self.input_mode = InputMode::Normal;
            }
            Err(SubmitError::AlreadyAnalyzing) => {
                self.show_error("Analysis already in progress".to_string());
            }
            Err(e) => self.show_error(e.to_string()),
        }
    }

    /// Take the queued request, if any, for the event loop to send.
    pub fn take_pending_request(&mut self) -> Option<AnalysisRequest> {
        self.pending_request.take()
    }

    /// Record the reply of the background submission.
    pub fn finish_analysis(&mut self, reply: Result<AnalysisResponse, ServiceError>) {
        let cache_result = match self.session.complete(reply) {
            Ok(outcome) => store_last_outcome(&self.paths.cache, outcome),
            Err(e) => {
                self.show_error(format!("Analysis failed: {}", e));
                return;
            }
        };

        self.input_mode = InputMode::Results;
        match cache_result {
            Ok(()) => self.show_flash("Analysis complete".to_string()),
            Err(e) => self.show_error(format!("Analysis complete, but not cached: {}", e)),
        }
    }

    /// The background submission vanished without a reply.
    pub fn abort_analysis(&mut self, reason: String) {
        self.session.abort();
        self.show_error(format!("Analysis failed: {}", reason));
    }

    pub fn result(&self) -> Option<&AnalysisOutcome> {
        self.session.result()
    }

    pub fn show_results(&mut self) {
        if self.session.result().is_some() {
            self.input_mode = InputMode::Results;
        } else {
            self.show_flash("No results yet. Press Enter to analyze.".to_string());
        }
    }

    /// Close the results view and forget the result, cached copy included.
    pub fn dismiss_results(&mut self) {
        self.session.dismiss();
        self.input_mode = InputMode::Normal;
        if let Err(e) = clear_last_outcome(&self.paths.cache) {
            self.show_error(format!("Failed to clear cached result: {}", e));
        }
    }

    pub fn export(&mut self, format: ExportFormat) {
        let Some(outcome) = self.session.result() else {
            self.show_error("Nothing to export".to_string());
            return;
        };
        match write_export(outcome, format, &self.paths.export_dir) {
            Ok(path) => self.show_flash(format!("Saved {}", path.display())),
            Err(e) => self.show_error(format!("Export failed: {}", e)),
        }
    }

    pub fn open_map(&mut self) {
        let Some(coord) = self.session.result().and_then(|o| o.best_coordinate()) else {
            self.show_error("No best location to show".to_string());
            return;
        };
        match crate::browser::open_map(coord) {
            Ok(_) => self.show_flash(format!("Opened map at {}", coord)),
            Err(e) => self.show_error(format!("Failed to open browser: {}", e)),
        }
    }

    pub fn save_session(&mut self) {
        match save_session(&self.paths.session, &self.store) {
            Ok(()) => self.show_flash(format!("Saved session to {}", self.paths.session.display())),
            Err(e) => self.show_error(format!("Failed to save session: {}", e)),
        }
    }

    pub fn reset_parameters(&mut self) {
        self.store.reset();
        self.show_flash("Parameters reset to defaults".to_string());
    }

    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    pub fn dismiss_help(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn update_flash(&mut self) {
        if let Some(flash) = &self.flash_message {
            if flash.shown_at.elapsed().as_secs() >= FLASH_SECS {
                self.flash_message = None;
            }
        }
    }

    pub fn show_flash(&mut self, text: String) {
        self.flash_message = Some(Flash {
            text,
            is_error: false,
            shown_at: Instant::now(),
        });
    }

    pub fn show_error(&mut self, text: String) {
        self.flash_message = Some(Flash {
            text,
            is_error: true,
            shown_at: Instant::now(),
        });
    }

    /// Advance the loading spinner animation frame
    pub fn advance_spinner(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
    }
}
