use clap::{Parser, Subcommand};
use std::path::PathBuf;

use monasib::analysis::{AnalysisSession, ScoringClient};
use monasib::catalog::{Catalog, MAX_WEIGHT, MIN_WEIGHT};
use monasib::config::Config;
use monasib::error::{ModelError, RangeField, SubmitError};
use monasib::export::ExportFormat;
use monasib::params::ParameterStore;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_NETWORK: i32 = 2;
const EXIT_VALIDATION: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive parameter editor (default if no subcommand)
    Tui,
    /// Show the parameter catalog and the current weights
    Params,
    /// Submit the current parameters to the scoring service
    Analyze {
        /// Switch a parameter on (repeatable)
        #[arg(long = "enable", value_name = "ID")]
        enable: Vec<String>,

        /// Set a parameter value, e.g. --value competitors=800
        #[arg(long = "value", value_name = "ID=N", value_parser = parse_assignment)]
        values: Vec<(String, i64)>,

        /// Set a parameter weight, e.g. --weight parking=20
        #[arg(long = "weight", value_name = "ID=N", value_parser = parse_assignment)]
        weights: Vec<(String, i64)>,

        /// Start from the saved session instead of the config presets
        /// (without it, any saved session is ignored)
        #[arg(long)]
        session: bool,

        /// Also write the best location in this format (geojson or shapefile)
        #[arg(long, value_name = "FMT")]
        export: Option<ExportFormat>,
    },
    /// Write the best location of the last analysis to a file
    Export {
        /// geojson or shapefile
        format: ExportFormat,

        /// Output directory (defaults to export_dir from config)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Open the best location of the last analysis in a map
    Open,
    /// Ask the scoring service for a report on the last analysis
    Report,
    /// Forget the last analysis result
    Clear,
    /// Delete the saved session
    Reset,
    /// Create a config file interactively
    Init,
}

#[derive(Parser, Debug)]
#[command(name = "monasib")]
#[command(about = "Restaurant site-selection parameter weighting", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/monasib/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Parse `ID=N` pairs for `--value` and `--weight`.
fn parse_assignment(s: &str) -> Result<(String, i64), String> {
    let (id, number) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ID=N, got '{}'", s))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("missing parameter id in '{}'", s));
    }
    let number = number
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid number in '{}': {}", s, e))?;
    Ok((id.to_string(), number))
}

fn print_errors(heading: &str, errors: &[String]) {
    eprintln!("{}:", heading);
    for error in errors {
        eprintln!("  - {}", error);
    }
}

/// Where a command takes its starting parameters from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoreSource {
    /// The saved session when one exists, otherwise config presets
    SessionIfSaved,
    /// The saved session; it must exist
    Session,
    /// Catalog defaults with config presets, ignoring any saved session
    Presets,
}

/// Pick the starting store for `source` given what was loaded from disk.
fn choose_store(
    source: StoreSource,
    saved: Option<ParameterStore>,
    catalog: &Catalog,
    config: &Config,
) -> Result<ParameterStore, String> {
    match (source, saved) {
        (StoreSource::SessionIfSaved | StoreSource::Session, Some(store)) => Ok(store),
        (StoreSource::Session, None) => {
            Err("No saved session. Save one from the TUI with `w`.".to_string())
        }
        (StoreSource::SessionIfSaved | StoreSource::Presets, _) => {
            let mut store = ParameterStore::initialize(catalog.clone());
            store
                .apply_presets(&config.parameters)
                .map_err(|e| format!("Config error: {}", e))?;
            Ok(store)
        }
    }
}

fn build_store(catalog: &Catalog, config: &Config, source: StoreSource) -> ParameterStore {
    let session_path = monasib::params::get_session_path();
    let saved = if source == StoreSource::Presets {
        None
    } else {
        match monasib::params::load_session(&session_path, catalog) {
            Ok(saved) => saved,
            Err(e) => {
                eprintln!("Session error: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
        }
    };
    if saved.is_some() {
        monasib::diag_verbose!("Loaded session from {}", session_path.display());
    }

    match choose_store(source, saved, catalog, config) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(EXIT_CONFIG);
        }
    }
}

/// Apply a `--weight` argument, reporting the number as typed when it does
/// not even fit a weight.
fn set_weight_arg(store: &mut ParameterStore, id: &str, weight: i64) -> Result<(), ModelError> {
    match u32::try_from(weight) {
        Ok(weight) => store.set_weight(id, weight),
        Err(_) => {
            store.get(id)?;
            Err(ModelError::OutOfRange {
                id: id.to_string(),
                field: RangeField::Weight,
                min: i64::from(MIN_WEIGHT),
                max: i64::from(MAX_WEIGHT),
                got: weight,
            })
        }
    }
}

fn load_last_or_exit() -> monasib::analysis::AnalysisOutcome {
    match monasib::analysis::load_last_outcome(&monasib::analysis::get_cache_path()) {
        Some(outcome) => outcome,
        None => {
            eprintln!("No analysis result yet. Run `monasib analyze` or press Enter in the TUI.");
            std::process::exit(EXIT_VALIDATION);
        }
    }
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+)
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();
    monasib::diag::set_verbose(cli.verbose);
    let command = cli.command.unwrap_or(Commands::Tui);
    let config_path = cli.config.map(PathBuf::from);
    let catalog = Catalog::restaurant();

    // Wizard runs before loading so a broken config can be replaced
    if let Commands::Init = command {
        if let Err(e) = monasib::config::run_init_wizard(config_path, &catalog) {
            eprintln!("Init failed: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
        std::process::exit(EXIT_SUCCESS);
    }

    // Load config
    let config = match monasib::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate catalog and config at startup
    if let Err(errors) = monasib::catalog::validate_catalog(&catalog) {
        print_errors("Catalog errors", &errors);
        std::process::exit(EXIT_CONFIG);
    }
    if let Err(errors) = monasib::config::validate_config(&config, &catalog) {
        print_errors("Config errors", &errors);
        std::process::exit(EXIT_CONFIG);
    }

    monasib::diag_verbose!(
        "Scoring service: {} (timeout {}, {} retries)",
        config.service_url,
        config.timeout,
        config.retries
    );

    let client = match ScoringClient::from_config(&config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create scoring client: {}", e);
            std::process::exit(EXIT_NETWORK);
        }
    };

    let use_colors = monasib::output::should_use_colors();

    match command {
        Commands::Tui => {
            let cache_path = monasib::analysis::get_cache_path();
            let last = monasib::analysis::load_last_outcome(&cache_path);
            let app = monasib::tui::App::new(
                build_store(&catalog, &config, StoreSource::SessionIfSaved),
                AnalysisSession::with_result(last),
                client,
                monasib::tui::AppPaths {
                    session: monasib::params::get_session_path(),
                    cache: cache_path,
                    export_dir: config.export_dir(),
                },
                monasib::tui::resolve_theme(config.theme),
            );
            if let Err(e) = monasib::tui::run_tui(app).await {
                eprintln!("TUI error: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
        }
        Commands::Params => {
            let store = build_store(&catalog, &config, StoreSource::SessionIfSaved);
            println!("{}", monasib::output::format_catalog(&catalog, use_colors));
            println!();
            println!(
                "{}",
                monasib::output::format_parameter_table(&store, use_colors)
            );
            println!(
                "{}",
                monasib::output::format_weight_summary(&store, use_colors)
            );
        }
        Commands::Analyze {
            enable,
            values,
            weights,
            session,
            export,
        } => {
            let source = if session {
                StoreSource::Session
            } else {
                StoreSource::Presets
            };
            let mut store = build_store(&catalog, &config, source);

            // Command-line edits go through the same validated setters
            let edits = enable
                .iter()
                .try_for_each(|id| store.set_active(id, true))
                .and_then(|_| {
                    values
                        .iter()
                        .try_for_each(|(id, value)| store.set_value(id, *value))
                })
                .and_then(|_| {
                    weights
                        .iter()
                        .try_for_each(|(id, weight)| set_weight_arg(&mut store, id, *weight))
                });
            if let Err(e) = edits {
                eprintln!("Invalid parameter: {}", e);
                std::process::exit(EXIT_VALIDATION);
            }

            eprintln!(
                "{}",
                monasib::output::format_weight_summary(&store, use_colors)
            );

            let mut analysis = AnalysisSession::new();
            let outcome = match analysis.submit(&store, &client).await {
                Ok(outcome) => outcome,
                Err(SubmitError::Rejected(e)) => {
                    eprintln!("{}", e);
                    std::process::exit(EXIT_VALIDATION);
                }
                Err(e) => {
                    eprintln!("Analysis failed: {}", e);
                    std::process::exit(EXIT_NETWORK);
                }
            };

            println!(
                "{}",
                monasib::output::format_outcome(outcome, &catalog, use_colors)
            );

            let cache_path = monasib::analysis::get_cache_path();
            if let Err(e) = monasib::analysis::store_last_outcome(&cache_path, outcome) {
                monasib::diag_warn!("Warning: result not cached: {:#}", e);
            }

            if let Some(format) = export {
                match monasib::export::write_export(outcome, format, &config.export_dir()) {
                    Ok(path) => eprintln!("Saved {}", path.display()),
                    Err(e) => {
                        eprintln!("Export failed: {}", e);
                        std::process::exit(EXIT_VALIDATION);
                    }
                }
            }
        }
        Commands::Export { format, out } => {
            let outcome = load_last_or_exit();
            let dir = out.unwrap_or_else(|| config.export_dir());
            match monasib::export::write_export(&outcome, format, &dir) {
                Ok(path) => println!("Saved {}", path.display()),
                Err(e) => {
                    eprintln!("Export failed: {}", e);
                    std::process::exit(EXIT_VALIDATION);
                }
            }
        }
        Commands::Open => {
            let outcome = load_last_or_exit();
            let Some(coord) = outcome.best_coordinate() else {
                eprintln!("The last analysis has no best location.");
                std::process::exit(EXIT_VALIDATION);
            };

            match monasib::browser::open_map(coord) {
                Ok(url) => println!("Opening {} in browser: {}", outcome.best_name(), url),
                Err(e) => {
                    eprintln!("Failed to open browser: {}", e);
                    std::process::exit(EXIT_NETWORK);
                }
            }
        }
        Commands::Report => {
            let outcome = load_last_or_exit();
            match client.report(&outcome).await {
                Ok(report) => println!(
                    "{}",
                    monasib::output::format_report(&report, use_colors)
                ),
                Err(e) => {
                    eprintln!("Report failed: {}", e);
                    std::process::exit(EXIT_NETWORK);
                }
            }
        }
        Commands::Clear => {
            if let Err(e) =
                monasib::analysis::clear_last_outcome(&monasib::analysis::get_cache_path())
            {
                eprintln!("Failed to clear result: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
            println!("Cleared the last analysis result.");
        }
        Commands::Reset => {
            let session_path = monasib::params::get_session_path();
            if let Err(e) = monasib::params::clear_session(&session_path) {
                eprintln!("Failed to reset session: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
            println!("Removed saved session at {}", session_path.display());
        }
        // Handled before config load
        Commands::Init => {}
    }

    std::process::exit(EXIT_SUCCESS);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("competitors=800"),
            Ok(("competitors".to_string(), 800))
        );
        assert_eq!(
            parse_assignment(" parking = 4 "),
            Ok(("parking".to_string(), 4))
        );
        assert!(parse_assignment("parking").is_err());
        assert!(parse_assignment("=4").is_err());
        assert!(parse_assignment("parking=lots").is_err());
    }

    #[test]
    fn test_default_command_is_tui() {
        let cli = Cli::try_parse_from(["monasib"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_analyze_flags() {
        let cli = Cli::try_parse_from([
            "monasib",
            "--verbose",
            "analyze",
            "--enable",
            "competitors",
            "--enable",
            "parking",
            "--weight",
            "parking=20",
            "--export",
            "shp",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Some(Commands::Analyze {
                enable,
                weights,
                export,
                session,
                ..
            }) => {
                assert_eq!(enable, vec!["competitors", "parking"]);
                assert_eq!(weights, vec![("parking".to_string(), 20)]);
                assert_eq!(export, Some(ExportFormat::Shapefile));
                assert!(!session);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    fn ready_store() -> ParameterStore {
        let mut store = ParameterStore::initialize(Catalog::restaurant());
        for id in ["competitors", "foot_traffic", "rent_cost", "parking"] {
            store.toggle(id).unwrap();
            store.set_weight(id, 25).unwrap();
        }
        store
    }

    fn preset_config() -> Config {
        serde_saphyr::from_str(
            "parameters:\n  competitors: { active: true, weight: 30 }\n",
        )
        .unwrap()
    }

    #[test]
    fn test_presets_ignore_saved_session() {
        let catalog = Catalog::restaurant();
        let store = choose_store(
            StoreSource::Presets,
            Some(ready_store()),
            &catalog,
            &preset_config(),
        )
        .unwrap();
        assert_eq!(store.active_count(), 1);
        assert_eq!(store.total_weight(), 30);
    }

    #[test]
    fn test_saved_session_wins_when_present() {
        let catalog = Catalog::restaurant();
        for source in [StoreSource::SessionIfSaved, StoreSource::Session] {
            let store =
                choose_store(source, Some(ready_store()), &catalog, &preset_config()).unwrap();
            assert_eq!(store.total_weight(), 100);
        }

        let fallback =
            choose_store(StoreSource::SessionIfSaved, None, &catalog, &preset_config()).unwrap();
        assert_eq!(fallback.total_weight(), 30);
    }

    #[test]
    fn test_required_session_missing() {
        let result = choose_store(
            StoreSource::Session,
            None,
            &Catalog::restaurant(),
            &Config::default(),
        );
        assert!(result.unwrap_err().starts_with("No saved session"));
    }

    #[test]
    fn test_huge_weight_reports_number_as_typed() {
        let mut store = ParameterStore::initialize(Catalog::restaurant());
        let err = set_weight_arg(&mut store, "parking", 5_000_000_000).unwrap_err();
        assert_eq!(
            err.to_string(),
            "weight for 'parking' must be between 1 and 30, got 5000000000"
        );

        let err = set_weight_arg(&mut store, "parking", -3).unwrap_err();
        assert!(err.to_string().ends_with("got -3"));

        assert!(matches!(
            set_weight_arg(&mut store, "nowhere", -3),
            Err(ModelError::NotFound(_))
        ));

        set_weight_arg(&mut store, "parking", 20).unwrap();
        assert_eq!(store.get("parking").unwrap().weight, 20);
    }

    #[test]
    fn test_export_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["monasib", "export", "kml"]).is_err());
    }
}
