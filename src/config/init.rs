use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use super::{get_config_path, save_config, Config, ParameterPreset, ThemeMode};
use crate::catalog::{Catalog, MAX_WEIGHT, MIN_WEIGHT, REQUIRED_TOTAL_WEIGHT};

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Keep asking until the answer parses as an integer inside `[min, max]`.
fn prompt_in_range(message: &str, default: i64, min: i64, max: i64) -> Result<i64> {
    loop {
        let input = prompt_with_default(message, &default.to_string())?;
        match input.parse::<i64>() {
            Ok(v) if (min..=max).contains(&v) => return Ok(v),
            Ok(_) => println!("  Invalid: must be between {} and {}. Try again.", min, max),
            Err(_) => println!("  Invalid: must be a whole number. Try again."),
        }
    }
}

/// Print text with a typewriter effect, one character at a time.
fn typewriter(text: &str) {
    use std::thread;
    use std::time::Duration;
    for c in text.chars() {
        print!("{}", c);
        std::io::stdout().flush().ok();
        thread::sleep(Duration::from_millis(12));
    }
    println!();
}

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
pub fn run_init_wizard(default_path: Option<PathBuf>, catalog: &Catalog) -> Result<()> {
    println!();
    typewriter("Monasib Configuration Wizard");
    println!("============================");
    println!();

    let defaults = Config::default();

    // 1. Scoring service
    typewriter("Monasib sends your criteria to a scoring service and shows the best location it finds.");
    let service_url = loop {
        let input = prompt_with_default("Scoring service URL", &defaults.service_url)?;
        if input.starts_with("http://") || input.starts_with("https://") {
            break input.trim_end_matches('/').to_string();
        }
        println!("  Invalid: must start with http:// or https://. Try again.");
    };

    let timeout = loop {
        let input = prompt_with_default("Request timeout", &defaults.timeout)?;
        match humantime::parse_duration(&input) {
            Ok(_) => break input,
            Err(e) => println!("  Invalid: {}. Try again.", e),
        }
    };

    // 2. Exports
    println!();
    let export_dir = prompt_with_default("Directory for exported GeoJSON/shapefiles", ".")?;
    let export_dir = if export_dir == "." {
        None
    } else {
        Some(PathBuf::from(export_dir))
    };

    let theme = loop {
        let input = prompt_with_default("Theme (auto/dark/light)", "auto")?;
        match input.as_str() {
            "auto" => break ThemeMode::Auto,
            "dark" => break ThemeMode::Dark,
            "light" => break ThemeMode::Light,
            _ => println!("  Invalid: choose auto, dark or light."),
        }
    };

    // 3. Starting parameters
    println!();
    typewriter("You can pick which parameters start switched on and how much each one counts.");
    typewriter(&format!(
        "Weights go from {} to {} and the active ones must add up to exactly {}% before an analysis runs.",
        MIN_WEIGHT, MAX_WEIGHT, REQUIRED_TOTAL_WEIGHT
    ));
    let mut parameters = BTreeMap::new();
    if prompt_yes_no("Configure starting parameters? (n starts with everything off)", false)? {
        let mut total: u32 = 0;
        for def in catalog.list() {
            println!();
            println!("{} - {}", def.name, def.description);
            if !prompt_yes_no("  Include?", false)? {
                continue;
            }
            let value = prompt_in_range(
                &format!("  {} ({})", def.kind.value_label(), def.unit),
                def.default_value,
                def.min,
                def.max,
            )?;
            let weight = prompt_in_range(
                "  Weight %",
                i64::from(def.default_weight),
                i64::from(MIN_WEIGHT),
                i64::from(MAX_WEIGHT),
            )?;
            let weight = u32::try_from(weight).unwrap_or(def.default_weight);
            total += weight;
            println!("  Running total: {}%", total);

            parameters.insert(
                def.id.to_string(),
                ParameterPreset {
                    active: Some(true),
                    value: Some(value),
                    weight: Some(weight),
                },
            );
        }

        if total != REQUIRED_TOTAL_WEIGHT {
            println!();
            typewriter(&format!(
                "Heads up: the weights add up to {}%. You'll need to adjust them to {}% before analyzing.",
                total, REQUIRED_TOTAL_WEIGHT
            ));
        }
    }

    // 4. Config path
    let default_config_path = default_path.unwrap_or_else(get_config_path);
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    // 5. Write config
    let config = Config {
        service_url,
        timeout,
        retries: defaults.retries,
        export_dir,
        theme,
        parameters,
    };

    save_config(&config_path, &config)?;

    println!();
    println!("Config written to {}", config_path.display());
    println!("Run `monasib` to get started.");

    Ok(())
}
