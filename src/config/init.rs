use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::config::{get_config_path, Config, OutputConfig};
use crate::scoring::{validate_scoring, ScoringConfig};

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

/// Prompt until the user enters a number inside `range`.
fn prompt_number(message: &str, default: f64, range: std::ops::RangeInclusive<f64>) -> Result<f64> {
    loop {
        let input = prompt_with_default(message, &default.to_string())?;
        match input.parse::<f64>() {
            Ok(v) if range.contains(&v) => return Ok(v),
            Ok(_) => println!(
                "  Invalid: must be between {} and {}. Try again.",
                range.start(),
                range.end()
            ),
            Err(_) => println!("  Invalid: not a number. Try again."),
        }
    }
}

/// Write a config file atomically, creating parent directories.
pub fn write_config(path: &Path, config: &Config) -> Result<()> {
    let yaml = serde_saphyr::to_string(config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(yaml.as_bytes())
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    file.commit()
        .with_context(|| format!("Failed to save config to {}", path.display()))?;

    Ok(())
}

/// Ask for the handful of tuning knobs people usually change. Category and
/// criterion layout is left to editing the YAML.
fn customize_scoring() -> Result<ScoringConfig> {
    let mut scoring = ScoringConfig::default();
    let params = &mut scoring.criticality_adjustment_params;

    println!();
    println!("Important criteria lose points below their low threshold and gain points above their high threshold.");
    params.imp_low_penalty_factor = prompt_number(
        "Penalty per point below the important-low threshold",
        params.imp_low_penalty_factor,
        0.0..=10.0,
    )?;
    params.imp_high_bonus_factor = prompt_number(
        "Bonus per point above the important-high threshold",
        params.imp_high_bonus_factor,
        0.0..=10.0,
    )?;

    println!();
    println!("Critical criteria below their threshold are multiplied down and cap their whole category.");
    params.crit_severe_reduction_factor = prompt_number(
        "Critical-low reduction factor",
        params.crit_severe_reduction_factor,
        0.0..=1.0,
    )?;
    let cap = prompt_number(
        "Category cap when a critical flaw is present (10 disables)",
        params.crit_low_cap_value.unwrap_or(10.0),
        0.0..=10.0,
    )?;
    params.crit_low_cap_value = (cap < 10.0).then_some(cap);

    println!();
    println!("A deal-breaker forces this fixed score (0-100) no matter what else was rated.");
    scoring.deal_breaker_score =
        prompt_number("Deal-breaker score", scoring.deal_breaker_score, 0.0..=100.0)?;

    Ok(scoring)
}

/// Run the init flow to create a config file.
///
/// With `use_defaults` the built-in model is written without questions.
/// Existing files are only replaced with `force` or after confirmation.
pub fn run_init_wizard(default_path: Option<PathBuf>, use_defaults: bool, force: bool) -> Result<()> {
    let default_config_path = match default_path {
        Some(path) => path,
        None => get_config_path()?,
    };

    let (scoring, config_path) = if use_defaults {
        (ScoringConfig::default(), default_config_path)
    } else {
        println!();
        println!("panel-grade configuration");
        println!("=========================");
        println!();

        let customize = prompt_yes_no("Customize adjustment parameters? (n accepts defaults)", false)?;
        let scoring = if customize {
            customize_scoring()?
        } else {
            ScoringConfig::default()
        };

        println!();
        let path_str = prompt_with_default(
            "Where should the config be saved?",
            &default_config_path.display().to_string(),
        )?;
        (scoring, PathBuf::from(&path_str))
    };

    if let Err(errors) = validate_scoring(&scoring) {
        anyhow::bail!("Generated scoring config is invalid: {}", errors.join("; "));
    }

    if config_path.exists() && !force {
        let overwrite = !use_defaults
            && prompt_yes_no(
                &format!(
                    "Config already exists at {}. Overwrite?",
                    config_path.display()
                ),
                false,
            )?;
        if !overwrite {
            println!("Config already exists at {}; left unchanged.", config_path.display());
            return Ok(());
        }
    }

    let config = Config {
        scoring: Some(scoring),
        output: OutputConfig::default(),
    };
    write_config(&config_path, &config)?;

    println!();
    println!("Config written to {}", config_path.display());
    println!("Edit categories, criteria and tiers there, then run `panel-grade validate`.");

    Ok(())
}
