use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use panel_grade::config::{init::run_init_wizard, Config};
use panel_grade::output::{format_json, format_trace, format_verdict, should_use_colors};
use panel_grade::scoring::{evaluate, validate_scoring, RaterSubmission};

const EXIT_SUCCESS: i32 = 0;
const EXIT_DEAL_BREAKER: i32 = 1;
const EXIT_INPUT: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate a responses file and print the verdict
    Evaluate {
        /// JSON file with the raters' answers
        responses: PathBuf,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Print the computation trace after the verdict
        #[arg(long)]
        trace: bool,

        /// Exit with code 1 when a deal-breaker fired
        #[arg(long)]
        fail_on_deal_breaker: bool,
    },
    /// Check the scoring configuration and report every problem
    Validate,
    /// Write a config file with the built-in scoring model
    Init {
        /// Overwrite an existing config without asking
        #[arg(long)]
        force: bool,

        /// Skip the questions and write the defaults
        #[arg(long)]
        defaults: bool,
    },
    /// Print the effective configuration as YAML
    ShowConfig,
}

#[derive(Parser, Debug)]
#[command(name = "panel-grade")]
#[command(about = "Grade an item from a panel of raters", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/panel-grade/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.map(PathBuf::from);

    // Init must work even when the current config is broken
    if let Commands::Init { force, defaults } = cli.command {
        if let Err(e) = run_init_wizard(config_path, defaults, force) {
            eprintln!("Init failed: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
        std::process::exit(EXIT_SUCCESS);
    }

    let config = match panel_grade::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate scoring config at startup
    let scoring = config.effective_scoring();
    if let Err(errors) = validate_scoring(&scoring) {
        eprintln!("Scoring config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    tracing::debug!(
        categories = scoring.categories.len(),
        tiers = scoring.quality_tiers.len(),
        custom = config.scoring.is_some(),
        "scoring model ready"
    );

    match cli.command {
        Commands::Validate => {
            println!(
                "Scoring config is valid ({} categories, {} tiers).",
                scoring.categories.len(),
                scoring.quality_tiers.len()
            );
        }
        Commands::ShowConfig => {
            let shown = Config {
                scoring: Some(scoring),
                output: config.output.clone(),
            };
            match serde_saphyr::to_string(&shown) {
                Ok(yaml) => print!("{}", yaml),
                Err(e) => {
                    eprintln!("Failed to serialize config: {}", e);
                    std::process::exit(EXIT_CONFIG);
                }
            }
        }
        Commands::Evaluate {
            responses,
            json,
            trace,
            fail_on_deal_breaker,
        } => {
            let start_time = Instant::now();
            let records = match panel_grade::responses::load_responses(&responses) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("Responses error: {:#}", e);
                    std::process::exit(EXIT_INPUT);
                }
            };

            for (i, record) in records.iter().enumerate() {
                tracing::debug!(
                    rater = i + 1,
                    name = record.rater.as_deref().unwrap_or("(unnamed)"),
                    "loaded submission"
                );
            }

            let submissions: Vec<RaterSubmission> =
                records.into_iter().map(|r| r.answers).collect();
            let result = evaluate(&scoring, &submissions);

            tracing::debug!(
                raters = submissions.len(),
                elapsed = ?start_time.elapsed(),
                tier = %result.final_tier,
                "evaluation finished"
            );

            if json {
                match format_json(&result) {
                    Ok(out) => println!("{}", out),
                    Err(e) => {
                        eprintln!("Failed to serialize result: {}", e);
                        std::process::exit(EXIT_INPUT);
                    }
                }
            } else {
                let use_colors = config.output.colors.unwrap_or_else(should_use_colors);
                println!("{}", format_verdict(&result, &scoring, use_colors));
                if trace || config.output.show_trace {
                    println!();
                    println!("{}", format_trace(&result, use_colors));
                }
            }

            if fail_on_deal_breaker && result.deal_breaker_triggered {
                std::process::exit(EXIT_DEAL_BREAKER);
            }
        }
        Commands::Init { .. } => {}
    }

    std::process::exit(EXIT_SUCCESS);
}
