//! Handoff CLI - walk through audited ownership transfers.
//!
//! Loads `~/.handoff/config.toml` (and `HANDOFF_RUNTIME_CHECKS`), builds an
//! [`Auditor`], runs the named scenarios (all of them by default) and prints
//! one line per scenario. Exits non-zero if any scenario's outcome differs
//! from what the configured checks predict.

mod scenarios;

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use handoff_config::{ConfigError, HandoffConfig};
use handoff_core::Auditor;

use scenarios::{Outcome, SCENARIOS, Scenario};

const DEFAULT_FILTER: &str = "warn";

#[derive(Parser)]
#[command(name = "handoff")]
#[command(about = "Walk through audited ownership transfers")]
struct Cli {
    /// List scenario names and exit
    #[arg(long, conflicts_with = "scenarios")]
    list: bool,
    /// Scenarios to run (default: all)
    #[arg(value_name = "SCENARIO", value_parser = parse_scenario)]
    scenarios: Vec<&'static Scenario>,
}

fn parse_scenario(name: &str) -> Result<&'static Scenario, String> {
    scenarios::find(name).ok_or_else(|| {
        let known = SCENARIOS
            .iter()
            .map(|scenario| scenario.name)
            .collect::<Vec<_>>()
            .join(", ");
        format!("unknown scenario (known: {known})")
    })
}

/// Fall back to defaults on a broken config file. The reason is returned so it
/// can be logged once the subscriber is up.
fn load_config(
    loaded: Result<Option<HandoffConfig>, ConfigError>,
) -> (HandoffConfig, Vec<String>) {
    match loaded {
        Ok(config) => (config.unwrap_or_default(), Vec::new()),
        Err(err) => (
            HandoffConfig::default(),
            vec![format!("{err}; using defaults")],
        ),
    }
}

fn init_tracing(config_filter: Option<&str>, init_warnings: Vec<String>) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config_filter.unwrap_or(DEFAULT_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // stdout carries the report; logs go to stderr.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .init();

    for warning in init_warnings {
        tracing::warn!("{warning}");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (config, init_warnings) = load_config(HandoffConfig::load());
    init_tracing(config.log_filter(), init_warnings);

    if cli.list {
        for scenario in SCENARIOS {
            println!("{:<20} {}", scenario.name, scenario.summary);
        }
        return ExitCode::SUCCESS;
    }

    let selected: Vec<&Scenario> = if cli.scenarios.is_empty() {
        SCENARIOS.iter().collect()
    } else {
        cli.scenarios
    };

    if run(&Auditor::from_config(&config), &selected) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Run `selected` and print the report. True if every outcome matched.
fn run(auditor: &Auditor, selected: &[&Scenario]) -> bool {
    tracing::info!(checks = auditor.checks().as_str(), "Running scenarios");

    let mut all_matched = true;
    for scenario in selected {
        let result = scenario.run(auditor);
        let observed = Outcome::of(&result);
        let expected = scenario.expected(auditor.checks());
        let verdict = if observed == expected { "ok" } else { "MISMATCH" };
        all_matched &= observed == expected;

        let detail = match &result {
            Ok(value) if value.is_empty() => String::new(),
            Ok(value) => format!("=> {value}"),
            Err(err) => format!("=> {err}"),
        };
        println!(
            "{:<20} {:<8} {:<18} {}",
            scenario.name,
            verdict,
            observed.as_str(),
            detail
        );
    }
    all_matched
}
