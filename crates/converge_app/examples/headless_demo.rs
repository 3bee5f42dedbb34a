//! Headless Stage Demo
//!
//! Plays the stock animation against an in-memory target and prints the
//! JSON run report. Pass a scenario file to run your own steps, a stage
//! TOML file to change the scene and a relative path to also save the report.
//!
//! Run with: cargo run -p converge_app --example headless_demo -- [scenario.json] [stage.toml] [report.json]

use anyhow::Result;
use converge_app::headless_runner::run_loaded_scenario;
use converge_app::headless_runtime::HeadlessRunConfig;
use converge_app::headless_scenario::HeadlessScenario;
use converge_app::StageConfig;
use std::path::Path;
use tracing_subscriber::EnvFilter;

const DEFAULT_SCENARIO: &str = r#"{"steps": [
    {"type": "assert_state", "state": "intro"},
    {"type": "wait", "ms": 4500},
    {"type": "assert_state", "state": "looping"},
    {"type": "wait", "ms": 12500},
    {"type": "resize", "width": 1200, "height": 900},
    {"type": "assert_position", "id": "center-logo", "x": 600, "y": 630},
    {"type": "wait", "ms": 1000},
    {"type": "detach"},
    {"type": "assert_state", "state": "cancelled"}
]}"#;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let mut args = std::env::args().skip(1);
    let scenario = match args.next() {
        Some(path) => HeadlessScenario::from_path(Path::new(&path))?,
        None => HeadlessScenario::from_json(DEFAULT_SCENARIO)?,
    };
    let stage_config = match args.next() {
        Some(path) => StageConfig::from_path(Path::new(&path))?,
        None => StageConfig::default(),
    };

    let outcome = run_loaded_scenario(&scenario, HeadlessRunConfig::default(), stage_config)?;
    tracing::info!(failed = outcome.is_failed(), "scenario finished");
    outcome.report().write_to_writer(&mut std::io::stdout())?;
    if let Some(path) = args.next() {
        outcome.report().write_to_path(Path::new(&path))?;
        tracing::info!(%path, "report written");
    }

    if outcome.is_failed() {
        std::process::exit(1);
    }
    Ok(())
}
