#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line adapter for Waypoint Defence.
//!
//! Loads a scenario, replays a scripted input sequence through the default
//! screens and prints a summary of the run.

mod scenario;
mod script;
mod session;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use waypoint_defence_core::DEFAULT_TICK_RATE_HZ;
use waypoint_defence_world::query;

use crate::{
    scenario::Scenario,
    script::InputScript,
    session::{Session, SessionOptions},
};

#[derive(Parser, Debug)]
#[command(name = "waypoint-defence", about = "Headless Waypoint Defence runner")]
struct Args {
    /// Scenario TOML file; the built-in campaign is used when omitted.
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Input script of `<tick> <event>` lines; the built-in opening is used
    /// when omitted.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Maximum number of fixed simulation steps.
    #[arg(long, default_value_t = u64::from(DEFAULT_TICK_RATE_HZ) * 120)]
    ticks: u64,

    /// Enables fast-forward once the run starts.
    #[arg(long)]
    fast_forward: bool,

    /// Paces the loop at the configured tick rate instead of running flat out.
    #[arg(long)]
    realtime: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::builtin()?,
    };
    let script = match &args.input {
        Some(path) => InputScript::load(path)?,
        None => InputScript::builtin()?,
    };

    let state = scenario.into_game_state()?;
    println!("{}", query::welcome_banner(&state));
    tracing::info!(
        levels = state.level_count(),
        ticks = args.ticks,
        fast_forward = args.fast_forward,
        "starting session"
    );

    let options = SessionOptions {
        fast_forward: args.fast_forward,
        realtime: args.realtime,
    };
    let summary = Session::new(state, script, options).run(args.ticks);
    println!("{summary}");
    Ok(())
}
