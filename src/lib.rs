//! waypoint-adjuster library root.
//! Exposes the CLI parser, the high-level run() function and the components
//! it drives: mount manager, database accessor, elevation client, adjuster.

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod elevation;
pub mod errors;
pub mod models;
pub mod mount;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;
use utils::path::expand_tilde;

/// Central command dispatcher
pub fn dispatch(cli: &Cli) -> AppResult<()> {
    let config_path = cli
        .config
        .as_deref()
        .map(expand_tilde)
        .unwrap_or_else(Config::config_file);

    match &cli.command {
        Some(cmd @ Commands::Config { .. }) => cli::commands::config::handle(cmd, &config_path),
        None => {
            let cfg = Config::load_from(&config_path)?;
            cli::commands::adjust::handle(cli, &cfg).map(|_| ())
        }
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();
    ui::logging::init(cli.timestamps);
    dispatch(&cli)
}
