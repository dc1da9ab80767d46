use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use std::path::Path;

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, path: &Path) -> AppResult<()> {
    let Commands::Config { print_config, init } = cmd;

    if *init {
        Config::init_file(path)?;
        success(format!("Config file: {}", path.display()));
        info("Edit api_key (and database_path if your DJI Go version differs) before running.");
        return Ok(());
    }

    if *print_config {
        let cfg = Config::load_from(path)?;
        print!("{}", serde_yaml::to_string(&cfg)?);
        return Ok(());
    }

    info(format!("Config file: {}", path.display()));
    Ok(())
}
