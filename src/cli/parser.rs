use clap::{Parser, Subcommand};

/// Command-line interface definition for waypoint-adjuster.
/// Without a subcommand the tool mounts the device and adjusts every mission.
#[derive(Parser)]
#[command(
    name = "waypoint-adjuster",
    version = env!("CARGO_PKG_VERSION"),
    about = "Rewrite DJI Go waypoint heights so every waypoint flies at a fixed height above ground",
    long_about = None
)]
pub struct Cli {
    /// Use this configuration file instead of ~/.waypoint-adjuster/waypoint-adjuster.conf
    #[arg(global = true, long = "config", value_name = "FILE")]
    pub config: Option<String>,

    /// Adjust this database file directly instead of mounting the device
    #[arg(long = "db", value_name = "FILE")]
    pub db: Option<String>,

    /// Look up elevations and log new heights without writing them
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Prefix log lines with a timestamp
    #[arg(global = true, long = "timestamps")]
    pub timestamps: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show or create the configuration file
    Config {
        #[arg(long = "print", help = "Print the effective configuration")]
        print_config: bool,

        #[arg(
            long = "init",
            conflicts_with = "print_config",
            help = "Write a sample configuration file (never overwrites)"
        )]
        init: bool,
    },
}
