use crate::cli::parser::Cli;
use crate::config::Config;
use crate::core::adjust::{RunSummary, adjust_database};
use crate::db::queries::MissionTable;
use crate::elevation::ElevationClient;
use crate::errors::AppResult;
use crate::mount::{FsMountProbe, MountDir, MountOptions, MtpMount};
use crate::utils::path::{expand_tilde, under_root};

/// Default action: mount the device, adjust its missions, unmount.
pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<RunSummary> {
    let client = ElevationClient::new(cfg)?;
    let table = MissionTable::from_config(cfg)?;

    // Database already reachable (manual mount, copy, tests): no MTP involved.
    if let Some(db) = &cli.db {
        return adjust_database(&expand_tilde(db), &client, &table, cfg.altitude_m, cli.dry_run);
    }

    let mount_dir = MountDir::create()?;
    let mount = MtpMount::acquire(mount_dir.path(), &MountOptions::from_config(cfg), FsMountProbe)?;

    let db_path = under_root(mount.path(), &cfg.database_path);
    let result = adjust_database(&db_path, &client, &table, cfg.altitude_m, cli.dry_run);

    mount.release();
    let removed = mount_dir.remove();

    let summary = result?;
    removed?;
    Ok(summary)
}
