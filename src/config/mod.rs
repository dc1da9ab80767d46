use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Value written by `config --init`; a config still carrying it is rejected.
pub const API_KEY_PLACEHOLDER: &str = "<insert your Google Elevation API key here>";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Google Elevation API key
    pub api_key: String,
    /// Meters above ground at which every waypoint should end up
    #[serde(default = "default_altitude")]
    pub altitude_m: f64,
    /// Warn when the reported elevation uncertainty exceeds this many meters
    #[serde(default = "default_warn_resolution", alias = "warn_resolution")]
    pub warn_resolution_m: f64,
    /// DJI Go database, relative to the device mount root
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_mission_table")]
    pub mission_table: String,
    #[serde(default = "default_points_column")]
    pub points_column: String,
    #[serde(default = "default_mount_cmd")]
    pub mount_cmd: Vec<String>,
    #[serde(default = "default_umount_cmd")]
    pub umount_cmd: Vec<String>,
    #[serde(default = "default_endpoint_url")]
    pub elevation_endpoint_url: String,
    #[serde(default = "default_attempts")]
    pub mount_attempts: u32,
    #[serde(default = "default_attempts")]
    pub umount_attempts: u32,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_request_timeout_s")]
    pub request_timeout_s: u64,
}

fn default_altitude() -> f64 {
    100.0
}
fn default_warn_resolution() -> f64 {
    10.0
}
fn default_database_path() -> String {
    // The version numbers in the file name follow the installed DJI Go Mod release
    "Internal storage/DJI/dji_mod_4_1_15.db".to_string()
}
fn default_mission_table() -> String {
    "dji_pilot_dji_groundstation_controller_DataMgr_DJIWPCollectionItem".to_string()
}
fn default_points_column() -> String {
    "pointsJsonStr".to_string()
}
fn default_mount_cmd() -> Vec<String> {
    vec!["go-mtpfs".to_string(), "-allow-other".to_string()]
}
fn default_umount_cmd() -> Vec<String> {
    vec!["fusermount".to_string(), "-u".to_string()]
}
fn default_endpoint_url() -> String {
    "https://maps.googleapis.com/maps/api/elevation/json".to_string()
}
fn default_attempts() -> u32 {
    10
}
fn default_poll_interval_ms() -> u64 {
    1000
}
fn default_request_timeout_s() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: API_KEY_PLACEHOLDER.to_string(),
            altitude_m: default_altitude(),
            warn_resolution_m: default_warn_resolution(),
            database_path: default_database_path(),
            mission_table: default_mission_table(),
            points_column: default_points_column(),
            mount_cmd: default_mount_cmd(),
            umount_cmd: default_umount_cmd(),
            elevation_endpoint_url: default_endpoint_url(),
            mount_attempts: default_attempts(),
            umount_attempts: default_attempts(),
            poll_interval_ms: default_poll_interval_ms(),
            request_timeout_s: default_request_timeout_s(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".waypoint-adjuster")
    }

    /// Return the full path of the default config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("waypoint-adjuster.conf")
    }

    /// Load and validate the configuration stored at `path`.
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!(
                "cannot read {}: {} (run `waypoint-adjuster config --init` to create one)",
                path.display(),
                e
            ))
        })?;
        let cfg: Config = serde_yaml::from_str(&content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values that would make the run fail later in a confusing way.
    pub fn validate(&self) -> AppResult<()> {
        let key = self.api_key.trim();
        if key.is_empty() || key == API_KEY_PLACEHOLDER {
            return Err(AppError::Config(
                "api_key is not set; the Elevation service needs an API key".into(),
            ));
        }
        if !self.altitude_m.is_finite() {
            return Err(AppError::Config("altitude_m must be a finite number".into()));
        }
        if self.mount_attempts == 0 {
            return Err(AppError::Config("mount_attempts must be at least 1".into()));
        }
        if self.umount_attempts == 0 {
            return Err(AppError::Config("umount_attempts must be at least 1".into()));
        }
        if self.mount_cmd.is_empty() {
            return Err(AppError::Config("mount_cmd must not be empty".into()));
        }
        if self.umount_cmd.is_empty() {
            return Err(AppError::Config("umount_cmd must not be empty".into()));
        }
        if self.elevation_endpoint_url.trim().is_empty() {
            return Err(AppError::Config(
                "elevation_endpoint_url must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_s.max(1))
    }

    /// Write a sample configuration file. Never overwrites an existing one.
    pub fn init_file(path: &Path) -> AppResult<()> {
        if path.exists() {
            return Err(AppError::Config(format!(
                "{} already exists, refusing to overwrite",
                path.display()
            )));
        }
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let yaml = serde_yaml::to_string(&Config::default())?;
        let mut file = fs::File::create(path)?;
        file.write_all(yaml.as_bytes())?;
        Ok(())
    }
}
