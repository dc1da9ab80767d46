//! Unified application error type.
//! Every fatal condition (mount, db, config, mission parsing) is an AppError.
//! Elevation lookups have their own ElevationError because a failed lookup
//! only skips one waypoint and never aborts the run.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Mount
    // ---------------------------
    #[error("Unable to start MTP mount. command={command:?} error=\"{source}\"")]
    MountSpawn {
        command: Vec<String>,
        #[source]
        source: io::Error,
    },

    #[error("MTP mount timed out after {attempts} attempts. path=\"{}\"", path.display())]
    MountTimeout { path: PathBuf, attempts: u32 },

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Unable to open database. error=\"{error}\" path=\"{}\"", path.display())]
    DatabaseOpen { error: String, path: PathBuf },

    #[error("Invalid SQL identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("Missing or invalid column '{column}' in mission row")]
    MissingColumn { column: String },

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid points collection in mission id={id} location=\"{location}\": {source}")]
    InvalidMission {
        id: i64,
        location: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ---------------------------
    // Network
    // ---------------------------
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),
}

pub type AppResult<T> = Result<T, AppError>;

/// Reason a single elevation lookup failed. The waypoint is skipped.
#[derive(Error, Debug)]
pub enum ElevationError {
    #[error("Unable to query elevation. status={status} error=\"{message}\"")]
    Status { status: String, message: String },

    #[error("Unable to query elevation. error=\"{0}\"")]
    Transport(#[from] reqwest::Error),

    #[error("Unable to decode elevation response. error=\"{0}\"")]
    Decode(String),

    #[error("Elevation service returned no results")]
    NoResults,
}
