//! Single-point client for the Google Elevation API.

use crate::config::Config;
use crate::errors::{AppResult, ElevationError};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::warn;

/// Ground elevation at one location, rounded to whole meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevationSample {
    pub elevation_m: i64,
    /// Distance between the data points the elevation was interpolated from
    pub resolution_m: f64,
}

/// Anything that can answer an elevation query for one coordinate.
pub trait ElevationSource {
    fn lookup(&self, lat: f64, lng: f64) -> Result<ElevationSample, ElevationError>;
}

/// Response body of the elevation endpoint.
#[derive(Debug, Deserialize)]
pub struct ElevationResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<ElevationResult>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ElevationResult {
    pub elevation: f64,
    #[serde(default)]
    pub resolution: f64,
}

impl ElevationResponse {
    /// Turn a decoded body into a sample, or the reason there is none.
    pub fn into_sample(self) -> Result<ElevationSample, ElevationError> {
        if self.status != "OK" {
            let message = self.error_message.unwrap_or_else(|| self.status.clone());
            return Err(ElevationError::Status {
                status: self.status,
                message,
            });
        }
        let first = self
            .results
            .into_iter()
            .next()
            .ok_or(ElevationError::NoResults)?;

        Ok(ElevationSample {
            elevation_m: round_to_meter(first.elevation),
            resolution_m: first.resolution,
        })
    }
}

/// Round to the nearest whole meter, ties to even.
pub fn round_to_meter(elevation: f64) -> i64 {
    elevation.round_ties_even() as i64
}

/// Log a warning when the sample is less precise than `threshold_m`.
/// Returns whether the warning fired.
pub fn warn_if_coarse(sample: &ElevationSample, threshold_m: f64) -> bool {
    if sample.resolution_m > threshold_m {
        warn!(
            "Elevation has low resolution. resolution_m={:.2}",
            sample.resolution_m
        );
        return true;
    }
    false
}

pub struct ElevationClient {
    http: Client,
    endpoint: String,
    api_key: String,
    warn_resolution_m: f64,
}

impl ElevationClient {
    pub fn new(cfg: &Config) -> AppResult<Self> {
        let http = Client::builder().timeout(cfg.request_timeout()).build()?;
        Ok(Self {
            http,
            endpoint: cfg.elevation_endpoint_url.clone(),
            api_key: cfg.api_key.clone(),
            warn_resolution_m: cfg.warn_resolution_m,
        })
    }
}

impl ElevationSource for ElevationClient {
    fn lookup(&self, lat: f64, lng: f64) -> Result<ElevationSample, ElevationError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("locations", format!("{},{}", lat, lng)),
                ("key", self.api_key.clone()),
            ])
            .send()?;

        let http_status = response.status();
        let body: ElevationResponse = response
            .json()
            .map_err(|e| ElevationError::Decode(format!("http_status={} {}", http_status, e)))?;

        let sample = body.into_sample()?;
        warn_if_coarse(&sample, self.warn_resolution_m);
        Ok(sample)
    }
}
