//! Waypoint altitude adjustment.
//!
//! For every mission the first waypoint whose elevation resolves becomes the
//! home reference. Each resolved waypoint then gets
//! `height = elevation - home_elevation + target_altitude`, so the drone
//! keeps a constant height above ground instead of a constant altitude above
//! the take-off point. Waypoints whose lookup fails keep their stored height.
//!
//! Re-running on already adjusted data is not idempotent: heights are
//! recomputed against whatever the service returns for the new home point.

use crate::db::pool::DbPool;
use crate::db::queries::{self, MissionTable};
use crate::elevation::ElevationSource;
use crate::errors::{AppError, AppResult};
use crate::models::mission::{MissionRecord, PointsDocument};
use std::path::Path;
use tracing::{error, info};

/// Outcome of adjusting one mission's waypoints.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MissionReport {
    pub home_elevation_m: Option<i64>,
    pub adjusted: usize,
    pub skipped: usize,
}

/// Totals over a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub missions: usize,
    pub points_adjusted: usize,
    pub points_skipped: usize,
}

impl RunSummary {
    fn record(&mut self, report: &MissionReport) {
        self.missions += 1;
        self.points_adjusted += report.adjusted;
        self.points_skipped += report.skipped;
    }
}

/// Height above the home point that puts a waypoint `target_altitude_m`
/// above the ground at its own location.
pub fn relative_height(elevation_m: i64, home_elevation_m: i64, target_altitude_m: f64) -> f64 {
    (elevation_m - home_elevation_m) as f64 + target_altitude_m
}

pub struct WaypointAdjuster<'a, S: ElevationSource> {
    source: &'a S,
    target_altitude_m: f64,
    dry_run: bool,
}

impl<'a, S: ElevationSource> WaypointAdjuster<'a, S> {
    pub fn new(source: &'a S, target_altitude_m: f64) -> Self {
        Self {
            source,
            target_altitude_m,
            dry_run: false,
        }
    }

    /// Compute and log heights without writing anything back.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Rewrite the height of every waypoint whose elevation resolves.
    pub fn adjust_points(&self, doc: &mut PointsDocument) -> MissionReport {
        let mut report = MissionReport::default();

        for (idx, point) in doc.points.iter_mut().enumerate() {
            info!(
                waypoint = idx + 1,
                lat = point.lat,
                lng = point.lng,
                "Looking up waypoint elevation"
            );

            let sample = match self.source.lookup(point.lat, point.lng) {
                Ok(sample) => sample,
                Err(e) => {
                    error!("{}", e);
                    report.skipped += 1;
                    continue;
                }
            };

            let home_m = *report.home_elevation_m.get_or_insert(sample.elevation_m);
            let new_height = relative_height(sample.elevation_m, home_m, self.target_altitude_m);

            info!(
                elevation_m = sample.elevation_m,
                resolution_m = sample.resolution_m,
                "Adjusting altitude. new_altitude_m={:04}",
                new_height
            );
            point.set_height(new_height);
            report.adjusted += 1;
        }

        report
    }

    /// Parse a mission's points, adjust them, and return the new JSON.
    pub fn adjust_mission(&self, mission: &MissionRecord) -> AppResult<(String, MissionReport)> {
        let mut doc =
            PointsDocument::parse(&mission.points_json).map_err(|source| AppError::InvalidMission {
                id: mission.id,
                location: mission.location.clone(),
                source,
            })?;

        let report = self.adjust_points(&mut doc);
        Ok((doc.to_json()?, report))
    }

    /// Adjust every mission in the table, committing after each one.
    pub fn run(&self, pool: &mut DbPool, table: &MissionTable) -> AppResult<RunSummary> {
        let missions = queries::load_missions(&pool.conn, table)?;
        let mut summary = RunSummary::default();

        for mission in &missions {
            info!("{}", "-".repeat(80));
            info!("Mission: {} (id={})", mission.location, mission.id);

            let (points_json, report) = self.adjust_mission(mission)?;
            if !self.dry_run {
                queries::update_points(pool, table, mission.id, &points_json)?;
            }
            summary.record(&report);
        }

        Ok(summary)
    }
}

/// Open the database at `path`, adjust every mission and close it.
pub fn adjust_database<S: ElevationSource>(
    path: &Path,
    source: &S,
    table: &MissionTable,
    target_altitude_m: f64,
    dry_run: bool,
) -> AppResult<RunSummary> {
    info!("Opening database. path=\"{}\"", path.display());
    let mut pool = DbPool::open(path)?;

    let summary = WaypointAdjuster::new(source, target_altitude_m)
        .dry_run(dry_run)
        .run(&mut pool, table)?;
    pool.finish()?;

    info!("{}", "-".repeat(80));
    info!(
        "Done. missions={} adjusted={} skipped={}{}",
        summary.missions,
        summary.points_adjusted,
        summary.points_skipped,
        if dry_run { " (dry run, nothing written)" } else { "" }
    );
    Ok(summary)
}
