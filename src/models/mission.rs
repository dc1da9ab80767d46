use crate::db::models::Record;
use crate::errors::AppResult;
use serde_json::{Map, Value};

/// One stored mission row, reduced to the fields this tool reads.
/// Other columns are never written back, so they survive untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionRecord {
    pub id: i64,
    pub location: String,
    pub points_json: String,
}

impl MissionRecord {
    pub fn from_record(record: &Record, points_column: &str) -> AppResult<Self> {
        Ok(Self {
            id: record.integer("id")?,
            location: record.text("location")?.to_string(),
            points_json: record.text(points_column)?.to_string(),
        })
    }
}

/// The JSON document stored in the points column: `{"points": [...], ...}`.
///
/// Kept as raw JSON values: numbers keep their original text and key order
/// is preserved, so only the `height` of adjusted waypoints ever changes.
#[derive(Debug, Clone, PartialEq)]
pub struct PointsDocument {
    pub points: Vec<Waypoint>,
    root: Map<String, Value>,
}

/// A single waypoint: coordinates read once, every stored field kept as is.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    pub lat: f64,
    pub lng: f64,
    fields: Map<String, Value>,
}

impl Waypoint {
    fn from_value(value: Value) -> serde_json::Result<Self> {
        let Value::Object(fields) = value else {
            return Err(invalid("waypoint is not a JSON object".to_string()));
        };
        Ok(Self {
            lat: coordinate(&fields, "lat")?,
            lng: coordinate(&fields, "lng")?,
            fields,
        })
    }

    /// Stored height; None when absent, null or not a number.
    pub fn height(&self) -> Option<f64> {
        self.fields.get("height").and_then(Value::as_f64)
    }

    /// Raw stored height value, exactly as read.
    pub fn height_value(&self) -> Option<&Value> {
        self.fields.get("height")
    }

    pub fn set_height(&mut self, height_m: f64) {
        self.fields.insert("height".to_string(), Value::from(height_m));
    }
}

impl PointsDocument {
    pub fn parse(json: &str) -> serde_json::Result<Self> {
        let mut root: Map<String, Value> = serde_json::from_str(json)?;

        // Take the array in place so "points" keeps its position in the object.
        let items = match root.get_mut("points") {
            Some(Value::Array(items)) => std::mem::take(items),
            _ => return Err(invalid("missing `points` array".to_string())),
        };
        let points = items
            .into_iter()
            .map(Waypoint::from_value)
            .collect::<serde_json::Result<Vec<_>>>()?;

        Ok(Self { points, root })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut root = self.root.clone();
        let points = self
            .points
            .iter()
            .map(|p| Value::Object(p.fields.clone()))
            .collect();
        root.insert("points".to_string(), Value::Array(points));
        serde_json::to_string(&root)
    }
}

fn coordinate(fields: &Map<String, Value>, key: &str) -> serde_json::Result<f64> {
    fields
        .get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| invalid(format!("missing or non-numeric `{}`", key)))
}

fn invalid(msg: String) -> serde_json::Error {
    <serde_json::Error as serde::de::Error>::custom(msg)
}
