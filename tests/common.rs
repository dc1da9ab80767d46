#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use rusqlite::params;
use serde_json::{Value, json};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use waypoint_adjuster::elevation::{ElevationSample, ElevationSource};
use waypoint_adjuster::errors::ElevationError;

pub const MISSION_TABLE: &str = "dji_pilot_dji_groundstation_controller_DataMgr_DJIWPCollectionItem";

pub fn wpa() -> Command {
    let mut cmd = cargo_bin_cmd!("waypoint-adjuster");
    for var in ["http_proxy", "HTTP_PROXY", "all_proxy", "ALL_PROXY"] {
        cmd.env_remove(var);
    }
    cmd
}

// ---------------------------------------------------------------------------
// Database fixtures
// ---------------------------------------------------------------------------

/// Create a DJI-like mission table with a couple of extra columns.
pub fn create_mission_db(path: &Path, missions: &[(i64, &str, String)]) {
    let conn = rusqlite::Connection::open(path).expect("open db");
    conn.execute_batch(&format!(
        "CREATE TABLE {MISSION_TABLE} (
            id            INTEGER PRIMARY KEY,
            location      TEXT,
            pointsJsonStr TEXT,
            createdTime   INTEGER,
            speed         REAL
        );"
    ))
    .expect("create table");

    for (id, location, points) in missions {
        conn.execute(
            &format!(
                "INSERT INTO {MISSION_TABLE} (id, location, pointsJsonStr, createdTime, speed)
                 VALUES (?1, ?2, ?3, ?4, ?5)"
            ),
            params![id, location, points, 1_500_000_000 + id, 7.5],
        )
        .expect("insert mission");
    }
}

pub fn read_points(path: &Path, id: i64) -> Value {
    let conn = rusqlite::Connection::open(path).expect("open db");
    let raw: String = conn
        .query_row(
            &format!("SELECT pointsJsonStr FROM {MISSION_TABLE} WHERE id = ?1"),
            [id],
            |row| row.get(0),
        )
        .expect("read points");
    serde_json::from_str(&raw).expect("points json")
}

pub fn read_heights(path: &Path, id: i64) -> Vec<Value> {
    read_points(path, id)["points"]
        .as_array()
        .expect("points array")
        .iter()
        .map(|p| p["height"].clone())
        .collect()
}

/// Two waypoints near San Francisco, with fields this tool does not know about.
pub fn two_point_mission() -> String {
    json!({
        "points": [
            {
                "lat": 37.0, "lng": -122.0, "height": 30.0,
                "turnMode": 1, "actionRepeatTimes": 1,
                "actions": [{"actionType": 1, "param": 0}]
            },
            {
                "lat": 37.001, "lng": -122.001, "height": 30.0,
                "turnMode": 0, "gimbalPitch": -45.5
            }
        ],
        "headingMode": 2,
        "finishedAction": "GO_HOME"
    })
    .to_string()
}

// ---------------------------------------------------------------------------
// Elevation fakes
// ---------------------------------------------------------------------------

/// Elevation source answering from a fixed script, in call order.
pub struct ScriptedElevation {
    replies: RefCell<VecDeque<Result<ElevationSample, ElevationError>>>,
    pub calls: RefCell<Vec<(f64, f64)>>,
}

impl ScriptedElevation {
    pub fn new(replies: Vec<Result<ElevationSample, ElevationError>>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl ElevationSource for ScriptedElevation {
    fn lookup(&self, lat: f64, lng: f64) -> Result<ElevationSample, ElevationError> {
        self.calls.borrow_mut().push((lat, lng));
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or(Err(ElevationError::NoResults))
    }
}

pub fn ok(elevation_m: i64) -> Result<ElevationSample, ElevationError> {
    Ok(ElevationSample {
        elevation_m,
        resolution_m: 4.77,
    })
}

pub fn zero_results() -> Result<ElevationSample, ElevationError> {
    Err(ElevationError::Status {
        status: "ZERO_RESULTS".to_string(),
        message: "ZERO_RESULTS".to_string(),
    })
}

pub fn ok_body(elevation: f64, resolution: f64) -> String {
    json!({
        "results": [{
            "elevation": elevation,
            "location": {"lat": 0.0, "lng": 0.0},
            "resolution": resolution
        }],
        "status": "OK"
    })
    .to_string()
}

pub fn error_body(status: &str, message: &str) -> String {
    json!({"results": [], "status": status, "error_message": message}).to_string()
}

/// Minimal HTTP responder standing in for the Elevation API.
/// Bodies are keyed by the decoded `locations` parameter ("37,-122").
/// Unknown locations get a ZERO_RESULTS body.
pub struct ElevationServer {
    pub url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl ElevationServer {
    pub fn start(bodies: HashMap<String, String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind elevation server");
        let addr = listener.local_addr().expect("local addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let target = read_request_target(&stream);
                seen.lock().expect("requests lock").push(target.clone());

                let body = bodies
                    .get(&location_param(&target))
                    .cloned()
                    .unwrap_or_else(|| json!({"results": [], "status": "ZERO_RESULTS"}).to_string());
                let reply = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(reply.as_bytes());
                let _ = stream.flush();
            }
        });

        Self {
            url: format!("http://{}/maps/api/elevation/json", addr),
            requests,
        }
    }

    /// Request targets (path + query) in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("requests lock").clone()
    }
}

fn read_request_target(stream: &TcpStream) -> String {
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
    let mut request_line = String::new();
    reader.read_line(&mut request_line).expect("request line");

    // Drain headers; GET requests carry no body.
    let mut line = String::new();
    while reader.read_line(&mut line).map(|n| n > 0).unwrap_or(false) {
        if line == "\r\n" || line == "\n" {
            break;
        }
        line.clear();
    }

    request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or_default()
        .to_string()
}

pub fn query_param(target: &str, name: &str) -> Option<String> {
    let query = target.split_once('?')?.1;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.replace("%2C", ",").replace("%2c", ","))
}

fn location_param(target: &str) -> String {
    query_param(target, "locations").unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Config fixtures
// ---------------------------------------------------------------------------

/// Write a config file pointing at `endpoint`. `extra` is appended verbatim.
pub fn write_config(dir: &Path, endpoint: &str, extra: &str) -> PathBuf {
    let path = dir.join("waypoint-adjuster.conf");
    let yaml = format!(
        "api_key: test-key-123\n\
         altitude_m: 50\n\
         warn_resolution_m: 10\n\
         elevation_endpoint_url: \"{endpoint}\"\n\
         request_timeout_s: 5\n\
         {extra}"
    );
    fs::write(&path, yaml).expect("write config");
    path
}
