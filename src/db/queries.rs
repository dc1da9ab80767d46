use crate::config::Config;
use crate::db::models::Record;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::mission::MissionRecord;
use rusqlite::{Connection, params};

/// Where missions live: table name and the column holding the points JSON.
/// Both are validated identifiers, already quoted for interpolation.
#[derive(Debug, Clone)]
pub struct MissionTable {
    table: String,
    points_column: String,
    points_column_name: String,
}

impl MissionTable {
    pub fn new(table: &str, points_column: &str) -> AppResult<Self> {
        Ok(Self {
            table: quote_identifier(table)?,
            points_column: quote_identifier(points_column)?,
            points_column_name: points_column.to_string(),
        })
    }

    pub fn from_config(cfg: &Config) -> AppResult<Self> {
        Self::new(&cfg.mission_table, &cfg.points_column)
    }

    pub fn points_column(&self) -> &str {
        &self.points_column_name
    }
}

/// Accept plain `[A-Za-z_][A-Za-z0-9_]*` names only and wrap them in quotes.
pub fn quote_identifier(name: &str) -> AppResult<String> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if !valid {
        return Err(AppError::InvalidIdentifier(name.to_string()));
    }
    Ok(format!("\"{}\"", name))
}

/// Run a read-only statement and return every row keyed by column name.
pub fn query(conn: &Connection, sql: &str) -> AppResult<Vec<Record>> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let rows = stmt.query_map([], |row| Record::from_row(row, &columns))?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Load every stored mission, in id order.
pub fn load_missions(conn: &Connection, table: &MissionTable) -> AppResult<Vec<MissionRecord>> {
    let sql = format!("SELECT * FROM {} ORDER BY id", table.table);
    query(conn, &sql)?
        .iter()
        .map(|record| MissionRecord::from_record(record, table.points_column()))
        .collect()
}

/// Rewrite the points JSON of one mission and commit immediately.
pub fn update_points(
    pool: &mut DbPool,
    table: &MissionTable,
    id: i64,
    points_json: &str,
) -> AppResult<usize> {
    let sql = format!(
        "UPDATE {} SET {} = ?1 WHERE id = ?2",
        table.table, table.points_column
    );
    pool.execute_committed(&sql, params![points_json, id])
}
