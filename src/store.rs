//! Append-only audit log of prediction transactions.
//!
//! Every call opens its own connection and drops it before returning, so no
//! connection outlives a single append or query.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};

use crate::error::StoreError;
use crate::models::FeatureVector;

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS predictions (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    features      TEXT NOT NULL,
    prediction    REAL NOT NULL,
    risk_category TEXT NOT NULL,
    advice        TEXT NOT NULL
);
";

/// One persisted row.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRecord {
    pub id: i64,
    pub features: String,
    pub prediction: f64,
    pub risk_category: String,
    pub advice: String,
}

#[derive(Debug, Clone)]
pub struct PredictionStore {
    path: PathBuf,
}

impl PredictionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.path)?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(conn)
    }

    /// Creates the table if needed. Safe to call on every startup.
    pub fn init(&self) -> Result<(), StoreError> {
        self.connect().map(drop)
    }

    /// Inserts one row and returns its id.
    pub fn append(
        &self,
        features: &FeatureVector,
        pm25: f64,
        risk_category: &str,
        advice: &str,
    ) -> Result<i64, StoreError> {
        let features = serde_json::to_string(features)?;
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO predictions (features, prediction, risk_category, advice)
             VALUES (?1, ?2, ?3, ?4)",
            params![features, pm25, risk_category, advice],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Most recent rows first.
    pub fn recent(&self, limit: usize) -> Result<Vec<PredictionRecord>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, features, prediction, risk_category, advice
             FROM predictions ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(PredictionRecord {
                id: row.get(0)?,
                features: row.get(1)?,
                prediction: row.get(2)?,
                risk_category: row.get(3)?,
                advice: row.get(4)?,
            })
        })?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FeatureVector {
        FeatureVector([25.0, 30.0, 18.0, 1012.0, 60.0, 4.0, 3.0, 7.0])
    }

    #[test]
    fn init_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = PredictionStore::new(dir.path().join("audit.db"));
        store.init().unwrap();
        store.init().unwrap();
        assert!(store.recent(10).unwrap().is_empty());
    }

    #[test]
    fn append_assigns_increasing_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = PredictionStore::new(dir.path().join("audit.db"));

        let first = store.append(&sample(), 40.0, "Moderate", "a").unwrap();
        let second = store.append(&sample(), 300.0, "Hazardous", "b").unwrap();
        assert!(second > first);

        let rows = store.recent(10).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, second);
        assert_eq!(rows[0].risk_category, "Hazardous");
        assert_eq!(rows[1].prediction, 40.0);
        assert_eq!(rows[1].advice, "a");
    }

    #[test]
    fn features_are_stored_as_named_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = PredictionStore::new(dir.path().join("audit.db"));
        store.append(&sample(), 12.0, "Good", "ok").unwrap();

        let row = &store.recent(1).unwrap()[0];
        let parsed: serde_json::Value = serde_json::from_str(&row.features).unwrap();
        assert_eq!(parsed["sea_level_pressure"], 1012.0);
        assert_eq!(parsed["max_wind_gust"], 7.0);
    }

    #[test]
    fn unreachable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = PredictionStore::new(dir.path().join("missing").join("audit.db"));
        assert!(matches!(
            store.append(&sample(), 1.0, "Good", "ok"),
            Err(StoreError::Sqlite(_))
        ));
    }
}
