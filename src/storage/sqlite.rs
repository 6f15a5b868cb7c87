//! SQLite access layer
//!
//! One `Database` handle owns the connection; it is created at the
//! start of a unit of work and released on drop, on every exit path.
//! Inserts are upserts: the uniqueness constraint of each table acts as
//! the idempotency key, and the resolved surrogate key is returned
//! whether the row was created or already present.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{Local, NaiveDateTime, Timelike};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, ToSql, params, params_from_iter};

use super::schema::{self, Entity};
use crate::model::{
    AnalysisFeature, AnalysisInput, AnalysisRun, AnalysisRunInfo, Condition, DataInfo,
    DataWithInfo, Dut, FeatureInfo, FeatureValue, MeasurementData, Quantity, Session,
    SessionFullInfo,
};
use crate::{Error, Result};

const SELECT_SESSION: &str = "SELECT session_id, dut_id, session_name, measurement_datetime, \
     operator, system_version, notes FROM measurement_sessions";
const SELECT_DATA: &str =
    "SELECT data_id, session_id, data_type, file_path, created_time FROM measurement_data";
const SELECT_RUN: &str = "SELECT analysis_id, session_id, analysis_type, analysis_index, \
     created_time FROM analysis_runs";

/// SQLite-backed store for measurement metadata
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| {
            Error::Configuration(format!("cannot open database at {}: {}", path.display(), e))
        })?;
        Self::configure(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::Configuration(format!("cannot open in-memory database: {}", e)))?;
        Self::configure(conn)
    }

    /// Enable and verify referential-integrity enforcement.
    /// SQLite silently ignores unknown pragmas, so read the value back.
    fn configure(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| Error::Configuration(format!("cannot enable foreign keys: {}", e)))?;
        let enabled: i64 = conn
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))
            .map_err(|e| Error::Configuration(format!("cannot verify foreign keys: {}", e)))?;
        if enabled != 1 {
            return Err(Error::Configuration(
                "foreign key enforcement is not available in this SQLite build".to_string(),
            ));
        }
        Ok(Self { conn })
    }

    /// Apply the schema. Idempotent against an initialized store.
    pub fn create_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        tracing::debug!("schema applied");
        Ok(())
    }

    /// Drop every entity table and recreate the schema.
    pub fn reset(&self) -> Result<()> {
        // children first, so no drop ever sees a dangling reference
        for entity in Entity::ALL.iter().rev() {
            self.conn
                .execute(&format!("DROP TABLE IF EXISTS {}", entity.table_name()), [])?;
        }
        self.create_schema()?;
        tracing::info!("database reset");
        Ok(())
    }

    /// Add a column to an entity table. No-op if the column exists.
    pub fn add_column(&self, entity: Entity, column: &str, decl: &str) -> Result<()> {
        let table = entity.table_name();
        let mut stmt = self.conn.prepare(&format!("PRAGMA table_info({})", table))?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let name: String = row.get(1)?;
            if name == column {
                return Ok(());
            }
        }
        drop(rows);
        drop(stmt);
        self.conn
            .execute(&format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, decl), [])?;
        tracing::info!(table, column, "column added");
        Ok(())
    }

    /// Run a closure inside a transaction: commit on Ok, rollback on
    /// any error path. Nested calls join the enclosing transaction.
    pub fn with_transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
    {
        if !self.conn.is_autocommit() {
            return f(self);
        }
        let tx = self.conn.unchecked_transaction()?;
        let out = f(self)?;
        tx.commit()?;
        Ok(out)
    }

    // ========== DUT Operations ==========

    /// Insert a DUT, or return the existing key for the same
    /// (wafer, doe, die, cage, device) tuple.
    pub fn insert_dut(
        &self,
        wafer: &str,
        doe: &str,
        die: i64,
        cage: &str,
        device: &str,
    ) -> Result<i64> {
        require_nonempty("wafer", wafer)?;
        require_nonempty("doe", doe)?;
        require_nonempty("cage", cage)?;
        require_nonempty("device", device)?;
        let id = self.conn.query_row(
            r#"
            INSERT INTO duts (wafer, doe, die, cage, device)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(wafer, doe, die, cage, device) DO UPDATE SET wafer = excluded.wafer
            RETURNING dut_id
            "#,
            params![wafer, doe, die, cage, device],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Get a DUT by key
    pub fn get_dut(&self, dut_id: i64) -> Result<Option<Dut>> {
        self.conn
            .query_row(
                "SELECT dut_id, wafer, doe, die, cage, device FROM duts WHERE dut_id = ?1",
                [dut_id],
                |row| Self::row_to_dut(row),
            )
            .optional()
            .map_err(Into::into)
    }

    /// List DUTs, optionally narrowed by wafer and/or die
    pub fn list_duts(&self, wafer: Option<&str>, die: Option<i64>) -> Result<Vec<Dut>> {
        let mut sql =
            String::from("SELECT dut_id, wafer, doe, die, cage, device FROM duts WHERE 1=1");
        let mut filters: Vec<Value> = Vec::new();
        if let Some(w) = wafer {
            sql.push_str(" AND wafer = ?");
            filters.push(Value::from(w.to_string()));
        }
        if let Some(d) = die {
            sql.push_str(" AND die = ?");
            filters.push(Value::from(d));
        }
        sql.push_str(" ORDER BY dut_id");
        let mut stmt = self.conn.prepare(&sql)?;
        let duts = stmt
            .query_map(params_from_iter(filters), |row| Self::row_to_dut(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(duts)
    }

    /// Delete a DUT, cascading to every descendant row
    pub fn delete_dut(&self, dut_id: i64) -> Result<usize> {
        let n = self.conn.execute("DELETE FROM duts WHERE dut_id = ?1", [dut_id])?;
        Ok(n)
    }

    fn row_to_dut(row: &rusqlite::Row) -> rusqlite::Result<Dut> {
        Ok(Dut {
            dut_id: row.get(0)?,
            wafer: row.get(1)?,
            doe: row.get(2)?,
            die: row.get(3)?,
            cage: row.get(4)?,
            device: row.get(5)?,
        })
    }

    // ========== Session Operations ==========

    /// Insert a measurement session, or return the existing key for
    /// the same (dut_id, session_name) pair. `measurement_datetime`
    /// defaults to now, truncated to seconds.
    pub fn insert_session(
        &self,
        dut_id: i64,
        session_name: &str,
        measurement_datetime: Option<NaiveDateTime>,
        operator: Option<&str>,
        system_version: Option<&str>,
        notes: Option<&str>,
    ) -> Result<i64> {
        require_nonempty("session_name", session_name)?;
        let ts = timestamp_or_now(measurement_datetime);
        let id = self.conn.query_row(
            r#"
            INSERT INTO measurement_sessions
                (dut_id, session_name, measurement_datetime, operator, system_version, notes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(dut_id, session_name) DO UPDATE SET dut_id = excluded.dut_id
            RETURNING session_id
            "#,
            params![dut_id, session_name, ts, operator, system_version, notes],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Get a session by key
    pub fn get_session(&self, session_id: i64) -> Result<Option<Session>> {
        self.conn
            .query_row(
                &format!("{} WHERE session_id = ?1", SELECT_SESSION),
                [session_id],
                |row| Self::row_to_session(row),
            )
            .optional()
            .map_err(Into::into)
    }

    /// All sessions for a DUT, newest first
    pub fn sessions_for_dut(&self, dut_id: i64) -> Result<Vec<Session>> {
        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE dut_id = ?1 ORDER BY measurement_datetime DESC",
            SELECT_SESSION
        ))?;
        let sessions = stmt
            .query_map([dut_id], |row| Self::row_to_session(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(sessions)
    }

    /// Sessions whose timestamp lies in [start, end], newest first
    pub fn sessions_in_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Session>> {
        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE measurement_datetime BETWEEN ?1 AND ?2 ORDER BY measurement_datetime DESC",
            SELECT_SESSION
        ))?;
        let sessions = stmt
            .query_map(params![start, end], |row| Self::row_to_session(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(sessions)
    }

    /// Delete a session, cascading to every descendant row
    pub fn delete_session(&self, session_id: i64) -> Result<usize> {
        let n = self
            .conn
            .execute("DELETE FROM measurement_sessions WHERE session_id = ?1", [session_id])?;
        Ok(n)
    }

    /// Delete all sessions for a DUT
    pub fn delete_sessions_for_dut(&self, dut_id: i64) -> Result<usize> {
        let n = self
            .conn
            .execute("DELETE FROM measurement_sessions WHERE dut_id = ?1", [dut_id])?;
        Ok(n)
    }

    /// Delete all sessions older than the cutoff
    pub fn delete_sessions_before(&self, cutoff: NaiveDateTime) -> Result<usize> {
        let n = self.conn.execute(
            "DELETE FROM measurement_sessions WHERE measurement_datetime < ?1",
            params![cutoff],
        )?;
        Ok(n)
    }

    fn row_to_session(row: &rusqlite::Row) -> rusqlite::Result<Session> {
        Ok(Session {
            session_id: row.get(0)?,
            dut_id: row.get(1)?,
            session_name: row.get(2)?,
            measurement_datetime: row.get(3)?,
            operator: row.get(4)?,
            system_version: row.get(5)?,
            notes: row.get(6)?,
        })
    }

    // ========== Experimental Condition Operations ==========

    /// Insert a batch of conditions under one session, one transaction.
    /// Re-inserting an existing (key, unit) refreshes its value.
    pub fn insert_experimental_conditions(
        &self,
        session_id: i64,
        conditions: &[(&str, Quantity)],
    ) -> Result<()> {
        self.with_transaction(|db| {
            for (key, quantity) in conditions {
                db.insert_keyed_value(
                    "experimental_conditions",
                    "session_id",
                    session_id,
                    key,
                    quantity,
                )?;
            }
            Ok(())
        })
    }

    /// All conditions for a session
    pub fn conditions_for_session(&self, session_id: i64) -> Result<Vec<Condition>> {
        let mut stmt = self.conn.prepare(
            "SELECT condition_id, session_id, key, value, unit FROM experimental_conditions
             WHERE session_id = ?1 ORDER BY condition_id",
        )?;
        let conditions = stmt
            .query_map([session_id], |row| {
                Ok(Condition {
                    condition_id: row.get(0)?,
                    session_id: row.get(1)?,
                    key: row.get(2)?,
                    value: row.get(3)?,
                    unit: stored_unit(row.get(4)?),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(conditions)
    }

    /// Conditions as a name -> quantity map
    pub fn conditions_map(&self, session_id: i64) -> Result<BTreeMap<String, Quantity>> {
        Ok(self
            .conditions_for_session(session_id)?
            .into_iter()
            .map(|c| (c.key, Quantity::from_parts(c.value, c.unit)))
            .collect())
    }

    /// Delete one condition row
    pub fn delete_experimental_condition(&self, condition_id: i64) -> Result<usize> {
        let n = self.conn.execute(
            "DELETE FROM experimental_conditions WHERE condition_id = ?1",
            [condition_id],
        )?;
        Ok(n)
    }

    // ========== Measurement Data Operations ==========

    /// Insert a data artifact reference, or return the existing key for
    /// the same (session_id, file_path) pair.
    pub fn insert_measurement_data(
        &self,
        session_id: i64,
        data_type: &str,
        file_path: &str,
        created_time: Option<NaiveDateTime>,
    ) -> Result<i64> {
        require_nonempty("data_type", data_type)?;
        require_nonempty("file_path", file_path)?;
        let ts = timestamp_or_now(created_time);
        let id = self.conn.query_row(
            r#"
            INSERT INTO measurement_data (session_id, data_type, file_path, created_time)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(session_id, file_path) DO UPDATE SET session_id = excluded.session_id
            RETURNING data_id
            "#,
            params![session_id, data_type, file_path, ts],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Data artifacts for a session, optionally filtered by type
    pub fn data_for_session(
        &self,
        session_id: i64,
        data_type: Option<&str>,
    ) -> Result<Vec<MeasurementData>> {
        let mut sql = format!("{} WHERE session_id = ?", SELECT_DATA);
        let mut filters: Vec<Value> = vec![Value::from(session_id)];
        if let Some(t) = data_type {
            sql.push_str(" AND data_type = ?");
            filters.push(Value::from(t.to_string()));
        }
        sql.push_str(" ORDER BY data_id");
        let mut stmt = self.conn.prepare(&sql)?;
        let data = stmt
            .query_map(params_from_iter(filters), |row| Self::row_to_data(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(data)
    }

    /// Delete one data artifact, cascading to its info rows
    pub fn delete_measurement_data(&self, data_id: i64) -> Result<usize> {
        let n = self
            .conn
            .execute("DELETE FROM measurement_data WHERE data_id = ?1", [data_id])?;
        Ok(n)
    }

    fn row_to_data(row: &rusqlite::Row) -> rusqlite::Result<MeasurementData> {
        Ok(MeasurementData {
            data_id: row.get(0)?,
            session_id: row.get(1)?,
            data_type: row.get(2)?,
            file_path: row.get(3)?,
            created_time: row.get(4)?,
        })
    }

    // ========== Data Info Operations ==========

    /// Insert a batch of info attributes under one artifact, one transaction
    pub fn insert_data_info(&self, data_id: i64, info: &[(&str, Quantity)]) -> Result<()> {
        self.with_transaction(|db| {
            for (key, quantity) in info {
                db.insert_keyed_value("data_info", "data_id", data_id, key, quantity)?;
            }
            Ok(())
        })
    }

    /// All info attributes for a data artifact
    pub fn data_info_for_data(&self, data_id: i64) -> Result<Vec<DataInfo>> {
        let mut stmt = self.conn.prepare(
            "SELECT info_id, data_id, key, value, unit FROM data_info
             WHERE data_id = ?1 ORDER BY info_id",
        )?;
        let info = stmt
            .query_map([data_id], |row| {
                Ok(DataInfo {
                    info_id: row.get(0)?,
                    data_id: row.get(1)?,
                    key: row.get(2)?,
                    value: row.get(3)?,
                    unit: stored_unit(row.get(4)?),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(info)
    }

    /// Info attributes as a name -> quantity map
    pub fn data_info_map(&self, data_id: i64) -> Result<BTreeMap<String, Quantity>> {
        Ok(self
            .data_info_for_data(data_id)?
            .into_iter()
            .map(|i| (i.key, Quantity::from_parts(i.value, i.unit)))
            .collect())
    }

    /// Delete one info row
    pub fn delete_data_info(&self, info_id: i64) -> Result<usize> {
        let n = self.conn.execute("DELETE FROM data_info WHERE info_id = ?1", [info_id])?;
        Ok(n)
    }

    // ========== Analysis Run Operations ==========

    /// Insert an analysis run, or return the existing key for the same
    /// (session_id, analysis_type, analysis_index) tuple.
    pub fn insert_analysis_run(
        &self,
        session_id: i64,
        analysis_type: &str,
        analysis_index: i64,
        created_time: Option<NaiveDateTime>,
    ) -> Result<i64> {
        require_nonempty("analysis_type", analysis_type)?;
        let ts = timestamp_or_now(created_time);
        let id = self.conn.query_row(
            r#"
            INSERT INTO analysis_runs (session_id, analysis_type, analysis_index, created_time)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(session_id, analysis_type, analysis_index) DO UPDATE SET
                created_time = excluded.created_time
            RETURNING analysis_id
            "#,
            params![session_id, analysis_type, analysis_index, ts],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Analysis runs for a session, optionally filtered by type
    pub fn analysis_runs_for_session(
        &self,
        session_id: i64,
        analysis_type: Option<&str>,
    ) -> Result<Vec<AnalysisRun>> {
        let mut sql = format!("{} WHERE session_id = ?", SELECT_RUN);
        let mut filters: Vec<Value> = vec![Value::from(session_id)];
        if let Some(t) = analysis_type {
            sql.push_str(" AND analysis_type = ?");
            filters.push(Value::from(t.to_string()));
        }
        sql.push_str(" ORDER BY analysis_id");
        let mut stmt = self.conn.prepare(&sql)?;
        let runs = stmt
            .query_map(params_from_iter(filters), |row| Self::row_to_run(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(runs)
    }

    /// Delete an analysis run, cascading to features, values and edges
    pub fn delete_analysis_run(&self, analysis_id: i64) -> Result<usize> {
        let n = self
            .conn
            .execute("DELETE FROM analysis_runs WHERE analysis_id = ?1", [analysis_id])?;
        Ok(n)
    }

    fn row_to_run(row: &rusqlite::Row) -> rusqlite::Result<AnalysisRun> {
        Ok(AnalysisRun {
            analysis_id: row.get(0)?,
            session_id: row.get(1)?,
            analysis_type: row.get(2)?,
            analysis_index: row.get(3)?,
            created_time: row.get(4)?,
        })
    }

    // ========== Analysis Input (Lineage) Operations ==========

    /// Record that an artifact fed an analysis run. Duplicate edges are
    /// absorbed; dangling ends are referential-integrity errors.
    pub fn insert_analysis_input(&self, analysis_id: i64, data_id: i64) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO analysis_inputs (analysis_id, data_id)
            VALUES (?1, ?2)
            ON CONFLICT(analysis_id, data_id) DO NOTHING
            "#,
            params![analysis_id, data_id],
        )?;
        Ok(())
    }

    /// Record a batch of lineage edges for one run, one transaction
    pub fn insert_analysis_inputs(&self, analysis_id: i64, data_ids: &[i64]) -> Result<()> {
        self.with_transaction(|db| {
            for data_id in data_ids {
                db.insert_analysis_input(analysis_id, *data_id)?;
            }
            Ok(())
        })
    }

    /// Raw lineage edges for a run
    pub fn inputs_for_analysis(&self, analysis_id: i64) -> Result<Vec<AnalysisInput>> {
        let mut stmt = self.conn.prepare(
            "SELECT analysis_id, data_id FROM analysis_inputs
             WHERE analysis_id = ?1 ORDER BY data_id",
        )?;
        let edges = stmt
            .query_map([analysis_id], |row| {
                Ok(AnalysisInput { analysis_id: row.get(0)?, data_id: row.get(1)? })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(edges)
    }

    /// The full data artifacts consumed by a run
    pub fn input_data_for_analysis(&self, analysis_id: i64) -> Result<Vec<MeasurementData>> {
        let mut stmt = self.conn.prepare(
            "SELECT md.data_id, md.session_id, md.data_type, md.file_path, md.created_time
             FROM analysis_inputs ai
             JOIN measurement_data md ON ai.data_id = md.data_id
             WHERE ai.analysis_id = ?1
             ORDER BY md.data_id",
        )?;
        let data = stmt
            .query_map([analysis_id], |row| Self::row_to_data(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(data)
    }

    /// Which analysis runs consumed a given artifact (reverse lineage)
    pub fn analyses_for_data(&self, data_id: i64) -> Result<Vec<AnalysisRun>> {
        let mut stmt = self.conn.prepare(
            "SELECT ar.analysis_id, ar.session_id, ar.analysis_type, ar.analysis_index, ar.created_time
             FROM analysis_inputs ai
             JOIN analysis_runs ar ON ai.analysis_id = ar.analysis_id
             WHERE ai.data_id = ?1
             ORDER BY ar.analysis_id",
        )?;
        let runs = stmt
            .query_map([data_id], |row| Self::row_to_run(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(runs)
    }

    /// Remove one lineage edge
    pub fn delete_analysis_input(&self, analysis_id: i64, data_id: i64) -> Result<usize> {
        let n = self.conn.execute(
            "DELETE FROM analysis_inputs WHERE analysis_id = ?1 AND data_id = ?2",
            params![analysis_id, data_id],
        )?;
        Ok(n)
    }

    // ========== Analysis Feature Operations ==========

    /// Insert a feature, or return the existing key for the same
    /// (analysis_id, feature_type, feature_index) tuple.
    pub fn insert_analysis_feature(
        &self,
        analysis_id: i64,
        feature_type: &str,
        feature_index: i64,
    ) -> Result<i64> {
        require_nonempty("feature_type", feature_type)?;
        let id = self.conn.query_row(
            r#"
            INSERT INTO analysis_features (analysis_id, feature_type, feature_index)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(analysis_id, feature_type, feature_index) DO UPDATE SET
                feature_index = excluded.feature_index
            RETURNING feature_id
            "#,
            params![analysis_id, feature_type, feature_index],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Features for a run, optionally filtered by type, in index order
    pub fn features_for_analysis(
        &self,
        analysis_id: i64,
        feature_type: Option<&str>,
    ) -> Result<Vec<AnalysisFeature>> {
        let mut sql = String::from(
            "SELECT feature_id, analysis_id, feature_type, feature_index FROM analysis_features
             WHERE analysis_id = ?",
        );
        let mut filters: Vec<Value> = vec![Value::from(analysis_id)];
        if let Some(t) = feature_type {
            sql.push_str(" AND feature_type = ?");
            filters.push(Value::from(t.to_string()));
        }
        sql.push_str(" ORDER BY feature_index");
        let mut stmt = self.conn.prepare(&sql)?;
        let features = stmt
            .query_map(params_from_iter(filters), |row| {
                Ok(AnalysisFeature {
                    feature_id: row.get(0)?,
                    analysis_id: row.get(1)?,
                    feature_type: row.get(2)?,
                    feature_index: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(features)
    }

    /// Delete a feature, cascading to its values
    pub fn delete_analysis_feature(&self, feature_id: i64) -> Result<usize> {
        let n = self
            .conn
            .execute("DELETE FROM analysis_features WHERE feature_id = ?1", [feature_id])?;
        Ok(n)
    }

    // ========== Feature Value Operations ==========

    /// Insert a batch of values under one feature, one transaction
    pub fn insert_feature_values(&self, feature_id: i64, values: &[(&str, Quantity)]) -> Result<()> {
        self.with_transaction(|db| {
            for (key, quantity) in values {
                db.insert_keyed_value("feature_values", "feature_id", feature_id, key, quantity)?;
            }
            Ok(())
        })
    }

    /// All values for a feature
    pub fn values_for_feature(&self, feature_id: i64) -> Result<Vec<FeatureValue>> {
        let mut stmt = self.conn.prepare(
            "SELECT value_id, feature_id, key, value, unit FROM feature_values
             WHERE feature_id = ?1 ORDER BY value_id",
        )?;
        let values = stmt
            .query_map([feature_id], |row| Self::row_to_feature_value(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(values)
    }

    /// Values as a name -> quantity map
    pub fn feature_values_map(&self, feature_id: i64) -> Result<BTreeMap<String, Quantity>> {
        Ok(self
            .values_for_feature(feature_id)?
            .into_iter()
            .map(|v| (v.key, Quantity::from_parts(v.value, v.unit)))
            .collect())
    }

    /// Search feature values by key over a closed [min, max] interval,
    /// across all analysis runs. The unit filter applies only when given.
    pub fn search_features_by_value(
        &self,
        key: &str,
        min_value: Option<f64>,
        max_value: Option<f64>,
        unit: Option<&str>,
    ) -> Result<Vec<FeatureValue>> {
        let mut sql = String::from(
            "SELECT value_id, feature_id, key, value, unit FROM feature_values WHERE key = ?",
        );
        let mut filters: Vec<Value> = vec![Value::from(key.to_string())];
        if let Some(u) = unit {
            sql.push_str(" AND unit = ?");
            filters.push(Value::from(u.to_string()));
        }
        if let Some(v) = min_value {
            sql.push_str(" AND value >= ?");
            filters.push(Value::from(v));
        }
        if let Some(v) = max_value {
            sql.push_str(" AND value <= ?");
            filters.push(Value::from(v));
        }
        sql.push_str(" ORDER BY value_id");
        let mut stmt = self.conn.prepare(&sql)?;
        let values = stmt
            .query_map(params_from_iter(filters), |row| Self::row_to_feature_value(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(values)
    }

    /// Delete one value row
    pub fn delete_feature_value(&self, value_id: i64) -> Result<usize> {
        let n = self
            .conn
            .execute("DELETE FROM feature_values WHERE value_id = ?1", [value_id])?;
        Ok(n)
    }

    fn row_to_feature_value(row: &rusqlite::Row) -> rusqlite::Result<FeatureValue> {
        Ok(FeatureValue {
            value_id: row.get(0)?,
            feature_id: row.get(1)?,
            key: row.get(2)?,
            value: row.get(3)?,
            unit: stored_unit(row.get(4)?),
        })
    }

    // ========== Aggregate Query ==========

    /// Assemble the complete picture of one session: DUT, conditions,
    /// data artifacts with their info, analysis runs with inputs,
    /// features and values.
    pub fn session_full_info(&self, session_id: i64) -> Result<Option<SessionFullInfo>> {
        let Some(session) = self.get_session(session_id)? else {
            return Ok(None);
        };
        let dut = self.get_dut(session.dut_id)?.ok_or_else(|| {
            // unreachable while foreign keys hold; surface loudly if not
            Error::ReferentialIntegrity(format!(
                "session {} references missing DUT {}",
                session_id, session.dut_id
            ))
        })?;
        let conditions = self.conditions_for_session(session_id)?;

        let mut measurement_data = Vec::new();
        for data in self.data_for_session(session_id, None)? {
            let info = self.data_info_for_data(data.data_id)?;
            measurement_data.push(DataWithInfo { data, info });
        }

        let mut analysis_runs = Vec::new();
        for run in self.analysis_runs_for_session(session_id, None)? {
            let inputs = self.input_data_for_analysis(run.analysis_id)?;
            let mut features = Vec::new();
            for feature in self.features_for_analysis(run.analysis_id, None)? {
                let values = self.values_for_feature(feature.feature_id)?;
                features.push(FeatureInfo { feature, values });
            }
            analysis_runs.push(AnalysisRunInfo { run, inputs, features });
        }

        Ok(Some(SessionFullInfo {
            session,
            dut,
            conditions,
            measurement_data,
            analysis_runs,
        }))
    }

    // ========== Raw Query Escape Hatch ==========

    /// Run an ad hoc query and return column names plus dynamically
    /// typed rows. Also feeds the workbook exporter.
    pub fn raw_query(&self, sql: &str, query_params: &[&dyn ToSql]) -> Result<QueryOutput> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
        let ncols = columns.len();
        let rows = stmt
            .query_map(query_params, |row| {
                (0..ncols).map(|i| row.get::<_, Value>(i)).collect::<rusqlite::Result<Vec<_>>>()
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(QueryOutput { columns, rows })
    }

    /// Every row of one entity table, columns in declaration order
    pub fn fetch_table(&self, entity: Entity) -> Result<QueryOutput> {
        self.raw_query(&format!("SELECT * FROM {}", entity.table_name()), &[])
    }

    // ========== Stats ==========

    /// Count rows in one entity table
    pub fn count(&self, entity: Entity) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", entity.table_name()),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            duts: self.count(Entity::Dut)?,
            sessions: self.count(Entity::Session)?,
            conditions: self.count(Entity::Condition)?,
            measurement_data: self.count(Entity::Data)?,
            data_info: self.count(Entity::DataInfo)?,
            analysis_runs: self.count(Entity::AnalysisRun)?,
            analysis_inputs: self.count(Entity::AnalysisInput)?,
            analysis_features: self.count(Entity::AnalysisFeature)?,
            feature_values: self.count(Entity::FeatureValue)?,
        })
    }

    // ========== Helpers ==========

    /// Shared upsert for the three key/value-scoped tables. The parent
    /// scope plus (key, unit) is the conflict key; a re-insert
    /// refreshes the value.
    fn insert_keyed_value(
        &self,
        table: &str,
        parent_column: &str,
        parent_id: i64,
        key: &str,
        quantity: &Quantity,
    ) -> Result<()> {
        require_nonempty("key", key)?;
        self.conn.execute(
            &format!(
                "INSERT INTO {table} ({parent_column}, key, value, unit)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT({parent_column}, key, unit) DO UPDATE SET value = excluded.value"
            ),
            params![parent_id, key, quantity.value(), quantity.unit().unwrap_or("")],
        )?;
        Ok(())
    }
}

/// Output of the raw-query escape hatch
#[derive(Debug, Clone)]
pub struct QueryOutput {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DbStats {
    pub duts: usize,
    pub sessions: usize,
    pub conditions: usize,
    pub measurement_data: usize,
    pub data_info: usize,
    pub analysis_runs: usize,
    pub analysis_inputs: usize,
    pub analysis_features: usize,
    pub feature_values: usize,
}

impl DbStats {
    /// (table name, row count) pairs in schema order
    pub fn entries(&self) -> [(&'static str, usize); 9] {
        [
            (Entity::Dut.table_name(), self.duts),
            (Entity::Session.table_name(), self.sessions),
            (Entity::Condition.table_name(), self.conditions),
            (Entity::Data.table_name(), self.measurement_data),
            (Entity::DataInfo.table_name(), self.data_info),
            (Entity::AnalysisRun.table_name(), self.analysis_runs),
            (Entity::AnalysisInput.table_name(), self.analysis_inputs),
            (Entity::AnalysisFeature.table_name(), self.analysis_features),
            (Entity::FeatureValue.table_name(), self.feature_values),
        ]
    }
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        for (table, count) in self.entries() {
            writeln!(f, "  {}: {}", table, count)?;
        }
        Ok(())
    }
}

/// Empty unit column means "no unit"
fn stored_unit(unit: String) -> Option<String> {
    if unit.is_empty() { None } else { Some(unit) }
}

fn timestamp_or_now(ts: Option<NaiveDateTime>) -> NaiveDateTime {
    ts.unwrap_or_else(|| {
        let now = Local::now().naive_local();
        now.with_nanosecond(0).unwrap_or(now)
    })
}

fn require_nonempty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.create_schema().unwrap();
        db
    }

    fn ts(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, 0, 0).unwrap()
    }

    fn sample_dut(db: &Database) -> i64 {
        db.insert_dut("W001", "DOE1", 1, "C1", "D001").unwrap()
    }

    fn sample_session(db: &Database, dut_id: i64, name: &str) -> i64 {
        db.insert_session(dut_id, name, Some(ts(2026, 2, 2, 12)), Some("T&P"), Some("CM300v1.0"), None)
            .unwrap()
    }

    /// Seed the full hierarchy: one session with one condition, one
    /// artifact with two info rows, one run with one input and one
    /// feature holding two values.
    fn seed_tree(db: &Database) -> (i64, i64) {
        let dut_id = sample_dut(db);
        let session_id = sample_session(db, dut_id, "20260202");
        db.insert_experimental_conditions(session_id, &[("temperature", (25.0, "C").into())])
            .unwrap();
        let data_id = db
            .insert_measurement_data(session_id, "SPCM", "/data/s1.csv", Some(ts(2026, 2, 2, 13)))
            .unwrap();
        db.insert_data_info(
            data_id,
            &[("channel_in", 1.0.into()), ("power", (-10.0, "dBm").into())],
        )
        .unwrap();
        let analysis_id = db.insert_analysis_run(session_id, "peak_detection", 1, None).unwrap();
        db.insert_analysis_input(analysis_id, data_id).unwrap();
        let feature_id = db.insert_analysis_feature(analysis_id, "peak", 0).unwrap();
        db.insert_feature_values(
            feature_id,
            &[("wavelength", (1550.0, "nm").into()), ("intensity", (-3.2, "dBm").into())],
        )
        .unwrap();
        (dut_id, session_id)
    }

    #[test]
    fn test_dut_upsert_returns_same_key() {
        let db = test_db();
        let first = db.insert_dut("W001", "DOE1", 1, "C1", "D001").unwrap();
        let second = db.insert_dut("W001", "DOE1", 1, "C1", "D001").unwrap();
        assert_eq!(first, second);
        assert_eq!(db.count(Entity::Dut).unwrap(), 1);

        let other = db.insert_dut("W001", "DOE1", 2, "C1", "D001").unwrap();
        assert_ne!(first, other);
        assert_eq!(db.count(Entity::Dut).unwrap(), 2);
    }

    #[test]
    fn test_session_upsert_composite_key() {
        let db = test_db();
        let dut_a = db.insert_dut("W001", "DOE1", 1, "C1", "D001").unwrap();
        let dut_b = db.insert_dut("W001", "DOE1", 2, "C1", "D001").unwrap();

        let first = sample_session(&db, dut_a, "20260202");
        let again = sample_session(&db, dut_a, "20260202");
        assert_eq!(first, again);

        // same label under another DUT is a distinct session
        let other = sample_session(&db, dut_b, "20260202");
        assert_ne!(first, other);
        assert_eq!(db.count(Entity::Session).unwrap(), 2);
    }

    #[test]
    fn test_cascade_delete_dut_clears_subtree() {
        let db = test_db();
        let (dut_id, _) = seed_tree(&db);
        assert_eq!(db.count(Entity::FeatureValue).unwrap(), 2);

        assert_eq!(db.delete_dut(dut_id).unwrap(), 1);

        for entity in Entity::ALL {
            assert_eq!(db.count(entity).unwrap(), 0, "{} not empty", entity.table_name());
        }
    }

    #[test]
    fn test_cascade_delete_analysis_run() {
        let db = test_db();
        let (_, session_id) = seed_tree(&db);
        let runs = db.analysis_runs_for_session(session_id, None).unwrap();

        assert_eq!(db.delete_analysis_run(runs[0].analysis_id).unwrap(), 1);

        assert_eq!(db.count(Entity::AnalysisInput).unwrap(), 0);
        assert_eq!(db.count(Entity::AnalysisFeature).unwrap(), 0);
        assert_eq!(db.count(Entity::FeatureValue).unwrap(), 0);
        // the session and its data survive
        assert_eq!(db.count(Entity::Session).unwrap(), 1);
        assert_eq!(db.count(Entity::Data).unwrap(), 1);
    }

    #[test]
    fn test_condition_batch_bare_and_unit_values() {
        let db = test_db();
        let dut_id = sample_dut(&db);
        let session_id = sample_session(&db, dut_id, "s1");

        db.insert_experimental_conditions(
            session_id,
            &[("temperature", (25.0, "C").into()), ("voltage", 3.3.into())],
        )
        .unwrap();

        let conditions = db.conditions_for_session(session_id).unwrap();
        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions[0].key, "temperature");
        assert_eq!(conditions[0].unit.as_deref(), Some("C"));
        assert_eq!(conditions[1].key, "voltage");
        assert_eq!(conditions[1].unit, None);
    }

    #[test]
    fn test_condition_batch_is_idempotent() {
        let db = test_db();
        let dut_id = sample_dut(&db);
        let session_id = sample_session(&db, dut_id, "s1");
        let batch: &[(&str, Quantity)] =
            &[("temperature", (25.0, "C").into()), ("voltage", 3.3.into())];

        db.insert_experimental_conditions(session_id, batch).unwrap();
        db.insert_experimental_conditions(session_id, batch).unwrap();

        assert_eq!(db.count(Entity::Condition).unwrap(), 2);
    }

    #[test]
    fn test_same_key_different_unit_coexist() {
        let db = test_db();
        let dut_id = sample_dut(&db);
        let session_id = sample_session(&db, dut_id, "s1");

        db.insert_experimental_conditions(
            session_id,
            &[("temperature", (25.0, "C").into()), ("temperature", (298.0, "K").into())],
        )
        .unwrap();

        assert_eq!(db.conditions_for_session(session_id).unwrap().len(), 2);
    }

    #[test]
    fn test_reinsert_refreshes_value() {
        let db = test_db();
        let dut_id = sample_dut(&db);
        let session_id = sample_session(&db, dut_id, "s1");

        db.insert_experimental_conditions(session_id, &[("voltage", 3.3.into())]).unwrap();
        db.insert_experimental_conditions(session_id, &[("voltage", 3.4.into())]).unwrap();

        let conditions = db.conditions_for_session(session_id).unwrap();
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].value, 3.4);
    }

    #[test]
    fn test_dangling_session_is_integrity_error() {
        let db = test_db();
        let result = db.insert_measurement_data(999, "SPCM", "/data/x.csv", None);
        assert!(matches!(result, Err(Error::ReferentialIntegrity(_))));
        assert_eq!(db.count(Entity::Data).unwrap(), 0);
    }

    #[test]
    fn test_input_batch_rolls_back_on_dangling_edge() {
        let db = test_db();
        let (_, session_id) = seed_tree(&db);
        let analysis_id = db.insert_analysis_run(session_id, "fit", 1, None).unwrap();
        let data_id = db.data_for_session(session_id, None).unwrap()[0].data_id;
        let before = db.count(Entity::AnalysisInput).unwrap();

        let result = db.insert_analysis_inputs(analysis_id, &[data_id, 999]);
        assert!(matches!(result, Err(Error::ReferentialIntegrity(_))));
        // the valid first edge must not survive the failed batch
        assert_eq!(db.count(Entity::AnalysisInput).unwrap(), before);
    }

    #[test]
    fn test_duplicate_lineage_edge_absorbed() {
        let db = test_db();
        let (_, session_id) = seed_tree(&db);
        let runs = db.analysis_runs_for_session(session_id, None).unwrap();
        let analysis_id = runs[0].analysis_id;
        let data_id = db.data_for_session(session_id, None).unwrap()[0].data_id;

        db.insert_analysis_input(analysis_id, data_id).unwrap();
        assert_eq!(db.count(Entity::AnalysisInput).unwrap(), 1);

        assert_eq!(db.delete_analysis_input(analysis_id, data_id).unwrap(), 1);
        assert_eq!(db.count(Entity::AnalysisInput).unwrap(), 0);
    }

    #[test]
    fn test_reverse_lineage() {
        let db = test_db();
        let (_, session_id) = seed_tree(&db);
        let data_id = db.data_for_session(session_id, None).unwrap()[0].data_id;

        let runs = db.analyses_for_data(data_id).unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].analysis_type, "peak_detection");
    }

    #[test]
    fn test_search_features_closed_interval() {
        let db = test_db();
        let (_, session_id) = seed_tree(&db);
        // a second run so the search spans runs
        let analysis_id = db.insert_analysis_run(session_id, "valley_detection", 1, None).unwrap();
        for (i, wl) in [1549.9, 1550.0, 1555.0, 1560.0, 1560.1].iter().enumerate() {
            let feature_id =
                db.insert_analysis_feature(analysis_id, "valley", i as i64).unwrap();
            db.insert_feature_values(feature_id, &[("wavelength", (*wl, "nm").into())]).unwrap();
        }

        let hits = db
            .search_features_by_value("wavelength", Some(1550.0), Some(1560.0), None)
            .unwrap();
        let values: Vec<f64> = hits.iter().map(|v| v.value).collect();
        // seed_tree's 1550.0 plus the three in-range valleys; bounds inclusive
        assert_eq!(values, vec![1550.0, 1550.0, 1555.0, 1560.0]);

        let nm_only = db
            .search_features_by_value("wavelength", Some(1550.0), Some(1560.0), Some("nm"))
            .unwrap();
        assert_eq!(nm_only.len(), 4);
    }

    #[test]
    fn test_session_full_info_nesting_without_leakage() {
        let db = test_db();
        let (dut_id, session_id) = seed_tree(&db);
        // unrelated second session that must not leak into the aggregate
        let other_session = sample_session(&db, dut_id, "other");
        db.insert_experimental_conditions(other_session, &[("voltage", 1.0.into())]).unwrap();

        let info = db.session_full_info(session_id).unwrap().unwrap();
        assert_eq!(info.session.session_name, "20260202");
        assert_eq!(info.dut.wafer, "W001");
        assert_eq!(info.conditions.len(), 1);
        assert_eq!(info.measurement_data.len(), 1);
        assert_eq!(info.measurement_data[0].info.len(), 2);
        assert_eq!(info.analysis_runs.len(), 1);
        assert_eq!(info.analysis_runs[0].inputs.len(), 1);
        assert_eq!(info.analysis_runs[0].features.len(), 1);
        assert_eq!(info.analysis_runs[0].features[0].values.len(), 2);

        assert!(db.session_full_info(9999).unwrap().is_none());
    }

    #[test]
    fn test_sessions_in_range_newest_first() {
        let db = test_db();
        let dut_id = sample_dut(&db);
        for (name, day) in [("a", 1), ("b", 2), ("c", 3)] {
            db.insert_session(dut_id, name, Some(ts(2026, 2, day, 12)), None, None, None)
                .unwrap();
        }

        let sessions = db.sessions_in_range(ts(2026, 2, 1, 0), ts(2026, 2, 2, 23)).unwrap();
        let names: Vec<&str> = sessions.iter().map(|s| s.session_name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_delete_sessions_before_cutoff() {
        let db = test_db();
        let dut_id = sample_dut(&db);
        db.insert_session(dut_id, "old", Some(ts(2026, 1, 1, 12)), None, None, None).unwrap();
        db.insert_session(dut_id, "new", Some(ts(2026, 2, 2, 12)), None, None, None).unwrap();

        assert_eq!(db.delete_sessions_before(ts(2026, 2, 1, 0)).unwrap(), 1);
        let remaining = db.sessions_for_dut(dut_id).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].session_name, "new");
    }

    #[test]
    fn test_delete_sessions_for_dut() {
        let db = test_db();
        let dut_id = sample_dut(&db);
        sample_session(&db, dut_id, "a");
        sample_session(&db, dut_id, "b");

        assert_eq!(db.delete_sessions_for_dut(dut_id).unwrap(), 2);
        assert_eq!(db.count(Entity::Dut).unwrap(), 1);
        assert_eq!(db.count(Entity::Session).unwrap(), 0);
    }

    #[test]
    fn test_schema_creation_is_idempotent() {
        let db = test_db();
        seed_tree(&db);
        db.create_schema().unwrap();
        assert_eq!(db.count(Entity::Dut).unwrap(), 1);
    }

    #[test]
    fn test_add_column_is_idempotent() {
        let db = test_db();
        db.add_column(Entity::Dut, "lot", "TEXT DEFAULT ''").unwrap();
        db.add_column(Entity::Dut, "lot", "TEXT DEFAULT ''").unwrap();
        // the widened table still accepts inserts
        sample_dut(&db);
        let out = db.fetch_table(Entity::Dut).unwrap();
        assert!(out.columns.iter().any(|c| c == "lot"));
    }

    #[test]
    fn test_reset_empties_every_table() {
        let db = test_db();
        seed_tree(&db);
        db.reset().unwrap();
        for entity in Entity::ALL {
            assert_eq!(db.count(entity).unwrap(), 0);
        }
        // and the store is usable again
        sample_dut(&db);
    }

    #[test]
    fn test_list_duts_filters() {
        let db = test_db();
        db.insert_dut("W001", "DOE1", 1, "C1", "D001").unwrap();
        db.insert_dut("W001", "DOE1", 2, "C1", "D002").unwrap();
        db.insert_dut("W002", "DOE1", 1, "C1", "D003").unwrap();

        assert_eq!(db.list_duts(None, None).unwrap().len(), 3);
        assert_eq!(db.list_duts(Some("W001"), None).unwrap().len(), 2);
        assert_eq!(db.list_duts(Some("W001"), Some(2)).unwrap().len(), 1);
    }

    #[test]
    fn test_maps_collapse_on_key() {
        let db = test_db();
        let (_, session_id) = seed_tree(&db);
        let map = db.conditions_map(session_id).unwrap();
        assert_eq!(map.get("temperature"), Some(&Quantity::WithUnit(25.0, "C".to_string())));
    }

    #[test]
    fn test_empty_field_rejected_before_store() {
        let db = test_db();
        assert!(matches!(db.insert_dut("", "DOE1", 1, "C1", "D001"), Err(Error::Validation(_))));
        assert_eq!(db.count(Entity::Dut).unwrap(), 0);
    }

    #[test]
    fn test_raw_query_escape_hatch() {
        let db = test_db();
        seed_tree(&db);
        let out = db
            .raw_query(
                "SELECT d.wafer, COUNT(ms.session_id) AS n
                 FROM duts d JOIN measurement_sessions ms ON ms.dut_id = d.dut_id
                 WHERE d.wafer = ?1 GROUP BY d.dut_id",
                &[&"W001"],
            )
            .unwrap();
        assert_eq!(out.columns, vec!["wafer", "n"]);
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0][1], Value::Integer(1));
    }

    #[test]
    fn test_stats_counts_every_table() {
        let db = test_db();
        seed_tree(&db);
        let stats = db.stats().unwrap();
        assert_eq!(stats.duts, 1);
        assert_eq!(stats.sessions, 1);
        assert_eq!(stats.conditions, 1);
        assert_eq!(stats.measurement_data, 1);
        assert_eq!(stats.data_info, 2);
        assert_eq!(stats.analysis_runs, 1);
        assert_eq!(stats.analysis_inputs, 1);
        assert_eq!(stats.analysis_features, 1);
        assert_eq!(stats.feature_values, 2);
    }
}
