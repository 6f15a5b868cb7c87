//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - duts(wafer, doe, die, cage, device)
//! - measurement_sessions(dut_id, session_name, measurement_datetime, ...)
//! - experimental_conditions(session_id, key, value, unit)
//! - measurement_data(session_id, data_type, file_path, created_time)
//! - data_info(data_id, key, value, unit)
//! - analysis_runs(session_id, analysis_type, analysis_index, created_time)
//! - analysis_inputs(analysis_id, data_id)
//! - analysis_features(analysis_id, feature_type, feature_index)
//! - feature_values(feature_id, key, value, unit)

pub mod schema;
pub mod sqlite;

pub use schema::Entity;
pub use sqlite::{Database, DbStats, QueryOutput};
