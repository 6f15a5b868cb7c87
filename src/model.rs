//! Row types for the nine stored entities, plus the aggregate views
//! assembled by the query layer.

use chrono::NaiveDateTime;
use serde::Serialize;

/// A numeric measurement that may or may not carry a unit.
///
/// Key/value-scoped entities (conditions, data info, feature values)
/// accept either a bare number or a (value, unit) pair; both shapes
/// normalize to this union before insertion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Quantity {
    Bare(f64),
    WithUnit(f64, String),
}

impl Quantity {
    pub fn value(&self) -> f64 {
        match self {
            Quantity::Bare(v) => *v,
            Quantity::WithUnit(v, _) => *v,
        }
    }

    pub fn unit(&self) -> Option<&str> {
        match self {
            Quantity::Bare(_) => None,
            Quantity::WithUnit(_, unit) => Some(unit),
        }
    }

    /// Rebuild from stored columns. An empty unit column means "no unit".
    pub fn from_parts(value: f64, unit: Option<String>) -> Self {
        match unit {
            Some(u) if !u.is_empty() => Quantity::WithUnit(value, u),
            _ => Quantity::Bare(value),
        }
    }
}

impl From<f64> for Quantity {
    fn from(value: f64) -> Self {
        Quantity::Bare(value)
    }
}

impl From<(f64, &str)> for Quantity {
    fn from((value, unit): (f64, &str)) -> Self {
        Quantity::WithUnit(value, unit.to_string())
    }
}

impl From<(f64, String)> for Quantity {
    fn from((value, unit): (f64, String)) -> Self {
        Quantity::WithUnit(value, unit)
    }
}

/// A physical device under test, identified by its wafer coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dut {
    pub dut_id: i64,
    pub wafer: String,
    pub doe: String,
    pub die: i64,
    pub cage: String,
    pub device: String,
}

/// One measurement event against a DUT.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub session_id: i64,
    pub dut_id: i64,
    pub session_name: String,
    pub measurement_datetime: NaiveDateTime,
    pub operator: Option<String>,
    pub system_version: Option<String>,
    pub notes: Option<String>,
}

/// A named ambient/setup parameter recorded at measurement time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    pub condition_id: i64,
    pub session_id: i64,
    pub key: String,
    pub value: f64,
    pub unit: Option<String>,
}

/// A reference to one raw-data artifact, e.g. a spectrum file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementData {
    pub data_id: i64,
    pub session_id: i64,
    pub data_type: String,
    pub file_path: String,
    pub created_time: NaiveDateTime,
}

/// A named metadata attribute of one data artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataInfo {
    pub info_id: i64,
    pub data_id: i64,
    pub key: String,
    pub value: f64,
    pub unit: Option<String>,
}

/// One execution of an analysis algorithm over a session's data.
///
/// `analysis_index` is a caller-assigned ordinal, unique within
/// (session, analysis_type); multi-pass workflows pick their own
/// non-colliding values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRun {
    pub analysis_id: i64,
    pub session_id: i64,
    pub analysis_type: String,
    pub analysis_index: i64,
    pub created_time: NaiveDateTime,
}

/// Lineage edge: one data artifact consumed by one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnalysisInput {
    pub analysis_id: i64,
    pub data_id: i64,
}

/// One detected observable (peak/valley) within an analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisFeature {
    pub feature_id: i64,
    pub analysis_id: i64,
    pub feature_type: String,
    pub feature_index: i64,
}

/// One named numeric measurement of a feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureValue {
    pub value_id: i64,
    pub feature_id: i64,
    pub key: String,
    pub value: f64,
    pub unit: Option<String>,
}

/// A data artifact together with its metadata attributes.
#[derive(Debug, Clone, Serialize)]
pub struct DataWithInfo {
    pub data: MeasurementData,
    pub info: Vec<DataInfo>,
}

/// A feature together with its values.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureInfo {
    pub feature: AnalysisFeature,
    pub values: Vec<FeatureValue>,
}

/// An analysis run with its input artifacts and detected features.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRunInfo {
    pub run: AnalysisRun,
    pub inputs: Vec<MeasurementData>,
    pub features: Vec<FeatureInfo>,
}

/// The complete picture of one measurement session: the owning DUT,
/// all conditions, all data artifacts with their info, and all
/// analysis runs with nested features and values.
#[derive(Debug, Clone, Serialize)]
pub struct SessionFullInfo {
    pub session: Session,
    pub dut: Dut,
    pub conditions: Vec<Condition>,
    pub measurement_data: Vec<DataWithInfo>,
    pub analysis_runs: Vec<AnalysisRunInfo>,
}
