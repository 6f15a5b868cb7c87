//! Database schema definitions
//!
//! All statements are re-runnable: creation is a no-op against an
//! already-initialized store. Uniqueness constraints double as the
//! upsert keys used by the access layer, and every child table
//! cascades on parent deletion.

/// SQL to create the duts table
pub const CREATE_DUTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS duts (
    dut_id INTEGER PRIMARY KEY,
    wafer TEXT NOT NULL,
    doe TEXT NOT NULL,
    die INTEGER NOT NULL,
    cage TEXT NOT NULL,
    device TEXT NOT NULL,
    UNIQUE(wafer, doe, die, cage, device)
)
"#;

/// SQL to create the measurement_sessions table
pub const CREATE_SESSIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS measurement_sessions (
    session_id INTEGER PRIMARY KEY,
    dut_id INTEGER NOT NULL REFERENCES duts(dut_id) ON DELETE CASCADE,
    session_name TEXT NOT NULL,
    measurement_datetime TEXT NOT NULL,
    operator TEXT,
    system_version TEXT,
    notes TEXT,
    UNIQUE(dut_id, session_name)
)
"#;

/// SQL to create the experimental_conditions table
///
/// `unit` is NOT NULL with '' standing in for "no unit": SQLite treats
/// NULLs as distinct in UNIQUE constraints, which would let duplicate
/// unitless rows through the upsert key.
pub const CREATE_CONDITIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS experimental_conditions (
    condition_id INTEGER PRIMARY KEY,
    session_id INTEGER NOT NULL REFERENCES measurement_sessions(session_id) ON DELETE CASCADE,
    key TEXT NOT NULL,
    value REAL NOT NULL,
    unit TEXT NOT NULL DEFAULT '',
    UNIQUE(session_id, key, unit)
)
"#;

/// SQL to create the measurement_data table
pub const CREATE_MEASUREMENT_DATA_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS measurement_data (
    data_id INTEGER PRIMARY KEY,
    session_id INTEGER NOT NULL REFERENCES measurement_sessions(session_id) ON DELETE CASCADE,
    data_type TEXT NOT NULL,
    file_path TEXT NOT NULL,
    created_time TEXT NOT NULL,
    UNIQUE(session_id, file_path)
)
"#;

/// SQL to create the data_info table
pub const CREATE_DATA_INFO_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS data_info (
    info_id INTEGER PRIMARY KEY,
    data_id INTEGER NOT NULL REFERENCES measurement_data(data_id) ON DELETE CASCADE,
    key TEXT NOT NULL,
    value REAL NOT NULL,
    unit TEXT NOT NULL DEFAULT '',
    UNIQUE(data_id, key, unit)
)
"#;

/// SQL to create the analysis_runs table
pub const CREATE_ANALYSIS_RUNS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS analysis_runs (
    analysis_id INTEGER PRIMARY KEY,
    session_id INTEGER NOT NULL REFERENCES measurement_sessions(session_id) ON DELETE CASCADE,
    analysis_type TEXT NOT NULL,
    analysis_index INTEGER NOT NULL,
    created_time TEXT NOT NULL,
    UNIQUE(session_id, analysis_type, analysis_index)
)
"#;

/// SQL to create the analysis_inputs table
///
/// Pure many-to-many edge set between analysis runs and measurement
/// data; the composite primary key rules out duplicate edges.
pub const CREATE_ANALYSIS_INPUTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS analysis_inputs (
    analysis_id INTEGER NOT NULL REFERENCES analysis_runs(analysis_id) ON DELETE CASCADE,
    data_id INTEGER NOT NULL REFERENCES measurement_data(data_id) ON DELETE CASCADE,
    PRIMARY KEY (analysis_id, data_id)
)
"#;

/// SQL to create the analysis_features table
pub const CREATE_ANALYSIS_FEATURES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS analysis_features (
    feature_id INTEGER PRIMARY KEY,
    analysis_id INTEGER NOT NULL REFERENCES analysis_runs(analysis_id) ON DELETE CASCADE,
    feature_type TEXT NOT NULL,
    feature_index INTEGER NOT NULL,
    UNIQUE(analysis_id, feature_type, feature_index)
)
"#;

/// SQL to create the feature_values table
pub const CREATE_FEATURE_VALUES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS feature_values (
    value_id INTEGER PRIMARY KEY,
    feature_id INTEGER NOT NULL REFERENCES analysis_features(feature_id) ON DELETE CASCADE,
    key TEXT NOT NULL,
    value REAL NOT NULL,
    unit TEXT NOT NULL DEFAULT '',
    UNIQUE(feature_id, key, unit)
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_sessions_dut ON measurement_sessions(dut_id)",
    "CREATE INDEX IF NOT EXISTS idx_sessions_datetime ON measurement_sessions(measurement_datetime)",
    "CREATE INDEX IF NOT EXISTS idx_conditions_session ON experimental_conditions(session_id)",
    "CREATE INDEX IF NOT EXISTS idx_data_session ON measurement_data(session_id)",
    "CREATE INDEX IF NOT EXISTS idx_data_info_data ON data_info(data_id)",
    "CREATE INDEX IF NOT EXISTS idx_runs_session ON analysis_runs(session_id)",
    "CREATE INDEX IF NOT EXISTS idx_inputs_data ON analysis_inputs(data_id)",
    "CREATE INDEX IF NOT EXISTS idx_features_analysis ON analysis_features(analysis_id)",
    "CREATE INDEX IF NOT EXISTS idx_values_feature ON feature_values(feature_id)",
    "CREATE INDEX IF NOT EXISTS idx_values_key ON feature_values(key)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_DUTS_TABLE,
        CREATE_SESSIONS_TABLE,
        CREATE_CONDITIONS_TABLE,
        CREATE_MEASUREMENT_DATA_TABLE,
        CREATE_DATA_INFO_TABLE,
        CREATE_ANALYSIS_RUNS_TABLE,
        CREATE_ANALYSIS_INPUTS_TABLE,
        CREATE_ANALYSIS_FEATURES_TABLE,
        CREATE_FEATURE_VALUES_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}

/// The stored entities, in parent-before-child order.
///
/// Count and export operations go through this enum so table names are
/// never interpolated from caller input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Dut,
    Session,
    Condition,
    Data,
    DataInfo,
    AnalysisRun,
    AnalysisInput,
    AnalysisFeature,
    FeatureValue,
}

impl Entity {
    pub const ALL: [Entity; 9] = [
        Entity::Dut,
        Entity::Session,
        Entity::Condition,
        Entity::Data,
        Entity::DataInfo,
        Entity::AnalysisRun,
        Entity::AnalysisInput,
        Entity::AnalysisFeature,
        Entity::FeatureValue,
    ];

    pub fn table_name(self) -> &'static str {
        match self {
            Entity::Dut => "duts",
            Entity::Session => "measurement_sessions",
            Entity::Condition => "experimental_conditions",
            Entity::Data => "measurement_data",
            Entity::DataInfo => "data_info",
            Entity::AnalysisRun => "analysis_runs",
            Entity::AnalysisInput => "analysis_inputs",
            Entity::AnalysisFeature => "analysis_features",
            Entity::FeatureValue => "feature_values",
        }
    }
}
