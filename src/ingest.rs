//! Folder ingestion
//!
//! Measurement files carry their metadata in the filename:
//!
//! `{datatype}_{wafer}_die{die}_{cage}_{device}_{temp}C_ch_{in}_{out}_{power}dBm_pn_{drive}mV_heat_{heater}_mV.csv`
//!
//! Each file that parses becomes one DUT (upserted), one session named
//! after the folder, a set of experimental conditions, and one
//! measurement-data row referencing the file. Files that do not match
//! the convention are skipped and reported, never fatal. The whole
//! batch commits as one transaction, and re-running the same folder is
//! a no-op thanks to the upsert keys.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{Local, NaiveDateTime, Timelike};
use regex::Regex;

use crate::storage::Database;
use crate::{Error, Result};

const SUPPORTED_EXTENSIONS: &[&str] = &["csv", "txt", "s2p"];

static MAIN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        ^(?P<datatype>[^_]+)
        _(?P<wafer>[^_]+)
        _die(?P<die>\d+)
        _(?P<cage>[^_]+)
        _(?P<device>[^_]+)
        _(?P<temperature>-?\d+)C
        _ch_(?P<ch_in>\d+)
        _(?P<ch_out>\d+)
        _(?P<power>-?\d+)dBm
        _pn_(?P<drive_mv>-?\d+(?:\.\d+)?)mV
        _heat_(?P<heater_mv>-?\d+(?:\.\d+)?)_mV
        \.(?:csv|txt|s2p)$",
    )
    .expect("filename pattern is valid")
});

/// Attributes extracted from one measurement filename
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFilename {
    pub datatype: String,
    pub wafer: String,
    pub die: i64,
    pub cage: String,
    pub device: String,
    pub temperature_c: f64,
    pub channel_in: i64,
    pub channel_out: i64,
    pub power_dbm: f64,
    pub drive_mv: f64,
    pub heater_mv: f64,
}

/// Parse one filename against the measurement convention
pub fn parse_filename(filename: &str) -> Result<ParsedFilename> {
    let name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::Parse(format!("not a valid filename: {}", filename)))?;
    let captures = MAIN_PATTERN
        .captures(name)
        .ok_or_else(|| Error::Parse(format!("filename does not match convention: {}", name)))?;

    let field = |key: &str| captures.name(key).map(|m| m.as_str()).unwrap_or("");
    let number = |key: &str| {
        field(key)
            .parse::<f64>()
            .map_err(|_| Error::Parse(format!("bad numeric field {} in {}", key, name)))
    };
    let integer = |key: &str| {
        field(key)
            .parse::<i64>()
            .map_err(|_| Error::Parse(format!("bad integer field {} in {}", key, name)))
    };

    Ok(ParsedFilename {
        datatype: field("datatype").to_string(),
        wafer: field("wafer").to_string(),
        die: integer("die")?,
        cage: field("cage").to_string(),
        device: field("device").to_string(),
        temperature_c: number("temperature")?,
        channel_in: integer("ch_in")?,
        channel_out: integer("ch_out")?,
        power_dbm: number("power")?,
        drive_mv: number("drive_mv")?,
        heater_mv: number("heater_mv")?,
    })
}

/// Result of enumerating a folder: files that parsed, names that didn't
#[derive(Debug, Default)]
pub struct FolderScan {
    pub files: Vec<(PathBuf, ParsedFilename)>,
    pub skipped: Vec<String>,
}

/// Enumerate candidate files in a folder and parse their names.
/// A missing folder is an unrecoverable setup error.
pub fn scan_folder(folder: &Path) -> Result<FolderScan> {
    if !folder.is_dir() {
        return Err(Error::Configuration(format!("folder not found: {}", folder.display())));
    }

    let mut scan = FolderScan::default();
    for entry in std::fs::read_dir(folder)? {
        let path = entry?.path();
        if !path.is_file() || !has_supported_extension(&path) {
            continue;
        }
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("").to_string();
        match parse_filename(&name) {
            Ok(parsed) => scan.files.push((path, parsed)),
            Err(e) => {
                tracing::debug!("skipping {}: {}", name, e);
                scan.skipped.push(name);
            }
        }
    }
    // directory order is filesystem-dependent
    scan.files.sort_by(|a, b| a.0.cmp(&b.0));
    scan.skipped.sort();
    Ok(scan)
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Session-level attributes the filename cannot carry
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// DOE coordinate of the imported DUTs; the filename convention
    /// has no DOE field.
    pub doe: String,
    pub operator: Option<String>,
    pub system_version: Option<String>,
    pub notes: Option<String>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            doe: "NA".to_string(),
            operator: Some("T&P".to_string()),
            system_version: Some("CM300v1.0".to_string()),
            notes: None,
        }
    }
}

/// Outcome of one folder import
#[derive(Debug)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: Vec<String>,
}

/// Import every parseable file in a folder, as one transaction.
///
/// The session is named after the folder and timestamped with the
/// folder's modification time, so re-importing the same folder maps
/// onto the same rows.
pub fn import_folder(db: &Database, folder: &Path, options: &ImportOptions) -> Result<ImportReport> {
    let scan = scan_folder(folder)?;
    let session_name = folder
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::Configuration(format!("bad folder name: {}", folder.display())))?
        .to_string();
    let session_time = modified_time(folder)?;

    let progress = crate::ui::import_progress(scan.files.len() as u64);
    db.with_transaction(|db| {
        for (path, parsed) in &scan.files {
            import_one(db, path, parsed, &session_name, session_time, options)?;
            progress.inc(1);
        }
        Ok(())
    })?;
    progress.finish_and_clear();

    for name in &scan.skipped {
        tracing::warn!("skipped (filename does not match convention): {}", name);
    }
    tracing::info!(
        "imported {} file(s) from {}, skipped {}",
        scan.files.len(),
        folder.display(),
        scan.skipped.len()
    );

    Ok(ImportReport { imported: scan.files.len(), skipped: scan.skipped })
}

fn import_one(
    db: &Database,
    path: &Path,
    parsed: &ParsedFilename,
    session_name: &str,
    session_time: NaiveDateTime,
    options: &ImportOptions,
) -> Result<()> {
    let dut_id = db.insert_dut(&parsed.wafer, &options.doe, parsed.die, &parsed.cage, &parsed.device)?;
    let session_id = db.insert_session(
        dut_id,
        session_name,
        Some(session_time),
        options.operator.as_deref(),
        options.system_version.as_deref(),
        options.notes.as_deref(),
    )?;

    // measurement environment
    db.insert_experimental_conditions(
        session_id,
        &[
            ("temperature", (parsed.temperature_c, "C").into()),
            ("drive_voltage", (parsed.drive_mv, "mV").into()),
            ("heater_voltage", (parsed.heater_mv, "mV").into()),
        ],
    )?;

    let data_id = db.insert_measurement_data(
        session_id,
        &parsed.datatype,
        &path.to_string_lossy(),
        Some(modified_time(path)?),
    )?;

    // optical path of this artifact
    db.insert_data_info(
        data_id,
        &[
            ("channel_in", (parsed.channel_in as f64).into()),
            ("channel_out", (parsed.channel_out as f64).into()),
            ("power", (parsed.power_dbm, "dBm").into()),
        ],
    )?;

    Ok(())
}

fn modified_time(path: &Path) -> Result<NaiveDateTime> {
    let modified = std::fs::metadata(path)?.modified()?;
    let dt: chrono::DateTime<Local> = modified.into();
    let naive = dt.naive_local();
    Ok(naive.with_nanosecond(0).unwrap_or(naive))
}
