use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Optional per-project settings, read from `optodb.toml` when present.
/// CLI flags win over config values, config values over built-in
/// defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OptodbConfig {
    pub database: Option<String>,
    pub doe: Option<String>,
    pub operator: Option<String>,
    pub system_version: Option<String>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("optodb.toml")
}

pub fn default_database_path() -> PathBuf {
    PathBuf::from("measurement_data.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<OptodbConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: OptodbConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(Some(&dir.path().join("optodb.toml"))).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_load_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("optodb.toml");
        std::fs::write(&path, "database = \"lab.db\"\noperator = \"T&P\"\n").unwrap();

        let config = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(config.database.as_deref(), Some("lab.db"));
        assert_eq!(config.operator.as_deref(), Some("T&P"));
        assert!(config.doe.is_none());
    }
}
