use crate::types::DatabaseError;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Runtime configuration for the `kvsql` binary.
///
/// Load order, later sources winning: built-in defaults, `./kvsql.toml`,
/// `KVSQL_*` environment variables. Command-line flags are applied on top by
/// the caller.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub memory: bool,
    pub log_level: String,
}

impl Settings {
    pub const CONFIG_FILE: &'static str = "kvsql.toml";
    pub const ENV_PREFIX: &'static str = "KVSQL";

    pub fn load() -> Result<Self, DatabaseError> {
        Self::load_from(Path::new(Self::CONFIG_FILE))
    }

    /// Like [`Settings::load`] with an explicit config file; a missing file is skipped.
    pub fn load_from(config_file: &Path) -> Result<Self, DatabaseError> {
        let settings = Config::builder()
            .set_default("data_dir", Self::default_data_dir().to_string_lossy().to_string())?
            .set_default("memory", false)?
            .set_default("log_level", "warn")?
            .add_source(File::from(config_file).required(false))
            .add_source(Environment::with_prefix(Self::ENV_PREFIX))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// `<platform data dir>/kvsql`, or `./data` when the platform has none
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir().map_or_else(|| PathBuf::from("./data"), |dir| dir.join("kvsql"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_file() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::load_from(&temp_dir.path().join("absent.toml")).unwrap();
        assert!(!settings.memory);
        assert_eq!(settings.log_level, "warn");
        assert_eq!(settings.data_dir, Settings::default_data_dir());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kvsql.toml");
        std::fs::write(&path, "data_dir = \"/tmp/kvsql-test\"\nlog_level = \"debug\"\n").unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.data_dir, PathBuf::from("/tmp/kvsql-test"));
        assert_eq!(settings.log_level, "debug");
        assert!(!settings.memory);
    }
}
