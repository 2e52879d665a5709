//! Sidecar configuration.
//!
//! Read from the TOML file named by `GRADEJOURNALD_CONFIG`. Every key is
//! optional; a missing file means defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "GRADEJOURNALD_CONFIG";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct JournalConfig {
    /// `tracing_subscriber::EnvFilter` directive, used when `RUST_LOG` is unset.
    pub log_filter: String,
    pub export: ExportConfig,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            export: ExportConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum HeaderLabels {
    #[default]
    Canonical,
    Localized,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    pub csv_bom: bool,
    pub header_labels: HeaderLabels,
    pub sheet_name: String,
    pub column_width: f64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            csv_bom: true,
            header_labels: HeaderLabels::Canonical,
            sheet_name: "Журнал оценок".to_string(),
            column_width: 20.0,
        }
    }
}

impl JournalConfig {
    pub fn config_path() -> Option<PathBuf> {
        std::env::var_os(CONFIG_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    pub fn load() -> anyhow::Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.to_string_lossy()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("invalid config {}", path.to_string_lossy()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg: JournalConfig = toml::from_str(
            r#"
            [export]
            header_labels = "localized"
            "#,
        )
        .expect("parse");
        assert_eq!(cfg.log_filter, "info");
        assert_eq!(cfg.export.header_labels, HeaderLabels::Localized);
        assert!(cfg.export.csv_bom);
        assert_eq!(cfg.export.sheet_name, "Журнал оценок");
        assert_eq!(cfg.export.column_width, 20.0);
    }

    #[test]
    fn load_from_reports_bad_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("gradejournald.toml");
        std::fs::write(&path, "log_filter = [").expect("write");
        assert!(JournalConfig::load_from(&path).is_err());

        std::fs::write(&path, "log_filter = \"debug\"\n[export]\ncsv_bom = false\n").expect("write");
        let cfg = JournalConfig::load_from(&path).expect("load");
        assert_eq!(cfg.log_filter, "debug");
        assert!(!cfg.export.csv_bom);
    }
}
