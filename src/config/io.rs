use super::models::AppConfig;
use super::tables::ConfigTables;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Load configuration from the given path, falling back to defaults on error.
pub fn load_config(path: &Path) -> AppConfig {
    let contents = match fs::read_to_string(path) {
        Ok(data) => {
            info!(path = %path.display(), "Loaded base config");
            data
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                "Falling back to default config: {err}"
            );
            return AppConfig::default();
        }
    };

    match parse_config(&contents) {
        Ok(cfg) => {
            debug!("Parsed configuration from disk");
            cfg
        }
        Err(err) => {
            warn!(path = %path.display(), "Invalid config TOML: {err:#}");
            AppConfig::default()
        }
    }
}

/// Parse the sectioned TOML layout into a flat [`AppConfig`].
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let tables: ConfigTables = toml::from_str(contents).context("Failed to parse config TOML")?;
    Ok(tables.into())
}

pub fn serialize_config(config: &AppConfig) -> Result<String> {
    toml::to_string(&ConfigTables::from(config)).context("Failed to serialize config")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConsolidationMode, LogLevel, OrderSource};

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = parse_config("").expect("empty config should parse");
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.mode, ConsolidationMode::Filtered);
        assert_eq!(cfg.segment_limit(), Some(380_000));
        assert!((cfg.markup_threshold() - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn sections_override_individual_fields() {
        let cfg = parse_config(
            r#"
[logging]
log_level = "debug"

[extraction]
order_source = "spine"

[consolidation]
mode = "basic"
basic_markup_threshold = 0.4

[segments]
base_name = "part"
char_limit = 0
"#,
        )
        .expect("config should parse");

        assert_eq!(cfg.log_level, LogLevel::Debug);
        assert_eq!(cfg.order_source, OrderSource::Spine);
        assert_eq!(cfg.mode, ConsolidationMode::Basic);
        assert!((cfg.markup_threshold() - 0.4).abs() < f64::EPSILON);
        assert_eq!(cfg.segment_base_name, "part");
        assert_eq!(cfg.segment_limit(), None);
        assert_eq!(cfg.min_lines, 5);
        assert_eq!(cfg.order_file_name, "files_order.txt");
    }

    #[test]
    fn serialized_config_parses_back() {
        let mut cfg = AppConfig::default();
        cfg.copyright_keywords = vec!["licensed".to_string()];
        cfg.write_report = true;
        let text = serialize_config(&cfg).expect("serialize");
        assert!(text.contains("[consolidation]"));
        assert_eq!(parse_config(&text).expect("parse"), cfg);
    }

    #[test]
    fn unknown_enum_value_is_rejected() {
        assert!(parse_config("[consolidation]\nmode = \"aggressive\"\n").is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&dir.path().join("absent.toml"));
        assert_eq!(cfg, AppConfig::default());
    }
}
