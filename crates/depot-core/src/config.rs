//! Runtime settings and their loader.
//!
//! Settings files may be RON, TOML or JSON; the format is chosen by file
//! extension. Every field has a default, so a file only lists overrides.

use crate::node::DistanceMetric;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ===========================================================================
// Errors
// ===========================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    #[error("invalid setting {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Settings
// ===========================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub transport: TransportSettings,
    pub lab: LabSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    /// Towers at or below this much energy get refilled.
    pub tower_threshold: u32,
    /// Boost labs below this much substance get reloaded from the terminal.
    pub boost_reload_limit: u32,
    /// Carriers with this many ticks left stop taking jobs.
    pub death_limit: u32,
    /// Ticks between structure scans.
    pub monitor_interval: u64,
    /// Storage energy kept back from nuker and power spawn fills.
    pub energy_reserve: u32,
    pub distance: DistanceMetric,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            tower_threshold: 900,
            boost_reload_limit: 900,
            death_limit: 20,
            monitor_interval: 5,
            energy_reserve: 50_000,
            distance: DistanceMetric::Chebyshev,
        }
    }
}

/// One entry of the reaction priority list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionTarget {
    /// Resource name as registered in the registry.
    pub target: String,
    /// Desired stockpile across storage and terminal.
    pub amount: u32,
}

impl ReactionTarget {
    pub fn new(target: impl Into<String>, amount: u32) -> Self {
        Self {
            target: target.into(),
            amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabSettings {
    /// Smallest batch a reaction accepts.
    pub granularity: u32,
    /// Largest batch loaded into the base labs at once.
    pub max_batch: u32,
    /// Boost labs are topped up to this much energy.
    pub boost_energy: u32,
    pub get_target_interval: u64,
    pub get_resource_interval: u64,
    pub working_interval: u64,
    pub put_resource_interval: u64,
    pub boost_interval: u64,
    pub targets: Vec<ReactionTarget>,
}

impl Default for LabSettings {
    fn default() -> Self {
        Self {
            granularity: 5,
            max_batch: 3000,
            boost_energy: 1000,
            get_target_interval: 10,
            get_resource_interval: 15,
            working_interval: 2,
            put_resource_interval: 15,
            boost_interval: 10,
            targets: vec![
                ReactionTarget::new("OH", 10_000),
                ReactionTarget::new("ZK", 3_000),
                ReactionTarget::new("UL", 3_000),
                ReactionTarget::new("G", 3_000),
                ReactionTarget::new("GH2O", 2_000),
                ReactionTarget::new("XGH2O", 5_000),
                ReactionTarget::new("LHO2", 2_000),
                ReactionTarget::new("XLHO2", 5_000),
            ],
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let lab = &self.lab;
        if lab.granularity == 0 {
            return Err(ConfigError::Invalid {
                field: "lab.granularity",
                reason: "must be positive",
            });
        }
        if lab.max_batch < lab.granularity {
            return Err(ConfigError::Invalid {
                field: "lab.max_batch",
                reason: "must be at least one granule",
            });
        }
        let intervals = [
            ("lab.get_target_interval", lab.get_target_interval),
            ("lab.get_resource_interval", lab.get_resource_interval),
            ("lab.working_interval", lab.working_interval),
            ("lab.put_resource_interval", lab.put_resource_interval),
            ("lab.boost_interval", lab.boost_interval),
            ("transport.monitor_interval", self.transport.monitor_interval),
        ];
        for (field, value) in intervals {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "interval must be positive",
                });
            }
        }
        Ok(())
    }
}

// ===========================================================================
// Loading
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, ConfigError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(ConfigError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

/// Parse settings from text in the given format and validate them.
pub fn parse_settings(content: &str, format: Format) -> Result<Settings, ConfigError> {
    parse_named(content, format, Path::new("<memory>"))
}

/// Read, parse and validate a settings file.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    parse_named(&content, format, path)
}

fn parse_named(content: &str, format: Format, file: &Path) -> Result<Settings, ConfigError> {
    let parse_err = |detail: String| ConfigError::Parse {
        file: file.to_path_buf(),
        detail,
    };
    let settings: Settings = match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_err(e.to_string()))?,
        Format::Toml => toml::from_str(content).map_err(|e| parse_err(e.to_string()))?,
        Format::Json => serde_json::from_str(content).map_err(|e| parse_err(e.to_string()))?,
    };
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.transport.tower_threshold, 900);
        assert_eq!(settings.lab.granularity, 5);
        assert_eq!(settings.lab.working_interval, 2);
    }

    #[test]
    fn detect_format_by_extension() {
        assert_eq!(detect_format(Path::new("a.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("a.toml")).unwrap(), Format::Toml);
        assert_eq!(detect_format(Path::new("a.json")).unwrap(), Format::Json);
        assert!(matches!(
            detect_format(Path::new("a.yaml")),
            Err(ConfigError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn toml_overrides_only_listed_fields() {
        let text = r#"
            [transport]
            tower_threshold = 500

            [lab]
            working_interval = 3
            targets = [{ target = "OH", amount = 100 }]
        "#;
        let settings = parse_settings(text, Format::Toml).unwrap();
        assert_eq!(settings.transport.tower_threshold, 500);
        assert_eq!(settings.transport.death_limit, 20);
        assert_eq!(settings.lab.working_interval, 3);
        assert_eq!(settings.lab.targets, vec![ReactionTarget::new("OH", 100)]);
    }

    #[test]
    fn ron_and_json_parse() {
        let ron_text = "(lab: (granularity: 10, max_batch: 100))";
        let settings = parse_settings(ron_text, Format::Ron).unwrap();
        assert_eq!(settings.lab.granularity, 10);

        let json_text = r#"{ "transport": { "distance": "manhattan" } }"#;
        let settings = parse_settings(json_text, Format::Json).unwrap();
        assert_eq!(settings.transport.distance, DistanceMetric::Manhattan);
    }

    #[test]
    fn zero_granularity_is_rejected() {
        let text = r#"{ "lab": { "granularity": 0 } }"#;
        assert!(matches!(
            parse_settings(text, Format::Json),
            Err(ConfigError::Invalid {
                field: "lab.granularity",
                ..
            })
        ));
    }

    #[test]
    fn malformed_input_is_a_parse_error() {
        assert!(matches!(
            parse_settings("[[[", Format::Toml),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = std::env::temp_dir().join(format!("depot-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.ron");
        std::fs::write(&path, "(transport: (death_limit: 30))").unwrap();
        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.transport.death_limit, 30);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
