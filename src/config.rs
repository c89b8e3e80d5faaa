//! Tool configuration.
//!
//! Handles loading, validating, and merging `texture-sweep.toml`. Stock
//! defaults are the base layer; a user file overrides any subset of keys.
//!
//! ## Config File Location
//!
//! Passed explicitly with `--config FILE`, otherwise `texture-sweep.toml` in
//! the working directory is used when present.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [sources]
//! extensions = ["json", "js", "txt", "babylon"]  # Used when --source is a folder
//!
//! [resize]
//! mode = "ratio"            # "ratio" or "fixed_dimensions"
//! ratio_kind = "percent"    # "percent", "fixed_width" or "fixed_height"
//! ratio_value = 50.0
//! fixed_width = 1024
//! fixed_height = 1024
//!
//! [report]
//! max_listed_failures = 5   # Failures listed in batch summaries
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{ResizeMode, ResizePlan};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the working directory when `--config` is absent.
pub const CONFIG_FILE_NAME: &str = "texture-sweep.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Tool configuration loaded from `texture-sweep.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// Which files count as text sources when a folder is given.
    pub sources: SourcesConfig,
    /// Plan used for every file without an explicitly applied plan.
    pub resize: ResizePlan,
    /// Summary output settings.
    pub report: ReportConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl ToolConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ext) = self
            .sources
            .extensions
            .iter()
            .find(|e| e.is_empty() || e.contains('.'))
        {
            return Err(ConfigError::Validation(format!(
                "sources.extensions entries must be bare extensions, got {ext:?}"
            )));
        }
        let plan = &self.resize;
        match plan.mode {
            ResizeMode::Ratio => {
                if !plan.ratio_value.is_finite() || plan.ratio_value <= 0.0 {
                    return Err(ConfigError::Validation(
                        "resize.ratio_value must be a positive number".into(),
                    ));
                }
            }
            ResizeMode::FixedDimensions => {
                if plan.fixed_width == 0 || plan.fixed_height == 0 {
                    return Err(ConfigError::Validation(
                        "resize.fixed_width and resize.fixed_height must be non-zero".into(),
                    ));
                }
            }
        }
        if self.report.max_listed_failures == 0 {
            return Err(ConfigError::Validation(
                "report.max_listed_failures must be at least 1".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Text source selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourcesConfig {
    /// Extensions (without the dot, case-insensitive) picked up when a
    /// source argument is a folder. Empty means every file.
    pub extensions: Vec<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            extensions: ["json", "js", "txt", "babylon"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl SourcesConfig {
    pub fn accepts(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Failures listed individually before the rest are summarised as a count.
    pub max_listed_failures: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            max_listed_failures: 5,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers used while scanning.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ToolConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<ToolConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ToolConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load an explicit config file. A missing file is an error.
pub fn load_config_file(path: &Path) -> Result<ToolConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let overlay: toml::Value = toml::from_str(&content)?;
    resolve_config(Some(overlay))
}

/// Load `texture-sweep.toml` from `dir`, falling back to stock defaults when
/// the file does not exist.
pub fn load_config(dir: &Path) -> Result<ToolConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return resolve_config(None);
    }
    load_config_file(&path)
}

/// Returns a fully-commented stock `texture-sweep.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# texture-sweep Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Pass a file with --config, or place texture-sweep.toml in the directory
# you run the tool from. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Text sources
# ---------------------------------------------------------------------------
[sources]
# When a --source argument is a folder, files with these extensions are
# imported (case-insensitive, no leading dot). An empty list imports all files.
extensions = ["json", "js", "txt", "babylon"]

# ---------------------------------------------------------------------------
# Default resize plan
# ---------------------------------------------------------------------------
[resize]
# "ratio" scales by ratio_kind/ratio_value.
# "fixed_dimensions" writes exactly fixed_width x fixed_height, ignoring
# the original aspect ratio.
mode = "ratio"

# "percent": ratio_value is a percentage of both edges.
# "fixed_width" / "fixed_height": ratio_value is the pinned edge in pixels,
# the other edge follows the aspect ratio.
ratio_kind = "percent"
ratio_value = 50.0

fixed_width = 1024
fixed_height = 1024

# ---------------------------------------------------------------------------
# Reports
# ---------------------------------------------------------------------------
[report]
# Failures listed individually in batch summaries; the rest are counted.
max_listed_failures = 5

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers for folder scans.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::RatioKind;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = ToolConfig::default();
        assert_eq!(config.sources.extensions, vec!["json", "js", "txt", "babylon"]);
        assert_eq!(config.resize, ResizePlan::default());
        assert_eq!(config.report.max_listed_failures, 5);
        assert_eq!(config.processing.max_processes, None);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[resize]
ratio_value = 25.0
"#;
        let config: ToolConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.resize.ratio_value, 25.0);
        assert_eq!(config.resize.ratio_kind, RatioKind::Percent);
        assert_eq!(config.report.max_listed_failures, 5);
    }

    #[test]
    fn parse_fixed_dimensions_plan() {
        let toml = r#"
[resize]
mode = "fixed_dimensions"
fixed_width = 256
fixed_height = 128
"#;
        let config: ToolConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.resize, ResizePlan::fixed_dimensions(256, 128));
    }

    // =========================================================================
    // Source filter tests
    // =========================================================================

    #[test]
    fn sources_accept_configured_extensions_case_insensitively() {
        let sources = SourcesConfig::default();
        assert!(sources.accepts(Path::new("scene.babylon")));
        assert!(sources.accepts(Path::new("LEVEL.JSON")));
        assert!(!sources.accepts(Path::new("hero.png")));
        assert!(!sources.accepts(Path::new("Makefile")));
    }

    #[test]
    fn empty_extension_list_accepts_everything() {
        let sources = SourcesConfig { extensions: vec![] };
        assert!(sources.accepts(Path::new("Makefile")));
        assert!(sources.accepts(Path::new("hero.png")));
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.resize, ResizePlan::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            r#"
[sources]
extensions = ["gltf"]

[report]
max_listed_failures = 2
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.sources.extensions, vec!["gltf"]);
        assert_eq!(config.report.max_listed_failures, 2);
        // Unspecified values should be defaults
        assert_eq!(config.resize.ratio_value, 50.0);
    }

    #[test]
    fn load_config_file_missing_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_config_file(&tmp.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("custom.toml");
        fs::write(&path, "this is not valid toml [[[").unwrap();

        let result = load_config_file(&path);
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    // =========================================================================
    // Processing tests
    // =========================================================================

    #[test]
    fn effective_threads_auto() {
        let config = ProcessingConfig {
            max_processes: None,
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_clamped_to_cores() {
        let config = ProcessingConfig {
            max_processes: Some(99999),
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"ratio_value = 50.0"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"ratio_value = 20.0"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("ratio_value").unwrap().as_float(), Some(20.0));
    }

    #[test]
    fn merge_toml_table_merge_preserves_base_keys() {
        let base: toml::Value = toml::from_str(
            r#"
[resize]
mode = "ratio"
ratio_value = 50.0
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[resize]
ratio_value = 10.0
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let resize = merged.get("resize").unwrap();
        assert_eq!(resize.get("ratio_value").unwrap().as_float(), Some(10.0));
        assert_eq!(resize.get("mode").unwrap().as_str(), Some("ratio"));
    }

    #[test]
    fn merge_toml_array_replaced_not_appended() {
        let base: toml::Value = toml::from_str(r#"extensions = ["json", "js"]"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"extensions = ["txt"]"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("extensions").unwrap().as_array().unwrap().len(), 1);
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let toml_str = r#"
[resize]
ratio = 90
"#;
        let result: Result<ToolConfig, _> = toml::from_str(toml_str);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let toml_str = r#"
[resise]
ratio_value = 90.0
"#;
        let result: Result<ToolConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_key_rejected_via_load_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            r#"
[report]
max_failures = 3
"#,
        )
        .unwrap();

        assert!(load_config(tmp.path()).is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(ToolConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_non_positive_ratio() {
        let mut config = ToolConfig::default();
        config.resize.ratio_value = 0.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ratio_value"));

        config.resize.ratio_value = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_ignores_ratio_in_fixed_mode() {
        let mut config = ToolConfig::default();
        config.resize = ResizePlan::fixed_dimensions(64, 64);
        config.resize.ratio_value = 0.0;
        assert!(config.validate().is_ok());

        config.resize.fixed_height = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_dotted_extension() {
        let mut config = ToolConfig::default();
        config.sources.extensions = vec![".json".into()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_limits() {
        let mut config = ToolConfig::default();
        config.report.max_listed_failures = 0;
        assert!(config.validate().is_err());

        let mut config = ToolConfig::default();
        config.processing.max_processes = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            r#"
[resize]
ratio_value = -5.0
"#,
        )
        .unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // stock config tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: ToolConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = ToolConfig::default();
        assert_eq!(config.sources.extensions, defaults.sources.extensions);
        assert_eq!(config.resize, defaults.resize);
        assert_eq!(config.report.max_listed_failures, 5);
        assert_eq!(config.processing.max_processes, None);
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        assert!(content.contains("[sources]"));
        assert!(content.contains("[resize]"));
        assert!(content.contains("[report]"));
        assert!(content.contains("[processing]"));
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value().unwrap();
        assert!(val.is_table());
        assert!(val.get("sources").is_some());
        assert!(val.get("resize").is_some());
        assert!(val.get("report").is_some());
    }
}
