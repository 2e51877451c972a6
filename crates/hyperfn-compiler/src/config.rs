//! Build configuration.
//!
//! Loaded from a TOML file (every key optional), then overlaid with the
//! environment the package manager sets for build scripts:
//!
//! ```toml
//! debug = false
//!
//! [plugin]
//! name = "my-plugin"
//! version = "1.0.0"
//!
//! [metadata]
//! section = "hypermode_meta"
//!
//! [report]
//! enabled = true
//! format = "markdown"
//! color = false
//! ```

use std::path::Path;

use hyperfn_metadata::{ReportFormat, ReportOptions, SECTION_NAME};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Enables the JSON dump in reports when set to any non-empty value.
pub const ENV_DEBUG: &str = "HYPERMODE_DEBUG";
pub const ENV_PACKAGE_NAME: &str = "npm_package_name";
pub const ENV_PACKAGE_VERSION: &str = "npm_package_version";

/// Stand-in for a missing plugin name or version.
const UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default)]
    pub plugin: PluginConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub report: ReportConfig,
    /// Append the raw manifest JSON to the report.
    #[serde(default)]
    pub debug: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PluginConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Custom section the manifest is written to.
    #[serde(default = "default_section")]
    pub section: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub format: ReportFormat,
    #[serde(default)]
    pub color: bool,
}

fn default_section() -> String {
    SECTION_NAME.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            section: default_section(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            format: ReportFormat::default(),
            color: false,
        }
    }
}

impl BuildConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Self {
        Self::default().with_env(|key| std::env::var(key).ok())
    }

    /// Overlay values from `lookup`, which maps a variable name to its value.
    /// Set variables win over file values.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(name) = lookup(ENV_PACKAGE_NAME).filter(|v| !v.is_empty()) {
            self.plugin.name = Some(name);
        }
        if let Some(version) = lookup(ENV_PACKAGE_VERSION).filter(|v| !v.is_empty()) {
            self.plugin.version = Some(version);
        }
        if lookup(ENV_DEBUG).is_some_and(|v| !v.is_empty()) {
            self.debug = true;
        }
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.metadata.section.is_empty() {
            return Err(ConfigError::Invalid(
                "metadata.section must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// `name@version` of the plugin being built.
    pub fn plugin_identity(&self) -> String {
        format!(
            "{}@{}",
            self.plugin.name.as_deref().unwrap_or(UNKNOWN),
            self.plugin.version.as_deref().unwrap_or(UNKNOWN)
        )
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            format: self.report.format,
            color: self.report.color,
            debug_json: self.debug,
        }
    }
}
