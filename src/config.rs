//! Conversion configuration.
//!
//! The manager reads per-provider binary paths and timeouts, the default
//! provider, and the default storage disk from a [`Config`]. Configuration
//! can be built programmatically, deserialized from TOML, or overridden
//! from the environment using the same variable names the original tooling
//! used (`SVG_CONVERTER_DRIVER`, `RESVG_PATH`, `INKSCAPE_TIMEOUT`, ...).

use std::collections::HashMap;
use std::env;

use serde::Deserialize;

use crate::error::ConvertResult;

/// Fallback timeout in seconds when a provider has none configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Per-provider binary path and timeout.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// The binary path or name; defaults to the provider name itself.
    pub binary: Option<String>,
    /// The process timeout in seconds; defaults to 60.
    pub timeout: Option<u64>,
}

/// Top-level conversion configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// The provider used when no one-shot override is active.
    pub default_provider: String,
    /// The disk used by callers that do not name one explicitly.
    pub default_disk: String,
    /// Per-provider settings, keyed by provider name.
    pub providers: HashMap<String, ProviderConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_provider: "resvg".to_string(),
            default_disk: "local".to_string(),
            providers: HashMap::new(),
        }
    }
}

/// The provider names configurable out of the box.
const BUILTIN_PROVIDERS: &[&str] = &["resvg", "inkscape", "rsvg-convert", "cairosvg"];

impl Config {
    /// Creates a configuration with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from a TOML document.
    pub fn from_toml_str(toml: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml)
    }

    /// Loads a configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> ConvertResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents).map_err(|e| {
            crate::error::ConvertError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                e.to_string(),
            ))
        })
    }

    /// Creates a configuration from defaults plus environment overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Applies environment overrides in place.
    ///
    /// `SVG_CONVERTER_DRIVER` and `SVG_CONVERTER_DISK` override the default
    /// provider and disk. For each known provider, `<NAME>_PATH` and
    /// `<NAME>_TIMEOUT` override its binary and timeout, where `<NAME>` is
    /// the provider name upper-cased with dashes replaced by underscores
    /// (e.g. `RSVG_CONVERT_PATH`).
    pub fn apply_env(&mut self) {
        if let Ok(provider) = env::var("SVG_CONVERTER_DRIVER") {
            self.default_provider = provider;
        }

        if let Ok(disk) = env::var("SVG_CONVERTER_DISK") {
            self.default_disk = disk;
        }

        let mut names: Vec<String> = BUILTIN_PROVIDERS.iter().map(|s| s.to_string()).collect();
        names.extend(self.providers.keys().cloned());
        names.sort();
        names.dedup();

        for name in names {
            let env_name = name.to_uppercase().replace('-', "_");

            if let Ok(binary) = env::var(format!("{env_name}_PATH")) {
                self.providers.entry(name.clone()).or_default().binary = Some(binary);
            }

            if let Some(timeout) = env::var(format!("{env_name}_TIMEOUT"))
                .ok()
                .and_then(|v| v.parse().ok())
            {
                self.providers.entry(name.clone()).or_default().timeout = Some(timeout);
            }
        }
    }

    /// Returns the binary for a provider, falling back to the provider name.
    pub fn binary_for(&self, provider: &str) -> String {
        self.providers
            .get(provider)
            .and_then(|p| p.binary.clone())
            .unwrap_or_else(|| provider.to_string())
    }

    /// Returns the timeout in seconds for a provider, falling back to 60.
    pub fn timeout_for(&self, provider: &str) -> u64 {
        self.providers
            .get(provider)
            .and_then(|p| p.timeout)
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    /// Sets a provider's configuration, replacing any existing entry.
    pub fn set_provider(&mut self, name: impl Into<String>, provider: ProviderConfig) {
        self.providers.insert(name.into(), provider);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.default_provider, "resvg");
        assert_eq!(config.default_disk, "local");
        assert_eq!(config.binary_for("inkscape"), "inkscape");
        assert_eq!(config.timeout_for("inkscape"), 60);
    }

    #[test]
    fn test_from_toml() {
        let config = Config::from_toml_str(
            r#"
            default_provider = "inkscape"
            default_disk = "assets"

            [providers.inkscape]
            binary = "/opt/inkscape/bin/inkscape"
            timeout = 120

            [providers."rsvg-convert"]
            timeout = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.default_provider, "inkscape");
        assert_eq!(config.default_disk, "assets");
        assert_eq!(config.binary_for("inkscape"), "/opt/inkscape/bin/inkscape");
        assert_eq!(config.timeout_for("inkscape"), 120);
        assert_eq!(config.timeout_for("rsvg-convert"), 30);
        // Fallbacks still apply to unconfigured providers.
        assert_eq!(config.binary_for("rsvg-convert"), "rsvg-convert");
        assert_eq!(config.binary_for("cairosvg"), "cairosvg");
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(Config::from_toml_str("defualt_provider = \"resvg\"").is_err());
    }

    #[test]
    fn test_env_overrides() {
        env::set_var("SVG_CONVERTER_DRIVER", "cairosvg");
        env::set_var("RESVG_PATH", "/opt/resvg/bin/resvg");
        env::set_var("RSVG_CONVERT_TIMEOUT", "45");

        let config = Config::from_env();

        env::remove_var("SVG_CONVERTER_DRIVER");
        env::remove_var("RESVG_PATH");
        env::remove_var("RSVG_CONVERT_TIMEOUT");

        assert_eq!(config.default_provider, "cairosvg");
        assert_eq!(config.binary_for("resvg"), "/opt/resvg/bin/resvg");
        // The dash in rsvg-convert maps to an underscore in the variable.
        assert_eq!(config.timeout_for("rsvg-convert"), 45);
        // Untouched providers keep their fallbacks.
        assert_eq!(config.binary_for("inkscape"), "inkscape");
        assert_eq!(config.timeout_for("inkscape"), 60);
    }

    #[test]
    fn test_env_covers_custom_providers() {
        env::set_var("MYTOOL_PATH", "/usr/local/bin/mytool");

        let mut config = Config::default();
        config.set_provider("mytool", ProviderConfig::default());
        config.apply_env();

        env::remove_var("MYTOOL_PATH");

        assert_eq!(config.binary_for("mytool"), "/usr/local/bin/mytool");
    }

    #[test]
    fn test_set_provider() {
        let mut config = Config::new();
        config.set_provider(
            "resvg",
            ProviderConfig {
                binary: Some("/usr/local/bin/resvg".to_string()),
                timeout: Some(10),
            },
        );

        assert_eq!(config.binary_for("resvg"), "/usr/local/bin/resvg");
        assert_eq!(config.timeout_for("resvg"), 10);
    }
}
