//! site.toml configuration loading.

use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::Deserialize;

/// Configuration file structure (site.toml).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub build: BuildSettings,
    #[serde(default)]
    pub dev: DevSettings,
}

#[derive(Debug, Deserialize)]
pub struct PathsConfig {
    /// Source tree root
    #[serde(default = "default_src")]
    pub src: String,

    /// Output root
    #[serde(default = "default_out")]
    pub out: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            src: default_src(),
            out: default_out(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BuildSettings {
    /// Minify CSS/JS output
    #[serde(default = "default_minify")]
    pub minify: bool,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            minify: default_minify(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DevSettings {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_open")]
    pub open: bool,
}

impl Default for DevSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
            open: default_open(),
        }
    }
}

fn default_src() -> String {
    "src".to_string()
}
fn default_out() -> String {
    "dist".to_string()
}
fn default_minify() -> bool {
    true
}
fn default_port() -> u16 {
    3000
}
fn default_open() -> bool {
    true
}

/// Load configuration from site.toml if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load(path: &Path) -> Result<ConfigFile> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let config: ConfigFile = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
        tracing::info!("Loaded config from {}", path.display());
        return Ok(config);
    }
    Ok(ConfigFile::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_file_yields_defaults() {
        let config = load(&PathBuf::from("/nonexistent/site.toml")).unwrap();

        assert_eq!(config.paths.src, "src");
        assert_eq!(config.paths.out, "dist");
        assert_eq!(config.dev.port, 3000);
        assert!(config.dev.open);
        assert!(config.build.minify);
    }

    #[test]
    fn minification_can_be_disabled_in_config() {
        let config: ConfigFile = toml::from_str("[build]\nminify = false\n").unwrap();

        assert!(!config.build.minify);
        assert_eq!(config.paths.src, "src");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let config: ConfigFile = toml::from_str("[dev]\nport = 8080\n").unwrap();

        assert_eq!(config.dev.port, 8080);
        assert_eq!(config.paths.out, "dist");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("site.toml");
        std::fs::write(&path, "[paths\nsrc = ").unwrap();

        assert!(load(&path).is_err());
    }
}
