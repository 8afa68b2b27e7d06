//! Config file formats

use crate::Config;
use std::fmt;
use std::path::Path;
use switchyard_core::{Error, Result};

/// Serialization format of a config file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.yaml` / `.yml`
    Yaml,
    /// `.toml`
    Toml,
    /// `.json`
    Json,
}

impl ConfigFormat {
    /// Pick the format from the file extension, ignoring case
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| {
                Error::Config(format!(
                    "{} has no extension; expected .yaml, .yml, .toml or .json",
                    path.display()
                ))
            })?;

        match ext.as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            other => Err(Error::Config(format!(
                "{}: unsupported config extension '.{other}'",
                path.display()
            ))),
        }
    }

    /// Deserialize an already env-expanded document
    pub(crate) fn parse(self, content: &str) -> Result<Config> {
        let parsed: std::result::Result<Config, String> = match self {
            Self::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            Self::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            Self::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        };
        parsed.map_err(|e| Error::Config(format!("Failed to parse {self}: {e}")))
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Yaml => "YAML",
            Self::Toml => "TOML",
            Self::Json => "JSON",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        let cases = [
            ("switchyard.yaml", ConfigFormat::Yaml),
            ("conf/switchyard.yml", ConfigFormat::Yaml),
            ("SWITCHYARD.YML", ConfigFormat::Yaml),
            ("switchyard.toml", ConfigFormat::Toml),
            ("/etc/switchyard/router.Json", ConfigFormat::Json),
        ];

        for (path, expected) in cases {
            assert_eq!(ConfigFormat::from_path(Path::new(path)).unwrap(), expected, "{path}");
        }
    }

    #[test]
    fn test_unknown_extension_names_the_file() {
        let err = ConfigFormat::from_path(Path::new("routes.ini")).unwrap_err();
        assert!(err.to_string().contains("routes.ini"));
        assert!(err.to_string().contains(".ini"));

        assert!(ConfigFormat::from_path(Path::new("Switchyardfile")).is_err());
    }

    #[test]
    fn test_parse_error_names_the_format() {
        let err = ConfigFormat::Toml.parse("server = [").unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.starts_with("Failed to parse TOML")));
    }
}
