// Configuration: command-line flags (with env fallbacks) and an optional
// JSON config file. Flags and env vars win over the file. Nothing is
// validated here; empty values are handed to the client as they are.

use crate::model::Credentials;
use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Analyze a remote image with the Computer Vision service.
#[derive(Parser, Debug)]
#[command(name = "vision-quickstart", version, about)]
pub struct Cli {
    /// Subscription key of the Computer Vision resource
    #[arg(long, env = "VISION_KEY", hide_env_values = true)]
    pub key: Option<String>,

    /// Endpoint of the resource, e.g. https://<name>.cognitiveservices.azure.com/
    #[arg(long, env = "VISION_ENDPOINT")]
    pub endpoint: Option<String>,

    /// JSON config file with `key` and `endpoint`
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Image URL to analyze; prompts on stdin when omitted
    #[arg(long)]
    pub url: Option<String>,

    /// Debug logging and full error reports
    #[arg(short, long)]
    pub verbose: bool,
}

/// Shape of the config file. Both fields are optional.
#[derive(Deserialize, Debug, Default, PartialEq)]
pub struct FileConfig {
    pub key: Option<String>,
    pub endpoint: Option<String>,
}

/// `<config_dir>/vision-quickstart/config.json`, when the platform has a
/// config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("vision-quickstart").join("config.json"))
}

/// Read and parse a config file.
pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let cfg = serde_json::from_str(&data)
        .with_context(|| format!("Parsing config file {}", path.display()))?;
    Ok(cfg)
}

impl Cli {
    /// Config from `--config`, or from the default location if a file is
    /// there. Only an explicitly named file is required to exist.
    pub fn file_config(&self) -> Result<FileConfig> {
        if let Some(path) = &self.config {
            return load_file_config(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "loading default config file");
                load_file_config(&path)
            }
            _ => Ok(FileConfig::default()),
        }
    }

    pub fn credentials(&self) -> Result<Credentials> {
        let file = self.file_config()?;
        Ok(resolve_credentials(
            self.key.clone(),
            self.endpoint.clone(),
            file,
        ))
    }
}

/// Merge flag/env values over the file. Missing values become empty
/// strings and are logged, never rejected.
pub fn resolve_credentials(
    key: Option<String>,
    endpoint: Option<String>,
    file: FileConfig,
) -> Credentials {
    let creds = Credentials::new(
        key.or(file.key).unwrap_or_default(),
        endpoint.or(file.endpoint).unwrap_or_default(),
    );
    if creds.key.is_empty() {
        tracing::warn!("no subscription key configured, the service will reject the request");
    }
    if creds.endpoint.is_empty() {
        tracing::warn!("no endpoint configured");
    }
    tracing::debug!(?creds, "resolved credentials");
    creds
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn flags_override_the_file() {
        let file = FileConfig {
            key: Some("file-key".into()),
            endpoint: Some("https://file.example.com/".into()),
        };
        let creds = resolve_credentials(Some("flag-key".into()), None, file);
        assert_eq!(creds.key, "flag-key");
        assert_eq!(creds.endpoint, "https://file.example.com/");
    }

    #[test]
    fn missing_values_resolve_to_empty() {
        let creds = resolve_credentials(None, None, FileConfig::default());
        assert_eq!(creds, Credentials::new("", ""));
    }

    #[test]
    fn loads_a_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"key": "abc123", "endpoint": "https://westus.api.cognitive.microsoft.com/"}}"#
        )
        .unwrap();

        let cfg = load_file_config(file.path()).unwrap();
        assert_eq!(cfg.key.as_deref(), Some("abc123"));
        assert_eq!(
            cfg.endpoint.as_deref(),
            Some("https://westus.api.cognitive.microsoft.com/")
        );
    }

    #[test]
    fn partial_config_file_is_fine() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"endpoint": "https://e.example.com"}}"#).unwrap();
        let cfg = load_file_config(file.path()).unwrap();
        assert_eq!(cfg.key, None);
    }

    #[test]
    fn malformed_config_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "key = abc").unwrap();
        let err = load_file_config(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("Parsing config file"));
    }

    #[test]
    fn explicit_config_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from([
            "vision-quickstart",
            "--config",
            dir.path().join("missing.json").to_str().unwrap(),
        ])
        .unwrap();
        assert!(cli.file_config().is_err());
    }

    #[test]
    fn parses_flags() {
        let cli = Cli::try_parse_from([
            "vision-quickstart",
            "--key",
            "k",
            "--endpoint",
            "https://e.example.com",
            "--url",
            "https://example.com/cat.jpg",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.key.as_deref(), Some("k"));
        assert_eq!(cli.endpoint.as_deref(), Some("https://e.example.com"));
        assert_eq!(cli.url.as_deref(), Some("https://example.com/cat.jpg"));
        assert!(cli.verbose);
    }
}
