//! Loading the pipeline configuration from YAML and CLI overrides

use super::cli::Cli;
use super::schema::PipelineConfig;
use super::validate::validate_config;
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Read, parse and validate a YAML configuration file
pub fn load_config_file(path: &Path) -> Result<PipelineConfig> {
    let yaml_content = fs::read_to_string(path).map_err(|e| {
        Error::ConfigError(format!("Failed to read config file {}: {e}", path.display()))
    })?;

    let config: PipelineConfig = serde_yaml::from_str(&yaml_content)
        .map_err(|e| Error::ConfigError(format!("Failed to parse YAML config: {e}")))?;

    validate_config(&config).map_err(|e| Error::ConfigError(format!("Invalid config: {e}")))?;
    Ok(config)
}

/// Build the effective configuration for a CLI invocation
///
/// Starts from the `--config` file (or the defaults), then applies `--root`.
pub fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(root) = &cli.root {
        config.root = root.clone();
    }
    validate_config(&config).map_err(|e| Error::ConfigError(format!("Invalid config: {e}")))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_args;
    use std::path::PathBuf;

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.yaml");
        fs::write(&path, "tokenizer:\n  max_len: 32\nexplain:\n  max_evals: 64\n").unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.tokenizer.max_len, 32);
        assert_eq!(config.explain.max_evals, 64);
        assert_eq!(config.train.epochs, 1);
    }

    #[test]
    fn test_load_config_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.yaml");
        fs::write(&path, "train:\n  epochs: 0\n").unwrap();

        let err = load_config_file(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid epochs"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config_file(Path::new("/nonexistent/pipeline.yaml")).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_root_override() {
        let cli = parse_args(["veraz", "train", "--root", "/data/run"]).unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.root, PathBuf::from("/data/run"));
        assert_eq!(config.test_csv(), PathBuf::from("/data/run/data/test.csv"));
    }
}
