//! Configuration types for HSSP conversion

use crate::HsspError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub conversion: ConversionConfig,
    #[serde(default)]
    pub performance: PerformanceConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Maximum number of hits in the report (0 = keep all)
    #[serde(default = "default_max_hits")]
    pub max_hits: usize,
    /// Cutoff added to the HSSP curve, as a fraction of identity
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Rows aligned over fewer columns are dropped (0 = no floor)
    #[serde(default = "default_min_alignment_length")]
    pub min_alignment_length: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    /// Worker threads (0 = all available cores)
    #[serde(default = "default_threads")]
    pub threads: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_seqbase_name")]
    pub seqbase_name: String,
    #[serde(default = "default_seqbase_version")]
    pub seqbase_version: String,
    /// Gzip the report even when the output path has no `.gz` suffix
    #[serde(default = "default_compress")]
    pub compress: bool,
}

// Default value functions
fn default_max_hits() -> usize { 1500 }
fn default_threshold() -> f64 { 0.05 }
fn default_min_alignment_length() -> u32 { 0 }
fn default_threads() -> usize { 0 }
fn default_seqbase_name() -> String { "UniProt".to_string() }
fn default_seqbase_version() -> String { "unknown".to_string() }
fn default_compress() -> bool { false }

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            max_hits: default_max_hits(),
            threshold: default_threshold(),
            min_alignment_length: default_min_alignment_length(),
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
        }
    }
}

impl PerformanceConfig {
    /// Thread count with `0` resolved to the number of available cores
    pub fn resolved_threads(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            seqbase_name: default_seqbase_name(),
            seqbase_version: default_seqbase_version(),
            compress: default_compress(),
        }
    }
}

pub fn default_config() -> Config {
    Config::default()
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, HsspError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| HsspError::Configuration(format!("Failed to parse config: {}", e)))?;
    config.validate()?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<(), HsspError> {
    let contents = to_toml(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn to_toml(config: &Config) -> Result<String, HsspError> {
    toml::to_string_pretty(config)
        .map_err(|e| HsspError::Configuration(format!("Failed to serialize config: {}", e)))
}

impl Config {
    pub fn validate(&self) -> Result<(), HsspError> {
        let threshold = self.conversion.threshold;
        if !threshold.is_finite() || !(-1.0..=1.0).contains(&threshold) {
            return Err(HsspError::Configuration(format!(
                "threshold must lie in [-1, 1], got {}",
                threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.conversion.max_hits, 1500);
        assert_eq!(config.conversion.threshold, 0.05);
        assert_eq!(config.conversion.min_alignment_length, 0);

        assert_eq!(config.performance.threads, 0);
        assert!(config.performance.resolved_threads() > 0);

        assert_eq!(config.output.seqbase_name, "UniProt");
        assert_eq!(config.output.seqbase_version, "unknown");
        assert!(!config.output.compress);
    }

    #[test]
    fn test_load_valid_config() {
        let toml_content = r#"
[conversion]
max_hits = 250
threshold = 0.1
min_alignment_length = 20

[performance]
threads = 4

[output]
seqbase_name = "UniRef50"
seqbase_version = "2024_01"
compress = true
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", toml_content).unwrap();

        let config = load_config(temp_file.path()).unwrap();

        assert_eq!(config.conversion.max_hits, 250);
        assert_eq!(config.conversion.threshold, 0.1);
        assert_eq!(config.conversion.min_alignment_length, 20);
        assert_eq!(config.performance.threads, 4);
        assert_eq!(config.performance.resolved_threads(), 4);
        assert_eq!(config.output.seqbase_name, "UniRef50");
        assert_eq!(config.output.seqbase_version, "2024_01");
        assert!(config.output.compress);
    }

    #[test]
    fn test_load_partial_config() {
        let toml_content = r#"
[conversion]
max_hits = 10
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", toml_content).unwrap();

        let config = load_config(temp_file.path()).unwrap();

        assert_eq!(config.conversion.max_hits, 10);
        assert_eq!(config.conversion.threshold, 0.05);
        assert_eq!(config.output.seqbase_name, "UniProt");
    }

    #[test]
    fn test_load_invalid_config() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "this is not valid TOML {{").unwrap();

        match load_config(temp_file.path()).unwrap_err() {
            HsspError::Configuration(msg) => assert!(msg.contains("Failed to parse config")),
            _ => panic!("Expected Configuration error"),
        }
    }

    #[test]
    fn test_threshold_out_of_range_is_rejected() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "[conversion]\nthreshold = 3.5\n").unwrap();

        match load_config(temp_file.path()).unwrap_err() {
            HsspError::Configuration(msg) => assert!(msg.contains("threshold")),
            _ => panic!("Expected Configuration error"),
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        match load_config("/nonexistent/path/to/hssp.toml").unwrap_err() {
            HsspError::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_config_round_trip() {
        let mut config = default_config();
        config.conversion.max_hits = 42;
        config.output.seqbase_version = "test".to_string();

        let temp_file = NamedTempFile::new().unwrap();
        save_config(temp_file.path(), &config).unwrap();
        let loaded = load_config(temp_file.path()).unwrap();

        assert_eq!(loaded.conversion.max_hits, 42);
        assert_eq!(loaded.output.seqbase_version, "test");
    }
}
