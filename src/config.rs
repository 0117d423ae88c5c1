// Sweep configuration.
// Values come from three layers, lowest priority first: built-in defaults,
// an optional JSON file, then command-line flags applied by the binary.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ReduceError;
use crate::reduce::Strategy;

pub const DEFAULT_SIZES: [usize; 3] = [10_000, 100_000, 1_000_000];
pub const DEFAULT_THREAD_COUNTS: [usize; 6] = [1, 2, 4, 8, 16, 32];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Vector sizes and thread counts to time, plus how to run each reduction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
    pub sizes: Vec<usize>,
    pub thread_counts: Vec<usize>,
    pub seed: Option<u64>,
    pub strategy: Strategy,
    pub pin_workers: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            sizes: DEFAULT_SIZES.to_vec(),
            thread_counts: DEFAULT_THREAD_COUNTS.to_vec(),
            seed: None,
            strategy: Strategy::default(),
            pin_workers: false,
        }
    }
}

impl SweepConfig {
    /// Load a JSON config. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Reject configs a sweep cannot run: empty lists or a zero thread count.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.sizes.is_empty() {
            return Err(ReduceError::InvalidConfiguration(
                "sizes must not be empty".to_string(),
            ));
        }
        if self.thread_counts.is_empty() {
            return Err(ReduceError::InvalidConfiguration(
                "thread_counts must not be empty".to_string(),
            ));
        }
        if self.thread_counts.contains(&0) {
            return Err(ReduceError::InvalidConfiguration(
                "thread counts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SweepConfig::default();
        assert_eq!(config.sizes, vec![10_000, 100_000, 1_000_000]);
        assert_eq!(config.thread_counts, vec![1, 2, 4, 8, 16, 32]);
        assert_eq!(config.strategy, Strategy::Threads);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SweepConfig::from_json(r#"{"sizes": [10, 20], "strategy": "pool"}"#).unwrap();
        assert_eq!(config.sizes, vec![10, 20]);
        assert_eq!(config.thread_counts, DEFAULT_THREAD_COUNTS.to_vec());
        assert_eq!(config.strategy, Strategy::Pool);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(SweepConfig::from_json(r#"{"threads": [1]}"#).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_lists() {
        let mut config = SweepConfig::default();
        config.thread_counts = vec![1, 0, 4];
        assert!(matches!(config.validate(), Err(ReduceError::InvalidConfiguration(_))));

        config.thread_counts.clear();
        assert!(config.validate().is_err());

        let config = SweepConfig {
            sizes: Vec::new(),
            ..SweepConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("vector-sum-config-{}.json", std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, r#"{{"thread_counts": [2, 3], "seed": 9, "pin_workers": true}}"#).unwrap();
        drop(file);

        let config = SweepConfig::from_file(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.thread_counts, vec![2, 3]);
        assert_eq!(config.seed, Some(9));
        assert!(config.pin_workers);
    }

    #[test]
    fn test_missing_file() {
        let err = SweepConfig::from_file(Path::new("/nonexistent/vector-sum.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
