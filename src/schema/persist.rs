//! JSON persistence for configuration and result documents.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{GeneticAlgorithmConfig, RunConfig, TrainingResults};

/// Errors raised while reading or writing documents.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read a JSON document from `path`.
pub fn load_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, PersistenceError> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Write `value` as pretty-printed JSON to `path`, creating parent directories.
pub fn save_json<T: Serialize, P: AsRef<Path>>(value: &T, path: P) -> Result<(), PersistenceError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

impl GeneticAlgorithmConfig {
    /// Load a configuration document.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        load_json(path)
    }

    /// Save this configuration document.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), PersistenceError> {
        save_json(self, path)
    }
}

impl RunConfig {
    /// Load a run document.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        load_json(path)
    }
}

impl TrainingResults {
    /// Load a results document.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        load_json(path)
    }

    /// Save this results document.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), PersistenceError> {
        save_json(self, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{
        HistoryChannel, HistoryChannels, MutationMethod, StopReason, TrainingHistory,
    };
    use tempfile::tempdir;

    #[test]
    fn test_config_roundtrip_on_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = GeneticAlgorithmConfig {
            population_size: 12,
            mutation: MutationMethod::Uniform,
            history: HistoryChannels::none().with(HistoryChannel::ElapsedTime),
            ..Default::default()
        };
        config.save_json(&path).unwrap();

        let loaded = GeneticAlgorithmConfig::load_json(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_results_roundtrip_on_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.json");

        let results = TrainingResults {
            final_mean_norm: 1.0,
            final_standard_deviation_norm: 0.1,
            final_best_norm: 0.5,
            final_mean_performance: 2.0,
            final_standard_deviation_performance: 0.2,
            final_best_performance: 0.01,
            final_generalization_performance: Some(0.02),
            elapsed_time: 0.3,
            generations_number: 5,
            stop_reason: StopReason::MaximumGenerations,
            satisfied_stop_conditions: vec![StopReason::MaximumGenerations],
            best_parameters: vec![0.1, -0.2],
            history: TrainingHistory {
                best_performance: vec![1.0, 0.5, 0.01],
                ..Default::default()
            },
        };
        results.save_json(&path).unwrap();

        let loaded = TrainingResults::load_json(&path).unwrap();
        assert_eq!(loaded, results);
    }

    #[test]
    fn test_unknown_policy_in_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{ "recombination": "SinglePoint" }"#).unwrap();

        let err = GeneticAlgorithmConfig::load_json(&path).unwrap_err();
        assert!(matches!(err, PersistenceError::Json(_)));
        assert!(err.to_string().contains("Unsupported recombination method"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let err = TrainingResults::load_json(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, PersistenceError::Io(_)));
    }
}
