//! Model artifact loading
//!
//! Artifacts are JSON documents, one per model. Each concrete model checks its
//! own dimensions when loaded so that prediction never has to.

use eduai_common::config::ModelPaths;
use eduai_common::{Error, Result};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::info;

use super::{GaussianNaiveBayes, LinearRegressor, ModelSet, NearestCentroid, StandardScaler};
use crate::features::FEATURE_COUNT;

/// A model that can be read from an artifact file
pub trait Artifact: DeserializeOwned + Sized {
    /// Human-readable model kind for logs and errors
    const KIND: &'static str;

    /// Validate freshly deserialized state
    fn checked(self) -> Result<Self>;
}

/// Read, parse and validate one artifact
pub fn load_artifact<A: Artifact>(path: &Path) -> Result<A> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Artifact(format!(
            "Failed to read {} from {}: {}",
            A::KIND,
            path.display(),
            e
        ))
    })?;

    let artifact: A = serde_json::from_str(&content).map_err(|e| {
        Error::Artifact(format!(
            "Failed to parse {} from {}: {}",
            A::KIND,
            path.display(),
            e
        ))
    })?;

    let artifact = artifact.checked()?;
    info!(model = A::KIND, path = %path.display(), "Model artifact loaded");
    Ok(artifact)
}

/// Ensure a parameter row has one entry per feature
pub(crate) fn check_width(kind: &str, what: &str, row: &[f64]) -> Result<()> {
    if row.len() != FEATURE_COUNT {
        return Err(Error::Artifact(format!(
            "{} {} has {} entries, expected {}",
            kind,
            what,
            row.len(),
            FEATURE_COUNT
        )));
    }
    if row.iter().any(|v| !v.is_finite()) {
        return Err(Error::Artifact(format!(
            "{} {} contains non-finite values",
            kind, what
        )));
    }
    Ok(())
}

impl ModelSet {
    /// Load the scaler and all three predictors from configured paths
    pub fn load(paths: &ModelPaths) -> Result<Self> {
        let scaler: StandardScaler = load_artifact(&paths.scaler_path())?;
        let regressor: LinearRegressor = load_artifact(&paths.regressor_path())?;
        let cluster: NearestCentroid = load_artifact(&paths.cluster_path())?;
        let classifier: GaussianNaiveBayes = load_artifact(&paths.classifier_path())?;
        info!(
            clusters = cluster.cluster_count(),
            risk_classes = ?classifier.classes(),
            "Model set ready"
        );

        Ok(ModelSet::new(
            scaler,
            Box::new(regressor),
            Box::new(cluster),
            Box::new(classifier),
        ))
    }
}
