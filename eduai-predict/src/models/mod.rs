//! Pre-trained models and the interface they share
//!
//! Every predictor consumes the same scaled feature vector. Models are loaded
//! once at startup and never mutated afterwards.

pub mod classifier;
pub mod cluster;
pub mod loader;
pub mod regressor;
pub mod scaler;

pub use classifier::GaussianNaiveBayes;
pub use cluster::NearestCentroid;
pub use loader::{load_artifact, Artifact};
pub use regressor::LinearRegressor;
pub use scaler::StandardScaler;

use crate::features::{FeatureVector, ScaledFeatureVector};

/// A read-only, deterministic model
pub trait Predictor: Send + Sync {
    type Output;

    fn predict(&self, features: &ScaledFeatureVector) -> Self::Output;
}

pub type ScorePredictor = Box<dyn Predictor<Output = f64>>;
pub type ClusterPredictor = Box<dyn Predictor<Output = usize>>;
pub type RiskPredictor = Box<dyn Predictor<Output = String>>;

/// Unrounded output of the three predictors for one vector
#[derive(Debug, Clone, PartialEq)]
pub struct RawPrediction {
    pub score: f64,
    pub risk_category: String,
    pub cluster: usize,
}

/// Scaler plus the three predictors
pub struct ModelSet {
    scaler: StandardScaler,
    regressor: ScorePredictor,
    cluster: ClusterPredictor,
    classifier: RiskPredictor,
}

impl ModelSet {
    pub fn new(
        scaler: StandardScaler,
        regressor: ScorePredictor,
        cluster: ClusterPredictor,
        classifier: RiskPredictor,
    ) -> Self {
        Self {
            scaler,
            regressor,
            cluster,
            classifier,
        }
    }

    /// Scale once, then run every predictor on the scaled vector
    pub fn infer(&self, features: &FeatureVector) -> RawPrediction {
        let scaled = self.scaler.transform(features);
        RawPrediction {
            score: self.regressor.predict(&scaled),
            risk_category: self.classifier.predict(&scaled),
            cluster: self.cluster.predict(&scaled),
        }
    }
}

/// Index of the first maximum; ties resolve to the lowest index
pub(crate) fn argmax(values: impl IntoIterator<Item = f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, v) in values.into_iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax_prefers_first_on_ties() {
        assert_eq!(argmax([1.0, 3.0, 3.0]), Some(1));
        assert_eq!(argmax([-2.0, -1.0]), Some(1));
        assert_eq!(argmax(Vec::<f64>::new()), None);
    }

    #[test]
    fn test_infer_runs_all_three_predictors() {
        let models = test_models::simple_model_set();
        let out = models.infer(&FeatureVector([17.0, 2.0, 0.0, 3.0, 4.0, 6.0]));
        assert_eq!(out.score, 16.0);
        assert_eq!(out.cluster, 1);
        assert_eq!(out.risk_category, "High");

        let out = models.infer(&FeatureVector([17.0, 2.0, 0.0, 3.0, -4.0, -6.0]));
        assert_eq!(out.score, 4.0);
        assert_eq!(out.cluster, 0);
        assert_eq!(out.risk_category, "Low");
    }
}
