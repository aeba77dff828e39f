//! Standard scaler: `(x - mean) / scale` per feature

use eduai_common::{Error, Result};
use serde::Deserialize;
use tracing::warn;

use super::loader::{check_width, Artifact};
use crate::features::{FeatureVector, ScaledFeatureVector, FEATURE_COUNT};

#[derive(Debug, Clone, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self> {
        Self { mean, scale }.checked()
    }

    pub fn transform(&self, features: &FeatureVector) -> ScaledFeatureVector {
        let mut out = [0.0; FEATURE_COUNT];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = (features.0[i] - self.mean[i]) / self.scale[i];
        }
        ScaledFeatureVector(out)
    }
}

impl Artifact for StandardScaler {
    const KIND: &'static str = "scaler";

    fn checked(mut self) -> Result<Self> {
        check_width(Self::KIND, "mean", &self.mean)?;
        check_width(Self::KIND, "scale", &self.scale)?;

        // Constant features were fitted with zero variance; leave them unscaled.
        for (i, s) in self.scale.iter_mut().enumerate() {
            if *s == 0.0 {
                warn!(feature = i, "Scaler has zero scale, using 1.0");
                *s = 1.0;
            } else if *s < 0.0 {
                return Err(Error::Artifact(format!(
                    "scaler scale[{}] is negative ({})",
                    i, s
                )));
            }
        }
        Ok(self)
    }
}
