//! Linear score regressor

use eduai_common::Result;
use serde::Deserialize;

use super::loader::{check_width, Artifact};
use super::Predictor;
use crate::features::ScaledFeatureVector;

/// `intercept + coefficients · x`
#[derive(Debug, Clone, Deserialize)]
pub struct LinearRegressor {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearRegressor {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Result<Self> {
        Self {
            coefficients,
            intercept,
        }
        .checked()
    }
}

impl Predictor for LinearRegressor {
    type Output = f64;

    fn predict(&self, features: &ScaledFeatureVector) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features.as_slice())
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }
}

impl Artifact for LinearRegressor {
    const KIND: &'static str = "regressor";

    fn checked(self) -> Result<Self> {
        check_width(Self::KIND, "coefficients", &self.coefficients)?;
        if !self.intercept.is_finite() {
            return Err(eduai_common::Error::Artifact(
                "regressor intercept is not finite".to_string(),
            ));
        }
        Ok(self)
    }
}
