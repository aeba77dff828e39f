//! Gaussian naive Bayes risk classifier

use eduai_common::{Error, Result};
use serde::Deserialize;
use std::f64::consts::PI;

use super::loader::{check_width, Artifact};
use super::{argmax, Predictor};
use crate::features::ScaledFeatureVector;

/// Per-class Gaussian likelihoods with class priors
///
/// `theta[c]` and `var[c]` hold the per-feature mean and variance of class
/// `classes[c]`.
#[derive(Debug, Clone, Deserialize)]
pub struct GaussianNaiveBayes {
    classes: Vec<String>,
    class_prior: Vec<f64>,
    theta: Vec<Vec<f64>>,
    var: Vec<Vec<f64>>,
}

impl GaussianNaiveBayes {
    pub fn new(
        classes: Vec<String>,
        class_prior: Vec<f64>,
        theta: Vec<Vec<f64>>,
        var: Vec<Vec<f64>>,
    ) -> Result<Self> {
        Self {
            classes,
            class_prior,
            theta,
            var,
        }
        .checked()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Joint log likelihood of each class for `x`
    fn joint_log_likelihood<'a>(
        &'a self,
        x: &'a ScaledFeatureVector,
    ) -> impl Iterator<Item = f64> + 'a {
        (0..self.classes.len()).map(move |c| {
            let log_prior = self.class_prior[c].ln();
            let log_density: f64 = self.theta[c]
                .iter()
                .zip(&self.var[c])
                .zip(x.as_slice())
                .map(|((mean, var), xi)| {
                    -0.5 * (2.0 * PI * var).ln() - (xi - mean) * (xi - mean) / (2.0 * var)
                })
                .sum();
            log_prior + log_density
        })
    }
}

impl Predictor for GaussianNaiveBayes {
    type Output = String;

    fn predict(&self, features: &ScaledFeatureVector) -> String {
        let best = argmax(self.joint_log_likelihood(features)).unwrap_or(0);
        self.classes[best].clone()
    }
}

impl Artifact for GaussianNaiveBayes {
    const KIND: &'static str = "classifier";

    fn checked(self) -> Result<Self> {
        let n = self.classes.len();
        if n == 0 {
            return Err(Error::Artifact("classifier has no classes".to_string()));
        }
        if self.class_prior.len() != n || self.theta.len() != n || self.var.len() != n {
            return Err(Error::Artifact(format!(
                "classifier parameter counts differ: {} classes, {} priors, {} means, {} variances",
                n,
                self.class_prior.len(),
                self.theta.len(),
                self.var.len()
            )));
        }
        if self.class_prior.iter().any(|p| !(p.is_finite() && *p > 0.0)) {
            return Err(Error::Artifact(
                "classifier priors must be positive".to_string(),
            ));
        }
        for c in 0..n {
            check_width(Self::KIND, &format!("theta[{}]", c), &self.theta[c])?;
            check_width(Self::KIND, &format!("var[{}]", c), &self.var[c])?;
            if self.var[c].iter().any(|v| *v <= 0.0) {
                return Err(Error::Artifact(format!(
                    "classifier var[{}] must be positive",
                    c
                )));
            }
        }
        Ok(self)
    }
}
