//! Nearest-centroid cluster assignment (k-means inference)

use eduai_common::{Error, Result};
use serde::Deserialize;

use super::loader::{check_width, Artifact};
use super::{argmax, Predictor};
use crate::features::ScaledFeatureVector;

/// Assigns the index of the closest centroid (squared Euclidean distance)
#[derive(Debug, Clone, Deserialize)]
pub struct NearestCentroid {
    centroids: Vec<Vec<f64>>,
}

impl NearestCentroid {
    pub fn new(centroids: Vec<Vec<f64>>) -> Result<Self> {
        Self { centroids }.checked()
    }

    pub fn cluster_count(&self) -> usize {
        self.centroids.len()
    }
}

impl Predictor for NearestCentroid {
    type Output = usize;

    fn predict(&self, features: &ScaledFeatureVector) -> usize {
        let negated_distances = self.centroids.iter().map(|c| {
            -c.iter()
                .zip(features.as_slice())
                .map(|(a, b)| (a - b) * (a - b))
                .sum::<f64>()
        });
        // checked() guarantees at least one centroid
        argmax(negated_distances).unwrap_or(0)
    }
}

impl Artifact for NearestCentroid {
    const KIND: &'static str = "cluster model";

    fn checked(self) -> Result<Self> {
        if self.centroids.is_empty() {
            return Err(Error::Artifact("cluster model has no centroids".to_string()));
        }
        for (i, centroid) in self.centroids.iter().enumerate() {
            check_width(Self::KIND, &format!("centroid {}", i), centroid)?;
        }
        Ok(self)
    }
}
