//! Student records and fixed-order feature vectors
//!
//! The column order here is shared by the scaler and all three predictors.
//! Reordering it silently corrupts every prediction.

/// Number of model input features
pub const FEATURE_COUNT: usize = 6;

/// Model input columns, in feature-vector order
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] =
    ["age", "studytime", "failures", "absences", "G1", "G2"];

/// Identifier column required in uploaded batches
pub const ID_COLUMN: &str = "student_id";

/// All columns a batch upload must contain
pub fn required_columns() -> impl Iterator<Item = &'static str> {
    std::iter::once(ID_COLUMN).chain(FEATURE_COLUMNS)
}

/// Raw features in `FEATURE_COLUMNS` order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

/// Feature vector after standard scaling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledFeatureVector(pub [f64; FEATURE_COUNT]);

impl ScaledFeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// The six model inputs of one student
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StudentFeatures {
    pub age: f64,
    pub studytime: f64,
    pub failures: f64,
    pub absences: f64,
    pub g1: f64,
    pub g2: f64,
}

impl StudentFeatures {
    /// Build from values already in `FEATURE_COLUMNS` order
    pub fn from_ordered(values: [f64; FEATURE_COUNT]) -> Self {
        let [age, studytime, failures, absences, g1, g2] = values;
        Self {
            age,
            studytime,
            failures,
            absences,
            g1,
            g2,
        }
    }

    pub fn to_vector(&self) -> FeatureVector {
        FeatureVector([
            self.age,
            self.studytime,
            self.failures,
            self.absences,
            self.g1,
            self.g2,
        ])
    }
}

/// One row of an uploaded batch
#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecord {
    pub student_id: i64,
    pub features: StudentFeatures,
}

/// Coerce a raw cell to a finite float
pub fn parse_feature_value(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coerce a raw cell to an integer id
///
/// Integral floats such as `7.0` are accepted.
pub fn parse_student_id(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(id) = raw.parse::<i64>() {
        return Some(id);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.fract() == 0.0)
        .filter(|v| *v >= i64::MIN as f64 && *v <= i64::MAX as f64)
        .map(|v| v as i64)
}
