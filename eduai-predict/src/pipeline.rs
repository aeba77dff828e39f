//! CSV-to-predictions pipeline
//!
//! Batch path: parse and validate the upload, run every row through the
//! models in file order, summarise, then replace the last-result cache.
//! Any failure aborts the whole batch before the cache is touched.
//!
//! Single-record path: validate six named fields and predict. It reads the
//! cached snapshot for display but never writes it.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::cache::LastResultCache;
use crate::error::PredictError;
use crate::features::{
    parse_feature_value, parse_student_id, required_columns, StudentFeatures, StudentRecord,
    FEATURE_COLUMNS, FEATURE_COUNT, ID_COLUMN,
};
use crate::models::{ModelSet, RawPrediction};
use crate::stats::{build_statistics, round2, StatsSnapshot};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One output row of a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRecord {
    pub student_id: i64,
    pub predicted_score: f64,
    pub risk_category: String,
    pub cluster: usize,
}

/// Prediction for the interactive single-record path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SinglePrediction {
    pub predicted_score: f64,
    pub risk_category: String,
    pub cluster: usize,
}

impl From<RawPrediction> for SinglePrediction {
    fn from(raw: RawPrediction) -> Self {
        Self {
            predicted_score: round2(raw.score),
            risk_category: raw.risk_category,
            cluster: raw.cluster,
        }
    }
}

/// Result of a successful batch
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub predictions: Vec<PredictionRecord>,
    pub statistics: Arc<StatsSnapshot>,
}

/// Result of a single-record prediction
#[derive(Debug, Clone)]
pub struct SingleOutcome {
    pub prediction: SinglePrediction,
    /// Whatever batch snapshot was cached at the time, untouched
    pub overall: Option<Arc<StatsSnapshot>>,
}

/// Parse CSV bytes into student records, in file order
///
/// Schema is checked against the header before any row is read. Extra
/// columns are ignored.
pub fn parse_student_csv(bytes: &[u8]) -> Result<Vec<StudentRecord>, PredictError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(PredictError::Parse(
            "no columns to parse from file".to_string(),
        ));
    }

    let position = |name: &str| headers.iter().position(|h| h.trim() == name);

    let missing: Vec<String> = required_columns()
        .filter(|col| position(col).is_none())
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(PredictError::Schema { missing });
    }

    // Both lookups are guaranteed by the schema check above.
    let id_index = position(ID_COLUMN).unwrap_or_default();
    let feature_indices: Vec<usize> = FEATURE_COLUMNS
        .iter()
        .map(|col| position(col).unwrap_or_default())
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        let cell = |index: usize| row.get(index).unwrap_or_default();

        let raw_id = cell(id_index);
        let student_id = parse_student_id(raw_id).ok_or_else(|| PredictError::InvalidCell {
            line,
            column: ID_COLUMN.to_string(),
            value: raw_id.to_string(),
        })?;

        let mut values = [0.0; FEATURE_COUNT];
        for (slot, (&index, column)) in values
            .iter_mut()
            .zip(feature_indices.iter().zip(FEATURE_COLUMNS))
        {
            let raw = cell(index);
            *slot = parse_feature_value(raw).ok_or_else(|| PredictError::InvalidCell {
                line,
                column: column.to_string(),
                value: raw.to_string(),
            })?;
        }

        records.push(StudentRecord {
            student_id,
            features: StudentFeatures::from_ordered(values),
        });
    }

    Ok(records)
}

/// Coerce the six named form fields, in feature order
pub fn parse_single_fields(
    fields: &HashMap<String, String>,
) -> Result<StudentFeatures, PredictError> {
    let mut values = [0.0; FEATURE_COUNT];
    for (slot, name) in values.iter_mut().zip(FEATURE_COLUMNS) {
        let raw = match fields.get(name) {
            Some(v) if !v.trim().is_empty() => v,
            _ => {
                return Err(PredictError::MissingField {
                    field: name.to_string(),
                })
            }
        };
        *slot = parse_feature_value(raw).ok_or_else(|| PredictError::InvalidField {
            field: name.to_string(),
            value: raw.to_string(),
        })?;
    }
    Ok(StudentFeatures::from_ordered(values))
}

/// Models plus the cache they report into
#[derive(Clone)]
pub struct PredictionPipeline {
    models: Arc<ModelSet>,
    cache: LastResultCache,
}

impl PredictionPipeline {
    pub fn new(models: Arc<ModelSet>, cache: LastResultCache) -> Self {
        Self { models, cache }
    }

    pub fn cache(&self) -> &LastResultCache {
        &self.cache
    }

    /// Run a whole CSV upload; replaces the cached snapshot on success
    pub fn run_batch(&self, bytes: &[u8]) -> Result<BatchOutcome, PredictError> {
        let started = Instant::now();
        let records = parse_student_csv(bytes)?;

        let mut predictions = Vec::with_capacity(records.len());
        let mut scores = Vec::with_capacity(records.len());
        let mut risk_categories = Vec::with_capacity(records.len());
        let mut clusters = Vec::with_capacity(records.len());

        for record in &records {
            let raw = self.models.infer(&record.features.to_vector());
            predictions.push(PredictionRecord {
                student_id: record.student_id,
                predicted_score: round2(raw.score),
                risk_category: raw.risk_category.clone(),
                cluster: raw.cluster,
            });
            scores.push(raw.score);
            risk_categories.push(raw.risk_category);
            clusters.push(raw.cluster);
        }

        let stats = build_statistics(&scores, &risk_categories, &clusters)?;
        let batch_id = Uuid::new_v4();
        let statistics = self.cache.replace(StatsSnapshot::new(batch_id, stats));

        info!(
            batch_id = %batch_id,
            rows = predictions.len(),
            avg_score = statistics.stats.avg_score,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Batch processed"
        );

        Ok(BatchOutcome {
            predictions,
            statistics,
        })
    }

    /// Predict one student from named fields; the cache is only read
    pub fn predict_single(
        &self,
        fields: &HashMap<String, String>,
    ) -> Result<SingleOutcome, PredictError> {
        let features = parse_single_fields(fields)?;
        let prediction = SinglePrediction::from(self.models.infer(&features.to_vector()));
        debug!(
            score = prediction.predicted_score,
            risk = %prediction.risk_category,
            cluster = prediction.cluster,
            "Single prediction"
        );

        Ok(SingleOutcome {
            prediction,
            overall: self.cache.current(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_models::simple_model_set;

    fn pipeline() -> PredictionPipeline {
        PredictionPipeline::new(Arc::new(simple_model_set()), LastResultCache::new())
    }

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    const CSV: &str = "student_id,age,studytime,failures,absences,G1,G2\n\
                       30,17,2,0,4,6,8\n\
                       10,18,1,1,10,-3,-8\n\
                       20,16,3,0,0,7,1.234\n";

    #[test]
    fn test_rows_keep_file_order_and_ids() {
        let outcome = pipeline().run_batch(CSV.as_bytes()).unwrap();
        let ids: Vec<i64> = outcome.predictions.iter().map(|p| p.student_id).collect();
        assert_eq!(ids, vec![30, 10, 20]);
        assert_eq!(outcome.statistics.stats.n, 3);
    }

    #[test]
    fn test_scores_are_rounded_but_stats_use_raw_values() {
        let outcome = pipeline().run_batch(CSV.as_bytes()).unwrap();
        assert_eq!(outcome.predictions[0].predicted_score, 18.0);
        assert_eq!(outcome.predictions[1].predicted_score, 2.0);
        assert_eq!(outcome.predictions[2].predicted_score, 11.23);
        // (18 + 2 + 11.234) / 3 = 10.41133..
        assert_eq!(outcome.statistics.stats.avg_score, 10.41);
        assert_eq!(outcome.statistics.stats.score_hist.counts, vec![1, 0, 1, 1]);
    }

    #[test]
    fn test_successful_batch_replaces_cache() {
        let pipeline = pipeline();
        let outcome = pipeline.run_batch(CSV.as_bytes()).unwrap();
        let cached = pipeline.cache().current().unwrap();
        assert_eq!(cached.batch_id, outcome.statistics.batch_id);
    }

    #[test]
    fn test_missing_column_is_schema_error_and_cache_untouched() {
        let pipeline = pipeline();
        let csv = "student_id,age,studytime,failures,absences,G1\n1,17,2,0,4,6\n";
        let err = pipeline.run_batch(csv.as_bytes()).unwrap_err();
        match err {
            PredictError::Schema { missing } => assert_eq!(missing, vec!["G2".to_string()]),
            other => panic!("expected schema error, got {other:?}"),
        }
        assert!(pipeline.cache().current().is_none());
    }

    #[test]
    fn test_failed_batch_keeps_previous_snapshot() {
        let pipeline = pipeline();
        let first = pipeline.run_batch(CSV.as_bytes()).unwrap();

        let bad = "student_id,age,studytime,failures,absences,G1,G2\n1,17,2,zero,4,6,8\n";
        assert!(pipeline.run_batch(bad.as_bytes()).is_err());
        assert_eq!(
            pipeline.cache().current().unwrap().batch_id,
            first.statistics.batch_id
        );
    }

    #[test]
    fn test_one_bad_cell_aborts_whole_batch() {
        let csv = "student_id,age,studytime,failures,absences,G1,G2\n\
                   1,17,2,0,4,6,8\n\
                   2,17,2,0,,6,8\n";
        let err = parse_student_csv(csv.as_bytes()).unwrap_err();
        match err {
            PredictError::InvalidCell { line, column, value } => {
                assert_eq!(line, 3);
                assert_eq!(column, "absences");
                assert_eq!(value, "");
            }
            other => panic!("expected invalid cell, got {other:?}"),
        }
    }

    #[test]
    fn test_non_integer_student_id_is_rejected() {
        let csv = "student_id,age,studytime,failures,absences,G1,G2\nabc,17,2,0,4,6,8\n";
        assert!(matches!(
            parse_student_csv(csv.as_bytes()),
            Err(PredictError::InvalidCell { .. })
        ));
    }

    #[test]
    fn test_extra_and_reordered_columns_are_fine() {
        let csv = "G2,name,G1,absences,failures,studytime,age,student_id\n\
                   15,Ana,14,4,0,2,18,7\n";
        let records = parse_student_csv(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].student_id, 7);
        assert_eq!(
            records[0].features.to_vector().0,
            [18.0, 2.0, 0.0, 4.0, 14.0, 15.0]
        );
    }

    #[test]
    fn test_ragged_rows_are_parse_errors() {
        let csv = "student_id,age,studytime,failures,absences,G1,G2\n1,17,2\n";
        assert!(matches!(
            parse_student_csv(csv.as_bytes()),
            Err(PredictError::Parse(_))
        ));
    }

    #[test]
    fn test_invalid_utf8_header_is_parse_error() {
        let csv = b"student_id,age\xff,studytime,failures,absences,G1,G2\n1,17,2,0,4,6,8\n";
        assert!(matches!(
            parse_student_csv(csv),
            Err(PredictError::Parse(_))
        ));
    }

    #[test]
    fn test_invalid_utf8_row_is_parse_error_and_cache_untouched() {
        let pipeline = pipeline();
        let csv = b"student_id,age,studytime,failures,absences,G1,G2\n1,17,2\xff,0,4,6,8\n";
        assert!(matches!(
            pipeline.run_batch(csv),
            Err(PredictError::Parse(_))
        ));
        assert!(pipeline.cache().current().is_none());
    }

    #[test]
    fn test_empty_upload_is_parse_error() {
        assert!(matches!(
            parse_student_csv(b""),
            Err(PredictError::Parse(_))
        ));
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(CSV.as_bytes());
        assert_eq!(parse_student_csv(&bytes).unwrap().len(), 3);
    }

    #[test]
    fn test_header_only_upload_is_an_empty_batch() {
        let pipeline = pipeline();
        let outcome = pipeline
            .run_batch(b"student_id,age,studytime,failures,absences,G1,G2\n")
            .unwrap();
        assert!(outcome.predictions.is_empty());
        assert_eq!(outcome.statistics.stats.n, 0);
        assert_eq!(outcome.statistics.stats.avg_score, 0.0);
    }

    #[test]
    fn test_single_prediction_is_deterministic_and_read_only() {
        let pipeline = pipeline();
        let fields = form(&[
            ("age", "18"),
            ("studytime", "2"),
            ("failures", "0"),
            ("absences", "4"),
            ("G1", "14"),
            ("G2", "15"),
        ]);

        let first = pipeline.predict_single(&fields).unwrap();
        let second = pipeline.predict_single(&fields).unwrap();
        assert_eq!(first.prediction, second.prediction);
        assert_eq!(first.prediction.predicted_score, 25.0);
        assert!(first.overall.is_none());
        assert!(pipeline.cache().current().is_none());
    }

    #[test]
    fn test_single_prediction_carries_cached_batch() {
        let pipeline = pipeline();
        let batch = pipeline.run_batch(CSV.as_bytes()).unwrap();
        let fields = form(&[
            ("age", "18"),
            ("studytime", "2"),
            ("failures", "0"),
            ("absences", "4"),
            ("G1", "14"),
            ("G2", "1"),
        ]);

        let outcome = pipeline.predict_single(&fields).unwrap();
        assert_eq!(
            outcome.overall.unwrap().batch_id,
            batch.statistics.batch_id
        );
        assert_eq!(
            pipeline.cache().current().unwrap().batch_id,
            batch.statistics.batch_id
        );
    }

    #[test]
    fn test_single_missing_or_blank_field_is_missing() {
        let fields = form(&[
            ("age", "18"),
            ("studytime", "2"),
            ("failures", "0"),
            ("absences", " "),
            ("G1", "14"),
            ("G2", "15"),
        ]);
        assert!(matches!(
            parse_single_fields(&fields),
            Err(PredictError::MissingField { field }) if field == "absences"
        ));

        let fields = form(&[("age", "18")]);
        assert!(matches!(
            parse_single_fields(&fields),
            Err(PredictError::MissingField { field }) if field == "studytime"
        ));
    }

    #[test]
    fn test_single_non_numeric_field_is_invalid() {
        let fields = form(&[
            ("age", "eighteen"),
            ("studytime", "2"),
            ("failures", "0"),
            ("absences", "4"),
            ("G1", "14"),
            ("G2", "15"),
        ]);
        assert!(matches!(
            parse_single_fields(&fields),
            Err(PredictError::InvalidField { field, .. }) if field == "age"
        ));
    }
}
