use std::path::Path;

use serde::Serialize;

use crate::classify::PredictionResult;
use crate::data::aggregate::{count_by, percent_by, AggregationResult, PercentGroup};
use crate::data::model::{Field, ReviewTable};
use crate::error::{DashboardError, Result};

// ---------------------------------------------------------------------------
// Analysis report
// ---------------------------------------------------------------------------

/// Summary numbers handed to the document exporter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub title: String,
    pub total_reviews: usize,
    pub hospitals: usize,
    pub sentiment_counts: Vec<(String, usize)>,
    pub emotion_counts: Vec<(String, usize)>,
    pub sentiment_by_hospital_type: Vec<PercentGroup>,
    pub unknown_labels: Vec<String>,
}

impl ReportSummary {
    pub fn from_table(table: &ReviewTable) -> Result<Self> {
        let sentiment = count_by(table, Field::Sentiment, None)?;
        let emotion = count_by(table, Field::Emotion, None)?;
        let by_type = percent_by(table, Field::HospitalType, Field::Sentiment)?;

        let mut unknown_labels = sentiment.unknown_labels.clone();
        unknown_labels.extend(emotion.unknown_labels.iter().cloned());

        Ok(Self {
            title: "Laporan Analisis Sentimen Rumah Sakit".into(),
            total_reviews: table.len(),
            hospitals: table.distinct_values(Field::Hospital).len(),
            sentiment_counts: label_counts(sentiment),
            emotion_counts: label_counts(emotion),
            sentiment_by_hospital_type: by_type.groups,
            unknown_labels,
        })
    }

    /// Write the summary as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        log::info!("Wrote report to {}", path.display());
        Ok(())
    }
}

fn label_counts(result: AggregationResult) -> Vec<(String, usize)> {
    result
        .entries
        .into_iter()
        .map(|(key, count)| (key.primary().to_string(), count))
        .collect()
}

// ---------------------------------------------------------------------------
// Manual prediction download
// ---------------------------------------------------------------------------

/// One row of the manual-prediction CSV download.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionExport {
    pub text: String,
    pub sentiment: String,
    pub sentiment_score: f32,
    pub emotion: String,
    pub emotion_score: f32,
}

impl PredictionExport {
    /// Pair the top sentiment and emotion predictions for `text`.
    pub fn new(text: &str, sentiment: &PredictionResult, emotion: &PredictionResult) -> Result<Self> {
        let s = sentiment
            .top()
            .ok_or_else(|| DashboardError::ExternalCapability("no sentiment prediction".into()))?;
        let e = emotion
            .top()
            .ok_or_else(|| DashboardError::ExternalCapability("no emotion prediction".into()))?;
        Ok(Self {
            text: text.to_string(),
            sentiment: s.label.clone(),
            sentiment_score: s.score,
            emotion: e.label.clone(),
            emotion_score: e.score,
        })
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.serialize(self)?;
        writer.flush()?;
        log::info!("Wrote prediction to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Prediction;
    use crate::data::model::{DatasetSchema, ReviewRecord};

    fn table() -> ReviewTable {
        let rows = [
            ("RS A", "B", "positif", "bahagia"),
            ("RS A", "B", "negatif", "marah"),
            ("RS B", "C", "positif", "yakin"),
            ("RS C", "C", "positif", "bahagia"),
        ];
        let records = rows
            .iter()
            .map(|(h, t, s, e)| {
                ReviewRecord::from_cells([
                    (Field::Hospital, *h),
                    (Field::HospitalType, *t),
                    (Field::Sentiment, *s),
                    (Field::Emotion, *e),
                ])
            })
            .collect();
        ReviewTable::new(records, DatasetSchema::default()).unwrap()
    }

    fn result(pairs: &[(&str, f32)]) -> PredictionResult {
        PredictionResult {
            predictions: pairs
                .iter()
                .map(|(l, s)| Prediction {
                    label: l.to_string(),
                    score: *s,
                })
                .collect(),
        }
    }

    #[test]
    fn summary_counts_partition_rows() {
        let summary = ReportSummary::from_table(&table()).unwrap();
        assert_eq!(summary.total_reviews, 4);
        assert_eq!(summary.hospitals, 3);
        assert_eq!(
            summary.sentiment_counts,
            vec![("positif".to_string(), 3), ("negatif".to_string(), 1)]
        );
        let emotion_total: usize = summary.emotion_counts.iter().map(|(_, c)| c).sum();
        assert_eq!(emotion_total, 4);
        assert_eq!(summary.sentiment_by_hospital_type.len(), 2);
        assert!(summary.unknown_labels.is_empty());
    }

    #[test]
    fn summary_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("laporan.json");
        ReportSummary::from_table(&table()).unwrap().write_json(&path).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["total_reviews"], 4);
    }

    #[test]
    fn prediction_export_writes_one_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hasil_prediksi.csv");
        let export = PredictionExport::new(
            "Prosesnya cepat dan mudah",
            &result(&[("positif", 0.9), ("netral", 0.1)]),
            &result(&[("bahagia", 0.7), ("yakin", 0.3)]),
        )
        .unwrap();
        export.write_csv(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let mut lines = written.lines();
        assert_eq!(
            lines.next(),
            Some("text,sentiment,sentiment_score,emotion,emotion_score")
        );
        assert!(lines.next().unwrap().starts_with("Prosesnya cepat dan mudah,positif,0.9,bahagia,0.7"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn export_needs_both_predictions() {
        assert!(PredictionExport::new("x", &result(&[]), &result(&[("yakin", 1.0)])).is_err());
    }
}
