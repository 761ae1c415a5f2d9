use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::config::{ColumnNames, DashboardConfig};
use crate::error::{DashboardError, Result};

// ---------------------------------------------------------------------------
// Field – semantic role of a dataset column
// ---------------------------------------------------------------------------

/// The semantic roles a dataset column can play.
///
/// The four text variants are independent precomputed preprocessing stages;
/// nothing here derives one from another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    RawText,
    CaseFolded,
    StopwordRemoved,
    Lemmatized,
    Hospital,
    HospitalType,
    Sentiment,
    Emotion,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::RawText,
        Field::CaseFolded,
        Field::StopwordRemoved,
        Field::Lemmatized,
        Field::Hospital,
        Field::HospitalType,
        Field::Sentiment,
        Field::Emotion,
    ];

    /// Columns that must be present in every dataset header.
    pub const REQUIRED: [Field; 6] = [
        Field::RawText,
        Field::Lemmatized,
        Field::Hospital,
        Field::HospitalType,
        Field::Sentiment,
        Field::Emotion,
    ];

    /// Canonical snake_case role name.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::RawText => "raw_text",
            Field::CaseFolded => "case_folded",
            Field::StopwordRemoved => "stopword_removed",
            Field::Lemmatized => "lemmatized",
            Field::Hospital => "hospital",
            Field::HospitalType => "hospital_type",
            Field::Sentiment => "sentiment",
            Field::Emotion => "emotion",
        }
    }

    /// Whether the column holds free text rather than a category.
    pub fn is_text(self) -> bool {
        matches!(
            self,
            Field::RawText | Field::CaseFolded | Field::StopwordRemoved | Field::Lemmatized
        )
    }

    /// Resolve a role name or a configured header name.
    pub fn from_name(name: &str, columns: &ColumnNames) -> Result<Field> {
        Field::ALL
            .into_iter()
            .find(|f| f.as_str() == name || columns.name_of(*f) == name)
            .ok_or_else(|| DashboardError::UnknownColumn(name.to_string()))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DatasetSchema – what the loader expects to find
// ---------------------------------------------------------------------------

/// Header names plus the closed label vocabularies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSchema {
    pub columns: ColumnNames,
    pub sentiment_labels: Vec<String>,
    pub emotion_labels: Vec<String>,
}

impl From<&DashboardConfig> for DatasetSchema {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            columns: config.columns.clone(),
            sentiment_labels: config.sentiment_labels.clone(),
            emotion_labels: config.emotion_labels.clone(),
        }
    }
}

impl Default for DatasetSchema {
    fn default() -> Self {
        Self::from(&DashboardConfig::default())
    }
}

// ---------------------------------------------------------------------------
// ReviewRecord – one row of the dataset
// ---------------------------------------------------------------------------

/// A single labelled review.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReviewRecord {
    pub raw_text: String,
    pub case_folded: String,
    pub stopword_removed: String,
    pub lemmatized: String,
    pub hospital: String,
    pub hospital_type: String,
    pub sentiment: String,
    pub emotion: String,
}

impl ReviewRecord {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::RawText => &self.raw_text,
            Field::CaseFolded => &self.case_folded,
            Field::StopwordRemoved => &self.stopword_removed,
            Field::Lemmatized => &self.lemmatized,
            Field::Hospital => &self.hospital,
            Field::HospitalType => &self.hospital_type,
            Field::Sentiment => &self.sentiment,
            Field::Emotion => &self.emotion,
        }
    }

    fn slot(&mut self, field: Field) -> &mut String {
        match field {
            Field::RawText => &mut self.raw_text,
            Field::CaseFolded => &mut self.case_folded,
            Field::StopwordRemoved => &mut self.stopword_removed,
            Field::Lemmatized => &mut self.lemmatized,
            Field::Hospital => &mut self.hospital,
            Field::HospitalType => &mut self.hospital_type,
            Field::Sentiment => &mut self.sentiment,
            Field::Emotion => &mut self.emotion,
        }
    }

    /// Build a record from per-field cell values. Missing optional text
    /// variants fall back to the raw text.
    pub fn from_cells<'a, I>(cells: I) -> Self
    where
        I: IntoIterator<Item = (Field, &'a str)>,
    {
        let mut record = ReviewRecord::default();
        let mut seen = [false; 8];
        for (field, value) in cells {
            *record.slot(field) = value.to_string();
            seen[field as usize] = true;
        }
        for field in [Field::CaseFolded, Field::StopwordRemoved] {
            if !seen[field as usize] {
                *record.slot(field) = record.raw_text.clone();
            }
        }
        record
    }
}

// ---------------------------------------------------------------------------
// ReviewTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Immutable, shareable handle to a loaded table.
pub type SharedTable = Arc<ReviewTable>;

/// The full parsed dataset. Read-only once built; a reload builds a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewTable {
    records: Vec<ReviewRecord>,
    schema: DatasetSchema,
    source: Option<PathBuf>,
}

impl ReviewTable {
    /// Build a table, rejecting rows without a hospital identifier.
    pub fn new(records: Vec<ReviewRecord>, schema: DatasetSchema) -> Result<Self> {
        if let Some(row) = records.iter().position(|r| r.hospital.trim().is_empty()) {
            return Err(DashboardError::Parse(format!(
                "row {row}: empty '{}' value",
                schema.columns.hospital
            )));
        }
        Ok(Self {
            records,
            schema,
            source: None,
        })
    }

    pub(crate) fn with_source(mut self, source: PathBuf) -> Self {
        self.source = Some(source);
        self
    }

    /// File this table was loaded from, if any.
    pub fn source(&self) -> Option<&PathBuf> {
        self.source.as_ref()
    }

    pub fn schema(&self) -> &DatasetSchema {
        &self.schema
    }

    pub fn records(&self) -> &[ReviewRecord] {
        &self.records
    }

    /// Number of reviews.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate the values of one column in source order.
    pub fn column(&self, field: Field) -> impl Iterator<Item = &str> + '_ {
        self.records.iter().map(move |r| r.get(field))
    }

    /// Distinct values of a column in first-seen order.
    pub fn distinct_values(&self, field: Field) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.column(field)
            .filter(|v| seen.insert(*v))
            .map(str::to_string)
            .collect()
    }

    /// Closed label set for a categorical field, if one is defined.
    pub fn vocabulary(&self, field: Field) -> Option<&[String]> {
        match field {
            Field::Sentiment => Some(self.schema.sentiment_labels.as_slice()),
            Field::Emotion => Some(self.schema.emotion_labels.as_slice()),
            _ => None,
        }
    }

    /// Resolve a column name against this table's schema.
    pub fn field(&self, name: &str) -> Result<Field> {
        Field::from_name(name, &self.schema.columns)
    }

    /// New table holding only the given rows, in the given order.
    pub fn subset(&self, indices: &[usize]) -> ReviewTable {
        ReviewTable {
            records: indices
                .iter()
                .filter_map(|&i| self.records.get(i).cloned())
                .collect(),
            schema: self.schema.clone(),
            source: self.source.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(hospital: &str, sentiment: &str) -> ReviewRecord {
        ReviewRecord::from_cells([
            (Field::RawText, "teks"),
            (Field::Hospital, hospital),
            (Field::Sentiment, sentiment),
        ])
    }

    #[test]
    fn field_resolves_role_and_header_names() {
        let columns = ColumnNames::default();
        assert_eq!(Field::from_name("sentiment", &columns).unwrap(), Field::Sentiment);
        assert_eq!(
            Field::from_name("sentiment_label_final", &columns).unwrap(),
            Field::Sentiment
        );
        assert_eq!(Field::from_name("rumah_sakit", &columns).unwrap(), Field::Hospital);
        assert!(matches!(
            Field::from_name("rating", &columns),
            Err(DashboardError::UnknownColumn(name)) if name == "rating"
        ));
    }

    #[test]
    fn optional_text_variants_fall_back_to_raw() {
        let r = ReviewRecord::from_cells([(Field::RawText, "Dokternya Ramah")]);
        assert_eq!(r.case_folded, "Dokternya Ramah");
        assert_eq!(r.stopword_removed, "Dokternya Ramah");
        assert_eq!(r.lemmatized, "");
    }

    #[test]
    fn empty_hospital_is_rejected() {
        let err = ReviewTable::new(
            vec![record("RS A", "positif"), record("  ", "negatif")],
            DatasetSchema::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DashboardError::Parse(msg) if msg.contains("row 1")));
    }

    #[test]
    fn distinct_values_keep_first_seen_order() {
        let table = ReviewTable::new(
            vec![
                record("RS B", "negatif"),
                record("RS A", "positif"),
                record("RS B", "positif"),
            ],
            DatasetSchema::default(),
        )
        .unwrap();
        assert_eq!(table.distinct_values(Field::Hospital), vec!["RS B", "RS A"]);
        assert_eq!(table.distinct_values(Field::Sentiment), vec!["negatif", "positif"]);
    }

    #[test]
    fn subset_is_a_new_table() {
        let table = ReviewTable::new(
            vec![record("RS A", "positif"), record("RS B", "negatif")],
            DatasetSchema::default(),
        )
        .unwrap();
        let sub = table.subset(&[1]);
        assert_eq!(sub.len(), 1);
        assert_eq!(sub.records()[0].hospital, "RS B");
        assert_eq!(table.len(), 2);
    }
}
