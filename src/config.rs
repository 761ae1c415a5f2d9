use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::model::Field;
use crate::error::{DashboardError, Result};

/// Environment variable pointing at a JSON config file.
pub const CONFIG_ENV: &str = "HOSPITAL_DASHBOARD_CONFIG";

/// Config file picked up from the working directory when the env var is unset.
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.json";

// ---------------------------------------------------------------------------
// Column names – header name per semantic field
// ---------------------------------------------------------------------------

/// Header names of the dataset columns, one per [`Field`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub raw_text: String,
    pub case_folded: String,
    pub stopword_removed: String,
    pub lemmatized: String,
    pub hospital: String,
    pub hospital_type: String,
    pub sentiment: String,
    pub emotion: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            raw_text: "ulasan".into(),
            case_folded: "ulasan_casefolding".into(),
            stopword_removed: "ulasan_stopword".into(),
            lemmatized: "ulasan_lemmatize".into(),
            hospital: "rumah_sakit".into(),
            hospital_type: "tipe_rs".into(),
            sentiment: "sentiment_label_final".into(),
            emotion: "emotion_label".into(),
        }
    }
}

impl ColumnNames {
    /// Header name configured for `field`.
    pub fn name_of(&self, field: Field) -> &str {
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
}

// ---------------------------------------------------------------------------
// DashboardConfig
// ---------------------------------------------------------------------------

/// Application configuration. Every field has a default, so a config file
/// only needs the keys it overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Dataset opened at startup (if it exists).
    pub dataset_path: PathBuf,
    pub columns: ColumnNames,
    pub sentiment_labels: Vec<String>,
    pub emotion_labels: Vec<String>,
    pub sentiment_model: String,
    pub emotion_model: String,
    /// URL template; `{model}` is replaced with the model id.
    pub inference_endpoint: String,
    /// Name of the env var holding the inference API token.
    pub token_env: String,
    pub request_timeout_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("dataset_rumah_sakit_final.csv"),
            columns: ColumnNames::default(),
            sentiment_labels: ["positif", "negatif", "netral"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            emotion_labels: [
                "terkejut",
                "antisipasi",
                "takut",
                "marah",
                "jijik",
                "yakin",
                "sedih",
                "bahagia",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            sentiment_model: "joeddav/xlm-roberta-large-xnli".into(),
            emotion_model: "SamLowe/roberta-base-go-emotions".into(),
            inference_endpoint: "https://api-inference.huggingface.co/models/{model}".into(),
            token_env: "HF_TOKEN".into(),
            request_timeout_secs: 60,
        }
    }
}

impl DashboardConfig {
    /// Resolve the config: `$HOSPITAL_DASHBOARD_CONFIG`, then `./dashboard.json`,
    /// then built-in defaults.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !path.trim().is_empty() {
                return Self::from_file(Path::new(&path));
            }
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::from_file(local);
        }
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Parse and validate a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text).map_err(|e| {
            DashboardError::Config(format!("{}: {e}", path.display()))
        })?;
        config.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Reject label vocabularies that could never produce a valid prediction.
    pub fn validate(&self) -> Result<()> {
        for (name, labels) in [
            ("sentiment_labels", &self.sentiment_labels),
            ("emotion_labels", &self.emotion_labels),
        ] {
            if labels.is_empty() {
                return Err(DashboardError::Config(format!("{name} is empty")));
            }
            for (i, label) in labels.iter().enumerate() {
                if labels[..i].contains(label) {
                    return Err(DashboardError::Config(format!(
                        "{name} contains '{label}' twice"
                    )));
                }
            }
        }
        if self
            .sentiment_labels
            .iter()
            .any(|l| self.emotion_labels.contains(l))
        {
            return Err(DashboardError::Config(
                "sentiment_labels and emotion_labels must be disjoint".into(),
            ));
        }
        if !self.inference_endpoint.contains("{model}") {
            return Err(DashboardError::Config(
                "inference_endpoint must contain '{model}'".into(),
            ));
        }
        Ok(())
    }
}
