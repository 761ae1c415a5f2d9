use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use hospital_review_dashboard::classify::{Classifiers, PredictionResult};
use hospital_review_dashboard::config::DashboardConfig;
use hospital_review_dashboard::data::filter::options_for;
use hospital_review_dashboard::data::loader;
use hospital_review_dashboard::data::model::{DatasetSchema, Field, SharedTable};
use hospital_review_dashboard::report::{PredictionExport, ReportSummary};
use hospital_review_dashboard::views::{render_view, View, ViewOutput, ViewParams};
use hospital_review_dashboard::DashboardError;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Result of the last manual prediction.
pub struct ManualPrediction {
    pub text: String,
    pub sentiment: PredictionResult,
    pub emotion: PredictionResult,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<SharedTable>,

    /// Page shown in the central panel.
    pub view: View,

    /// Filters and word-cloud choices.
    pub params: ViewParams,

    /// Output of the current view (cached until view, params or data change).
    pub output: Option<ViewOutput>,

    /// Classifiers, built on first prediction.
    pub classifiers: Option<Classifiers>,

    /// Manual prediction input and last result.
    pub prediction_text: String,
    pub prediction: Option<ManualPrediction>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            dataset: None,
            view: View::Home,
            params: ViewParams::default(),
            output: None,
            classifiers: None,
            prediction_text: String::new(),
            prediction: None,
            status_message: None,
        }
    }

    /// Load a dataset file with the configured schema.
    pub fn load(&mut self, path: &Path) {
        let schema = DatasetSchema::from(&self.config);
        match loader::load_with_schema(path, &schema) {
            Ok(table) => self.set_dataset(Arc::new(table)),
            Err(e) => self.report_error("Failed to load dataset", &e),
        }
    }

    /// Re-read the current dataset from disk into a fresh table.
    pub fn reload(&mut self) {
        let Some(table) = &self.dataset else {
            return;
        };
        match loader::reload(table) {
            Ok(table) => self.set_dataset(table),
            Err(e) => self.report_error("Failed to reload dataset", &e),
        }
    }

    /// Ingest a newly loaded dataset and reset filters.
    pub fn set_dataset(&mut self, dataset: SharedTable) {
        log::info!("Dataset ready: {} reviews", dataset.len());
        self.dataset = Some(dataset);
        self.params.filter.clear();
        self.params.cloud_label = None;
        self.status_message = None;
        self.refresh();
    }

    pub fn set_view(&mut self, view: View) {
        if self.view != view {
            self.view = view;
            self.refresh();
        }
    }

    /// Set or clear one selectbox filter. Clearing a hospital type also
    /// clears the hospital chosen under it.
    pub fn set_filter(&mut self, field: Field, value: Option<String>) {
        match value {
            Some(v) => {
                self.params.filter.insert(field, v);
            }
            None => {
                self.params.filter.remove(&field);
            }
        }
        if field == Field::HospitalType {
            self.params.filter.remove(&Field::Hospital);
        }
        self.refresh();
    }

    /// Choices for a selectbox given the selections above it.
    pub fn filter_options(&self, field: Field) -> Vec<String> {
        let Some(table) = &self.dataset else {
            return Vec::new();
        };
        let mut upstream = self.params.filter.clone();
        if field == Field::HospitalType {
            upstream.remove(&Field::Hospital);
        }
        options_for(table, &upstream, field)
    }

    pub fn set_cloud_label_field(&mut self, field: Field) {
        self.params.cloud_label_field = field;
        self.params.cloud_label = None;
        self.refresh();
    }

    pub fn set_cloud_label(&mut self, label: String) {
        self.params.cloud_label = Some(label);
        self.refresh();
    }

    /// Recompute the current view's output.
    pub fn refresh(&mut self) {
        let Some(table) = &self.dataset else {
            self.output = None;
            return;
        };
        match render_view(self.view, table, &self.params) {
            Ok(output) => self.output = Some(output),
            Err(e) => {
                self.output = None;
                self.report_error("Failed to compute view", &e);
            }
        }
    }

    /// Classify the manual input with both classifiers.
    pub fn predict(&mut self) {
        if self.prediction_text.trim().is_empty() {
            self.status_message = Some("Teks masih kosong!".into());
            return;
        }
        if self.classifiers.is_none() {
            match Classifiers::from_config(&self.config) {
                Ok(c) => self.classifiers = Some(c),
                Err(e) => return self.report_error("Failed to set up classifiers", &e),
            }
        }
        let Some(classifiers) = &self.classifiers else {
            return;
        };

        let text = self.prediction_text.clone();
        let result = classifiers
            .sentiment
            .classify(&text)
            .and_then(|s| Ok((s, classifiers.emotion.classify(&text)?)));
        match result {
            Ok((sentiment, emotion)) => {
                self.status_message = None;
                self.prediction = Some(ManualPrediction {
                    text,
                    sentiment,
                    emotion,
                });
            }
            Err(e) => self.report_error("Prediction failed", &e),
        }
    }

    /// Save the last prediction as a one-row CSV.
    pub fn export_prediction(&mut self, path: &Path) {
        let Some(p) = &self.prediction else {
            return;
        };
        let result = PredictionExport::new(&p.text, &p.sentiment, &p.emotion)
            .and_then(|export| export.write_csv(path))
            .with_context(|| format!("writing {}", path.display()));
        if let Err(e) = result {
            log::error!("{e:#}");
            self.status_message = Some(format!("Error: {e:#}"));
        }
    }

    /// Save the report summary of the loaded dataset as JSON.
    pub fn export_report(&mut self, path: &Path) {
        let Some(table) = &self.dataset else {
            return;
        };
        let result = ReportSummary::from_table(table)
            .and_then(|summary| summary.write_json(path))
            .with_context(|| format!("writing {}", path.display()));
        if let Err(e) = result {
            log::error!("{e:#}");
            self.status_message = Some(format!("Error: {e:#}"));
        }
    }

    fn report_error(&mut self, what: &str, e: &DashboardError) {
        let message = match e {
            DashboardError::MissingColumn(col) => format!("Dataset tidak memiliki kolom '{col}'"),
            DashboardError::EmptyInput => "Teks masih kosong!".to_string(),
            other => format!("{what}: {other}"),
        };
        log::error!("{what}: {e}");
        self.status_message = Some(message);
    }
}
