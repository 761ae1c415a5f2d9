use crate::data::aggregate::{count_by, percent_by, AggregationResult, PercentResult};
use crate::data::corpus::{corpus_for, term_frequencies};
use crate::data::filter::{self, RowFilter};
use crate::data::model::{Field, ReviewTable};
use crate::error::{DashboardError, Result};
use crate::report::ReportSummary;

// ---------------------------------------------------------------------------
// Views and their parameters
// ---------------------------------------------------------------------------

/// Dashboard pages, in navigation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Home,
    SentimentStats,
    EmotionStats,
    WordCloud,
    HospitalType,
    ManualPrediction,
    Report,
}

/// User choices that feed a view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewParams {
    /// Hospital-type / hospital selections applied before aggregating.
    pub filter: RowFilter,
    /// Label column the word cloud is split by (sentiment or emotion).
    pub cloud_label_field: Field,
    /// Label whose reviews make up the corpus; first label when unset.
    pub cloud_label: Option<String>,
    /// Text variant the corpus is built from.
    pub cloud_text_field: Field,
    pub cloud_terms: usize,
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            filter: RowFilter::new(),
            cloud_label_field: Field::Sentiment,
            cloud_label: None,
            cloud_text_field: Field::Lemmatized,
            cloud_terms: 50,
        }
    }
}

/// How a chart should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartStyle {
    /// One bar per value of a single column.
    Distribution,
    /// Bars per primary value, one per secondary value side by side.
    Grouped,
    /// Bars per primary value, secondary values stacked.
    Stacked,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub style: ChartStyle,
    pub data: AggregationResult,
}

/// Everything a page needs to draw, free of any UI type.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewOutput {
    Home {
        total_reviews: usize,
        hospitals: usize,
        hospital_types: Vec<String>,
    },
    Charts(Vec<Chart>),
    WordCloud {
        label_field: Field,
        label: Option<String>,
        options: Vec<String>,
        corpus_words: usize,
        terms: Vec<(String, usize)>,
    },
    HospitalType {
        chart: Chart,
        percentages: PercentResult,
    },
    ManualPrediction,
    Report(ReportSummary),
}

// ---------------------------------------------------------------------------
// Dispatch table
// ---------------------------------------------------------------------------

type ViewHandler = fn(&ReviewTable, &ViewParams) -> Result<ViewOutput>;

pub struct ViewEntry {
    pub view: View,
    pub title: &'static str,
    handler: ViewHandler,
}

pub const VIEWS: &[ViewEntry] = &[
    ViewEntry {
        view: View::Home,
        title: "Beranda",
        handler: home,
    },
    ViewEntry {
        view: View::SentimentStats,
        title: "Statistik Sentimen",
        handler: sentiment_stats,
    },
    ViewEntry {
        view: View::EmotionStats,
        title: "Statistik Emosi",
        handler: emotion_stats,
    },
    ViewEntry {
        view: View::WordCloud,
        title: "Wordcloud",
        handler: word_cloud,
    },
    ViewEntry {
        view: View::HospitalType,
        title: "Analisis Tipe RS",
        handler: hospital_type,
    },
    ViewEntry {
        view: View::ManualPrediction,
        title: "Prediksi Manual",
        handler: manual_prediction,
    },
    ViewEntry {
        view: View::Report,
        title: "Laporan",
        handler: report,
    },
];

impl View {
    /// Dispatch entry; `VIEWS` is laid out in declaration order.
    fn entry(self) -> &'static ViewEntry {
        &VIEWS[self as usize]
    }

    pub fn title(self) -> &'static str {
        self.entry().title
    }
}

/// Compute a view's output from the table after applying `params.filter`.
pub fn render_view(view: View, table: &ReviewTable, params: &ViewParams) -> Result<ViewOutput> {
    let filtered = filter::apply(table, &params.filter);
    (view.entry().handler)(&filtered, params)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn home(table: &ReviewTable, _params: &ViewParams) -> Result<ViewOutput> {
    Ok(ViewOutput::Home {
        total_reviews: table.len(),
        hospitals: table.distinct_values(Field::Hospital).len(),
        hospital_types: table.distinct_values(Field::HospitalType),
    })
}

fn sentiment_stats(table: &ReviewTable, _params: &ViewParams) -> Result<ViewOutput> {
    Ok(ViewOutput::Charts(vec![
        Chart {
            title: "Distribusi Sentimen".into(),
            style: ChartStyle::Distribution,
            data: count_by(table, Field::Sentiment, None)?,
        },
        Chart {
            title: "Sentimen per Rumah Sakit".into(),
            style: ChartStyle::Grouped,
            data: count_by(table, Field::Hospital, Some(Field::Sentiment))?,
        },
    ]))
}

fn emotion_stats(table: &ReviewTable, _params: &ViewParams) -> Result<ViewOutput> {
    Ok(ViewOutput::Charts(vec![
        Chart {
            title: "Distribusi Emosi".into(),
            style: ChartStyle::Distribution,
            data: count_by(table, Field::Emotion, None)?,
        },
        Chart {
            title: "Emosi per Rumah Sakit".into(),
            style: ChartStyle::Stacked,
            data: count_by(table, Field::Hospital, Some(Field::Emotion))?,
        },
    ]))
}

fn word_cloud(table: &ReviewTable, params: &ViewParams) -> Result<ViewOutput> {
    let label_field = params.cloud_label_field;
    if label_field.is_text() {
        return Err(DashboardError::UnknownColumn(format!(
            "{label_field} is not a label column"
        )));
    }
    let options = table.distinct_values(label_field);
    let label = params
        .cloud_label
        .clone()
        .or_else(|| options.first().cloned());

    let corpus = match &label {
        Some(label) => corpus_for(table, params.cloud_text_field, label_field, label),
        None => String::new(),
    };

    Ok(ViewOutput::WordCloud {
        label_field,
        label,
        options,
        corpus_words: corpus.split_whitespace().count(),
        terms: term_frequencies(&corpus, params.cloud_terms),
    })
}

fn hospital_type(table: &ReviewTable, _params: &ViewParams) -> Result<ViewOutput> {
    Ok(ViewOutput::HospitalType {
        chart: Chart {
            title: "Sentimen per Tipe Rumah Sakit".into(),
            style: ChartStyle::Grouped,
            data: count_by(table, Field::HospitalType, Some(Field::Sentiment))?,
        },
        percentages: percent_by(table, Field::HospitalType, Field::Sentiment)?,
    })
}

fn manual_prediction(_table: &ReviewTable, _params: &ViewParams) -> Result<ViewOutput> {
    Ok(ViewOutput::ManualPrediction)
}

fn report(table: &ReviewTable, _params: &ViewParams) -> Result<ViewOutput> {
    Ok(ViewOutput::Report(ReportSummary::from_table(table)?))
}
