use std::sync::Arc;

use serde::Serialize;

use super::backend::{BackendOptions, HfOptions, ZeroShotBackend};
use super::cache::{global_cache, ModelCache};
use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};

// ============ Output types ============

/// A label with confidence score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Label name.
    pub label: String,
    /// Confidence score (0.0 to 1.0).
    pub score: f32,
}

/// All candidate labels ranked by descending score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub predictions: Vec<Prediction>,
}

impl PredictionResult {
    /// Highest-scoring prediction.
    pub fn top(&self) -> Option<&Prediction> {
        self.predictions.first()
    }

    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }
}

/// Which label vocabulary a classifier scores against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    Sentiment,
    Emotion,
}

impl Task {
    pub fn as_str(self) -> &'static str {
        match self {
            Task::Sentiment => "sentiment",
            Task::Emotion => "emotion",
        }
    }
}

// ============ Core operation ============

/// Score `text` against `candidate_labels` and rank the result.
///
/// Blank text fails before the backend is touched. Scores come back exactly
/// as the backend produced them: no renormalisation, no threshold.
pub fn classify(
    backend: &dyn ZeroShotBackend,
    text: &str,
    candidate_labels: &[String],
) -> Result<PredictionResult> {
    if text.trim().is_empty() {
        return Err(DashboardError::EmptyInput);
    }
    validate_labels(candidate_labels)?;

    let scored = backend.score(text, candidate_labels)?;
    check_backend_output(&scored, candidate_labels)?;

    let mut predictions: Vec<Prediction> = scored
        .into_iter()
        .map(|(label, score)| Prediction { label, score })
        .collect();
    predictions.sort_by(|a, b| b.score.total_cmp(&a.score));
    Ok(PredictionResult { predictions })
}

/// Candidate labels must be a non-empty list of distinct, non-blank strings.
pub fn validate_labels(labels: &[String]) -> Result<()> {
    if labels.is_empty() {
        return Err(DashboardError::InvalidLabels("no candidate labels".into()));
    }
    for (i, label) in labels.iter().enumerate() {
        if label.trim().is_empty() {
            return Err(DashboardError::InvalidLabels(format!("label {i} is blank")));
        }
        if labels[..i].contains(label) {
            return Err(DashboardError::InvalidLabels(format!("'{label}' given twice")));
        }
    }
    Ok(())
}

fn check_backend_output(scored: &[(String, f32)], labels: &[String]) -> Result<()> {
    if scored.len() != labels.len() {
        return Err(DashboardError::ExternalCapability(format!(
            "expected {} scores, got {}",
            labels.len(),
            scored.len()
        )));
    }
    for (i, (label, score)) in scored.iter().enumerate() {
        if !labels.contains(label) || scored[..i].iter().any(|(l, _)| l == label) {
            return Err(DashboardError::ExternalCapability(format!(
                "unexpected label '{label}' in response"
            )));
        }
        if !(0.0..=1.0).contains(score) {
            return Err(DashboardError::ExternalCapability(format!(
                "score {score} for '{label}' is outside [0, 1]"
            )));
        }
    }
    Ok(())
}

// ============ Classifier with a fixed vocabulary ============

/// A zero-shot classifier bound to one task and one label vocabulary.
///
/// The backend is built lazily on first use and shared through a
/// [`ModelCache`]; later calls reuse it.
pub struct ZeroShotClassifier {
    task: Task,
    labels: Vec<String>,
    options: Arc<dyn BackendOptions>,
    cache: Arc<ModelCache>,
}

impl ZeroShotClassifier {
    pub fn new(task: Task, labels: Vec<String>, options: Arc<dyn BackendOptions>) -> Result<Self> {
        Self::with_cache(task, labels, options, global_cache())
    }

    pub fn with_cache(
        task: Task,
        labels: Vec<String>,
        options: Arc<dyn BackendOptions>,
        cache: Arc<ModelCache>,
    ) -> Result<Self> {
        validate_labels(&labels)?;
        Ok(Self {
            task,
            labels,
            options,
            cache,
        })
    }

    pub fn task(&self) -> Task {
        self.task
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Cache key: task, backend configuration and label vocabulary.
    pub fn cache_key(&self) -> String {
        format!(
            "{}|{}|{}",
            self.task.as_str(),
            self.options.cache_key(),
            self.labels.join(",")
        )
    }

    pub fn classify(&self, text: &str) -> Result<PredictionResult> {
        if text.trim().is_empty() {
            return Err(DashboardError::EmptyInput);
        }
        let backend = self
            .cache
            .get_or_create(&self.cache_key(), || self.options.load())?;
        let result = classify(backend.as_ref(), text, &self.labels)?;
        if let Some(top) = result.top() {
            log::info!("{}: {} ({:.4})", self.task.as_str(), top.label, top.score);
        }
        Ok(result)
    }
}

/// The sentiment and emotion classifiers used by the dashboard.
pub struct Classifiers {
    pub sentiment: ZeroShotClassifier,
    pub emotion: ZeroShotClassifier,
}

impl Classifiers {
    /// Build both classifiers against the configured hosted models.
    pub fn from_config(config: &DashboardConfig) -> Result<Self> {
        Ok(Self {
            sentiment: ZeroShotClassifier::new(
                Task::Sentiment,
                config.sentiment_labels.clone(),
                Arc::new(HfOptions::new(&config.sentiment_model, config)),
            )?,
            emotion: ZeroShotClassifier::new(
                Task::Emotion,
                config.emotion_labels.clone(),
                Arc::new(HfOptions::new(&config.emotion_model, config)),
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scores labels by position: the last label gets the highest score.
    struct Ascending;

    impl ZeroShotBackend for Ascending {
        fn score(&self, _text: &str, labels: &[String]) -> Result<Vec<(String, f32)>> {
            let total: f32 = (1..=labels.len()).map(|i| i as f32).sum();
            Ok(labels
                .iter()
                .enumerate()
                .map(|(i, l)| (l.clone(), (i + 1) as f32 / total))
                .collect())
        }
    }

    struct Fixed(Vec<(String, f32)>);

    impl ZeroShotBackend for Fixed {
        fn score(&self, _text: &str, _labels: &[String]) -> Result<Vec<(String, f32)>> {
            Ok(self.0.clone())
        }
    }

    struct CountingOptions {
        key: &'static str,
        loads: Arc<AtomicUsize>,
    }

    impl BackendOptions for CountingOptions {
        fn cache_key(&self) -> String {
            self.key.to_string()
        }

        fn load(&self) -> Result<Arc<dyn ZeroShotBackend>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(Ascending))
        }
    }

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn ranks_descending_and_keeps_scores() {
        let result = classify(&Ascending, "pelayanan cepat", &labels(&["negatif", "netral", "positif"]))
            .unwrap();
        let ranked: Vec<_> = result.predictions.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(ranked, vec!["positif", "netral", "negatif"]);
        assert!((result.predictions[0].score - 0.5).abs() < 1e-6);
        assert!(result.predictions.iter().all(|p| (0.0..=1.0).contains(&p.score)));
    }

    #[test]
    fn blank_text_is_rejected_before_backend() {
        struct Panics;
        impl ZeroShotBackend for Panics {
            fn score(&self, _: &str, _: &[String]) -> Result<Vec<(String, f32)>> {
                panic!("backend must not be called");
            }
        }
        for text in ["", "   ", "\n\t"] {
            assert!(matches!(
                classify(&Panics, text, &labels(&["positif"])),
                Err(DashboardError::EmptyInput)
            ));
        }
    }

    #[test]
    fn bad_candidate_lists_are_rejected() {
        assert!(matches!(
            classify(&Ascending, "teks", &[]),
            Err(DashboardError::InvalidLabels(_))
        ));
        assert!(matches!(
            classify(&Ascending, "teks", &labels(&["sedih", "sedih"])),
            Err(DashboardError::InvalidLabels(_))
        ));
    }

    #[test]
    fn backend_output_is_checked() {
        let candidates = labels(&["positif", "negatif"]);
        let missing = Fixed(vec![("positif".into(), 0.9)]);
        assert!(matches!(
            classify(&missing, "teks", &candidates),
            Err(DashboardError::ExternalCapability(_))
        ));
        let foreign = Fixed(vec![("positif".into(), 0.9), ("marah".into(), 0.1)]);
        assert!(matches!(
            classify(&foreign, "teks", &candidates),
            Err(DashboardError::ExternalCapability(_))
        ));
        let out_of_range = Fixed(vec![("positif".into(), 1.5), ("negatif".into(), 0.1)]);
        assert!(matches!(
            classify(&out_of_range, "teks", &candidates),
            Err(DashboardError::ExternalCapability(_))
        ));
    }

    #[test]
    fn backend_loads_once_per_classifier() {
        let cache = Arc::new(ModelCache::new());
        let loads = Arc::new(AtomicUsize::new(0));
        let classifier = ZeroShotClassifier::with_cache(
            Task::Sentiment,
            labels(&["positif", "negatif", "netral"]),
            Arc::new(CountingOptions {
                key: "fake",
                loads: Arc::clone(&loads),
            }),
            Arc::clone(&cache),
        )
        .unwrap();

        assert!(matches!(classifier.classify(" "), Err(DashboardError::EmptyInput)));
        assert_eq!(loads.load(Ordering::SeqCst), 0);

        classifier.classify("dokternya ramah").unwrap();
        classifier.classify("antri lama").unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(cache.contains(&classifier.cache_key()));
    }

    #[test]
    fn sentiment_and_emotion_do_not_share_state() {
        let cache = Arc::new(ModelCache::new());
        let loads = Arc::new(AtomicUsize::new(0));
        let build = |task, names: &[&str]| {
            ZeroShotClassifier::with_cache(
                task,
                labels(names),
                Arc::new(CountingOptions {
                    key: "fake",
                    loads: Arc::clone(&loads),
                }),
                Arc::clone(&cache),
            )
            .unwrap()
        };
        let sentiment = build(Task::Sentiment, &["positif", "negatif", "netral"]);
        let emotion = build(Task::Emotion, &["sedih", "bahagia"]);

        let s = sentiment.classify("bagus").unwrap();
        let e = emotion.classify("bagus").unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(e.len(), 2);
        assert_eq!(e.top().unwrap().label, "bahagia");
        assert_eq!(sentiment.classify("bagus").unwrap(), s);
        assert_eq!(loads.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }
}
