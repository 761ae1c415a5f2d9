//! Zero-shot classification of single review texts.
//!
//! The actual scoring is done by an external capability behind
//! [`ZeroShotBackend`]; this module validates input, caches the backend for
//! the life of the process and ranks what comes back.
//!
//! ```rust,no_run
//! use hospital_review_dashboard::classify::Classifiers;
//! use hospital_review_dashboard::config::DashboardConfig;
//!
//! # fn main() -> hospital_review_dashboard::Result<()> {
//! let classifiers = Classifiers::from_config(&DashboardConfig::default())?;
//! let output = classifiers.sentiment.classify("Prosesnya cepat dan mudah")?;
//! for p in &output.predictions {
//!     println!("{}: {:.4}", p.label, p.score);
//! }
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod cache;
pub mod pipeline;

pub use backend::{BackendOptions, HfInferenceBackend, HfOptions, ZeroShotBackend};
pub use cache::{global_cache, ModelCache};
pub use pipeline::{
    classify, validate_labels, Classifiers, Prediction, PredictionResult, Task, ZeroShotClassifier,
};
