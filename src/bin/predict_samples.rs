//! Classify a few fixed review texts against the configured hosted models.
//!
//! Useful for checking the endpoint and token before opening the dashboard:
//!
//! ```text
//! HF_TOKEN=... RUST_LOG=info cargo run --bin predict_samples
//! ```

use anyhow::Context;
use hospital_review_dashboard::classify::Classifiers;
use hospital_review_dashboard::config::DashboardConfig;

const SAMPLES: &[&str] = &[
    "pelayanan sangat baik saya berterimakasih karena telah disembuhkan",
    "Dokternya jutek dan tidak ramah",
    "Prosesnya cepat dan mudah",
];

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = DashboardConfig::load().context("loading dashboard config")?;
    let classifiers = Classifiers::from_config(&config).context("building classifiers")?;

    for text in SAMPLES {
        let result = classifiers
            .sentiment
            .classify(text)
            .with_context(|| format!("classifying {text:?}"))?;
        let top = result
            .top()
            .context("classifier returned no predictions")?;
        println!("{text}");
        println!("  -> {} ({:.4})", top.label, top.score);
    }
    Ok(())
}
