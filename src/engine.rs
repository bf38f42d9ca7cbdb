//! Decision engine.
//!
//! Orchestrates normalization, the official-domain trust override, feature
//! extraction, and classifier scoring into one verdict per URL. The numeric
//! rules here (threshold, confidence cap, indicator order) are frozen
//! compatibility constants, not configuration.

use crate::config::Config;
use crate::domain::DomainResolver;
use crate::features::{names, FeatureExtractor};
use crate::model::{ForestModel, ScoreError, Scorer};
use crate::schema::{FeatureSchema, FeatureVector};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Probability strictly above this is phishing.
pub const PHISHING_THRESHOLD: f64 = 0.7;

/// Statistical confidence caps here; 100 is reserved for the
/// official-domain override.
const MAX_STATISTICAL_CONFIDENCE: u8 = 99;

/// Strictly more sensitive words than this raises a threat indicator.
const SENSITIVE_WORD_ALERT_LEVEL: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Legitimate,
    Phishing,
}

impl Verdict {
    pub fn is_phishing(self) -> bool {
        self == Verdict::Phishing
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Legitimate => write!(f, "Legitimate"),
            Verdict::Phishing => write!(f, "Phishing"),
        }
    }
}

/// Outcome of one analysis. Immutable; one instance per URL.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    /// The URL after scheme normalization.
    pub url: String,
    pub verdict: Verdict,
    /// Percent in 0..=100; 100 only on the official-domain override.
    pub confidence: u8,
    pub threat_indicators: Vec<String>,
    pub features: FeatureVector,
}

/// Failure surfaced by [`DetectionEngine::analyze`] instead of a verdict.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("classifier scoring failed: {0}")]
    Scoring(#[from] ScoreError),
}

/// The analysis pipeline: resolver, extractor, schema, and classifier, built
/// once and safe to share across threads.
pub struct DetectionEngine {
    resolver: DomainResolver,
    extractor: FeatureExtractor,
    schema: Arc<FeatureSchema>,
    scorer: Arc<dyn Scorer>,
}

impl DetectionEngine {
    pub fn new(config: &Config, schema: FeatureSchema, scorer: Arc<dyn Scorer>) -> Self {
        let schema = Arc::new(schema);
        DetectionEngine {
            resolver: DomainResolver::new(&config.official_domains, &config.known_brands),
            extractor: FeatureExtractor::new(&config.sensitive_words, Arc::clone(&schema)),
            schema,
            scorer,
        }
    }

    /// Load the feature schema and classifier named by the configuration.
    /// Failure here is fatal: no analysis runs without a working classifier.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let schema = FeatureSchema::from_file(&config.feature_names_path)?;
        let model = ForestModel::from_file(&config.model_path)?;
        if model.n_features != schema.len() {
            anyhow::bail!(
                "model expects {} features but the schema lists {}",
                model.n_features,
                schema.len()
            );
        }
        log::info!(
            "classifier loaded: {} trees over {} features",
            model.trees.len(),
            schema.len()
        );
        Ok(Self::new(config, schema, Arc::new(model)))
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Classify one URL. Never panics: malformed input degrades to the
    /// default feature vector, and any classifier failure comes back as an
    /// [`AnalysisError`].
    pub fn analyze(&self, raw_url: &str) -> Result<AnalysisResult, AnalysisError> {
        let url = normalize_scheme(raw_url);
        log::debug!("analyzing {url}");

        let parsed = match Url::parse(&url) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                log::warn!("URL failed to parse ({e}), scoring default features: {url}");
                None
            }
        };

        let host = parsed.as_ref().and_then(|p| p.host_str()).unwrap_or("");
        let domain = self.resolver.resolve(host);
        log::debug!(
            "host {:?}: registrable {:?}, official={}, spoofed={}",
            host,
            domain.registrable_domain,
            domain.is_official,
            domain.brand_spoofed
        );

        // Trust override: official hosts never reach the classifier
        if domain.is_official {
            let mut features = FeatureVector::zeroed(&self.schema);
            features.set(names::IS_OFFICIAL_DOMAIN, 1.0);
            return Ok(AnalysisResult {
                url,
                verdict: Verdict::Legitimate,
                confidence: 100,
                threat_indicators: Vec::new(),
                features,
            });
        }

        let features = match parsed.as_ref() {
            Some(parsed) => self.extractor.extract(&url, parsed, &domain),
            None => self.extractor.default_vector(),
        };

        let probability = self.scorer.score(features.as_slice())?;
        log::debug!("phishing probability {probability:.4}");

        let verdict = if probability > PHISHING_THRESHOLD {
            Verdict::Phishing
        } else {
            Verdict::Legitimate
        };
        let confidence = ((probability * 100.0).floor() as u8).min(MAX_STATISTICAL_CONFIDENCE);

        Ok(AnalysisResult {
            url,
            verdict,
            confidence,
            threat_indicators: threat_indicators(&features),
            features,
        })
    }
}

fn normalize_scheme(raw_url: &str) -> String {
    if raw_url.starts_with("http://") || raw_url.starts_with("https://") {
        raw_url.to_string()
    } else {
        format!("http://{raw_url}")
    }
}

/// Indicator order is fixed; callers display these verbatim.
fn threat_indicators(features: &FeatureVector) -> Vec<String> {
    let mut indicators = Vec::new();
    if features.get(names::NO_HTTPS) != 0.0 {
        indicators.push("No HTTPS".to_string());
    }
    let sensitive_words = features.get(names::NUM_SENSITIVE_WORDS);
    if sensitive_words > SENSITIVE_WORD_ALERT_LEVEL {
        indicators.push(format!("{} sensitive words", sensitive_words as u64));
    }
    if features.get(names::BRAND_SPOOFING) != 0.0 {
        indicators.push("Brand spoofing detected".to_string());
    }
    indicators
}
