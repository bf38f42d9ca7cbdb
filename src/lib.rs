pub mod config;
pub mod domain;
pub mod engine;
pub mod features;
pub mod model;
pub mod output;
pub mod schema;

// Re-export the types most callers need
pub use config::Config;
pub use domain::{DomainInfo, DomainResolver};
pub use engine::{AnalysisError, AnalysisResult, DetectionEngine, Verdict, PHISHING_THRESHOLD};
pub use features::FeatureExtractor;
pub use model::{ForestModel, ScoreError, Scorer};
pub use schema::{FeatureSchema, FeatureVector};
