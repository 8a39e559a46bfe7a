pub mod classifier;
pub mod config;
pub mod detector;
pub mod error;
pub mod features;
pub mod rules;
pub mod url_parser;

pub use classifier::{ClassifierAdapter, ModelArtifact, ModelBundle, ProbabilityModel};
pub use config::Config;
pub use detector::{Label, Outcome, PhishingDetector, Prediction, Source};
pub use error::{Error, Result};
pub use features::{
    extract_features, FeatureExtractor, FeatureSchema, FeatureVariant, FeatureVector,
};
pub use rules::{Rule, RuleEngine, RuleVerdict};
pub use url_parser::ParsedUrl;
