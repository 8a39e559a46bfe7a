//! Decision Orchestrator
//!
//! Runs the rule engine first and only falls through to feature extraction
//! and model scoring when no rule fires. The detector holds no mutable state
//! and can be shared across threads behind an `Arc`.

use crate::classifier::{ClassifierAdapter, ModelBundle};
use crate::config::{validate_threshold, Config, VariantSelection, DEFAULT_THRESHOLD};
use crate::error::{Error, Result};
use crate::features::{FeatureExtractor, FeatureVariant, FeatureVector};
use crate::rules::{RuleEngine, RuleVerdict};
use serde::Serialize;
use std::fmt;

pub const MODEL_REASON: &str = "model prediction";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Phishing,
    Safe,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Phishing => "phishing",
            Label::Safe => "safe",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Rule,
    Model,
}

/// Terminal states of a classification call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    RuleFired,
    ModelScored,
    /// No model or schema was loaded.
    Unavailable,
    /// Schema mismatch or a model output outside [0, 1].
    Failed,
}

impl Outcome {
    pub fn of(result: &Result<Prediction>) -> Self {
        match result {
            Ok(prediction) => prediction.outcome(),
            Err(Error::ModelUnavailable(_)) => Outcome::Unavailable,
            Err(_) => Outcome::Failed,
        }
    }
}

/// A verdict. `probability` is present only for model verdicts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub label: Label,
    pub source: Source,
    pub probability: Option<f64>,
    pub reason: String,
}

impl Prediction {
    pub fn from_rule(verdict: RuleVerdict) -> Self {
        Self {
            label: Label::Phishing,
            source: Source::Rule,
            probability: None,
            reason: verdict.reason,
        }
    }

    pub fn from_score(probability: f64, threshold: f64) -> Self {
        Self {
            label: label_for(probability, threshold),
            source: Source::Model,
            probability: Some(probability),
            reason: MODEL_REASON.to_string(),
        }
    }

    pub fn outcome(&self) -> Outcome {
        match self.source {
            Source::Rule => Outcome::RuleFired,
            Source::Model => Outcome::ModelScored,
        }
    }

    pub fn is_phishing(&self) -> bool {
        self.label == Label::Phishing
    }
}

/// `probability >= threshold` is phishing.
pub fn label_for(probability: f64, threshold: f64) -> Label {
    if probability >= threshold {
        Label::Phishing
    } else {
        Label::Safe
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorSettings {
    pub threshold: f64,
    pub variant: VariantSelection,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            variant: VariantSelection::Auto,
        }
    }
}

impl From<&Config> for DetectorSettings {
    fn from(config: &Config) -> Self {
        Self {
            threshold: config.model.threshold,
            variant: config.features.variant,
        }
    }
}

pub struct PhishingDetector {
    rules: RuleEngine,
    variant: FeatureVariant,
    extractor: Box<dyn FeatureExtractor>,
    classifier: ClassifierAdapter,
    threshold: f64,
}

impl PhishingDetector {
    pub fn new(bundle: ModelBundle, settings: DetectorSettings) -> Result<Self> {
        validate_threshold(settings.threshold)?;

        let variant = resolve_variant(&bundle, settings.variant);
        log::info!(
            "Phishing detector ready: {} features, threshold {}, model {}",
            variant,
            settings.threshold,
            if bundle.is_ready() { "loaded" } else { "unavailable" }
        );

        Ok(Self {
            rules: RuleEngine::new(),
            variant,
            extractor: variant.extractor(),
            classifier: ClassifierAdapter::new(bundle),
            threshold: settings.threshold,
        })
    }

    /// Load the model bundle named in `config` and build a detector around it.
    pub fn from_config(config: &Config) -> Result<Self> {
        let bundle = ModelBundle::load(&config.model);
        Self::new(bundle, DetectorSettings::from(config))
    }

    pub fn classify(&self, url: &str) -> Result<Prediction> {
        let result = self.decide(url);
        log::debug!("Classification of {:?} ended {:?}", url, Outcome::of(&result));
        result
    }

    fn decide(&self, url: &str) -> Result<Prediction> {
        if let Some(verdict) = self.rules.evaluate(url) {
            log::debug!("Rule verdict for {:?}: {}", url, verdict.reason);
            return Ok(Prediction::from_rule(verdict));
        }

        self.classifier.ensure_available()?;

        let features = self.extractor.extract(url);
        let probability = self.classifier.score(&features)?;
        let prediction = Prediction::from_score(probability, self.threshold);

        log::debug!(
            "Model verdict for {:?}: {} (p={:.4}, threshold={})",
            url,
            prediction.label,
            probability,
            self.threshold
        );
        Ok(prediction)
    }

    pub fn extract_features(&self, url: &str) -> FeatureVector {
        self.extractor.extract(url)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn variant(&self) -> FeatureVariant {
        self.variant
    }

    pub fn is_model_available(&self) -> bool {
        self.classifier.is_available()
    }
}

fn resolve_variant(bundle: &ModelBundle, selection: VariantSelection) -> FeatureVariant {
    if let Some(variant) = selection.fixed() {
        return variant;
    }

    match &bundle.schema {
        Some(schema) => FeatureVariant::for_schema(schema).unwrap_or_else(|| {
            log::warn!(
                "No feature extractor matches the {} column schema; using {}",
                schema.len(),
                FeatureVariant::Full
            );
            FeatureVariant::Full
        }),
        None => FeatureVariant::Full,
    }
}
