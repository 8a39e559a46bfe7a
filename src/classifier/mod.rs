//! Classifier Adapter
//!
//! Wraps a pre-trained probabilistic model behind [`ProbabilityModel`] and
//! feeds it feature values in the schema's column order. Model artifacts and
//! feature schemas are loaded once at startup into a [`ModelBundle`]; nothing
//! here is mutated afterwards.

pub mod forest;
pub mod logistic;

use crate::config::ModelConfig;
use crate::error::{Error, Result};
use crate::features::{is_yaml_path, FeatureSchema, FeatureVector};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

pub use forest::{DecisionTree, RandomForest, TreeNode};
pub use logistic::LogisticModel;

/// A trained binary classifier.
pub trait ProbabilityModel: Send + Sync {
    /// Probability of the phishing class for a vector in schema order.
    fn predict_proba(&self, features: &[f64]) -> f64;

    /// Input width the model was trained on, when it is known.
    fn expected_features(&self) -> Option<usize> {
        None
    }

    fn name(&self) -> &str;
}

/// On-disk model description, JSON or YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    RandomForest(RandomForest),
    Logistic(LogisticModel),
}

impl ModelArtifact {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let artifact: ModelArtifact = if is_yaml_path(path) {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            ModelArtifact::RandomForest(forest) => forest.validate(),
            ModelArtifact::Logistic(model) => model.validate(),
        }
    }

    pub fn into_model(self) -> Arc<dyn ProbabilityModel> {
        match self {
            ModelArtifact::RandomForest(forest) => Arc::new(forest),
            ModelArtifact::Logistic(model) => Arc::new(model),
        }
    }
}

/// The process-wide model and schema. Either half may be missing when it
/// failed to load; classification then reports the model as unavailable.
#[derive(Clone, Default)]
pub struct ModelBundle {
    pub model: Option<Arc<dyn ProbabilityModel>>,
    pub schema: Option<FeatureSchema>,
}

impl std::fmt::Debug for ModelBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelBundle")
            .field("model", &self.model.as_ref().map(|m| m.name().to_string()))
            .field("schema", &self.schema.as_ref().map(FeatureSchema::len))
            .finish()
    }
}

impl ModelBundle {
    pub fn new(model: Arc<dyn ProbabilityModel>, schema: FeatureSchema) -> Self {
        Self {
            model: Some(model),
            schema: Some(schema),
        }
    }

    /// Load the model and schema named in `config`. Failures are logged and
    /// leave the corresponding half empty.
    pub fn load(config: &ModelConfig) -> Self {
        let schema = match FeatureSchema::load_from_file(&config.schema_path) {
            Ok(schema) => Some(schema),
            Err(e) => {
                log::error!(
                    "Failed to load feature schema from {}: {}",
                    config.schema_path,
                    e
                );
                None
            }
        };

        let model = match ModelArtifact::load_from_file(&config.path) {
            Ok(artifact) => {
                let model = artifact.into_model();
                log::info!("{} loaded from {}", model.name(), config.path);
                Some(model)
            }
            Err(e) => {
                log::error!("Failed to load model from {}: {}", config.path, e);
                None
            }
        };

        let bundle = Self { model, schema };
        if let Err(e) = bundle.check_width() {
            log::error!("Discarding model: {}", e);
            return Self {
                model: None,
                schema: bundle.schema,
            };
        }
        bundle
    }

    pub fn is_ready(&self) -> bool {
        self.model.is_some() && self.schema.is_some()
    }

    /// Error unless both the model and the schema are present and agree on
    /// width.
    pub fn require_ready(&self) -> Result<()> {
        if self.model.is_none() {
            return Err(Error::ModelUnavailable("model not loaded".to_string()));
        }
        if self.schema.is_none() {
            return Err(Error::ModelUnavailable(
                "feature schema not loaded".to_string(),
            ));
        }
        self.check_width()
    }

    fn check_width(&self) -> Result<()> {
        if let (Some(model), Some(schema)) = (&self.model, &self.schema) {
            if let Some(width) = model.expected_features() {
                if width != schema.len() {
                    return Err(Error::InvalidModel(format!(
                        "{} expects {} features but the schema lists {}",
                        model.name(),
                        width,
                        schema.len()
                    )));
                }
            }
        }
        Ok(())
    }
}

pub struct ClassifierAdapter {
    model: Option<Arc<dyn ProbabilityModel>>,
    schema: Option<FeatureSchema>,
}

impl ClassifierAdapter {
    pub fn new(bundle: ModelBundle) -> Self {
        Self {
            model: bundle.model,
            schema: bundle.schema,
        }
    }

    pub fn is_available(&self) -> bool {
        self.model.is_some() && self.schema.is_some()
    }

    pub fn schema(&self) -> Option<&FeatureSchema> {
        self.schema.as_ref()
    }

    pub fn ensure_available(&self) -> Result<()> {
        self.parts().map(|_| ())
    }

    fn parts(&self) -> Result<(&dyn ProbabilityModel, &FeatureSchema)> {
        match (&self.model, &self.schema) {
            (Some(model), Some(schema)) => Ok((model.as_ref(), schema)),
            (None, _) => Err(Error::ModelUnavailable("model not loaded".to_string())),
            (_, None) => Err(Error::ModelUnavailable(
                "feature schema not loaded".to_string(),
            )),
        }
    }

    /// Phishing probability for `vector`. The vector's keys must match the
    /// schema exactly.
    pub fn score(&self, vector: &FeatureVector) -> Result<f64> {
        let (model, schema) = self.parts()?;
        let ordered = schema.order(vector)?;

        if let Some(width) = model.expected_features() {
            if width != ordered.len() {
                return Err(Error::ModelUnavailable(format!(
                    "{} expects {} features, got {}",
                    model.name(),
                    width,
                    ordered.len()
                )));
            }
        }

        let probability = model.predict_proba(&ordered);
        if !(0.0..=1.0).contains(&probability) {
            return Err(Error::InvalidProbability(probability));
        }

        log::debug!("{} scored {:.4}", model.name(), probability);
        Ok(probability)
    }
}
