use crate::error::Error;
use crate::features::FeatureVariant;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Phishing probability at or above which a scored URL is labelled phishing.
pub const DEFAULT_THRESHOLD: f64 = 0.58;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    pub model: ModelConfig,
    #[serde(default)]
    pub features: FeaturesConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ModelConfig {
    pub path: String,
    pub schema_path: String,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct FeaturesConfig {
    #[serde(default)]
    pub variant: VariantSelection,
}

/// Which extractor to run. `auto` picks the variant whose columns match the
/// loaded schema.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VariantSelection {
    #[default]
    Auto,
    Full,
    Compact,
}

impl VariantSelection {
    pub fn fixed(&self) -> Option<FeatureVariant> {
        match self {
            VariantSelection::Auto => None,
            VariantSelection::Full => Some(FeatureVariant::Full),
            VariantSelection::Compact => Some(FeatureVariant::Compact),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: ModelConfig {
                path: "models/phishing_model.json".to_string(),
                schema_path: "models/feature_metadata.json".to_string(),
                threshold: DEFAULT_THRESHOLD,
            },
            features: FeaturesConfig::default(),
            logging: Some(LoggingConfig {
                level: "info".to_string(),
            }),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn default_path() -> &'static str {
        "/etc/phishscan.toml"
    }

    pub fn validate(&self) -> Result<(), Error> {
        validate_threshold(self.model.threshold)?;
        if let Some(logging) = &self.logging {
            if logging.level.parse::<log::LevelFilter>().is_err() {
                return Err(Error::InvalidConfig(format!(
                    "unknown log level '{}'",
                    logging.level
                )));
            }
        }
        Ok(())
    }

    pub fn log_level(&self) -> log::LevelFilter {
        self.logging
            .as_ref()
            .and_then(|logging| logging.level.parse().ok())
            .unwrap_or(log::LevelFilter::Info)
    }
}

pub fn validate_threshold(threshold: f64) -> Result<(), Error> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "threshold {} is outside [0, 1]",
            threshold
        )))
    }
}
