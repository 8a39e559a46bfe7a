pub mod compact;
pub mod heuristics;
pub mod placeholders;
pub mod url_features;

use crate::error::{Error, Result};
use crate::url_parser::ParsedUrl;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub use compact::CompactFeatureExtractor;
pub use placeholders::PLACEHOLDER_VALUE;
pub use url_features::UrlFeatureExtractor;

/// Everything a column computation may look at. Built once per URL.
#[derive(Debug, Clone)]
pub struct UrlView<'a> {
    pub raw: &'a str,
    pub lower: String,
    pub parsed: ParsedUrl,
}

impl<'a> UrlView<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self {
            raw,
            lower: raw.to_lowercase(),
            parsed: ParsedUrl::parse(raw),
        }
    }
}

/// One schema column. `compute` returns `None` when the value cannot be
/// derived, in which case `fallback` is used.
#[derive(Clone, Copy)]
pub struct FeatureDef {
    pub name: &'static str,
    pub compute: fn(&UrlView) -> Option<f64>,
    pub fallback: f64,
}

impl fmt::Debug for FeatureDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureDef")
            .field("name", &self.name)
            .field("fallback", &self.fallback)
            .finish()
    }
}

/// Evaluate every column independently; a failed column never affects the
/// others.
pub fn evaluate_defs(defs: &[FeatureDef], url: &str) -> FeatureVector {
    let view = UrlView::new(url);
    let mut vector = FeatureVector::with_capacity(defs.len());

    for def in defs {
        let value = match (def.compute)(&view) {
            Some(value) if value.is_finite() => value,
            _ => {
                log::debug!(
                    "Feature {} could not be computed for {:?}, using fallback {}",
                    def.name,
                    url,
                    def.fallback
                );
                def.fallback
            }
        };
        vector.insert(def.name, value);
    }

    vector
}

pub trait FeatureExtractor: Send + Sync {
    fn extract(&self, url: &str) -> FeatureVector;
    fn feature_names(&self) -> Vec<&'static str>;
    fn name(&self) -> &str;
}

/// Extract the full URL feature vector.
pub fn extract_features(url: &str) -> FeatureVector {
    UrlFeatureExtractor::new().extract(url)
}

/// Feature name to value, kept in extraction order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector {
    entries: Vec<(String, f64)>,
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Insert or overwrite a value.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| *value)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// The ordered column list a classifier was trained against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    pub fn new(names: Vec<String>) -> Result<Self> {
        if names.is_empty() {
            return Err(Error::InvalidSchema("schema has no features".to_string()));
        }

        let mut seen = HashSet::new();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(Error::InvalidSchema(format!("duplicate feature {}", name)));
            }
        }

        Ok(Self { names })
    }

    /// Load a JSON array or YAML sequence of feature names, by extension.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let names: Vec<String> = if is_yaml_path(path) {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };
        let schema = Self::new(names)?;
        log::info!(
            "Feature schema loaded from {}: {} features",
            path.display(),
            schema.len()
        );
        Ok(schema)
    }

    /// Default column order for a variant.
    pub fn builtin(variant: FeatureVariant) -> Self {
        let names = variant
            .extractor()
            .feature_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// The vector's key set must equal the schema exactly.
    pub fn validate(&self, vector: &FeatureVector) -> Result<()> {
        let missing: Vec<String> = self
            .names
            .iter()
            .filter(|name| vector.get(name).is_none())
            .cloned()
            .collect();
        let unexpected: Vec<String> = vector
            .names()
            .filter(|name| !self.contains(name))
            .map(str::to_string)
            .collect();

        if missing.is_empty() && unexpected.is_empty() {
            Ok(())
        } else {
            Err(Error::SchemaMismatch {
                missing,
                unexpected,
            })
        }
    }

    /// Values in schema order, after validation.
    pub fn order(&self, vector: &FeatureVector) -> Result<Vec<f64>> {
        self.validate(vector)?;
        Ok(self
            .names
            .iter()
            .filter_map(|name| vector.get(name))
            .collect())
    }

    fn name_set(&self) -> HashSet<&str> {
        self.names.iter().map(String::as_str).collect()
    }
}

pub(crate) fn is_yaml_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// The two extractor variants. Their columns are not interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureVariant {
    /// 48 columns: URL lexical/structural features plus content placeholders.
    Full,
    /// 6 columns with `is_https` polarity.
    Compact,
}

impl FeatureVariant {
    pub const ALL: [FeatureVariant; 2] = [FeatureVariant::Full, FeatureVariant::Compact];

    pub fn extractor(&self) -> Box<dyn FeatureExtractor> {
        match self {
            FeatureVariant::Full => Box::new(UrlFeatureExtractor::new()),
            FeatureVariant::Compact => Box::new(CompactFeatureExtractor::new()),
        }
    }

    /// The variant whose column set equals the schema, if any.
    pub fn for_schema(schema: &FeatureSchema) -> Option<Self> {
        let wanted = schema.name_set();
        Self::ALL.into_iter().find(|variant| {
            let names = variant.extractor().feature_names();
            names.len() == wanted.len() && names.iter().all(|name| wanted.contains(name))
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureVariant::Full => "full",
            FeatureVariant::Compact => "compact",
        }
    }
}

impl FromStr for FeatureVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "full" => Ok(FeatureVariant::Full),
            "compact" => Ok(FeatureVariant::Compact),
            other => Err(Error::InvalidConfig(format!(
                "unknown feature variant '{}', expected 'full' or 'compact'",
                other
            ))),
        }
    }
}

impl fmt::Display for FeatureVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(names: &[&str]) -> FeatureSchema {
        FeatureSchema::new(names.iter().map(|n| n.to_string()).collect()).unwrap()
    }

    #[test]
    fn test_schema_rejects_duplicates_and_empty() {
        assert!(matches!(
            FeatureSchema::new(vec![]),
            Err(Error::InvalidSchema(_))
        ));
        assert!(matches!(
            FeatureSchema::new(vec!["a".to_string(), "a".to_string()]),
            Err(Error::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_validate_reports_missing_and_unexpected() {
        let mut vector = FeatureVector::new();
        vector.insert("a", 1.0);
        vector.insert("c", 3.0);

        match schema(&["a", "b"]).validate(&vector) {
            Err(Error::SchemaMismatch {
                missing,
                unexpected,
            }) => {
                assert_eq!(missing, vec!["b".to_string()]);
                assert_eq!(unexpected, vec!["c".to_string()]);
            }
            other => panic!("expected schema mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_order_follows_schema_not_insertion() {
        let mut vector = FeatureVector::new();
        vector.insert("zeta", 1.0);
        vector.insert("alpha", 2.0);
        vector.insert("mid", 3.0);

        let ordered = schema(&["mid", "zeta", "alpha"]).order(&vector).unwrap();
        assert_eq!(ordered, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_vector_insert_overwrites() {
        let mut vector = FeatureVector::new();
        vector.insert("a", 1.0);
        vector.insert("a", 2.0);
        assert_eq!(vector.len(), 1);
        assert_eq!(vector.get("a"), Some(2.0));
    }

    #[test]
    fn test_variant_selected_by_schema() {
        assert_eq!(
            FeatureVariant::for_schema(&FeatureSchema::builtin(FeatureVariant::Full)),
            Some(FeatureVariant::Full)
        );

        let mut reversed: Vec<String> = FeatureSchema::builtin(FeatureVariant::Compact)
            .names()
            .to_vec();
        reversed.reverse();
        let reversed = FeatureSchema::new(reversed).unwrap();
        assert_eq!(
            FeatureVariant::for_schema(&reversed),
            Some(FeatureVariant::Compact)
        );

        assert_eq!(FeatureVariant::for_schema(&schema(&["UrlLength"])), None);
    }

    #[test]
    fn test_variant_parsing() {
        assert_eq!("Full".parse::<FeatureVariant>().unwrap(), FeatureVariant::Full);
        assert_eq!(
            "compact".parse::<FeatureVariant>().unwrap(),
            FeatureVariant::Compact
        );
        assert!("rich".parse::<FeatureVariant>().is_err());
    }

    #[test]
    fn test_failed_column_uses_fallback_without_affecting_others() {
        fn always_fails(_: &UrlView) -> Option<f64> {
            None
        }
        fn not_finite(_: &UrlView) -> Option<f64> {
            Some(f64::NAN)
        }
        fn length(view: &UrlView) -> Option<f64> {
            Some(view.raw.chars().count() as f64)
        }

        let defs = [
            FeatureDef {
                name: "broken",
                compute: always_fails,
                fallback: 0.0,
            },
            FeatureDef {
                name: "nan",
                compute: not_finite,
                fallback: 7.0,
            },
            FeatureDef {
                name: "length",
                compute: length,
                fallback: 0.0,
            },
        ];

        let vector = evaluate_defs(&defs, "abc");
        assert_eq!(vector.get("broken"), Some(0.0));
        assert_eq!(vector.get("nan"), Some(7.0));
        assert_eq!(vector.get("length"), Some(3.0));
    }

    #[test]
    fn test_vector_serializes_as_ordered_map() {
        let mut vector = FeatureVector::new();
        vector.insert("b", 1.0);
        vector.insert("a", -1.0);
        let json = serde_json::to_string(&vector).unwrap();
        assert_eq!(json, r#"{"b":1.0,"a":-1.0}"#);
    }
}
