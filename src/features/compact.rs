//! Six column extractor for models trained on the reduced feature set.
//!
//! Polarity differs from the full set: `is_https` is 1 for secure URLs, the
//! inverse of the full set's `NoHttps`.

use super::{evaluate_defs, FeatureDef, FeatureExtractor, FeatureVector, UrlView};

fn url_length(view: &UrlView) -> Option<f64> {
    Some(view.raw.chars().count() as f64)
}

fn has_at_symbol(view: &UrlView) -> Option<f64> {
    Some(if view.raw.contains('@') { 1.0 } else { 0.0 })
}

/// Hyphen count in the host (trained from `NumDashInHostname`).
fn has_hyphen(view: &UrlView) -> Option<f64> {
    Some(view.parsed.host.matches('-').count() as f64)
}

fn digit_count(view: &UrlView) -> Option<f64> {
    Some(view.raw.chars().filter(|c| c.is_ascii_digit()).count() as f64)
}

fn is_ip_address(view: &UrlView) -> Option<f64> {
    Some(if view.parsed.has_ipv4_host() { 1.0 } else { 0.0 })
}

fn is_https(view: &UrlView) -> Option<f64> {
    Some(if view.parsed.scheme == "https" { 1.0 } else { 0.0 })
}

const COLUMNS: [FeatureDef; 6] = [
    FeatureDef {
        name: "url_length",
        compute: url_length,
        fallback: 0.0,
    },
    FeatureDef {
        name: "has_at_symbol",
        compute: has_at_symbol,
        fallback: 0.0,
    },
    FeatureDef {
        name: "has_hyphen",
        compute: has_hyphen,
        fallback: 0.0,
    },
    FeatureDef {
        name: "digit_count",
        compute: digit_count,
        fallback: 0.0,
    },
    FeatureDef {
        name: "is_ip_address",
        compute: is_ip_address,
        fallback: 0.0,
    },
    FeatureDef {
        name: "is_https",
        compute: is_https,
        fallback: 0.0,
    },
];

#[derive(Debug, Default)]
pub struct CompactFeatureExtractor;

impl CompactFeatureExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FeatureExtractor for CompactFeatureExtractor {
    fn extract(&self, url: &str) -> FeatureVector {
        evaluate_defs(&COLUMNS, url)
    }

    fn feature_names(&self) -> Vec<&'static str> {
        COLUMNS.iter().map(|def| def.name).collect()
    }

    fn name(&self) -> &str {
        "CompactFeatureExtractor"
    }
}
