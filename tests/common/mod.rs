#![allow(dead_code)]

use phishscan::classifier::{ModelBundle, ProbabilityModel};
use phishscan::detector::DetectorSettings;
use phishscan::{FeatureSchema, FeatureVariant, PhishingDetector};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Returns a fixed probability and counts how often it was asked.
pub struct StubModel {
    pub probability: f64,
    pub calls: AtomicUsize,
}

impl StubModel {
    pub fn new(probability: f64) -> Arc<Self> {
        Arc::new(Self {
            probability,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ProbabilityModel for StubModel {
    fn predict_proba(&self, _features: &[f64]) -> f64 {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.probability
    }

    fn name(&self) -> &str {
        "StubModel"
    }
}

pub fn detector_with(model: Arc<StubModel>, threshold: f64) -> PhishingDetector {
    let bundle = ModelBundle::new(model, FeatureSchema::builtin(FeatureVariant::Full));
    let settings = DetectorSettings {
        threshold,
        ..DetectorSettings::default()
    };
    PhishingDetector::new(bundle, settings).expect("valid detector settings")
}

/// Fresh scratch directory, removed when the guard is dropped.
pub fn scratch_dir() -> TempDir {
    tempfile::tempdir().expect("create scratch dir")
}
