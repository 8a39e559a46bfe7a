// Startup loading: config file, feature schema, model artifact.

mod common;

use common::scratch_dir;
use phishscan::classifier::ModelBundle;
use phishscan::config::ModelConfig;
use phishscan::{Config, Error, FeatureSchema, FeatureVariant, Label, PhishingDetector, Source};
use std::fs;
use std::path::Path;

/// One stump on UrlLength (column 3 of the full schema).
const FOREST_JSON: &str = r#"{
    "kind": "random_forest",
    "n_features": 48,
    "trees": [
        {"nodes": [
            {"feature": 3, "threshold": 30.0, "left": 1, "right": 2},
            {"value": 0.2},
            {"value": 0.9}
        ]}
    ]
}"#;

fn write_schema(dir: &Path, variant: FeatureVariant) -> String {
    let path = dir.join("feature_metadata.json");
    let json = serde_json::to_string(&FeatureSchema::builtin(variant)).unwrap();
    fs::write(&path, json).unwrap();
    path.to_string_lossy().into_owned()
}

fn write_file(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_detector_from_config_file() {
    let dir = scratch_dir();
    let schema_path = write_schema(dir.path(), FeatureVariant::Full);
    let model_path = write_file(dir.path(), "phishing_model.json", FOREST_JSON);

    let config_text = format!(
        "[model]\npath = {:?}\nschema_path = {:?}\nthreshold = 0.58\n",
        model_path, schema_path
    );
    let config_path = write_file(dir.path(), "phishscan.toml", &config_text);

    let config = Config::load_from_file(&config_path).unwrap();
    let detector = PhishingDetector::from_config(&config).unwrap();
    assert!(detector.is_model_available());
    assert_eq!(detector.variant(), FeatureVariant::Full);

    let safe = detector.classify("https://example.com").unwrap();
    assert_eq!(safe.label, Label::Safe);
    assert_eq!(safe.probability, Some(0.2));

    let phishing = detector
        .classify("https://www.example.com/some/longer/path")
        .unwrap();
    assert_eq!(phishing.label, Label::Phishing);
    assert_eq!(phishing.source, Source::Model);
    assert_eq!(phishing.probability, Some(0.9));
}

#[test]
fn test_yaml_schema_and_model() {
    let dir = scratch_dir();
    let schema_path = write_file(
        dir.path(),
        "features.yaml",
        "- url_length\n- has_at_symbol\n- has_hyphen\n- digit_count\n- is_ip_address\n- is_https\n",
    );
    let model_path = write_file(
        dir.path(),
        "model.yaml",
        "kind: logistic\nintercept: 0.0\ncoefficients: [0.0, 0.0, 0.0, 0.0, 0.0, 0.0]\n",
    );

    let bundle = ModelBundle::load(&ModelConfig {
        path: model_path,
        schema_path,
        threshold: 0.58,
    });
    bundle.require_ready().unwrap();

    let detector = PhishingDetector::new(bundle, Default::default()).unwrap();
    assert_eq!(detector.variant(), FeatureVariant::Compact);

    // Zero logit gives 0.5, below the default threshold.
    let prediction = detector.classify("https://example.com").unwrap();
    assert_eq!(prediction.label, Label::Safe);
    assert_eq!(prediction.probability, Some(0.5));
}

#[test]
fn test_missing_files_leave_model_unavailable() {
    let dir = scratch_dir();
    let bundle = ModelBundle::load(&ModelConfig {
        path: dir.path().join("absent.json").to_string_lossy().into_owned(),
        schema_path: dir.path().join("absent_schema.json").to_string_lossy().into_owned(),
        threshold: 0.58,
    });
    assert!(!bundle.is_ready());
    assert!(matches!(
        bundle.require_ready(),
        Err(Error::ModelUnavailable(_))
    ));

    let detector = PhishingDetector::new(bundle, Default::default()).unwrap();
    assert!(matches!(
        detector.classify("https://example.com"),
        Err(Error::ModelUnavailable(_))
    ));
    // Rules still work without a model.
    assert_eq!(
        detector.classify("http://10.0.0.1/").unwrap().label,
        Label::Phishing
    );
}

#[test]
fn test_model_width_must_match_schema() {
    let dir = scratch_dir();
    let schema_path = write_schema(dir.path(), FeatureVariant::Compact);
    let model_path = write_file(dir.path(), "phishing_model.json", FOREST_JSON);

    let bundle = ModelBundle::load(&ModelConfig {
        path: model_path,
        schema_path,
        threshold: 0.58,
    });
    assert!(bundle.model.is_none());
    assert!(bundle.schema.is_some());
}

#[test]
fn test_invalid_artifacts_are_rejected() {
    let dir = scratch_dir();

    let cyclic = write_file(
        dir.path(),
        "cyclic.json",
        r#"{"kind":"random_forest","n_features":1,"trees":[{"nodes":[{"feature":0,"threshold":1.0,"left":0,"right":0}]}]}"#,
    );
    assert!(matches!(
        phishscan::ModelArtifact::load_from_file(&cyclic),
        Err(Error::InvalidModel(_))
    ));

    let unknown = write_file(dir.path(), "unknown.json", r#"{"kind":"svm"}"#);
    assert!(matches!(
        phishscan::ModelArtifact::load_from_file(&unknown),
        Err(Error::Json(_))
    ));

    let duplicate = write_file(dir.path(), "dup.json", r#"["UrlLength","UrlLength"]"#);
    assert!(matches!(
        FeatureSchema::load_from_file(&duplicate),
        Err(Error::InvalidSchema(_))
    ));
}

#[test]
fn test_scratch_files_are_removed_after_use() {
    let dir = scratch_dir();
    let schema_path = write_schema(dir.path(), FeatureVariant::Compact);
    assert!(FeatureSchema::load_from_file(&schema_path).is_ok());

    let root = dir.path().to_path_buf();
    drop(dir);
    assert!(!root.exists());
    assert!(!Path::new(&schema_path).exists());
}
