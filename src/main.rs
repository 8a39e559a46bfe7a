use clap::parser::ValueSource;
use clap::{Arg, ArgAction, Command};
use log::LevelFilter;
use phishscan::classifier::ModelBundle;
use phishscan::{Config, FeatureSchema, FeatureVariant, PhishingDetector, Prediction};
use std::path::Path;
use std::process;

fn main() {
    let matches = Command::new("phishscan")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Classify URLs as phishing or safe")
        .long_about(
            "phishscan runs fast rule checks (@ obfuscation, excessive length, IP-address host)\n\
             and falls back to a trained classifier over URL features when no rule fires.",
        )
        .arg(
            Arg::new("urls")
                .value_name("URL")
                .help("URLs to classify")
                .num_args(1..)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value(Config::default_path()),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Write a default configuration file and exit")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Load the configuration, model and feature schema, then exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("print-schema")
                .long("print-schema")
                .value_name("VARIANT")
                .help("Print the built-in feature schema (full or compact) as JSON and exit")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("features")
                .long("features")
                .help("Print extracted features instead of a verdict")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print results as JSON")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    if let Some(variant) = matches.get_one::<String>("print-schema") {
        print_schema(variant);
        return;
    }

    let config_path = matches.get_one::<String>("config").unwrap();
    let explicit = matches.value_source("config") == Some(ValueSource::CommandLine);
    let config = match load_config(config_path, explicit) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            process::exit(1);
        }
    };

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        config.log_level()
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if matches.get_flag("test-config") {
        test_config(&config);
        return;
    }

    let urls: Vec<&String> = matches
        .get_many::<String>("urls")
        .map(|values| values.collect())
        .unwrap_or_default();
    if urls.is_empty() {
        eprintln!("No URLs given. Run with --help for usage.");
        process::exit(1);
    }

    let detector = match PhishingDetector::from_config(&config) {
        Ok(detector) => detector,
        Err(e) => {
            eprintln!("Error building detector: {e}");
            process::exit(1);
        }
    };

    let json = matches.get_flag("json");

    if matches.get_flag("features") {
        for url in urls {
            print_features(&detector, url, json);
        }
        return;
    }

    let mut undecided = 0;
    for url in urls {
        match detector.classify(url) {
            Ok(prediction) => print_prediction(url, &prediction, json),
            Err(e) => {
                undecided += 1;
                log::error!("Could not classify {}: {}", url, e);
                if json {
                    println!(
                        "{}",
                        serde_json::json!({ "url": url, "error": e.to_string() })
                    );
                } else {
                    println!("URL: {url}");
                    println!(" -> ERROR: {e}\n");
                }
            }
        }
    }

    if undecided > 0 {
        process::exit(2);
    }
}

fn load_config(path: &str, explicit: bool) -> anyhow::Result<Config> {
    if !explicit && !Path::new(path).exists() {
        eprintln!("Configuration file {path} not found, using built-in defaults");
        return Ok(Config::default());
    }
    Config::load_from_file(path)
}

fn generate_default_config(path: &str) {
    let content = match Config::default().to_toml_string() {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error serializing default configuration: {e}");
            process::exit(1);
        }
    };

    match std::fs::write(path, content) {
        Ok(()) => println!("Default configuration written to: {path}"),
        Err(e) => {
            eprintln!("Error writing configuration file: {e}");
            process::exit(1);
        }
    }
}

fn print_schema(variant: &str) {
    let variant: FeatureVariant = match variant.parse() {
        Ok(variant) => variant,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&FeatureSchema::builtin(variant)) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error serializing schema: {e}");
            process::exit(1);
        }
    }
}

fn test_config(config: &Config) {
    println!("Testing configuration...");
    println!("  Model:     {}", config.model.path);
    println!("  Schema:    {}", config.model.schema_path);
    println!("  Threshold: {}", config.model.threshold);

    let bundle = ModelBundle::load(&config.model);
    if let Err(e) = bundle.require_ready() {
        println!("Configuration validation failed: {e}");
        process::exit(1);
    }

    if let Some(schema) = &bundle.schema {
        match FeatureVariant::for_schema(schema) {
            Some(variant) => println!("  Features:  {} ({} columns)", variant, schema.len()),
            None => {
                println!(
                    "Configuration validation failed: no extractor produces the {} column schema",
                    schema.len()
                );
                process::exit(1);
            }
        }
    }

    println!("Model and feature schema loaded successfully.");
}

fn print_features(detector: &PhishingDetector, url: &str, json: bool) {
    let features = detector.extract_features(url);
    if json {
        println!("{}", serde_json::json!({ "url": url, "features": features }));
        return;
    }

    println!("URL: {url}");
    for (name, value) in features.iter() {
        println!("  {name}: {value}");
    }
    println!();
}

fn print_prediction(url: &str, prediction: &Prediction, json: bool) {
    if json {
        println!(
            "{}",
            serde_json::json!({ "url": url, "prediction": prediction })
        );
        return;
    }

    let probability = prediction
        .probability
        .map(|p| format!(" (P={p:.4})"))
        .unwrap_or_default();
    println!("URL: {url}");
    println!(
        " -> RESULT: {}{}",
        prediction.label.as_str().to_uppercase(),
        probability
    );
    println!(" -> REASON: {}\n", prediction.reason);
}
