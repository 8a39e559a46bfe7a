//! The full 48 column extractor: 26 columns computed from the URL text and 22
//! page-content placeholders, in the column order of the training data.

use super::heuristics::{self, Heuristic};
use super::placeholders::placeholder_defs;
use super::{evaluate_defs, FeatureDef, FeatureExtractor, FeatureVector, UrlView};

macro_rules! column {
    ($name:expr, $compute:expr) => {
        column!($name, $compute, 0.0)
    };
    ($name:expr, $compute:expr, $fallback:expr) => {
        FeatureDef {
            name: $name,
            compute: $compute,
            fallback: $fallback,
        }
    };
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

fn count_char(text: &str, needle: char) -> f64 {
    text.matches(needle).count() as f64
}

fn char_len(text: &str) -> f64 {
    text.chars().count() as f64
}

fn apply(heuristic: Heuristic, view: &UrlView) -> Option<f64> {
    Some(flag(heuristic(view)))
}

fn num_dots(view: &UrlView) -> Option<f64> {
    Some(count_char(view.raw, '.'))
}

fn subdomain_level(view: &UrlView) -> Option<f64> {
    let dots = view.parsed.host.matches('.').count();
    Some(dots.saturating_sub(1) as f64)
}

fn path_level(view: &UrlView) -> Option<f64> {
    let path = view.parsed.path.as_str();
    if path.is_empty() || path == "/" {
        return Some(0.0);
    }
    Some(count_char(path, '/'))
}

fn url_length(view: &UrlView) -> Option<f64> {
    Some(char_len(view.raw))
}

fn num_dash(view: &UrlView) -> Option<f64> {
    Some(count_char(view.raw, '-'))
}

fn num_dash_in_hostname(view: &UrlView) -> Option<f64> {
    Some(count_char(&view.parsed.host, '-'))
}

fn at_symbol(view: &UrlView) -> Option<f64> {
    Some(flag(view.raw.contains('@')))
}

fn tilde_symbol(view: &UrlView) -> Option<f64> {
    Some(flag(view.raw.contains('~')))
}

fn num_underscore(view: &UrlView) -> Option<f64> {
    Some(count_char(view.raw, '_'))
}

fn num_percent(view: &UrlView) -> Option<f64> {
    Some(count_char(view.raw, '%'))
}

fn num_query_components(view: &UrlView) -> Option<f64> {
    let query = view.parsed.query.as_str();
    if query.is_empty() {
        return Some(0.0);
    }
    Some(query.split('&').count() as f64)
}

fn num_ampersand(view: &UrlView) -> Option<f64> {
    Some(count_char(&view.parsed.query, '&'))
}

fn num_hash(view: &UrlView) -> Option<f64> {
    Some(flag(!view.parsed.fragment.is_empty()))
}

fn num_numeric_chars(view: &UrlView) -> Option<f64> {
    Some(view.raw.chars().filter(|c| c.is_ascii_digit()).count() as f64)
}

/// 1 when the scheme is anything other than `https`.
fn no_https(view: &UrlView) -> Option<f64> {
    Some(flag(view.parsed.scheme != "https"))
}

fn random_string(view: &UrlView) -> Option<f64> {
    apply(heuristics::random_string, view)
}

fn ip_address(view: &UrlView) -> Option<f64> {
    Some(flag(view.parsed.has_ipv4_host()))
}

fn domain_in_subdomains(view: &UrlView) -> Option<f64> {
    apply(heuristics::domain_in_subdomains, view)
}

fn domain_in_paths(view: &UrlView) -> Option<f64> {
    apply(heuristics::domain_in_paths, view)
}

fn https_in_hostname(view: &UrlView) -> Option<f64> {
    Some(flag(view.parsed.host.to_lowercase().contains("https")))
}

fn hostname_length(view: &UrlView) -> Option<f64> {
    Some(char_len(&view.parsed.host))
}

fn path_length(view: &UrlView) -> Option<f64> {
    Some(char_len(&view.parsed.path))
}

fn query_length(view: &UrlView) -> Option<f64> {
    Some(char_len(&view.parsed.query))
}

fn double_slash_in_path(view: &UrlView) -> Option<f64> {
    Some(flag(view.parsed.path.contains("//")))
}

fn num_sensitive_words(view: &UrlView) -> Option<f64> {
    Some(heuristics::sensitive_word_count(view) as f64)
}

fn embedded_brand_name(view: &UrlView) -> Option<f64> {
    apply(heuristics::embedded_brand_name, view)
}

const URL_COLUMNS: [FeatureDef; 26] = [
    column!("NumDots", num_dots),
    column!("SubdomainLevel", subdomain_level),
    column!("PathLevel", path_level),
    column!("UrlLength", url_length),
    column!("NumDash", num_dash),
    column!("NumDashInHostname", num_dash_in_hostname),
    column!("AtSymbol", at_symbol),
    column!("TildeSymbol", tilde_symbol),
    column!("NumUnderscore", num_underscore),
    column!("NumPercent", num_percent),
    column!("NumQueryComponents", num_query_components),
    column!("NumAmpersand", num_ampersand),
    column!("NumHash", num_hash),
    column!("NumNumericChars", num_numeric_chars),
    column!("NoHttps", no_https, 1.0),
    column!("RandomString", random_string),
    column!("IpAddress", ip_address),
    column!("DomainInSubdomains", domain_in_subdomains),
    column!("DomainInPaths", domain_in_paths),
    column!("HttpsInHostname", https_in_hostname),
    column!("HostnameLength", hostname_length),
    column!("PathLength", path_length),
    column!("QueryLength", query_length),
    column!("DoubleSlashInPath", double_slash_in_path),
    column!("NumSensitiveWords", num_sensitive_words),
    column!("EmbeddedBrandName", embedded_brand_name),
];

pub struct UrlFeatureExtractor {
    columns: Vec<FeatureDef>,
}

impl Default for UrlFeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlFeatureExtractor {
    pub fn new() -> Self {
        let columns = URL_COLUMNS
            .into_iter()
            .chain(placeholder_defs())
            .collect();
        Self { columns }
    }
}

impl FeatureExtractor for UrlFeatureExtractor {
    fn extract(&self, url: &str) -> FeatureVector {
        evaluate_defs(&self.columns, url)
    }

    fn feature_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|def| def.name).collect()
    }

    fn name(&self) -> &str {
        "UrlFeatureExtractor"
    }
}
