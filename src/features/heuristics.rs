//! Approximate lexical heuristics.
//!
//! Each heuristic is a plain function over a [`UrlView`] so that a better
//! detector can be dropped in by pointing a column at a different function.
//! None of these are exact reproductions of the dataset's original labelling
//! logic; they are cheap approximations computed from the URL text alone.

use super::UrlView;

pub type Heuristic = fn(&UrlView) -> bool;

pub const SENSITIVE_WORDS: [&str; 10] = [
    "login", "verify", "update", "account", "bank", "secure", "paypal", "amazon", "ebay", "signin",
];

pub const BRAND_NAMES: [&str; 5] = ["paypal", "google", "amazon", "microsoft", "apple"];

/// Path segments longer than this with no digit look machine generated.
pub const RANDOM_SEGMENT_MIN_LEN: usize = 15;

/// A path segment longer than [`RANDOM_SEGMENT_MIN_LEN`] characters that
/// contains no digit.
pub fn random_string(view: &UrlView) -> bool {
    view.parsed.path.split('/').any(|segment| {
        segment.chars().count() > RANDOM_SEGMENT_MIN_LEN
            && !segment.chars().any(|c| c.is_ascii_digit())
    })
}

/// The second-level label reappears among the subdomain labels, as in
/// `paypal.com.paypal.evil.net` style hosts.
pub fn domain_in_subdomains(view: &UrlView) -> bool {
    let labels = view.parsed.host_labels();
    if labels.len() < 3 {
        return false;
    }
    let base = labels[labels.len() - 2];
    !base.is_empty() && labels[..labels.len() - 2].contains(&base)
}

/// The second-level label (or the whole host when it has a single label)
/// occurs in the path.
pub fn domain_in_paths(view: &UrlView) -> bool {
    let base = match view.parsed.second_level_label() {
        Some(label) => label,
        None => view.parsed.host.as_str(),
    };
    !base.is_empty() && view.parsed.path.contains(base)
}

/// A known brand appears as a token of the URL but not in the host, e.g.
/// `http://login-paypal.example.net` has it in the host and does not count,
/// `http://example.net/paypal/login` does.
pub fn embedded_brand_name(view: &UrlView) -> bool {
    let host = view.parsed.host.to_lowercase();
    let tokens: Vec<&str> = view
        .lower
        .split(|c: char| matches!(c, '/' | '.' | '-'))
        .collect();

    BRAND_NAMES
        .iter()
        .any(|brand| tokens.contains(brand) && !host.contains(brand))
}

/// Total occurrences of every sensitive word, case-insensitive.
pub fn sensitive_word_count(view: &UrlView) -> usize {
    SENSITIVE_WORDS
        .iter()
        .map(|word| view.lower.matches(word).count())
        .sum()
}
