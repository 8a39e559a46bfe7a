//! Columns that describe page content or third-party lookups.
//!
//! A URL string carries none of this information, so every one of these
//! columns is filled with [`PLACEHOLDER_VALUE`]. Computed columns are never
//! negative, so the sentinel cannot be confused with a real measurement.

use super::{FeatureDef, UrlView};

pub const PLACEHOLDER_VALUE: f64 = -1.0;

pub const CONTENT_FEATURES: [&str; 16] = [
    "PctExtHyperlinks",
    "PctExtResourceUrls",
    "ExtFavicon",
    "InsecureForms",
    "RelativeFormAction",
    "ExtFormAction",
    "AbnormalFormAction",
    "PctNullSelfRedirectHyperlinks",
    "FrequentDomainNameMismatch",
    "FakeLinkInStatusBar",
    "RightClickDisabled",
    "PopUpWindow",
    "SubmitInfoToEmail",
    "IframeOrFrame",
    "MissingTitle",
    "ImagesOnlyInForm",
];

pub const REALTIME_FEATURES: [&str; 6] = [
    "SubdomainLevelRT",
    "UrlLengthRT",
    "PctExtResourceUrlsRT",
    "AbnormalExtFormActionR",
    "ExtMetaScriptLinkRT",
    "PctExtNullSelfRedirectHyperlinksRT",
];

fn unobservable(_: &UrlView) -> Option<f64> {
    Some(PLACEHOLDER_VALUE)
}

pub fn placeholder_def(name: &'static str) -> FeatureDef {
    FeatureDef {
        name,
        compute: unobservable,
        fallback: PLACEHOLDER_VALUE,
    }
}

pub fn placeholder_defs() -> impl Iterator<Item = FeatureDef> {
    CONTENT_FEATURES
        .into_iter()
        .chain(REALTIME_FEATURES)
        .map(placeholder_def)
}

pub fn is_placeholder(name: &str) -> bool {
    CONTENT_FEATURES.contains(&name) || REALTIME_FEATURES.contains(&name)
}
