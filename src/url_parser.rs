//! Lenient URL splitting.
//!
//! Splits a URL string into scheme, authority, path, query and fragment the
//! way a browser address bar would read it, without validating or normalizing
//! any component. Parsing never fails: input that cannot be split sensibly
//! yields an all-empty [`ParsedUrl`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static SCHEME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").expect("valid scheme regex"));

/// Four dot separated groups of one to three ASCII digits. Octet values are
/// not range checked, so `999.999.999.999` matches.
static IPV4_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}$").expect("valid ipv4 regex")
});

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedUrl {
    pub scheme: String,
    pub userinfo: String,
    pub host: String,
    pub port: String,
    pub path: String,
    pub query: String,
    pub fragment: String,
}

impl ParsedUrl {
    pub fn parse(input: &str) -> Self {
        let mut rest = input;

        let mut scheme = String::new();
        if let Some(m) = SCHEME_RE.find(rest) {
            scheme = rest[..m.end() - 1].to_ascii_lowercase();
            rest = &rest[m.end()..];
        }

        let mut authority = "";
        if let Some(after_slashes) = rest.strip_prefix("//") {
            let end = after_slashes
                .find(|c: char| matches!(c, '/' | '?' | '#'))
                .unwrap_or(after_slashes.len());
            authority = &after_slashes[..end];
            rest = &after_slashes[end..];
        }

        let (before_fragment, fragment) = rest.split_once('#').unwrap_or((rest, ""));
        let (path, query) = before_fragment
            .split_once('?')
            .unwrap_or((before_fragment, ""));

        let (userinfo, host_port) = authority.rsplit_once('@').unwrap_or(("", authority));

        let Some((host, port)) = split_host_port(host_port) else {
            log::debug!("Unparseable authority {:?}, using empty components", authority);
            return Self::default();
        };

        Self {
            scheme,
            userinfo: userinfo.to_string(),
            host: host.to_string(),
            port: port.to_string(),
            path: path.to_string(),
            query: query.to_string(),
            fragment: fragment.to_string(),
        }
    }

    /// Host split on `.`, empty when there is no host.
    pub fn host_labels(&self) -> Vec<&str> {
        if self.host.is_empty() {
            Vec::new()
        } else {
            self.host.split('.').collect()
        }
    }

    /// The label left of the top-level domain (`google` for `www.google.com`).
    pub fn second_level_label(&self) -> Option<&str> {
        let labels = self.host_labels();
        if labels.len() >= 2 {
            Some(labels[labels.len() - 2])
        } else {
            None
        }
    }

    pub fn has_ipv4_host(&self) -> bool {
        is_ipv4_host(&self.host)
    }
}

pub fn is_ipv4_host(host: &str) -> bool {
    IPV4_RE.is_match(host)
}

/// Strip a trailing `:port` from `host[:port]` or `[v6][:port]`.
/// Returns `None` for unbalanced IPv6 brackets.
fn split_host_port(host_port: &str) -> Option<(&str, &str)> {
    if host_port.starts_with('[') {
        let close = host_port.find(']')?;
        let (host, tail) = host_port.split_at(close + 1);
        return match tail.strip_prefix(':') {
            Some(port) => Some((host, port)),
            None if tail.is_empty() => Some((host, "")),
            None => None,
        };
    }

    if host_port.contains(']') || host_port.contains('[') {
        return None;
    }

    match host_port.rsplit_once(':') {
        Some((host, port)) if port.bytes().all(|b| b.is_ascii_digit()) => Some((host, port)),
        _ => Some((host_port, "")),
    }
}
