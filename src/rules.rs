//! Rule Engine
//!
//! High-confidence checks evaluated before any feature extraction, in a fixed
//! precedence order: `@` obfuscation, then excessive length, then IP-address
//! host. The first rule that fires decides the verdict.

use crate::url_parser::ParsedUrl;
use serde::Serialize;
use std::fmt;

/// URLs longer than this many characters are treated as phishing outright.
pub const MAX_URL_LENGTH: usize = 75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    AtSymbol,
    ExcessiveLength,
    IpAddressHost,
}

impl Rule {
    /// Precedence order.
    pub const ALL: [Rule; 3] = [Rule::AtSymbol, Rule::ExcessiveLength, Rule::IpAddressHost];

    pub fn name(&self) -> &'static str {
        match self {
            Rule::AtSymbol => "at_symbol",
            Rule::ExcessiveLength => "excessive_length",
            Rule::IpAddressHost => "ip_address_host",
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Rule::AtSymbol => "obfuscation via @",
            Rule::ExcessiveLength => "excessive length",
            Rule::IpAddressHost => "IP-address host",
        }
    }

    fn fires(&self, url: &str) -> bool {
        match self {
            Rule::AtSymbol => url.contains('@'),
            Rule::ExcessiveLength => url.chars().count() > MAX_URL_LENGTH,
            Rule::IpAddressHost => ParsedUrl::parse(url).has_ipv4_host(),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleVerdict {
    pub rule: Rule,
    pub reason: String,
}

impl RuleVerdict {
    fn new(rule: Rule) -> Self {
        Self {
            rule,
            reason: rule.reason().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RuleEngine;

impl RuleEngine {
    pub fn new() -> Self {
        Self
    }

    /// First matching rule in precedence order, or `None` to continue to the
    /// model.
    pub fn evaluate(&self, url: &str) -> Option<RuleVerdict> {
        let rule = Rule::ALL.into_iter().find(|rule| rule.fires(url))?;
        log::debug!("Rule {} fired for {:?}", rule, url);
        Some(RuleVerdict::new(rule))
    }
}
