//! URL feature extraction.
//!
//! Counting rules here are frozen: a classifier trained against these rules
//! depends on them exactly, so changes break every previously trained model.

use crate::domain::DomainInfo;
use crate::schema::{FeatureSchema, FeatureVector};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

/// Canonical feature names shared by the extractor, engine, output, and any
/// schema-producing tool.
pub mod names {
    pub const NUM_DOTS: &str = "NumDots";
    pub const SUBDOMAIN_LEVEL: &str = "SubdomainLevel";
    pub const PATH_LEVEL: &str = "PathLevel";
    pub const URL_LENGTH: &str = "UrlLength";
    pub const NUM_DASH: &str = "NumDash";
    pub const NUM_DASH_IN_HOSTNAME: &str = "NumDashInHostname";
    pub const AT_SYMBOL: &str = "AtSymbol";
    pub const TILDE_SYMBOL: &str = "TildeSymbol";
    pub const NUM_UNDERSCORE: &str = "NumUnderscore";
    pub const NUM_PERCENT: &str = "NumPercent";
    pub const NUM_QUERY_COMPONENTS: &str = "NumQueryComponents";
    pub const NUM_AMPERSAND: &str = "NumAmpersand";
    pub const NUM_HASH: &str = "NumHash";
    pub const NUM_NUMERIC_CHARS: &str = "NumNumericChars";
    pub const NO_HTTPS: &str = "NoHttps";
    pub const RANDOM_STRING: &str = "RandomString";
    pub const IP_ADDRESS: &str = "IpAddress";
    pub const HTTPS_IN_HOSTNAME: &str = "HttpsInHostname";
    pub const HOSTNAME_LENGTH: &str = "HostnameLength";
    pub const PATH_LENGTH: &str = "PathLength";
    pub const QUERY_LENGTH: &str = "QueryLength";
    pub const DOUBLE_SLASH_IN_PATH: &str = "DoubleSlashInPath";
    pub const SUBDOMAIN_LEVEL_RT: &str = "SubdomainLevelRT";
    pub const URL_LENGTH_RT: &str = "UrlLengthRT";
    pub const IS_OFFICIAL_DOMAIN: &str = "IsOfficialDomain";
    pub const BRAND_SPOOFING: &str = "BrandSpoofing";
    pub const NUM_SENSITIVE_WORDS: &str = "NumSensitiveWords";

    /// Every feature the extractor can produce, in canonical order.
    pub const ALL: [&str; 27] = [
        NUM_DOTS,
        SUBDOMAIN_LEVEL,
        PATH_LEVEL,
        URL_LENGTH,
        NUM_DASH,
        NUM_DASH_IN_HOSTNAME,
        AT_SYMBOL,
        TILDE_SYMBOL,
        NUM_UNDERSCORE,
        NUM_PERCENT,
        NUM_QUERY_COMPONENTS,
        NUM_AMPERSAND,
        NUM_HASH,
        NUM_NUMERIC_CHARS,
        NO_HTTPS,
        RANDOM_STRING,
        IP_ADDRESS,
        HTTPS_IN_HOSTNAME,
        HOSTNAME_LENGTH,
        PATH_LENGTH,
        QUERY_LENGTH,
        DOUBLE_SLASH_IN_PATH,
        SUBDOMAIN_LEVEL_RT,
        URL_LENGTH_RT,
        IS_OFFICIAL_DOMAIN,
        BRAND_SPOOFING,
        NUM_SENSITIVE_WORDS,
    ];
}

// Pre-compiled patterns, shared across all extractions
static HEX_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9a-f]{8}").unwrap());
static DOTTED_QUAD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\d+\.\d+\.\d+").unwrap());

/// Computes the fixed feature set for one URL.
pub struct FeatureExtractor {
    sensitive_words: Vec<String>,
    schema: Arc<FeatureSchema>,
}

impl FeatureExtractor {
    pub fn new(sensitive_words: &[String], schema: Arc<FeatureSchema>) -> Self {
        FeatureExtractor {
            sensitive_words: sensitive_words.iter().map(|w| w.to_lowercase()).collect(),
            schema,
        }
    }

    /// The all-zero vector used when extraction cannot run at all.
    pub fn default_vector(&self) -> FeatureVector {
        FeatureVector::zeroed(&self.schema)
    }

    /// Extract every feature from a scheme-normalized URL, its parse, and the
    /// resolved domain info. Values the schema does not declare are dropped.
    pub fn extract(&self, url: &str, parsed: &Url, domain: &DomainInfo) -> FeatureVector {
        let mut features = self.default_vector();

        let host = parsed.host_str().unwrap_or("");
        let path = parsed.path();
        let query = parsed.query().unwrap_or("");
        let url_length = url.chars().count();

        features.set(names::NUM_DOTS, count_char(url, '.'));
        features.set(names::SUBDOMAIN_LEVEL, domain.subdomain_labels as f64);
        features.set(names::PATH_LEVEL, path_level(path) as f64);
        features.set(names::URL_LENGTH, url_length as f64);
        features.set(names::NUM_DASH, count_char(url, '-'));
        features.set(names::NUM_DASH_IN_HOSTNAME, count_char(host, '-'));
        features.set(names::AT_SYMBOL, flag(url.contains('@')));
        features.set(names::TILDE_SYMBOL, flag(url.contains('~')));
        features.set(names::NUM_UNDERSCORE, count_char(url, '_'));
        features.set(names::NUM_PERCENT, count_char(url, '%'));
        features.set(names::NUM_QUERY_COMPONENTS, query_key_count(parsed) as f64);
        features.set(names::NUM_AMPERSAND, count_char(url, '&'));
        features.set(names::NUM_HASH, count_char(url, '#'));
        features.set(
            names::NUM_NUMERIC_CHARS,
            url.chars().filter(char::is_ascii_digit).count() as f64,
        );
        features.set(names::NO_HTTPS, flag(parsed.scheme() != "https"));
        features.set(names::RANDOM_STRING, flag(HEX_RUN.is_match(url)));
        features.set(names::IP_ADDRESS, flag(DOTTED_QUAD.is_match(host)));
        features.set(names::HTTPS_IN_HOSTNAME, flag(host.contains("https")));
        features.set(names::HOSTNAME_LENGTH, host.chars().count() as f64);
        features.set(names::PATH_LENGTH, path.chars().count() as f64);
        features.set(names::QUERY_LENGTH, query.chars().count() as f64);
        features.set(names::DOUBLE_SLASH_IN_PATH, flag(path.contains("//")));
        features.set(
            names::SUBDOMAIN_LEVEL_RT,
            (domain.subdomain_labels.max(1) as f64).ln(),
        );
        features.set(names::URL_LENGTH_RT, (url_length.max(1) as f64).ln());
        features.set(names::IS_OFFICIAL_DOMAIN, flag(domain.is_official));

        // The schema decides whether the optional spoofing feature exists
        if self.schema.contains(names::BRAND_SPOOFING) {
            features.set(names::BRAND_SPOOFING, flag(domain.brand_spoofed));
        }

        let sensitive_words = if domain.is_official {
            0
        } else {
            self.sensitive_word_count(&url.to_lowercase())
        };
        features.set(names::NUM_SENSITIVE_WORDS, sensitive_words as f64);

        features
    }

    /// Number of configured words appearing at least once in the URL.
    fn sensitive_word_count(&self, url_lower: &str) -> usize {
        self.sensitive_words
            .iter()
            .filter(|word| url_lower.contains(word.as_str()))
            .count()
    }
}

fn count_char(s: &str, c: char) -> f64 {
    s.matches(c).count() as f64
}

fn flag(condition: bool) -> f64 {
    if condition {
        1.0
    } else {
        0.0
    }
}

fn path_level(path: &str) -> usize {
    if path.is_empty() {
        0
    } else {
        path.matches('/').count().saturating_sub(1)
    }
}

/// Distinct query keys carrying a non-empty value; repeated keys count once.
fn query_key_count(parsed: &Url) -> usize {
    let mut keys = HashSet::new();
    for (key, value) in parsed.query_pairs() {
        if !value.is_empty() {
            keys.insert(key.into_owned());
        }
    }
    keys.len()
}
