use std::collections::HashSet;

/// Public-suffix-aware breakdown of one hostname.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainInfo {
    /// Dot-separated labels in the subdomain part, minimum 1.
    pub subdomain_labels: usize,
    /// Domain under registrar control (`example.co.uk`), empty if the
    /// hostname has no registrable domain.
    pub registrable_domain: String,
    /// Hostname or registrable domain is on the official allowlist.
    pub is_official: bool,
    /// A known brand appears in the hostname but not in the registrable
    /// domain.
    pub brand_spoofed: bool,
}

impl DomainInfo {
    fn unresolved() -> Self {
        DomainInfo {
            subdomain_labels: 1,
            registrable_domain: String::new(),
            is_official: false,
            brand_spoofed: false,
        }
    }
}

/// Splits hostnames against the public-suffix list and answers the two
/// trust questions: official domain, and brand spoofing.
pub struct DomainResolver {
    official_domains: HashSet<String>,
    known_brands: Vec<String>,
}

impl DomainResolver {
    pub fn new(official_domains: &[String], known_brands: &[String]) -> Self {
        DomainResolver {
            official_domains: official_domains.iter().map(|d| d.to_lowercase()).collect(),
            known_brands: known_brands.iter().map(|b| b.to_lowercase()).collect(),
        }
    }

    /// Resolve a hostname. Never fails: a hostname with no recognizable
    /// registrable domain comes back as unofficial and unspoofed.
    pub fn resolve(&self, hostname: &str) -> DomainInfo {
        let host = hostname.trim().trim_end_matches('.').to_lowercase();
        if host.is_empty() {
            return DomainInfo::unresolved();
        }

        let registrable = psl::domain_str(&host).unwrap_or("").to_string();

        let subdomain = if registrable.is_empty() || host == registrable {
            ""
        } else {
            host.strip_suffix(registrable.as_str())
                .and_then(|s| s.strip_suffix('.'))
                .unwrap_or("")
        };
        let subdomain_labels = subdomain.matches('.').count() + 1;

        let is_official = self.official_domains.contains(&host)
            || (!registrable.is_empty() && self.official_domains.contains(&registrable));

        let brand_spoofed = !is_official
            && !registrable.is_empty()
            && self
                .known_brands
                .iter()
                .any(|brand| host.contains(brand.as_str()) && !registrable.contains(brand.as_str()));

        DomainInfo {
            subdomain_labels,
            registrable_domain: registrable,
            is_official,
            brand_spoofed,
        }
    }
}
