use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Hostnames and registrable domains trusted unconditionally.
    pub official_domains: Vec<String>,
    /// Brand names checked for subdomain spoofing.
    pub known_brands: Vec<String>,
    /// Words counted as credential-phishing bait when they appear in a URL.
    pub sensitive_words: Vec<String>,
    /// Path to the trained classifier artifact.
    pub model_path: String,
    /// Path to the ordered feature-name list the classifier expects.
    pub feature_names_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            official_domains: vec![
                "paypal.com".to_string(),
                "www.paypal.com".to_string(),
                "paypalobjects.com".to_string(),
                "amazon.com".to_string(),
                "www.amazon.com".to_string(),
                "amazonaws.com".to_string(),
                "apple.com".to_string(),
                "www.apple.com".to_string(),
                "icloud.com".to_string(),
                "google.com".to_string(),
                "www.google.com".to_string(),
                "googleapis.com".to_string(),
                "microsoft.com".to_string(),
                "www.microsoft.com".to_string(),
                "live.com".to_string(),
                "ebay.com".to_string(),
                "www.ebay.com".to_string(),
                "netflix.com".to_string(),
                "www.netflix.com".to_string(),
                "bankofamerica.com".to_string(),
                "www.bankofamerica.com".to_string(),
                "wellsfargo.com".to_string(),
                "www.wellsfargo.com".to_string(),
                "chase.com".to_string(),
                "www.chase.com".to_string(),
            ],
            known_brands: vec![
                "paypal".to_string(),
                "amazon".to_string(),
                "apple".to_string(),
                "google".to_string(),
                "microsoft".to_string(),
                "ebay".to_string(),
                "netflix".to_string(),
                "bankofamerica".to_string(),
                "wellsfargo".to_string(),
                "chase".to_string(),
            ],
            sensitive_words: vec![
                "login".to_string(),
                "signin".to_string(),
                "verify".to_string(),
                "account".to_string(),
                "secure".to_string(),
                "bank".to_string(),
                "payment".to_string(),
                "update".to_string(),
                "confirm".to_string(),
                "password".to_string(),
            ],
            model_path: "model/phishing_model.json".to_string(),
            feature_names_path: "model/feature_names.json".to_string(),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
