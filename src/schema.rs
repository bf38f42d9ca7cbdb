//! Feature schema and the schema-shaped feature vector.
//!
//! The schema is produced offline next to the trained classifier and is the
//! single source of truth for which features exist and in what order they are
//! fed to the model.

use anyhow::Context;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::sync::Arc;

/// Ordered list of feature names a trained classifier expects.
#[derive(Debug, Clone)]
pub struct FeatureSchema {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl FeatureSchema {
    pub fn new(names: Vec<String>) -> anyhow::Result<Self> {
        if names.is_empty() {
            anyhow::bail!("feature schema is empty");
        }
        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                anyhow::bail!("duplicate feature name in schema: {name}");
            }
        }
        Ok(FeatureSchema { names, index })
    }

    /// Load a schema from a JSON array of strings.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read feature schema {path}"))?;
        let names: Vec<String> = serde_json::from_str(&content)
            .with_context(|| format!("feature schema {path} is not a JSON array of strings"))?;
        Self::new(names).with_context(|| format!("invalid feature schema {path}"))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Feature values shaped to one schema: writes to names outside the schema
/// are dropped, names never written stay 0. The value slice is always in
/// schema order, which is exactly what the classifier receives.
#[derive(Debug, Clone)]
pub struct FeatureVector {
    schema: Arc<FeatureSchema>,
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn zeroed(schema: &Arc<FeatureSchema>) -> Self {
        FeatureVector {
            schema: Arc::clone(schema),
            values: vec![0.0; schema.len()],
        }
    }

    pub fn set(&mut self, name: &str, value: f64) {
        if let Some(i) = self.schema.index_of(name) {
            self.values[i] = value;
        }
    }

    /// Value for a name, 0 when the schema does not declare it.
    pub fn get(&self, name: &str) -> f64 {
        self.schema
            .index_of(name)
            .map(|i| self.values[i])
            .unwrap_or(0.0)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.schema
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn schema() -> Arc<FeatureSchema> {
        Arc::new(
            FeatureSchema::new(vec![
                "UrlLength".to_string(),
                "NoHttps".to_string(),
                "NumDots".to_string(),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_schema_rejects_duplicates() {
        let result = FeatureSchema::new(vec!["A".to_string(), "A".to_string()]);
        assert!(result.is_err());
    }

    #[test]
    fn test_schema_rejects_empty() {
        assert!(FeatureSchema::new(Vec::new()).is_err());
    }

    #[test]
    fn test_schema_order_and_lookup() {
        let schema = schema();
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.index_of("NoHttps"), Some(1));
        assert!(schema.contains("NumDots"));
        assert!(!schema.contains("BrandSpoofing"));
    }

    #[test]
    fn test_vector_defaults_to_zero() {
        let vector = FeatureVector::zeroed(&schema());
        assert_eq!(vector.as_slice(), &[0.0, 0.0, 0.0]);
        assert_eq!(vector.get("UrlLength"), 0.0);
    }

    #[test]
    fn test_vector_set_keeps_schema_order() {
        let mut vector = FeatureVector::zeroed(&schema());
        vector.set("NumDots", 4.0);
        vector.set("UrlLength", 27.0);
        assert_eq!(vector.as_slice(), &[27.0, 0.0, 4.0]);
    }

    #[test]
    fn test_vector_drops_unknown_names() {
        let mut vector = FeatureVector::zeroed(&schema());
        vector.set("BrandSpoofing", 1.0);
        assert_eq!(vector.as_slice(), &[0.0, 0.0, 0.0]);
        assert_eq!(vector.get("BrandSpoofing"), 0.0);
    }

    #[test]
    fn test_vector_serializes_in_schema_order() {
        let mut vector = FeatureVector::zeroed(&schema());
        vector.set("NoHttps", 1.0);
        let json = serde_json::to_string(&vector).unwrap();
        let url_pos = json.find("UrlLength").unwrap();
        let https_pos = json.find("NoHttps").unwrap();
        let dots_pos = json.find("NumDots").unwrap();
        assert!(url_pos < https_pos && https_pos < dots_pos);
        assert!(json.contains("\"NoHttps\":1.0"));
    }

    #[test]
    fn test_schema_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feature_names.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "[\"NumDots\", \"NoHttps\"]").unwrap();

        let schema = FeatureSchema::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(schema.names(), &["NumDots".to_string(), "NoHttps".to_string()]);
    }

    #[test]
    fn test_schema_from_file_rejects_non_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{{\"NumDots\": 1}}").unwrap();

        assert!(FeatureSchema::from_file(path.to_str().unwrap()).is_err());
    }
}
