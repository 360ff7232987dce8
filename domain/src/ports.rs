use crate::models::{Metadata, RawMatch};
use async_trait::async_trait;
use serde_json::{json, Value};
use shared::types::Result;

/// Text-to-vector function backing semantic search.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Length of every vector this embedder returns.
    fn dimension(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Read-only access to the medication vector index.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Short human-readable identity (backend, host or path) for logs.
    fn describe(&self) -> String;

    async fn query(&self, query: &IndexQuery) -> Result<Vec<RawMatch>>;
}

/// Equality predicate on a single metadata field.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataFilter {
    pub field: String,
    pub value: Value,
}

impl MetadataFilter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Wire form: `{"<field>": {"$eq": <value>}}`.
    pub fn to_json(&self) -> Value {
        let mut predicate = serde_json::Map::new();
        predicate.insert(self.field.clone(), json!({ "$eq": self.value }));
        Value::Object(predicate)
    }

    pub fn matches(&self, metadata: &Metadata) -> bool {
        metadata
            .get(&self.field)
            .map(|v| v == &self.value)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexQuery {
    /// `None` requests a filter-only lookup with no similarity ranking.
    pub vector: Option<Vec<f32>>,
    pub top_k: usize,
    pub include_metadata: bool,
    pub namespace: String,
    pub filter: Option<MetadataFilter>,
}

impl IndexQuery {
    pub fn by_vector(vector: Vec<f32>, top_k: usize, namespace: impl Into<String>) -> Self {
        Self {
            vector: Some(vector),
            top_k,
            include_metadata: true,
            namespace: namespace.into(),
            filter: None,
        }
    }

    pub fn by_filter(filter: MetadataFilter, top_k: usize, namespace: impl Into<String>) -> Self {
        Self {
            vector: None,
            top_k,
            include_metadata: true,
            namespace: namespace.into(),
            filter: Some(filter),
        }
    }

    pub fn is_filter_only(&self) -> bool {
        self.vector.is_none()
    }
}
