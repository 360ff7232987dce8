use crate::formatter::{format_results, Scoring};
use crate::resources::Resources;
use domain::models::{fields, QueryOutcome};
use domain::ports::{IndexQuery, MetadataFilter};
use shared::types::{MedMateError, Result};
use shared::utils::normalize_name;
use std::sync::Arc;

pub const DEFAULT_TOP_K: usize = 10;

/// Exact-then-semantic medication lookup.
#[derive(Clone)]
pub struct RetrievalService {
    resources: Arc<Resources>,
}

impl RetrievalService {
    pub fn new(resources: Arc<Resources>) -> Self {
        Self { resources }
    }

    /// Look up `query` by exact generic name, falling back to the `top_k`
    /// nearest neighbours when no record carries that name.
    ///
    /// Only an empty exact result triggers the fallback; an error from the
    /// exact phase is returned as is.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Result<QueryOutcome> {
        let normalized = normalize_name(query);
        if normalized.is_empty() {
            return Err(MedMateError::InvalidQuery("query is empty".into()));
        }
        if top_k == 0 {
            return Err(MedMateError::InvalidQuery("top_k must be at least 1".into()));
        }

        let namespace = self.resources.namespace();
        let index = self.resources.index();

        let exact_query = IndexQuery::by_filter(
            MetadataFilter::eq(fields::GENERIC_NAME, normalized.as_str()),
            1,
            namespace,
        );
        let exact = index.query(&exact_query).await?;
        if !exact.is_empty() {
            tracing::debug!(query = %normalized, matches = exact.len(), "exact match");
            return Ok(QueryOutcome::Exact(format_results(&exact, Scoring::Unranked)?));
        }

        let embedding = self.resources.embedder().embed(&normalized).await?;
        let mut semantic = index
            .query(&IndexQuery::by_vector(embedding, top_k, namespace))
            .await?;
        semantic.truncate(top_k);
        tracing::debug!(
            query = %normalized,
            matches = semantic.len(),
            top_k,
            "semantic fallback"
        );
        Ok(QueryOutcome::Semantic(format_results(&semantic, Scoring::Ranked)?))
    }
}
