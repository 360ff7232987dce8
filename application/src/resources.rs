//! Process-wide handles (embedder and vector index) bundled into one explicit
//! context that is built at startup and passed to the services.

use domain::ports::{Embedder, VectorIndex};
use infrastructure::config::{Config, IndexBackend, DEFAULT_NAMESPACE};
use infrastructure::embedder::OllamaEmbedder;
use infrastructure::embedding_storage::EmbeddingStorage;
use infrastructure::ollama_client::OllamaClient;
use infrastructure::pinecone_client::PineconeIndex;
use shared::types::{MedMateError, Result};
use std::sync::Arc;

pub struct Resources {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    namespace: String,
}

impl Resources {
    /// Load the embedding model and open the configured index.
    pub async fn init(config: &Config) -> Result<Self> {
        let client = OllamaClient::new(&config.ollama_base_url, &config.embedding_model)?;
        let embedder = OllamaEmbedder::new(client, config.embedding_dim);
        embedder.warm_up().await?;
        tracing::info!(
            model = embedder.model(),
            dimension = config.embedding_dim,
            "embedding model loaded"
        );

        let index: Arc<dyn VectorIndex> = match config.index_backend {
            IndexBackend::Pinecone => {
                let api_key = config.pinecone_api_key.as_deref().ok_or_else(|| {
                    MedMateError::Config("PINECONE_API_KEY is required for the pinecone backend".into())
                })?;
                Arc::new(
                    PineconeIndex::connect(
                        api_key,
                        &config.pinecone_control_url,
                        &config.index_name,
                        config.embedding_dim,
                    )
                    .await?,
                )
            }
            IndexBackend::Local => Arc::new(EmbeddingStorage::new(&config.local_db_path)?),
        };
        tracing::info!(index = %index.describe(), namespace = %config.namespace, "vector index opened");

        Self::builder()
            .with_embedder(Arc::new(embedder))
            .with_index(index)
            .with_namespace(config.namespace.clone())
            .build()
    }

    pub fn builder() -> ResourcesBuilder {
        ResourcesBuilder::default()
    }

    pub fn embedder(&self) -> &dyn Embedder {
        self.embedder.as_ref()
    }

    pub fn index(&self) -> &dyn VectorIndex {
        self.index.as_ref()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Release both handles. Consumes the context so it cannot be reused.
    pub fn teardown(self) {
        tracing::info!(index = %self.index.describe(), "releasing lookup resources");
        drop(self);
    }
}

#[derive(Default)]
pub struct ResourcesBuilder {
    embedder: Option<Arc<dyn Embedder>>,
    index: Option<Arc<dyn VectorIndex>>,
    namespace: Option<String>,
}

impl ResourcesBuilder {
    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn with_index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn build(self) -> Result<Resources> {
        Ok(Resources {
            embedder: self.embedder.ok_or(MedMateError::Uninitialized("embedder"))?,
            index: self.index.ok_or(MedMateError::Uninitialized("index"))?,
            namespace: self
                .namespace
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
        })
    }
}
