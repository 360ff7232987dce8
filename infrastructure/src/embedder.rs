use super::ollama_client::OllamaClient;
use async_trait::async_trait;
use domain::ports::Embedder;
use shared::types::{MedMateError, Result};

/// Text used to load the model and confirm its output dimension at startup.
const WARM_UP_TEXT: &str = "medication";

/// When the dimension check runs. A mismatch at startup is a configuration
/// problem; one during a lookup is an embedding failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    WarmUp,
    Lookup,
}

/// Sentence embedder served by Ollama, with dimension checking.
pub struct OllamaEmbedder {
    client: OllamaClient,
    dimension: usize,
}

impl OllamaEmbedder {
    pub fn new(client: OllamaClient, dimension: usize) -> Self {
        Self { client, dimension }
    }

    /// Force the server to load the model and verify the configured dimension.
    pub async fn warm_up(&self) -> Result<()> {
        let vector = self.client.generate_embedding(WARM_UP_TEXT).await?;
        check_dimension(self.client.model(), self.dimension, vector.len(), Stage::WarmUp)
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let vector = self.client.generate_embedding(text).await?;
        check_dimension(self.client.model(), self.dimension, vector.len(), Stage::Lookup)?;
        Ok(vector)
    }
}

fn check_dimension(model: &str, expected: usize, actual: usize, stage: Stage) -> Result<()> {
    if actual == expected {
        return Ok(());
    }
    match stage {
        Stage::WarmUp => {
            tracing::warn!(model, expected, actual, "embedding dimension mismatch");
            Err(MedMateError::Config(format!(
                "model `{model}` produces {actual}-dimensional vectors, expected {expected}"
            )))
        }
        Stage::Lookup => Err(MedMateError::Embedding(format!(
            "expected {expected} dimensions, got {actual}"
        ))),
    }
}
