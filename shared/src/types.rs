use thiserror::Error;

pub type Result<T> = std::result::Result<T, MedMateError>;

/// Errors surfaced by the lookup core and its adapters.
#[derive(Debug, Error)]
pub enum MedMateError {
    /// A required handle was never supplied to the resource context.
    #[error("resource not initialized: {0}")]
    Uninitialized(&'static str),
    /// The embedding backend failed or returned an unusable vector.
    #[error("embedding request failed: {0}")]
    Embedding(String),
    /// The vector index rejected or failed a query.
    #[error("index query failed: {0}")]
    Index(String),
    /// The local index store failed.
    #[error("storage error: {0}")]
    Storage(String),
    /// A match came back without metadata the formatter requires.
    #[error("match `{id}` is missing metadata field `{field}`")]
    MalformedMatch { id: String, field: &'static str },
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl MedMateError {
    /// True for failures raised by an external collaborator (embedding server,
    /// vector index, storage) rather than by the caller or by bad data.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            MedMateError::Embedding(_) | MedMateError::Index(_) | MedMateError::Storage(_)
        )
    }
}
