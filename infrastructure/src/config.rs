use dotenvy::dotenv;
use shared::types::{MedMateError, Result};
use std::env;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_INDEX_NAME: &str = "medmate-interactions";
pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-minilm";
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexBackend {
    Pinecone,
    Local,
}

impl FromStr for IndexBackend {
    type Err = MedMateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pinecone" => Ok(IndexBackend::Pinecone),
            "local" | "sqlite" => Ok(IndexBackend::Local),
            other => Err(MedMateError::Config(format!(
                "unknown index backend `{other}` (expected `pinecone` or `local`)"
            ))),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub index_backend: IndexBackend,
    pub pinecone_api_key: Option<String>,
    pub pinecone_control_url: String,
    pub index_name: String,
    pub namespace: String,
    pub local_db_path: String,
    pub ollama_base_url: String,
    pub embedding_model: String,
    pub embedding_dim: usize,
    pub log_filter: String,
}

impl Config {
    /// Read `.env` (if present) and then the process environment.
    pub fn load() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let index_backend = match get("MEDMATE_INDEX_BACKEND") {
            Some(raw) => raw.parse()?,
            None => IndexBackend::Pinecone,
        };

        let embedding_dim = match get("MEDMATE_EMBEDDING_DIM") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
                MedMateError::Config(format!("MEDMATE_EMBEDDING_DIM must be a number, got `{raw}`"))
            })?,
            None => DEFAULT_EMBEDDING_DIM,
        };
        if embedding_dim == 0 {
            return Err(MedMateError::Config(
                "MEDMATE_EMBEDDING_DIM must be greater than zero".into(),
            ));
        }

        let pinecone_api_key = get("PINECONE_API_KEY");
        if index_backend == IndexBackend::Pinecone && pinecone_api_key.is_none() {
            return Err(MedMateError::Config(
                "PINECONE_API_KEY is required for the pinecone backend".into(),
            ));
        }

        Ok(Self {
            index_backend,
            pinecone_api_key,
            pinecone_control_url: or("PINECONE_CONTROL_URL", "https://api.pinecone.io"),
            index_name: or("MEDMATE_INDEX_NAME", DEFAULT_INDEX_NAME),
            namespace: or("MEDMATE_NAMESPACE", DEFAULT_NAMESPACE),
            local_db_path: or("MEDMATE_LOCAL_DB", "medmate.db"),
            ollama_base_url: or("OLLAMA_BASE_URL", "http://localhost:11434"),
            embedding_model: or("MEDMATE_EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
            embedding_dim,
            log_filter: or("MEDMATE_LOG", "info"),
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("index_backend", &self.index_backend)
            .field(
                "pinecone_api_key",
                &self.pinecone_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("pinecone_control_url", &self.pinecone_control_url)
            .field("index_name", &self.index_name)
            .field("namespace", &self.namespace)
            .field("local_db_path", &self.local_db_path)
            .field("ollama_base_url", &self.ollama_base_url)
            .field("embedding_model", &self.embedding_model)
            .field("embedding_dim", &self.embedding_dim)
            .field("log_filter", &self.log_filter)
            .finish()
    }
}
