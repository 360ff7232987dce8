use async_trait::async_trait;
use domain::models::{Metadata, RawMatch};
use domain::ports::{IndexQuery, VectorIndex};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::types::{MedMateError, Result};
use std::time::Duration;

const API_VERSION: &str = "2024-07";

#[derive(Debug, Deserialize)]
struct IndexDescription {
    name: String,
    #[serde(default)]
    dimension: Option<usize>,
    host: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: Vec<f32>,
    top_k: usize,
    include_metadata: bool,
    namespace: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<PineconeMatch>,
}

#[derive(Debug, Deserialize)]
struct PineconeMatch {
    id: String,
    #[serde(default)]
    score: Option<f32>,
    #[serde(default)]
    metadata: Option<Metadata>,
}

/// Data-plane handle on a Pinecone serverless index.
pub struct PineconeIndex {
    client: Client,
    api_key: String,
    host: String,
    index_name: String,
    dimension: usize,
}

impl PineconeIndex {
    /// Resolve `index_name` to its data-plane host through the control plane.
    pub async fn connect(
        api_key: &str,
        control_url: &str,
        index_name: &str,
        dimension: usize,
    ) -> Result<Self> {
        let client = build_client()?;
        let url = format!(
            "{}/indexes/{}",
            control_url.trim_end_matches('/'),
            index_name
        );
        let response = with_headers(client.get(&url), api_key)
            .send()
            .await
            .map_err(|e| MedMateError::Index(format!("GET {url}: {e}")))?;
        let description: IndexDescription = read_json(response).await?;

        validate_description(&description, dimension)?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            host: normalize_host(&description.host),
            index_name: description.name,
            dimension,
        })
    }

    /// Use a known data-plane host and skip the control-plane lookup.
    pub fn with_host(api_key: &str, host: &str, index_name: &str, dimension: usize) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            api_key: api_key.to_string(),
            host: normalize_host(host),
            index_name: index_name.to_string(),
            dimension,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn request_body<'a>(&self, query: &'a IndexQuery) -> QueryRequest<'a> {
        // The query API always wants a vector; filter-only lookups send zeros.
        let vector = query
            .vector
            .clone()
            .unwrap_or_else(|| vec![0.0; self.dimension]);
        QueryRequest {
            vector,
            top_k: query.top_k,
            include_metadata: query.include_metadata,
            namespace: &query.namespace,
            filter: query.filter.as_ref().map(|f| f.to_json()),
        }
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    fn describe(&self) -> String {
        format!("pinecone:{}@{}", self.index_name, self.host)
    }

    async fn query(&self, query: &IndexQuery) -> Result<Vec<RawMatch>> {
        let url = format!("{}/query", self.host);
        let body = self.request_body(query);
        let response = with_headers(self.client.post(&url), &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| MedMateError::Index(format!("POST {url}: {e}")))?;
        let parsed: QueryResponse = read_json(response).await?;
        Ok(into_matches(parsed, query.is_filter_only()))
    }
}

fn build_client() -> Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| MedMateError::Index(format!("failed to build http client: {e}")))
}

fn with_headers(builder: RequestBuilder, api_key: &str) -> RequestBuilder {
    builder
        .header("Api-Key", api_key)
        .header("X-Pinecone-API-Version", API_VERSION)
}

async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| MedMateError::Index(format!("failed to read response: {e}")))?;
    if !status.is_success() {
        return Err(MedMateError::Index(format!("Pinecone API error ({status}): {text}")));
    }
    serde_json::from_str(&text)
        .map_err(|e| MedMateError::Index(format!("invalid Pinecone response: {e}")))
}

/// A described index must match the configured dimension. Descriptions that
/// omit the dimension are accepted.
fn validate_description(description: &IndexDescription, dimension: usize) -> Result<()> {
    match description.dimension {
        Some(actual) if actual != dimension => {
            tracing::warn!(
                index = %description.name,
                expected = dimension,
                actual,
                "index dimension mismatch"
            );
            Err(MedMateError::Config(format!(
                "index `{}` has dimension {actual}, expected {dimension}",
                description.name
            )))
        }
        _ => Ok(()),
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

fn into_matches(response: QueryResponse, filter_only: bool) -> Vec<RawMatch> {
    response
        .matches
        .into_iter()
        .map(|m| RawMatch {
            id: m.id,
            // Scores against the zero placeholder vector carry no meaning.
            score: if filter_only { None } else { m.score },
            metadata: m.metadata.unwrap_or_default(),
        })
        .collect()
}
