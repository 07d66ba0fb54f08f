//! Qdrant vector store adapter over the REST API.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::adapters::retry::RetryPolicy;
use crate::domain::errors::{DomainError, DomainResult, ProviderError};
use crate::domain::models::{CollectionInfo, Distance, SearchFilter, SearchResult};
use crate::domain::ports::VectorStore;

use super::result_from_payload;

const PROVIDER: &str = "Qdrant";

/// Configuration for the Qdrant client.
#[derive(Debug, Clone)]
pub struct QdrantConfig {
    /// Default: `http://localhost:6333`.
    pub url: String,
    /// Sent as the `api-key` header when set.
    pub api_key: Option<String>,
    /// Request timeout in seconds. Default: 10.
    pub timeout_secs: u64,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6333".to_string(),
            api_key: None,
            timeout_secs: 10,
        }
    }
}

pub struct QdrantVectorStore {
    config: QdrantConfig,
    client: reqwest::Client,
    retry: RetryPolicy,
}

fn wire_distance(distance: Distance) -> &'static str {
    match distance {
        Distance::Cosine => "Cosine",
        Distance::Euclidean => "Euclid",
        Distance::Dot => "Dot",
    }
}

fn invalid(message: impl Into<String>) -> ProviderError {
    ProviderError::InvalidResponse {
        provider: PROVIDER.to_string(),
        message: message.into(),
    }
}

impl QdrantVectorStore {
    pub fn new(config: QdrantConfig, retry: RetryPolicy) -> DomainResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        info!(url = %config.url, "initialized Qdrant client");
        Ok(Self {
            config,
            client,
            retry,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.url.trim_end_matches('/'))
    }

    async fn send_once(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ProviderError> {
        let mut builder = self.client.request(method, self.url(path));
        if let Some(key) = &self.config.api_key {
            builder = builder.header("api-key", key);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, self.config.timeout_secs, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read response body".to_string());
            return Err(ProviderError::Api {
                provider: PROVIDER.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::from_reqwest(PROVIDER, self.config.timeout_secs, &e))
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ProviderError> {
        self.retry
            .execute(|| self.send_once(method.clone(), path, body.as_ref()))
            .await
    }

    async fn exists(&self, name: &str) -> DomainResult<bool> {
        match self
            .request(Method::GET, &format!("/collections/{name}"), None)
            .await
        {
            Ok(_) => Ok(true),
            Err(ProviderError::Api { status: 404, .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

fn filter_body(filter: &SearchFilter) -> Value {
    let must: Vec<Value> = filter
        .must
        .iter()
        .map(|(key, value)| json!({"key": key, "match": {"value": value}}))
        .collect();
    json!({ "must": must })
}

fn parse_info(name: &str, data: &Value) -> Result<CollectionInfo, ProviderError> {
    let result = data
        .get("result")
        .ok_or_else(|| invalid("collection info missing result"))?;
    let vectors = result
        .pointer("/config/params/vectors")
        .ok_or_else(|| invalid("collection info missing vector params"))?;

    let vector_size = vectors
        .get("size")
        .and_then(Value::as_u64)
        .ok_or_else(|| invalid("collection info missing vector size"))? as usize;
    let distance = vectors
        .get("distance")
        .and_then(Value::as_str)
        .unwrap_or("Cosine")
        .parse::<Distance>()
        .map_err(invalid)?;
    let vectors_count = result
        .get("points_count")
        .or_else(|| result.get("vectors_count"))
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let status = result
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();

    Ok(CollectionInfo {
        name: name.to_string(),
        vectors_count,
        status,
        vector_size,
        distance,
    })
}

fn parse_hits(data: &Value) -> Result<Vec<SearchResult>, ProviderError> {
    let hits = data
        .get("result")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid("search response missing result array"))?;

    Ok(hits
        .iter()
        .map(|hit| {
            let score = hit.get("score").and_then(Value::as_f64).unwrap_or(0.0) as f32;
            let payload = hit.get("payload").cloned().unwrap_or(Value::Null);
            result_from_payload(&payload, score)
        })
        .collect())
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn create_collection(
        &self,
        name: &str,
        vector_size: usize,
        distance: Distance,
    ) -> DomainResult<()> {
        if self.exists(name).await? {
            info!("Collection '{name}' already exists");
            return Ok(());
        }

        let body = json!({
            "vectors": {"size": vector_size, "distance": wire_distance(distance)}
        });
        self.request(Method::PUT, &format!("/collections/{name}"), Some(body))
            .await
            .map_err(|e| {
                error!(collection = name, error = %e, "failed to create collection");
                e
            })?;

        info!("Created collection: {name} (size={vector_size}, distance={distance})");
        Ok(())
    }

    async fn upsert(
        &self,
        collection: &str,
        vectors: Vec<Vec<f32>>,
        payloads: Vec<Value>,
        ids: Option<Vec<String>>,
    ) -> DomainResult<usize> {
        if vectors.len() != payloads.len() {
            return Err(DomainError::Validation(
                "Number of vectors must match number of payloads".to_string(),
            ));
        }
        let ids = match ids {
            Some(ids) if ids.len() != vectors.len() => {
                return Err(DomainError::Validation(
                    "Number of ids must match number of vectors".to_string(),
                ));
            }
            Some(ids) => ids,
            None => (0..vectors.len()).map(|_| Uuid::new_v4().to_string()).collect(),
        };

        let count = vectors.len();
        let points: Vec<Value> = ids
            .into_iter()
            .zip(vectors)
            .zip(payloads)
            .map(|((id, vector), payload)| json!({"id": id, "vector": vector, "payload": payload}))
            .collect();

        self.request(
            Method::PUT,
            &format!("/collections/{collection}/points?wait=true"),
            Some(json!({ "points": points })),
        )
        .await?;

        info!("Upserted {count} points to collection '{collection}'");
        Ok(count)
    }

    async fn search(
        &self,
        collection: &str,
        query: &[f32],
        limit: usize,
        filter: Option<&SearchFilter>,
    ) -> DomainResult<Vec<SearchResult>> {
        let mut body = json!({
            "vector": query,
            "limit": limit,
            "with_payload": true,
        });
        if let Some(filter) = filter.filter(|f| !f.must.is_empty()) {
            body["filter"] = filter_body(filter);
        }

        debug!(collection, limit, "searching collection");
        let data = self
            .request(
                Method::POST,
                &format!("/collections/{collection}/points/search"),
                Some(body),
            )
            .await?;

        let results = parse_hits(&data)?;
        info!("Found {} results in collection '{collection}'", results.len());
        Ok(results)
    }

    async fn collection_info(&self, name: &str) -> DomainResult<CollectionInfo> {
        let data = self
            .request(Method::GET, &format!("/collections/{name}"), None)
            .await?;
        Ok(parse_info(name, &data)?)
    }

    async fn delete_collection(&self, name: &str) -> DomainResult<()> {
        self.request(Method::DELETE, &format!("/collections/{name}"), None)
            .await?;
        info!("Deleted collection: {name}");
        Ok(())
    }
}
