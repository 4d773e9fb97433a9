use async_trait::async_trait;
use log::{ debug, error, info };
use reqwest::header::{ HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE };
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use super::{ DocumentStore, GroqQuery, Mutation, MutationResult, QueryResult, StoreError };
use crate::cli::Args;

#[derive(Debug, Clone)]
pub struct SanityConfig {
    pub project_id: String,
    pub dataset: String,
    pub token: Option<String>,
    pub api_version: String,
    pub timeout: Duration,
    /// Overrides `https://<project_id>.api.sanity.io`.
    pub api_host: Option<String>,
}

impl SanityConfig {
    pub fn from_args(args: &Args) -> Self {
        Self {
            project_id: args.sanity_project_id.clone(),
            dataset: args.sanity_dataset.clone(),
            token: Some(args.sanity_token.clone()).filter(|t| !t.trim().is_empty()),
            api_version: args.sanity_api_version.clone(),
            timeout: Duration::from_secs(args.sanity_timeout_secs),
            api_host: args.sanity_api_host.clone().filter(|h| !h.trim().is_empty()),
        }
    }

    fn endpoint(&self, action: &str) -> Result<Url, StoreError> {
        let host = match &self.api_host {
            Some(host) => host.trim_end_matches('/').to_string(),
            None => format!("https://{}.api.sanity.io", self.project_id),
        };
        let raw = format!("{}/v{}/data/{}/{}", host, self.api_version, action, self.dataset);
        Url::parse(&raw).map_err(|e| StoreError::Config(format!("'{}': {}", raw, e)))
    }
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    result: Value,
}

#[derive(Deserialize)]
struct MutateResponse {
    #[serde(default)]
    results: Vec<MutateResultEntry>,
}

#[derive(Deserialize)]
struct MutateResultEntry {
    id: Option<String>,
}

pub struct SanityClient {
    http: HttpClient,
    query_url: Url,
    mutate_url: Url,
}

impl SanityClient {
    pub fn new(config: &SanityConfig) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = &config.token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e|
                    StoreError::Config(format!("Invalid Sanity token format: {}", e))
                )?
            );
        }

        let http = HttpClient::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let client = Self {
            http,
            query_url: config.endpoint("query")?,
            mutate_url: config.endpoint("mutate")?,
        };
        info!("Sanity client configured: query={} mutate={}", client.query_url, client.mutate_url);
        Ok(client)
    }

    async fn run_query(&self, query: &GroqQuery) -> Result<Vec<Value>, StoreError> {
        let text = query.render();
        debug!("GROQ: {}", text);

        let resp = self.http
            .get(self.query_url.clone())
            .query(&[("query", text.as_str())])
            .query(&query.params())
            .send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Status { status: status.as_u16(), body });
        }

        let body = resp
            .json::<QueryResponse>().await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        Ok(match body.result {
            Value::Array(docs) => docs,
            Value::Null => Vec::new(),
            single => vec![single],
        })
    }

    async fn run_mutation(&self, mutation: &Mutation) -> Result<Option<String>, StoreError> {
        let resp = self.http
            .post(self.mutate_url.clone())
            .json(&mutation.to_payload())
            .send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Status { status: status.as_u16(), body });
        }

        let body = resp
            .json::<MutateResponse>().await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        Ok(body.results.into_iter().next().and_then(|r| r.id))
    }
}

#[async_trait]
impl DocumentStore for SanityClient {
    async fn fetch(&self, query: &GroqQuery) -> QueryResult {
        match self.run_query(query).await {
            Ok(docs) => QueryResult::Documents(docs),
            Err(e) => {
                error!("Error querying Sanity: {}", e);
                QueryResult::Unavailable(e.to_string())
            }
        }
    }

    async fn mutate(&self, mutation: Mutation) -> MutationResult {
        match self.run_mutation(&mutation).await {
            Ok(id) => MutationResult::created(id),
            Err(e) => {
                error!("Error mutating Sanity: {}", e);
                MutationResult::failed(e.to_string())
            }
        }
    }
}
