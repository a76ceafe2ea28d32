use crate::adapters::parse_snapshot;
use crate::domain::model::NodeSnapshot;
use crate::domain::ports::NodeSource;
use crate::utils::error::{MeshError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::BTreeMap;
use std::time::Duration;

/// 透過 HTTP GET 取得節點清單的 JSON
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    endpoint: String,
    headers: BTreeMap<String, String>,
    retry_attempts: u32,
    retry_delay: Duration,
}

pub struct HttpSourceBuilder {
    endpoint: String,
    timeout: Duration,
    headers: BTreeMap<String, String>,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl HttpSourceBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retries(mut self, attempts: u32, delay: Duration) -> Self {
        self.retry_attempts = attempts;
        self.retry_delay = delay;
        self
    }

    pub fn headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn build(self) -> Result<HttpSource> {
        let client = Client::builder().timeout(self.timeout).build()?;
        Ok(HttpSource {
            client,
            endpoint: self.endpoint,
            headers: self.headers,
            retry_attempts: self.retry_attempts,
            retry_delay: self.retry_delay,
        })
    }
}

impl HttpSource {
    pub fn builder(endpoint: impl Into<String>) -> HttpSourceBuilder {
        HttpSourceBuilder {
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(10),
            headers: BTreeMap::new(),
            retry_attempts: 0,
            retry_delay: Duration::from_secs(1),
        }
    }

    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Self::builder(endpoint).build()
    }

    async fn fetch_once(&self) -> Result<serde_json::Value> {
        let mut request = self.client.get(&self.endpoint);
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await?;
        tracing::debug!("Node list response status: {}", response.status());
        let response = response.error_for_status()?;
        Ok(response.json::<serde_json::Value>().await?)
    }
}

#[async_trait]
impl NodeSource for HttpSource {
    async fn fetch(&self) -> Result<NodeSnapshot> {
        let mut attempt = 0;
        let document = loop {
            match self.fetch_once().await {
                Ok(document) => break document,
                Err(MeshError::ApiError(e)) if attempt < self.retry_attempts => {
                    attempt += 1;
                    tracing::warn!(
                        "⚠️ Request to {} failed ({}), retry {}/{} in {:?}",
                        self.endpoint,
                        e,
                        attempt,
                        self.retry_attempts,
                        self.retry_delay
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        };
        parse_snapshot(document)
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}
