use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::{Gateway, GatewayError};
use crate::config::Config;
use crate::models::{
    CategoryEnvelope, HealthStatus, NavigationPath, NlpParse, NlpRequest, ProductInfo,
    ProductLocation, RecommendedProduct, SearchEnvelope, SimilarEnvelope, SimilarProducts,
    StockedProduct,
};

/// Gateway backed by a shared `reqwest::Client` and a fixed base address.
#[derive(Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder().connect_timeout(config.connect_timeout());
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self::with_client(builder.build()?, config.base_url()))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, GatewayError> {
        let url = self.endpoint(path);
        tracing::debug!("GET {url} {query:?}");

        let mut req = self.client.get(&url);
        if !query.is_empty() {
            req = req.query(query);
        }

        let resp = req.send().await.map_err(|e| network_error(&url, e))?;
        read_json(url, resp).await
    }

    async fn post_json<B: serde::Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GatewayError> {
        let url = self.endpoint(path);
        tracing::debug!("POST {url}");

        // `.json()` sets `Content-Type: application/json`
        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| network_error(&url, e))?;
        read_json(url, resp).await
    }
}

fn network_error(url: &str, err: reqwest::Error) -> GatewayError {
    tracing::warn!("Request to {url} failed: {err}");
    GatewayError::Network {
        url: url.to_string(),
        reason: err.to_string(),
    }
}

/// Check the status, then decode the body. The body is read as bytes first
/// so a transport failure mid-body stays a `Network` error and only a
/// shape mismatch becomes `Decode`.
async fn read_json<T: DeserializeOwned>(
    url: String,
    resp: reqwest::Response,
) -> Result<T, GatewayError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        tracing::warn!("{url} returned {status}: {body}");
        return Err(GatewayError::Status {
            url,
            status: status.as_u16(),
            body,
        });
    }

    let bytes = resp.bytes().await.map_err(|e| network_error(&url, e))?;
    serde_json::from_slice(&bytes).map_err(|e| {
        tracing::warn!("Failed to decode response from {url}: {e}");
        GatewayError::Decode {
            url,
            reason: e.to_string(),
        }
    })
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn search(&self, term: &str) -> Result<Vec<StockedProduct>, GatewayError> {
        let body: SearchEnvelope = self
            .get_json("/product/search", &[("query", term)])
            .await?;
        Ok(body.results)
    }

    async fn recommendations(&self) -> Result<Vec<RecommendedProduct>, GatewayError> {
        self.get_json("/recommend/random", &[]).await
    }

    async fn parse_nlp(&self, query: &str) -> Result<NlpParse, GatewayError> {
        self.post_json("/nlp/parse", &NlpRequest { query }).await
    }

    async fn recommend_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<RecommendedProduct>, GatewayError> {
        let body: CategoryEnvelope = self
            .get_json("/recommend/by_category", &[("category", category)])
            .await?;
        Ok(body.results)
    }

    async fn product_location(&self, product_id: &str) -> Result<ProductLocation, GatewayError> {
        self.get_json("/product/location", &[("product_id", product_id)])
            .await
    }

    async fn product_info(&self, product_id: &str) -> Result<ProductInfo, GatewayError> {
        self.get_json("/product/info", &[("product_id", product_id)])
            .await
    }

    async fn similar_products(&self, product_id: &str) -> Result<SimilarProducts, GatewayError> {
        let body: SimilarEnvelope = self
            .get_json("/recommend/similar", &[("product_id", product_id)])
            .await?;
        match body {
            SimilarEnvelope::Found {
                based_on,
                recommendations,
            } => Ok(SimilarProducts {
                based_on,
                products: recommendations,
            }),
            SimilarEnvelope::Missing { error } => {
                let url = self.endpoint("/recommend/similar");
                tracing::warn!("{url} reported an error for {product_id}: {error}");
                Err(GatewayError::Decode { url, reason: error })
            }
        }
    }

    async fn navigation_path(
        &self,
        start: &str,
        end: &str,
    ) -> Result<NavigationPath, GatewayError> {
        self.get_json("/navigate/path", &[("start", start), ("end", end)])
            .await
    }

    async fn health(&self) -> Result<HealthStatus, GatewayError> {
        self.get_json("/health", &[]).await
    }
}
