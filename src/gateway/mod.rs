//! Outbound calls to the assistant backend.
//!
//! [`Gateway`] is the seam the controllers talk to; [`http::HttpGateway`]
//! is the reqwest-backed implementation. Every operation issues exactly one
//! request and normalizes the outcome into a typed value or [`GatewayError`].

pub mod http;

use async_trait::async_trait;

use crate::models::{
    HealthStatus, NavigationPath, NlpParse, ProductInfo, ProductLocation, RecommendedProduct,
    SimilarProducts, StockedProduct,
};

pub use http::HttpGateway;

/// Failure of a single backend call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The transport rejected the call: DNS, connection refused, timeout.
    #[error("request to {url} failed: {reason}")]
    Network { url: String, reason: String },
    /// The backend answered with a non-2xx status.
    #[error("{url} returned {status}: {body}")]
    Status { url: String, status: u16, body: String },
    /// The body was not JSON of the expected shape.
    #[error("unexpected response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Status,
    Decode,
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Network { .. } => ErrorKind::Network,
            GatewayError::Status { .. } => ErrorKind::Status,
            GatewayError::Decode { .. } => ErrorKind::Decode,
        }
    }
}

#[async_trait]
pub trait Gateway: Send + Sync {
    /// `GET /product/search?query=<term>`
    async fn search(&self, term: &str) -> Result<Vec<StockedProduct>, GatewayError>;

    /// `GET /recommend/random`
    async fn recommendations(&self) -> Result<Vec<RecommendedProduct>, GatewayError>;

    /// `POST /nlp/parse` with `{"query": ...}`
    async fn parse_nlp(&self, query: &str) -> Result<NlpParse, GatewayError>;

    /// `GET /recommend/by_category?category=<name>`
    async fn recommend_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<RecommendedProduct>, GatewayError>;

    /// `GET /product/location?product_id=<id>`
    async fn product_location(&self, product_id: &str) -> Result<ProductLocation, GatewayError>;

    /// `GET /product/info?product_id=<id>`
    async fn product_info(&self, product_id: &str) -> Result<ProductInfo, GatewayError>;

    /// `GET /recommend/similar?product_id=<id>`. An unknown product is a
    /// [`GatewayError::Decode`], never an empty list.
    async fn similar_products(&self, product_id: &str) -> Result<SimilarProducts, GatewayError>;

    /// `GET /navigate/path?start=<a>&end=<b>`
    async fn navigation_path(&self, start: &str, end: &str)
        -> Result<NavigationPath, GatewayError>;

    /// `GET /health`
    async fn health(&self) -> Result<HealthStatus, GatewayError>;
}
