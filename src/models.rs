use std::fmt;

use serde::{Deserialize, Serialize};

/// Catalog identifier. The backend catalog uses both numeric ids (`1`) and
/// string ids (`"A3"`), so both are accepted and displayed verbatim.
/// Numbers keep their JSON form, so `3.0` or ids past `i64::MAX` still decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CatalogId {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogId::Number(n) => write!(f, "{n}"),
            CatalogId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for CatalogId {
    fn from(n: i64) -> Self {
        CatalogId::Number(n.into())
    }
}

impl From<&str> for CatalogId {
    fn from(s: &str) -> Self {
        CatalogId::Text(s.to_string())
    }
}

/// A product returned by the search endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockedProduct {
    pub product_id: CatalogId,
    pub name: String,
    pub stock_quantity: i64,
    pub aisle_id: CatalogId,
}

/// A product returned by the recommendation endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedProduct {
    pub product_id: CatalogId,
    pub name: String,
    pub price: f64,
}

/// Full catalog record of one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub product_id: CatalogId,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub stock_quantity: Option<i64>,
    #[serde(default)]
    pub aisle_id: Option<CatalogId>,
    #[serde(default)]
    pub shelf_id: Option<CatalogId>,
    #[serde(default)]
    pub diet_tags: Vec<String>,
}

/// Products sharing a category or diet tag with a reference product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarProducts {
    /// Name of the reference product.
    pub based_on: String,
    pub products: Vec<RecommendedProduct>,
}

/// Parsed intent of a natural-language query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NlpParse {
    pub intent: String,
    pub entities: Vec<String>,
}

/// Shelf location of a single product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductLocation {
    pub product_id: CatalogId,
    pub name: String,
    pub aisle: CatalogId,
    pub shelf: CatalogId,
}

/// Walking route between two store locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationPath {
    pub start: String,
    pub end: String,
    pub path: Vec<String>,
    pub total_cost: f64,
}

/// Backend health probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

// ─── Wire envelopes ──────────────────────────────────────

/// `GET /product/search` body; the echoed `query` is ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchEnvelope {
    pub results: Vec<StockedProduct>,
}

/// `GET /recommend/by_category` body
#[derive(Debug, Deserialize)]
pub(crate) struct CategoryEnvelope {
    pub results: Vec<RecommendedProduct>,
}

/// `GET /recommend/similar` body. An unknown product comes back as a
/// 200 with an `error` field instead of a 404.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SimilarEnvelope {
    Found {
        based_on: String,
        recommendations: Vec<RecommendedProduct>,
    },
    Missing {
        error: String,
    },
}

/// `POST /nlp/parse` request body
#[derive(Debug, Serialize)]
pub(crate) struct NlpRequest<'a> {
    pub query: &'a str,
}
