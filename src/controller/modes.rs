use async_trait::async_trait;

use super::ValidationError;
use crate::gateway::{Gateway, GatewayError};
use crate::models::{
    HealthStatus, NavigationPath, NlpParse, ProductInfo, ProductLocation, RecommendedProduct,
    SimilarProducts, StockedProduct,
};

/// Minimum number of characters a product search term must have.
pub const MIN_SEARCH_CHARS: usize = 2;

/// Per-page parameters of a [`QueryController`](super::QueryController):
/// what the input must satisfy, which gateway call it maps to, and the
/// notice shown when that call fails.
#[async_trait]
pub trait QueryMode: Send + Sync + 'static {
    type Output: Clone + std::fmt::Debug + Send + Sync + 'static;

    /// Short name used in logs.
    const NAME: &'static str;

    /// User-facing notice for a failed request.
    const FAILURE_NOTICE: &'static str;

    fn validate(&self, _input: &str) -> Result<(), ValidationError> {
        Ok(())
    }

    async fn dispatch(
        &self,
        gateway: &dyn Gateway,
        input: &str,
    ) -> Result<Self::Output, GatewayError>;
}

/// Modes whose page has a text field. Only these expose `on_input_change`.
pub trait InputMode: QueryMode {}

fn require_non_blank(input: &str, field: &'static str) -> Result<(), ValidationError> {
    if input.trim().is_empty() {
        return Err(ValidationError::Blank { field });
    }
    Ok(())
}

/// Free-text product search.
#[derive(Debug, Clone, Copy, Default)]
pub struct Search;

#[async_trait]
impl QueryMode for Search {
    type Output = Vec<StockedProduct>;
    const NAME: &'static str = "search";
    const FAILURE_NOTICE: &'static str = "Error fetching products";

    fn validate(&self, input: &str) -> Result<(), ValidationError> {
        if input.chars().count() < MIN_SEARCH_CHARS {
            return Err(ValidationError::TooShort {
                min: MIN_SEARCH_CHARS,
            });
        }
        Ok(())
    }

    async fn dispatch(
        &self,
        gateway: &dyn Gateway,
        input: &str,
    ) -> Result<Self::Output, GatewayError> {
        gateway.search(input).await
    }
}

impl InputMode for Search {}

/// Random recommendations. Takes no input and is always eligible to submit.
#[derive(Debug, Clone, Copy, Default)]
pub struct Recommendations;

#[async_trait]
impl QueryMode for Recommendations {
    type Output = Vec<RecommendedProduct>;
    const NAME: &'static str = "recommendations";
    const FAILURE_NOTICE: &'static str = "Error fetching recommendations";

    async fn dispatch(
        &self,
        gateway: &dyn Gateway,
        _input: &str,
    ) -> Result<Self::Output, GatewayError> {
        gateway.recommendations().await
    }
}

/// Natural-language intent parsing. The raw text is sent unmodified.
#[derive(Debug, Clone, Copy, Default)]
pub struct NlpQuery;

#[async_trait]
impl QueryMode for NlpQuery {
    type Output = NlpParse;
    const NAME: &'static str = "nlp";
    const FAILURE_NOTICE: &'static str = "Error parsing query";

    async fn dispatch(
        &self,
        gateway: &dyn Gateway,
        input: &str,
    ) -> Result<Self::Output, GatewayError> {
        gateway.parse_nlp(input).await
    }
}

impl InputMode for NlpQuery {}

/// Recommendations restricted to one catalog category.
#[derive(Debug, Clone, Copy, Default)]
pub struct Category;

#[async_trait]
impl QueryMode for Category {
    type Output = Vec<RecommendedProduct>;
    const NAME: &'static str = "category";
    const FAILURE_NOTICE: &'static str = "Error fetching category recommendations";

    fn validate(&self, input: &str) -> Result<(), ValidationError> {
        require_non_blank(input, "category")
    }

    async fn dispatch(
        &self,
        gateway: &dyn Gateway,
        input: &str,
    ) -> Result<Self::Output, GatewayError> {
        gateway.recommend_by_category(input.trim()).await
    }
}

impl InputMode for Category {}

/// Aisle/shelf lookup for a product id.
#[derive(Debug, Clone, Copy, Default)]
pub struct Locate;

#[async_trait]
impl QueryMode for Locate {
    type Output = ProductLocation;
    const NAME: &'static str = "locate";
    const FAILURE_NOTICE: &'static str = "Error locating product";

    fn validate(&self, input: &str) -> Result<(), ValidationError> {
        require_non_blank(input, "product id")
    }

    async fn dispatch(
        &self,
        gateway: &dyn Gateway,
        input: &str,
    ) -> Result<Self::Output, GatewayError> {
        gateway.product_location(input.trim()).await
    }
}

impl InputMode for Locate {}

/// Full catalog record for a product id.
#[derive(Debug, Clone, Copy, Default)]
pub struct Info;

#[async_trait]
impl QueryMode for Info {
    type Output = ProductInfo;
    const NAME: &'static str = "info";
    const FAILURE_NOTICE: &'static str = "Error fetching product details";

    fn validate(&self, input: &str) -> Result<(), ValidationError> {
        require_non_blank(input, "product id")
    }

    async fn dispatch(
        &self,
        gateway: &dyn Gateway,
        input: &str,
    ) -> Result<Self::Output, GatewayError> {
        gateway.product_info(input.trim()).await
    }
}

impl InputMode for Info {}

/// Products similar to a given product id.
#[derive(Debug, Clone, Copy, Default)]
pub struct Similar;

#[async_trait]
impl QueryMode for Similar {
    type Output = SimilarProducts;
    const NAME: &'static str = "similar";
    const FAILURE_NOTICE: &'static str = "Error fetching similar products";

    fn validate(&self, input: &str) -> Result<(), ValidationError> {
        require_non_blank(input, "product id")
    }

    async fn dispatch(
        &self,
        gateway: &dyn Gateway,
        input: &str,
    ) -> Result<Self::Output, GatewayError> {
        gateway.similar_products(input.trim()).await
    }
}

impl InputMode for Similar {}

/// In-store route. Input is `"<start> <end>"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Route;

impl Route {
    fn endpoints(input: &str) -> Option<(&str, &str)> {
        let mut parts = input.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(start), Some(end), None) => Some((start, end)),
            _ => None,
        }
    }
}

#[async_trait]
impl QueryMode for Route {
    type Output = NavigationPath;
    const NAME: &'static str = "route";
    const FAILURE_NOTICE: &'static str = "Error finding a route";

    fn validate(&self, input: &str) -> Result<(), ValidationError> {
        Self::endpoints(input)
            .map(|_| ())
            .ok_or(ValidationError::RouteEndpoints)
    }

    async fn dispatch(
        &self,
        gateway: &dyn Gateway,
        input: &str,
    ) -> Result<Self::Output, GatewayError> {
        // validate() has already checked the shape
        let (start, end) = Self::endpoints(input).unwrap_or_default();
        gateway.navigation_path(start, end).await
    }
}

impl InputMode for Route {}

/// Backend liveness probe.
#[derive(Debug, Clone, Copy, Default)]
pub struct Health;

#[async_trait]
impl QueryMode for Health {
    type Output = HealthStatus;
    const NAME: &'static str = "health";
    const FAILURE_NOTICE: &'static str = "Backend is unreachable";

    async fn dispatch(
        &self,
        gateway: &dyn Gateway,
        _input: &str,
    ) -> Result<Self::Output, GatewayError> {
        gateway.health().await
    }
}
