//! Stateless mapping from a [`RequestState`] to what a page shows.
//!
//! [`render`] recomputes the whole [`DisplayModel`] on every call; nothing
//! is cached between renders.

use std::fmt;

use crate::controller::RequestState;
use crate::models::{
    HealthStatus, NavigationPath, NlpParse, ProductInfo, ProductLocation, RecommendedProduct,
    SimilarProducts, StockedProduct,
};

/// One list entry, keyed by the product id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub key: String,
    pub primary: String,
    pub secondary: String,
}

/// One `label: value` line of a key/value presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayField {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayModel {
    /// A request is in flight.
    pub busy: bool,
    pub heading: Option<String>,
    pub rows: Vec<DisplayRow>,
    pub fields: Vec<DisplayField>,
    /// User-visible error notice.
    pub notice: Option<String>,
}

impl DisplayModel {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.fields.is_empty()
    }
}

/// How a result payload is laid out on its page.
pub trait Present {
    fn present(&self, model: &mut DisplayModel);
}

pub fn render<R: Present>(state: &RequestState<R>) -> DisplayModel {
    let mut model = DisplayModel {
        busy: state.is_loading(),
        ..DisplayModel::default()
    };
    if let Some(result) = state.visible_result() {
        result.present(&mut model);
    }
    if let Some(error) = state.error() {
        model.notice = Some(error.notice.clone());
    }
    model
}

pub fn format_price(price: f64) -> String {
    format!("${price:.2}")
}

impl Present for Vec<StockedProduct> {
    fn present(&self, model: &mut DisplayModel) {
        model.rows = self
            .iter()
            .map(|p| DisplayRow {
                key: p.product_id.to_string(),
                primary: p.name.clone(),
                secondary: format!("Stock: {} | Aisle: {}", p.stock_quantity, p.aisle_id),
            })
            .collect();
    }
}

fn priced_rows(products: &[RecommendedProduct]) -> Vec<DisplayRow> {
    products
        .iter()
        .map(|p| DisplayRow {
            key: p.product_id.to_string(),
            primary: p.name.clone(),
            secondary: format_price(p.price),
        })
        .collect()
}

impl Present for Vec<RecommendedProduct> {
    fn present(&self, model: &mut DisplayModel) {
        if self.is_empty() {
            return;
        }
        model.heading = Some("Recommended Products:".to_string());
        model.rows = priced_rows(self);
    }
}

impl Present for SimilarProducts {
    fn present(&self, model: &mut DisplayModel) {
        if self.products.is_empty() {
            return;
        }
        model.heading = Some(format!("Similar to {}:", self.based_on));
        model.rows = priced_rows(&self.products);
    }
}

impl Present for ProductInfo {
    fn present(&self, model: &mut DisplayModel) {
        model.heading = Some(format!("{} ({})", self.name, self.product_id));

        let mut fields = Vec::new();
        let mut push = |label: &'static str, value: Option<String>| {
            if let Some(value) = value {
                fields.push(DisplayField { label, value });
            }
        };
        push("Category", self.category.clone());
        push("Price", self.price.map(format_price));
        push("Stock", self.stock_quantity.map(|n| n.to_string()));
        push("Aisle", self.aisle_id.as_ref().map(ToString::to_string));
        push("Shelf", self.shelf_id.as_ref().map(ToString::to_string));
        if !self.diet_tags.is_empty() {
            push("Diet", Some(self.diet_tags.join(", ")));
        }
        model.fields = fields;
    }
}

impl Present for NlpParse {
    fn present(&self, model: &mut DisplayModel) {
        model.fields = vec![
            DisplayField {
                label: "Intent",
                value: self.intent.clone(),
            },
            DisplayField {
                label: "Entities",
                value: self.entities.join(", "),
            },
        ];
    }
}

impl Present for ProductLocation {
    fn present(&self, model: &mut DisplayModel) {
        model.rows = vec![DisplayRow {
            key: self.product_id.to_string(),
            primary: self.name.clone(),
            secondary: format!("Aisle: {} | Shelf: {}", self.aisle, self.shelf),
        }];
    }
}

impl Present for NavigationPath {
    fn present(&self, model: &mut DisplayModel) {
        model.fields = vec![
            DisplayField {
                label: "Route",
                value: self.path.join(" → "),
            },
            DisplayField {
                label: "Total cost",
                value: format!("{:.2}", self.total_cost),
            },
        ];
    }
}

impl Present for HealthStatus {
    fn present(&self, model: &mut DisplayModel) {
        model.fields = vec![DisplayField {
            label: "Status",
            value: self.status.clone(),
        }];
    }
}

impl fmt::Display for DisplayModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.busy {
            writeln!(f, "… loading")?;
        }
        if let Some(notice) = &self.notice {
            writeln!(f, "! {notice}")?;
        }
        if let Some(heading) = &self.heading {
            writeln!(f, "{heading}")?;
        }
        for row in &self.rows {
            writeln!(f, "  {}", row.primary)?;
            writeln!(f, "    {}", row.secondary)?;
        }
        for field in &self.fields {
            writeln!(f, "{}: {}", field.label, field.value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ErrorInfo;
    use crate::gateway::ErrorKind;
    use crate::models::CatalogId;

    fn stocked(id: i64, name: &str, stock: i64, aisle: &str) -> StockedProduct {
        StockedProduct {
            product_id: CatalogId::from(id),
            name: name.to_string(),
            stock_quantity: stock,
            aisle_id: CatalogId::from(aisle),
        }
    }

    fn network_failure(notice: &str) -> ErrorInfo {
        ErrorInfo {
            kind: ErrorKind::Network,
            notice: notice.to_string(),
            detail: "connection refused".to_string(),
        }
    }

    #[test]
    fn test_idle_renders_empty() {
        let model = render::<Vec<StockedProduct>>(&RequestState::Idle);
        assert!(!model.busy);
        assert!(model.is_empty());
        assert!(model.notice.is_none());
    }

    #[test]
    fn test_loading_without_prior_result_is_busy_and_empty() {
        let model = render::<Vec<StockedProduct>>(&RequestState::Loading { previous: None });
        assert!(model.busy);
        assert!(model.rows.is_empty());
    }

    #[test]
    fn test_loading_keeps_prior_rows() {
        let state = RequestState::Loading {
            previous: Some(vec![stocked(1, "Apple", 10, "A3")]),
        };
        let model = render(&state);
        assert!(model.busy);
        assert_eq!(model.rows.len(), 1);
    }

    #[test]
    fn test_search_rows_one_per_product() {
        let products = vec![
            stocked(1, "Apple", 10, "A3"),
            stocked(2, "Apricot", 0, "A3"),
            stocked(3, "Apple juice", 24, "B1"),
        ];
        let model = render(&RequestState::Succeeded(products.clone()));
        assert_eq!(model.rows.len(), products.len());
        for (row, p) in model.rows.iter().zip(&products) {
            assert_eq!(row.key, p.product_id.to_string());
            assert_eq!(row.primary, p.name);
            assert_eq!(
                row.secondary,
                format!("Stock: {} | Aisle: {}", p.stock_quantity, p.aisle_id)
            );
        }
        assert_eq!(model.rows[1].secondary, "Stock: 0 | Aisle: A3");
    }

    #[test]
    fn test_price_has_two_decimals_and_currency() {
        assert_eq!(format_price(5.0), "$5.00");
        assert_eq!(format_price(2.5), "$2.50");
        assert_eq!(format_price(3.999), "$4.00");
    }

    #[test]
    fn test_recommendations_render_heading_and_prices() {
        let state = RequestState::Succeeded(vec![RecommendedProduct {
            product_id: CatalogId::Text("p1".into()),
            name: "Oat milk".into(),
            price: 5.0,
        }]);
        let model = render(&state);
        assert_eq!(model.heading.as_deref(), Some("Recommended Products:"));
        assert_eq!(model.rows[0].primary, "Oat milk");
        assert_eq!(model.rows[0].secondary, "$5.00");
    }

    #[test]
    fn test_empty_recommendations_have_no_heading() {
        let model = render::<Vec<RecommendedProduct>>(&RequestState::Succeeded(vec![]));
        assert!(model.heading.is_none());
        assert!(model.is_empty());
    }

    #[test]
    fn test_nlp_renders_intent_and_joined_entities() {
        let state = RequestState::Succeeded(NlpParse {
            intent: "navigate".into(),
            entities: vec!["almond milk".into(), "orange juice".into()],
        });
        let model = render(&state);
        assert_eq!(model.to_string(), "Intent: navigate\nEntities: almond milk, orange juice\n");
    }

    #[test]
    fn test_nlp_with_no_entities() {
        let state = RequestState::Succeeded(NlpParse {
            intent: "unknown".into(),
            entities: vec![],
        });
        let model = render(&state);
        assert_eq!(model.fields[1].value, "");
    }

    #[test]
    fn test_failed_shows_notice_and_keeps_previous_rows() {
        let state = RequestState::Failed {
            error: network_failure("Error fetching products"),
            previous: Some(vec![stocked(1, "Apple", 10, "A3")]),
        };
        let model = render(&state);
        assert!(!model.busy);
        assert_eq!(model.notice.as_deref(), Some("Error fetching products"));
        assert_eq!(model.rows.len(), 1);
    }

    #[test]
    fn test_failed_without_previous_has_empty_list() {
        let state = RequestState::<Vec<RecommendedProduct>>::Failed {
            error: network_failure("Error fetching recommendations"),
            previous: None,
        };
        let model = render(&state);
        assert!(model.rows.is_empty());
        assert_eq!(
            model.to_string(),
            "! Error fetching recommendations\n"
        );
    }

    #[test]
    fn test_location_and_route_render() {
        let location = ProductLocation {
            product_id: CatalogId::Text("p9".into()),
            name: "Cheddar cheese".into(),
            aisle: CatalogId::from("A2"),
            shelf: CatalogId::from("S4"),
        };
        let model = render(&RequestState::Succeeded(location));
        assert_eq!(model.rows[0].secondary, "Aisle: A2 | Shelf: S4");

        let path = NavigationPath {
            start: "entrance".into(),
            end: "A2".into(),
            path: vec!["entrance".into(), "A1".into(), "A2".into()],
            total_cost: 7.0,
        };
        let model = render(&RequestState::Succeeded(path));
        assert_eq!(model.fields[0].value, "entrance → A1 → A2");
        assert_eq!(model.fields[1].value, "7.00");
    }

    #[test]
    fn test_product_info_lists_known_fields_only() {
        let info = ProductInfo {
            product_id: CatalogId::from("p9"),
            name: "Cheddar cheese".into(),
            category: Some("Dairy".into()),
            price: Some(4.5),
            stock_quantity: None,
            aisle_id: Some(CatalogId::from(2)),
            shelf_id: None,
            diet_tags: vec!["vegetarian".into(), "gluten-free".into()],
        };
        let model = render(&RequestState::Succeeded(info));
        assert_eq!(model.heading.as_deref(), Some("Cheddar cheese (p9)"));
        assert_eq!(
            model.to_string(),
            "Cheddar cheese (p9)\nCategory: Dairy\nPrice: $4.50\nAisle: 2\nDiet: vegetarian, gluten-free\n"
        );
    }

    #[test]
    fn test_similar_products_heading_names_reference() {
        let similar = SimilarProducts {
            based_on: "Cheddar cheese".into(),
            products: vec![RecommendedProduct {
                product_id: CatalogId::from("p2"),
                name: "Milk".into(),
                price: 1.2,
            }],
        };
        let model = render(&RequestState::Succeeded(similar));
        assert_eq!(model.heading.as_deref(), Some("Similar to Cheddar cheese:"));
        assert_eq!(model.rows[0].secondary, "$1.20");

        let none = SimilarProducts {
            based_on: "Cheddar cheese".into(),
            products: vec![],
        };
        assert!(render(&RequestState::Succeeded(none)).heading.is_none());
    }

    #[test]
    fn test_render_is_pure() {
        let state = RequestState::Succeeded(vec![stocked(1, "Apple", 10, "A3")]);
        assert_eq!(render(&state), render(&state));
    }
}
