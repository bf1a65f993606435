//! Public shop page and catalog API.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header::USER_AGENT},
    response::IntoResponse,
};
use showcase_core::Product;
use tracing::instrument;

use crate::middleware::ClientIp;
use crate::state::AppState;

const FALLBACK_LABEL_NEW: &str = "Yeni Ürün";
const FALLBACK_LABEL_SOLD_OUT: &str = "Tükendi";
const FALLBACK_COLOR_NEW: &str = "#EAB308";
const FALLBACK_COLOR_SOLD_OUT: &str = "#EF4444";

/// Product data prepared for the shop template.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub name: String,
    pub price: String,
    pub image: String,
    pub link: String,
    pub in_stock: bool,
    pub label_text: String,
    pub label_color: String,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        let (default_label, default_color) = if product.in_stock {
            (FALLBACK_LABEL_NEW, FALLBACK_COLOR_NEW)
        } else {
            (FALLBACK_LABEL_SOLD_OUT, FALLBACK_COLOR_SOLD_OUT)
        };
        let or_default = |value: Option<&String>, default: &str| {
            value
                .filter(|v| !v.trim().is_empty())
                .map_or_else(|| default.to_owned(), Clone::clone)
        };

        Self {
            name: product.name.clone(),
            price: format_price(&format!("{:.2}", product.price.amount())),
            image: product.image.clone(),
            link: product.link.clone(),
            in_stock: product.in_stock,
            label_text: or_default(product.label_text.as_ref(), default_label),
            label_color: or_default(product.label_color.as_ref(), default_color),
        }
    }
}

/// Format a `1234.50`-style amount as Turkish lira, e.g. `₺1.234,50`.
fn format_price(amount: &str) -> String {
    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, "00"));

    let digits: Vec<char> = whole.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*digit);
    }

    format!("₺{grouped},{fraction}")
}

/// Storefront page.
#[derive(Template, WebTemplate)]
#[template(path = "shop.html")]
pub struct ShopTemplate {
    pub products: Vec<ProductView>,
    pub visitor_count: usize,
}

/// Page shown to banned visitors.
#[derive(Template, WebTemplate)]
#[template(path = "banned.html")]
pub struct BannedTemplate;

/// Display the shop and record the visit in the background.
#[instrument(skip(state, headers))]
pub async fn index(
    State(state): State<AppState>,
    client_ip: ClientIp,
    headers: HeaderMap,
) -> impl IntoResponse {
    let ip = client_ip.or_timestamp();
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let visitors = state.visitors().clone();
    tokio::spawn(async move {
        let now = chrono::Utc::now().timestamp_millis();
        if let Err(e) = visitors.add_visitor(&ip, user_agent.as_deref(), now).await {
            tracing::error!(ip, error = %e, "Failed to record visit");
        }
    });

    let products = state
        .products()
        .read()
        .await
        .list()
        .iter()
        .map(ProductView::from)
        .collect();
    let visitor_count = state.visitors().read().await.visitor_count();

    ShopTemplate {
        products,
        visitor_count,
    }
}

/// Catalog as JSON.
pub async fn products(State(state): State<AppState>) -> Json<Vec<Product>> {
    Json(state.products().read().await.list().to_vec())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use showcase_core::catalog::default_products;

    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price("3999.99"), "₺3.999,99");
        assert_eq!(format_price("14999.99"), "₺14.999,99");
        assert_eq!(format_price("1234567.00"), "₺1.234.567,00");
        assert_eq!(format_price("5.50"), "₺5,50");
        assert_eq!(format_price("999"), "₺999,00");
    }

    #[test]
    fn test_product_view_label_fallbacks() {
        let mut product = default_products()[1].clone();
        product.label_text = None;
        product.label_color = Some(String::new());

        let view = ProductView::from(&product);
        assert!(!view.in_stock);
        assert_eq!(view.label_text, "Tükendi");
        assert_eq!(view.label_color, "#EF4444");
    }

    #[test]
    fn test_shop_template_renders() {
        let html = ShopTemplate {
            products: default_products().iter().map(ProductView::from).collect(),
            visitor_count: 42,
        }
        .render()
        .unwrap();

        assert!(html.contains("Gaming Headset Pro"));
        assert!(html.contains("₺3.999,99"));
        assert!(html.contains("42"));
        assert!(html.contains("Yeni Ürün"));
        assert!(html.contains("Satın Al"));
    }

    #[test]
    fn test_banned_template_renders() {
        let html = BannedTemplate.render().unwrap();
        assert!(html.contains("Erişim Engellendi"));
    }
}
