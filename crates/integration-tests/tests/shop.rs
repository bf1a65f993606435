//! Integration tests for the public shop page and catalog.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::http::{Method, StatusCode, header};
use showcase_core::persistence::keys;
use showcase_core::{MemoryStore, StateStore};
use showcase_integration_tests::{STUB_CITY, STUB_REGION, TestApp, json_body, request, text_body};

const FIREFOX_LINUX: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:120.0) Gecko/20100101 Firefox/120.0";

#[tokio::test]
async fn test_shop_page_lists_seeded_products() {
    let app = TestApp::new();

    let response = app.send(request(Method::GET, "/", "203.0.113.1", None, None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = text_body(response).await;
    assert!(html.contains("Gaming Headset Pro"));
    assert!(html.contains("₺3.999,99"));
    assert!(html.contains("Tükendi"));
    assert!(html.contains("Yeni Ürün"));
}

#[tokio::test]
async fn test_defaults_are_stored_on_startup() {
    let app = TestApp::new();

    let products = app.store().load(keys::PRODUCTS).unwrap().unwrap();
    assert!(products.contains("Gaming Headset Pro"));
    let admins = app.store().load(keys::ADMINS).unwrap().unwrap();
    assert!(admins.contains("darknes"));
    assert!(app.store().load(keys::VISITORS).unwrap().is_none());
}

#[tokio::test]
async fn test_stored_data_is_not_overwritten_on_startup() {
    let store = Arc::new(MemoryStore::new());
    store.save(keys::PRODUCTS, "[]").unwrap();
    let app = TestApp::with_store(store);

    assert_eq!(app.store().load(keys::PRODUCTS).unwrap().as_deref(), Some("[]"));
    assert!(app.state().products().read().await.list().is_empty());
    assert!(app.store().load(keys::ADMINS).unwrap().is_some());
}

#[tokio::test]
async fn test_shop_visit_is_recorded_with_metadata() {
    let app = TestApp::new();

    let mut req = request(Method::GET, "/", "203.0.113.2", None, None);
    req.headers_mut()
        .insert(header::USER_AGENT, FIREFOX_LINUX.parse().unwrap());
    app.send(req).await;

    assert!(app.wait_for_visitor("203.0.113.2").await);
    let visitors = app.state().visitors().read().await;
    let visitor = visitors.find("203.0.113.2").unwrap();
    assert_eq!(visitor.region.as_deref(), Some(STUB_REGION));
    assert_eq!(visitor.city.as_deref(), Some(STUB_CITY));
    assert!(visitor.browser.as_deref().unwrap_or_default().starts_with("Firefox"));
    assert!(!visitor.banned);
}

#[tokio::test]
async fn test_repeat_visits_keep_one_record() {
    let app = TestApp::new();

    app.send(request(Method::GET, "/", "203.0.113.3", None, None)).await;
    assert!(app.wait_for_visitor("203.0.113.3").await);
    app.send(request(Method::GET, "/", "203.0.113.3", None, None)).await;
    tokio::task::yield_now().await;

    assert_eq!(app.state().visitors().read().await.visitor_count(), 1);
}

#[tokio::test]
async fn test_products_json() {
    let app = TestApp::new();

    let response = app
        .send(request(Method::GET, "/api/products", "203.0.113.4", None, None))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let products = json_body(response).await;
    let products = products.as_array().unwrap();
    assert_eq!(products.len(), 6);
    assert_eq!(products[0]["name"], "Gaming Headset Pro");
    assert_eq!(products[0]["inStock"], true);
    assert_eq!(products[1]["inStock"], false);
}

#[tokio::test]
async fn test_banned_ip_gets_banned_page() {
    let app = TestApp::new();

    app.send(request(Method::GET, "/", "198.51.100.7", None, None)).await;
    assert!(app.wait_for_visitor("198.51.100.7").await);
    assert!(app.state().visitors().write().await.ban("198.51.100.7").unwrap());

    let response = app.send(request(Method::GET, "/", "198.51.100.7", None, None)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let html = text_body(response).await;
    assert!(html.contains("Erişim Engellendi"));
    assert!(!html.contains("Gaming Headset Pro"));

    let response = app
        .send(request(Method::GET, "/api/products", "198.51.100.7", None, None))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(response).await["error"], "Access denied");

    // Other visitors are unaffected
    let response = app.send(request(Method::GET, "/", "198.51.100.8", None, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_is_not_ban_gated() {
    let app = TestApp::new();

    app.send(request(Method::GET, "/", "198.51.100.9", None, None)).await;
    assert!(app.wait_for_visitor("198.51.100.9").await);
    app.state().visitors().write().await.ban("198.51.100.9").unwrap();

    let response = app
        .send(request(Method::GET, "/health", "198.51.100.9", None, None))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}
