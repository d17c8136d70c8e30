//! Integration tests for the cart reconciler against the marketplace client.
//!
//! The reconciler is driven directly with an in-memory store, the way the
//! CLI and background jobs use it.

use std::sync::Arc;

use giftora_core::{CartSessionId, VariantId};
use giftora_integration_tests::{FixedCartIds, TEST_CART_ID, marketplace_client, mount_token};
use giftora_storefront::cart::{AddToCart, CartError, CartFlow, CartReconciler, LocalCart, Product};
use giftora_storefront::marketplace::MarketplaceError;
use giftora_storefront::storage::{InMemoryStore, KeyValueStore, get_typed, keys};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn hamper() -> Product {
    serde_json::from_value(json!({
        "id": 12,
        "name": "Festive hamper",
        "price": 1200,
        "promo_price": 999,
        "end_date": "2099-01-01T00:00:00Z",
        "quantity": 100,
        "variants": [
            { "id": 1, "price": 0, "variant_quantity": 4, "color": "Red" },
            { "id": 2, "price": 150, "variant_quantity": 2, "color": "Gold" }
        ]
    }))
    .unwrap_or_else(|e| panic!("{e}"))
}

fn reconciler(server: &MockServer) -> CartReconciler<giftora_storefront::marketplace::MarketplaceClient> {
    CartReconciler::new(marketplace_client(server), Arc::new(FixedCartIds))
}

async fn mount_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/addTOCart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": true })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_variant_promotion_price_is_synced() {
    let server = MockServer::start().await;
    mount_token(&server, "tok").await;

    Mock::given(method("POST"))
        .and(path("/addTOCart"))
        .and(body_partial_json(json!({
            "cart_id": TEST_CART_ID,
            "product_id": 12,
            "variant_id": 2,
            "quantity": 2,
            "is_offer": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/calculateTax"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": true, "gst": "206.82" })))
        .mount(&server)
        .await;

    let store = InMemoryStore::new();
    let outcome = reconciler(&server)
        .add(
            &store,
            &hamper(),
            AddToCart {
                variant_id: Some(VariantId::new(2)),
                quantity: 2,
                flow: CartFlow::ProductDetail,
            },
        )
        .await
        .unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(outcome.line.price, Decimal::from(1149));
    assert_eq!(outcome.line.color.as_deref(), Some("Gold"));

    let cart: LocalCart = get_typed(&store, keys::CART)
        .await
        .unwrap_or_else(|e| panic!("{e}"))
        .unwrap_or_else(|| panic!("cart not stored"));
    assert_eq!(cart.subtotal(), Decimal::from(2298));

    let cart_id: Option<CartSessionId> = get_typed(&store, keys::CART_ID)
        .await
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(cart_id, Some(CartSessionId::new(TEST_CART_ID)));

    let tax: Option<Value> = get_typed(&store, keys::TAX_SUMMARY)
        .await
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(tax, Some(json!({ "status": true, "gst": "206.82" })));
}

#[tokio::test]
async fn test_failed_tax_keeps_previous_summary() {
    let server = MockServer::start().await;
    mount_token(&server, "tok").await;
    mount_ok(&server).await;

    Mock::given(method("POST"))
        .and(path("/calculateTax"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let store = InMemoryStore::new();
    store
        .set(keys::TAX_SUMMARY, json!({ "gst": "10.00" }))
        .await
        .unwrap_or_else(|e| panic!("{e}"));

    let outcome = reconciler(&server)
        .add(
            &store,
            &hamper(),
            AddToCart {
                variant_id: None,
                quantity: 1,
                flow: CartFlow::QuickAdd,
            },
        )
        .await
        .unwrap_or_else(|e| panic!("{e}"));

    assert!(outcome.tax.is_none());
    let tax: Option<Value> = get_typed(&store, keys::TAX_SUMMARY)
        .await
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(tax, Some(json!({ "gst": "10.00" })));
}

#[tokio::test]
async fn test_quick_add_stops_at_variant_stock() {
    let server = MockServer::start().await;
    mount_token(&server, "tok").await;
    mount_ok(&server).await;
    Mock::given(method("POST"))
        .and(path("/calculateTax"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": true })))
        .mount(&server)
        .await;

    let store = InMemoryStore::new();
    let reconciler = reconciler(&server);
    let product = hamper();
    let quick = AddToCart {
        variant_id: None,
        quantity: 1,
        flow: CartFlow::QuickAdd,
    };

    // First variant holds 4 units
    for expected in 1..=4 {
        let outcome = reconciler
            .add(&store, &product, quick)
            .await
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(outcome.line.qty, expected);
    }

    let err = reconciler.add(&store, &product, quick).await.unwrap_err();
    assert!(matches!(
        err,
        CartError::InsufficientStock {
            requested: 5,
            available: 4
        }
    ));
    assert!(!reconciler.is_busy());
}

#[tokio::test]
async fn test_sync_failure_surfaces_marketplace_error() {
    let server = MockServer::start().await;
    mount_token(&server, "tok").await;

    Mock::given(method("POST"))
        .and(path("/addTOCart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": true, "error": "Cart expired" })))
        .mount(&server)
        .await;

    let store = InMemoryStore::new();
    let err = reconciler(&server)
        .add(
            &store,
            &hamper(),
            AddToCart {
                variant_id: None,
                quantity: 1,
                flow: CartFlow::BuyNow,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CartError::Marketplace(MarketplaceError::Api(ref msg)) if msg == "Cart expired"
    ));
}
