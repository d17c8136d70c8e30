//! Integration tests for the order tracking API.

use giftora_integration_tests::{TestStorefront, mount_token};
use reqwest::StatusCode;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn tracking_response(server: &MockServer, order_id: i64, body: Value) {
    Mock::given(method("POST"))
        .and(path("/orderTracking"))
        .and(body_json(json!({ "order_id": order_id })))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn view(storefront: &TestStorefront, order_id: i64) -> Value {
    let response = storefront.get(&format!("/orders/{order_id}/tracking")).await;
    assert_eq!(response.status(), StatusCode::OK);
    response.json().await.unwrap_or_else(|e| panic!("{e}"))
}

#[tokio::test]
async fn test_courier_timeline_is_deduplicated_and_ordered() {
    let server = MockServer::start().await;
    mount_token(&server, "tok").await;
    tracking_response(
        &server,
        1001,
        json!({
            "tracking_data": {
                "awb_code": "AWB123",
                "shipment_track_activities": [
                    { "activity": "Delivered", "date": "2024-03-15 14:22:00", "location": "Pune, MH" },
                    { "activity": "In Transit", "date": "2024-03-14 18:00:00", "location": "Pune Hub" },
                    { "activity": "In Transit", "date": "2024-03-13 09:00:00", "location": "Mumbai Hub" },
                    { "activity": "Pickup Scheduled", "date": "2024-03-12 10:00:00", "location": "" }
                ]
            }
        }),
    )
    .await;

    let storefront = TestStorefront::start(&server).await;
    let view = view(&storefront, 1001).await;

    assert_eq!(view["kind"], "shipments");
    let shipment = &view["detail"][0];
    assert_eq!(shipment["awb"], "AWB123");

    let steps = shipment["steps"].as_array().unwrap_or_else(|| panic!("steps"));
    let labels: Vec<&str> = steps.iter().filter_map(|s| s["label"].as_str()).collect();
    assert_eq!(labels, vec!["Pickup\nScheduled", "In Transit", "Delivered"]);

    // The kept "In Transit" is the most recent scan
    assert_eq!(steps[1]["location_lines"], json!(["Pune Hub"]));

    let last = &steps[2];
    assert_eq!(last["is_terminal"], true);
    assert_eq!(last["is_completed"], true);
    assert_eq!(last["icon"], "delivered");
    assert_eq!(last["location_lines"], json!(["Pune", "MH"]));
}

#[tokio::test]
async fn test_message_and_error_payloads() {
    let server = MockServer::start().await;
    mount_token(&server, "tok").await;
    tracking_response(&server, 1, json!("Order not yet shipped")).await;
    tracking_response(
        &server,
        2,
        json!({ "tracking_data": { "error": "Invalid AWB", "shipment_track_activities": 0 } }),
    )
    .await;
    tracking_response(&server, 3, json!({ "status": true, "data": { "warehouses": [] } })).await;

    let storefront = TestStorefront::start(&server).await;

    assert_eq!(
        view(&storefront, 1).await,
        json!({ "kind": "status", "detail": "Order not yet shipped" })
    );
    assert_eq!(
        view(&storefront, 2).await,
        json!({ "kind": "error", "detail": "Invalid AWB" })
    );
    assert_eq!(view(&storefront, 3).await, json!({ "kind": "no_data" }));
}

#[tokio::test]
async fn test_own_shipment_warehouse() {
    let server = MockServer::start().await;
    mount_token(&server, "tok").await;
    tracking_response(
        &server,
        77,
        json!({
            "status": true,
            "data": {
                "warehouses": [{
                    "warehouse_name": "Jaipur Crafts",
                    "is_own_shipment": "1",
                    "own_shipment_tracking": [
                        { "current_status": "pending", "date": "2024-03-10 09:00:00", "location": "Jaipur" },
                        { "current_status": "dispatched", "date": "2024-03-11", "location": "Jaipur" }
                    ]
                }]
            }
        }),
    )
    .await;

    let storefront = TestStorefront::start(&server).await;
    let view = view(&storefront, 77).await;

    let shipment = &view["detail"][0];
    assert_eq!(shipment["warehouse_name"], "Jaipur Crafts");
    assert_eq!(shipment["own_shipment"], true);

    let steps = shipment["steps"].as_array().unwrap_or_else(|| panic!("steps"));
    assert_eq!(steps.len(), 2);
    let current = &steps[1];
    assert_eq!(current["is_terminal"], true);
    // Only a delivered own shipment is complete
    assert_eq!(current["is_completed"], false);
    assert!(current["color"].is_string());
    assert!(current["date"]["time"].is_null());
}

#[tokio::test]
async fn test_expired_token_is_refreshed_once() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generateToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "old" })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/generateToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "new" })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/orderTracking"))
        .and(header("Authorization", "Bearer old"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/orderTracking"))
        .and(header("Authorization", "Bearer new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("Shipment not found")))
        .expect(1)
        .mount(&server)
        .await;

    let storefront = TestStorefront::start(&server).await;
    assert_eq!(view(&storefront, 5).await["detail"], "Shipment not found");
}

#[tokio::test]
async fn test_repeated_unauthorized_is_bad_gateway() {
    let server = MockServer::start().await;
    mount_token(&server, "tok").await;

    Mock::given(method("POST"))
        .and(path("/orderTracking"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;

    let storefront = TestStorefront::start(&server).await;
    let response = storefront.get("/orders/9/tracking").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
