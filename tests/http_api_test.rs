mod common;

use axum::http::{Method, Request, StatusCode};
use common::{read_json, TestApp};
use serde_json::{json, Value};

async fn create_part_over_http(app: &TestApp, code: &str) -> Value {
    let part_type = read_json(
        app.request(
            Method::POST,
            "/api/v1/part-types",
            Some(json!({ "name": format!("Type {}", code) })),
        )
        .await,
    )
    .await;
    let supplier = read_json(
        app.request(
            Method::POST,
            "/api/v1/suppliers",
            Some(json!({ "name": format!("Supplier {}", code) })),
        )
        .await,
    )
    .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/parts",
            Some(json!({
                "code": code,
                "part_type_id": part_type["data"]["id"],
                "supplier_id": supplier["data"]["id"],
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    read_json(response).await["data"].clone()
}

#[tokio::test]
async fn health_reports_database_up() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/v1/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["status"], "up");
    assert_eq!(body["database"], "up");
    assert_eq!(body["environment"], "test");
}

#[tokio::test]
async fn vehicles_without_make_or_model_are_accepted() {
    let app = TestApp::new().await;
    let client = read_json(
        app.request(
            Method::POST,
            "/api/v1/clients",
            Some(json!({ "name": "Walk-in", "phone": "0722222222" })),
        )
        .await,
    )
    .await;
    let client_id = client["data"]["id"].clone();

    let response = app
        .request(
            Method::POST,
            "/api/v1/vehicles",
            Some(json!({ "client_id": client_id, "model": "Transit" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let partial = read_json(response).await["data"].clone();
    assert_eq!(partial["make"], "");

    let response = app
        .request(
            Method::POST,
            "/api/v1/vehicles",
            Some(json!({ "client_id": client_id, "make": "", "model": "" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let blank = read_json(response).await["data"].clone();

    for (vehicle, turbo_code) in [(&partial, "GT1"), (&blank, "GT2")] {
        let response = app
            .request(
                Method::POST,
                "/api/v1/work-orders",
                Some(json!({
                    "client_id": client_id,
                    "vehicle_id": vehicle["id"],
                    "turbo_code": turbo_code,
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let rows = read_json(app.request(Method::GET, "/api/v1/work-orders", None).await).await;
    let mut labels: Vec<String> = rows["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["vehicle_info"].as_str().unwrap().to_string())
        .collect();
    labels.sort();
    assert_eq!(labels, vec!["".to_string(), "Transit".to_string()]);
}

#[tokio::test]
async fn stock_movement_flow_maps_statuses() {
    let app = TestApp::new().await;
    let part = create_part_over_http(&app, "CHRA-77").await;
    let part_id = part["id"].as_str().unwrap().to_string();
    assert_eq!(part["stock_quantity"], 0);

    let response = app
        .request(
            Method::POST,
            "/api/v1/stock-movements",
            Some(json!({ "part_id": part_id, "movement_type": "IN", "quantity": 5 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["movement_type"], "IN");
    assert_eq!(body["data"]["balance_after"], 5);

    let response = app
        .request(
            Method::POST,
            "/api/v1/stock-movements",
            Some(json!({ "part_id": part_id, "movement_type": "OUT", "quantity": 9 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .request(
            Method::POST,
            "/api/v1/stock-movements",
            Some(json!({ "part_id": part_id, "movement_type": "OUT", "quantity": 0 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/stock-movements/{}", part_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let response = app
        .request(Method::GET, &format!("/api/v1/parts/{}", part_id), None)
        .await;
    assert_eq!(read_json(response).await["data"]["stock_quantity"], 5);

    let response = app
        .request(Method::DELETE, &format!("/api/v1/parts/{}", part_id), None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/stock-movements/{}", part_id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_ids_are_bad_requests() {
    let app = TestApp::new().await;

    for uri in [
        "/api/v1/parts/not-a-uuid",
        "/api/v1/work-orders/40000",
        "/api/v1/stock-movements/abc",
    ] {
        let response = app.request(Method::GET, uri, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[tokio::test]
async fn duplicate_codes_conflict_over_http() {
    let app = TestApp::new().await;
    let part = create_part_over_http(&app, "GEO-5").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/parts",
            Some(json!({
                "code": "GEO-5",
                "part_type_id": part["part_type_id"],
                "supplier_id": part["supplier_id"],
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/part-types/{}", part["part_type_id"].as_str().unwrap()),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn work_order_lifecycle_over_http() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api/v1/work-orders/next-number", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["data"]["work_number"], "40000");

    let response = app
        .request(
            Method::POST,
            "/api/v1/clients",
            Some(json!({ "name": "Service Auto", "phone": "0711111111" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let client_id = read_json(response).await["data"]["id"].clone();

    let response = app
        .request(
            Method::POST,
            "/api/v1/work-orders",
            Some(json!({ "client_id": client_id, "turbo_code": "GTB1756VK" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let order = read_json(response).await["data"].clone();
    assert_eq!(order["work_number"], "40000");
    assert_eq!(order["status"], "RECEIVED");
    let order_uri = format!("/api/v1/work-orders/{}", order["id"].as_str().unwrap());

    let response = app
        .request(
            Method::PUT,
            &order_uri,
            Some(json!({ "status": "IN_PROGRESS", "turbo_price": "250.00" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = read_json(response).await["data"].clone();
    assert_eq!(updated["status"], "IN_PROGRESS");
    assert_eq!(updated["work_number"], "40000");

    let response = app
        .request(Method::GET, "/api/v1/work-orders?status=IN_PROGRESS", None)
        .await;
    let rows = read_json(response).await["data"].clone();
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["client_name"], "Service Auto");
    assert_eq!(rows[0]["client_phone"], "0711111111");

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/clients/{}", client_id.as_str().unwrap()),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app.request(Method::DELETE, &order_uri, None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = app.request(Method::GET, &order_uri, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .request(Method::GET, "/api/v1/work-orders/next-number", None)
        .await;
    assert_eq!(read_json(response).await["data"]["work_number"], "40001");
}

#[tokio::test]
async fn unknown_client_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/work-orders",
            Some(json!({
                "client_id": "5f0e1e8e-8f5c-4a4e-9d1e-6a7c1f5b2d10",
                "turbo_code": "K03",
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json(response).await;
    assert_eq!(body["error"], "Not Found");
    assert!(body["request_id"].is_string());
}

#[tokio::test]
async fn blank_catalog_name_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::POST, "/api/v1/suppliers", Some(json!({ "name": "  " })))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn seed_endpoint_is_idempotent() {
    let app = TestApp::new().await;

    let first = read_json(
        app.request(Method::POST, "/api/v1/reference-data/seed", None)
            .await,
    )
    .await;
    assert_eq!(first["data"]["part_types_created"], 4);
    assert_eq!(first["data"]["suppliers_created"], 3);

    let second = read_json(
        app.request(Method::POST, "/api/v1/reference-data/seed", None)
            .await,
    )
    .await;
    assert_eq!(second["data"]["part_types_created"], 0);
    assert_eq!(second["data"]["suppliers_created"], 0);

    let response = app.request(Method::GET, "/api/v1/part-types", None).await;
    assert_eq!(read_json(response).await["data"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn incoming_request_id_is_echoed() {
    let app = TestApp::new().await;

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/v1/parts/00000000-0000-0000-0000-000000000000")
        .header("x-request-id", "bench-42")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers().get("x-request-id").unwrap(), "bench-42");
    assert_eq!(read_json(response).await["request_id"], "bench-42");
}
