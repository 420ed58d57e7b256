//! Integration tests for the HTTP API, driven through the full router.

mod common;

use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{Method, StatusCode};
use axum::Router;
use serde_json::{json, Value};

use condo_manager::Config;

use common::{
    body_json, body_text, build_test_app, build_test_app_with, delete, get, post_import,
    post_json, send_json, send_raw,
};

async fn create_john(app: &Router) -> Value {
    let response = post_json(
        app,
        "/api/residents",
        &json!({ "name": "John Doe", "unit": "101", "email": "john@example.com" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

async fn create_january_payment(app: &Router) -> Value {
    let response = post_json(
        app,
        "/api/payments",
        &json!({
            "resident_id": 1,
            "amount": 500.00,
            "description": "January fee",
            "payment_date": "2023-01-15"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Health and routing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_reports_version() {
    let app = build_test_app();
    let response = get(&app, "/api/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], condo_manager::VERSION);
}

#[tokio::test]
async fn unknown_api_route_is_json_404() {
    let app = build_test_app();
    let response = get(&app, "/api/nothing-here").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Not found");
}

#[tokio::test]
async fn non_api_paths_serve_the_index_page() {
    let app = build_test_app();

    for uri in ["/", "/residents/overview"] {
        let response = get(&app, uri).await;
        assert_eq!(response.status(), StatusCode::OK, "uri {uri}");
        assert!(body_text(response).await.contains("Condo Manager"));
    }
}

// ---------------------------------------------------------------------------
// Residents
// ---------------------------------------------------------------------------

#[tokio::test]
async fn resident_crud_lifecycle() {
    let app = build_test_app();

    let created = create_john(&app).await;
    assert_eq!(created["id"], 1);
    assert_eq!(created["name"], "John Doe");
    assert_eq!(created["unit"], "101");
    assert_eq!(created["contact"], "");
    assert!(created["created_at"].is_string());

    let response = send_json(
        &app,
        Method::PUT,
        "/api/residents/1",
        &json!({ "name": "John Doe", "unit": "102", "contact": "555-0101" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["id"], 1);
    assert_eq!(updated["unit"], "102");

    let fetched = body_json(get(&app, "/api/residents/1").await).await;
    assert_eq!(fetched["unit"], "102");
    assert_eq!(fetched["contact"], "555-0101");

    let response = delete(&app, "/api/residents/1").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "result": "success" }));

    let response = get(&app, "/api/residents/1").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn residents_are_listed_by_name() {
    let app = build_test_app();
    for (name, unit) in [("Zoe Park", "305"), ("Anna Lee", "102")] {
        let response = post_json(&app, "/api/residents", &json!({ "name": name, "unit": unit })).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let list = body_json(get(&app, "/api/residents").await).await;
    let names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Anna Lee", "Zoe Park"]);
}

#[tokio::test]
async fn empty_list_is_an_empty_array() {
    let app = build_test_app();
    for uri in ["/api/residents", "/api/payments", "/api/expenses"] {
        let response = get(&app, uri).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([]), "uri {uri}");
    }
}

#[tokio::test]
async fn validation_failures_are_400_with_message() {
    let app = build_test_app();

    let response = post_json(&app, "/api/residents", &json!({ "name": "", "unit": "101" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "name is required");

    let response = post_json(
        &app,
        "/api/residents",
        &json!({ "name": "John", "unit": "101", "email": "not-an-email" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "invalid email format");

    let response = post_json(
        &app,
        "/api/expenses",
        &json!({ "amount": 10.0, "description": "Bulbs", "expense_date": "2023-13-01" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "invalid date format, must be YYYY-MM-DD"
    );
}

#[tokio::test]
async fn malformed_requests_are_rejected() {
    let app = build_test_app();

    let response = send_raw(&app, Method::POST, "/api/residents", "application/json", "{not json").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid request payload");

    let response = get(&app, "/api/residents/abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid resident ID");

    let response = delete(&app, "/api/payments/abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid payment ID");

    let response = get(&app, "/api/expenses/42").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Expense not found");
}

// ---------------------------------------------------------------------------
// Payments and expenses
// ---------------------------------------------------------------------------

#[tokio::test]
async fn payments_carry_resident_name() {
    let app = build_test_app();
    create_john(&app).await;

    let payment = create_january_payment(&app).await;
    assert_eq!(payment["id"], 1);
    assert_eq!(payment["amount"], 500.0);
    assert_eq!(payment["residentName"], "John Doe");

    let list = body_json(get(&app, "/api/payments").await).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["residentName"], "John Doe");
    assert_eq!(list[0]["payment_date"], "2023-01-15");
}

#[tokio::test]
async fn deleting_resident_keeps_their_payments() {
    let app = build_test_app();
    create_john(&app).await;
    create_january_payment(&app).await;

    let response = delete(&app, "/api/residents/1").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "result": "success" }));

    // Joined reads hide the orphan, the raw export still carries it
    assert_eq!(body_json(get(&app, "/api/payments").await).await, json!([]));
    let document = body_json(get(&app, "/api/export").await).await;
    assert_eq!(document["payments"].as_array().unwrap().len(), 1);
    assert_eq!(document["payments"][0]["resident_id"], 1);
}

#[tokio::test]
async fn payment_for_unknown_resident_is_stored() {
    let app = build_test_app();
    let response = post_json(
        &app,
        "/api/payments",
        &json!({ "resident_id": 99, "amount": 75.0, "payment_date": "2023-04-01" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let payment = body_json(response).await;
    assert_eq!(payment["resident_id"], 99);
    assert!(payment.get("residentName").is_none());
}

#[tokio::test]
async fn non_canonical_dates_are_rejected() {
    let app = build_test_app();
    create_john(&app).await;

    for date in ["+2023-1-15", " 2023-1-15", "2023-1-15"] {
        let response = post_json(
            &app,
            "/api/payments",
            &json!({ "resident_id": 1, "amount": 10.0, "payment_date": date }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "date {date:?}");
    }
    assert_eq!(body_json(get(&app, "/api/payments").await).await, json!([]));
}

#[tokio::test]
async fn payment_without_resident_is_rejected() {
    let app = build_test_app();
    let response = post_json(
        &app,
        "/api/payments",
        &json!({ "amount": 500.0, "payment_date": "2023-01-15" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "resident is required");
}

#[tokio::test]
async fn expense_update_echoes_fields() {
    let app = build_test_app();
    let response = post_json(
        &app,
        "/api/expenses",
        &json!({
            "amount": 120.0,
            "description": "Water bill",
            "expense_date": "2023-05-25",
            "category": "Utilities"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send_json(
        &app,
        Method::PUT,
        "/api/expenses/1",
        &json!({
            "amount": 135.5,
            "description": "Water bill (corrected)",
            "expense_date": "2023-05-25",
            "category": "Utilities"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["id"], 1);
    assert_eq!(body["amount"], 135.5);

    let fetched = body_json(get(&app, "/api/expenses/1").await).await;
    assert_eq!(fetched["description"], "Water bill (corrected)");
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_filters_each_entity() {
    let app = build_test_app();
    create_john(&app).await;
    post_json(&app, "/api/residents", &json!({ "name": "Jane Smith", "unit": "102" })).await;
    create_january_payment(&app).await;
    post_json(
        &app,
        "/api/payments",
        &json!({ "resident_id": 2, "amount": 450.0, "description": "March fee", "payment_date": "2023-03-10" }),
    )
    .await;
    post_json(
        &app,
        "/api/expenses",
        &json!({ "amount": 80.0, "description": "Lobby bulbs", "expense_date": "2023-02-02", "category": "Maintenance" }),
    )
    .await;

    let residents = body_json(get(&app, "/api/search/residents?q=jane").await).await;
    assert_eq!(residents.as_array().unwrap().len(), 1);
    assert_eq!(residents[0]["unit"], "102");

    let all = body_json(get(&app, "/api/search/residents").await).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let payments = body_json(
        get(&app, "/api/search/payments?start_date=2023-02-01&end_date=2023-12-31").await,
    )
    .await;
    assert_eq!(payments.as_array().unwrap().len(), 1);
    assert_eq!(payments[0]["residentName"], "Jane Smith");

    let payments = body_json(get(&app, "/api/search/payments?q=fee&resident_id=1").await).await;
    assert_eq!(payments.as_array().unwrap().len(), 1);
    assert_eq!(payments[0]["description"], "January fee");

    let expenses = body_json(get(&app, "/api/search/expenses?category=Maintenance").await).await;
    assert_eq!(expenses.as_array().unwrap().len(), 1);

    let expenses = body_json(get(&app, "/api/search/expenses?category=Utilities").await).await;
    assert_eq!(expenses, json!([]));
}

#[tokio::test]
async fn search_rejects_bad_filters() {
    let app = build_test_app();

    let response = get(&app, "/api/search/payments?start_date=01-01-2023").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(&app, "/api/search/payments?resident_id=abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid resident ID");
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[tokio::test]
async fn payments_report_is_csv_attachment() {
    let app = build_test_app();
    create_john(&app).await;
    create_january_payment(&app).await;

    let response = get(&app, "/api/reports/payments/export").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "text/csv");
    let disposition = response.headers()[CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename=payments_report_"));
    assert!(disposition.ends_with(".csv"));

    let csv = body_text(response).await;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "ID,Resident,Unit,Amount,Description,Date");
    assert_eq!(lines[1], "1,John Doe,101,500.00,January fee,2023-01-15");
}

#[tokio::test]
async fn expenses_report_header_without_rows() {
    let app = build_test_app();

    let response = get(&app, "/api/reports/expenses/export").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_text(response).await.trim_end(),
        "ID,Amount,Description,Date,Category"
    );
}

// ---------------------------------------------------------------------------
// Export and import
// ---------------------------------------------------------------------------

#[tokio::test]
async fn export_then_import_into_fresh_database() {
    let source = build_test_app();
    create_john(&source).await;
    create_january_payment(&source).await;

    let response = get(&source, "/api/export").await;
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename=condo_export_"));
    let document = body_json(response).await;
    assert_eq!(document["residents"].as_array().unwrap().len(), 1);
    assert!(document["export_date"].is_string());

    let target = build_test_app();
    let response = post_import(&target, "importFile", document.to_string().as_bytes()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let summary = body_json(response).await;
    assert_eq!(summary["message"], "Database import successful");
    assert_eq!(summary["imported_residents"], 1);
    assert_eq!(summary["imported_payments"], 1);
    assert_eq!(summary["imported_expenses"], 0);

    let resident = body_json(get(&target, "/api/residents/1").await).await;
    assert_eq!(resident["name"], "John Doe");
    assert_eq!(resident["created_at"], document["residents"][0]["created_at"]);

    let payments = body_json(get(&target, "/api/payments").await).await;
    assert_eq!(payments[0]["residentName"], "John Doe");
}

#[tokio::test]
async fn import_replaces_existing_rows() {
    let app = build_test_app();
    create_john(&app).await;
    post_json(&app, "/api/residents", &json!({ "name": "Jane Smith", "unit": "102" })).await;

    let document = json!({
        "residents": [{ "id": 7, "name": "Alice Brown", "unit": "201" }],
        "payments": [],
        "expenses": []
    });
    let response = post_import(&app, "importFile", document.to_string().as_bytes()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let residents = body_json(get(&app, "/api/residents").await).await;
    assert_eq!(residents.as_array().unwrap().len(), 1);
    assert_eq!(residents[0]["id"], 7);
}

#[tokio::test]
async fn import_over_size_limit_is_rejected() {
    let config = Config {
        import_max_bytes: 1024,
        ..Config::default()
    };
    let app = build_test_app_with(&config);
    create_john(&app).await;

    let residents: Vec<Value> = (1..=40)
        .map(|id| {
            json!({
                "id": id,
                "name": format!("Resident {id:03} {}", "x".repeat(64)),
                "unit": "100"
            })
        })
        .collect();
    let document = json!({ "residents": residents, "payments": [], "expenses": [] }).to_string();
    assert!(document.len() > 4096);

    let response = post_import(&app, "importFile", document.as_bytes()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());

    let residents = body_json(get(&app, "/api/residents").await).await;
    assert_eq!(residents.as_array().unwrap().len(), 1);
    assert_eq!(residents[0]["name"], "John Doe");
}

#[tokio::test]
async fn import_rejects_bad_uploads() {
    let app = build_test_app();
    create_john(&app).await;

    let response = post_import(&app, "somethingElse", b"{}").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Error retrieving import file");

    let response = post_import(&app, "importFile", b"this is not json").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid import file format");

    let response = post_json(&app, "/api/import", &json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Unable to parse form");

    // Nothing was replaced
    let residents = body_json(get(&app, "/api/residents").await).await;
    assert_eq!(residents.as_array().unwrap().len(), 1);
}
