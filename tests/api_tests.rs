//! Router-level tests against an in-memory database.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use takehome::{AppState, build_router, store};
use tower::util::ServiceExt;

async fn setup_app() -> Router {
    let db = store::connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    build_router(AppState::new(db).expect("app state"))
}

fn request(method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn sample_budget(income: f64) -> Value {
    json!({
        "name": "Spring",
        "fixedExpenses": { "housing": 1750, "carPayment": 400, "savings": 300 },
        "frequencyData": { "coffee": { "frequency": "weekly", "amount": 20 } },
        "selectedSubscriptions": ["netflix", "spotify"],
        "monthlyIncome": income
    })
}

fn approx(value: &Value, expected: f64, tol: f64) -> bool {
    value.as_f64().is_some_and(|v| (v - expected).abs() <= tol)
}

#[tokio::test]
async fn health_reports_ok() {
    let app = setup_app().await;
    let (status, body) = send(&app, request("GET", "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn responses_are_not_cached() {
    let app = setup_app().await;
    let response = app
        .oneshot(request("GET", "/health", None, None))
        .await
        .expect("response");
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
}

#[tokio::test]
async fn unknown_routes_get_json_404() {
    let app = setup_app().await;
    let (status, body) = send(&app, request("GET", "/nope", None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");
}

#[tokio::test]
async fn loan_quote_over_post_and_get() {
    let app = setup_app().await;
    let payload = json!({ "principal": 25000, "annualRatePercent": 6, "termMonths": 60 });
    let (status, body) = send(&app, request("POST", "/api/loan", None, Some(payload))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(approx(&body["monthlyPayment"], 483.32, 0.01));
    assert_eq!(body["termComparison"].as_array().map(Vec::len), Some(5));

    let uri = "/api/loan?principal=12000&annualRatePercent=0&termMonths=12";
    let (status, body) = send(&app, request("GET", uri, None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(approx(&body["monthlyPayment"], 1_000.0, 1e-9));
    assert!(approx(&body["totalInterest"], 0.0, 1e-9));
}

#[tokio::test]
async fn loan_rejects_zero_term() {
    let app = setup_app().await;
    let payload = json!({ "principal": 25000, "annualRatePercent": 6 });
    let (status, body) = send(&app, request("POST", "/api/loan", None, Some(payload))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some_and(|e| e.contains("termMonths")));
}

#[tokio::test]
async fn affordability_combines_guides_and_verdict() {
    let app = setup_app().await;
    let payload = json!({
        "monthlyGrossIncome": 6000,
        "monthlyPayment": 450,
        "fixedObligations": 1200
    });
    let (status, body) = send(
        &app,
        request("POST", "/api/auto/affordability", None, Some(payload)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["approvals"].as_array().map(Vec::len), Some(3));
    assert_eq!(body["tierEstimates"].as_array().map(Vec::len), Some(4));
    assert!(approx(&body["spendingGuides"]["maxAutoPayment"], 720.0, 1e-9));
    assert!(body["verdict"]["verdict"].is_string());
    assert!(approx(&body["incomeDrop"]["reducedIncome"], 5_400.0, 1e-9));
    assert!(body["incomeDrop"]["verdict"]["verdict"].is_string());
}

#[tokio::test]
async fn tax_estimate_includes_allocation() {
    let app = setup_app().await;
    let payload = json!({ "grossAnnualIncome": 50000 });
    let (status, body) = send(&app, request("POST", "/api/tax", None, Some(payload))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(approx(&body["federalTax"], 4_016.0, 1e-6));
    assert!(approx(&body["ficaTax"], 3_825.0, 1e-6));
    assert!(approx(
        &body["allocation"]["needs"]["monthly"],
        body["netMonthly"].as_f64().unwrap_or_default() * 0.5,
        1e-6
    ));
}

#[tokio::test]
async fn income_projection_and_insufficient_data() {
    let app = setup_app().await;
    let payload = json!({
        "startDate": "2025-01-15",
        "asOfDate": "2025-06-30",
        "ytdGrossIncome": 45230
    });
    let (status, body) = send(
        &app,
        request("POST", "/api/income/project", None, Some(payload)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["daysWorked"], 167);
    assert!(approx(&body["annualRate"], 98_855.0, 1.0));

    let backwards = json!({
        "startDate": "2025-06-01",
        "asOfDate": "2025-05-01",
        "ytdGrossIncome": 1000
    });
    let (status, body) = send(
        &app,
        request("POST", "/api/income/project", None, Some(backwards)),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn ad_hoc_recommendations() {
    let app = setup_app().await;
    let payload = json!({ "spending": { "housing": 1750 }, "monthlyIncome": 5000 });
    let (status, body) = send(
        &app,
        request("POST", "/api/budget/recommendations", None, Some(payload)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let recs = body["recommendations"].as_array().expect("list");
    assert!(recs.iter().any(|r| {
        r["severity"] == "danger"
            && r["message"].as_str().is_some_and(|m| m.starts_with("Housing is 35%"))
    }));
}

#[tokio::test]
async fn recommendations_reject_unknown_categories() {
    let app = setup_app().await;
    let payload = json!({ "spending": { "yachts": 10 }, "monthlyIncome": 5000 });
    let (status, _) = send(
        &app,
        request("POST", "/api/budget/recommendations", None, Some(payload)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn negative_spending_is_ignored_by_recommendations() {
    let app = setup_app().await;
    let payload = json!({
        "spending": { "housing": 1750, "savings": -4000 },
        "monthlyIncome": 5000
    });
    let (status, body) = send(
        &app,
        request("POST", "/api/budget/recommendations", None, Some(payload)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(approx(&body["totalSpending"], 1_750.0, 1e-9));
    let messages: Vec<&str> = body["recommendations"]
        .as_array()
        .expect("list")
        .iter()
        .filter_map(|r| r["message"].as_str())
        .collect();
    assert!(messages.iter().any(|m| m.starts_with("Saving only 0%")));
    assert!(messages.iter().all(|m| !m.contains("-80%") && !m.contains("$7250")));
}

#[tokio::test]
async fn merchants_are_categorized() {
    let app = setup_app().await;
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/transactions/categorize",
            None,
            Some(json!({ "merchant": "Shell Gas #42" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"], "needs");
    assert_eq!(body["subcategory"], "gas");
    assert_eq!(body["expenseCategory"], "transportation");

    let (status, body) = send(
        &app,
        request("POST", "/api/transactions/categorize", None, Some(json!({}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"], "wants");
    assert!(body["subcategory"].is_null());
}

#[tokio::test]
async fn loan_rejects_terms_beyond_the_cap() {
    let app = setup_app().await;
    let uri = "/api/loan?principal=25000&annualRatePercent=100&termMonths=4000000000";
    let (status, body) = send(&app, request("GET", uri, None, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some_and(|e| e.contains("termMonths")));

    let uri = "/api/loan?principal=25000&annualRatePercent=100&termMonths=480";
    let (status, body) = send(&app, request("GET", uri, None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["monthlyPayment"].as_f64().is_some_and(f64::is_finite));
}

#[tokio::test]
async fn subscription_audit_totals() {
    let app = setup_app().await;
    let payload = json!({ "selectedSubscriptions": ["netflix", "hulu", "disneyPlus"] });
    let (status, body) = send(
        &app,
        request("POST", "/api/subscriptions/audit", None, Some(payload)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    assert_eq!(body["flags"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn budget_routes_require_a_user() {
    let app = setup_app().await;
    let (status, _) = send(&app, request("GET", "/api/budget/latest", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        request("POST", "/api/budget/save", None, Some(sample_budget(5000.0))),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn save_rejects_missing_fields() {
    let app = setup_app().await;
    let payload = json!({ "fixedExpenses": { "housing": 1000 } });
    let (status, body) = send(
        &app,
        request("POST", "/api/budget/save", Some("alice"), Some(payload)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some_and(|e| e.contains("Missing")));
}

#[tokio::test]
async fn budget_lifecycle() {
    let app = setup_app().await;

    let (status, body) = send(
        &app,
        request("GET", "/api/budget/latest", Some("alice"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["budget"].is_null());

    let (status, saved) = send(
        &app,
        request("POST", "/api/budget/save", Some("alice"), Some(sample_budget(5000.0))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["success"], true);
    let id = saved["id"].as_str().expect("id").to_string();
    let path = format!("/api/budget/{id}");

    let (status, body) = send(&app, request("GET", &path, Some("alice"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Spring");
    assert_eq!(body["fixedExpenses"]["housing"], 1750.0);
    assert!(body["customSubAmounts"].as_object().is_some_and(|m| m.is_empty()));
    assert!(body.get("userId").is_none());

    let (status, _) = send(&app, request("GET", &path, Some("bob"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let recs_path = format!("{path}/recommendations");
    let (status, body) = send(&app, request("GET", &recs_path, Some("alice"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["recommendations"].as_array().expect("list").is_empty());

    let (status, body) = send(
        &app,
        request("PUT", &path, Some("alice"), Some(sample_budget(7000.0))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["budget"]["monthlyIncome"], 7000.0);

    let (status, body) = send(
        &app,
        request("GET", "/api/budget/history", Some("alice"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["snapshots"].as_array().map(Vec::len), Some(1));

    let (status, _) = send(&app, request("DELETE", &path, Some("bob"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, request("DELETE", &path, Some("alice"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = send(&app, request("GET", &path, Some("alice"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_budget_id_is_not_found() {
    let app = setup_app().await;
    let (status, body) = send(
        &app,
        request("GET", "/api/budget/12345", Some("alice"), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Budget not found");
}
