use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use axum::{
    Router,
    extract::{
        Json, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServeArgs;
use crate::core::amortization::{
    self, AffordabilityVerdict, DEFAULT_COMPARISON_TERMS, IncomeDropScenario, PaymentApproval,
    TierEstimate,
};
use crate::core::budget::{self, SpendingBreakdown};
use crate::core::catalog::{SubscriptionCategory, SubscriptionId};
use crate::core::merchants::{MerchantCategory, MerchantMatcher};
use crate::core::subscriptions::{self, SubscriptionAudit};
use crate::core::{
    BudgetAllocation, IncomeResult, LoanInputs, LoanResult, Recommendation, SpendingGuides,
    TaxInputs, TaxResult, TermComparisonRow, income, tax,
};
use crate::store;

mod budgets;

const DEFAULT_AUTO_TERM_MONTHS: u32 = 60;
const MAX_AUTO_TERM_MONTHS: u32 = 84;
const MAX_LOAN_TERM_MONTHS: u32 = 480;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub merchants: Arc<MerchantMatcher>,
}

impl AppState {
    pub fn new(db: SqlitePool) -> crate::Result<Self> {
        Ok(Self {
            db,
            merchants: Arc::new(MerchantMatcher::new()?),
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/loan", get(loan_get_handler).post(loan_post_handler))
        .route("/api/auto/affordability", post(affordability_handler))
        .route("/api/tax", get(tax_get_handler).post(tax_post_handler))
        .route("/api/income/project", post(income_handler))
        .route("/api/budget/recommendations", post(recommendations_handler))
        .route("/api/subscriptions/audit", post(subscriptions_handler))
        .route("/api/transactions/categorize", post(categorize_handler))
        .route("/api/budget/save", post(budgets::save_handler))
        .route("/api/budget/latest", get(budgets::latest_handler))
        .route("/api/budget/history", get(budgets::history_handler))
        .route(
            "/api/budget/:id",
            get(budgets::find_handler)
                .put(budgets::update_handler)
                .delete(budgets::delete_handler),
        )
        .route(
            "/api/budget/:id/recommendations",
            get(budgets::recommendations_handler),
        )
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_http_server(args: &ServeArgs) -> crate::Result<()> {
    let addr = args.socket_addr()?;
    let db = store::connect(&args.database_url).await?;
    let app = build_router(AppState::new(db)?);

    let listener = TcpListener::bind(addr).await?;
    info!("takehome HTTP API listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => {
            warn!("Cannot listen for Ctrl+C, running until killed: {e}");
            std::future::pending::<()>().await;
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LoanPayload {
    principal: Option<f64>,
    annual_rate_percent: Option<f64>,
    term_months: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoanResponse {
    principal: f64,
    annual_rate_percent: f64,
    term_months: u32,
    #[serde(flatten)]
    result: LoanResult,
    term_comparison: Vec<TermComparisonRow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AffordabilityPayload {
    monthly_gross_income: Option<f64>,
    monthly_net_income: Option<f64>,
    monthly_payment: Option<f64>,
    fixed_obligations: Option<f64>,
    term_months: Option<u32>,
}

#[derive(Debug)]
struct AffordabilityRequest {
    monthly_gross_income: f64,
    monthly_net_income: Option<f64>,
    monthly_payment: f64,
    fixed_obligations: f64,
    term_months: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AffordabilityResponse {
    approvals: Vec<PaymentApproval>,
    tier_estimates: Vec<TierEstimate>,
    verdict: AffordabilityVerdict,
    income_drop: IncomeDropScenario,
    spending_guides: SpendingGuides,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TaxPayload {
    gross_annual_income: Option<f64>,
    state_rate_percent: Option<f64>,
    retirement_contribution_percent: Option<f64>,
    monthly_health_premium: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TaxResponse {
    #[serde(flatten)]
    result: TaxResult,
    allocation: BudgetAllocation,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct IncomePayload {
    start_date: Option<NaiveDate>,
    as_of_date: Option<NaiveDate>,
    ytd_gross_income: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IncomeResponse {
    effective_start_date: NaiveDate,
    as_of_date: NaiveDate,
    #[serde(flatten)]
    projection: IncomeResult,
    spending_guides: SpendingGuides,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RecommendationsPayload {
    spending: Option<SpendingBreakdown>,
    monthly_income: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecommendationsResponse {
    monthly_income: f64,
    total_spending: f64,
    recommendations: Vec<Recommendation>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SubscriptionsPayload {
    selected_subscriptions: Option<BTreeSet<SubscriptionId>>,
    custom_sub_amounts: Option<BTreeMap<SubscriptionCategory, f64>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CategorizePayload {
    merchant: Option<String>,
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn loan_get_handler(query: Result<Query<LoanPayload>, QueryRejection>) -> Response {
    match query {
        Ok(Query(payload)) => loan_handler_impl(payload),
        Err(rejection) => bad_request(&rejection.body_text()),
    }
}

async fn loan_post_handler(body: Result<Json<LoanPayload>, JsonRejection>) -> Response {
    match read_json(body) {
        Ok(payload) => loan_handler_impl(payload),
        Err(response) => response,
    }
}

fn loan_handler_impl(payload: LoanPayload) -> Response {
    let inputs = match loan_inputs_from_payload(payload) {
        Ok(inputs) => inputs,
        Err(msg) => return bad_request(&msg),
    };

    let response = LoanResponse {
        principal: inputs.principal,
        annual_rate_percent: inputs.annual_rate_percent,
        term_months: inputs.term_months,
        result: amortization::loan_result(&inputs),
        term_comparison: amortization::term_comparison(
            inputs.principal,
            inputs.annual_rate_percent,
            &DEFAULT_COMPARISON_TERMS,
        ),
    };
    json_response(StatusCode::OK, response)
}

async fn affordability_handler(
    body: Result<Json<AffordabilityPayload>, JsonRejection>,
) -> Response {
    let request = match read_json(body).and_then(|payload| {
        affordability_request_from_payload(payload).map_err(|msg| bad_request(&msg))
    }) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let response = AffordabilityResponse {
        approvals: amortization::payment_approvals(request.monthly_gross_income),
        tier_estimates: amortization::estimates_by_tier(
            request.monthly_payment,
            request.term_months,
        ),
        verdict: amortization::affordability_verdict(
            request.monthly_payment,
            request.monthly_gross_income,
            request.fixed_obligations,
            request.monthly_net_income,
        ),
        income_drop: amortization::income_drop_scenario(
            request.monthly_payment,
            request.monthly_gross_income,
            request.fixed_obligations,
            request.monthly_net_income,
        ),
        spending_guides: income::spending_guides(request.monthly_gross_income),
    };
    json_response(StatusCode::OK, response)
}

async fn tax_get_handler(query: Result<Query<TaxPayload>, QueryRejection>) -> Response {
    match query {
        Ok(Query(payload)) => tax_handler_impl(payload),
        Err(rejection) => bad_request(&rejection.body_text()),
    }
}

async fn tax_post_handler(body: Result<Json<TaxPayload>, JsonRejection>) -> Response {
    match read_json(body) {
        Ok(payload) => tax_handler_impl(payload),
        Err(response) => response,
    }
}

fn tax_handler_impl(payload: TaxPayload) -> Response {
    let inputs = match tax_inputs_from_payload(payload) {
        Ok(inputs) => inputs,
        Err(msg) => return bad_request(&msg),
    };

    let result = tax::estimate_take_home(&inputs);
    let response = TaxResponse {
        allocation: tax::budget_allocation(result.net_monthly),
        result,
    };
    json_response(StatusCode::OK, response)
}

async fn income_handler(body: Result<Json<IncomePayload>, JsonRejection>) -> Response {
    let payload = match read_json(body) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    let Some(start) = payload.start_date else {
        return bad_request("startDate is required");
    };
    let as_of = payload
        .as_of_date
        .unwrap_or_else(|| Utc::now().date_naive());
    let ytd = payload.ytd_gross_income.unwrap_or(0.0);
    if !ytd.is_finite() || ytd < 0.0 {
        return bad_request("ytdGrossIncome must be >= 0");
    }

    let projection = income::project_annual_income(start, as_of, ytd);
    let effective = income::effective_start(start, as_of);
    let (Some(projection), Some(effective_start_date)) = (projection, effective) else {
        return error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Not enough data to project income: asOfDate is before startDate",
        );
    };

    let response = IncomeResponse {
        effective_start_date,
        as_of_date: as_of,
        spending_guides: income::spending_guides(projection.monthly_rate),
        projection,
    };
    json_response(StatusCode::OK, response)
}

async fn recommendations_handler(
    body: Result<Json<RecommendationsPayload>, JsonRejection>,
) -> Response {
    let payload = match read_json(body) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    let spending = payload.spending.unwrap_or_default();
    let monthly_income = payload.monthly_income.unwrap_or(0.0);
    if !monthly_income.is_finite() || monthly_income < 0.0 {
        return bad_request("monthlyIncome must be >= 0");
    }

    let response = RecommendationsResponse {
        monthly_income,
        total_spending: spending.total(),
        recommendations: budget::evaluate(&spending, monthly_income),
    };
    json_response(StatusCode::OK, response)
}

async fn subscriptions_handler(
    body: Result<Json<SubscriptionsPayload>, JsonRejection>,
) -> Response {
    let payload = match read_json(body) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    let selected = payload.selected_subscriptions.unwrap_or_default();
    let custom = payload.custom_sub_amounts.unwrap_or_default();
    let audit: SubscriptionAudit = subscriptions::audit(&selected, &custom);
    json_response(StatusCode::OK, audit)
}

async fn categorize_handler(
    State(state): State<AppState>,
    body: Result<Json<CategorizePayload>, JsonRejection>,
) -> Response {
    let payload = match read_json(body) {
        Ok(payload) => payload,
        Err(response) => return response,
    };
    let category: MerchantCategory = state.merchants.categorize(payload.merchant.as_deref());
    json_response(StatusCode::OK, category)
}

fn non_negative(value: Option<f64>, field: &str) -> Result<f64, String> {
    let value = value.unwrap_or(0.0);
    if !value.is_finite() || value < 0.0 {
        return Err(format!("{field} must be >= 0"));
    }
    Ok(value)
}

fn percent(value: Option<f64>, field: &str) -> Result<f64, String> {
    let value = non_negative(value, field)?;
    if value > 100.0 {
        return Err(format!("{field} must be between 0 and 100"));
    }
    Ok(value)
}

fn loan_inputs_from_payload(payload: LoanPayload) -> Result<LoanInputs, String> {
    let principal = non_negative(payload.principal, "principal")?;
    let annual_rate_percent = percent(payload.annual_rate_percent, "annualRatePercent")?;
    let term_months = payload.term_months.unwrap_or(0);
    if term_months == 0 {
        return Err("termMonths must be > 0".to_string());
    }
    if term_months > MAX_LOAN_TERM_MONTHS {
        return Err(format!("termMonths must be <= {MAX_LOAN_TERM_MONTHS}"));
    }

    Ok(LoanInputs {
        principal,
        annual_rate_percent,
        term_months,
    })
}

fn affordability_request_from_payload(
    payload: AffordabilityPayload,
) -> Result<AffordabilityRequest, String> {
    let monthly_gross_income = non_negative(payload.monthly_gross_income, "monthlyGrossIncome")?;
    if monthly_gross_income == 0.0 {
        return Err("monthlyGrossIncome must be > 0".to_string());
    }
    let monthly_net_income = match payload.monthly_net_income {
        Some(net) => Some(non_negative(Some(net), "monthlyNetIncome")?),
        None => None,
    };
    let term_months = payload.term_months.unwrap_or(DEFAULT_AUTO_TERM_MONTHS);
    if term_months == 0 || term_months > MAX_AUTO_TERM_MONTHS {
        return Err(format!("termMonths must be between 1 and {MAX_AUTO_TERM_MONTHS}"));
    }

    Ok(AffordabilityRequest {
        monthly_gross_income,
        monthly_net_income,
        monthly_payment: non_negative(payload.monthly_payment, "monthlyPayment")?,
        fixed_obligations: non_negative(payload.fixed_obligations, "fixedObligations")?,
        term_months,
    })
}

fn tax_inputs_from_payload(payload: TaxPayload) -> Result<TaxInputs, String> {
    Ok(TaxInputs {
        gross_annual_income: non_negative(payload.gross_annual_income, "grossAnnualIncome")?,
        state_rate_percent: percent(payload.state_rate_percent, "stateRatePercent")?,
        retirement_contribution_percent: percent(
            payload.retirement_contribution_percent,
            "retirementContributionPercent",
        )?,
        monthly_health_premium: non_negative(
            payload.monthly_health_premium,
            "monthlyHealthPremium",
        )?,
    })
}

fn read_json<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    body.map(|Json(payload)| payload).map_err(|rejection| {
        bad_request(&format!("Invalid JSON payload: {}", rejection.body_text()))
    })
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

pub(crate) fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

fn bad_request(msg: &str) -> Response {
    error_response(StatusCode::BAD_REQUEST, msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loan_payload(json: &str) -> Result<LoanInputs, String> {
        let payload = serde_json::from_str::<LoanPayload>(json)
            .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
        loan_inputs_from_payload(payload)
    }

    #[test]
    fn loan_payload_parses_web_keys() {
        let inputs =
            loan_payload(r#"{"principal": 25000, "annualRatePercent": 6, "termMonths": 60}"#)
                .expect("valid payload");
        assert_eq!(inputs.principal, 25_000.0);
        assert_eq!(inputs.annual_rate_percent, 6.0);
        assert_eq!(inputs.term_months, 60);
    }

    #[test]
    fn loan_payload_rejects_zero_term_and_negative_principal() {
        let err = loan_payload(r#"{"principal": 1000, "annualRatePercent": 5}"#)
            .expect_err("missing term");
        assert!(err.contains("termMonths"));

        let err = loan_payload(r#"{"principal": -1, "termMonths": 12}"#)
            .expect_err("negative principal");
        assert!(err.contains("principal"));
    }

    #[test]
    fn missing_numbers_default_to_zero() {
        let inputs = loan_payload(r#"{"termMonths": 12}"#).expect("valid payload");
        assert_eq!(inputs.principal, 0.0);
        assert_eq!(inputs.annual_rate_percent, 0.0);

        let taxes = tax_inputs_from_payload(TaxPayload::default()).expect("valid payload");
        assert_eq!(taxes.gross_annual_income, 0.0);
        assert_eq!(taxes.monthly_health_premium, 0.0);
    }

    #[test]
    fn tax_payload_rejects_out_of_range_rates() {
        let payload = TaxPayload {
            gross_annual_income: Some(50_000.0),
            state_rate_percent: Some(120.0),
            ..TaxPayload::default()
        };
        let err = tax_inputs_from_payload(payload).expect_err("rate too high");
        assert!(err.contains("stateRatePercent"));
    }

    #[test]
    fn affordability_defaults_term_and_requires_income() {
        let request = affordability_request_from_payload(AffordabilityPayload {
            monthly_gross_income: Some(6_000.0),
            monthly_payment: Some(450.0),
            ..AffordabilityPayload::default()
        })
        .expect("valid payload");
        assert_eq!(request.term_months, DEFAULT_AUTO_TERM_MONTHS);
        assert!(request.monthly_net_income.is_none());

        let err = affordability_request_from_payload(AffordabilityPayload::default())
            .expect_err("no income");
        assert!(err.contains("monthlyGrossIncome"));
    }

    #[test]
    fn terms_are_capped() {
        let err = loan_payload(r#"{"annualRatePercent": 100, "termMonths": 4000000000}"#)
            .expect_err("term too long");
        assert!(err.contains("termMonths"));
        let inputs =
            loan_payload(r#"{"principal": 25000, "annualRatePercent": 100, "termMonths": 480}"#)
                .expect("longest allowed term");
        assert!(amortization::loan_result(&inputs).monthly_payment.is_finite());

        let err = affordability_request_from_payload(AffordabilityPayload {
            monthly_gross_income: Some(6_000.0),
            term_months: Some(96),
            ..AffordabilityPayload::default()
        })
        .expect_err("auto term too long");
        assert!(err.contains("84"));
    }

    #[test]
    fn tax_response_flattens_result_next_to_allocation() {
        let result = tax::estimate_take_home(&TaxInputs {
            gross_annual_income: 60_000.0,
            state_rate_percent: 4.0,
            retirement_contribution_percent: 0.0,
            monthly_health_premium: 0.0,
        });
        let response = TaxResponse {
            allocation: tax::budget_allocation(result.net_monthly),
            result,
        };
        let json = serde_json::to_value(&response).expect("serialize");
        assert!(json.get("federalTax").is_some());
        assert!(json.get("effectiveTaxRate").is_some());
        assert!(json["allocation"]["needs"].get("weekly").is_some());
    }
}
