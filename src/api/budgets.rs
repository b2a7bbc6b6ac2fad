//! Saved budgets. Every route is scoped to the caller named in `x-user-id`;
//! authentication happens upstream.

use std::collections::{BTreeMap, BTreeSet};

use axum::{
    extract::{Json, Path, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AppState, error_response, json_response, read_json};
use crate::core::Recommendation;
use crate::core::catalog::{
    ExpenseCategory, FrequencyAnswer, FrequencyQuestion, SubscriptionCategory, SubscriptionId,
};
use crate::store::snapshots;
use crate::store::{BudgetContents, BudgetSnapshot};

pub const USER_HEADER: &str = "x-user-id";

type HandlerResult = Result<Response, Response>;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(super) struct BudgetPayload {
    name: Option<String>,
    fixed_expenses: Option<BTreeMap<ExpenseCategory, f64>>,
    frequency_data: Option<BTreeMap<FrequencyQuestion, FrequencyAnswer>>,
    selected_subscriptions: Option<BTreeSet<SubscriptionId>>,
    custom_sub_amounts: Option<BTreeMap<SubscriptionCategory, f64>>,
    monthly_income: Option<f64>,
}

#[derive(Debug, Serialize)]
struct SaveResponse {
    success: bool,
    id: Uuid,
}

#[derive(Debug, Serialize)]
struct UpdateResponse {
    success: bool,
    budget: BudgetSnapshot,
}

#[derive(Debug, Serialize)]
struct DeleteResponse {
    success: bool,
}

#[derive(Debug, Serialize)]
struct LatestResponse {
    budget: Option<BudgetSnapshot>,
}

#[derive(Debug, Serialize)]
struct HistoryResponse {
    snapshots: Vec<BudgetSnapshot>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotRecommendationsResponse {
    budget_id: Uuid,
    monthly_income: f64,
    recommendations: Vec<Recommendation>,
}

fn user_id(headers: &HeaderMap) -> Result<String, Response> {
    headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| error_response(StatusCode::UNAUTHORIZED, "Authentication required"))
}

/// Ids that do not parse cannot name a stored budget.
fn budget_id(raw: &str) -> Result<Uuid, Response> {
    Uuid::parse_str(raw).map_err(|_| budget_not_found())
}

fn budget_not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Budget not found")
}

fn contents_from_payload(
    payload: BudgetPayload,
) -> Result<(Option<String>, BudgetContents), String> {
    let (Some(fixed_expenses), Some(frequency_data), Some(monthly_income)) = (
        payload.fixed_expenses,
        payload.frequency_data,
        payload.monthly_income,
    ) else {
        return Err(
            "Missing required fields: fixedExpenses, frequencyData and monthlyIncome".to_string(),
        );
    };
    if !monthly_income.is_finite() || monthly_income <= 0.0 {
        return Err("monthlyIncome must be > 0".to_string());
    }

    let name = payload
        .name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty());
    let contents = BudgetContents {
        fixed_expenses,
        frequency_data,
        selected_subscriptions: payload.selected_subscriptions.unwrap_or_default(),
        custom_sub_amounts: payload.custom_sub_amounts.unwrap_or_default(),
        monthly_income,
    };
    Ok((name, contents))
}

fn parse_budget_body(
    body: Result<Json<BudgetPayload>, JsonRejection>,
) -> Result<(Option<String>, BudgetContents), Response> {
    let payload = read_json(body)?;
    contents_from_payload(payload).map_err(|msg| error_response(StatusCode::BAD_REQUEST, &msg))
}

pub(super) async fn save_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<BudgetPayload>, JsonRejection>,
) -> HandlerResult {
    let user = user_id(&headers)?;
    let (name, contents) = parse_budget_body(body)?;

    let snapshot = snapshots::create(&state.db, &user, name.as_deref(), &contents)
        .await
        .map_err(IntoResponse::into_response)?;
    Ok(json_response(
        StatusCode::OK,
        SaveResponse {
            success: true,
            id: snapshot.id,
        },
    ))
}

pub(super) async fn latest_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> HandlerResult {
    let user = user_id(&headers)?;
    let budget = snapshots::latest(&state.db, &user)
        .await
        .map_err(IntoResponse::into_response)?;
    Ok(json_response(StatusCode::OK, LatestResponse { budget }))
}

pub(super) async fn history_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> HandlerResult {
    let user = user_id(&headers)?;
    let snapshots = snapshots::history(&state.db, &user)
        .await
        .map_err(IntoResponse::into_response)?;
    Ok(json_response(StatusCode::OK, HistoryResponse { snapshots }))
}

async fn load_owned(
    state: &AppState,
    headers: &HeaderMap,
    raw_id: &str,
) -> Result<BudgetSnapshot, Response> {
    let user = user_id(headers)?;
    let id = budget_id(raw_id)?;
    snapshots::find(&state.db, id, &user)
        .await
        .map_err(IntoResponse::into_response)?
        .ok_or_else(budget_not_found)
}

pub(super) async fn find_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> HandlerResult {
    let snapshot = load_owned(&state, &headers, &raw_id).await?;
    Ok(json_response(StatusCode::OK, snapshot))
}

pub(super) async fn update_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
    body: Result<Json<BudgetPayload>, JsonRejection>,
) -> HandlerResult {
    let user = user_id(&headers)?;
    let id = budget_id(&raw_id)?;
    let (_, contents) = parse_budget_body(body)?;

    let budget = snapshots::update(&state.db, id, &user, &contents)
        .await
        .map_err(IntoResponse::into_response)?;
    Ok(json_response(
        StatusCode::OK,
        UpdateResponse {
            success: true,
            budget,
        },
    ))
}

pub(super) async fn delete_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> HandlerResult {
    let user = user_id(&headers)?;
    let id = budget_id(&raw_id)?;
    snapshots::delete(&state.db, id, &user)
        .await
        .map_err(IntoResponse::into_response)?;
    Ok(json_response(StatusCode::OK, DeleteResponse { success: true }))
}

pub(super) async fn recommendations_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> HandlerResult {
    let snapshot = load_owned(&state, &headers, &raw_id).await?;
    let response = SnapshotRecommendationsResponse {
        budget_id: snapshot.id,
        monthly_income: snapshot.contents.monthly_income,
        recommendations: snapshot.contents.recommendations(),
    };
    Ok(json_response(StatusCode::OK, response))
}
