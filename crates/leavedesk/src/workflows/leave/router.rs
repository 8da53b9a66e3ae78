use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use super::directory::EmployeeDirectory;
use super::domain::{
    DayPortion, EmployeeId, FaultKind, LeaveApplication, LeaveRequestId, LeaveType,
};
use super::repository::{BalanceRepository, LeaveNotifier, LeaveRequestRepository};
use super::service::{LeaveOutcome, LeaveServiceError, LeaveWorkflowService};

/// Router builder exposing the workflow transitions as JSON endpoints.
pub fn leave_router<D, R, B, N>(service: Arc<LeaveWorkflowService<D, R, B, N>>) -> Router
where
    D: EmployeeDirectory + 'static,
    R: LeaveRequestRepository + 'static,
    B: BalanceRepository + 'static,
    N: LeaveNotifier + 'static,
{
    Router::new()
        .route("/api/v1/leave/requests", post(apply_handler::<D, R, B, N>))
        .route(
            "/api/v1/leave/requests/:request_id",
            get(fetch_handler::<D, R, B, N>),
        )
        .route(
            "/api/v1/leave/requests/:request_id/approve",
            post(approve_handler::<D, R, B, N>),
        )
        .route(
            "/api/v1/leave/requests/:request_id/reject",
            post(reject_handler::<D, R, B, N>),
        )
        .route(
            "/api/v1/leave/requests/:request_id/cancel",
            post(cancel_handler::<D, R, B, N>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApplyRequest {
    pub(crate) employee_id: String,
    pub(crate) leave_type: LeaveType,
    pub(crate) start_date: NaiveDate,
    pub(crate) end_date: NaiveDate,
    #[serde(default)]
    pub(crate) portion: DayPortion,
    #[serde(default)]
    pub(crate) emergency: bool,
    /// Overrides the clock, mainly for demos and tests.
    #[serde(default)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApproveRequest {
    pub(crate) approver_id: String,
    #[serde(default)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RejectRequest {
    pub(crate) approver_id: String,
    pub(crate) reason: String,
    #[serde(default)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CancelRequest {
    pub(crate) employee_id: String,
}

pub(crate) async fn apply_handler<D, R, B, N>(
    State(service): State<Arc<LeaveWorkflowService<D, R, B, N>>>,
    axum::Json(payload): axum::Json<ApplyRequest>,
) -> Response
where
    D: EmployeeDirectory + 'static,
    R: LeaveRequestRepository + 'static,
    B: BalanceRepository + 'static,
    N: LeaveNotifier + 'static,
{
    let today = payload.today.unwrap_or_else(|| Local::now().date_naive());
    let application = LeaveApplication {
        employee_id: EmployeeId(payload.employee_id),
        leave_type: payload.leave_type,
        start_date: payload.start_date,
        end_date: payload.end_date,
        portion: payload.portion,
        emergency: payload.emergency,
        exclude_request_id: None,
    };

    match service.apply(application, today) {
        Ok(outcome) => outcome_response(StatusCode::CREATED, outcome),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn fetch_handler<D, R, B, N>(
    State(service): State<Arc<LeaveWorkflowService<D, R, B, N>>>,
    Path(request_id): Path<String>,
) -> Response
where
    D: EmployeeDirectory + 'static,
    R: LeaveRequestRepository + 'static,
    B: BalanceRepository + 'static,
    N: LeaveNotifier + 'static,
{
    match service.get(&LeaveRequestId(request_id)) {
        Ok(request) => {
            let view = request.status_view(&[]);
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn approve_handler<D, R, B, N>(
    State(service): State<Arc<LeaveWorkflowService<D, R, B, N>>>,
    Path(request_id): Path<String>,
    axum::Json(payload): axum::Json<ApproveRequest>,
) -> Response
where
    D: EmployeeDirectory + 'static,
    R: LeaveRequestRepository + 'static,
    B: BalanceRepository + 'static,
    N: LeaveNotifier + 'static,
{
    let today = payload.today.unwrap_or_else(|| Local::now().date_naive());
    match service.approve(
        &LeaveRequestId(request_id),
        &EmployeeId(payload.approver_id),
        today,
    ) {
        Ok(outcome) => outcome_response(StatusCode::OK, outcome),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reject_handler<D, R, B, N>(
    State(service): State<Arc<LeaveWorkflowService<D, R, B, N>>>,
    Path(request_id): Path<String>,
    axum::Json(payload): axum::Json<RejectRequest>,
) -> Response
where
    D: EmployeeDirectory + 'static,
    R: LeaveRequestRepository + 'static,
    B: BalanceRepository + 'static,
    N: LeaveNotifier + 'static,
{
    let today = payload.today.unwrap_or_else(|| Local::now().date_naive());
    match service.reject(
        &LeaveRequestId(request_id),
        &EmployeeId(payload.approver_id),
        &payload.reason,
        today,
    ) {
        Ok(outcome) => outcome_response(StatusCode::OK, outcome),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn cancel_handler<D, R, B, N>(
    State(service): State<Arc<LeaveWorkflowService<D, R, B, N>>>,
    Path(request_id): Path<String>,
    axum::Json(payload): axum::Json<CancelRequest>,
) -> Response
where
    D: EmployeeDirectory + 'static,
    R: LeaveRequestRepository + 'static,
    B: BalanceRepository + 'static,
    N: LeaveNotifier + 'static,
{
    match service.cancel(&LeaveRequestId(request_id), &EmployeeId(payload.employee_id)) {
        Ok(outcome) => outcome_response(StatusCode::OK, outcome),
        Err(error) => error_response(error),
    }
}

fn outcome_response(status: StatusCode, outcome: LeaveOutcome) -> Response {
    let view = outcome.request.status_view(&outcome.warnings);
    (status, axum::Json(view)).into_response()
}

fn error_response(error: LeaveServiceError) -> Response {
    let status = match error.fault() {
        Some(FaultKind::NotFound) => StatusCode::NOT_FOUND,
        Some(FaultKind::Conflict) => StatusCode::CONFLICT,
        Some(FaultKind::Unauthorized) => StatusCode::FORBIDDEN,
        Some(FaultKind::Invalid) => StatusCode::UNPROCESSABLE_ENTITY,
        None => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
