use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use leavedesk::workflows::leave::{
    leave_router, BalanceRepository, EmployeeDirectory, LeaveNotifier, LeaveRequestRepository,
    LeaveWorkflowService,
};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_leave_routes<D, R, B, N>(
    service: Arc<LeaveWorkflowService<D, R, B, N>>,
) -> axum::Router
where
    D: EmployeeDirectory + 'static,
    R: LeaveRequestRepository + 'static,
    B: BalanceRepository + 'static,
    N: LeaveNotifier + 'static,
{
    leave_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{build_service, sample_directory};
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn response_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let (service, _notifier) =
            build_service(Arc::new(sample_directory()), 2024).expect("service builds");
        let app = with_leave_routes(service);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn sample_directory_serves_leave_requests() {
        let (service, _notifier) =
            build_service(Arc::new(sample_directory()), 2024).expect("service builds");
        let app = with_leave_routes(service);

        let payload = json!({
            "employee_id": "emp-300",
            "leave_type": "vacation",
            "start_date": "2024-06-10",
            "end_date": "2024-06-12",
            "today": "2024-06-03"
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/leave/requests")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = response_json(response).await;
        assert_eq!(body["status"], "pending");
        assert_eq!(body["total_days"], 3.0);
    }
}
