//! Leave request lifecycle over HTTP.
//!
//! Two creation paths share one admission step in the store:
//! - `POST /leaveRequests` (admin) names any employee and may preset a status
//! - `POST /employerequest` (employee) always files for the caller, PENDING

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;

use hrportal_auth::require_employee;
use hrportal_core::LeaveRequestId;
use hrportal_infra::{StoreError, StoreResult};
use hrportal_leave::{
    AdminLeaveRequestInput, CreateLeaveRequest, LeaveRequest, SelfServiceLeaveInput, UpdateLeaveRequest,
};

use crate::app::dto::{self, JsonBody};
use crate::app::errors::ApiResult;
use crate::app::services::{self, AppServices};
use crate::authz::{AdminOnly, Authenticated};

const ADMIN_SELF_SERVICE: &str = "admins cannot create leave requests";
const ADMIN_SELF_LISTING: &str = "admins have no personal leave requests";

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_leave_requests).post(create_leave_request))
        .route("/me", get(list_my_leave_requests))
        .route("/:id", put(update_leave_request).delete(delete_leave_request))
}

/// Employee self-service under `/employerequest`.
pub fn self_service_router() -> Router {
    Router::new()
        .route("/", axum::routing::post(request_leave))
        .route("/me", get(list_my_leave_requests))
}

/// Run admission and log the outcome.
async fn admit(services: &AppServices, cmd: CreateLeaveRequest) -> StoreResult<LeaveRequest> {
    let employee_id = cmd.employee_id;
    let result = services
        .store
        .create_leave_request(cmd, services::today(), Utc::now())
        .await;

    match &result {
        Ok(request) => tracing::info!(
            leave_request_id = %request.id,
            employee_id = %employee_id,
            status = request.status.as_str(),
            "leave request admitted"
        ),
        Err(StoreError::Domain(reason)) => {
            tracing::info!(employee_id = %employee_id, reason = %reason, "leave request refused")
        }
        Err(_) => {}
    }
    result
}

pub async fn create_leave_request(
    Extension(services): Extension<Arc<AppServices>>,
    AdminOnly(_): AdminOnly,
    JsonBody(body): JsonBody<AdminLeaveRequestInput>,
) -> ApiResult<impl IntoResponse> {
    let cmd = CreateLeaveRequest::from_admin(body)?;
    let request = admit(&services, cmd).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn request_leave(
    Extension(services): Extension<Arc<AppServices>>,
    Authenticated(principal): Authenticated,
    JsonBody(body): JsonBody<SelfServiceLeaveInput>,
) -> ApiResult<impl IntoResponse> {
    let employee_id = require_employee(&principal, ADMIN_SELF_SERVICE)?;
    let cmd = CreateLeaveRequest::from_self_service(employee_id, body)?;
    let request = admit(&services, cmd).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn list_leave_requests(
    Extension(services): Extension<Arc<AppServices>>,
    AdminOnly(_): AdminOnly,
) -> ApiResult<impl IntoResponse> {
    let requests = services.store.list_leave_requests().await?;
    Ok(Json(services.leave_request_views(requests, true).await?))
}

pub async fn list_my_leave_requests(
    Extension(services): Extension<Arc<AppServices>>,
    Authenticated(principal): Authenticated,
) -> ApiResult<impl IntoResponse> {
    let employee_id = require_employee(&principal, ADMIN_SELF_LISTING)?;
    let requests = services.store.list_leave_requests_for_employee(employee_id).await?;
    Ok(Json(services.leave_request_views(requests, false).await?))
}

pub async fn update_leave_request(
    Extension(services): Extension<Arc<AppServices>>,
    AdminOnly(admin): AdminOnly,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<AdminLeaveRequestInput>,
) -> ApiResult<impl IntoResponse> {
    let id: LeaveRequestId = dto::parse_id(&id)?;
    let cmd = UpdateLeaveRequest::try_from(body)?;
    let (request, change) = services.store.update_leave_request(id, cmd).await?;

    if change.reopened() {
        tracing::warn!(
            leave_request_id = %id,
            from = change.previous.as_str(),
            to = change.current.as_str(),
            by = admin.raw_id(),
            "decided leave request reopened"
        );
    } else if change.changed() {
        tracing::info!(
            leave_request_id = %id,
            from = change.previous.as_str(),
            to = change.current.as_str(),
            by = admin.raw_id(),
            "leave request status changed"
        );
    }
    Ok(Json(request))
}

pub async fn delete_leave_request(
    Extension(services): Extension<Arc<AppServices>>,
    AdminOnly(_): AdminOnly,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id: LeaveRequestId = dto::parse_id(&id)?;
    services.store.delete_leave_request(id).await?;
    tracing::info!(leave_request_id = %id, "leave request deleted");
    Ok(dto::message("leave request deleted"))
}
