use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use hrportal_core::LeaveTypeId;
use hrportal_leave::{LeaveType, LeaveTypeInput, LeaveTypeSpec};

use crate::app::dto::{self, JsonBody, LeaveTypeView};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::services::AppServices;
use crate::authz::AdminOnly;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_leave_types).post(create_leave_type))
        .route("/:id", get(get_leave_type).put(update_leave_type).delete(delete_leave_type))
}

async fn with_requests(services: &AppServices, leave_type: LeaveType) -> ApiResult<LeaveTypeView> {
    let leave_requests = services.store.list_leave_requests_for_type(leave_type.id).await?;
    Ok(LeaveTypeView { leave_type, leave_requests })
}

/// Public catalogue of leave types.
pub async fn list_leave_types(Extension(services): Extension<Arc<AppServices>>) -> ApiResult<impl IntoResponse> {
    let mut views = Vec::new();
    for leave_type in services.store.list_leave_types().await? {
        views.push(with_requests(&services, leave_type).await?);
    }
    Ok(Json(views))
}

pub async fn create_leave_type(
    Extension(services): Extension<Arc<AppServices>>,
    AdminOnly(_): AdminOnly,
    JsonBody(body): JsonBody<LeaveTypeInput>,
) -> ApiResult<impl IntoResponse> {
    let spec = LeaveTypeSpec::try_from(body)?;
    let leave_type = services.store.create_leave_type(spec).await?;
    tracing::info!(leave_type_id = %leave_type.id, name = %leave_type.name, "leave type created");
    Ok((StatusCode::CREATED, Json(leave_type)))
}

pub async fn get_leave_type(
    Extension(services): Extension<Arc<AppServices>>,
    AdminOnly(_): AdminOnly,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id: LeaveTypeId = dto::parse_id(&id)?;
    let leave_type = services
        .store
        .get_leave_type(id)
        .await?
        .ok_or_else(|| ApiError::not_found("leave type"))?;
    Ok(Json(with_requests(&services, leave_type).await?))
}

pub async fn update_leave_type(
    Extension(services): Extension<Arc<AppServices>>,
    AdminOnly(_): AdminOnly,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<LeaveTypeInput>,
) -> ApiResult<impl IntoResponse> {
    let id: LeaveTypeId = dto::parse_id(&id)?;
    let spec = LeaveTypeSpec::try_from(body)?;
    Ok(Json(services.store.update_leave_type(id, spec).await?))
}

pub async fn delete_leave_type(
    Extension(services): Extension<Arc<AppServices>>,
    AdminOnly(_): AdminOnly,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id: LeaveTypeId = dto::parse_id(&id)?;
    services.store.delete_leave_type(id).await?;
    tracing::info!(leave_type_id = %id, "leave type deleted");
    Ok(dto::message("leave type deleted"))
}
