use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use hrportal_core::DepartmentId;
use hrportal_organization::{Department, DepartmentInput, DepartmentSpec};

use crate::app::dto::{self, DepartmentView, JsonBody};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::services::AppServices;
use crate::authz::AdminOnly;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_departments).post(create_department))
        .route("/:id", get(get_department).put(update_department).delete(delete_department))
}

async fn with_posts(services: &AppServices, department: Department) -> ApiResult<DepartmentView> {
    let posts = services.store.list_posts_by_department(department.id).await?;
    Ok(DepartmentView { department, posts })
}

pub async fn list_departments(
    Extension(services): Extension<Arc<AppServices>>,
    AdminOnly(_): AdminOnly,
) -> ApiResult<impl IntoResponse> {
    let mut views = Vec::new();
    for department in services.store.list_departments().await? {
        views.push(with_posts(&services, department).await?);
    }
    Ok(Json(views))
}

pub async fn create_department(
    Extension(services): Extension<Arc<AppServices>>,
    AdminOnly(_): AdminOnly,
    JsonBody(body): JsonBody<DepartmentInput>,
) -> ApiResult<impl IntoResponse> {
    let spec = DepartmentSpec::try_from(body)?;
    let department = services.store.create_department(spec).await?;
    tracing::info!(department_id = %department.id, "department created");
    Ok((StatusCode::CREATED, Json(department)))
}

pub async fn get_department(
    Extension(services): Extension<Arc<AppServices>>,
    AdminOnly(_): AdminOnly,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id: DepartmentId = dto::parse_id(&id)?;
    let department = services
        .store
        .get_department(id)
        .await?
        .ok_or_else(|| ApiError::not_found("department"))?;
    Ok(Json(with_posts(&services, department).await?))
}

pub async fn update_department(
    Extension(services): Extension<Arc<AppServices>>,
    AdminOnly(_): AdminOnly,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<DepartmentInput>,
) -> ApiResult<impl IntoResponse> {
    let id: DepartmentId = dto::parse_id(&id)?;
    let spec = DepartmentSpec::try_from(body)?;
    Ok(Json(services.store.update_department(id, spec).await?))
}

pub async fn delete_department(
    Extension(services): Extension<Arc<AppServices>>,
    AdminOnly(_): AdminOnly,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id: DepartmentId = dto::parse_id(&id)?;
    services.store.delete_department(id).await?;
    tracing::info!(department_id = %id, "department deleted");
    Ok(dto::message("department deleted"))
}
