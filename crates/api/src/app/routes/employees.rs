use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use hrportal_auth::{PrincipalKind, hash_password, require_self};
use hrportal_core::EmployeeId;
use hrportal_directory::{CreateEmployee, EmployeeInput, ProfileInput, UpdateEmployee};

use crate::app::dto::{self, JsonBody};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::services::AppServices;
use crate::authz::{AdminOnly, Authenticated};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_employees).post(create_employee))
        .route("/:id", get(get_employee).put(update_employee).delete(delete_employee))
        .route("/:id/profile", get(get_profile).put(update_profile))
}

pub async fn list_employees(
    Extension(services): Extension<Arc<AppServices>>,
    AdminOnly(_): AdminOnly,
) -> ApiResult<impl IntoResponse> {
    let mut views = Vec::new();
    for employee in services.store.list_employees().await? {
        views.push(services.employee_view(employee, false).await?);
    }
    Ok(Json(views))
}

pub async fn create_employee(
    Extension(services): Extension<Arc<AppServices>>,
    AdminOnly(admin): AdminOnly,
    JsonBody(body): JsonBody<EmployeeInput>,
) -> ApiResult<impl IntoResponse> {
    let cmd = CreateEmployee::try_from(body)?;
    let hash = hash_password(&cmd.password)?;
    let employee = services
        .store
        .create_employee(cmd.with_password_hash(hash), Utc::now())
        .await?;

    tracing::info!(employee_id = %employee.id, by = admin.raw_id(), "employee created");
    Ok((StatusCode::CREATED, Json(employee)))
}

pub async fn get_employee(
    Extension(services): Extension<Arc<AppServices>>,
    AdminOnly(_): AdminOnly,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id: EmployeeId = dto::parse_id(&id)?;
    let employee = services
        .store
        .get_employee(id)
        .await?
        .ok_or_else(|| ApiError::not_found("employee"))?;
    Ok(Json(services.employee_view(employee, true).await?))
}

pub async fn update_employee(
    Extension(services): Extension<Arc<AppServices>>,
    AdminOnly(_): AdminOnly,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<EmployeeInput>,
) -> ApiResult<impl IntoResponse> {
    let id: EmployeeId = dto::parse_id(&id)?;
    let cmd = UpdateEmployee::try_from(body)?;
    apply_update(&services, id, cmd).await
}

pub async fn delete_employee(
    Extension(services): Extension<Arc<AppServices>>,
    AdminOnly(admin): AdminOnly,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id: EmployeeId = dto::parse_id(&id)?;
    services.store.delete_employee(id).await?;
    tracing::info!(employee_id = %id, by = admin.raw_id(), "employee deleted");
    Ok(dto::message("employee deleted"))
}

/// The caller's own directory record.
pub async fn get_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Authenticated(principal): Authenticated,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id: EmployeeId = dto::parse_id(&id)?;
    require_self(&principal, PrincipalKind::Employee, id.get())?;

    let employee = services
        .store
        .get_employee(id)
        .await?
        .ok_or_else(|| ApiError::not_found("employee"))?;
    Ok(Json(services.employee_view(employee, false).await?))
}

/// Owner edits: contact details and password only.
pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Authenticated(principal): Authenticated,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<ProfileInput>,
) -> ApiResult<impl IntoResponse> {
    let id: EmployeeId = dto::parse_id(&id)?;
    require_self(&principal, PrincipalKind::Employee, id.get())?;

    let cmd = UpdateEmployee::try_from(body)?;
    apply_update(&services, id, cmd).await
}

async fn apply_update(
    services: &AppServices,
    id: EmployeeId,
    cmd: UpdateEmployee,
) -> ApiResult<Json<hrportal_directory::Employee>> {
    let hash = cmd.password.as_deref().map(hash_password).transpose()?;
    let employee = services.store.update_employee(id, cmd.with_password_hash(hash)).await?;
    tracing::info!(employee_id = %employee.id, "employee updated");
    Ok(Json(employee))
}
