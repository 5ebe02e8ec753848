use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};

use hrportal_auth::{AuthzError, PrincipalKind};
use hrportal_core::SalaryId;
use hrportal_payroll::{RecordSalary, SalaryInput};

use crate::app::dto::{self, JsonBody};
use crate::app::errors::ApiResult;
use crate::app::services::AppServices;
use crate::authz::{AdminOnly, Authenticated};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_salaries).post(create_salary))
        .route("/me", get(my_salaries))
        .route("/:id", put(update_salary).delete(delete_salary))
}

pub async fn list_salaries(
    Extension(services): Extension<Arc<AppServices>>,
    AdminOnly(_): AdminOnly,
) -> ApiResult<impl IntoResponse> {
    let salaries = services.store.list_salaries().await?;
    Ok(Json(services.salary_views(salaries).await?))
}

pub async fn create_salary(
    Extension(services): Extension<Arc<AppServices>>,
    AdminOnly(_): AdminOnly,
    JsonBody(body): JsonBody<SalaryInput>,
) -> ApiResult<impl IntoResponse> {
    let cmd = RecordSalary::try_from(body)?;
    let salary = services.store.create_salary(cmd).await?;
    tracing::info!(salary_id = %salary.id, employee_id = %salary.employee_id, "salary recorded");
    Ok((StatusCode::CREATED, Json(salary)))
}

pub async fn update_salary(
    Extension(services): Extension<Arc<AppServices>>,
    AdminOnly(_): AdminOnly,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<SalaryInput>,
) -> ApiResult<impl IntoResponse> {
    let id: SalaryId = dto::parse_id(&id)?;
    let cmd = RecordSalary::try_from(body)?;
    Ok(Json(services.store.update_salary(id, cmd).await?))
}

pub async fn delete_salary(
    Extension(services): Extension<Arc<AppServices>>,
    AdminOnly(_): AdminOnly,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id: SalaryId = dto::parse_id(&id)?;
    services.store.delete_salary(id).await?;
    Ok(dto::message("salary deleted"))
}

/// Salaries of the calling employee (admins included).
pub async fn my_salaries(
    Extension(services): Extension<Arc<AppServices>>,
    Authenticated(principal): Authenticated,
) -> ApiResult<impl IntoResponse> {
    let employee_id = principal
        .employee_id()
        .ok_or(AuthzError::WrongKind(PrincipalKind::Employee))?;
    let salaries = services.store.list_salaries_for_employee(employee_id).await?;
    Ok(Json(services.salary_views(salaries).await?))
}
