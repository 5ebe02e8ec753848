use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use hrportal_core::PostId;
use hrportal_organization::{Post, PostInput, PostSpec};

use crate::app::dto::{self, DepartmentRef, JsonBody, PostView};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::services::AppServices;
use crate::authz::AdminOnly;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/:id", get(get_post).put(update_post).delete(delete_post))
}

async fn view(services: &AppServices, post: Post, with_employees: bool) -> ApiResult<PostView> {
    let department = services
        .store
        .get_department(post.department_id)
        .await?
        .as_ref()
        .map(DepartmentRef::from);
    let employees = if with_employees {
        Some(services.store.list_employees_by_post(post.id).await?)
    } else {
        None
    };
    Ok(PostView { post, department, employees })
}

pub async fn list_posts(
    Extension(services): Extension<Arc<AppServices>>,
    AdminOnly(_): AdminOnly,
) -> ApiResult<impl IntoResponse> {
    let mut views = Vec::new();
    for post in services.store.list_posts().await? {
        views.push(view(&services, post, false).await?);
    }
    Ok(Json(views))
}

pub async fn create_post(
    Extension(services): Extension<Arc<AppServices>>,
    AdminOnly(_): AdminOnly,
    JsonBody(body): JsonBody<PostInput>,
) -> ApiResult<impl IntoResponse> {
    let spec = PostSpec::try_from(body)?;
    let post = services.store.create_post(spec).await?;
    tracing::info!(post_id = %post.id, department_id = %post.department_id, "post created");
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn get_post(
    Extension(services): Extension<Arc<AppServices>>,
    AdminOnly(_): AdminOnly,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id: PostId = dto::parse_id(&id)?;
    let post = services
        .store
        .get_post(id)
        .await?
        .ok_or_else(|| ApiError::not_found("post"))?;
    Ok(Json(view(&services, post, true).await?))
}

pub async fn update_post(
    Extension(services): Extension<Arc<AppServices>>,
    AdminOnly(_): AdminOnly,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<PostInput>,
) -> ApiResult<impl IntoResponse> {
    let id: PostId = dto::parse_id(&id)?;
    let spec = PostSpec::try_from(body)?;
    Ok(Json(services.store.update_post(id, spec).await?))
}

pub async fn delete_post(
    Extension(services): Extension<Arc<AppServices>>,
    AdminOnly(_): AdminOnly,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id: PostId = dto::parse_id(&id)?;
    services.store.delete_post(id).await?;
    tracing::info!(post_id = %id, "post deleted");
    Ok(dto::message("post deleted"))
}
