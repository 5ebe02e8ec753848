use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;

use hrportal_auth::{PrincipalKind, require_account, require_self};
use hrportal_content::{CommentInput, CreateComment, UpdateComment};
use hrportal_core::CommentId;

use crate::app::dto::{self, JsonBody};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::services::AppServices;
use crate::authz::{AdminOnly, Authenticated};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_comments).post(create_comment))
        .route("/:id", put(update_comment))
}

pub async fn list_comments(
    Extension(services): Extension<Arc<AppServices>>,
    AdminOnly(_): AdminOnly,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(services.store.list_comments().await?))
}

pub async fn create_comment(
    Extension(services): Extension<Arc<AppServices>>,
    Authenticated(principal): Authenticated,
    JsonBody(body): JsonBody<CommentInput>,
) -> ApiResult<impl IntoResponse> {
    let author = require_account(&principal)?;
    let cmd = CreateComment::try_from(body)?;
    let comment = services.store.create_comment(cmd, author, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// Only the comment's author may edit it; the admin flag does not apply.
pub async fn update_comment(
    Extension(services): Extension<Arc<AppServices>>,
    Authenticated(principal): Authenticated,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<CommentInput>,
) -> ApiResult<impl IntoResponse> {
    let id: CommentId = dto::parse_id(&id)?;
    let comment = services
        .store
        .get_comment(id)
        .await?
        .ok_or_else(|| ApiError::not_found("comment"))?;
    require_self(&principal, PrincipalKind::Account, comment.user_id.get())?;

    let cmd = UpdateComment::try_from(body)?;
    Ok(Json(services.store.update_comment(id, cmd).await?))
}
