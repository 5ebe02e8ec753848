use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use hrportal_auth::{require_account, require_author_or_admin};
use hrportal_content::{Article, ArticleChanges, ArticleInput, ArticleSpec};
use hrportal_core::ArticleId;

use crate::app::dto::{self, JsonBody};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::services::AppServices;
use crate::authz::Authenticated;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_articles).post(create_article))
        .route("/:id", get(get_article).put(update_article).delete(delete_article))
}

async fn load(services: &AppServices, id: ArticleId) -> ApiResult<Article> {
    services
        .store
        .get_article(id)
        .await?
        .ok_or_else(|| ApiError::not_found("article"))
}

pub async fn list_articles(Extension(services): Extension<Arc<AppServices>>) -> ApiResult<impl IntoResponse> {
    let mut views = Vec::new();
    for article in services.store.list_articles().await? {
        views.push(services.article_view(article, false).await?);
    }
    Ok(Json(views))
}

pub async fn get_article(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let article = load(&services, dto::parse_id(&id)?).await?;
    Ok(Json(services.article_view(article, true).await?))
}

pub async fn create_article(
    Extension(services): Extension<Arc<AppServices>>,
    Authenticated(principal): Authenticated,
    JsonBody(body): JsonBody<ArticleInput>,
) -> ApiResult<impl IntoResponse> {
    let author = require_account(&principal)?;
    let spec = ArticleSpec::try_from(body)?;
    let article = services.store.create_article(spec, author, Utc::now()).await?;
    tracing::info!(article_id = %article.id, user_id = %author, "article published");
    Ok((StatusCode::CREATED, Json(article)))
}

pub async fn update_article(
    Extension(services): Extension<Arc<AppServices>>,
    Authenticated(principal): Authenticated,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<ArticleInput>,
) -> ApiResult<impl IntoResponse> {
    let article = load(&services, dto::parse_id(&id)?).await?;
    require_author_or_admin(&principal, article.user_id)?;

    let changes = ArticleChanges::try_from(body)?;
    Ok(Json(services.store.update_article(article.id, changes).await?))
}

pub async fn delete_article(
    Extension(services): Extension<Arc<AppServices>>,
    Authenticated(principal): Authenticated,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let article = load(&services, dto::parse_id(&id)?).await?;
    require_author_or_admin(&principal, article.user_id)?;

    services.store.delete_article(article.id).await?;
    tracing::info!(article_id = %article.id, by = principal.raw_id(), "article deleted");
    Ok(dto::message("article deleted"))
}
