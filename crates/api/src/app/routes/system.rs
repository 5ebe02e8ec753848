use axum::{http::StatusCode, response::IntoResponse, Json};

use crate::authz::Authenticated;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Authenticated(principal): Authenticated) -> impl IntoResponse {
    Json(serde_json::json!({
        "id": principal.raw_id(),
        "kind": principal.kind(),
        "email": principal.email(),
        "name": principal.name(),
        "isAdmin": principal.is_admin(),
    }))
}
