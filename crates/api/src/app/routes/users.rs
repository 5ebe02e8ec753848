use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use tower_cookies::Cookies;

use hrportal_auth::{Principal, PrincipalKind, hash_password, require_self, verify_password};
use hrportal_content::{AccountInput, RegisterAccount, UpdateAccount};
use hrportal_core::{UserId, require_text};

use crate::app::dto::{self, AccountResponse, JsonBody, LoginRequest, LoginResponse, SessionUser};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::services::AppServices;
use crate::authz::Authenticated;
use crate::middleware::{clear_session_cookie, session_cookie};

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", get(logout))
        .route("/profile/:id", get(get_profile).put(update_profile).delete(delete_profile))
}

/// Sign a credential for `principal` and set it as the session cookie.
fn start_session(services: &AppServices, cookies: &Cookies, principal: &Principal) -> ApiResult<()> {
    let issued = services.tokens.issue(principal, Utc::now())?;
    let max_age = services.tokens.ttl().num_seconds();
    cookies.add(session_cookie(issued.token, max_age, services.cookie_secure));
    Ok(())
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    cookies: Cookies,
    JsonBody(body): JsonBody<AccountInput>,
) -> ApiResult<impl IntoResponse> {
    let cmd = RegisterAccount::try_from(body)?;
    let hash = hash_password(&cmd.password)?;
    let account = services
        .store
        .create_account(cmd.with_password_hash(hash), Utc::now())
        .await?;

    let principal = Principal::account(account.id, account.is_admin, account.name.clone());
    start_session(&services, &cookies, &principal)?;
    tracing::info!(user_id = %account.id, "account registered");

    Ok((
        StatusCode::CREATED,
        Json(AccountResponse { message: "user registered", user: account }),
    ))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    cookies: Cookies,
    JsonBody(body): JsonBody<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let email = require_text(body.email, "email")?;
    let password = require_text(body.password, "password")?;

    let employee = services.store.find_employee_by_email(&email).await?;
    let verified = match &employee {
        Some(e) => verify_password(&password, &e.password_hash)?,
        None => false,
    };
    let employee = match employee {
        Some(e) if verified => e,
        _ => {
            tracing::warn!(email = %email, "login failed");
            return Err(ApiError::Unauthorized("invalid credentials".into()));
        }
    };

    let principal = Principal::employee(employee.id, employee.is_admin, employee.email.clone(), employee.full_name());
    start_session(&services, &cookies, &principal)?;
    tracing::info!(employee_id = %employee.id, is_admin = employee.is_admin, "login succeeded");

    Ok(Json(LoginResponse {
        message: "login successful",
        user: SessionUser {
            id: employee.id.get(),
            name: employee.full_name(),
            email: employee.email,
            is_admin: employee.is_admin,
        },
    }))
}

pub async fn logout(Extension(services): Extension<Arc<AppServices>>, cookies: Cookies) -> impl IntoResponse {
    cookies.add(clear_session_cookie(services.cookie_secure));
    dto::message("logged out")
}

pub async fn get_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Authenticated(principal): Authenticated,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id: UserId = dto::parse_id(&id)?;
    require_self(&principal, PrincipalKind::Account, id.get())?;

    let account = services
        .store
        .get_account(id)
        .await?
        .ok_or_else(|| ApiError::not_found("user"))?;
    Ok(Json(account))
}

pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Authenticated(principal): Authenticated,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<AccountInput>,
) -> ApiResult<impl IntoResponse> {
    let id: UserId = dto::parse_id(&id)?;
    require_self(&principal, PrincipalKind::Account, id.get())?;

    let cmd = UpdateAccount::try_from(body)?;
    let hash = cmd.password.as_deref().map(hash_password).transpose()?;
    let account = services.store.update_account(id, cmd.with_password_hash(hash)).await?;
    Ok(Json(account))
}

pub async fn delete_profile(
    Extension(services): Extension<Arc<AppServices>>,
    cookies: Cookies,
    Authenticated(principal): Authenticated,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id: UserId = dto::parse_id(&id)?;
    require_self(&principal, PrincipalKind::Account, id.get())?;

    services.store.delete_account(id).await?;
    tracing::info!(user_id = %id, "account deleted");
    cookies.add(clear_session_cookie(services.cookie_secure));
    Ok(dto::message("user deleted"))
}
