use std::sync::Arc;

use axum::{extract::State, middleware::Next, response::Response};
use chrono::Utc;
use tower_cookies::{
    Cookie, Cookies,
    cookie::{SameSite, time::Duration},
};

use hrportal_auth::CredentialVerifier;

use crate::context::Authentication;

/// Name of the session cookie carrying the signed credential.
pub const SESSION_COOKIE: &str = "jwtToken";

#[derive(Clone)]
pub struct AuthState {
    pub verifier: Arc<dyn CredentialVerifier>,
}

/// Resolve the session cookie into an [`Authentication`] extension.
///
/// Never rejects on its own: public routes run with `Missing` or `Invalid`,
/// guarded routes turn those into 401 through their extractors. Needs
/// `CookieManagerLayer` outside it.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    cookies: Cookies,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let auth = match session_token(&cookies) {
        None => Authentication::Missing,
        Some(token) => match state.verifier.verify(&token, Utc::now()) {
            Ok(principal) => Authentication::Principal(principal),
            Err(e) => {
                tracing::debug!(error = %e, "rejected session credential");
                Authentication::Invalid
            }
        },
    };

    req.extensions_mut().insert(auth);
    next.run(req).await
}

fn session_token(cookies: &Cookies) -> Option<String> {
    cookies
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Session cookie carrying `token` for `max_age_secs`.
pub fn session_cookie(token: impl Into<String>, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.into()))
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(Duration::seconds(max_age_secs))
        .secure(secure)
        .build()
}

/// Cookie that ends the session.
pub fn clear_session_cookie(secure: bool) -> Cookie<'static> {
    session_cookie(String::new(), 0, secure)
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
        routing::get,
    };
    use tower::ServiceExt;
    use tower_cookies::CookieManagerLayer;

    use super::*;

    async fn echo_token(cookies: Cookies) -> String {
        session_token(&cookies).unwrap_or_else(|| "<none>".into())
    }

    async fn token_seen_with(cookie_header: Option<&'static str>) -> String {
        let app = Router::new().route("/", get(echo_token)).layer(CookieManagerLayer::new());
        let mut req = Request::builder().uri("/");
        if let Some(value) = cookie_header {
            req = req.header(header::COOKIE, value);
        }
        let res = app.oneshot(req.body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn finds_session_cookie_among_others() {
        assert_eq!(token_seen_with(Some("theme=dark; jwtToken=abc.def.ghi; lang=fr")).await, "abc.def.ghi");
    }

    #[tokio::test]
    async fn empty_or_absent_cookie_is_none() {
        assert_eq!(token_seen_with(None).await, "<none>");
        assert_eq!(token_seen_with(Some("jwtToken=")).await, "<none>");
        assert_eq!(token_seen_with(Some("theme=dark")).await, "<none>");
    }

    #[test]
    fn cookie_attributes() {
        let cookie = session_cookie("t", 2_592_000, false);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "t");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(2_592_000)));
        assert_eq!(cookie.secure(), Some(false));

        let rendered = session_cookie("t", 10, true).to_string();
        assert!(rendered.contains("Secure"));
        assert!(rendered.contains("Max-Age=10"));

        let cleared = clear_session_cookie(false);
        assert_eq!(cleared.value(), "");
        assert_eq!(cleared.max_age(), Some(Duration::ZERO));
    }
}
