use axum::{routing::get, Router};

pub mod articles;
pub mod comments;
pub mod departments;
pub mod employees;
pub mod leave_requests;
pub mod leave_types;
pub mod posts;
pub mod salaries;
pub mod system;
pub mod users;

/// Router for every endpoint behind the session middleware.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/user", users::router())
        .nest("/employee", employees::router())
        .nest("/departments", departments::router())
        .nest("/posts", posts::router())
        .nest("/leaveTypes", leave_types::router())
        .nest("/leaveRequests", leave_requests::router())
        .nest("/employerequest", leave_requests::self_service_router())
        .nest("/salaires", salaries::router())
        .nest("/articles", articles::router())
        .nest("/comments", comments::router())
}
