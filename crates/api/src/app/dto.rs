//! Request extraction and response shapes.
//!
//! Request bodies deserialize straight into the domain crates' `*Input`
//! types; this module only adds the JSON extractor and the nested views that
//! embed related records in a response.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use core::str::FromStr;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use hrportal_content::{Account, Article, Comment};
use hrportal_core::DomainError;
use hrportal_directory::Employee;
use hrportal_leave::{LeaveRequest, LeaveType};
use hrportal_organization::{Department, Post};
use hrportal_payroll::Salary;

use crate::app::errors::ApiError;

/// `Json<T>` whose rejections render as 400 `validation_error` bodies.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Parse a path segment into a typed id (400 on garbage).
pub fn parse_id<I>(raw: &str) -> Result<I, ApiError>
where
    I: FromStr<Err = DomainError>,
{
    raw.parse::<I>().map_err(ApiError::from)
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

// -------------------------
// Embedded references
// -------------------------

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeRef {
    pub id: i64,
    pub firstname: String,
    pub lastname: String,
}

impl From<&Employee> for EmployeeRef {
    fn from(e: &Employee) -> Self {
        Self {
            id: e.id.get(),
            firstname: e.firstname.clone(),
            lastname: e.lastname.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaveTypeRef {
    pub id: i64,
    pub name: String,
}

impl From<&LeaveType> for LeaveTypeRef {
    fn from(t: &LeaveType) -> Self {
        Self {
            id: t.id.get(),
            name: t.name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DepartmentRef {
    pub id: i64,
    pub name: String,
}

impl From<&Department> for DepartmentRef {
    fn from(d: &Department) -> Self {
        Self {
            id: d.id.get(),
            name: d.name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthorRef {
    pub id: i64,
    pub name: String,
}

impl From<&Account> for AuthorRef {
    fn from(a: &Account) -> Self {
        Self {
            id: a.id.get(),
            name: a.name.clone(),
        }
    }
}

// -------------------------
// Response views
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeView {
    #[serde(flatten)]
    pub employee: Employee,
    pub post: Option<Post>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leave_requests: Option<Vec<LeaveRequest>>,
}

#[derive(Debug, Serialize)]
pub struct DepartmentView {
    #[serde(flatten)]
    pub department: Department,
    pub posts: Vec<Post>,
}

#[derive(Debug, Serialize)]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub department: Option<DepartmentRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employees: Option<Vec<Employee>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveTypeView {
    #[serde(flatten)]
    pub leave_type: LeaveType,
    pub leave_requests: Vec<LeaveRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequestView {
    #[serde(flatten)]
    pub request: LeaveRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee: Option<EmployeeRef>,
    pub leave_type: Option<LeaveTypeRef>,
}

#[derive(Debug, Serialize)]
pub struct SalaryView {
    #[serde(flatten)]
    pub salary: Salary,
    pub employee: Option<EmployeeRef>,
}

#[derive(Debug, Serialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub user: Option<AuthorRef>,
}

#[derive(Debug, Serialize)]
pub struct ArticleView {
    #[serde(flatten)]
    pub article: Article,
    pub user: Option<AuthorRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<CommentView>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: i64,
    pub email: String,
    pub is_admin: bool,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub user: SessionUser,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub message: &'static str,
    pub user: Account,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

pub fn message(message: &'static str) -> Json<MessageResponse> {
    Json(MessageResponse { message })
}
