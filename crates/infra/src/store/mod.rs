//! Persistence boundary.
//!
//! One trait per domain area, all object-safe so the HTTP layer can hold an
//! `Arc<dyn HrStore>` and pick the backend at startup. Every method is a single
//! atomic operation: reference checks and the write they guard never
//! interleave with other writers.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use hrportal_content::{
    Account, AccountChanges, Article, ArticleChanges, ArticleSpec, Comment, CreateComment,
    NewAccount, UpdateComment,
};
use hrportal_core::{
    ArticleId, CommentId, DepartmentId, DomainError, EmployeeId, LeaveRequestId, LeaveTypeId,
    PostId, SalaryId, UserId,
};
use hrportal_directory::{Employee, EmployeeChanges, NewEmployee};
use hrportal_leave::{
    CreateLeaveRequest, LeaveRequest, LeaveType, LeaveTypeSpec, StatusChange, UpdateLeaveRequest,
};
use hrportal_organization::{Department, DepartmentSpec, Post, PostSpec};
use hrportal_payroll::{RecordSalary, Salary};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Business failure (missing reference, conflict, refused admission).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The backend itself failed.
    #[error("storage failure: {0}")]
    Database(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub(crate) fn not_found(what: &str, id: impl core::fmt::Display) -> StoreError {
    StoreError::Domain(DomainError::not_found(format!("{what} {id} not found")))
}

pub(crate) fn conflict(msg: impl Into<String>) -> StoreError {
    StoreError::Domain(DomainError::conflict(msg))
}

#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Fails with `NotFound` for an unknown post and `Conflict` for a taken email.
    async fn create_employee(&self, new: NewEmployee, now: DateTime<Utc>) -> StoreResult<Employee>;
    async fn list_employees(&self) -> StoreResult<Vec<Employee>>;
    async fn list_employees_by_post(&self, post_id: PostId) -> StoreResult<Vec<Employee>>;
    async fn get_employee(&self, id: EmployeeId) -> StoreResult<Option<Employee>>;
    async fn find_employee_by_email(&self, email: &str) -> StoreResult<Option<Employee>>;
    async fn update_employee(&self, id: EmployeeId, changes: EmployeeChanges) -> StoreResult<Employee>;
    /// Removes the employee together with their leave requests and salaries.
    async fn delete_employee(&self, id: EmployeeId) -> StoreResult<()>;
}

#[async_trait]
pub trait OrganizationStore: Send + Sync {
    async fn create_department(&self, spec: DepartmentSpec) -> StoreResult<Department>;
    async fn list_departments(&self) -> StoreResult<Vec<Department>>;
    async fn get_department(&self, id: DepartmentId) -> StoreResult<Option<Department>>;
    async fn update_department(&self, id: DepartmentId, spec: DepartmentSpec) -> StoreResult<Department>;
    /// Refused with `Conflict` while posts belong to the department.
    async fn delete_department(&self, id: DepartmentId) -> StoreResult<()>;

    async fn create_post(&self, spec: PostSpec) -> StoreResult<Post>;
    async fn list_posts(&self) -> StoreResult<Vec<Post>>;
    async fn list_posts_by_department(&self, department_id: DepartmentId) -> StoreResult<Vec<Post>>;
    async fn get_post(&self, id: PostId) -> StoreResult<Option<Post>>;
    async fn update_post(&self, id: PostId, spec: PostSpec) -> StoreResult<Post>;
    /// Refused with `Conflict` while employees hold the post.
    async fn delete_post(&self, id: PostId) -> StoreResult<()>;
}

#[async_trait]
pub trait LeaveStore: Send + Sync {
    async fn create_leave_type(&self, spec: LeaveTypeSpec) -> StoreResult<LeaveType>;
    async fn list_leave_types(&self) -> StoreResult<Vec<LeaveType>>;
    async fn get_leave_type(&self, id: LeaveTypeId) -> StoreResult<Option<LeaveType>>;
    async fn update_leave_type(&self, id: LeaveTypeId, spec: LeaveTypeSpec) -> StoreResult<LeaveType>;
    /// Refused with `Conflict` while leave requests reference the type.
    async fn delete_leave_type(&self, id: LeaveTypeId) -> StoreResult<()>;

    /// Admit and insert a request in one step.
    ///
    /// Eligibility is evaluated against `today` with the employee and leave
    /// type as they are at insertion time.
    async fn create_leave_request(
        &self,
        cmd: CreateLeaveRequest,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> StoreResult<LeaveRequest>;
    /// Newest first (`created_at` desc, then id desc).
    async fn list_leave_requests(&self) -> StoreResult<Vec<LeaveRequest>>;
    async fn list_leave_requests_for_employee(&self, employee_id: EmployeeId) -> StoreResult<Vec<LeaveRequest>>;
    async fn list_leave_requests_for_type(&self, leave_type_id: LeaveTypeId) -> StoreResult<Vec<LeaveRequest>>;
    async fn update_leave_request(
        &self,
        id: LeaveRequestId,
        cmd: UpdateLeaveRequest,
    ) -> StoreResult<(LeaveRequest, StatusChange)>;
    async fn delete_leave_request(&self, id: LeaveRequestId) -> StoreResult<()>;
}

#[async_trait]
pub trait SalaryStore: Send + Sync {
    async fn create_salary(&self, cmd: RecordSalary) -> StoreResult<Salary>;
    async fn list_salaries(&self) -> StoreResult<Vec<Salary>>;
    async fn list_salaries_for_employee(&self, employee_id: EmployeeId) -> StoreResult<Vec<Salary>>;
    async fn update_salary(&self, id: SalaryId, cmd: RecordSalary) -> StoreResult<Salary>;
    async fn delete_salary(&self, id: SalaryId) -> StoreResult<()>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Fails with `Conflict` for a taken email.
    async fn create_account(&self, new: NewAccount, now: DateTime<Utc>) -> StoreResult<Account>;
    async fn get_account(&self, id: UserId) -> StoreResult<Option<Account>>;
    async fn update_account(&self, id: UserId, changes: AccountChanges) -> StoreResult<Account>;
    /// Removes the account with its articles and comments.
    async fn delete_account(&self, id: UserId) -> StoreResult<()>;
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn create_article(&self, spec: ArticleSpec, author: UserId, now: DateTime<Utc>) -> StoreResult<Article>;
    async fn list_articles(&self) -> StoreResult<Vec<Article>>;
    async fn get_article(&self, id: ArticleId) -> StoreResult<Option<Article>>;
    async fn update_article(&self, id: ArticleId, changes: ArticleChanges) -> StoreResult<Article>;
    /// Removes the article with its comments.
    async fn delete_article(&self, id: ArticleId) -> StoreResult<()>;

    /// Fails with `NotFound` for an unknown article.
    async fn create_comment(&self, cmd: CreateComment, author: UserId, now: DateTime<Utc>) -> StoreResult<Comment>;
    async fn list_comments(&self) -> StoreResult<Vec<Comment>>;
    async fn list_comments_for_article(&self, article_id: ArticleId) -> StoreResult<Vec<Comment>>;
    async fn get_comment(&self, id: CommentId) -> StoreResult<Option<Comment>>;
    async fn update_comment(&self, id: CommentId, cmd: UpdateComment) -> StoreResult<Comment>;
}

/// Everything the HTTP layer needs from storage.
pub trait HrStore:
    EmployeeStore + OrganizationStore + LeaveStore + SalaryStore + AccountStore + ContentStore
{
}

impl<S> HrStore for S where
    S: EmployeeStore + OrganizationStore + LeaveStore + SalaryStore + AccountStore + ContentStore
{
}

/// Order leave requests newest first, ties broken by id.
pub(crate) fn newest_first(requests: &mut [LeaveRequest]) {
    requests.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}
