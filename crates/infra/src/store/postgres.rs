//! PostgreSQL-backed store.
//!
//! ## Error Mapping
//!
//! | PostgreSQL code | Meaning | `StoreError` |
//! |---|---|---|
//! | `23505` | unique violation (email) | `Domain(Conflict)` |
//! | `23503` on insert/update | missing referenced row | `Domain(NotFound)` |
//! | `23503` on delete | row still referenced | `Domain(Conflict)` |
//! | anything else | | `Database` |
//!
//! Multi-step operations (leave request admission, partial updates) run in a
//! transaction and lock the rows they read.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::instrument;

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
    AdmissionFacts, CreateLeaveRequest, LeaveRequest, LeaveStatus, LeaveType, LeaveTypeSpec,
    StatusChange, UpdateLeaveRequest, admit,
};
use hrportal_organization::{Department, DepartmentSpec, Post, PostSpec};
use hrportal_payroll::{RecordSalary, Salary};

use super::{
    AccountStore, ContentStore, EmployeeStore, LeaveStore, OrganizationStore, SalaryStore,
    StoreError, StoreResult, conflict, not_found,
};

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

const EMPLOYEE_COLUMNS: &str =
    "id, firstname, lastname, email, phone, address, password_hash, post_id, hire_date, is_admin, created_at";
const LEAVE_REQUEST_COLUMNS: &str =
    "id, employee_id, leave_type_id, start_date, end_date, reason, status, created_at";
const ACCOUNT_COLUMNS: &str = "id, name, email, password_hash, is_admin, created_at";

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                let what = match db.constraint() {
                    Some(c) if c.contains("email") => "email already in use",
                    _ => "duplicate record",
                };
                conflict(what)
            }
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23503") => {
                conflict("record is still referenced")
            }
            sqlx::Error::PoolClosed => StoreError::Database("connection pool closed".into()),
            _ => StoreError::Database(err.to_string()),
        }
    }
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23503"))
}

/// Map a foreign-key failure on insert/update to the missing reference.
fn missing_reference(err: sqlx::Error, missing: impl FnOnce() -> StoreError) -> StoreError {
    if is_foreign_key_violation(&err) { missing() } else { err.into() }
}

/// Map a foreign-key failure on delete to a conflict with `msg`.
fn still_referenced(err: sqlx::Error, msg: &'static str) -> StoreError {
    if is_foreign_key_violation(&err) { conflict(msg) } else { err.into() }
}

fn require_affected(rows: u64, what: &str, id: impl core::fmt::Display) -> StoreResult<()> {
    if rows == 0 { Err(not_found(what, id)) } else { Ok(()) }
}

fn employee_from_row(row: &PgRow) -> Result<Employee, sqlx::Error> {
    Ok(Employee {
        id: EmployeeId::new(row.try_get("id")?),
        firstname: row.try_get("firstname")?,
        lastname: row.try_get("lastname")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        address: row.try_get("address")?,
        password_hash: row.try_get("password_hash")?,
        post_id: PostId::new(row.try_get("post_id")?),
        hire_date: row.try_get("hire_date")?,
        is_admin: row.try_get("is_admin")?,
        created_at: row.try_get("created_at")?,
    })
}

fn department_from_row(row: &PgRow) -> Result<Department, sqlx::Error> {
    Ok(Department { id: DepartmentId::new(row.try_get("id")?), name: row.try_get("name")? })
}

fn post_from_row(row: &PgRow) -> Result<Post, sqlx::Error> {
    Ok(Post {
        id: PostId::new(row.try_get("id")?),
        title: row.try_get("title")?,
        department_id: DepartmentId::new(row.try_get("department_id")?),
    })
}

fn leave_type_from_row(row: &PgRow) -> Result<LeaveType, sqlx::Error> {
    Ok(LeaveType {
        id: LeaveTypeId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        max_days: row.try_get("max_days")?,
        carry_forward: row.try_get("carry_forward")?,
    })
}

fn leave_request_from_row(row: &PgRow) -> Result<LeaveRequest, sqlx::Error> {
    let status: String = row.try_get("status")?;
    let status = status
        .parse::<LeaveStatus>()
        .map_err(|e: DomainError| sqlx::Error::Decode(e.into()))?;
    Ok(LeaveRequest {
        id: LeaveRequestId::new(row.try_get("id")?),
        employee_id: EmployeeId::new(row.try_get("employee_id")?),
        leave_type_id: LeaveTypeId::new(row.try_get("leave_type_id")?),
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        reason: row.try_get("reason")?,
        status,
        created_at: row.try_get("created_at")?,
    })
}

fn salary_from_row(row: &PgRow) -> Result<Salary, sqlx::Error> {
    Ok(Salary {
        id: SalaryId::new(row.try_get("id")?),
        amount: row.try_get("amount")?,
        employee_id: EmployeeId::new(row.try_get("employee_id")?),
    })
}

fn account_from_row(row: &PgRow) -> Result<Account, sqlx::Error> {
    Ok(Account {
        id: UserId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        is_admin: row.try_get("is_admin")?,
        created_at: row.try_get("created_at")?,
    })
}

fn article_from_row(row: &PgRow) -> Result<Article, sqlx::Error> {
    Ok(Article {
        id: ArticleId::new(row.try_get("id")?),
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        user_id: UserId::new(row.try_get("user_id")?),
        created_at: row.try_get("created_at")?,
    })
}

fn comment_from_row(row: &PgRow) -> Result<Comment, sqlx::Error> {
    Ok(Comment {
        id: CommentId::new(row.try_get("id")?),
        content: row.try_get("content")?,
        user_id: UserId::new(row.try_get("user_id")?),
        article_id: ArticleId::new(row.try_get("article_id")?),
        created_at: row.try_get("created_at")?,
    })
}

fn map_rows<T>(rows: Vec<PgRow>, f: fn(&PgRow) -> Result<T, sqlx::Error>) -> StoreResult<Vec<T>> {
    rows.iter().map(f).collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
}

/// Postgres implementation of every store trait.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Connect and bring the schema up to date.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new().max_connections(10).connect(database_url).await?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA).execute(&*self.pool).await?;
        tracing::info!("database schema is up to date");
        Ok(())
    }

    async fn begin(&self) -> StoreResult<Transaction<'static, Postgres>> {
        Ok(self.pool.begin().await?)
    }
}

async fn lock_employee(
    tx: &mut Transaction<'static, Postgres>,
    id: EmployeeId,
) -> StoreResult<Option<Employee>> {
    let row = sqlx::query(&format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = $1 FOR SHARE"))
        .bind(id.get())
        .fetch_optional(&mut **tx)
        .await?;
    Ok(row.as_ref().map(employee_from_row).transpose()?)
}

async fn lock_leave_type(tx: &mut Transaction<'static, Postgres>, id: LeaveTypeId) -> StoreResult<bool> {
    let row = sqlx::query("SELECT id FROM leave_types WHERE id = $1 FOR SHARE")
        .bind(id.get())
        .fetch_optional(&mut **tx)
        .await?;
    Ok(row.is_some())
}

#[async_trait]
impl EmployeeStore for PostgresStore {
    async fn create_employee(&self, new: NewEmployee, now: DateTime<Utc>) -> StoreResult<Employee> {
        let post_id = new.post_id;
        let row = sqlx::query(&format!(
            "INSERT INTO employees (firstname, lastname, email, phone, address, password_hash, post_id, hire_date, is_admin, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {EMPLOYEE_COLUMNS}"
        ))
        .bind(&new.firstname)
        .bind(&new.lastname)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.address)
        .bind(&new.password_hash)
        .bind(new.post_id.get())
        .bind(new.hire_date)
        .bind(new.is_admin)
        .bind(now)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| missing_reference(e, || not_found("post", post_id)))?;
        Ok(employee_from_row(&row)?)
    }

    async fn list_employees(&self) -> StoreResult<Vec<Employee>> {
        let rows = sqlx::query(&format!("SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY id"))
            .fetch_all(&*self.pool)
            .await?;
        map_rows(rows, employee_from_row)
    }

    async fn list_employees_by_post(&self, post_id: PostId) -> StoreResult<Vec<Employee>> {
        let rows = sqlx::query(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE post_id = $1 ORDER BY id"
        ))
        .bind(post_id.get())
        .fetch_all(&*self.pool)
        .await?;
        map_rows(rows, employee_from_row)
    }

    async fn get_employee(&self, id: EmployeeId) -> StoreResult<Option<Employee>> {
        let row = sqlx::query(&format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await?;
        Ok(row.as_ref().map(employee_from_row).transpose()?)
    }

    async fn find_employee_by_email(&self, email: &str) -> StoreResult<Option<Employee>> {
        let row = sqlx::query(&format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE email = $1"))
            .bind(email)
            .fetch_optional(&*self.pool)
            .await?;
        Ok(row.as_ref().map(employee_from_row).transpose()?)
    }

    async fn update_employee(&self, id: EmployeeId, changes: EmployeeChanges) -> StoreResult<Employee> {
        let mut tx = self.begin().await?;
        let row = sqlx::query(&format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = $1 FOR UPDATE"))
            .bind(id.get())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| not_found("employee", id))?;
        let mut employee = employee_from_row(&row)?;
        changes.apply(&mut employee);

        let post_id = employee.post_id;
        sqlx::query(
            "UPDATE employees SET firstname = $2, lastname = $3, email = $4, phone = $5, address = $6, \
             password_hash = $7, post_id = $8, hire_date = $9, is_admin = $10 WHERE id = $1",
        )
        .bind(id.get())
        .bind(&employee.firstname)
        .bind(&employee.lastname)
        .bind(&employee.email)
        .bind(&employee.phone)
        .bind(&employee.address)
        .bind(&employee.password_hash)
        .bind(employee.post_id.get())
        .bind(employee.hire_date)
        .bind(employee.is_admin)
        .execute(&mut *tx)
        .await
        .map_err(|e| missing_reference(e, || not_found("post", post_id)))?;

        tx.commit().await?;
        Ok(employee)
    }

    async fn delete_employee(&self, id: EmployeeId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await?;
        require_affected(result.rows_affected(), "employee", id)
    }
}

#[async_trait]
impl OrganizationStore for PostgresStore {
    async fn create_department(&self, spec: DepartmentSpec) -> StoreResult<Department> {
        let row = sqlx::query("INSERT INTO departments (name) VALUES ($1) RETURNING id, name")
            .bind(&spec.name)
            .fetch_one(&*self.pool)
            .await?;
        Ok(department_from_row(&row)?)
    }

    async fn list_departments(&self) -> StoreResult<Vec<Department>> {
        let rows = sqlx::query("SELECT id, name FROM departments ORDER BY id")
            .fetch_all(&*self.pool)
            .await?;
        map_rows(rows, department_from_row)
    }

    async fn get_department(&self, id: DepartmentId) -> StoreResult<Option<Department>> {
        let row = sqlx::query("SELECT id, name FROM departments WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await?;
        Ok(row.as_ref().map(department_from_row).transpose()?)
    }

    async fn update_department(&self, id: DepartmentId, spec: DepartmentSpec) -> StoreResult<Department> {
        let row = sqlx::query("UPDATE departments SET name = $2 WHERE id = $1 RETURNING id, name")
            .bind(id.get())
            .bind(&spec.name)
            .fetch_optional(&*self.pool)
            .await?
            .ok_or_else(|| not_found("department", id))?;
        Ok(department_from_row(&row)?)
    }

    async fn delete_department(&self, id: DepartmentId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM departments WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| still_referenced(e, "department still has posts"))?;
        require_affected(result.rows_affected(), "department", id)
    }

    async fn create_post(&self, spec: PostSpec) -> StoreResult<Post> {
        let department_id = spec.department_id;
        let row = sqlx::query(
            "INSERT INTO posts (title, department_id) VALUES ($1, $2) RETURNING id, title, department_id",
        )
        .bind(&spec.title)
        .bind(spec.department_id.get())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| missing_reference(e, || not_found("department", department_id)))?;
        Ok(post_from_row(&row)?)
    }

    async fn list_posts(&self) -> StoreResult<Vec<Post>> {
        let rows = sqlx::query("SELECT id, title, department_id FROM posts ORDER BY id")
            .fetch_all(&*self.pool)
            .await?;
        map_rows(rows, post_from_row)
    }

    async fn list_posts_by_department(&self, department_id: DepartmentId) -> StoreResult<Vec<Post>> {
        let rows = sqlx::query("SELECT id, title, department_id FROM posts WHERE department_id = $1 ORDER BY id")
            .bind(department_id.get())
            .fetch_all(&*self.pool)
            .await?;
        map_rows(rows, post_from_row)
    }

    async fn get_post(&self, id: PostId) -> StoreResult<Option<Post>> {
        let row = sqlx::query("SELECT id, title, department_id FROM posts WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await?;
        Ok(row.as_ref().map(post_from_row).transpose()?)
    }

    async fn update_post(&self, id: PostId, spec: PostSpec) -> StoreResult<Post> {
        let department_id = spec.department_id;
        let row = sqlx::query(
            "UPDATE posts SET title = $2, department_id = $3 WHERE id = $1 RETURNING id, title, department_id",
        )
        .bind(id.get())
        .bind(&spec.title)
        .bind(spec.department_id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| missing_reference(e, || not_found("department", department_id)))?
        .ok_or_else(|| not_found("post", id))?;
        Ok(post_from_row(&row)?)
    }

    async fn delete_post(&self, id: PostId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| still_referenced(e, "post is still held by employees"))?;
        require_affected(result.rows_affected(), "post", id)
    }
}

#[async_trait]
impl LeaveStore for PostgresStore {
    async fn create_leave_type(&self, spec: LeaveTypeSpec) -> StoreResult<LeaveType> {
        let row = sqlx::query(
            "INSERT INTO leave_types (name, max_days, carry_forward) VALUES ($1, $2, $3) \
             RETURNING id, name, max_days, carry_forward",
        )
        .bind(&spec.name)
        .bind(spec.max_days)
        .bind(spec.carry_forward)
        .fetch_one(&*self.pool)
        .await?;
        Ok(leave_type_from_row(&row)?)
    }

    async fn list_leave_types(&self) -> StoreResult<Vec<LeaveType>> {
        let rows = sqlx::query("SELECT id, name, max_days, carry_forward FROM leave_types ORDER BY id")
            .fetch_all(&*self.pool)
            .await?;
        map_rows(rows, leave_type_from_row)
    }

    async fn get_leave_type(&self, id: LeaveTypeId) -> StoreResult<Option<LeaveType>> {
        let row = sqlx::query("SELECT id, name, max_days, carry_forward FROM leave_types WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await?;
        Ok(row.as_ref().map(leave_type_from_row).transpose()?)
    }

    async fn update_leave_type(&self, id: LeaveTypeId, spec: LeaveTypeSpec) -> StoreResult<LeaveType> {
        let row = sqlx::query(
            "UPDATE leave_types SET name = $2, max_days = $3, carry_forward = $4 WHERE id = $1 \
             RETURNING id, name, max_days, carry_forward",
        )
        .bind(id.get())
        .bind(&spec.name)
        .bind(spec.max_days)
        .bind(spec.carry_forward)
        .fetch_optional(&*self.pool)
        .await?
        .ok_or_else(|| not_found("leave type", id))?;
        Ok(leave_type_from_row(&row)?)
    }

    async fn delete_leave_type(&self, id: LeaveTypeId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM leave_types WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| still_referenced(e, "leave type is referenced by leave requests"))?;
        require_affected(result.rows_affected(), "leave type", id)
    }

    #[instrument(skip(self, cmd), fields(employee_id = %cmd.employee_id, leave_type_id = %cmd.leave_type_id), err)]
    async fn create_leave_request(
        &self,
        cmd: CreateLeaveRequest,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> StoreResult<LeaveRequest> {
        let mut tx = self.begin().await?;

        let facts = AdmissionFacts {
            hire_date: lock_employee(&mut tx, cmd.employee_id).await?.map(|e| e.hire_date),
            leave_type_exists: lock_leave_type(&mut tx, cmd.leave_type_id).await?,
            today,
        };
        let admitted = admit(cmd, facts)?;

        let row = sqlx::query(&format!(
            "INSERT INTO leave_requests (employee_id, leave_type_id, start_date, end_date, reason, status, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {LEAVE_REQUEST_COLUMNS}"
        ))
        .bind(admitted.employee_id.get())
        .bind(admitted.leave_type_id.get())
        .bind(admitted.period.start())
        .bind(admitted.period.end())
        .bind(&admitted.reason)
        .bind(admitted.status.as_str())
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(leave_request_from_row(&row)?)
    }

    async fn list_leave_requests(&self) -> StoreResult<Vec<LeaveRequest>> {
        let rows = sqlx::query(&format!(
            "SELECT {LEAVE_REQUEST_COLUMNS} FROM leave_requests ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&*self.pool)
        .await?;
        map_rows(rows, leave_request_from_row)
    }

    async fn list_leave_requests_for_employee(&self, employee_id: EmployeeId) -> StoreResult<Vec<LeaveRequest>> {
        let rows = sqlx::query(&format!(
            "SELECT {LEAVE_REQUEST_COLUMNS} FROM leave_requests WHERE employee_id = $1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(employee_id.get())
        .fetch_all(&*self.pool)
        .await?;
        map_rows(rows, leave_request_from_row)
    }

    async fn list_leave_requests_for_type(&self, leave_type_id: LeaveTypeId) -> StoreResult<Vec<LeaveRequest>> {
        let rows = sqlx::query(&format!(
            "SELECT {LEAVE_REQUEST_COLUMNS} FROM leave_requests WHERE leave_type_id = $1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(leave_type_id.get())
        .fetch_all(&*self.pool)
        .await?;
        map_rows(rows, leave_request_from_row)
    }

    #[instrument(skip(self, cmd), fields(leave_request_id = %id), err)]
    async fn update_leave_request(
        &self,
        id: LeaveRequestId,
        cmd: UpdateLeaveRequest,
    ) -> StoreResult<(LeaveRequest, StatusChange)> {
        let mut tx = self.begin().await?;

        let row = sqlx::query(&format!(
            "SELECT {LEAVE_REQUEST_COLUMNS} FROM leave_requests WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.get())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| not_found("leave request", id))?;
        let mut request = leave_request_from_row(&row)?;

        if lock_employee(&mut tx, cmd.employee_id).await?.is_none() {
            return Err(not_found("employee", cmd.employee_id));
        }
        if !lock_leave_type(&mut tx, cmd.leave_type_id).await? {
            return Err(not_found("leave type", cmd.leave_type_id));
        }

        let change = cmd.apply(&mut request);
        sqlx::query(
            "UPDATE leave_requests SET employee_id = $2, leave_type_id = $3, start_date = $4, \
             end_date = $5, reason = $6, status = $7 WHERE id = $1",
        )
        .bind(id.get())
        .bind(request.employee_id.get())
        .bind(request.leave_type_id.get())
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(&request.reason)
        .bind(request.status.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((request, change))
    }

    async fn delete_leave_request(&self, id: LeaveRequestId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM leave_requests WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await?;
        require_affected(result.rows_affected(), "leave request", id)
    }
}

#[async_trait]
impl SalaryStore for PostgresStore {
    async fn create_salary(&self, cmd: RecordSalary) -> StoreResult<Salary> {
        let employee_id = cmd.employee_id;
        let row = sqlx::query(
            "INSERT INTO salaries (amount, employee_id) VALUES ($1, $2) RETURNING id, amount, employee_id",
        )
        .bind(cmd.amount)
        .bind(cmd.employee_id.get())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| missing_reference(e, || not_found("employee", employee_id)))?;
        Ok(salary_from_row(&row)?)
    }

    async fn list_salaries(&self) -> StoreResult<Vec<Salary>> {
        let rows = sqlx::query("SELECT id, amount, employee_id FROM salaries ORDER BY id")
            .fetch_all(&*self.pool)
            .await?;
        map_rows(rows, salary_from_row)
    }

    async fn list_salaries_for_employee(&self, employee_id: EmployeeId) -> StoreResult<Vec<Salary>> {
        let rows = sqlx::query("SELECT id, amount, employee_id FROM salaries WHERE employee_id = $1 ORDER BY id")
            .bind(employee_id.get())
            .fetch_all(&*self.pool)
            .await?;
        map_rows(rows, salary_from_row)
    }

    async fn update_salary(&self, id: SalaryId, cmd: RecordSalary) -> StoreResult<Salary> {
        let employee_id = cmd.employee_id;
        let row = sqlx::query(
            "UPDATE salaries SET amount = $2, employee_id = $3 WHERE id = $1 RETURNING id, amount, employee_id",
        )
        .bind(id.get())
        .bind(cmd.amount)
        .bind(cmd.employee_id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| missing_reference(e, || not_found("employee", employee_id)))?
        .ok_or_else(|| not_found("salary", id))?;
        Ok(salary_from_row(&row)?)
    }

    async fn delete_salary(&self, id: SalaryId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM salaries WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await?;
        require_affected(result.rows_affected(), "salary", id)
    }
}

#[async_trait]
impl AccountStore for PostgresStore {
    async fn create_account(&self, new: NewAccount, now: DateTime<Utc>) -> StoreResult<Account> {
        let row = sqlx::query(&format!(
            "INSERT INTO accounts (name, email, password_hash, is_admin, created_at) \
             VALUES ($1, $2, $3, FALSE, $4) RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(now)
        .fetch_one(&*self.pool)
        .await?;
        Ok(account_from_row(&row)?)
    }

    async fn get_account(&self, id: UserId) -> StoreResult<Option<Account>> {
        let row = sqlx::query(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await?;
        Ok(row.as_ref().map(account_from_row).transpose()?)
    }

    async fn update_account(&self, id: UserId, changes: AccountChanges) -> StoreResult<Account> {
        let row = sqlx::query(&format!(
            "UPDATE accounts SET name = COALESCE($2, name), email = COALESCE($3, email), \
             password_hash = COALESCE($4, password_hash) WHERE id = $1 RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(id.get())
        .bind(&changes.name)
        .bind(&changes.email)
        .bind(&changes.password_hash)
        .fetch_optional(&*self.pool)
        .await?
        .ok_or_else(|| not_found("user", id))?;
        Ok(account_from_row(&row)?)
    }

    async fn delete_account(&self, id: UserId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await?;
        require_affected(result.rows_affected(), "user", id)
    }
}

#[async_trait]
impl ContentStore for PostgresStore {
    async fn create_article(&self, spec: ArticleSpec, author: UserId, now: DateTime<Utc>) -> StoreResult<Article> {
        let row = sqlx::query(
            "INSERT INTO articles (title, description, user_id, created_at) VALUES ($1, $2, $3, $4) \
             RETURNING id, title, description, user_id, created_at",
        )
        .bind(&spec.title)
        .bind(&spec.description)
        .bind(author.get())
        .bind(now)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| missing_reference(e, || not_found("user", author)))?;
        Ok(article_from_row(&row)?)
    }

    async fn list_articles(&self) -> StoreResult<Vec<Article>> {
        let rows = sqlx::query("SELECT id, title, description, user_id, created_at FROM articles ORDER BY id")
            .fetch_all(&*self.pool)
            .await?;
        map_rows(rows, article_from_row)
    }

    async fn get_article(&self, id: ArticleId) -> StoreResult<Option<Article>> {
        let row = sqlx::query("SELECT id, title, description, user_id, created_at FROM articles WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await?;
        Ok(row.as_ref().map(article_from_row).transpose()?)
    }

    async fn update_article(&self, id: ArticleId, changes: ArticleChanges) -> StoreResult<Article> {
        let row = sqlx::query(
            "UPDATE articles SET title = COALESCE($2, title), description = COALESCE($3, description) \
             WHERE id = $1 RETURNING id, title, description, user_id, created_at",
        )
        .bind(id.get())
        .bind(&changes.title)
        .bind(&changes.description)
        .fetch_optional(&*self.pool)
        .await?
        .ok_or_else(|| not_found("article", id))?;
        Ok(article_from_row(&row)?)
    }

    async fn delete_article(&self, id: ArticleId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await?;
        require_affected(result.rows_affected(), "article", id)
    }

    async fn create_comment(&self, cmd: CreateComment, author: UserId, now: DateTime<Utc>) -> StoreResult<Comment> {
        let article_id = cmd.article_id;
        let row = sqlx::query(
            "INSERT INTO comments (content, user_id, article_id, created_at) VALUES ($1, $2, $3, $4) \
             RETURNING id, content, user_id, article_id, created_at",
        )
        .bind(&cmd.content)
        .bind(author.get())
        .bind(cmd.article_id.get())
        .bind(now)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| missing_reference(e, || not_found("article", article_id)))?;
        Ok(comment_from_row(&row)?)
    }

    async fn list_comments(&self) -> StoreResult<Vec<Comment>> {
        let rows = sqlx::query("SELECT id, content, user_id, article_id, created_at FROM comments ORDER BY id")
            .fetch_all(&*self.pool)
            .await?;
        map_rows(rows, comment_from_row)
    }

    async fn list_comments_for_article(&self, article_id: ArticleId) -> StoreResult<Vec<Comment>> {
        let rows = sqlx::query(
            "SELECT id, content, user_id, article_id, created_at FROM comments WHERE article_id = $1 ORDER BY id",
        )
        .bind(article_id.get())
        .fetch_all(&*self.pool)
        .await?;
        map_rows(rows, comment_from_row)
    }

    async fn get_comment(&self, id: CommentId) -> StoreResult<Option<Comment>> {
        let row = sqlx::query("SELECT id, content, user_id, article_id, created_at FROM comments WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await?;
        Ok(row.as_ref().map(comment_from_row).transpose()?)
    }

    async fn update_comment(&self, id: CommentId, cmd: UpdateComment) -> StoreResult<Comment> {
        let row = sqlx::query(
            "UPDATE comments SET content = $2 WHERE id = $1 RETURNING id, content, user_id, article_id, created_at",
        )
        .bind(id.get())
        .bind(&cmd.content)
        .fetch_optional(&*self.pool)
        .await?
        .ok_or_else(|| not_found("comment", id))?;
        Ok(comment_from_row(&row)?)
    }
}
