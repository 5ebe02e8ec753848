//! Service wiring: picks the store backend, builds the token service and
//! seeds the bootstrap admin. Also hosts the read-side helpers that join
//! records into the nested response views.

use std::{collections::HashMap, sync::Arc};

use anyhow::Context;
use chrono::{NaiveDate, Utc};

use hrportal_auth::{TokenService, hash_password};
use hrportal_content::Article;
use hrportal_core::{EmployeeId, LeaveTypeId, UserId};
use hrportal_directory::{CreateEmployee, Employee};
use hrportal_infra::{
    AppConfig, BootstrapAdmin, HrStore, InMemoryStore, PostgresStore, StoreBackend, StoreResult,
};
use hrportal_leave::LeaveRequest;
use hrportal_organization::{DepartmentSpec, PostSpec};
use hrportal_payroll::Salary;

use crate::app::dto::{
    ArticleView, AuthorRef, CommentView, EmployeeRef, EmployeeView, LeaveRequestView, LeaveTypeRef,
    SalaryView,
};

const ADMIN_DEPARTMENT: &str = "Administration";
const ADMIN_POST: &str = "Administrator";

pub struct AppServices {
    pub store: Arc<dyn HrStore>,
    pub tokens: Arc<TokenService>,
    pub cookie_secure: bool,
}

/// Calendar date used for seniority checks and bootstrap hire dates.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let store: Arc<dyn HrStore> = match &config.store {
        StoreBackend::InMemory => {
            tracing::info!("using in-memory store");
            Arc::new(InMemoryStore::new())
        }
        StoreBackend::Postgres { database_url } => {
            tracing::info!("using PostgreSQL store");
            let pg = PostgresStore::connect(database_url)
                .await
                .context("failed to connect to PostgreSQL")?;
            Arc::new(pg)
        }
    };

    if let Some(admin) = &config.bootstrap_admin {
        seed_admin(store.as_ref(), admin)
            .await
            .context("failed to seed bootstrap admin")?;
    }

    let tokens = Arc::new(TokenService::new(config.jwt_secret.as_bytes(), config.token_ttl));

    Ok(AppServices {
        store,
        tokens,
        cookie_secure: config.cookie_secure,
    })
}

/// Ensure an admin employee exists for the configured email.
async fn seed_admin(store: &dyn HrStore, admin: &BootstrapAdmin) -> anyhow::Result<()> {
    if store.find_employee_by_email(&admin.email).await?.is_some() {
        tracing::debug!(email = %admin.email, "bootstrap admin already present");
        return Ok(());
    }

    let department = match store
        .list_departments()
        .await?
        .into_iter()
        .find(|d| d.name == ADMIN_DEPARTMENT)
    {
        Some(d) => d,
        None => {
            store
                .create_department(DepartmentSpec { name: ADMIN_DEPARTMENT.to_string() })
                .await?
        }
    };

    let post = match store
        .list_posts_by_department(department.id)
        .await?
        .into_iter()
        .find(|p| p.title == ADMIN_POST)
    {
        Some(p) => p,
        None => {
            store
                .create_post(PostSpec {
                    title: ADMIN_POST.to_string(),
                    department_id: department.id,
                })
                .await?
        }
    };

    let cmd = CreateEmployee {
        firstname: "Admin".to_string(),
        lastname: "Admin".to_string(),
        email: hrportal_core::validate_email(&admin.email)?,
        password: admin.password.clone(),
        phone: None,
        address: None,
        post_id: post.id,
        hire_date: today(),
        is_admin: true,
    };
    let hash = hash_password(&cmd.password)?;
    let employee = store.create_employee(cmd.with_password_hash(hash), Utc::now()).await?;

    tracing::info!(employee_id = %employee.id, email = %employee.email, "bootstrap admin created");
    Ok(())
}

impl AppServices {
    pub async fn employee_view(&self, employee: Employee, with_requests: bool) -> StoreResult<EmployeeView> {
        let post = self.store.get_post(employee.post_id).await?;
        let leave_requests = if with_requests {
            Some(self.store.list_leave_requests_for_employee(employee.id).await?)
        } else {
            None
        };
        Ok(EmployeeView { employee, post, leave_requests })
    }

    /// Join leave requests with their type and, optionally, their employee.
    pub async fn leave_request_views(
        &self,
        requests: Vec<LeaveRequest>,
        with_employee: bool,
    ) -> StoreResult<Vec<LeaveRequestView>> {
        let types: HashMap<LeaveTypeId, LeaveTypeRef> = self
            .store
            .list_leave_types()
            .await?
            .iter()
            .map(|t| (t.id, LeaveTypeRef::from(t)))
            .collect();
        let employees = if with_employee {
            self.employee_refs().await?
        } else {
            HashMap::new()
        };

        Ok(requests
            .into_iter()
            .map(|request| LeaveRequestView {
                employee: employees.get(&request.employee_id).cloned(),
                leave_type: types.get(&request.leave_type_id).cloned(),
                request,
            })
            .collect())
    }

    pub async fn salary_views(&self, salaries: Vec<Salary>) -> StoreResult<Vec<SalaryView>> {
        let employees = self.employee_refs().await?;
        Ok(salaries
            .into_iter()
            .map(|salary| SalaryView {
                employee: employees.get(&salary.employee_id).cloned(),
                salary,
            })
            .collect())
    }

    pub async fn article_view(&self, article: Article, with_comments: bool) -> StoreResult<ArticleView> {
        let user = self.author(article.user_id).await?;
        let comments = if with_comments {
            let mut views = Vec::new();
            for comment in self.store.list_comments_for_article(article.id).await? {
                let user = self.author(comment.user_id).await?;
                views.push(CommentView { comment, user });
            }
            Some(views)
        } else {
            None
        };
        Ok(ArticleView { article, user, comments })
    }

    async fn author(&self, id: UserId) -> StoreResult<Option<AuthorRef>> {
        Ok(self.store.get_account(id).await?.as_ref().map(AuthorRef::from))
    }

    async fn employee_refs(&self) -> StoreResult<HashMap<EmployeeId, EmployeeRef>> {
        Ok(self
            .store
            .list_employees()
            .await?
            .iter()
            .map(|e| (e.id, EmployeeRef::from(e)))
            .collect())
    }
}
