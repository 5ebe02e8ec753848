//! In-memory store for tests and local development.
//!
//! All tables sit behind one `RwLock`. The lock is never held across an
//! `.await`, so each trait method runs as a single critical section.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use hrportal_content::{
    Account, AccountChanges, Article, ArticleChanges, ArticleSpec, Comment, CreateComment,
    NewAccount, UpdateComment,
};
use hrportal_core::{
    ArticleId, CommentId, DepartmentId, EmployeeId, Entity, LeaveRequestId, LeaveTypeId, PostId,
    RecordId, SalaryId, UserId,
};
use hrportal_directory::{Employee, EmployeeChanges, NewEmployee};
use hrportal_leave::{
    AdmissionFacts, CreateLeaveRequest, LeaveRequest, LeaveType, LeaveTypeSpec, StatusChange,
    UpdateLeaveRequest, admit,
};
use hrportal_organization::{Department, DepartmentSpec, Post, PostSpec};
use hrportal_payroll::{RecordSalary, Salary};

use super::{
    AccountStore, ContentStore, EmployeeStore, LeaveStore, OrganizationStore, SalaryStore,
    StoreError, StoreResult, conflict, newest_first, not_found,
};

/// Rows of one entity keyed by id, with a monotonically increasing id sequence.
#[derive(Debug)]
struct Table<E> {
    rows: BTreeMap<i64, E>,
    next_id: i64,
}

impl<E> Default for Table<E> {
    fn default() -> Self {
        Self { rows: BTreeMap::new(), next_id: 1 }
    }
}

impl<E: Entity + Clone> Table<E> {
    fn insert_with(&mut self, build: impl FnOnce(E::Id) -> E) -> E {
        let id = E::Id::from_raw(self.next_id);
        self.next_id += 1;
        let row = build(id);
        self.rows.insert(id.raw(), row.clone());
        row
    }

    fn get(&self, id: E::Id) -> Option<&E> {
        self.rows.get(&id.raw())
    }

    fn contains(&self, id: E::Id) -> bool {
        self.rows.contains_key(&id.raw())
    }

    fn put(&mut self, row: E) {
        self.rows.insert(row.id().raw(), row);
    }

    fn remove(&mut self, id: E::Id) -> Option<E> {
        self.rows.remove(&id.raw())
    }

    fn all(&self) -> Vec<E> {
        self.rows.values().cloned().collect()
    }

    fn filter(&self, pred: impl Fn(&E) -> bool) -> Vec<E> {
        self.rows.values().filter(|row| pred(row)).cloned().collect()
    }

    fn any(&self, pred: impl Fn(&E) -> bool) -> bool {
        self.rows.values().any(pred)
    }

    fn retain(&mut self, keep: impl Fn(&E) -> bool) {
        self.rows.retain(|_, row| keep(row));
    }
}

#[derive(Debug, Default)]
struct Tables {
    employees: Table<Employee>,
    departments: Table<Department>,
    posts: Table<Post>,
    leave_types: Table<LeaveType>,
    leave_requests: Table<LeaveRequest>,
    salaries: Table<Salary>,
    accounts: Table<Account>,
    articles: Table<Article>,
    comments: Table<Comment>,
}

impl Tables {
    fn employee_email_taken(&self, email: &str, except: Option<EmployeeId>) -> bool {
        self.employees
            .any(|e| e.email == email && Some(e.id) != except)
    }

    fn account_email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.accounts.any(|a| a.email == email && Some(a.id) != except)
    }

    fn require_post(&self, id: PostId) -> StoreResult<()> {
        if self.posts.contains(id) { Ok(()) } else { Err(not_found("post", id)) }
    }

    fn require_employee(&self, id: EmployeeId) -> StoreResult<()> {
        if self.employees.contains(id) { Ok(()) } else { Err(not_found("employee", id)) }
    }
}

/// In-memory implementation of every store trait.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StoreError::Database("in-memory store lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StoreError::Database("in-memory store lock poisoned".into()))
    }
}

#[async_trait]
impl EmployeeStore for InMemoryStore {
    async fn create_employee(&self, new: NewEmployee, now: DateTime<Utc>) -> StoreResult<Employee> {
        let mut t = self.write()?;
        t.require_post(new.post_id)?;
        if t.employee_email_taken(&new.email, None) {
            return Err(conflict("email already in use"));
        }
        Ok(t.employees.insert_with(|id| new.into_employee(id, now)))
    }

    async fn list_employees(&self) -> StoreResult<Vec<Employee>> {
        Ok(self.read()?.employees.all())
    }

    async fn list_employees_by_post(&self, post_id: PostId) -> StoreResult<Vec<Employee>> {
        Ok(self.read()?.employees.filter(|e| e.post_id == post_id))
    }

    async fn get_employee(&self, id: EmployeeId) -> StoreResult<Option<Employee>> {
        Ok(self.read()?.employees.get(id).cloned())
    }

    async fn find_employee_by_email(&self, email: &str) -> StoreResult<Option<Employee>> {
        Ok(self.read()?.employees.filter(|e| e.email == email).into_iter().next())
    }

    async fn update_employee(&self, id: EmployeeId, changes: EmployeeChanges) -> StoreResult<Employee> {
        let mut t = self.write()?;
        let mut employee = t.employees.get(id).cloned().ok_or_else(|| not_found("employee", id))?;
        if let Some(post_id) = changes.post_id {
            t.require_post(post_id)?;
        }
        if let Some(email) = &changes.email {
            if t.employee_email_taken(email, Some(id)) {
                return Err(conflict("email already in use"));
            }
        }
        changes.apply(&mut employee);
        t.employees.put(employee.clone());
        Ok(employee)
    }

    async fn delete_employee(&self, id: EmployeeId) -> StoreResult<()> {
        let mut t = self.write()?;
        t.employees.remove(id).ok_or_else(|| not_found("employee", id))?;
        t.leave_requests.retain(|r| r.employee_id != id);
        t.salaries.retain(|s| s.employee_id != id);
        Ok(())
    }
}

#[async_trait]
impl OrganizationStore for InMemoryStore {
    async fn create_department(&self, spec: DepartmentSpec) -> StoreResult<Department> {
        let mut t = self.write()?;
        Ok(t.departments.insert_with(|id| Department { id, name: spec.name }))
    }

    async fn list_departments(&self) -> StoreResult<Vec<Department>> {
        Ok(self.read()?.departments.all())
    }

    async fn get_department(&self, id: DepartmentId) -> StoreResult<Option<Department>> {
        Ok(self.read()?.departments.get(id).cloned())
    }

    async fn update_department(&self, id: DepartmentId, spec: DepartmentSpec) -> StoreResult<Department> {
        let mut t = self.write()?;
        if !t.departments.contains(id) {
            return Err(not_found("department", id));
        }
        let department = Department { id, name: spec.name };
        t.departments.put(department.clone());
        Ok(department)
    }

    async fn delete_department(&self, id: DepartmentId) -> StoreResult<()> {
        let mut t = self.write()?;
        if !t.departments.contains(id) {
            return Err(not_found("department", id));
        }
        if t.posts.any(|p| p.department_id == id) {
            return Err(conflict("department still has posts"));
        }
        t.departments.remove(id);
        Ok(())
    }

    async fn create_post(&self, spec: PostSpec) -> StoreResult<Post> {
        let mut t = self.write()?;
        if !t.departments.contains(spec.department_id) {
            return Err(not_found("department", spec.department_id));
        }
        Ok(t.posts.insert_with(|id| Post { id, title: spec.title, department_id: spec.department_id }))
    }

    async fn list_posts(&self) -> StoreResult<Vec<Post>> {
        Ok(self.read()?.posts.all())
    }

    async fn list_posts_by_department(&self, department_id: DepartmentId) -> StoreResult<Vec<Post>> {
        Ok(self.read()?.posts.filter(|p| p.department_id == department_id))
    }

    async fn get_post(&self, id: PostId) -> StoreResult<Option<Post>> {
        Ok(self.read()?.posts.get(id).cloned())
    }

    async fn update_post(&self, id: PostId, spec: PostSpec) -> StoreResult<Post> {
        let mut t = self.write()?;
        if !t.posts.contains(id) {
            return Err(not_found("post", id));
        }
        if !t.departments.contains(spec.department_id) {
            return Err(not_found("department", spec.department_id));
        }
        let post = Post { id, title: spec.title, department_id: spec.department_id };
        t.posts.put(post.clone());
        Ok(post)
    }

    async fn delete_post(&self, id: PostId) -> StoreResult<()> {
        let mut t = self.write()?;
        t.require_post(id)?;
        if t.employees.any(|e| e.post_id == id) {
            return Err(conflict("post is still held by employees"));
        }
        t.posts.remove(id);
        Ok(())
    }
}

#[async_trait]
impl LeaveStore for InMemoryStore {
    async fn create_leave_type(&self, spec: LeaveTypeSpec) -> StoreResult<LeaveType> {
        let mut t = self.write()?;
        Ok(t.leave_types.insert_with(|id| spec.into_leave_type(id)))
    }

    async fn list_leave_types(&self) -> StoreResult<Vec<LeaveType>> {
        Ok(self.read()?.leave_types.all())
    }

    async fn get_leave_type(&self, id: LeaveTypeId) -> StoreResult<Option<LeaveType>> {
        Ok(self.read()?.leave_types.get(id).cloned())
    }

    async fn update_leave_type(&self, id: LeaveTypeId, spec: LeaveTypeSpec) -> StoreResult<LeaveType> {
        let mut t = self.write()?;
        if !t.leave_types.contains(id) {
            return Err(not_found("leave type", id));
        }
        let leave_type = spec.into_leave_type(id);
        t.leave_types.put(leave_type.clone());
        Ok(leave_type)
    }

    async fn delete_leave_type(&self, id: LeaveTypeId) -> StoreResult<()> {
        let mut t = self.write()?;
        if !t.leave_types.contains(id) {
            return Err(not_found("leave type", id));
        }
        if t.leave_requests.any(|r| r.leave_type_id == id) {
            return Err(conflict("leave type is referenced by leave requests"));
        }
        t.leave_types.remove(id);
        Ok(())
    }

    async fn create_leave_request(
        &self,
        cmd: CreateLeaveRequest,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> StoreResult<LeaveRequest> {
        let mut t = self.write()?;
        let facts = AdmissionFacts {
            hire_date: t.employees.get(cmd.employee_id).map(|e| e.hire_date),
            leave_type_exists: t.leave_types.contains(cmd.leave_type_id),
            today,
        };
        let admitted = admit(cmd, facts)?;
        Ok(t.leave_requests.insert_with(|id| admitted.into_leave_request(id, now)))
    }

    async fn list_leave_requests(&self) -> StoreResult<Vec<LeaveRequest>> {
        let mut requests = self.read()?.leave_requests.all();
        newest_first(&mut requests);
        Ok(requests)
    }

    async fn list_leave_requests_for_employee(&self, employee_id: EmployeeId) -> StoreResult<Vec<LeaveRequest>> {
        let mut requests = self.read()?.leave_requests.filter(|r| r.employee_id == employee_id);
        newest_first(&mut requests);
        Ok(requests)
    }

    async fn list_leave_requests_for_type(&self, leave_type_id: LeaveTypeId) -> StoreResult<Vec<LeaveRequest>> {
        let mut requests = self.read()?.leave_requests.filter(|r| r.leave_type_id == leave_type_id);
        newest_first(&mut requests);
        Ok(requests)
    }

    async fn update_leave_request(
        &self,
        id: LeaveRequestId,
        cmd: UpdateLeaveRequest,
    ) -> StoreResult<(LeaveRequest, StatusChange)> {
        let mut t = self.write()?;
        let mut request = t
            .leave_requests
            .get(id)
            .cloned()
            .ok_or_else(|| not_found("leave request", id))?;
        t.require_employee(cmd.employee_id)?;
        if !t.leave_types.contains(cmd.leave_type_id) {
            return Err(not_found("leave type", cmd.leave_type_id));
        }
        let change = cmd.apply(&mut request);
        t.leave_requests.put(request.clone());
        Ok((request, change))
    }

    async fn delete_leave_request(&self, id: LeaveRequestId) -> StoreResult<()> {
        self.write()?
            .leave_requests
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found("leave request", id))
    }
}

#[async_trait]
impl SalaryStore for InMemoryStore {
    async fn create_salary(&self, cmd: RecordSalary) -> StoreResult<Salary> {
        let mut t = self.write()?;
        t.require_employee(cmd.employee_id)?;
        Ok(t.salaries.insert_with(|id| cmd.into_salary(id)))
    }

    async fn list_salaries(&self) -> StoreResult<Vec<Salary>> {
        Ok(self.read()?.salaries.all())
    }

    async fn list_salaries_for_employee(&self, employee_id: EmployeeId) -> StoreResult<Vec<Salary>> {
        Ok(self.read()?.salaries.filter(|s| s.employee_id == employee_id))
    }

    async fn update_salary(&self, id: SalaryId, cmd: RecordSalary) -> StoreResult<Salary> {
        let mut t = self.write()?;
        if !t.salaries.contains(id) {
            return Err(not_found("salary", id));
        }
        t.require_employee(cmd.employee_id)?;
        let salary = cmd.into_salary(id);
        t.salaries.put(salary.clone());
        Ok(salary)
    }

    async fn delete_salary(&self, id: SalaryId) -> StoreResult<()> {
        self.write()?
            .salaries
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found("salary", id))
    }
}

#[async_trait]
impl AccountStore for InMemoryStore {
    async fn create_account(&self, new: NewAccount, now: DateTime<Utc>) -> StoreResult<Account> {
        let mut t = self.write()?;
        if t.account_email_taken(&new.email, None) {
            return Err(conflict("email already in use"));
        }
        Ok(t.accounts.insert_with(|id| new.into_account(id, now)))
    }

    async fn get_account(&self, id: UserId) -> StoreResult<Option<Account>> {
        Ok(self.read()?.accounts.get(id).cloned())
    }

    async fn update_account(&self, id: UserId, changes: AccountChanges) -> StoreResult<Account> {
        let mut t = self.write()?;
        let mut account = t.accounts.get(id).cloned().ok_or_else(|| not_found("user", id))?;
        if let Some(email) = &changes.email {
            if t.account_email_taken(email, Some(id)) {
                return Err(conflict("email already in use"));
            }
        }
        changes.apply(&mut account);
        t.accounts.put(account.clone());
        Ok(account)
    }

    async fn delete_account(&self, id: UserId) -> StoreResult<()> {
        let mut t = self.write()?;
        t.accounts.remove(id).ok_or_else(|| not_found("user", id))?;
        let authored: Vec<ArticleId> = t.articles.filter(|a| a.user_id == id).iter().map(|a| a.id).collect();
        t.articles.retain(|a| a.user_id != id);
        t.comments
            .retain(|c| c.user_id != id && !authored.contains(&c.article_id));
        Ok(())
    }
}

#[async_trait]
impl ContentStore for InMemoryStore {
    async fn create_article(&self, spec: ArticleSpec, author: UserId, now: DateTime<Utc>) -> StoreResult<Article> {
        let mut t = self.write()?;
        if !t.accounts.contains(author) {
            return Err(not_found("user", author));
        }
        Ok(t.articles.insert_with(|id| spec.into_article(id, author, now)))
    }

    async fn list_articles(&self) -> StoreResult<Vec<Article>> {
        Ok(self.read()?.articles.all())
    }

    async fn get_article(&self, id: ArticleId) -> StoreResult<Option<Article>> {
        Ok(self.read()?.articles.get(id).cloned())
    }

    async fn update_article(&self, id: ArticleId, changes: ArticleChanges) -> StoreResult<Article> {
        let mut t = self.write()?;
        let mut article = t.articles.get(id).cloned().ok_or_else(|| not_found("article", id))?;
        changes.apply(&mut article);
        t.articles.put(article.clone());
        Ok(article)
    }

    async fn delete_article(&self, id: ArticleId) -> StoreResult<()> {
        let mut t = self.write()?;
        t.articles.remove(id).ok_or_else(|| not_found("article", id))?;
        t.comments.retain(|c| c.article_id != id);
        Ok(())
    }

    async fn create_comment(&self, cmd: CreateComment, author: UserId, now: DateTime<Utc>) -> StoreResult<Comment> {
        let mut t = self.write()?;
        if !t.articles.contains(cmd.article_id) {
            return Err(not_found("article", cmd.article_id));
        }
        if !t.accounts.contains(author) {
            return Err(not_found("user", author));
        }
        Ok(t.comments.insert_with(|id| cmd.into_comment(id, author, now)))
    }

    async fn list_comments(&self) -> StoreResult<Vec<Comment>> {
        Ok(self.read()?.comments.all())
    }

    async fn list_comments_for_article(&self, article_id: ArticleId) -> StoreResult<Vec<Comment>> {
        Ok(self.read()?.comments.filter(|c| c.article_id == article_id))
    }

    async fn get_comment(&self, id: CommentId) -> StoreResult<Option<Comment>> {
        Ok(self.read()?.comments.get(id).cloned())
    }

    async fn update_comment(&self, id: CommentId, cmd: UpdateComment) -> StoreResult<Comment> {
        let mut t = self.write()?;
        let mut comment = t.comments.get(id).cloned().ok_or_else(|| not_found("comment", id))?;
        comment.content = cmd.content;
        t.comments.put(comment.clone());
        Ok(comment)
    }
}
