use chrono::{Duration as ChronoDuration, Months, NaiveDate, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{StatusCode, header};
use serde_json::{Value, json};

use hrportal_infra::AppConfig;

const SECRET: &str = "black-box-secret";
const ADMIN_EMAIL: &str = "admin@hr.test";
const ADMIN_PASSWORD: &str = "admin-password";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory store, ephemeral port.
        let config = AppConfig::in_memory(SECRET).with_bootstrap_admin(ADMIN_EMAIL, ADMIN_PASSWORD);
        let app = hrportal_api::app::build_app(&config).await.expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, method: reqwest::Method, path: &str, cookie: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = self.client.request(method, self.url(path));
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let res = req.send().await.unwrap();
        let status = res.status();
        let body = res.json::<Value>().await.unwrap_or(Value::Null);
        (status, body)
    }

    async fn get(&self, path: &str, cookie: Option<&str>) -> (StatusCode, Value) {
        self.send(reqwest::Method::GET, path, cookie, None).await
    }

    async fn post(&self, path: &str, cookie: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(reqwest::Method::POST, path, cookie, Some(body)).await
    }

    async fn put(&self, path: &str, cookie: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(reqwest::Method::PUT, path, cookie, Some(body)).await
    }

    async fn delete(&self, path: &str, cookie: Option<&str>) -> (StatusCode, Value) {
        self.send(reqwest::Method::DELETE, path, cookie, None).await
    }

    /// Log in and return the `jwtToken=...` pair plus the response body.
    async fn login(&self, email: &str, password: &str) -> (String, Value) {
        let res = self
            .client
            .post(self.url("/user/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK, "login failed for {email}");
        let cookie = session_pair(&res);
        (cookie, res.json().await.unwrap())
    }

    async fn admin(&self) -> String {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.0
    }

    /// Department + post, returning the post id.
    async fn post_fixture(&self, admin: &str) -> i64 {
        let (status, dept) = self.post("/departments", Some(admin), json!({ "name": "Engineering" })).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, post) = self
            .post("/posts", Some(admin), json!({ "title": "Developer", "departmentId": dept["id"] }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        post["id"].as_i64().unwrap()
    }

    async fn hire(&self, admin: &str, post_id: i64, email: &str, hire_date: NaiveDate) -> i64 {
        let (status, body) = self
            .post(
                "/employee",
                Some(admin),
                json!({
                    "firstname": "Jo",
                    "lastname": "Doe",
                    "email": email,
                    "password": "employee-password",
                    "postId": post_id,
                    "hireDate": hire_date.to_string(),
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "hire failed: {body}");
        body["id"].as_i64().unwrap()
    }

    async fn leave_type(&self, admin: &str) -> i64 {
        let (status, body) = self
            .post("/leaveTypes", Some(admin), json!({ "name": "Annual", "maxDays": 25 }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["carryForward"], false);
        body["id"].as_i64().unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn session_pair(res: &reqwest::Response) -> String {
    let raw = res
        .headers()
        .get(header::SET_COOKIE)
        .expect("missing Set-Cookie")
        .to_str()
        .unwrap();
    raw.split(';').next().unwrap().to_string()
}

fn months_ago(months: u32) -> NaiveDate {
    Utc::now().date_naive().checked_sub_months(Months::new(months)).unwrap()
}

fn mint_jwt(secret: &str, id: i64, is_admin: bool, exp_offset: ChronoDuration) -> String {
    let now = Utc::now();
    let claims = json!({
        "id": id,
        "kind": "employee",
        "isAdmin": is_admin,
        "iat": now.timestamp(),
        "exp": (now + exp_offset).timestamp(),
    });
    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode jwt");
    format!("jwtToken={token}")
}

#[tokio::test]
async fn health_is_public() {
    let server = TestServer::spawn().await;
    let res = server.client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_sets_cookie_and_reports_admin_flag() {
    let server = TestServer::spawn().await;
    let res = server
        .client
        .post(server.url("/user/login"))
        .json(&json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let set_cookie = res.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Strict"));
    assert!(set_cookie.contains("Max-Age=2592000"));

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["user"]["isAdmin"], true);
    assert_eq!(body["user"]["email"], ADMIN_EMAIL);

    let (status, body) = server
        .post("/user/login", None, json!({ "email": ADMIN_EMAIL, "password": "nope" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "invalid credentials");

    let (status, _) = server.post("/user/login", None, json!({ "email": ADMIN_EMAIL })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let res = server.client.get(server.url("/user/logout")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let cleared = res.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(cleared.starts_with("jwtToken=;"));
    assert!(cleared.contains("Max-Age=0"));
    assert!(cleared.contains("HttpOnly"));
}

#[tokio::test]
async fn guarded_routes_reject_without_mutating() {
    let server = TestServer::spawn().await;
    let admin = server.admin().await;
    let post_id = server.post_fixture(&admin).await;
    server.hire(&admin, post_id, "jo@hr.test", months_ago(12)).await;
    let (employee, _) = server.login("jo@hr.test", "employee-password").await;

    let (status, body) = server.post("/departments", None, json!({ "name": "Ghost" })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, body) = server.post("/departments", Some(&employee), json!({ "name": "Ghost" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "only admin access");

    let (_, departments) = server.get("/departments", Some(&admin)).await;
    let names: Vec<&str> = departments
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert!(!names.contains(&"Ghost"));
}

#[tokio::test]
async fn forged_and_expired_credentials_are_401() {
    let server = TestServer::spawn().await;

    let forged = mint_jwt("some-other-secret", 1, true, ChronoDuration::minutes(10));
    let (status, _) = server.get("/employee", Some(&forged)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let expired = mint_jwt(SECRET, 1, true, ChronoDuration::minutes(-10));
    let (status, _) = server.get("/employee", Some(&expired)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let valid = mint_jwt(SECRET, 1, true, ChronoDuration::minutes(10));
    let (status, _) = server.get("/employee", Some(&valid)).await;
    assert_eq!(status, StatusCode::OK);

    // Public routes ignore a bad cookie.
    let (status, _) = server.get("/leaveTypes", Some(&forged)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn department_and_post_round_trip() {
    let server = TestServer::spawn().await;
    let admin = server.admin().await;

    let (status, dept) = server.post("/departments", Some(&admin), json!({ "name": "  Finance " })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(dept["name"], "Finance");

    let (status, _) = server.post("/departments", Some(&admin), json!({ "name": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Ids may arrive as numeric strings.
    let dept_id = dept["id"].as_i64().unwrap();
    let (status, post) = server
        .post("/posts", Some(&admin), json!({ "title": "Accountant", "departmentId": dept_id.to_string() }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, fetched) = server.get(&format!("/posts/{}", post["id"]), Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["department"]["name"], "Finance");
    assert_eq!(fetched["employees"], json!([]));

    let (status, _) = server
        .post("/posts", Some(&admin), json!({ "title": "Orphan", "departmentId": 9999 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = server.delete(&format!("/departments/{dept_id}"), Some(&admin)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn self_service_leave_respects_seniority() {
    let server = TestServer::spawn().await;
    let admin = server.admin().await;
    let post_id = server.post_fixture(&admin).await;
    let leave_type = server.leave_type(&admin).await;

    server.hire(&admin, post_id, "new@hr.test", months_ago(3)).await;
    server.hire(&admin, post_id, "old@hr.test", months_ago(12)).await;
    let (junior, _) = server.login("new@hr.test", "employee-password").await;
    let (senior, senior_body) = server.login("old@hr.test", "employee-password").await;

    let request = json!({
        "leaveTypeId": leave_type,
        "startDate": "2030-07-01",
        "endDate": "2030-07-05",
        "status": "APPROVED",
        "employeeId": 1,
    });

    let (status, body) = server.post("/employerequest", Some(&junior), request.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "must have at least 6 months seniority to request leave");

    // Eligibility is settled before the dates are read.
    let (status, body) = server
        .post(
            "/employerequest",
            Some(&junior),
            json!({ "leaveTypeId": leave_type, "startDate": "next tuesday", "endDate": "2030-07-05" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "must have at least 6 months seniority to request leave");
    let (status, _) = server
        .post(
            "/employerequest",
            Some(&junior),
            json!({ "leaveTypeId": leave_type, "startDate": "2030-07-05", "endDate": "2030-07-01" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = server
        .post(
            "/employerequest",
            Some(&senior),
            json!({ "leaveTypeId": leave_type, "startDate": "next tuesday", "endDate": "2030-07-05" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, body) = server.post("/employerequest", Some(&senior), request).await;
    assert_eq!(status, StatusCode::CREATED);
    // Client-supplied status and employee are ignored.
    assert_eq!(body["status"], "PENDING");
    assert_eq!(body["employeeId"], senior_body["user"]["id"]);

    let (status, body) = server.post("/employerequest", Some(&admin), json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "admins cannot create leave requests");
}

#[tokio::test]
async fn admin_leave_requests_check_employee_before_dates() {
    let server = TestServer::spawn().await;
    let admin = server.admin().await;
    let post_id = server.post_fixture(&admin).await;
    let leave_type = server.leave_type(&admin).await;
    let employee = server.hire(&admin, post_id, "jo@hr.test", months_ago(24)).await;
    let newcomer = server.hire(&admin, post_id, "kit@hr.test", months_ago(2)).await;

    // Missing fields are reported before anything is looked up.
    let (status, body) = server
        .post("/leaveRequests", Some(&admin), json!({ "employeeId": 9999, "leaveTypeId": leave_type }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "startDate is required");

    // The missing employee wins over the malformed date.
    let (status, _) = server
        .post(
            "/leaveRequests",
            Some(&admin),
            json!({ "employeeId": 9999, "leaveTypeId": leave_type, "startDate": "01/07/2030", "endDate": "2030-07-05" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Admins cannot bypass the seniority rule on someone else's behalf.
    let (status, body) = server
        .post(
            "/leaveRequests",
            Some(&admin),
            json!({ "employeeId": newcomer, "leaveTypeId": leave_type, "startDate": "01/07/2030", "endDate": "2030-07-05", "status": "APPROVED" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "must have at least 6 months seniority to request leave");

    let (status, _) = server
        .post(
            "/leaveRequests",
            Some(&admin),
            json!({ "employeeId": employee, "leaveTypeId": leave_type, "startDate": "01/07/2030", "endDate": "2030-07-05" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server
        .post(
            "/leaveRequests",
            Some(&admin),
            json!({ "employeeId": 9999, "leaveTypeId": leave_type, "startDate": "2030-07-01", "endDate": "2030-07-05" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = server
        .post(
            "/leaveRequests",
            Some(&admin),
            json!({ "employeeId": employee, "leaveTypeId": leave_type, "startDate": "2030-07-05", "endDate": "2030-07-01" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server
        .post(
            "/leaveRequests",
            Some(&admin),
            json!({ "employeeId": employee, "leaveTypeId": leave_type, "startDate": "2030-07-01", "endDate": "2030-07-05", "status": "MAYBE" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, created) = server
        .post(
            "/leaveRequests",
            Some(&admin),
            json!({ "employeeId": employee, "leaveTypeId": leave_type, "startDate": "2030-07-01", "endDate": "2030-07-05", "status": "APPROVED" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "APPROVED");

    let (status, listed) = server.get("/leaveRequests", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed[0]["employee"]["firstname"], "Jo");
    assert_eq!(listed[0]["leaveType"]["name"], "Annual");

    // Reopening a decision is allowed.
    let (status, updated) = server
        .put(
            &format!("/leaveRequests/{}", created["id"]),
            Some(&admin),
            json!({ "employeeId": employee, "leaveTypeId": leave_type, "startDate": "2030-07-01", "endDate": "2030-07-02", "status": "PENDING" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "PENDING");
    assert_eq!(updated["endDate"], "2030-07-02");

    let (status, _) = server.delete(&format!("/leaveTypes/{leave_type}"), Some(&admin)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn employees_only_list_their_own_requests() {
    let server = TestServer::spawn().await;
    let admin = server.admin().await;
    let post_id = server.post_fixture(&admin).await;
    let leave_type = server.leave_type(&admin).await;
    let alice = server.hire(&admin, post_id, "alice@hr.test", months_ago(12)).await;
    let bob = server.hire(&admin, post_id, "bob@hr.test", months_ago(12)).await;

    for employee in [alice, bob] {
        let (status, _) = server
            .post(
                "/leaveRequests",
                Some(&admin),
                json!({ "employeeId": employee, "leaveTypeId": leave_type, "startDate": "2030-01-01", "endDate": "2030-01-02" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (cookie, _) = server.login("alice@hr.test", "employee-password").await;
    for path in ["/leaveRequests/me", "/employerequest/me"] {
        let (status, mine) = server.get(path, Some(&cookie)).await;
        assert_eq!(status, StatusCode::OK);
        let mine = mine.as_array().unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0]["employeeId"], alice);
        assert_eq!(mine[0]["leaveType"]["id"], leave_type);
    }

    let (status, _) = server.get("/leaveRequests/me", Some(&admin)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = server.get("/leaveRequests", Some(&cookie)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn salaries_are_admin_managed_and_self_visible() {
    let server = TestServer::spawn().await;
    let admin = server.admin().await;
    let post_id = server.post_fixture(&admin).await;
    let employee = server.hire(&admin, post_id, "jo@hr.test", months_ago(12)).await;

    let (status, _) = server
        .post("/salaires", Some(&admin), json!({ "amount": -1, "employeeId": employee }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server
        .post("/salaires", Some(&admin), json!({ "amount": "3200.50", "employeeId": employee }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (cookie, _) = server.login("jo@hr.test", "employee-password").await;
    let (status, _) = server.get("/salaires", Some(&cookie)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, mine) = server.get("/salaires/me", Some(&cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 1);
    assert_eq!(mine[0]["employeeId"], employee);
    assert_eq!(mine[0]["employee"]["id"], employee);
    assert_eq!(mine[0]["employee"]["firstname"], "Jo");
    assert!(mine[0]["employee"].get("email").is_none());

    // Deleting the employee takes their salaries along.
    let (status, _) = server.delete(&format!("/employee/{employee}"), Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    let (_, all) = server.get("/salaires", Some(&admin)).await;
    assert_eq!(all, json!([]));
}

#[tokio::test]
async fn employee_profile_is_owner_only() {
    let server = TestServer::spawn().await;
    let admin = server.admin().await;
    let post_id = server.post_fixture(&admin).await;
    let alice = server.hire(&admin, post_id, "alice@hr.test", months_ago(12)).await;
    let bob = server.hire(&admin, post_id, "bob@hr.test", months_ago(12)).await;
    let (cookie, _) = server.login("alice@hr.test", "employee-password").await;

    let (status, body) = server
        .put(&format!("/employee/{alice}/profile"), Some(&cookie), json!({ "phone": "555-0100" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phone"], "555-0100");
    assert!(body.get("passwordHash").is_none());

    let (status, _) = server.get(&format!("/employee/{bob}/profile"), Some(&cookie)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admin flag does not grant access to someone else's profile.
    let (status, _) = server.get(&format!("/employee/{alice}/profile"), Some(&admin)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn articles_belong_to_their_author() {
    let server = TestServer::spawn().await;

    let register = |name: &'static str| {
        let server = &server;
        async move {
            let res = server
                .client
                .post(server.url("/user/register"))
                .json(&json!({ "name": name, "email": format!("{name}@blog.test"), "password": "pw" }))
                .send()
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::CREATED);
            session_pair(&res)
        }
    };
    let writer = register("writer").await;
    let reader = register("reader").await;

    let (status, article) = server
        .post("/articles", Some(&writer), json!({ "title": "Hello", "description": "First post" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let path = format!("/articles/{}", article["id"]);

    let (status, _) = server
        .post("/comments", Some(&reader), json!({ "content": "Nice", "articleId": article["id"] }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, detail) = server.get(&path, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["user"]["name"], "writer");
    assert_eq!(detail["comments"][0]["user"]["name"], "reader");

    let (status, _) = server.put(&path, Some(&reader), json!({ "title": "Hijacked" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = server.put(&path, Some(&writer), json!({ "title": "Hello again" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Hello again");

    let (status, _) = server.delete(&path, Some(&writer)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = server.get(&path, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
