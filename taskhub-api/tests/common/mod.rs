/// Common test utilities for integration tests
///
/// Provides shared infrastructure:
/// - Test database setup (skipped gracefully when DATABASE_URL is unset)
/// - Router construction with a log-only mailer
/// - Signup/login helpers that drive the real endpoints
///
/// Each context namespaces its users by a random suffix, so tests can run
/// concurrently against one database.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use sqlx::PgPool;
use taskhub_api::app::{build_router, AppState};
use taskhub_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig, SmtpConfig};
use taskhub_shared::email::Mailer;
use tower::Service as _;
use uuid::Uuid;

/// Test context containing the database pool and a ready-to-call router
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
}

/// An account created through the signup endpoint
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub token: String,
}

impl TestUser {
    /// Returns the authorization header value for this user's session
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl TestContext {
    /// Creates a new test context, or `None` when no database is configured
    ///
    /// Tests call this first and return early on `None`, so the suite passes
    /// on machines without Postgres.
    pub async fn new() -> Option<Self> {
        let database_url = std::env::var("DATABASE_URL").ok()?;

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            database: DatabaseConfig {
                url: database_url.clone(),
                max_connections: 5,
            },
            jwt: JwtConfig {
                secret: "integration-test-secret-0123456789abcdef".to_string(),
            },
            smtp: SmtpConfig {
                url: None,
                from: "Task Manager <no-reply@taskhub.local>".to_string(),
            },
        };

        let db = PgPool::connect(&database_url)
            .await
            .expect("test database should be reachable");

        // Path relative to Cargo.toml, not this file
        sqlx::migrate!("../migrations")
            .run(&db)
            .await
            .expect("migrations should apply");

        let state = AppState::new(db.clone(), config, Mailer::disabled());
        let app = build_router(state);

        Some(TestContext { db, app })
    }

    /// Issues a request against the router and returns the response
    pub async fn call(&mut self, request: Request<Body>) -> axum::response::Response {
        self.app.call(request).await.expect("router call")
    }

    /// Creates a unique user through POST /users and returns its session
    pub async fn signup_user(&mut self, name: &str) -> TestUser {
        let email = format!("{}-{}@example.com", name.to_lowercase(), Uuid::new_v4());
        let password = "seCret99!".to_string();

        let response = self
            .call(json_request(
                "POST",
                "/users",
                None,
                serde_json::json!({
                    "name": name,
                    "email": email,
                    "password": password,
                }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED, "signup must succeed");

        let body = read_json(response).await;
        TestUser {
            id: body["user"]["id"]
                .as_str()
                .and_then(|s| Uuid::parse_str(s).ok())
                .expect("signup response carries the user id"),
            email,
            password,
            token: body["token"].as_str().expect("session token").to_string(),
        }
    }

    /// Creates a task for `user` through POST /tasks and returns its id
    pub async fn create_task(&mut self, user: &TestUser, description: &str, status: bool) -> Uuid {
        let response = self
            .call(json_request(
                "POST",
                "/tasks",
                Some(&user.auth_header()),
                serde_json::json!({ "description": description, "status": status }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED, "task creation must succeed");

        let body = read_json(response).await;
        body["id"]
            .as_str()
            .and_then(|s| Uuid::parse_str(s).ok())
            .expect("task response carries the id")
    }
}

/// Builds a JSON request, with optional authorization
pub fn json_request(
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");

    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }

    builder.body(Body::from(body.to_string())).expect("request")
}

/// Builds a bodiless request, with optional authorization
pub fn empty_request(method: &str, uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }

    builder.body(Body::empty()).expect("request")
}

/// Reads a response body as JSON
pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body");
    serde_json::from_slice(&body).expect("response body should be JSON")
}
