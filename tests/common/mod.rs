#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, Response, StatusCode, header};
use http_body_util::BodyExt;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use university_service::app::create_app;
use university_service::config::Config;
use university_service::entities::{sea_orm_active_enums::RoleEnum, user};
use university_service::redis_service::InMemoryJwtBlacklist;
use university_service::repositories::{NewUser, UserRepository};
use university_service::state::AppState;

pub const PASSWORD: &str = "Secret123!";
pub const BOUNDARY: &str = "X-UNIVERSITY-TEST-BOUNDARY";

pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
    /// Kept alive for the media files written during the test.
    pub media: TempDir,
}

pub fn test_config(media_root: &str) -> Config {
    Config {
        port: 0,
        swagger_enabled: false,
        log_level: "debug".into(),
        database_url: "sqlite::memory:".into(),
        run_migrations: true,
        redis_url: "redis://127.0.0.1:6379".into(),
        app_env: "test".into(),
        debug: true,
        jwt_secret: "integration-test-secret".into(),
        access_token_lifetime_secs: 60,
        refresh_token_lifetime_secs: 3600,
        rotate_refresh_tokens: true,
        bcrypt_cost: 4,
        allow_header_auth: false,
        cors_allowed_origins: "*".into(),
        media_root: media_root.into(),
        media_url: "/media/".into(),
        blocked_email_domains: "example.com,test.com".into(),
        admin_email: "root@university.edu".into(),
        admin_password: "Root1234!".into(),
    }
}

pub async fn spawn_app() -> TestApp {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    let media = tempfile::tempdir().unwrap();
    let config = Arc::new(test_config(media.path().to_str().unwrap()));
    let state = AppState::new(
        db.clone(),
        config.clone(),
        Arc::new(InMemoryJwtBlacklist::new()),
    );
    let router = create_app(state).unwrap();

    TestApp {
        router,
        db,
        config,
        media,
    }
}

/// Whoever is calling: the cookie header to send, if any.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub cookie: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// `name=value` pairs of every non-empty `Set-Cookie` header.
pub fn cookies_from<B>(response: &Response<B>) -> Vec<(String, String)> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|raw| raw.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .filter(|(_, value)| !value.is_empty())
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect()
}

pub fn cookie_header(cookies: &[(String, String)]) -> String {
    cookies
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("; ")
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    fn builder(method: &str, uri: &str, session: &Session) -> http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &session.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        session: &Session,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Self::builder(method, uri, session);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = self.send(request).await;
        let status = response.status();
        (status, body_json(response).await)
    }

    pub async fn get(&self, uri: &str, session: &Session) -> (StatusCode, Value) {
        self.request("GET", uri, session, None).await
    }

    pub async fn post(&self, uri: &str, session: &Session, body: Value) -> (StatusCode, Value) {
        self.request("POST", uri, session, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, session: &Session, body: Value) -> (StatusCode, Value) {
        self.request("PATCH", uri, session, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, session: &Session) -> (StatusCode, Value) {
        self.request("DELETE", uri, session, None).await
    }

    pub async fn multipart(
        &self,
        method: &str,
        uri: &str,
        session: &Session,
        body: Vec<u8>,
    ) -> (StatusCode, Value) {
        let request = Self::builder(method, uri, session)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        let response = self.send(request).await;
        let status = response.status();
        (status, body_json(response).await)
    }

    pub async fn create_user(&self, email: &str, role: RoleEnum, staff: bool, superuser: bool) -> user::Model {
        UserRepository::new(&self.db)
            .with_bcrypt_cost(4)
            .create_user(NewUser {
                email: email.to_string(),
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                password: PASSWORD.to_string(),
                role,
                is_staff: staff,
                is_superuser: superuser,
                ..Default::default()
            })
            .await
            .unwrap()
    }

    pub async fn login(&self, email: &str, password: &str) -> Session {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                serde_json::json!({ "email": email, "password": password }).to_string(),
            ))
            .unwrap();
        let response = self.send(request).await;
        assert_eq!(response.status(), StatusCode::OK, "login failed for {email}");
        Session {
            cookie: Some(cookie_header(&cookies_from(&response))),
        }
    }

    /// A fresh user with the given privileges, already logged in.
    pub async fn session_for(&self, role: RoleEnum, staff: bool, superuser: bool) -> Session {
        let email = format!("user-{}@university.edu", Uuid::new_v4().simple());
        self.create_user(&email, role, staff, superuser).await;
        self.login(&email, PASSWORD).await
    }

    pub async fn student(&self) -> Session {
        self.session_for(RoleEnum::Student, false, false).await
    }

    pub async fn teacher(&self) -> Session {
        self.session_for(RoleEnum::Teacher, false, false).await
    }

    pub async fn staff(&self) -> Session {
        self.session_for(RoleEnum::Admin, true, false).await
    }

    pub async fn superuser(&self) -> Session {
        self.session_for(RoleEnum::Admin, true, true).await
    }
}

/// Builds a multipart body from text parts and at most one file part.
pub struct MultipartBody {
    buf: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.buf.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.buf.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.buf
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.buf
    }
}
