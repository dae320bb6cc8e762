mod common;

use axum::body::Body;
use common::{
    MultipartBody, PASSWORD, Session, TestApp, body_json, cookie_header, cookies_from, spawn_app,
};
use http::{Request, StatusCode, header};
use serde_json::{Value, json};
use university_service::entities::sea_orm_active_enums::RoleEnum;

async fn register(app: &TestApp, payload: Value) -> (StatusCode, Value, Vec<(String, String)>) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let response = app.send(request).await;
    let status = response.status();
    let cookies = cookies_from(&response);
    (status, body_json(response).await, cookies)
}

async fn post_with_cookie(app: &TestApp, uri: &str, cookie: &str) -> http::Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    app.send(request).await
}

fn cookie_value<'a>(cookies: &'a [(String, String)], name: &str) -> Option<&'a str> {
    cookies
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}

#[tokio::test]
async fn register_signs_the_user_in() {
    let app = spawn_app().await;

    let (status, body, cookies) = register(
        &app,
        json!({
            "email": "Ada.Lovelace@University.edu",
            "first_name": "ada",
            "last_name": "lovelace",
            "password": PASSWORD,
            "bio": "<p>Hello <b>world</b></p>",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Registration successful");
    assert_eq!(body["user"]["email"], "ada.lovelace@university.edu");
    assert_eq!(body["user"]["full_name"], "Ada Lovelace");
    assert_eq!(body["user"]["role"], "student");
    assert_eq!(body["user"]["bio"], "<p>Hello world</p>");
    assert!(body["user"].get("password").is_none());
    assert!(cookie_value(&cookies, "access_token").is_some());
    assert!(cookie_value(&cookies, "refresh_token").is_some());

    let session = Session {
        cookie: Some(cookie_header(&cookies)),
    };
    let (status, me) = app.get("/api/v1/auth/me", &session).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "ada.lovelace@university.edu");
}

#[tokio::test]
async fn registration_rejects_bad_input() {
    let app = spawn_app().await;
    let base = json!({
        "email": "grace@university.edu",
        "first_name": "Grace",
        "last_name": "Hopper",
        "password": PASSWORD,
    });

    let mut blocked = base.clone();
    blocked["email"] = json!("grace@example.com");
    let (status, body, _) = register(&app, blocked).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["email"].is_array());

    let mut weak = base.clone();
    weak["password"] = json!("password");
    let (status, body, _) = register(&app, weak).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["password"].is_array());

    let (status, _, _) = register(&app, base.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body, _) = register(&app, base).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["email"][0], "This email is already registered.");
}

#[tokio::test]
async fn login_failure_is_generic() {
    let app = spawn_app().await;
    app.create_user(
        "alan@university.edu",
        RoleEnum::Student,
        false,
        false,
    )
    .await;

    let (status, body) = app
        .post(
            "/api/v1/auth/login",
            &Session::anonymous(),
            json!({ "email": "alan@university.edu", "password": "Wrong123!" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");
    assert_eq!(body["view"], "/api/v1/auth/login");

    let (status, _) = app.get("/api/v1/auth/me", &Session::anonymous()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_rotates_and_revokes_the_old_token() {
    let app = spawn_app().await;
    let session = app.student().await;
    let cookie = session.cookie.clone().unwrap();

    let response = post_with_cookie(&app, "/api/v1/auth/token/refresh", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
    let rotated = cookies_from(&response);
    assert!(cookie_value(&rotated, "access_token").is_some());
    assert!(cookie_value(&rotated, "refresh_token").is_some());

    let response = post_with_cookie(&app, "/api/v1/auth/token/refresh", &cookie).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_with_cookie(&app, "/api/v1/auth/token/refresh", &cookie_header(&rotated)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let (status, body) = app
        .post("/api/v1/auth/token/refresh", &Session::anonymous(), json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Refresh token is required");
}

#[tokio::test]
async fn logout_always_succeeds_and_revokes_refresh() {
    let app = spawn_app().await;
    let session = app.student().await;
    let cookie = session.cookie.clone().unwrap();

    let response = post_with_cookie(&app, "/api/v1/auth/logout", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cleared = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.starts_with("access_token=;") || v.starts_with("access_token=\"\""));
    assert!(cleared);

    let response = post_with_cookie(&app, "/api/v1/auth/token/refresh", &cookie).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .post("/api/v1/auth/logout", &Session::anonymous(), json!({ "refresh": "garbage" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out successfully");
}

#[tokio::test]
async fn profile_updates_respect_read_only_fields() {
    let app = spawn_app().await;
    let session = app.student().await;

    let (status, body) = app
        .post("/api/v1/auth/me", &session, json!({ "email": "new@university.edu" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Cannot modify read-only fields.");

    let (status, body) = app
        .post(
            "/api/v1/auth/me",
            &session,
            json!({ "first_name": "marie", "mobile_number": "+919876543210" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "Marie");
    assert_eq!(body["mobile_number"], "+919876543210");

    let (status, body) = app
        .post("/api/v1/auth/me", &session, json!({ "mobile_number": null }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["mobile_number"].is_null());
    assert_eq!(body["first_name"], "Marie");
}

#[tokio::test]
async fn change_password_requires_the_old_one() {
    let app = spawn_app().await;
    let email = "linus@university.edu";
    app.create_user(
        email,
        RoleEnum::Teacher,
        false,
        false,
    )
    .await;
    let session = app.login(email, PASSWORD).await;

    let (status, body) = app
        .post(
            "/api/v1/auth/password/change",
            &session,
            json!({ "old_password": "Nope1234!", "new_password": "Fresh123!" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["old_password"][0], "Incorrect current password.");

    let (status, _) = app
        .post(
            "/api/v1/auth/password/change",
            &session,
            json!({ "old_password": PASSWORD, "new_password": "Fresh123!" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    app.login(email, "Fresh123!").await;
}

#[tokio::test]
async fn profile_picture_upload_replaces_the_default() {
    let app = spawn_app().await;
    let session = app.student().await;

    let png = b"\x89PNG\r\n\x1a\n0000000000";
    let form = MultipartBody::new()
        .file("profile_picture", "me.png", "image/png", png)
        .finish();
    let (status, body) = app
        .multipart("POST", "/api/v1/auth/me/picture", &session, form)
        .await;
    assert_eq!(status, StatusCode::OK);
    let url = body["profile_picture"].as_str().unwrap();
    assert!(url.starts_with("/media/profile_pics/"));
    assert!(url.ends_with(".png"));

    let form = MultipartBody::new()
        .file("profile_picture", "me.png", "image/png", b"plain text")
        .finish();
    let (status, _) = app
        .multipart("POST", "/api/v1/auth/me/picture", &session, form)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
