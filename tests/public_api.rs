mod common;

use common::{Session, spawn_app};
use http::StatusCode;

#[tokio::test]
async fn health_reports_database() {
    let app = spawn_app().await;

    let (status, body) = app.get("/health", &Session::anonymous()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn choices_are_public() {
    let app = spawn_app().await;
    let anonymous = Session::anonymous();

    let (status, body) = app.get("/api/v1/faculty-choices", &anonymous).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["value"], "I&C");
    assert_eq!(body[0]["label"], "Information Computing");

    let (_, body) = app.get("/api/v1/course-category-choices", &anonymous).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = app.get("/api/v1/cbcs-category-choices", &anonymous).await;
    assert!(
        body.as_array()
            .unwrap()
            .iter()
            .any(|c| c["value"] == "AECC" && c["label"] == "Ability Enhancement Compulsory Course")
    );

    let (_, body) = app.get("/api/v1/course-type-choices", &anonymous).await;
    assert_eq!(body.as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn swagger_is_off_when_disabled() {
    let app = spawn_app().await;

    let (status, _) = app
        .get("/api-docs/openapi.json", &Session::anonymous())
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
