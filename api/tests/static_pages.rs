mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::test_app_with_static;
use http_body_util::BodyExt;
use tower::ServiceExt;

fn static_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>Collect a payment</h1>").unwrap();
    std::fs::write(dir.path().join("reader.html"), "<h1>Reader</h1>").unwrap();
    std::fs::create_dir(dir.path().join("js")).unwrap();
    std::fs::write(dir.path().join("js/payment.js"), "// payment").unwrap();
    dir
}

async fn get_text(app: axum::Router, uri: &str) -> (StatusCode, String) {
    let res = app
        .oneshot(Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn serves_the_index_route() {
    let dir = static_dir();
    let app = test_app_with_static("http://127.0.0.1:9", dir.path().to_path_buf());

    let (status, body) = get_text(app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Collect a payment"));
}

#[tokio::test]
async fn serves_reader_page_and_assets() {
    let dir = static_dir();

    let app = test_app_with_static("http://127.0.0.1:9", dir.path().to_path_buf());
    let (status, body) = get_text(app, "/reader").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "<h1>Reader</h1>");

    let app = test_app_with_static("http://127.0.0.1:9", dir.path().to_path_buf());
    let (status, body) = get_text(app, "/js/payment.js").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "// payment");

    let app = test_app_with_static("http://127.0.0.1:9", dir.path().to_path_buf());
    let (status, _) = get_text(app, "/missing.html").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_check() {
    let dir = static_dir();
    let app = test_app_with_static("http://127.0.0.1:9", dir.path().to_path_buf());

    let (status, body) = get_text(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}
