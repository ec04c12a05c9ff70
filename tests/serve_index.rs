use axum::body::{to_bytes, Body};
use dirindex::ServeIndex;
use http::{header, Method, Request, StatusCode};
use std::path::Path;
use tower::ServiceExt;
use tower_http::services::ServeDir;

fn populate(root: &Path) {
    std::fs::create_dir(root.join("A")).unwrap();
    std::fs::write(root.join("b.txt"), b"beta").unwrap();
    std::fs::write(root.join(".hidden"), b"shh").unwrap();
    std::fs::write(root.join("A").join("inner.txt"), b"inner").unwrap();
}

fn request(method: Method, uri: &str, accept: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(accept) = accept {
        builder = builder.header(header::ACCEPT, accept);
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn root_listing_renders_html_with_security_headers() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    let service = ServeIndex::new(dir.path());

    let response = service
        .oneshot(request(Method::GET, "/", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/html; charset=utf-8"
    );
    assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    let declared: usize = response.headers()[header::CONTENT_LENGTH]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();

    let body = body_string(response).await;
    assert_eq!(declared, body.len());
    assert!(body.contains("b.txt"));
    assert!(body.contains(">A<") || body.contains("A</span>"));
    assert!(!body.contains(".hidden"));
    // Root listing carries no parent link.
    assert!(!body.contains("\"..\""));
}

#[tokio::test]
async fn json_listing_is_directories_first_names_only() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    let service = ServeIndex::new(dir.path());

    let response = service
        .oneshot(request(Method::GET, "/", Some("application/json")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json; charset=utf-8"
    );
    assert_eq!(body_string(response).await, r#"["A","b.txt"]"#);
}

#[tokio::test]
async fn subdirectory_listing_includes_parent_link() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    let service = ServeIndex::new(dir.path());

    let response = service
        .oneshot(request(Method::GET, "/A/", Some("application/json")))
        .await
        .unwrap();
    assert_eq!(body_string(response).await, r#"["..","inner.txt"]"#);
}

#[tokio::test]
async fn plain_listing_is_newline_joined() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    let service = ServeIndex::new(dir.path());

    let response = service
        .oneshot(request(Method::GET, "/", Some("text/plain")))
        .await
        .unwrap();
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );
    assert_eq!(body_string(response).await, "A\nb.txt\n");
}

#[tokio::test]
async fn file_paths_fall_through_to_the_fallback() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    let service = ServeIndex::new(dir.path()).fallback(ServeDir::new(dir.path()));

    let response = service
        .oneshot(request(Method::GET, "/b.txt", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "beta");
}

#[tokio::test]
async fn missing_paths_fall_through_to_the_default_404() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    let service = ServeIndex::new(dir.path());

    let response = service
        .oneshot(request(Method::GET, "/no-such-entry", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn traversal_is_forbidden() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    let service = ServeIndex::new(dir.path());

    for uri in ["/../", "/%2e%2e/", "/A/../../outside"] {
        let response = service
            .clone()
            .oneshot(request(Method::GET, uri, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "uri {uri}");
    }
}

#[tokio::test]
async fn unacceptable_accept_header_is_406() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    let service = ServeIndex::new(dir.path());

    let response = service
        .oneshot(request(Method::GET, "/", Some("application/xml")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
}

#[tokio::test]
async fn options_and_unknown_methods_answer_with_allow() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    let service = ServeIndex::new(dir.path());

    let response = service
        .clone()
        .oneshot(request(Method::OPTIONS, "/", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ALLOW], "GET, HEAD, OPTIONS");
    assert_eq!(response.headers()[header::CONTENT_LENGTH], "0");
    assert!(body_string(response).await.is_empty());

    let response = service
        .oneshot(request(Method::POST, "/", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers()[header::ALLOW], "GET, HEAD, OPTIONS");
}

#[tokio::test]
async fn head_keeps_headers_and_drops_the_body() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    let service = ServeIndex::new(dir.path());

    let response = service
        .oneshot(request(Method::HEAD, "/", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let declared: usize = response.headers()[header::CONTENT_LENGTH]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(declared > 0);
    assert!(body_string(response).await.is_empty());
}

#[tokio::test]
async fn hidden_entries_appear_when_enabled() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    let service = ServeIndex::new(dir.path()).show_hidden(true);

    let response = service
        .oneshot(request(Method::GET, "/", Some("application/json")))
        .await
        .unwrap();
    assert_eq!(body_string(response).await, r#"["A",".hidden","b.txt"]"#);
}

#[tokio::test]
async fn filter_predicate_prunes_entries() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    let service = ServeIndex::new(dir.path()).filter(std::sync::Arc::new(
        |name: &str, _index, _all, _dir: &Path| Ok(!name.ends_with(".txt")),
    ));

    let response = service
        .oneshot(request(Method::GET, "/", Some("application/json")))
        .await
        .unwrap();
    assert_eq!(body_string(response).await, r#"["A"]"#);
}

#[tokio::test]
async fn browser_accept_header_gets_html() {
    let dir = tempfile::tempdir().unwrap();
    populate(dir.path());
    let service = ServeIndex::new(dir.path());

    let accept = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
    let response = service
        .oneshot(request(Method::GET, "/", Some(accept)))
        .await
        .unwrap();
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/html; charset=utf-8"
    );
}
