//! Router assembly.

use crate::handlers::{cleanup, convert, get_pdf};
use crate::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;

/// Build the service router. Request bodies above `max_upload_bytes` are
/// rejected.
pub fn app_routes(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        // POST /convert
        .route("/convert", post(convert))
        // GET /pdf/:filename
        .route("/pdf/:filename", get(get_pdf))
        // DELETE /cleanup
        .route("/cleanup", delete(cleanup))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, StorageConfig};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use serde_json::Value;
    use slidepdf_pptx::fixture::{FixtureDeck, FixtureSlide};
    use std::path::Path;
    use tower::ServiceExt;

    const BOUNDARY: &str = "slidepdf-test-boundary";

    async fn test_app(root: &Path) -> Router {
        let config = AppConfig {
            storage: StorageConfig {
                upload_dir: root.join("uploads"),
                output_dir: root.join("outputs"),
                temp_dir: root.join("temp"),
            },
            ..AppConfig::default()
        };
        let state = AppState::new(&config);
        state.dirs.ensure().await.unwrap();
        app_routes(state, config.server.max_upload_bytes)
    }

    fn upload(field: &str, filename: &str, data: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            BOUNDARY, field, filename
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/convert")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn deck() -> Vec<u8> {
        FixtureDeck::new()
            .with_size(12_192_000, 6_858_000)
            .slide(FixtureSlide::new().text("Hello", Some((914_400, 914_400, 5_000_000, 900_000))))
            .slide(FixtureSlide::new().text("World", None))
            .build()
    }

    fn dir_is_empty(dir: &Path) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    #[tokio::test]
    async fn test_rejects_non_pptx_upload() {
        let root = tempfile::tempdir().unwrap();
        let app = test_app(root.path()).await;

        let response = app.oneshot(upload("file", "notes.txt", b"hello")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json(response).await["detail"],
            "Invalid file format. Please upload a .pptx file"
        );
        assert!(dir_is_empty(&root.path().join("uploads")));
        assert!(dir_is_empty(&root.path().join("outputs")));
    }

    #[tokio::test]
    async fn test_missing_file_field() {
        let root = tempfile::tempdir().unwrap();
        let app = test_app(root.path()).await;

        let response = app.oneshot(upload("document", "deck.pptx", &deck())).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(dir_is_empty(&root.path().join("uploads")));
    }

    #[tokio::test]
    async fn test_convert_twice_gives_two_pdfs() {
        let root = tempfile::tempdir().unwrap();
        let app = test_app(root.path()).await;

        let mut urls = Vec::new();
        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(upload("file", "My Talk.PPTX", &deck()))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);

            let body = json(response).await;
            assert_eq!(body["success"], true);
            let url = body["pdf_url"].as_str().unwrap().to_string();
            assert!(url.starts_with("/pdf/") && url.ends_with(".pdf"));
            urls.push(url);
        }
        assert_ne!(urls[0], urls[1]);

        for url in &urls {
            let response = app.clone().oneshot(get(url)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                response.headers().get(header::CONTENT_TYPE).unwrap(),
                "application/pdf"
            );
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            assert!(bytes.starts_with(b"%PDF"));
        }

        let uploads: Vec<_> = std::fs::read_dir(root.path().join("uploads"))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(uploads.len(), 2);
        assert!(uploads.iter().all(|name| name.ends_with("_My_Talk.PPTX")));
        assert!(dir_is_empty(&root.path().join("temp")));
    }

    #[tokio::test]
    async fn test_corrupt_deck_is_a_conversion_failure() {
        let root = tempfile::tempdir().unwrap();
        let app = test_app(root.path()).await;

        let response = app
            .oneshot(upload("file", "broken.pptx", b"not really a zip"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let detail = json(response).await["detail"].as_str().unwrap().to_string();
        assert!(detail.starts_with("Conversion failed: "));
        assert!(dir_is_empty(&root.path().join("outputs")));
    }

    #[tokio::test]
    async fn test_missing_pdf_is_not_found() {
        let root = tempfile::tempdir().unwrap();
        let app = test_app(root.path()).await;

        let response = app.clone().oneshot(get("/pdf/nope.pdf")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json(response).await["detail"], "PDF not found");

        let response = app.oneshot(get("/pdf/..%2Fsecret.pdf")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_large_pdf_is_streamed_whole() {
        let root = tempfile::tempdir().unwrap();
        let app = test_app(root.path()).await;

        let mut content = b"%PDF-1.5\n".to_vec();
        content.extend((0..200_000u32).map(|i| (i % 251) as u8));
        std::fs::write(root.path().join("outputs").join("big.pdf"), &content).unwrap();

        let response = app.oneshot(get("/pdf/big.pdf")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_LENGTH).unwrap(),
            content.len().to_string().as_str()
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(bytes.as_ref(), content.as_slice());
    }

    #[tokio::test]
    async fn test_upload_name_extension_check() {
        let root = tempfile::tempdir().unwrap();
        let app = test_app(root.path()).await;

        let response = app.clone().oneshot(upload("file", ".pptx", &deck())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(upload("file", "legacy.ppt", &deck())).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_cleanup() {
        let root = tempfile::tempdir().unwrap();
        let app = test_app(root.path()).await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/cleanup")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["message"], "Cleanup completed");
    }
}
