//! Upload integration tests.
//!
//! Tests verify:
//! - Small uploads are stored untouched
//! - Oversized uploads are recompressed under the budget, in the same container
//! - The dimension fallback for images no quality can fit
//! - Validation errors (missing field, unsupported extension, body limit)
//! - Codec errors for mislabeled files leave nothing behind

use axum::http::StatusCode;
use tower::ServiceExt;

use imgpress::{RouterConfig, DEFAULT_TARGET_BYTES};

use super::test_utils::{
    body_bytes, body_json, get_request, is_timestamp_name, noise_jpeg, solid_png,
    upload_request, TestApp, TEST_PUBLIC_URL,
};

// =============================================================================
// Successful Uploads
// =============================================================================

#[tokio::test]
async fn test_small_png_stored_untouched() {
    let png = solid_png(16, 16);
    let app = TestApp::new(64 * 1024);

    let response = app
        .router
        .clone()
        .oneshot(upload_request("image", "flat.png", &png))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(
        json["message"],
        "Image uploaded and compressed successfully"
    );
    assert_eq!(json["original_size"], png.len());
    assert_eq!(json["compressed_size"], png.len());

    let filename = json["filename"].as_str().unwrap();
    assert!(is_timestamp_name(filename, ".png"), "{}", filename);

    let stored = std::fs::read(app.upload_root.join(filename)).unwrap();
    assert_eq!(stored, png);
}

#[tokio::test]
async fn test_oversized_jpeg_compressed_under_target() {
    let jpeg = noise_jpeg(256, 256);
    let target = jpeg.len() * 3 / 4;
    let app = TestApp::new(target);

    let response = app
        .router
        .clone()
        .oneshot(upload_request("image", "noise.jpg", &jpeg))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let compressed_size = json["compressed_size"].as_u64().unwrap() as usize;
    assert_eq!(json["original_size"], jpeg.len());
    assert!(compressed_size <= target);

    let filename = json["filename"].as_str().unwrap().to_string();
    assert!(is_timestamp_name(&filename, ".jpg"), "{}", filename);
    assert_eq!(
        json["url"],
        format!("{}/uploads/{}", TEST_PUBLIC_URL, filename)
    );

    // The derivative is still a JPEG of the same size.
    let stored = std::fs::read(app.upload_root.join(&filename)).unwrap();
    assert_eq!(stored.len(), compressed_size);
    let decoded = image::load_from_memory(&stored).unwrap();
    assert_eq!(
        image::guess_format(&stored).unwrap(),
        image::ImageFormat::Jpeg
    );
    assert_eq!((decoded.width(), decoded.height()), (256, 256));

    // And it is served back byte for byte.
    let response = app
        .router
        .oneshot(get_request(&format!("/uploads/{}", filename)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, stored);
}

#[tokio::test]
async fn test_extension_kept_verbatim() {
    let png = solid_png(8, 8);
    let app = TestApp::new(64 * 1024);

    let response = app
        .router
        .oneshot(upload_request("image", "Screenshot.PNG", &png))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(is_timestamp_name(json["filename"].as_str().unwrap(), ".PNG"));
}

#[tokio::test]
async fn test_wide_image_falls_back_to_smaller_width() {
    let jpeg = noise_jpeg(1600, 100);
    let app = TestApp::new(256);

    let response = app
        .router
        .oneshot(upload_request("image", "banner.jpeg", &jpeg))
        .await
        .unwrap();

    // The fallback is returned even though it is still over budget.
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["compressed_size"].as_u64().unwrap() > 256);

    let filename = json["filename"].as_str().unwrap();
    assert!(is_timestamp_name(filename, ".jpeg"), "{}", filename);

    let stored = std::fs::read(app.upload_root.join(filename)).unwrap();
    let decoded = image::load_from_memory(&stored).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (800, 50));
}

#[tokio::test]
async fn test_consecutive_uploads_get_distinct_names() {
    let png = solid_png(4, 4);
    let app = TestApp::new(64 * 1024);

    let mut names = Vec::new();
    for _ in 0..5 {
        let response = app
            .router
            .clone()
            .oneshot(upload_request("image", "a.png", &png))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        names.push(json["filename"].as_str().unwrap().to_string());
    }

    names.sort();
    names.dedup();
    assert_eq!(names.len(), 5);
    assert_eq!(app.stored_count(), 5);
}

// =============================================================================
// Rejected Uploads
// =============================================================================

#[tokio::test]
async fn test_wrong_field_name_rejected() {
    let png = solid_png(4, 4);
    let app = TestApp::new(64 * 1024);

    let response = app
        .router
        .clone()
        .oneshot(upload_request("photo", "a.png", &png))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "missing_field");
    assert_eq!(json["status"], 400);
    assert!(!app.upload_root.exists());
}

#[tokio::test]
async fn test_unsupported_extension_rejected() {
    let app = TestApp::new(64 * 1024);

    let response = app
        .router
        .clone()
        .oneshot(upload_request("image", "notes.txt", b"plain text"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "unsupported_extension");
    assert_eq!(app.stored_count(), 0);
}

#[tokio::test]
async fn test_spoofed_extension_fails_in_codec() {
    let app = TestApp::new(16);
    let payload = b"definitely not a jpeg, just a long enough line of text".to_vec();

    let response = app
        .router
        .clone()
        .oneshot(upload_request("image", "spoofed.jpg", &payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"], "compression_error");
    assert_eq!(json["status"], 500);
    assert!(!app.upload_root.exists());
}

#[tokio::test]
async fn test_spoofed_extension_under_target_is_stored() {
    // Passthrough never decodes, so a small mislabeled file is kept as-is.
    let app = TestApp::new(64 * 1024);

    let response = app
        .router
        .oneshot(upload_request("image", "tiny.gif", b"not a gif"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["compressed_size"], 9);
}

#[tokio::test]
async fn test_non_multipart_request_rejected() {
    let app = TestApp::new(64 * 1024);

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/upload")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{}"))
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "invalid_request");
}

#[tokio::test]
async fn test_body_limit_enforced() {
    let config = RouterConfig::new()
        .with_tracing(false)
        .with_max_body_size(1024);
    let app = TestApp::with_config(64 * 1024, config);

    let response = app
        .router
        .clone()
        .oneshot(upload_request("image", "big.png", &vec![0u8; 8 * 1024]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let json = body_json(response).await;
    assert_eq!(json["error"], "payload_too_large");
    assert!(!app.upload_root.exists());
}

#[tokio::test]
async fn test_get_on_upload_not_allowed() {
    let app = TestApp::new(64 * 1024);

    let response = app.router.oneshot(get_request("/upload")).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// =============================================================================
// Large Uploads
// =============================================================================

#[tokio::test]
async fn test_multi_megabyte_jpeg_under_default_target() {
    let jpeg = noise_jpeg(2048, 1024);
    assert!(jpeg.len() > DEFAULT_TARGET_BYTES);
    let app = TestApp::new(DEFAULT_TARGET_BYTES);

    let response = app
        .router
        .clone()
        .oneshot(upload_request("image", "large.jpg", &jpeg))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["original_size"], jpeg.len());
    let compressed_size = json["compressed_size"].as_u64().unwrap() as usize;
    assert!(compressed_size <= DEFAULT_TARGET_BYTES);

    let filename = json["filename"].as_str().unwrap().to_string();
    assert!(is_timestamp_name(&filename, ".jpg"), "{}", filename);

    let stored = std::fs::read(app.upload_root.join(&filename)).unwrap();
    assert_eq!(stored.len(), compressed_size);

    let response = app
        .router
        .oneshot(get_request(&format!("/uploads/{}", filename)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, stored);
}
