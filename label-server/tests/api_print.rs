mod common;

use std::sync::Arc;

use common::*;
use http::StatusCode;
use label_printer::OutputMode;
use serde_json::json;

#[tokio::test]
async fn test_health() {
    let app = TestApp::with_virtuals(vec![]);
    let response = app.get("/health").await;
    assert_status(&response, StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_list_printers_includes_virtuals() {
    let out = tempfile::tempdir().unwrap();
    let app = TestApp::with_virtuals(vec![virtual_printer(
        "Office (2nd Floor)",
        out.path(),
        OutputMode::Image,
    )]);

    let response = app.get("/api/printers").await;
    assert_status(&response, StatusCode::OK);

    let body = body_json(response).await;
    let printers = body["data"].as_array().unwrap();
    assert_eq!(printers.len(), 1);
    assert_eq!(printers[0]["id"], "virtual:Office_2nd_Floor");
    assert_eq!(printers[0]["name"], "Office (2nd Floor) (Virtual)");
    assert_eq!(printers[0]["vendorProductId"], "virtual");
}

#[tokio::test]
async fn test_list_printers_devices_first() {
    let out = tempfile::tempdir().unwrap();
    let app = TestApp::build(
        Arc::new(FlakyScanner::new(1)),
        vec![virtual_printer("Desk", out.path(), OutputMode::Image)],
    );

    let body = body_json(app.get("/api/printers").await).await;
    let ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["10.0.0.9:9100", "virtual:Desk"]);
}

#[tokio::test]
async fn test_print_falls_back_to_virtual_printer() {
    let out = tempfile::tempdir().unwrap();
    let app = TestApp::with_virtuals(vec![virtual_printer("Desk", out.path(), OutputMode::Image)]);

    let response = app
        .post_json(
            "/api/print",
            json!({ "widgets": text_widgets("Hello"), "settings": {} }),
        )
        .await;
    assert_status(&response, StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["message"], "Label sent to printer.");
    assert_eq!(body["data"]["printerId"], "virtual:Desk");
    assert_eq!(file_count(out.path()), 1);
}

#[tokio::test]
async fn test_print_to_named_virtual_printer() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    let app = TestApp::with_virtuals(vec![
        virtual_printer("First", first.path(), OutputMode::Image),
        virtual_printer("Second", second.path(), OutputMode::Both),
    ]);

    let response = app
        .post_json(
            "/api/print",
            json!({
                "widgets": text_widgets("Hello"),
                "settings": { "printerId": "virtual:Second" }
            }),
        )
        .await;
    assert_status(&response, StatusCode::OK);

    assert_eq!(file_count(first.path()), 0);
    assert_eq!(file_count(second.path()), 2);
}

#[tokio::test]
async fn test_print_unknown_virtual_printer_is_404() {
    let app = TestApp::with_virtuals(vec![]);

    let response = app
        .post_json(
            "/api/print",
            json!({
                "widgets": text_widgets("Hello"),
                "settings": { "printerId": "virtual:Missing" }
            }),
        )
        .await;
    assert_status(&response, StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Printer not found: virtual:Missing");
}

#[tokio::test]
async fn test_print_explicit_device_never_falls_back() {
    let out = tempfile::tempdir().unwrap();
    let app = TestApp::with_virtuals(vec![virtual_printer("Desk", out.path(), OutputMode::Image)]);

    let response = app
        .post_json(
            "/api/print",
            json!({
                "widgets": text_widgets("Hello"),
                "settings": { "printerId": "usb-1" }
            }),
        )
        .await;
    assert_status(&response, StatusCode::BAD_GATEWAY);
    assert_eq!(file_count(out.path()), 0);
}

#[tokio::test]
async fn test_print_without_any_printer_is_503() {
    let app = TestApp::with_virtuals(vec![]);

    let response = app
        .post_json("/api/print", json!({ "widgets": text_widgets("Hello") }))
        .await;
    assert_status(&response, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_print_rejects_empty_widgets() {
    let app = TestApp::with_virtuals(vec![]);

    let response = app
        .post_json("/api/print", json!({ "widgets": [], "settings": {} }))
        .await;
    assert_status(&response, StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["message"], "No widgets provided");
}

#[tokio::test]
async fn test_print_rejects_malformed_body() {
    let app = TestApp::with_virtuals(vec![]);

    let response = app.send(post("/api/print", "{not json")).await;
    assert_status(&response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_preview_returns_png() {
    let app = TestApp::with_virtuals(vec![]);

    let response = app
        .post_json(
            "/api/preview",
            json!({ "widgets": text_widgets("Preview"), "settings": { "tapeSizeMm": 12 } }),
        )
        .await;
    assert_status(&response, StatusCode::OK);
    assert_eq!(response.headers()[http::header::CONTENT_TYPE], "image/png");

    let png = body_bytes(response).await;
    assert!(png.starts_with(b"\x89PNG"));
}

#[tokio::test]
async fn test_preview_with_nothing_to_render() {
    let app = TestApp::with_virtuals(vec![]);

    let response = app
        .post_json(
            "/api/preview",
            json!({ "widgets": [{ "type": "image", "id": "i", "filename": "missing.png" }] }),
        )
        .await;
    assert_status(&response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_print_rejects_oversized_settings() {
    let out = tempfile::tempdir().unwrap();
    let app = TestApp::with_virtuals(vec![virtual_printer("Desk", out.path(), OutputMode::Image)]);

    for settings in [
        json!({ "marginPx": 4294967295u32 }),
        json!({ "tapeSizeMm": 100000 }),
        json!({ "minLengthMm": 1e9 }),
    ] {
        let response = app
            .post_json(
                "/api/print",
                json!({ "widgets": text_widgets("Hello"), "settings": settings }),
            )
            .await;
        assert_status(&response, StatusCode::BAD_REQUEST);

        let response = app
            .post_json(
                "/api/preview",
                json!({ "widgets": text_widgets("Hello"), "settings": settings }),
            )
            .await;
        assert_status(&response, StatusCode::BAD_REQUEST);
    }
    assert_eq!(file_count(out.path()), 0);
}

#[tokio::test]
async fn test_explicit_printer_id_is_not_trimmed() {
    let out = tempfile::tempdir().unwrap();
    let app = TestApp::build(
        Arc::new(FlakyScanner::new(1)),
        vec![virtual_printer("Desk", out.path(), OutputMode::Image)],
    );

    let response = app
        .post_json(
            "/api/print",
            json!({ "widgets": text_widgets("Hello"), "settings": { "printerId": " 10.0.0.9:9100 " } }),
        )
        .await;
    assert_status(&response, StatusCode::BAD_GATEWAY);
    assert_eq!(file_count(out.path()), 0);
}

#[tokio::test]
async fn test_unknown_widget_is_recorded_unchanged() {
    let out = tempfile::tempdir().unwrap();
    let app = TestApp::with_virtuals(vec![virtual_printer("Desk", out.path(), OutputMode::Json)]);
    let sparkles = json!({ "type": "sparkles", "id": "s1", "density": 3 });

    let response = app
        .post_json(
            "/api/print",
            json!({
                "widgets": [{ "type": "text", "id": "t1", "text": "Hi" }, sparkles],
                "settings": {}
            }),
        )
        .await;
    assert_status(&response, StatusCode::OK);

    let body = body_json(response).await;
    let path = body["data"]["files"][0].as_str().unwrap();
    let record: serde_json::Value =
        serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
    assert_eq!(record["widgets"][1], sparkles);
}

#[tokio::test]
async fn test_template_variables() {
    let app = TestApp::with_virtuals(vec![]);

    let response = app
        .post_json(
            "/api/template/variables",
            json!({
                "widgets": [
                    { "type": "text", "id": "t1", "text": ":name: at 10:30 (:sku:)" },
                    { "type": "qr", "id": "q1", "content": "https://x/:sku:/:lot_2:" },
                    { "type": "image", "id": "i1", "filename": ":ignored:.png" }
                ]
            }),
        )
        .await;
    assert_status(&response, StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"], json!(["name", "sku", "lot_2"]));
}

#[tokio::test]
async fn test_template_variables_rejects_malformed_body() {
    let app = TestApp::with_virtuals(vec![]);
    let response = app.send(post("/api/template/variables", "[1, 2")).await;
    assert_status(&response, StatusCode::BAD_REQUEST);
}
