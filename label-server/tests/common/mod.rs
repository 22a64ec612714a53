#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use http::{Request, Response, StatusCode};
use http_body_util::BodyExt;
use label_printer::{
    DeviceInfo, DeviceScanner, NetworkScanner, OutputMode, PrintError, PrintResult,
    VirtualPrinterConfig,
};
use label_server::printing::{CanvasRenderer, StaticVirtualPrinters};
use label_server::services::build_router;
use label_server::{Config, ServerState};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// Router plus the temp dirs it writes into
pub struct TestApp {
    pub router: Router,
    pub state: ServerState,
    pub work_dir: TempDir,
}

impl TestApp {
    /// No real printers, the given virtual printers
    pub fn with_virtuals(virtuals: Vec<VirtualPrinterConfig>) -> Self {
        Self::build(Arc::new(NetworkScanner::default()), virtuals)
    }

    pub fn build(scanner: Arc<dyn DeviceScanner>, virtuals: Vec<VirtualPrinterConfig>) -> Self {
        let work_dir = tempfile::tempdir().unwrap();
        let config = Config::with_overrides(work_dir.path().to_string_lossy(), 0);
        let state = ServerState::with_components(
            config.clone(),
            scanner,
            Arc::new(StaticVirtualPrinters(virtuals)),
            Arc::new(CanvasRenderer::new(&config.upload_dir)),
        );

        Self {
            router: build_router(state.clone()),
            state,
            work_dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> Response<Body> {
        self.send(post(uri, body.to_string())).await
    }
}

pub fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::post(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

pub fn virtual_printer(name: &str, path: &Path, output_mode: OutputMode) -> VirtualPrinterConfig {
    VirtualPrinterConfig {
        name: name.into(),
        path: path.to_path_buf(),
        output_mode,
    }
}

pub fn text_widgets(text: &str) -> Value {
    serde_json::json!([{ "type": "text", "id": "t1", "text": text }])
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Collect the whole event stream, one JSON value per line
pub async fn ndjson(response: Response<Body>) -> Vec<Value> {
    let bytes = body_bytes(response).await;
    String::from_utf8(bytes)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

pub fn event_names(events: &[Value]) -> Vec<&str> {
    events
        .iter()
        .map(|e| e["event"].as_str().unwrap())
        .collect()
}

pub fn file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

pub fn assert_status(response: &Response<Body>, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}

/// One network device that accepts `ok_sends` jobs, then refuses
pub struct FlakyScanner {
    ok_sends: usize,
    sent: AtomicUsize,
}

impl FlakyScanner {
    pub fn new(ok_sends: usize) -> Self {
        Self {
            ok_sends,
            sent: AtomicUsize::new(0),
        }
    }

    pub fn sent(&self) -> usize {
        self.sent.load(Ordering::SeqCst).min(self.ok_sends)
    }
}

#[async_trait]
impl DeviceScanner for FlakyScanner {
    async fn scan(&self) -> PrintResult<Vec<DeviceInfo>> {
        Ok(vec![DeviceInfo {
            id: "10.0.0.9:9100".into(),
            manufacturer: None,
            product: Some("Bench printer".into()),
            serial_number: None,
            vendor_product_id: "network".into(),
        }])
    }

    async fn send(&self, device: &DeviceInfo, _data: &[u8]) -> PrintResult<()> {
        let n = self.sent.fetch_add(1, Ordering::SeqCst);
        if n >= self.ok_sends {
            return Err(PrintError::Connection(format!("{}: connection reset", device.id)));
        }
        Ok(())
    }
}

/// Reads a streamed NDJSON body one event at a time
pub struct EventReader {
    body: Body,
    buf: Vec<u8>,
}

impl EventReader {
    pub fn new(response: Response<Body>) -> Self {
        Self {
            body: response.into_body(),
            buf: Vec::new(),
        }
    }

    /// Next event, or `None` once the stream has ended
    pub async fn next(&mut self) -> Option<Value> {
        loop {
            if let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = self.buf.drain(..=pos).collect();
                return Some(serde_json::from_slice(&line[..pos]).unwrap());
            }
            let frame = self.body.frame().await?.unwrap();
            if let Ok(data) = frame.into_data() {
                self.buf.extend_from_slice(&data);
            }
        }
    }

    /// Read events up to and including the first one named `name`
    pub async fn until(&mut self, name: &str) -> Vec<Value> {
        let mut events = Vec::new();
        while let Some(event) = self.next().await {
            let found = event["event"] == name;
            events.push(event);
            if found {
                return events;
            }
        }
        panic!("stream ended before `{}`", name);
    }

    pub async fn rest(mut self) -> Vec<Value> {
        let mut events = Vec::new();
        while let Some(event) = self.next().await {
            events.push(event);
        }
        events
    }
}
