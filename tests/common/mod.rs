//! Shared helpers for the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use lopdf::content::Content;
use lopdf::{Document, Object};
use serde_json::{json, Value};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use whiteboard_summary::{
    ChatRequest, ChatResponse, ChatTransport, Stage, SummaryError, SummaryProgressCallback,
};

// ── Logging ──────────────────────────────────────────────────────────────────

/// Route library logs through the test harness (`RUST_LOG=debug` to see them).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ── Fixture images ───────────────────────────────────────────────────────────

pub fn white_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([255, 255, 255])));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
        .unwrap();
    buf
}

pub fn translucent_png(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        width,
        height,
        Rgba([20, 40, 200, 90]),
    ));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

/// A chat-completions body whose first choice says `text`.
pub fn completion(text: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "gpt-4o-mini-2024-07-18",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": text },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 85, "completion_tokens": 9, "total_tokens": 94 }
    })
}

// ── Stub transport ───────────────────────────────────────────────────────────

/// Replays a fixed body and counts how often it was asked.
pub struct StubTransport {
    body: Value,
    calls: AtomicUsize,
    last: Mutex<Option<ChatRequest>>,
}

impl StubTransport {
    pub fn replying(text: &str) -> Arc<Self> {
        Self::with_body(completion(text))
    }

    pub fn with_body(body: Value) -> Arc<Self> {
        Arc::new(Self {
            body,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The last request, as the JSON that would have gone over the wire.
    pub fn last_request_json(&self) -> Value {
        let last = self.last.lock().unwrap();
        serde_json::to_value(last.as_ref().expect("no request was sent")).unwrap()
    }
}

#[async_trait]
impl ChatTransport for StubTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, SummaryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(request.clone());
        serde_json::from_value(self.body.clone()).map_err(|e| SummaryError::Response {
            detail: e.to_string(),
        })
    }
}

// ── Progress recorder ────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingCallback {
    pub events: Mutex<Vec<String>>,
}

impl SummaryProgressCallback for RecordingCallback {
    fn on_stage_start(&self, stage: Stage) {
        self.events.lock().unwrap().push(format!("start {stage}"));
    }

    fn on_stage_complete(&self, stage: Stage, _elapsed_ms: u64) {
        self.events.lock().unwrap().push(format!("done {stage}"));
    }

    fn on_stage_error(&self, stage: Stage, _error: &str) {
        self.events.lock().unwrap().push(format!("error {stage}"));
    }
}

// ── One-shot HTTP responder ──────────────────────────────────────────────────

/// What the responder received.
#[derive(Debug)]
pub struct CapturedRequest {
    /// Request line and headers, lower-cased.
    pub head: String,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("request body is JSON")
    }
}

/// Serve exactly one HTTP/1.1 response on a fresh local port.
///
/// Returns the base URL (`http://127.0.0.1:<port>`) and a handle that
/// resolves to the request once it has been answered.
pub async fn serve_once(
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
) -> (String, JoinHandle<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut buf = Vec::new();
        let mut chunk = [0u8; 8192];
        let head_end = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "client closed before sending headers");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = find(&buf, b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..head_end]).to_ascii_lowercase();
        let content_length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        while buf.len() < head_end + content_length {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        let request_body = buf[head_end..].to_vec();

        let header = format!(
            "HTTP/1.1 {status} Test\r\ncontent-type: {content_type}\r\n\
             content-length: {}\r\nconnection: close\r\n\r\n",
            body.len()
        );
        socket.write_all(header.as_bytes()).await.unwrap();
        socket.write_all(&body).await.unwrap();
        socket.shutdown().await.ok();

        CapturedRequest {
            head,
            body: request_body,
        }
    });

    (base_url, handle)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

// ── PDF inspection ───────────────────────────────────────────────────────────

/// The `Tj` strings of every page, in page order.
pub fn pdf_page_lines(bytes: &[u8]) -> Vec<Vec<String>> {
    let doc = Document::load_mem(bytes).expect("export must be a readable PDF");
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let raw = doc.get_page_content(page_id).unwrap();
            Content::decode(&raw)
                .unwrap()
                .operations
                .into_iter()
                .filter(|op| op.operator == "Tj")
                .filter_map(|op| match op.operands.into_iter().next() {
                    Some(Object::String(s, _)) => Some(String::from_utf8_lossy(&s).into_owned()),
                    _ => None,
                })
                .collect()
        })
        .collect()
}
