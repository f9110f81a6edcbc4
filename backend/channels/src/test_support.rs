//! Fakes shared by the fetcher and handler tests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use markbot_core::{RemoteFile, StampError, StampResult, WatermarkSize};
use media::WatermarkApplier;

use crate::transport::{ChatApi, SentMessage, TextFormat};

/// Token used in test file URLs. Deliberately has no `:` so it is a valid path segment.
pub const TEST_TOKEN: &str = "TESTTOKEN";

pub const FILE_BODY: &[u8] = b"not really a jpeg, only bytes";

pub struct FileServer {
    pub base_url: String,
    pub body: Vec<u8>,
    pub hits: Arc<AtomicUsize>,
}

/// Local stand-in for the Bot API file endpoint.
///
/// Paths containing `missing` get 404, paths containing `stall` send one chunk
/// and then never finish, anything else returns [`FILE_BODY`].
pub async fn spawn_file_server() -> FileServer {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    let app = Router::new().fallback(move |uri: Uri| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            file_response(uri.path())
        }
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FileServer {
        base_url: format!("http://{addr}"),
        body: FILE_BODY.to_vec(),
        hits,
    }
}

fn file_response(path: &str) -> Response {
    if !path.starts_with(&format!("/file/bot{TEST_TOKEN}/")) || path.contains("missing") {
        return StatusCode::NOT_FOUND.into_response();
    }
    if path.contains("stall") {
        let stream = futures::stream::iter([Ok::<_, std::io::Error>(Bytes::from_static(b"partial"))])
            .chain(futures::stream::pending());
        return Body::from_stream(stream).into_response();
    }
    Body::from(FILE_BODY).into_response()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    GetFile(String),
    SendText { chat_id: i64, text: String, format: TextFormat },
    EditText { message: SentMessage, text: String },
    Delete(SentMessage),
    SendPhoto { chat_id: i64, caption: String, bytes: Vec<u8> },
    SendVideo { chat_id: i64, caption: String, bytes: Vec<u8> },
}

/// Records every platform call; `get_file` answers from a fixed table.
#[derive(Default)]
pub struct FakeChatApi {
    files: HashMap<String, RemoteFile>,
    calls: Mutex<Vec<ApiCall>>,
    next_id: AtomicI32,
}

impl FakeChatApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, file_id: &str, size: u64, path: &str) -> Self {
        self.files.insert(
            file_id.to_string(),
            RemoteFile {
                size,
                path: path.to_string(),
            },
        );
        self
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ApiCall::SendText { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ChatApi for FakeChatApi {
    async fn get_file(&self, file_id: &str) -> StampResult<RemoteFile> {
        self.record(ApiCall::GetFile(file_id.to_string()));
        self.files
            .get(file_id)
            .cloned()
            .ok_or_else(|| StampError::Transport(format!("unknown file {file_id}")))
    }

    async fn send_text(&self, chat_id: i64, text: &str, format: TextFormat) -> StampResult<SentMessage> {
        self.record(ApiCall::SendText {
            chat_id,
            text: text.to_string(),
            format,
        });
        Ok(SentMessage {
            chat_id,
            message_id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
        })
    }

    async fn edit_text(&self, message: SentMessage, text: &str) -> StampResult<()> {
        self.record(ApiCall::EditText {
            message,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn delete_message(&self, message: SentMessage) -> StampResult<()> {
        self.record(ApiCall::Delete(message));
        Ok(())
    }

    async fn send_photo(&self, chat_id: i64, path: &Path, caption: &str) -> StampResult<()> {
        let bytes = tokio::fs::read(path).await.unwrap();
        self.record(ApiCall::SendPhoto {
            chat_id,
            caption: caption.to_string(),
            bytes,
        });
        Ok(())
    }

    async fn send_video(&self, chat_id: i64, path: &Path, caption: &str) -> StampResult<()> {
        let bytes = tokio::fs::read(path).await.unwrap();
        self.record(ApiCall::SendVideo {
            chat_id,
            caption: caption.to_string(),
            bytes,
        });
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub enum ApplierBehavior {
    CopyInput,
    WriteBytes(usize),
    /// Writes a stray output file, then fails.
    Fail,
}

pub struct FakeApplier {
    behavior: ApplierBehavior,
    sizes: Mutex<Vec<WatermarkSize>>,
}

impl FakeApplier {
    pub fn new(behavior: ApplierBehavior) -> Self {
        Self {
            behavior,
            sizes: Mutex::new(Vec::new()),
        }
    }

    pub fn sizes(&self) -> Vec<WatermarkSize> {
        self.sizes.lock().unwrap().clone()
    }
}

#[async_trait]
impl WatermarkApplier for FakeApplier {
    async fn apply(&self, input: &Path, output: &Path, size: WatermarkSize) -> StampResult<()> {
        self.sizes.lock().unwrap().push(size);
        match self.behavior {
            ApplierBehavior::CopyInput => {
                tokio::fs::copy(input, output).await.unwrap();
                Ok(())
            }
            ApplierBehavior::WriteBytes(n) => {
                tokio::fs::write(output, vec![0u8; n]).await.unwrap();
                Ok(())
            }
            ApplierBehavior::Fail => {
                tokio::fs::write(output, b"half").await.unwrap();
                Err(StampError::processing("decoder exploded"))
            }
        }
    }
}
