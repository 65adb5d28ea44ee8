//! HTTP client for `POST /chat`: send a message, upload a PDF, and render
//! the single terminal update of each request into the widget.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use reqwest::multipart::{Form, Part};
use tracing::Instrument;

use crate::messages::{ChatResponse, MessageForm, PDF_FIELD};
use crate::transcript::{MessageKind, Sender};
use crate::widget::ChatWidget;

pub const CONNECT_ERROR_TEXT: &str = "Error: Unable to connect to server";
pub const UPLOAD_ERROR_TEXT: &str = "Error: Unable to upload PDF";
pub const NOT_PDF_TEXT: &str = "Error: Please upload a PDF file";
pub const UPLOADING_TEXT: &str = "Uploading PDF...";

/// Client request error. Never escapes a chat operation; it is logged and
/// rendered as a fixed error bubble.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid server url: {0}")]
    InvalidUrl(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Decode(e.to_string())
    }
}

/// Identifies one in-flight operation in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

/// A file picked or dropped by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl PdfFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Reads a file from disk, deriving its media type from the extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, media_type_for(path), bytes))
    }

    /// Declared media type mentions "pdf", ignoring case.
    pub fn is_pdf(&self) -> bool {
        self.media_type.to_lowercase().contains("pdf")
    }
}

fn media_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Drag-and-drop events delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragEvent {
    Enter,
    Over,
    /// `related_target` is false once the pointer has left the window.
    Leave { related_target: bool },
    Drop { file: Option<PdfFile> },
}

/// Chat client bound to one widget.
pub struct ChatClient {
    http: reqwest::Client,
    endpoint: reqwest::Url,
    widget: Arc<Mutex<ChatWidget>>,
    next_request: AtomicU64,
}

impl ChatClient {
    /// Client for the service at `base_url` (e.g. `http://127.0.0.1:5000`).
    pub fn new(base_url: &str, widget: ChatWidget) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, widget, None)
    }

    /// Like [`ChatClient::new`], failing requests that exceed `timeout`.
    pub fn with_timeout(
        base_url: &str,
        widget: ChatWidget,
        timeout: Option<Duration>,
    ) -> Result<Self, ClientError> {
        let base = reqwest::Url::parse(base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }
        let endpoint = base
            .join(&chat_path(&base))
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))?;

        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(Self {
            http: builder.build()?,
            endpoint,
            widget: Arc::new(Mutex::new(widget)),
            next_request: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Runs `f` with the widget locked. Do not hold it across an await.
    pub fn with_widget<R>(&self, f: impl FnOnce(&mut ChatWidget) -> R) -> R {
        f(&mut self.lock_widget())
    }

    /// Copy of the current widget state.
    pub fn snapshot(&self) -> ChatWidget {
        self.lock_widget().clone()
    }

    fn lock_widget(&self) -> MutexGuard<'_, ChatWidget> {
        // Rendering never panics mid-update, so a poisoned widget is still consistent.
        self.widget.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn next_request_id(&self) -> RequestId {
        RequestId(self.next_request.fetch_add(1, Ordering::Relaxed))
    }

    /// Sends the trimmed input field. Empty input does nothing.
    pub async fn send_message(&self) {
        let pending = self.with_widget(|w| {
            let message = w.input().trim().to_string();
            if message.is_empty() {
                return None;
            }
            w.append_message(Sender::User, &message, MessageKind::Plain);
            w.clear_input();
            let typing = w.append_typing_indicator();
            Some((message, typing))
        });
        let Some((message, typing)) = pending else {
            return;
        };

        let id = self.next_request_id();
        let span = tracing::info_span!("send_message", request = id.0);
        async {
            let started = Instant::now();
            let result = self.post_message(&message).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;

            let mut w = self.lock_widget();
            w.remove_typing_indicator(typing);
            match result {
                Ok(ChatResponse::Error(error)) => {
                    tracing::info!(elapsed_ms, %error, "server reported error");
                    w.append_message(Sender::Bot, &format!("Error: {}", error), MessageKind::Error);
                }
                Ok(ChatResponse::CharacterReply {
                    character,
                    response,
                    emotion,
                }) => {
                    tracing::info!(
                        elapsed_ms,
                        %character,
                        emotion = %emotion.emotion,
                        arousal = ?emotion.arousal,
                        valence = ?emotion.valence,
                        "character reply"
                    );
                    w.append_character_message(&character, &response, &emotion);
                }
                Ok(ChatResponse::PlainReply(response)) => {
                    tracing::info!(elapsed_ms, "reply");
                    w.append_message(Sender::Bot, &response, MessageKind::Plain);
                }
                Ok(other) => {
                    tracing::warn!(elapsed_ms, ?other, "unexpected chat response");
                    w.append_message(Sender::Bot, CONNECT_ERROR_TEXT, MessageKind::Error);
                }
                Err(e) => {
                    tracing::warn!(elapsed_ms, error = %e, "chat request failed");
                    w.append_message(Sender::Bot, CONNECT_ERROR_TEXT, MessageKind::Error);
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Uploads `file` if its media type is a PDF.
    pub async fn upload_pdf(&self, file: PdfFile) {
        if !file.is_pdf() {
            tracing::info!(name = %file.name, media_type = %file.media_type, "rejected non-PDF upload");
            self.with_widget(|w| {
                w.append_message(Sender::Bot, NOT_PDF_TEXT, MessageKind::Error);
            });
            return;
        }

        let id = self.next_request_id();
        let span = tracing::info_span!("upload_pdf", request = id.0, name = %file.name);
        async {
            self.with_widget(|w| {
                w.append_message(Sender::Bot, UPLOADING_TEXT, MessageKind::Info);
            });
            let started = Instant::now();
            let size = file.bytes.len();
            let result = self.post_pdf(file).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;

            let mut w = self.lock_widget();
            match result {
                Ok(ChatResponse::Error(error)) => {
                    tracing::info!(elapsed_ms, %error, "server rejected upload");
                    w.append_message(Sender::Bot, &format!("Error: {}", error), MessageKind::Error);
                }
                Ok(ChatResponse::UploadResult {
                    response,
                    characters,
                }) => {
                    tracing::info!(elapsed_ms, size, characters = characters.len(), "upload done");
                    w.display_characters(&characters);
                    w.append_message(Sender::Bot, &response, MessageKind::Info);
                }
                Ok(other) => {
                    tracing::warn!(elapsed_ms, ?other, "unexpected upload response");
                    w.append_message(Sender::Bot, UPLOAD_ERROR_TEXT, MessageKind::Error);
                }
                Err(e) => {
                    tracing::warn!(elapsed_ms, error = %e, "upload failed");
                    w.append_message(Sender::Bot, UPLOAD_ERROR_TEXT, MessageKind::Error);
                }
            }
        }
        .instrument(span)
        .await
    }

    /// File-input change: the selection is reset before the upload runs.
    pub async fn select_file(&self, file: Option<PdfFile>) {
        self.with_widget(|w| w.set_selected_file(None));
        if let Some(file) = file {
            self.upload_pdf(file).await;
        }
    }

    /// Key press in the input field. Returns true when the default action
    /// is suppressed.
    pub async fn handle_key(&self, key: &str) -> bool {
        if key != "Enter" {
            return false;
        }
        self.send_message().await;
        true
    }

    /// Returns true when the default action is suppressed.
    pub async fn handle_drag(&self, event: DragEvent) -> bool {
        match event {
            DragEvent::Enter => {
                self.with_widget(|w| w.set_overlay(true));
                true
            }
            DragEvent::Over => true,
            DragEvent::Leave { related_target } => {
                if !related_target {
                    self.with_widget(|w| w.set_overlay(false));
                }
                false
            }
            DragEvent::Drop { file } => {
                self.with_widget(|w| w.set_overlay(false));
                if let Some(file) = file {
                    self.upload_pdf(file).await;
                }
                true
            }
        }
    }

    async fn post_message(&self, message: &str) -> Result<ChatResponse, ClientError> {
        tracing::debug!(endpoint = %self.endpoint, "posting message");
        let response = self
            .http
            .post(self.endpoint.clone())
            .form(&MessageForm::new(message))
            .send()
            .await?;
        let value = read_json(response).await?;
        ChatResponse::from_chat_json(&value).map_err(ClientError::Decode)
    }

    async fn post_pdf(&self, file: PdfFile) -> Result<ChatResponse, ClientError> {
        tracing::debug!(endpoint = %self.endpoint, media_type = %file.media_type, "posting pdf");
        let part = Part::bytes(file.bytes).file_name(file.name);
        // Media types reqwest cannot parse are sent without a part content type.
        let part = if Part::bytes(Vec::new()).mime_str(&file.media_type).is_ok() {
            part.mime_str(&file.media_type)?
        } else {
            tracing::debug!(media_type = %file.media_type, "unparseable media type, omitting it");
            part
        };
        let form = Form::new().part(PDF_FIELD, part);
        let response = self
            .http
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await?;
        let value = read_json(response).await?;
        ChatResponse::from_upload_json(&value).map_err(ClientError::Decode)
    }
}

/// Status codes are not consulted: error replies carry an `error` body.
async fn read_json(response: reqwest::Response) -> Result<serde_json::Value, ClientError> {
    let status = response.status();
    let body = response.bytes().await?;
    tracing::debug!(%status, bytes = body.len(), "response received");
    Ok(serde_json::from_slice(&body)?)
}

fn chat_path(base: &reqwest::Url) -> String {
    if base.path().ends_with('/') {
        "chat".to_string()
    } else {
        format!("{}/chat", base.path())
    }
}
