//! In-process `/chat` test server shared by the integration tests. Records
//! every request it receives and answers with a scripted JSON body.

#![allow(dead_code)]

use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Form, Router};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// What the server saw on one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    Message(String),
    Pdf {
        field: String,
        file_name: Option<String>,
        content_type: Option<String>,
        bytes: Vec<u8>,
    },
    Other(String),
}

pub type Reply = Arc<dyn Fn(&Received) -> (StatusCode, String) + Send + Sync>;

#[derive(Clone)]
struct TestState {
    received: Arc<Mutex<Vec<Received>>>,
    reply: Reply,
    gate: Option<Arc<Notify>>,
}

pub struct TestServer {
    pub base_url: String,
    received: Arc<Mutex<Vec<Received>>>,
    gate: Option<Arc<Notify>>,
}

impl TestServer {
    pub fn received(&self) -> Vec<Received> {
        self.received.lock().unwrap().clone()
    }

    /// Lets one gated request answer.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub async fn wait_for_requests(&self, n: usize) {
        while self.received().len() < n {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }
}

async fn chat(State(state): State<TestState>, req: Request) -> impl IntoResponse {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let received = if content_type.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(req, &state).await.unwrap();
        let field = multipart.next_field().await.unwrap().unwrap();
        Received::Pdf {
            field: field.name().unwrap_or_default().to_string(),
            file_name: field.file_name().map(str::to_string),
            content_type: field.content_type().map(str::to_string),
            bytes: field.bytes().await.unwrap().to_vec(),
        }
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(fields): Form<HashMap<String, String>> =
            Form::from_request(req, &state).await.unwrap();
        Received::Message(fields.get("message").cloned().unwrap_or_default())
    } else {
        Received::Other(content_type)
    };

    state.received.lock().unwrap().push(received.clone());
    if let Some(gate) = &state.gate {
        gate.notified().await;
    }
    let (status, body) = (state.reply)(&received);
    (status, [(header::CONTENT_TYPE, "application/json")], body)
}

/// Serves `/chat` on an ephemeral port of the current runtime.
pub async fn serve(reply: Reply, gated: bool) -> TestServer {
    let received = Arc::new(Mutex::new(Vec::new()));
    let gate = gated.then(|| Arc::new(Notify::new()));
    let state = TestState {
        received: received.clone(),
        reply,
        gate: gate.clone(),
    };
    let app = Router::new().route("/chat", post(chat)).with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
        received,
        gate,
    }
}

/// Serves `/chat` from a background thread with its own runtime, for tests
/// that block on a child process.
pub fn serve_in_thread(reply: Reply) -> TestServer {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async move {
            let server = serve(reply, false).await;
            tx.send(server).unwrap();
            std::future::pending::<()>().await;
        });
    });
    rx.recv().unwrap()
}

/// Canned replies shaped like the persona service's.
pub fn persona_reply() -> Reply {
    Arc::new(|received: &Received| match received {
        Received::Message(m) if m == "Who are you?" => (
            StatusCode::OK,
            r#"{"response":"I'm Alice","character":"Alice","emotion":{"arousal":0.6,"valence":0.8,"emotion":"happy"}}"#.into(),
        ),
        Received::Message(_) => (StatusCode::OK, r#"{"response":"Hi there"}"#.into()),
        Received::Pdf { .. } => (
            StatusCode::OK,
            r#"{"response":"Parsed","characters":[{"name":"Bob","summary":"A guide"}]}"#.into(),
        ),
        Received::Other(_) => (
            StatusCode::BAD_REQUEST,
            r#"{"error":"No message or PDF file provided"}"#.into(),
        ),
    })
}

pub fn fixed_reply(status: StatusCode, body: &'static str) -> Reply {
    Arc::new(move |_: &Received| (status, body.to_string()))
}

/// A port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
