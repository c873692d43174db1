// tests/common/mod.rs
pub use axum::Router;
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use http::StatusCode;
use reqwest::Client;
use serde_json::Value;
use tokio::sync::Semaphore;
use tracing_subscriber::fmt::MakeWriter;

use crate::config::identity::{ClientConfig, Credentials};
use crate::error::{IdentityError, Result};
use crate::transport::{Transport, TransportRequest, TransportResponse};

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

pub fn api_key_config(base_url: &str) -> ClientConfig {
    ClientConfig::new(base_url, Credentials::ApiKey { username: "admin".into(), api_key: "s3cr3t".into() })
        .unwrap()
        .with_extra_args([("tenantName", "ops")])
}

/// `POST /tokens` success body.
pub fn access_body(token: &str, catalog: Value) -> Value {
    json!({"access": {
        "token": {"id": token, "expires": "2030-01-01T00:00:00.000Z"},
        "serviceCatalog": catalog,
    }})
}

pub fn ok(body: Value) -> Result<TransportResponse> {
    Ok(TransportResponse { status: StatusCode::OK, body })
}

type Responder = Box<dyn Fn(&TransportRequest, usize) -> Result<TransportResponse> + Send + Sync>;

/// In-memory transport: records requests and answers from a closure that
/// also receives the 1-based call number. With a gate, every call waits for
/// a permit, which keeps a refresh in flight until the test releases it.
pub struct ScriptedTransport {
    responder: Responder,
    requests: Mutex<Vec<TransportRequest>>,
    calls: AtomicUsize,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedTransport {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&TransportRequest, usize) -> Result<TransportResponse> + Send + Sync + 'static,
    {
        Self { responder: Box::new(responder), requests: Mutex::new(Vec::new()), calls: AtomicUsize::new(0), gate: None }
    }

    /// Issues `admin-1`, `admin-2`, ... on every refresh.
    pub fn issuing_tokens(catalog: Value) -> Self {
        Self::new(move |_, n| ok(access_body(&format!("admin-{}", n), catalog.clone())))
    }

    pub fn failing(err: IdentityError) -> Self {
        Self::new(move |_, _| Err(err.clone()))
    }

    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        (self.responder)(&request, n)
    }
}

/// Collects formatted log lines for assertions on severity.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync {
        tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .without_time()
            .finish()
    }

    pub fn lines_containing(&self, needle: &str) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .filter(|line| line.contains(needle))
            .map(str::to_owned)
            .collect()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
