use std::io;
use std::net::{SocketAddr, TcpListener as StdTcpListener};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::http::{HeaderMap, StatusCode};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::{InMemorySpanExporter, SdkTracerProvider, SpanData, Tracer};
use serde_json::Value;
use tierchain_core::outcome::OutcomeSource;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing_subscriber::fmt::MakeWriter;

pub fn free_port() -> u16 {
    let listener = StdTcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// In-memory trace pipeline. Finished spans land synchronously in the
/// exporter and stay there while this value is alive: shutting the provider
/// down, which happens when its last handle drops, clears the exporter.
pub struct TestTracing {
    provider: SdkTracerProvider,
    exporter: InMemorySpanExporter,
}

impl TestTracing {
    pub fn new() -> Self {
        let exporter = InMemorySpanExporter::default();
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(exporter.clone())
            .build();
        Self { provider, exporter }
    }

    pub fn tracer(&self) -> Tracer {
        self.provider.tracer("tierchain")
    }

    pub fn finished_spans(&self) -> Vec<SpanData> {
        self.exporter.get_finished_spans().unwrap()
    }
}

impl Default for TestTracing {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome source with no latency and a fixed roll.
#[derive(Debug, Clone, Copy)]
pub struct FixedOutcomes {
    pub latency: Duration,
    pub roll: f64,
}

impl FixedOutcomes {
    pub fn with_roll(roll: f64) -> Self {
        Self {
            latency: Duration::ZERO,
            roll,
        }
    }

    pub fn success() -> Self {
        Self::with_roll(0.5)
    }

    pub fn client_error() -> Self {
        Self::with_roll(0.15)
    }

    pub fn server_error() -> Self {
        Self::with_roll(0.05)
    }
}

impl OutcomeSource for FixedOutcomes {
    fn latency(&self) -> Duration {
        self.latency
    }

    fn roll(&self) -> f64 {
        self.roll
    }
}

/// In-memory sink for the JSON log layer.
#[derive(Debug, Clone, Default)]
pub struct CaptureWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl CaptureWriter {
    pub fn contents(&self) -> String {
        String::from_utf8(self.buf.lock().unwrap().clone()).unwrap()
    }

    pub fn json_lines(&self) -> Vec<Value> {
        self.contents()
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

impl io::Write for CaptureWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CaptureWriter {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Stand-in for a downstream tier: answers every path with one fixed JSON
/// response and remembers the headers it was sent.
pub struct StubServer {
    addr: SocketAddr,
    seen: Arc<Mutex<Vec<HeaderMap>>>,
    task: JoinHandle<()>,
}

impl StubServer {
    pub async fn json(status: u16, body: Value) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let status = StatusCode::from_u16(status).unwrap();

        let handler = {
            let seen = seen.clone();
            move |headers: HeaderMap| {
                let seen = seen.clone();
                let body = body.clone();
                async move {
                    seen.lock().unwrap().push(headers);
                    (status, Json(body))
                }
            }
        };
        let app = Router::new().fallback(handler);
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, seen, task }
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn hits(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn last_headers(&self) -> Option<HeaderMap> {
        self.seen.lock().unwrap().last().cloned()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
