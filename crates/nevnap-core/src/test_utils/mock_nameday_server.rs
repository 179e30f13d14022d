// src/test_utils/mock_nameday_server.rs
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::Notify;

#[derive(Clone)]
struct StubResponse {
    status: u16,
    body: String,
}

/// Holds the response for one key until the test releases it, so tests can
/// deterministically interleave a slow response with newer navigation.
pub struct Gate {
    arrived: Notify,
    release: Notify,
}

impl Gate {
    fn new() -> Self {
        Self {
            arrived: Notify::new(),
            release: Notify::new(),
        }
    }

    /// Resolves once the gated request has reached the server.
    pub async fn wait_arrived(&self) {
        self.arrived.notified().await;
    }

    /// Lets the gated response go out.
    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[derive(Clone)]
struct MockServerState {
    stubs: Arc<Mutex<HashMap<String, StubResponse>>>,
    gates: Arc<Mutex<HashMap<String, Arc<Gate>>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

async fn nap_handler(
    State(state): State<MockServerState>,
    Path(key): Path<String>,
) -> (StatusCode, String) {
    log::debug!("mock name day server received request for key {}", key);
    state.requests.lock().unwrap().push(key.clone());

    let gate = state.gates.lock().unwrap().get(&key).cloned();
    if let Some(gate) = gate {
        gate.arrived.notify_one();
        gate.release.notified().await;
    }

    let stub = state.stubs.lock().unwrap().get(&key).cloned();
    match stub {
        Some(stub) => (
            StatusCode::from_u16(stub.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            stub.body,
        ),
        None => (StatusCode::NOT_FOUND, "{}".to_string()),
    }
}

pub struct MockNameDayServer {
    addr: SocketAddr,
    state: MockServerState,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
}

impl MockNameDayServer {
    pub async fn start() -> Self {
        let state = MockServerState {
            stubs: Arc::new(Mutex::new(HashMap::new())),
            gates: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        };

        let app = Router::new()
            .route("/nap/{key}", get(nap_handler))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap_or_else(|e| {
            panic!("Failed to bind mock server to 127.0.0.1:0. Error: {}", e);
        });
        let addr = listener.local_addr().unwrap();
        log::info!("Mock name day server listening on {}", addr);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap_or_else(|e| {
                    log::error!("Mock name day server error: {}", e);
                });
        });

        MockNameDayServer {
            addr,
            state,
            shutdown_tx,
        }
    }

    pub fn address(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stub a 200 response body for one key.
    pub fn stub(&self, key: &str, body: &str) {
        self.stub_with_status(key, 200, body);
    }

    pub fn stub_with_status(&self, key: &str, status: u16, body: &str) {
        self.state.stubs.lock().unwrap().insert(
            key.to_string(),
            StubResponse {
                status,
                body: body.to_string(),
            },
        );
    }

    /// Gate the response for one key; it will not be sent until the
    /// returned [`Gate`] is released.
    pub fn hold(&self, key: &str) -> Arc<Gate> {
        let gate = Arc::new(Gate::new());
        self.state
            .gates
            .lock()
            .unwrap()
            .insert(key.to_string(), gate.clone());
        gate
    }

    /// Keys requested so far, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.state.requests.lock().unwrap().clone()
    }

    pub async fn shutdown(self) {
        if self.shutdown_tx.send(()).is_err() {
            log::warn!("Mock name day server shutdown signal already sent or receiver dropped.");
        }
    }
}
