#![allow(dead_code)]

//! Test infrastructure for herald-server route tests

use herald_broadcast::{
    Broadcaster, BroadcasterManager, BroadcasterSnapshot, BroadcasterStatus,
};
use herald_server::{AppState, build_router};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum_test::TestServer;
use herald_core::LogRecord;
use serde_json::{Map, Value};

/// Broadcaster double that keeps every delivery.
pub struct CapturingBroadcaster {
    name: String,
    accept: bool,
    available: AtomicBool,
    logs: Mutex<Vec<LogRecord>>,
    admin_events: Mutex<Vec<Value>>,
}

impl CapturingBroadcaster {
    pub fn accepting(name: &str) -> Arc<Self> {
        Arc::new(Self::build(name, true))
    }

    pub fn refusing(name: &str) -> Arc<Self> {
        Arc::new(Self::build(name, false))
    }

    fn build(name: &str, accept: bool) -> Self {
        Self {
            name: name.to_string(),
            accept,
            available: AtomicBool::new(true),
            logs: Mutex::new(Vec::new()),
            admin_events: Mutex::new(Vec::new()),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn logs(&self) -> Vec<LogRecord> {
        self.logs.lock().unwrap().clone()
    }

    pub fn admin_events(&self) -> Vec<Value> {
        self.admin_events.lock().unwrap().clone()
    }
}

#[async_trait]
impl Broadcaster for CapturingBroadcaster {
    fn name(&self) -> &str {
        &self.name
    }

    fn provider(&self) -> &'static str {
        "capturing"
    }

    async fn broadcast_log(&self, record: &LogRecord) -> bool {
        self.logs.lock().unwrap().push(record.clone());
        self.accept
    }

    async fn broadcast_admin_event(&self, payload: &Value) -> bool {
        self.admin_events.lock().unwrap().push(payload.clone());
        self.accept
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn status(&self) -> BroadcasterSnapshot {
        let status = if self.is_available() {
            BroadcasterStatus::Active
        } else {
            BroadcasterStatus::Disabled
        };
        BroadcasterSnapshot {
            name: self.name.clone(),
            provider: self.provider().to_string(),
            status,
            available: self.is_available(),
            message_count: (self.logs().len() + self.admin_events().len()) as u64,
            error_count: 0,
            details: Map::new(),
        }
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
}

/// Router over a manager holding `broadcasters`; the first is primary.
pub fn create_test_app(broadcasters: Vec<Arc<dyn Broadcaster>>) -> TestApp {
    let manager = Arc::new(BroadcasterManager::new());
    for (i, broadcaster) in broadcasters.into_iter().enumerate() {
        manager.add_broadcaster(broadcaster, i == 0);
    }

    let state = AppState::new(manager);
    let server = TestServer::builder()
        .build(build_router(state.clone()))
        .expect("Failed to create test server");

    TestApp { server, state }
}

pub fn log_body(text: &str) -> Value {
    serde_json::json!({
        "text": text,
        "threadId": "main",
        "level": "info",
        "timestamp": "2026-03-01T12:00:00Z",
        "runId": "run-7",
    })
}
