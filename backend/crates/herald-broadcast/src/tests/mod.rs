mod streaming;

use crate::{Broadcaster, BroadcasterSnapshot, BroadcasterStatus};

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use herald_core::LogRecord;
use serde_json::{Map, Value};

pub(crate) fn sample_record(text: &str) -> LogRecord {
    LogRecord::new(text, "thread-1", "info", "2026-01-01T00:00:00Z")
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum Behaviour {
    Succeed,
    Fail,
    Panic,
}

/// Broadcaster double that records what it was asked to deliver.
pub(crate) struct RecordingBroadcaster {
    name: String,
    behaviour: Behaviour,
    available: AtomicBool,
    calls: AtomicUsize,
    shutdowns: AtomicUsize,
    received: Mutex<Vec<String>>,
}

impl RecordingBroadcaster {
    pub(crate) fn new(name: &str, behaviour: Behaviour) -> Self {
        Self {
            name: name.to_string(),
            behaviour,
            available: AtomicBool::new(true),
            calls: AtomicUsize::new(0),
            shutdowns: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn unavailable(name: &str) -> Self {
        let broadcaster = Self::new(name, Behaviour::Succeed);
        broadcaster.available.store(false, Ordering::SeqCst);
        broadcaster
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }

    pub(crate) fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }

    fn deliver(&self, what: String) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.received.lock().unwrap().push(what);
        match self.behaviour {
            Behaviour::Succeed => true,
            Behaviour::Fail => false,
            Behaviour::Panic => panic!("{} exploded", self.name),
        }
    }
}

#[async_trait]
impl Broadcaster for RecordingBroadcaster {
    fn name(&self) -> &str {
        &self.name
    }

    fn provider(&self) -> &'static str {
        "recording"
    }

    async fn broadcast_log(&self, record: &LogRecord) -> bool {
        self.deliver(format!("log:{}", record.text))
    }

    async fn broadcast_admin_event(&self, payload: &Value) -> bool {
        self.deliver(format!("admin:{}", payload))
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn status(&self) -> BroadcasterSnapshot {
        BroadcasterSnapshot {
            name: self.name.clone(),
            provider: self.provider().to_string(),
            status: if self.is_available() {
                BroadcasterStatus::Active
            } else {
                BroadcasterStatus::Disabled
            },
            available: self.is_available(),
            message_count: self.calls() as u64,
            error_count: 0,
            details: Map::new(),
        }
    }

    async fn shutdown(&self) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}
