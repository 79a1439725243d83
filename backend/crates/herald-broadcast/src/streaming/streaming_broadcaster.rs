use crate::{
    Broadcaster, BroadcastError, BroadcasterSnapshot, BroadcasterStatus, ErrorClass, Metrics,
    RetryConfig, STREAMING_RATE_LIMIT_KEYWORDS, ShutdownCoordinator, ShutdownGuard, StatusTracker,
    create_flush_span, with_retry,
};

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use herald_config::{Config, StreamingConfig};
use herald_core::{Channel, EventKind, LogRecord};
use log::{debug, error, info, warn};
use serde_json::{Map, Value, json};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_tungstenite::tungstenite::protocol::Message;
use tracing::Instrument;

use super::connection::{
    AtomicConnectionState, ConnectionSlot, RealtimeSource, open_socket,
};
use super::{BatchEntry, BatchQueue, ConnectionState, FrameError, InboundFrame, PublishFrame, RealtimeEndpoint};

const PROVIDER: &str = "streaming";

/// Publishes not acknowledged within this window are forgotten.
const ACK_TIMEOUT: Duration = Duration::from_secs(30);

/// Publishes over one persistent realtime socket.
///
/// Submissions are queued per channel and flushed every `batch_interval` by a
/// background task. The socket is opened lazily on the first flush and
/// reopened whenever it is found closed.
pub struct StreamingBroadcaster {
    inner: Arc<StreamingInner>,
}

struct StreamingInner {
    name: String,
    namespace: String,
    endpoint: Option<RealtimeEndpoint>,
    api_key: String,
    region: Option<String>,
    batch_interval: Duration,
    connect_timeout: Duration,
    retry: RetryConfig,

    tracker: StatusTracker,
    running: AtomicBool,
    /// Flush task has been spawned
    started: AtomicBool,
    flush_task: StdMutex<Option<JoinHandle<()>>>,
    batch: Mutex<BatchQueue>,
    queued: AtomicUsize,
    connection: Mutex<ConnectionSlot>,
    state: AtomicConnectionState,
    in_flight: StdMutex<HashMap<String, InFlight>>,

    /// Stops the flush loop (which flushes once more on the way out)
    flush_stop: ShutdownCoordinator,
    /// Stops the acknowledgement reader
    reader_stop: ShutdownCoordinator,
    metrics: Metrics,
}

struct InFlight {
    channel: String,
    events: usize,
    sent_at: Instant,
}

impl StreamingBroadcaster {
    /// Build from the streaming section. Missing credentials or an
    /// unparseable endpoint leave the broadcaster `Disabled`.
    pub fn new(
        name: impl Into<String>,
        namespace: &str,
        config: &StreamingConfig,
        retry: RetryConfig,
    ) -> Self {
        let name = name.into();

        let endpoint = if !config.enabled {
            info!("Streaming broadcaster {} disabled by configuration", name);
            None
        } else if !config.is_complete() {
            warn!(
                "Streaming broadcaster {} disabled, missing: {}",
                name,
                config.missing_fields().join(", ")
            );
            None
        } else {
            match RealtimeEndpoint::parse(config.endpoint.as_deref().unwrap_or_default()) {
                Ok(endpoint) => Some(endpoint),
                Err(e) => {
                    error!("Streaming broadcaster {} disabled: {}", name, e);
                    None
                }
            }
        };

        let initial = if endpoint.is_some() {
            BroadcasterStatus::Active
        } else {
            BroadcasterStatus::Disabled
        };

        if let Some(endpoint) = &endpoint {
            info!(
                "Streaming broadcaster {} targeting {} (namespace {})",
                name,
                endpoint.realtime_url(),
                namespace
            );
        }

        Self {
            inner: Arc::new(StreamingInner {
                tracker: StatusTracker::new(name.clone(), initial),
                name,
                namespace: namespace.to_string(),
                endpoint,
                api_key: config.api_key.clone().unwrap_or_default(),
                region: config.region.clone(),
                batch_interval: Duration::from_millis(config.batch_interval_ms),
                connect_timeout: Duration::from_secs(config.connect_timeout_secs),
                retry,
                running: AtomicBool::new(initial == BroadcasterStatus::Active),
                started: AtomicBool::new(false),
                flush_task: StdMutex::new(None),
                batch: Mutex::new(BatchQueue::new()),
                queued: AtomicUsize::new(0),
                connection: Mutex::new(ConnectionSlot::default()),
                state: AtomicConnectionState::new(),
                in_flight: StdMutex::new(HashMap::new()),
                flush_stop: ShutdownCoordinator::new(),
                reader_stop: ShutdownCoordinator::new(),
                metrics: Metrics::new(),
            }),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            PROVIDER,
            &config.broadcast.namespace,
            &config.streaming,
            RetryConfig::from(&config.retry),
        )
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.inner.state.load()
    }

    pub fn queued_events(&self) -> usize {
        self.inner.queued.load(Ordering::Acquire)
    }

    pub fn in_flight_publishes(&self) -> usize {
        self.inner.in_flight_len()
    }

    async fn enqueue(&self, kind: EventKind, data: Value) -> bool {
        if !self.is_available() {
            self.inner.metrics.event_rejected(&self.inner.name);
            return false;
        }

        self.ensure_started();

        let channel = Channel::new(&self.inner.namespace, kind);
        let entry = BatchEntry::new(kind.event_name(), data);

        let mut batch = self.inner.batch.lock().await;
        // Re-checked under the lock so nothing lands after the final flush.
        if !self.inner.running.load(Ordering::Acquire) {
            self.inner.metrics.event_rejected(&self.inner.name);
            return false;
        }
        batch.push(&channel, entry);
        self.inner.queued.store(batch.len(), Ordering::Release);
        drop(batch);

        self.inner.metrics.event_queued(&self.inner.name);
        true
    }

    /// Spawn the flush task exactly once. Never touches the connection lock,
    /// so submissions do not wait on a connect in progress.
    fn ensure_started(&self) {
        let inner = &self.inner;
        if inner.started.load(Ordering::Acquire) || !inner.running.load(Ordering::Acquire) {
            return;
        }

        let mut flush_task = match inner.flush_task.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        if inner.started.swap(true, Ordering::AcqRel) {
            return;
        }

        let guard = inner.flush_stop.subscribe_guard();
        *flush_task = Some(tokio::spawn(Arc::clone(inner).run_flush_loop(guard)));
        debug!("Streaming broadcaster {} flush task started", self.inner.name);
    }
}

impl StreamingInner {
    async fn run_flush_loop(self: Arc<Self>, mut guard: ShutdownGuard) {
        let mut ticker = tokio::time::interval(self.batch_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => self.flush().await,
                _ = guard.wait() => {
                    debug!("Streaming broadcaster {} performing final flush", self.name);
                    self.flush().await;
                    break;
                }
            }
        }

        debug!("Streaming broadcaster {} flush task stopped", self.name);
    }

    async fn flush(self: &Arc<Self>) {
        self.expire_in_flight(ACK_TIMEOUT);

        let chunks = {
            let mut batch = self.batch.lock().await;
            let chunks = batch.drain_chunks();
            self.queued.store(0, Ordering::Release);
            chunks
        };

        if chunks.is_empty() {
            return;
        }

        let queued = chunks.iter().map(|(_, entries)| entries.len()).sum();
        let started = Instant::now();

        async {
            for (channel, entries) in chunks {
                if !self.tracker.is_active() {
                    warn!(
                        "Streaming broadcaster {} is {}, dropping {} events for {}",
                        self.name,
                        self.tracker.status(),
                        entries.len(),
                        channel
                    );
                    continue;
                }
                self.publish_chunk(channel, entries).await;
            }
        }
        .instrument(create_flush_span(&self.name, queued))
        .await;

        self.metrics.queue_depth(&self.name, self.queued.load(Ordering::Acquire));
        self.metrics.flush_latency(&self.name, started.elapsed());
    }

    async fn publish_chunk(self: &Arc<Self>, channel: String, entries: Vec<BatchEntry>) {
        let Some(endpoint) = self.endpoint.as_ref() else {
            return;
        };

        let mut events = Vec::with_capacity(entries.len());
        for entry in &entries {
            match serde_json::to_string(entry) {
                Ok(encoded) => events.push(encoded),
                Err(e) => self.record_failure(&BroadcastError::from(e)),
            }
        }
        if events.is_empty() {
            return;
        }

        let count = events.len();
        let frame = PublishFrame::new(channel.clone(), events, endpoint.authorization(&self.api_key));
        let payload = match serde_json::to_string(&frame) {
            Ok(payload) => payload,
            Err(e) => {
                self.record_failure(&BroadcastError::from(e));
                return;
            }
        };

        let mut slot = self.connection.lock().await;

        if slot.sink.is_none()
            && let Err(e) = self.connect(&mut slot, endpoint).await
        {
            error!(
                "Streaming broadcaster {} could not connect, dropping {} events for {}: {}",
                self.name, count, channel, e
            );
            self.record_failure(&e);
            return;
        }

        let Some(sink) = slot.sink.as_mut() else {
            return;
        };

        self.track_in_flight(&frame.id, &channel, count);

        match sink.send(Message::Text(payload.into())).await {
            Ok(()) => {
                debug!(
                    "Streaming broadcaster {} published {} events to {} ({})",
                    self.name, count, channel, frame.id
                );
                self.tracker.record_messages(count as u64);
                self.metrics.published(&self.name, count);
            }
            Err(e) => {
                self.take_in_flight(&frame.id);
                slot.sink = None;
                self.state.store(ConnectionState::Disconnected);
                let e = BroadcastError::from(e);
                error!(
                    "Streaming broadcaster {} failed to publish to {}: {}",
                    self.name, channel, e
                );
                self.record_failure(&e);
            }
        }
    }

    /// Open a fresh socket and start its reader. Caller holds the connection lock.
    async fn connect(
        self: &Arc<Self>,
        slot: &mut ConnectionSlot,
        endpoint: &RealtimeEndpoint,
    ) -> crate::Result<()> {
        self.state.store(ConnectionState::Connecting);
        info!("Connecting to {}", endpoint.realtime_url());

        let api_key = self.api_key.as_str();
        let connect_timeout = self.connect_timeout;
        let result = with_retry(&self.retry, "Realtime connect", || {
            open_socket(endpoint, api_key, connect_timeout)
        })
        .await;

        let (sink, source) = match result {
            Ok(halves) => halves,
            Err(e) => {
                self.state.store(ConnectionState::Disconnected);
                return Err(e);
            }
        };

        if let Some(previous) = slot.reader_task.take() {
            previous.abort();
        }
        // Acks for frames sent on an earlier socket can no longer arrive.
        self.abandon_in_flight("reconnected");

        slot.generation += 1;
        slot.sink = Some(sink);

        let guard = self.reader_stop.subscribe_guard();
        let inner = Arc::clone(self);
        slot.reader_task = Some(tokio::spawn(inner.run_reader(source, slot.generation, guard)));

        self.state.store(ConnectionState::Connected);
        info!("Streaming broadcaster {} connected", self.name);
        Ok(())
    }

    async fn run_reader(
        self: Arc<Self>,
        mut source: RealtimeSource,
        generation: u64,
        mut stop: ShutdownGuard,
    ) {
        loop {
            tokio::select! {
                _ = stop.wait() => return,
                frame = source.next() => match frame {
                    Some(Ok(Message::Text(text))) => self.handle_inbound(text.as_str()),
                    Some(Ok(Message::Close(reason))) => {
                        info!("Realtime socket closed by server: {:?}", reason);
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("Realtime read error: {}", e);
                        break;
                    }
                    None => {
                        info!("Realtime stream ended");
                        break;
                    }
                }
            }
        }

        self.mark_disconnected(generation).await;
    }

    async fn mark_disconnected(&self, generation: u64) {
        let mut slot = self.connection.lock().await;
        if slot.generation == generation && slot.sink.is_some() {
            slot.sink = None;
            self.state.store(ConnectionState::Disconnected);
            debug!(
                "Streaming broadcaster {} connection {} marked disconnected",
                self.name, generation
            );
            self.abandon_in_flight("connection lost");
        }
    }

    fn handle_inbound(&self, text: &str) {
        let frame = match serde_json::from_str::<InboundFrame>(text) {
            Ok(frame) => frame,
            Err(e) => {
                debug!("Discarding malformed realtime frame: {}", e);
                return;
            }
        };

        match frame {
            InboundFrame::ConnectionAck {
                connection_timeout_ms,
            } => {
                debug!(
                    "Realtime connection acknowledged (timeout {:?}ms)",
                    connection_timeout_ms
                );
            }
            InboundFrame::Ka => debug!("Realtime keep-alive"),
            InboundFrame::PublishSuccess { id, failed, .. } => {
                if let Some(pending) = id.as_deref().and_then(|id| self.take_in_flight(id)) {
                    debug!(
                        "Publish of {} events to {} acknowledged in {:?}",
                        pending.events,
                        pending.channel,
                        pending.sent_at.elapsed()
                    );
                }
                self.metrics.ack_received(&self.name, "success");

                if !failed.is_empty() {
                    warn!(
                        "Streaming broadcaster {}: {} events rejected by the service",
                        self.name,
                        failed.len()
                    );
                    self.tracker.record_error(ErrorClass::Generic);
                }
            }
            InboundFrame::PublishError {
                id,
                errors,
                message,
            }
            | InboundFrame::Error {
                id,
                errors,
                message,
            } => {
                if let Some(id) = id.as_deref() {
                    self.take_in_flight(id);
                }
                self.metrics.ack_received(&self.name, "error");
                self.record_remote_error(&FrameError::describe_all(&errors, message.as_deref()));
            }
            InboundFrame::ConnectionError { errors, message } => {
                self.record_remote_error(&FrameError::describe_all(&errors, message.as_deref()));
            }
            InboundFrame::Unknown => debug!("Ignoring unrecognised realtime frame"),
        }
    }

    fn record_remote_error(&self, message: &str) {
        let class = ErrorClass::classify(message, None, STREAMING_RATE_LIMIT_KEYWORDS);
        warn!(
            "Streaming broadcaster {} received error ({}): {}",
            self.name,
            class.as_str(),
            message
        );
        self.tracker.record_error(class);
    }

    fn record_failure(&self, error: &BroadcastError) {
        self.metrics.publish_failed(&self.name);
        self.tracker
            .record_error(ErrorClass::of_error(error, STREAMING_RATE_LIMIT_KEYWORDS));
    }

    fn track_in_flight(&self, id: &str, channel: &str, events: usize) {
        if let Ok(mut table) = self.in_flight.lock() {
            table.insert(
                id.to_string(),
                InFlight {
                    channel: channel.to_string(),
                    events,
                    sent_at: Instant::now(),
                },
            );
        }
    }

    fn take_in_flight(&self, id: &str) -> Option<InFlight> {
        self.in_flight.lock().ok().and_then(|mut table| table.remove(id))
    }

    /// Forget every pending publish. Returns how many were dropped.
    fn abandon_in_flight(&self, reason: &str) -> usize {
        let dropped = match self.in_flight.lock() {
            Ok(mut table) => table.drain().count(),
            Err(poisoned) => poisoned.into_inner().drain().count(),
        };
        if dropped > 0 {
            warn!(
                "Streaming broadcaster {} abandoned {} unacknowledged publishes ({})",
                self.name, dropped, reason
            );
        }
        dropped
    }

    /// Drop publishes older than `max_age`. Returns how many expired.
    fn expire_in_flight(&self, max_age: Duration) -> usize {
        let Ok(mut table) = self.in_flight.lock() else {
            return 0;
        };
        let before = table.len();
        table.retain(|_, pending| pending.sent_at.elapsed() < max_age);
        let expired = before - table.len();
        if expired > 0 {
            warn!(
                "Streaming broadcaster {}: {} publishes expired without acknowledgement",
                self.name, expired
            );
        }
        expired
    }

    fn in_flight_len(&self) -> usize {
        self.in_flight.lock().map(|table| table.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Broadcaster for StreamingBroadcaster {
    fn name(&self) -> &str {
        &self.inner.name
    }

    fn provider(&self) -> &'static str {
        PROVIDER
    }

    async fn broadcast_log(&self, record: &LogRecord) -> bool {
        self.enqueue(EventKind::Log, record.to_value()).await
    }

    async fn broadcast_admin_event(&self, payload: &Value) -> bool {
        self.enqueue(EventKind::Admin, payload.clone()).await
    }

    fn is_available(&self) -> bool {
        self.inner.tracker.is_active() && self.inner.running.load(Ordering::Acquire)
    }

    fn status(&self) -> BroadcasterSnapshot {
        let inner = &self.inner;
        let mut details = Map::new();
        details.insert(
            "endpoint".into(),
            json!(inner.endpoint.as_ref().map(|e| e.realtime_url())),
        );
        details.insert(
            "api_host".into(),
            json!(inner.endpoint.as_ref().map(|e| e.api_host())),
        );
        details.insert("region".into(), json!(inner.region));
        details.insert("namespace".into(), json!(inner.namespace));
        details.insert("connection".into(), json!(inner.state.load().as_str()));
        details.insert("queued_events".into(), json!(self.queued_events()));
        details.insert("in_flight_publishes".into(), json!(inner.in_flight_len()));
        details.insert(
            "batch_interval_ms".into(),
            json!(inner.batch_interval.as_millis() as u64),
        );
        details.insert(
            "running".into(),
            json!(inner.running.load(Ordering::Acquire)),
        );

        BroadcasterSnapshot {
            name: inner.name.clone(),
            provider: PROVIDER.to_string(),
            status: inner.tracker.status(),
            available: self.is_available(),
            message_count: inner.tracker.message_count(),
            error_count: inner.tracker.error_count(),
            details,
        }
    }

    /// Final flush, then close the socket and join both tasks.
    async fn shutdown(&self) {
        let inner = &self.inner;
        if !inner.running.swap(false, Ordering::AcqRel) {
            return;
        }

        info!("Shutting down streaming broadcaster {}", inner.name);
        inner.flush_stop.shutdown();

        let flush_task = match inner.flush_task.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = flush_task
            && let Err(e) = handle.await
        {
            error!("Flush task for {} ended abnormally: {}", inner.name, e);
        }

        let reader_task = {
            let mut slot = inner.connection.lock().await;
            slot.close().await;
            inner.state.store(ConnectionState::Disconnected);
            slot.reader_task.take()
        };

        inner.reader_stop.shutdown();
        if let Some(handle) = reader_task
            && let Err(e) = handle.await
            && !e.is_cancelled()
        {
            error!("Reader task for {} ended abnormally: {}", inner.name, e);
        }
        inner.abandon_in_flight("shutdown");

        info!(
            "Streaming broadcaster {} stopped ({} messages, {} errors)",
            inner.name,
            inner.tracker.message_count(),
            inner.tracker.error_count()
        );
    }
}

impl Drop for StreamingBroadcaster {
    fn drop(&mut self) {
        // Background tasks hold their own reference; make sure they wind down.
        self.inner.running.store(false, Ordering::Release);
        self.inner.flush_stop.shutdown();
        self.inner.reader_stop.shutdown();
    }
}
