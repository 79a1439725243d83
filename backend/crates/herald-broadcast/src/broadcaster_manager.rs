use crate::streaming::StreamingBroadcaster;
use crate::trigger::TriggerBroadcaster;
use crate::{Broadcaster, ManagerSnapshot, NullBroadcaster};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use futures::future::join_all;
use herald_config::{Config, ProviderKind};
use herald_core::{EventKind, LogRecord};
use log::{debug, error, info, warn};
use serde_json::Value;

/// Ordered set of broadcasters with a delivery policy.
///
/// Fallback (default): the primary first, then the rest in registration
/// order; the first success wins. Fan-out: every available broadcaster
/// concurrently; success if any succeeds.
pub struct BroadcasterManager {
    registry: RwLock<Registry>,
    broadcast_to_all: AtomicBool,
}

#[derive(Default)]
struct Registry {
    broadcasters: Vec<Arc<dyn Broadcaster>>,
    primary: Option<Arc<dyn Broadcaster>>,
}

#[derive(Clone)]
enum Submission {
    Log(LogRecord),
    Admin(Value),
}

impl Submission {
    fn kind(&self) -> EventKind {
        match self {
            Self::Log(_) => EventKind::Log,
            Self::Admin(_) => EventKind::Admin,
        }
    }

    async fn deliver(&self, broadcaster: &dyn Broadcaster) -> bool {
        match self {
            Self::Log(record) => broadcaster.broadcast_log(record).await,
            Self::Admin(payload) => broadcaster.broadcast_admin_event(payload).await,
        }
    }
}

fn same_broadcaster(a: &Arc<dyn Broadcaster>, b: &Arc<dyn Broadcaster>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

impl BroadcasterManager {
    pub fn new() -> Self {
        Self {
            registry: RwLock::new(Registry::default()),
            broadcast_to_all: AtomicBool::new(false),
        }
    }

    /// Assemble providers from configuration. The configured primary keeps
    /// its role only while active; with no active provider a
    /// [`NullBroadcaster`] becomes primary.
    pub fn from_config(config: &Config) -> Self {
        let manager = Self::new();
        manager.set_broadcast_to_all(config.broadcast.broadcast_to_all);

        let streaming: Arc<dyn Broadcaster> = Arc::new(StreamingBroadcaster::from_config(config));
        let trigger: Arc<dyn Broadcaster> = Arc::new(TriggerBroadcaster::from_config(config));

        let (preferred, other) = match config.broadcast.primary {
            ProviderKind::Streaming => (streaming, trigger),
            ProviderKind::Trigger => (trigger, streaming),
        };

        let preferred_active = preferred.is_available();
        let other_active = other.is_available();

        manager.add_broadcaster(preferred, preferred_active);
        manager.add_broadcaster(other, !preferred_active && other_active);

        if !preferred_active && !other_active {
            warn!("No broadcaster is active; events will be dropped");
            manager.add_broadcaster(Arc::new(NullBroadcaster::new()), true);
        }

        manager
    }

    /// Register `broadcaster` unless already present; `primary` designates it
    /// either way.
    pub fn add_broadcaster(&self, broadcaster: Arc<dyn Broadcaster>, primary: bool) {
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);

        let existing = registry
            .broadcasters
            .iter()
            .find(|b| same_broadcaster(b, &broadcaster))
            .cloned();

        let entry = match existing {
            Some(entry) => {
                debug!("Broadcaster {} already registered", entry.name());
                entry
            }
            None => {
                info!(
                    "Registered {} broadcaster {}{}",
                    broadcaster.provider(),
                    broadcaster.name(),
                    if primary { " (primary)" } else { "" }
                );
                registry.broadcasters.push(Arc::clone(&broadcaster));
                broadcaster
            }
        };

        if primary {
            registry.primary = Some(entry);
        }
    }

    pub fn set_broadcast_to_all(&self, enabled: bool) {
        let previous = self.broadcast_to_all.swap(enabled, Ordering::AcqRel);
        if previous != enabled {
            info!(
                "Broadcast policy set to {}",
                if enabled { "fan-out" } else { "fallback" }
            );
        }
    }

    pub fn broadcast_to_all(&self) -> bool {
        self.broadcast_to_all.load(Ordering::Acquire)
    }

    pub async fn broadcast_log(&self, record: &LogRecord) -> bool {
        self.dispatch(Submission::Log(record.clone())).await
    }

    pub async fn broadcast_admin_event(&self, payload: &Value) -> bool {
        self.dispatch(Submission::Admin(payload.clone())).await
    }

    /// Dispatch by kind name (`log`, `logs`, `admin`). Unknown kinds and log
    /// payloads that are not log records are reported and refused.
    pub async fn broadcast(&self, kind: &str, payload: Value) -> bool {
        let kind = match kind.parse::<EventKind>() {
            Ok(kind) => kind,
            Err(e) => {
                error!("Refusing broadcast: {}", e);
                return false;
            }
        };

        match kind {
            EventKind::Log => match serde_json::from_value::<LogRecord>(payload) {
                Ok(record) => self.dispatch(Submission::Log(record)).await,
                Err(e) => {
                    error!("Refusing log broadcast, payload is not a log record: {}", e);
                    false
                }
            },
            EventKind::Admin => self.dispatch(Submission::Admin(payload)).await,
        }
    }

    pub fn status(&self) -> ManagerSnapshot {
        let (broadcasters, primary) = self.registry_snapshot();
        let snapshots: Vec<_> = broadcasters.iter().map(|b| b.status()).collect();

        ManagerSnapshot {
            primary: primary.as_ref().map(|p| p.name().to_string()),
            primary_available: primary.as_ref().is_some_and(|p| p.is_available()),
            total_broadcasters: snapshots.len(),
            available_broadcasters: snapshots.iter().filter(|s| s.available).count(),
            broadcast_to_all: self.broadcast_to_all(),
            broadcasters: snapshots,
        }
    }

    pub fn is_any_available(&self) -> bool {
        self.registry_snapshot().0.iter().any(|b| b.is_available())
    }

    /// Shut every broadcaster down concurrently.
    pub async fn shutdown(&self) {
        let (broadcasters, _) = self.registry_snapshot();
        info!("Shutting down {} broadcasters", broadcasters.len());
        join_all(broadcasters.iter().map(|b| b.shutdown())).await;
    }

    fn registry_snapshot(&self) -> (Vec<Arc<dyn Broadcaster>>, Option<Arc<dyn Broadcaster>>) {
        let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        (registry.broadcasters.clone(), registry.primary.clone())
    }

    async fn dispatch(&self, submission: Submission) -> bool {
        let (broadcasters, primary) = self.registry_snapshot();

        if self.broadcast_to_all() {
            Self::fan_out(broadcasters, submission).await
        } else {
            Self::fallback(broadcasters, primary, &submission).await
        }
    }

    async fn fallback(
        broadcasters: Vec<Arc<dyn Broadcaster>>,
        primary: Option<Arc<dyn Broadcaster>>,
        submission: &Submission,
    ) -> bool {
        if let Some(primary) = &primary
            && primary.is_available()
        {
            if submission.deliver(primary.as_ref()).await {
                return true;
            }
            warn!(
                "Primary broadcaster {} failed {} event, trying fallbacks",
                primary.name(),
                submission.kind()
            );
        }

        for broadcaster in &broadcasters {
            if primary.as_ref().is_some_and(|p| same_broadcaster(p, broadcaster)) {
                continue;
            }
            if !broadcaster.is_available() {
                continue;
            }
            if submission.deliver(broadcaster.as_ref()).await {
                debug!(
                    "Fallback broadcaster {} delivered {} event",
                    broadcaster.name(),
                    submission.kind()
                );
                return true;
            }
        }

        warn!("No broadcaster delivered {} event", submission.kind());
        false
    }

    async fn fan_out(broadcasters: Vec<Arc<dyn Broadcaster>>, submission: Submission) -> bool {
        let handles: Vec<_> = broadcasters
            .into_iter()
            .filter(|b| b.is_available())
            .map(|broadcaster| {
                let submission = submission.clone();
                tokio::spawn(async move { submission.deliver(broadcaster.as_ref()).await })
            })
            .collect();

        if handles.is_empty() {
            warn!("No broadcaster available for {} event", submission.kind());
            return false;
        }

        let mut delivered = false;
        for result in join_all(handles).await {
            match result {
                Ok(ok) => delivered |= ok,
                Err(e) => error!("Broadcast task failed: {}", e),
            }
        }

        if !delivered {
            warn!("Fan-out delivered {} event nowhere", submission.kind());
        }
        delivered
    }
}

impl Default for BroadcasterManager {
    fn default() -> Self {
        Self::new()
    }
}
