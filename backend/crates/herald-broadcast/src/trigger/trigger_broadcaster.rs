use crate::{
    Broadcaster, BroadcastError, BroadcasterSnapshot, BroadcasterStatus, ErrorClass, Metrics,
    StatusTracker, TRIGGER_RATE_LIMIT_KEYWORDS,
};

use std::sync::Arc;

use async_trait::async_trait;
use herald_config::{Config, TriggerConfig};
use herald_core::{Channel, EventKind, LogRecord};
use log::{debug, info, warn};
use serde_json::{Map, Value, json};

use super::{HttpTriggerTransport, TriggerRequest, TriggerTransport};

const PROVIDER: &str = "trigger";

/// Publishes each event with one blocking HTTP call on the blocking pool.
pub struct TriggerBroadcaster {
    name: String,
    namespace: String,
    app_id: Option<String>,
    cluster: Option<String>,
    endpoint: Option<String>,
    transport: Option<Arc<dyn TriggerTransport>>,
    tracker: StatusTracker,
    metrics: Metrics,
}

impl TriggerBroadcaster {
    /// Disabled unless the section is enabled and complete.
    pub fn new(name: impl Into<String>, namespace: &str, config: &TriggerConfig) -> Self {
        let name = name.into();

        let transport: Option<Arc<dyn TriggerTransport>> = if !config.enabled {
            info!("Trigger broadcaster {} disabled by configuration", name);
            None
        } else {
            match HttpTriggerTransport::from_config(config) {
                Some(transport) => {
                    info!(
                        "Trigger broadcaster {} targeting {}",
                        name,
                        transport.events_url()
                    );
                    Some(Arc::new(transport))
                }
                None => {
                    warn!(
                        "Trigger broadcaster {} disabled, missing: {}",
                        name,
                        config.missing_fields().join(", ")
                    );
                    None
                }
            }
        };

        Self::assemble(
            name,
            namespace,
            config.app_id.clone(),
            config.cluster.clone(),
            config.base_url(),
            transport,
        )
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(PROVIDER, &config.broadcast.namespace, &config.trigger)
    }

    /// Active broadcaster over a caller-supplied transport.
    pub fn with_transport(
        name: impl Into<String>,
        namespace: &str,
        transport: Arc<dyn TriggerTransport>,
    ) -> Self {
        Self::assemble(name.into(), namespace, None, None, None, Some(transport))
    }

    fn assemble(
        name: String,
        namespace: &str,
        app_id: Option<String>,
        cluster: Option<String>,
        endpoint: Option<String>,
        transport: Option<Arc<dyn TriggerTransport>>,
    ) -> Self {
        let initial = if transport.is_some() {
            BroadcasterStatus::Active
        } else {
            BroadcasterStatus::Disabled
        };

        Self {
            tracker: StatusTracker::new(name.clone(), initial),
            name,
            namespace: namespace.to_string(),
            app_id,
            cluster,
            endpoint,
            transport,
            metrics: Metrics::new(),
        }
    }

    async fn publish(&self, kind: EventKind, data: Value) -> bool {
        let Some(transport) = self.transport.as_ref().filter(|_| self.is_available()) else {
            self.metrics.event_rejected(&self.name);
            return false;
        };

        let request = TriggerRequest {
            channel: Channel::new(&self.namespace, kind).into(),
            event: kind.event_name().to_string(),
            data,
        };

        let transport = Arc::clone(transport);
        let channel = request.channel.clone();
        let outcome = tokio::task::spawn_blocking(move || transport.trigger(&request))
            .await
            .map_err(BroadcastError::from)
            .and_then(|result| result);

        match outcome {
            Ok(()) => {
                debug!("Trigger broadcaster {} published to {}", self.name, channel);
                self.tracker.record_messages(1);
                self.metrics.published(&self.name, 1);
                true
            }
            Err(e) => {
                let class = ErrorClass::of_error(&e, TRIGGER_RATE_LIMIT_KEYWORDS);
                warn!(
                    "Trigger broadcaster {} failed to publish to {} ({}): {}",
                    self.name,
                    channel,
                    class.as_str(),
                    e
                );
                self.metrics.publish_failed(&self.name);
                self.tracker.record_error(class);
                false
            }
        }
    }
}

#[async_trait]
impl Broadcaster for TriggerBroadcaster {
    fn name(&self) -> &str {
        &self.name
    }

    fn provider(&self) -> &'static str {
        PROVIDER
    }

    async fn broadcast_log(&self, record: &LogRecord) -> bool {
        self.publish(EventKind::Log, record.to_value()).await
    }

    async fn broadcast_admin_event(&self, payload: &Value) -> bool {
        let envelope = json!({
            "type": EventKind::Admin.event_name(),
            "data": payload,
        });
        self.publish(EventKind::Admin, envelope).await
    }

    fn is_available(&self) -> bool {
        self.tracker.is_active()
    }

    fn status(&self) -> BroadcasterSnapshot {
        let mut details = Map::new();
        details.insert("app_id".into(), json!(self.app_id));
        details.insert("cluster".into(), json!(self.cluster));
        details.insert("namespace".into(), json!(self.namespace));
        details.insert("endpoint".into(), json!(self.endpoint));

        BroadcasterSnapshot {
            name: self.name.clone(),
            provider: PROVIDER.to_string(),
            status: self.tracker.status(),
            available: self.is_available(),
            message_count: self.tracker.message_count(),
            error_count: self.tracker.error_count(),
            details,
        }
    }
}
