use std::collections::HashMap;

use herald_core::Channel;
use serde::Serialize;
use serde_json::Value;

/// Upper bound on events carried by one publish frame.
pub const MAX_EVENTS_PER_PUBLISH: usize = 5;

/// One queued event as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEntry {
    pub event: String,
    pub data: Value,
}

impl BatchEntry {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}

/// Pending entries keyed by channel, in enqueue order per channel.
#[derive(Debug, Default)]
pub struct BatchQueue {
    channels: HashMap<String, Vec<BatchEntry>>,
    len: usize,
}

impl BatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, channel: &Channel, entry: BatchEntry) {
        self.channels
            .entry(channel.as_str().to_string())
            .or_default()
            .push(entry);
        self.len += 1;
    }

    /// Total entries across all channels.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Empty the queue into per-channel chunks of at most
    /// [`MAX_EVENTS_PER_PUBLISH`] entries. Order within a channel is kept.
    pub fn drain_chunks(&mut self) -> Vec<(String, Vec<BatchEntry>)> {
        let mut chunks = Vec::new();

        for (channel, entries) in self.channels.drain() {
            let mut entries = entries.into_iter().peekable();
            while entries.peek().is_some() {
                let chunk: Vec<BatchEntry> =
                    entries.by_ref().take(MAX_EVENTS_PER_PUBLISH).collect();
                chunks.push((channel.clone(), chunk));
            }
        }

        self.len = 0;
        chunks
    }
}
