mod batch_queue;
mod connection;
mod endpoint;
mod inbound_frame;
mod publish_frame;
mod streaming_broadcaster;

pub use batch_queue::{BatchEntry, BatchQueue, MAX_EVENTS_PER_PUBLISH};
pub use connection::ConnectionState;
pub use endpoint::{REALTIME_PATH, RealtimeEndpoint, SUBPROTOCOL};
pub use inbound_frame::{FrameError, InboundFrame};
pub use publish_frame::{Authorization, PublishFrame};
pub use streaming_broadcaster::StreamingBroadcaster;
