mod request_signature;
mod trigger_broadcaster;
mod trigger_transport;

pub use request_signature::{AUTH_VERSION, RequestSignature};
pub use trigger_broadcaster::TriggerBroadcaster;
pub use trigger_transport::{HttpTriggerTransport, TriggerRequest, TriggerTransport};
