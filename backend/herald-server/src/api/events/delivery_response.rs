use serde::{Deserialize, Serialize};

/// Outcome of a producer request. `false` means no broadcaster accepted it.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeliveryResponse {
    pub delivered: bool,
}
