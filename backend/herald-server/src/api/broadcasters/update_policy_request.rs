use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct UpdatePolicyRequest {
    pub broadcast_to_all: bool,
}
