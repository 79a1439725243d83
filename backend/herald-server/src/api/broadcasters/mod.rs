#[allow(clippy::module_inception)]
pub mod broadcasters;
pub mod update_policy_request;
