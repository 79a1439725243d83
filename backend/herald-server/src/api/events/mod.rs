pub mod delivery_response;
#[allow(clippy::module_inception)]
pub mod events;
