pub mod api;
pub mod app_state;
pub mod error;
pub mod health;
pub mod logger;
pub mod routes;
pub mod signals;

#[cfg(test)]
mod tests;

pub use api::{
    broadcasters::{
        broadcasters::{get_broadcasters, update_policy},
        update_policy_request::UpdatePolicyRequest,
    },
    error::ApiError,
    error::Result as ApiResult,
    events::{
        delivery_response::DeliveryResponse,
        events::{publish_admin_event, publish_event, publish_log},
    },
};
pub use app_state::AppState;

pub use crate::routes::build_router;
