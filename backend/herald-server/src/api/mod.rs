pub mod broadcasters;
pub mod error;
pub mod events;
