pub mod channel;
pub mod event_kind;
pub mod log_record;
