mod broadcast_config;
mod config;
mod error;
mod log_level;
mod logging_config;
mod provider_kind;
mod reconnect_config;
mod server_config;
mod streaming_config;
mod trigger_config;

#[cfg(test)]
mod tests;

pub use broadcast_config::BroadcastConfig;
pub use config::Config;
pub use error::{ConfigError, ConfigErrorResult};
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use provider_kind::ProviderKind;
pub use reconnect_config::ReconnectConfig;
pub use server_config::ServerConfig;
pub use streaming_config::StreamingConfig;
pub use trigger_config::TriggerConfig;

pub const CONFIG_DIR_ENV: &str = "HERALD_CONFIG_DIR";
pub const DEFAULT_CONFIG_DIR: &str = ".herald";
pub const CONFIG_FILE_NAME: &str = "config.toml";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8700;
const MIN_PORT: u16 = 1024;

const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_DIRECTORY: &str = "log";
