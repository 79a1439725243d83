use crate::{
    BroadcastConfig, CONFIG_DIR_ENV, CONFIG_FILE_NAME, ConfigError, ConfigErrorResult,
    DEFAULT_CONFIG_DIR, LoggingConfig, ReconnectConfig, ServerConfig, StreamingConfig,
    TriggerConfig,
};

use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub broadcast: BroadcastConfig,
    pub streaming: StreamingConfig,
    pub trigger: TriggerConfig,
    pub retry: ReconnectConfig,
}

impl Config {
    /// Load configuration.
    ///
    /// 1. `HERALD_CONFIG_DIR`, else `./.herald/` (created if missing)
    /// 2. `config.toml` from that directory when present, else defaults
    /// 3. `HERALD_*` environment overrides
    ///
    /// Does not validate; call `validate()` afterwards.
    pub fn load() -> ConfigErrorResult<Self> {
        let config_dir = Self::config_dir()?;

        if !config_dir.exists() {
            std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::Io {
                path: config_dir.clone(),
                source: e,
            })?;
        }

        let config_path = config_dir.join(CONFIG_FILE_NAME);

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Parse configuration from TOML text without touching the environment.
    pub fn from_toml_str(contents: &str) -> ConfigErrorResult<Self> {
        toml::from_str(contents).map_err(|e| ConfigError::Toml {
            path: PathBuf::from("<inline>"),
            source: e,
        })
    }

    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// `HERALD_CONFIG_DIR` if set, otherwise `.herald` under the working directory.
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let cwd = std::env::current_dir()
            .map_err(|_| ConfigError::config("Cannot determine current working directory"))?;
        Ok(cwd.join(DEFAULT_CONFIG_DIR))
    }

    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.server.validate()?;
        self.broadcast.validate()?;
        self.streaming.validate()?;
        self.trigger.validate()?;
        self.retry.validate()?;

        if let Some(file) = self.logging.file.as_deref()
            && (Path::new(file).is_absolute() || file.contains(".."))
        {
            return Err(ConfigError::config(
                "logging.file must be relative and cannot contain '..'",
            ));
        }

        Ok(())
    }

    /// Log configuration summary. Credentials are reported as present/missing only.
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!("  server: {}", self.server.bind_addr());
        info!(
            "  logging: {} (colored: {}, file: {})",
            *self.logging.level,
            self.logging.colored,
            self.logging.file.as_deref().unwrap_or("stdout")
        );
        info!(
            "  broadcast: namespace={}, primary={}, broadcast_to_all={}",
            self.broadcast.namespace, self.broadcast.primary, self.broadcast.broadcast_to_all
        );
        info!(
            "  streaming: {} endpoint={}, api_key={}, region={}, batch={}ms",
            enabled_label(self.streaming.enabled),
            self.streaming.endpoint.as_deref().unwrap_or("<unset>"),
            presence(&self.streaming.api_key),
            self.streaming.region.as_deref().unwrap_or("<unset>"),
            self.streaming.batch_interval_ms
        );
        info!(
            "  trigger: {} app_id={}, key={}, secret={}, cluster={}",
            enabled_label(self.trigger.enabled),
            self.trigger.app_id.as_deref().unwrap_or("<unset>"),
            presence(&self.trigger.key),
            presence(&self.trigger.secret),
            self.trigger.cluster.as_deref().unwrap_or("<unset>")
        );
        info!(
            "  retry: attempts={}, initial={}ms, max={}s, backoff={}x",
            self.retry.max_attempts,
            self.retry.initial_delay_ms,
            self.retry.max_delay_secs,
            self.retry.backoff_multiplier
        );
    }

    fn apply_env_overrides(&mut self) {
        // Server
        Self::apply_env_string("HERALD_SERVER_HOST", &mut self.server.host);
        Self::apply_env_parse("HERALD_SERVER_PORT", &mut self.server.port);

        // Logging
        Self::apply_env_parse("HERALD_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_bool("HERALD_LOG_COLORED", &mut self.logging.colored);
        Self::apply_env_option_string("HERALD_LOG_FILE", &mut self.logging.file);

        // Broadcast
        Self::apply_env_string("HERALD_NAMESPACE", &mut self.broadcast.namespace);
        Self::apply_env_bool(
            "HERALD_BROADCAST_TO_ALL",
            &mut self.broadcast.broadcast_to_all,
        );
        Self::apply_env_parse("HERALD_PRIMARY", &mut self.broadcast.primary);

        // Streaming
        Self::apply_env_bool("HERALD_STREAMING_ENABLED", &mut self.streaming.enabled);
        Self::apply_env_option_string("HERALD_STREAMING_ENDPOINT", &mut self.streaming.endpoint);
        Self::apply_env_option_string("HERALD_STREAMING_API_KEY", &mut self.streaming.api_key);
        Self::apply_env_option_string("HERALD_STREAMING_REGION", &mut self.streaming.region);
        Self::apply_env_parse(
            "HERALD_STREAMING_BATCH_INTERVAL_MS",
            &mut self.streaming.batch_interval_ms,
        );
        Self::apply_env_parse(
            "HERALD_STREAMING_CONNECT_TIMEOUT_SECS",
            &mut self.streaming.connect_timeout_secs,
        );

        // Trigger
        Self::apply_env_bool("HERALD_TRIGGER_ENABLED", &mut self.trigger.enabled);
        Self::apply_env_option_string("HERALD_TRIGGER_APP_ID", &mut self.trigger.app_id);
        Self::apply_env_option_string("HERALD_TRIGGER_KEY", &mut self.trigger.key);
        Self::apply_env_option_string("HERALD_TRIGGER_SECRET", &mut self.trigger.secret);
        Self::apply_env_option_string("HERALD_TRIGGER_CLUSTER", &mut self.trigger.cluster);
        Self::apply_env_option_string("HERALD_TRIGGER_ENDPOINT", &mut self.trigger.endpoint);
        Self::apply_env_parse("HERALD_TRIGGER_TIMEOUT_SECS", &mut self.trigger.timeout_secs);

        // Retry
        Self::apply_env_parse("HERALD_RETRY_MAX_ATTEMPTS", &mut self.retry.max_attempts);
        Self::apply_env_parse(
            "HERALD_RETRY_INITIAL_DELAY_MS",
            &mut self.retry.initial_delay_ms,
        );
        Self::apply_env_parse("HERALD_RETRY_MAX_DELAY_SECS", &mut self.retry.max_delay_secs);
        Self::apply_env_parse(
            "HERALD_RETRY_BACKOFF_MULTIPLIER",
            &mut self.retry.backoff_multiplier,
        );
        Self::apply_env_bool("HERALD_RETRY_JITTER", &mut self.retry.jitter);
    }

    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Accepts "true" / "1"; anything else is false.
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }

    fn apply_env_option_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = Some(val);
        }
    }
}

fn enabled_label(enabled: bool) -> &'static str {
    if enabled { "enabled" } else { "disabled" }
}

fn presence(value: &Option<String>) -> &'static str {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => "<set>",
        _ => "<missing>",
    }
}
