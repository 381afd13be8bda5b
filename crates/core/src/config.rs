use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::recommend::{BufferPolicy, RecommendationPolicy, SelectionPolicy};

pub const DEFAULT_CONFIG_FILE: &str = "reorder.toml";

#[derive(Clone, Debug, Serialize)]
pub struct AppConfig {
    pub data: DataConfig,
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub policy: RecommendationPolicy,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, Serialize)]
pub struct DataConfig {
    pub history_path: PathBuf,
    pub forecast_path: PathBuf,
}

#[derive(Clone, Debug, Serialize)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct CacheConfig {
    pub enabled: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub history_path: Option<PathBuf>,
    pub forecast_path: Option<PathBuf>,
    pub port: Option<u16>,
    pub cache_enabled: Option<bool>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig {
                history_path: PathBuf::from("data/training_data_weekly.csv"),
                forecast_path: PathBuf::from("data/merged_predictions.csv"),
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
            },
            cache: CacheConfig { enabled: true },
            policy: RecommendationPolicy::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// The file `load` would read for these options, if any.
    pub fn resolved_path(options: &LoadOptions) -> Option<PathBuf> {
        resolve_config_path(options.config_path.as_deref())
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(data) = patch.data {
            if let Some(history_path) = data.history_path {
                self.data.history_path = history_path;
            }
            if let Some(forecast_path) = data.forecast_path {
                self.data.forecast_path = forecast_path;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(enabled) = patch.cache.and_then(|cache| cache.enabled) {
            self.cache.enabled = enabled;
        }

        if let Some(policy) = patch.policy {
            policy.apply(&mut self.policy);
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("REORDER_DATA_HISTORY_PATH") {
            self.data.history_path = PathBuf::from(value);
        }
        if let Some(value) = read_env("REORDER_DATA_FORECAST_PATH") {
            self.data.forecast_path = PathBuf::from(value);
        }

        if let Some(value) = read_env("REORDER_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("REORDER_SERVER_PORT") {
            self.server.port = parse_u16("REORDER_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("REORDER_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("REORDER_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        if let Some(value) = read_env("REORDER_CACHE_ENABLED") {
            self.cache.enabled = parse_bool("REORDER_CACHE_ENABLED", &value)?;
        }

        if let Some(value) = read_env("REORDER_POLICY_MAX_BUFFER_PCT") {
            self.policy.buffer.max_buffer_pct = parse_f64("REORDER_POLICY_MAX_BUFFER_PCT", &value)?;
        }
        if let Some(value) = read_env("REORDER_POLICY_CORE_ITEM_MIN_BUYS") {
            self.policy.selection.core_item_min_buys =
                parse_u32("REORDER_POLICY_CORE_ITEM_MIN_BUYS", &value)?;
        }
        if let Some(value) = read_env("REORDER_POLICY_MIN_PREDICTED_QTY") {
            self.policy.selection.min_predicted_qty =
                parse_f64("REORDER_POLICY_MIN_PREDICTED_QTY", &value)?;
        }

        let log_level =
            read_env("REORDER_LOGGING_LEVEL").or_else(|| read_env("REORDER_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("REORDER_LOGGING_FORMAT").or_else(|| read_env("REORDER_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(history_path) = overrides.history_path {
            self.data.history_path = history_path;
        }
        if let Some(forecast_path) = overrides.forecast_path {
            self.data.forecast_path = forecast_path;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(enabled) = overrides.cache_enabled {
            self.cache.enabled = enabled;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_data(&self.data)?;
        validate_server(&self.server)?;
        validate_policy(&self.policy)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from("config").join(DEFAULT_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_data(data: &DataConfig) -> Result<(), ConfigError> {
    if data.history_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation("data.history_path must not be empty".to_string()));
    }
    if data.forecast_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation("data.forecast_path must not be empty".to_string()));
    }
    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }
    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

fn validate_policy(policy: &RecommendationPolicy) -> Result<(), ConfigError> {
    let buffer = &policy.buffer;
    let fractions = [
        ("policy.smooth_high_confidence", buffer.smooth_high_confidence),
        ("policy.smooth_other_confidence", buffer.smooth_other_confidence),
        ("policy.intermittent", buffer.intermittent),
        ("policy.other_pattern", buffer.other_pattern),
        ("policy.low_confidence", buffer.low_confidence),
        ("policy.high_volatility", buffer.high_volatility),
        ("policy.max_buffer_pct", buffer.max_buffer_pct),
    ];
    for (name, value) in fractions {
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::Validation(format!("{name} must be in range 0..=1")));
        }
    }

    if !buffer.volatility_threshold.is_finite() || buffer.volatility_threshold < 0.0 {
        return Err(ConfigError::Validation(
            "policy.volatility_threshold must be a non-negative number".to_string(),
        ));
    }
    let min_predicted = policy.selection.min_predicted_qty;
    if !min_predicted.is_finite() || min_predicted < 0.0 {
        return Err(ConfigError::Validation(
            "policy.min_predicted_qty must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn invalid_override(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() }
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.trim().parse::<u16>().map_err(|_| invalid_override(key, value))
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse::<u32>().map_err(|_| invalid_override(key, value))
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|_| invalid_override(key, value))
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
        .ok_or_else(|| invalid_override(key, value))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.trim().parse::<bool>().map_err(|_| invalid_override(key, value))
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    data: Option<DataPatch>,
    server: Option<ServerPatch>,
    cache: Option<CachePatch>,
    policy: Option<PolicyPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DataPatch {
    history_path: Option<PathBuf>,
    forecast_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct CachePatch {
    enabled: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct PolicyPatch {
    smooth_high_confidence: Option<f64>,
    smooth_other_confidence: Option<f64>,
    intermittent: Option<f64>,
    other_pattern: Option<f64>,
    low_confidence: Option<f64>,
    high_volatility: Option<f64>,
    volatility_threshold: Option<f64>,
    max_buffer_pct: Option<f64>,
    min_predicted_qty: Option<f64>,
    core_item_min_buys: Option<u32>,
}

impl PolicyPatch {
    fn apply(self, policy: &mut RecommendationPolicy) {
        let BufferPolicy {
            smooth_high_confidence,
            smooth_other_confidence,
            intermittent,
            other_pattern,
            low_confidence,
            high_volatility,
            volatility_threshold,
            max_buffer_pct,
        } = &mut policy.buffer;
        let pairs = [
            (self.smooth_high_confidence, smooth_high_confidence),
            (self.smooth_other_confidence, smooth_other_confidence),
            (self.intermittent, intermittent),
            (self.other_pattern, other_pattern),
            (self.low_confidence, low_confidence),
            (self.high_volatility, high_volatility),
            (self.volatility_threshold, volatility_threshold),
            (self.max_buffer_pct, max_buffer_pct),
        ];
        for (patch, target) in pairs {
            if let Some(value) = patch {
                *target = value;
            }
        }

        let SelectionPolicy { min_predicted_qty, core_item_min_buys } = &mut policy.selection;
        if let Some(value) = self.min_predicted_qty {
            *min_predicted_qty = value;
        }
        if let Some(value) = self.core_item_min_buys {
            *core_item_min_buys = value;
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    const REORDER_VARS: [&str; 6] = [
        "REORDER_DATA_HISTORY_PATH",
        "REORDER_POLICY_MAX_BUFFER_PCT",
        "REORDER_POLICY_CORE_ITEM_MIN_BUYS",
        "REORDER_SERVER_PORT",
        "REORDER_LOG_LEVEL",
        "REORDER_LOG_FORMAT",
    ];

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    fn load_from(dir: &TempDir, contents: &str) -> Result<AppConfig, String> {
        let path = dir.path().join("reorder.toml");
        fs::write(&path, contents).map_err(|err| err.to_string())?;
        AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
            .map_err(|err| format!("config load failed: {err}"))
    }

    #[test]
    fn defaults_match_documented_policy() -> Result<(), String> {
        let config = AppConfig::default();

        ensure(config.validate().is_ok(), "default configuration should validate")?;
        ensure(config.cache.enabled, "cache should be enabled by default")?;
        ensure(config.server.port == 8080, "default port should be 8080")?;
        ensure(
            (config.policy.buffer.max_buffer_pct - 0.30).abs() < f64::EPSILON,
            "default buffer cap should be 0.30",
        )?;
        ensure(
            config.policy.selection.core_item_min_buys == 10,
            "default core item threshold should be 10",
        )?;
        ensure(
            matches!(config.logging.format, LogFormat::Compact),
            "default logging format should be compact",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        env::set_var("TEST_REORDER_DATA_DIR", "/srv/reorder");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let config = load_from(
                &dir,
                r#"
[data]
history_path = "${TEST_REORDER_DATA_DIR}/history.csv"
forecast_path = "${TEST_REORDER_DATA_DIR}/forecast.csv"
"#,
            )?;

            ensure(
                config.data.history_path == PathBuf::from("/srv/reorder/history.csv"),
                "history path should interpolate the environment",
            )?;
            ensure(
                config.data.forecast_path == PathBuf::from("/srv/reorder/forecast.csv"),
                "forecast path should interpolate the environment",
            )
        })();

        clear_vars(&["TEST_REORDER_DATA_DIR"]);
        result
    }

    #[test]
    fn policy_section_overrides_only_named_values() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&REORDER_VARS);

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let config = load_from(
            &dir,
            r#"
[policy]
intermittent = 0.25
core_item_min_buys = 6

[cache]
enabled = false
"#,
        )?;

        ensure(
            (config.policy.buffer.intermittent - 0.25).abs() < f64::EPSILON,
            "intermittent buffer should come from file",
        )?;
        ensure(
            (config.policy.buffer.smooth_high_confidence - 0.05).abs() < f64::EPSILON,
            "unnamed buffer values should keep defaults",
        )?;
        ensure(config.policy.selection.core_item_min_buys == 6, "core threshold from file")?;
        ensure(!config.cache.enabled, "cache flag should come from file")
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&REORDER_VARS);
        env::set_var("REORDER_LOG_LEVEL", "warn");
        env::set_var("REORDER_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )
        })();

        clear_vars(&REORDER_VARS);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&REORDER_VARS);
        env::set_var("REORDER_DATA_HISTORY_PATH", "from-env.csv");
        env::set_var("REORDER_POLICY_MAX_BUFFER_PCT", "0.4");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("reorder.toml");
            fs::write(
                &path,
                r#"
[data]
history_path = "from-file.csv"
forecast_path = "forecast-from-file.csv"

[policy]
max_buffer_pct = 0.2

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    history_path: Some(PathBuf::from("from-override.csv")),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.data.history_path == PathBuf::from("from-override.csv"),
                "override history path should win",
            )?;
            ensure(
                config.data.forecast_path == PathBuf::from("forecast-from-file.csv"),
                "file forecast path should win over defaults",
            )?;
            ensure(
                (config.policy.buffer.max_buffer_pct - 0.4).abs() < f64::EPSILON,
                "env buffer cap should win over file",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")
        })();

        clear_vars(&REORDER_VARS);
        result
    }

    #[test]
    fn invalid_env_override_names_the_variable() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&REORDER_VARS);
        env::set_var("REORDER_POLICY_CORE_ITEM_MIN_BUYS", "ten");

        let result = match AppConfig::load(LoadOptions::default()) {
            Ok(_) => Err("expected invalid override but config load succeeded".to_string()),
            Err(error) => ensure(
                matches!(
                    error,
                    ConfigError::InvalidEnvOverride { ref key, .. }
                        if key == "REORDER_POLICY_CORE_ITEM_MIN_BUYS"
                ),
                "error should name REORDER_POLICY_CORE_ITEM_MIN_BUYS",
            ),
        };

        clear_vars(&REORDER_VARS);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&REORDER_VARS);

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("reorder.toml");
        fs::write(&path, "[policy]\nmax_buffer_pct = 1.5\n").map_err(|err| err.to_string())?;

        let error = match AppConfig::load(LoadOptions {
            config_path: Some(path),
            ..LoadOptions::default()
        }) {
            Ok(_) => {
                return Err("expected validation failure but config load succeeded".to_string())
            }
            Err(error) => error,
        };

        let has_message = matches!(
            error,
            ConfigError::Validation(ref message) if message.contains("policy.max_buffer_pct")
        );
        ensure(has_message, "validation failure should mention policy.max_buffer_pct")
    }

    #[test]
    fn required_file_must_exist() -> Result<(), String> {
        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let missing = dir.path().join("absent.toml");

        let error = AppConfig::load(LoadOptions {
            config_path: Some(missing.clone()),
            require_file: true,
            ..LoadOptions::default()
        });

        ensure(
            matches!(error, Err(ConfigError::MissingConfigFile(ref path)) if *path == missing),
            "missing required file should be reported with its path",
        )
    }

    #[test]
    fn unterminated_interpolation_is_rejected() -> Result<(), String> {
        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("reorder.toml");
        fs::write(&path, "[data]\nhistory_path = \"${UNTERMINATED\n").map_err(|e| e.to_string())?;

        let error =
            AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() });

        ensure(
            matches!(error, Err(ConfigError::UnterminatedInterpolation)),
            "unterminated interpolation should fail",
        )
    }
}
