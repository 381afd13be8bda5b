use std::env;
use std::fs;
use std::path::Path;

use reorder_core::config::{AppConfig, LoadOptions};
use toml::Value;

struct Field {
    key_path: &'static str,
    env_keys: &'static [&'static str],
    value: String,
}

pub fn run() -> String {
    let options = LoadOptions::default();
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = AppConfig::resolved_path(&options);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields(&config) {
        let source = field_source(
            &field.key_path.replace("buffer.", "").replace("selection.", ""),
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key_path, &field.value, source));
    }

    lines.join("\n")
}

fn fields(config: &AppConfig) -> Vec<Field> {
    let buffer = &config.policy.buffer;
    let selection = &config.policy.selection;
    let field = |key_path: &'static str, env_keys: &'static [&'static str], value: String| Field {
        key_path,
        env_keys,
        value,
    };

    vec![
        field(
            "data.history_path",
            &["REORDER_DATA_HISTORY_PATH"],
            config.data.history_path.display().to_string(),
        ),
        field(
            "data.forecast_path",
            &["REORDER_DATA_FORECAST_PATH"],
            config.data.forecast_path.display().to_string(),
        ),
        field(
            "server.bind_address",
            &["REORDER_SERVER_BIND_ADDRESS"],
            config.server.bind_address.clone(),
        ),
        field("server.port", &["REORDER_SERVER_PORT"], config.server.port.to_string()),
        field(
            "server.graceful_shutdown_secs",
            &["REORDER_SERVER_GRACEFUL_SHUTDOWN_SECS"],
            config.server.graceful_shutdown_secs.to_string(),
        ),
        field("cache.enabled", &["REORDER_CACHE_ENABLED"], config.cache.enabled.to_string()),
        field(
            "policy.buffer.smooth_high_confidence",
            &[],
            buffer.smooth_high_confidence.to_string(),
        ),
        field(
            "policy.buffer.smooth_other_confidence",
            &[],
            buffer.smooth_other_confidence.to_string(),
        ),
        field("policy.buffer.intermittent", &[], buffer.intermittent.to_string()),
        field("policy.buffer.other_pattern", &[], buffer.other_pattern.to_string()),
        field("policy.buffer.low_confidence", &[], buffer.low_confidence.to_string()),
        field("policy.buffer.high_volatility", &[], buffer.high_volatility.to_string()),
        field("policy.buffer.volatility_threshold", &[], buffer.volatility_threshold.to_string()),
        field(
            "policy.buffer.max_buffer_pct",
            &["REORDER_POLICY_MAX_BUFFER_PCT"],
            buffer.max_buffer_pct.to_string(),
        ),
        field(
            "policy.selection.min_predicted_qty",
            &["REORDER_POLICY_MIN_PREDICTED_QTY"],
            selection.min_predicted_qty.to_string(),
        ),
        field(
            "policy.selection.core_item_min_buys",
            &["REORDER_POLICY_CORE_ITEM_MIN_BUYS"],
            selection.core_item_min_buys.to_string(),
        ),
        field(
            "logging.level",
            &["REORDER_LOGGING_LEVEL", "REORDER_LOG_LEVEL"],
            config.logging.level.clone(),
        ),
        field(
            "logging.format",
            &["REORDER_LOGGING_FORMAT", "REORDER_LOG_FORMAT"],
            format!("{:?}", config.logging.format),
        ),
    ]
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

/// `key_path` is the path inside the TOML file, which keeps policy keys flat.
fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
