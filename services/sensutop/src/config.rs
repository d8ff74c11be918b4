//! Configuration types and layered loading
//!
//! Configuration is assembled from a built-in default layer, a system-wide
//! file and a per-user file. Layers are merged by top-level key: a key present
//! in a later layer replaces the whole value from earlier layers.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default location of the system-wide configuration file
pub const SYSTEM_CONFIG_PATH: &str = "/etc/sensutop.json";

/// File name of the per-user configuration file, relative to `$HOME`
pub const USER_CONFIG_FILE: &str = ".sensutop.json";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api_endpoints: BTreeMap<String, EndpointConfig>,
    #[serde(default = "default_fetch_interval")]
    pub fetch_interval_seconds: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        let mut api_endpoints = BTreeMap::new();
        api_endpoints.insert("localhost".to_string(), EndpointConfig::default());
        Self {
            api_endpoints,
            fetch_interval_seconds: default_fetch_interval(),
            request_timeout_seconds: default_request_timeout(),
            refresh_interval_ms: default_refresh_interval(),
        }
    }
}

impl Config {
    pub fn fetch_interval(&self) -> Duration {
        Duration::from_secs(self.fetch_interval_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

/// Connection details for one monitoring API endpoint
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
    #[serde(default)]
    pub ssl: bool,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_api_port(),
            ssl: false,
            username: None,
            password: None,
        }
    }
}

impl fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("ssl", &self.ssl)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl EndpointConfig {
    /// URL of the events resource on this endpoint
    pub fn events_url(&self) -> String {
        let scheme = if self.ssl { "https" } else { "http" };
        format!("{}://{}:{}/events", scheme, self.host, self.port)
    }

    /// Basic auth credentials, present only when a username is configured
    pub fn credentials(&self) -> Option<crate::io::BasicAuth> {
        self.username.as_ref().map(|username| crate::io::BasicAuth {
            username: username.clone(),
            password: self.password.clone(),
        })
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_api_port() -> u16 {
    4567
}

fn default_fetch_interval() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    10
}

fn default_refresh_interval() -> u64 {
    1000
}

/// The built-in default layer: a single unauthenticated `localhost` endpoint
pub fn default_layer() -> Map<String, Value> {
    match serde_json::to_value(Config::default()) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// The default per-user config path, if `$HOME` is set
pub fn user_config_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(USER_CONFIG_FILE))
}

/// Read one configuration layer from disk.
///
/// Returns `None` when the file is missing, unreadable, not valid JSON, or not
/// a JSON object.
pub fn load_config_layer(path: &Path) -> Option<Map<String, Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!("Skipping config layer {:?}: {}", path, e);
            return None;
        }
    };

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(map)) => {
            tracing::debug!("Loaded config layer from {:?}", path);
            Some(map)
        }
        Ok(other) => {
            tracing::warn!(
                "Skipping config layer {:?}: expected a JSON object, got {}",
                path,
                json_kind(&other)
            );
            None
        }
        Err(e) => {
            tracing::warn!("Skipping config layer {:?}: {}", path, e);
            None
        }
    }
}

/// Merge layers in increasing priority and build the final configuration.
///
/// A layer whose keys would make the merged result fail to deserialize is
/// skipped as a whole, so a bad file never takes the dashboard down.
pub fn merge_layers<I>(base: Map<String, Value>, layers: I) -> crate::Result<Config>
where
    I: IntoIterator<Item = (String, Map<String, Value>)>,
{
    let mut merged = base;

    for (origin, layer) in layers {
        let mut candidate = merged.clone();
        candidate.extend(layer);
        match serde_json::from_value::<Config>(Value::Object(candidate.clone())) {
            Ok(_) => merged = candidate,
            Err(e) => {
                tracing::warn!("Skipping config layer {}: {}", origin, e);
            }
        }
    }

    let config: Config = serde_json::from_value(Value::Object(merged))?;
    Ok(config)
}

/// Load configuration: defaults, then each existing file in `paths` in order
pub fn load_config(paths: &[PathBuf]) -> crate::Result<Config> {
    let layers = paths.iter().filter_map(|path| {
        load_config_layer(path).map(|layer| (path.display().to_string(), layer))
    });
    let config = merge_layers(default_layer(), layers)?;
    tracing::debug!("Final configuration: {:?}", config);
    Ok(config)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
