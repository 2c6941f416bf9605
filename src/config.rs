use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

pub const DEFAULT_SOE_PRIORITY: &str = "Home State";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    /// Largest room count one request may ask for.
    pub max_rooms: usize,
    pub soe_priority: String,
    pub seed: Option<u64>,
}

impl Config {
    pub fn load() -> Self {
        Self {
            host: try_load("ALLOTMENT_HOST", "0.0.0.0".to_string()),
            port: try_load("ALLOTMENT_PORT", 8080u16),
            max_upload_bytes: try_load("ALLOTMENT_MAX_UPLOAD_BYTES", 10 * 1024 * 1024usize),
            max_rooms: try_load("ALLOTMENT_MAX_ROOMS", 10_000usize),
            soe_priority: try_load("ALLOTMENT_SOE_PRIORITY", DEFAULT_SOE_PRIORITY.to_string()),
            seed: try_load_optional("ALLOTMENT_SEED"),
        }
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = var(key) else {
        info!("{key} not set, using default: {default}");
        return default;
    };

    raw.trim().parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
        default
    })
}

fn try_load_optional<T: FromStr>(key: &str) -> Option<T>
where
    T::Err: Display,
{
    let raw = var(key)?;
    raw.trim()
        .parse()
        .map_err(|e| warn!("Invalid {key} value {raw:?}: {e}, ignoring"))
        .ok()
}
