//! Environment-driven settings. Command-line flags override these.

use std::env;
use std::time::Duration;

use animation::AnimationConfig;
use foundation::geo::LngLat;
use session::{DEFAULT_FRAME_MS, HttpChatHistoryConfig, chat_history::DEFAULT_BASE_URL};

pub const DEFAULT_USER_ID: &str = "planner-cli";

#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    pub chat_history_url: String,
    pub user_id: String,
    pub http_timeout_ms: u64,
    pub frame_ms: u64,
    pub animation: AnimationConfig,
}

impl PlannerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Missing or unparsable values
    /// fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = AnimationConfig::default();
        let u64_var = |key: &str, default: u64| -> u64 {
            lookup(key).and_then(|v| v.trim().parse().ok()).unwrap_or(default)
        };
        let f64_var = |key: &str, default: f64| -> f64 {
            lookup(key)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
                .unwrap_or(default)
        };

        Self {
            chat_history_url: lookup("CHAT_HISTORY_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            user_id: lookup("PLANNER_USER_ID").unwrap_or_else(|| DEFAULT_USER_ID.to_string()),
            http_timeout_ms: u64_var("PLANNER_HTTP_TIMEOUT_MS", 30_000),
            frame_ms: u64_var("PLANNER_FRAME_MS", DEFAULT_FRAME_MS).max(1),
            animation: AnimationConfig {
                zoom_out_ms: u64_var("PLANNER_ZOOM_OUT_MS", defaults.zoom_out_ms),
                return_ms: u64_var("PLANNER_RETURN_MS", defaults.return_ms),
                rotation_step_deg: f64_var(
                    "PLANNER_ROTATION_STEP_DEG",
                    defaults.rotation_step_deg,
                ),
                ..defaults
            },
        }
    }

    pub fn http(&self, url_override: Option<String>) -> HttpChatHistoryConfig {
        HttpChatHistoryConfig {
            base_url: url_override.unwrap_or_else(|| self.chat_history_url.clone()),
            timeout: Duration::from_millis(self.http_timeout_ms),
        }
    }
}

/// `--marker NAME:LON,LAT`
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerArg {
    pub name: String,
    pub position: LngLat,
}

pub fn parse_marker(raw: &str) -> Result<MarkerArg, String> {
    let (name, coords) = raw
        .rsplit_once(':')
        .ok_or_else(|| format!("expected NAME:LON,LAT, got {raw:?}"))?;
    let (lon, lat) = coords
        .split_once(',')
        .ok_or_else(|| format!("expected LON,LAT after the name, got {coords:?}"))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|e| format!("invalid longitude {lon:?}: {e}"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|e| format!("invalid latitude {lat:?}: {e}"))?;
    if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
        return Err(format!("coordinates out of range: {lon},{lat}"));
    }
    let name = name.trim();
    if name.is_empty() {
        return Err("marker name is empty".to_string());
    }
    Ok(MarkerArg {
        name: name.to_string(),
        position: LngLat::new(lon, lat),
    })
}
