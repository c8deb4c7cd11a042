//! Application configuration management.
//!
//! Configuration is stored at `~/.config/pitchside/config.json`. Missing
//! files and missing fields fall back to defaults; `PITCHSIDE_API_BASE` and
//! `PITCHSIDE_UPSTREAM` override the file.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::activity::{ActivityRule, WindowBoundary, DEFAULT_WINDOW_MINUTES, MAX_WINDOW_MINUTES};
use crate::api::{Upstream, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::feed::Feed;
use crate::models::MatchStatus;
use crate::scheduler::{ScheduleConfig, DEFAULT_REFRESH_PERIOD, MAX_REFRESH_PERIOD};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "pitchside";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const API_BASE_ENV_VAR: &str = "PITCHSIDE_API_BASE";
pub const UPSTREAM_ENV_VAR: &str = "PITCHSIDE_UPSTREAM";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UpstreamMode {
    #[default]
    Proxy,
    Direct,
}

impl std::str::FromStr for UpstreamMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "proxy" => Ok(UpstreamMode::Proxy),
            "direct" => Ok(UpstreamMode::Direct),
            other => anyhow::bail!("Unknown upstream mode '{}' (expected proxy or direct)", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base: String,
    pub upstream: UpstreamMode,
    pub competition: String,
    pub refresh_period_secs: u64,
    pub activity_window_minutes: i64,
    pub inclusive_window: bool,
    pub request_timeout_secs: u64,
    pub upcoming_limit: u32,
    pub finished_limit: u32,
    pub live_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:4000".to_string(),
            upstream: UpstreamMode::Proxy,
            competition: "PL".to_string(),
            refresh_period_secs: DEFAULT_REFRESH_PERIOD.as_secs(),
            activity_window_minutes: DEFAULT_WINDOW_MINUTES,
            inclusive_window: true,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            upcoming_limit: 20,
            finished_limit: 20,
            live_limit: 10,
        }
    }
}

impl Config {
    /// Load the config file, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            Self::default()
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(base) = lookup(API_BASE_ENV_VAR).filter(|b| !b.trim().is_empty()) {
            self.api_base = base.trim().to_string();
        }
        if let Some(mode) = lookup(UPSTREAM_ENV_VAR) {
            match mode.parse() {
                Ok(mode) => self.upstream = mode,
                Err(e) => warn!(error = %e, "Ignoring {}", UPSTREAM_ENV_VAR),
            }
        }
    }

    /// Upstream for the feed client. `token` is only used in direct mode.
    pub fn upstream(&self, token: Option<String>) -> Upstream {
        match self.upstream {
            UpstreamMode::Proxy => Upstream::Proxy {
                base_url: self.api_base.clone(),
            },
            UpstreamMode::Direct => Upstream::Direct {
                base_url: self.api_base.clone(),
                competition: self.competition.clone(),
                token,
            },
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn activity_rule(&self) -> ActivityRule {
        let boundary = if self.inclusive_window {
            WindowBoundary::Inclusive
        } else {
            WindowBoundary::Exclusive
        };
        let minutes = self.activity_window_minutes.clamp(0, MAX_WINDOW_MINUTES);
        if minutes != self.activity_window_minutes {
            warn!(
                configured = self.activity_window_minutes,
                used = minutes,
                "activity_window_minutes out of range, clamping"
            );
        }
        ActivityRule::new(chrono::Duration::minutes(minutes), boundary)
    }

    pub fn schedule_config(&self) -> ScheduleConfig {
        let secs = self.refresh_period_secs.clamp(1, MAX_REFRESH_PERIOD.as_secs());
        if secs != self.refresh_period_secs {
            warn!(
                configured = self.refresh_period_secs,
                used = secs,
                "refresh_period_secs out of range, clamping"
            );
        }
        ScheduleConfig {
            period: Duration::from_secs(secs),
            rule: self.activity_rule(),
        }
    }

    /// Feeds of the dashboard screen.
    pub fn dashboard_feeds(&self) -> Vec<Feed> {
        vec![Feed::Standings, Feed::Teams]
    }

    /// Feeds of the matches screen, in tab order: upcoming, live, finished.
    pub fn match_feeds(&self) -> Vec<Feed> {
        vec![
            Feed::matches(MatchStatus::Scheduled, self.upcoming_limit),
            Feed::matches(MatchStatus::InPlay, self.live_limit),
            Feed::matches(MatchStatus::Finished, self.finished_limit),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: Config = serde_json::from_str(r#"{"competition": "PD"}"#).unwrap();
        assert_eq!(config.competition, "PD");
        assert_eq!(config.api_base, "http://localhost:4000");
        assert_eq!(config.upstream, UpstreamMode::Proxy);
        assert_eq!(config.refresh_period_secs, 3600);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(env(&[
            (API_BASE_ENV_VAR, "https://api.football-data.org/v4"),
            (UPSTREAM_ENV_VAR, "Direct"),
        ]));
        assert_eq!(config.api_base, "https://api.football-data.org/v4");
        assert_eq!(config.upstream, UpstreamMode::Direct);

        config.apply_overrides(env(&[(UPSTREAM_ENV_VAR, "carrier-pigeon")]));
        assert_eq!(config.upstream, UpstreamMode::Direct);
    }

    #[test]
    fn test_upstream_by_mode() {
        let mut config = Config::default();
        assert_eq!(
            config.upstream(Some("secret".into())),
            Upstream::Proxy {
                base_url: "http://localhost:4000".into()
            }
        );

        config.upstream = UpstreamMode::Direct;
        assert_eq!(
            config.upstream(None),
            Upstream::Direct {
                base_url: "http://localhost:4000".into(),
                competition: "PL".into(),
                token: None,
            }
        );
    }

    #[test]
    fn test_schedule_config() {
        let config = Config {
            refresh_period_secs: 600,
            activity_window_minutes: 90,
            inclusive_window: false,
            ..Config::default()
        };
        let schedule = config.schedule_config();
        assert_eq!(schedule.period, Duration::from_secs(600));
        assert_eq!(schedule.rule.window, chrono::Duration::minutes(90));
        assert_eq!(schedule.rule.boundary, WindowBoundary::Exclusive);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let config = Config {
            refresh_period_secs: u64::MAX,
            activity_window_minutes: i64::MAX / 2,
            ..Config::default()
        };
        let schedule = config.schedule_config();
        assert_eq!(schedule.period, MAX_REFRESH_PERIOD);
        assert_eq!(schedule.rule.window, chrono::Duration::minutes(MAX_WINDOW_MINUTES));

        let config = Config {
            refresh_period_secs: 0,
            activity_window_minutes: -5,
            ..Config::default()
        };
        let schedule = config.schedule_config();
        assert_eq!(schedule.period, Duration::from_secs(1));
        assert_eq!(schedule.rule.window, chrono::Duration::zero());
    }

    #[test]
    fn test_match_feeds_follow_limits() {
        let config = Config::default();
        let keys: Vec<String> = config.match_feeds().iter().map(|f| f.key().to_string()).collect();
        assert_eq!(
            keys,
            vec![
                "matches:status=SCHEDULED&limit=20",
                "matches:status=IN_PLAY&limit=10",
                "matches:status=FINISHED&limit=20",
            ]
        );
    }
}
