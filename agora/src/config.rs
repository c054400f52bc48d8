use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use agora_core::ranking::{HOT_TOPIC_LIMIT, HOT_TOPIC_WINDOW_HOURS, TREND_WINDOW_DAYS};
use agora_core::score::POPULARITY_WINDOW_HOURS;
use agora_core::CONTROVERSIAL_THRESHOLD;
use anyhow::{anyhow, Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub port: u16,
    pub environment: Environment,

    /// Minimum likes and dislikes for a node to count as controversial
    pub controversial_threshold: u64,

    /// Vote window used by the `popular` sort
    pub popularity_window_hours: i64,

    /// Activity window for the hot topics panel
    pub hot_topic_window_hours: i64,

    /// How many hot topics to show
    pub hot_topic_limit: usize,

    /// Creation window for the `trend` topic listing
    pub trend_window_days: i64,

    /// Sort replies at every depth instead of only the root level
    pub recursive_sort: bool,

    /// JSON file with severe/profanity/hate term lists
    pub moderation_terms: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum Environment {
    #[serde(rename = "development")]
    Development,
    #[serde(rename = "production")]
    Production,
    #[serde(rename = "test")]
    Test,
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "development" => Ok(Environment::Development),
            "production" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            other => Err(anyhow!("unknown environment '{}'", other)),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            environment: Environment::Development,
            controversial_threshold: CONTROVERSIAL_THRESHOLD,
            popularity_window_hours: POPULARITY_WINDOW_HOURS,
            hot_topic_window_hours: HOT_TOPIC_WINDOW_HOURS,
            hot_topic_limit: HOT_TOPIC_LIMIT,
            trend_window_days: TREND_WINDOW_DAYS,
            recursive_sort: false,
            moderation_terms: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            port: parse_or(&lookup, "PORT", defaults.port)?,
            environment: parse_or(&lookup, "ENVIRONMENT", defaults.environment)?,
            controversial_threshold: parse_or(
                &lookup,
                "AGORA_CONTROVERSIAL_THRESHOLD",
                defaults.controversial_threshold,
            )?,
            popularity_window_hours: parse_or(
                &lookup,
                "AGORA_POPULARITY_WINDOW_HOURS",
                defaults.popularity_window_hours,
            )?,
            hot_topic_window_hours: parse_or(
                &lookup,
                "AGORA_HOT_TOPIC_WINDOW_HOURS",
                defaults.hot_topic_window_hours,
            )?,
            hot_topic_limit: parse_or(&lookup, "AGORA_HOT_TOPIC_LIMIT", defaults.hot_topic_limit)?,
            trend_window_days: parse_or(
                &lookup,
                "AGORA_TREND_WINDOW_DAYS",
                defaults.trend_window_days,
            )?,
            recursive_sort: parse_or(&lookup, "AGORA_RECURSIVE_SORT", defaults.recursive_sort)?,
            moderation_terms: lookup("AGORA_MODERATION_TERMS")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
        };

        for (key, value) in [
            ("AGORA_POPULARITY_WINDOW_HOURS", config.popularity_window_hours),
            ("AGORA_HOT_TOPIC_WINDOW_HOURS", config.hot_topic_window_hours),
            ("AGORA_TREND_WINDOW_DAYS", config.trend_window_days),
        ] {
            if value <= 0 {
                return Err(anyhow!("{} must be positive, got {}", key, value));
            }
        }

        Ok(config)
    }

    pub fn popularity_window(&self) -> Duration {
        Duration::hours(self.popularity_window_hours)
    }

    pub fn hot_topic_window(&self) -> Duration {
        Duration::hours(self.hot_topic_window_hours)
    }

    pub fn trend_window(&self) -> Duration {
        Duration::days(self.trend_window_days)
    }
}

fn parse_or<T>(lookup: impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{}", e))
            .with_context(|| format!("Invalid value for {}: '{}'", key, raw)),
        None => {
            info!("{} not set, using default", key);
            Ok(default)
        }
    }
}
