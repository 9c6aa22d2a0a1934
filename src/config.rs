//! Process configuration.
//!
//! Everything is read from environment variables with defaults that match the
//! interactive demo setup:
//! - `HOST` / `PORT` - bind address (default `127.0.0.1:8000`)
//! - `PIPELINE_STEP_DELAY_MS` - pacing delay between pipeline steps (default 1500)
//! - `STREAM_MODE` - `push` or `poll` (default `push`)
//! - `STREAM_POLL_INTERVAL_MS` - interval for `poll` mode (default 500)
//! - `REVIEW_REVISION_PROBABILITY` - chance a first draft is sent back (default 0.3)
//! - `REVIEW_SEED` - optional seed for reproducible review outcomes

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::agents::{RandomReview, SharedReviewPolicy, DEFAULT_REVISION_PROBABILITY};
use crate::orchestrator::PipelineConfig;
use crate::stream::{StreamMode, DEFAULT_POLL_INTERVAL};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Settings for the review quality gate.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewConfig {
    pub revision_probability: f64,
    pub seed: Option<u64>,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            revision_probability: DEFAULT_REVISION_PROBABILITY,
            seed: None,
        }
    }
}

impl ReviewConfig {
    pub fn build_policy(&self) -> SharedReviewPolicy {
        match self.seed {
            Some(seed) => Arc::new(RandomReview::seeded(self.revision_probability, seed)),
            None => Arc::new(RandomReview::new(self.revision_probability)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub pipeline: PipelineConfig,
    pub stream_mode: StreamMode,
    pub review: ReviewConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            pipeline: PipelineConfig::default(),
            stream_mode: StreamMode::default(),
            review: ReviewConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Unset keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("HOST").unwrap_or(defaults.host);
        let port = parse_var(&lookup, "PORT")?.unwrap_or(defaults.port);

        let step_delay = parse_var::<u64, _>(&lookup, "PIPELINE_STEP_DELAY_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.pipeline.step_delay);

        let poll_interval = parse_var::<u64, _>(&lookup, "STREAM_POLL_INTERVAL_MS")?
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_POLL_INTERVAL);
        let stream_mode = match lookup("STREAM_MODE").as_deref().map(str::trim) {
            None | Some("") => defaults.stream_mode,
            Some(mode) if mode.eq_ignore_ascii_case("push") => StreamMode::Push,
            Some(mode) if mode.eq_ignore_ascii_case("poll") => StreamMode::Poll {
                interval: poll_interval,
            },
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "STREAM_MODE",
                    value: other.to_string(),
                    reason: "expected \"push\" or \"poll\"".to_string(),
                })
            }
        };

        let revision_probability = parse_var::<f64, _>(&lookup, "REVIEW_REVISION_PROBABILITY")?
            .unwrap_or(defaults.review.revision_probability);
        if !(0.0..=1.0).contains(&revision_probability) {
            return Err(ConfigError::Invalid {
                key: "REVIEW_REVISION_PROBABILITY",
                value: revision_probability.to_string(),
                reason: "must be between 0 and 1".to_string(),
            });
        }
        let seed = parse_var(&lookup, "REVIEW_SEED")?;

        Ok(Self {
            host,
            port,
            pipeline: PipelineConfig { step_delay },
            stream_mode,
            review: ReviewConfig {
                revision_probability,
                seed,
            },
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Invalid {
                key,
                value: raw.clone(),
                reason: e.to_string(),
            }),
    }
}
