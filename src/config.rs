use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use chrono::FixedOffset;

use crate::codec::{TemporalCodec, parse_utc_offset};
use crate::error::PlannerError;
use crate::services::DEFAULT_STALE_TIME;
use crate::store::{DEFAULT_API_URL, DEFAULT_REQUEST_TIMEOUT_SECS, StoreConfig};

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

#[derive(Clone, Debug)]
pub struct PlannerConfig {
    pub store: StoreConfig,
    pub stale_time: Duration,
    /// Wall-clock zone for editing; `None` uses the system zone.
    pub utc_offset: Option<FixedOffset>,
    pub bind_addr: SocketAddr,
}

impl PlannerConfig {
    pub fn new_from_env() -> Result<Self, PlannerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, PlannerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("PLANNER_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(PlannerError::Config(format!(
                "PLANNER_API_URL must be an http(s) URL: {}",
                base_url
            )));
        }

        let timeout_secs = parse_secs(&lookup, "PLANNER_REQUEST_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        let stale_time = parse_secs(&lookup, "PLANNER_STALE_TIME_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_STALE_TIME);

        let utc_offset = lookup("PLANNER_UTC_OFFSET")
            .filter(|v| !v.trim().is_empty())
            .map(|v| parse_utc_offset(&v))
            .transpose()?;

        let bind_addr = lookup("PLANNER_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| PlannerError::Config(format!("PLANNER_BIND_ADDR is invalid: {}", e)))?;

        Ok(Self {
            store: StoreConfig {
                base_url,
                timeout: Duration::from_secs(timeout_secs),
            },
            stale_time,
            utc_offset,
            bind_addr,
        })
    }

    pub fn codec(&self) -> TemporalCodec {
        match self.utc_offset {
            Some(offset) => TemporalCodec::with_offset(offset),
            None => TemporalCodec::local(),
        }
    }
}

fn parse_secs<F>(lookup: &F, key: &str) -> Result<Option<u64>, PlannerError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| PlannerError::Config(format!("{} must be a number of seconds, got {:?}", key, value))),
        None => Ok(None),
    }
}
