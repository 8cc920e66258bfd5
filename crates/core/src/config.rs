//! Locator configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Directory prefix under which provider-declaration files live
pub const DEFAULT_SERVICE_PREFIX: &str = "META-INF/services";

/// How long a decoded value stays in a [`crate::cache::CachedResource`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Retention {
    /// Keep the value until `invalidate()` or an explicit `reclaim()`
    #[default]
    Strong,
    /// Drop the value once it has not been read for `after_ms` milliseconds
    Idle { after_ms: u64 },
}

impl Retention {
    pub fn idle(after: Duration) -> Self {
        Retention::Idle {
            after_ms: after.as_millis().min(u64::MAX as u128) as u64,
        }
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        match self {
            Retention::Strong => None,
            Retention::Idle { after_ms } => Some(Duration::from_millis(*after_ms)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    pub service_prefix: String,
    /// Enumerate independent roots on the rayon pool during `build()`
    pub parallel_enumeration: bool,
    /// Follow symbolic links inside directory roots
    pub follow_links: bool,
    pub retention: Retention,
    /// Memoize compiled glob patterns inside the locator
    pub pattern_cache: bool,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            service_prefix: DEFAULT_SERVICE_PREFIX.to_string(),
            parallel_enumeration: true,
            follow_links: true,
            retention: Retention::Strong,
            pattern_cache: true,
        }
    }
}

impl LocatorConfig {
    /// Defaults overridden by `RESCOPE_*` environment variables.
    ///
    /// Unparsable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(prefix) = lookup("RESCOPE_SERVICE_PREFIX") {
            config.service_prefix = prefix.trim_matches('/').to_string();
        }
        if let Some(flag) = lookup("RESCOPE_PARALLEL").and_then(|v| parse_flag("RESCOPE_PARALLEL", &v))
        {
            config.parallel_enumeration = flag;
        }
        if let Some(flag) =
            lookup("RESCOPE_FOLLOW_LINKS").and_then(|v| parse_flag("RESCOPE_FOLLOW_LINKS", &v))
        {
            config.follow_links = flag;
        }
        if let Some(raw) = lookup("RESCOPE_IDLE_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(0) => config.retention = Retention::Strong,
                Ok(secs) => config.retention = Retention::idle(Duration::from_secs(secs)),
                Err(e) => warn!("Ignoring RESCOPE_IDLE_SECS={:?}: {}", raw, e),
            }
        }

        config
    }

    pub fn with_service_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.service_prefix = prefix.into().trim_matches('/').to_string();
        self
    }

    pub fn with_parallel_enumeration(mut self, parallel: bool) -> Self {
        self.parallel_enumeration = parallel;
        self
    }

    pub fn with_follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    pub fn with_retention(mut self, retention: Retention) -> Self {
        self.retention = retention;
        self
    }

    /// Name of the declaration resource for `service`
    pub fn service_resource_name(&self, service: &str) -> String {
        if self.service_prefix.is_empty() {
            service.to_string()
        } else {
            format!("{}/{}", self.service_prefix, service)
        }
    }
}

fn parse_flag(key: &str, value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            warn!("Ignoring {}={:?}: expected a boolean", key, value);
            None
        }
    }
}
