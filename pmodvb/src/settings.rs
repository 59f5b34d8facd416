//! Connection and browsing settings of the DVB source

use crate::bus::{DVB_SERVICE, MANAGER_PATH};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default reply timeout of a daemon call (the D-Bus default)
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 25;

/// Default number of device groups resolved at once
pub const DEFAULT_RESOLVE_CONCURRENCY: usize = 1;

/// Message bus hosting the daemon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusKind {
    #[default]
    Session,
    System,
}

impl FromStr for BusKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "session" => Ok(BusKind::Session),
            "system" => Ok(BusKind::System),
            other => Err(format!(
                "unknown bus '{}', expected 'session' or 'system'",
                other
            )),
        }
    }
}

impl fmt::Display for BusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusKind::Session => f.write_str("session"),
            BusKind::System => f.write_str("system"),
        }
    }
}

/// Snapshot of the DVB source settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DvbSettings {
    pub bus: BusKind,
    pub service: String,
    pub manager_path: String,
    /// `None` disables the reply timeout
    pub call_timeout: Option<Duration>,
    pub resolve_concurrency: usize,
}

impl Default for DvbSettings {
    fn default() -> Self {
        Self {
            bus: BusKind::Session,
            service: DVB_SERVICE.to_string(),
            manager_path: MANAGER_PATH.to_string(),
            call_timeout: Some(Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS)),
            resolve_concurrency: DEFAULT_RESOLVE_CONCURRENCY,
        }
    }
}

impl DvbSettings {
    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_resolve_concurrency(mut self, concurrency: usize) -> Self {
        self.resolve_concurrency = concurrency.max(1);
        self
    }
}
