//! Action results and host liveness status

use serde::{Deserialize, Serialize};
use std::fmt;

/// Liveness of a host as last observed by an explicit check
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostStatus {
    #[default]
    Unknown,
    Available,
    Unavailable,
}

impl fmt::Display for HostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HostStatus::Unknown => "Unknown",
            HostStatus::Available => "Available",
            HostStatus::Unavailable => "Unavailable",
        };
        f.write_str(label)
    }
}

/// Uniform `(output, error)` pair returned by every power action
///
/// An empty `error` means success. The error text is shown to the user
/// verbatim, so it carries the remote stderr or the transport failure as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub output: String,
    pub error: String,
}

impl ActionResult {
    pub fn new(output: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            error: error.into(),
        }
    }

    /// Failed result with no output
    pub fn failed(error: impl Into<String>) -> Self {
        Self::new("", error)
    }

    pub fn is_success(&self) -> bool {
        self.error.is_empty()
    }
}
