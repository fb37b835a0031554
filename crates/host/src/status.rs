use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::StatusReporter;

/// Workload status level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    /// Converged, or converging without problems.
    Active,

    /// Needs operator attention.
    Blocked,

    /// Waiting on something outside this node.
    Waiting,

    /// Doing work.
    Maintenance,
}

impl fmt::Display for StatusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => f.write_str("active"),
            Self::Blocked => f.write_str("blocked"),
            Self::Waiting => f.write_str("waiting"),
            Self::Maintenance => f.write_str("maintenance"),
        }
    }
}

/// A workload status: level plus human readable message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// Status level.
    pub level: StatusLevel,

    /// Message shown to the operator.
    pub message: String,
}

impl Status {
    /// Creates a status.
    pub fn new(level: StatusLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    /// Creates an active status.
    pub fn active(message: impl Into<String>) -> Self {
        Self::new(StatusLevel::Active, message)
    }

    /// Creates a blocked status.
    pub fn blocked(message: impl Into<String>) -> Self {
        Self::new(StatusLevel::Blocked, message)
    }

    /// Creates a waiting status.
    pub fn waiting(message: impl Into<String>) -> Self {
        Self::new(StatusLevel::Waiting, message)
    }

    /// Creates a maintenance status.
    pub fn maintenance(message: impl Into<String>) -> Self {
        Self::new(StatusLevel::Maintenance, message)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.level, self.message)
    }
}

/// Reports the status and logs it.
pub async fn status_and_log<R>(reporter: &R, status: Status)
where
    R: StatusReporter + ?Sized,
{
    match status.level {
        StatusLevel::Blocked => warn!("{}", status.message),
        _ => info!("{}", status.message),
    }

    reporter.report(status).await;
}
