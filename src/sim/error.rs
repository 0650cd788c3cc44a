use std::fmt;

use super::body::BodyId;

/// Errors raised while building or feeding the balloon simulation
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// No anchor was supplied, so there is nothing for ropes to hang from
    MissingAnchor,
    /// A tunable is outside the range the formulas can handle
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },
    /// The configuration document could not be parsed
    ConfigParse(String),
    /// A pop was reported for a body the registry never created
    BodyOutOfRange { id: BodyId, count: usize },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::MissingAnchor => write!(f, "anchor is not assigned"),
            SimError::InvalidConfig { field, reason } => {
                write!(f, "invalid config value `{}`: {}", field, reason)
            }
            SimError::ConfigParse(msg) => write!(f, "failed to parse config: {}", msg),
            SimError::BodyOutOfRange { id, count } => {
                write!(f, "body {} out of range (count: {})", id, count)
            }
        }
    }
}

impl std::error::Error for SimError {}
