use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Outcome code carried by a reply frame and by each reply inside it.
///
/// The overall status of a frame is FATAL, LOGIN, ROLLBACK, or anything
/// else (normal). Per-reply statuses decide whether the payload goes to the
/// request or is consumed by the reply handler. Statuses are compared, never
/// combined.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Ok,
    Warn,
    Error,
    Fatal,
    Rollback,
    Login,
    Optimistic,
}

impl Status {
    /// Encoded width on the wire.
    pub const WIDTH: usize = 1;

    pub const ALL: [Status; 7] = [
        Status::Ok,
        Status::Warn,
        Status::Error,
        Status::Fatal,
        Status::Rollback,
        Status::Login,
        Status::Optimistic,
    ];

    pub fn tag(&self) -> u8 {
        match self {
            Self::Ok => 1,
            Self::Warn => 2,
            Self::Error => 3,
            Self::Fatal => 4,
            Self::Rollback => 5,
            Self::Login => 6,
            Self::Optimistic => 7,
        }
    }

    pub fn from_tag(tag: u8) -> Result<Self, TypeError> {
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.tag() == tag)
            .ok_or(TypeError::UnknownStatus(tag))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
            Self::Rollback => "ROLLBACK",
            Self::Login => "LOGIN",
            Self::Optimistic => "OPTIMISTIC",
        }
    }

    /// OK and WARN replies are handed to their request.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Ok | Self::Warn)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
