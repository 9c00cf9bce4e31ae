//! Scheduler fault codes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a fault returned by the scheduler.
///
/// LAVA reports faults with HTTP-like integer codes. Anything outside the
/// known set is kept verbatim in [`FaultCode::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultCode {
    /// Malformed arguments or an invalid job definition.
    BadRequest,
    /// Missing or invalid credentials.
    Unauthorized,
    /// Credentials lack the permission for this call.
    Forbidden,
    /// The requested device, device type or job does not exist.
    NotFound,
    /// Server-side failure.
    Internal,
    /// Any other code.
    Other(i32),
}

impl FaultCode {
    /// Map a numeric fault code to its classification
    pub fn from_code(code: i32) -> Self {
        match code {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            500 => Self::Internal,
            other => Self::Other(other),
        }
    }

    /// Numeric fault code
    pub fn code(&self) -> i32 {
        match self {
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Internal => 500,
            Self::Other(code) => *code,
        }
    }
}

impl fmt::Display for FaultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::Unauthorized => write!(f, "UNAUTHORIZED"),
            Self::Forbidden => write!(f, "FORBIDDEN"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Internal => write!(f, "INTERNAL"),
            Self::Other(code) => write!(f, "FAULT_{}", code),
        }
    }
}
