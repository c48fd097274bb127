//! # Location Query Model
//!
//! Defines the possible area selectors for an appointment search.
//!
//! This module handles parsing and representing queries, which can be:
//! * A district identifier (exactly 3 digits).
//! * A postal PIN code (exactly 6 digits).
//!
//! Validation happens at construction time, before any network activity.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocationError {
    #[error("invalid district ID '{0}': expected exactly 3 digits")]
    InvalidDistrict(String),
    #[error("invalid PIN code '{0}': expected exactly 6 digits")]
    InvalidPin(String),
}

/// Represents a distinct area to be searched for appointments.
///
/// Exactly one kind is active per invocation; the CLI enforces the
/// district/PIN mutual exclusion.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LocationQuery {
    /// Search every center in a district (3-digit identifier).
    District(String),
    /// Search centers belonging to a postal PIN code (6 digits).
    Pin(String),
}

impl LocationQuery {
    /// Builds a district query, rejecting anything but 3 ASCII digits.
    pub fn district(s: &str) -> Result<Self, LocationError> {
        if is_digits(s, 3) {
            Ok(Self::District(s.to_string()))
        } else {
            Err(LocationError::InvalidDistrict(s.to_string()))
        }
    }

    /// Builds a PIN-code query, rejecting anything but 6 ASCII digits.
    pub fn pin(s: &str) -> Result<Self, LocationError> {
        if is_digits(s, 6) {
            Ok(Self::Pin(s.to_string()))
        } else {
            Err(LocationError::InvalidPin(s.to_string()))
        }
    }

    /// The raw identifier, used to tag log lines and failures.
    pub fn id(&self) -> &str {
        match self {
            Self::District(id) => id,
            Self::Pin(code) => code,
        }
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::District(id) => write!(f, "district {id}"),
            Self::Pin(code) => write!(f, "pin {code}"),
        }
    }
}

fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
