//! # Appointment Domain Model
//!
//! Center and session records as returned by the scheduling API, plus the
//! small fixed enumerations users can filter on.
//!
//! The API omits dose-level capacities on some deployments; those fields
//! default to zero so the dose filters treat them as unavailable.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// A physical vaccination site with one or more bookable sessions.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Center {
    pub name: String,
    pub address: String,
    pub district_name: String,
    pub state_name: String,
    pub pincode: u32,
    pub fee_type: String,
    #[serde(default)]
    pub sessions: Vec<Session>,
}

/// A date-scoped bookable slot within a center.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Session {
    pub date: String,
    pub available_capacity: u32,
    #[serde(default)]
    pub available_capacity_dose1: u32,
    #[serde(default)]
    pub available_capacity_dose2: u32,
    pub min_age_limit: u32,
    pub vaccine: String,
}

/// The vaccines the remote scheduler knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Vaccine {
    Covaxin,
    Covishield,
    SputnikV,
}

impl Vaccine {
    /// The exact spelling used by the API and in session records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Covaxin => "COVAXIN",
            Self::Covishield => "COVISHIELD",
            Self::SputnikV => "SPUTNIK V",
        }
    }
}

impl FromStr for Vaccine {
    type Err = String;

    /// Parses a user-supplied vaccine name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "COVAXIN" => Ok(Self::Covaxin),
            "COVISHIELD" => Ok(Self::Covishield),
            "SPUTNIK V" => Ok(Self::SputnikV),
            other => Err(format!(
                "invalid vaccine '{other}': choose COVAXIN, COVISHIELD or SPUTNIK V"
            )),
        }
    }
}

impl fmt::Display for Vaccine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which dose's capacity the user cares about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dose {
    First,
    Second,
}

impl FromStr for Dose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(Self::First),
            "second" => Ok(Self::Second),
            other => Err(format!("invalid dose '{other}': choose first or second")),
        }
    }
}
