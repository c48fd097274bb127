//! # Notification Message Formatter
//!
//! Renders surviving centers into the plain-text block that goes to the
//! console and to mail recipients, and fingerprints the exact bytes so
//! identical cycles can be deduplicated downstream.

use std::fmt;
use std::fmt::Write as _;

use sha2::{Digest, Sha256};
use vaxwatch_common::model::Center;

pub const BOOKING_URL: &str = "https://selfregistration.cowin.gov.in/";

/// Content hash of one formatted message.
///
/// Byte-identical messages collide; any textual difference, including
/// ordering, produces a different fingerprint.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(text: &str) -> Self {
        let digest = Sha256::digest(text.as_bytes());
        Self(format!("{digest:x}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Renders `centers` in input order and returns the text with its
/// fingerprint.
pub fn format_message(centers: &[Center]) -> (String, Fingerprint) {
    let mut body = String::from("Available Vaccine Centers:\n\n");

    for (center_index, center) in centers.iter().enumerate() {
        let _ = writeln!(
            body,
            "Center {}: {} - {} - {} - {} - {}\n",
            center_index + 1,
            center.name,
            center.address,
            center.district_name,
            center.state_name,
            center.pincode
        );
        for (session_index, session) in center.sessions.iter().enumerate() {
            let _ = writeln!(body, "Session {}:\n", session_index + 1);
            let _ = writeln!(body, "\tDate: {}", session.date);
            let _ = writeln!(
                body,
                "\tAvailable First Dose Capacity: {}",
                session.available_capacity_dose1
            );
            let _ = writeln!(
                body,
                "\tAvailable Second Dose Capacity: {}",
                session.available_capacity_dose2
            );
            let _ = writeln!(body, "\tMinimum Age Limit: {}", session.min_age_limit);
            let _ = writeln!(body, "\tVaccine: {}", session.vaccine);
            let _ = writeln!(body, "\tFee Type: {}\n", center.fee_type);
        }
    }

    let _ = writeln!(body, "Book your slot now at: {BOOKING_URL}\n");

    let fingerprint: Fingerprint = Fingerprint::of(&body);
    (body, fingerprint)
}
