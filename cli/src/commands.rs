use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use vaxwatch_common::config::MailConfig;
use vaxwatch_common::location::LocationQuery;
use vaxwatch_common::model::{Dose, Vaccine};
use vaxwatch_core::filter::Criteria;

/// Every value is validated at parse time, so an invalid invocation
/// exits with a descriptive message before any network activity.
#[derive(Parser, Debug)]
#[command(name = "vaxwatch")]
#[command(about = "Watch the public CoWIN API for open vaccination slots.")]
pub struct CommandLine {
    /// District IDs (3 digits) to watch
    #[arg(
        long = "district",
        value_name = "ID",
        num_args = 1..,
        value_parser = parse_district,
        conflicts_with = "pin",
        required_unless_present_any = ["pin", "find_district"]
    )]
    pub district: Vec<LocationQuery>,

    /// PIN codes (6 digits) to watch
    #[arg(long = "pin", value_name = "CODE", num_args = 1.., value_parser = parse_pin)]
    pub pin: Vec<LocationQuery>,

    /// Minimum age limit, 18 or 45
    #[arg(long, value_name = "YEARS", value_parser = parse_age)]
    pub age: Option<u32>,

    /// Preferred vaccine: COVAXIN, COVISHIELD or "SPUTNIK V"; any by default
    #[arg(long, value_name = "NAME", value_parser = parse_vaccine)]
    pub vaccine: Option<Vaccine>,

    /// Only keep sessions with first or second dose capacity
    #[arg(long, value_name = "DOSE", value_parser = parse_dose)]
    pub dose: Option<Dose>,

    /// Email addresses to notify when slots appear
    #[arg(long = "recipients", value_name = "EMAIL", num_args = 1.., value_parser = parse_recipient)]
    pub recipients: Vec<String>,

    /// Appointment date (dd-mm-yyyy); today by default
    #[arg(long, value_name = "DATE", value_parser = parse_date)]
    pub date: Option<String>,

    /// Path to the mail credentials file
    #[arg(long = "mail-config", value_name = "PATH", default_value = MailConfig::DEFAULT_PATH)]
    pub mail_config: PathBuf,

    /// List the district IDs of a state and exit
    #[arg(
        long = "find-district",
        value_name = "STATE",
        value_parser = parse_state,
        conflicts_with_all = ["district", "pin"]
    )]
    pub find_district: Option<String>,

    /// Keep polling on a loop instead of running once
    #[arg(long = "loop")]
    pub repeat: bool,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The active location set; district and pin are mutually exclusive,
    /// so at most one of these vectors is non-empty.
    pub fn queries(&self) -> Vec<LocationQuery> {
        if self.district.is_empty() {
            self.pin.clone()
        } else {
            self.district.clone()
        }
    }

    pub fn criteria(&self) -> Criteria {
        Criteria {
            min_age: self.age,
            vaccine: self.vaccine,
            dose: self.dose,
        }
    }
}

fn parse_district(s: &str) -> Result<LocationQuery, String> {
    LocationQuery::district(s).map_err(|e| e.to_string())
}

fn parse_pin(s: &str) -> Result<LocationQuery, String> {
    LocationQuery::pin(s).map_err(|e| e.to_string())
}

fn parse_age(s: &str) -> Result<u32, String> {
    match s.parse::<u32>() {
        Ok(age @ (18 | 45)) => Ok(age),
        _ => Err(format!("invalid minimum age '{s}': use 18 or 45")),
    }
}

fn parse_vaccine(s: &str) -> Result<Vaccine, String> {
    s.parse()
}

fn parse_dose(s: &str) -> Result<Dose, String> {
    s.parse()
}

/// Accepts the simple `local@domain.tld` shape, nothing stricter.
fn parse_recipient(s: &str) -> Result<String, String> {
    let Some((local, domain)) = s.split_once('@') else {
        return Err(format!("invalid recipient email address '{s}'"));
    };
    let dotted = domain
        .rsplit_once('.')
        .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty());
    if local.is_empty() || domain.contains('@') || !dotted {
        return Err(format!("invalid recipient email address '{s}'"));
    }
    Ok(s.to_string())
}

fn parse_state(s: &str) -> Result<String, String> {
    let trimmed: &str = s.trim();
    if !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_alphabetic() || c.is_whitespace())
    {
        Ok(trimmed.to_string())
    } else {
        Err(format!("invalid state name '{s}'"))
    }
}

fn parse_date(s: &str) -> Result<String, String> {
    NaiveDate::parse_from_str(s, "%d-%m-%Y")
        .map(|_| s.to_string())
        .map_err(|_| format!("invalid date '{s}': use dd-mm-yyyy"))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
