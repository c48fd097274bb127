//! # Center Fetcher
//!
//! Retrieves center records from the public CoWIN scheduling API.
//!
//! The remote exposes two query shapes, one per location-query kind:
//! `calendarByDistrict` (param `district_id`) and `calendarByPin`
//! (param `pincode`). Both take a `date` in dd-mm-yyyy form and answer
//! with a JSON body carrying a `centers` array.
//!
//! The same host also serves the location directory: the state list and
//! the districts of one state, used to look district IDs up by state
//! name (see [`districts_for_state`]).
//!
//! High-level modules depend on the [`CenterSource`] and
//! [`DirectorySource`] abstractions rather than the HTTP client, so
//! both pipelines can be exercised with in-memory sources.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use vaxwatch_common::location::LocationQuery;
use vaxwatch_common::model::Center;

pub const BASE_URL: &str = "https://cdn-api.co-vin.in/api";

// The API rejects requests without a client-identifying User-Agent.
const USER_AGENT: &str = "PostmanRuntime/8";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("unable to reach scheduling servers (HTTP {status})")]
    RemoteUnavailable { status: u16 },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("no state named '{0}' in the location directory")]
    UnknownState(String),
}

/// Anything that can produce the center list for one location and date.
#[async_trait]
pub trait CenterSource: Send + Sync {
    async fn fetch(&self, query: &LocationQuery, date: &str) -> Result<Vec<Center>, FetchError>;
}

/// Anything that can answer location-directory queries.
#[async_trait]
pub trait DirectorySource: Send + Sync {
    async fn fetch_states(&self) -> Result<Vec<State>, FetchError>;
    async fn fetch_districts(&self, state_id: u32) -> Result<Vec<District>, FetchError>;
}

/// One entry of the state directory.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct State {
    pub state_id: u32,
    pub state_name: String,
}

/// One district of a state, carrying the 3-digit identifier the
/// calendar endpoints take.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct District {
    pub district_id: u32,
    pub district_name: String,
}

#[derive(Debug, Deserialize)]
struct CalendarResponse {
    #[serde(default)]
    centers: Vec<Center>,
}

#[derive(Debug, Deserialize)]
struct StatesResponse {
    #[serde(default)]
    states: Vec<State>,
}

#[derive(Debug, Deserialize)]
struct DistrictsResponse {
    #[serde(default)]
    districts: Vec<District>,
}

/// HTTP client for the public appointment calendar.
pub struct CowinClient {
    http: reqwest::Client,
    base_url: String,
}

impl CowinClient {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Points the client at a different host, for tests.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The full request URL for one query. Identifiers and dates are
    /// digit/dash strings, so no further encoding is needed.
    pub fn request_url(&self, query: &LocationQuery, date: &str) -> String {
        match query {
            LocationQuery::District(id) => format!(
                "{}/v2/appointment/sessions/public/calendarByDistrict?district_id={id}&date={date}",
                self.base_url
            ),
            LocationQuery::Pin(code) => format!(
                "{}/v2/appointment/sessions/public/calendarByPin?pincode={code}&date={date}",
                self.base_url
            ),
        }
    }

    pub fn states_url(&self) -> String {
        format!("{}/v2/admin/location/states", self.base_url)
    }

    pub fn districts_url(&self, state_id: u32) -> String {
        format!("{}/v2/admin/location/districts/{state_id}", self.base_url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = self
            .http
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::RemoteUnavailable {
                status: status.as_u16(),
            });
        }

        Ok(response.json().await?)
    }
}

impl Default for CowinClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CenterSource for CowinClient {
    async fn fetch(&self, query: &LocationQuery, date: &str) -> Result<Vec<Center>, FetchError> {
        let url: String = self.request_url(query, date);
        let body: CalendarResponse = self.get_json(&url).await?;
        Ok(body.centers)
    }
}

#[async_trait]
impl DirectorySource for CowinClient {
    async fn fetch_states(&self) -> Result<Vec<State>, FetchError> {
        let body: StatesResponse = self.get_json(&self.states_url()).await?;
        Ok(body.states)
    }

    async fn fetch_districts(&self, state_id: u32) -> Result<Vec<District>, FetchError> {
        let body: DistrictsResponse = self.get_json(&self.districts_url(state_id)).await?;
        Ok(body.districts)
    }
}

/// Looks up the district directory of one state by name.
///
/// The name match ignores case and anything that is not a letter, so
/// "tamilnadu" finds "Tamil Nadu".
pub async fn districts_for_state(
    source: &dyn DirectorySource,
    state: &str,
) -> Result<Vec<District>, FetchError> {
    let states: Vec<State> = source.fetch_states().await?;
    let state_id: u32 = match_state_id(state, &states)
        .ok_or_else(|| FetchError::UnknownState(state.to_string()))?;
    source.fetch_districts(state_id).await
}

/// Finds the ID of the directory entry whose name matches `input`.
pub fn match_state_id(input: &str, states: &[State]) -> Option<u32> {
    states
        .iter()
        .find(|state| letters_eq(&state.state_name, input))
        .map(|state| state.state_id)
}

/// Compares two names over their letters only, case-insensitively.
fn letters_eq(a: &str, b: &str) -> bool {
    let letters = |s: &str| {
        s.chars()
            .filter(|c| c.is_alphabetic())
            .map(|c| c.to_ascii_lowercase())
            .collect::<String>()
    };
    letters(a) == letters(b)
}
