#![cfg(test)]
//! District-ID lookup against a scripted location directory.

use std::collections::HashMap;

use async_trait::async_trait;
use vaxwatch_core::fetch::{self, District, DirectorySource, FetchError, State};

struct ScriptedDirectory {
    states: Vec<State>,
    districts: HashMap<u32, Vec<District>>,
}

#[async_trait]
impl DirectorySource for ScriptedDirectory {
    async fn fetch_states(&self) -> Result<Vec<State>, FetchError> {
        Ok(self.states.clone())
    }

    async fn fetch_districts(&self, state_id: u32) -> Result<Vec<District>, FetchError> {
        self.districts
            .get(&state_id)
            .cloned()
            .ok_or(FetchError::RemoteUnavailable { status: 404 })
    }
}

fn scripted_directory() -> ScriptedDirectory {
    ScriptedDirectory {
        states: vec![
            State {
                state_id: 11,
                state_name: "Gujarat".to_string(),
            },
            State {
                state_id: 31,
                state_name: "Tamil Nadu".to_string(),
            },
        ],
        districts: HashMap::from([
            (
                11,
                vec![
                    District {
                        district_id: 395,
                        district_name: "Surat".to_string(),
                    },
                    District {
                        district_id: 154,
                        district_name: "Ahmedabad".to_string(),
                    },
                ],
            ),
            (
                31,
                vec![District {
                    district_id: 571,
                    district_name: "Chennai".to_string(),
                }],
            ),
        ]),
    }
}

#[tokio::test]
async fn state_name_resolves_to_its_districts() {
    let directory: ScriptedDirectory = scripted_directory();
    let districts: Vec<District> = fetch::districts_for_state(&directory, "Gujarat")
        .await
        .unwrap();

    assert_eq!(districts.len(), 2);
    assert_eq!(districts[0].district_name, "Surat");
    assert_eq!(districts[0].district_id, 395);
}

#[tokio::test]
async fn spacing_and_case_do_not_matter() {
    let directory: ScriptedDirectory = scripted_directory();
    let districts: Vec<District> = fetch::districts_for_state(&directory, "tamilnadu")
        .await
        .unwrap();

    assert_eq!(districts.len(), 1);
    assert_eq!(districts[0].district_name, "Chennai");
}

#[tokio::test]
async fn unknown_state_is_an_error() {
    let directory: ScriptedDirectory = scripted_directory();
    let err: FetchError = fetch::districts_for_state(&directory, "Kerala")
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::UnknownState(name) if name == "Kerala"));
}
