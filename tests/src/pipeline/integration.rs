#![cfg(test)]
//! End-to-end pipeline scenarios: scripted center sources feed the
//! orchestrator, a recording transport captures what would be mailed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use vaxwatch_common::location::LocationQuery;
use vaxwatch_common::model::{Center, Dose, Session};
use vaxwatch_core::fetch::{CenterSource, FetchError};
use vaxwatch_core::filter::Criteria;
use vaxwatch_core::notify::{DedupNotifier, MailTransport, NotifyError};
use vaxwatch_core::poll::{CycleOutcome, PollOptions, Poller};

/// What a scripted source answers for one location.
enum Scripted {
    Centers(Vec<Center>),
    Unavailable(u16),
}

struct ScriptedSource {
    responses: Mutex<HashMap<LocationQuery, Scripted>>,
}

impl ScriptedSource {
    fn new(responses: HashMap<LocationQuery, Scripted>) -> Self {
        Self {
            responses: Mutex::new(responses),
        }
    }

    /// Replaces the scripted answer for one location mid-test.
    fn script(&self, query: LocationQuery, scripted: Scripted) {
        self.responses.lock().unwrap().insert(query, scripted);
    }
}

#[async_trait]
impl CenterSource for ScriptedSource {
    async fn fetch(&self, query: &LocationQuery, _date: &str) -> Result<Vec<Center>, FetchError> {
        match self.responses.lock().unwrap().get(query) {
            Some(Scripted::Centers(centers)) => Ok(centers.clone()),
            Some(Scripted::Unavailable(status)) => {
                Err(FetchError::RemoteUnavailable { status: *status })
            }
            None => Err(FetchError::RemoteUnavailable { status: 404 }),
        }
    }
}

struct RecordingTransport {
    bodies: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, _subject: &str, body: &str) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Delivery("relay refused".to_string()));
        }
        self.bodies.lock().unwrap().push(body.to_string());
        Ok(())
    }
}

fn recording_transport() -> (Box<dyn MailTransport>, Arc<Mutex<Vec<String>>>) {
    let bodies: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let transport = RecordingTransport {
        bodies: bodies.clone(),
        fail: false,
    };
    (Box::new(transport), bodies)
}

fn failing_transport() -> Box<dyn MailTransport> {
    Box::new(RecordingTransport {
        bodies: Arc::new(Mutex::new(Vec::new())),
        fail: true,
    })
}

fn center_with_session(name: &str, session: Session) -> Center {
    Center {
        name: name.to_string(),
        address: "Ring Road".to_string(),
        district_name: "Surat".to_string(),
        state_name: "Gujarat".to_string(),
        pincode: 395_001,
        fee_type: "Free".to_string(),
        sessions: vec![session],
    }
}

fn session(capacity: u32, dose1: u32, dose2: u32, age: u32) -> Session {
    Session {
        date: "14-05-2021".to_string(),
        available_capacity: capacity,
        available_capacity_dose1: dose1,
        available_capacity_dose2: dose2,
        min_age_limit: age,
        vaccine: "COVISHIELD".to_string(),
    }
}

fn options_for(query: LocationQuery, criteria: Criteria) -> PollOptions {
    PollOptions {
        queries: vec![query],
        criteria,
        date: Some("14-05-2021".to_string()),
        repeat: false,
    }
}

/// District 395, age filter 45, one matching session: the center is
/// reported and mailed, and its fingerprint is recorded.
#[tokio::test]
async fn matching_center_is_mailed_once() {
    let district: LocationQuery = LocationQuery::district("395").unwrap();
    let source = ScriptedSource::new(HashMap::from([(
            district.clone(),
            Scripted::Centers(vec![center_with_session(
                "Civil Hospital",
                session(5, 5, 0, 45),
            )]),
        )]));
    let (transport, bodies) = recording_transport();
    let mut poller = Poller::new(Arc::new(source), DedupNotifier::new(Some(transport)));

    let criteria = Criteria {
        min_age: Some(45),
        ..Criteria::default()
    };
    let outcome: CycleOutcome = poller.run_cycle(&options_for(district, criteria)).await;

    assert_eq!(outcome.locations_with_matches, 1);
    assert_eq!(outcome.emails_sent, 1);
    assert_eq!(outcome.locations_failed, 0);

    let sent = bodies.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("Civil Hospital"));
    assert!(sent[0].contains("Minimum Age Limit: 45"));
}

/// Second cycle over unchanged remote data: identical text, identical
/// fingerprint, no second email, but the center still reaches stdout.
#[tokio::test]
async fn unchanged_data_is_not_mailed_twice() {
    let district: LocationQuery = LocationQuery::district("395").unwrap();
    let source = ScriptedSource::new(HashMap::from([(
            district.clone(),
            Scripted::Centers(vec![center_with_session(
                "Civil Hospital",
                session(5, 5, 0, 45),
            )]),
        )]));
    let (transport, bodies) = recording_transport();
    let mut poller = Poller::new(Arc::new(source), DedupNotifier::new(Some(transport)));

    let criteria = Criteria {
        min_age: Some(45),
        ..Criteria::default()
    };
    let options: PollOptions = options_for(district, criteria);

    let first: CycleOutcome = poller.run_cycle(&options).await;
    let second: CycleOutcome = poller.run_cycle(&options).await;

    assert_eq!(first.emails_sent, 1);
    assert_eq!(second.emails_sent, 0);
    assert_eq!(second.locations_with_matches, 1);
    assert_eq!(bodies.lock().unwrap().len(), 1);
}

/// Changed remote data produces a new fingerprint and a new email.
#[tokio::test]
async fn changed_data_is_mailed_again() {
    let district: LocationQuery = LocationQuery::district("395").unwrap();
    let (transport, bodies) = recording_transport();

    let source: Arc<ScriptedSource> = Arc::new(ScriptedSource::new(HashMap::from([(
        district.clone(),
        Scripted::Centers(vec![center_with_session(
            "Civil Hospital",
            session(5, 5, 0, 45),
        )]),
    )])));
    let mut poller = Poller::new(source.clone(), DedupNotifier::new(Some(transport)));
    let options: PollOptions = options_for(district.clone(), Criteria::default());
    poller.run_cycle(&options).await;

    // Same dedup state, new capacity upstream.
    source.script(
        district,
        Scripted::Centers(vec![center_with_session(
            "Civil Hospital",
            session(9, 9, 0, 45),
        )]),
    );
    let outcome: CycleOutcome = poller.run_cycle(&options).await;

    assert_eq!(outcome.emails_sent, 1);
    assert_eq!(bodies.lock().unwrap().len(), 2);
}

/// PIN 110001 with --dose second and no second-dose capacity: the
/// session is pruned, the center dropped, nothing is mailed.
#[tokio::test]
async fn exhausted_dose_yields_no_appointments() {
    let pin: LocationQuery = LocationQuery::pin("110001").unwrap();
    let source = ScriptedSource::new(HashMap::from([(
            pin.clone(),
            Scripted::Centers(vec![center_with_session(
                "Connaught Place CHC",
                session(5, 5, 0, 18),
            )]),
        )]));
    let (transport, bodies) = recording_transport();
    let mut poller = Poller::new(Arc::new(source), DedupNotifier::new(Some(transport)));

    let criteria = Criteria {
        dose: Some(Dose::Second),
        ..Criteria::default()
    };
    let outcome: CycleOutcome = poller.run_cycle(&options_for(pin, criteria)).await;

    assert_eq!(outcome.locations_with_matches, 0);
    assert_eq!(outcome.emails_sent, 0);
    assert!(bodies.lock().unwrap().is_empty());
}

/// One unreachable location must not abort its siblings in the cycle.
#[tokio::test]
async fn failing_location_does_not_abort_siblings() {
    let healthy: LocationQuery = LocationQuery::district("395").unwrap();
    let broken: LocationQuery = LocationQuery::district("512").unwrap();
    let source = ScriptedSource::new(HashMap::from([
            (
                healthy.clone(),
                Scripted::Centers(vec![center_with_session(
                    "Civil Hospital",
                    session(5, 5, 0, 45),
                )]),
            ),
            (broken.clone(), Scripted::Unavailable(503)),
        ]));
    let (transport, bodies) = recording_transport();
    let mut poller = Poller::new(Arc::new(source), DedupNotifier::new(Some(transport)));

    let options = PollOptions {
        queries: vec![healthy, broken],
        criteria: Criteria::default(),
        date: Some("14-05-2021".to_string()),
        repeat: false,
    };
    let outcome: CycleOutcome = poller.run_cycle(&options).await;

    assert_eq!(outcome.locations_failed, 1);
    assert_eq!(outcome.locations_with_matches, 1);
    assert_eq!(outcome.emails_sent, 1);
    assert_eq!(bodies.lock().unwrap().len(), 1);
}

/// A bounced email leaves the location counted as a match; only the
/// dedicated mail counter records the failure, and nothing is sent.
#[tokio::test]
async fn bounced_mail_is_not_a_location_failure() {
    let district: LocationQuery = LocationQuery::district("395").unwrap();
    let source = ScriptedSource::new(HashMap::from([(
        district.clone(),
        Scripted::Centers(vec![center_with_session(
            "Civil Hospital",
            session(5, 5, 0, 45),
        )]),
    )]));
    let mut poller = Poller::new(
        Arc::new(source),
        DedupNotifier::new(Some(failing_transport())),
    );

    let outcome: CycleOutcome = poller
        .run_cycle(&options_for(district, Criteria::default()))
        .await;

    assert_eq!(outcome.locations_with_matches, 1);
    assert_eq!(outcome.mail_failures, 1);
    assert_eq!(outcome.locations_failed, 0);
    assert_eq!(outcome.emails_sent, 0);
}

/// Without recipients the pipeline still reports matches but never mails.
#[tokio::test]
async fn no_recipients_means_console_only() {
    let district: LocationQuery = LocationQuery::district("395").unwrap();
    let source = ScriptedSource::new(HashMap::from([(
            district.clone(),
            Scripted::Centers(vec![center_with_session(
                "Civil Hospital",
                session(5, 5, 0, 45),
            )]),
        )]));
    let mut poller = Poller::new(Arc::new(source), DedupNotifier::new(None));

    let outcome: CycleOutcome = poller
        .run_cycle(&options_for(district, Criteria::default()))
        .await;

    assert_eq!(outcome.locations_with_matches, 1);
    assert_eq!(outcome.emails_sent, 0);
}
