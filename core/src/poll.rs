//! # Poll Orchestrator
//!
//! Drives the fetch, filter, notify pipeline across all requested
//! locations, one concurrent task per location per cycle.
//!
//! A failing location is logged and skipped; its siblings always run to
//! completion. Between cycles the orchestrator sleeps for a jittered
//! duration so repeated runs do not hit the remote API in lockstep: a
//! long wait after a cycle that sent mail, a short one otherwise.

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use rand::Rng;
use tokio::task::JoinSet;
use tracing::{error, info};
use vaxwatch_common::location::LocationQuery;
use vaxwatch_common::model::Center;

use crate::fetch::{CenterSource, FetchError};
use crate::filter::{self, Criteria, Predicate};
use crate::message;
use crate::notify::DedupNotifier;

/// Wait bounds after a cycle that emailed, to avoid re-notifying the
/// same slots immediately.
pub const NOTIFIED_WAIT_SECS: RangeInclusive<u64> = 1200..=2400;
/// Wait bounds while nothing is available.
pub const IDLE_WAIT_SECS: RangeInclusive<u64> = 45..=90;

/// The validated inputs for a polling run.
#[derive(Clone, Debug)]
pub struct PollOptions {
    pub queries: Vec<LocationQuery>,
    pub criteria: Criteria,
    /// Appointment date (dd-mm-yyyy); today when unset, re-evaluated
    /// each cycle.
    pub date: Option<String>,
    /// Keep polling forever instead of running a single cycle.
    pub repeat: bool,
}

/// What one cycle accomplished.
///
/// The failure counters are disjoint: `locations_failed` covers fetch
/// errors and task panics, while a matching location whose email
/// bounced still counts as a match and is tallied under
/// `mail_failures` instead.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleOutcome {
    pub emails_sent: u32,
    pub locations_with_matches: u32,
    pub locations_failed: u32,
    pub mail_failures: u32,
}

/// Owns the pipeline collaborators and loops over cycles.
pub struct Poller {
    source: Arc<dyn CenterSource>,
    notifier: DedupNotifier,
}

impl Poller {
    pub fn new(source: Arc<dyn CenterSource>, notifier: DedupNotifier) -> Self {
        Self { source, notifier }
    }

    pub async fn run(&mut self, options: &PollOptions) -> anyhow::Result<()> {
        loop {
            let outcome: CycleOutcome = self.run_cycle(options).await;
            if !options.repeat {
                break;
            }
            let wait: Duration = draw_wait(outcome.emails_sent > 0);
            info!(
                seconds = wait.as_secs(),
                "cycle complete, waiting before the next poll"
            );
            tokio::time::sleep(wait).await;
        }
        Ok(())
    }

    /// Runs one full pass over all locations and reports what happened.
    ///
    /// Fetch and filter run concurrently per location; results are
    /// handled here as they complete, so the dedup state has a single
    /// writer.
    pub async fn run_cycle(&mut self, options: &PollOptions) -> CycleOutcome {
        let date: String = options
            .date
            .clone()
            .unwrap_or_else(today);
        let chain: Vec<Predicate> = options.criteria.chain();

        let mut tasks: JoinSet<(LocationQuery, Result<Vec<Center>, FetchError>)> = JoinSet::new();
        for query in options.queries.clone() {
            let source: Arc<dyn CenterSource> = self.source.clone();
            let date: String = date.clone();
            let chain: Vec<Predicate> = chain.clone();
            tasks.spawn(async move {
                let outcome = source
                    .fetch(&query, &date)
                    .await
                    .map(|centers| filter::apply_chain(centers, &chain));
                (query, outcome)
            });
        }

        let mut outcome = CycleOutcome::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((query, Ok(centers))) if !centers.is_empty() => {
                    outcome.locations_with_matches += 1;
                    let (body, fingerprint) = message::format_message(&centers);
                    println!("{body}");
                    match self.notifier.notify_if_new(&fingerprint, &body).await {
                        Ok(true) => outcome.emails_sent += 1,
                        Ok(false) => {}
                        Err(e) => {
                            outcome.mail_failures += 1;
                            error!(location = %query, "failed to send notification: {e}");
                        }
                    }
                }
                Ok((query, Ok(_))) => {
                    println!(
                        "{} - {} - No vaccine appointments available at this time.",
                        Local::now().format("%Y-%m-%d %H:%M:%S"),
                        query
                    );
                }
                Ok((query, Err(e))) => {
                    outcome.locations_failed += 1;
                    error!(location = %query, "fetch failed: {e}");
                }
                Err(join_error) => {
                    outcome.locations_failed += 1;
                    error!("location task failed to complete: {join_error}");
                }
            }
        }
        outcome
    }
}

/// Draws the jittered inter-cycle wait for the branch taken.
pub fn draw_wait(notified: bool) -> Duration {
    let bounds: RangeInclusive<u64> = if notified {
        NOTIFIED_WAIT_SECS
    } else {
        IDLE_WAIT_SECS
    };
    Duration::from_secs(rand::rng().random_range(bounds))
}

fn today() -> String {
    Local::now().format("%d-%m-%Y").to_string()
}
