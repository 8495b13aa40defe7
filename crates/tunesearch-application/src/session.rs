// SPDX-License-Identifier: GPL-3.0-or-later

//! Ownership of the visible result set.
//!
//! A [`SearchSession`] is owned by exactly one task. Searches run on spawned
//! tasks and report back over a channel; the owner pulls completions with
//! [`SearchSession::next_completion`] and feeds them to
//! [`SearchSession::apply`], which is the only code that writes the result
//! set.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tunesearch_config::StaleResponses;
use tunesearch_itunes::{Outcome, QueryClient, SearchError, SearchResult};

/// Handling of completions that belong to a search older than the latest one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StalePolicy {
    /// Only the most recently issued search may update the result set.
    #[default]
    Discard,
    /// Every completion is applied as it arrives, so the last one to finish
    /// wins even if it was issued earlier.
    ApplyAll,
}

impl From<StaleResponses> for StalePolicy {
    fn from(value: StaleResponses) -> Self {
        match value {
            StaleResponses::Discard => StalePolicy::Discard,
            StaleResponses::Apply => StalePolicy::ApplyAll,
        }
    }
}

/// A finished search, tagged with the generation it was issued under.
#[derive(Debug)]
pub struct Completion {
    pub generation: u64,
    pub term: String,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// The term was empty; the result set was cleared and nothing was sent.
    Cleared,
    /// A request is in flight under this generation.
    Issued(u64),
}

/// Effect of applying a completion (or an empty-term search) to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// The result set was replaced and now holds this many tracks.
    Replaced(usize),
    /// The result set was cleared by an empty term.
    Cleared,
    /// The search failed; the result set is unchanged.
    Failed(SearchError),
    /// A newer search was issued since; the completion was dropped.
    Stale,
}

pub struct SearchSession {
    client: QueryClient,
    policy: StalePolicy,
    results: SearchResult,
    generation: u64,
    in_flight: usize,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
}

impl SearchSession {
    pub fn new(client: QueryClient, policy: StalePolicy) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            client,
            policy,
            results: SearchResult::empty(),
            generation: 0,
            in_flight: 0,
            tx,
            rx,
        }
    }

    /// Start a search for `term`.
    ///
    /// An empty term clears the result set immediately. Any other term is
    /// searched on a spawned task whose [`Completion`] arrives through
    /// [`next_completion`](Self::next_completion). Must be called from within
    /// a tokio runtime.
    pub fn submit(&mut self, term: &str) -> Submission {
        self.generation += 1;
        let generation = self.generation;

        if term.is_empty() {
            debug!(target: "session", generation, "empty term, clearing results");
            self.results = SearchResult::empty();
            return Submission::Cleared;
        }

        debug!(target: "session", generation, %term, "issuing search");
        self.in_flight += 1;

        let client = self.client.clone();
        let tx = self.tx.clone();
        let term = term.to_string();
        tokio::spawn(async move {
            let outcome = client.search(&term).await;
            // Fails only when the session has been dropped.
            let _ = tx.send(Completion {
                generation,
                term,
                outcome,
            });
        });

        Submission::Issued(generation)
    }

    /// Wait for the next finished search.
    ///
    /// Never returns `None` while the session is alive, but pends forever if
    /// nothing is in flight; check [`in_flight`](Self::in_flight) first or
    /// race it against other events.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.rx.recv().await
    }

    /// Apply a completion to the result set according to the stale policy.
    pub fn apply(&mut self, completion: Completion) -> Applied {
        self.in_flight = self.in_flight.saturating_sub(1);

        let Completion {
            generation,
            term,
            outcome,
        } = completion;

        if self.policy == StalePolicy::Discard && generation != self.generation {
            debug!(
                target: "session",
                generation,
                latest = self.generation,
                %term,
                "discarding stale completion"
            );
            return Applied::Stale;
        }

        match outcome {
            Ok(result) => {
                let count = result.len();
                self.results = result;
                info!(target: "session", generation, %term, tracks = count, "results updated");
                Applied::Replaced(count)
            }
            Err(err) => {
                warn!(target: "session", generation, %term, error = %err, "search failed");
                Applied::Failed(err)
            }
        }
    }

    /// Submit `term` and apply completions until its own has been applied.
    ///
    /// Earlier completions that arrive first are applied on the way.
    pub async fn search(&mut self, term: &str) -> Applied {
        let generation = match self.submit(term) {
            Submission::Cleared => return Applied::Cleared,
            Submission::Issued(generation) => generation,
        };

        loop {
            // The session owns a sender, so the channel cannot close here.
            let Some(completion) = self.next_completion().await else {
                unreachable!("completion channel closed while the session holds a sender");
            };
            let ours = completion.generation == generation;
            let applied = self.apply(completion);
            if ours {
                return applied;
            }
        }
    }

    /// The result set currently on display.
    pub fn results(&self) -> &SearchResult {
        &self.results
    }

    pub fn latest_generation(&self) -> u64 {
        self.generation
    }

    /// Number of searches issued whose completion has not been applied yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn policy(&self) -> StalePolicy {
        self.policy
    }
}
