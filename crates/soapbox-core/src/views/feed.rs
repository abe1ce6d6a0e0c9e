//! Topic feed controller: the list every signed-in member lands on.

use crate::api::ApiError;
use crate::auth::{Session, SessionStatus};
use crate::models::TopicSummary;

use super::fetch::{FetchState, FetchTicket, GateDecision, GatedFetch};

/// Gated fetch of `GET /api/topics`.
#[derive(Debug)]
pub struct TopicFeed {
    fetch: GatedFetch<Vec<TopicSummary>>,
}

impl TopicFeed {
    pub fn new() -> Self {
        Self {
            fetch: GatedFetch::new(),
        }
    }

    pub fn state(&self) -> &FetchState<Vec<TopicSummary>> {
        self.fetch.state()
    }

    /// Apply the gate: wait for resolution, redirect anonymous users, fetch
    /// exactly once otherwise.
    pub fn plan(&mut self, session: &Session) -> GateDecision {
        match session.status() {
            SessionStatus::Resolving => GateDecision::Wait,
            SessionStatus::Anonymous => GateDecision::SignIn,
            SessionStatus::Authenticated => {
                if self.fetch.is_idle() {
                    GateDecision::Fetch(self.fetch.begin())
                } else {
                    GateDecision::Settled
                }
            }
        }
    }

    /// Apply a completed fetch; stale tickets are dropped.
    pub fn apply(&mut self, ticket: FetchTicket, result: Result<Vec<TopicSummary>, ApiError>) -> bool {
        self.fetch.apply(ticket, result)
    }

    /// Drop the loaded list and fetch again on the next plan (manual
    /// refresh, or after creating a topic).
    pub fn refresh(&mut self) {
        self.fetch.invalidate();
    }
}

impl Default for TopicFeed {
    fn default() -> Self {
        Self::new()
    }
}
