//! Topic detail controller: one grievance with its posts and poll.

use crate::api::ApiError;
use crate::auth::{Session, SessionStatus};
use crate::models::TopicDetail;

use super::fetch::{FetchState, FetchTicket, GateDecision, GatedFetch};

/// Gated fetch of `GET /api/topics/{id}`.
#[derive(Debug)]
pub struct TopicPane {
    topic_id: Option<i64>,
    fetch: GatedFetch<TopicDetail>,
}

impl TopicPane {
    pub fn new() -> Self {
        Self {
            topic_id: None,
            fetch: GatedFetch::new(),
        }
    }

    pub fn topic_id(&self) -> Option<i64> {
        self.topic_id
    }

    pub fn state(&self) -> &FetchState<TopicDetail> {
        self.fetch.state()
    }

    /// Navigate to a topic. Switching topics cancels any fetch still in
    /// flight for the previous one; its late response will be discarded.
    pub fn set_topic(&mut self, topic_id: i64) {
        if self.topic_id == Some(topic_id) {
            return;
        }
        self.topic_id = Some(topic_id);
        self.fetch.invalidate();
    }

    /// Leave the detail view entirely.
    pub fn clear(&mut self) {
        self.topic_id = None;
        self.fetch.invalidate();
    }

    /// Refetch the current topic (after posting or voting).
    pub fn refresh(&mut self) {
        if self.topic_id.is_some() {
            self.fetch.invalidate();
        }
    }

    pub fn plan(&mut self, session: &Session) -> GateDecision {
        if self.topic_id.is_none() {
            return GateDecision::Settled;
        }
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

    pub fn apply(&mut self, ticket: FetchTicket, result: Result<TopicDetail, ApiError>) -> bool {
        self.fetch.apply(ticket, result)
    }
}

impl Default for TopicPane {
    fn default() -> Self {
        Self::new()
    }
}
