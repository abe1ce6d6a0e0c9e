//! AI insight widget controller.
//!
//! Insight widgets (summary, escalation risk, sentiment timeline, similar
//! topics) carry a second precondition on top of the session gate: a topic
//! with fewer than `MIN_POSTS_FOR_INSIGHTS` posts has nothing worth
//! analyzing, so the widget settles hidden instead of calling the backend.
//! The precondition is re-evaluated whenever the topic, the post count or
//! the session status changes.

use crate::api::ApiError;
use crate::auth::{Session, SessionStatus};

use super::fetch::{FetchState, FetchTicket, GateDecision, GatedFetch};

/// Minimum number of posts before an AI artifact is requested.
/// Below this the model has too little discussion to summarize.
pub const MIN_POSTS_FOR_INSIGHTS: usize = 3;

/// One gated AI widget; `T` is the insight payload it displays.
#[derive(Debug)]
pub struct InsightPanel<T> {
    topic_id: Option<i64>,
    post_count: Option<usize>,
    fetch: GatedFetch<T>,
}

impl<T> InsightPanel<T> {
    pub fn new() -> Self {
        Self {
            topic_id: None,
            post_count: None,
            fetch: GatedFetch::new(),
        }
    }

    pub fn state(&self) -> &FetchState<T> {
        self.fetch.state()
    }

    /// Point the widget at a topic. The post count is unknown until the
    /// topic detail arrives, so the widget waits rather than guessing.
    pub fn set_topic(&mut self, topic_id: i64) {
        if self.topic_id == Some(topic_id) {
            return;
        }
        self.topic_id = Some(topic_id);
        self.post_count = None;
        self.fetch.invalidate();
    }

    pub fn clear(&mut self) {
        self.topic_id = None;
        self.post_count = None;
        self.fetch.invalidate();
    }

    /// Update the known post count (from the topic detail, or after a new
    /// post lands). A change re-evaluates the threshold: a hidden widget
    /// can become eligible and vice versa.
    pub fn set_post_count(&mut self, count: usize) {
        if self.post_count == Some(count) {
            return;
        }
        self.post_count = Some(count);
        self.fetch.invalidate();
    }

    pub fn plan(&mut self, session: &Session) -> GateDecision {
        if self.topic_id.is_none() {
            return GateDecision::Settled;
        }
        match session.status() {
            SessionStatus::Resolving => GateDecision::Wait,
            SessionStatus::Anonymous => GateDecision::SignIn,
            SessionStatus::Authenticated => match self.post_count {
                // Post count not known yet: the topic detail is still
                // loading. Deterministically wait instead of racing it.
                None => GateDecision::Wait,
                Some(count) if count < MIN_POSTS_FOR_INSIGHTS => {
                    if !self.fetch.state().is_hidden() {
                        self.fetch.hide();
                    }
                    GateDecision::Settled
                }
                Some(_) => {
                    if self.fetch.is_idle() {
                        GateDecision::Fetch(self.fetch.begin())
                    } else {
                        GateDecision::Settled
                    }
                }
            },
        }
    }

    pub fn apply(&mut self, ticket: FetchTicket, result: Result<T, ApiError>) -> bool {
        self.fetch.apply(ticket, result)
    }
}

impl<T> Default for InsightPanel<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AiSummary, Role};
    use crate::views::testutil::{authenticated_session, resolving_session};

    fn summary(topic_id: i64) -> AiSummary {
        AiSummary {
            topic_id,
            summary: "heated but constructive".to_string(),
            post_count: 4,
            generated_at: None,
        }
    }

    #[test]
    fn test_below_threshold_hides_without_network() {
        let session = authenticated_session(Role::User);
        for count in 0..MIN_POSTS_FOR_INSIGHTS {
            let mut panel: InsightPanel<AiSummary> = InsightPanel::new();
            panel.set_topic(1);
            panel.set_post_count(count);

            assert_eq!(panel.plan(&session), GateDecision::Settled, "count {}", count);
            assert!(panel.state().is_hidden(), "count {}", count);
        }
    }

    #[test]
    fn test_at_threshold_fetches() {
        let session = authenticated_session(Role::User);
        let mut panel: InsightPanel<AiSummary> = InsightPanel::new();
        panel.set_topic(1);
        panel.set_post_count(MIN_POSTS_FOR_INSIGHTS);

        let GateDecision::Fetch(ticket) = panel.plan(&session) else {
            panic!("expected fetch at threshold");
        };
        assert!(panel.apply(ticket, Ok(summary(1))));
        assert!(panel.state().is_ready());
        assert_eq!(panel.plan(&session), GateDecision::Settled);
    }

    #[test]
    fn test_threshold_applies_after_session_gate() {
        // Most defensive ordering: resolution first, then the threshold
        let mut panel: InsightPanel<AiSummary> = InsightPanel::new();
        panel.set_topic(1);
        panel.set_post_count(10);
        assert_eq!(panel.plan(&resolving_session()), GateDecision::Wait);
    }

    #[test]
    fn test_unknown_post_count_waits() {
        let session = authenticated_session(Role::User);
        let mut panel: InsightPanel<AiSummary> = InsightPanel::new();
        panel.set_topic(1);
        assert_eq!(panel.plan(&session), GateDecision::Wait);
    }

    #[test]
    fn test_hidden_widget_becomes_eligible_when_discussion_grows() {
        let session = authenticated_session(Role::User);
        let mut panel: InsightPanel<AiSummary> = InsightPanel::new();
        panel.set_topic(1);
        panel.set_post_count(2);
        panel.plan(&session);
        assert!(panel.state().is_hidden());

        panel.set_post_count(3);
        assert!(matches!(panel.plan(&session), GateDecision::Fetch(_)));
    }

    #[test]
    fn test_topic_switch_drops_stale_insight() {
        let session = authenticated_session(Role::User);
        let mut panel: InsightPanel<AiSummary> = InsightPanel::new();
        panel.set_topic(1);
        panel.set_post_count(5);
        let GateDecision::Fetch(stale) = panel.plan(&session) else {
            panic!("expected fetch");
        };

        panel.set_topic(2);
        assert!(!panel.apply(stale, Ok(summary(1))));
        assert!(!panel.state().is_ready());
    }
}
