//! Moderation dashboard controller.
//!
//! Only moderators and admins may open this surface; for everyone else it
//! settles hidden without issuing the request (the backend would answer 403
//! anyway, but the gate never sends a call it knows will be refused).

use crate::api::ApiError;
use crate::auth::{Session, SessionStatus};
use crate::models::ModerationInsights;

use super::fetch::{FetchState, FetchTicket, GateDecision, GatedFetch};

/// Gated fetch of `GET /api/moderation/topic/{id}`.
#[derive(Debug)]
pub struct ModerationPane {
    topic_id: Option<i64>,
    fetch: GatedFetch<ModerationInsights>,
}

impl ModerationPane {
    pub fn new() -> Self {
        Self {
            topic_id: None,
            fetch: GatedFetch::new(),
        }
    }

    pub fn state(&self) -> &FetchState<ModerationInsights> {
        self.fetch.state()
    }

    pub fn set_topic(&mut self, topic_id: i64) {
        if self.topic_id == Some(topic_id) {
            return;
        }
        self.topic_id = Some(topic_id);
        self.fetch.invalidate();
    }

    pub fn clear(&mut self) {
        self.topic_id = None;
        self.fetch.invalidate();
    }

    pub fn plan(&mut self, session: &Session) -> GateDecision {
        if self.topic_id.is_none() {
            return GateDecision::Settled;
        }
        match session.status() {
            SessionStatus::Resolving => GateDecision::Wait,
            SessionStatus::Anonymous => GateDecision::SignIn,
            SessionStatus::Authenticated => {
                if !session.is_moderator() {
                    if !self.fetch.state().is_hidden() {
                        self.fetch.hide();
                    }
                    return GateDecision::Settled;
                }
                if self.fetch.is_idle() {
                    GateDecision::Fetch(self.fetch.begin())
                } else {
                    GateDecision::Settled
                }
            }
        }
    }

    pub fn apply(
        &mut self,
        ticket: FetchTicket,
        result: Result<ModerationInsights, ApiError>,
    ) -> bool {
        self.fetch.apply(ticket, result)
    }
}

impl Default for ModerationPane {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::views::testutil::{authenticated_session, resolving_session};

    #[test]
    fn test_hidden_for_plain_users() {
        let mut pane = ModerationPane::new();
        pane.set_topic(3);
        let session = authenticated_session(Role::User);

        assert_eq!(pane.plan(&session), GateDecision::Settled);
        assert!(pane.state().is_hidden());
        // Stays settled on re-plan
        assert_eq!(pane.plan(&session), GateDecision::Settled);
    }

    #[test]
    fn test_fetches_for_moderators_and_admins() {
        for role in [Role::Moderator, Role::Admin] {
            let mut pane = ModerationPane::new();
            pane.set_topic(3);
            let session = authenticated_session(role);
            assert!(
                matches!(pane.plan(&session), GateDecision::Fetch(_)),
                "{:?} must reach the dashboard",
                role
            );
        }
    }

    #[test]
    fn test_waits_for_resolution_even_with_topic_selected() {
        let mut pane = ModerationPane::new();
        pane.set_topic(3);
        assert_eq!(pane.plan(&resolving_session()), GateDecision::Wait);
    }
}
