//! Fetch gating and cancellation machinery shared by all view controllers.
//!
//! Every consumer that needs the session follows the same rule: wait while
//! the session is resolving, redirect when it is anonymous, then issue
//! exactly one request. Results are tagged with a generation number so a
//! response that arrives after its view moved on is discarded instead of
//! being applied to state that no longer exists.

use crate::api::ApiError;

/// Display state of a gated fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    /// Eligible but not yet requested.
    Idle,
    /// Request in flight.
    Pending,
    /// Data arrived.
    Ready(T),
    /// The request failed; holds the user-facing message.
    Failed(String),
    /// A precondition is unmet; the widget stays hidden. Terminal until an
    /// input changes.
    Hidden,
}

impl<T> FetchState<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, FetchState::Ready(_))
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self, FetchState::Hidden)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            FetchState::Ready(data) => Some(data),
            _ => None,
        }
    }
}

/// Tag for one issued request. Compared on apply; stale tickets lose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

/// What a view controller wants done right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Session still resolving: render a neutral waiting state, issue
    /// nothing - not even requests that would work anonymously.
    Wait,
    /// The view requires authentication and the session is anonymous.
    SignIn,
    /// Issue exactly one request, tagged with this ticket.
    Fetch(FetchTicket),
    /// Nothing to do: already pending, ready, failed or hidden.
    Settled,
}

/// State plus generation counter behind each view controller.
#[derive(Debug)]
pub(crate) struct GatedFetch<T> {
    state: FetchState<T>,
    generation: u64,
}

impl<T> GatedFetch<T> {
    pub(crate) fn new() -> Self {
        Self {
            state: FetchState::Idle,
            generation: 0,
        }
    }

    pub(crate) fn state(&self) -> &FetchState<T> {
        &self.state
    }

    /// Mark the fetch as in flight and hand out its ticket.
    pub(crate) fn begin(&mut self) -> FetchTicket {
        self.state = FetchState::Pending;
        FetchTicket {
            generation: self.generation,
        }
    }

    /// Inputs changed: cancel whatever is in flight and start over. Any
    /// response carrying an older ticket will be discarded on apply.
    pub(crate) fn invalidate(&mut self) {
        self.generation += 1;
        self.state = FetchState::Idle;
    }

    /// Settle into the hidden terminal state (precondition unmet).
    pub(crate) fn hide(&mut self) {
        self.generation += 1;
        self.state = FetchState::Hidden;
    }

    pub(crate) fn is_idle(&self) -> bool {
        matches!(self.state, FetchState::Idle)
    }

    /// Apply a completed fetch. Returns false when the ticket is stale and
    /// the result was dropped.
    pub(crate) fn apply(&mut self, ticket: FetchTicket, result: Result<T, ApiError>) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        self.state = match result {
            Ok(data) => FetchState::Ready(data),
            Err(e) => FetchState::Failed(e.message()),
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_matching_ticket() {
        let mut fetch: GatedFetch<i32> = GatedFetch::new();
        let ticket = fetch.begin();
        assert!(fetch.apply(ticket, Ok(5)));
        assert_eq!(fetch.state().data(), Some(&5));
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let mut fetch: GatedFetch<i32> = GatedFetch::new();
        let stale = fetch.begin();
        fetch.invalidate();

        assert!(!fetch.apply(stale, Ok(5)));
        assert!(fetch.is_idle());

        // The replacement fetch still works
        let fresh = fetch.begin();
        assert!(fetch.apply(fresh, Ok(6)));
        assert_eq!(fetch.state().data(), Some(&6));
    }

    #[test]
    fn test_failure_carries_message() {
        let mut fetch: GatedFetch<i32> = GatedFetch::new();
        let ticket = fetch.begin();
        fetch.apply(ticket, Err(ApiError::Protocol("bad shape".into())));
        assert_eq!(fetch.state(), &FetchState::Failed("bad shape".into()));
    }

    #[test]
    fn test_hide_invalidates_in_flight_request() {
        let mut fetch: GatedFetch<i32> = GatedFetch::new();
        let ticket = fetch.begin();
        fetch.hide();
        assert!(!fetch.apply(ticket, Ok(1)));
        assert!(fetch.state().is_hidden());
    }
}
