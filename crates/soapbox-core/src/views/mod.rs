//! View controllers: the consumers of the session layer.
//!
//! Each controller owns the fetch lifecycle for one surface of the app and
//! applies the dependent-fetch gate: no protected request leaves while the
//! session is resolving, anonymous users are routed to sign-in, and once
//! the session is terminal each eligible view issues exactly one request.
//! Results are generation-tagged so responses superseded by navigation are
//! discarded.

pub mod feed;
pub mod fetch;
pub mod insights;
pub mod moderation;
pub mod topic;

pub use feed::TopicFeed;
pub use fetch::{FetchState, FetchTicket, GateDecision};
pub use insights::{InsightPanel, MIN_POSTS_FOR_INSIGHTS};
pub use moderation::ModerationPane;
pub use topic::TopicPane;
