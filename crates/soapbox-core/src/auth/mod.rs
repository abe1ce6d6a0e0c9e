//! Authentication module: session lifecycle and credential persistence.
//!
//! This module provides:
//! - `TokenStore`: durable storage for the opaque bearer token
//! - `Session` / `SessionManager`: the client session state machine
//! - `AuthGateway`: the network seam the state machine drives
//!
//! The token is persisted as a single raw string and revalidated against
//! `/auth/me` on startup.

pub mod credentials;
pub mod gateway;
pub mod session;

pub use credentials::TokenStore;
pub use gateway::{AuthGateway, LoginOutcome};
pub use session::{Session, SessionManager, SessionStatus};
