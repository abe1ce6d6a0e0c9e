//! Soapbox core: client session and authorized-request layer for the
//! Soapbox grievance platform.
//!
//! The crate is organized around one lifecycle: at startup the persisted
//! bearer token (if any) is resolved against the backend into a terminal
//! session status, and only then do the view controllers start issuing
//! protected requests. The pieces:
//!
//! - [`auth`] - the session state machine, token persistence and the
//!   gateway trait the state machine drives
//! - [`api`] - the HTTP client; one dispatch path, typed responses
//! - [`models`] - wire types for topics, posts, users and AI insights
//! - [`views`] - per-surface fetch controllers applying the session gate
//! - [`app`] - the coordinator that owns all of the above
//! - [`config`] - on-disk settings and the backend base URL

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod models;
pub mod views;

pub use api::{ApiClient, ApiError};
pub use app::{App, Surface};
pub use auth::{AuthGateway, Session, SessionManager, SessionStatus, TokenStore};
pub use config::Config;
