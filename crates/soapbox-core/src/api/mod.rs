//! REST API client module for the Soapbox backend.
//!
//! This module provides the `ApiClient` for talking to the grievance
//! platform: authentication, topics and posts, poll votes, moderation and
//! AI insight endpoints.
//!
//! The backend uses JWT bearer token authentication; the token is obtained
//! from `/auth/login` and attached to every protected request.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
