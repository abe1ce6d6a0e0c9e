//! Data models for Soapbox entities.
//!
//! Everything here is a typed mirror of what the backend returns; raw
//! `serde_json::Value` never leaves the API client. Grouped as:
//!
//! - `Profile`, `Role`: the authenticated user
//! - `TopicSummary`, `TopicDetail`, `Post`, `Poll`: grievance discussions
//! - Insight types: AI-derived artifacts displayed next to topics

pub mod insight;
pub mod topic;
pub mod user;

pub use insight::{
    AiSummary, ModerationInsights, RiskAssessment, RiskFactors, RiskPrediction, SentimentPoint,
    SentimentTimeline, SimilarTopic, SimilarTopics,
};
pub use topic::{
    CreatedTopic, NewTopic, Poll, PollOption, Post, PostReceipt, Sentiment, TopicDetail,
    TopicSummary,
};
pub use user::{Profile, Role};
