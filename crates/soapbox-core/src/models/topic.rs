//! Grievance topics, discussion posts and poll data.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Sentiment classification attached to posts by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

/// One row of the topic feed (`GET /api/topics`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub sentiment_score: i64,
    #[serde(default)]
    pub positive_count: i64,
    #[serde(default)]
    pub negative_count: i64,
    #[serde(default)]
    pub has_poll: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    /// The backend emits naive UTC timestamps (no offset suffix).
    pub created_at: NaiveDateTime,
}

impl TopicSummary {
    pub fn is_high_priority(&self) -> bool {
        self.priority.as_deref() == Some("high")
    }
}

/// A single discussion post within a topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub content: String,
    #[serde(default)]
    pub sentiment: Sentiment,
    pub created_at: NaiveDateTime,
}

/// One selectable poll option with its running tally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollOption {
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub votes: i64,
}

/// Poll attached to a topic, present only when `has_poll` was set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poll {
    pub question: Option<String>,
    #[serde(default)]
    pub options: Vec<PollOption>,
}

/// Full topic view (`GET /api/topics/{id}`), posts newest-first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicDetail {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub sentiment_score: i64,
    #[serde(default)]
    pub positive_count: i64,
    #[serde(default)]
    pub negative_count: i64,
    #[serde(default)]
    pub distilled_points: Option<String>,
    #[serde(default)]
    pub poll: Option<Poll>,
    #[serde(default)]
    pub posts: Vec<Post>,
}

impl TopicDetail {
    pub fn post_count(&self) -> usize {
        self.posts.len()
    }
}

/// Request body for `POST /api/topics`.
#[derive(Debug, Clone, Serialize, Default)]
pub struct NewTopic {
    pub title: String,
    pub tags: Vec<String>,
    pub has_poll: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_question: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub poll_options: Vec<String>,
}

/// Response to topic creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedTopic {
    pub topic_id: i64,
}

/// Response to `POST /api/posts` - the backend analyzes the post inline.
#[derive(Debug, Clone, Deserialize)]
pub struct PostReceipt {
    pub post_id: i64,
    #[serde(default)]
    pub sentiment: Sentiment,
}
