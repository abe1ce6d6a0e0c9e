//! AI-derived insight payloads shown alongside topics.
//!
//! These mirror the JSON the backend's insight endpoints return. The widgets
//! that display them are gated twice: on session resolution and on a
//! minimum-discussion threshold (see `views::insights`).

use chrono::NaiveDateTime;
use serde::Deserialize;

/// `GET /api/ai/summary/{topic_id}` - generated discussion summary.
#[derive(Debug, Clone, Deserialize)]
pub struct AiSummary {
    pub topic_id: i64,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub post_count: usize,
    pub generated_at: Option<NaiveDateTime>,
}

/// One sample of the sentiment timeline.
#[derive(Debug, Clone, Deserialize)]
pub struct SentimentPoint {
    pub timestamp: NaiveDateTime,
    pub score: f64,
    #[serde(default)]
    pub moving_avg: Option<f64>,
}

/// `GET /api/ai/sentiment-timeline/{topic_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct SentimentTimeline {
    pub topic_id: i64,
    #[serde(default)]
    pub topic_title: String,
    #[serde(default)]
    pub timeline: Vec<SentimentPoint>,
    #[serde(default)]
    pub current_sentiment: i64,
}

/// Factor breakdown for the escalation-risk score.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RiskFactors {
    #[serde(default)]
    pub sentiment: f64,
    #[serde(default)]
    pub velocity: f64,
    #[serde(default)]
    pub negative_ratio: f64,
    #[serde(default)]
    pub recency: f64,
}

/// The prediction itself (nested under `predictions` on the wire).
#[derive(Debug, Clone, Deserialize)]
pub struct RiskAssessment {
    pub risk_score: f64,
    #[serde(default)]
    pub risk_level: String,
    #[serde(default)]
    pub factors: RiskFactors,
}

/// `GET /api/ai/predictions/{topic_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RiskPrediction {
    pub topic_id: i64,
    pub predictions: RiskAssessment,
}

/// A related topic found via embedding similarity.
#[derive(Debug, Clone, Deserialize)]
pub struct SimilarTopic {
    pub topic_id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub similarity: f64,
}

/// `GET /api/ai/similar/{topic_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct SimilarTopics {
    pub topic_id: i64,
    #[serde(default)]
    pub similar_topics: Vec<SimilarTopic>,
}

/// `GET /api/moderation/topic/{topic_id}` - moderator-only review panel.
#[derive(Debug, Clone, Deserialize)]
pub struct ModerationInsights {
    /// Topic title (the backend names this field `topic`).
    pub topic: String,
    #[serde(default)]
    pub sentiment_score: i64,
    #[serde(default)]
    pub negative_posts: i64,
    #[serde(default)]
    pub positive_posts: i64,
    #[serde(default)]
    pub ai_suggestions: String,
}
