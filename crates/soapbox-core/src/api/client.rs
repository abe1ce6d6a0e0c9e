//! HTTP client for the Soapbox backend.
//!
//! All requests funnel through a single dispatch path that attaches the
//! bearer token only when one is supplied and parses every response body as
//! JSON, success or failure. Public methods return typed models; raw JSON
//! never escapes this module.

use anyhow::Result;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::auth::{AuthGateway, LoginOutcome};
use crate::models::{
    AiSummary, CreatedTopic, ModerationInsights, NewTopic, PostReceipt, Profile, RiskPrediction,
    Role, SentimentTimeline, SimilarTopics, TopicDetail, TopicSummary,
};

use super::ApiError;

/// HTTP request timeout in seconds.
/// The insight endpoints call out to a language model and can be slow.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default number of similar topics to request.
const DEFAULT_SIMILAR_LIMIT: usize = 5;

/// API client for the Soapbox backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client against the given base URL.
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Dispatch one request. The token is attached as `Authorization: Bearer`
    /// only when present; an empty or malformed header is never sent. The
    /// body is parsed as JSON regardless of status code.
    ///
    /// The typed methods below are preferred; this is the escape hatch for
    /// endpoints without a model yet.
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, path, authorized = token.is_some(), "dispatching request");

        let mut request = self.http.request(method, &url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        let payload: Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) => {
                warn!(path, %status, error = %e, "response body is not JSON");
                return Err(ApiError::protocol("response body is not JSON", &text));
            }
        };

        if status.is_success() {
            Ok(payload)
        } else {
            debug!(path, %status, "request failed");
            Err(ApiError::Http {
                status: status.as_u16(),
                payload,
            })
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> Result<T, ApiError> {
        let value = self.call(Method::GET, path, None, token).await?;
        decode(path, value)
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        let value = self.call(Method::POST, path, Some(body), token).await?;
        decode(path, value)
    }

    // ===== Topics =====

    /// Fetch the topic feed, newest first.
    pub async fn list_topics(&self, token: &str) -> Result<Vec<TopicSummary>, ApiError> {
        self.get("/api/topics", Some(token)).await
    }

    /// Fetch one topic with its posts and poll.
    pub async fn topic_detail(&self, token: &str, topic_id: i64) -> Result<TopicDetail, ApiError> {
        self.get(&format!("/api/topics/{}", topic_id), Some(token)).await
    }

    /// Open a new grievance topic, optionally with a poll.
    pub async fn create_topic(&self, token: &str, topic: &NewTopic) -> Result<CreatedTopic, ApiError> {
        let body = serde_json::to_value(topic)
            .map_err(|e| ApiError::Protocol(format!("failed to encode topic: {}", e)))?;
        self.post("/api/topics", &body, Some(token)).await
    }

    /// Add a post to a topic. The backend analyzes sentiment inline.
    pub async fn add_post(
        &self,
        token: &str,
        topic_id: i64,
        content: &str,
    ) -> Result<PostReceipt, ApiError> {
        let body = json!({ "topic_id": topic_id, "content": content });
        self.post("/api/posts", &body, Some(token)).await
    }

    /// Cast a poll vote. The backend rejects duplicates with a 400.
    pub async fn vote_poll(&self, token: &str, option_id: i64) -> Result<(), ApiError> {
        let body = json!({ "option_id": option_id });
        self.call(Method::POST, "/api/poll/vote", Some(&body), Some(token))
            .await?;
        Ok(())
    }

    // ===== Moderation =====

    /// Fetch the AI moderation view of a topic. Moderator or admin only.
    pub async fn moderation_insights(
        &self,
        token: &str,
        topic_id: i64,
    ) -> Result<ModerationInsights, ApiError> {
        self.get(&format!("/api/moderation/topic/{}", topic_id), Some(token))
            .await
    }

    /// Mark a topic as high priority. Moderator or admin only.
    pub async fn set_priority(&self, token: &str, topic_id: i64) -> Result<(), ApiError> {
        self.call(
            Method::POST,
            &format!("/api/moderation/topic/{}/priority", topic_id),
            Some(&json!({})),
            Some(token),
        )
        .await?;
        Ok(())
    }

    // ===== AI insights =====

    pub async fn ai_summary(&self, token: &str, topic_id: i64) -> Result<AiSummary, ApiError> {
        self.get(&format!("/api/ai/summary/{}", topic_id), Some(token)).await
    }

    pub async fn sentiment_timeline(
        &self,
        token: &str,
        topic_id: i64,
    ) -> Result<SentimentTimeline, ApiError> {
        self.get(&format!("/api/ai/sentiment-timeline/{}", topic_id), Some(token))
            .await
    }

    pub async fn risk_prediction(
        &self,
        token: &str,
        topic_id: i64,
    ) -> Result<RiskPrediction, ApiError> {
        self.get(&format!("/api/ai/predictions/{}", topic_id), Some(token))
            .await
    }

    pub async fn similar_topics(
        &self,
        token: &str,
        topic_id: i64,
        limit: Option<usize>,
    ) -> Result<SimilarTopics, ApiError> {
        let limit = limit.unwrap_or(DEFAULT_SIMILAR_LIMIT);
        self.get(
            &format!("/api/ai/similar/{}?limit={}", topic_id, limit),
            Some(token),
        )
        .await
    }
}

/// Decode a parsed JSON value into a typed model, or report the contract
/// violation as a protocol error.
fn decode<T: DeserializeOwned>(path: &str, value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| {
        warn!(path, error = %e, "response JSON does not match the expected shape");
        ApiError::Protocol(format!("unexpected response shape from {}: {}", path, e))
    })
}

// Auth endpoints are exposed through the gateway trait so the session state
// machine can be exercised against an in-memory fake in tests.
#[async_trait::async_trait]
impl AuthGateway for ApiClient {
    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, ApiError> {
        #[derive(serde::Deserialize)]
        struct LoginResponse {
            access_token: String,
            user: Profile,
        }

        let body = json!({ "email": email, "password": password });
        let response: LoginResponse = self.post("/auth/login", &body, None).await?;
        Ok(LoginOutcome {
            token: response.access_token,
            user: response.user,
        })
    }

    async fn register(&self, email: &str, password: &str, role: Role) -> Result<(), ApiError> {
        let body = json!({ "email": email, "password": password, "role": role.as_str() });
        self.call(Method::POST, "/auth/register", Some(&body), None)
            .await?;
        Ok(())
    }

    async fn current_user(&self, token: &str) -> Result<Profile, ApiError> {
        self.get("/auth/me", Some(token)).await
    }
}
