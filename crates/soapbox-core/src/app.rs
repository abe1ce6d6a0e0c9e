//! Application coordinator.
//!
//! `App` wires the session manager, the API client and the view controllers
//! together. Fetches run as background tasks that report through an MPSC
//! channel; `process_outcomes` applies them on the owning task, so the
//! session and every view have a single writer.
//!
//! The ordering guarantee lives here: a fetch is only spawned when a view's
//! `plan` returned `Fetch`, and `plan` never does that before the session
//! reached a terminal status.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::{SessionManager, TokenStore};
use crate::config::Config;
use crate::models::{
    AiSummary, ModerationInsights, NewTopic, PostReceipt, RiskPrediction, Role, SentimentTimeline,
    SimilarTopics, TopicDetail, TopicSummary,
};
use crate::views::{FetchTicket, GateDecision, InsightPanel, ModerationPane, TopicFeed, TopicPane};

/// Buffer size for the fetch outcome channel.
/// A full sync spawns at most six fetches; 32 leaves plenty of headroom.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Completed background fetches, routed back to their view by variant.
enum FetchOutcome {
    Feed(FetchTicket, Result<Vec<TopicSummary>, ApiError>),
    Topic(FetchTicket, Result<TopicDetail, ApiError>),
    Moderation(FetchTicket, Result<ModerationInsights, ApiError>),
    Summary(FetchTicket, Result<AiSummary, ApiError>),
    Risk(FetchTicket, Result<RiskPrediction, ApiError>),
    Timeline(FetchTicket, Result<SentimentTimeline, ApiError>),
    Similar(FetchTicket, Result<SimilarTopics, ApiError>),
}

/// What the front end should show after a sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Session still resolving; render the neutral waiting state.
    Waiting,
    /// Anonymous and a view needs auth: show the sign-in form.
    SignIn,
    /// Normal content.
    Content,
}

/// Owns all client state; the single writer of session and views.
pub struct App {
    pub config: Config,
    pub auth: SessionManager,
    api: ApiClient,

    pub feed: TopicFeed,
    pub topic: TopicPane,
    pub moderation: ModerationPane,
    pub summary: InsightPanel<AiSummary>,
    pub risk: InsightPanel<RiskPrediction>,
    pub timeline: InsightPanel<SentimentTimeline>,
    pub similar: InsightPanel<SimilarTopics>,

    outcome_tx: mpsc::Sender<FetchOutcome>,
    outcome_rx: mpsc::Receiver<FetchOutcome>,
}

impl App {
    /// Create the app from on-disk config and token storage.
    pub fn new() -> anyhow::Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "failed to load config, using defaults");
                Config::default()
            }
        };
        let store = match config.data_dir() {
            Ok(dir) => TokenStore::new(Some(dir)),
            Err(e) => {
                warn!(error = %e, "no data directory, token will not persist");
                TokenStore::in_memory()
            }
        };
        Self::with_parts(config, store)
    }

    /// Assemble from explicit parts (tests inject an in-memory store).
    pub fn with_parts(config: Config, store: TokenStore) -> anyhow::Result<Self> {
        let api = ApiClient::new(&config.api_base_url)?;
        let (outcome_tx, outcome_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        Ok(Self {
            config,
            auth: SessionManager::new(store),
            api,
            feed: TopicFeed::new(),
            topic: TopicPane::new(),
            moderation: ModerationPane::new(),
            summary: InsightPanel::new(),
            risk: InsightPanel::new(),
            timeline: InsightPanel::new(),
            similar: InsightPanel::new(),
            outcome_tx,
            outcome_rx,
        })
    }

    // =========================================================================
    // Session lifecycle
    // =========================================================================

    /// Resolve the persisted credential into a terminal session status.
    /// Must complete before any dependent fetch is spawned.
    pub async fn initialize(&mut self) {
        self.auth.initialize(&self.api).await;
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), ApiError> {
        let result = self.auth.login(&self.api, email, password).await;
        if result.is_ok() {
            self.config.last_email = Some(email.to_string());
            if let Err(e) = self.config.save() {
                warn!(error = %e, "failed to save config");
            }
            // A different account may be signed in now
            self.reset_views();
        }
        result
    }

    pub async fn register(&self, email: &str, password: &str, role: Role) -> Result<(), ApiError> {
        self.auth.register(&self.api, email, password, role).await
    }

    pub fn logout(&mut self) {
        self.auth.logout();
        self.reset_views();
    }

    /// One-shot: true right after the backend rejected an established
    /// session, so the UI can explain the forced sign-out.
    pub fn take_expired_notice(&mut self) -> bool {
        self.auth.take_expired_notice()
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Open a topic: detail pane, moderation pane and every insight widget
    /// follow. In-flight fetches for the previous topic are cancelled.
    pub fn select_topic(&mut self, topic_id: i64) {
        self.topic.set_topic(topic_id);
        self.moderation.set_topic(topic_id);
        self.summary.set_topic(topic_id);
        self.risk.set_topic(topic_id);
        self.timeline.set_topic(topic_id);
        self.similar.set_topic(topic_id);
    }

    /// Return to the feed.
    pub fn close_topic(&mut self) {
        self.topic.clear();
        self.moderation.clear();
        self.summary.clear();
        self.risk.clear();
        self.timeline.clear();
        self.similar.clear();
    }

    fn reset_views(&mut self) {
        self.feed.refresh();
        self.close_topic();
    }

    // =========================================================================
    // Fetch scheduling
    // =========================================================================

    /// Run every view's gate and spawn the fetches it approved. Returns the
    /// surface the front end should render.
    pub fn sync_views(&mut self) -> Surface {
        let session = self.auth.session().clone();
        let mut surface = Surface::Content;

        let mut note = |decision: &GateDecision| match decision {
            GateDecision::Wait => {
                if surface == Surface::Content {
                    surface = Surface::Waiting;
                }
            }
            GateDecision::SignIn => surface = Surface::SignIn,
            _ => {}
        };

        let decision = self.feed.plan(&session);
        note(&decision);
        if let GateDecision::Fetch(ticket) = decision {
            let api = self.api.clone();
            let tx = self.outcome_tx.clone();
            if let Some(token) = session.token().map(str::to_string) {
                tokio::spawn(async move {
                    let result = api.list_topics(&token).await;
                    let _ = tx.send(FetchOutcome::Feed(ticket, result)).await;
                });
            }
        }

        if let Some(topic_id) = self.topic.topic_id() {
            let decision = self.topic.plan(&session);
            note(&decision);
            if let GateDecision::Fetch(ticket) = decision {
                let api = self.api.clone();
                let tx = self.outcome_tx.clone();
                if let Some(token) = session.token().map(str::to_string) {
                    tokio::spawn(async move {
                        let result = api.topic_detail(&token, topic_id).await;
                        let _ = tx.send(FetchOutcome::Topic(ticket, result)).await;
                    });
                }
            }

            let decision = self.moderation.plan(&session);
            note(&decision);
            if let GateDecision::Fetch(ticket) = decision {
                let api = self.api.clone();
                let tx = self.outcome_tx.clone();
                if let Some(token) = session.token().map(str::to_string) {
                    tokio::spawn(async move {
                        let result = api.moderation_insights(&token, topic_id).await;
                        let _ = tx.send(FetchOutcome::Moderation(ticket, result)).await;
                    });
                }
            }

            let decision = self.summary.plan(&session);
            note(&decision);
            if let GateDecision::Fetch(ticket) = decision {
                let api = self.api.clone();
                let tx = self.outcome_tx.clone();
                if let Some(token) = session.token().map(str::to_string) {
                    tokio::spawn(async move {
                        let result = api.ai_summary(&token, topic_id).await;
                        let _ = tx.send(FetchOutcome::Summary(ticket, result)).await;
                    });
                }
            }

            let decision = self.risk.plan(&session);
            note(&decision);
            if let GateDecision::Fetch(ticket) = decision {
                let api = self.api.clone();
                let tx = self.outcome_tx.clone();
                if let Some(token) = session.token().map(str::to_string) {
                    tokio::spawn(async move {
                        let result = api.risk_prediction(&token, topic_id).await;
                        let _ = tx.send(FetchOutcome::Risk(ticket, result)).await;
                    });
                }
            }

            let decision = self.timeline.plan(&session);
            note(&decision);
            if let GateDecision::Fetch(ticket) = decision {
                let api = self.api.clone();
                let tx = self.outcome_tx.clone();
                if let Some(token) = session.token().map(str::to_string) {
                    tokio::spawn(async move {
                        let result = api.sentiment_timeline(&token, topic_id).await;
                        let _ = tx.send(FetchOutcome::Timeline(ticket, result)).await;
                    });
                }
            }

            let decision = self.similar.plan(&session);
            note(&decision);
            if let GateDecision::Fetch(ticket) = decision {
                let api = self.api.clone();
                let tx = self.outcome_tx.clone();
                if let Some(token) = session.token().map(str::to_string) {
                    tokio::spawn(async move {
                        let result = api.similar_topics(&token, topic_id, None).await;
                        let _ = tx.send(FetchOutcome::Similar(ticket, result)).await;
                    });
                }
            }
        }

        surface
    }

    /// Drain completed fetches and apply them to their views. Call from the
    /// front end's event loop, then `sync_views` again.
    pub fn process_outcomes(&mut self) {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.handle_outcome(outcome);
        }
    }

    fn handle_outcome(&mut self, outcome: FetchOutcome) {
        // Credential rejection is recovered globally: reset the session so
        // every surface observes a consistent anonymous state, and drop the
        // outcome rather than surfacing a per-view error.
        if let Some(err) = outcome_error(&outcome) {
            if err.is_unauthorized() && self.auth.session().is_authenticated() {
                debug!("authenticated call got 401, forcing logout");
                self.auth.force_expire();
                self.reset_views();
                return;
            }
        }

        match outcome {
            FetchOutcome::Feed(ticket, result) => {
                self.feed.apply(ticket, result);
            }
            FetchOutcome::Topic(ticket, result) => {
                let post_count = result.as_ref().ok().map(TopicDetail::post_count);
                if self.topic.apply(ticket, result) {
                    // The detail tells the insight widgets how much
                    // discussion exists; they re-check their threshold.
                    if let Some(count) = post_count {
                        self.summary.set_post_count(count);
                        self.risk.set_post_count(count);
                        self.timeline.set_post_count(count);
                        self.similar.set_post_count(count);
                    }
                }
            }
            FetchOutcome::Moderation(ticket, result) => {
                self.moderation.apply(ticket, result);
            }
            FetchOutcome::Summary(ticket, result) => {
                self.summary.apply(ticket, result);
            }
            FetchOutcome::Risk(ticket, result) => {
                self.risk.apply(ticket, result);
            }
            FetchOutcome::Timeline(ticket, result) => {
                self.timeline.apply(ticket, result);
            }
            FetchOutcome::Similar(ticket, result) => {
                self.similar.apply(ticket, result);
            }
        }
    }

    // =========================================================================
    // User actions
    // =========================================================================

    /// Open a new grievance and refresh the feed.
    pub async fn create_topic(&mut self, topic: &NewTopic) -> Result<i64, ApiError> {
        let token = self.require_token()?;
        match self.api.create_topic(&token, topic).await {
            Ok(created) => {
                self.feed.refresh();
                Ok(created.topic_id)
            }
            Err(e) => Err(self.recover_auth(e)),
        }
    }

    /// Post into the currently open topic and refetch it.
    pub async fn add_post(&mut self, topic_id: i64, content: &str) -> Result<PostReceipt, ApiError> {
        let token = self.require_token()?;
        match self.api.add_post(&token, topic_id, content).await {
            Ok(receipt) => {
                self.topic.refresh();
                Ok(receipt)
            }
            Err(e) => Err(self.recover_auth(e)),
        }
    }

    /// Vote on a poll option; duplicate votes surface the server's message.
    pub async fn vote_poll(&mut self, option_id: i64) -> Result<(), ApiError> {
        let token = self.require_token()?;
        match self.api.vote_poll(&token, option_id).await {
            Ok(()) => {
                self.topic.refresh();
                Ok(())
            }
            Err(e) => Err(self.recover_auth(e)),
        }
    }

    /// Flag a topic as high priority (moderators only).
    pub async fn set_priority(&mut self, topic_id: i64) -> Result<(), ApiError> {
        let token = self.require_token()?;
        match self.api.set_priority(&token, topic_id).await {
            Ok(()) => {
                self.feed.refresh();
                Ok(())
            }
            Err(e) => Err(self.recover_auth(e)),
        }
    }

    fn require_token(&self) -> Result<String, ApiError> {
        self.auth
            .session()
            .token()
            .map(str::to_string)
            .ok_or_else(|| ApiError::Http {
                status: 401,
                payload: serde_json::json!({ "error": "not signed in" }),
            })
    }

    /// Actions hit the same global 401 policy as background fetches.
    fn recover_auth(&mut self, err: ApiError) -> ApiError {
        if err.is_unauthorized() && self.auth.session().is_authenticated() {
            self.auth.force_expire();
            self.reset_views();
        }
        err
    }
}

fn outcome_error(outcome: &FetchOutcome) -> Option<&ApiError> {
    match outcome {
        FetchOutcome::Feed(_, result) => result.as_ref().err(),
        FetchOutcome::Topic(_, result) => result.as_ref().err(),
        FetchOutcome::Moderation(_, result) => result.as_ref().err(),
        FetchOutcome::Summary(_, result) => result.as_ref().err(),
        FetchOutcome::Risk(_, result) => result.as_ref().err(),
        FetchOutcome::Timeline(_, result) => result.as_ref().err(),
        FetchOutcome::Similar(_, result) => result.as_ref().err(),
    }
}
