//! Session state machine.
//!
//! The session is the single source of truth for who is signed in. It moves
//! `Resolving -> {Authenticated, Anonymous}` once at startup, and
//! `Authenticated -> Anonymous` on logout or credential rejection. It never
//! re-enters `Resolving` on its own; a new cycle starts only with a login
//! attempt or a process restart.
//!
//! `SessionManager` is the only writer of both the session and the token
//! store. Everything else reads the `Session` snapshot.

use tracing::{debug, info, warn};

use crate::api::ApiError;
use crate::models::Profile;

use super::{AuthGateway, TokenStore};

/// Lifecycle status of the client session.
///
/// `Authenticated` and `Anonymous` are terminal: nothing moves the session
/// out of them without an explicit login/logout or a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// A persisted token is being resolved into a profile. Consumers must
    /// not issue protected requests yet.
    Resolving,
    Authenticated,
    Anonymous,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionStatus::Resolving)
    }
}

/// The client-held record of authentication state.
///
/// Field privacy enforces the invariants: `user` is present iff the status
/// is `Authenticated`, and `token` is present iff the status is `Resolving`
/// or `Authenticated`. States are swapped whole, so no observer ever sees
/// an anonymous session that still holds a token.
#[derive(Debug, Clone)]
pub struct Session {
    token: Option<String>,
    user: Option<Profile>,
    status: SessionStatus,
}

impl Session {
    pub(crate) fn resolving(token: String) -> Self {
        Self {
            token: Some(token),
            user: None,
            status: SessionStatus::Resolving,
        }
    }

    pub(crate) fn authenticated(token: String, user: Profile) -> Self {
        Self {
            token: Some(token),
            user: Some(user),
            status: SessionStatus::Authenticated,
        }
    }

    pub(crate) fn anonymous() -> Self {
        Self {
            token: None,
            user: None,
            status: SessionStatus::Anonymous,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&Profile> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }

    /// True when the signed-in user may open moderation surfaces.
    pub fn is_moderator(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.role.is_moderator())
    }
}

/// Owns the session and the token store; the only writer of either.
pub struct SessionManager {
    store: TokenStore,
    session: Session,
    expired_notice: bool,
}

impl SessionManager {
    /// The session starts in `Resolving`; `initialize` moves it to a
    /// terminal status exactly once per process.
    pub fn new(store: TokenStore) -> Self {
        let session = match store.load() {
            Some(token) => Session::resolving(token),
            None => Session::anonymous(),
        };
        Self {
            store,
            session,
            expired_notice: false,
        }
    }

    /// Read-only view for consumers and the fetch gate.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Resolve the persisted token into a profile, or settle anonymous.
    ///
    /// Every failure path - 401, other HTTP errors, network, protocol -
    /// clears the credential and lands on `Anonymous`. The session is never
    /// left at `Resolving`.
    pub async fn initialize<A: AuthGateway + ?Sized>(&mut self, gateway: &A) {
        let Some(token) = self.session.token().map(str::to_string) else {
            self.session = Session::anonymous();
            debug!("no persisted token, session is anonymous");
            return;
        };

        match gateway.current_user(&token).await {
            Ok(user) => {
                info!(user_id = user.id, "session restored from persisted token");
                self.session = Session::authenticated(token, user);
            }
            Err(e) => {
                if e.is_unauthorized() {
                    debug!("persisted token rejected, clearing credential");
                } else {
                    warn!(error = %e, "profile resolution failed, clearing credential");
                }
                self.store.save(None);
                self.session = Session::anonymous();
            }
        }
    }

    /// Authenticate with email and password. On success the token is
    /// persisted and the profile installed; on failure the session is left
    /// untouched and the server's message is returned verbatim.
    pub async fn login<A: AuthGateway + ?Sized>(
        &mut self,
        gateway: &A,
        email: &str,
        password: &str,
    ) -> Result<(), ApiError> {
        let outcome = gateway.login(email, password).await?;
        info!(user_id = outcome.user.id, "login succeeded");
        self.store.save(Some(&outcome.token));
        self.session = Session::authenticated(outcome.token, outcome.user);
        Ok(())
    }

    /// Create an account. Does not authenticate; the caller routes the user
    /// to the login form afterwards.
    pub async fn register<A: AuthGateway + ?Sized>(
        &self,
        gateway: &A,
        email: &str,
        password: &str,
        role: crate::models::Role,
    ) -> Result<(), ApiError> {
        gateway.register(email, password, role).await
    }

    /// Clear the credential and reset to anonymous. Idempotent.
    pub fn logout(&mut self) {
        self.store.save(None);
        self.session = Session::anonymous();
    }

    /// Handle a 401 on an already-established session: reset to anonymous
    /// and arm a one-shot notice so the UI can explain the sign-out.
    pub fn force_expire(&mut self) {
        if self.session.is_authenticated() {
            info!("session expired, resetting to anonymous");
            self.expired_notice = true;
        }
        self.logout();
    }

    /// Take the pending "session expired" notice, if any. Returns true at
    /// most once per expiry.
    pub fn take_expired_notice(&mut self) -> bool {
        std::mem::take(&mut self.expired_notice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn profile(id: i64) -> Profile {
        Profile {
            id,
            email: "a@b.com".to_string(),
            role: Role::User,
        }
    }

    /// How the fake answers `current_user`
    enum MeAnswer {
        Ok(Profile),
        Unauthorized,
        Broken,
    }

    struct FakeGateway {
        me_answer: MeAnswer,
        me_calls: AtomicUsize,
        login_answer: Result<LoginOutcome, String>,
    }

    impl FakeGateway {
        fn resolving_to(answer: MeAnswer) -> Self {
            Self {
                me_answer: answer,
                me_calls: AtomicUsize::new(0),
                login_answer: Err("unexpected login".to_string()),
            }
        }

        fn logging_in(outcome: LoginOutcome) -> Self {
            Self {
                me_answer: MeAnswer::Unauthorized,
                me_calls: AtomicUsize::new(0),
                login_answer: Ok(outcome),
            }
        }

        fn rejecting_login(message: &str) -> Self {
            Self {
                me_answer: MeAnswer::Unauthorized,
                me_calls: AtomicUsize::new(0),
                login_answer: Err(message.to_string()),
            }
        }

        fn me_calls(&self) -> usize {
            self.me_calls.load(Ordering::SeqCst)
        }
    }

    use super::super::LoginOutcome;

    #[async_trait]
    impl AuthGateway for FakeGateway {
        async fn login(&self, _email: &str, _password: &str) -> Result<LoginOutcome, ApiError> {
            match &self.login_answer {
                Ok(outcome) => Ok(outcome.clone()),
                Err(message) => Err(ApiError::Http {
                    status: 401,
                    payload: json!({ "error": message }),
                }),
            }
        }

        async fn register(&self, _e: &str, _p: &str, _r: Role) -> Result<(), ApiError> {
            Ok(())
        }

        async fn current_user(&self, _token: &str) -> Result<Profile, ApiError> {
            self.me_calls.fetch_add(1, Ordering::SeqCst);
            match &self.me_answer {
                MeAnswer::Ok(profile) => Ok(profile.clone()),
                MeAnswer::Unauthorized => Err(ApiError::Http {
                    status: 401,
                    payload: json!({ "msg": "Token has expired" }),
                }),
                MeAnswer::Broken => Err(ApiError::Protocol("response body is not JSON".into())),
            }
        }
    }

    fn manager_with_token(token: Option<&str>) -> SessionManager {
        let mut store = TokenStore::in_memory();
        store.save(token);
        SessionManager::new(store)
    }

    #[tokio::test]
    async fn test_initialize_without_token_is_anonymous_with_no_network() {
        let gateway = FakeGateway::resolving_to(MeAnswer::Ok(profile(1)));
        let mut manager = manager_with_token(None);

        manager.initialize(&gateway).await;

        assert_eq!(manager.session().status(), SessionStatus::Anonymous);
        assert_eq!(gateway.me_calls(), 0);
    }

    #[tokio::test]
    async fn test_initialize_resolves_valid_token() {
        let gateway = FakeGateway::resolving_to(MeAnswer::Ok(profile(7)));
        let mut manager = manager_with_token(Some("tok-7"));
        assert_eq!(manager.session().status(), SessionStatus::Resolving);

        manager.initialize(&gateway).await;

        let session = manager.session();
        assert_eq!(session.status(), SessionStatus::Authenticated);
        assert_eq!(session.token(), Some("tok-7"));
        assert_eq!(session.user().map(|u| u.id), Some(7));
        assert_eq!(gateway.me_calls(), 1);
    }

    #[tokio::test]
    async fn test_initialize_rejected_token_clears_everything() {
        let gateway = FakeGateway::resolving_to(MeAnswer::Unauthorized);
        let mut manager = manager_with_token(Some("stale"));

        manager.initialize(&gateway).await;

        let session = manager.session();
        assert_eq!(session.status(), SessionStatus::Anonymous);
        assert_eq!(session.token(), None);
        assert!(session.user().is_none());
        // Startup rejection is not an expiry of an established session
        assert!(!manager.take_expired_notice());
        // The credential is gone from storage, not just memory
        assert_eq!(manager.store.load(), None);
    }

    #[tokio::test]
    async fn test_initialize_protocol_failure_still_terminates() {
        let gateway = FakeGateway::resolving_to(MeAnswer::Broken);
        let mut manager = manager_with_token(Some("tok"));

        manager.initialize(&gateway).await;

        assert_eq!(manager.session().status(), SessionStatus::Anonymous);
        assert_eq!(manager.store.load(), None);
    }

    #[tokio::test]
    async fn test_login_persists_token_and_survives_restart() {
        let dir = tempfile::tempdir().expect("tempdir");
        let user = profile(1);
        let gateway = FakeGateway::logging_in(LoginOutcome {
            token: "T".to_string(),
            user: user.clone(),
        });

        let store = TokenStore::new(Some(dir.path().to_path_buf()));
        let mut manager = SessionManager::new(store);
        manager.login(&gateway, "a@b.com", "pw").await.expect("login");

        assert_eq!(manager.session().status(), SessionStatus::Authenticated);
        assert_eq!(manager.session().token(), Some("T"));

        // Simulated reload: a fresh manager over the same storage resolves
        // the persisted token to the identical terminal state.
        let echo = FakeGateway::resolving_to(MeAnswer::Ok(user));
        let mut reloaded = SessionManager::new(TokenStore::new(Some(dir.path().to_path_buf())));
        reloaded.initialize(&echo).await;

        assert_eq!(reloaded.session().status(), SessionStatus::Authenticated);
        assert_eq!(reloaded.session().token(), Some("T"));
        assert_eq!(reloaded.session().user().map(|u| u.id), Some(1));
    }

    #[tokio::test]
    async fn test_failed_login_leaves_session_untouched() {
        let gateway = FakeGateway::rejecting_login("invalid credentials");
        let mut manager = manager_with_token(None);
        manager.initialize(&gateway).await;

        let err = manager
            .login(&gateway, "a@b.com", "wrong")
            .await
            .expect_err("login must fail");

        assert_eq!(err.message(), "invalid credentials");
        assert_eq!(manager.session().status(), SessionStatus::Anonymous);
        assert_eq!(manager.store.load(), None);
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let gateway = FakeGateway::resolving_to(MeAnswer::Ok(profile(1)));
        let mut manager = manager_with_token(Some("tok"));
        manager.initialize(&gateway).await;

        manager.logout();
        assert_eq!(manager.session().status(), SessionStatus::Anonymous);
        assert_eq!(manager.session().token(), None);

        // Logging out again is a no-op, not an error
        manager.logout();
        assert_eq!(manager.session().status(), SessionStatus::Anonymous);
    }

    #[tokio::test]
    async fn test_force_expire_notifies_exactly_once() {
        let gateway = FakeGateway::resolving_to(MeAnswer::Ok(profile(1)));
        let mut manager = manager_with_token(Some("tok"));
        manager.initialize(&gateway).await;

        manager.force_expire();
        assert_eq!(manager.session().status(), SessionStatus::Anonymous);
        assert!(manager.take_expired_notice());
        assert!(!manager.take_expired_notice());

        // Expiring an already-anonymous session arms no notice
        manager.force_expire();
        assert!(!manager.take_expired_notice());
    }

    #[tokio::test]
    async fn test_register_does_not_authenticate() {
        let gateway = FakeGateway::resolving_to(MeAnswer::Unauthorized);
        let mut manager = manager_with_token(None);
        manager.initialize(&gateway).await;

        manager
            .register(&gateway, "new@b.com", "pw", Role::User)
            .await
            .expect("register");

        assert_eq!(manager.session().status(), SessionStatus::Anonymous);
        assert_eq!(manager.session().token(), None);
    }
}
