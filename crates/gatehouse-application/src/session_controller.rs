//! Session controller.
//!
//! Bridges the hosted auth service to local session state: validates and
//! forwards credential operations, reacts to auth-state change events,
//! caches the signed-in user's profile and subscription, and gates the
//! admin overview behind the admin role.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use gatehouse_core::account::{NewProfile, Profile, ProfileRepository};
use gatehouse_core::auth::{
    AuthChange, AuthGateway, AuthUser, SignInRequest, SignUpRequest, normalize_email,
    validate_sign_in, validate_sign_up,
};
use gatehouse_core::error::{GatehouseError, Result};
use gatehouse_core::event::EventRepository;
use gatehouse_core::property::PropertyRepository;
use gatehouse_core::session::Session;
use gatehouse_core::subscription::{
    NewSubscription, Plan, Subscription, SubscriptionRepository, SubscriptionStatus,
};

use crate::admin::{AdminOverview, EVENT_FETCH_LIMIT, PROFILE_LIMIT};

/// Handle over a running auth-change subscription.
///
/// Dropping the handle detaches it (the forwarding task keeps running for
/// the life of the process); calling [`unsubscribe`](Self::unsubscribe)
/// stops delivery.
pub struct AuthSubscription {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl AuthSubscription {
    /// Stops event delivery to this subscriber.
    pub fn unsubscribe(self) {
        self.token.cancel();
    }

    /// Whether the forwarding task has finished.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Owns the current session and every operation that touches it.
///
/// The session is held behind one lock with the controller as its only
/// writer; callers receive snapshots by value.
pub struct SessionController {
    auth: Arc<dyn AuthGateway>,
    profiles: Arc<dyn ProfileRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    properties: Arc<dyn PropertyRepository>,
    events: Arc<dyn EventRepository>,
    session: Arc<RwLock<Option<Session>>>,
}

impl SessionController {
    pub fn new(
        auth: Arc<dyn AuthGateway>,
        profiles: Arc<dyn ProfileRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        properties: Arc<dyn PropertyRepository>,
        events: Arc<dyn EventRepository>,
    ) -> Arc<Self> {
        Arc::new(Self {
            auth,
            profiles,
            subscriptions,
            properties,
            events,
            session: Arc::new(RwLock::new(None)),
        })
    }

    /// Resolves the session present at startup, if any.
    ///
    /// The gateway publishes the corresponding `InitialSession` event to
    /// subscribers; the controller additionally applies it here so callers
    /// see the restored session immediately.
    pub async fn initialize(&self) -> Result<Option<Session>> {
        match self.auth.resolve_initial().await? {
            Some(user) => Ok(Some(self.establish(user).await)),
            None => {
                self.clear().await;
                Ok(None)
            }
        }
    }

    /// Registers a new account.
    ///
    /// Credential creation is delegated to the service; on success a
    /// viewer profile and a core-plan trial subscription are inserted
    /// best-effort. Failures of those secondary inserts are traced and
    /// swallowed, leaving the account partially provisioned; there is no
    /// rollback of the credential creation.
    ///
    /// # Errors
    ///
    /// Returns a `Validation` error before any network call when a field
    /// is empty or the password is too short, and an `Auth` error when the
    /// service rejects the registration.
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<AuthUser> {
        validate_sign_up(&request)?;

        let request = SignUpRequest {
            email: normalize_email(&request.email),
            ..request
        };
        let user = self.auth.sign_up(&request).await?;
        tracing::info!(target: "session", "registered account {}", user.id);

        let profile = NewProfile::viewer(&user.id, &request.full_name, &request.phone);
        if let Err(err) = self.profiles.insert(&profile).await {
            tracing::error!(target: "session", "profile creation failed: {err}");
        }

        let trial = NewSubscription::trial(&user.id, Utc::now());
        if let Err(err) = self.subscriptions.insert(&trial).await {
            tracing::error!(target: "session", "subscription creation failed: {err}");
        }

        // Registration may have signed the user straight in (no email
        // confirmation step); adopt the session if so.
        if self
            .auth
            .current_user()
            .await
            .ok()
            .flatten()
            .is_some_and(|current| current.id == user.id)
        {
            self.establish(user.clone()).await;
        }

        Ok(user)
    }

    /// Signs in and loads the user's profile and subscription.
    ///
    /// # Errors
    ///
    /// Returns a `Validation` error for empty fields and an `Auth` error
    /// on invalid credentials.
    pub async fn sign_in(&self, request: SignInRequest) -> Result<Session> {
        validate_sign_in(&request)?;

        let request = SignInRequest {
            email: normalize_email(&request.email),
            password: request.password,
        };
        let user = self.auth.sign_in(&request).await?;
        Ok(self.establish(user).await)
    }

    /// Ends the current session.
    pub async fn sign_out(&self) -> Result<()> {
        self.auth.sign_out().await?;
        self.clear().await;
        Ok(())
    }

    /// A snapshot of the current session, if any.
    pub async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    /// The currently authenticated user as the service reports it.
    pub async fn current_user(&self) -> Result<Option<AuthUser>> {
        self.auth.current_user().await
    }

    /// Fetches a profile row.
    pub async fn profile(&self, user_id: &str) -> Result<Option<Profile>> {
        self.profiles.find_by_id(user_id).await
    }

    /// Fetches the current subscription row: the most recently created one.
    pub async fn subscription(&self, user_id: &str) -> Result<Option<Subscription>> {
        self.subscriptions.latest_for_user(user_id).await
    }

    /// Subscribes to auth-state changes.
    ///
    /// Each event first updates the controller's session state, then
    /// invokes `callback` with the event and the resulting snapshot.
    /// The returned handle cancels delivery when unsubscribed.
    pub fn subscribe<F>(self: &Arc<Self>, callback: F) -> AuthSubscription
    where
        F: Fn(AuthChange, Option<Session>) + Send + Sync + 'static,
    {
        let mut changes = self.auth.auth_changes();
        let token = CancellationToken::new();
        let guard = token.clone();
        let controller = Arc::clone(self);

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = guard.cancelled() => break,
                    received = changes.recv() => match received {
                        Ok(change) => {
                            controller.apply_change(&change).await;
                            let snapshot = controller.session().await;
                            callback(change, snapshot);
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(target: "session", "auth stream lagged, {skipped} events skipped");
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
        });

        AuthSubscription { token, handle }
    }

    /// Updates the current user's subscription to the chosen plan with
    /// status active, then refetches it into the session.
    ///
    /// # Errors
    ///
    /// Returns an `Auth` error when nobody is signed in and a `DataAccess`
    /// error when the update or refetch fails.
    pub async fn select_plan(&self, plan: Plan) -> Result<Subscription> {
        let user_id = self
            .session()
            .await
            .map(|s| s.user.id)
            .ok_or_else(|| GatehouseError::auth("sign in to choose a plan"))?;

        self.subscriptions
            .update_plan(&user_id, plan, SubscriptionStatus::Active)
            .await?;

        let refreshed = self
            .subscriptions
            .latest_for_user(&user_id)
            .await?
            .ok_or_else(|| {
                GatehouseError::data_access("subscription row missing after plan update")
            })?;

        let mut session = self.session.write().await;
        if let Some(session) = session.as_mut() {
            session.subscription = Some(refreshed.clone());
        }
        tracing::info!(target: "session", "plan updated to {}", refreshed.plan);

        Ok(refreshed)
    }

    /// Loads the community overview for the admin view.
    ///
    /// Only callable with an admin session; individual table fetches are
    /// best-effort and a failed one leaves its panel empty.
    ///
    /// # Errors
    ///
    /// Returns an `Auth` error when the session's profile is missing or
    /// not an admin. No table is fetched in that case.
    pub async fn admin_overview(&self) -> Result<AdminOverview> {
        let is_admin = self.session().await.is_some_and(|s| s.is_admin());
        if !is_admin {
            return Err(GatehouseError::auth("admin role required"));
        }

        let profiles = self
            .profiles
            .list_recent(PROFILE_LIMIT)
            .await
            .unwrap_or_else(|err| {
                tracing::error!(target: "session", "profiles fetch failed: {err}");
                Vec::new()
            });
        let properties = self.properties.list_all().await.unwrap_or_else(|err| {
            tracing::error!(target: "session", "properties fetch failed: {err}");
            Vec::new()
        });
        let events = self
            .events
            .list_recent(EVENT_FETCH_LIMIT)
            .await
            .unwrap_or_else(|err| {
                tracing::error!(target: "session", "events fetch failed: {err}");
                Vec::new()
            });
        let subscriptions = self.subscriptions.list_all().await.unwrap_or_else(|err| {
            tracing::error!(target: "session", "subscriptions fetch failed: {err}");
            Vec::new()
        });

        Ok(AdminOverview::assemble(
            profiles,
            properties,
            events,
            subscriptions,
            Utc::now().date_naive(),
        ))
    }

    /// Builds and stores the session for a signed-in user, fetching the
    /// profile and subscription best-effort.
    async fn establish(&self, user: AuthUser) -> Session {
        let mut session = Session::new(user);

        match self.profiles.find_by_id(&session.user.id).await {
            Ok(profile) => session.profile = profile,
            Err(err) => {
                tracing::error!(target: "session", "profile fetch failed: {err}");
            }
        }
        match self.subscriptions.latest_for_user(&session.user.id).await {
            Ok(subscription) => session.subscription = subscription,
            Err(err) => {
                tracing::error!(target: "session", "subscription fetch failed: {err}");
            }
        }

        tracing::info!(target: "session", "session established for {}", session.user.id);
        *self.session.write().await = Some(session.clone());
        session
    }

    async fn clear(&self) {
        let mut session = self.session.write().await;
        if session.take().is_some() {
            tracing::info!(target: "session", "session cleared");
        }
    }

    async fn apply_change(&self, change: &AuthChange) {
        match change.user() {
            Some(user) => {
                self.establish(user.clone()).await;
            }
            None => self.clear().await,
        }
    }
}
