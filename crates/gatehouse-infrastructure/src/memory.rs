//! In-memory backend for tests and demo mode.
//!
//! Implements the same ports as [`crate::RestBackend`] against process-local
//! tables, so the console and the application layer can run without a live
//! service. Auth-state changes are published on the same kind of broadcast
//! channel the REST client uses.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::broadcast;
use uuid::Uuid;

use gatehouse_core::account::{NewProfile, Profile, ProfileRepository, Role};
use gatehouse_core::auth::{AuthChange, AuthGateway, AuthUser, SignInRequest, SignUpRequest};
use gatehouse_core::error::{GatehouseError, Result};
use gatehouse_core::event::{EventRepository, GateEvent};
use gatehouse_core::property::{Property, PropertyRepository};
use gatehouse_core::subscription::{
    NewSubscription, Plan, Subscription, SubscriptionRepository, SubscriptionStatus,
};

const AUTH_CHANGE_CAPACITY: usize = 32;

struct UserRecord {
    user: AuthUser,
    password: String,
}

/// Process-local backend holding every table in memory.
pub struct MemoryBackend {
    users: RwLock<Vec<UserRecord>>,
    profiles: RwLock<Vec<Profile>>,
    subscriptions: RwLock<Vec<Subscription>>,
    properties: RwLock<Vec<Property>>,
    events: RwLock<Vec<GateEvent>>,
    signed_in: RwLock<Option<AuthUser>>,
    changes: broadcast::Sender<AuthChange>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(AUTH_CHANGE_CAPACITY);
        Self {
            users: RwLock::new(Vec::new()),
            profiles: RwLock::new(Vec::new()),
            subscriptions: RwLock::new(Vec::new()),
            properties: RwLock::new(Vec::new()),
            events: RwLock::new(Vec::new()),
            signed_in: RwLock::new(None),
            changes,
        }
    }

    /// Creates a backend pre-seeded with a demo community: an admin and a
    /// viewer account, managed properties, and a few recorded gate events.
    ///
    /// Demo credentials: `admin@gatehouse.demo` / `sentinel` and
    /// `resident@gatehouse.demo` / `welcome1`.
    pub fn with_demo_data() -> Self {
        let backend = Self::new();
        let now = Utc::now();

        let admin = backend.register_account(
            "admin@gatehouse.demo",
            "sentinel",
            "Noa Barak",
            "052-0000001",
            Role::Admin,
        );
        backend.register_account(
            "resident@gatehouse.demo",
            "welcome1",
            "Dana Levi",
            "050-1234567",
            Role::Viewer,
        );

        {
            let mut properties = backend.properties.write().unwrap();
            for (name, address) in [
                ("North Residence", "1 Cypress Way"),
                ("Garden Villa", "7 Olive Grove"),
                ("Gatehouse Lodge", "2 Cedar Court"),
            ] {
                properties.push(Property {
                    id: Uuid::new_v4().to_string(),
                    name: name.to_string(),
                    address: address.to_string(),
                    created_at: now - Duration::days(90),
                });
            }
        }

        {
            let mut events = backend.events.write().unwrap();
            let entries = [
                ("main gate opened successfully", now - Duration::minutes(12)),
                ("main gate closed and locked", now - Duration::minutes(9)),
                ("motion detected: camera 2 (parking)", now - Duration::hours(2)),
                ("routine system check: all clear", now - Duration::hours(5)),
                ("cleaning crew arrived at the gate", now - Duration::days(1)),
                ("gardener entered through the side gate", now - Duration::days(2)),
            ];
            for (message, created_at) in entries {
                events.push(GateEvent {
                    id: Uuid::new_v4().to_string(),
                    message: message.to_string(),
                    created_at,
                });
            }
        }

        // Give the demo admin an elite subscription; the resident keeps the
        // default core trial created by register_account.
        backend
            .update_rows(&admin.id, Plan::Elite, SubscriptionStatus::Active)
            .expect("demo admin subscription exists");

        backend
    }

    /// Simulates the hosted client's periodic token refresh: publishes a
    /// `TokenRefreshed` event for the signed-in user, if any.
    pub fn refresh_session(&self) -> Option<AuthUser> {
        let user = self.signed_in.read().unwrap().clone();
        if let Some(user) = &user {
            let _ = self.changes.send(AuthChange::TokenRefreshed { user: user.clone() });
        }
        user
    }

    fn register_account(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
        phone: &str,
        role: Role,
    ) -> AuthUser {
        let user = AuthUser {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
        };
        self.users.write().unwrap().push(UserRecord {
            user: user.clone(),
            password: password.to_string(),
        });
        self.profiles.write().unwrap().push(Profile {
            id: user.id.clone(),
            full_name: full_name.to_string(),
            phone: phone.to_string(),
            role,
            created_at: Utc::now(),
        });
        self.subscriptions.write().unwrap().push(Subscription {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            plan: Plan::Core,
            status: SubscriptionStatus::Trial,
            expires_at: Utc::now() + Duration::days(30),
            created_at: Utc::now(),
        });
        user
    }

    fn update_rows(&self, user_id: &str, plan: Plan, status: SubscriptionStatus) -> Result<()> {
        let mut subscriptions = self.subscriptions.write().unwrap();
        let mut touched = false;
        for row in subscriptions.iter_mut().filter(|s| s.user_id == user_id) {
            row.plan = plan;
            row.status = status;
            touched = true;
        }
        if !touched {
            return Err(GatehouseError::data_access(format!(
                "no subscription rows for user {user_id}"
            )));
        }
        Ok(())
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthGateway for MemoryBackend {
    async fn sign_up(&self, request: &SignUpRequest) -> Result<AuthUser> {
        // The hosted service enforces its own password policy server-side.
        if request.password.len() < 6 {
            return Err(GatehouseError::auth("password should be at least 6 characters"));
        }

        {
            let users = self.users.read().unwrap();
            if users.iter().any(|r| r.user.email == request.email) {
                return Err(GatehouseError::auth("user already registered"));
            }
        }

        let user = AuthUser {
            id: Uuid::new_v4().to_string(),
            email: request.email.clone(),
        };
        self.users.write().unwrap().push(UserRecord {
            user: user.clone(),
            password: request.password.clone(),
        });

        // Email confirmation is disabled in the demo service: registration
        // signs the user straight in, like the hosted client does.
        *self.signed_in.write().unwrap() = Some(user.clone());
        let _ = self.changes.send(AuthChange::SignedIn { user: user.clone() });

        Ok(user)
    }

    async fn sign_in(&self, request: &SignInRequest) -> Result<AuthUser> {
        let user = {
            let users = self.users.read().unwrap();
            users
                .iter()
                .find(|r| r.user.email == request.email && r.password == request.password)
                .map(|r| r.user.clone())
        };

        let user = user.ok_or_else(|| GatehouseError::auth("invalid login credentials"))?;

        *self.signed_in.write().unwrap() = Some(user.clone());
        let _ = self.changes.send(AuthChange::SignedIn { user: user.clone() });
        Ok(user)
    }

    async fn sign_out(&self) -> Result<()> {
        *self.signed_in.write().unwrap() = None;
        let _ = self.changes.send(AuthChange::SignedOut);
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<AuthUser>> {
        Ok(self.signed_in.read().unwrap().clone())
    }

    async fn resolve_initial(&self) -> Result<Option<AuthUser>> {
        let user = self.signed_in.read().unwrap().clone();
        let _ = self
            .changes
            .send(AuthChange::InitialSession { user: user.clone() });
        Ok(user)
    }

    fn auth_changes(&self) -> broadcast::Receiver<AuthChange> {
        self.changes.subscribe()
    }
}

#[async_trait]
impl ProfileRepository for MemoryBackend {
    async fn insert(&self, profile: &NewProfile) -> Result<()> {
        self.profiles.write().unwrap().push(Profile {
            id: profile.id.clone(),
            full_name: profile.full_name.clone(),
            phone: profile.phone.clone(),
            role: profile.role,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn find_by_id(&self, user_id: &str) -> Result<Option<Profile>> {
        Ok(self
            .profiles
            .read()
            .unwrap()
            .iter()
            .find(|p| p.id == user_id)
            .cloned())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Profile>> {
        let mut profiles = self.profiles.read().unwrap().clone();
        profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        profiles.truncate(limit);
        Ok(profiles)
    }
}

#[async_trait]
impl SubscriptionRepository for MemoryBackend {
    async fn insert(&self, subscription: &NewSubscription) -> Result<()> {
        self.subscriptions.write().unwrap().push(Subscription {
            id: Uuid::new_v4().to_string(),
            user_id: subscription.user_id.clone(),
            plan: subscription.plan,
            status: subscription.status,
            expires_at: subscription.expires_at,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn latest_for_user(&self, user_id: &str) -> Result<Option<Subscription>> {
        let subscriptions = self.subscriptions.read().unwrap();
        Ok(subscriptions
            .iter()
            .filter(|s| s.user_id == user_id)
            .max_by_key(|s| s.created_at)
            .cloned())
    }

    async fn update_plan(
        &self,
        user_id: &str,
        plan: Plan,
        status: SubscriptionStatus,
    ) -> Result<()> {
        self.update_rows(user_id, plan, status)
    }

    async fn list_all(&self) -> Result<Vec<Subscription>> {
        Ok(self.subscriptions.read().unwrap().clone())
    }
}

#[async_trait]
impl PropertyRepository for MemoryBackend {
    async fn list_all(&self) -> Result<Vec<Property>> {
        Ok(self.properties.read().unwrap().clone())
    }
}

#[async_trait]
impl EventRepository for MemoryBackend {
    async fn list_recent(&self, limit: usize) -> Result<Vec<GateEvent>> {
        let mut events = self.events.read().unwrap().clone();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        events.truncate(limit);
        Ok(events)
    }
}
