//! Auth gateway trait.
//!
//! Defines the interface to the hosted authentication service.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::Result;

use super::event::AuthChange;
use super::model::{AuthUser, SignInRequest, SignUpRequest};

/// An abstract gateway to the hosted authentication service.
///
/// Implementations delegate credential storage and verification entirely to
/// the service; Gatehouse itself never sees password hashes or tokens beyond
/// what it must carry on subsequent requests.
///
/// # Auth-state push
///
/// Implementations publish an [`AuthChange`] on the channel returned by
/// [`auth_changes`](Self::auth_changes) whenever an auth action completes:
/// initial resolution, sign-in, sign-out, and token refresh. Subscribers that
/// lag are allowed to miss intermediate events; the latest event always
/// reflects the current state.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Registers a new account with the service.
    ///
    /// This creates credentials only; profile and subscription rows are the
    /// caller's responsibility.
    ///
    /// # Errors
    ///
    /// Returns an `Auth` error when the service rejects the registration
    /// (duplicate email, password policy).
    async fn sign_up(&self, request: &SignUpRequest) -> Result<AuthUser>;

    /// Signs in with an email and password.
    ///
    /// # Errors
    ///
    /// Returns an `Auth` error on invalid credentials.
    async fn sign_in(&self, request: &SignInRequest) -> Result<AuthUser>;

    /// Ends the current session.
    async fn sign_out(&self) -> Result<()>;

    /// Returns the currently authenticated user, if any.
    async fn current_user(&self) -> Result<Option<AuthUser>>;

    /// Resolves the session present at startup and publishes the
    /// corresponding `InitialSession` event.
    async fn resolve_initial(&self) -> Result<Option<AuthUser>>;

    /// Subscribes to auth-state change events.
    fn auth_changes(&self) -> broadcast::Receiver<AuthChange>;
}
