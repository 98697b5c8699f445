//! RestBackend - REST client for the hosted auth/data service.
//!
//! The service exposes password-based auth endpoints under `/auth/v1` and a
//! row API over named tables under `/rest/v1`. Every request carries the
//! public `apikey` header; row requests additionally carry the session's
//! bearer token once a user is signed in.

use std::sync::RwLock;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use gatehouse_core::account::{NewProfile, Profile, ProfileRepository};
use gatehouse_core::auth::{AuthChange, AuthGateway, AuthUser, SignInRequest, SignUpRequest};
use gatehouse_core::config::BackendConfig;
use gatehouse_core::error::{GatehouseError, Result};
use gatehouse_core::event::{EventRepository, GateEvent};
use gatehouse_core::property::{Property, PropertyRepository};
use gatehouse_core::subscription::{
    NewSubscription, Plan, Subscription, SubscriptionRepository, SubscriptionStatus,
};

const AUTH_CHANGE_CAPACITY: usize = 32;

/// REST client for the hosted service, implementing the auth gateway and
/// every table repository.
///
/// Auth-state changes are published on an internal broadcast channel when
/// sign-up/sign-in/sign-out/initial resolution complete, matching the push
/// behavior of the service's own client library.
pub struct RestBackend {
    client: Client,
    base_url: String,
    anon_key: String,
    /// Bearer credentials for the signed-in session, if any.
    tokens: RwLock<Option<SessionTokens>>,
    changes: broadcast::Sender<AuthChange>,
}

#[derive(Clone)]
struct SessionTokens {
    access_token: String,
    user: AuthUser,
}

impl RestBackend {
    /// Creates a backend client from a validated configuration.
    pub fn new(config: &BackendConfig) -> Self {
        let (changes, _) = broadcast::channel(AUTH_CHANGE_CAPACITY);
        Self {
            client: Client::new(),
            base_url: config.url.clone(),
            anon_key: config.anon_key.clone(),
            tokens: RwLock::new(None),
            changes,
        }
    }

    fn auth_url(&self, endpoint: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, endpoint)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// The token sent as bearer on row requests: the session token when
    /// signed in, the anon key otherwise.
    fn bearer(&self) -> String {
        self.tokens
            .read()
            .unwrap()
            .as_ref()
            .map(|t| t.access_token.clone())
            .unwrap_or_else(|| self.anon_key.clone())
    }

    fn signed_in_user(&self) -> Option<AuthUser> {
        self.tokens.read().unwrap().as_ref().map(|t| t.user.clone())
    }

    fn store_session(&self, access_token: String, user: AuthUser) {
        *self.tokens.write().unwrap() = Some(SessionTokens { access_token, user });
    }

    fn clear_session(&self) {
        *self.tokens.write().unwrap() = None;
    }

    fn publish(&self, change: AuthChange) {
        // Nobody listening yet is fine; the channel is fire-and-forget.
        let _ = self.changes.send(change);
    }

    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let url = self.table_url(table);
        let response = self
            .client
            .get(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
            .query(&[("select", "*")])
            .query(query)
            .send()
            .await
            .map_err(|err| GatehouseError::data_access(format!("GET {table} failed: {err}")))?;

        if !response.status().is_success() {
            return Err(read_data_error(table, response).await);
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|err| GatehouseError::data_access(format!("GET {table}: bad response: {err}")))
    }

    async fn insert_row<T: Serialize + Sync>(&self, table: &str, row: &T) -> Result<()> {
        let url = self.table_url(table);
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .header("Prefer", "return=minimal")
            .bearer_auth(self.bearer())
            // The row API accepts a batch; we always insert one.
            .json(&[row])
            .send()
            .await
            .map_err(|err| GatehouseError::data_access(format!("POST {table} failed: {err}")))?;

        if !response.status().is_success() {
            return Err(read_data_error(table, response).await);
        }
        Ok(())
    }
}

#[async_trait]
impl AuthGateway for RestBackend {
    async fn sign_up(&self, request: &SignUpRequest) -> Result<AuthUser> {
        let url = self.auth_url("signup");
        let body = CredentialsBody {
            email: request.email.clone(),
            password: request.password.clone(),
        };

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_auth_error)?;

        if !response.status().is_success() {
            return Err(read_auth_error(response).await);
        }

        let parsed: SignUpResponse = response
            .json()
            .await
            .map_err(|err| GatehouseError::auth(format!("bad signup response: {err}")))?;

        let user = parsed.user(&request.email)?;

        // With email confirmation disabled the service returns a live
        // session alongside the new user; adopt it so the auth-state
        // stream announces the sign-in exactly as the hosted client does.
        if let Some(token) = parsed_token(&parsed) {
            self.store_session(token, user.clone());
            self.publish(AuthChange::SignedIn { user: user.clone() });
        }

        Ok(user)
    }

    async fn sign_in(&self, request: &SignInRequest) -> Result<AuthUser> {
        let url = self.auth_url("token");
        let body = CredentialsBody {
            email: request.email.clone(),
            password: request.password.clone(),
        };

        let response = self
            .client
            .post(&url)
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_auth_error)?;

        if !response.status().is_success() {
            return Err(read_auth_error(response).await);
        }

        let parsed: TokenResponse = response
            .json()
            .await
            .map_err(|err| GatehouseError::auth(format!("bad token response: {err}")))?;

        let user = parsed.user.into_user()?;
        self.store_session(parsed.access_token, user.clone());
        self.publish(AuthChange::SignedIn { user: user.clone() });

        Ok(user)
    }

    async fn sign_out(&self) -> Result<()> {
        let url = self.auth_url("logout");
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
            .send()
            .await
            .map_err(transport_auth_error)?;

        if !response.status().is_success() {
            return Err(read_auth_error(response).await);
        }

        self.clear_session();
        self.publish(AuthChange::SignedOut);
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<AuthUser>> {
        if self.signed_in_user().is_none() {
            return Ok(None);
        }

        let url = self.auth_url("user");
        let response = self
            .client
            .get(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
            .send()
            .await
            .map_err(transport_auth_error)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            // Token no longer valid; the session is gone.
            self.clear_session();
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(read_auth_error(response).await);
        }

        let parsed: UserDto = response
            .json()
            .await
            .map_err(|err| GatehouseError::auth(format!("bad user response: {err}")))?;
        Ok(Some(parsed.into_user()?))
    }

    async fn resolve_initial(&self) -> Result<Option<AuthUser>> {
        let user = self.current_user().await?;
        self.publish(AuthChange::InitialSession { user: user.clone() });
        Ok(user)
    }

    fn auth_changes(&self) -> broadcast::Receiver<AuthChange> {
        self.changes.subscribe()
    }
}

#[async_trait]
impl ProfileRepository for RestBackend {
    async fn insert(&self, profile: &NewProfile) -> Result<()> {
        self.insert_row("profiles", profile).await
    }

    async fn find_by_id(&self, user_id: &str) -> Result<Option<Profile>> {
        let rows: Vec<Profile> = self
            .fetch_rows("profiles", &[("id", format!("eq.{user_id}"))])
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Profile>> {
        self.fetch_rows(
            "profiles",
            &[
                ("order", "created_at.desc".to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }
}

#[async_trait]
impl SubscriptionRepository for RestBackend {
    async fn insert(&self, subscription: &NewSubscription) -> Result<()> {
        self.insert_row("subscriptions", subscription).await
    }

    async fn latest_for_user(&self, user_id: &str) -> Result<Option<Subscription>> {
        let rows: Vec<Subscription> = self
            .fetch_rows(
                "subscriptions",
                &[
                    ("user_id", format!("eq.{user_id}")),
                    ("order", "created_at.desc".to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn update_plan(
        &self,
        user_id: &str,
        plan: Plan,
        status: SubscriptionStatus,
    ) -> Result<()> {
        let url = self.table_url("subscriptions");
        let response = self
            .client
            .patch(&url)
            .header("apikey", &self.anon_key)
            .header("Prefer", "return=minimal")
            .bearer_auth(self.bearer())
            .query(&[("user_id", format!("eq.{user_id}"))])
            .json(&PlanUpdateBody { plan, status })
            .send()
            .await
            .map_err(|err| {
                GatehouseError::data_access(format!("PATCH subscriptions failed: {err}"))
            })?;

        if !response.status().is_success() {
            return Err(read_data_error("subscriptions", response).await);
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Subscription>> {
        self.fetch_rows("subscriptions", &[]).await
    }
}

#[async_trait]
impl PropertyRepository for RestBackend {
    async fn list_all(&self) -> Result<Vec<Property>> {
        self.fetch_rows("properties", &[]).await
    }
}

#[async_trait]
impl EventRepository for RestBackend {
    async fn list_recent(&self, limit: usize) -> Result<Vec<GateEvent>> {
        self.fetch_rows(
            "events",
            &[
                ("order", "created_at.desc".to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }
}

#[derive(Serialize)]
struct CredentialsBody {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct PlanUpdateBody {
    plan: Plan,
    status: SubscriptionStatus,
}

#[derive(Deserialize)]
struct UserDto {
    id: Option<String>,
    email: Option<String>,
}

impl UserDto {
    fn into_user(self) -> Result<AuthUser> {
        let id = self
            .id
            .ok_or_else(|| GatehouseError::auth("service returned a user without an id"))?;
        Ok(AuthUser {
            id,
            email: self.email.unwrap_or_default(),
        })
    }
}

/// The signup endpoint returns either the bare user or a session wrapping
/// one, depending on whether email confirmation is enabled.
#[derive(Deserialize)]
struct SignUpResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    user: Option<UserDto>,
}

impl SignUpResponse {
    fn user(&self, fallback_email: &str) -> Result<AuthUser> {
        if let Some(user) = &self.user {
            if let Some(id) = &user.id {
                return Ok(AuthUser {
                    id: id.clone(),
                    email: user.email.clone().unwrap_or_else(|| fallback_email.to_string()),
                });
            }
        }
        let id = self
            .id
            .clone()
            .ok_or_else(|| GatehouseError::auth("signup response carried no user id"))?;
        Ok(AuthUser {
            id,
            email: self.email.clone().unwrap_or_else(|| fallback_email.to_string()),
        })
    }
}

fn parsed_token(response: &SignUpResponse) -> Option<String> {
    response.access_token.clone()
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    user: UserDto,
}

/// Error payloads differ between the auth and row endpoints; probe the
/// known message fields in order.
#[derive(Deserialize, Default)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ApiErrorBody {
    fn into_message(self) -> Option<String> {
        self.message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error)
    }
}

fn extract_error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(ApiErrorBody::into_message)
        .unwrap_or_else(|| format!("service returned {status}"))
}

fn transport_auth_error(err: reqwest::Error) -> GatehouseError {
    tracing::error!(target: "backend", "auth request failed: {err}");
    GatehouseError::auth("could not reach the authentication service")
}

async fn read_auth_error(response: reqwest::Response) -> GatehouseError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    GatehouseError::auth(extract_error_message(status, &body))
}

async fn read_data_error(table: &str, response: reqwest::Response) -> GatehouseError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = extract_error_message(status, &body);
    GatehouseError::data_access(format!("{table}: {message}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> RestBackend {
        RestBackend::new(&BackendConfig::new("https://gate.example.com", "anon-key"))
    }

    #[test]
    fn test_url_building() {
        let backend = backend();
        assert_eq!(backend.auth_url("signup"), "https://gate.example.com/auth/v1/signup");
        assert_eq!(
            backend.table_url("subscriptions"),
            "https://gate.example.com/rest/v1/subscriptions"
        );
    }

    #[test]
    fn test_bearer_falls_back_to_anon_key() {
        let backend = backend();
        assert_eq!(backend.bearer(), "anon-key");

        backend.store_session(
            "session-token".to_string(),
            AuthUser {
                id: "u-1".to_string(),
                email: "resident@example.com".to_string(),
            },
        );
        assert_eq!(backend.bearer(), "session-token");

        backend.clear_session();
        assert_eq!(backend.bearer(), "anon-key");
    }

    #[test]
    fn test_extract_error_message_probes_known_fields() {
        assert_eq!(
            extract_error_message(StatusCode::BAD_REQUEST, r#"{"msg":"invalid login credentials"}"#),
            "invalid login credentials"
        );
        assert_eq!(
            extract_error_message(
                StatusCode::CONFLICT,
                r#"{"message":"duplicate key value violates unique constraint"}"#
            ),
            "duplicate key value violates unique constraint"
        );
        assert_eq!(
            extract_error_message(StatusCode::BAD_GATEWAY, "upstream says no"),
            "service returned 502 Bad Gateway"
        );
    }

    #[test]
    fn test_signup_response_accepts_both_shapes() {
        let bare: SignUpResponse =
            serde_json::from_str(r#"{"id":"u-1","email":"a@b.c"}"#).expect("parse");
        assert_eq!(bare.user("a@b.c").expect("user").id, "u-1");

        let nested: SignUpResponse = serde_json::from_str(
            r#"{"access_token":"tok","user":{"id":"u-2","email":"a@b.c"}}"#,
        )
        .expect("parse");
        assert_eq!(nested.user("a@b.c").expect("user").id, "u-2");
        assert_eq!(parsed_token(&nested).as_deref(), Some("tok"));
    }

    #[test]
    fn test_signup_response_without_id_is_an_auth_error() {
        let parsed: SignUpResponse = serde_json::from_str(r#"{"email":"a@b.c"}"#).expect("parse");
        let err = parsed.user("a@b.c").expect_err("expected auth error");
        assert!(err.is_auth());
    }
}
