use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{sync::Arc, time::Duration};
use uuid::Uuid;

use crate::{error::BackendError, models::Identity};

/// Claims
///
/// The payload Supabase Auth signs into every session access token.
/// Only the fields this service reads are modelled; the rest are ignored on decode.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the UUID of the auth user, and the primary key of its `profiles` row.
    pub sub: Uuid,
    pub email: Option<String>,
    /// Expiration Time (exp): timestamp after which the token must not be accepted.
    pub exp: usize,
    /// Issued At (iat)
    pub iat: usize,
    /// Audience (aud): `authenticated` for signed-in users.
    pub aud: Option<String>,
    #[serde(default)]
    pub user_metadata: Option<UserMetadata>,
}

/// UserMetadata
///
/// The `data` object sent with sign-up, echoed back by Supabase as `user_metadata`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    pub full_name: Option<String>,
}

impl UserMetadata {
    fn into_full_name(self) -> Option<String> {
        self.full_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
    }
}

/// AuthSession
///
/// A session issued by Supabase Auth after a successful sign-in (or an auto-confirmed sign-up).
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub identity: Identity,
}

/// SignUpOutcome
///
/// `session` is `None` when the project requires email confirmation before the first sign-in.
#[derive(Debug, Clone)]
pub struct SignUpOutcome {
    pub identity: Identity,
    pub session: Option<AuthSession>,
}

/// AuthProvider
///
/// The seam to the hosted authentication service. The access subsystem only ever calls
/// `current_identity`; the other operations back the guest-only auth routes.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Resolves a session token to its identity. `Ok(None)` means the token is not a valid
    /// session (expired, malformed, revoked); `Err` means the service could not be asked.
    async fn current_identity(&self, token: &str) -> Result<Option<Identity>, BackendError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<SignUpOutcome, BackendError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, BackendError>;

    async fn send_password_reset(&self, email: &str) -> Result<(), BackendError>;
}

/// AuthState
///
/// The concrete type used to share the auth provider across the application state.
pub type AuthState = Arc<dyn AuthProvider>;

/// JwtVerifier
///
/// Verifies Supabase session tokens in-process with the project's JWT secret (HS256).
/// Expiry and audience are always checked.
#[derive(Clone)]
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str, audience: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_audience(&[audience]);

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// verify
    ///
    /// Returns the identity carried by a valid token, `None` for anything else.
    /// Failures are logged at debug level.
    pub fn verify(&self, token: &str) -> Option<Identity> {
        match decode::<Claims>(token, &self.key, &self.validation) {
            Ok(data) => Some(Identity {
                id: data.claims.sub,
                email: data.claims.email.unwrap_or_default(),
                created_at: None,
                full_name: data.claims.user_metadata.and_then(UserMetadata::into_full_name),
            }),
            Err(e) => {
                match e.kind() {
                    ErrorKind::ExpiredSignature => tracing::debug!("Session token expired"),
                    other => tracing::debug!(reason = ?other, "Session token rejected"),
                }
                None
            }
        }
    }
}

// --- Supabase Auth wire format ---

#[derive(Debug, Deserialize)]
struct SupabaseUser {
    id: Uuid,
    email: Option<String>,
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    user_metadata: Option<UserMetadata>,
}

impl From<SupabaseUser> for Identity {
    fn from(user: SupabaseUser) -> Self {
        Identity {
            id: user.id,
            email: user.email.unwrap_or_default(),
            created_at: user.created_at,
            full_name: user.user_metadata.and_then(UserMetadata::into_full_name),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SupabaseSession {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    user: SupabaseUser,
}

impl From<SupabaseSession> for AuthSession {
    fn from(session: SupabaseSession) -> Self {
        AuthSession {
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            expires_in: session.expires_in,
            identity: session.user.into(),
        }
    }
}

// Sign-up answers with a full session when auto-confirm is on, or a bare user otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(SupabaseSession),
    User(SupabaseUser),
}

// GoTrue uses different error shapes depending on the endpoint.
#[derive(Debug, Deserialize, Default)]
struct SupabaseErrorBody {
    msg: Option<String>,
    error_description: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

impl SupabaseErrorBody {
    fn into_message(self) -> String {
        self.msg
            .or(self.error_description)
            .or(self.message)
            .or(self.error)
            .unwrap_or_else(|| "unknown error".to_string())
    }
}

/// SupabaseAuthClient
///
/// Talks to the Supabase Auth REST API (`{SUPABASE_URL}/auth/v1`). When a `JwtVerifier` is
/// attached, session tokens are checked locally and `current_identity` makes no network call.
pub struct SupabaseAuthClient {
    http: Client,
    base_url: String,
    anon_key: String,
    verifier: Option<JwtVerifier>,
}

impl SupabaseAuthClient {
    pub fn new(supabase_url: &str, anon_key: &str, timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            http,
            base_url: format!("{}/auth/v1", supabase_url.trim_end_matches('/')),
            anon_key: anon_key.to_string(),
            verifier: None,
        }
    }

    /// Switches session checks to local JWT verification.
    pub fn with_local_verification(mut self, verifier: JwtVerifier) -> Self {
        self.verifier = Some(verifier);
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn rejection(response: reqwest::Response) -> BackendError {
        let status = response.status().as_u16();
        let body: SupabaseErrorBody = response.json().await.unwrap_or_default();
        BackendError::Rejected {
            status,
            message: body.into_message(),
        }
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuthClient {
    async fn current_identity(&self, token: &str) -> Result<Option<Identity>, BackendError> {
        if let Some(verifier) = &self.verifier {
            return Ok(verifier.verify(token));
        }

        let response = self
            .http
            .get(self.endpoint("/user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status if status.is_success() => {
                let user: SupabaseUser = response.json().await?;
                Ok(Some(user.into()))
            }
            _ => Err(Self::rejection(response).await),
        }
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<SignUpOutcome, BackendError> {
        let response = self
            .http
            .post(self.endpoint("/signup"))
            .header("apikey", &self.anon_key)
            .json(&json!({
                "email": email,
                "password": password,
                "data": { "full_name": full_name },
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let outcome = match response.json::<SignUpResponse>().await? {
            SignUpResponse::Session(session) => {
                let session: AuthSession = session.into();
                SignUpOutcome {
                    identity: session.identity.clone(),
                    session: Some(session),
                }
            }
            SignUpResponse::User(user) => SignUpOutcome {
                identity: user.into(),
                session: None,
            },
        };
        Ok(outcome)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, BackendError> {
        let response = self
            .http
            .post(self.endpoint("/token?grant_type=password"))
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let session: SupabaseSession = response.json().await?;
        Ok(session.into())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), BackendError> {
        let response = self
            .http
            .post(self.endpoint("/recover"))
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        Ok(())
    }
}
