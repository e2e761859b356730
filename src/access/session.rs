use axum::http::{HeaderMap, header};
use axum_extra::extract::cookie::CookieJar;
use std::time::Duration;
use uuid::Uuid;

use super::bounded;
use crate::{
    auth::AuthState,
    config::{AppConfig, Env},
    models::Identity,
    repository::AccountStoreState,
};

/// Header carrying a profile id for the local development bypass.
pub const DEV_USER_HEADER: &str = "x-user-id";

/// SessionResolver
///
/// Turns the credentials of a request into an `Identity`, or `None`.
///
/// Lookup order:
/// 1. Local bypass (only with `dev_auth_bypass` set, never in `Env::Production`): an
///    `x-user-id` header naming an existing account record.
/// 2. The session cookie set at login.
/// 3. An `Authorization: Bearer` header.
///
/// The token is handed to the `AuthProvider`, bounded by the backend timeout. An invalid
/// token, an unreachable provider and a timeout all resolve to `None`.
pub struct SessionResolver {
    auth: AuthState,
    accounts: AccountStoreState,
    bypass_enabled: bool,
    timeout: Duration,
    cookie_name: String,
}

impl SessionResolver {
    pub fn new(auth: AuthState, accounts: AccountStoreState, config: &AppConfig) -> Self {
        Self {
            auth,
            accounts,
            bypass_enabled: config.dev_auth_bypass && config.env == Env::Local,
            timeout: config.backend_timeout,
            cookie_name: config.session_cookie.clone(),
        }
    }

    pub async fn resolve(&self, headers: &HeaderMap) -> Option<Identity> {
        if self.bypass_enabled {
            if let Some(identity) = self.dev_bypass(headers).await {
                return Some(identity);
            }
        }

        let token = self.extract_token(headers)?;

        match bounded(self.timeout, self.auth.current_identity(&token)).await {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!(error = %e, "Session lookup failed, treating request as anonymous");
                None
            }
        }
    }

    /// extract_token
    ///
    /// The session cookie takes precedence over the Authorization header.
    /// Empty values count as absent.
    pub fn extract_token(&self, headers: &HeaderMap) -> Option<String> {
        let jar = CookieJar::from_headers(headers);
        if let Some(cookie) = jar.get(&self.cookie_name) {
            if !cookie.value().is_empty() {
                return Some(cookie.value().to_string());
            }
        }

        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    // Falls through to the token flow when the header is malformed or names no record.
    async fn dev_bypass(&self, headers: &HeaderMap) -> Option<Identity> {
        let raw = headers.get(DEV_USER_HEADER)?.to_str().ok()?;
        let id = Uuid::parse_str(raw.trim()).ok()?;

        match bounded(self.timeout, self.accounts.fetch_account_record(id)).await {
            Ok(Some(record)) => {
                tracing::debug!(user_id = %id, "Local bypass session");
                Some(Identity {
                    id: record.id,
                    email: record.email.unwrap_or_default(),
                    created_at: Some(record.created_at),
                    full_name: record.full_name,
                })
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Local bypass lookup failed");
                None
            }
        }
    }
}
