//! Access Control Module
//!
//! The session-gating policy for the portal. A request path is classified, the caller's
//! session is resolved, the role is looked up for admin routes only, and a single
//! `AccessDecision` is computed before any handler runs.
//!
//! Every failure inside this module degrades to the most restrictive outcome: no session,
//! or the `user` role. Nothing here returns an error to the caller.
use std::{future::Future, sync::Arc, time::Duration};

use crate::error::BackendError;

/// Path classification (`RouteTable`, `RouteClass`) and redirect targets.
pub mod routes;

/// Credential extraction and identity resolution.
pub mod session;

/// Account-record backed role lookup.
pub mod role;

/// The pure decision function and the per-request `AccessEngine`.
pub mod decision;

/// The axum middleware and the handler-side extractors.
pub mod guard;

pub use decision::{AccessDecision, AccessEngine, Evaluation, SessionContext, decide};
pub use guard::{AdminUser, CurrentUser, access_gate};
pub use role::RoleResolver;
pub use routes::{RedirectTargets, RouteClass, RouteRule, RouteTable, normalize_path};
pub use session::SessionResolver;

/// AccessState
///
/// The concrete type used to share the engine across the application state.
pub type AccessState = Arc<AccessEngine>;

/// Awaits a backend call for at most `limit`. Elapsed calls become `BackendError::Timeout`.
pub async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, BackendError>
where
    F: Future<Output = Result<T, BackendError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or(Err(BackendError::Timeout))
}
