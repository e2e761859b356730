use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::convert::Infallible;

use super::{AccessState, decision::AccessDecision, decision::SessionContext};
use crate::{error::AppError, models::Identity};

/// access_gate
///
/// The single enforcement point, layered over every route and the fallback.
///
/// *Mechanism*: evaluates the request with the `AccessEngine`. On `Allow` the computed
/// `SessionContext` is stored in the request extensions and the handler runs. On
/// `Redirect` the request is answered with `307 Temporary Redirect` and never reaches a handler.
pub async fn access_gate(
    State(engine): State<AccessState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let evaluation = engine.evaluate(&path, request.headers()).await;

    match evaluation.decision {
        AccessDecision::Allow => {
            request.extensions_mut().insert(evaluation.context);
            next.run(request).await
        }
        AccessDecision::Redirect(target) => {
            tracing::info!(
                path = %path,
                class = evaluation.class.as_str(),
                target = %target,
                "Access denied, redirecting"
            );
            Redirect::temporary(&target).into_response()
        }
    }
}

/// SessionContext Extractor
///
/// Reads the context stored by `access_gate`. Without the gate in front, the caller is
/// anonymous.
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<SessionContext>()
            .cloned()
            .unwrap_or_default())
    }
}

/// CurrentUser
///
/// The signed-in caller. Rejects with `401 Unauthorized` when the gate found no session.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let context = SessionContext::from_request_parts(parts, state)
            .await
            .unwrap_or_default();

        context.identity.map(CurrentUser).ok_or(AppError::Unauthorized)
    }
}

/// AdminUser
///
/// The signed-in caller, confirmed as admin by the gate. Rejects with `401` without a
/// session and `403` when the role is anything but `admin` (including unresolved).
#[derive(Debug, Clone)]
pub struct AdminUser(pub Identity);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let context = SessionContext::from_request_parts(parts, state)
            .await
            .unwrap_or_default();

        if !context.is_admin() {
            return Err(if context.identity.is_none() {
                AppError::Unauthorized
            } else {
                AppError::Forbidden
            });
        }

        context.identity.map(AdminUser).ok_or(AppError::Unauthorized)
    }
}
