use axum::http::HeaderMap;

use super::{
    role::RoleResolver,
    routes::{RedirectTargets, RouteClass, RouteTable},
    session::SessionResolver,
};
use crate::models::{Identity, Role};

/// AccessDecision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    /// Send the caller to this path instead of serving the request.
    Redirect(String),
}

/// SessionContext
///
/// What the gate learned about the caller. Injected into the request extensions on `Allow`
/// so handlers never resolve the session a second time. `role` is only filled for admin
/// routes (and by `GET /session`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionContext {
    pub identity: Option<Identity>,
    pub role: Option<Role>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_admin(&self) -> bool {
        self.identity.is_some() && self.role == Some(Role::Admin)
    }
}

/// decide
///
/// The whole policy as a pure function.
///
/// | class         | no identity      | user             | admin   |
/// |---------------|------------------|------------------|---------|
/// | Public        | Allow            | Allow            | Allow   |
/// | Authenticated | Redirect(login)  | Allow            | Allow   |
/// | Admin         | Redirect(login)  | Redirect(landing)| Allow   |
/// | GuestOnly     | Allow            | Redirect(landing)| Redirect(landing) |
///
/// An admin route with an identity but no resolved role is treated as `user`.
pub fn decide(
    class: RouteClass,
    context: &SessionContext,
    targets: &RedirectTargets,
) -> AccessDecision {
    let signed_in = context.identity.is_some();

    match class {
        RouteClass::Public => AccessDecision::Allow,
        RouteClass::Authenticated if signed_in => AccessDecision::Allow,
        RouteClass::Authenticated => AccessDecision::Redirect(targets.login.clone()),
        RouteClass::Admin if !signed_in => AccessDecision::Redirect(targets.login.clone()),
        RouteClass::Admin if context.role == Some(Role::Admin) => AccessDecision::Allow,
        RouteClass::Admin => AccessDecision::Redirect(targets.landing.clone()),
        RouteClass::GuestOnly if signed_in => AccessDecision::Redirect(targets.landing.clone()),
        RouteClass::GuestOnly => AccessDecision::Allow,
    }
}

/// Evaluation
///
/// The outcome of one `AccessEngine::evaluate` call.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub class: RouteClass,
    pub decision: AccessDecision,
    pub context: SessionContext,
}

/// AccessEngine
///
/// Wires the classifier and both resolvers into `decide`. Holds no mutable state, so
/// evaluating the same request twice with unchanged backend data gives the same result.
pub struct AccessEngine {
    routes: RouteTable,
    sessions: SessionResolver,
    roles: RoleResolver,
}

impl AccessEngine {
    pub fn new(routes: RouteTable, sessions: SessionResolver, roles: RoleResolver) -> Self {
        Self {
            routes,
            sessions,
            roles,
        }
    }

    /// evaluate
    ///
    /// The role is only fetched for admin routes with an identity; other classes never
    /// depend on it.
    pub async fn evaluate(&self, path: &str, headers: &HeaderMap) -> Evaluation {
        let class = self.routes.classify(path);
        let identity = self.sessions.resolve(headers).await;

        let role = match (&identity, class) {
            (Some(identity), RouteClass::Admin) => Some(self.roles.resolve(identity.id).await),
            _ => None,
        };

        let context = SessionContext { identity, role };
        let decision = decide(class, &context, self.routes.targets());

        Evaluation {
            class,
            decision,
            context,
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn sessions(&self) -> &SessionResolver {
        &self.sessions
    }

    pub fn roles(&self) -> &RoleResolver {
        &self.roles
    }
}
