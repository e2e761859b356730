use std::time::Duration;
use uuid::Uuid;

use super::bounded;
use crate::{models::Role, repository::AccountStoreState};

/// RoleResolver
///
/// Reads the role from the caller's account record. A missing record, a failed fetch and
/// a timeout all yield `Role::User`, so admin access is only ever granted on a positive read.
pub struct RoleResolver {
    accounts: AccountStoreState,
    timeout: Duration,
}

impl RoleResolver {
    pub fn new(accounts: AccountStoreState, timeout: Duration) -> Self {
        Self { accounts, timeout }
    }

    pub async fn resolve(&self, identity_id: Uuid) -> Role {
        match bounded(self.timeout, self.accounts.fetch_account_record(identity_id)).await {
            Ok(Some(record)) => record.role,
            Ok(None) => {
                tracing::debug!(user_id = %identity_id, "No account record, defaulting to user role");
                Role::User
            }
            Err(e) => {
                tracing::warn!(user_id = %identity_id, error = %e, "Role lookup failed, defaulting to user role");
                Role::User
            }
        }
    }
}
