use chrono::Utc;

use crate::{
    auth::{AuthProvider, SignUpOutcome},
    error::{AppError, Result},
    models::{AccountRecord, Identity, NewAccountRecord, RegisterRequest, Role},
    repository::AccountStore,
};

pub const MIN_PASSWORD_LEN: usize = 6;

// Name given to lazily created records when the auth user carries no `full_name`.
pub const PLACEHOLDER_FULL_NAME: &str = "User";

/// Registration
///
/// Result of a successful sign-up: the auth outcome plus the account record created for it.
#[derive(Debug, Clone)]
pub struct Registration {
    pub outcome: SignUpOutcome,
    pub record: AccountRecord,
}

/// register
///
/// Creates the auth user, then its account record.
///
/// The role is decided here, once: the first account ever created becomes `admin`, every
/// later one `user`. The count-then-insert is not atomic, so two simultaneous first
/// registrations can both end up admin.
///
/// A failing record insert fails the registration.
pub async fn register(
    auth: &dyn AuthProvider,
    accounts: &dyn AccountStore,
    req: RegisterRequest,
) -> Result<Registration> {
    validate_registration(&req)?;

    let email = req.email.trim().to_string();
    let full_name = req.full_name.trim().to_string();

    let outcome = auth.sign_up(&email, &req.password, &full_name).await?;
    let role = bootstrap_role(accounts).await;

    let record = accounts
        .create_account_record(NewAccountRecord {
            id: outcome.identity.id,
            email: Some(email),
            role,
            full_name: Some(full_name),
            child_name: non_blank(req.child_name),
            age: req.age,
            city: non_blank(req.city),
            phone: non_blank(req.phone),
            consent_terms: req.consent_terms,
            consent_privacy: req.consent_privacy,
            consent_personal_data: req.consent_personal_data,
            consent_given_at: Some(Utc::now()),
        })
        .await?;

    tracing::info!(user_id = %record.id, role = record.role.as_str(), "Account registered");

    Ok(Registration { outcome, record })
}

/// bootstrap_role
///
/// `Admin` when no admin account exists yet. If the count cannot be read, `User`.
pub async fn bootstrap_role(accounts: &dyn AccountStore) -> Role {
    match accounts.count_admin_accounts().await {
        Ok(0) => Role::Admin,
        Ok(_) => Role::User,
        Err(e) => {
            tracing::warn!(error = %e, "Admin count failed, registering as user");
            Role::User
        }
    }
}

/// ensure_account_record
///
/// Login-time repair for identities that have no account record (e.g. created directly in
/// Supabase Auth). The record is created with role `user` and no consents. Failures are
/// logged and yield `None`; the login itself still succeeds.
pub async fn ensure_account_record(
    accounts: &dyn AccountStore,
    identity: &Identity,
) -> Option<AccountRecord> {
    match accounts.fetch_account_record(identity.id).await {
        Ok(Some(record)) => return Some(record),
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(user_id = %identity.id, error = %e, "Account record lookup failed at login");
            return None;
        }
    }

    let full_name = identity
        .full_name
        .clone()
        .unwrap_or_else(|| PLACEHOLDER_FULL_NAME.to_string());
    let new_record = NewAccountRecord {
        id: identity.id,
        email: Some(identity.email.clone()),
        role: Role::User,
        full_name: Some(full_name),
        ..Default::default()
    };

    match accounts.create_account_record(new_record).await {
        Ok(record) => {
            tracing::info!(user_id = %identity.id, "Created missing account record");
            Some(record)
        }
        Err(e) => {
            tracing::warn!(user_id = %identity.id, error = %e, "Could not create account record at login");
            None
        }
    }
}

/// Where a freshly signed-in user is sent.
pub fn landing_for(role: Role) -> &'static str {
    match role {
        Role::Admin => "/admin",
        Role::User => "/profile",
    }
}

/// validate_registration
pub fn validate_registration(req: &RegisterRequest) -> Result<()> {
    if !req.consent_terms || !req.consent_privacy || !req.consent_personal_data {
        return Err(AppError::BadRequest(
            "All consents (terms, privacy policy, personal data) are required".to_string(),
        ));
    }
    if !is_plausible_email(&req.email) {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if req.full_name.trim().is_empty() {
        return Err(AppError::BadRequest("Full name is required".to_string()));
    }
    if req.age.is_some_and(|age| !(1..=120).contains(&age)) {
        return Err(AppError::BadRequest("Age is out of range".to_string()));
    }
    Ok(())
}

/// is_plausible_email
///
/// Shape check only (`local@domain.tld`, no whitespace). Deliverability is Supabase's concern.
pub fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
