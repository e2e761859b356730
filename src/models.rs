use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

// --- Identity & Accounts ---

/// Identity
///
/// The authenticated principal issued by Supabase Auth. It is resolved from the session token
/// on every request and never stored by this application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Identity {
    // Primary key of auth.users, and the key of the matching `profiles` row.
    pub id: Uuid,
    pub email: String,
    // Only known when the identity came from Supabase Auth directly (remote check, sign-in).
    pub created_at: Option<DateTime<Utc>>,
    // `user_metadata.full_name` as given at sign-up, when the auth service returned it.
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Role
///
/// The single source of truth for access level. Stored as text in `profiles.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Maps the stored column to a role. Only the exact value `admin` grants admin;
    /// NULL and unknown values degrade to `User`.
    pub fn from_db(value: Option<&str>) -> Self {
        match value {
            Some("admin") => Role::Admin,
            _ => Role::User,
        }
    }
}

/// AccountRecord
///
/// The application's profile row (`public.profiles`), keyed 1:1 by the identity id.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AccountRecord {
    pub id: Uuid,
    pub email: Option<String>,
    pub role: Role,
    pub full_name: Option<String>,
    pub child_name: Option<String>,
    pub age: Option<i32>,
    pub city: Option<String>,
    pub phone: Option<String>,
    // Consent flags captured at registration, with a single combined timestamp.
    pub consent_terms: bool,
    pub consent_privacy: bool,
    pub consent_personal_data: bool,
    pub consent_given_at: Option<DateTime<Utc>>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// NewAccountRecord
///
/// Insert payload for `profiles`. Built either from a registration form or, with defaults,
/// when a record is found missing at login.
#[derive(Debug, Clone, Default)]
pub struct NewAccountRecord {
    pub id: Uuid,
    pub email: Option<String>,
    pub role: Role,
    pub full_name: Option<String>,
    pub child_name: Option<String>,
    pub age: Option<i32>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub consent_terms: bool,
    pub consent_privacy: bool,
    pub consent_personal_data: bool,
    pub consent_given_at: Option<DateTime<Utc>>,
}

/// ProfileUpdate
///
/// Self-service partial update of the caller's own profile (PUT /profile).
/// `role` and consent fields are deliberately absent.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub child_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

// --- Authentication Payloads ---

/// RegisterRequest
///
/// Input payload for POST /auth/register. The password is only passed through to
/// Supabase Auth and never persisted or logged here.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub child_name: Option<String>,
    pub age: Option<i32>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub consent_terms: bool,
    pub consent_privacy: bool,
    pub consent_personal_data: bool,
}

/// LoginRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// PasswordResetRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PasswordResetRequest {
    pub email: String,
}

/// AuthResponse
///
/// Returned by login and registration. `redirect_to` tells the client where to navigate next.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AuthResponse {
    pub identity: Identity,
    pub role: Role,
    pub redirect_to: String,
}

/// FormDescriptor
///
/// Minimal page data for the guest-only auth pages.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct FormDescriptor {
    pub action: String,
    // Links to legal documents the user must accept (registration only).
    pub consent_documents: Vec<String>,
    pub alternate_path: String,
}

/// SessionView
///
/// Presentation-only view of the current session (GET /session), used to render
/// conditional UI such as the admin link. It grants nothing.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SessionView {
    pub identity: Option<Identity>,
    pub role: Option<Role>,
    pub is_admin: bool,
}

/// ProfilePage
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ProfilePage {
    pub identity: Identity,
    // Absent right after sign-up when the record has not been created yet.
    pub account: Option<AccountRecord>,
    pub is_admin: bool,
}

// --- Contests ---

/// ContestStatus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ContestStatus {
    #[default]
    Active,
    Upcoming,
    Finished,
}

impl ContestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContestStatus::Active => "active",
            ContestStatus::Upcoming => "upcoming",
            ContestStatus::Finished => "finished",
        }
    }

    pub fn from_db(value: &str) -> Self {
        match value {
            "upcoming" => ContestStatus::Upcoming,
            "finished" => ContestStatus::Finished,
            _ => ContestStatus::Active,
        }
    }
}

/// Contest
///
/// A contest announced by the center (`public.contests`).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Contest {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub cover_url: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: ContestStatus,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    // Admin who created the contest.
    pub created_by: Option<Uuid>,
}

/// CreateContestRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateContestRequest {
    pub title: String,
    pub description: String,
    pub cover_url: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub status: ContestStatus,
}

/// UpdateContestRequest
///
/// Partial update; only `Some` fields are written (COALESCE in the repository).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateContestRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ContestStatus>,
}

/// ContestFilter
///
/// Query parameters for GET /contests. `status` is applied by the database,
/// `search` in memory over title and description.
#[derive(Debug, Clone, Deserialize, IntoParams, Default)]
pub struct ContestFilter {
    pub status: Option<ContestStatus>,
    pub search: Option<String>,
}

/// PhotoCategory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PhotoCategory {
    Winner,
    #[default]
    Participant,
}

impl PhotoCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoCategory::Winner => "winner",
            PhotoCategory::Participant => "participant",
        }
    }

    pub fn from_db(value: &str) -> Self {
        match value {
            "winner" => PhotoCategory::Winner,
            _ => PhotoCategory::Participant,
        }
    }
}

/// ContestPhoto
///
/// A submitted work (`public.contest_photos`). Only approved works are ever shown publicly.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ContestPhoto {
    pub id: Uuid,
    pub contest_id: Uuid,
    pub image_url: String,
    pub category: PhotoCategory,
    pub name: String,
    pub surname_initial: String,
    pub age: i32,
    pub city: String,
    pub approved: bool,
    #[ts(type = "string")]
    pub uploaded_at: DateTime<Utc>,
    pub uploaded_by: Option<Uuid>,
    // Filled by the admin listing join with `contests`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contest_title: Option<String>,
}

/// ContestDetail
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ContestDetail {
    pub contest: Contest,
    pub winners: Vec<ContestPhoto>,
    pub participants: Vec<ContestPhoto>,
}

/// WorkFilter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum WorkFilter {
    #[default]
    All,
    Approved,
    Pending,
}

/// WorkFilterQuery
#[derive(Debug, Clone, Deserialize, IntoParams, Default)]
pub struct WorkFilterQuery {
    #[serde(default)]
    pub filter: WorkFilter,
}

/// CreateWorkRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateWorkRequest {
    pub contest_id: Uuid,
    pub image_url: String,
    pub name: String,
    pub surname_initial: String,
    pub age: i32,
    pub city: String,
    pub category: PhotoCategory,
}

/// SetApprovalRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SetApprovalRequest {
    pub approved: bool,
}

// --- News & FAQ ---

/// News
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct News {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    #[ts(type = "string")]
    pub published_at: DateTime<Utc>,
}

/// CreateNewsRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateNewsRequest {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
}

/// FaqItem
///
/// `order` is the 1-based display position.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct FaqItem {
    pub id: Uuid,
    pub question: String,
    pub answer: String,
    pub order: i32,
}

/// CreateFaqRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateFaqRequest {
    pub question: String,
    pub answer: String,
}

/// UpdateFaqRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateFaqRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

/// ReorderFaqRequest
///
/// The complete list of FAQ ids in their new display order.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ReorderFaqRequest {
    pub ids: Vec<Uuid>,
}

// --- Pages & Dashboard ---

/// HomePage
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct HomePage {
    pub active_contests: Vec<Contest>,
    pub latest_news: Vec<News>,
}

/// DashboardStats
///
/// Output schema for the admin dashboard (GET /admin).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_admins: i64,
    pub total_contests: i64,
    pub active_contests: i64,
    pub total_news: i64,
    /// Submitted works where `approved` is false.
    pub pending_works: i64,
}

// --- Uploads ---

/// UploadKind
///
/// Decides the folder an uploaded image lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum UploadKind {
    #[default]
    ContestCover,
    NewsImage,
    Work,
}

impl UploadKind {
    pub fn folder(&self) -> &'static str {
        match self {
            UploadKind::ContestCover => "contest-covers",
            UploadKind::NewsImage => "news",
            UploadKind::Work => "works",
        }
    }
}

/// PresignedUrlRequest
///
/// Input payload for requesting a short-lived upload URL (POST /admin/uploads/presigned).
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, TS, Default)]
#[ts(export)]
pub struct PresignedUrlRequest {
    /// The original filename, used to derive the file extension.
    #[schema(example = "cover.jpg")]
    pub filename: String,
    /// The MIME type, pinned on the presigned request. Must be an image type.
    #[schema(example = "image/jpeg")]
    pub file_type: String,
    /// Declared size of the file in bytes, pinned on the presigned request.
    pub size_bytes: i64,
    pub kind: UploadKind,
}

/// PresignedUrlResponse
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS, Default)]
#[ts(export)]
pub struct PresignedUrlResponse {
    /// The time-limited URL for the PUT request.
    pub upload_url: String,
    /// The object key inside the bucket.
    pub resource_key: String,
    /// Where the object can be read once uploaded; store this in `cover_url`/`image_url`.
    pub public_url: String,
}
