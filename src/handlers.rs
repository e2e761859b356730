use crate::{
    AppState, accounts,
    access::{AdminUser, CurrentUser, SessionContext},
    auth::AuthSession,
    config::{AppConfig, Env},
    error::{AppError, Result},
    listing,
    models::{
        AuthResponse, Contest, ContestDetail, ContestFilter, ContestPhoto, ContestStatus,
        CreateContestRequest, CreateFaqRequest, CreateNewsRequest, CreateWorkRequest,
        DashboardStats, FaqItem, FormDescriptor, HomePage, LoginRequest, News,
        PasswordResetRequest, PresignedUrlRequest, PresignedUrlResponse, ProfilePage,
        ProfileUpdate, RegisterRequest, ReorderFaqRequest, Role, SessionView, SetApprovalRequest,
        UpdateContestRequest, UpdateFaqRequest, WorkFilterQuery,
    },
    storage,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use uuid::Uuid;

// Number of items shown on the home page.
const HOME_PAGE_ITEMS: i64 = 3;

// --- Public Handlers ---

/// home
///
/// [Public Route] The newest active contests and the latest news.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Home page data", body = HomePage))
)]
pub async fn home(State(state): State<AppState>) -> Result<Json<HomePage>> {
    let active_contests = state
        .content
        .list_contests(Some(ContestStatus::Active), Some(HOME_PAGE_ITEMS))
        .await?;
    let latest_news = state.content.list_news(Some(HOME_PAGE_ITEMS)).await?;

    Ok(Json(HomePage {
        active_contests,
        latest_news,
    }))
}

/// list_contests
///
/// [Public Route] Lists contests, newest first. `status` is filtered by the database,
/// `search` in memory over title and description.
#[utoipa::path(
    get,
    path = "/contests",
    params(ContestFilter),
    responses((status = 200, description = "Filtered contests", body = [Contest]))
)]
pub async fn list_contests(
    State(state): State<AppState>,
    Query(filter): Query<ContestFilter>,
) -> Result<Json<Vec<Contest>>> {
    let contests = state.content.list_contests(filter.status, None).await?;
    Ok(Json(listing::filter_contests(contests, filter.search.as_deref())))
}

/// get_contest
///
/// [Public Route] One contest with its approved works, split into winners and participants.
#[utoipa::path(
    get,
    path = "/contests/{id}",
    params(("id" = Uuid, Path, description = "Contest ID")),
    responses(
        (status = 200, description = "Found", body = ContestDetail),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_contest(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContestDetail>> {
    let contest = state
        .content
        .get_contest(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("contest {}", id)))?;

    let photos = state.content.list_approved_photos(id).await?;
    let (winners, participants) = listing::split_gallery(photos);

    Ok(Json(ContestDetail {
        contest,
        winners,
        participants,
    }))
}

/// list_news
///
/// [Public Route] All news, newest first.
#[utoipa::path(
    get,
    path = "/news",
    responses((status = 200, description = "News", body = [News]))
)]
pub async fn list_news(State(state): State<AppState>) -> Result<Json<Vec<News>>> {
    Ok(Json(state.content.list_news(None).await?))
}

/// get_news
#[utoipa::path(
    get,
    path = "/news/{id}",
    params(("id" = Uuid, Path, description = "News ID")),
    responses(
        (status = 200, description = "Found", body = News),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_news(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<News>> {
    state
        .content
        .get_news(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("news {}", id)))
}

/// list_faq
///
/// [Public Route] FAQ items in display order.
#[utoipa::path(
    get,
    path = "/faq",
    responses((status = 200, description = "FAQ", body = [FaqItem]))
)]
pub async fn list_faq(State(state): State<AppState>) -> Result<Json<Vec<FaqItem>>> {
    Ok(Json(state.content.list_faq().await?))
}

/// get_session
///
/// [Public Route] The current identity and admin flag, for conditional UI only.
/// The gate resolves roles on admin routes only, so the role is looked up here when missing.
#[utoipa::path(
    get,
    path = "/session",
    responses((status = 200, description = "Current session", body = SessionView))
)]
pub async fn get_session(
    State(state): State<AppState>,
    context: SessionContext,
) -> Json<SessionView> {
    let role = match (&context.identity, context.role) {
        (Some(_), Some(role)) => Some(role),
        (Some(identity), None) => Some(state.access.roles().resolve(identity.id).await),
        (None, _) => None,
    };

    Json(SessionView {
        identity: context.identity,
        is_admin: role == Some(Role::Admin),
        role,
    })
}

/// logout
///
/// [Public Route] Clears the session cookie. Always succeeds, with or without a session.
#[utoipa::path(
    post,
    path = "/logout",
    responses((status = 204, description = "Signed out"))
)]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    // Added rather than removed, so the expiry is sent even when the request had no cookie.
    let expired = Cookie::build((state.config.session_cookie.clone(), ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.env == Env::Production)
        .max_age(time::Duration::ZERO);
    (jar.add(expired), StatusCode::NO_CONTENT)
}

// --- Guest-Only Handlers ---

/// login_form
#[utoipa::path(
    get,
    path = "/auth/login",
    responses((status = 200, description = "Login form", body = FormDescriptor))
)]
pub async fn login_form() -> Json<FormDescriptor> {
    Json(FormDescriptor {
        action: "/auth/login".to_string(),
        consent_documents: Vec::new(),
        alternate_path: "/auth/register".to_string(),
    })
}

/// register_form
///
/// Registration needs the three consents; the documents are linked here.
#[utoipa::path(
    get,
    path = "/auth/register",
    responses((status = 200, description = "Registration form", body = FormDescriptor))
)]
pub async fn register_form() -> Json<FormDescriptor> {
    Json(FormDescriptor {
        action: "/auth/register".to_string(),
        consent_documents: vec![
            "/legal/terms".to_string(),
            "/legal/privacy".to_string(),
            "/legal/consent".to_string(),
        ],
        alternate_path: "/auth/login".to_string(),
    })
}

/// login
///
/// [Guest Route] Password sign-in against Supabase Auth.
///
/// On success the session token is set as an HttpOnly cookie, the account record is created
/// if it is missing, and `redirect_to` points admins at `/admin`, everyone else at `/profile`.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 400, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>)> {
    let email = payload.email.trim();
    if email.is_empty() || payload.password.is_empty() {
        return Err(AppError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let session = state.auth.sign_in(email, &payload.password).await?;

    let role = accounts::ensure_account_record(state.accounts.as_ref(), &session.identity)
        .await
        .map(|record| record.role)
        .unwrap_or_default();

    tracing::info!(user_id = %session.identity.id, role = role.as_str(), "User signed in");

    let jar = jar.add(session_cookie(&state.config, &session));
    Ok((
        jar,
        Json(AuthResponse {
            identity: session.identity,
            role,
            redirect_to: accounts::landing_for(role).to_string(),
        }),
    ))
}

/// register
///
/// [Guest Route] Creates the Supabase Auth user and its account record.
///
/// The very first account becomes admin. When Supabase returns a session right away the
/// cookie is set and the client goes to `/profile`; otherwise email confirmation is pending
/// and the client goes to the login page.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = AuthResponse),
        (status = 400, description = "Invalid input or rejected by auth service")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>)> {
    let registration =
        accounts::register(state.auth.as_ref(), state.accounts.as_ref(), payload).await?;

    let (jar, redirect_to) = match &registration.outcome.session {
        Some(session) => (jar.add(session_cookie(&state.config, session)), "/profile"),
        None => (jar, "/auth/login"),
    };

    Ok((
        StatusCode::CREATED,
        jar,
        Json(AuthResponse {
            identity: registration.outcome.identity,
            role: registration.record.role,
            redirect_to: redirect_to.to_string(),
        }),
    ))
}

/// reset_password
///
/// [Guest Route] Asks Supabase Auth to send a password reset email.
#[utoipa::path(
    post,
    path = "/auth/reset-password",
    request_body = PasswordResetRequest,
    responses(
        (status = 202, description = "Reset email requested"),
        (status = 400, description = "Invalid email")
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<PasswordResetRequest>,
) -> Result<StatusCode> {
    let email = payload.email.trim();
    if !accounts::is_plausible_email(email) {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }

    state.auth.send_password_reset(email).await?;
    Ok(StatusCode::ACCEPTED)
}

// --- Authenticated Handlers ---

/// get_profile
///
/// [Authenticated Route] The caller's identity and account record.
/// `account` is absent when the record has not been created yet.
#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "Profile", body = ProfilePage),
        (status = 401, description = "No session")
    )
)]
pub async fn get_profile(
    CurrentUser(identity): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ProfilePage>> {
    let account = state.accounts.fetch_account_record(identity.id).await?;
    let is_admin = account
        .as_ref()
        .is_some_and(|record| record.role == Role::Admin);

    Ok(Json(ProfilePage {
        identity,
        account,
        is_admin,
    }))
}

/// update_profile
///
/// [Authenticated Route] Partial update of the caller's own record. Role and consents are
/// not part of the payload and cannot be changed here.
#[utoipa::path(
    put,
    path = "/profile",
    request_body = ProfileUpdate,
    responses(
        (status = 200, description = "Updated", body = ProfilePage),
        (status = 404, description = "No account record")
    )
)]
pub async fn update_profile(
    CurrentUser(identity): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<ProfilePage>> {
    if payload.age.is_some_and(|age| !(1..=120).contains(&age)) {
        return Err(AppError::BadRequest("Age is out of range".to_string()));
    }

    let record = state
        .accounts
        .update_profile(identity.id, payload)
        .await?
        .ok_or_else(|| AppError::NotFound("account record".to_string()))?;

    Ok(Json(ProfilePage {
        identity,
        is_admin: record.role == Role::Admin,
        account: Some(record),
    }))
}

// --- Admin Handlers ---

/// get_dashboard
///
/// [Admin Route] Counters for the admin dashboard.
#[utoipa::path(
    get,
    path = "/admin",
    responses((status = 200, description = "Stats", body = DashboardStats))
)]
pub async fn get_dashboard(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>> {
    Ok(Json(state.content.get_stats().await?))
}

/// admin_list_contests
///
/// [Admin Route] Every contest regardless of status.
#[utoipa::path(
    get,
    path = "/admin/contests",
    responses((status = 200, description = "All contests", body = [Contest]))
)]
pub async fn admin_list_contests(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Contest>>> {
    Ok(Json(state.content.list_contests(None, None).await?))
}

/// admin_get_contest
#[utoipa::path(
    get,
    path = "/admin/contests/{id}",
    params(("id" = Uuid, Path, description = "Contest ID")),
    responses(
        (status = 200, description = "Found", body = Contest),
        (status = 404, description = "Not Found")
    )
)]
pub async fn admin_get_contest(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Contest>> {
    state
        .content
        .get_contest(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("contest {}", id)))
}

/// create_contest
///
/// [Admin Route] Status defaults to `active`. The creating admin is recorded.
#[utoipa::path(
    post,
    path = "/admin/contests",
    request_body = CreateContestRequest,
    responses(
        (status = 201, description = "Created", body = Contest),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_contest(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateContestRequest>,
) -> Result<(StatusCode, Json<Contest>)> {
    require_text("title", &payload.title)?;
    require_text("description", &payload.description)?;
    listing::validate_contest_dates(payload.start_date, payload.end_date)
        .map_err(AppError::BadRequest)?;

    let contest = state.content.create_contest(payload, admin.id).await?;
    tracing::info!(contest_id = %contest.id, admin_id = %admin.id, "Contest created");

    Ok((StatusCode::CREATED, Json(contest)))
}

/// update_contest
///
/// [Admin Route] Partial update. The date rule is checked against the merged result.
#[utoipa::path(
    put,
    path = "/admin/contests/{id}",
    request_body = UpdateContestRequest,
    params(("id" = Uuid, Path, description = "Contest ID")),
    responses(
        (status = 200, description = "Updated", body = Contest),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_contest(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateContestRequest>,
) -> Result<Json<Contest>> {
    if let Some(title) = &payload.title {
        require_text("title", title)?;
    }
    if let Some(description) = &payload.description {
        require_text("description", description)?;
    }

    let existing = state
        .content
        .get_contest(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("contest {}", id)))?;

    listing::validate_contest_dates(
        payload.start_date.unwrap_or(existing.start_date),
        payload.end_date.unwrap_or(existing.end_date),
    )
    .map_err(AppError::BadRequest)?;

    state
        .content
        .update_contest(id, payload)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("contest {}", id)))
}

/// delete_contest
#[utoipa::path(
    delete,
    path = "/admin/contests/{id}",
    params(("id" = Uuid, Path, description = "Contest ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_contest(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    deleted_or_not_found(state.content.delete_contest(id).await?, "contest", id)
}

/// admin_list_news
#[utoipa::path(
    get,
    path = "/admin/news",
    responses((status = 200, description = "All news", body = [News]))
)]
pub async fn admin_list_news(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<News>>> {
    Ok(Json(state.content.list_news(None).await?))
}

/// create_news
///
/// [Admin Route] Publishes immediately.
#[utoipa::path(
    post,
    path = "/admin/news",
    request_body = CreateNewsRequest,
    responses(
        (status = 201, description = "Created", body = News),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_news(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateNewsRequest>,
) -> Result<(StatusCode, Json<News>)> {
    require_text("title", &payload.title)?;
    require_text("content", &payload.content)?;

    let news = state.content.create_news(payload).await?;
    Ok((StatusCode::CREATED, Json(news)))
}

/// delete_news
#[utoipa::path(
    delete,
    path = "/admin/news/{id}",
    params(("id" = Uuid, Path, description = "News ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_news(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    deleted_or_not_found(state.content.delete_news(id).await?, "news", id)
}

/// admin_list_faq
#[utoipa::path(
    get,
    path = "/admin/faq",
    responses((status = 200, description = "FAQ", body = [FaqItem]))
)]
pub async fn admin_list_faq(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<FaqItem>>> {
    Ok(Json(state.content.list_faq().await?))
}

/// create_faq
///
/// [Admin Route] New items are appended after the current last position.
#[utoipa::path(
    post,
    path = "/admin/faq",
    request_body = CreateFaqRequest,
    responses(
        (status = 201, description = "Created", body = FaqItem),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_faq(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateFaqRequest>,
) -> Result<(StatusCode, Json<FaqItem>)> {
    require_text("question", &payload.question)?;
    require_text("answer", &payload.answer)?;

    let current = state.content.list_faq().await?;
    let order = listing::next_faq_order(&current);

    let item = state
        .content
        .create_faq(payload.question, payload.answer, order)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// update_faq
#[utoipa::path(
    put,
    path = "/admin/faq/{id}",
    request_body = UpdateFaqRequest,
    params(("id" = Uuid, Path, description = "FAQ item ID")),
    responses(
        (status = 200, description = "Updated", body = FaqItem),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_faq(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateFaqRequest>,
) -> Result<Json<FaqItem>> {
    if let Some(question) = &payload.question {
        require_text("question", question)?;
    }
    if let Some(answer) = &payload.answer {
        require_text("answer", answer)?;
    }

    state
        .content
        .update_faq(id, payload)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("faq {}", id)))
}

/// delete_faq
#[utoipa::path(
    delete,
    path = "/admin/faq/{id}",
    params(("id" = Uuid, Path, description = "FAQ item ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_faq(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    deleted_or_not_found(state.content.delete_faq(id).await?, "faq", id)
}

/// reorder_faq
///
/// [Admin Route] Takes the full id list in the new order and rewrites positions `1..=n`.
/// Only rows whose position changes are written.
#[utoipa::path(
    put,
    path = "/admin/faq/order",
    request_body = ReorderFaqRequest,
    responses(
        (status = 200, description = "Reordered", body = [FaqItem]),
        (status = 400, description = "Not a permutation of the current items")
    )
)]
pub async fn reorder_faq(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(payload): Json<ReorderFaqRequest>,
) -> Result<Json<Vec<FaqItem>>> {
    let current = state.content.list_faq().await?;
    let writes = listing::plan_faq_reorder(&current, &payload.ids).map_err(AppError::BadRequest)?;

    for (id, order) in writes {
        state.content.set_faq_order(id, order).await?;
    }

    Ok(Json(state.content.list_faq().await?))
}

/// list_works
///
/// [Admin Route] Submitted works for moderation, newest first, with their contest title.
#[utoipa::path(
    get,
    path = "/admin/works",
    params(WorkFilterQuery),
    responses((status = 200, description = "Works", body = [ContestPhoto]))
)]
pub async fn list_works(
    _admin: AdminUser,
    State(state): State<AppState>,
    Query(query): Query<WorkFilterQuery>,
) -> Result<Json<Vec<ContestPhoto>>> {
    Ok(Json(state.content.list_works(query.filter).await?))
}

/// create_work
///
/// [Admin Route] Adds a work to a contest gallery. Works entered by an admin are approved
/// on creation.
#[utoipa::path(
    post,
    path = "/admin/works",
    request_body = CreateWorkRequest,
    responses(
        (status = 201, description = "Created", body = ContestPhoto),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Contest not found")
    )
)]
pub async fn create_work(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateWorkRequest>,
) -> Result<(StatusCode, Json<ContestPhoto>)> {
    require_text("image_url", &payload.image_url)?;
    require_text("name", &payload.name)?;
    require_text("surname_initial", &payload.surname_initial)?;
    require_text("city", &payload.city)?;
    if !(1..=120).contains(&payload.age) {
        return Err(AppError::BadRequest("Age is out of range".to_string()));
    }

    if state.content.get_contest(payload.contest_id).await?.is_none() {
        return Err(AppError::NotFound(format!("contest {}", payload.contest_id)));
    }

    let work = state.content.create_work(payload, admin.id).await?;
    Ok((StatusCode::CREATED, Json(work)))
}

/// set_work_approval
///
/// [Admin Route] Publishes or hides a work in its contest gallery.
#[utoipa::path(
    patch,
    path = "/admin/works/{id}/approval",
    request_body = SetApprovalRequest,
    params(("id" = Uuid, Path, description = "Work ID")),
    responses(
        (status = 200, description = "Updated", body = ContestPhoto),
        (status = 404, description = "Not Found")
    )
)]
pub async fn set_work_approval(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetApprovalRequest>,
) -> Result<Json<ContestPhoto>> {
    state
        .content
        .set_work_approval(id, payload.approved)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("work {}", id)))
}

/// delete_work
#[utoipa::path(
    delete,
    path = "/admin/works/{id}",
    params(("id" = Uuid, Path, description = "Work ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_work(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    deleted_or_not_found(state.content.delete_work(id).await?, "work", id)
}

/// create_upload_url
///
/// [Admin Route] Issues a 10-minute presigned PUT URL for an image.
///
/// *Security*: Only `image/*` up to 5 MiB. The object key is `{folder}/{uuid}.{ext}`; the
/// client's file name only contributes a sanitized extension.
#[utoipa::path(
    post,
    path = "/admin/uploads/presigned",
    request_body = PresignedUrlRequest,
    responses(
        (status = 200, description = "URL Generated", body = PresignedUrlResponse),
        (status = 400, description = "Not an image or too large"),
        (status = 502, description = "Storage unavailable")
    )
)]
pub async fn create_upload_url(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(payload): Json<PresignedUrlRequest>,
) -> Result<Json<PresignedUrlResponse>> {
    storage::validate_image_upload(&payload.file_type, payload.size_bytes)
        .map_err(AppError::BadRequest)?;

    let key = storage::build_object_key(payload.kind, &payload.filename);
    let upload_url = state
        .storage
        .get_presigned_upload_url(&key, &payload.file_type, payload.size_bytes)
        .await?;

    Ok(Json(PresignedUrlResponse {
        upload_url,
        public_url: state.storage.public_url(&key),
        resource_key: key,
    }))
}

/// not_found
///
/// Fallback for unknown paths. Runs behind the gate like every other route.
pub async fn not_found() -> AppError {
    AppError::NotFound("route".to_string())
}

// --- Helpers ---

fn session_cookie(config: &AppConfig, session: &AuthSession) -> Cookie<'static> {
    let mut cookie = Cookie::build((config.session_cookie.clone(), session.access_token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.env == Env::Production);

    if let Some(seconds) = session.expires_in {
        cookie = cookie.max_age(time::Duration::seconds(seconds));
    }

    cookie.build()
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{} is required", field)));
    }
    Ok(())
}

fn deleted_or_not_found(deleted: bool, kind: &str, id: Uuid) -> Result<StatusCode> {
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("{} {}", kind, id)))
    }
}
