#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use chrono::{NaiveDate, Utc};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};
use tower::util::ServiceExt;
use uuid::Uuid;
use vektor_portal::{
    AppState,
    auth::{AuthProvider, AuthSession, SignUpOutcome},
    config::AppConfig,
    create_router,
    error::BackendError,
    models::{
        AccountRecord, Contest, ContestPhoto, ContestStatus, CreateContestRequest,
        CreateNewsRequest, CreateWorkRequest, DashboardStats, FaqItem, Identity,
        NewAccountRecord, News, PhotoCategory, ProfileUpdate, Role, UpdateContestRequest,
        UpdateFaqRequest, WorkFilter,
    },
    repository::{AccountStore, ContentRepository, RepoResult},
    storage::MockStorageService,
};

// --- MOCK ACCOUNT STORE ---

/// In-memory `profiles` table with switchable failures.
#[derive(Default)]
pub struct MockAccountStore {
    pub records: Mutex<HashMap<Uuid, AccountRecord>>,
    pub fail_fetch: bool,
    pub fail_count: bool,
    pub fail_create: bool,
    // Applied to every call; longer than the backend timeout simulates a hung database.
    pub delay: Option<Duration>,
    pub fetch_calls: Mutex<usize>,
}

impl MockAccountStore {
    pub fn with_records(records: Vec<AccountRecord>) -> Self {
        Self {
            records: Mutex::new(records.into_iter().map(|r| (r.id, r)).collect()),
            ..Default::default()
        }
    }

    pub fn record(&self, id: Uuid) -> Option<AccountRecord> {
        self.records.lock().unwrap().get(&id).cloned()
    }

    pub fn fetch_count(&self) -> usize {
        *self.fetch_calls.lock().unwrap()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn db_down() -> BackendError {
    BackendError::Database(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl AccountStore for MockAccountStore {
    async fn fetch_account_record(&self, id: Uuid) -> RepoResult<Option<AccountRecord>> {
        *self.fetch_calls.lock().unwrap() += 1;
        self.pause().await;
        if self.fail_fetch {
            return Err(db_down());
        }
        Ok(self.record(id))
    }

    async fn create_account_record(&self, new: NewAccountRecord) -> RepoResult<AccountRecord> {
        self.pause().await;
        if self.fail_create {
            return Err(db_down());
        }
        let now = Utc::now();
        let record = AccountRecord {
            id: new.id,
            email: new.email,
            role: new.role,
            full_name: new.full_name,
            child_name: new.child_name,
            age: new.age,
            city: new.city,
            phone: new.phone,
            consent_terms: new.consent_terms,
            consent_privacy: new.consent_privacy,
            consent_personal_data: new.consent_personal_data,
            consent_given_at: new.consent_given_at,
            created_at: now,
            updated_at: now,
        };
        self.records
            .lock()
            .unwrap()
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn count_admin_accounts(&self) -> RepoResult<i64> {
        self.pause().await;
        if self.fail_count {
            return Err(db_down());
        }
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.role == Role::Admin)
            .count() as i64)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> RepoResult<Option<AccountRecord>> {
        let mut records = self.records.lock().unwrap();
        let Some(record) = records.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = update.full_name {
            record.full_name = Some(v);
        }
        if let Some(v) = update.child_name {
            record.child_name = Some(v);
        }
        if let Some(v) = update.age {
            record.age = Some(v);
        }
        if let Some(v) = update.city {
            record.city = Some(v);
        }
        if let Some(v) = update.phone {
            record.phone = Some(v);
        }
        record.updated_at = Utc::now();
        Ok(Some(record.clone()))
    }
}

// --- MOCK CONTENT REPOSITORY ---

#[derive(Default)]
pub struct MockContentRepo {
    pub contests: Mutex<Vec<Contest>>,
    pub photos: Mutex<Vec<ContestPhoto>>,
    pub news: Mutex<Vec<News>>,
    pub faq: Mutex<Vec<FaqItem>>,
    pub faq_writes: Mutex<Vec<(Uuid, i32)>>,
    pub fail: bool,
}

impl MockContentRepo {
    fn check(&self) -> RepoResult<()> {
        if self.fail { Err(db_down()) } else { Ok(()) }
    }
}

#[async_trait]
impl ContentRepository for MockContentRepo {
    async fn list_contests(
        &self,
        status: Option<ContestStatus>,
        limit: Option<i64>,
    ) -> RepoResult<Vec<Contest>> {
        self.check()?;
        let mut contests: Vec<Contest> = self
            .contests
            .lock()
            .unwrap()
            .iter()
            .filter(|c| status.is_none_or(|s| c.status == s))
            .cloned()
            .collect();
        contests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = limit {
            contests.truncate(limit as usize);
        }
        Ok(contests)
    }

    async fn get_contest(&self, id: Uuid) -> RepoResult<Option<Contest>> {
        self.check()?;
        Ok(self.contests.lock().unwrap().iter().find(|c| c.id == id).cloned())
    }

    async fn create_contest(
        &self,
        req: CreateContestRequest,
        created_by: Uuid,
    ) -> RepoResult<Contest> {
        self.check()?;
        let contest = Contest {
            id: Uuid::new_v4(),
            title: req.title,
            description: req.description,
            cover_url: req.cover_url,
            start_date: req.start_date,
            end_date: req.end_date,
            status: req.status,
            created_at: Utc::now(),
            created_by: Some(created_by),
        };
        self.contests.lock().unwrap().push(contest.clone());
        Ok(contest)
    }

    async fn update_contest(
        &self,
        id: Uuid,
        req: UpdateContestRequest,
    ) -> RepoResult<Option<Contest>> {
        self.check()?;
        let mut contests = self.contests.lock().unwrap();
        let Some(contest) = contests.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(v) = req.title {
            contest.title = v;
        }
        if let Some(v) = req.description {
            contest.description = v;
        }
        if let Some(v) = req.cover_url {
            contest.cover_url = Some(v);
        }
        if let Some(v) = req.start_date {
            contest.start_date = v;
        }
        if let Some(v) = req.end_date {
            contest.end_date = v;
        }
        if let Some(v) = req.status {
            contest.status = v;
        }
        Ok(Some(contest.clone()))
    }

    async fn delete_contest(&self, id: Uuid) -> RepoResult<bool> {
        self.check()?;
        let mut contests = self.contests.lock().unwrap();
        let before = contests.len();
        contests.retain(|c| c.id != id);
        Ok(contests.len() != before)
    }

    async fn list_approved_photos(&self, contest_id: Uuid) -> RepoResult<Vec<ContestPhoto>> {
        self.check()?;
        Ok(self
            .photos
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.contest_id == contest_id && p.approved)
            .cloned()
            .collect())
    }

    async fn list_works(&self, filter: WorkFilter) -> RepoResult<Vec<ContestPhoto>> {
        self.check()?;
        Ok(self
            .photos
            .lock()
            .unwrap()
            .iter()
            .filter(|p| match filter {
                WorkFilter::All => true,
                WorkFilter::Approved => p.approved,
                WorkFilter::Pending => !p.approved,
            })
            .cloned()
            .collect())
    }

    async fn create_work(
        &self,
        req: CreateWorkRequest,
        uploaded_by: Uuid,
    ) -> RepoResult<ContestPhoto> {
        self.check()?;
        let work = ContestPhoto {
            id: Uuid::new_v4(),
            contest_id: req.contest_id,
            image_url: req.image_url,
            category: req.category,
            name: req.name,
            surname_initial: req.surname_initial,
            age: req.age,
            city: req.city,
            approved: true,
            uploaded_at: Utc::now(),
            uploaded_by: Some(uploaded_by),
            contest_title: None,
        };
        self.photos.lock().unwrap().push(work.clone());
        Ok(work)
    }

    async fn set_work_approval(
        &self,
        id: Uuid,
        approved: bool,
    ) -> RepoResult<Option<ContestPhoto>> {
        self.check()?;
        let mut photos = self.photos.lock().unwrap();
        Ok(photos.iter_mut().find(|p| p.id == id).map(|p| {
            p.approved = approved;
            p.clone()
        }))
    }

    async fn delete_work(&self, id: Uuid) -> RepoResult<bool> {
        self.check()?;
        let mut photos = self.photos.lock().unwrap();
        let before = photos.len();
        photos.retain(|p| p.id != id);
        Ok(photos.len() != before)
    }

    async fn list_news(&self, limit: Option<i64>) -> RepoResult<Vec<News>> {
        self.check()?;
        let mut news = self.news.lock().unwrap().clone();
        news.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        if let Some(limit) = limit {
            news.truncate(limit as usize);
        }
        Ok(news)
    }

    async fn get_news(&self, id: Uuid) -> RepoResult<Option<News>> {
        self.check()?;
        Ok(self.news.lock().unwrap().iter().find(|n| n.id == id).cloned())
    }

    async fn create_news(&self, req: CreateNewsRequest) -> RepoResult<News> {
        self.check()?;
        let news = News {
            id: Uuid::new_v4(),
            title: req.title,
            content: req.content,
            image_url: req.image_url,
            published_at: Utc::now(),
        };
        self.news.lock().unwrap().push(news.clone());
        Ok(news)
    }

    async fn delete_news(&self, id: Uuid) -> RepoResult<bool> {
        self.check()?;
        let mut news = self.news.lock().unwrap();
        let before = news.len();
        news.retain(|n| n.id != id);
        Ok(news.len() != before)
    }

    async fn list_faq(&self) -> RepoResult<Vec<FaqItem>> {
        self.check()?;
        let mut items = self.faq.lock().unwrap().clone();
        items.sort_by_key(|item| item.order);
        Ok(items)
    }

    async fn create_faq(&self, question: String, answer: String, order: i32) -> RepoResult<FaqItem> {
        self.check()?;
        let item = FaqItem {
            id: Uuid::new_v4(),
            question,
            answer,
            order,
        };
        self.faq.lock().unwrap().push(item.clone());
        Ok(item)
    }

    async fn update_faq(&self, id: Uuid, req: UpdateFaqRequest) -> RepoResult<Option<FaqItem>> {
        self.check()?;
        let mut items = self.faq.lock().unwrap();
        Ok(items.iter_mut().find(|i| i.id == id).map(|item| {
            if let Some(q) = req.question {
                item.question = q;
            }
            if let Some(a) = req.answer {
                item.answer = a;
            }
            item.clone()
        }))
    }

    async fn delete_faq(&self, id: Uuid) -> RepoResult<bool> {
        self.check()?;
        let mut items = self.faq.lock().unwrap();
        let before = items.len();
        items.retain(|i| i.id != id);
        Ok(items.len() != before)
    }

    async fn set_faq_order(&self, id: Uuid, order: i32) -> RepoResult<bool> {
        self.check()?;
        self.faq_writes.lock().unwrap().push((id, order));
        let mut items = self.faq.lock().unwrap();
        Ok(items
            .iter_mut()
            .find(|i| i.id == id)
            .map(|item| item.order = order)
            .is_some())
    }

    async fn get_stats(&self) -> RepoResult<DashboardStats> {
        self.check()?;
        let contests = self.contests.lock().unwrap();
        Ok(DashboardStats {
            total_contests: contests.len() as i64,
            active_contests: contests
                .iter()
                .filter(|c| c.status == ContestStatus::Active)
                .count() as i64,
            total_news: self.news.lock().unwrap().len() as i64,
            pending_works: self
                .photos
                .lock()
                .unwrap()
                .iter()
                .filter(|p| !p.approved)
                .count() as i64,
            ..Default::default()
        })
    }
}

// --- MOCK AUTH PROVIDER ---

/// Stand-in for Supabase Auth. Tokens are opaque strings registered with `issue_token`.
#[derive(Default)]
pub struct MockAuthProvider {
    pub tokens: Mutex<HashMap<String, Identity>>,
    // email -> (password, identity)
    pub users: Mutex<HashMap<String, (String, Identity)>>,
    pub auto_confirm: bool,
    pub unavailable: bool,
    pub delay: Option<Duration>,
    pub reset_requests: Mutex<Vec<String>>,
}

impl MockAuthProvider {
    pub fn issue_token(&self, identity: &Identity) -> String {
        let token = format!("token-{}", Uuid::new_v4());
        self.tokens
            .lock()
            .unwrap()
            .insert(token.clone(), identity.clone());
        token
    }

    pub fn add_user(&self, email: &str, password: &str, identity: &Identity) {
        self.users.lock().unwrap().insert(
            email.to_string(),
            (password.to_string(), identity.clone()),
        );
    }

    fn session_for(&self, identity: &Identity) -> AuthSession {
        AuthSession {
            access_token: self.issue_token(identity),
            refresh_token: Some("refresh".to_string()),
            expires_in: Some(3600),
            identity: identity.clone(),
        }
    }

    fn outage(&self) -> RepoResult<()> {
        if self.unavailable {
            return Err(BackendError::Rejected {
                status: 503,
                message: "service unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    async fn current_identity(&self, token: &str) -> Result<Option<Identity>, BackendError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outage()?;
        Ok(self.tokens.lock().unwrap().get(token).cloned())
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        _full_name: &str,
    ) -> Result<SignUpOutcome, BackendError> {
        self.outage()?;
        if self.users.lock().unwrap().contains_key(email) {
            return Err(BackendError::Rejected {
                status: 422,
                message: "User already registered".to_string(),
            });
        }
        let identity = identity_with_email(email);
        self.add_user(email, password, &identity);

        let session = self.auto_confirm.then(|| self.session_for(&identity));
        Ok(SignUpOutcome { identity, session })
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, BackendError> {
        self.outage()?;
        let found = self.users.lock().unwrap().get(email).cloned();
        match found {
            Some((stored, identity)) if stored == password => Ok(self.session_for(&identity)),
            _ => Err(BackendError::Rejected {
                status: 400,
                message: "Invalid login credentials".to_string(),
            }),
        }
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), BackendError> {
        self.outage()?;
        self.reset_requests.lock().unwrap().push(email.to_string());
        Ok(())
    }
}

// --- TEST UTILITIES ---

pub fn identity_with_email(email: &str) -> Identity {
    Identity {
        id: Uuid::new_v4(),
        email: email.to_string(),
        created_at: None,
        full_name: None,
    }
}

pub fn account_for(identity: &Identity, role: Role) -> AccountRecord {
    AccountRecord {
        id: identity.id,
        email: Some(identity.email.clone()),
        role,
        full_name: Some("Test Parent".to_string()),
        ..Default::default()
    }
}

pub fn contest(title: &str, status: ContestStatus) -> Contest {
    Contest {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: format!("{} description", title),
        cover_url: None,
        start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
        status,
        created_at: Utc::now(),
        created_by: None,
    }
}

pub fn photo(contest_id: Uuid, category: PhotoCategory, approved: bool) -> ContestPhoto {
    ContestPhoto {
        id: Uuid::new_v4(),
        contest_id,
        image_url: "http://localhost:9000/contest-photos/works/a.jpg".to_string(),
        category,
        name: "Masha".to_string(),
        surname_initial: "K".to_string(),
        age: 8,
        city: "Kazan".to_string(),
        approved,
        uploaded_at: Utc::now(),
        uploaded_by: None,
        contest_title: None,
    }
}

pub fn faq_item(question: &str, order: i32) -> FaqItem {
    FaqItem {
        id: Uuid::new_v4(),
        question: question.to_string(),
        answer: "Answer".to_string(),
        order,
    }
}

/// Short timeout so hung-backend tests finish quickly.
pub fn test_config() -> AppConfig {
    AppConfig {
        backend_timeout: Duration::from_millis(100),
        ..AppConfig::default()
    }
}

/// Handles to the mocks behind an `AppState`, for seeding and inspection.
pub struct TestApp {
    pub state: AppState,
    pub accounts: Arc<MockAccountStore>,
    pub content: Arc<MockContentRepo>,
    pub auth: Arc<MockAuthProvider>,
}

impl TestApp {
    pub fn new(accounts: MockAccountStore, content: MockContentRepo, auth: MockAuthProvider) -> Self {
        Self::with_config(accounts, content, auth, test_config())
    }

    pub fn with_config(
        accounts: MockAccountStore,
        content: MockContentRepo,
        auth: MockAuthProvider,
        config: AppConfig,
    ) -> Self {
        let accounts = Arc::new(accounts);
        let content = Arc::new(content);
        let auth = Arc::new(auth);

        let state = AppState::new(
            accounts.clone(),
            content.clone(),
            auth.clone(),
            Arc::new(MockStorageService::new()),
            config,
        );

        Self {
            state,
            accounts,
            content,
            auth,
        }
    }

    /// Registers a signed-in identity with the given role and returns its bearer token.
    pub fn sign_in_as(&self, role: Role) -> (Identity, String) {
        let identity = identity_with_email(&format!("{}@example.com", role.as_str()));
        self.accounts
            .records
            .lock()
            .unwrap()
            .insert(identity.id, account_for(&identity, role));
        let token = self.auth.issue_token(&identity);
        (identity, token)
    }

    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.router()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }
}

pub fn location(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub async fn body_json<T: serde::de::DeserializeOwned>(response: Response<Body>) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
