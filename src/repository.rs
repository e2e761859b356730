use crate::error::BackendError;
use crate::models::{
    AccountRecord, Contest, ContestPhoto, ContestStatus, CreateContestRequest, CreateNewsRequest,
    CreateWorkRequest, DashboardStats, FaqItem, NewAccountRecord, News, PhotoCategory,
    ProfileUpdate, Role, UpdateContestRequest, UpdateFaqRequest, WorkFilter,
};
use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Row, postgres::PgRow, query_builder::QueryBuilder};
use std::sync::Arc;
use uuid::Uuid;

pub type RepoResult<T> = Result<T, BackendError>;

/// AccountStore
///
/// The account-record operations the access policy and the auth flows need from the backend.
/// Kept separate from content so the policy can be exercised against a small in-memory double.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// `Ok(None)` when no record exists for the identity yet.
    async fn fetch_account_record(&self, id: Uuid) -> RepoResult<Option<AccountRecord>>;
    async fn create_account_record(&self, record: NewAccountRecord) -> RepoResult<AccountRecord>;
    async fn count_admin_accounts(&self) -> RepoResult<i64>;
    // Self-service update. Uses COALESCE for partial updates.
    async fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> RepoResult<Option<AccountRecord>>;
}

/// ContentRepository
///
/// Pass-through persistence for contests, submitted works, news and FAQ.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    // --- Contests ---
    async fn list_contests(
        &self,
        status: Option<ContestStatus>,
        limit: Option<i64>,
    ) -> RepoResult<Vec<Contest>>;
    async fn get_contest(&self, id: Uuid) -> RepoResult<Option<Contest>>;
    async fn create_contest(
        &self,
        req: CreateContestRequest,
        created_by: Uuid,
    ) -> RepoResult<Contest>;
    async fn update_contest(
        &self,
        id: Uuid,
        req: UpdateContestRequest,
    ) -> RepoResult<Option<Contest>>;
    async fn delete_contest(&self, id: Uuid) -> RepoResult<bool>;

    // --- Works ---
    // Public gallery: approved works of one contest only.
    async fn list_approved_photos(&self, contest_id: Uuid) -> RepoResult<Vec<ContestPhoto>>;
    // Admin moderation queue, joined with the contest title.
    async fn list_works(&self, filter: WorkFilter) -> RepoResult<Vec<ContestPhoto>>;
    async fn create_work(&self, req: CreateWorkRequest, uploaded_by: Uuid)
    -> RepoResult<ContestPhoto>;
    async fn set_work_approval(&self, id: Uuid, approved: bool)
    -> RepoResult<Option<ContestPhoto>>;
    async fn delete_work(&self, id: Uuid) -> RepoResult<bool>;

    // --- News ---
    async fn list_news(&self, limit: Option<i64>) -> RepoResult<Vec<News>>;
    async fn get_news(&self, id: Uuid) -> RepoResult<Option<News>>;
    async fn create_news(&self, req: CreateNewsRequest) -> RepoResult<News>;
    async fn delete_news(&self, id: Uuid) -> RepoResult<bool>;

    // --- FAQ ---
    async fn list_faq(&self) -> RepoResult<Vec<FaqItem>>;
    async fn create_faq(&self, question: String, answer: String, order: i32)
    -> RepoResult<FaqItem>;
    async fn update_faq(&self, id: Uuid, req: UpdateFaqRequest) -> RepoResult<Option<FaqItem>>;
    async fn delete_faq(&self, id: Uuid) -> RepoResult<bool>;
    async fn set_faq_order(&self, id: Uuid, order: i32) -> RepoResult<bool>;

    async fn get_stats(&self) -> RepoResult<DashboardStats>;
}

/// AccountStoreState / ContentState
///
/// The concrete types used to share the persistence layer across the application state.
pub type AccountStoreState = Arc<dyn AccountStore>;
pub type ContentState = Arc<dyn ContentRepository>;

// --- Row Mapping ---

// Text-backed enums are decoded by hand so unknown values degrade instead of failing the row.

impl<'r> FromRow<'r, PgRow> for AccountRecord {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let role: Option<String> = row.try_get("role")?;
        Ok(AccountRecord {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            role: Role::from_db(role.as_deref()),
            full_name: row.try_get("full_name")?,
            child_name: row.try_get("child_name")?,
            age: row.try_get("age")?,
            city: row.try_get("city")?,
            phone: row.try_get("phone")?,
            consent_terms: row.try_get("consent_terms")?,
            consent_privacy: row.try_get("consent_privacy")?,
            consent_personal_data: row.try_get("consent_personal_data")?,
            consent_given_at: row.try_get("consent_given_at")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for Contest {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        Ok(Contest {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            cover_url: row.try_get("cover_url")?,
            start_date: row.try_get("start_date")?,
            end_date: row.try_get("end_date")?,
            status: ContestStatus::from_db(&status),
            created_at: row.try_get("created_at")?,
            created_by: row.try_get("created_by")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for ContestPhoto {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let category: String = row.try_get("category")?;
        // Only present in the admin listing, which joins `contests`.
        let contest_title = match row.try_get("contest_title") {
            Ok(title) => title,
            Err(sqlx::Error::ColumnNotFound(_)) => None,
            Err(e) => return Err(e),
        };
        Ok(ContestPhoto {
            id: row.try_get("id")?,
            contest_id: row.try_get("contest_id")?,
            image_url: row.try_get("image_url")?,
            category: PhotoCategory::from_db(&category),
            name: row.try_get("name")?,
            surname_initial: row.try_get("surname_initial")?,
            age: row.try_get("age")?,
            city: row.try_get("city")?,
            approved: row.try_get("approved")?,
            uploaded_at: row.try_get("uploaded_at")?,
            uploaded_by: row.try_get("uploaded_by")?,
            contest_title,
        })
    }
}

/// PostgresRepository
///
/// The concrete implementation of both stores, backed by the Supabase Postgres database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PostgresRepository {
    async fn fetch_account_record(&self, id: Uuid) -> RepoResult<Option<AccountRecord>> {
        let record = sqlx::query_as::<_, AccountRecord>(
            r#"SELECT id, email, role, full_name, child_name, age, city, phone,
                      consent_terms, consent_privacy, consent_personal_data, consent_given_at,
                      created_at, updated_at
               FROM profiles
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    /// create_account_record
    ///
    /// Inserts the profile that mirrors a Supabase Auth user. The role is written explicitly,
    /// so the bootstrap decision made by the caller is what lands in the row.
    async fn create_account_record(&self, record: NewAccountRecord) -> RepoResult<AccountRecord> {
        let created = sqlx::query_as::<_, AccountRecord>(
            r#"INSERT INTO profiles (
                   id, email, role, full_name, child_name, age, city, phone,
                   consent_terms, consent_privacy, consent_personal_data, consent_given_at,
                   created_at, updated_at
               )
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, NOW(), NOW())
               RETURNING id, email, role, full_name, child_name, age, city, phone,
                         consent_terms, consent_privacy, consent_personal_data, consent_given_at,
                         created_at, updated_at"#,
        )
        .bind(record.id)
        .bind(record.email)
        .bind(record.role.as_str())
        .bind(record.full_name)
        .bind(record.child_name)
        .bind(record.age)
        .bind(record.city)
        .bind(record.phone)
        .bind(record.consent_terms)
        .bind(record.consent_privacy)
        .bind(record.consent_personal_data)
        .bind(record.consent_given_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn count_admin_accounts(&self) -> RepoResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM profiles WHERE role = 'admin'")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> RepoResult<Option<AccountRecord>> {
        let record = sqlx::query_as::<_, AccountRecord>(
            r#"UPDATE profiles
               SET full_name = COALESCE($2, full_name),
                   child_name = COALESCE($3, child_name),
                   age = COALESCE($4, age),
                   city = COALESCE($5, city),
                   phone = COALESCE($6, phone),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING id, email, role, full_name, child_name, age, city, phone,
                         consent_terms, consent_privacy, consent_personal_data, consent_given_at,
                         created_at, updated_at"#,
        )
        .bind(id)
        .bind(update.full_name)
        .bind(update.child_name)
        .bind(update.age)
        .bind(update.city)
        .bind(update.phone)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }
}

#[async_trait]
impl ContentRepository for PostgresRepository {
    /// list_contests
    ///
    /// Builds the query with QueryBuilder so the optional status filter and limit stay
    /// parameterized. Newest first.
    async fn list_contests(
        &self,
        status: Option<ContestStatus>,
        limit: Option<i64>,
    ) -> RepoResult<Vec<Contest>> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(
            r#"
            SELECT id, title, description, cover_url, start_date, end_date,
                   status, created_at, created_by
            FROM contests
            WHERE TRUE
            "#,
        );

        if let Some(status) = status {
            builder.push(" AND status = ");
            builder.push_bind(status.as_str());
        }

        builder.push(" ORDER BY created_at DESC");

        if let Some(limit) = limit {
            builder.push(" LIMIT ");
            builder.push_bind(limit);
        }

        let contests = builder
            .build_query_as::<Contest>()
            .fetch_all(&self.pool)
            .await?;
        Ok(contests)
    }

    async fn get_contest(&self, id: Uuid) -> RepoResult<Option<Contest>> {
        let contest = sqlx::query_as::<_, Contest>(
            r#"SELECT id, title, description, cover_url, start_date, end_date,
                      status, created_at, created_by
               FROM contests
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(contest)
    }

    async fn create_contest(
        &self,
        req: CreateContestRequest,
        created_by: Uuid,
    ) -> RepoResult<Contest> {
        let contest = sqlx::query_as::<_, Contest>(
            r#"INSERT INTO contests (id, title, description, cover_url, start_date, end_date, status, created_at, created_by)
               VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), $8)
               RETURNING id, title, description, cover_url, start_date, end_date,
                         status, created_at, created_by"#,
        )
        .bind(Uuid::new_v4())
        .bind(req.title)
        .bind(req.description)
        .bind(req.cover_url)
        .bind(req.start_date)
        .bind(req.end_date)
        .bind(req.status.as_str())
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(contest)
    }

    async fn update_contest(
        &self,
        id: Uuid,
        req: UpdateContestRequest,
    ) -> RepoResult<Option<Contest>> {
        let contest = sqlx::query_as::<_, Contest>(
            r#"UPDATE contests
               SET title = COALESCE($2, title),
                   description = COALESCE($3, description),
                   cover_url = COALESCE($4, cover_url),
                   start_date = COALESCE($5, start_date),
                   end_date = COALESCE($6, end_date),
                   status = COALESCE($7, status)
               WHERE id = $1
               RETURNING id, title, description, cover_url, start_date, end_date,
                         status, created_at, created_by"#,
        )
        .bind(id)
        .bind(req.title)
        .bind(req.description)
        .bind(req.cover_url)
        .bind(req.start_date)
        .bind(req.end_date)
        .bind(req.status.map(|s| s.as_str()))
        .fetch_optional(&self.pool)
        .await?;
        Ok(contest)
    }

    async fn delete_contest(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM contests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_approved_photos(&self, contest_id: Uuid) -> RepoResult<Vec<ContestPhoto>> {
        let photos = sqlx::query_as::<_, ContestPhoto>(
            r#"SELECT id, contest_id, image_url, category, name, surname_initial, age, city,
                      approved, uploaded_at, uploaded_by
               FROM contest_photos
               WHERE contest_id = $1 AND approved = true
               ORDER BY uploaded_at DESC"#,
        )
        .bind(contest_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(photos)
    }

    async fn list_works(&self, filter: WorkFilter) -> RepoResult<Vec<ContestPhoto>> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(
            r#"
            SELECT w.id, w.contest_id, w.image_url, w.category, w.name, w.surname_initial,
                   w.age, w.city, w.approved, w.uploaded_at, w.uploaded_by,
                   c.title AS contest_title
            FROM contest_photos w
            LEFT JOIN contests c ON c.id = w.contest_id
            "#,
        );

        match filter {
            WorkFilter::All => {}
            WorkFilter::Approved => {
                builder.push(" WHERE w.approved = true");
            }
            WorkFilter::Pending => {
                builder.push(" WHERE w.approved = false");
            }
        }

        builder.push(" ORDER BY w.uploaded_at DESC");

        let works = builder
            .build_query_as::<ContestPhoto>()
            .fetch_all(&self.pool)
            .await?;
        Ok(works)
    }

    /// create_work
    ///
    /// Works entered by an administrator are approved immediately.
    async fn create_work(
        &self,
        req: CreateWorkRequest,
        uploaded_by: Uuid,
    ) -> RepoResult<ContestPhoto> {
        let work = sqlx::query_as::<_, ContestPhoto>(
            r#"INSERT INTO contest_photos (id, contest_id, image_url, category, name, surname_initial, age, city, approved, uploaded_at, uploaded_by)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, true, NOW(), $9)
               RETURNING id, contest_id, image_url, category, name, surname_initial, age, city,
                         approved, uploaded_at, uploaded_by"#,
        )
        .bind(Uuid::new_v4())
        .bind(req.contest_id)
        .bind(req.image_url)
        .bind(req.category.as_str())
        .bind(req.name)
        .bind(req.surname_initial)
        .bind(req.age)
        .bind(req.city)
        .bind(uploaded_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(work)
    }

    async fn set_work_approval(
        &self,
        id: Uuid,
        approved: bool,
    ) -> RepoResult<Option<ContestPhoto>> {
        let work = sqlx::query_as::<_, ContestPhoto>(
            r#"UPDATE contest_photos SET approved = $2 WHERE id = $1
               RETURNING id, contest_id, image_url, category, name, surname_initial, age, city,
                         approved, uploaded_at, uploaded_by"#,
        )
        .bind(id)
        .bind(approved)
        .fetch_optional(&self.pool)
        .await?;
        Ok(work)
    }

    async fn delete_work(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM contest_photos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_news(&self, limit: Option<i64>) -> RepoResult<Vec<News>> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(
            "SELECT id, title, content, image_url, published_at FROM news ORDER BY published_at DESC",
        );
        if let Some(limit) = limit {
            builder.push(" LIMIT ");
            builder.push_bind(limit);
        }
        let news = builder
            .build_query_as::<News>()
            .fetch_all(&self.pool)
            .await?;
        Ok(news)
    }

    async fn get_news(&self, id: Uuid) -> RepoResult<Option<News>> {
        let news = sqlx::query_as::<_, News>(
            "SELECT id, title, content, image_url, published_at FROM news WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(news)
    }

    async fn create_news(&self, req: CreateNewsRequest) -> RepoResult<News> {
        let news = sqlx::query_as::<_, News>(
            r#"INSERT INTO news (id, title, content, image_url, published_at)
               VALUES ($1, $2, $3, $4, NOW())
               RETURNING id, title, content, image_url, published_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(req.title)
        .bind(req.content)
        .bind(req.image_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(news)
    }

    async fn delete_news(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM news WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_faq(&self) -> RepoResult<Vec<FaqItem>> {
        let items = sqlx::query_as::<_, FaqItem>(
            r#"SELECT id, question, answer, "order" FROM faq ORDER BY "order" ASC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn create_faq(&self, question: String, answer: String, order: i32) -> RepoResult<FaqItem> {
        let item = sqlx::query_as::<_, FaqItem>(
            r#"INSERT INTO faq (id, question, answer, "order") VALUES ($1, $2, $3, $4)
               RETURNING id, question, answer, "order""#,
        )
        .bind(Uuid::new_v4())
        .bind(question)
        .bind(answer)
        .bind(order)
        .fetch_one(&self.pool)
        .await?;
        Ok(item)
    }

    async fn update_faq(&self, id: Uuid, req: UpdateFaqRequest) -> RepoResult<Option<FaqItem>> {
        let item = sqlx::query_as::<_, FaqItem>(
            r#"UPDATE faq
               SET question = COALESCE($2, question),
                   answer = COALESCE($3, answer)
               WHERE id = $1
               RETURNING id, question, answer, "order""#,
        )
        .bind(id)
        .bind(req.question)
        .bind(req.answer)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    async fn delete_faq(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM faq WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_faq_order(&self, id: Uuid, order: i32) -> RepoResult<bool> {
        let result = sqlx::query(r#"UPDATE faq SET "order" = $2 WHERE id = $1"#)
            .bind(id)
            .bind(order)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// get_stats
    ///
    /// Compiles all counters for the admin dashboard.
    async fn get_stats(&self) -> RepoResult<DashboardStats> {
        let count = |sql: &'static str| sqlx::query_scalar::<_, i64>(sql).fetch_one(&self.pool);

        Ok(DashboardStats {
            total_users: count("SELECT COUNT(*) FROM profiles").await?,
            total_admins: count("SELECT COUNT(*) FROM profiles WHERE role = 'admin'").await?,
            total_contests: count("SELECT COUNT(*) FROM contests").await?,
            active_contests: count("SELECT COUNT(*) FROM contests WHERE status = 'active'").await?,
            total_news: count("SELECT COUNT(*) FROM news").await?,
            pending_works: count("SELECT COUNT(*) FROM contest_photos WHERE approved = false")
                .await?,
        })
    }
}
