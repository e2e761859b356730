use chrono::NaiveDate;
use sqlx::PgPool;
use tokio::test;
use uuid::Uuid;
use vektor_portal::{
    models::{
        ContestStatus, CreateContestRequest, CreateNewsRequest, CreateWorkRequest,
        NewAccountRecord, PhotoCategory, ProfileUpdate, Role, UpdateContestRequest,
        UpdateFaqRequest, WorkFilter,
    },
    repository::{AccountStore, ContentRepository, PostgresRepository},
};

// These tests need a migrated local Postgres: `DATABASE_URL=... cargo test -- --ignored`.

// --- Test Context and Setup ---

struct DbTestContext {
    pool: PgPool,
}

impl DbTestContext {
    async fn setup() -> Self {
        dotenv::dotenv().ok();

        let db_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set to run integration tests");

        let pool = PgPool::connect(&db_url)
            .await
            .expect("Failed to connect to database for integration tests.");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run database migrations.");

        DbTestContext { pool }
    }

    fn repository(&self) -> PostgresRepository {
        PostgresRepository::new(self.pool.clone())
    }
}

// --- Test Data Helpers ---

async fn create_account(repo: &PostgresRepository, role: Role) -> Uuid {
    let id = Uuid::new_v4();
    repo.create_account_record(NewAccountRecord {
        id,
        email: Some(format!("{}@test.com", id)),
        role,
        ..Default::default()
    })
    .await
    .expect("Failed to create test account");
    id
}

fn contest_request(title: &str, status: ContestStatus) -> CreateContestRequest {
    CreateContestRequest {
        title: title.to_string(),
        description: "Integration contest".to_string(),
        cover_url: None,
        start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
        status,
    }
}

// --- Account Records ---

#[test]
#[ignore = "requires Postgres"]
async fn test_account_record_roundtrip() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    let id = create_account(&repo, Role::Admin).await;
    let record = repo.fetch_account_record(id).await.unwrap().unwrap();

    assert_eq!(record.role, Role::Admin);
    assert!(repo.count_admin_accounts().await.unwrap() >= 1);
    assert!(repo.fetch_account_record(Uuid::new_v4()).await.unwrap().is_none());
}

#[test]
#[ignore = "requires Postgres"]
async fn test_update_profile_partial() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    let id = create_account(&repo, Role::User).await;
    let updated = repo
        .update_profile(
            id,
            ProfileUpdate {
                city: Some("Kazan".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.city.as_deref(), Some("Kazan"));
    assert_eq!(updated.role, Role::User);
    assert!(
        repo.update_profile(Uuid::new_v4(), ProfileUpdate::default())
            .await
            .unwrap()
            .is_none()
    );
}

// --- Contests & Works ---

#[test]
#[ignore = "requires Postgres"]
async fn test_contest_lifecycle() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let admin = create_account(&repo, Role::Admin).await;

    let contest = repo
        .create_contest(contest_request("Lifecycle", ContestStatus::Upcoming), admin)
        .await
        .unwrap();
    assert_eq!(contest.created_by, Some(admin));

    let upcoming = repo
        .list_contests(Some(ContestStatus::Upcoming), None)
        .await
        .unwrap();
    assert!(upcoming.iter().any(|c| c.id == contest.id));

    let updated = repo
        .update_contest(
            contest.id,
            UpdateContestRequest {
                status: Some(ContestStatus::Active),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, ContestStatus::Active);
    assert_eq!(updated.title, "Lifecycle");

    assert!(repo.delete_contest(contest.id).await.unwrap());
    assert!(repo.get_contest(contest.id).await.unwrap().is_none());
    assert!(!repo.delete_contest(contest.id).await.unwrap());
}

#[test]
#[ignore = "requires Postgres"]
async fn test_works_visibility_and_moderation() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let admin = create_account(&repo, Role::Admin).await;

    let contest = repo
        .create_contest(contest_request("Gallery", ContestStatus::Finished), admin)
        .await
        .unwrap();

    let work = repo
        .create_work(
            CreateWorkRequest {
                contest_id: contest.id,
                image_url: "http://localhost:9000/contest-photos/works/x.jpg".to_string(),
                name: "Masha".to_string(),
                surname_initial: "K".to_string(),
                age: 8,
                city: "Kazan".to_string(),
                category: PhotoCategory::Winner,
            },
            admin,
        )
        .await
        .unwrap();
    assert!(work.approved);

    let visible = repo.list_approved_photos(contest.id).await.unwrap();
    assert_eq!(visible.len(), 1);

    repo.set_work_approval(work.id, false).await.unwrap().unwrap();
    assert!(repo.list_approved_photos(contest.id).await.unwrap().is_empty());

    let pending = repo.list_works(WorkFilter::Pending).await.unwrap();
    let listed = pending.iter().find(|w| w.id == work.id).unwrap();
    assert_eq!(listed.contest_title.as_deref(), Some("Gallery"));

    assert!(repo.delete_work(work.id).await.unwrap());
    repo.delete_contest(contest.id).await.unwrap();
}

// --- News & FAQ ---

#[test]
#[ignore = "requires Postgres"]
async fn test_news_roundtrip() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    let news = repo
        .create_news(CreateNewsRequest {
            title: "Integration".to_string(),
            content: "Body".to_string(),
            image_url: None,
        })
        .await
        .unwrap();

    let latest = repo.list_news(Some(1)).await.unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(repo.get_news(news.id).await.unwrap().unwrap().title, "Integration");
    assert!(repo.delete_news(news.id).await.unwrap());
}

#[test]
#[ignore = "requires Postgres"]
async fn test_faq_order_column() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    let item = repo
        .create_faq("Q?".to_string(), "A".to_string(), 900)
        .await
        .unwrap();
    assert_eq!(item.order, 900);

    assert!(repo.set_faq_order(item.id, 901).await.unwrap());
    let updated = repo
        .update_faq(
            item.id,
            UpdateFaqRequest {
                question: Some("Q2?".to_string()),
                answer: None,
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.order, 901);
    assert_eq!(updated.answer, "A");

    let all = repo.list_faq().await.unwrap();
    assert!(all.windows(2).all(|pair| pair[0].order <= pair[1].order));

    assert!(repo.delete_faq(item.id).await.unwrap());
}

#[test]
#[ignore = "requires Postgres"]
async fn test_stats() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    create_account(&repo, Role::Admin).await;

    let stats = repo.get_stats().await.unwrap();
    assert!(stats.total_users >= 1);
    assert!(stats.total_admins >= 1);
}
