//! Repository tests against a live Postgres.
//!
//! Run with `DATABASE_URL=... cargo test -- --ignored`. Each test wipes the tables it uses,
//! so they run serially.

use chrono::{TimeZone, Utc};
use course_platform::{
    models::{
        ArticleFilter, ArticleRecord, CategoryRecord, ChapterFilter, ChapterRecord, CourseFilter,
        CourseRecord, Page, Role, SettingRecord, Sex, User, UserFilter, UserRecord,
    },
    repository::{PostgresRepository, RepoError, Repository},
};
use serial_test::serial;
use sqlx::PgPool;

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

        sqlx::query(
            "TRUNCATE likes, chapters, courses, categories, articles, users RESTART IDENTITY CASCADE",
        )
        .execute(&pool)
        .await
        .expect("Failed to reset tables.");

        DbTestContext { pool }
    }

    fn repository(&self) -> PostgresRepository {
        PostgresRepository::new(self.pool.clone())
    }
}

// --- Test Data Helpers ---

async fn create_test_user(repo: &PostgresRepository, username: &str, sex: Sex) -> User {
    repo.create_user(&UserRecord {
        email: format!("{username}@test.com"),
        username: username.to_string(),
        nickname: format!("{username}-nick"),
        password: "$argon2id$placeholder".to_string(),
        sex,
        role: Role::Ordinary,
        ..UserRecord::default()
    })
    .await
    .expect("Failed to create test user")
}

/// A category plus one course owned by `user_id`.
async fn create_test_course(repo: &PostgresRepository, user_id: i64, name: &str) -> (i64, i64) {
    let category = repo
        .create_category(&CategoryRecord {
            name: format!("{name}-分类"),
            rank: 1,
        })
        .await
        .expect("category");
    let course = repo
        .create_course(&CourseRecord {
            category_id: category.id,
            user_id,
            name: name.to_string(),
            ..CourseRecord::default()
        })
        .await
        .expect("course");
    (category.id, course.id)
}

// --- Tests ---

#[tokio::test]
#[ignore]
#[serial]
async fn test_article_soft_delete_round_trip() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    let article = repo
        .create_article(&ArticleRecord {
            title: "公告".to_string(),
            content: Some("正文".to_string()),
        })
        .await
        .unwrap();

    assert!(repo.delete_article(article.id).await.unwrap());
    assert!(repo.get_article(article.id).await.unwrap().is_none());
    assert!(!repo.delete_article(article.id).await.unwrap());

    let trash = repo
        .list_articles(
            &ArticleFilter {
                deleted: Some(true),
                ..ArticleFilter::default()
            },
            Page::default(),
        )
        .await
        .unwrap();
    assert_eq!(trash.total, 1);

    let still_there: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles WHERE id = $1")
        .bind(article.id)
        .fetch_one(&ctx.pool)
        .await
        .unwrap();
    assert_eq!(still_there, 1);

    assert!(repo.restore_article(article.id).await.unwrap());
    assert!(repo.get_article(article.id).await.unwrap().is_some());
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_unique_violation_maps_to_field() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    create_test_user(&repo, "alpha", Sex::Male).await;
    let err = repo
        .create_user(&UserRecord {
            email: "alpha@test.com".to_string(),
            username: "other".to_string(),
            nickname: "other".to_string(),
            password: "x".to_string(),
            ..UserRecord::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Duplicate("email")));

    let err = repo
        .create_user(&UserRecord {
            email: "new@test.com".to_string(),
            username: "alpha".to_string(),
            nickname: "other".to_string(),
            password: "x".to_string(),
            ..UserRecord::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Duplicate("username")));
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_user_filters_and_soft_delete() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    let alpha = create_test_user(&repo, "alpha", Sex::Male).await;
    create_test_user(&repo, "beta", Sex::Female).await;

    let found = repo
        .list_users(
            &UserFilter {
                nickname: Some("ALPHA".to_string()),
                ..UserFilter::default()
            },
            Page::default(),
        )
        .await
        .unwrap();
    assert_eq!(found.total, 1);
    assert_eq!(found.items[0].id, alpha.id);

    assert!(repo.delete_user(alpha.id).await.unwrap());
    assert!(repo.get_user(alpha.id).await.unwrap().is_none());
    assert!(repo.find_user_by_login("alpha").await.unwrap().is_none());
    assert!(repo.find_user_by_login("beta@test.com").await.unwrap().is_some());

    let everyone = repo.list_users(&UserFilter::default(), Page::default()).await.unwrap();
    assert_eq!(everyone.total, 1);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_course_filters_and_child_counts() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let owner = create_test_user(&repo, "owner", Sex::Male).await;
    let (category_id, course_id) = create_test_course(&repo, owner.id, "Rust 入门").await;

    repo.create_course(&CourseRecord {
        category_id,
        user_id: owner.id,
        name: "Rust 进阶".to_string(),
        recommended: true,
        ..CourseRecord::default()
    })
    .await
    .unwrap();

    let recommended = repo
        .list_courses(
            &CourseFilter {
                category_id: Some(category_id),
                recommended: Some(true),
                ..CourseFilter::default()
            },
            Page::default(),
        )
        .await
        .unwrap();
    assert_eq!(recommended.total, 1);
    assert_eq!(recommended.items[0].name, "Rust 进阶");

    assert_eq!(repo.count_courses_in_category(category_id).await.unwrap(), 2);

    for (title, rank) in [("第二章", 2), ("第一章", 1)] {
        repo.create_chapter(&ChapterRecord {
            course_id,
            title: title.to_string(),
            rank,
            ..ChapterRecord::default()
        })
        .await
        .unwrap();
    }
    assert_eq!(repo.count_chapters_in_course(course_id).await.unwrap(), 2);

    let siblings = repo.list_course_chapters(course_id).await.unwrap();
    assert_eq!(siblings[0].title, "第一章");

    let paged = repo
        .list_chapters(
            &ChapterFilter {
                course_id: Some(course_id),
                ..ChapterFilter::default()
            },
            Page::new(Some(1), Some(1)),
        )
        .await
        .unwrap();
    assert_eq!(paged.total, 2);
    assert_eq!(paged.items.len(), 1);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_likes_are_unique_and_scoped() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let fan = create_test_user(&repo, "fan", Sex::Female).await;
    let other = create_test_user(&repo, "other", Sex::Male).await;
    let (_, course_id) = create_test_course(&repo, fan.id, "热门课程").await;

    let like = repo.create_like(fan.id, course_id).await.unwrap().expect("first like");
    assert!(repo.create_like(fan.id, course_id).await.unwrap().is_none());

    let liked = repo.list_liked_courses(fan.id, Page::default()).await.unwrap();
    assert_eq!(liked.total, 1);
    assert_eq!(liked.items[0].id, course_id);

    assert!(!repo.delete_like(like.id, other.id).await.unwrap());
    assert!(repo.delete_like(like.id, fan.id).await.unwrap());
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_deleting_course_removes_its_likes() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let fan = create_test_user(&repo, "fan", Sex::Female).await;
    let (_, course_id) = create_test_course(&repo, fan.id, "短命课程").await;
    repo.create_like(fan.id, course_id).await.unwrap();

    assert!(repo.delete_course(course_id).await.unwrap());
    let likes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes")
        .fetch_one(&ctx.pool)
        .await
        .unwrap();
    assert_eq!(likes, 0);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_charts_aggregate_live_users() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    let a = create_test_user(&repo, "jan-a", Sex::Male).await;
    let b = create_test_user(&repo, "jan-b", Sex::Female).await;
    let c = create_test_user(&repo, "mar-c", Sex::Female).await;
    let gone = create_test_user(&repo, "gone", Sex::Male).await;
    repo.delete_user(gone.id).await.unwrap();

    for (id, at) in [
        (a.id, Utc.with_ymd_and_hms(2024, 1, 3, 8, 0, 0).unwrap()),
        (b.id, Utc.with_ymd_and_hms(2024, 1, 28, 8, 0, 0).unwrap()),
        (c.id, Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()),
    ] {
        sqlx::query("UPDATE users SET created_at = $1 WHERE id = $2")
            .bind(at)
            .bind(id)
            .execute(&ctx.pool)
            .await
            .unwrap();
    }

    let mut by_sex = repo.count_users_by_sex().await.unwrap();
    by_sex.sort_by_key(|(sex, _)| *sex as i16);
    assert_eq!(by_sex, vec![(Sex::Male, 1), (Sex::Female, 2)]);

    let by_month = repo.count_users_by_month().await.unwrap();
    assert_eq!(
        by_month,
        vec![("2024-01".to_string(), 2), ("2024-03".to_string(), 1)]
    );
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_setting_update() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();

    let current = repo.get_setting().await.unwrap().expect("seeded settings row");
    let updated = repo
        .update_setting(
            current.id,
            &SettingRecord {
                name: current.name.clone(),
                icp: Some("鄂ICP备12345678号".to_string()),
                copyright: current.copyright.clone(),
            },
        )
        .await
        .unwrap()
        .expect("updated row");
    assert_eq!(updated.icp.as_deref(), Some("鄂ICP备12345678号"));
    assert_eq!(updated.name, current.name);
    assert!(updated.updated_at >= current.updated_at);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_concurrent_likes_insert_once() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let fan = create_test_user(&repo, "fan", Sex::Female).await;
    let (_, course_id) = create_test_course(&repo, fan.id, "并发课程").await;

    let (first, second) = tokio::join!(
        repo.create_like(fan.id, course_id),
        repo.create_like(fan.id, course_id),
    );
    let inserted = [first.unwrap(), second.unwrap()]
        .into_iter()
        .filter(Option::is_some)
        .count();
    assert_eq!(inserted, 1);

    let likes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE user_id = $1")
        .bind(fan.id)
        .fetch_one(&ctx.pool)
        .await
        .unwrap();
    assert_eq!(likes, 1);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_search_treats_wildcards_literally() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let owner = create_test_user(&repo, "owner", Sex::Male).await;
    let (category_id, _) = create_test_course(&repo, owner.id, "100% 实战").await;
    repo.create_course(&CourseRecord {
        category_id,
        user_id: owner.id,
        name: "1000 道练习".to_string(),
        ..CourseRecord::default()
    })
    .await
    .unwrap();
    repo.create_course(&CourseRecord {
        category_id,
        user_id: owner.id,
        name: "axb 入门".to_string(),
        ..CourseRecord::default()
    })
    .await
    .unwrap();

    let search = |name: &str| CourseFilter {
        name: Some(name.to_string()),
        ..CourseFilter::default()
    };

    let percent = repo.list_courses(&search("100%"), Page::default()).await.unwrap();
    assert_eq!(percent.total, 1);
    assert_eq!(percent.items[0].name, "100% 实战");

    let underscore = repo.list_courses(&search("a_b"), Page::default()).await.unwrap();
    assert_eq!(underscore.total, 0);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_courses_owned_by_user() {
    let ctx = DbTestContext::setup().await;
    let repo = ctx.repository();
    let owner = create_test_user(&repo, "owner", Sex::Male).await;
    let idle = create_test_user(&repo, "idle", Sex::Male).await;
    create_test_course(&repo, owner.id, "有主课程").await;

    assert_eq!(repo.count_courses_owned_by(owner.id).await.unwrap(), 1);
    assert_eq!(repo.count_courses_owned_by(idle.id).await.unwrap(), 0);
}
