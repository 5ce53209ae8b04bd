use async_trait::async_trait;
use sqlx::{PgPool, Postgres, postgres::PgRow, query_builder::QueryBuilder};

use super::{RepoError, RepoResult, Repository};
use crate::models::{
    Article, ArticleFilter, ArticleRecord, Category, CategoryRecord, Chapter, ChapterFilter,
    ChapterRecord, ChapterSummary, Course, CourseFilter, CourseRecord, DeletionPolicy, Entity, Like,
    Page, Paged, Setting, SettingRecord, Sex, User, UserFilter, UserRecord,
};

const USER_COLUMNS: &str = "id, email, username, nickname, password, avatar, sex, company, introduce, role, created_at, updated_at, deleted_at";
const ARTICLE_COLUMNS: &str = "id, title, content, created_at, updated_at, deleted_at";
const CATEGORY_COLUMNS: &str = "id, name, rank, created_at, updated_at";
const COURSE_COLUMNS: &str = "id, category_id, user_id, name, image, recommended, introductory, content, created_at, updated_at";
const CHAPTER_COLUMNS: &str = "id, course_id, title, content, video, rank, created_at, updated_at";
const SETTING_COLUMNS: &str = "id, name, icp, copyright, created_at, updated_at";

/// Maps the migration's unique constraints to the request field they protect.
fn constraint_field(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("users_email_key") => "email",
        Some("users_username_key") => "username",
        Some("categories_name_key") => "name",
        Some("likes_user_id_course_id_key") => "courseId",
        _ => "id",
    }
}

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return RepoError::Duplicate(constraint_field(db.constraint()));
            }
        }
        tracing::error!("database error: {:?}", e);
        RepoError::Database(e)
    }
}

/// Wraps `value` for a substring `ILIKE ... ESCAPE '\'`. Wildcards typed by the client match
/// literally.
fn like_pattern(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('%');
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// PostgresRepository
///
/// The production implementation of `Repository`, backed by a shared `PgPool`.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs the count and the page query with the same filter clauses.
    ///
    /// `base` must end inside a WHERE clause so that filters can append ` AND ...`.
    async fn fetch_paged<T>(
        &self,
        columns: &str,
        base: &str,
        filters: impl Fn(&mut QueryBuilder<'_, Postgres>),
        order: &str,
        page: Page,
    ) -> RepoResult<Paged<T>>
    where
        T: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut count: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) ");
        count.push(base);
        filters(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select: QueryBuilder<Postgres> = QueryBuilder::new("SELECT ");
        select.push(columns);
        select.push(" ");
        select.push(base);
        filters(&mut select);
        select.push(" ORDER BY ");
        select.push(order);
        select.push(" LIMIT ");
        select.push_bind(page.limit());
        select.push(" OFFSET ");
        select.push_bind(page.offset());
        let items = select.build_query_as::<T>().fetch_all(&self.pool).await?;

        Ok(Paged { items, total })
    }

    /// Deletes a row according to the entity's deletion policy.
    ///
    /// Soft deletes only touch live rows, so deleting twice reports `false` the second time.
    async fn delete_by_policy<E: Entity>(&self, id: i64) -> RepoResult<bool> {
        let sql = match E::DELETION {
            DeletionPolicy::Soft => format!(
                "UPDATE {} SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
                E::TABLE
            ),
            DeletionPolicy::Hard => format!("DELETE FROM {} WHERE id = $1", E::TABLE),
        };
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_where(&self, sql: &str, id: i64) -> RepoResult<i64> {
        Ok(sqlx::query_scalar(sql).bind(id).fetch_one(&self.pool).await?)
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- ARTICLES ---

    async fn list_articles(&self, filter: &ArticleFilter, page: Page) -> RepoResult<Paged<Article>> {
        let base = if filter.deleted == Some(true) {
            "FROM articles WHERE deleted_at IS NOT NULL"
        } else {
            "FROM articles WHERE deleted_at IS NULL"
        };
        self.fetch_paged(
            ARTICLE_COLUMNS,
            base,
            |q| {
                if let Some(title) = &filter.title {
                    q.push(" AND title ILIKE ");
                    q.push_bind(like_pattern(title));
                    q.push(" ESCAPE '\\'");
                }
            },
            "id DESC",
            page,
        )
        .await
    }

    async fn get_article(&self, id: i64) -> RepoResult<Option<Article>> {
        let sql = format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = $1 AND deleted_at IS NULL");
        Ok(sqlx::query_as::<_, Article>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_article(&self, record: &ArticleRecord) -> RepoResult<Article> {
        let sql = format!(
            "INSERT INTO articles (title, content) VALUES ($1, $2) RETURNING {ARTICLE_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Article>(&sql)
            .bind(&record.title)
            .bind(&record.content)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_article(&self, id: i64, record: &ArticleRecord) -> RepoResult<Option<Article>> {
        let sql = format!(
            r#"UPDATE articles SET title = $2, content = $3, updated_at = NOW()
               WHERE id = $1 AND deleted_at IS NULL
               RETURNING {ARTICLE_COLUMNS}"#
        );
        Ok(sqlx::query_as::<_, Article>(&sql)
            .bind(id)
            .bind(&record.title)
            .bind(&record.content)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_article(&self, id: i64) -> RepoResult<bool> {
        self.delete_by_policy::<Article>(id).await
    }

    async fn restore_article(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query(
            "UPDATE articles SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- CATEGORIES ---

    async fn list_categories(&self) -> RepoResult<Vec<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY rank ASC, id DESC");
        Ok(sqlx::query_as::<_, Category>(&sql).fetch_all(&self.pool).await?)
    }

    async fn get_category(&self, id: i64) -> RepoResult<Option<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1");
        Ok(sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_category(&self, record: &CategoryRecord) -> RepoResult<Category> {
        let sql = format!("INSERT INTO categories (name, rank) VALUES ($1, $2) RETURNING {CATEGORY_COLUMNS}");
        Ok(sqlx::query_as::<_, Category>(&sql)
            .bind(&record.name)
            .bind(record.rank)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_category(&self, id: i64, record: &CategoryRecord) -> RepoResult<Option<Category>> {
        let sql = format!(
            "UPDATE categories SET name = $2, rank = $3, updated_at = NOW() WHERE id = $1 RETURNING {CATEGORY_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .bind(&record.name)
            .bind(record.rank)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_category(&self, id: i64) -> RepoResult<bool> {
        self.delete_by_policy::<Category>(id).await
    }

    async fn count_courses_in_category(&self, category_id: i64) -> RepoResult<i64> {
        self.count_where("SELECT COUNT(*) FROM courses WHERE category_id = $1", category_id)
            .await
    }

    // --- USERS ---

    async fn count_courses_owned_by(&self, user_id: i64) -> RepoResult<i64> {
        self.count_where("SELECT COUNT(*) FROM courses WHERE user_id = $1", user_id)
            .await
    }

    async fn list_users(&self, filter: &UserFilter, page: Page) -> RepoResult<Paged<User>> {
        self.fetch_paged(
            USER_COLUMNS,
            "FROM users WHERE deleted_at IS NULL",
            |q| {
                if let Some(email) = &filter.email {
                    q.push(" AND email = ");
                    q.push_bind(email.clone());
                }
                if let Some(username) = &filter.username {
                    q.push(" AND username = ");
                    q.push_bind(username.clone());
                }
                if let Some(nickname) = &filter.nickname {
                    q.push(" AND nickname ILIKE ");
                    q.push_bind(like_pattern(nickname));
                    q.push(" ESCAPE '\\'");
                }
                if let Some(role) = filter.role {
                    q.push(" AND role = ");
                    q.push_bind(role);
                }
            },
            "id DESC",
            page,
        )
        .await
    }

    async fn get_user(&self, id: i64) -> RepoResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_login(&self, login: &str) -> RepoResult<Option<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE (email = $1 OR username = $1) AND deleted_at IS NULL"
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(login)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_user(&self, record: &UserRecord) -> RepoResult<User> {
        let sql = format!(
            r#"INSERT INTO users (email, username, nickname, password, sex, avatar, company, introduce, role)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
               RETURNING {USER_COLUMNS}"#
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(&record.email)
            .bind(&record.username)
            .bind(&record.nickname)
            .bind(&record.password)
            .bind(record.sex)
            .bind(&record.avatar)
            .bind(&record.company)
            .bind(&record.introduce)
            .bind(record.role)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_user(&self, id: i64, record: &UserRecord) -> RepoResult<Option<User>> {
        let sql = format!(
            r#"UPDATE users
               SET email = $2, username = $3, nickname = $4, password = $5, sex = $6,
                   avatar = $7, company = $8, introduce = $9, role = $10, updated_at = NOW()
               WHERE id = $1 AND deleted_at IS NULL
               RETURNING {USER_COLUMNS}"#
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(&record.email)
            .bind(&record.username)
            .bind(&record.nickname)
            .bind(&record.password)
            .bind(record.sex)
            .bind(&record.avatar)
            .bind(&record.company)
            .bind(&record.introduce)
            .bind(record.role)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_user(&self, id: i64) -> RepoResult<bool> {
        self.delete_by_policy::<User>(id).await
    }

    async fn count_users_by_sex(&self) -> RepoResult<Vec<(Sex, i64)>> {
        Ok(sqlx::query_as::<_, (Sex, i64)>(
            "SELECT sex, COUNT(*) FROM users WHERE deleted_at IS NULL GROUP BY sex",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn count_users_by_month(&self) -> RepoResult<Vec<(String, i64)>> {
        Ok(sqlx::query_as::<_, (String, i64)>(
            r#"SELECT to_char(created_at, 'YYYY-MM') AS month, COUNT(*) AS value
               FROM users
               WHERE deleted_at IS NULL
               GROUP BY month
               ORDER BY month ASC"#,
        )
        .fetch_all(&self.pool)
        .await?)
    }

    // --- COURSES ---

    async fn list_courses(&self, filter: &CourseFilter, page: Page) -> RepoResult<Paged<Course>> {
        self.fetch_paged(
            COURSE_COLUMNS,
            "FROM courses WHERE TRUE",
            |q| {
                if let Some(category_id) = filter.category_id {
                    q.push(" AND category_id = ");
                    q.push_bind(category_id);
                }
                if let Some(user_id) = filter.user_id {
                    q.push(" AND user_id = ");
                    q.push_bind(user_id);
                }
                if let Some(name) = &filter.name {
                    q.push(" AND name ILIKE ");
                    q.push_bind(like_pattern(name));
                    q.push(" ESCAPE '\\'");
                }
                if let Some(recommended) = filter.recommended {
                    q.push(" AND recommended = ");
                    q.push_bind(recommended);
                }
                if let Some(introductory) = filter.introductory {
                    q.push(" AND introductory = ");
                    q.push_bind(introductory);
                }
            },
            "id DESC",
            page,
        )
        .await
    }

    async fn get_course(&self, id: i64) -> RepoResult<Option<Course>> {
        let sql = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1");
        Ok(sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_course(&self, record: &CourseRecord) -> RepoResult<Course> {
        let sql = format!(
            r#"INSERT INTO courses (category_id, user_id, name, image, recommended, introductory, content)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING {COURSE_COLUMNS}"#
        );
        Ok(sqlx::query_as::<_, Course>(&sql)
            .bind(record.category_id)
            .bind(record.user_id)
            .bind(&record.name)
            .bind(&record.image)
            .bind(record.recommended)
            .bind(record.introductory)
            .bind(&record.content)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_course(&self, id: i64, record: &CourseRecord) -> RepoResult<Option<Course>> {
        let sql = format!(
            r#"UPDATE courses
               SET category_id = $2, user_id = $3, name = $4, image = $5,
                   recommended = $6, introductory = $7, content = $8, updated_at = NOW()
               WHERE id = $1
               RETURNING {COURSE_COLUMNS}"#
        );
        Ok(sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .bind(record.category_id)
            .bind(record.user_id)
            .bind(&record.name)
            .bind(&record.image)
            .bind(record.recommended)
            .bind(record.introductory)
            .bind(&record.content)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_course(&self, id: i64) -> RepoResult<bool> {
        self.delete_by_policy::<Course>(id).await
    }

    async fn count_chapters_in_course(&self, course_id: i64) -> RepoResult<i64> {
        self.count_where("SELECT COUNT(*) FROM chapters WHERE course_id = $1", course_id)
            .await
    }

    // --- CHAPTERS ---

    async fn list_chapters(&self, filter: &ChapterFilter, page: Page) -> RepoResult<Paged<Chapter>> {
        self.fetch_paged(
            CHAPTER_COLUMNS,
            "FROM chapters WHERE TRUE",
            |q| {
                if let Some(course_id) = filter.course_id {
                    q.push(" AND course_id = ");
                    q.push_bind(course_id);
                }
                if let Some(title) = &filter.title {
                    q.push(" AND title ILIKE ");
                    q.push_bind(like_pattern(title));
                    q.push(" ESCAPE '\\'");
                }
            },
            "rank ASC, id DESC",
            page,
        )
        .await
    }

    async fn list_course_chapters(&self, course_id: i64) -> RepoResult<Vec<ChapterSummary>> {
        Ok(sqlx::query_as::<_, ChapterSummary>(
            r#"SELECT id, course_id, title, video, rank, created_at, updated_at
               FROM chapters
               WHERE course_id = $1
               ORDER BY rank ASC, id DESC"#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn get_chapter(&self, id: i64) -> RepoResult<Option<Chapter>> {
        let sql = format!("SELECT {CHAPTER_COLUMNS} FROM chapters WHERE id = $1");
        Ok(sqlx::query_as::<_, Chapter>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_chapter(&self, record: &ChapterRecord) -> RepoResult<Chapter> {
        let sql = format!(
            r#"INSERT INTO chapters (course_id, title, content, video, rank)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING {CHAPTER_COLUMNS}"#
        );
        Ok(sqlx::query_as::<_, Chapter>(&sql)
            .bind(record.course_id)
            .bind(&record.title)
            .bind(&record.content)
            .bind(&record.video)
            .bind(record.rank)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_chapter(&self, id: i64, record: &ChapterRecord) -> RepoResult<Option<Chapter>> {
        let sql = format!(
            r#"UPDATE chapters
               SET course_id = $2, title = $3, content = $4, video = $5, rank = $6, updated_at = NOW()
               WHERE id = $1
               RETURNING {CHAPTER_COLUMNS}"#
        );
        Ok(sqlx::query_as::<_, Chapter>(&sql)
            .bind(id)
            .bind(record.course_id)
            .bind(&record.title)
            .bind(&record.content)
            .bind(&record.video)
            .bind(record.rank)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_chapter(&self, id: i64) -> RepoResult<bool> {
        self.delete_by_policy::<Chapter>(id).await
    }

    // --- LIKES ---

    async fn list_liked_courses(&self, user_id: i64, page: Page) -> RepoResult<Paged<Course>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        let items = sqlx::query_as::<_, Course>(
            r#"SELECT c.id, c.category_id, c.user_id, c.name, c.image, c.recommended,
                      c.introductory, c.content, c.created_at, c.updated_at
               FROM courses c
               JOIN likes l ON l.course_id = c.id
               WHERE l.user_id = $1
               ORDER BY l.id DESC
               LIMIT $2 OFFSET $3"#,
        )
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;
        Ok(Paged { items, total })
    }

    /// create_like
    ///
    /// Uses `ON CONFLICT DO NOTHING` on the `(user_id, course_id)` constraint, so concurrent
    /// duplicate attempts leave exactly one row and all but one get `None`.
    async fn create_like(&self, user_id: i64, course_id: i64) -> RepoResult<Option<Like>> {
        Ok(sqlx::query_as::<_, Like>(
            r#"INSERT INTO likes (user_id, course_id) VALUES ($1, $2)
               ON CONFLICT (user_id, course_id) DO NOTHING
               RETURNING id, user_id, course_id, created_at"#,
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_like(&self, id: i64, user_id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM likes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- SETTINGS ---

    async fn get_setting(&self) -> RepoResult<Option<Setting>> {
        let sql = format!("SELECT {SETTING_COLUMNS} FROM settings ORDER BY id ASC LIMIT 1");
        Ok(sqlx::query_as::<_, Setting>(&sql)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_setting(&self, id: i64, record: &SettingRecord) -> RepoResult<Option<Setting>> {
        let sql = format!(
            r#"UPDATE settings SET name = $2, icp = $3, copyright = $4, updated_at = NOW()
               WHERE id = $1
               RETURNING {SETTING_COLUMNS}"#
        );
        Ok(sqlx::query_as::<_, Setting>(&sql)
            .bind(id)
            .bind(&record.name)
            .bind(&record.icp)
            .bind(&record.copyright)
            .fetch_optional(&self.pool)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rust"), "%rust%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c:\\dir"), "%c:\\\\dir%");
    }
}
