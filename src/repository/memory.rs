use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{RepoError, RepoResult, Repository};
use crate::models::{
    Article, ArticleFilter, ArticleRecord, Category, CategoryRecord, Chapter, ChapterFilter,
    ChapterRecord, ChapterSummary, Course, CourseFilter, CourseRecord, Like, Page, Paged, Setting,
    SettingRecord, Sex, User, UserFilter, UserRecord,
};

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: Vec<User>,
    articles: Vec<Article>,
    categories: Vec<Category>,
    courses: Vec<Course>,
    chapters: Vec<Chapter>,
    likes: Vec<Like>,
    settings: Vec<Setting>,
}

impl Tables {
    fn id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn page_of<T: Clone>(rows: Vec<&T>, page: Page) -> Paged<T> {
    let total = rows.len() as i64;
    let items = rows
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .cloned()
        .collect();
    Paged { items, total }
}

/// Sort key for rank-ordered tables: rank ASC, then id DESC.
fn by_rank(rank: i32, id: i64) -> (i32, std::cmp::Reverse<i64>) {
    (rank, std::cmp::Reverse(id))
}

/// MemoryRepository
///
/// An in-process `Repository` used by the test suites in place of Postgres. It mirrors the
/// orderings, soft-delete visibility and unique constraints of the SQL schema. Ids come from
/// a single counter shared by all tables.
#[derive(Default)]
pub struct MemoryRepository {
    tables: Mutex<Tables>,
}

impl MemoryRepository {
    /// Creates an empty store holding one default settings row.
    pub fn new() -> Self {
        let repo = Self::default();
        {
            let mut t = repo.lock();
            let id = t.id();
            let now = Utc::now();
            t.settings.push(Setting {
                id,
                name: Some("长乐未央".to_string()),
                icp: None,
                copyright: None,
                created_at: now,
                updated_at: now,
            });
        }
        repo
    }

    /// Creates an empty store with no settings row.
    pub fn without_settings() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Backdates a user's signup time. Used to build monthly chart fixtures.
    pub fn set_user_created_at(&self, id: i64, created_at: DateTime<Utc>) {
        if let Some(user) = self.lock().users.iter_mut().find(|u| u.id == id) {
            user.created_at = created_at;
        }
    }

    /// Counts user rows including soft-deleted ones.
    pub fn stored_user_count(&self) -> usize {
        self.lock().users.len()
    }

    /// Counts article rows including soft-deleted ones.
    pub fn stored_article_count(&self) -> usize {
        self.lock().articles.len()
    }

    pub fn like_count(&self) -> usize {
        self.lock().likes.len()
    }
}

fn check_user_unique(t: &Tables, record: &UserRecord, except: Option<i64>) -> RepoResult<()> {
    let others = t.users.iter().filter(|u| Some(u.id) != except);
    for user in others {
        if user.email == record.email {
            return Err(RepoError::Duplicate("email"));
        }
        if user.username == record.username {
            return Err(RepoError::Duplicate("username"));
        }
    }
    Ok(())
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn list_articles(&self, filter: &ArticleFilter, page: Page) -> RepoResult<Paged<Article>> {
        let t = self.lock();
        let trash = filter.deleted == Some(true);
        let mut rows: Vec<&Article> = t
            .articles
            .iter()
            .filter(|a| a.deleted_at.is_some() == trash)
            .filter(|a| filter.title.as_deref().is_none_or(|title| contains(&a.title, title)))
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(page_of(rows, page))
    }

    async fn get_article(&self, id: i64) -> RepoResult<Option<Article>> {
        Ok(self
            .lock()
            .articles
            .iter()
            .find(|a| a.id == id && a.deleted_at.is_none())
            .cloned())
    }

    async fn create_article(&self, record: &ArticleRecord) -> RepoResult<Article> {
        let mut t = self.lock();
        let now = Utc::now();
        let article = Article {
            id: t.id(),
            title: record.title.clone(),
            content: record.content.clone(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        t.articles.push(article.clone());
        Ok(article)
    }

    async fn update_article(&self, id: i64, record: &ArticleRecord) -> RepoResult<Option<Article>> {
        let mut t = self.lock();
        let Some(article) = t
            .articles
            .iter_mut()
            .find(|a| a.id == id && a.deleted_at.is_none())
        else {
            return Ok(None);
        };
        article.title = record.title.clone();
        article.content = record.content.clone();
        article.updated_at = Utc::now();
        Ok(Some(article.clone()))
    }

    async fn delete_article(&self, id: i64) -> RepoResult<bool> {
        let mut t = self.lock();
        match t
            .articles
            .iter_mut()
            .find(|a| a.id == id && a.deleted_at.is_none())
        {
            Some(article) => {
                article.deleted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn restore_article(&self, id: i64) -> RepoResult<bool> {
        let mut t = self.lock();
        match t
            .articles
            .iter_mut()
            .find(|a| a.id == id && a.deleted_at.is_some())
        {
            Some(article) => {
                article.deleted_at = None;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_categories(&self) -> RepoResult<Vec<Category>> {
        let mut rows = self.lock().categories.clone();
        rows.sort_by_key(|c| by_rank(c.rank, c.id));
        Ok(rows)
    }

    async fn get_category(&self, id: i64) -> RepoResult<Option<Category>> {
        Ok(self.lock().categories.iter().find(|c| c.id == id).cloned())
    }

    async fn create_category(&self, record: &CategoryRecord) -> RepoResult<Category> {
        let mut t = self.lock();
        if t.categories.iter().any(|c| c.name == record.name) {
            return Err(RepoError::Duplicate("name"));
        }
        let now = Utc::now();
        let category = Category {
            id: t.id(),
            name: record.name.clone(),
            rank: record.rank,
            created_at: now,
            updated_at: now,
        };
        t.categories.push(category.clone());
        Ok(category)
    }

    async fn update_category(&self, id: i64, record: &CategoryRecord) -> RepoResult<Option<Category>> {
        let mut t = self.lock();
        if t.categories.iter().any(|c| c.id != id && c.name == record.name) {
            return Err(RepoError::Duplicate("name"));
        }
        let Some(category) = t.categories.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        category.name = record.name.clone();
        category.rank = record.rank;
        category.updated_at = Utc::now();
        Ok(Some(category.clone()))
    }

    async fn delete_category(&self, id: i64) -> RepoResult<bool> {
        let mut t = self.lock();
        let before = t.categories.len();
        t.categories.retain(|c| c.id != id);
        Ok(t.categories.len() < before)
    }

    async fn count_courses_in_category(&self, category_id: i64) -> RepoResult<i64> {
        Ok(self
            .lock()
            .courses
            .iter()
            .filter(|c| c.category_id == category_id)
            .count() as i64)
    }

    async fn count_courses_owned_by(&self, user_id: i64) -> RepoResult<i64> {
        Ok(self
            .lock()
            .courses
            .iter()
            .filter(|c| c.user_id == user_id)
            .count() as i64)
    }

    async fn list_users(&self, filter: &UserFilter, page: Page) -> RepoResult<Paged<User>> {
        let t = self.lock();
        let mut rows: Vec<&User> = t
            .users
            .iter()
            .filter(|u| u.deleted_at.is_none())
            .filter(|u| filter.email.as_deref().is_none_or(|e| u.email == e))
            .filter(|u| filter.username.as_deref().is_none_or(|n| u.username == n))
            .filter(|u| filter.nickname.as_deref().is_none_or(|n| contains(&u.nickname, n)))
            .filter(|u| filter.role.is_none_or(|r| u.role == r))
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(page_of(rows, page))
    }

    async fn get_user(&self, id: i64) -> RepoResult<Option<User>> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| u.id == id && u.deleted_at.is_none())
            .cloned())
    }

    async fn find_user_by_login(&self, login: &str) -> RepoResult<Option<User>> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| u.deleted_at.is_none() && (u.email == login || u.username == login))
            .cloned())
    }

    async fn create_user(&self, record: &UserRecord) -> RepoResult<User> {
        let mut t = self.lock();
        check_user_unique(&t, record, None)?;
        let now = Utc::now();
        let user = User {
            id: t.id(),
            email: record.email.clone(),
            username: record.username.clone(),
            nickname: record.nickname.clone(),
            password: record.password.clone(),
            avatar: record.avatar.clone(),
            sex: record.sex,
            company: record.company.clone(),
            introduce: record.introduce.clone(),
            role: record.role,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: i64, record: &UserRecord) -> RepoResult<Option<User>> {
        let mut t = self.lock();
        check_user_unique(&t, record, Some(id))?;
        let Some(user) = t
            .users
            .iter_mut()
            .find(|u| u.id == id && u.deleted_at.is_none())
        else {
            return Ok(None);
        };
        user.email = record.email.clone();
        user.username = record.username.clone();
        user.nickname = record.nickname.clone();
        user.password = record.password.clone();
        user.sex = record.sex;
        user.avatar = record.avatar.clone();
        user.company = record.company.clone();
        user.introduce = record.introduce.clone();
        user.role = record.role;
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: i64) -> RepoResult<bool> {
        let mut t = self.lock();
        match t
            .users
            .iter_mut()
            .find(|u| u.id == id && u.deleted_at.is_none())
        {
            Some(user) => {
                user.deleted_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count_users_by_sex(&self) -> RepoResult<Vec<(Sex, i64)>> {
        let t = self.lock();
        Ok(Sex::ALL
            .iter()
            .map(|sex| {
                let n = t
                    .users
                    .iter()
                    .filter(|u| u.deleted_at.is_none() && u.sex == *sex)
                    .count();
                (*sex, n as i64)
            })
            .filter(|(_, n)| *n > 0)
            .collect())
    }

    async fn count_users_by_month(&self) -> RepoResult<Vec<(String, i64)>> {
        let t = self.lock();
        let mut months: Vec<(String, i64)> = Vec::new();
        let mut keys: Vec<String> = t
            .users
            .iter()
            .filter(|u| u.deleted_at.is_none())
            .map(|u| u.created_at.format("%Y-%m").to_string())
            .collect();
        keys.sort();
        for key in keys {
            match months.last_mut() {
                Some((month, n)) if *month == key => *n += 1,
                _ => months.push((key, 1)),
            }
        }
        Ok(months)
    }

    async fn list_courses(&self, filter: &CourseFilter, page: Page) -> RepoResult<Paged<Course>> {
        let t = self.lock();
        let mut rows: Vec<&Course> = t
            .courses
            .iter()
            .filter(|c| filter.category_id.is_none_or(|id| c.category_id == id))
            .filter(|c| filter.user_id.is_none_or(|id| c.user_id == id))
            .filter(|c| filter.name.as_deref().is_none_or(|n| contains(&c.name, n)))
            .filter(|c| filter.recommended.is_none_or(|r| c.recommended == r))
            .filter(|c| filter.introductory.is_none_or(|i| c.introductory == i))
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(page_of(rows, page))
    }

    async fn get_course(&self, id: i64) -> RepoResult<Option<Course>> {
        Ok(self.lock().courses.iter().find(|c| c.id == id).cloned())
    }

    async fn create_course(&self, record: &CourseRecord) -> RepoResult<Course> {
        let mut t = self.lock();
        let now = Utc::now();
        let course = Course {
            id: t.id(),
            category_id: record.category_id,
            user_id: record.user_id,
            name: record.name.clone(),
            image: record.image.clone(),
            recommended: record.recommended,
            introductory: record.introductory,
            content: record.content.clone(),
            created_at: now,
            updated_at: now,
        };
        t.courses.push(course.clone());
        Ok(course)
    }

    async fn update_course(&self, id: i64, record: &CourseRecord) -> RepoResult<Option<Course>> {
        let mut t = self.lock();
        let Some(course) = t.courses.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        course.category_id = record.category_id;
        course.user_id = record.user_id;
        course.name = record.name.clone();
        course.image = record.image.clone();
        course.recommended = record.recommended;
        course.introductory = record.introductory;
        course.content = record.content.clone();
        course.updated_at = Utc::now();
        Ok(Some(course.clone()))
    }

    async fn delete_course(&self, id: i64) -> RepoResult<bool> {
        let mut t = self.lock();
        let before = t.courses.len();
        t.courses.retain(|c| c.id != id);
        let removed = t.courses.len() < before;
        if removed {
            t.likes.retain(|l| l.course_id != id);
        }
        Ok(removed)
    }

    async fn count_chapters_in_course(&self, course_id: i64) -> RepoResult<i64> {
        Ok(self
            .lock()
            .chapters
            .iter()
            .filter(|c| c.course_id == course_id)
            .count() as i64)
    }

    async fn list_chapters(&self, filter: &ChapterFilter, page: Page) -> RepoResult<Paged<Chapter>> {
        let t = self.lock();
        let mut rows: Vec<&Chapter> = t
            .chapters
            .iter()
            .filter(|c| filter.course_id.is_none_or(|id| c.course_id == id))
            .filter(|c| filter.title.as_deref().is_none_or(|title| contains(&c.title, title)))
            .collect();
        rows.sort_by_key(|c| by_rank(c.rank, c.id));
        Ok(page_of(rows, page))
    }

    async fn list_course_chapters(&self, course_id: i64) -> RepoResult<Vec<ChapterSummary>> {
        let t = self.lock();
        let mut rows: Vec<&Chapter> = t.chapters.iter().filter(|c| c.course_id == course_id).collect();
        rows.sort_by_key(|c| by_rank(c.rank, c.id));
        Ok(rows.into_iter().map(ChapterSummary::from).collect())
    }

    async fn get_chapter(&self, id: i64) -> RepoResult<Option<Chapter>> {
        Ok(self.lock().chapters.iter().find(|c| c.id == id).cloned())
    }

    async fn create_chapter(&self, record: &ChapterRecord) -> RepoResult<Chapter> {
        let mut t = self.lock();
        let now = Utc::now();
        let chapter = Chapter {
            id: t.id(),
            course_id: record.course_id,
            title: record.title.clone(),
            content: record.content.clone(),
            video: record.video.clone(),
            rank: record.rank,
            created_at: now,
            updated_at: now,
        };
        t.chapters.push(chapter.clone());
        Ok(chapter)
    }

    async fn update_chapter(&self, id: i64, record: &ChapterRecord) -> RepoResult<Option<Chapter>> {
        let mut t = self.lock();
        let Some(chapter) = t.chapters.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        chapter.course_id = record.course_id;
        chapter.title = record.title.clone();
        chapter.content = record.content.clone();
        chapter.video = record.video.clone();
        chapter.rank = record.rank;
        chapter.updated_at = Utc::now();
        Ok(Some(chapter.clone()))
    }

    async fn delete_chapter(&self, id: i64) -> RepoResult<bool> {
        let mut t = self.lock();
        let before = t.chapters.len();
        t.chapters.retain(|c| c.id != id);
        Ok(t.chapters.len() < before)
    }

    async fn list_liked_courses(&self, user_id: i64, page: Page) -> RepoResult<Paged<Course>> {
        let t = self.lock();
        let mut likes: Vec<&Like> = t.likes.iter().filter(|l| l.user_id == user_id).collect();
        likes.sort_by(|a, b| b.id.cmp(&a.id));
        let rows: Vec<&Course> = likes
            .into_iter()
            .filter_map(|l| t.courses.iter().find(|c| c.id == l.course_id))
            .collect();
        Ok(page_of(rows, page))
    }

    async fn create_like(&self, user_id: i64, course_id: i64) -> RepoResult<Option<Like>> {
        let mut t = self.lock();
        if t
            .likes
            .iter()
            .any(|l| l.user_id == user_id && l.course_id == course_id)
        {
            return Ok(None);
        }
        let like = Like {
            id: t.id(),
            user_id,
            course_id,
            created_at: Utc::now(),
        };
        t.likes.push(like.clone());
        Ok(Some(like))
    }

    async fn delete_like(&self, id: i64, user_id: i64) -> RepoResult<bool> {
        let mut t = self.lock();
        let before = t.likes.len();
        t.likes.retain(|l| !(l.id == id && l.user_id == user_id));
        Ok(t.likes.len() < before)
    }

    async fn get_setting(&self) -> RepoResult<Option<Setting>> {
        Ok(self.lock().settings.first().cloned())
    }

    async fn update_setting(&self, id: i64, record: &SettingRecord) -> RepoResult<Option<Setting>> {
        let mut t = self.lock();
        let Some(setting) = t.settings.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        setting.name = record.name.clone();
        setting.icp = record.icp.clone();
        setting.copyright = record.copyright.clone();
        setting.updated_at = Utc::now();
        Ok(Some(setting.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str, username: &str) -> UserRecord {
        UserRecord {
            email: email.into(),
            username: username.into(),
            nickname: "nick".into(),
            password: "hash".into(),
            ..UserRecord::default()
        }
    }

    #[tokio::test]
    async fn soft_deleted_user_keeps_its_unique_values() {
        let repo = MemoryRepository::new();
        let alice = repo.create_user(&user("a@example.com", "alice")).await.unwrap();
        assert!(repo.delete_user(alice.id).await.unwrap());
        assert!(!repo.delete_user(alice.id).await.unwrap());

        let err = repo.create_user(&user("a@example.com", "alice2")).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate("email")));
        assert_eq!(repo.stored_user_count(), 1);
    }

    #[tokio::test]
    async fn chapters_order_by_rank_then_newest() {
        let repo = MemoryRepository::new();
        for (title, rank) in [("b", 2), ("a1", 1), ("a2", 1)] {
            repo.create_chapter(&ChapterRecord {
                course_id: 9,
                title: title.into(),
                rank,
                ..ChapterRecord::default()
            })
            .await
            .unwrap();
        }
        let titles: Vec<String> = repo
            .list_course_chapters(9)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, vec!["a2", "a1", "b"]);
    }
}
