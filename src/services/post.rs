use crate::{
    error::{AppError, AppResult},
    models::{
        post, post_with_profile, Category, Post, PostModel, PostWithProfile, PostWithProfileModel,
    },
};
use sea_orm::sea_query::{extension::postgres::PgExpr, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    Select,
};
use uuid::Uuid;

/// Filters accepted by the feed query. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedFilter {
    pub search: Option<String>,
    pub category: Option<Category>,
    pub ids: Option<Vec<i32>>,
}

pub struct PostService {
    db: DatabaseConnection,
}

impl PostService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Query the joined post view, newest first.
    pub async fn feed(&self, filter: &FeedFilter) -> AppResult<Vec<PostWithProfileModel>> {
        let posts = feed_select(filter).all(&self.db).await?;
        Ok(posts)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<PostModel> {
        Post::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        content: &str,
        category: Category,
    ) -> AppResult<PostModel> {
        let new_post = post::ActiveModel {
            created_at: sea_orm::ActiveValue::Set(chrono::Utc::now()),
            content: sea_orm::ActiveValue::Set(content.to_string()),
            user_id: sea_orm::ActiveValue::Set(user_id),
            category: sea_orm::ActiveValue::Set(category.as_str().to_string()),
            ..Default::default()
        };

        let post = new_post.insert(&self.db).await?;
        Ok(post)
    }

    /// Owner-only delete; replies, likes and bookmarks go with it via cascade.
    pub async fn delete(&self, id: i32, user_id: Uuid) -> AppResult<()> {
        let existing = self.get_by_id(id).await?;
        if existing.user_id != user_id {
            return Err(AppError::Forbidden);
        }

        Post::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }
}

fn feed_select(filter: &FeedFilter) -> Select<PostWithProfile> {
    let mut query = PostWithProfile::find();

    if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        query = query.filter(
            Expr::col((post_with_profile::Entity, post_with_profile::Column::Content))
                .ilike(format!("%{}%", escape_like(term))),
        );
    }
    if let Some(category) = filter.category {
        query = query.filter(post_with_profile::Column::Category.eq(category.as_str()));
    }
    if let Some(ids) = &filter.ids {
        query = query.filter(post_with_profile::Column::Id.is_in(ids.clone()));
    }

    query.order_by_desc(post_with_profile::Column::CreatedAt)
}

/// Escape LIKE wildcards so the search term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    fn sql(filter: &FeedFilter) -> String {
        feed_select(filter).build(DbBackend::Postgres).to_string()
    }

    #[test]
    fn empty_filter_is_all_posts_newest_first() {
        let sql = sql(&FeedFilter::default());
        assert!(sql.contains("FROM \"posts_with_profiles\""));
        assert!(!sql.contains("WHERE"));
        assert!(sql.ends_with("ORDER BY \"posts_with_profiles\".\"created_at\" DESC"));
    }

    #[test]
    fn category_filter_is_equality() {
        let sql = sql(&FeedFilter {
            category: Some(Category::Academics),
            ..Default::default()
        });
        assert!(sql.contains("\"category\" = '学业探讨'"));
    }

    #[test]
    fn blank_search_adds_no_condition() {
        let sql = sql(&FeedFilter {
            search: Some("   ".to_string()),
            ..Default::default()
        });
        assert!(!sql.contains("ILIKE"));
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let sql = sql(&FeedFilter {
            search: Some("雨伞".to_string()),
            ..Default::default()
        });
        assert!(sql.contains("ILIKE '%雨伞%'"));
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("100%_off"), "100\\%\\_off");
    }
}
