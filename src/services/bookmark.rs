use crate::{
    error::{AppError, AppResult},
    models::{bookmark, Bookmark, Post},
};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Statement,
};
use uuid::Uuid;

pub struct BookmarkService {
    db: DatabaseConnection,
}

impl BookmarkService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn exists(&self, user_id: Uuid, post_id: i32) -> AppResult<bool> {
        let count = Bookmark::find()
            .filter(bookmark::Column::UserId.eq(user_id))
            .filter(bookmark::Column::PostId.eq(post_id))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    /// Idempotent: bookmarking twice leaves a single row.
    pub async fn add_bookmark(&self, user_id: Uuid, post_id: i32) -> AppResult<bool> {
        Post::find_by_id(post_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        self.db
            .execute(Statement::from_sql_and_values(
                sea_orm::DatabaseBackend::Postgres,
                "INSERT INTO bookmarks (post_id, user_id, created_at)
                 VALUES ($1, $2, NOW())
                 ON CONFLICT (post_id, user_id) DO NOTHING",
                vec![post_id.into(), user_id.into()],
            ))
            .await?;
        Ok(true)
    }

    pub async fn remove_bookmark(&self, user_id: Uuid, post_id: i32) -> AppResult<bool> {
        Bookmark::delete_many()
            .filter(bookmark::Column::UserId.eq(user_id))
            .filter(bookmark::Column::PostId.eq(post_id))
            .exec(&self.db)
            .await?;
        Ok(false)
    }

    /// Post ids the user bookmarked, most recent first.
    pub async fn list_post_ids(&self, user_id: Uuid) -> AppResult<Vec<i32>> {
        let ids = Bookmark::find()
            .select_only()
            .column(bookmark::Column::PostId)
            .filter(bookmark::Column::UserId.eq(user_id))
            .order_by_desc(bookmark::Column::CreatedAt)
            .into_tuple::<i32>()
            .all(&self.db)
            .await?;
        Ok(ids)
    }
}
