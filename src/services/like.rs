use crate::{
    error::{AppError, AppResult},
    models::{like, Like, Post},
};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Statement,
};
use uuid::Uuid;

pub struct LikeService {
    db: DatabaseConnection,
}

impl LikeService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn exists(&self, user_id: Uuid, post_id: i32) -> AppResult<bool> {
        let count = Like::find()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::PostId.eq(post_id))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    pub async fn add_like(&self, user_id: Uuid, post_id: i32) -> AppResult<bool> {
        Post::find_by_id(post_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        self.db
            .execute(Statement::from_sql_and_values(
                sea_orm::DatabaseBackend::Postgres,
                "INSERT INTO likes (post_id, user_id, created_at)
                 VALUES ($1, $2, NOW())
                 ON CONFLICT (post_id, user_id) DO NOTHING",
                vec![post_id.into(), user_id.into()],
            ))
            .await?;
        Ok(true)
    }

    pub async fn remove_like(&self, user_id: Uuid, post_id: i32) -> AppResult<bool> {
        Like::delete_many()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::PostId.eq(post_id))
            .exec(&self.db)
            .await?;
        Ok(false)
    }
}
