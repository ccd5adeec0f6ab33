use crate::{
    error::{AppError, AppResult},
    models::{
        reply, reply_with_profile, Post, Reply, ReplyModel, ReplyWithProfile, ReplyWithProfileModel,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

pub struct ReplyService {
    db: DatabaseConnection,
}

impl ReplyService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Replies under a post with author nicknames, oldest first.
    pub async fn list_by_post(&self, post_id: i32) -> AppResult<Vec<ReplyWithProfileModel>> {
        let replies = ReplyWithProfile::find()
            .filter(reply_with_profile::Column::PostId.eq(post_id))
            .order_by_asc(reply_with_profile::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(replies)
    }

    /// Replies written by a user, newest first. Private ones only when asked.
    pub async fn list_by_user(
        &self,
        user_id: Uuid,
        include_private: bool,
    ) -> AppResult<Vec<ReplyModel>> {
        let mut query = Reply::find().filter(reply::Column::UserId.eq(user_id));
        if !include_private {
            query = query.filter(reply::Column::IsPublic.eq(true));
        }

        let replies = query
            .order_by_desc(reply::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(replies)
    }

    pub async fn create(
        &self,
        post_id: i32,
        user_id: Uuid,
        content: &str,
        is_anonymous: bool,
    ) -> AppResult<ReplyModel> {
        Post::find_by_id(post_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let new_reply = reply::ActiveModel {
            created_at: sea_orm::ActiveValue::Set(chrono::Utc::now()),
            content: sea_orm::ActiveValue::Set(content.to_string()),
            user_id: sea_orm::ActiveValue::Set(user_id),
            post_id: sea_orm::ActiveValue::Set(post_id),
            is_public: sea_orm::ActiveValue::Set(true),
            is_anonymous: sea_orm::ActiveValue::Set(is_anonymous),
            ..Default::default()
        };

        let reply = new_reply.insert(&self.db).await?;
        Ok(reply)
    }

    pub async fn delete(&self, id: i32, user_id: Uuid) -> AppResult<()> {
        let existing = self.get_owned(id, user_id).await?;
        Reply::delete_by_id(existing.id).exec(&self.db).await?;
        Ok(())
    }

    pub async fn set_visibility(
        &self,
        id: i32,
        user_id: Uuid,
        is_public: bool,
    ) -> AppResult<ReplyModel> {
        let existing = self.get_owned(id, user_id).await?;

        let mut active: reply::ActiveModel = existing.into();
        active.is_public = sea_orm::ActiveValue::Set(is_public);

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    async fn get_owned(&self, id: i32, user_id: Uuid) -> AppResult<ReplyModel> {
        let existing = Reply::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;
        if existing.user_id != user_id {
            return Err(AppError::Forbidden);
        }
        Ok(existing)
    }
}
