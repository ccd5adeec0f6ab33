use crate::{
    error::{AppError, AppResult},
    models::{profile, Profile, ProfileModel},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

const NICKNAME_TAKEN: &str = "Nickname already taken";

pub struct ProfileService {
    db: DatabaseConnection,
}

impl ProfileService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<ProfileModel> {
        Profile::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn get_by_nickname(&self, nickname: &str) -> AppResult<ProfileModel> {
        Profile::find()
            .filter(profile::Column::Nickname.eq(nickname))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Update the caller's own nickname. A blank value clears it.
    pub async fn update_nickname(&self, id: Uuid, nickname: &str) -> AppResult<ProfileModel> {
        let nickname = Some(nickname.trim().to_string()).filter(|n| !n.is_empty());

        if let Some(name) = nickname.as_deref() {
            match self.get_by_nickname(name).await {
                Ok(holder) if holder.id != id => {
                    return Err(AppError::Conflict(NICKNAME_TAKEN.to_string()));
                }
                Ok(_) | Err(AppError::NotFound) => {}
                Err(e) => return Err(e),
            }
        }

        let existing = self.get_by_id(id).await?;
        let mut active: profile::ActiveModel = existing.into();
        active.nickname = sea_orm::ActiveValue::Set(nickname);

        // The unique index still decides when two claims race past the check above.
        active
            .update(&self.db)
            .await
            .map_err(|e| AppError::from_unique(e, NICKNAME_TAKEN))
    }
}
