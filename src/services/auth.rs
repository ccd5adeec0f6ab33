use crate::{
    config::auth::AuthConfig,
    error::{AppError, AppResult},
    models::{profile, user, User, UserModel},
    utils::{encode_access_token, hash_password, verify_password},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    TransactionTrait,
};
use uuid::Uuid;

pub struct AuthService {
    db: DatabaseConnection,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            config: AuthConfig::from_env(),
        }
    }

    pub fn with_config(db: DatabaseConnection, config: AuthConfig) -> Self {
        Self { db, config }
    }

    /// Create the account and its empty profile row in one transaction.
    /// Returns (user_model, access_token).
    pub async fn sign_up(&self, email: &str, password: &str) -> AppResult<(UserModel, String)> {
        let email = normalize_email(email);
        if !self.config.email_allowed(&email) {
            return Err(AppError::Validation(format!(
                "Only {} addresses may sign up",
                self.config.allowed_email_domain.as_deref().unwrap_or("campus")
            )));
        }

        if self.email_taken(&email).await? {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_password(password)?;
        let user_id = Uuid::new_v4();

        let txn = self.db.begin().await?;
        let user = user::ActiveModel {
            id: sea_orm::ActiveValue::Set(user_id),
            email: sea_orm::ActiveValue::Set(email),
            password_hash: sea_orm::ActiveValue::Set(password_hash),
            created_at: sea_orm::ActiveValue::Set(chrono::Utc::now()),
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::from_unique(e, "Email already registered"))?;

        profile::ActiveModel {
            id: sea_orm::ActiveValue::Set(user_id),
            nickname: sea_orm::ActiveValue::Set(None),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        tracing::info!(user_id = %user.id, "Account created");
        let token = encode_access_token(user.id)?;
        Ok((user, token))
    }

    /// Password sign-in. Unknown email and wrong password are indistinguishable.
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<(UserModel, String)> {
        let user = User::find()
            .filter(user::Column::Email.eq(normalize_email(email)))
            .one(&self.db)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        let token = encode_access_token(user.id)?;
        Ok((user, token))
    }

    pub async fn get_user_by_id(&self, id: Uuid) -> AppResult<UserModel> {
        User::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn email_taken(&self, email: &str) -> AppResult<bool> {
        let count = User::find()
            .filter(user::Column::Email.eq(email))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}
