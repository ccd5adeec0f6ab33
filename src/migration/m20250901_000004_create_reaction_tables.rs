use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // The composite key is what makes each (post, user) pair unique.
        for table in ["likes", "bookmarks"] {
            db.execute_unprepared(&format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    post_id INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
                    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    PRIMARY KEY (post_id, user_id)
                )"
            ))
            .await?;

            db.execute_unprepared(&format!(
                "CREATE INDEX IF NOT EXISTS idx_{table}_user_id ON {table}(user_id)"
            ))
            .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS bookmarks").await?;
        db.execute_unprepared("DROP TABLE IF EXISTS likes").await?;
        Ok(())
    }
}
