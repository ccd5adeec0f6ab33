use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(
            "CREATE OR REPLACE VIEW posts_with_profiles AS
             SELECT p.id, p.created_at, p.content, p.user_id, p.category,
                    pr.nickname,
                    (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id) AS like_count,
                    (SELECT COUNT(*) FROM replies r WHERE r.post_id = p.id) AS reply_count
             FROM posts p
             LEFT JOIN profiles pr ON pr.id = p.user_id",
        )
        .await?;

        db.execute_unprepared(
            "CREATE OR REPLACE VIEW replies_with_profiles AS
             SELECT r.id, r.created_at, r.content, r.user_id, r.post_id,
                    r.is_public, r.is_anonymous, pr.nickname
             FROM replies r
             LEFT JOIN profiles pr ON pr.id = r.user_id",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP VIEW IF EXISTS replies_with_profiles")
            .await?;
        db.execute_unprepared("DROP VIEW IF EXISTS posts_with_profiles")
            .await?;
        Ok(())
    }
}
