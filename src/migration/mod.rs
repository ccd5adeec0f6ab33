use sea_orm_migration::prelude::*;

mod m20250901_000001_create_users_and_profiles;
mod m20250901_000002_create_posts_table;
mod m20250901_000003_create_replies_table;
mod m20250901_000004_create_reaction_tables;
mod m20250901_000005_create_joined_views;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_create_users_and_profiles::Migration),
            Box::new(m20250901_000002_create_posts_table::Migration),
            Box::new(m20250901_000003_create_replies_table::Migration),
            Box::new(m20250901_000004_create_reaction_tables::Migration),
            Box::new(m20250901_000005_create_joined_views::Migration),
        ]
    }
}
