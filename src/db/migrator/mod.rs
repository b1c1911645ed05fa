use sea_orm_migration::prelude::*;

mod m20260208_initial;
mod m20260210_add_watch_title_map;
mod m20260211_add_uid_aliases;
mod m20260212_add_watch_progress;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260208_initial::Migration),
            Box::new(m20260210_add_watch_title_map::Migration),
            Box::new(m20260211_add_uid_aliases::Migration),
            Box::new(m20260212_add_watch_progress::Migration),
        ]
    }
}
