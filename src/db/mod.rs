use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::models::anime::CanonicalAnimeRecord;
use crate::services::alias::AliasResolver;

pub mod migrator;
pub mod repositories;

use repositories::{
    catalog::CatalogRepository, list::ListRepository, progress::ProgressRepository,
    recommendation::RecommendationRepository, user::UserRepository,
    watch_map::WatchMapRepository,
};

pub use repositories::progress::ProgressUpdate;
pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)
                    .with_context(|| format!("Failed to create database file {path_str}"))?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    /// Resolver bound to this store, with the alias table probed once.
    pub async fn alias_resolver(&self) -> AliasResolver {
        AliasResolver::probe(self.conn.clone()).await
    }

    pub(crate) const fn catalog_repo(&self) -> CatalogRepository<'_, DatabaseConnection> {
        CatalogRepository::new(&self.conn)
    }

    pub(crate) const fn user_repo(&self) -> UserRepository<'_, DatabaseConnection> {
        UserRepository::new(&self.conn)
    }

    pub(crate) const fn list_repo(&self) -> ListRepository<'_, DatabaseConnection> {
        ListRepository::new(&self.conn)
    }

    pub(crate) const fn recommendation_repo(
        &self,
    ) -> RecommendationRepository<'_, DatabaseConnection> {
        RecommendationRepository::new(&self.conn)
    }

    pub(crate) const fn watch_map_repo(&self) -> WatchMapRepository<'_, DatabaseConnection> {
        WatchMapRepository::new(&self.conn)
    }

    pub(crate) const fn progress_repo(&self) -> ProgressRepository<'_, DatabaseConnection> {
        ProgressRepository::new(&self.conn)
    }

    pub async fn get_anime(&self, uid: &str) -> Result<Option<CanonicalAnimeRecord>> {
        self.catalog_repo().get(uid).await
    }

    pub async fn upsert_catalog(
        &self,
        aliases: &AliasResolver,
        records: &[CanonicalAnimeRecord],
    ) -> Result<Vec<CanonicalAnimeRecord>> {
        self.catalog_repo().upsert_many(aliases, records).await
    }

    pub async fn get_user(&self, telegram_id: &str) -> Result<Option<User>> {
        self.user_repo().get_by_telegram_id(telegram_id).await
    }
}
