mod catalog;
mod progress;
mod search;
mod track;
mod watch_map;

pub use catalog::{cmd_resolve, cmd_show};
pub use progress::{cmd_progress_delete, cmd_progress_recent, cmd_progress_start};
pub use search::cmd_search;
pub use track::{cmd_list, cmd_track, cmd_untrack};
pub use watch_map::{cmd_watch_map_clear, cmd_watch_map_get, cmd_watch_map_set};

use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::domain::Lang;
use crate::models::anime::CanonicalAnimeRecord;
use crate::services::{SeaOrmCatalogService, SeaOrmTrackingService};

struct Services {
    catalog: SeaOrmCatalogService,
    tracking: SeaOrmTrackingService,
}

async fn open_services(config: &Config) -> anyhow::Result<Services> {
    let store = Arc::new(
        Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?,
    );
    let aliases = store.alias_resolver().await;

    Ok(Services {
        catalog: SeaOrmCatalogService::new(store.clone(), aliases.clone()),
        tracking: SeaOrmTrackingService::new(store, aliases),
    })
}

fn parse_lang(raw: Option<&str>) -> Option<Lang> {
    raw.and_then(Lang::parse)
}

fn print_record(record: &CanonicalAnimeRecord) {
    let eps = record
        .episodes
        .map_or_else(|| "? eps".to_string(), |e| format!("{e} eps"));
    let score = record
        .score
        .map_or_else(|| "-".to_string(), |s| format!("{s:.2}"));

    println!("• {} ({})", record.title, eps);
    if let Some(en) = record.title_en.as_deref().filter(|t| *t != record.title) {
        println!("  EN: {en}");
    }
    if let Some(ru) = record.title_ru.as_deref().filter(|t| *t != record.title) {
        println!("  RU: {ru}");
    }
    if let Some(uk) = record.title_uk.as_deref().filter(|t| *t != record.title) {
        println!("  UK: {uk}");
    }
    println!(
        "  UID: {} | Score: {} | Status: {}",
        record.uid,
        score,
        record.status.as_deref().unwrap_or("?")
    );
}
