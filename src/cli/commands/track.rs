use crate::config::Config;
use crate::models::tracking::TrackedUser;
use crate::services::{CatalogService, TrackingService};

use super::open_services;

pub async fn cmd_track(config: &Config, list: &str, uid: &str, user: &str) -> anyhow::Result<()> {
    let services = open_services(config).await?;

    let canonical = services.catalog.ensure_anime_stub(uid).await?;
    let record = services.catalog.get_catalog_item(&canonical).await?;
    let stored = services
        .tracking
        .add_to_list(&TrackedUser::new(user), list, &record)
        .await?;

    println!("✓ Added {} to {list}", record.title);
    println!("  UID: {stored}");
    Ok(())
}

pub async fn cmd_untrack(config: &Config, list: &str, uid: &str, user: &str) -> anyhow::Result<()> {
    let services = open_services(config).await?;

    if services.tracking.remove_from_list(user, list, uid).await? {
        println!("✓ Removed {uid} from {list}");
    } else {
        println!("{uid} is not on the {list} list");
    }
    Ok(())
}

pub async fn cmd_list(config: &Config, list: &str, user: &str) -> anyhow::Result<()> {
    let services = open_services(config).await?;
    let entries = services.tracking.get_list(user, list).await?;

    if entries.is_empty() {
        println!("The {list} list is empty.");
        println!();
        println!("Add anime with: shiori track {list} <uid> --user {user}");
        return Ok(());
    }

    println!("{list} ({} total)", entries.len());
    println!("{:-<70}", "");

    for entry in entries {
        let times = if entry.watch_count > 1 {
            format!(" ×{}", entry.watch_count)
        } else {
            String::new()
        };
        println!("• {}{times}", entry.anime.title);
        println!("  UID: {} | Added: {}", entry.anime.uid, entry.added_at);
    }

    Ok(())
}
