use crate::config::Config;
use crate::models::tracking::WatchProgressInput;
use crate::services::TrackingService;

use super::{open_services, parse_lang};

pub async fn cmd_progress_start(
    config: &Config,
    user: &str,
    input: WatchProgressInput,
) -> anyhow::Result<()> {
    let services = open_services(config).await?;
    let uid = services
        .tracking
        .upsert_watch_progress(user, &input)
        .await?;

    println!("✓ {uid}: episode {}", input.episode_label.trim());
    Ok(())
}

pub async fn cmd_progress_delete(config: &Config, user: &str, uid: &str) -> anyhow::Result<()> {
    let services = open_services(config).await?;

    if services.tracking.delete_watch_progress(user, uid).await? {
        println!("✓ Progress removed");
    } else {
        println!("No progress recorded for {uid}");
    }
    Ok(())
}

pub async fn cmd_progress_recent(
    config: &Config,
    user: &str,
    limit: Option<u64>,
    lang: Option<&str>,
) -> anyhow::Result<()> {
    let services = open_services(config).await?;
    let entries = services
        .tracking
        .recent_watch_progress(user, limit, parse_lang(lang))
        .await?;

    if entries.is_empty() {
        println!("Nothing watched yet.");
        return Ok(());
    }

    for entry in entries {
        let quality = entry
            .last_quality
            .as_deref()
            .map(|q| format!(" [{q}]"))
            .unwrap_or_default();
        println!("• {} – episode {}{quality}", entry.title, entry.last_episode);
        println!("  UID: {} | Updated: {}", entry.uid, entry.updated_at);
    }
    Ok(())
}
