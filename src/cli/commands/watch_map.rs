use crate::config::Config;
use crate::services::TrackingService;

use super::open_services;

pub async fn cmd_watch_map_set(
    config: &Config,
    uid: &str,
    source: &str,
    url: &str,
    title: Option<&str>,
) -> anyhow::Result<()> {
    let services = open_services(config).await?;
    let binding = services
        .tracking
        .set_watch_map(uid, source, url, title)
        .await?;

    println!(
        "✓ {} → {} ({})",
        binding.uid, binding.watch_url, binding.watch_source
    );
    Ok(())
}

pub async fn cmd_watch_map_get(config: &Config, uid: &str) -> anyhow::Result<()> {
    let services = open_services(config).await?;

    match services.tracking.get_watch_map(uid).await? {
        Some(binding) => {
            println!("{} → {}", binding.uid, binding.watch_url);
            println!("  Source: {}", binding.watch_source);
            if let Some(title) = binding.watch_title {
                println!("  Title: {title}");
            }
        }
        None => println!("No watch binding for {uid}"),
    }
    Ok(())
}

pub async fn cmd_watch_map_clear(config: &Config, uid: &str) -> anyhow::Result<()> {
    let services = open_services(config).await?;

    if services.tracking.clear_watch_map(uid).await? {
        println!("✓ Watch binding removed");
    } else {
        println!("No watch binding for {uid}");
    }
    Ok(())
}
