use crate::config::Config;
use crate::services::CatalogService;

use super::{open_services, parse_lang, print_record};

pub async fn cmd_show(config: &Config, uid: &str, lang: Option<&str>) -> anyhow::Result<()> {
    let services = open_services(config).await?;
    let record = services
        .catalog
        .get_catalog_item_localized(uid, parse_lang(lang))
        .await?;

    print_record(&record);
    if let Some(url) = &record.url {
        println!("  URL: {url}");
    }
    if !record.legacy_uids.is_empty() {
        println!("  Known as: {}", record.legacy_uids.join(", "));
    }
    for (source, reference) in &record.source_refs {
        println!(
            "  {source}: {}{}",
            reference.uid,
            reference
                .url
                .as_deref()
                .map(|u| format!(" ({u})"))
                .unwrap_or_default()
        );
    }

    Ok(())
}

pub async fn cmd_resolve(config: &Config, uid: &str) -> anyhow::Result<()> {
    let services = open_services(config).await?;
    let canonical = services.catalog.resolve_uid(uid).await;

    if canonical == uid.trim() {
        println!("{canonical}");
    } else {
        println!("{} → {canonical}", uid.trim());
    }
    Ok(())
}
