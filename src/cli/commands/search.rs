use std::sync::Arc;

use crate::clients::{TranslateClient, build_adapters};
use crate::config::Config;
use crate::services::localization::Translator;
use crate::services::{CatalogSearchService, CatalogService, SearchRequest};

use super::{open_services, parse_lang, print_record};

pub async fn cmd_search(
    config: &Config,
    query: &str,
    limit: Option<usize>,
    lang: Option<&str>,
    sources: Vec<String>,
    save: bool,
) -> anyhow::Result<()> {
    println!("Searching for: {query}");

    let translator: Arc<dyn Translator> = Arc::new(TranslateClient::from_config(
        &config.localization,
        &config.sources.user_agent,
    ));
    let service =
        CatalogSearchService::from_config(config, build_adapters(&config.sources), Some(translator));

    let response = service
        .search(SearchRequest {
            query: query.to_string(),
            limit,
            lang: parse_lang(lang),
            sources,
        })
        .await?;

    if response.items.is_empty() {
        println!("No anime found matching '{query}'");
        return Ok(());
    }

    let sources: Vec<&str> = response.sources.iter().map(|s| s.as_str()).collect();
    println!();
    println!("Search Results ({}):", sources.join(", "));
    println!("{:-<60}", "");

    for record in &response.items {
        print_record(record);
        if record.legacy_uids.len() > 1 {
            println!("  Merged from: {}", record.legacy_uids.join(", "));
        }
        println!();
    }

    if save {
        let services = open_services(config).await?;
        let stored = services
            .catalog
            .upsert_catalog_items(&response.items)
            .await?;
        println!("✓ Stored {} item(s) in the catalog", stored.len());
    } else {
        println!("To keep these results: shiori search --save \"{query}\"");
    }

    Ok(())
}
