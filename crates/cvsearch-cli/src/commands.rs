//! Handler functions for the CLI subcommands.

use std::path::Path;

use anyhow::Result;

use cvsearch_core::Settings;
use cvsearch_driver::SearchDriver;
use cvsearch_es::{
    CreateIndexOutcome, CsvImporter, ElasticsearchConnector, EsClient, FacetFilter, index_body,
};

use crate::page::{self, PageQuery};

/// One-shot search rendered to stdout.
pub async fn search(
    settings: Settings,
    term: Option<String>,
    gender: Option<String>,
    age: Option<String>,
    accent: Option<String>,
    current_page: usize,
) -> Result<()> {
    let connector = ElasticsearchConnector::new(&settings.elasticsearch)?;
    let mut driver = SearchDriver::new(Box::new(connector), settings.page.size);

    let query = PageQuery {
        q: term.clone(),
        gender: gender.clone(),
        age: age.clone(),
        accent: accent.clone(),
        page: Some(current_page),
    };

    if let Some(term) = term {
        driver.set_search_term(term);
    }
    if let Some(gender) = gender {
        driver.add_filter(FacetFilter::term("gender", gender));
    }
    if let Some(age) = age {
        driver.add_filter(FacetFilter::bucket("age", age));
    }
    if let Some(accent) = accent {
        driver.add_filter(FacetFilter::term("accent", accent));
    }
    driver.set_page(current_page);

    driver.run().await?;
    print!(
        "{}",
        page::render_text(driver.state(), driver.paging_info(), &query)
    );
    Ok(())
}

/// Create the index with settings and typed mappings.
pub async fn init(settings: Settings) -> Result<()> {
    let client = EsClient::new(&settings.elasticsearch)?;
    match client.create_index(&index_body()).await? {
        CreateIndexOutcome::Created => {
            println!("Created index '{}'", client.index());
        }
        CreateIndexOutcome::AlreadyExists => {
            println!("Index '{}' already exists", client.index());
        }
    }
    Ok(())
}

/// Bulk-import a Common Voice CSV, creating the index first if needed.
pub async fn import(settings: Settings, file: &Path, batch_size: usize) -> Result<()> {
    let client = EsClient::new(&settings.elasticsearch)?;
    client.create_index(&index_body()).await?;

    let stats = CsvImporter::new(&client)
        .with_batch_size(batch_size)
        .import_path(file)
        .await?;

    println!(
        "Imported {} of {} rows ({} failed)",
        stats.indexed, stats.rows, stats.failed
    );
    let total = client.count().await?;
    println!("Index '{}' now holds {} documents", client.index(), total);
    Ok(())
}
