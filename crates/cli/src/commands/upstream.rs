use anyhow::Result;
use catalog_sync_source::{CatalogClient, SourceConfig};

fn client() -> Result<CatalogClient> {
    Ok(CatalogClient::new(SourceConfig::from_env()?)?)
}

pub(crate) async fn run_count(categories: Vec<String>) -> Result<()> {
    let count = client()?.count_models(&categories).await?;
    let output = serde_json::json!({ "categories": categories, "count": count });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub(crate) async fn run_show(username: String) -> Result<()> {
    match client()?.fetch_model(&username).await? {
        Some(model) => println!("{}", serde_json::to_string_pretty(&model)?),
        None => anyhow::bail!("Model not found: {username}"),
    }
    Ok(())
}
