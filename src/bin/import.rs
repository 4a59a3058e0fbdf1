//! recipes-import <path-to-recipes.json>
//!
//! Replaces every stored recipe with the contents of the given dataset.

use std::path::PathBuf;
use std::process::ExitCode;

use recipes_backend::{config, db::RecipeStore, import, import::ImportError};

async fn run() -> anyhow::Result<()> {
    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .ok_or(ImportError::MissingArgument)?;

    // Parse before connecting so a bad file never touches the database
    let dataset = import::load_dataset(&path)?;
    tracing::info!("Parsed {} recipes ({} skipped)", dataset.recipes.len(), dataset.skipped);

    let app_config = config::load_config_readonly().map_err(anyhow::Error::msg)?;
    if app_config.uses_data_dir() {
        std::fs::create_dir_all(app_config.get_data_dir())?;
    }

    let database_url = app_config.get_database_url();
    let store = RecipeStore::connect(&database_url)
        .await
        .map_err(ImportError::Database)?;
    tracing::info!("Connected to {}", database_url);

    let result = import::import_dataset(&store, &dataset).await;
    store.close().await;

    let report = result?;
    println!("Imported {} recipes", report.inserted);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    recipes_backend::init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Import failed: {:#}", e);
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
