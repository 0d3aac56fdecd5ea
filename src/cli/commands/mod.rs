pub mod backup;
pub mod cleanup;
pub mod health;
pub mod stats;

use crate::config;
use crate::store::{RecordStore, SqliteRecordStore};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Open the configured record store for one command invocation.
pub(crate) async fn open_store() -> Result<Arc<dyn RecordStore>> {
    let config = config::config()?;
    let store = SqliteRecordStore::connect(&config.database.path)
        .await
        .with_context(|| format!("cannot open record store at {}", config.database.path))?;
    Ok(Arc::new(store))
}
