pub(crate) mod config;
pub(crate) mod maintenance;
pub(crate) mod parse;
pub(crate) mod scan;
pub(crate) mod shows;

use std::sync::Arc;

use tvshelf_db::MetadataStore;
use tvshelf_lib::Settings;

use crate::CliError;

/// Open (or create) the metadata database named by the settings.
pub(crate) fn open_store(settings: &Settings) -> Result<Arc<MetadataStore>, CliError> {
    let db_path = settings.database_path();
    let store = MetadataStore::open(&db_path).map_err(|e| {
        CliError::database(format!(
            "Failed to open metadata database {}: {}",
            db_path.display(),
            e
        ))
    })?;
    Ok(Arc::new(store))
}

/// Open the database only if it already exists. Read-only commands use this
/// so they never leave an empty database behind.
pub(crate) fn existing_store(settings: &Settings) -> Result<Option<Arc<MetadataStore>>, CliError> {
    let db_path = settings.database_path();
    if !db_path.exists() {
        log::warn!("No metadata database found at {}", db_path.display());
        log::info!("Run 'tvshelf scan <folder>' to create one.");
        return Ok(None);
    }
    open_store(settings).map(Some)
}

/// Truncate a string to a maximum width, appending "..." if needed.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
