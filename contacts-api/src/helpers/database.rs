use std::sync::Arc;

use crate::config::ApiConfig;
use crate::database::{Database, DatabaseTarget};

/// Human-readable location of the configured database, for startup logs.
pub fn describe_target(target: &DatabaseTarget) -> String {
    match target {
        DatabaseTarget::File(path) => path.display().to_string(),
        DatabaseTarget::Memory => "in-memory".to_string(),
    }
}

/// Open the configured database and run migrations.
pub fn initialize_database(config: &ApiConfig) -> anyhow::Result<Arc<Database>> {
    let target = config.database_target()?;

    let db = Database::new(&target)?;
    tracing::info!("Database initialized at: {}", describe_target(&target));

    Ok(Arc::new(db))
}
