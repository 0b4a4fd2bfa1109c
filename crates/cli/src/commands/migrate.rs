//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! digizone-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `DIGIZONE_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection
//!   string

use digizone_api::db;

use super::{CommandError, database_url};

/// Run the embedded migrations against the configured database.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
