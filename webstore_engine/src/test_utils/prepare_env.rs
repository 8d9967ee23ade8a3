//! Throwaway sqlite databases for the integration tests.
//!
//! Every test works against its own randomly named database file under `data/`, so the suite can run in parallel
//! without tests seeing each other's users or orders. Tests drop the file themselves when they finish.
use log::*;
use sqlx::{migrate, migrate::MigrateDatabase, Sqlite};

use crate::SqliteDatabase;

/// A unique `sqlite://` url under `data/`.
pub fn random_db_path() -> String {
    format!("sqlite://../data/test_store_{}", rand::random::<u64>())
}

/// Creates a fresh database at `url` and brings its schema up to date. Any leftover file from a crashed run is
/// dropped first. Also loads `.env.test` and initialises logging, once per process.
pub async fn prepare_test_env(url: &str) {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    if let Err(e) = Sqlite::drop_database(url).await {
        warn!("🛠️ Could not drop leftover test database {url}: {e}");
    }
    Sqlite::create_database(url).await.expect("Error creating test database");
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error connecting to test database");
    migrate!("./src/sqlite/migrations").run(db.pool()).await.expect("Error running migrations");
    debug!("🛠️ Test database ready at {url}");
}
