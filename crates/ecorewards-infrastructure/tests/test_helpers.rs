use sqlx::SqlitePool;

use ecorewards_infrastructure::persistence::Database;

/// Fresh in-memory database with migrations (schema + reference data
/// seeds) applied.
pub async fn setup_in_memory_db() -> SqlitePool {
    let db = Database::in_memory().await.expect("create in-memory db");
    db.run_migrations().await.expect("run migrations");
    db.pool().clone()
}
