use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

#[cfg(test)]
mod tests {
    use sqlx::Row;

    use super::{run_pending, MIGRATOR};
    use crate::connect_with_settings;

    async fn checkpoint_table_count(pool: &sqlx::SqlitePool) -> i64 {
        sqlx::query(
            "SELECT COUNT(*) AS count FROM sqlite_master \
             WHERE type = 'table' AND name = 'session_checkpoint'",
        )
        .fetch_one(pool)
        .await
        .expect("check session_checkpoint table")
        .get::<i64, _>("count")
    }

    #[tokio::test]
    async fn migrations_create_checkpoint_table() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        assert_eq!(checkpoint_table_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn migrations_are_reversible() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        MIGRATOR.undo(&pool, 0).await.expect("undo migrations");
        assert_eq!(checkpoint_table_count(&pool).await, 0);

        run_pending(&pool).await.expect("re-run migrations");
        assert_eq!(checkpoint_table_count(&pool).await, 1);
    }
}
