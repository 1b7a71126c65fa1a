use crate::error::Result;

/// Database connection pool type
pub type DbPool = sqlx::PgPool;

/// Database connection type - supports both pool connections and transactions
/// Use `conn.as_mut()` for pool connections, `tx.as_mut()` for transactions
pub type DbConn = sqlx::PgConnection;

/// Connects to Postgres using the configured credentials.
pub async fn connect(config: &crate::config::DatabaseConfig) -> Result<DbPool> {
    use secrecy::ExposeSecret;

    let pool = DbPool::connect(config.connection_string().expose_secret()).await?;
    Ok(pool)
}

/// Applies the schema migrations. The unique indexes they create are the
/// race-safety backstop for the service layer's read-check-then-write flow.
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| crate::error::Error::Internal(format!("migration failed: {}", e)))?;
    Ok(())
}
