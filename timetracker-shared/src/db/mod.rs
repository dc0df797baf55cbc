/// Database plumbing: pool construction and migrations
///
/// # Example
///
/// ```no_run
/// use timetracker_shared::db::{migrations::run_migrations, pool::{create_pool, PoolConfig}};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(PoolConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// })
/// .await?;
/// run_migrations(&pool).await?;
/// # Ok(())
/// # }
/// ```

pub mod migrations;
pub mod pool;
