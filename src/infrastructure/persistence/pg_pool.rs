use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::instrument;

use crate::application::ports::RepositoryError;

const CONNECT_RETRIES: u32 = 5;
const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Connects with exponential backoff so the service survives a database
/// that comes up slightly later than it does.
#[instrument(skip(url))]
pub async fn create_pool(url: &str, max_connections: u32) -> Result<PgPool, RepositoryError> {
    let options = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5));

    let mut delay = INITIAL_RETRY_DELAY;
    let mut attempt = 1;

    loop {
        match options.clone().connect(url).await {
            Ok(pool) => {
                tracing::info!("PostgreSQL connection pool established");
                return Ok(pool);
            }
            Err(e) if attempt < CONNECT_RETRIES => {
                tracing::warn!(
                    error = %e,
                    attempt = attempt,
                    delay_ms = delay.as_millis(),
                    "PostgreSQL connection failed, retrying"
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
            Err(e) => return Err(RepositoryError::ConnectionFailed(e.to_string())),
        }
    }
}
