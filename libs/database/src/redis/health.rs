use redis::aio::ConnectionManager;
use tracing::debug;

use crate::common::DatabaseError;

/// PING the Redis server; only a bare `PONG` reply counts as healthy.
pub async fn check_health(conn: &mut ConnectionManager) -> Result<(), DatabaseError> {
    debug!("Checking Redis health");

    let reply: String = redis::cmd("PING").query_async(conn).await.map_err(|e| {
        DatabaseError::HealthCheckFailed(format!("Redis health check failed: {}", e))
    })?;

    expect_pong(&reply)
}

fn expect_pong(reply: &str) -> Result<(), DatabaseError> {
    if reply == "PONG" {
        return Ok(());
    }
    Err(DatabaseError::HealthCheckFailed(format!(
        "Redis PING returned unexpected reply: {}",
        reply
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expect_pong_accepts_the_canonical_reply() {
        assert!(expect_pong("PONG").is_ok());
    }

    #[test]
    fn test_expect_pong_rejects_anything_else() {
        let err = expect_pong("LOADING").unwrap_err();
        assert!(err.to_string().contains("LOADING"));
    }
}
