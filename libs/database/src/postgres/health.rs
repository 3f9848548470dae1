use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};
use tracing::debug;

use crate::common::DatabaseError;

/// Round-trip `SELECT 1` to verify the connection still answers.
///
/// Backs the readiness endpoint: a pool that cannot serve this query should
/// take the instance out of rotation.
pub async fn check_health(db: &DatabaseConnection) -> Result<(), DatabaseError> {
    debug!("Checking PostgreSQL health");

    let stmt = Statement::from_string(DatabaseBackend::Postgres, "SELECT 1".to_owned());
    let row = db.query_one_raw(stmt).await.map_err(|e| {
        DatabaseError::HealthCheckFailed(format!("PostgreSQL health check failed: {}", e))
    })?;

    if row.is_none() {
        return Err(DatabaseError::HealthCheckFailed(
            "PostgreSQL health check returned no rows".to_string(),
        ));
    }

    Ok(())
}
