// Transaction management for catalog reads and registration writes
use crate::connection::DatabasePool;
use crate::error::{DatabaseError, DatabaseResult};
use crate::repository::{CatalogStore, WriteTx};
use futures::future::BoxFuture;
use sqlx::{Postgres, Transaction};
use std::fmt;
use tracing::{debug, warn};

/// Postgres isolation level applied at transaction start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    ReadCommitted,
    RepeatableRead,
}

impl IsolationLevel {
    pub fn as_sql(&self) -> &'static str {
        match self {
            IsolationLevel::ReadCommitted => "READ COMMITTED",
            IsolationLevel::RepeatableRead => "REPEATABLE READ",
        }
    }
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    ReadOnly,
    ReadWrite,
}

impl AccessMode {
    fn as_sql(&self) -> &'static str {
        match self {
            AccessMode::ReadOnly => "READ ONLY",
            AccessMode::ReadWrite => "READ WRITE",
        }
    }
}

/// Begin a Postgres transaction with the given isolation and access mode.
///
/// `SET TRANSACTION` must be the first statement, so it runs before any query
/// the caller issues on the returned transaction.
pub async fn begin_with(
    pool: &DatabasePool,
    isolation: IsolationLevel,
    access: AccessMode,
) -> DatabaseResult<Transaction<'static, Postgres>> {
    debug!(%isolation, access = access.as_sql(), "Beginning transaction");

    let mut tx = pool
        .pool()
        .begin()
        .await
        .map_err(|e| DatabaseError::TransactionFailed(format!("Failed to begin transaction: {}", e)))?;

    let sql = format!(
        "SET TRANSACTION ISOLATION LEVEL {}, {}",
        isolation.as_sql(),
        access.as_sql()
    );
    sqlx::query(&sql)
        .execute(&mut *tx)
        .await
        .map_err(|e| DatabaseError::TransactionFailed(format!("Failed to set isolation: {}", e)))?;

    Ok(tx)
}

/// Run `work` inside one write transaction.
///
/// Commits when `work` returns `Ok`, rolls back otherwise. Nothing `work`
/// wrote is visible to other readers unless the whole unit commits.
pub async fn transact<S, T, F>(store: &S, work: F) -> DatabaseResult<T>
where
    S: CatalogStore + ?Sized,
    T: Send,
    F: for<'t> FnOnce(&'t mut dyn WriteTx) -> BoxFuture<'t, DatabaseResult<T>> + Send,
{
    let mut tx = store.begin_write().await?;

    match work(tx.as_mut()).await {
        Ok(value) => {
            tx.commit().await?;
            debug!("Transaction committed");
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Rollback failed after aborted unit of work");
            }
            debug!(error = %err, "Transaction rolled back");
            Err(err)
        }
    }
}
