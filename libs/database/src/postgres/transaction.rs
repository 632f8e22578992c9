use sea_orm::{DatabaseTransaction, DbErr, TransactionSession, TransactionTrait};
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, error};

/// Future returned by a unit of work that borrows the transaction handle.
pub type TransactionFuture<'c, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'c>>;

/// Run `work` inside a single transaction.
///
/// The handle is lent to `work` and never escapes it. `Ok` commits, `Err`
/// rolls back and hands the original error back to the caller; a failed
/// rollback is logged and otherwise ignored. If the future is dropped before
/// either happens (panic, request cancelled) the `DatabaseTransaction` drop
/// guard rolls back and returns the connection to the pool.
///
/// ```ignore
/// let rows = with_transaction(&db, |txn| {
///     Box::pin(async move {
///         let result = images::Entity::delete_many().exec(txn).await?;
///         Ok::<_, DbErr>(result.rows_affected)
///     })
/// })
/// .await?;
/// ```
pub async fn with_transaction<C, F, T, E>(db: &C, work: F) -> Result<T, E>
where
    C: TransactionTrait<Transaction = DatabaseTransaction>,
    F: for<'c> FnOnce(&'c DatabaseTransaction) -> TransactionFuture<'c, T, E> + Send,
    T: Send,
    E: From<DbErr> + Send,
{
    let txn = db.begin().await?;
    debug!("Transaction started");

    let outcome = work(&txn).await;

    match outcome {
        Ok(value) => {
            txn.commit().await?;
            debug!("Transaction committed");
            Ok(value)
        }
        Err(err) => {
            match txn.rollback().await {
                Ok(()) => debug!("Transaction rolled back"),
                Err(rollback_err) => error!(error = %rollback_err, "Transaction rollback failed"),
            }
            Err(err)
        }
    }
}
