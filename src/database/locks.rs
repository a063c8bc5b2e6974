use crate::error::AppResult;
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

/// Lock namespaces for `pg_advisory_xact_lock(class, key)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockClass {
    PromotionSource = 1,
    FreeProductPromotion = 2,
    DiscountProductPromotion = 3,
}

/// Takes a transaction-scoped advisory lock. Released on commit or rollback, so `conn`
/// must be a transaction.
pub async fn advisory_xact_lock<C: ConnectionTrait>(
    conn: &C,
    class: LockClass,
    key: i64,
) -> AppResult<()> {
    // 两参数版本只接受 int4，key 取模后冲突只会多串行化，不影响正确性
    let key = (key % i32::MAX as i64) as i32;
    let stmt = Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        "SELECT pg_advisory_xact_lock($1, $2)",
        [(class as i32).into(), key.into()],
    );
    conn.execute(stmt).await?;
    Ok(())
}
