use std::ops::Deref;

use sqlx::PgPool;

/// Shared handle to the Postgres database backing the ledger, budgets, and
/// dashboard modules. Extracted from application state per request and
/// dereferences to the underlying [`PgPool`], so queries and commands can
/// pass it wherever sqlx expects an executor.
#[derive(Clone)]
pub struct PostgresConnection(PgPool);

impl PostgresConnection {
    pub fn new(pool: PgPool) -> Self {
        Self(pool)
    }
}

impl Deref for PostgresConnection {
    type Target = PgPool;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
