use sqlx::postgres::PgPoolOptions;

use crate::budgets::commands::{postgres::PostgresCommands, ReconciliationCommands};

pub struct ReconcileOpts {
    pub database_url: String,
}

/// Remove budget-spending links whose transaction no longer matches the
/// linked budget's category or date range, or is no longer an expense.
/// Edits can strand links this way; linkage is best-effort at edit time, so
/// cleanup runs on demand.
pub async fn run_reconcile(opts: ReconcileOpts) -> anyhow::Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&opts.database_url)
        .await?;

    let commands = PostgresCommands(&pool);
    commands.sweep_stale_spending().await?;

    Ok(())
}
