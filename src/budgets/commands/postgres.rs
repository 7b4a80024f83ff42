use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    budgets::{domain, models},
    ledger::domain::Transaction,
};

use super::{
    AllocationError, BudgetCommandError, BudgetCommands, ReconciliationCommands, RelinkOutcome,
    SpendingError,
};

const FOREIGN_KEY_VIOLATION: &str = "23503";

pub struct PostgresCommands<'a>(pub &'a PgPool);

#[async_trait]
impl<'a> BudgetCommands for PostgresCommands<'a> {
    async fn upsert_budget(
        &self,
        budget: domain::NewBudget,
    ) -> Result<domain::Budget, BudgetCommandError> {
        let mut tx = self.0.begin().await?;

        let existing: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM budget
            WHERE category_id = $1 AND start_date <= $3 AND end_date >= $2
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(budget.category_id())
        .bind(budget.start_date())
        .bind(budget.end_date())
        .fetch_optional(&mut tx)
        .await?;

        let persisted = match existing {
            Some(budget_id) => {
                let updated = sqlx::query_as::<_, models::Budget>(
                    r#"
                    UPDATE budget
                    SET amount = $2, start_date = $3, end_date = $4
                    WHERE id = $1
                    RETURNING id, category_id, amount, start_date, end_date
                    "#,
                )
                .bind(budget_id)
                .bind(budget.amount())
                .bind(budget.start_date())
                .bind(budget.end_date())
                .fetch_one(&mut tx)
                .await?;

                info!(%budget_id, "Updated overlapping budget in place.");

                updated
            }
            None => {
                let result = sqlx::query_as::<_, models::Budget>(
                    r#"
                    INSERT INTO budget (id, category_id, amount, start_date, end_date)
                    VALUES ($1, $2, $3, $4, $5)
                    RETURNING id, category_id, amount, start_date, end_date
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(budget.category_id())
                .bind(budget.amount())
                .bind(budget.start_date())
                .bind(budget.end_date())
                .fetch_one(&mut tx)
                .await;

                let inserted = match result {
                    Ok(inserted) => inserted,
                    Err(sqlx::Error::Database(error))
                        if error.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) =>
                    {
                        return Err(BudgetCommandError::CategoryNotFound)
                    }
                    Err(error) => return Err(error.into()),
                };

                info!(budget_id = %inserted.id, "Persisted new budget.");

                inserted
            }
        };

        tx.commit().await?;

        Ok(persisted.into())
    }

    async fn update_budget(
        &self,
        budget_id: Uuid,
        patch: domain::BudgetPatch,
    ) -> Result<domain::Budget, BudgetCommandError> {
        let updated = sqlx::query_as::<_, models::Budget>(
            r#"
            UPDATE budget
            SET amount = $2, start_date = $3, end_date = $4
            WHERE id = $1
            RETURNING id, category_id, amount, start_date, end_date
            "#,
        )
        .bind(budget_id)
        .bind(patch.amount())
        .bind(patch.start_date())
        .bind(patch.end_date())
        .fetch_one(self.0)
        .await?;

        info!(%budget_id, "Updated budget.");

        Ok(updated.into())
    }

    async fn delete_budget(&self, budget_id: Uuid) -> Result<(), BudgetCommandError> {
        // Allocation and spending rows go with the budget via the store's
        // cascade; the underlying transactions stay.
        let result = sqlx::query(
            r#"
            DELETE FROM budget
            WHERE id = $1
            "#,
        )
        .bind(budget_id)
        .execute(self.0)
        .await?;

        if result.rows_affected() == 0 {
            return Err(BudgetCommandError::NotFound);
        }

        info!(%budget_id, "Deleted budget.");

        Ok(())
    }
}

#[async_trait]
impl<'a> ReconciliationCommands for PostgresCommands<'a> {
    async fn create_allocation(
        &self,
        budget_id: Uuid,
        transaction_id: Uuid,
        amount: i64,
    ) -> Result<domain::Allocation, AllocationError> {
        if amount <= 0 {
            return Err(AllocationError::NonPositiveAmount);
        }

        let mut tx = self.0.begin().await?;

        let funds = sqlx::query_as::<_, models::TransactionFunds>(
            r#"
            SELECT kind, amount FROM "transaction"
            WHERE id = $1
            "#,
        )
        .bind(transaction_id)
        .fetch_optional(&mut tx)
        .await?
        .ok_or(AllocationError::TransactionNotFound)?;

        let kind = funds
            .kind
            .parse()
            .map_err(|error: crate::ledger::domain::UnknownTransactionKind| {
                AllocationError::Database(error.into())
            })?;

        if domain::check_allocation_source(kind).is_some() {
            return Err(AllocationError::NotIncome);
        }

        let budget_exists: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM budget
            WHERE id = $1
            "#,
        )
        .bind(budget_id)
        .fetch_optional(&mut tx)
        .await?;

        if budget_exists.is_none() {
            return Err(AllocationError::BudgetNotFound);
        }

        if domain::check_allocation_amount(funds.amount, amount).is_some() {
            return Err(AllocationError::InsufficientFunds);
        }

        let allocation = sqlx::query_as::<_, models::LinkRow>(
            r#"
            INSERT INTO budget_allocation (id, budget_id, transaction_id, amount)
            VALUES ($1, $2, $3, $4)
            RETURNING id, budget_id, transaction_id, amount, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(budget_id)
        .bind(transaction_id)
        .bind(amount)
        .fetch_one(&mut tx)
        .await?;

        tx.commit().await?;

        info!(allocation_id = %allocation.id, %budget_id, %transaction_id, "Allocated income to budget.");

        Ok(allocation.into())
    }

    async fn delete_allocation(&self, allocation_id: Uuid) -> Result<(), AllocationError> {
        // Only the allocation row; the income transaction stays.
        let result = sqlx::query(
            r#"
            DELETE FROM budget_allocation
            WHERE id = $1
            "#,
        )
        .bind(allocation_id)
        .execute(self.0)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AllocationError::NotFound);
        }

        info!(%allocation_id, "Deleted budget allocation.");

        Ok(())
    }

    async fn create_spending(
        &self,
        budget_id: Uuid,
        transaction_id: Uuid,
        amount: i64,
    ) -> Result<domain::Spending, SpendingError> {
        if amount <= 0 {
            return Err(SpendingError::NonPositiveAmount);
        }

        let mut tx = self.0.begin().await?;

        let funds = sqlx::query_as::<_, models::TransactionFunds>(
            r#"
            SELECT kind, amount FROM "transaction"
            WHERE id = $1
            "#,
        )
        .bind(transaction_id)
        .fetch_optional(&mut tx)
        .await?
        .ok_or(SpendingError::TransactionNotFound)?;

        let kind = funds
            .kind
            .parse()
            .map_err(|error: crate::ledger::domain::UnknownTransactionKind| {
                SpendingError::Database(error.into())
            })?;

        if domain::check_spending(kind).is_some() {
            return Err(SpendingError::NotExpense);
        }

        let budget_funds: Option<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT
                b.amount,
                COALESCE(SUM(CASE WHEN t.kind = 'expense' THEN t.amount ELSE 0 END), 0)::BIGINT
                    AS spent
            FROM budget b
                LEFT JOIN "transaction" t ON
                    t.category_id = b.category_id
                    AND t.kind = 'expense'
                    AND t.date BETWEEN b.start_date AND b.end_date
            WHERE b.id = $1
            GROUP BY b.id
            "#,
        )
        .bind(budget_id)
        .fetch_optional(&mut tx)
        .await?;

        let (budget_amount, spent) = budget_funds.ok_or(SpendingError::BudgetNotFound)?;

        // Overspending is allowed and surfaced to the caller as a negative
        // remaining amount; here it only rates a warning.
        let metrics = domain::BudgetMetrics::compute(budget_amount, spent);
        if amount > metrics.remaining {
            warn!(
                %budget_id,
                %transaction_id,
                remaining = metrics.remaining,
                amount,
                "Spending exceeds the budget's remaining amount.",
            );
        }

        let spending = sqlx::query_as::<_, models::LinkRow>(
            r#"
            INSERT INTO budget_spending (id, budget_id, transaction_id, amount)
            VALUES ($1, $2, $3, $4)
            RETURNING id, budget_id, transaction_id, amount, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(budget_id)
        .bind(transaction_id)
        .bind(amount)
        .fetch_one(&mut tx)
        .await?;

        tx.commit().await?;

        info!(spending_id = %spending.id, %budget_id, %transaction_id, "Recorded budget spending.");

        Ok(spending.into())
    }

    async fn delete_spending(&self, spending_id: Uuid) -> Result<(), SpendingError> {
        let mut tx = self.0.begin().await?;

        let transaction_id: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT transaction_id FROM budget_spending
            WHERE id = $1
            "#,
        )
        .bind(spending_id)
        .fetch_optional(&mut tx)
        .await?;

        let transaction_id = transaction_id.ok_or(SpendingError::NotFound)?;

        sqlx::query(
            r#"
            DELETE FROM budget_spending
            WHERE id = $1
            "#,
        )
        .bind(spending_id)
        .execute(&mut tx)
        .await?;

        sqlx::query(
            r#"
            DELETE FROM "transaction"
            WHERE id = $1
            "#,
        )
        .bind(transaction_id)
        .execute(&mut tx)
        .await?;

        tx.commit().await?;

        info!(%spending_id, %transaction_id, "Deleted budget spending and its transaction.");

        Ok(())
    }

    async fn relink_spending(&self, transaction: &Transaction) -> anyhow::Result<RelinkOutcome> {
        let mut tx = self.0.begin().await?;

        let covering_budget: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM budget
            WHERE category_id = $1 AND $2 BETWEEN start_date AND end_date
            LIMIT 1
            "#,
        )
        .bind(transaction.category_id)
        .bind(transaction.date)
        .fetch_optional(&mut tx)
        .await?;

        let existing_spending: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM budget_spending
            WHERE transaction_id = $1
            LIMIT 1
            "#,
        )
        .bind(transaction.id)
        .fetch_optional(&mut tx)
        .await?;

        let outcome = match domain::RelinkAction::decide(
            transaction.kind,
            covering_budget,
            existing_spending,
        ) {
            domain::RelinkAction::Update {
                spending_id,
                budget_id,
            } => {
                sqlx::query(
                    r#"
                    UPDATE budget_spending
                    SET budget_id = $2, amount = $3
                    WHERE id = $1
                    "#,
                )
                .bind(spending_id)
                .bind(budget_id)
                .bind(transaction.amount)
                .execute(&mut tx)
                .await?;

                RelinkOutcome::Updated
            }
            domain::RelinkAction::Create { budget_id } => {
                sqlx::query(
                    r#"
                    INSERT INTO budget_spending (id, budget_id, transaction_id, amount)
                    VALUES ($1, $2, $3, $4)
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(budget_id)
                .bind(transaction.id)
                .bind(transaction.amount)
                .execute(&mut tx)
                .await?;

                RelinkOutcome::Created
            }
            domain::RelinkAction::Remove { spending_id } => {
                // The link only. The transaction itself is the user's data
                // and stays.
                sqlx::query(
                    r#"
                    DELETE FROM budget_spending
                    WHERE id = $1
                    "#,
                )
                .bind(spending_id)
                .execute(&mut tx)
                .await?;

                RelinkOutcome::Removed
            }
            domain::RelinkAction::Leave => RelinkOutcome::Unlinked,
        };

        tx.commit().await?;

        debug!(transaction_id = %transaction.id, ?outcome, "Reconciled budget spending link.");

        Ok(outcome)
    }

    async fn sweep_stale_spending(&self) -> anyhow::Result<u64> {
        // Stale means the linked transaction drifted out of the budget's
        // category or period, or stopped being an expense altogether.
        let result = sqlx::query(
            r#"
            DELETE FROM budget_spending s
            USING budget b, "transaction" t
            WHERE s.budget_id = b.id
                AND s.transaction_id = t.id
                AND (
                    t.kind <> 'expense'
                    OR t.category_id <> b.category_id
                    OR t.date < b.start_date
                    OR t.date > b.end_date
                )
            "#,
        )
        .execute(self.0)
        .await?;

        info!(rows = result.rows_affected(), "Swept stale budget spending links.");

        Ok(result.rows_affected())
    }
}
