use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Postgres, QueryBuilder};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::{
    budgets::{domain, models},
    database::PostgresConnection,
};

use super::{AllocationQueries, BudgetQueries, SpendingQueries};

pub struct PostgresQueries(pub PostgresConnection);

#[async_trait]
impl BudgetQueries for PostgresQueries {
    async fn list_budgets(
        &self,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Result<Vec<domain::BudgetWithMetrics>> {
        trace!(%window_start, %window_end, "Listing budgets overlapping window.");

        // A budget only partially inside the window reports the spend that
        // occurred inside the window, hence the GREATEST/LEAST clipping of
        // the joined transaction dates.
        let budgets = sqlx::query_as::<_, models::BudgetWithSpent>(
            r#"
            SELECT
                b.id,
                b.category_id,
                c.name AS category_name,
                b.amount,
                b.start_date,
                b.end_date,
                COALESCE(SUM(CASE WHEN t.kind = 'expense' THEN t.amount ELSE 0 END), 0)::BIGINT
                    AS spent
            FROM budget b
                JOIN category c ON b.category_id = c.id
                LEFT JOIN "transaction" t ON
                    t.category_id = b.category_id
                    AND t.kind = 'expense'
                    AND t.date BETWEEN
                        GREATEST(b.start_date, $1)
                        AND LEAST(b.end_date, $2)
            WHERE b.start_date <= $2 AND b.end_date >= $1
            GROUP BY b.id, c.name
            ORDER BY c.name
            "#,
        )
        .bind(window_start)
        .bind(window_end)
        .fetch_all(&*self.0)
        .await?;

        Ok(budgets.into_iter().map(Into::into).collect())
    }

    async fn get_budget(&self, budget_id: Uuid) -> Result<Option<domain::BudgetWithMetrics>> {
        let budget = sqlx::query_as::<_, models::BudgetWithSpent>(
            r#"
            SELECT
                b.id,
                b.category_id,
                c.name AS category_name,
                b.amount,
                b.start_date,
                b.end_date,
                COALESCE(SUM(CASE WHEN t.kind = 'expense' THEN t.amount ELSE 0 END), 0)::BIGINT
                    AS spent
            FROM budget b
                JOIN category c ON b.category_id = c.id
                LEFT JOIN "transaction" t ON
                    t.category_id = b.category_id
                    AND t.kind = 'expense'
                    AND t.date BETWEEN b.start_date AND b.end_date
            WHERE b.id = $1
            GROUP BY b.id, c.name
            "#,
        )
        .bind(budget_id)
        .fetch_optional(&*self.0)
        .await?;

        Ok(budget.map(Into::into))
    }

    async fn find_budget_for_category(
        &self,
        category_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<domain::BudgetWithMetrics>> {
        trace!(%category_id, %date, "Resolving budget covering date.");

        // The no-overlap invariant means at most one budget matches.
        let budget = sqlx::query_as::<_, models::BudgetWithSpent>(
            r#"
            SELECT
                b.id,
                b.category_id,
                c.name AS category_name,
                b.amount,
                b.start_date,
                b.end_date,
                COALESCE(SUM(CASE WHEN t.kind = 'expense' THEN t.amount ELSE 0 END), 0)::BIGINT
                    AS spent
            FROM budget b
                JOIN category c ON b.category_id = c.id
                LEFT JOIN "transaction" t ON
                    t.category_id = b.category_id
                    AND t.kind = 'expense'
                    AND t.date BETWEEN b.start_date AND b.end_date
            WHERE b.category_id = $1 AND $2 BETWEEN b.start_date AND b.end_date
            GROUP BY b.id, c.name
            LIMIT 1
            "#,
        )
        .bind(category_id)
        .bind(date)
        .fetch_optional(&*self.0)
        .await?;

        if budget.is_none() {
            debug!(%category_id, %date, "No budget covers the date; treating as unbudgeted.");
        }

        Ok(budget.map(Into::into))
    }
}

fn link_details_query<'a>(
    table: &'static str,
    budget_id: Option<Uuid>,
) -> QueryBuilder<'a, Postgres> {
    let mut query_builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(format!(
        r#"
        SELECT
            l.id,
            l.budget_id,
            l.transaction_id,
            l.amount,
            l.created_at,
            b.category_id,
            c.name AS category_name,
            t.description AS transaction_description,
            t.date AS transaction_date
        FROM {table} l
            JOIN budget b ON l.budget_id = b.id
            JOIN category c ON b.category_id = c.id
            JOIN "transaction" t ON l.transaction_id = t.id
        WHERE 1 = 1
        "#
    ));

    if let Some(budget_id) = budget_id {
        query_builder.push(" AND l.budget_id = ").push_bind(budget_id);
    }

    query_builder.push(" ORDER BY l.created_at DESC");

    query_builder
}

#[async_trait]
impl AllocationQueries for PostgresQueries {
    async fn list_allocations(&self, budget_id: Option<Uuid>) -> Result<Vec<domain::AllocationDetails>> {
        let allocations = link_details_query("budget_allocation", budget_id)
            .build_query_as::<models::LinkDetails>()
            .fetch_all(&*self.0)
            .await?;

        Ok(allocations.into_iter().map(Into::into).collect())
    }

    async fn get_allocation(&self, allocation_id: Uuid) -> Result<Option<domain::AllocationDetails>> {
        let allocation = sqlx::query_as::<_, models::LinkDetails>(
            r#"
            SELECT
                l.id,
                l.budget_id,
                l.transaction_id,
                l.amount,
                l.created_at,
                b.category_id,
                c.name AS category_name,
                t.description AS transaction_description,
                t.date AS transaction_date
            FROM budget_allocation l
                JOIN budget b ON l.budget_id = b.id
                JOIN category c ON b.category_id = c.id
                JOIN "transaction" t ON l.transaction_id = t.id
            WHERE l.id = $1
            "#,
        )
        .bind(allocation_id)
        .fetch_optional(&*self.0)
        .await?;

        Ok(allocation.map(Into::into))
    }
}

#[async_trait]
impl SpendingQueries for PostgresQueries {
    async fn list_spending(
        &self,
        budget_id: Option<Uuid>,
    ) -> Result<Vec<domain::SpendingDetails>> {
        let spending = link_details_query("budget_spending", budget_id)
            .build_query_as::<models::LinkDetails>()
            .fetch_all(&*self.0)
            .await?;

        Ok(spending.into_iter().map(Into::into).collect())
    }

    async fn get_spending(&self, spending_id: Uuid) -> Result<Option<domain::SpendingDetails>> {
        let spending = sqlx::query_as::<_, models::LinkDetails>(
            r#"
            SELECT
                l.id,
                l.budget_id,
                l.transaction_id,
                l.amount,
                l.created_at,
                b.category_id,
                c.name AS category_name,
                t.description AS transaction_description,
                t.date AS transaction_date
            FROM budget_spending l
                JOIN budget b ON l.budget_id = b.id
                JOIN category c ON b.category_id = c.id
                JOIN "transaction" t ON l.transaction_id = t.id
            WHERE l.id = $1
            "#,
        )
        .bind(spending_id)
        .fetch_optional(&*self.0)
        .await?;

        Ok(spending.map(Into::into))
    }

    async fn find_spending_by_transaction(
        &self,
        transaction_id: Uuid,
    ) -> Result<Option<domain::Spending>> {
        let spending = sqlx::query_as::<_, models::LinkRow>(
            r#"
            SELECT id, budget_id, transaction_id, amount, created_at
            FROM budget_spending
            WHERE transaction_id = $1
            LIMIT 1
            "#,
        )
        .bind(transaction_id)
        .fetch_optional(&*self.0)
        .await?;

        Ok(spending.map(Into::into))
    }
}
