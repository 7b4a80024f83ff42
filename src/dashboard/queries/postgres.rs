use std::convert::TryInto;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::trace;

use crate::{
    dashboard::{domain, models},
    database::PostgresConnection,
    ledger,
};

use super::{DashboardQueries, PeriodTotals};

const RECENT_TRANSACTION_LIMIT: i64 = 5;

pub struct PostgresQueries(pub PostgresConnection);

#[async_trait]
impl DashboardQueries for PostgresQueries {
    async fn period_totals(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PeriodTotals> {
        trace!(%start_date, %end_date, "Computing period totals.");

        let totals = sqlx::query_as::<_, models::TotalsRow>(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN kind = 'income' THEN amount ELSE 0 END), 0)::BIGINT
                    AS income,
                COALESCE(SUM(CASE WHEN kind = 'expense' THEN amount ELSE 0 END), 0)::BIGINT
                    AS expenses
            FROM "transaction"
            WHERE date BETWEEN $1 AND $2
            "#,
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_one(&*self.0)
        .await?;

        Ok(totals.into())
    }

    async fn budgeted_total(&self, start_date: NaiveDate, end_date: NaiveDate) -> Result<i64> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(b.amount), 0)::BIGINT
            FROM budget b
            WHERE EXISTS (
                SELECT 1 FROM "transaction" t
                WHERE t.category_id = b.category_id
                    AND t.kind = 'expense'
                    AND t.date BETWEEN $1 AND $2
            )
            "#,
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_one(&*self.0)
        .await?;

        Ok(total)
    }

    async fn monthly_overview(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        months: i64,
    ) -> Result<Vec<domain::MonthlyTotals>> {
        let rows = sqlx::query_as::<_, models::MonthRow>(
            r#"
            WITH month_start AS (
                SELECT generate_series(
                    date_trunc('month', $1::date),
                    date_trunc('month', $2::date),
                    interval '1 month'
                )::date AS month_start
            )
            SELECT
                to_char(m.month_start, 'Mon') AS month,
                COALESCE(SUM(CASE WHEN t.kind = 'income' THEN t.amount ELSE 0 END), 0)::BIGINT
                    AS income,
                COALESCE(SUM(CASE WHEN t.kind = 'expense' THEN t.amount ELSE 0 END), 0)::BIGINT
                    AS expenses
            FROM month_start m
                LEFT JOIN "transaction" t ON
                    t.date >= m.month_start
                    AND t.date < (m.month_start + interval '1 month')::date
            GROUP BY m.month_start
            ORDER BY m.month_start
            LIMIT $3
            "#,
        )
        .bind(start_date)
        .bind(end_date)
        .bind(months)
        .fetch_all(&*self.0)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn category_breakdown(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<domain::CategorySpend>> {
        let rows = sqlx::query_as::<_, models::BreakdownRow>(
            r#"
            SELECT c.name, COALESCE(SUM(t.amount), 0)::BIGINT AS value
            FROM category c
                LEFT JOIN "transaction" t ON
                    t.category_id = c.id
                    AND t.kind = 'expense'
                    AND t.date BETWEEN $1 AND $2
            GROUP BY c.name
            HAVING COALESCE(SUM(t.amount), 0) > 0
            ORDER BY value DESC
            "#,
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_all(&*self.0)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn recent_transactions(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<ledger::domain::Transaction>> {
        let transactions = sqlx::query_as::<_, ledger::models::Transaction>(
            r#"
            SELECT
                t.id,
                t.date,
                t.description,
                t.amount,
                t.kind,
                t.category_id,
                c.name AS category_name,
                t.notes,
                t.created_at
            FROM "transaction" t
                JOIN category c ON t.category_id = c.id
            WHERE t.date BETWEEN $1 AND $2
            ORDER BY t.date DESC, t.created_at DESC
            LIMIT $3
            "#,
        )
        .bind(start_date)
        .bind(end_date)
        .bind(RECENT_TRANSACTION_LIMIT)
        .fetch_all(&*self.0)
        .await?;

        transactions.into_iter().map(TryInto::try_into).collect()
    }
}
