use std::convert::TryFrom;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::{
    database::PostgresConnection,
    ledger::{domain, models},
};

use super::{CategoryQueries, TransactionQueries, TransactionQuery};

/// A struct to provide queries for the Postgres database backing the
/// application.
pub struct PostgresQueries(pub PostgresConnection);

#[async_trait]
impl CategoryQueries for PostgresQueries {
    async fn list_categories(&self) -> Result<Vec<domain::Category>> {
        let categories = sqlx::query_as::<_, models::Category>(
            r#"
            SELECT id, name FROM category
            ORDER BY name
            "#,
        )
        .fetch_all(&*self.0)
        .await?;

        Ok(categories.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl TransactionQueries for PostgresQueries {
    async fn get_transaction(
        &self,
        transaction_id: Uuid,
    ) -> Result<Option<domain::Transaction>> {
        trace!(%transaction_id, "Querying for transaction by ID.");

        let transaction_result = sqlx::query_as::<_, models::Transaction>(
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
            WHERE t.id = $1
            "#,
        )
        .bind(transaction_id)
        .fetch_optional(&*self.0)
        .await?;

        let transaction = match transaction_result {
            Some(t) => t,
            None => {
                debug!(%transaction_id, "Transaction does not exist.");

                return Ok(None);
            }
        };

        Ok(Some(domain::Transaction::try_from(transaction)?))
    }

    async fn list_transactions(
        &self,
        query: TransactionQuery,
    ) -> Result<Vec<domain::Transaction>> {
        let mut query_builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
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
            WHERE 1 = 1
            "#,
        );

        if let Some(kind) = query.kind {
            query_builder
                .push(" AND t.kind = ")
                .push_bind(kind.as_str());
        }

        if let Some(category_id) = query.category_id {
            query_builder
                .push(" AND t.category_id = ")
                .push_bind(category_id);
        }

        if let Some(min_amount) = query.min_amount {
            query_builder
                .push(" AND t.amount >= ")
                .push_bind(min_amount);
        }

        if let Some(max_amount) = query.max_amount {
            query_builder
                .push(" AND t.amount <= ")
                .push_bind(max_amount);
        }

        if let Some(start_date) = query.start_date {
            query_builder.push(" AND t.date >= ").push_bind(start_date);
        }

        if let Some(end_date) = query.end_date {
            query_builder.push(" AND t.date <= ").push_bind(end_date);
        }

        query_builder.push(" ORDER BY t.date DESC, t.created_at DESC");

        let transactions = query_builder
            .build_query_as::<models::Transaction>()
            .fetch_all(&*self.0)
            .await?;

        transactions
            .into_iter()
            .map(domain::Transaction::try_from)
            .collect()
    }
}
