use std::convert::TryFrom;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::ledger::{domain, models};

use super::{CategoryCommands, CategoryError, TransactionCommandError, TransactionCommands};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

pub struct PostgresCommands<'a>(pub &'a PgPool);

impl<'a> PostgresCommands<'a> {
    async fn fetch_transaction(
        &self,
        transaction_id: Uuid,
    ) -> Result<models::Transaction, sqlx::Error> {
        sqlx::query_as::<_, models::Transaction>(
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
        .fetch_one(self.0)
        .await
    }
}

#[async_trait]
impl<'a> CategoryCommands for PostgresCommands<'a> {
    async fn create_category(&self, name: String) -> Result<domain::Category, CategoryError> {
        let result = sqlx::query_as::<_, models::Category>(
            r#"
            INSERT INTO category (id, name)
            VALUES ($1, $2)
            RETURNING id, name
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&name)
        .fetch_one(self.0)
        .await;

        match result {
            Ok(category) => {
                info!(id = %category.id, name = %category.name, "Persisted new category.");

                Ok(category.into())
            }
            Err(sqlx::Error::Database(error))
                if error.code().as_deref() == Some(UNIQUE_VIOLATION) =>
            {
                Err(CategoryError::DuplicateName(name))
            }
            Err(error) => Err(CategoryError::Database(error.into())),
        }
    }
}

#[async_trait]
impl<'a> TransactionCommands for PostgresCommands<'a> {
    async fn create_transaction(
        &self,
        transaction: domain::NewTransaction,
    ) -> Result<domain::Transaction, TransactionCommandError> {
        let transaction_id = Uuid::new_v4();

        let result = sqlx::query(
            r#"
            INSERT INTO "transaction" (id, date, description, amount, kind, category_id, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(transaction_id)
        .bind(transaction.date())
        .bind(transaction.description())
        .bind(transaction.amount())
        .bind(transaction.kind().as_str())
        .bind(transaction.category_id())
        .bind(transaction.notes())
        .execute(self.0)
        .await;

        match result {
            Ok(_) => (),
            Err(sqlx::Error::Database(error))
                if error.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) =>
            {
                return Err(TransactionCommandError::CategoryNotFound)
            }
            Err(error) => return Err(error.into()),
        }

        info!(id = %transaction_id, kind = %transaction.kind(), "Persisted new transaction.");

        let persisted = self.fetch_transaction(transaction_id).await?;

        domain::Transaction::try_from(persisted).map_err(TransactionCommandError::Database)
    }

    async fn update_transaction(
        &self,
        transaction_id: Uuid,
        update: domain::NewTransaction,
    ) -> Result<domain::Transaction, TransactionCommandError> {
        let result = sqlx::query(
            r#"
            UPDATE "transaction"
            SET
                date = $2,
                description = $3,
                amount = $4,
                kind = $5,
                category_id = $6,
                notes = $7
            WHERE id = $1
            "#,
        )
        .bind(transaction_id)
        .bind(update.date())
        .bind(update.description())
        .bind(update.amount())
        .bind(update.kind().as_str())
        .bind(update.category_id())
        .bind(update.notes())
        .execute(self.0)
        .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => {
                return Err(TransactionCommandError::NotFound)
            }
            Ok(_) => (),
            Err(sqlx::Error::Database(error))
                if error.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) =>
            {
                return Err(TransactionCommandError::CategoryNotFound)
            }
            Err(error) => return Err(error.into()),
        }

        info!(%transaction_id, "Updated transaction.");

        let persisted = self.fetch_transaction(transaction_id).await?;

        domain::Transaction::try_from(persisted).map_err(TransactionCommandError::Database)
    }

    async fn delete_transaction(
        &self,
        transaction_id: Uuid,
    ) -> Result<(), TransactionCommandError> {
        let result = sqlx::query(
            r#"
            DELETE FROM "transaction"
            WHERE id = $1
            "#,
        )
        .bind(transaction_id)
        .execute(self.0)
        .await?;

        if result.rows_affected() == 0 {
            return Err(TransactionCommandError::NotFound);
        }

        info!(%transaction_id, rows = result.rows_affected(), "Deleted transaction.");

        Ok(())
    }
}
