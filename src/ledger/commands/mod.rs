//! Commands that modify categories and transactions.

pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{Category, NewTransaction, Transaction};

#[derive(Debug, thiserror::Error)]
pub enum CategoryError {
    #[error("a category named '{0}' already exists")]
    DuplicateName(String),
    #[error("database error: {0}")]
    Database(anyhow::Error),
}

#[async_trait]
pub trait CategoryCommands {
    /// Persist a new category with a unique name.
    async fn create_category(&self, name: String) -> Result<Category, CategoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransactionCommandError {
    #[error("no transaction found with the provided ID")]
    NotFound,
    #[error("the referenced category does not exist")]
    CategoryNotFound,
    #[error("database error: {0}")]
    Database(anyhow::Error),
}

impl From<sqlx::Error> for TransactionCommandError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => Self::NotFound,
            other => Self::Database(other.into()),
        }
    }
}

#[async_trait]
pub trait TransactionCommands {
    /// Persist a new transaction.
    ///
    /// # Arguments
    /// * `transaction` - The transaction to persist.
    ///
    /// # Returns
    ///
    /// The persisted transaction, annotated with its category name.
    async fn create_transaction(
        &self,
        transaction: NewTransaction,
    ) -> Result<Transaction, TransactionCommandError>;

    /// Replace the stored fields of an existing transaction.
    async fn update_transaction(
        &self,
        transaction_id: Uuid,
        update: NewTransaction,
    ) -> Result<Transaction, TransactionCommandError>;

    /// Delete a transaction. Budget spending rows referencing it go with it
    /// via the store's cascade.
    async fn delete_transaction(&self, transaction_id: Uuid)
        -> Result<(), TransactionCommandError>;
}
