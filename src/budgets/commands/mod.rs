//! Commands that modify budgets and their allocation/spending links. Every
//! multi-statement operation runs inside a single store transaction; either
//! all of its writes commit or none do.

pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::ledger::domain::Transaction;

use super::domain::{Allocation, Budget, BudgetPatch, NewBudget, Spending};

#[derive(Debug, thiserror::Error)]
pub enum BudgetCommandError {
    #[error("no budget found with the provided ID")]
    NotFound,
    #[error("the referenced category does not exist")]
    CategoryNotFound,
    #[error("database error: {0}")]
    Database(anyhow::Error),
}

impl From<sqlx::Error> for BudgetCommandError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => Self::NotFound,
            other => Self::Database(other.into()),
        }
    }
}

#[async_trait]
pub trait BudgetCommands {
    /// Create a budget, or, when one already exists for the category with an
    /// overlapping period, update that budget in place. The overlap check and
    /// the write happen in one store transaction so a concurrent upsert
    /// cannot slip a duplicate in between them.
    async fn upsert_budget(&self, budget: NewBudget) -> Result<Budget, BudgetCommandError>;

    /// Replace an existing budget's amount and period.
    async fn update_budget(
        &self,
        budget_id: Uuid,
        patch: BudgetPatch,
    ) -> Result<Budget, BudgetCommandError>;

    /// Delete a budget. Its allocation and spending rows cascade away; the
    /// underlying transactions are never touched.
    async fn delete_budget(&self, budget_id: Uuid) -> Result<(), BudgetCommandError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AllocationError {
    #[error("allocation amounts must be positive")]
    NonPositiveAmount,
    #[error("no transaction found with the provided ID")]
    TransactionNotFound,
    #[error("only income transactions can fund an allocation")]
    NotIncome,
    #[error("no budget found with the provided ID")]
    BudgetNotFound,
    #[error("the allocation amount exceeds the transaction amount")]
    InsufficientFunds,
    #[error("no allocation found with the provided ID")]
    NotFound,
    #[error("database error: {0}")]
    Database(anyhow::Error),
}

impl From<sqlx::Error> for AllocationError {
    fn from(error: sqlx::Error) -> Self {
        Self::Database(error.into())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SpendingError {
    #[error("spending amounts must be positive")]
    NonPositiveAmount,
    #[error("no transaction found with the provided ID")]
    TransactionNotFound,
    #[error("only expense transactions can count against a budget")]
    NotExpense,
    #[error("no budget found with the provided ID")]
    BudgetNotFound,
    #[error("no spending record found with the provided ID")]
    NotFound,
    #[error("database error: {0}")]
    Database(anyhow::Error),
}

impl From<sqlx::Error> for SpendingError {
    fn from(error: sqlx::Error) -> Self {
        Self::Database(error.into())
    }
}

/// How a transaction's budget linkage ended up after a relink pass.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RelinkOutcome {
    Updated,
    Created,
    Removed,
    Unlinked,
}

#[async_trait]
pub trait ReconciliationCommands {
    /// Earmark part of an income transaction toward a budget. Validation and
    /// the insert run in one store transaction.
    async fn create_allocation(
        &self,
        budget_id: Uuid,
        transaction_id: Uuid,
        amount: i64,
    ) -> Result<Allocation, AllocationError>;

    /// Delete an allocation. The underlying income transaction is untouched.
    async fn delete_allocation(&self, allocation_id: Uuid) -> Result<(), AllocationError>;

    /// Count part of an expense transaction against a budget. Overspend is
    /// permitted; the remaining-amount comparison is computed for a warning
    /// only.
    async fn create_spending(
        &self,
        budget_id: Uuid,
        transaction_id: Uuid,
        amount: i64,
    ) -> Result<Spending, SpendingError>;

    /// Delete a spending record and, atomically, the expense transaction it
    /// represents. Asymmetric with [`Self::delete_allocation`] on purpose:
    /// spending records own their transaction.
    async fn delete_spending(&self, spending_id: Uuid) -> Result<(), SpendingError>;

    /// Bring a transaction's spending link in line with its current state
    /// after an edit. A link for a transaction that is no longer an expense
    /// is removed (the transaction itself survives). Otherwise best effort:
    /// when no budget covers the transaction, any existing link is left
    /// stale for the maintenance sweep.
    async fn relink_spending(&self, transaction: &Transaction)
        -> anyhow::Result<RelinkOutcome>;

    /// Maintenance sweep deleting spending rows whose transaction no longer
    /// falls inside the linked budget's category and period, or is no longer
    /// an expense. Returns the number of rows removed.
    async fn sweep_stale_spending(&self) -> anyhow::Result<u64>;
}
