//! Queries for categories and transactions.
//!
//! Queries fetch information from whatever storage is backing the
//! application. They never modify data.

pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use super::domain;

#[async_trait]
pub trait CategoryQueries {
    /// List every category, ordered alphabetically.
    async fn list_categories(&self) -> anyhow::Result<Vec<domain::Category>>;
}

/// Filter parameters for listing transactions. Every field is optional;
/// omitted fields do not constrain the result.
#[derive(Default)]
pub struct TransactionQuery {
    pub kind: Option<domain::TransactionKind>,
    pub category_id: Option<Uuid>,
    pub min_amount: Option<i64>,
    pub max_amount: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[async_trait]
pub trait TransactionQueries {
    /// Get a single transaction by its ID.
    ///
    /// # Returns
    ///
    /// A [`Result`][anyhow::Result] containing the transaction if it was
    /// found.
    async fn get_transaction(
        &self,
        transaction_id: Uuid,
    ) -> anyhow::Result<Option<domain::Transaction>>;

    /// List the transactions matching the provided filters, most recent
    /// first.
    async fn list_transactions(
        &self,
        query: TransactionQuery,
    ) -> anyhow::Result<Vec<domain::Transaction>>;
}
