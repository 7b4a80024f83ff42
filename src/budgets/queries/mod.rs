//! Queries for budgets and their allocation/spending links. Read-only.

pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use super::domain;

#[async_trait]
pub trait BudgetQueries {
    /// List the budgets whose period shares at least one day with the given
    /// window, with spend figures clipped to the part of each budget's period
    /// that falls inside the window.
    async fn list_budgets(
        &self,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> anyhow::Result<Vec<domain::BudgetWithMetrics>>;

    /// Get a budget by ID with metrics over its own full period.
    async fn get_budget(
        &self,
        budget_id: Uuid,
    ) -> anyhow::Result<Option<domain::BudgetWithMetrics>>;

    /// Find the budget for a category whose period contains the given date.
    /// `None` means the date is unbudgeted for that category, not a failure.
    async fn find_budget_for_category(
        &self,
        category_id: Uuid,
        date: NaiveDate,
    ) -> anyhow::Result<Option<domain::BudgetWithMetrics>>;
}

#[async_trait]
pub trait AllocationQueries {
    /// List allocations, most recent first, optionally restricted to one
    /// budget.
    async fn list_allocations(
        &self,
        budget_id: Option<Uuid>,
    ) -> anyhow::Result<Vec<domain::AllocationDetails>>;

    async fn get_allocation(
        &self,
        allocation_id: Uuid,
    ) -> anyhow::Result<Option<domain::AllocationDetails>>;
}

#[async_trait]
pub trait SpendingQueries {
    /// List spending records, most recent first, optionally restricted to one
    /// budget.
    async fn list_spending(
        &self,
        budget_id: Option<Uuid>,
    ) -> anyhow::Result<Vec<domain::SpendingDetails>>;

    async fn get_spending(
        &self,
        spending_id: Uuid,
    ) -> anyhow::Result<Option<domain::SpendingDetails>>;

    /// Find the spending record linked to a transaction, if any. Used by the
    /// reconciliation path when an expense is edited.
    async fn find_spending_by_transaction(
        &self,
        transaction_id: Uuid,
    ) -> anyhow::Result<Option<domain::Spending>>;
}
