use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::domain;

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Budget {
    pub id: Uuid,
    pub category_id: Uuid,
    pub amount: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl From<Budget> for domain::Budget {
    fn from(model: Budget) -> Self {
        Self {
            id: model.id,
            category_id: model.category_id,
            amount: model.amount,
            start_date: model.start_date,
            end_date: model.end_date,
        }
    }
}

/// A budget row joined with its category name and the (possibly clipped)
/// expense sum the metrics are derived from.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct BudgetWithSpent {
    pub id: Uuid,
    pub category_id: Uuid,
    pub category_name: String,
    pub amount: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub spent: i64,
}

impl From<BudgetWithSpent> for domain::BudgetWithMetrics {
    fn from(model: BudgetWithSpent) -> Self {
        Self {
            id: model.id,
            category_id: model.category_id,
            category_name: model.category_name,
            amount: model.amount,
            start_date: model.start_date,
            end_date: model.end_date,
            metrics: domain::BudgetMetrics::compute(model.amount, model.spent),
        }
    }
}

/// A bare allocation or spending row. The two tables share a shape, so one
/// model covers both.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct LinkRow {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub transaction_id: Uuid,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

impl From<LinkRow> for domain::Allocation {
    fn from(model: LinkRow) -> Self {
        Self {
            id: model.id,
            budget_id: model.budget_id,
            transaction_id: model.transaction_id,
            amount: model.amount,
            created_at: model.created_at,
        }
    }
}

impl From<LinkRow> for domain::Spending {
    fn from(model: LinkRow) -> Self {
        Self {
            id: model.id,
            budget_id: model.budget_id,
            transaction_id: model.transaction_id,
            amount: model.amount,
            created_at: model.created_at,
        }
    }
}

/// The fields of a transaction the reconciliation checks care about.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct TransactionFunds {
    pub kind: String,
    pub amount: i64,
}

/// An allocation or spending row joined with category and transaction
/// details.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct LinkDetails {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub transaction_id: Uuid,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
    pub category_id: Uuid,
    pub category_name: String,
    pub transaction_description: String,
    pub transaction_date: NaiveDate,
}

impl From<LinkDetails> for domain::AllocationDetails {
    fn from(model: LinkDetails) -> Self {
        Self {
            id: model.id,
            budget_id: model.budget_id,
            transaction_id: model.transaction_id,
            amount: model.amount,
            created_at: model.created_at,
            category_id: model.category_id,
            category_name: model.category_name,
            transaction_description: model.transaction_description,
            transaction_date: model.transaction_date,
        }
    }
}

impl From<LinkDetails> for domain::SpendingDetails {
    fn from(model: LinkDetails) -> Self {
        Self {
            id: model.id,
            budget_id: model.budget_id,
            transaction_id: model.transaction_id,
            amount: model.amount,
            created_at: model.created_at,
            category_id: model.category_id,
            category_name: model.category_name,
            transaction_description: model.transaction_description,
            transaction_date: model.transaction_date,
        }
    }
}
