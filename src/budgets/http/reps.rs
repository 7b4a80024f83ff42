use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::budgets::domain;

/// A budget annotated with its derived figures, as rendered for budget lists
/// and lookups.
#[derive(Serialize)]
pub struct BudgetWithMetrics {
    pub id: Uuid,
    pub category_id: Uuid,
    pub category: String,
    pub budget: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub spent: i64,
    pub remaining: i64,
    pub percentage: i64,
}

impl From<&domain::BudgetWithMetrics> for BudgetWithMetrics {
    fn from(budget: &domain::BudgetWithMetrics) -> Self {
        Self {
            id: budget.id,
            category_id: budget.category_id,
            category: budget.category_name.clone(),
            budget: budget.amount,
            start_date: budget.start_date,
            end_date: budget.end_date,
            spent: budget.metrics.spent,
            remaining: budget.metrics.remaining,
            percentage: budget.metrics.percentage,
        }
    }
}

#[derive(Serialize)]
pub struct Budget {
    pub id: Uuid,
    pub category_id: Uuid,
    pub amount: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl From<&domain::Budget> for Budget {
    fn from(budget: &domain::Budget) -> Self {
        Self {
            id: budget.id,
            category_id: budget.category_id,
            amount: budget.amount,
            start_date: budget.start_date,
            end_date: budget.end_date,
        }
    }
}

#[derive(Deserialize)]
pub struct NewBudget {
    pub category_id: Uuid,
    pub amount: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Deserialize)]
pub struct BudgetPatch {
    pub amount: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Deserialize)]
pub struct NewLink {
    pub budget_id: Uuid,
    pub transaction_id: Uuid,
    pub amount: i64,
}

/// A bare allocation or spending row, as returned from creation.
#[derive(Serialize)]
pub struct Link {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub transaction_id: Uuid,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&domain::Allocation> for Link {
    fn from(allocation: &domain::Allocation) -> Self {
        Self {
            id: allocation.id,
            budget_id: allocation.budget_id,
            transaction_id: allocation.transaction_id,
            amount: allocation.amount,
            created_at: allocation.created_at,
        }
    }
}

impl From<&domain::Spending> for Link {
    fn from(spending: &domain::Spending) -> Self {
        Self {
            id: spending.id,
            budget_id: spending.budget_id,
            transaction_id: spending.transaction_id,
            amount: spending.amount,
            created_at: spending.created_at,
        }
    }
}

/// An allocation or spending row joined with display details.
#[derive(Serialize)]
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

impl From<&domain::AllocationDetails> for LinkDetails {
    fn from(allocation: &domain::AllocationDetails) -> Self {
        Self {
            id: allocation.id,
            budget_id: allocation.budget_id,
            transaction_id: allocation.transaction_id,
            amount: allocation.amount,
            created_at: allocation.created_at,
            category_id: allocation.category_id,
            category_name: allocation.category_name.clone(),
            transaction_description: allocation.transaction_description.clone(),
            transaction_date: allocation.transaction_date,
        }
    }
}

impl From<&domain::SpendingDetails> for LinkDetails {
    fn from(spending: &domain::SpendingDetails) -> Self {
        Self {
            id: spending.id,
            budget_id: spending.budget_id,
            transaction_id: spending.transaction_id,
            amount: spending.amount,
            created_at: spending.created_at,
            category_id: spending.category_id,
            category_name: spending.category_name.clone(),
            transaction_description: spending.transaction_description.clone(),
            transaction_date: spending.transaction_date,
        }
    }
}
