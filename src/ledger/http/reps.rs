use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::domain::{self, TransactionKind};

#[derive(Serialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

impl From<&domain::Category> for Category {
    fn from(category: &domain::Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
        }
    }
}

#[derive(Deserialize)]
pub struct NewCategory {
    pub name: String,
}

#[derive(Serialize)]
pub struct Transaction {
    pub id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub amount: i64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub category_id: Uuid,
    pub category_name: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&domain::Transaction> for Transaction {
    fn from(transaction: &domain::Transaction) -> Self {
        Self {
            id: transaction.id,
            date: transaction.date,
            description: transaction.description.clone(),
            amount: transaction.amount,
            kind: transaction.kind,
            category_id: transaction.category_id,
            category_name: transaction.category_name.clone(),
            notes: transaction.notes.clone(),
            created_at: transaction.created_at,
        }
    }
}

#[derive(Deserialize)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: i64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub category_id: Uuid,
    pub notes: Option<String>,
}
