use std::convert::TryFrom;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::domain;

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

impl From<Category> for domain::Category {
    fn from(model: Category) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

/// A transaction row joined with its category name.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub amount: i64,
    pub kind: String,
    pub category_id: Uuid,
    pub category_name: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<Transaction> for domain::Transaction {
    type Error = anyhow::Error;

    fn try_from(model: Transaction) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            date: model.date,
            description: model.description,
            amount: model.amount,
            // The column has a CHECK constraint restricting it to known
            // kinds, but we still surface a decode error rather than panic
            // if the database disagrees with us.
            kind: model.kind.parse()?,
            category_id: model.category_id,
            category_name: model.category_name,
            notes: model.notes,
            created_at: model.created_at,
        })
    }
}
