use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The direction of a transaction. Amounts are always positive; whether money
/// came in or went out is carried here, never by the sign of the amount.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = UnknownTransactionKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(UnknownTransactionKind(other.to_owned())),
        }
    }
}

#[derive(Debug, PartialEq, thiserror::Error)]
#[error("unknown transaction kind '{0}'")]
pub struct UnknownTransactionKind(String);

/// A new transaction entered by a user. This may only be constructed through
/// [`Self::new()`], which rejects invalid amounts and empty descriptions.
#[derive(Clone, Debug, PartialEq)]
pub struct NewTransaction {
    date: NaiveDate,
    description: String,
    amount: i64,
    kind: TransactionKind,
    category_id: Uuid,
    notes: Option<String>,
}

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum NewTransactionError {
    /// Amounts are minor currency units and must be strictly positive.
    #[error("transaction amounts must be positive")]
    NonPositiveAmount(i64),
    #[error("a transaction requires a description")]
    MissingDescription,
}

impl NewTransaction {
    /// Construct a validated transaction.
    ///
    /// # Arguments
    /// * `date` - The calendar date the transaction occurred.
    /// * `description` - What the money was for.
    /// * `amount` - The transaction amount in minor currency units. Must be
    ///   positive; direction comes from `kind`.
    /// * `kind` - Whether the transaction is income or an expense.
    /// * `category_id` - The category the transaction belongs to.
    /// * `notes` - Any additional notes to store with the transaction.
    pub fn new(
        date: NaiveDate,
        description: String,
        amount: i64,
        kind: TransactionKind,
        category_id: Uuid,
        notes: Option<String>,
    ) -> Result<Self, NewTransactionError> {
        if amount <= 0 {
            return Err(NewTransactionError::NonPositiveAmount(amount));
        }

        if description.trim().is_empty() {
            return Err(NewTransactionError::MissingDescription);
        }

        Ok(Self {
            date,
            description,
            amount,
            kind,
            category_id,
            notes,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn category_id(&self) -> Uuid {
        self.category_id
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

/// A transaction that has been persisted, annotated with its category name.
pub struct Transaction {
    pub id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub amount: i64,
    pub kind: TransactionKind,
    pub category_id: Uuid,
    pub category_name: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct Category {
    pub id: Uuid,
    pub name: String,
}

#[cfg(test)]
mod test {
    use super::*;

    fn category() -> Uuid {
        Uuid::new_v4()
    }

    #[test]
    fn new_transaction_valid() {
        let transaction = NewTransaction::new(
            NaiveDate::from_ymd(2024, 6, 14),
            "Groceries".to_string(),
            4250,
            TransactionKind::Expense,
            category(),
            None,
        )
        .expect("transaction was malformed");

        assert_eq!(4250, transaction.amount());
        assert_eq!(TransactionKind::Expense, transaction.kind());
    }

    #[test]
    fn new_transaction_rejects_zero_amount() {
        let error = NewTransaction::new(
            NaiveDate::from_ymd(2024, 6, 14),
            "Groceries".to_string(),
            0,
            TransactionKind::Expense,
            category(),
            None,
        )
        .expect_err("zero amount should be rejected");

        assert_eq!(NewTransactionError::NonPositiveAmount(0), error);
    }

    #[test]
    fn new_transaction_rejects_negative_amount() {
        let error = NewTransaction::new(
            NaiveDate::from_ymd(2024, 6, 14),
            "Refund".to_string(),
            -100,
            TransactionKind::Income,
            category(),
            None,
        )
        .expect_err("negative amount should be rejected");

        assert_eq!(NewTransactionError::NonPositiveAmount(-100), error);
    }

    #[test]
    fn new_transaction_rejects_blank_description() {
        let error = NewTransaction::new(
            NaiveDate::from_ymd(2024, 6, 14),
            "   ".to_string(),
            100,
            TransactionKind::Expense,
            category(),
            None,
        )
        .expect_err("blank description should be rejected");

        assert_eq!(NewTransactionError::MissingDescription, error);
    }

    #[test]
    fn transaction_kind_round_trips_through_str() {
        for kind in [TransactionKind::Income, TransactionKind::Expense] {
            assert_eq!(Ok(kind), kind.as_str().parse());
        }
    }

    #[test]
    fn transaction_kind_rejects_unknown_value() {
        assert!("transfer".parse::<TransactionKind>().is_err());
    }
}
