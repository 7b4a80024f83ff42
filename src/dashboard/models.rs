use super::{domain, queries::PeriodTotals};

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct TotalsRow {
    pub income: i64,
    pub expenses: i64,
}

impl From<TotalsRow> for PeriodTotals {
    fn from(row: TotalsRow) -> Self {
        Self {
            income: row.income,
            expenses: row.expenses,
        }
    }
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct MonthRow {
    pub month: String,
    pub income: i64,
    pub expenses: i64,
}

impl From<MonthRow> for domain::MonthlyTotals {
    fn from(row: MonthRow) -> Self {
        Self {
            month: row.month,
            income: row.income,
            expenses: row.expenses,
        }
    }
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct BreakdownRow {
    pub name: String,
    pub value: i64,
}

impl From<BreakdownRow> for domain::CategorySpend {
    fn from(row: BreakdownRow) -> Self {
        Self {
            name: row.name,
            value: row.value,
        }
    }
}
