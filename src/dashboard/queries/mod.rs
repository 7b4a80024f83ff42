//! Read-only aggregate queries backing the dashboard.

pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::ledger;

use super::domain;

/// Income and expense totals over a date range. Both figures are sums of
/// positive transaction amounts; the balance is derived.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PeriodTotals {
    pub income: i64,
    pub expenses: i64,
}

impl PeriodTotals {
    pub fn balance(&self) -> i64 {
        self.income - self.expenses
    }
}

#[async_trait]
pub trait DashboardQueries: Send + Sync {
    /// Total income and expenses for transactions dated within the range.
    async fn period_totals(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> anyhow::Result<PeriodTotals>;

    /// Sum of budget amounts for every category with at least one expense
    /// transaction inside the range.
    async fn budgeted_total(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> anyhow::Result<i64>;

    /// Income and expense totals per calendar month touched by the range,
    /// earliest first, truncated to `months` buckets. Each bucket covers its
    /// whole calendar month even when the range only partially overlaps it.
    async fn monthly_overview(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        months: i64,
    ) -> anyhow::Result<Vec<domain::MonthlyTotals>>;

    /// Expense totals per category within the range, largest first.
    /// Categories without expenses in the range are omitted.
    async fn category_breakdown(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> anyhow::Result<Vec<domain::CategorySpend>>;

    /// The most recent transactions dated within the range.
    async fn recent_transactions(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> anyhow::Result<Vec<ledger::domain::Transaction>>;
}
