//! Types describing a dashboard summary.
//!
//! The summary is a read-only projection assembled for presentation, so the
//! types here serialize directly rather than passing through separate
//! representations.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::ledger::domain::{Transaction, TransactionKind};

/// The most calendar months a monthly overview will cover. Ranges spanning
/// more months than this are truncated to the earliest months.
pub const MAX_MONTH_BUCKETS: i64 = 6;

/// An inclusive date range to report over.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReportingPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportingPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The immediately preceding period with the same inclusive day count,
    /// ending the day before this period starts.
    pub fn previous(&self) -> Self {
        let length = (self.end - self.start).num_days();
        let end = self.start - Duration::days(1);

        Self {
            start: end - Duration::days(length),
            end,
        }
    }

    /// How many monthly buckets the overview should contain: one per
    /// calendar month the period touches, capped at [`MAX_MONTH_BUCKETS`].
    pub fn month_limit(&self) -> i64 {
        let months = i64::from(self.end.year() - self.start.year()) * 12
            + i64::from(self.end.month() as i32 - self.start.month() as i32)
            + 1;

        months.clamp(1, MAX_MONTH_BUCKETS)
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Percentage change between two period totals, as a value rounded to one
/// decimal place. Defined as zero when there is nothing to compare against.
pub fn percent_change(current: i64, previous: i64) -> f64 {
    if previous == 0 {
        return 0.0;
    }

    round_to_tenth((current - previous) as f64 / previous as f64 * 100.0)
}

/// Percentage change for balances, which may be negative. The magnitude of
/// the previous balance is used as the denominator so the sign of the result
/// always reflects the direction of the change.
pub fn balance_change(current: i64, previous: i64) -> f64 {
    if previous == 0 {
        return 0.0;
    }

    round_to_tenth((current - previous) as f64 / previous.abs() as f64 * 100.0)
}

/// Share of a budget total consumed by spending, rounded to one decimal
/// place. Zero when no budget total exists.
pub fn budget_percentage(expenses: i64, budget_total: i64) -> f64 {
    if budget_total == 0 {
        return 0.0;
    }

    round_to_tenth(expenses as f64 / budget_total as f64 * 100.0)
}

#[derive(Debug, Serialize)]
pub struct MetricWithChange {
    pub value: i64,
    pub change: f64,
}

#[derive(Debug, Serialize)]
pub struct PeriodSummary {
    pub balance: MetricWithChange,
    pub income: MetricWithChange,
    pub expenses: MetricWithChange,
}

#[derive(Debug, Serialize)]
pub struct BudgetSummary {
    pub total: i64,
    pub remaining: i64,
    pub percentage: f64,
}

/// Income and expense totals for one calendar month, labelled with the
/// month's abbreviated name.
#[derive(Debug, Serialize)]
pub struct MonthlyTotals {
    pub month: String,
    pub income: i64,
    pub expenses: i64,
}

#[derive(Debug, Serialize)]
pub struct CategorySpend {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Serialize)]
pub struct RecentTransaction {
    pub id: uuid::Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub amount: i64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub category: String,
}

impl From<&Transaction> for RecentTransaction {
    fn from(transaction: &Transaction) -> Self {
        Self {
            id: transaction.id,
            date: transaction.date,
            description: transaction.description.clone(),
            amount: transaction.amount,
            kind: transaction.kind,
            category: transaction.category_name.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct ReportedRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub previous_period: DateRange,
}

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub summary: PeriodSummary,
    pub budget: BudgetSummary,
    pub monthly_overview: Vec<MonthlyTotals>,
    pub category_breakdown: Vec<CategorySpend>,
    pub recent_transactions: Vec<RecentTransaction>,
    pub date_range: ReportedRange,
}

#[cfg(test)]
mod test {
    use super::*;

    fn period(start: (i32, u32, u32), end: (i32, u32, u32)) -> ReportingPeriod {
        ReportingPeriod::new(
            NaiveDate::from_ymd(start.0, start.1, start.2),
            NaiveDate::from_ymd(end.0, end.1, end.2),
        )
    }

    #[test]
    fn previous_period_ends_day_before_current_starts() {
        let previous = period((2024, 6, 1), (2024, 6, 30)).previous();

        assert_eq!(NaiveDate::from_ymd(2024, 5, 31), previous.end);
        assert_eq!(NaiveDate::from_ymd(2024, 5, 2), previous.start);
    }

    #[test]
    fn previous_period_has_the_same_day_count() {
        let current = period((2024, 6, 1), (2024, 6, 30));
        let previous = current.previous();

        assert_eq!(
            (current.end - current.start).num_days(),
            (previous.end - previous.start).num_days(),
        );
    }

    #[test]
    fn previous_period_crosses_year_boundaries() {
        let previous = period((2024, 1, 1), (2024, 1, 31)).previous();

        assert_eq!(NaiveDate::from_ymd(2023, 12, 31), previous.end);
        assert_eq!(NaiveDate::from_ymd(2023, 12, 1), previous.start);
    }

    #[test]
    fn month_limit_counts_touched_months() {
        assert_eq!(1, period((2024, 6, 1), (2024, 6, 30)).month_limit());
        assert_eq!(2, period((2024, 6, 30), (2024, 7, 1)).month_limit());
        assert_eq!(4, period((2024, 11, 15), (2025, 2, 15)).month_limit());
    }

    #[test]
    fn month_limit_is_capped() {
        assert_eq!(
            MAX_MONTH_BUCKETS,
            period((2024, 1, 1), (2024, 12, 31)).month_limit(),
        );
    }

    #[test]
    fn percent_change_compares_against_previous() {
        assert_eq!(20.0, percent_change(600, 500));
        assert_eq!(-25.0, percent_change(300, 400));
    }

    #[test]
    fn percent_change_rounds_to_one_decimal() {
        assert_eq!(33.3, percent_change(400, 300));
    }

    #[test]
    fn percent_change_is_zero_without_a_baseline() {
        assert_eq!(0.0, percent_change(600, 0));
    }

    #[test]
    fn balance_change_scales_by_previous_magnitude() {
        // A deficit shrinking from -200 to -100 is a 50% improvement.
        assert_eq!(50.0, balance_change(-100, -200));
        assert_eq!(-150.0, balance_change(-100, 200));
    }

    #[test]
    fn balance_change_is_zero_without_a_baseline() {
        assert_eq!(0.0, balance_change(-100, 0));
    }

    #[test]
    fn budget_percentage_handles_overspend_and_zero_total() {
        assert_eq!(50.0, budget_percentage(250, 500));
        assert_eq!(125.0, budget_percentage(625, 500));
        assert_eq!(0.0, budget_percentage(625, 0));
    }

    #[test]
    fn recent_transaction_serializes_kind_as_type() {
        let recent = RecentTransaction {
            id: uuid::Uuid::new_v4(),
            date: NaiveDate::from_ymd(2024, 6, 14),
            description: "Groceries".to_owned(),
            amount: 4250,
            kind: TransactionKind::Expense,
            category: "Food".to_owned(),
        };

        let value = serde_json::to_value(&recent).expect("summary entries should serialize");

        assert_eq!("expense", value["type"]);
        assert_eq!("2024-06-14", value["date"]);
    }
}
