//! Assembly of the dashboard summary from its component queries.

use std::sync::Arc;

use tracing::trace;

use super::{
    domain::{
        balance_change, budget_percentage, percent_change, BudgetSummary, DashboardSummary,
        DateRange, MetricWithChange, PeriodSummary, ReportedRange, ReportingPeriod,
    },
    queries::DashboardQueries,
};

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// One of the underlying queries failed. No partial summary is returned.
    #[error("dashboard aggregation failed: {0}")]
    Aggregation(anyhow::Error),
}

impl From<anyhow::Error> for DashboardError {
    fn from(error: anyhow::Error) -> Self {
        Self::Aggregation(error)
    }
}

/// Composes period totals, budget figures, the monthly overview, the
/// category breakdown, and recent activity into one summary.
#[derive(Clone)]
pub struct DashboardService {
    queries: Arc<dyn DashboardQueries>,
}

impl DashboardService {
    pub fn new(queries: Arc<dyn DashboardQueries>) -> Self {
        Self { queries }
    }

    pub async fn summarize(
        &self,
        period: ReportingPeriod,
    ) -> Result<DashboardSummary, DashboardError> {
        trace!(start_date = %period.start, end_date = %period.end, "Summarizing dashboard.");

        let current = self.queries.period_totals(period.start, period.end).await?;

        let prior = period.previous();
        let previous = self.queries.period_totals(prior.start, prior.end).await?;

        let budget_total = self.queries.budgeted_total(period.start, period.end).await?;

        let monthly_overview = self
            .queries
            .monthly_overview(period.start, period.end, period.month_limit())
            .await?;

        let category_breakdown = self
            .queries
            .category_breakdown(period.start, period.end)
            .await?;

        let recent_transactions = self
            .queries
            .recent_transactions(period.start, period.end)
            .await?;

        Ok(DashboardSummary {
            summary: PeriodSummary {
                balance: MetricWithChange {
                    value: current.balance(),
                    change: balance_change(current.balance(), previous.balance()),
                },
                income: MetricWithChange {
                    value: current.income,
                    change: percent_change(current.income, previous.income),
                },
                expenses: MetricWithChange {
                    value: current.expenses,
                    change: percent_change(current.expenses, previous.expenses),
                },
            },
            budget: BudgetSummary {
                total: budget_total,
                remaining: budget_total - current.expenses,
                percentage: budget_percentage(current.expenses, budget_total),
            },
            monthly_overview,
            category_breakdown,
            recent_transactions: recent_transactions.iter().map(Into::into).collect(),
            date_range: ReportedRange {
                start_date: period.start,
                end_date: period.end,
                previous_period: DateRange {
                    start_date: prior.start,
                    end_date: prior.end,
                },
            },
        })
    }
}

#[cfg(test)]
mod test {
    use std::sync::Mutex;

    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    use crate::{
        dashboard::{domain, queries::PeriodTotals},
        ledger,
    };

    use super::*;

    /// Canned query results for exercising the service without a database.
    #[derive(Default)]
    struct FakeQueries {
        current: PeriodTotals,
        previous: PeriodTotals,
        budget_total: i64,
        fail_budget_total: bool,
        requested_months: Mutex<Option<i64>>,
    }

    #[async_trait]
    impl DashboardQueries for FakeQueries {
        async fn period_totals(
            &self,
            start_date: NaiveDate,
            _end_date: NaiveDate,
        ) -> anyhow::Result<PeriodTotals> {
            // The service asks for the caller's period first and the
            // derived previous period second. Distinguish them by start.
            if start_date >= NaiveDate::from_ymd(2024, 6, 1) {
                Ok(self.current)
            } else {
                Ok(self.previous)
            }
        }

        async fn budgeted_total(
            &self,
            _start_date: NaiveDate,
            _end_date: NaiveDate,
        ) -> anyhow::Result<i64> {
            if self.fail_budget_total {
                return Err(anyhow!("connection reset"));
            }

            Ok(self.budget_total)
        }

        async fn monthly_overview(
            &self,
            _start_date: NaiveDate,
            _end_date: NaiveDate,
            months: i64,
        ) -> anyhow::Result<Vec<domain::MonthlyTotals>> {
            *self.requested_months.lock().unwrap() = Some(months);

            Ok(vec![domain::MonthlyTotals {
                month: "Jun".to_owned(),
                income: self.current.income,
                expenses: self.current.expenses,
            }])
        }

        async fn category_breakdown(
            &self,
            _start_date: NaiveDate,
            _end_date: NaiveDate,
        ) -> anyhow::Result<Vec<domain::CategorySpend>> {
            Ok(vec![domain::CategorySpend {
                name: "Food".to_owned(),
                value: self.current.expenses,
            }])
        }

        async fn recent_transactions(
            &self,
            _start_date: NaiveDate,
            _end_date: NaiveDate,
        ) -> anyhow::Result<Vec<ledger::domain::Transaction>> {
            Ok(Vec::new())
        }
    }

    fn june() -> ReportingPeriod {
        ReportingPeriod::new(
            NaiveDate::from_ymd(2024, 6, 1),
            NaiveDate::from_ymd(2024, 6, 30),
        )
    }

    #[tokio::test]
    async fn summarize_compares_against_previous_period() {
        let service = DashboardService::new(Arc::new(FakeQueries {
            current: PeriodTotals {
                income: 60_000,
                expenses: 25_000,
            },
            previous: PeriodTotals {
                income: 50_000,
                expenses: 20_000,
            },
            budget_total: 40_000,
            ..FakeQueries::default()
        }));

        let summary = service
            .summarize(june())
            .await
            .expect("summary should build");

        assert_eq!(60_000, summary.summary.income.value);
        assert_eq!(20.0, summary.summary.income.change);
        assert_eq!(25.0, summary.summary.expenses.change);
        assert_eq!(35_000, summary.summary.balance.value);
        assert_eq!(16.7, summary.summary.balance.change);

        assert_eq!(40_000, summary.budget.total);
        assert_eq!(15_000, summary.budget.remaining);
        assert_eq!(62.5, summary.budget.percentage);

        assert_eq!(
            NaiveDate::from_ymd(2024, 5, 31),
            summary.date_range.previous_period.end_date,
        );
    }

    #[tokio::test]
    async fn summarize_caps_monthly_buckets() {
        let queries = Arc::new(FakeQueries::default());
        let service = DashboardService::new(Arc::clone(&queries) as Arc<dyn DashboardQueries>);

        service
            .summarize(ReportingPeriod::new(
                NaiveDate::from_ymd(2024, 6, 1),
                NaiveDate::from_ymd(2025, 5, 31),
            ))
            .await
            .expect("summary should build");

        assert_eq!(Some(6), *queries.requested_months.lock().unwrap());
    }

    #[tokio::test]
    async fn summarize_fails_whole_call_on_query_error() {
        let service = DashboardService::new(Arc::new(FakeQueries {
            fail_budget_total: true,
            ..FakeQueries::default()
        }));

        let error = service
            .summarize(june())
            .await
            .expect_err("query failure should abort the summary");

        assert!(matches!(error, DashboardError::Aggregation(_)));
    }
}
