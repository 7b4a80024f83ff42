use axum::{
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use tracing::{error, warn};
use uuid::Uuid;

use crate::{
    database::PostgresConnection,
    http_err::{ApiError, ApiResponse},
    server::AppState,
};

use super::{
    commands::{
        postgres::PostgresCommands, AllocationError, BudgetCommandError, BudgetCommands,
        ReconciliationCommands, SpendingError,
    },
    domain,
    queries::{postgres::PostgresQueries, AllocationQueries, BudgetQueries, SpendingQueries},
};

pub mod reps;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/budgets", get(list_budgets).post(upsert_budget))
        .route(
            "/budgets/:budget_id",
            get(get_budget).put(update_budget).delete(delete_budget),
        )
        .route(
            "/budgets/by-category/:category_id",
            get(find_budget_for_category),
        )
        .route(
            "/budget-allocations",
            get(list_allocations).post(create_allocation),
        )
        .route(
            "/budget-allocations/:allocation_id",
            get(get_allocation).delete(delete_allocation),
        )
        .route(
            "/budget-spending",
            get(list_spending).post(create_spending),
        )
        .route(
            "/budget-spending/:spending_id",
            get(get_spending).delete(delete_spending),
        )
        .route(
            "/budget-spending/by-transaction/:transaction_id",
            get(find_spending_by_transaction),
        )
}

impl From<domain::NewBudgetError> for ApiError {
    fn from(error: domain::NewBudgetError) -> Self {
        Self::BadRequest(error.to_string())
    }
}

impl From<BudgetCommandError> for ApiError {
    fn from(error: BudgetCommandError) -> Self {
        match error {
            BudgetCommandError::NotFound | BudgetCommandError::CategoryNotFound => {
                Self::NotFound(error.to_string())
            }
            BudgetCommandError::Database(error) => {
                error!(?error, "Budget command failed.");

                Self::InternalServerError
            }
        }
    }
}

impl From<AllocationError> for ApiError {
    fn from(error: AllocationError) -> Self {
        match error {
            AllocationError::NonPositiveAmount => Self::BadRequest(error.to_string()),
            AllocationError::TransactionNotFound
            | AllocationError::BudgetNotFound
            | AllocationError::NotFound => Self::NotFound(error.to_string()),
            AllocationError::NotIncome | AllocationError::InsufficientFunds => {
                Self::UnprocessableEntity(error.to_string())
            }
            AllocationError::Database(error) => {
                error!(?error, "Allocation command failed.");

                Self::InternalServerError
            }
        }
    }
}

impl From<SpendingError> for ApiError {
    fn from(error: SpendingError) -> Self {
        match error {
            SpendingError::NonPositiveAmount => Self::BadRequest(error.to_string()),
            SpendingError::TransactionNotFound
            | SpendingError::BudgetNotFound
            | SpendingError::NotFound => Self::NotFound(error.to_string()),
            SpendingError::NotExpense => Self::UnprocessableEntity(error.to_string()),
            SpendingError::Database(error) => {
                error!(?error, "Spending command failed.");

                Self::InternalServerError
            }
        }
    }
}

#[derive(Deserialize)]
struct BudgetListParams {
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

/// The window to report over when the caller does not provide one: the start
/// of the current month through today.
fn default_window() -> (NaiveDate, NaiveDate) {
    let today = Utc::now().date_naive();

    (today.with_day(1).unwrap_or(today), today)
}

async fn list_budgets(
    State(db): State<PostgresConnection>,
    Query(params): Query<BudgetListParams>,
) -> ApiResponse<Json<Vec<reps::BudgetWithMetrics>>> {
    let (default_start, default_end) = default_window();
    let window_start = params.start_date.unwrap_or(default_start);
    let window_end = params.end_date.unwrap_or(default_end);

    let queries = PostgresQueries(db);

    match queries.list_budgets(window_start, window_end).await {
        Ok(budgets) => Ok(Json(budgets.iter().map(Into::into).collect())),
        Err(error) => {
            error!(?error, "Failed to list budgets.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn upsert_budget(
    State(db): State<PostgresConnection>,
    Json(new_budget): Json<reps::NewBudget>,
) -> ApiResponse<(StatusCode, Json<reps::Budget>)> {
    let budget = domain::NewBudget::new(
        new_budget.category_id,
        new_budget.amount,
        new_budget.start_date,
        new_budget.end_date,
    )?;

    let commands = PostgresCommands(&db);
    let saved = commands.upsert_budget(budget).await?;

    Ok((StatusCode::CREATED, Json((&saved).into())))
}

async fn get_budget(
    State(db): State<PostgresConnection>,
    Path(budget_id): Path<Uuid>,
) -> ApiResponse<Json<reps::BudgetWithMetrics>> {
    let queries = PostgresQueries(db);

    match queries.get_budget(budget_id).await {
        Ok(Some(budget)) => Ok(Json((&budget).into())),
        Ok(None) => Err(ApiError::NotFound("Budget not found.".to_owned())),
        Err(error) => {
            error!(?error, %budget_id, "Failed to query for budget.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn update_budget(
    State(db): State<PostgresConnection>,
    Path(budget_id): Path<Uuid>,
    Json(patch): Json<reps::BudgetPatch>,
) -> ApiResponse<Json<reps::Budget>> {
    let patch = domain::BudgetPatch::new(patch.amount, patch.start_date, patch.end_date)?;

    let commands = PostgresCommands(&db);
    let saved = commands.update_budget(budget_id, patch).await?;

    Ok(Json((&saved).into()))
}

async fn delete_budget(
    State(db): State<PostgresConnection>,
    Path(budget_id): Path<Uuid>,
) -> ApiResponse<StatusCode> {
    let commands = PostgresCommands(&db);
    commands.delete_budget(budget_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
struct BudgetLookupParams {
    date: Option<NaiveDate>,
}

async fn find_budget_for_category(
    State(db): State<PostgresConnection>,
    Path(category_id): Path<Uuid>,
    Query(params): Query<BudgetLookupParams>,
) -> ApiResponse<Json<Option<reps::BudgetWithMetrics>>> {
    let date = params.date.unwrap_or_else(|| Utc::now().date_naive());

    let queries = PostgresQueries(db);

    // No covering budget means the date is unbudgeted, which renders as a
    // JSON null rather than an error.
    match queries.find_budget_for_category(category_id, date).await {
        Ok(budget) => Ok(Json(budget.as_ref().map(Into::into))),
        Err(error) => {
            error!(?error, %category_id, "Failed to resolve budget for category.");

            Err(ApiError::InternalServerError)
        }
    }
}

#[derive(Deserialize)]
struct LinkListParams {
    budget_id: Option<Uuid>,
}

async fn list_allocations(
    State(db): State<PostgresConnection>,
    Query(params): Query<LinkListParams>,
) -> ApiResponse<Json<Vec<reps::LinkDetails>>> {
    let queries = PostgresQueries(db);

    match queries.list_allocations(params.budget_id).await {
        Ok(allocations) => Ok(Json(allocations.iter().map(Into::into).collect())),
        Err(error) => {
            error!(?error, "Failed to list budget allocations.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn create_allocation(
    State(db): State<PostgresConnection>,
    Json(new_allocation): Json<reps::NewLink>,
) -> ApiResponse<(StatusCode, Json<reps::Link>)> {
    let commands = PostgresCommands(&db);

    let allocation = commands
        .create_allocation(
            new_allocation.budget_id,
            new_allocation.transaction_id,
            new_allocation.amount,
        )
        .await?;

    Ok((StatusCode::CREATED, Json((&allocation).into())))
}

async fn get_allocation(
    State(db): State<PostgresConnection>,
    Path(allocation_id): Path<Uuid>,
) -> ApiResponse<Json<reps::LinkDetails>> {
    let queries = PostgresQueries(db);

    match queries.get_allocation(allocation_id).await {
        Ok(Some(allocation)) => Ok(Json((&allocation).into())),
        Ok(None) => Err(ApiError::NotFound("Budget allocation not found.".to_owned())),
        Err(error) => {
            error!(?error, %allocation_id, "Failed to query for budget allocation.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn delete_allocation(
    State(db): State<PostgresConnection>,
    Path(allocation_id): Path<Uuid>,
) -> ApiResponse<StatusCode> {
    let commands = PostgresCommands(&db);
    commands.delete_allocation(allocation_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn list_spending(
    State(db): State<PostgresConnection>,
    Query(params): Query<LinkListParams>,
) -> ApiResponse<Json<Vec<reps::LinkDetails>>> {
    let queries = PostgresQueries(db);

    match queries.list_spending(params.budget_id).await {
        Ok(spending) => Ok(Json(spending.iter().map(Into::into).collect())),
        Err(error) => {
            error!(?error, "Failed to list budget spending.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn create_spending(
    State(db): State<PostgresConnection>,
    Json(new_spending): Json<reps::NewLink>,
) -> ApiResponse<(StatusCode, Json<reps::Link>)> {
    let commands = PostgresCommands(&db);

    let spending = commands
        .create_spending(
            new_spending.budget_id,
            new_spending.transaction_id,
            new_spending.amount,
        )
        .await?;

    Ok((StatusCode::CREATED, Json((&spending).into())))
}

async fn get_spending(
    State(db): State<PostgresConnection>,
    Path(spending_id): Path<Uuid>,
) -> ApiResponse<Json<reps::LinkDetails>> {
    let queries = PostgresQueries(db);

    match queries.get_spending(spending_id).await {
        Ok(Some(spending)) => Ok(Json((&spending).into())),
        Ok(None) => Err(ApiError::NotFound("Budget spending not found.".to_owned())),
        Err(error) => {
            error!(?error, %spending_id, "Failed to query for budget spending.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn delete_spending(
    State(db): State<PostgresConnection>,
    Path(spending_id): Path<Uuid>,
) -> ApiResponse<StatusCode> {
    let commands = PostgresCommands(&db);
    commands.delete_spending(spending_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn find_spending_by_transaction(
    State(db): State<PostgresConnection>,
    Path(transaction_id): Path<Uuid>,
) -> ApiResponse<Json<Option<reps::Link>>> {
    let queries = PostgresQueries(db);

    match queries.find_spending_by_transaction(transaction_id).await {
        Ok(spending) => Ok(Json(spending.as_ref().map(Into::into))),
        Err(error) => {
            error!(?error, %transaction_id, "Failed to find budget spending by transaction.");

            Err(ApiError::InternalServerError)
        }
    }
}

/// Called from the transaction-edit path. Failure is logged and swallowed;
/// budget linkage never blocks saving the transaction itself.
pub async fn relink_after_edit(app_state: &AppState, transaction: &crate::ledger::domain::Transaction) {
    let db = PostgresConnection::from_ref(app_state);
    let commands = PostgresCommands(&db);

    if let Err(error) = commands.relink_spending(transaction).await {
        warn!(
            ?error,
            transaction_id = %transaction.id,
            "Failed to reconcile budget spending after transaction edit.",
        );
    }
}
