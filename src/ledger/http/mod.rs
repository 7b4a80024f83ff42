use axum::{
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::error;
use uuid::Uuid;

use crate::{
    database::PostgresConnection,
    http_err::{ApiError, ApiResponse},
    server::AppState,
};

use super::{
    commands::{
        postgres::PostgresCommands, CategoryCommands, CategoryError, TransactionCommandError,
        TransactionCommands,
    },
    domain,
    queries::{postgres::PostgresQueries, CategoryQueries, TransactionQueries, TransactionQuery},
};

pub mod reps;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/transactions", get(list_transactions).post(create_transaction))
        .route(
            "/transactions/:transaction_id",
            get(get_transaction)
                .put(update_transaction)
                .delete(delete_transaction),
        )
}

impl From<domain::NewTransactionError> for ApiError {
    fn from(error: domain::NewTransactionError) -> Self {
        Self::BadRequest(error.to_string())
    }
}

impl From<CategoryError> for ApiError {
    fn from(error: CategoryError) -> Self {
        match error {
            CategoryError::DuplicateName(_) => Self::BadRequest(error.to_string()),
            CategoryError::Database(error) => {
                error!(?error, "Category command failed.");

                Self::InternalServerError
            }
        }
    }
}

impl From<TransactionCommandError> for ApiError {
    fn from(error: TransactionCommandError) -> Self {
        match error {
            TransactionCommandError::NotFound | TransactionCommandError::CategoryNotFound => {
                Self::NotFound(error.to_string())
            }
            TransactionCommandError::Database(error) => {
                error!(?error, "Transaction command failed.");

                Self::InternalServerError
            }
        }
    }
}

async fn list_categories(
    State(db): State<PostgresConnection>,
) -> ApiResponse<Json<Vec<reps::Category>>> {
    let queries = PostgresQueries(db);

    match queries.list_categories().await {
        Ok(categories) => Ok(Json(categories.iter().map(Into::into).collect())),
        Err(error) => {
            error!(?error, "Failed to list categories.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn create_category(
    State(db): State<PostgresConnection>,
    Json(new_category): Json<reps::NewCategory>,
) -> ApiResponse<(StatusCode, Json<reps::Category>)> {
    let name = new_category.name.trim().to_owned();
    if name.is_empty() {
        return Err(ApiError::BadRequest(
            "A category requires a name.".to_owned(),
        ));
    }

    let commands = PostgresCommands(&db);
    let category = commands.create_category(name).await?;

    Ok((StatusCode::CREATED, Json((&category).into())))
}

#[derive(Deserialize)]
struct TransactionListParams {
    #[serde(rename = "type")]
    kind: Option<domain::TransactionKind>,
    category_id: Option<Uuid>,
    min_amount: Option<i64>,
    max_amount: Option<i64>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

async fn list_transactions(
    State(db): State<PostgresConnection>,
    Query(params): Query<TransactionListParams>,
) -> ApiResponse<Json<Vec<reps::Transaction>>> {
    let query = TransactionQuery {
        kind: params.kind,
        category_id: params.category_id,
        min_amount: params.min_amount,
        max_amount: params.max_amount,
        start_date: params.start_date,
        end_date: params.end_date,
    };

    let queries = PostgresQueries(db);

    match queries.list_transactions(query).await {
        Ok(transactions) => Ok(Json(transactions.iter().map(Into::into).collect())),
        Err(error) => {
            error!(?error, "Failed to list transactions.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn create_transaction(
    State(db): State<PostgresConnection>,
    Json(new_transaction): Json<reps::NewTransaction>,
) -> ApiResponse<(StatusCode, Json<reps::Transaction>)> {
    let transaction = domain::NewTransaction::new(
        new_transaction.date,
        new_transaction.description,
        new_transaction.amount,
        new_transaction.kind,
        new_transaction.category_id,
        new_transaction.notes,
    )?;

    let commands = PostgresCommands(&db);
    let saved = commands.create_transaction(transaction).await?;

    Ok((StatusCode::CREATED, Json((&saved).into())))
}

async fn get_transaction(
    State(db): State<PostgresConnection>,
    Path(transaction_id): Path<Uuid>,
) -> ApiResponse<Json<reps::Transaction>> {
    let queries = PostgresQueries(db);

    match queries.get_transaction(transaction_id).await {
        Ok(Some(transaction)) => Ok(Json((&transaction).into())),
        Ok(None) => Err(ApiError::NotFound("Transaction not found.".to_owned())),
        Err(error) => {
            error!(?error, %transaction_id, "Failed to query for transaction.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn update_transaction(
    State(app_state): State<AppState>,
    Path(transaction_id): Path<Uuid>,
    Json(update): Json<reps::NewTransaction>,
) -> ApiResponse<Json<reps::Transaction>> {
    let update = domain::NewTransaction::new(
        update.date,
        update.description,
        update.amount,
        update.kind,
        update.category_id,
        update.notes,
    )?;

    let db = PostgresConnection::from_ref(&app_state);
    let commands = PostgresCommands(&db);
    let saved = commands.update_transaction(transaction_id, update).await?;

    // Edits can move a transaction into or out of a budget's category or
    // date range, or change its kind entirely, so its spending link is
    // reconciled after every save.
    crate::budgets::http::relink_after_edit(&app_state, &saved).await;

    Ok(Json((&saved).into()))
}

async fn delete_transaction(
    State(db): State<PostgresConnection>,
    Path(transaction_id): Path<Uuid>,
) -> ApiResponse<StatusCode> {
    let commands = PostgresCommands(&db);
    commands.delete_transaction(transaction_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
