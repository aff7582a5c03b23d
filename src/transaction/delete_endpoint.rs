//! Defines the endpoint for deleting a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, database_id::TransactionId, user::UserID};

use super::{
    core::delete_transaction, transactions_page::redirect_to_transactions_with_notice,
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a transaction owned by the signed-in user.
///
/// Deleting a missing (or foreign) transaction is a silent no-op; the caller
/// is redirected back to the transactions view with a removal notice either
/// way.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match delete_transaction(transaction_id, user_id, &connection) {
        Ok(0) => {
            tracing::debug!(
                "Delete of transaction {transaction_id} affected zero rows; nothing to do"
            );
        }
        Ok(_) => {}
        Err(error) => {
            tracing::error!("Could not delete transaction {transaction_id}: {error}");
            return error.into_response();
        }
    }

    drop(connection);

    redirect_to_transactions_with_notice("transaction has been removed")
}
