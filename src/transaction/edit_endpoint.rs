//! Defines the page and endpoint for editing an existing transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    database_id::TransactionId,
    endpoints::{self, format_endpoint},
    user::UserID,
};

use super::{
    core::{get_transaction, update_transaction},
    form::{TransactionFormData, TransactionFormErrors, validate},
    form_view::transaction_form_page,
    transactions_page::redirect_to_transactions_with_notice,
};

/// The state needed to edit a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the edit form pre-filled with the stored values of the transaction
/// with `transaction_id`.
///
/// A transaction that does not exist, or that belongs to another user,
/// results in the 404 page.
pub async fn get_edit_transaction_page(
    State(state): State<EditTransactionState>,
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

    let transaction = match get_transaction(transaction_id, user_id, &connection) {
        Ok(transaction) => transaction,
        Err(error) => return error.into_response(),
    };

    drop(connection);

    transaction_form_page(
        "Edit Transaction",
        &format_endpoint(endpoints::EDIT_TRANSACTION, transaction.id),
        endpoints::TRANSACTIONS_VIEW,
        &TransactionFormData::from_transaction(&transaction),
        &TransactionFormErrors::default(),
    )
    .into_response()
}

/// A route handler for overwriting the editable fields of a transaction.
///
/// The owner and creation date are never touched. Redirects to the
/// transactions view on success; a missing or foreign transaction results in
/// the 404 page; on a validation failure the form is redisplayed with field
/// errors and nothing is persisted.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
    Form(form): Form<TransactionFormData>,
) -> Response {
    let new_fields = match validate(&form) {
        Ok(new_fields) => new_fields,
        Err(errors) => {
            return transaction_form_page(
                "Edit Transaction",
                &format_endpoint(endpoints::EDIT_TRANSACTION, transaction_id),
                endpoints::TRANSACTIONS_VIEW,
                &form,
                &errors,
            )
            .into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match update_transaction(transaction_id, user_id, &new_fields, &connection) {
        Ok(0) => {
            tracing::debug!(
                "Could not update transaction {transaction_id}: update affected zero rows"
            );
            Error::NotFound.into_response()
        }
        Ok(_) => {
            drop(connection);
            redirect_to_transactions_with_notice("transaction has been updated successfully")
        }
        Err(error) => {
            tracing::error!("Could not update transaction {transaction_id}: {error}");
            error.into_response()
        }
    }
}
