//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error, endpoints, timezone::get_local_offset, user::UserID,
};

use super::{
    core::create_transaction,
    form::{TransactionFormData, validate},
    form_view::transaction_form_page,
    transactions_page::redirect_to_transactions_with_notice,
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler for creating a new transaction owned by the signed-in
/// user, stamped with the current local date.
///
/// Redirects to the transactions view on success. On a validation failure the
/// form is redisplayed with field errors and the entered values, and nothing
/// is persisted.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<TransactionFormData>,
) -> Response {
    let new_transaction = match validate(&form) {
        Ok(new_transaction) => new_transaction,
        Err(errors) => {
            return transaction_form_page(
                "Add Transaction",
                endpoints::NEW_TRANSACTION,
                endpoints::NEW_TRANSACTION,
                &form,
                &errors,
            )
            .into_response();
        }
    };

    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        return Error::InvalidTimezoneError(state.local_timezone).into_response();
    };
    let today = OffsetDateTime::now_utc().to_offset(local_offset).date();

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    if let Err(error) = create_transaction(new_transaction, today, user_id, &connection) {
        tracing::error!("Could not create transaction: {error}");
        return error.into_response();
    }

    redirect_to_transactions_with_notice("transaction has been added successfully")
}
