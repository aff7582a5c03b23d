//! Defines the page that shows a single transaction.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    database_id::TransactionId,
    endpoints::{self, format_endpoint},
    html::{DANGER_LINK_STYLE, base, format_currency, link},
    navigation::get_nav_bar,
    user::UserID,
};

use super::core::get_transaction;

/// The state needed to show a transaction.
#[derive(Debug, Clone)]
pub struct TransactionDetailState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionDetailState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the detail page for the transaction with `transaction_id`.
///
/// A transaction that does not exist, or that belongs to another user,
/// results in the 404 page.
pub async fn get_transaction_detail_page(
    State(state): State<TransactionDetailState>,
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

    let content = html! {
        (get_nav_bar(endpoints::TRANSACTIONS_VIEW))

        main class="page"
        {
            h1 { (transaction.title) }

            dl class="detail"
            {
                dt { "Amount" }
                dd { (format_currency(transaction.amount)) }

                dt { "Type" }
                dd { (transaction.kind) }

                dt { "Category" }
                dd { (transaction.category) }

                dt { "Created" }
                dd { (transaction.created_on) }
            }

            p
            {
                (link(&format_endpoint(endpoints::EDIT_TRANSACTION, transaction.id), "Edit"))
                " "
                a
                    href=(format_endpoint(endpoints::DELETE_TRANSACTION, transaction.id))
                    class=(DANGER_LINK_STYLE)
                {
                    "Delete"
                }
                " "
                (link(endpoints::TRANSACTIONS_VIEW, "Back to transactions"))
            }
        }
    };

    base(&transaction.title, &content).into_response()
}
