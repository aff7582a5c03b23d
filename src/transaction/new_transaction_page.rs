//! Defines the page for recording a new transaction.

use axum::response::{IntoResponse, Response};

use crate::endpoints;

use super::{
    form::{TransactionFormData, TransactionFormErrors},
    form_view::transaction_form_page,
};

/// Renders the page for creating a transaction.
pub async fn get_new_transaction_page() -> Response {
    transaction_form_page(
        "Add Transaction",
        endpoints::NEW_TRANSACTION,
        endpoints::NEW_TRANSACTION,
        &TransactionFormData::default(),
        &TransactionFormErrors::default(),
    )
    .into_response()
}
