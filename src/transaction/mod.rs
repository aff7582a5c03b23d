//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model with its `TransactionKind` and `Category` enums
//! - Database functions for storing, querying and summing transactions
//! - The pure form-validation layer
//! - Route handlers for the transaction pages

mod core;
mod create_endpoint;
mod delete_endpoint;
mod detail_page;
mod edit_endpoint;
mod form;
mod form_view;
mod new_transaction_page;
mod transactions_page;

pub use self::core::{
    Category, CategoryTotal, KindTotal, MonthRange, NewTransaction, RowsAffected, Transaction,
    TransactionKind, create_transaction, create_transaction_table, delete_transaction,
    get_transaction, get_transactions_for_user, map_transaction_row, sum_amount_by_category,
    sum_amount_by_kind, update_transaction,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use detail_page::get_transaction_detail_page;
pub use edit_endpoint::{edit_transaction_endpoint, get_edit_transaction_page};
pub use new_transaction_page::get_new_transaction_page;
pub use transactions_page::get_transactions_page;
