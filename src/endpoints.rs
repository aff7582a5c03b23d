//! The application's endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/transactions/{transaction_id}/',
//! use [format_endpoint].

/// The root route, which redirects to the transaction list.
pub const ROOT: &str = "/";
/// The page listing a user's transactions with their monthly totals.
pub const TRANSACTIONS_VIEW: &str = "/transactions/all";
/// The page and endpoint for recording a new transaction.
pub const NEW_TRANSACTION: &str = "/transactions/add";
/// The page showing a single transaction.
pub const TRANSACTION_DETAIL: &str = "/transactions/{transaction_id}/";
/// The page and endpoint for editing an existing transaction.
pub const EDIT_TRANSACTION: &str = "/transactions/{transaction_id}/change";
/// The endpoint for deleting a transaction.
pub const DELETE_TRANSACTION: &str = "/transactions/{transaction_id}/remove";
/// The registration page.
pub const SIGN_UP: &str = "/signup/";
/// The sign-in page.
pub const SIGN_IN: &str = "/signin/";
/// The route that ends the current session.
pub const SIGN_OUT: &str = "/signout/";
/// The route for static files.
pub const STATIC: &str = "/static";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/transactions/{transaction_id}/',
/// '{transaction_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
