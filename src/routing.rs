//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    middleware,
    response::Redirect,
    routing::get,
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth_middleware::{no_cache, session_guard},
    endpoints,
    not_found::get_404_not_found,
    sign_in::{get_sign_in_page, post_sign_in},
    sign_out::get_sign_out,
    sign_up::{get_sign_up_page, post_sign_up},
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        get_edit_transaction_page, get_new_transaction_page, get_transaction_detail_page,
        get_transactions_page,
    },
};

/// Return a router with all the app's routes.
///
/// Every transaction route, the sign-out route and the root route sit behind
/// the session guard and have response caching disabled; the sign-up and
/// sign-in routes are reachable without a session.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::SIGN_UP, get(get_sign_up_page).post(post_sign_up))
        .route(endpoints::SIGN_IN, get(get_sign_in_page).post(post_sign_in));

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(
            endpoints::NEW_TRANSACTION,
            get(get_new_transaction_page).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION_DETAIL,
            get(get_transaction_detail_page),
        )
        .route(
            endpoints::EDIT_TRANSACTION,
            get(get_edit_transaction_page).post(edit_transaction_endpoint),
        )
        .route(
            endpoints::DELETE_TRANSACTION,
            get(delete_transaction_endpoint),
        )
        .route(endpoints::SIGN_OUT, get(get_sign_out))
        .layer(middleware::from_fn(no_cache))
        .layer(middleware::from_fn_with_state(state.clone(), session_guard));

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the transaction list.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::TRANSACTIONS_VIEW)
}
