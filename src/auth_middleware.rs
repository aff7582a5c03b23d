//! Middleware for the guarded route group: session validation and cache control.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{HeaderValue, header::CACHE_CONTROL},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};

use crate::{AppState, auth_cookie::get_user_id_from_session, endpoints};

/// The notice shown when a guarded page is requested without a valid session.
pub const INVALID_SESSION_NOTICE: &str = "invalid session";

/// The state needed for the session guard.
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Middleware function that checks for a valid session cookie.
///
/// If the session is valid the user ID is placed into the request and the
/// request executed normally, otherwise the caller is redirected to the
/// sign-in page with an "invalid session" notice and the wrapped handler
/// never runs.
///
/// **Note**: Route handlers can use the function argument
/// `Extension(user_id): Extension<UserID>` to receive the user ID.
pub async fn session_guard(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(err) => {
            tracing::error!("Error getting cookie jar: {err:?}. Redirecting to sign-in page.");
            return sign_in_redirect();
        }
    };
    let user_id = match get_user_id_from_session(&jar) {
        Ok(user_id) => user_id,
        Err(_) => return sign_in_redirect(),
    };

    parts.extensions.insert(user_id);
    let request = Request::from_parts(parts, body);

    next.run(request).await
}

/// Middleware function that disables response caching for guarded pages,
/// ensuring every request is re-evaluated against current session state.
pub async fn no_cache(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    response.headers_mut().insert(
        CACHE_CONTROL,
        HeaderValue::from_static("max-age=0, no-cache, no-store, must-revalidate, private"),
    );

    response
}

fn sign_in_redirect() -> Response {
    Redirect::to(&sign_in_redirect_url()).into_response()
}

/// The sign-in page URL carrying the "invalid session" notice.
pub fn sign_in_redirect_url() -> String {
    match serde_urlencoded::to_string([("error", INVALID_SESSION_NOTICE)]) {
        Ok(query) => format!("{}?{}", endpoints::SIGN_IN, query),
        Err(error) => {
            tracing::error!("Could not encode the sign-in notice: {error}");
            endpoints::SIGN_IN.to_owned()
        }
    }
}
