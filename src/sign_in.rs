//! This file defines the routes for displaying the sign-in page and handling
//! sign-in requests. The auth_cookie module handles the lower level session
//! cookie logic.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error, User,
    alert::error_alert,
    app_state::create_cookie_key,
    auth_cookie::{DEFAULT_COOKIE_DURATION, invalidate_session_cookie, set_session_cookie},
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, auth_card, base, link, text_input},
    internal_server_error::render_internal_server_error,
    user::get_user_by_username,
};

pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect username or password.";

/// Renders the sign-in form, optionally preceded by a notice banner (e.g. the
/// "invalid session" notice set by the session guard).
fn sign_in_form(username: &str, notice: Option<&str>, error_message: Option<&str>) -> Markup {
    html! {
        @if let Some(notice) = notice
        {
            (error_alert(notice))
        }

        form method="post" action=(endpoints::SIGN_IN)
        {
            (text_input("Username", "text", "username", username, None))
            (text_input("Password", "password", "password", "", error_message))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Sign in" }

            p
            {
                "Don't have an account? "
                (link(endpoints::SIGN_UP, "Sign up here"))
            }
        }
    }
}

fn render_sign_in_page(username: &str, notice: Option<&str>, error_message: Option<&str>) -> Response {
    let form = sign_in_form(username, notice, error_message);
    base("Sign in", &auth_card("Sign in", &form)).into_response()
}

/// Query parameters accepted by the sign-in page.
#[derive(Debug, Default, Deserialize)]
pub struct SignInPageQuery {
    /// A notice to display above the form, set when the session guard
    /// redirects an unauthenticated caller here.
    pub error: Option<String>,
}

/// Display the sign-in page.
pub async fn get_sign_in_page(Query(query): Query<SignInPageQuery>) -> Response {
    render_sign_in_page("", query.error.as_deref(), None)
}

/// The state needed to perform a sign-in.
#[derive(Debug, Clone)]
pub struct SignInState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl SignInState {
    /// Create the cookie key from a string and set the default cookie duration.
    pub fn new(cookie_secret: &str, db_connection: Arc<Mutex<Connection>>) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            db_connection,
        }
    }
}

impl FromRef<AppState> for SignInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<SignInState> for Key {
    fn from_ref(state: &SignInState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered by the user in the sign-in form.
///
/// The username and password are stored as plain strings. There is no need for
/// validation here since they will be compared against the username and
/// password in the database, which have been verified.
#[derive(Debug, Clone, Deserialize)]
pub struct SignInForm {
    /// Username entered during sign-in.
    pub username: String,
    /// Password entered during sign-in.
    pub password: String,
}

/// Handler for sign-in requests via the POST method.
///
/// On a successful sign-in request the session cookie is set and the client is
/// redirected to the transaction list. Otherwise, the form is returned with an
/// error message that does not disclose whether the username exists.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn post_sign_in(
    State(state): State<SignInState>,
    jar: PrivateCookieJar,
    Form(form): Form<SignInForm>,
) -> Response {
    let user: User = match get_user_by_username(
        &form.username,
        &state
            .db_connection
            .lock()
            .expect("Could not acquire database lock"),
    ) {
        Ok(user) => user,
        Err(Error::NotFound) => {
            return render_sign_in_page(&form.username, None, Some(INVALID_CREDENTIALS_ERROR_MSG));
        }
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return render_sign_in_page(
                &form.username,
                None,
                Some("An internal error occurred. Please try again later."),
            );
        }
    };

    let is_password_valid = match user.password_hash.verify(&form.password) {
        Ok(is_password_valid) => is_password_valid,
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return render_sign_in_page(
                &form.username,
                None,
                Some("An internal error occurred. Please try again later."),
            );
        }
    };

    if !is_password_valid {
        return render_sign_in_page(&form.username, None, Some(INVALID_CREDENTIALS_ERROR_MSG));
    }

    match set_session_cookie(jar.clone(), user.id, state.cookie_duration) {
        Ok(updated_jar) => {
            (updated_jar, Redirect::to(endpoints::TRANSACTIONS_VIEW)).into_response()
        }
        Err(error) => {
            tracing::error!("Error setting session cookie: {error}");
            (
                invalidate_session_cookie(jar),
                render_internal_server_error(
                    "Sorry, something went wrong.",
                    "Try again later or check the server logs",
                ),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod sign_in_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Form,
        body::Body,
        extract::{Query, State},
        http::{Response, StatusCode, header::SET_COOKIE},
    };
    use axum_extra::extract::{PrivateCookieJar, cookie::Cookie};
    use rusqlite::Connection;
    use time::OffsetDateTime;

    use crate::{
        PasswordHash, endpoints, initialize_db,
        auth_cookie::{COOKIE_EXPIRY, COOKIE_USER_ID},
        user::create_user,
    };

    use super::{
        INVALID_CREDENTIALS_ERROR_MSG, SignInForm, SignInPageQuery, SignInState, get_sign_in_page,
        post_sign_in,
    };

    fn get_test_state(with_test_user: bool) -> SignInState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize_db(&connection).expect("Could not initialize database");

        if with_test_user {
            create_user(
                "alice",
                "alice@example.com",
                PasswordHash::from_raw_password("plaid-bovine-quartz-73", 4)
                    .expect("Could not hash test password"),
                &connection,
            )
            .expect("Could not create test user");
        }

        SignInState::new("foobar", Arc::new(Mutex::new(connection)))
    }

    async fn new_sign_in_request(state: SignInState, form: SignInForm) -> Response<Body> {
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        post_sign_in(State(state), jar, Form(form)).await
    }

    async fn assert_body_contains_message(response: Response<Body>, message: &str) {
        let body = response.into_body();
        let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();

        let text = String::from_utf8_lossy(&body).to_string();

        assert!(
            text.contains(message),
            "response body should contain the text '{}' but got {}",
            message,
            text
        );
    }

    #[track_caller]
    fn assert_redirect(response: &Response<Body>, want_location: &str) {
        let redirect_location = response.headers().get("location").unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(redirect_location, want_location);
    }

    #[track_caller]
    fn assert_set_session_cookies(response: &Response<Body>) {
        let mut found_cookies = std::collections::HashSet::new();

        for cookie_headers in response.headers().get_all(SET_COOKIE) {
            let cookie_string = cookie_headers.to_str().unwrap();
            let cookie = Cookie::parse(cookie_string).unwrap();

            match cookie.name() {
                COOKIE_USER_ID | COOKIE_EXPIRY => {
                    assert!(cookie.expires_datetime() > Some(OffsetDateTime::now_utc()));
                    found_cookies.insert(cookie.name().to_string());
                }
                _ => panic!("Unexpected cookie found: {}", cookie.name()),
            }
        }

        assert!(
            found_cookies.contains(COOKIE_USER_ID),
            "could not find cookie '{}' in {:?}",
            COOKIE_USER_ID,
            found_cookies
        );

        assert!(
            found_cookies.contains(COOKIE_EXPIRY),
            "could not find cookie '{}' in {:?}",
            COOKIE_EXPIRY,
            found_cookies
        );
    }

    #[tokio::test]
    async fn sign_in_page_displays_guard_notice() {
        let response = get_sign_in_page(Query(SignInPageQuery {
            error: Some("invalid session".to_owned()),
        }))
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_body_contains_message(response, "invalid session").await;
    }

    #[tokio::test]
    async fn sign_in_succeeds_with_valid_credentials() {
        let state = get_test_state(true);

        let response = new_sign_in_request(
            state,
            SignInForm {
                username: "alice".to_owned(),
                password: "plaid-bovine-quartz-73".to_owned(),
            },
        )
        .await;

        assert_redirect(&response, endpoints::TRANSACTIONS_VIEW);
        assert_set_session_cookies(&response);
    }

    #[tokio::test]
    async fn sign_in_fails_with_unknown_username() {
        let state = get_test_state(false);

        let response = new_sign_in_request(
            state,
            SignInForm {
                username: "mallory".to_owned(),
                password: "plaid-bovine-quartz-73".to_owned(),
            },
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_body_contains_message(response, INVALID_CREDENTIALS_ERROR_MSG).await;
    }

    #[tokio::test]
    async fn sign_in_fails_with_incorrect_password() {
        let state = get_test_state(true);

        let response = new_sign_in_request(
            state,
            SignInForm {
                username: "alice".to_owned(),
                password: "wrongpassword".to_owned(),
            },
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_body_contains_message(response, INVALID_CREDENTIALS_ERROR_MSG).await;
    }

    #[tokio::test]
    async fn failure_message_does_not_reveal_whether_username_exists() {
        let known_username_response = new_sign_in_request(
            get_test_state(true),
            SignInForm {
                username: "alice".to_owned(),
                password: "wrongpassword".to_owned(),
            },
        )
        .await;
        let unknown_username_response = new_sign_in_request(
            get_test_state(false),
            SignInForm {
                username: "alice".to_owned(),
                password: "wrongpassword".to_owned(),
            },
        )
        .await;

        assert_body_contains_message(known_username_response, INVALID_CREDENTIALS_ERROR_MSG).await;
        assert_body_contains_message(unknown_username_response, INVALID_CREDENTIALS_ERROR_MSG)
            .await;
    }
}
