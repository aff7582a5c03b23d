//! The registration page and endpoint for creating a new account.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, PasswordHash, ValidatedPassword,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, auth_card, base, link, text_input},
    internal_server_error::render_internal_server_error,
    user::create_user,
};

/// Per-field error messages for the registration form.
#[derive(Debug, Default, PartialEq)]
struct SignUpFormErrors {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

impl SignUpFormErrors {
    fn is_empty(&self) -> bool {
        self.username.is_none() && self.email.is_none() && self.password.is_none()
    }
}

/// Renders the registration form with the previously entered username and
/// email preserved. The password is never echoed back.
fn sign_up_form(username: &str, email: &str, errors: &SignUpFormErrors) -> Markup {
    html! {
        form method="post" action=(endpoints::SIGN_UP)
        {
            (text_input("Username", "text", "username", username, errors.username.as_deref()))
            (text_input("Email", "email", "email", email, errors.email.as_deref()))
            (text_input("Password", "password", "password", "", errors.password.as_deref()))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Sign up" }

            p
            {
                "Already have an account? "
                (link(endpoints::SIGN_IN, "Sign in here"))
            }
        }
    }
}

fn render_sign_up_page(username: &str, email: &str, errors: &SignUpFormErrors) -> Response {
    let form = sign_up_form(username, email, errors);
    base("Sign up", &auth_card("Create an account", &form)).into_response()
}

/// Display the registration page.
pub async fn get_sign_up_page() -> Response {
    render_sign_up_page("", "", &SignUpFormErrors::default())
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct SignUpState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SignUpState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The raw data entered by the user in the registration form.
#[derive(Debug, Default, Deserialize)]
pub struct SignUpForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Handler for registration requests via the POST method.
///
/// On success the new user is persisted and the client redirected to the
/// sign-in page. On a validation failure the form is redisplayed with
/// per-field errors and no record is created.
pub async fn post_sign_up(
    State(state): State<SignUpState>,
    Form(form): Form<SignUpForm>,
) -> Response {
    let mut errors = SignUpFormErrors::default();

    if form.username.trim().is_empty() {
        errors.username = Some("A username is required.".to_owned());
    }

    if form.email.trim().is_empty() || !form.email.contains('@') {
        errors.email = Some("Enter a valid email address.".to_owned());
    }

    let validated_password = ValidatedPassword::new(&form.password);
    if let Err(Error::TooWeak(feedback)) = &validated_password {
        errors.password = Some(format!("This password is too weak: {feedback}"));
    }

    if !errors.is_empty() {
        return render_sign_up_page(&form.username, &form.email, &errors);
    }

    let validated_password = match validated_password {
        Ok(password) => password,
        Err(error) => {
            tracing::error!("An unexpected error occurred while validating a password: {error}");
            return render_internal_server_error(
                "Sorry, something went wrong.",
                "Try again later or check the server logs",
            );
        }
    };

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("an error occurred while hashing a password: {error}");
            return render_internal_server_error(
                "Sorry, something went wrong.",
                "Try again later or check the server logs",
            );
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_response();
        }
    };

    match create_user(form.username.trim(), form.email.trim(), password_hash, &connection) {
        Ok(user) => {
            tracing::info!("Created user {}", user.id);
            Redirect::to(endpoints::SIGN_IN).into_response()
        }
        Err(Error::DuplicateUsername) => {
            let errors = SignUpFormErrors {
                username: Some("This username is already taken.".to_owned()),
                ..Default::default()
            };
            render_sign_up_page(&form.username, &form.email, &errors)
        }
        Err(error) => {
            tracing::error!("An unhandled error occurred while inserting a new user: {error}");
            error.into_response()
        }
    }
}

#[cfg(test)]
mod sign_up_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Form, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use scraper::{Html, Selector};

    use crate::{
        endpoints, initialize_db,
        user::get_user_by_username,
    };

    use super::{SignUpForm, SignUpState, get_sign_up_page, post_sign_up};

    const STRONG_PASSWORD: &str = "plaid-bovine-quartz-73";

    fn get_test_state() -> SignUpState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize_db(&connection).expect("Could not initialize database");

        SignUpState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    async fn response_document(response: axum::response::Response) -> Html {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8_lossy(&body).to_string();

        Html::parse_document(&text)
    }

    #[track_caller]
    fn assert_valid_html(html: &Html) {
        assert!(
            html.errors.is_empty(),
            "Got HTML parsing errors: {:?}",
            html.errors
        );
    }

    #[tokio::test]
    async fn sign_up_page_displays_form() {
        let response = get_sign_up_page().await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = response_document(response).await;
        assert_valid_html(&document);

        let form_selector = Selector::parse("form").unwrap();
        let forms = document.select(&form_selector).collect::<Vec<_>>();
        assert_eq!(forms.len(), 1, "want 1 form, got {}", forms.len());
        let form = forms.first().unwrap();
        assert_eq!(form.value().attr("action"), Some(endpoints::SIGN_UP));
        assert_eq!(form.value().attr("method"), Some("post"));

        for (tag, element_type) in [
            ("input", "text"),
            ("input", "email"),
            ("input", "password"),
            ("button", "submit"),
        ] {
            let selector = Selector::parse(&format!("{tag}[type={element_type}]")).unwrap();
            let elements = form.select(&selector).collect::<Vec<_>>();
            assert_eq!(
                elements.len(),
                1,
                "want 1 {element_type} {tag}, got {}",
                elements.len()
            );
        }
    }

    #[tokio::test]
    async fn sign_up_creates_user_and_redirects_to_sign_in() {
        let state = get_test_state();
        let form = SignUpForm {
            username: "alice".to_owned(),
            email: "alice@example.com".to_owned(),
            password: STRONG_PASSWORD.to_owned(),
        };

        let response = post_sign_up(State(state.clone()), Form(form)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            endpoints::SIGN_IN
        );

        let connection = state.db_connection.lock().unwrap();
        let user = get_user_by_username("alice", &connection).unwrap();
        assert_eq!(user.email, "alice@example.com");
        assert!(user.password_hash.verify(STRONG_PASSWORD).unwrap());
    }

    #[tokio::test]
    async fn sign_up_rejects_missing_fields_without_creating_a_record() {
        let state = get_test_state();
        let form = SignUpForm {
            username: "".to_owned(),
            email: "not-an-email".to_owned(),
            password: "weak".to_owned(),
        };

        let response = post_sign_up(State(state.clone()), Form(form)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = response_document(response).await;
        assert_valid_html(&document);

        let error_selector = Selector::parse("p.field-error").unwrap();
        let field_errors = document.select(&error_selector).collect::<Vec<_>>();
        assert_eq!(
            field_errors.len(),
            3,
            "want errors for username, email and password, got {}",
            field_errors.len()
        );

        let connection = state.db_connection.lock().unwrap();
        let count: i64 = connection
            .query_row("SELECT COUNT(id) FROM user", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0, "no record should be created");
    }

    #[tokio::test]
    async fn sign_up_preserves_entered_values_on_error() {
        let state = get_test_state();
        let form = SignUpForm {
            username: "alice".to_owned(),
            email: "alice@example.com".to_owned(),
            password: "weak".to_owned(),
        };

        let response = post_sign_up(State(state), Form(form)).await;

        let document = response_document(response).await;
        let username_selector = Selector::parse("input[name=username]").unwrap();
        let username_input = document.select(&username_selector).next().unwrap();
        assert_eq!(username_input.value().attr("value"), Some("alice"));

        let password_selector = Selector::parse("input[name=password]").unwrap();
        let password_input = document.select(&password_selector).next().unwrap();
        assert_eq!(
            password_input.value().attr("value"),
            Some(""),
            "the password must not be echoed back"
        );
    }

    #[tokio::test]
    async fn sign_up_rejects_duplicate_username() {
        let state = get_test_state();
        let form = SignUpForm {
            username: "alice".to_owned(),
            email: "alice@example.com".to_owned(),
            password: STRONG_PASSWORD.to_owned(),
        };
        post_sign_up(State(state.clone()), Form(form)).await;

        let duplicate = SignUpForm {
            username: "alice".to_owned(),
            email: "alice.other@example.com".to_owned(),
            password: STRONG_PASSWORD.to_owned(),
        };
        let response = post_sign_up(State(state.clone()), Form(duplicate)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = response_document(response).await;
        let error_selector = Selector::parse("p.field-error").unwrap();
        let errors = document
            .select(&error_selector)
            .map(|element| element.text().collect::<String>())
            .collect::<Vec<_>>();
        assert_eq!(errors, vec!["This username is already taken.".to_owned()]);

        let connection = state.db_connection.lock().unwrap();
        let count: i64 = connection
            .query_row("SELECT COUNT(id) FROM user", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1, "no duplicate user should be persisted");
    }
}
