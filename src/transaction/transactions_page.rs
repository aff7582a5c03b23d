//! Defines the route handler for the page that lists a user's transactions
//! with their monthly totals.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, Month, OffsetDateTime};

use crate::{
    AppState, Error,
    alert::success_alert,
    endpoints::{self, format_endpoint},
    html::{DANGER_LINK_STYLE, TABLE_STYLE, base, format_currency, link},
    navigation::get_nav_bar,
    timezone::get_local_offset,
    user::UserID,
};

use super::core::{
    CategoryTotal, KindTotal, MonthRange, Transaction, get_transactions_for_user,
    sum_amount_by_category, sum_amount_by_kind,
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsViewState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Query parameters accepted by the transactions page.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionsQuery {
    /// The reference month (1-12) for the totals. Defaults to the current month.
    pub month: Option<u8>,
    /// The reference year for the totals. Defaults to the current year.
    pub year: Option<i32>,
    /// A success notice to display, set by the create/edit/delete redirects.
    pub notice: Option<String>,
}

/// Render an overview of the user's transactions: the full history plus the
/// amounts summed by type and by category for the reference month.
pub async fn get_transactions_page(
    State(state): State<TransactionsViewState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Response, Error> {
    let today = current_local_date(&state.local_timezone)?;
    let range = resolve_month(&query, today);

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    // One lock acquisition for all three queries, so the history and the two
    // summaries reflect the same snapshot of the store.
    let transactions = get_transactions_for_user(user_id, &connection)?;
    let kind_totals = sum_amount_by_kind(user_id, range, &connection)?;
    let category_totals = sum_amount_by_category(user_id, range, &connection)?;

    drop(connection);

    Ok(transactions_view(
        &transactions,
        &kind_totals,
        &category_totals,
        range,
        query.notice.as_deref(),
    )
    .into_response())
}

/// Get a response that redirects to the transactions page with a success
/// notice to display.
pub(crate) fn redirect_to_transactions_with_notice(notice: &str) -> Response {
    let url = match serde_urlencoded::to_string([("notice", notice)]) {
        Ok(query) => format!("{}?{}", endpoints::TRANSACTIONS_VIEW, query),
        Err(error) => {
            tracing::error!("Could not encode the notice {notice:?}: {error}");
            endpoints::TRANSACTIONS_VIEW.to_owned()
        }
    };

    Redirect::to(&url).into_response()
}

fn current_local_date(local_timezone: &str) -> Result<Date, Error> {
    let Some(local_offset) = get_local_offset(local_timezone) else {
        tracing::error!("Invalid timezone {}", local_timezone);
        return Err(Error::InvalidTimezoneError(local_timezone.to_owned()));
    };

    Ok(OffsetDateTime::now_utc().to_offset(local_offset).date())
}

/// The month the totals should cover: the requested month/year where given
/// and valid, the current month otherwise.
fn resolve_month(query: &TransactionsQuery, today: Date) -> MonthRange {
    let month = query
        .month
        .and_then(|month| Month::try_from(month).ok())
        .unwrap_or_else(|| today.month());
    let year = query.year.unwrap_or_else(|| today.year());

    MonthRange::new(year, month).unwrap_or_else(|| MonthRange::containing(today))
}

fn transactions_view(
    transactions: &[Transaction],
    kind_totals: &[KindTotal],
    category_totals: &[CategoryTotal],
    range: MonthRange,
    notice: Option<&str>,
) -> Markup {
    let month_heading = format!("{} {}", range.start.month(), range.start.year());

    let content = html! {
        (get_nav_bar(endpoints::TRANSACTIONS_VIEW))

        main class="page"
        {
            @if let Some(notice) = notice
            {
                (success_alert(notice))
            }

            h1 { "Transactions" }

            section class="summary"
            {
                h2 { "Totals for " (month_heading) }

                @if kind_totals.is_empty()
                {
                    p { "No transactions recorded this month." }
                }
                @else
                {
                    table class=(TABLE_STYLE)
                    {
                        thead { tr { th { "Type" } th { "Total" } } }
                        tbody
                        {
                            @for total in kind_totals
                            {
                                tr
                                {
                                    td { (total.kind) }
                                    td { (format_currency(total.total)) }
                                }
                            }
                        }
                    }

                    table class=(TABLE_STYLE)
                    {
                        thead { tr { th { "Category" } th { "Total" } } }
                        tbody
                        {
                            @for total in category_totals
                            {
                                tr
                                {
                                    td { (total.category) }
                                    td { (format_currency(total.total)) }
                                }
                            }
                        }
                    }
                }
            }

            section class="history"
            {
                h2 { "History" }

                @if transactions.is_empty()
                {
                    p
                    {
                        "No transactions yet. "
                        (link(endpoints::NEW_TRANSACTION, "Add your first transaction"))
                    }
                }
                @else
                {
                    table class=(TABLE_STYLE)
                    {
                        thead
                        {
                            tr
                            {
                                th { "Date" }
                                th { "Title" }
                                th { "Type" }
                                th { "Category" }
                                th { "Amount" }
                                th { "" }
                            }
                        }
                        tbody
                        {
                            @for transaction in transactions
                            {
                                tr
                                {
                                    td { (transaction.created_on) }
                                    td
                                    {
                                        a
                                            href=(format_endpoint(endpoints::TRANSACTION_DETAIL, transaction.id))
                                            class="link"
                                        {
                                            (transaction.title)
                                        }
                                    }
                                    td { (transaction.kind) }
                                    td { (transaction.category) }
                                    td { (format_currency(transaction.amount)) }
                                    td
                                    {
                                        (link(&format_endpoint(endpoints::EDIT_TRANSACTION, transaction.id), "Edit"))
                                        " "
                                        a
                                            href=(format_endpoint(endpoints::DELETE_TRANSACTION, transaction.id))
                                            class=(DANGER_LINK_STYLE)
                                        {
                                            "Delete"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    base("Transactions", &content)
}

#[cfg(test)]
mod transactions_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Query, State},
        response::Response,
    };
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        PasswordHash, initialize_db,
        transaction::{Category, NewTransaction, TransactionKind, create_transaction},
        user::{UserID, create_user},
    };

    use super::{TransactionsQuery, TransactionsViewState, get_transactions_page, resolve_month};

    fn get_test_state() -> (TransactionsViewState, UserID) {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize_db(&connection).expect("Could not initialize database");
        let user = create_user(
            "alice",
            "alice@example.com",
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .expect("Could not create test user");

        (
            TransactionsViewState {
                db_connection: Arc::new(Mutex::new(connection)),
                local_timezone: "Etc/UTC".to_owned(),
            },
            user.id,
        )
    }

    async fn parse_html(response: Response) -> Html {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Could not get response body");
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

    fn cell_texts(document: &Html, selector: &str) -> Vec<String> {
        let selector = Selector::parse(selector).unwrap();
        document
            .select(&selector)
            .map(|element| element.text().collect::<String>().trim().to_owned())
            .collect()
    }

    #[tokio::test]
    async fn page_shows_monthly_totals_and_history() {
        let (state, user_id) = get_test_state();
        {
            let connection = state.db_connection.lock().unwrap();
            create_transaction(
                NewTransaction {
                    title: "Rent".to_owned(),
                    amount: 1000.0,
                    kind: TransactionKind::Expense,
                    category: Category::Rent,
                },
                date!(2024 - 03 - 05),
                user_id,
                &connection,
            )
            .unwrap();
            create_transaction(
                NewTransaction {
                    title: "Salary".to_owned(),
                    amount: 3000.0,
                    kind: TransactionKind::Income,
                    category: Category::Salary,
                },
                date!(2024 - 03 - 25),
                user_id,
                &connection,
            )
            .unwrap();
        }

        let response = get_transactions_page(
            State(state),
            Extension(user_id),
            Query(TransactionsQuery {
                month: Some(3),
                year: Some(2024),
                notice: None,
            }),
        )
        .await
        .expect("expected the page to render");

        let document = parse_html(response).await;
        assert_valid_html(&document);

        let summary_cells = cell_texts(&document, "section.summary td");
        assert!(summary_cells.contains(&"expense".to_owned()));
        assert!(summary_cells.contains(&"$1,000.00".to_owned()));
        assert!(summary_cells.contains(&"income".to_owned()));
        assert!(summary_cells.contains(&"$3,000.00".to_owned()));
        assert!(summary_cells.contains(&"rent".to_owned()));
        assert!(summary_cells.contains(&"salary".to_owned()));

        let history_rows = cell_texts(&document, "section.history td:nth-child(2) a");
        assert_eq!(history_rows, vec!["Salary".to_owned(), "Rent".to_owned()]);
    }

    #[tokio::test]
    async fn page_renders_empty_state_without_transactions() {
        let (state, user_id) = get_test_state();

        let response = get_transactions_page(
            State(state),
            Extension(user_id),
            Query(TransactionsQuery::default()),
        )
        .await
        .expect("expected the page to render");

        let document = parse_html(response).await;
        assert_valid_html(&document);

        let summary_cells = cell_texts(&document, "section.summary td");
        assert!(
            summary_cells.is_empty(),
            "want no summary rows, got {summary_cells:?}"
        );

        let paragraphs = cell_texts(&document, "section.history p");
        assert!(
            paragraphs
                .iter()
                .any(|text| text.contains("No transactions yet.")),
            "want the empty state message, got {paragraphs:?}"
        );
    }

    #[tokio::test]
    async fn page_displays_notice() {
        let (state, user_id) = get_test_state();

        let response = get_transactions_page(
            State(state),
            Extension(user_id),
            Query(TransactionsQuery {
                month: None,
                year: None,
                notice: Some("transaction has been added successfully".to_owned()),
            }),
        )
        .await
        .expect("expected the page to render");

        let document = parse_html(response).await;
        let alerts = cell_texts(&document, "div.alert-success");
        assert_eq!(
            alerts,
            vec!["transaction has been added successfully".to_owned()]
        );
    }

    #[test]
    fn resolve_month_defaults_to_the_current_month() {
        let today = date!(2024 - 03 - 15);

        let range = resolve_month(&TransactionsQuery::default(), today);

        assert_eq!(range.start, date!(2024 - 03 - 01));
        assert_eq!(range.end, date!(2024 - 04 - 01));
    }

    #[test]
    fn resolve_month_uses_the_query_parameters() {
        let today = date!(2024 - 03 - 15);
        let query = TransactionsQuery {
            month: Some(12),
            year: Some(2023),
            notice: None,
        };

        let range = resolve_month(&query, today);

        assert_eq!(range.start, date!(2023 - 12 - 01));
        assert_eq!(range.end, date!(2024 - 01 - 01));
    }

    #[test]
    fn resolve_month_falls_back_on_invalid_month() {
        let today = date!(2024 - 03 - 15);
        let query = TransactionsQuery {
            month: Some(13),
            year: Some(2023),
            notice: None,
        };

        let range = resolve_month(&query, today);

        // An out-of-range month keeps the requested year.
        assert_eq!(range.start, date!(2023 - 03 - 01));
    }
}
