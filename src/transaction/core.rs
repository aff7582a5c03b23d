//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql, named_params,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, Month};

use crate::{Error, database_id::DatabaseId, user::UserID};

// ============================================================================
// MODELS
// ============================================================================

/// Whether a transaction brings money in or takes money out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Money earned, e.g. a salary payment.
    Income,
    /// Money spent, e.g. rent or groceries.
    Expense,
}

impl TransactionKind {
    /// Every transaction kind, in the order they appear in forms.
    pub const ALL: [TransactionKind; 2] = [TransactionKind::Income, TransactionKind::Expense];

    /// The lowercase string stored in the database and used in form values.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error returned when a string does not name a transaction kind.
#[derive(Debug, thiserror::Error, PartialEq)]
#[error("unknown transaction type \"{0}\"")]
pub struct ParseTransactionKindError(String);

impl FromStr for TransactionKind {
    type Err = ParseTransactionKindError;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        match string {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(ParseTransactionKindError(other.to_owned())),
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: ParseTransactionKindError| FromSqlError::Other(Box::new(error)))
    }
}

/// What a transaction was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Groceries and eating out.
    Food,
    /// Rent payments.
    Rent,
    /// Salary payments.
    Salary,
    /// Commuting and trips.
    Travel,
    /// Power, water, internet and the like.
    Utilities,
    /// Fun money.
    Entertainment,
    /// Anything that does not fit the other categories.
    Other,
}

impl Category {
    /// Every category, in the order they appear in forms.
    pub const ALL: [Category; 7] = [
        Category::Food,
        Category::Rent,
        Category::Salary,
        Category::Travel,
        Category::Utilities,
        Category::Entertainment,
        Category::Other,
    ];

    /// The lowercase string stored in the database and used in form values.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Rent => "rent",
            Category::Salary => "salary",
            Category::Travel => "travel",
            Category::Utilities => "utilities",
            Category::Entertainment => "entertainment",
            Category::Other => "other",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error returned when a string does not name a category.
#[derive(Debug, thiserror::Error, PartialEq)]
#[error("unknown category \"{0}\"")]
pub struct ParseCategoryError(String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == string)
            .ok_or_else(|| ParseCategoryError(string.to_owned()))
    }
}

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: ParseCategoryError| FromSqlError::Other(Box::new(error)))
    }
}

/// An income or expense record owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: DatabaseId,
    /// A short text describing what the transaction was, e.g. "Rent".
    pub title: String,
    /// The amount of money spent or earned in this transaction.
    pub amount: f64,
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,
    /// The category the transaction falls under.
    pub category: Category,
    /// The date the transaction was recorded. Set once at creation.
    pub created_on: Date,
    /// The user that owns the transaction. Set once at creation.
    pub user_id: UserID,
}

/// The validated fields needed to create a transaction, or to overwrite the
/// editable fields of an existing one.
///
/// The owner and creation date are deliberately absent: they are set when the
/// row is inserted and never change afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// A short text describing what the transaction was.
    pub title: String,
    /// The amount of money spent or earned.
    pub amount: f64,
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,
    /// The category the transaction falls under.
    pub category: Category,
}

/// The first and one-past-last dates of a calendar month, used to restrict
/// the summary queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    /// The first day of the month.
    pub start: Date,
    /// The first day of the following month.
    pub end: Date,
}

impl MonthRange {
    /// The range covering the calendar month `month` of `year`, or `None` if
    /// the year is outside the range of valid dates.
    pub fn new(year: i32, month: Month) -> Option<Self> {
        let start = Date::from_calendar_date(year, month, 1).ok()?;
        let (next_year, next_month) = match month {
            Month::December => (year + 1, Month::January),
            _ => (year, month.next()),
        };
        let end = Date::from_calendar_date(next_year, next_month, 1).ok()?;

        Some(Self { start, end })
    }

    /// The range covering the month that `date` falls in.
    pub fn containing(date: Date) -> Self {
        Self::new(date.year(), date.month())
            .expect("the month of an existing date is always a valid month")
    }

    /// Whether `date` falls within this range.
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date < self.end
    }
}

/// The total amount for one transaction kind within a month.
#[derive(Debug, PartialEq)]
pub struct KindTotal {
    /// The transaction kind the total is for.
    pub kind: TransactionKind,
    /// The sum of the amounts of the matching transactions.
    pub total: f64,
}

/// The total amount for one category within a month.
#[derive(Debug, PartialEq)]
pub struct CategoryTotal {
    /// The category the total is for.
    pub category: Category,
    /// The sum of the amounts of the matching transactions.
    pub total: f64,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                amount REAL NOT NULL,
                kind TEXT NOT NULL,
                category TEXT NOT NULL,
                created_on TEXT NOT NULL,
                user_id INTEGER NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Covers both the history query and the month-restricted summary queries.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date \
         ON \"transaction\"(user_id, created_on);",
        (),
    )?;

    Ok(())
}

/// Create a new transaction in the database, owned by `user_id` and stamped
/// with `created_on`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error,
/// e.g. `user_id` does not refer to a registered user.
pub fn create_transaction(
    new_transaction: NewTransaction,
    created_on: Date,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "INSERT INTO \"transaction\" (title, amount, kind, category, created_on, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, title, amount, kind, category, created_on, user_id",
        )?
        .query_row(
            (
                &new_transaction.title,
                new_transaction.amount,
                new_transaction.kind,
                new_transaction.category,
                created_on,
                user_id.as_i64(),
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve the transaction with `id` owned by `user_id`.
///
/// A transaction owned by another user is treated exactly like a missing one.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(
    id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, title, amount, kind, category, created_on, user_id \
             FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            named_params! {":id": id, ":user_id": user_id.as_i64()},
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve every transaction owned by `user_id`, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions_for_user(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, title, amount, kind, category, created_on, user_id \
             FROM \"transaction\" WHERE user_id = :user_id \
             ORDER BY created_on DESC, id DESC",
        )?
        .query_map(
            named_params! {":user_id": user_id.as_i64()},
            map_transaction_row,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// The number of rows changed by an update or delete.
pub type RowsAffected = usize;

/// Overwrite the editable fields of the transaction with `id` owned by
/// `user_id`. The owner and creation date are left untouched.
///
/// Returns the number of rows affected: zero means no transaction with `id`
/// is owned by `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn update_transaction(
    id: DatabaseId,
    user_id: UserID,
    fields: &NewTransaction,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "UPDATE \"transaction\" \
             SET title = ?1, amount = ?2, kind = ?3, category = ?4 \
             WHERE id = ?5 AND user_id = ?6;",
            (
                &fields.title,
                fields.amount,
                fields.kind,
                fields.category,
                id,
                user_id.as_i64(),
            ),
        )
        .map_err(Error::from)
}

/// Delete the transaction with `id` owned by `user_id`.
///
/// Returns the number of rows affected: deleting a missing (or foreign)
/// transaction affects zero rows and is not an error.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn delete_transaction(
    id: DatabaseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "DELETE FROM \"transaction\" WHERE id = :id AND user_id = :user_id",
            named_params! {":id": id, ":user_id": user_id.as_i64()},
        )
        .map_err(Error::from)
}

/// Sum the amounts of the transactions owned by `user_id` created within
/// `range`, grouped by transaction kind.
///
/// Kinds with no matching transactions are absent from the result, so a month
/// with no transactions produces an empty vector.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn sum_amount_by_kind(
    user_id: UserID,
    range: MonthRange,
    connection: &Connection,
) -> Result<Vec<KindTotal>, Error> {
    connection
        .prepare(
            "SELECT kind, SUM(amount) FROM \"transaction\" \
             WHERE user_id = :user_id AND created_on >= :start AND created_on < :end \
             GROUP BY kind ORDER BY kind",
        )?
        .query_map(
            named_params! {
                ":user_id": user_id.as_i64(),
                ":start": range.start,
                ":end": range.end,
            },
            |row| {
                Ok(KindTotal {
                    kind: row.get(0)?,
                    total: row.get(1)?,
                })
            },
        )?
        .map(|maybe_total| maybe_total.map_err(Error::from))
        .collect()
}

/// Sum the amounts of the transactions owned by `user_id` created within
/// `range`, grouped by category.
///
/// Categories with no matching transactions are absent from the result, so a
/// month with no transactions produces an empty vector.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn sum_amount_by_category(
    user_id: UserID,
    range: MonthRange,
    connection: &Connection,
) -> Result<Vec<CategoryTotal>, Error> {
    connection
        .prepare(
            "SELECT category, SUM(amount) FROM \"transaction\" \
             WHERE user_id = :user_id AND created_on >= :start AND created_on < :end \
             GROUP BY category ORDER BY category",
        )?
        .query_map(
            named_params! {
                ":user_id": user_id.as_i64(),
                ":start": range.start,
                ":end": range.end,
            },
            |row| {
                Ok(CategoryTotal {
                    category: row.get(0)?,
                    total: row.get(1)?,
                })
            },
        )?
        .map(|maybe_total| maybe_total.map_err(Error::from))
        .collect()
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        title: row.get(1)?,
        amount: row.get(2)?,
        kind: row.get(3)?,
        category: row.get(4)?,
        created_on: row.get(5)?,
        user_id: UserID::new(row.get(6)?),
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod month_range_tests {
    use time::{Month, macros::date};

    use super::MonthRange;

    #[test]
    fn covers_whole_month() {
        let range = MonthRange::new(2024, Month::March).unwrap();

        assert_eq!(range.start, date!(2024 - 03 - 01));
        assert_eq!(range.end, date!(2024 - 04 - 01));
        assert!(range.contains(date!(2024 - 03 - 01)));
        assert!(range.contains(date!(2024 - 03 - 31)));
        assert!(!range.contains(date!(2024 - 04 - 01)));
        assert!(!range.contains(date!(2024 - 02 - 29)));
    }

    #[test]
    fn december_rolls_over_to_next_year() {
        let range = MonthRange::new(2024, Month::December).unwrap();

        assert_eq!(range.start, date!(2024 - 12 - 01));
        assert_eq!(range.end, date!(2025 - 01 - 01));
    }

    #[test]
    fn containing_matches_new() {
        let range = MonthRange::containing(date!(2024 - 03 - 15));

        assert_eq!(range, MonthRange::new(2024, Month::March).unwrap());
    }
}
