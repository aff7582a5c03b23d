use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use spendlog::{
    Category, NewTransaction, PasswordHash, TransactionKind, ValidatedPassword,
    create_transaction, create_user, initialize_db,
};

/// A utility for creating a test database for the spendlog server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
///
/// The database contains the user "demo" with the password "test" and a
/// couple of months of sample transactions.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user("demo", "demo@example.com", password_hash, &conn)?;

    println!("Creating sample transactions...");

    let today = OffsetDateTime::now_utc().date();
    let last_month = today - Duration::days(30);

    let samples = [
        ("Salary", 3200.0, TransactionKind::Income, Category::Salary, today),
        ("Rent", 1000.0, TransactionKind::Expense, Category::Rent, today),
        ("Groceries", 86.4, TransactionKind::Expense, Category::Food, today),
        ("Bus pass", 45.0, TransactionKind::Expense, Category::Travel, today),
        ("Salary", 3200.0, TransactionKind::Income, Category::Salary, last_month),
        ("Rent", 1000.0, TransactionKind::Expense, Category::Rent, last_month),
        ("Cinema", 24.0, TransactionKind::Expense, Category::Entertainment, last_month),
    ];

    for (title, amount, kind, category, created_on) in samples {
        create_transaction(
            NewTransaction {
                title: title.to_owned(),
                amount,
                kind,
                category,
            },
            created_on,
            user.id,
            &conn,
        )?;
    }

    println!("Success!");

    Ok(())
}
