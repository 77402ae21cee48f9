use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use ledger_lite::{
    NewUser, PasswordHash, Transaction, TransactionType, create_transaction, create_user,
    initialize_db,
};

/// A utility for creating a test database for the REST API server of ledger_lite.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
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

    println!("Creating test user test@example.com with the password 'test'...");

    create_user(
        NewUser {
            email: "test@example.com".to_owned(),
            name: "Test User".to_owned(),
            password_hash: PasswordHash::new("test", PasswordHash::DEFAULT_COST)?,
        },
        &conn,
    )?;

    println!("Creating sample transactions...");

    let today = OffsetDateTime::now_utc().date();
    let samples = [
        ("Bread sales", 420.0, TransactionType::Income, 0),
        ("Catering order", 150.5, TransactionType::Income, 3),
        ("Flour", 85.2, TransactionType::Expense, 1),
        ("Butter and eggs", 42.75, TransactionType::Expense, 2),
        ("Paper bags", 12.0, TransactionType::Expense, 5),
    ];

    for (description, amount, transaction_type, days_ago) in samples {
        create_transaction(
            Transaction::build(
                description,
                amount,
                transaction_type,
                today - Duration::days(days_ago),
            ),
            &conn,
        )?;
    }

    println!("Success!");

    Ok(())
}
