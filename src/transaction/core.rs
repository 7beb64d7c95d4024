//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, database_id::TransactionId};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in, e.g. a salary.
    Income,
    /// Money going out, e.g. rent.
    Expense,
}

impl TransactionType {
    /// The string used for this type in JSON and in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(Error::InvalidTransactionType(other.to_owned())),
        }
    }
}

/// Where a transaction is in its payment lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Not paid yet and not past its due date.
    Pending,
    /// Settled.
    Paid,
    /// Not paid and past its due date.
    Overdue,
}

impl TransactionStatus {
    /// The string used for this status in JSON and in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
        }
    }
}

impl Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "overdue" => Ok(Self::Overdue),
            other => Err(Error::InvalidTransactionStatus(other.to_owned())),
        }
    }
}

/// An income or expense with a due date and a payment status.
///
/// To create a new `Transaction`, use [Transaction::build] and hand the
/// resulting [NewTransaction] to the store, which assigns the ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID assigned by the persistent store.
    pub id: TransactionId,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The magnitude of the transaction, always greater than zero.
    pub amount: f64,
    /// When the transaction is (or was) due.
    pub due_date: Date,
    /// Whether the transaction has been paid.
    pub status: TransactionStatus,
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// An optional free text label, e.g. "Groceries".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(description: &str, amount: f64, due_date: Date) -> TransactionBuilder {
        TransactionBuilder {
            description: description.to_owned(),
            amount,
            due_date,
            status: TransactionStatus::Pending,
            kind: TransactionType::Expense,
            category: None,
        }
    }
}

/// A builder for creating [NewTransaction] instances.
///
/// New transactions default to pending expenses without a category. Call
/// [TransactionBuilder::finalize] to validate the fields.
///
/// # Examples
///
/// ```
/// use time::macros::date;
///
/// use fintrack_rs::{Transaction, TransactionStatus, TransactionType};
///
/// let new_transaction = Transaction::build("Salary", 4200.0, date!(2025 - 01 - 15))
///     .kind(TransactionType::Income)
///     .status(TransactionStatus::Paid)
///     .category(Some("Work"))
///     .finalize()
///     .unwrap();
///
/// assert_eq!(new_transaction.category(), Some("Work"));
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    description: String,
    amount: f64,
    due_date: Date,
    status: TransactionStatus,
    kind: TransactionType,
    category: Option<String>,
}

impl TransactionBuilder {
    /// Set the status of the transaction.
    pub fn status(mut self, status: TransactionStatus) -> Self {
        self.status = status;
        self
    }

    /// Set whether the transaction is income or an expense.
    pub fn kind(mut self, kind: TransactionType) -> Self {
        self.kind = kind;
        self
    }

    /// Set the category label of the transaction.
    pub fn category(mut self, category: Option<&str>) -> Self {
        self.category = category.map(str::to_owned);
        self
    }

    /// Validate the fields and produce a [NewTransaction].
    ///
    /// The description is trimmed and a blank category is treated as no
    /// category.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::EmptyDescription] if the description is empty or whitespace,
    /// - or [Error::InvalidAmount] if the amount is not a finite number greater than zero.
    pub fn finalize(self) -> Result<NewTransaction, Error> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(Error::EmptyDescription);
        }

        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(Error::InvalidAmount(self.amount));
        }

        let category = self
            .category
            .map(|category| category.trim().to_owned())
            .filter(|category| !category.is_empty());

        Ok(NewTransaction {
            description: description.to_owned(),
            amount: self.amount,
            due_date: self.due_date,
            status: self.status,
            kind: self.kind,
            category,
        })
    }
}

/// The validated fields of a transaction that has not been assigned an ID.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    description: String,
    amount: f64,
    due_date: Date,
    status: TransactionStatus,
    kind: TransactionType,
    category: Option<String>,
}

impl NewTransaction {
    /// The trimmed, non-empty description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The amount, always greater than zero.
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// When the transaction is due.
    pub fn due_date(&self) -> Date {
        self.due_date
    }

    /// The payment status.
    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    /// Income or expense.
    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    /// The category label, if any.
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Attach an ID to these fields.
    pub fn with_id(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            description: self.description,
            amount: self.amount,
            due_date: self.due_date,
            status: self.status,
            kind: self.kind,
            category: self.category,
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

impl ToSql for TransactionStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for TransactionStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// Insert a transaction and return it with its generated ID.
pub fn create_transaction(
    new_transaction: &NewTransaction,
    connection: &Connection,
) -> Result<Transaction, rusqlite::Error> {
    connection
        .prepare(
            "INSERT INTO \"transaction\" (description, amount, due_date, status, type, category)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, description, amount, due_date, status, type, category",
        )?
        .query_row(
            (
                new_transaction.description(),
                new_transaction.amount(),
                new_transaction.due_date(),
                new_transaction.status(),
                new_transaction.kind(),
                new_transaction.category(),
            ),
            map_transaction_row,
        )
}

/// Retrieve all transactions ordered by due date, oldest first.
///
/// Transactions that share a due date are ordered by ID.
pub fn get_all_transactions(connection: &Connection) -> Result<Vec<Transaction>, rusqlite::Error> {
    connection
        .prepare(
            "SELECT id, description, amount, due_date, status, type, category
             FROM \"transaction\"
             ORDER BY due_date ASC, id ASC",
        )?
        .query_map([], map_transaction_row)?
        .collect()
}

/// Replace every field of the transaction `id`.
///
/// Returns the number of rows affected, zero if `id` does not exist.
pub fn update_transaction(
    id: TransactionId,
    new_transaction: &NewTransaction,
    connection: &Connection,
) -> Result<usize, rusqlite::Error> {
    connection.execute(
        "UPDATE \"transaction\"
         SET description = ?1, amount = ?2, due_date = ?3, status = ?4, type = ?5, category = ?6
         WHERE id = ?7",
        (
            new_transaction.description(),
            new_transaction.amount(),
            new_transaction.due_date(),
            new_transaction.status(),
            new_transaction.kind(),
            new_transaction.category(),
            id,
        ),
    )
}

/// Set only the status of the transaction `id`.
///
/// Returns the number of rows affected, zero if `id` does not exist.
pub fn update_transaction_status(
    id: TransactionId,
    status: TransactionStatus,
    connection: &Connection,
) -> Result<usize, rusqlite::Error> {
    connection.execute(
        "UPDATE \"transaction\" SET status = ?1 WHERE id = ?2",
        (status, id),
    )
}

/// Delete the transaction `id`.
///
/// Returns the number of rows affected, zero if `id` does not exist.
pub fn delete_transaction(
    id: TransactionId,
    connection: &Connection,
) -> Result<usize, rusqlite::Error> {
    connection.execute("DELETE FROM \"transaction\" WHERE id = ?1", [id])
}

/// Get the total number of transactions in the database.
#[cfg(test)]
pub fn count_transactions(connection: &Connection) -> Result<u32, rusqlite::Error> {
    connection.query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
        row.get(0)
    })
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            description TEXT NOT NULL CHECK (length(trim(description)) > 0),
            amount REAL NOT NULL CHECK (amount > 0),
            due_date TEXT NOT NULL,
            status TEXT NOT NULL CHECK (status IN ('pending', 'paid', 'overdue')),
            type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
            category TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_due_date ON \"transaction\"(due_date);",
    )
}

/// Map a database row to a Transaction.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let description = row.get(1)?;
    let amount = row.get(2)?;
    let due_date = row.get(3)?;
    let status = row.get(4)?;
    let kind = row.get(5)?;
    let category = row.get(6)?;

    Ok(Transaction {
        id,
        description,
        amount,
        due_date,
        status,
        kind,
        category,
    })
}

// ============================================================================
// TESTS
// ============================================================================
