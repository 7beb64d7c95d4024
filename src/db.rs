//! Creates the SQLite tables used by [SqliteRemoteStore](crate::SqliteRemoteStore).

use rusqlite::{Connection, Error};

use crate::{goal::create_goal_table, transaction::create_transaction_table};

/// Create all of the database tables for the application.
///
/// Tables are only created if they do not already exist, so this is safe to
/// call on an existing database.
///
/// # Errors
/// Returns an error if a table cannot be created or there is some other SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = connection.unchecked_transaction()?;

    create_transaction_table(&transaction)?;
    create_goal_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
