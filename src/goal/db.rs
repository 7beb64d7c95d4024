//! Database operations for goals.

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};

use crate::{
    Error,
    database_id::GoalId,
    goal::{FinancialGoal, GoalKind, NewGoal, domain::installment_amount},
};

impl ToSql for GoalKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for GoalKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// Create a goal and return it with its generated ID.
pub fn create_goal(
    new_goal: &NewGoal,
    connection: &Connection,
) -> Result<FinancialGoal, rusqlite::Error> {
    connection
        .prepare(
            "INSERT INTO goal (title, target_amount, current_amount, deadline, type, installments)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, title, target_amount, current_amount, deadline, type, installments",
        )?
        .query_row(
            (
                new_goal.title(),
                new_goal.target_amount(),
                new_goal.current_amount(),
                new_goal.deadline(),
                new_goal.kind(),
                new_goal.installments(),
            ),
            map_goal_row,
        )
}

/// Retrieve all goals ordered by deadline, soonest first.
pub fn get_all_goals(connection: &Connection) -> Result<Vec<FinancialGoal>, rusqlite::Error> {
    connection
        .prepare(
            "SELECT id, title, target_amount, current_amount, deadline, type, installments
             FROM goal
             ORDER BY deadline ASC, id ASC;",
        )?
        .query_map([], map_goal_row)?
        .collect()
}

/// Set the amount saved towards the goal `id`.
///
/// Returns the number of rows affected, zero if `id` does not exist.
pub fn update_goal_progress(
    id: GoalId,
    current_amount: f64,
    connection: &Connection,
) -> Result<usize, rusqlite::Error> {
    connection.execute(
        "UPDATE goal SET current_amount = ?1 WHERE id = ?2",
        (current_amount, id),
    )
}

/// Initialize the goal table and indexes.
pub fn create_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS goal (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL CHECK (length(trim(title)) > 0),
            target_amount REAL NOT NULL CHECK (target_amount > 0),
            current_amount REAL NOT NULL DEFAULT 0
                CHECK (current_amount >= 0 AND current_amount <= target_amount),
            deadline TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('one-time', 'installment')),
            installments INTEGER CHECK (installments IS NULL OR installments > 0)
        );

        CREATE INDEX IF NOT EXISTS idx_goal_deadline ON goal(deadline);",
    )
}

/// Map a database row to a goal, deriving the installment amount.
fn map_goal_row(row: &Row) -> Result<FinancialGoal, rusqlite::Error> {
    let id = row.get(0)?;
    let title = row.get(1)?;
    let target_amount = row.get(2)?;
    let current_amount = row.get(3)?;
    let deadline = row.get(4)?;
    let kind = row.get(5)?;
    let installments = row.get(6)?;

    Ok(FinancialGoal {
        id,
        title,
        target_amount,
        current_amount,
        deadline,
        kind,
        installments,
        installment_amount: installment_amount(target_amount, installments),
    })
}
