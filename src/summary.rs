//! Totals over a list of transactions.
//!
//! Provides the income/expense/balance summary along with totals grouped by
//! category and by calendar month.

use std::collections::BTreeMap;

use serde::Serialize;
use time::Date;

use crate::{
    period::{first_day_of_month, month_abbrev},
    transaction::{Transaction, TransactionType},
};

/// The label used for transactions without a category.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// The total income and expenses of a set of transactions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Summary {
    pub income: f64,
    pub expense: f64,
    /// Income minus expenses.
    pub balance: f64,
}

impl Summary {
    /// Sum the amounts of `transactions` by type.
    pub fn from_transactions<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Self {
        let (income, expense) =
            transactions
                .into_iter()
                .fold((0.0, 0.0), |(income, expense), transaction| {
                    match transaction.kind {
                        TransactionType::Income => (income + transaction.amount, expense),
                        TransactionType::Expense => (income, expense + transaction.amount),
                    }
                });

        Self {
            income,
            expense,
            balance: income - expense,
        }
    }
}

/// The sum of one type of transaction for a single category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// The sum of one type of transaction for a single calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotal {
    /// The first day of the month.
    pub month: Date,
    /// The three-letter month name, e.g. "Jan".
    pub label: &'static str,
    pub total: f64,
}

/// Sums the amounts of the transactions of type `kind` per category.
///
/// Transactions without a category are grouped under [UNCATEGORIZED_LABEL].
///
/// # Returns
/// One total per category, sorted by category label.
pub fn totals_by_category(
    transactions: &[Transaction],
    kind: TransactionType,
) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();

    for transaction in transactions.iter().filter(|transaction| transaction.kind == kind) {
        let category = transaction
            .category
            .as_deref()
            .unwrap_or(UNCATEGORIZED_LABEL);
        *totals.entry(category).or_insert(0.0) += transaction.amount;
    }

    totals
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_owned(),
            total,
        })
        .collect()
}

/// Sums the amounts of the transactions of type `kind` per calendar month.
///
/// # Returns
/// One total per month that has at least one matching transaction, in
/// chronological order.
pub fn totals_by_month(transactions: &[Transaction], kind: TransactionType) -> Vec<MonthTotal> {
    let mut totals: BTreeMap<Date, f64> = BTreeMap::new();

    for transaction in transactions.iter().filter(|transaction| transaction.kind == kind) {
        let month = first_day_of_month(transaction.due_date);
        *totals.entry(month).or_insert(0.0) += transaction.amount;
    }

    totals
        .into_iter()
        .map(|(month, total)| MonthTotal {
            month,
            label: month_abbrev(month.month()),
            total,
        })
        .collect()
}
