//! The transaction filter and the predicate it applies.
//!
//! A filter never changes the transactions it is applied to. Every field that
//! is not `all` (or, for the date bounds, not `null`) must match for a
//! transaction to pass, and the order of the input is preserved.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::Date;

use crate::{
    period::Period,
    transaction::{Transaction, TransactionStatus, TransactionType},
};

/// Either every value, or exactly one value.
///
/// Serialized as the string `"all"` or as the value itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selection<T> {
    All,
    Only(T),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Self::All
    }
}

impl<T: PartialEq> Selection<T> {
    /// Whether `value` is selected.
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Self::All => true,
            Self::Only(selected) => selected == value,
        }
    }

    /// Whether an optional `value` is selected. A missing value only matches [Selection::All].
    pub fn matches_option(&self, value: Option<&T>) -> bool {
        match (self, value) {
            (Self::All, _) => true,
            (Self::Only(selected), Some(value)) => selected == value,
            (Self::Only(_), None) => false,
        }
    }
}

impl<T: FromStr> FromStr for Selection<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

impl<T: Display> Serialize for Selection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::All => serializer.serialize_str("all"),
            Self::Only(value) => serializer.collect_str(value),
        }
    }
}

impl<'de, T> Deserialize<'de> for Selection<T>
where
    T: FromStr,
    T::Err: Display,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;

        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Narrows the transaction list shown to the user.
///
/// The default filter lets every transaction through.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionFilter {
    #[serde(rename = "type")]
    pub kind: Selection<TransactionType>,
    pub status: Selection<TransactionStatus>,
    pub category: Selection<String>,
    /// Inclusive lower bound on the due date.
    pub date_from: Option<Date>,
    /// Inclusive upper bound on the due date.
    pub date_to: Option<Date>,
    /// The preset the date bounds were derived from.
    pub period: Period,
}

impl TransactionFilter {
    /// Set `period` and replace the date bounds with the ones it resolves to
    /// relative to `today`. The other fields are kept.
    pub fn with_period(self, period: Period, today: Date) -> Self {
        let range = period.resolve(today);

        Self {
            date_from: range.map(|range| range.start),
            date_to: range.map(|range| range.end),
            period,
            ..self
        }
    }

    /// Whether `transaction` passes every active field of the filter.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.kind.matches(&transaction.kind)
            && self.status.matches(&transaction.status)
            && self
                .category
                .matches_option(transaction.category.as_ref())
            && self
                .date_from
                .is_none_or(|date_from| transaction.due_date >= date_from)
            && self
                .date_to
                .is_none_or(|date_to| transaction.due_date <= date_to)
    }

    /// The transactions that pass the filter, in their original order.
    pub fn apply<'a>(&self, transactions: &'a [Transaction]) -> Vec<&'a Transaction> {
        transactions
            .iter()
            .filter(|transaction| self.matches(transaction))
            .collect()
    }
}
