//! Core goal domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize, Serializer};
use time::Date;

use crate::{Error, database_id::GoalId};

/// How a goal is meant to be paid off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GoalKind {
    /// Saved up for and paid in one go.
    OneTime,
    /// Paid off in a fixed number of equal installments.
    Installment,
}

impl GoalKind {
    /// The string used for this kind in JSON and in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneTime => "one-time",
            Self::Installment => "installment",
        }
    }
}

impl Display for GoalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "one-time" => Ok(Self::OneTime),
            "installment" => Ok(Self::Installment),
            other => Err(Error::InvalidGoalKind(other.to_owned())),
        }
    }
}

/// A savings target tracked via cumulative progress.
///
/// The JSON form also carries the derived `progressPercentage`.
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialGoal {
    pub id: GoalId,
    pub title: String,
    /// The amount at which the goal is complete.
    pub target_amount: f64,
    /// How much has been saved so far, never more than `target_amount`.
    pub current_amount: f64,
    pub deadline: Date,
    pub kind: GoalKind,
    /// The number of installments, only set for [GoalKind::Installment].
    pub installments: Option<u32>,
    /// `target_amount / installments`, only set for [GoalKind::Installment].
    pub installment_amount: Option<f64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GoalJson<'a> {
    id: GoalId,
    title: &'a str,
    target_amount: f64,
    current_amount: f64,
    deadline: Date,
    #[serde(rename = "type")]
    kind: GoalKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    installments: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    installment_amount: Option<f64>,
    progress_percentage: f64,
}

impl Serialize for FinancialGoal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        GoalJson {
            id: self.id,
            title: &self.title,
            target_amount: self.target_amount,
            current_amount: self.current_amount,
            deadline: self.deadline,
            kind: self.kind,
            installments: self.installments,
            installment_amount: self.installment_amount,
            progress_percentage: self.progress_percentage(),
        }
        .serialize(serializer)
    }
}

impl FinancialGoal {
    /// Create a new goal.
    ///
    /// Shortcut for [GoalBuilder] for discoverability.
    pub fn build(title: &str, target_amount: f64, deadline: Date) -> GoalBuilder {
        GoalBuilder {
            title: title.to_owned(),
            target_amount,
            current_amount: 0.0,
            deadline,
            kind: GoalKind::OneTime,
            installments: None,
        }
    }

    /// The amount saved after adding `delta`, clamped to the target.
    pub fn progressed_amount(&self, delta: f64) -> f64 {
        (self.current_amount + delta).min(self.target_amount)
    }

    /// How far along the goal is, from 0 to 100.
    pub fn progress_percentage(&self) -> f64 {
        (self.current_amount / self.target_amount * 100.0).min(100.0)
    }
}

/// Compute the size of each installment.
pub(super) fn installment_amount(target_amount: f64, installments: Option<u32>) -> Option<f64> {
    installments
        .filter(|&count| count > 0)
        .map(|count| target_amount / f64::from(count))
}

/// A builder for creating [NewGoal] instances.
///
/// Goals default to one-time goals with nothing saved yet.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalBuilder {
    title: String,
    target_amount: f64,
    current_amount: f64,
    deadline: Date,
    kind: GoalKind,
    installments: Option<u32>,
}

impl GoalBuilder {
    /// Set the amount already saved.
    pub fn current_amount(mut self, current_amount: f64) -> Self {
        self.current_amount = current_amount;
        self
    }

    /// Make this an installment goal split into `installments` payments.
    pub fn installments(mut self, installments: u32) -> Self {
        self.kind = GoalKind::Installment;
        self.installments = Some(installments);
        self
    }

    /// Set the kind and installment count directly, e.g. from a form.
    pub fn plan(mut self, kind: GoalKind, installments: Option<u32>) -> Self {
        self.kind = kind;
        self.installments = installments;
        self
    }

    /// Validate the fields and produce a [NewGoal].
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::EmptyGoalTitle] if the title is empty or whitespace,
    /// - [Error::InvalidTargetAmount] if the target is not a finite number greater than zero,
    /// - [Error::InvalidCurrentAmount] if the current amount is negative or above the target,
    /// - or [Error::InvalidInstallments] if an installment goal has no positive installment
    ///   count or a one-time goal has one.
    pub fn finalize(self) -> Result<NewGoal, Error> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(Error::EmptyGoalTitle);
        }

        if !self.target_amount.is_finite() || self.target_amount <= 0.0 {
            return Err(Error::InvalidTargetAmount(self.target_amount));
        }

        if !self.current_amount.is_finite()
            || self.current_amount < 0.0
            || self.current_amount > self.target_amount
        {
            return Err(Error::InvalidCurrentAmount(self.current_amount));
        }

        match (self.kind, self.installments) {
            (GoalKind::Installment, Some(count)) if count > 0 => {}
            (GoalKind::OneTime, None) => {}
            (_, installments) => return Err(Error::InvalidInstallments(installments)),
        }

        Ok(NewGoal {
            title: title.to_owned(),
            target_amount: self.target_amount,
            current_amount: self.current_amount,
            deadline: self.deadline,
            kind: self.kind,
            installments: self.installments,
        })
    }
}

/// The validated fields of a goal that has not been assigned an ID.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGoal {
    title: String,
    target_amount: f64,
    current_amount: f64,
    deadline: Date,
    kind: GoalKind,
    installments: Option<u32>,
}

impl NewGoal {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn target_amount(&self) -> f64 {
        self.target_amount
    }

    pub fn current_amount(&self) -> f64 {
        self.current_amount
    }

    pub fn deadline(&self) -> Date {
        self.deadline
    }

    pub fn kind(&self) -> GoalKind {
        self.kind
    }

    pub fn installments(&self) -> Option<u32> {
        self.installments
    }

    /// Attach an ID to these fields.
    pub fn with_id(self, id: GoalId) -> FinancialGoal {
        FinancialGoal {
            id,
            installment_amount: installment_amount(self.target_amount, self.installments),
            title: self.title,
            target_amount: self.target_amount,
            current_amount: self.current_amount,
            deadline: self.deadline,
            kind: self.kind,
            installments: self.installments,
        }
    }
}
