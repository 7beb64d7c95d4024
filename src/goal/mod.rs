//! Savings goals and their progress.

mod db;
mod domain;
mod endpoints;

pub use db::{create_goal, create_goal_table, get_all_goals, update_goal_progress};
pub use domain::{FinancialGoal, GoalBuilder, GoalKind, NewGoal};
pub use endpoints::{
    create_goal_endpoint, get_goals_endpoint, pay_installment_endpoint,
    update_goal_progress_endpoint,
};
