//! Transaction management.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing, querying, and managing transactions
//! - JSON endpoints for reading and changing transactions

mod core;
mod endpoints;

pub use core::{
    NewTransaction, Transaction, TransactionBuilder, TransactionStatus, TransactionType,
    create_transaction, create_transaction_table, delete_transaction, get_all_transactions,
    update_transaction, update_transaction_status,
};
pub use endpoints::{
    create_transaction_endpoint, delete_transaction_endpoint, get_filtered_transactions_endpoint,
    get_transaction_endpoint, get_transactions_endpoint, update_transaction_endpoint,
    update_transaction_status_endpoint,
};

#[cfg(test)]
pub use core::count_transactions;
