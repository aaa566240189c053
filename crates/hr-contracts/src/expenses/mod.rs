//! Expense contracts

pub mod create;
pub mod update;

pub use create::{CreateExpenseContract, CreateExpenseRequest, NewExpense};
pub use update::{ExpenseChanges, UpdateExpenseContract, UpdateExpenseRequest};

/// Longest free-text description accepted on an expense
pub const MAX_DESCRIPTION_LENGTH: usize = 500;
