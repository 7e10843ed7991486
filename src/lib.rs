//! Measures what lock granularity costs on a shared account under
//! concurrent updates: one mutex around the whole ledger versus one mutex
//! per field, timed across a matrix of thread and transaction counts.

pub mod ledger;
pub mod mutex;
pub mod report;
pub mod runner;
pub mod txn;

pub use ledger::{CoarseLedger, FineLedger, INITIAL_BALANCE, Ledger, Snapshot};
pub use report::{DEFAULT_MATRIX, ReportError, Strategy, write_report};
pub use runner::{Config, RunError, run, run_with};
pub use txn::{Kind, Transaction};
