//! Expense ledger engine.
//!
//! Owns the `expenses` table: appends records, reads them back per user
//! (optionally from a cutoff), and removes the most recent one on undo.
//! [`summarize`] derives per-category totals from any set of records.

pub use amount::Amount;
pub use error::EngineError;
pub use expenses::Expense;
pub use ops::{Engine, EngineBuilder};
pub use summary::{CategoryTotal, Summary, summarize};

mod amount;
mod error;
mod expenses;
mod locks;
mod ops;
mod summary;

type ResultEngine<T> = Result<T, EngineError>;
