/*!
 * Codec Module
 * Transaction serialization, reassembly, merge, and response validation
 */

pub mod check;
pub mod fragment;
pub mod merge;
pub mod transaction;

// Re-export public API
pub use check::{Expected, Policy, ResponseChecker};
pub use fragment::{recv_transaction, send_transaction};
pub use merge::{can_merge, merge};
pub use transaction::Transaction;
