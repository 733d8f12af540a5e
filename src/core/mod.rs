//! Transaction building blocks
//!
//! - `transaction`: signed transfer payloads and the `mhc_send` field set
//! - `history`: history request filters and limits

pub mod history;
pub mod transaction;

pub use history::{HistoryFilters, HISTORY_LIMIT};
pub use transaction::{
    assemble_transaction, build_signable_payload, delegate_command, undelegate_command, TxFields,
};
