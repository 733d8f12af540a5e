//! High-level client
//!
//! `MetaHashClient` ties node resolution, the transport and transaction
//! signing together behind one method per node API call.

pub mod metahash;

pub use metahash::{Balance, MetaHashClient, TxReceipt};
