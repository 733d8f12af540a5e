//! # metahash-client
//!
//! Client library for the MetaHash network: key handling, addresses,
//! transaction signing and JSON-RPC calls to proxy and torrent nodes.
//!
//! ## Layout
//! - `utils/`: hashing, hex helpers and the variable-width integer codec
//! - `wallet/`: key pairs on secp256r1/secp256k1, signatures, addresses
//! - `core/`: the signed transfer payload and history filters
//! - `network/`: DNS based node discovery and the HTTP transport
//! - `config/`: per-client settings, defaults and `METAHASH_*` overrides
//! - `client/`: `MetaHashClient`, one method per node API call
//! - `cli/`: argument parsing for the `metahash` binary
//!
//! ## Example
//! ```no_run
//! use metahash_client::{ClientConfig, MetaHashClient, Network};
//!
//! let mut client = MetaHashClient::new(ClientConfig::new(Network::Test))?;
//! let keys = client.generate_key()?;
//! let balance = client.fetch_balance(keys.get_address())?;
//! println!("{} has {}", keys.get_address(), balance.available());
//! # Ok::<(), metahash_client::MetahashError>(())
//! ```
//!
//! Keys and addresses work offline; only `MetaHashClient` calls touch the
//! network, and the endpoint for each node role is resolved once per client.

pub mod cli;
pub mod client;
pub mod config;
pub mod core;
pub mod error;
pub mod network;
pub mod utils;
pub mod wallet;

// Re-export commonly used types for convenience
pub use cli::{Command, Opt};
pub use client::{Balance, MetaHashClient, TxReceipt};
pub use config::ClientConfig;
pub use self::core::{assemble_transaction, build_signable_payload, HistoryFilters, TxFields};
pub use error::{MetahashError, Result};
pub use network::{Network, NodeEndpoint, NodeResolver, NodeRole, SelectionPolicy, Transport};
pub use utils::{decode_var_uint, encode_integer, encode_var_uint};
pub use wallet::{
    derive_address, derive_public_key, generate_key_pair, is_valid_signature, sign,
    validate_address, verify, KeyPair, KeyType,
};
