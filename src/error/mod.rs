//! Error handling for the MetaHash client
//!
//! Every fallible operation in the crate returns [`Result`]. Checks that have a
//! natural yes/no answer (address checksums, signature checks through the
//! boolean wrapper) return `bool` instead and never produce these errors.

use std::fmt;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, MetahashError>;

/// Error types for encoding, key handling, node discovery and RPC calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetahashError {
    /// Value outside the representable range or odd-length data
    Encoding(String),
    /// Malformed hex, DER key, DER signature or curve point
    Parse(String),
    /// Address failed checksum validation where a hard failure is required
    InvalidAddress(String),
    /// DNS lookup returned nothing or no candidate answered the probe
    NodeUnavailable(String),
    /// Node role string that is neither PROXY nor TORRENT
    UnknownRole(String),
    /// HTTP level failure talking to a node
    Transport(String),
    /// Node answered with a JSON-RPC error object
    Rpc(String),
    /// JSON encoding/decoding errors
    Serialization(String),
    /// Request arguments the node would reject
    InvalidRequest(String),
    /// Configuration errors
    Config(String),
    /// Signing or key generation failures inside the curve backend
    Crypto(String),
    /// Local I/O errors (DNS lookup through the system resolver)
    Io(String),
}

impl fmt::Display for MetahashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetahashError::Encoding(msg) => write!(f, "Encoding error: {msg}"),
            MetahashError::Parse(msg) => write!(f, "Parse error: {msg}"),
            MetahashError::InvalidAddress(addr) => write!(f, "Invalid address: {addr}"),
            MetahashError::NodeUnavailable(msg) => write!(f, "Node unavailable: {msg}"),
            MetahashError::UnknownRole(role) => write!(f, "Unknown node type: {role}"),
            MetahashError::Transport(msg) => write!(f, "Transport error: {msg}"),
            MetahashError::Rpc(msg) => write!(f, "RPC error: {msg}"),
            MetahashError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            MetahashError::InvalidRequest(msg) => write!(f, "Invalid request: {msg}"),
            MetahashError::Config(msg) => write!(f, "Configuration error: {msg}"),
            MetahashError::Crypto(msg) => write!(f, "Cryptographic error: {msg}"),
            MetahashError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for MetahashError {}

impl From<std::io::Error> for MetahashError {
    fn from(err: std::io::Error) -> Self {
        MetahashError::Io(err.to_string())
    }
}

impl From<hex::FromHexError> for MetahashError {
    fn from(err: hex::FromHexError) -> Self {
        MetahashError::Parse(format!("Invalid hex: {err}"))
    }
}

impl From<serde_json::Error> for MetahashError {
    fn from(err: serde_json::Error) -> Self {
        MetahashError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for MetahashError {
    fn from(err: reqwest::Error) -> Self {
        MetahashError::Transport(err.to_string())
    }
}
