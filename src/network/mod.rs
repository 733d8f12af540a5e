//! Node discovery and transport
//!
//! This module finds live proxy/torrent nodes through DNS and a liveness
//! probe, and carries JSON-RPC requests to them over HTTP.

pub mod resolver;
pub mod transport;

pub use resolver::{
    HostLookup, LivenessProbe, Network, NodeEndpoint, NodeProfile, NodeResolver, NodeRole,
    ResolutionState, SelectionPolicy, SystemLookup, PROXY_PORT, TORRENT_PORT,
};
pub use transport::{HttpTransport, RpcRequest, RpcResponse, Transport};
