use crate::error::{MetahashError, Result};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fmt;
use std::net::{IpAddr, ToSocketAddrs};
use std::str::FromStr;

pub const PROXY_URL_TEMPLATE: &str = "proxy.net-%s.metahashnetwork.com";
pub const PROXY_PORT: u16 = 9999;
pub const TORRENT_URL_TEMPLATE: &str = "tor.net-%s.metahashnetwork.com";
pub const TORRENT_PORT: u16 = 5795;

/// The two kinds of node a client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    /// Accepts signed transactions
    Proxy,
    /// Serves balance, history and block queries
    Torrent,
}

impl NodeRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeRole::Proxy => "PROXY",
            NodeRole::Torrent => "TORRENT",
        }
    }

    pub fn default_profile(&self) -> NodeProfile {
        match self {
            NodeRole::Proxy => NodeProfile::new(PROXY_URL_TEMPLATE, PROXY_PORT),
            NodeRole::Torrent => NodeProfile::new(TORRENT_URL_TEMPLATE, TORRENT_PORT),
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeRole {
    type Err = MetahashError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "PROXY" => Ok(NodeRole::Proxy),
            "TORRENT" => Ok(NodeRole::Torrent),
            _ => Err(MetahashError::UnknownRole(s.to_string())),
        }
    }
}

/// Public MetaHash networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Network {
    #[default]
    Main,
    Test,
    Dev,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Main => "main",
            Network::Test => "test",
            Network::Dev => "dev",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = MetahashError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "main" => Ok(Network::Main),
            "test" => Ok(Network::Test),
            "dev" => Ok(Network::Dev),
            other => Err(MetahashError::Config(format!(
                "Unknown network: {other}. Valid options: main, test, dev"
            ))),
        }
    }
}

/// DNS name template (`%s` is replaced by the network name) and port for a role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeProfile {
    pub url_template: String,
    pub port: u16,
}

impl NodeProfile {
    pub fn new(url_template: &str, port: u16) -> Self {
        Self {
            url_template: url_template.to_string(),
            port,
        }
    }

    pub fn host_name(&self, network: &str) -> String {
        self.url_template.replace("%s", network)
    }
}

/// A node that answered the liveness probe
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeEndpoint {
    pub role: NodeRole,
    pub network: String,
    pub host: String,
    pub port: u16,
}

impl NodeEndpoint {
    /// `host:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.address())
    }
}

/// Resolves a DNS name to its IPv4 records, in the order the resolver returned them
pub trait HostLookup: Send {
    fn lookup(&self, host_name: &str, port: u16) -> Result<Vec<IpAddr>>;
}

/// Lookup through the operating system resolver
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLookup;

impl HostLookup for SystemLookup {
    fn lookup(&self, host_name: &str, port: u16) -> Result<Vec<IpAddr>> {
        let host_with_port = format!("{host_name}:{port}");
        let addresses = host_with_port.to_socket_addrs().map_err(|e| {
            MetahashError::NodeUnavailable(format!("DNS resolution failed for '{host_name}': {e}"))
        })?;

        let mut ips: Vec<IpAddr> = vec![];
        for addr in addresses {
            let ip = addr.ip();
            if ip.is_ipv4() && !ips.contains(&ip) {
                ips.push(ip);
            }
        }
        Ok(ips)
    }
}

/// Decides whether a candidate node is worth talking to
pub trait LivenessProbe: Send {
    fn is_alive(&self, endpoint: &NodeEndpoint) -> bool;

    /// Chain height reported by the node, when the probe can ask for it
    fn count_blocks(&self, _endpoint: &NodeEndpoint) -> Option<u64> {
        None
    }
}

/// How to choose among live candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// First candidate in DNS order that answers the probe
    #[default]
    FirstResponder,
    /// Torrent candidate reporting the most blocks; ties go to DNS order.
    /// Proxies still use the first responder.
    HighestBlock,
}

impl FromStr for SelectionPolicy {
    type Err = MetahashError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "first" | "first-responder" => Ok(SelectionPolicy::FirstResponder),
            "highest" | "highest-block" => Ok(SelectionPolicy::HighestBlock),
            other => Err(MetahashError::Config(format!(
                "Unknown selection policy: {other}. Valid options: first, highest"
            ))),
        }
    }
}

/// Where resolution stands for one role on one network
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionState {
    Unresolved,
    Resolving,
    Resolved(NodeEndpoint),
    /// Last attempt failed; the next `resolve` tries again
    Failed(String),
}

/// Maps a node role to a live endpoint and remembers the answer
pub struct NodeResolver {
    proxy: NodeProfile,
    torrent: NodeProfile,
    policy: SelectionPolicy,
    lookup: Box<dyn HostLookup>,
    probe: Box<dyn LivenessProbe>,
    states: HashMap<(NodeRole, String), ResolutionState>,
}

impl NodeResolver {
    pub fn new(lookup: Box<dyn HostLookup>, probe: Box<dyn LivenessProbe>) -> Self {
        Self {
            proxy: NodeRole::Proxy.default_profile(),
            torrent: NodeRole::Torrent.default_profile(),
            policy: SelectionPolicy::default(),
            lookup,
            probe,
            states: HashMap::new(),
        }
    }

    pub fn with_profile(mut self, role: NodeRole, profile: NodeProfile) -> Self {
        match role {
            NodeRole::Proxy => self.proxy = profile,
            NodeRole::Torrent => self.torrent = profile,
        }
        self
    }

    pub fn with_policy(mut self, policy: SelectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn profile(&self, role: NodeRole) -> &NodeProfile {
        match role {
            NodeRole::Proxy => &self.proxy,
            NodeRole::Torrent => &self.torrent,
        }
    }

    pub fn state(&self, role: NodeRole, network: &str) -> ResolutionState {
        self.states
            .get(&(role, network.to_string()))
            .cloned()
            .unwrap_or(ResolutionState::Unresolved)
    }

    pub fn cached(&self, role: NodeRole, network: &str) -> Option<&NodeEndpoint> {
        match self.states.get(&(role, network.to_string())) {
            Some(ResolutionState::Resolved(endpoint)) => Some(endpoint),
            _ => None,
        }
    }

    /// Forget a cached endpoint, e.g. after the node stopped answering
    pub fn invalidate(&mut self, role: NodeRole, network: &str) {
        self.states.remove(&(role, network.to_string()));
    }

    /// Resolve a role given by name (`PROXY` or `TORRENT`)
    pub fn resolve_named(&mut self, role: &str, network: &str) -> Result<NodeEndpoint> {
        let role = role.parse::<NodeRole>()?;
        self.resolve(role, network)
    }

    /// Cached endpoint if there is one, otherwise DNS lookup plus probing
    pub fn resolve(&mut self, role: NodeRole, network: &str) -> Result<NodeEndpoint> {
        if let Some(endpoint) = self.cached(role, network) {
            debug!("Using cached {role} node {}", endpoint.address());
            return Ok(endpoint.clone());
        }

        let key = (role, network.to_string());
        self.states.insert(key.clone(), ResolutionState::Resolving);

        match self.discover(role, network) {
            Ok(endpoint) => {
                info!("Resolved {role} node for '{network}' to {}", endpoint.address());
                self.states
                    .insert(key, ResolutionState::Resolved(endpoint.clone()));
                Ok(endpoint)
            }
            Err(e) => {
                warn!("Failed to resolve {role} node for '{network}': {e}");
                self.states.insert(key, ResolutionState::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    fn discover(&self, role: NodeRole, network: &str) -> Result<NodeEndpoint> {
        let profile = self.profile(role);
        let host_name = profile.host_name(network);
        info!("Resolving {role} nodes via {host_name}");

        let candidates: Vec<NodeEndpoint> = self
            .lookup
            .lookup(&host_name, profile.port)?
            .into_iter()
            .map(|ip| NodeEndpoint {
                role,
                network: network.to_string(),
                host: ip.to_string(),
                port: profile.port,
            })
            .collect();

        if candidates.is_empty() {
            return Err(MetahashError::NodeUnavailable(format!(
                "DNS returned no records for {host_name}"
            )));
        }

        // Height ranking only applies to torrent nodes
        let selected = match (self.policy, role) {
            (SelectionPolicy::HighestBlock, NodeRole::Torrent) => self.highest_block(candidates),
            _ => self.first_responder(candidates),
        };

        selected.ok_or_else(|| {
            MetahashError::NodeUnavailable(format!(
                "None of the {role} nodes behind {host_name} answered. Maybe you have problems with DNS."
            ))
        })
    }

    fn first_responder(&self, candidates: Vec<NodeEndpoint>) -> Option<NodeEndpoint> {
        candidates.into_iter().find(|candidate| {
            let alive = self.probe.is_alive(candidate);
            if !alive {
                warn!("Node {} is not reachable", candidate.address());
            }
            alive
        })
    }

    fn highest_block(&self, candidates: Vec<NodeEndpoint>) -> Option<NodeEndpoint> {
        let mut best: Option<(NodeEndpoint, u64)> = None;
        for candidate in candidates {
            if !self.probe.is_alive(&candidate) {
                warn!("Node {} is not reachable", candidate.address());
                continue;
            }
            let height = self.probe.count_blocks(&candidate).unwrap_or(0);
            debug!("Node {} reports {height} blocks", candidate.address());
            if best.as_ref().map_or(true, |(_, best_height)| height > *best_height) {
                best = Some((candidate, height));
            }
        }
        best.map(|(endpoint, _)| endpoint)
    }
}
