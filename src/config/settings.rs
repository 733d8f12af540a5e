use crate::error::{MetahashError, Result};
use crate::network::{Network, NodeProfile, NodeRole, SelectionPolicy};
use crate::wallet::KeyType;
use std::env;
use std::time::Duration;

const NETWORK_KEY: &str = "METAHASH_NETWORK";
const PROXY_URL_KEY: &str = "METAHASH_PROXY_URL";
const TORRENT_URL_KEY: &str = "METAHASH_TORRENT_URL";
const KEY_TYPE_KEY: &str = "METAHASH_KEY_TYPE";
const RPC_TIMEOUT_KEY: &str = "METAHASH_RPC_TIMEOUT_SECS";
const SELECTION_KEY: &str = "METAHASH_SELECTION";

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(300);
const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Settings for one client instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub network: Network,
    pub key_type: KeyType,
    pub proxy: NodeProfile,
    pub torrent: NodeProfile,
    pub selection: SelectionPolicy,
    pub connect_timeout: Duration,
    pub rpc_timeout: Duration,
    pub probe_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            network: Network::default(),
            key_type: KeyType::default(),
            proxy: NodeRole::Proxy.default_profile(),
            torrent: NodeRole::Torrent.default_profile(),
            selection: SelectionPolicy::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            rpc_timeout: DEFAULT_RPC_TIMEOUT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            ..Self::default()
        }
    }

    /// Defaults overridden by `METAHASH_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(network) = lookup(NETWORK_KEY) {
            config.network = network.parse()?;
        }
        if let Some(key_type) = lookup(KEY_TYPE_KEY) {
            config.key_type = key_type.parse()?;
        }
        if let Some(url) = lookup(PROXY_URL_KEY) {
            config.proxy = parse_profile(&url, config.proxy.port)?;
        }
        if let Some(url) = lookup(TORRENT_URL_KEY) {
            config.torrent = parse_profile(&url, config.torrent.port)?;
        }
        if let Some(selection) = lookup(SELECTION_KEY) {
            config.selection = selection.parse()?;
        }
        if let Some(secs) = lookup(RPC_TIMEOUT_KEY) {
            let secs = secs.trim().parse::<u64>().map_err(|e| {
                MetahashError::Config(format!("{RPC_TIMEOUT_KEY} must be whole seconds: {e}"))
            })?;
            config.rpc_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn profile(&self, role: NodeRole) -> &NodeProfile {
        match role {
            NodeRole::Proxy => &self.proxy,
            NodeRole::Torrent => &self.torrent,
        }
    }
}

/// `template[:port]`, e.g. `proxy.net-%s.example.org:9999`
fn parse_profile(value: &str, default_port: u16) -> Result<NodeProfile> {
    let value = value.trim();
    if value.is_empty() {
        return Err(MetahashError::Config("Empty node URL template".to_string()));
    }
    match value.rsplit_once(':') {
        Some((template, port)) => {
            let port = port
                .parse::<u16>()
                .map_err(|e| MetahashError::Config(format!("Invalid port in '{value}': {e}")))?;
            Ok(NodeProfile::new(template, port))
        }
        None => Ok(NodeProfile::new(value, default_port)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(values: &[(&str, &str)]) -> Result<ClientConfig> {
        let map: HashMap<String, String> = values
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.network, Network::Main);
        assert_eq!(config.key_type, KeyType::Secp256r1);
        assert_eq!(config.proxy.port, 9999);
        assert_eq!(config.torrent.port, 5795);
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.probe_timeout, Duration::from_secs(1));
        assert_eq!(config.selection, SelectionPolicy::FirstResponder);
    }

    #[test]
    fn test_overrides() {
        let config = from_map(&[
            (NETWORK_KEY, "test"),
            (KEY_TYPE_KEY, "secp256k1"),
            (PROXY_URL_KEY, "proxy.%s.local:8080"),
            (TORRENT_URL_KEY, "tor.%s.local"),
            (SELECTION_KEY, "highest"),
            (RPC_TIMEOUT_KEY, "30"),
        ])
        .unwrap();
        assert_eq!(config.network, Network::Test);
        assert_eq!(config.key_type, KeyType::Secp256k1);
        assert_eq!(config.proxy, NodeProfile::new("proxy.%s.local", 8080));
        assert_eq!(config.torrent, NodeProfile::new("tor.%s.local", 5795));
        assert_eq!(config.selection, SelectionPolicy::HighestBlock);
        assert_eq!(config.rpc_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            from_map(&[(NETWORK_KEY, "staging")]),
            Err(MetahashError::Config(_))
        ));
        assert!(from_map(&[(PROXY_URL_KEY, "proxy.%s.local:http")]).is_err());
        assert!(from_map(&[(RPC_TIMEOUT_KEY, "soon")]).is_err());
    }
}
