use crate::config::ClientConfig;
use crate::core::{
    assemble_transaction, delegate_command, undelegate_command, HistoryFilters, TxFields,
    HISTORY_LIMIT,
};
use crate::error::{MetahashError, Result};
use crate::network::{
    HostLookup, HttpTransport, LivenessProbe, Network, NodeEndpoint, NodeResolver, NodeRole,
    RpcRequest, RpcResponse, SystemLookup, Transport,
};
use crate::wallet::{
    ensure_valid_address, validate_address, KeyPair, SecretKey, DEFAULT_NETWORK_PREFIX,
};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

const PROXY_API_VERSION: &str = "2.0";

/// `fetch-balance` result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Balance {
    pub address: String,
    pub received: u64,
    pub spent: u64,
    pub count_received: u64,
    pub count_spent: u64,
    pub count_txs: u64,
    pub block_number: u64,
    #[serde(rename = "currentBlock")]
    pub current_block: u64,
    /// Delegation and forging counters the node adds
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Balance {
    pub fn available(&self) -> u64 {
        self.received.saturating_sub(self.spent)
    }

    /// Nonce the next outgoing transaction from this address must carry
    pub fn next_nonce(&self) -> Result<u64> {
        self.count_spent.checked_add(1).ok_or_else(|| {
            MetahashError::InvalidRequest(format!(
                "Address {} has no nonce left after {} spends",
                self.address, self.count_spent
            ))
        })
    }
}

/// Proxy answer to `mhc_send` together with what was sent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TxReceipt {
    pub tx: TxFields,
    pub result: Value,
    /// Transaction hash, when the proxy accepted the transaction
    pub hash: Option<String>,
}

/// Client for MetaHash proxy and torrent nodes
///
/// Endpoints are resolved on first use and kept for the lifetime of the
/// client. Calls block until the node answers or the timeouts expire.
pub struct MetaHashClient {
    config: ClientConfig,
    resolver: NodeResolver,
    transport: Box<dyn Transport>,
}

impl MetaHashClient {
    /// Client with system DNS and the HTTP transport
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_parts(
            config,
            Box::new(SystemLookup),
            Box::new(transport.clone()),
            Box::new(transport),
        ))
    }

    pub fn with_parts(
        config: ClientConfig,
        lookup: Box<dyn HostLookup>,
        probe: Box<dyn LivenessProbe>,
        transport: Box<dyn Transport>,
    ) -> Self {
        let resolver = NodeResolver::new(lookup, probe)
            .with_profile(NodeRole::Proxy, config.profile(NodeRole::Proxy).clone())
            .with_profile(NodeRole::Torrent, config.profile(NodeRole::Torrent).clone())
            .with_policy(config.selection);
        Self {
            config,
            resolver,
            transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn network(&self) -> Network {
        self.config.network
    }

    /// Switch networks; endpoints for the new network are resolved on next use
    pub fn set_network(&mut self, network: Network) {
        self.config.network = network;
    }

    pub fn generate_key(&self) -> Result<KeyPair> {
        KeyPair::generate(self.config.key_type)
    }

    pub fn check_address(&self, address: &str) -> bool {
        validate_address(address)
    }

    pub fn endpoint(&mut self, role: NodeRole) -> Result<NodeEndpoint> {
        let network = self.config.network.as_str();
        self.resolver.resolve(role, network)
    }

    /// Call a torrent node method and return its `result`
    pub fn query_torrent(&mut self, method: &str, params: Value) -> Result<Value> {
        let request = RpcRequest::new(method, params)?;
        Ok(self.call(NodeRole::Torrent, &request)?.result)
    }

    fn query_proxy(&mut self, method: &str, params: Value) -> Result<RpcResponse> {
        let request = RpcRequest::new(method, params)?.with_version(PROXY_API_VERSION);
        self.call(NodeRole::Proxy, &request)
    }

    fn call(&mut self, role: NodeRole, request: &RpcRequest) -> Result<RpcResponse> {
        let endpoint = self.endpoint(role)?;
        let body = self.transport.post(&endpoint, request)?;
        RpcResponse::parse(&body)
    }

    pub fn fetch_balance(&mut self, address: &str) -> Result<Balance> {
        ensure_valid_address(address)?;
        let result = self.query_torrent("fetch-balance", json!({ "address": address }))?;
        Ok(serde_json::from_value(result)?)
    }

    pub fn fetch_balances(&mut self, addresses: &[&str]) -> Result<Vec<Balance>> {
        for address in addresses {
            ensure_valid_address(address)?;
        }
        let result = self.query_torrent("fetch-balances", json!({ "addresses": addresses }))?;
        Ok(serde_json::from_value(result)?)
    }

    /// Up to `count_tx` transactions starting at `begin_tx`
    pub fn fetch_history(&mut self, address: &str, begin_tx: u64, count_tx: u64) -> Result<Value> {
        ensure_valid_address(address)?;
        check_history_limit(count_tx)?;
        self.query_torrent(
            "fetch-history",
            json!({ "address": address, "beginTx": begin_tx, "countTxs": count_tx }),
        )
    }

    pub fn fetch_history_filter(
        &mut self,
        address: &str,
        filters: &HistoryFilters,
        begin_tx: u64,
        count_tx: u64,
    ) -> Result<Value> {
        ensure_valid_address(address)?;
        check_history_limit(count_tx)?;
        self.query_torrent(
            "fetch-history-filter",
            json!({
                "address": address,
                "filters": filters,
                "beginTx": begin_tx,
                "countTxs": count_tx,
            }),
        )
    }

    pub fn get_tx(&mut self, hash: &str) -> Result<Value> {
        self.query_torrent("get-tx", json!({ "hash": hash }))
    }

    pub fn get_block_by_number(&mut self, number: u64, block_type: u8) -> Result<Value> {
        self.query_torrent(
            "get-block-by-number",
            json!({ "number": number, "type": block_type }),
        )
    }

    pub fn get_block_by_hash(&mut self, hash: &str, block_type: u8) -> Result<Value> {
        self.query_torrent(
            "get-block-by-hash",
            json!({ "hash": hash, "type": block_type }),
        )
    }

    pub fn get_blocks(&mut self, count_blocks: u64, begin_block: u64) -> Result<Value> {
        self.query_torrent(
            "get-blocks",
            json!({ "countBlocks": count_blocks, "beginBlock": begin_block }),
        )
    }

    pub fn get_dump_block_by_number(&mut self, number: u64, is_hex: bool) -> Result<Value> {
        self.query_torrent(
            "get-dump-block-by-number",
            json!({ "number": number, "isHex": is_hex }),
        )
    }

    pub fn get_dump_block_by_hash(&mut self, hash: &str, is_hex: bool) -> Result<Value> {
        self.query_torrent(
            "get-dump-block-by-hash",
            json!({ "hash": hash, "isHex": is_hex }),
        )
    }

    pub fn get_last_txs(&mut self) -> Result<Value> {
        self.query_torrent("get-last-txs", json!({}))
    }

    pub fn get_count_blocks(&mut self) -> Result<u64> {
        let result = self.query_torrent("get-count-blocks", json!({}))?;
        result
            .get("count_blocks")
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                MetahashError::Serialization("get-count-blocks answer has no count_blocks".into())
            })
    }

    pub fn get_address_delegations(
        &mut self,
        address: &str,
        begin_tx: u64,
        count_tx: u64,
    ) -> Result<Value> {
        ensure_valid_address(address)?;
        self.query_torrent(
            "get-address-delegations",
            json!({ "address": address, "beginTx": begin_tx, "countTxs": count_tx }),
        )
    }

    pub fn status(&mut self) -> Result<Value> {
        self.query_torrent("status", json!({}))
    }

    /// Proxy node information
    pub fn get_info(&mut self) -> Result<Value> {
        Ok(self.query_proxy("getinfo", json!({}))?.result)
    }

    /// `count_spent + 1` for the address
    pub fn get_nonce(&mut self, address: &str) -> Result<u64> {
        self.fetch_balance(address)?.next_nonce()
    }

    /// Sign and submit a transfer. Without an explicit nonce the sender's
    /// next nonce is fetched from a torrent node first.
    pub fn send_tx(
        &mut self,
        private_key_hex: &str,
        to_address: &str,
        value: u64,
        fee: u64,
        data: &str,
        nonce: Option<u64>,
    ) -> Result<TxReceipt> {
        let nonce = match nonce {
            Some(nonce) => nonce,
            None => {
                let sender = SecretKey::from_hex(private_key_hex)?
                    .public_key()
                    .address(DEFAULT_NETWORK_PREFIX);
                self.get_nonce(&sender)?
            }
        };

        let tx = assemble_transaction(private_key_hex, to_address, value, fee, nonce, data)?;
        info!("Submitting transfer of {value} to {to_address} with nonce {nonce}");

        let response = self.query_proxy("mhc_send", serde_json::to_value(&tx)?)?;
        let hash = response.params.as_str().map(str::to_string);
        Ok(TxReceipt {
            tx,
            result: response.result,
            hash,
        })
    }

    /// Delegate `value` to the node at `node_address`
    pub fn delegate(
        &mut self,
        private_key_hex: &str,
        node_address: &str,
        value: u64,
        fee: u64,
        nonce: Option<u64>,
    ) -> Result<TxReceipt> {
        let command = delegate_command(value);
        self.send_tx(private_key_hex, node_address, 0, fee, &command, nonce)
    }

    /// Withdraw the delegation held by the node at `node_address`
    pub fn undelegate(
        &mut self,
        private_key_hex: &str,
        node_address: &str,
        fee: u64,
        nonce: Option<u64>,
    ) -> Result<TxReceipt> {
        let command = undelegate_command();
        self.send_tx(private_key_hex, node_address, 0, fee, &command, nonce)
    }
}

fn check_history_limit(count_tx: u64) -> Result<()> {
    if count_tx > HISTORY_LIMIT {
        return Err(MetahashError::InvalidRequest(format!(
            "Too many transactions in one request. Maximum is {HISTORY_LIMIT}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_parsing_keeps_extra_fields() {
        let balance: Balance = serde_json::from_value(json!({
            "address": "0x00fa2a5279f8f0fd2f0f9d3280ad70403f01f9d62f52373833",
            "received": 5000,
            "spent": 1200,
            "count_received": 3,
            "count_spent": 2,
            "count_txs": 5,
            "block_number": 10,
            "currentBlock": 12,
            "delegated": 700
        }))
        .unwrap();
        assert_eq!(balance.available(), 3800);
        assert_eq!(balance.next_nonce().unwrap(), 3);
        assert_eq!(balance.current_block, 12);
        assert_eq!(balance.extra["delegated"], 700);
    }

    #[test]
    fn test_missing_counters_default_to_zero() {
        let balance: Balance = serde_json::from_value(json!({ "address": "0x00" })).unwrap();
        assert_eq!(balance.next_nonce().unwrap(), 1);
        assert_eq!(balance.available(), 0);
    }

    #[test]
    fn test_exhausted_nonce_is_an_error() {
        let balance = Balance {
            count_spent: u64::MAX,
            ..Balance::default()
        };
        assert!(matches!(
            balance.next_nonce(),
            Err(MetahashError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_history_limit() {
        assert!(check_history_limit(HISTORY_LIMIT).is_ok());
        assert!(matches!(
            check_history_limit(HISTORY_LIMIT + 1),
            Err(MetahashError::InvalidRequest(_))
        ));
    }
}
