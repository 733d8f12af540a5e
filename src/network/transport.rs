use crate::config::ClientConfig;
use crate::error::{MetahashError, Result};
use crate::network::resolver::{LivenessProbe, NodeEndpoint};
use crate::utils::current_timestamp;
use log::{debug, warn};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC style request understood by proxy and torrent nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcRequest {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub method: String,
    pub params: Value,
}

impl RpcRequest {
    pub fn new(method: &str, params: Value) -> Result<Self> {
        Ok(Self {
            id: current_timestamp()?,
            version: None,
            method: method.trim().to_string(),
            params,
        })
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }
}

/// Response envelope; nodes put either `result` or `error` in it
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub error: Value,
    #[serde(default)]
    pub params: Value,
}

impl RpcResponse {
    pub fn parse(body: &str) -> Result<Self> {
        let response: RpcResponse = serde_json::from_str(body)?;
        if !response.error.is_null() {
            return Err(MetahashError::Rpc(describe_error(&response.error)));
        }
        Ok(response)
    }
}

fn describe_error(error: &Value) -> String {
    match (error.get("code"), error.get("message")) {
        (Some(code), Some(message)) => {
            format!("{} (code {code})", message.as_str().unwrap_or_default())
        }
        (None, Some(message)) => message.as_str().unwrap_or_default().to_string(),
        _ => error.to_string(),
    }
}

/// Sends a request to a resolved node and returns the raw response body
pub trait Transport: Send {
    fn post(&self, endpoint: &NodeEndpoint, request: &RpcRequest) -> Result<String>;
}

/// Blocking HTTP transport; also serves as the liveness probe
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    probe_client: Client,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.rpc_timeout)
            .build()?;
        let probe_client = Client::builder()
            .connect_timeout(config.connect_timeout.min(config.probe_timeout))
            .timeout(config.probe_timeout)
            .build()?;
        Ok(Self {
            client,
            probe_client,
        })
    }
}

impl Transport for HttpTransport {
    fn post(&self, endpoint: &NodeEndpoint, request: &RpcRequest) -> Result<String> {
        debug!("POST {} {}", endpoint.url(), request.method);

        let response = self.client.post(endpoint.url()).json(request).send()?;

        let status = response.status();
        if status.is_server_error() {
            return Err(MetahashError::Transport(format!(
                "{} answered {status} to {}",
                endpoint.address(),
                request.method
            )));
        }
        Ok(response.text()?)
    }
}

impl LivenessProbe for HttpTransport {
    fn is_alive(&self, endpoint: &NodeEndpoint) -> bool {
        match self.probe_client.head(endpoint.url()).send() {
            Ok(response) => {
                let code = response.status().as_u16();
                code > 0 && code < 500
            }
            Err(e) => {
                warn!("Probe of {} failed: {e}", endpoint.address());
                false
            }
        }
    }

    fn count_blocks(&self, endpoint: &NodeEndpoint) -> Option<u64> {
        let request = RpcRequest::new("get-count-blocks", Value::Array(vec![])).ok()?;
        let body = self
            .probe_client
            .post(endpoint.url())
            .json(&request)
            .send()
            .ok()?
            .text()
            .ok()?;
        let response = RpcResponse::parse(&body).ok()?;
        response.result.get("count_blocks")?.as_u64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_shape() {
        let request = RpcRequest::new(" fetch-balance ", json!({ "address": "0x00" })).unwrap();
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["method"], "fetch-balance");
        assert_eq!(value["params"]["address"], "0x00");
        assert!(value["id"].as_u64().unwrap() > 0);
        assert!(value.get("version").is_none());

        let proxy = request.with_version("2.0");
        assert_eq!(serde_json::to_value(&proxy).unwrap()["version"], "2.0");
    }

    #[test]
    fn test_response_result() {
        let response = RpcResponse::parse(r#"{"id":1,"result":{"count_blocks":42}}"#).unwrap();
        assert_eq!(response.result["count_blocks"], 42);
    }

    #[test]
    fn test_response_error_object() {
        let err = RpcResponse::parse(
            r#"{"id":1,"error":{"code":-32603,"message":"address not found"}}"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            MetahashError::Rpc("address not found (code -32603)".to_string())
        );
    }

    #[test]
    fn test_response_not_json() {
        assert!(matches!(
            RpcResponse::parse("<html>"),
            Err(MetahashError::Serialization(_))
        ));
    }

    #[test]
    fn test_transport_builds_from_default_config() {
        assert!(HttpTransport::new(&ClientConfig::default()).is_ok());
    }
}
