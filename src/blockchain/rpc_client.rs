use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::error::RpcError;
use crate::logging::{LogContext, PerformanceMonitor, MetricsLogger};
use crate::models::RawLog;

#[derive(Debug, Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: Vec<Value>,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    result: Option<Value>,
    error: Option<JsonRpcError>,
    #[allow(dead_code)]
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

/// `eth_getLogs` filter object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogFilter {
    #[serde(rename = "fromBlock")]
    pub from_block: String,
    #[serde(rename = "toBlock")]
    pub to_block: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<Option<String>>>,
}

impl LogFilter {
    pub fn for_range(from_block: u64, to_block: u64) -> Self {
        Self {
            from_block: format!("0x{:x}", from_block),
            to_block: format!("0x{:x}", to_block),
            address: None,
            topics: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct EthLog {
    address: String,
    topics: Vec<String>,
    data: String,
    #[serde(rename = "blockNumber")]
    block_number: String,
    #[serde(rename = "transactionHash")]
    transaction_hash: String,
    #[serde(rename = "logIndex")]
    log_index: String,
}

/// Minimal chain JSON-RPC client
#[derive(Clone)]
pub struct RpcClient {
    client: Client,
    endpoint: String,
}

impl RpcClient {
    pub fn new(endpoint: String) -> Self {
        let context = LogContext::new("rpc_client", "initialization")
            .with_metadata("endpoint", serde_json::json!(endpoint));
        context.debug("Initializing RPC client");

        Self {
            client: Client::new(),
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn make_request(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: 1,
        };

        LogContext::new("rpc_client", "make_request")
            .with_metadata("method", serde_json::json!(method))
            .trace(&format!("Sending RPC request: {}", method));

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Status { status: status.as_u16() });
        }

        let body = response.text().await?;
        let rpc_response: JsonRpcResponse = serde_json::from_str(&body)?;

        if let Some(error) = rpc_response.error {
            return Err(RpcError::Method {
                code: error.code,
                message: error.message,
            });
        }

        rpc_response
            .result
            .ok_or_else(|| RpcError::InvalidResponse("No result in response".to_string()))
    }

    /// `eth_blockNumber`: the chain tip known to this node
    pub async fn get_latest_block_number(&self) -> Result<u64, RpcError> {
        let monitor = PerformanceMonitor::new("rpc_get_latest_block_number");
        let result = self.make_request("eth_blockNumber", vec![]).await;
        let duration = monitor.finish_with_result(&result);
        MetricsLogger::log_rpc_call("eth_blockNumber", duration, result.is_ok());

        let value = result?;
        let hex_string = value
            .as_str()
            .ok_or_else(|| RpcError::InvalidResponse("Block number is not a string".to_string()))?;

        let block_number = parse_hex_to_u64(hex_string)?;
        LogContext::new("rpc_client", "get_latest_block_number")
            .with_block_number(block_number)
            .debug(&format!("Retrieved latest block number: {}", block_number));

        Ok(block_number)
    }

    /// `eth_getLogs` for the given filter, in node order
    pub async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<RawLog>, RpcError> {
        let monitor = PerformanceMonitor::new("rpc_get_logs")
            .with_metadata("from_block", serde_json::json!(filter.from_block))
            .with_metadata("to_block", serde_json::json!(filter.to_block));

        let params = vec![serde_json::to_value(filter)?];
        let result = self.make_request("eth_getLogs", params).await;
        let duration = monitor.finish_with_result(&result);
        MetricsLogger::log_rpc_call("eth_getLogs", duration, result.is_ok());

        let eth_logs: Vec<EthLog> = serde_json::from_value(result?)?;

        let mut raw_logs = Vec::with_capacity(eth_logs.len());
        for eth_log in eth_logs {
            raw_logs.push(RawLog {
                block_number: parse_hex_to_u64(&eth_log.block_number)?,
                log_index: parse_hex_to_u32(&eth_log.log_index)?,
                address: eth_log.address,
                topics: eth_log.topics,
                data: eth_log.data,
                transaction_hash: eth_log.transaction_hash,
            });
        }

        LogContext::new("rpc_client", "get_logs")
            .with_metadata("log_count", serde_json::json!(raw_logs.len()))
            .with_metadata("from_block", serde_json::json!(filter.from_block))
            .with_metadata("to_block", serde_json::json!(filter.to_block))
            .debug(&format!("Retrieved {} logs", raw_logs.len()));

        Ok(raw_logs)
    }
}

fn parse_hex_to_u64(hex_str: &str) -> Result<u64, RpcError> {
    let hex_without_prefix = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    u64::from_str_radix(hex_without_prefix, 16)
        .map_err(|e| RpcError::InvalidResponse(format!("Failed to parse hex '{}' to u64: {}", hex_str, e)))
}

fn parse_hex_to_u32(hex_str: &str) -> Result<u32, RpcError> {
    let hex_without_prefix = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    u32::from_str_radix(hex_without_prefix, 16)
        .map_err(|e| RpcError::InvalidResponse(format!("Failed to parse hex '{}' to u32: {}", hex_str, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rpc_client_creation() {
        let endpoint = "https://forno.celo.org".to_string();
        let client = RpcClient::new(endpoint.clone());
        assert_eq!(client.endpoint(), endpoint);
    }

    #[test]
    fn test_json_rpc_request_serialization() {
        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            method: "eth_blockNumber".to_string(),
            params: vec![],
            id: 1,
        };

        let serialized = serde_json::to_string(&request).unwrap();
        let expected = r#"{"jsonrpc":"2.0","method":"eth_blockNumber","params":[],"id":1}"#;
        assert_eq!(serialized, expected);
    }

    #[test]
    fn test_json_rpc_response_deserialization_success() {
        let response_json = r#"{"jsonrpc":"2.0","result":"0x1234","id":1}"#;
        let response: JsonRpcResponse = serde_json::from_str(response_json).unwrap();

        assert!(response.error.is_none());
        assert_eq!(response.result.unwrap(), json!("0x1234"));
    }

    #[test]
    fn test_json_rpc_response_deserialization_error() {
        let response_json = r#"{"jsonrpc":"2.0","error":{"code":-32601,"message":"Method not found"},"id":1}"#;
        let response: JsonRpcResponse = serde_json::from_str(response_json).unwrap();

        assert!(response.result.is_none());
        let error = response.error.unwrap();
        assert_eq!(error.code, -32601);
        assert_eq!(error.message, "Method not found");
    }

    #[test]
    fn test_parse_hex_to_u64() {
        assert_eq!(parse_hex_to_u64("0x1234").unwrap(), 0x1234u64);
        assert_eq!(parse_hex_to_u64("1234").unwrap(), 0x1234u64);
        assert_eq!(parse_hex_to_u64("0x0").unwrap(), 0u64);
        assert!(parse_hex_to_u64("invalid").is_err());
    }

    #[test]
    fn test_parse_hex_to_u32() {
        assert_eq!(parse_hex_to_u32("0x1a").unwrap(), 26u32);
        assert!(parse_hex_to_u32("0x100000000").is_err());
    }

    #[test]
    fn test_log_filter_serialization() {
        let mut filter = LogFilter::for_range(0x1234, 0x1235);
        filter.address = Some("0xabc123".to_string());
        filter.topics = Some(vec![Some("0xdef456".to_string()), None]);

        let json = serde_json::to_string(&filter).unwrap();
        assert!(json.contains("\"fromBlock\":\"0x1234\""));
        assert!(json.contains("\"toBlock\":\"0x1235\""));
        assert!(json.contains("\"address\":\"0xabc123\""));
        assert!(json.contains("\"topics\":[\"0xdef456\",null]"));
    }

    #[test]
    fn test_log_filter_omits_unset_fields() {
        let filter = LogFilter::for_range(1, 2);
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(json, json!({"fromBlock": "0x1", "toBlock": "0x2"}));
    }

    #[test]
    fn test_eth_log_deserialization() {
        let log: EthLog = serde_json::from_value(json!({
            "address": "0x765de816845861e75a25fca122bb6898b8b1282a",
            "topics": ["0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"],
            "data": "0x",
            "blockNumber": "0x10",
            "transactionHash": "0xabc",
            "logIndex": "0x3",
            "removed": false
        })).unwrap();

        assert_eq!(parse_hex_to_u64(&log.block_number).unwrap(), 16);
        assert_eq!(parse_hex_to_u32(&log.log_index).unwrap(), 3);
    }
}
