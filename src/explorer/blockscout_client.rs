use once_cell::sync::Lazy;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::error::ExplorerError;
use crate::logging::{LogContext, MetricsLogger, PerformanceMonitor};
use crate::models::BlockscoutTransferResponse;

pub const MAX_RESULTS_PER_QUERY: u32 = 25;
pub const MAX_TRANSFERS_PER_TRANSACTION: u32 = 40;

/// Token transfer transactions of an address, with the transfers of each
/// transaction nested underneath.
pub static TRANSFERS_QUERY: Lazy<String> = Lazy::new(|| {
    format!(
        r#"
query Transfers($address: AddressHash!, $afterCursor: String) {{
  tokenTransferTxs(addressHash: $address, first: {max_results}, after: $afterCursor) {{
    edges {{
      node {{
        transactionHash
        blockNumber
        timestamp
        gasPrice
        gasUsed
        feeToken
        gatewayFee
        gatewayFeeRecipient
        input
        tokenTransfer(first: {max_transfers}) {{
          edges {{
            node {{
              fromAddressHash
              toAddressHash
              fromAccountHash
              toAccountHash
              value
              tokenAddress
              tokenType
              tokenId
            }}
          }}
        }}
      }}
    }}
    pageInfo {{
      startCursor
      endCursor
      hasNextPage
      hasPreviousPage
    }}
  }}
}}
"#,
        max_results = MAX_RESULTS_PER_QUERY,
        max_transfers = MAX_TRANSFERS_PER_TRANSACTION,
    )
});

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: TransfersVariables<'a>,
}

#[derive(Debug, Serialize)]
struct TransfersVariables<'a> {
    address: &'a str,
    #[serde(rename = "afterCursor", skip_serializing_if = "Option::is_none")]
    after_cursor: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

/// Blockscout GraphQL client for the single `Transfers` query
#[derive(Clone)]
pub struct BlockscoutClient {
    client: Client,
    graphql_url: String,
}

impl BlockscoutClient {
    /// `base_url` is the explorer root; requests go to `{base_url}/graphql`
    pub fn new(base_url: &str) -> Self {
        let graphql_url = format!("{}/graphql", base_url.trim_end_matches('/'));
        LogContext::new("blockscout_client", "initialization")
            .with_metadata("graphql_url", serde_json::json!(graphql_url))
            .debug("Initializing Blockscout client");

        Self {
            client: Client::new(),
            graphql_url,
        }
    }

    pub fn graphql_url(&self) -> &str {
        &self.graphql_url
    }

    /// Fetch the first page of token transfer transactions for `address`
    pub async fn fetch_transfers(&self, address: &str) -> Result<BlockscoutTransferResponse, ExplorerError> {
        let monitor = PerformanceMonitor::new("blockscout_fetch_transfers")
            .with_metadata("address", serde_json::json!(address));

        let result = self.query_transfers(address).await;
        let duration = monitor.finish_with_result(&result);
        MetricsLogger::log_explorer_query(address, duration, result.is_ok());

        result
    }

    async fn query_transfers(&self, address: &str) -> Result<BlockscoutTransferResponse, ExplorerError> {
        let request = GraphQlRequest {
            query: TRANSFERS_QUERY.as_str(),
            variables: TransfersVariables {
                address,
                after_cursor: None,
            },
        };

        let response = self
            .client
            .post(&self.graphql_url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ExplorerError::Status {
                status: status.as_u16(),
                body,
            });
        }

        decode_transfers_response(&body)
    }
}

/// Validate a raw GraphQL body against the `Transfers` schema
pub fn decode_transfers_response(body: &str) -> Result<BlockscoutTransferResponse, ExplorerError> {
    let envelope: GraphQlResponse = serde_json::from_str(body)
        .map_err(|e| ExplorerError::MalformedResponse(format!("Body is not a GraphQL response: {}", e)))?;

    if !envelope.errors.is_empty() {
        let messages: Vec<String> = envelope.errors.into_iter().map(|e| e.message).collect();
        return Err(ExplorerError::GraphQl(messages.join("; ")));
    }

    let data = envelope.data
        .filter(|data| !data.is_null())
        .ok_or_else(|| ExplorerError::MalformedResponse("Response has no data".to_string()))?;

    serde_json::from_value(data)
        .map_err(|e| ExplorerError::MalformedResponse(format!("Unexpected transfers shape: {}", e)))
}
