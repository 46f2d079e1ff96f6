use serde::Deserialize;

/// Typed view of the `data` field returned by the Blockscout `Transfers` query.
///
/// Only the fields the comparison needs are required. Everything else the
/// query selects is optional so that schema drift in unrelated fields does not
/// fail the probe.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BlockscoutTransferResponse {
    #[serde(rename = "tokenTransferTxs")]
    pub token_transfer_txs: TokenTransferTxConnection,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TokenTransferTxConnection {
    pub edges: Vec<TransactionEdge>,
    #[serde(rename = "pageInfo", default)]
    pub page_info: Option<PageInfo>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TransactionEdge {
    pub node: TransactionNode,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionNode {
    pub transaction_hash: String,
    #[serde(default)]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub gas_price: Option<String>,
    #[serde(default)]
    pub gas_used: Option<String>,
    #[serde(default)]
    pub fee_token: Option<String>,
    #[serde(default)]
    pub gateway_fee: Option<String>,
    #[serde(default)]
    pub gateway_fee_recipient: Option<String>,
    #[serde(default)]
    pub input: Option<String>,
    pub token_transfer: TokenTransferConnection,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TokenTransferConnection {
    pub edges: Vec<TokenTransferEdge>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TokenTransferEdge {
    pub node: TokenTransferNode,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenTransferNode {
    pub from_address_hash: String,
    pub to_address_hash: String,
    #[serde(default)]
    pub from_account_hash: Option<String>,
    #[serde(default)]
    pub to_account_hash: Option<String>,
    pub value: String,
    #[serde(default)]
    pub token_address: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub token_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub start_cursor: Option<String>,
    #[serde(default)]
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl BlockscoutTransferResponse {
    /// Total number of token transfer edges across all transactions
    pub fn transfer_count(&self) -> usize {
        self.token_transfer_txs
            .edges
            .iter()
            .map(|edge| edge.node.token_transfer.edges.len())
            .sum()
    }
}
