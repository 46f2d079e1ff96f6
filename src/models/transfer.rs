use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// An `eth_getLogs` entry before decoding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawLog {
    pub address: String,
    pub topics: Vec<String>,
    pub data: String,
    pub block_number: u64,
    pub transaction_hash: String,
    pub log_index: u32,
}

/// A decoded ERC-20 `Transfer(from, to, value)` event observed on the node.
///
/// Addresses are `0x`-prefixed lowercase hex, as decoded from the log topics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferLog {
    pub transaction_hash: String,
    pub block_number: u64,
    pub log_index: u32,
    pub token_address: String,
    pub from: String,
    pub to: String,
    pub value: U256,
}

impl TransferLog {
    /// The transfer amount as the decimal string Blockscout reports
    pub fn value_decimal(&self) -> String {
        self.value.to_string()
    }
}
