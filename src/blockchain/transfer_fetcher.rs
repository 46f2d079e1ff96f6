use primitive_types::U256;
use crate::blockchain::rpc_client::{LogFilter, RpcClient};
use crate::error::{LogDecodeError, ProbeError, Result};
use crate::logging::LogContext;
use crate::models::{RawLog, TransferLog};

/// ERC-20 Transfer event signature: Transfer(address indexed from, address indexed to, uint256 value)
pub const TRANSFER_EVENT_SIGNATURE: &str = "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

/// Reads the most recent transfer that Blockscout should already have indexed
pub struct TransferLogFetcher {
    rpc: RpcClient,
    token_address: Option<String>,
    sender_address: Option<String>,
}

impl TransferLogFetcher {
    pub fn new(rpc: RpcClient) -> Self {
        Self {
            rpc,
            token_address: None,
            sender_address: None,
        }
    }

    /// Only consider transfers emitted by this token contract
    pub fn with_token_address(mut self, token_address: Option<String>) -> Self {
        self.token_address = token_address;
        self
    }

    /// Only consider transfers sent by this address
    pub fn with_sender_address(mut self, sender_address: Option<String>) -> Self {
        self.sender_address = sender_address;
        self
    }

    /// Build the `eth_getLogs` filter for a block window
    pub fn log_filter(&self, from_block: u64, to_block: u64) -> LogFilter {
        let mut filter = LogFilter::for_range(from_block, to_block);
        filter.address = self.token_address.as_ref().map(|address| address.to_lowercase());

        let mut topics = vec![Some(TRANSFER_EVENT_SIGNATURE.to_string())];
        if let Some(sender) = &self.sender_address {
            topics.push(Some(address_to_topic(sender)));
        }
        filter.topics = Some(topics);

        filter
    }

    /// Fetch the chain tip and return it together with the first transfer in
    /// the window ending `max_blocks_behind` blocks before it.
    ///
    /// Fails with `ProbeError::NoTransferLogs` when the window has no ERC-20
    /// transfer to compare against.
    pub async fn fetch_latest_transfer(&self, max_blocks_behind: u64) -> Result<(u64, TransferLog)> {
        let tip = self.rpc.get_latest_block_number().await?;
        let (from_block, to_block) = probe_window(tip, max_blocks_behind);

        let context = LogContext::new("transfer_fetcher", "fetch_latest_transfer")
            .with_metadata("tip", serde_json::json!(tip))
            .with_metadata("from_block", serde_json::json!(from_block))
            .with_metadata("to_block", serde_json::json!(to_block));
        context.debug(&format!("Fetching transfer logs in blocks {}..={}", from_block, to_block));

        let logs = self.rpc.get_logs(&self.log_filter(from_block, to_block)).await?;
        let transfer = first_transfer(&logs)
            .ok_or(ProbeError::NoTransferLogs { from_block, to_block })?;

        context
            .with_transaction_hash(&transfer.transaction_hash)
            .with_address(&transfer.from)
            .info(&format!("Found transfer in block {}", transfer.block_number));

        Ok((tip, transfer))
    }
}

/// The two-block window `[tip - max_blocks_behind - 1, tip - max_blocks_behind]`
pub fn probe_window(tip: u64, max_blocks_behind: u64) -> (u64, u64) {
    let to_block = tip.saturating_sub(max_blocks_behind);
    (to_block.saturating_sub(1), to_block)
}

/// First log in node order that decodes as an ERC-20 transfer
pub fn first_transfer(logs: &[RawLog]) -> Option<TransferLog> {
    logs.iter().find_map(|log| match decode_transfer_log(log) {
        Ok(transfer) => Some(transfer),
        Err(e) => {
            LogContext::new("transfer_fetcher", "decode_transfer_log")
                .with_transaction_hash(&log.transaction_hash)
                .debug(&format!("Skipping log {}: {}", log.log_index, e));
            None
        }
    })
}

/// Decode an ERC-20 `Transfer` log into a `TransferLog`
pub fn decode_transfer_log(log: &RawLog) -> std::result::Result<TransferLog, LogDecodeError> {
    let signature = log.topics.first()
        .ok_or_else(|| LogDecodeError::InvalidLog("Log has no topics".to_string()))?;
    if normalize_address(signature) != normalize_address(TRANSFER_EVENT_SIGNATURE) {
        return Err(LogDecodeError::InvalidLog("Log is not a Transfer event".to_string()));
    }

    // ERC-20 Transfer has 3 topics: [signature, from, to]; ERC-721 indexes the token id as a 4th
    if log.topics.len() != 3 {
        return Err(LogDecodeError::InvalidLog(
            format!("Expected 3 topics, got {}", log.topics.len())
        ));
    }

    let from = extract_address_from_topic(&log.topics[1])?;
    let to = extract_address_from_topic(&log.topics[2])?;
    let value = extract_amount_from_data(&log.data)?;

    Ok(TransferLog {
        transaction_hash: log.transaction_hash.clone(),
        block_number: log.block_number,
        log_index: log.log_index,
        token_address: log.address.to_lowercase(),
        from: format!("0x{}", from),
        to: format!("0x{}", to),
        value,
    })
}

/// Normalize a hex identifier to lowercase without 0x prefix
pub fn normalize_address(address: &str) -> String {
    let addr = address.trim();
    if addr.starts_with("0x") || addr.starts_with("0X") {
        addr[2..].to_lowercase()
    } else {
        addr.to_lowercase()
    }
}

/// Validate that an address is a 20-byte hex string
pub fn validate_address(address: &str) -> std::result::Result<(), LogDecodeError> {
    let normalized = normalize_address(address);

    if normalized.len() != 40 {
        return Err(LogDecodeError::InvalidAddress(
            format!("Address must be 40 characters long, got {}", normalized.len())
        ));
    }

    if !normalized.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(LogDecodeError::InvalidAddress(
            "Address contains non-hexadecimal characters".to_string()
        ));
    }

    Ok(())
}

/// Left-pad an address to a 32-byte topic
fn address_to_topic(address: &str) -> String {
    format!("0x{:0>64}", normalize_address(address))
}

/// Extract address from a 32-byte topic (drop the 12 bytes of padding)
fn extract_address_from_topic(topic: &str) -> std::result::Result<String, LogDecodeError> {
    let normalized_topic = normalize_address(topic);

    if normalized_topic.len() != 64 {
        return Err(LogDecodeError::InvalidLog(
            format!("Topic should be 64 characters, got {}", normalized_topic.len())
        ));
    }

    let address = &normalized_topic[24..64];
    validate_address(address)?;

    Ok(address.to_string())
}

/// Extract the uint256 amount from the data field
fn extract_amount_from_data(data: &str) -> std::result::Result<U256, LogDecodeError> {
    let normalized_data = normalize_address(data);

    if normalized_data.len() != 64 {
        return Err(LogDecodeError::InvalidAmount(
            format!("Data should be 64 characters, got {}", normalized_data.len())
        ));
    }

    U256::from_str_radix(&normalized_data, 16)
        .map_err(|e| LogDecodeError::InvalidHex(format!("Failed to parse amount: {}", e)))
}
