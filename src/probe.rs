use serde::{Deserialize, Serialize};
use crate::blockchain::{RpcClient, TransferLogFetcher};
use crate::config::ProbeConfig;
use crate::error::Result;
use crate::explorer::BlockscoutClient;
use crate::logging::{LogContext, MetricsLogger};
use crate::models::{BlockscoutTransferResponse, TransferLog};

/// Process exit code when Blockscout has the transfer
pub const EXIT_OK: i32 = 0;
/// Process exit code when Blockscout is missing the transfer
pub const EXIT_STALE: i32 = 1;
/// Process exit code when the check could not run at all
pub const EXIT_PROBE_FAILED: i32 = 2;

/// Result of a probe that ran to completion.
///
/// `ok` is false when Blockscout is missing the transfer; `error` then
/// describes what was missing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeOutcome {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProbeOutcome {
    pub fn healthy() -> Self {
        Self { ok: true, error: None }
    }

    pub fn unhealthy(error: String) -> Self {
        Self { ok: false, error: Some(error) }
    }

    pub fn exit_code(&self) -> i32 {
        if self.ok { EXIT_OK } else { EXIT_STALE }
    }
}

/// Whether Blockscout lists `transfer` among the transfers of its transaction.
///
/// Addresses compare case-insensitively; the value must match the transfer's
/// decimal string exactly.
pub fn response_includes_transfer(response: &BlockscoutTransferResponse, transfer: &TransferLog) -> bool {
    let expected_value = transfer.value_decimal();

    response.token_transfer_txs.edges.iter().any(|tx_edge| {
        tx_edge.node.transaction_hash == transfer.transaction_hash
            && tx_edge.node.token_transfer.edges.iter().any(|transfer_edge| {
                let node = &transfer_edge.node;
                node.from_address_hash.eq_ignore_ascii_case(&transfer.from)
                    && node.to_address_hash.eq_ignore_ascii_case(&transfer.to)
                    && node.value == expected_value
            })
    })
}

/// One-shot Blockscout indexing lag check
pub struct Probe {
    fetcher: TransferLogFetcher,
    explorer: BlockscoutClient,
    max_blocks_behind: u64,
}

impl Probe {
    pub fn new(config: ProbeConfig) -> Self {
        let fetcher = TransferLogFetcher::new(RpcClient::new(config.rpc.url))
            .with_token_address(config.probe.test_token_address)
            .with_sender_address(config.probe.test_user_address);

        Self {
            fetcher,
            explorer: BlockscoutClient::new(&config.blockscout.url),
            max_blocks_behind: config.probe.max_blocks_behind,
        }
    }

    /// Fetch the reference transfer from the node, then look for it in Blockscout
    pub async fn run(&self) -> Result<ProbeOutcome> {
        let (tip, transfer) = self.fetcher.fetch_latest_transfer(self.max_blocks_behind).await?;
        let response = self.explorer.fetch_transfers(&transfer.from).await?;

        let ok = response_includes_transfer(&response, &transfer);
        MetricsLogger::log_probe_result(
            ok,
            tip,
            transfer.block_number,
            &transfer.transaction_hash,
            response.transfer_count(),
        );

        if ok {
            return Ok(ProbeOutcome::healthy());
        }

        let message = format!(
            "Blockscout has not indexed transfer of {} from {} to {} in transaction {} (block {}, tip {}, max {} blocks behind)",
            transfer.value_decimal(),
            transfer.from,
            transfer.to,
            transfer.transaction_hash,
            transfer.block_number,
            tip,
            self.max_blocks_behind,
        );
        LogContext::new("probe", "run")
            .with_transaction_hash(&transfer.transaction_hash)
            .debug(&message);

        Ok(ProbeOutcome::unhealthy(message))
    }
}

/// Build a `Probe` from `config` and run it once
pub async fn run_probe(config: ProbeConfig) -> Result<ProbeOutcome> {
    Probe::new(config).run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitive_types::U256;
    use serde_json::json;

    fn reference_transfer() -> TransferLog {
        TransferLog {
            transaction_hash: "0xabc".to_string(),
            block_number: 97,
            log_index: 0,
            token_address: "0x765de816845861e75a25fca122bb6898b8b1282a".to_string(),
            from: "0xAA".to_string(),
            to: "0xBB".to_string(),
            value: U256::from(100u64),
        }
    }

    fn response(tx_hash: &str, transfers: Vec<(&str, &str, &str)>) -> BlockscoutTransferResponse {
        let edges: Vec<_> = transfers
            .into_iter()
            .map(|(from, to, value)| json!({
                "node": { "fromAddressHash": from, "toAddressHash": to, "value": value }
            }))
            .collect();

        serde_json::from_value(json!({
            "tokenTransferTxs": {
                "edges": [{
                    "node": {
                        "transactionHash": tx_hash,
                        "tokenTransfer": { "edges": edges }
                    }
                }]
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_matching_transfer_is_found() {
        let response = response("0xabc", vec![("0xaa", "0xbb", "100")]);
        assert!(response_includes_transfer(&response, &reference_transfer()));
    }

    #[test]
    fn test_value_mismatch() {
        let response = response("0xabc", vec![("0xaa", "0xbb", "101")]);
        assert!(!response_includes_transfer(&response, &reference_transfer()));
    }

    #[test]
    fn test_hash_mismatch() {
        let response = response("0xdef", vec![("0xaa", "0xbb", "100")]);
        assert!(!response_includes_transfer(&response, &reference_transfer()));
    }

    #[test]
    fn test_address_mismatch() {
        let wrong_from = response("0xabc", vec![("0xcc", "0xbb", "100")]);
        assert!(!response_includes_transfer(&wrong_from, &reference_transfer()));

        let wrong_to = response("0xabc", vec![("0xaa", "0xcc", "100")]);
        assert!(!response_includes_transfer(&wrong_to, &reference_transfer()));

        let swapped = response("0xabc", vec![("0xbb", "0xaa", "100")]);
        assert!(!response_includes_transfer(&swapped, &reference_transfer()));
    }

    #[test]
    fn test_address_case_is_ignored() {
        let mut transfer = reference_transfer();
        transfer.from = "0xf977814e90da44bfa03b6295a0616a897441acec".to_string();
        transfer.to = "0x1234567890abcdef1234567890abcdef12345678".to_string();

        let response = response("0xabc", vec![(
            "0xF977814e90dA44bFA03b6295A0616a897441aceC",
            "0x1234567890ABCDEF1234567890ABCDEF12345678",
            "100",
        )]);
        assert!(response_includes_transfer(&response, &transfer));
    }

    #[test]
    fn test_address_without_prefix_does_not_match() {
        let unprefixed = response("0xabc", vec![("aa", "bb", "100")]);
        assert!(!response_includes_transfer(&unprefixed, &reference_transfer()));

        let padded = response("0xabc", vec![(" 0xaa", "0xbb", "100")]);
        assert!(!response_includes_transfer(&padded, &reference_transfer()));
    }

    #[test]
    fn test_leading_zero_value_does_not_match() {
        let response = response("0xabc", vec![("0xaa", "0xbb", "0100")]);
        assert!(!response_includes_transfer(&response, &reference_transfer()));
    }

    #[test]
    fn test_match_among_many_edges() {
        let response: BlockscoutTransferResponse = serde_json::from_value(json!({
            "tokenTransferTxs": {
                "edges": [
                    { "node": { "transactionHash": "0x111", "tokenTransfer": { "edges": [
                        { "node": { "fromAddressHash": "0xaa", "toAddressHash": "0xbb", "value": "100" } }
                    ] } } },
                    { "node": { "transactionHash": "0xabc", "tokenTransfer": { "edges": [
                        { "node": { "fromAddressHash": "0xaa", "toAddressHash": "0xdd", "value": "5" } },
                        { "node": { "fromAddressHash": "0xAA", "toAddressHash": "0xBB", "value": "100" } }
                    ] } } }
                ]
            }
        }))
        .unwrap();

        assert!(response_includes_transfer(&response, &reference_transfer()));
    }

    #[test]
    fn test_empty_response() {
        let response: BlockscoutTransferResponse =
            serde_json::from_value(json!({ "tokenTransferTxs": { "edges": [] } })).unwrap();
        assert!(!response_includes_transfer(&response, &reference_transfer()));
    }

    #[test]
    fn test_outcome_exit_codes() {
        assert_eq!(ProbeOutcome::healthy().exit_code(), EXIT_OK);
        assert_eq!(ProbeOutcome::unhealthy("missing".to_string()).exit_code(), EXIT_STALE);
        assert_ne!(EXIT_PROBE_FAILED, EXIT_STALE);
        assert_ne!(EXIT_PROBE_FAILED, EXIT_OK);
    }

    #[test]
    fn test_outcome_serialization() {
        assert_eq!(serde_json::to_value(ProbeOutcome::healthy()).unwrap(), json!({"ok": true}));
        assert_eq!(
            serde_json::to_value(ProbeOutcome::unhealthy("missing".to_string())).unwrap(),
            json!({"ok": false, "error": "missing"})
        );
    }
}
