pub mod rpc_client;
pub mod transfer_fetcher;

pub use rpc_client::{RpcClient, LogFilter};
pub use transfer_fetcher::{
    TransferLogFetcher, TRANSFER_EVENT_SIGNATURE, decode_transfer_log, first_transfer,
    normalize_address, probe_window, validate_address,
};
