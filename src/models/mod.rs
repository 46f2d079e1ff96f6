pub mod transfer;
pub mod blockscout;

pub use transfer::{RawLog, TransferLog};
pub use blockscout::{
    BlockscoutTransferResponse, PageInfo, TokenTransferConnection, TokenTransferEdge,
    TokenTransferNode, TokenTransferTxConnection, TransactionEdge, TransactionNode,
};
