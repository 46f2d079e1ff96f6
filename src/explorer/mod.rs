pub mod blockscout_client;

pub use blockscout_client::{BlockscoutClient, TRANSFERS_QUERY, MAX_RESULTS_PER_QUERY, MAX_TRANSFERS_PER_TRANSACTION};
