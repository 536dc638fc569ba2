pub mod pool;
pub mod provider;

pub use pool::{Pool, PoolError, PoolsPair, find_best_pools_pair_for_estimated_amount};
pub use provider::{StaticPoolsProvider, TradablePoolsProvider};
