pub mod error;
pub mod mock_rpc;
pub mod rpc;
pub mod types;

pub use error::{RelayError, RelayResult};
pub use rpc::{AccountLookup, ChainStateLookup};
pub use types::*;
