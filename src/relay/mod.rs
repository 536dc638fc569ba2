pub mod context;
pub mod context_manager;
pub mod destination;
pub mod fee_amount;
pub mod fee_calculator;
pub mod program;
pub mod transit;

pub use context::{RelayAccountStatus, RelayContext, UsageStatus};
pub use context_manager::RelayContextManager;
pub use destination::{DefaultDestinationAnalyser, DestinationAnalyser, DestinationInfo};
pub use fee_amount::FeeAmount;
pub use fee_calculator::{DefaultRelayFeeCalculator, RelayFeeCalculator};
pub use program::RelayProgram;
pub use transit::{DefaultTransitTokenAccountManager, TokenAccount, TransitTokenAccountManager};
