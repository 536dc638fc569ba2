/// Smallest top-up the relay accepts. Any non-zero top-up is rounded up to this.
pub const MINIMUM_TOP_UP_AMOUNT: u64 = 10_000;

/// Slippage applied when converting a SOL fee into the paying token (basis points).
pub const TOP_UP_SLIPPAGE_BPS: u64 = 300;

pub const BPS_DENOMINATOR: u64 = 10_000;

/// Fallback used when the cluster cannot be asked for the signature fee.
pub const DEFAULT_LAMPORTS_PER_SIGNATURE: u64 = 5_000;
