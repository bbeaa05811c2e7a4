use alloy::primitives::{address, Address};

/// Multicall3 is deployed at the same address on nearly every EVM chain,
/// see <https://www.multicall3.com/>.
pub const MULTICALL3_ADDRESS: Address = address!("cA11bde05977b3631167028862bE2a173976CA11");

/// Calls per aggregate before a batch is split.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Aggregates awaiting a response at once.
pub const DEFAULT_CONCURRENCY: usize = 4;
