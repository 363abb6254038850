//! Protocol Constants
//!
//! Fixed parameters for the share vault and the underlying token ledger.
//! Every value here is part of observable behavior, so changing one is a
//! breaking change for anyone replaying vault history.

/// Underlying token supply limits
pub mod token {
    /// One unit with decimals (1 VAST = 100_000_000 base units)
    pub const ONE: u64 = 100_000_000;

    /// Maximum supply (10 billion tokens - fits in u64)
    /// 10_000_000_000 * 100_000_000 = 10^18 < u64::MAX
    pub const MAX_SUPPLY: u64 = 10_000_000_000 * ONE;
}

/// Share accounting parameters
pub mod vault {
    /// Shares minted by the first deposit into an empty vault.
    ///
    /// Independent of the deposited amount: the bootstrap depositor sets the
    /// initial share price to `amount / BOOTSTRAP_SHARES`.
    pub const BOOTSTRAP_SHARES: u64 = 1;

    /// Fixed-point scale used when reporting the share price
    pub const PRICE_PRECISION: u128 = 100_000_000; // 1e8

    /// Domain separator for deriving vault accounts
    pub const ADDRESS_DOMAIN: &[u8] = b"sharevault/v1/vault-account";
}

/// Event log sizing
pub mod events {
    /// Events retained before the oldest are dropped
    pub const MAX_RETAINED_EVENTS: usize = 4_096;
}
