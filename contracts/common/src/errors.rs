//! Error Types for the Share Vault
//!
//! Typed errors carry the values needed to diagnose a rejected call.
//! Every error aborts the whole operation; nothing is retried internally.

use crate::types::Address;
use core::fmt;

/// Result type alias for vault operations
pub type VaultResult<T> = Result<T, VaultError>;

/// Main error enum for all vault and token ledger errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    // ============ Share Errors ============
    /// Holder tried to redeem more shares than they own
    InsufficientShares { current: u64, requested: u64 },

    /// Sum of holder balances disagrees with the share supply
    InvariantViolated { total_shares: u64, sum_of_balances: u128 },

    // ============ Token Errors ============
    /// Account balance too low for a transfer
    InsufficientBalance { available: u64, requested: u64 },

    /// Spender allowance too low for a transfer_from
    InsufficientAllowance { available: u64, requested: u64 },

    /// Token transfer failed for a reason the ledger did not classify
    TransferFailed { from: Address, to: Address, amount: u64 },

    /// Mint would push supply past the maximum
    ExceedsMaxSupply { requested: u64, maximum: u64 },

    // ============ Math Errors ============
    /// Arithmetic overflow occurred
    Overflow,

    /// Arithmetic underflow occurred
    Underflow,

    /// Division by zero
    DivisionByZero,

    // ============ State Errors ============
    /// Proposed state does not match the computed transition
    InvalidStateTransition,

    /// Required state missing from the transaction
    StateNotFound,

    /// Invalid address (e.g., zero address)
    InvalidAddress {
        /// Description of why the address is invalid
        reason: &'static str,
    },

    /// A thread panicked while holding the vault lock
    LockPoisoned,
}

impl VaultError {
    /// Returns a human-readable error code for logging/debugging
    pub fn code(&self) -> &'static str {
        match self {
            Self::InsufficientShares { .. } => "E001_INSUFFICIENT_SHARES",
            Self::InvariantViolated { .. } => "E002_INVARIANT_VIOLATED",
            Self::InsufficientBalance { .. } => "E010_INSUFFICIENT_BALANCE",
            Self::InsufficientAllowance { .. } => "E011_INSUFFICIENT_ALLOWANCE",
            Self::TransferFailed { .. } => "E012_TRANSFER_FAILED",
            Self::ExceedsMaxSupply { .. } => "E013_EXCEEDS_MAX_SUPPLY",
            Self::Overflow => "E080_OVERFLOW",
            Self::Underflow => "E081_UNDERFLOW",
            Self::DivisionByZero => "E082_DIV_ZERO",
            Self::InvalidStateTransition => "E101_INVALID_STATE",
            Self::StateNotFound => "E102_STATE_NOT_FOUND",
            Self::InvalidAddress { .. } => "E103_INVALID_ADDRESS",
            Self::LockPoisoned => "E110_LOCK_POISONED",
        }
    }

    /// Returns true if the caller can fix this by changing the request
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::InsufficientShares { .. } => true,    // Redeem fewer shares
            Self::InsufficientBalance { .. } => true,   // Get more funds
            Self::InsufficientAllowance { .. } => true, // Approve the vault
            _ => false,
        }
    }

    /// Returns true for arithmetic failures
    pub fn is_arithmetic(&self) -> bool {
        matches!(self, Self::Overflow | Self::Underflow | Self::DivisionByZero)
    }
}

impl fmt::Display for VaultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientShares { current, requested } => {
                write!(f, "insufficient shares: holder has {current}, requested {requested}")
            }
            Self::InvariantViolated { total_shares, sum_of_balances } => write!(
                f,
                "share supply {total_shares} does not match sum of balances {sum_of_balances}"
            ),
            Self::InsufficientBalance { available, requested } => {
                write!(f, "insufficient balance: available {available}, requested {requested}")
            }
            Self::InsufficientAllowance { available, requested } => {
                write!(f, "insufficient allowance: available {available}, requested {requested}")
            }
            Self::TransferFailed { amount, .. } => write!(f, "transfer of {amount} failed"),
            Self::ExceedsMaxSupply { requested, maximum } => {
                write!(f, "mint of {requested} exceeds max supply {maximum}")
            }
            Self::Overflow => f.write_str("arithmetic overflow"),
            Self::Underflow => f.write_str("arithmetic underflow"),
            Self::DivisionByZero => f.write_str("division by zero"),
            Self::InvalidStateTransition => f.write_str("invalid state transition"),
            Self::StateNotFound => f.write_str("state not found"),
            Self::InvalidAddress { reason } => write!(f, "invalid address: {reason}"),
            Self::LockPoisoned => f.write_str("vault lock poisoned"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for VaultError {}
