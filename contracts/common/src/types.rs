//! Core Types for the Share Vault
//!
//! Data structures shared by the vault engine, the token ledger and the
//! transition validator.

use crate::Vec;
use crate::constants::vault::ADDRESS_DOMAIN;
use crate::errors::{VaultError, VaultResult};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// Type alias for account addresses (32-byte hash)
pub type Address = [u8; 32];

/// Type alias for app / token identifiers
pub type AppId = [u8; 32];

/// The all-zero address, never a valid account
pub const ZERO_ADDRESS: Address = [0u8; 32];

// ============ Vault Config ============

/// Static configuration of a vault instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct VaultConfig {
    /// Identifier of the underlying token
    pub token_id: AppId,
    /// Account holding the vault's tokens on the token ledger
    pub vault_address: Address,
}

impl VaultConfig {
    /// Create a config with an explicit vault account
    pub fn new(token_id: AppId, vault_address: Address) -> VaultResult<Self> {
        let config = Self { token_id, vault_address };
        config.validate()?;
        Ok(config)
    }

    /// Create a config whose vault account is derived from the token and deployer
    pub fn derive(token_id: AppId, deployer: &Address) -> VaultResult<Self> {
        Self::new(token_id, derive_vault_address(&token_id, deployer))
    }

    /// Reject zero identifiers
    pub fn validate(&self) -> VaultResult<()> {
        if self.token_id == ZERO_ADDRESS {
            return Err(VaultError::InvalidAddress { reason: "token id is zero" });
        }
        if self.vault_address == ZERO_ADDRESS {
            return Err(VaultError::InvalidAddress { reason: "vault address is zero" });
        }
        Ok(())
    }
}

/// Deterministic vault account for a (token, deployer) pair
pub fn derive_vault_address(token_id: &AppId, deployer: &Address) -> Address {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(ADDRESS_DOMAIN);
    hasher.update(token_id);
    hasher.update(deployer);
    let result = hasher.finalize();
    let mut address = [0u8; 32];
    address.copy_from_slice(&result);
    address
}

// ============ Vault State ============

/// Aggregate accounting state of a vault
///
/// Per-holder balances live next to this in the engine; the aggregate is
/// what a hosting environment carries between transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct VaultState {
    /// Sum of all holder share balances
    pub total_shares: u64,
    /// Holders with a non-zero balance (share records when carried on charms)
    pub holder_count: u64,
    /// Successful deposits and withdrawals so far
    pub operation_count: u64,
}

impl VaultState {
    /// Creates the state of a freshly initialized vault
    pub fn new() -> Self {
        Self::default()
    }
}

/// A single holder's share balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct HolderShares {
    /// Holder address
    pub owner: Address,
    /// Shares owned
    pub shares: u64,
}

impl HolderShares {
    pub fn new(owner: Address, shares: u64) -> Self {
        Self { owner, shares }
    }
}

/// Full accounting state, balances sorted by owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct VaultSnapshot {
    pub config: VaultConfig,
    pub state: VaultState,
    pub balances: Vec<HolderShares>,
}

impl VaultSnapshot {
    /// Sum of all balances in the snapshot
    pub fn sum_of_balances(&self) -> u128 {
        self.balances.iter().map(|b| b.shares as u128).sum()
    }

    /// Check the supply invariant
    pub fn verify(&self) -> VaultResult<()> {
        let sum = self.sum_of_balances();
        if sum != self.state.total_shares as u128 {
            return Err(VaultError::InvariantViolated {
                total_shares: self.state.total_shares,
                sum_of_balances: sum,
            });
        }
        Ok(())
    }
}

// ============ Actions ============

/// Actions accepted by the share vault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum VaultAction {
    /// Deposit `amount` of the underlying token
    Deposit { amount: u64 },
    /// Redeem `shares` for the underlying token
    Withdraw { shares: u64 },
}
