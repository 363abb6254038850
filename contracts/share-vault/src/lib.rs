//! Share Vault
//!
//! Pooled-asset vault. Depositors hand the vault a fungible token and
//! receive shares; redeeming shares pays out a proportional slice of the
//! vault's *current* token balance.
//!
//! ## Accounting
//!
//! - First deposit into an empty vault mints exactly one share.
//! - Later deposits mint `floor(total_shares * amount / balance)`, where
//!   `balance` is read before the deposit's own funds arrive.
//! - Withdrawals pay `floor(balance * shares / total_shares)`.
//! - Tokens sent straight to the vault account raise the share price for
//!   every holder without touching the share ledger.
//!
//! ## Atomicity
//!
//! Share balances are committed before the token ledger is called and
//! restored if the token call fails, so a call either fully succeeds or
//! leaves no trace. `&mut self` keeps a token ledger from re-entering the
//! vault mid-call; `SharedShareVault` serializes callers across threads.

use std::collections::BTreeMap;
use std::vec::Vec;

use tracing::{debug, warn};

// Charms SDK integration (conditional compilation)
#[cfg(feature = "charms")]
pub mod charms;

pub mod shared;
pub mod transition;

#[cfg(test)]
mod scenarios;

pub use shared::SharedShareVault;
pub use transition::{validate, ShareVaultContext};

use sharevault_common::{
    errors::{VaultError, VaultResult},
    events::{EventLog, VaultEvent},
    math::{amount_for_shares, safe_add, safe_sub, share_price, shares_for_deposit},
    token_ledger::TokenLedger,
    types::{Address, HolderShares, VaultConfig, VaultSnapshot, VaultState, ZERO_ADDRESS},
};

// ============ Share Vault ============

/// Share ledger bound to one token ledger
///
/// Owns the token ledger handle `L`; pass `&mut ledger` to keep ownership
/// outside the vault.
#[derive(Debug)]
pub struct ShareVault<L: TokenLedger> {
    config: VaultConfig,
    state: VaultState,
    /// Holders with a non-zero balance only
    shares: BTreeMap<Address, u64>,
    token: L,
    events: EventLog,
}

/// Values restored when a token call fails
#[derive(Debug, Clone, Copy)]
struct Checkpoint {
    state: VaultState,
    holder_shares: u64,
}

impl<L: TokenLedger> ShareVault<L> {
    /// Create an empty vault
    pub fn new(config: VaultConfig, token: L) -> VaultResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: VaultState::new(),
            shares: BTreeMap::new(),
            token,
            events: EventLog::new(),
        })
    }

    /// Rebuild a vault from persisted accounting state
    pub fn from_snapshot(snapshot: VaultSnapshot, token: L) -> VaultResult<Self> {
        snapshot.config.validate()?;
        snapshot.verify()?;

        let mut shares = BTreeMap::new();
        for balance in &snapshot.balances {
            if balance.shares == 0 || balance.owner == ZERO_ADDRESS {
                return Err(VaultError::InvalidStateTransition);
            }
            if shares.insert(balance.owner, balance.shares).is_some() {
                return Err(VaultError::InvalidStateTransition);
            }
        }

        if shares.len() as u64 != snapshot.state.holder_count {
            return Err(VaultError::InvalidStateTransition);
        }

        Ok(Self {
            config: snapshot.config,
            state: snapshot.state,
            shares,
            token,
            events: EventLog::new(),
        })
    }

    // ============ Queries ============

    /// Vault configuration
    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Aggregate accounting state
    pub fn state(&self) -> VaultState {
        self.state
    }

    /// Shares outstanding
    pub fn total_shares(&self) -> u64 {
        self.state.total_shares
    }

    /// Shares owned by `holder` (zero for unknown holders)
    pub fn shares_of(&self, holder: &Address) -> u64 {
        self.shares.get(holder).copied().unwrap_or(0)
    }

    /// Holders with a non-zero balance
    pub fn holder_count(&self) -> u64 {
        self.state.holder_count
    }

    /// Non-zero balances ordered by holder
    pub fn holders(&self) -> impl Iterator<Item = HolderShares> + '_ {
        self.shares
            .iter()
            .map(|(owner, shares)| HolderShares::new(*owner, *shares))
    }

    /// Vault token holdings, read live from the token ledger
    pub fn total_balance(&self) -> u64 {
        self.token.balance_of(&self.config.vault_address)
    }

    /// Shares a deposit of `amount` would mint right now
    pub fn preview_deposit(&self, amount: u64) -> VaultResult<u64> {
        shares_for_deposit(self.state.total_shares, self.total_balance(), amount)
    }

    /// Tokens a redemption of `shares` would pay right now
    ///
    /// Does not check that any holder owns `shares`.
    pub fn preview_withdraw(&self, shares: u64) -> VaultResult<u64> {
        if shares > self.state.total_shares {
            return Err(VaultError::InsufficientShares {
                current: self.state.total_shares,
                requested: shares,
            });
        }
        amount_for_shares(self.total_balance(), shares, self.state.total_shares)
    }

    /// Tokens `holder` would receive by redeeming every share they own
    pub fn redeemable_balance(&self, holder: &Address) -> VaultResult<u64> {
        self.preview_withdraw(self.shares_of(holder))
    }

    /// Balance per share, scaled by `PRICE_PRECISION`
    pub fn share_price(&self) -> Option<u128> {
        share_price(self.total_balance(), self.state.total_shares)
    }

    /// Recompute the sum of balances and compare it with the share supply
    pub fn check_invariants(&self) -> VaultResult<()> {
        let sum: u128 = self.shares.values().map(|s| *s as u128).sum();
        if sum != self.state.total_shares as u128 {
            return Err(VaultError::InvariantViolated {
                total_shares: self.state.total_shares,
                sum_of_balances: sum,
            });
        }
        if self.shares.len() as u64 != self.state.holder_count {
            return Err(VaultError::InvalidStateTransition);
        }
        Ok(())
    }

    /// Accounting state suitable for persistence
    pub fn snapshot(&self) -> VaultSnapshot {
        VaultSnapshot {
            config: self.config.clone(),
            state: self.state,
            balances: self.holders().collect(),
        }
    }

    /// Events emitted so far
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Drain emitted events
    pub fn take_events(&mut self) -> Vec<VaultEvent> {
        self.events.take()
    }

    /// Token ledger handle
    pub fn token(&self) -> &L {
        &self.token
    }

    /// Mutable token ledger handle
    ///
    /// Transfers made through this bypass the share ledger; sending tokens
    /// to the vault account this way is how yield reaches holders.
    pub fn token_mut(&mut self) -> &mut L {
        &mut self.token
    }

    /// Consume the vault, returning the token ledger handle
    pub fn into_token(self) -> L {
        self.token
    }

    // ============ Operations ============

    /// Deposit `amount` tokens from `holder`, returning the shares minted
    ///
    /// `holder` must have approved the vault account for `amount` on the
    /// token ledger. A zero amount is accepted and mints nothing once the
    /// vault has shares. The vault account itself cannot hold shares.
    pub fn deposit(&mut self, holder: &Address, amount: u64) -> VaultResult<u64> {
        if *holder == ZERO_ADDRESS {
            return Err(VaultError::InvalidAddress { reason: "holder is zero address" });
        }
        if *holder == self.config.vault_address {
            return Err(self.reject(
                "deposit",
                VaultError::InvalidAddress { reason: "holder is the vault account" },
            ));
        }

        // 1. Balance before this deposit's funds arrive
        let total_balance = self.total_balance();

        // 2. Shares to mint
        let shares_minted = shares_for_deposit(self.state.total_shares, total_balance, amount)
            .map_err(|err| self.reject("deposit", err))?;

        // 3. Commit share mutation
        let checkpoint = self.checkpoint(holder);
        let new_total = safe_add(self.state.total_shares, shares_minted)
            .map_err(|err| self.reject("deposit", err))?;
        let new_holder = safe_add(checkpoint.holder_shares, shares_minted)
            .map_err(|err| self.reject("deposit", err))?;
        self.state.total_shares = new_total;
        self.set_shares(holder, new_holder);

        // 4. Pull the funds
        let vault = self.config.vault_address;
        if let Err(err) = self.token.transfer_from(&vault, holder, &vault, amount) {
            self.restore(holder, checkpoint);
            return Err(self.reject("deposit", err));
        }

        // 5. Record
        self.state.operation_count = self.state.operation_count.saturating_add(1);
        self.events.emit(VaultEvent::Deposited {
            holder: *holder,
            amount,
            shares_minted,
            total_shares: new_total,
        });
        debug!(amount, shares_minted, total_shares = new_total, "deposit");

        Ok(shares_minted)
    }

    /// Redeem `shares` owned by `holder`, returning the tokens paid out
    pub fn withdraw(&mut self, holder: &Address, shares: u64) -> VaultResult<u64> {
        // 1. Holder must own the shares
        let current = self.shares_of(holder);
        if current < shares {
            return Err(self.reject(
                "withdraw",
                VaultError::InsufficientShares { current, requested: shares },
            ));
        }

        // 2. Payout against the live balance, rounded down
        let total_balance = self.total_balance();
        let amount = amount_for_shares(total_balance, shares, self.state.total_shares)
            .map_err(|err| self.reject("withdraw", err))?;

        // 3. Burn before paying out
        let checkpoint = self.checkpoint(holder);
        let new_total = safe_sub(self.state.total_shares, shares)
            .map_err(|err| self.reject("withdraw", err))?;
        self.state.total_shares = new_total;
        self.set_shares(holder, current - shares);

        // 4. Pay out
        let vault = self.config.vault_address;
        if let Err(err) = self.token.transfer(&vault, holder, amount) {
            self.restore(holder, checkpoint);
            return Err(self.reject("withdraw", err));
        }

        // 5. Record
        self.state.operation_count = self.state.operation_count.saturating_add(1);
        self.events.emit(VaultEvent::Withdrawn {
            holder: *holder,
            shares_burned: shares,
            amount,
            total_shares: new_total,
        });
        debug!(shares, amount, total_shares = new_total, "withdraw");

        Ok(amount)
    }

    // ============ Internal ============

    fn checkpoint(&self, holder: &Address) -> Checkpoint {
        Checkpoint {
            state: self.state,
            holder_shares: self.shares_of(holder),
        }
    }

    fn restore(&mut self, holder: &Address, checkpoint: Checkpoint) {
        self.set_shares(holder, checkpoint.holder_shares);
        self.state = checkpoint.state;
    }

    /// Write a holder balance, keeping `holder_count` in step
    fn set_shares(&mut self, holder: &Address, shares: u64) {
        let previous = if shares == 0 {
            self.shares.remove(holder)
        } else {
            self.shares.insert(*holder, shares)
        };

        match (previous.is_some(), shares > 0) {
            (false, true) => self.state.holder_count += 1,
            (true, false) => self.state.holder_count -= 1,
            _ => {}
        }
    }

    fn reject(&self, operation: &'static str, err: VaultError) -> VaultError {
        warn!(operation, code = err.code(), "{err}");
        err
    }
}

// ============ Tests ============
