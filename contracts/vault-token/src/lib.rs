//! Vault Asset Token Ledger
//!
//! In-memory fungible token ledger backing the share vault. Tracks
//! balances, allowances and total supply, and implements `TokenLedger` so
//! a `ShareVault` can read and move funds through it.
//!
//! Minting is unrestricted here: the ledger stands in for whatever token
//! the vault is deployed against, and tests seed balances with `mint`.

use std::collections::BTreeMap;
use std::vec::Vec;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use sharevault_common::{
    constants::token,
    errors::{VaultError, VaultResult},
    events::{EventLog, VaultEvent},
    math::{safe_add, safe_sub},
    token_ledger::TokenLedger,
    types::{Address, AppId, ZERO_ADDRESS},
};

// ============ Token Balance ============

/// Balance entry, as returned by `TokenLedgerState::balances`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct TokenBalance {
    /// Owner address
    pub owner: Address,
    /// Amount held (8 decimals)
    pub amount: u64,
}

impl TokenBalance {
    pub fn new(owner: Address, amount: u64) -> Self {
        Self { owner, amount }
    }
}

// ============ Token Ledger State ============

/// Balances, allowances and supply of one token
#[derive(Debug, Clone)]
pub struct TokenLedgerState {
    /// Identifier of this token
    token_id: AppId,
    balances: BTreeMap<Address, u64>,
    /// (owner, spender) -> remaining allowance
    allowances: BTreeMap<(Address, Address), u64>,
    total_supply: u64,
    events: EventLog,
}

impl TokenLedgerState {
    /// Create an empty ledger for `token_id`
    pub fn new(token_id: AppId) -> Self {
        Self {
            token_id,
            balances: BTreeMap::new(),
            allowances: BTreeMap::new(),
            total_supply: 0,
            events: EventLog::new(),
        }
    }

    /// Identifier of this token
    pub fn token_id(&self) -> AppId {
        self.token_id
    }

    /// Total tokens in existence
    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    /// Remaining amount `spender` may move out of `owner`
    pub fn allowance(&self, owner: &Address, spender: &Address) -> u64 {
        self.allowances.get(&(*owner, *spender)).copied().unwrap_or(0)
    }

    /// All non-zero balances, ordered by owner
    pub fn balances(&self) -> Vec<TokenBalance> {
        self.balances
            .iter()
            .map(|(owner, amount)| TokenBalance::new(*owner, *amount))
            .collect()
    }

    /// Events emitted so far
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Drain emitted events
    pub fn take_events(&mut self) -> Vec<VaultEvent> {
        self.events.take()
    }

    /// Create `amount` new tokens for `to`
    pub fn mint(&mut self, to: &Address, amount: u64) -> VaultResult<()> {
        if *to == ZERO_ADDRESS {
            return Err(VaultError::InvalidAddress { reason: "cannot mint to zero address" });
        }

        let new_supply = safe_add(self.total_supply, amount)?;
        if new_supply > token::MAX_SUPPLY {
            return Err(VaultError::ExceedsMaxSupply {
                requested: amount,
                maximum: token::MAX_SUPPLY,
            });
        }

        let new_balance = safe_add(self.balance(to), amount)?;
        self.set_balance(to, new_balance);
        self.total_supply = new_supply;

        self.events.emit(VaultEvent::TokenMint {
            to: *to,
            amount,
            new_total_supply: new_supply,
        });
        debug!(amount, new_supply, "minted tokens");

        Ok(())
    }

    /// Let `spender` move up to `amount` of `owner`'s tokens
    ///
    /// Overwrites any previous allowance.
    pub fn approve(&mut self, owner: &Address, spender: &Address, amount: u64) -> VaultResult<()> {
        if *spender == ZERO_ADDRESS {
            return Err(VaultError::InvalidAddress { reason: "cannot approve zero address" });
        }

        if amount == 0 {
            self.allowances.remove(&(*owner, *spender));
        } else {
            self.allowances.insert((*owner, *spender), amount);
        }

        self.events.emit(VaultEvent::Approval {
            owner: *owner,
            spender: *spender,
            amount,
        });

        Ok(())
    }

    fn balance(&self, account: &Address) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn set_balance(&mut self, account: &Address, amount: u64) {
        if amount == 0 {
            self.balances.remove(account);
        } else {
            self.balances.insert(*account, amount);
        }
    }

    /// Move tokens, checking everything before writing anything
    fn move_tokens(&mut self, from: &Address, to: &Address, amount: u64) -> VaultResult<()> {
        if *to == ZERO_ADDRESS {
            return Err(VaultError::InvalidAddress { reason: "cannot transfer to zero address" });
        }

        let from_balance = self.balance(from);
        if from_balance < amount {
            warn!(available = from_balance, requested = amount, "transfer rejected");
            return Err(VaultError::InsufficientBalance {
                available: from_balance,
                requested: amount,
            });
        }

        if from != to {
            let new_to = safe_add(self.balance(to), amount)?;
            let new_from = safe_sub(from_balance, amount)?;
            self.set_balance(from, new_from);
            self.set_balance(to, new_to);
        }

        self.events.emit(VaultEvent::TokenTransfer {
            from: *from,
            to: *to,
            amount,
        });

        Ok(())
    }
}

impl TokenLedger for TokenLedgerState {
    fn balance_of(&self, account: &Address) -> u64 {
        self.balance(account)
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> VaultResult<()> {
        let allowance = self.allowance(from, spender);
        if allowance < amount {
            warn!(available = allowance, requested = amount, "transfer_from rejected");
            return Err(VaultError::InsufficientAllowance {
                available: allowance,
                requested: amount,
            });
        }

        self.move_tokens(from, to, amount)?;

        let remaining = allowance - amount;
        if remaining == 0 {
            self.allowances.remove(&(*from, *spender));
        } else {
            self.allowances.insert((*from, *spender), remaining);
        }

        Ok(())
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: u64) -> VaultResult<()> {
        self.move_tokens(from, to, amount)
    }
}

// ============ Tests ============
