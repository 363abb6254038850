//! Token Ledger Interface
//!
//! The vault never stores token balances. It reads and moves them through
//! this trait, implemented by whatever fungible-token ledger hosts the vault.

use crate::errors::VaultResult;
use crate::types::Address;

/// Fungible token ledger consumed by the vault
///
/// Implementations must leave balances untouched when they return an error.
pub trait TokenLedger {
    /// Current holdings of `account`, including out-of-band transfers
    fn balance_of(&self, account: &Address) -> u64;

    /// Move `amount` from `from` to `to` on behalf of `spender`
    ///
    /// Requires an allowance of at least `amount` granted by `from` to
    /// `spender`, and a sufficient balance.
    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> VaultResult<()>;

    /// Move `amount` out of `from`'s own holdings to `to`
    fn transfer(&mut self, from: &Address, to: &Address, amount: u64) -> VaultResult<()>;
}

impl<L: TokenLedger + ?Sized> TokenLedger for &mut L {
    fn balance_of(&self, account: &Address) -> u64 {
        (**self).balance_of(account)
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> VaultResult<()> {
        (**self).transfer_from(spender, from, to, amount)
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: u64) -> VaultResult<()> {
        (**self).transfer(from, to, amount)
    }
}
