//! Thread-safe vault handle
//!
//! Every call takes the one lock around the whole vault, so deposits and
//! withdrawals from different threads run one at a time and each sees the
//! previous one's effects.

use std::sync::{Arc, Mutex, MutexGuard};

use sharevault_common::{
    errors::{VaultError, VaultResult},
    token_ledger::TokenLedger,
    types::{Address, VaultSnapshot},
};

use crate::ShareVault;

/// Cloneable handle to a vault shared between threads
#[derive(Debug)]
pub struct SharedShareVault<L: TokenLedger> {
    inner: Arc<Mutex<ShareVault<L>>>,
}

impl<L: TokenLedger> Clone for SharedShareVault<L> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<L: TokenLedger> SharedShareVault<L> {
    /// Wrap a vault
    pub fn new(vault: ShareVault<L>) -> Self {
        Self { inner: Arc::new(Mutex::new(vault)) }
    }

    fn lock(&self) -> VaultResult<MutexGuard<'_, ShareVault<L>>> {
        self.inner.lock().map_err(|_| VaultError::LockPoisoned)
    }

    /// Deposit under the vault lock
    pub fn deposit(&self, holder: &Address, amount: u64) -> VaultResult<u64> {
        self.lock()?.deposit(holder, amount)
    }

    /// Withdraw under the vault lock
    pub fn withdraw(&self, holder: &Address, shares: u64) -> VaultResult<u64> {
        self.lock()?.withdraw(holder, shares)
    }

    /// Run `f` with exclusive access, e.g. to combine several calls
    pub fn with<R>(&self, f: impl FnOnce(&mut ShareVault<L>) -> VaultResult<R>) -> VaultResult<R> {
        let mut guard = self.lock()?;
        f(&mut guard)
    }

    pub fn total_shares(&self) -> VaultResult<u64> {
        Ok(self.lock()?.total_shares())
    }

    pub fn shares_of(&self, holder: &Address) -> VaultResult<u64> {
        Ok(self.lock()?.shares_of(holder))
    }

    pub fn total_balance(&self) -> VaultResult<u64> {
        Ok(self.lock()?.total_balance())
    }

    pub fn snapshot(&self) -> VaultResult<VaultSnapshot> {
        Ok(self.lock()?.snapshot())
    }

    /// Unwrap the vault once every other handle is gone
    ///
    /// Returns the handle back if it is still shared.
    pub fn try_into_inner(self) -> Result<ShareVault<L>, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => mutex
                .into_inner()
                .map_err(|poisoned| Self::new(poisoned.into_inner())),
            Err(inner) => Err(Self { inner }),
        }
    }
}
