//! Share Math
//!
//! Mint and redemption quantities. All products are taken in `u128` and
//! divided with floor semantics, so results truncate toward zero exactly as
//! integer division does.

use crate::constants::vault::{BOOTSTRAP_SHARES, PRICE_PRECISION};
use crate::errors::{VaultError, VaultResult};

/// Calculate shares minted for a deposit
///
/// shares = floor(total_shares * amount / total_balance)
///
/// # Arguments
/// * `total_shares` - Shares outstanding before the deposit
/// * `total_balance` - Vault token balance before the deposit's funds arrive
/// * `amount` - Deposited token amount
///
/// # Returns
/// `BOOTSTRAP_SHARES` when the vault has no shares, whatever the amount.
/// `DivisionByZero` when shares exist but the balance has been drained.
pub fn shares_for_deposit(total_shares: u64, total_balance: u64, amount: u64) -> VaultResult<u64> {
    if total_shares == 0 {
        return Ok(BOOTSTRAP_SHARES);
    }

    let shares = (total_shares as u128)
        .checked_mul(amount as u128)
        .ok_or(VaultError::Overflow)?
        .checked_div(total_balance as u128)
        .ok_or(VaultError::DivisionByZero)?;

    u64::try_from(shares).map_err(|_| VaultError::Overflow)
}

/// Calculate tokens paid out for redeeming shares
///
/// amount = floor(total_balance * shares / total_shares)
///
/// Rounds down, so repeated partial redemptions never pay out more than
/// the balance.
pub fn amount_for_shares(total_balance: u64, shares: u64, total_shares: u64) -> VaultResult<u64> {
    if shares == 0 {
        return Ok(0);
    }

    let amount = (total_balance as u128)
        .checked_mul(shares as u128)
        .ok_or(VaultError::Overflow)?
        .checked_div(total_shares as u128)
        .ok_or(VaultError::DivisionByZero)?;

    // amount <= total_balance whenever shares <= total_shares
    u64::try_from(amount).map_err(|_| VaultError::Overflow)
}

/// Share price scaled by `PRICE_PRECISION`, or `None` with no shares outstanding
pub fn share_price(total_balance: u64, total_shares: u64) -> Option<u128> {
    if total_shares == 0 {
        return None;
    }
    Some((total_balance as u128) * PRICE_PRECISION / (total_shares as u128))
}

/// Safe addition with overflow check
pub fn safe_add(a: u64, b: u64) -> VaultResult<u64> {
    a.checked_add(b).ok_or(VaultError::Overflow)
}

/// Safe subtraction with underflow check
pub fn safe_sub(a: u64, b: u64) -> VaultResult<u64> {
    a.checked_sub(b).ok_or(VaultError::Underflow)
}
