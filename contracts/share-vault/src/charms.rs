//! Charms SDK Integration for the Share Vault
//!
//! Bridges Charms transactions to the transition validator in
//! [`crate::transition`].
//!
//! ## UTXO Model
//!
//! The vault's aggregate state and its token holdings travel together on
//! one UTXO. Each holder's share balance is a separate charm the holder
//! controls.
//!
//! ```text
//! Deposit:
//!   IN:  [Vault state + tokens, Holder shares (optional), Holder tokens]
//!   OUT: [Vault state + more tokens, Holder shares (updated)]
//!
//! Withdraw:
//!   IN:  [Vault state + tokens, Holder shares]
//!   OUT: [Vault state + fewer tokens, Holder shares (remaining, if any), Holder tokens]
//! ```
//!
//! The token amount on the vault UTXO before the transaction is the balance
//! shares are priced against. Tokens sent to that UTXO out of band raise the
//! price for every holder.
//!
//! ## Holder Count
//!
//! Here `VaultState::holder_count` counts live share charms, not distinct
//! owners. A deposit that leaves an owner's existing share charm unspent
//! creates a second record and counts it separately; spending the old charm
//! in the deposit tops it up instead. `total_shares` is exact either way.

use charms_data::{App, Charms, Data, Transaction};
use serde::{Deserialize, Serialize};
use sharevault_common::{
    errors::{VaultError, VaultResult},
    types::{AppId, HolderShares, VaultAction, VaultConfig, VaultState},
};
use tracing::debug;

use crate::{validate, ShareVaultContext};

// ============ Operation Codes ============

/// Operation codes (encoded in witness)
pub mod op {
    /// Create an empty vault
    pub const INITIALIZE: u8 = 0x00;
    /// Deposit tokens for shares
    pub const DEPOSIT: u8 = 0x20;
    /// Redeem shares for tokens
    pub const WITHDRAW: u8 = 0x21;
}

// ============ Witness / Charm Structures ============

/// Witness data for vault operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultWitness {
    /// Operation type (see `op` module)
    pub op: u8,
    /// Token amount for deposits
    pub amount: Option<u64>,
    /// Share amount for withdrawals
    pub shares: Option<u64>,
}

impl VaultWitness {
    pub fn initialize() -> Self {
        Self { op: op::INITIALIZE, amount: None, shares: None }
    }

    pub fn deposit(amount: u64) -> Self {
        Self { op: op::DEPOSIT, amount: Some(amount), shares: None }
    }

    pub fn withdraw(shares: u64) -> Self {
        Self { op: op::WITHDRAW, amount: None, shares: Some(shares) }
    }
}

/// Charm carried by the vault UTXO
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultCharm {
    pub config: VaultConfig,
    pub state: VaultState,
}

/// Vault-side values pulled out of a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultTransition {
    pub config: VaultConfig,
    pub state: VaultState,
    pub new_state: VaultState,
    /// Token amount on the vault UTXO being spent
    pub balance_in: u64,
    /// Token amount on the vault UTXO being created
    pub balance_out: u64,
    pub holder_shares: Option<HolderShares>,
    pub new_holder_shares: Option<HolderShares>,
}

// ============ Main Validation Function ============

/// Validates a vault operation within a Charms transaction
///
/// # Arguments
/// * `app` - The vault app definition
/// * `tx` - The transaction being validated
/// * `_x` - Public inputs (unused)
/// * `w` - Witness data (operation details)
///
/// # Returns
/// `true` if the operation is valid, `false` otherwise
pub fn validate_vault_operation(app: &App, tx: &Transaction, _x: &Data, w: &Data) -> bool {
    let witness = match parse_witness(w) {
        Some(w) => w,
        None => return false,
    };

    let result = if witness.op == op::INITIALIZE {
        validate_initialize(app, tx)
    } else {
        witness_to_action(&witness)
            .ok_or(VaultError::InvalidStateTransition)
            .and_then(|action| {
                let transition = extract_transition(app, tx)?;
                check_transition(&transition, &action)
            })
    };

    match result {
        Ok(()) => true,
        Err(err) => {
            debug!(op = witness.op, code = err.code(), "vault transaction rejected: {err}");
            false
        }
    }
}

/// Check a transition pulled from a transaction against `action`
pub fn check_transition(transition: &VaultTransition, action: &VaultAction) -> VaultResult<()> {
    // Signer is whoever owns the share records involved
    let signer = transition
        .holder_shares
        .as_ref()
        .or(transition.new_holder_shares.as_ref())
        .map(|record| record.owner)
        .ok_or(VaultError::StateNotFound)?;

    let mut ctx = ShareVaultContext::new(
        transition.config.clone(),
        transition.state,
        transition.balance_in,
        signer,
    );
    ctx.new_state = transition.new_state;
    ctx.holder_shares = transition.holder_shares.clone();
    ctx.new_holder_shares = transition.new_holder_shares.clone();
    ctx.token_inputs = transition.balance_out.saturating_sub(transition.balance_in);
    ctx.token_outputs = transition.balance_in.saturating_sub(transition.balance_out);

    validate(&mut ctx, action)
}

/// Initial vault charm must be empty and well-formed
pub fn check_initial_charm(charm: &VaultCharm) -> VaultResult<()> {
    charm.config.validate()?;
    if charm.state != VaultState::new() {
        return Err(VaultError::InvalidStateTransition);
    }
    Ok(())
}

fn validate_initialize(app: &App, tx: &Transaction) -> VaultResult<()> {
    // A vault can only be created, never re-created from a spent one
    if tx.ins.iter().any(|(_, charms)| vault_charm(app, charms).is_some()) {
        return Err(VaultError::InvalidStateTransition);
    }

    let charm = tx
        .outs
        .iter()
        .find_map(|charms| vault_charm(app, charms))
        .ok_or(VaultError::StateNotFound)?;
    check_initial_charm(&charm)
}

// ============ Parsing Functions ============

fn parse_witness(w: &Data) -> Option<VaultWitness> {
    w.value::<VaultWitness>().ok()
}

fn witness_to_action(w: &VaultWitness) -> Option<VaultAction> {
    match w.op {
        op::DEPOSIT => Some(VaultAction::Deposit { amount: w.amount? }),
        op::WITHDRAW => Some(VaultAction::Withdraw { shares: w.shares? }),
        _ => None,
    }
}

// ============ State Extraction ============

/// Extract the vault-side view of a transaction
fn extract_transition(app: &App, tx: &Transaction) -> VaultResult<VaultTransition> {
    let (charm, balance_in) = tx
        .ins
        .iter()
        .find_map(|(_, charms)| vault_charm(app, charms).map(|charm| (charm, charms)))
        .map(|(charm, charms)| {
            let balance = token_amount(charms, &charm.config.token_id);
            (charm, balance)
        })
        .ok_or(VaultError::StateNotFound)?;

    let (new_charm, balance_out) = tx
        .outs
        .iter()
        .find_map(|charms| vault_charm(app, charms).map(|new_charm| (new_charm, charms)))
        .map(|(new_charm, charms)| {
            let balance = token_amount(charms, &charm.config.token_id);
            (new_charm, balance)
        })
        .ok_or(VaultError::StateNotFound)?;

    // Config is fixed for the life of the vault
    if new_charm.config != charm.config {
        return Err(VaultError::InvalidStateTransition);
    }

    let holder_shares = tx
        .ins
        .iter()
        .find_map(|(_, charms)| holder_charm(app, charms));
    let new_holder_shares = tx.outs.iter().find_map(|charms| holder_charm(app, charms));

    Ok(VaultTransition {
        config: charm.config,
        state: charm.state,
        new_state: new_charm.state,
        balance_in: balance_in?,
        balance_out: balance_out?,
        holder_shares,
        new_holder_shares,
    })
}

fn vault_charm(app: &App, charms: &Charms) -> Option<VaultCharm> {
    charms.get(app).and_then(|data| data.value::<VaultCharm>().ok())
}

fn holder_charm(app: &App, charms: &Charms) -> Option<HolderShares> {
    charms.get(app).and_then(|data| data.value::<HolderShares>().ok())
}

/// Sum of fungible amounts of `token_id` in one UTXO's charms
fn token_amount(charms: &Charms, token_id: &AppId) -> VaultResult<u64> {
    charms
        .iter()
        .filter(|(app, _)| app.tag == 't' && app.identity.0 == *token_id)
        .filter_map(|(_, data)| data.value::<u64>().ok())
        .try_fold(0u64, |total, amount| {
            total.checked_add(amount).ok_or(VaultError::Overflow)
        })
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;
    use sharevault_common::types::Address;

    const TOKEN_ID: [u8; 32] = [42u8; 32];
    const VAULT: Address = [9u8; 32];
    const ALICE: Address = [1u8; 32];

    fn config() -> VaultConfig {
        VaultConfig::new(TOKEN_ID, VAULT).unwrap()
    }

    fn state(total_shares: u64, holder_count: u64, operation_count: u64) -> VaultState {
        VaultState { total_shares, holder_count, operation_count }
    }

    #[test]
    fn test_witness_serialization() {
        let witness = VaultWitness::deposit(1_000);
        let data = Data::from(&witness);
        let parsed = parse_witness(&data).unwrap();

        assert_eq!(parsed, witness);
    }

    #[test]
    fn test_witness_to_action() {
        let action = witness_to_action(&VaultWitness::deposit(1_000)).unwrap();
        assert_eq!(action, VaultAction::Deposit { amount: 1_000 });

        let action = witness_to_action(&VaultWitness::withdraw(3)).unwrap();
        assert_eq!(action, VaultAction::Withdraw { shares: 3 });
    }

    #[test]
    fn test_incomplete_witness_rejected() {
        let witness = VaultWitness { op: op::WITHDRAW, amount: Some(5), shares: None };
        assert!(witness_to_action(&witness).is_none());
        assert!(witness_to_action(&VaultWitness::initialize()).is_none());
    }

    #[test]
    fn test_initial_charm_must_be_empty() {
        let charm = VaultCharm { config: config(), state: VaultState::new() };
        assert!(check_initial_charm(&charm).is_ok());

        let charm = VaultCharm { config: config(), state: state(1, 1, 1) };
        assert_eq!(check_initial_charm(&charm), Err(VaultError::InvalidStateTransition));
    }

    #[test]
    fn test_deposit_transition_from_balances() {
        // Vault UTXO: 10 tokens before, 30 after; one holder with one share
        let transition = VaultTransition {
            config: config(),
            state: state(1, 1, 1),
            new_state: state(3, 2, 2),
            balance_in: 10,
            balance_out: 30,
            holder_shares: None,
            new_holder_shares: Some(HolderShares::new(ALICE, 2)),
        };

        assert!(check_transition(&transition, &VaultAction::Deposit { amount: 20 }).is_ok());
        assert!(check_transition(&transition, &VaultAction::Deposit { amount: 10 }).is_err());
    }

    #[test]
    fn test_withdraw_transition_from_balances() {
        let transition = VaultTransition {
            config: config(),
            state: state(3, 2, 2),
            new_state: state(1, 1, 3),
            balance_in: 60,
            balance_out: 20,
            holder_shares: Some(HolderShares::new(ALICE, 2)),
            new_holder_shares: None,
        };

        assert!(check_transition(&transition, &VaultAction::Withdraw { shares: 2 }).is_ok());
    }

    #[test]
    fn test_unspent_record_counts_as_new_record() {
        // Alice already holds a share charm but deposits without spending it
        let base = VaultTransition {
            config: config(),
            state: state(1, 1, 1),
            new_state: state(2, 1, 2),
            balance_in: 10,
            balance_out: 20,
            holder_shares: None,
            new_holder_shares: Some(HolderShares::new(ALICE, 1)),
        };
        let action = VaultAction::Deposit { amount: 10 };

        assert_eq!(check_transition(&base, &action), Err(VaultError::InvalidStateTransition));

        let separate = VaultTransition { new_state: state(2, 2, 2), ..base.clone() };
        assert!(check_transition(&separate, &action).is_ok());

        let merged = VaultTransition {
            holder_shares: Some(HolderShares::new(ALICE, 1)),
            new_holder_shares: Some(HolderShares::new(ALICE, 2)),
            ..base
        };
        assert!(check_transition(&merged, &action).is_ok());
    }

    #[test]
    fn test_deposit_by_vault_account_rejected() {
        let transition = VaultTransition {
            config: config(),
            state: state(1, 1, 1),
            new_state: state(2, 2, 2),
            balance_in: 10,
            balance_out: 20,
            holder_shares: None,
            new_holder_shares: Some(HolderShares::new(VAULT, 1)),
        };

        assert!(matches!(
            check_transition(&transition, &VaultAction::Deposit { amount: 10 }),
            Err(VaultError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_transition_without_holder_record_rejected() {
        let transition = VaultTransition {
            config: config(),
            state: state(1, 1, 1),
            new_state: state(1, 1, 2),
            balance_in: 10,
            balance_out: 10,
            holder_shares: None,
            new_holder_shares: None,
        };

        assert_eq!(
            check_transition(&transition, &VaultAction::Withdraw { shares: 0 }),
            Err(VaultError::StateNotFound)
        );
    }
}
