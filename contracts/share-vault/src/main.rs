//! Share Vault - Charms App Entry Point
//!
//! Validates vault transactions on Bitcoin using client-side validation.
//!
//! - **Initialize**: creates an empty vault UTXO
//! - **Deposit**: holder moves tokens onto the vault UTXO and receives shares
//! - **Withdraw**: holder burns shares for a proportional slice of the vault UTXO's tokens

use charms_sdk::data::{App, Data, Transaction};

/// Charms contract entry point for the vault app
pub fn app_contract(app: &App, tx: &Transaction, x: &Data, w: &Data) -> bool {
    sharevault::charms::validate_vault_operation(app, tx, x, w)
}

charms_sdk::main!(app_contract);
