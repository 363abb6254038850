//! Share Vault Common Library
//!
//! Shared types, constants, and share math for the share vault crates.
//!
//! A share vault pools one fungible token. Depositors receive shares; each
//! share is a claim on `balance / total_shares` of whatever the vault holds
//! at redemption time, so tokens sent to the vault out of band accrue to
//! every holder pro rata.
//!
//! ## Modules
//!
//! - **constants**: Bootstrap share count, price precision, token metadata
//! - **errors**: `VaultError` and the `VaultResult` alias
//! - **types**: Addresses, config, aggregate state, snapshots, actions
//! - **math**: Floor-division mint and redemption quantities
//! - **events**: `VaultEvent` and the bounded `EventLog`
//! - **token_ledger**: The `TokenLedger` trait the vault consumes
//!
//! This crate is `no_std` compatible for WASM compilation when built
//! without the default `std` feature.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

// Re-export Vec for submodules based on feature
#[cfg(not(feature = "std"))]
pub use alloc::vec::Vec;
#[cfg(feature = "std")]
pub use std::vec::Vec;

pub mod constants;
pub mod errors;
pub mod types;
pub mod math;
pub mod events;
pub mod token_ledger;

// Re-exports for convenience
pub use errors::*;
pub use types::*;
pub use math::*;
pub use events::*;
pub use token_ledger::TokenLedger;
