//! Transition Validation
//!
//! Checks a *proposed* vault update instead of executing one. A host that
//! carries vault state between transactions (see the `charms` module) hands
//! over the state before and after, the holder's share record before and
//! after, and the token flows; `validate` accepts exactly the updates
//! `ShareVault::deposit` and `ShareVault::withdraw` would have produced.

use sharevault_common::{
    errors::{VaultError, VaultResult},
    events::{EventLog, VaultEvent},
    math::{amount_for_shares, safe_add, safe_sub, shares_for_deposit},
    types::{Address, HolderShares, VaultAction, VaultConfig, VaultState},
};

// ============ Validation Context ============

/// Context for validating vault operations
pub struct ShareVaultContext {
    /// Current vault state
    pub state: VaultState,
    /// Proposed vault state
    pub new_state: VaultState,
    /// Vault config
    pub config: VaultConfig,
    /// Holder's share record before the operation (if any)
    pub holder_shares: Option<HolderShares>,
    /// Holder's share record after the operation (absent once emptied)
    pub new_holder_shares: Option<HolderShares>,
    /// Vault token balance before the operation
    pub vault_balance: u64,
    /// Tokens moved into the vault account
    pub token_inputs: u64,
    /// Tokens moved out of the vault account
    pub token_outputs: u64,
    /// Signer address
    pub signer: Address,
    /// Event log
    pub events: EventLog,
}

impl ShareVaultContext {
    /// Context with no flows and no holder records
    pub fn new(
        config: VaultConfig,
        state: VaultState,
        vault_balance: u64,
        signer: Address,
    ) -> Self {
        Self {
            state,
            new_state: state,
            config,
            holder_shares: None,
            new_holder_shares: None,
            vault_balance,
            token_inputs: 0,
            token_outputs: 0,
            signer,
            events: EventLog::new(),
        }
    }
}

// ============ Validation Functions ============

/// Main validation entry point
pub fn validate(ctx: &mut ShareVaultContext, action: &VaultAction) -> VaultResult<()> {
    match action {
        VaultAction::Deposit { amount } => validate_deposit(ctx, *amount),
        VaultAction::Withdraw { shares } => validate_withdraw(ctx, *shares),
    }
}

/// Validate a deposit of `amount` tokens by the signer
fn validate_deposit(ctx: &mut ShareVaultContext, amount: u64) -> VaultResult<()> {
    // 1. Vault account never holds shares
    if ctx.signer == ctx.config.vault_address {
        return Err(VaultError::InvalidAddress { reason: "holder is the vault account" });
    }

    // Existing record must belong to the signer
    let current = owned_shares(ctx, ctx.holder_shares.as_ref())?;

    // 2. Tokens must actually arrive
    if ctx.token_inputs != amount {
        return Err(VaultError::InsufficientBalance {
            available: ctx.token_inputs,
            requested: amount,
        });
    }
    if ctx.token_outputs != 0 {
        return Err(VaultError::InvalidStateTransition);
    }

    // 3. Shares priced against the balance before the deposit
    let shares_minted = shares_for_deposit(ctx.state.total_shares, ctx.vault_balance, amount)?;

    // 4. Verify holder record
    let expected_holder = safe_add(current, shares_minted)?;
    let proposed = owned_shares(ctx, ctx.new_holder_shares.as_ref())?;
    if proposed != expected_holder {
        return Err(VaultError::InvalidStateTransition);
    }

    // 5. Verify vault state
    let expected_total = safe_add(ctx.state.total_shares, shares_minted)?;
    let expected = expected_state(&ctx.state, expected_total, current, expected_holder)?;
    if ctx.new_state != expected {
        return Err(VaultError::InvalidStateTransition);
    }

    // 6. Emit event
    ctx.events.emit(VaultEvent::Deposited {
        holder: ctx.signer,
        amount,
        shares_minted,
        total_shares: expected_total,
    });

    Ok(())
}

/// Validate a redemption of `shares` by the signer
fn validate_withdraw(ctx: &mut ShareVaultContext, shares: u64) -> VaultResult<()> {
    // 1. Signer must own the shares
    let current = owned_shares(ctx, ctx.holder_shares.as_ref())?;
    if current < shares {
        return Err(VaultError::InsufficientShares {
            current,
            requested: shares,
        });
    }

    // 2. Payout against the balance, rounded down
    let amount = amount_for_shares(ctx.vault_balance, shares, ctx.state.total_shares)?;
    if ctx.token_outputs != amount || ctx.token_inputs != 0 {
        return Err(VaultError::InvalidStateTransition);
    }

    // 3. Verify holder record
    let remaining = safe_sub(current, shares)?;
    let proposed = owned_shares(ctx, ctx.new_holder_shares.as_ref())?;
    if proposed != remaining {
        return Err(VaultError::InvalidStateTransition);
    }

    // 4. Verify vault state
    let expected_total = safe_sub(ctx.state.total_shares, shares)?;
    let expected = expected_state(&ctx.state, expected_total, current, remaining)?;
    if ctx.new_state != expected {
        return Err(VaultError::InvalidStateTransition);
    }

    // 5. Emit event
    ctx.events.emit(VaultEvent::Withdrawn {
        holder: ctx.signer,
        shares_burned: shares,
        amount,
        total_shares: expected_total,
    });

    Ok(())
}

// ============ Helper Functions ============

/// Shares in a record, which must belong to the signer
fn owned_shares(ctx: &ShareVaultContext, record: Option<&HolderShares>) -> VaultResult<u64> {
    match record {
        Some(record) if record.owner != ctx.signer => Err(VaultError::InvalidStateTransition),
        Some(record) => Ok(record.shares),
        None => Ok(0),
    }
}

/// State after one operation moving a holder from `before` to `after` shares
fn expected_state(
    state: &VaultState,
    total_shares: u64,
    before: u64,
    after: u64,
) -> VaultResult<VaultState> {
    let holder_count = match (before > 0, after > 0) {
        (false, true) => safe_add(state.holder_count, 1)?,
        (true, false) => safe_sub(state.holder_count, 1)?,
        _ => state.holder_count,
    };

    Ok(VaultState {
        total_shares,
        holder_count,
        operation_count: state.operation_count.saturating_add(1),
    })
}

// ============ Tests ============
