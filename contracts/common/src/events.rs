//! Vault Events
//!
//! Events are emitted during execution and can be indexed off-chain.
//! Both the vault and the token ledger write into an `EventLog`.

use crate::Vec;
use crate::constants::events::MAX_RETAINED_EVENTS;
use crate::types::Address;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// Event types for indexing and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum EventType {
    // Vault Events (0x20 - 0x3F)
    Deposited = 0x20,
    Withdrawn = 0x21,

    // Token Events (0x40 - 0x5F)
    TokenTransfer = 0x40,
    TokenMint = 0x41,
    Approval = 0x42,
}

/// All events emitted by the vault and its token ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum VaultEvent {
    // ============ Vault Events ============

    /// Emitted on every successful deposit
    Deposited {
        holder: Address,
        amount: u64,
        shares_minted: u64,
        total_shares: u64,
    },

    /// Emitted on every successful withdrawal
    Withdrawn {
        holder: Address,
        shares_burned: u64,
        amount: u64,
        total_shares: u64,
    },

    // ============ Token Events ============

    /// Emitted on token transfer
    TokenTransfer {
        from: Address,
        to: Address,
        amount: u64,
    },

    /// Emitted when tokens are minted
    TokenMint {
        to: Address,
        amount: u64,
        new_total_supply: u64,
    },

    /// Emitted when an allowance is set
    Approval {
        owner: Address,
        spender: Address,
        amount: u64,
    },
}

impl VaultEvent {
    /// Get the event type for filtering
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Deposited { .. } => EventType::Deposited,
            Self::Withdrawn { .. } => EventType::Withdrawn,
            Self::TokenTransfer { .. } => EventType::TokenTransfer,
            Self::TokenMint { .. } => EventType::TokenMint,
            Self::Approval { .. } => EventType::Approval,
        }
    }

    /// Serialize event to bytes for storage/transmission
    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }

    /// Deserialize event from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        borsh::from_slice(bytes).ok()
    }
}

/// Event log for collecting events during execution
///
/// Bounded: once `MAX_RETAINED_EVENTS` is reached the oldest event is
/// dropped. Callers that need every event drain with `take`.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<VaultEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Emit an event (add to log)
    pub fn emit(&mut self, event: VaultEvent) {
        if self.events.len() == MAX_RETAINED_EVENTS {
            self.events.remove(0);
        }
        self.events.push(event);
    }

    /// Get all events
    pub fn events(&self) -> &[VaultEvent] {
        &self.events
    }

    /// Drain all events, leaving the log empty
    pub fn take(&mut self) -> Vec<VaultEvent> {
        core::mem::take(&mut self.events)
    }

    /// Filter events by type
    pub fn filter_by_type(&self, event_type: EventType) -> Vec<&VaultEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Most recent event
    pub fn last(&self) -> Option<&VaultEvent> {
        self.events.last()
    }

    /// Check if any events were emitted
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Get number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if the log holds no events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
