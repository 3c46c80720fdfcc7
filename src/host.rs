//! The execution environment the exchange runs in.
//!
//! The exchange never holds balances and never executes foreign code itself.
//! Every external callable unit (tokens, pricing getters, predicate targets,
//! interaction receivers, permit targets, contract signers) is reached through
//! a [`Host`].
//!
//! ## Call Kinds
//!
//! - [`Host::call`]: state-changing call. The callee gets the exchange back
//!   mutably and may re-enter it (reentrancy is part of the model).
//! - [`Host::static_call`]: read-only call. Only shared references are handed
//!   out, so getters and predicates cannot mutate exchange state.
//!
//! ## Transactions
//!
//! The exchange opens a checkpoint at the start of every public mutating
//! operation and either commits or reverts it. Hosts with mutable state of
//! their own (token ledgers) must roll it back on [`Host::revert_to`].

use alloy::primitives::{Address, Bytes};

use crate::engine::LimitOrderProtocol;
use crate::error::Revert;

/// Opaque checkpoint id handed out by a host.
pub type HostCheckpoint = usize;

/// Execution environment of the exchange.
pub trait Host {
    /// Current block timestamp (seconds)
    fn block_timestamp(&self) -> u64;

    /// Whether `account` has code (contract signers use ERC-1271)
    fn is_contract(&self, account: Address) -> bool;

    /// State-changing call from `caller` to `target`
    fn call(
        &mut self,
        exchange: &mut LimitOrderProtocol,
        caller: Address,
        target: Address,
        input: &[u8],
    ) -> Result<Bytes, Revert>;

    /// Read-only call to `target`
    fn static_call(
        &self,
        exchange: &LimitOrderProtocol,
        target: Address,
        input: &[u8],
    ) -> Result<Bytes, Revert>;

    /// Open a checkpoint of host-side state
    fn checkpoint(&mut self) -> HostCheckpoint;

    /// Keep host-side changes since `checkpoint`
    fn commit(&mut self, checkpoint: HostCheckpoint);

    /// Undo host-side changes since `checkpoint`
    fn revert_to(&mut self, checkpoint: HostCheckpoint);
}
