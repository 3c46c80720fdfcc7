//! Order-fill engine for the limit order protocol.
//!
//! ## Design Principles
//!
//! The engine is designed for:
//!
//! 1. **Determinism**: Same input always produces same output
//! 2. **Integer Math**: 256-bit fixed-width arithmetic, overflow is an error
//! 3. **Synchronous Execution**: External calls are nested, never concurrent
//! 4. **Atomicity**: Every public mutating call either fully applies or
//!    leaves no trace
//!
//! ## Fill Order
//!
//! - Remaining-amount write happens before any externally controlled call
//!   except the first-fill permit, which is followed by a re-check
//! - Transfers run maker→target, then taker→maker (or receiver)
//! - Interaction hooks run after the transfer they follow
//!
//! ## Example
//!
//! ```
//! use alloy::primitives::{Address, U256};
//! use limit_order_protocol::config::ProtocolConfig;
//! use limit_order_protocol::engine::LimitOrderProtocol;
//!
//! let exchange = LimitOrderProtocol::new(ProtocolConfig::new(1, Address::repeat_byte(0xEE)));
//! assert_eq!(exchange.address(), Address::repeat_byte(0xEE));
//! assert!(exchange.remaining_raw(&Default::default()).is_zero());
//! ```

pub mod amounts;
mod fill;
mod nonce;
mod predicate;
mod rfq;

pub use amounts::{get_maker_amount, get_taker_amount, mul_div_ceil, mul_div_floor};
pub use fill::{FillRequest, FillResult};
pub(crate) use fill::is_true_word;
pub use predicate::PredicateBuilder;
pub use rfq::RfqFill;

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol_types::{SolInterface, SolValue};
use tracing::warn;

use crate::abi::IAmountCalculator::IAmountCalculatorCalls;
use crate::abi::IExchangeViews::IExchangeViewsCalls;
use crate::abi::IPredicateHelper::IPredicateHelperCalls;
use crate::config::ProtocolConfig;
use crate::error::{ProtocolError, Result};
use crate::hashing::OrderHasher;
use crate::host::Host;
use crate::storage::ProtocolState;
use crate::types::{state_root, Event, Order, OrderRFQ, ORDER_UNSEEN};

/// The exchange: protocol state plus its deployment identity.
#[derive(Debug)]
pub struct LimitOrderProtocol {
    config: ProtocolConfig,
    hasher: OrderHasher,
    state: ProtocolState,
}

impl LimitOrderProtocol {
    /// Deploy an exchange at `config.verifying_contract`
    pub fn new(config: ProtocolConfig) -> Self {
        let hasher = OrderHasher::new(&config);
        Self {
            config,
            hasher,
            state: ProtocolState::new(),
        }
    }

    // ========================================================================
    // Identity
    // ========================================================================

    /// Deployment address (also the self-call target)
    #[inline]
    pub fn address(&self) -> Address {
        self.config.verifying_contract
    }

    /// Configuration the exchange was deployed with
    #[inline]
    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// EIP-712 domain separator
    #[inline]
    pub fn domain_separator(&self) -> B256 {
        self.hasher.domain_separator()
    }

    /// Hasher bound to this deployment
    #[inline]
    pub fn hasher(&self) -> &OrderHasher {
        &self.hasher
    }

    /// Digest a maker signs for `order`
    pub fn hash_order(&self, order: &Order) -> B256 {
        self.hasher.hash_order(order)
    }

    /// Digest a maker signs for an RFQ `order`
    pub fn hash_order_rfq(&self, order: &OrderRFQ) -> B256 {
        self.hasher.hash_order_rfq(order)
    }

    // ========================================================================
    // Views
    // ========================================================================

    /// Maker units left on an order.
    ///
    /// # Errors
    ///
    /// `UnknownOrder` if the order has never been filled or cancelled.
    pub fn remaining(&self, order_hash: &B256) -> Result<U256> {
        let raw = self.state.remaining_raw(order_hash);
        if raw == ORDER_UNSEEN {
            return Err(ProtocolError::UnknownOrder);
        }
        Ok(raw - U256::from(1u64))
    }

    /// Raw `remaining + 1` sentinel (0 = unseen, 1 = filled or cancelled)
    #[inline]
    pub fn remaining_raw(&self, order_hash: &B256) -> U256 {
        self.state.remaining_raw(order_hash)
    }

    /// Raw sentinels for several orders, in input order
    pub fn remainings_raw(&self, order_hashes: &[B256]) -> Vec<U256> {
        order_hashes
            .iter()
            .map(|hash| self.state.remaining_raw(hash))
            .collect()
    }

    /// Current nonce of `maker`
    #[inline]
    pub fn nonce(&self, maker: Address) -> U256 {
        self.state.nonce(&maker)
    }

    /// RFQ invalidator bitmap of `maker` at `slot`
    #[inline]
    pub fn invalidator_for_order_rfq(&self, maker: Address, slot: u64) -> U256 {
        self.state.invalidator(&maker, slot)
    }

    /// Event log, oldest first
    #[inline]
    pub fn events(&self) -> &[Event] {
        self.state.events()
    }

    /// Number of remaining-amount records ever created
    #[inline]
    pub fn order_count(&self) -> usize {
        self.state.remaining().len()
    }

    /// SHA-256 commitment over every remaining-amount record
    pub fn state_root(&self) -> Result<[u8; 32]> {
        state_root(self.state.remaining().entries())
    }

    /// [`Self::state_root`] as lowercase hex
    pub fn state_root_hex(&self) -> Result<String> {
        Ok(hex::encode(self.state_root()?))
    }

    // ========================================================================
    // Transactions
    // ========================================================================

    /// Run `op` atomically against protocol and host state.
    ///
    /// Nested invocations (reentrant callbacks) open nested checkpoints; an
    /// error rolls back to the checkpoint of the call that raised it.
    pub(crate) fn transact<T>(
        &mut self,
        host: &mut dyn Host,
        op: &'static str,
        f: impl FnOnce(&mut Self, &mut dyn Host) -> Result<T>,
    ) -> Result<T> {
        let checkpoint = self.state.checkpoint();
        let host_checkpoint = host.checkpoint();
        match f(self, host) {
            Ok(value) => {
                self.state.commit(checkpoint);
                host.commit(host_checkpoint);
                Ok(value)
            }
            Err(err) => {
                self.state.revert_to(checkpoint);
                host.revert_to(host_checkpoint);
                warn!(op, error = %err, "transaction rolled back");
                Err(err)
            }
        }
    }

    // ========================================================================
    // Read-only calls
    // ========================================================================

    /// Read-only call, answered in-process when `target` is the exchange
    pub(crate) fn static_call_at(
        &self,
        host: &dyn Host,
        target: Address,
        input: &[u8],
        depth: usize,
    ) -> Result<Bytes> {
        if target == self.address() {
            return self.self_static_call(host, input, depth);
        }
        host.static_call(self, target, input)
            .map_err(|revert| ProtocolError::call_failed(target, revert))
    }

    fn self_static_call(&self, host: &dyn Host, input: &[u8], depth: usize) -> Result<Bytes> {
        let Some(selector) = input.get(..4) else {
            return Err(ProtocolError::UnknownSelector(hex::encode(input)));
        };
        let mut sel = [0u8; 4];
        sel.copy_from_slice(selector);

        if IAmountCalculatorCalls::valid_selector(sel) {
            let call = IAmountCalculatorCalls::abi_decode(input).map_err(encoding_error)?;
            return amounts::dispatch(call);
        }
        if IPredicateHelperCalls::valid_selector(sel) {
            let call = IPredicateHelperCalls::abi_decode(input).map_err(encoding_error)?;
            return self.eval_helper(host, call, depth);
        }
        if IExchangeViewsCalls::valid_selector(sel) {
            let call = IExchangeViewsCalls::abi_decode(input).map_err(encoding_error)?;
            let word = match call {
                IExchangeViewsCalls::nonce(c) => self.nonce(c.maker),
                IExchangeViewsCalls::remainingRaw(c) => self.remaining_raw(&c.orderHash),
            };
            return Ok(word.abi_encode().into());
        }
        Err(ProtocolError::UnknownSelector(hex::encode(sel)))
    }

    // ========================================================================
    // Storage access for the operation modules
    // ========================================================================

    #[inline]
    pub(crate) fn state_mut(&mut self) -> &mut ProtocolState {
        &mut self.state
    }
}

fn encoding_error(err: alloy::sol_types::Error) -> ProtocolError {
    ProtocolError::Encoding(err.to_string())
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{IAmountCalculator, IExchangeViews};
    use crate::error::Revert;
    use crate::host::HostCheckpoint;
    use crate::types::ORDER_FILLED;
    use alloy::sol_types::SolCall;

    const EXCHANGE: Address = Address::new([0xEE; 20]);

    /// Host with no accounts: every external call reverts
    struct NullHost;

    impl Host for NullHost {
        fn block_timestamp(&self) -> u64 {
            1_000
        }
        fn is_contract(&self, _account: Address) -> bool {
            false
        }
        fn call(
            &mut self,
            _exchange: &mut LimitOrderProtocol,
            _caller: Address,
            _target: Address,
            _input: &[u8],
        ) -> std::result::Result<Bytes, Revert> {
            Err(Revert::new("no code"))
        }
        fn static_call(
            &self,
            _exchange: &LimitOrderProtocol,
            _target: Address,
            _input: &[u8],
        ) -> std::result::Result<Bytes, Revert> {
            Err(Revert::new("no code"))
        }
        fn checkpoint(&mut self) -> HostCheckpoint {
            0
        }
        fn commit(&mut self, _checkpoint: HostCheckpoint) {}
        fn revert_to(&mut self, _checkpoint: HostCheckpoint) {}
    }

    fn exchange() -> LimitOrderProtocol {
        LimitOrderProtocol::new(ProtocolConfig::new(1, EXCHANGE))
    }

    #[test]
    fn test_remaining_unknown_order() {
        let exchange = exchange();
        assert_eq!(
            exchange.remaining(&B256::repeat_byte(1)),
            Err(ProtocolError::UnknownOrder)
        );
    }

    #[test]
    fn test_remaining_decodes_sentinel() {
        let mut exchange = exchange();
        let hash = B256::repeat_byte(1);

        exchange.state_mut().set_remaining_raw(hash, U256::from(71u64));
        assert_eq!(exchange.remaining(&hash).unwrap(), U256::from(70u64));

        exchange.state_mut().set_remaining_raw(hash, ORDER_FILLED);
        assert_eq!(exchange.remaining(&hash).unwrap(), U256::ZERO);
        assert_eq!(
            exchange.remainings_raw(&[hash, B256::ZERO]),
            vec![ORDER_FILLED, U256::ZERO]
        );
    }

    #[test]
    fn test_transact_rolls_back_on_error() {
        let mut exchange = exchange();
        let mut host = NullHost;
        let hash = B256::repeat_byte(1);

        let result: Result<()> = exchange.transact(&mut host, "test", |ex, _| {
            ex.state_mut().set_remaining_raw(hash, U256::from(5u64));
            Err(ProtocolError::ZeroSwap)
        });

        assert_eq!(result, Err(ProtocolError::ZeroSwap));
        assert!(exchange.remaining_raw(&hash).is_zero());
    }

    #[test]
    fn test_self_call_calculator() {
        let exchange = exchange();
        let call = IAmountCalculator::getMakerAmountCall {
            orderMakerAmount: U256::from(100u64),
            orderTakerAmount: U256::from(50u64),
            swapTakerAmount: U256::from(10u64),
        };
        let output = exchange
            .static_call_at(&NullHost, EXCHANGE, &call.abi_encode(), 0)
            .unwrap();
        assert_eq!(U256::from_be_slice(&output), U256::from(20u64));
    }

    #[test]
    fn test_self_call_views() {
        let mut exchange = exchange();
        let maker = Address::repeat_byte(3);
        exchange.state_mut().set_nonce(maker, U256::from(9u64));

        let call = IExchangeViews::nonceCall { maker };
        let output = exchange
            .static_call_at(&NullHost, EXCHANGE, &call.abi_encode(), 0)
            .unwrap();
        assert_eq!(U256::from_be_slice(&output), U256::from(9u64));
    }

    #[test]
    fn test_self_call_unknown_selector() {
        let exchange = exchange();
        let result = exchange.static_call_at(&NullHost, EXCHANGE, &[0xde, 0xad, 0xbe, 0xef], 0);
        assert_eq!(result, Err(ProtocolError::UnknownSelector("deadbeef".into())));
    }

    #[test]
    fn test_external_call_failure_maps_target() {
        let exchange = exchange();
        let target = Address::repeat_byte(7);
        let result = exchange.static_call_at(&NullHost, target, &[0u8; 4], 0);
        assert_eq!(
            result,
            Err(ProtocolError::CallFailed {
                target,
                reason: "no code".into()
            })
        );
    }

    #[test]
    fn test_state_root_changes_with_records() {
        let mut exchange = exchange();
        let empty = exchange.state_root_hex().unwrap();

        exchange
            .state_mut()
            .set_remaining_raw(B256::repeat_byte(1), U256::from(2u64));
        let one = exchange.state_root_hex().unwrap();

        assert_ne!(empty, one);
        assert_eq!(one.len(), 64);
    }
}
