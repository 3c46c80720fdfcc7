//! Predicate evaluation.
//!
//! An order predicate is a call descriptor. Evaluating it issues one
//! read-only call which must return a single boolean word. Predicates that
//! target the exchange itself are answered by the helper algebra below:
//!
//! | Helper | True when |
//! |--------|-----------|
//! | `and(calls)` | every sub-call is non-zero (stops at the first zero) |
//! | `or(calls)` | some sub-call is non-zero (stops at the first non-zero) |
//! | `not(call)` | the sub-call is zero |
//! | `eq/lt/gt(value, call)` | sub-call result `==`, `<`, `>` value |
//! | `timestampBelow(t)` | block timestamp `< t` |
//! | `nonceEquals(maker, n)` | maker nonce `== n` |
//!
//! Sub-calls are themselves descriptors, so trees nest arbitrarily deep up to
//! `ProtocolConfig::max_predicate_depth`.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::{SolCall, SolValue};

use crate::abi::IPredicateHelper::{self, IPredicateHelperCalls};
use crate::engine::LimitOrderProtocol;
use crate::error::{ProtocolError, Result};
use crate::host::Host;
use crate::types::{CallDescriptor, Order};

impl LimitOrderProtocol {
    /// Evaluate `order.predicate` (an empty predicate always passes)
    pub fn check_predicate(&self, host: &dyn Host, order: &Order) -> Result<bool> {
        let Some(descriptor) = CallDescriptor::decode_strict(&order.predicate)? else {
            return Ok(true);
        };
        let output = self.static_call_at(host, descriptor.target, &descriptor.data, 0)?;
        decode_bool_word(&output).ok_or(ProtocolError::InvalidPredicateReturn)
    }

    /// Answer a self-call to the helper algebra
    pub(crate) fn eval_helper(
        &self,
        host: &dyn Host,
        call: IPredicateHelperCalls,
        depth: usize,
    ) -> Result<Bytes> {
        let max_depth = self.config().max_predicate_depth;
        if depth > max_depth {
            return Err(ProtocolError::PredicateTooDeep(max_depth));
        }

        let next = depth + 1;
        let result = match call {
            IPredicateHelperCalls::and(c) => {
                let mut all = true;
                for sub in &c.calls {
                    if self.sub_call_word(host, sub, next)?.is_zero() {
                        all = false;
                        break;
                    }
                }
                all
            }
            IPredicateHelperCalls::or(c) => {
                let mut any = false;
                for sub in &c.calls {
                    if !self.sub_call_word(host, sub, next)?.is_zero() {
                        any = true;
                        break;
                    }
                }
                any
            }
            IPredicateHelperCalls::not(c) => self.sub_call_word(host, &c.call, next)?.is_zero(),
            IPredicateHelperCalls::eq(c) => self.sub_call_word(host, &c.call, next)? == c.value,
            IPredicateHelperCalls::lt(c) => self.sub_call_word(host, &c.call, next)? < c.value,
            IPredicateHelperCalls::gt(c) => self.sub_call_word(host, &c.call, next)? > c.value,
            IPredicateHelperCalls::timestampBelow(c) => {
                U256::from(host.block_timestamp()) < c.time
            }
            IPredicateHelperCalls::nonceEquals(c) => self.nonce(c.makerAddress) == c.makerNonce,
            IPredicateHelperCalls::arbitraryStaticCall(c) => {
                let output = self.static_call_at(host, c.target, &c.data, next)?;
                let word = decode_word(&output).ok_or(ProtocolError::InvalidPredicateReturn)?;
                return Ok(word.abi_encode().into());
            }
        };
        Ok(result.abi_encode().into())
    }

    fn sub_call_word(&self, host: &dyn Host, raw: &[u8], depth: usize) -> Result<U256> {
        let descriptor = CallDescriptor::decode_strict(raw)?
            .ok_or(ProtocolError::MalformedCallDescriptor { len: 0 })?;
        let output = self.static_call_at(host, descriptor.target, &descriptor.data, depth)?;
        decode_word(&output).ok_or(ProtocolError::InvalidPredicateReturn)
    }
}

/// Exactly one 256-bit word
fn decode_word(output: &[u8]) -> Option<U256> {
    (output.len() == 32).then(|| U256::from_be_slice(output))
}

/// Exactly one word holding 0 or 1
fn decode_bool_word(output: &[u8]) -> Option<bool> {
    match decode_word(output)? {
        v if v.is_zero() => Some(false),
        v if v == U256::from(1u64) => Some(true),
        _ => None,
    }
}

/// Builds predicate descriptors answered by the exchange at `exchange`.
///
/// ## Example
///
/// ```
/// use alloy::primitives::{Address, U256};
/// use limit_order_protocol::engine::PredicateBuilder;
///
/// let p = PredicateBuilder::new(Address::repeat_byte(0xEE));
/// let predicate = p.and(vec![
///     p.timestamp_below(U256::from(1_700_000_000u64)),
///     p.nonce_equals(Address::repeat_byte(1), U256::ZERO),
/// ]);
/// assert!(!predicate.is_empty());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PredicateBuilder {
    exchange: Address,
}

impl PredicateBuilder {
    /// Builder for predicates evaluated by `exchange`
    pub fn new(exchange: Address) -> Self {
        Self { exchange }
    }

    fn self_call(&self, call: impl SolCall) -> Bytes {
        CallDescriptor::new(self.exchange, call.abi_encode()).encode()
    }

    /// All sub-predicates hold
    pub fn and(&self, calls: Vec<Bytes>) -> Bytes {
        self.self_call(IPredicateHelper::andCall { calls })
    }

    /// Some sub-predicate holds
    pub fn or(&self, calls: Vec<Bytes>) -> Bytes {
        self.self_call(IPredicateHelper::orCall { calls })
    }

    /// Sub-predicate does not hold
    pub fn not(&self, call: Bytes) -> Bytes {
        self.self_call(IPredicateHelper::notCall { call })
    }

    /// Sub-call result equals `value`
    pub fn eq(&self, value: U256, call: Bytes) -> Bytes {
        self.self_call(IPredicateHelper::eqCall { value, call })
    }

    /// Sub-call result is below `value`
    pub fn lt(&self, value: U256, call: Bytes) -> Bytes {
        self.self_call(IPredicateHelper::ltCall { value, call })
    }

    /// Sub-call result is above `value`
    pub fn gt(&self, value: U256, call: Bytes) -> Bytes {
        self.self_call(IPredicateHelper::gtCall { value, call })
    }

    /// Block timestamp is strictly below `time`
    pub fn timestamp_below(&self, time: U256) -> Bytes {
        self.self_call(IPredicateHelper::timestampBelowCall { time })
    }

    /// Maker nonce equals `nonce`
    pub fn nonce_equals(&self, maker: Address, nonce: U256) -> Bytes {
        self.self_call(IPredicateHelper::nonceEqualsCall {
            makerAddress: maker,
            makerNonce: nonce,
        })
    }

    /// Word returned by an arbitrary read-only call
    pub fn arbitrary_static_call(&self, target: Address, data: Bytes) -> Bytes {
        self.self_call(IPredicateHelper::arbitraryStaticCallCall { target, data })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
