//! Amount calculator and getter dispatch.
//!
//! A fill names one side of the swap; the other side is solved through the
//! order's getter descriptor for that direction:
//!
//! - empty descriptor: only the order's nominal amount is accepted and the
//!   other nominal amount is returned unchanged
//! - non-empty descriptor: read-only call with the requested amount appended,
//!   which must return exactly one 256-bit word
//!
//! The exchange itself answers the proportional getters below, so an order can
//! point its getters at the exchange address for plain ratio pricing.

use alloy::primitives::{Bytes, U256};
use alloy::sol_types::SolValue;

use crate::abi::IAmountCalculator::IAmountCalculatorCalls;
use crate::engine::LimitOrderProtocol;
use crate::error::{ProtocolError, Result};
use crate::host::Host;
use crate::types::CallDescriptor;

/// `floor(a * b / denominator)`
pub fn mul_div_floor(a: U256, b: U256, denominator: U256) -> Result<U256> {
    if denominator.is_zero() {
        return Err(ProtocolError::DivisionByZero);
    }
    let product = a.checked_mul(b).ok_or(ProtocolError::ArithmeticOverflow)?;
    Ok(product / denominator)
}

/// `ceil(a * b / denominator)`
pub fn mul_div_ceil(a: U256, b: U256, denominator: U256) -> Result<U256> {
    if denominator.is_zero() {
        return Err(ProtocolError::DivisionByZero);
    }
    let product = a.checked_mul(b).ok_or(ProtocolError::ArithmeticOverflow)?;
    let quotient = product / denominator;
    if (product % denominator).is_zero() {
        Ok(quotient)
    } else {
        Ok(quotient + U256::from(1u64))
    }
}

/// Maker amount for a taker amount at the order's ratio (rounded down)
pub fn get_maker_amount(order_maker: U256, order_taker: U256, swap_taker: U256) -> Result<U256> {
    mul_div_floor(swap_taker, order_maker, order_taker)
}

/// Taker amount for a maker amount at the order's ratio (rounded up)
pub fn get_taker_amount(order_maker: U256, order_taker: U256, swap_maker: U256) -> Result<U256> {
    mul_div_ceil(swap_maker, order_taker, order_maker)
}

/// Answer a self-call to the built-in calculator
pub(crate) fn dispatch(call: IAmountCalculatorCalls) -> Result<Bytes> {
    let amount = match call {
        IAmountCalculatorCalls::getMakerAmount(c) => {
            get_maker_amount(c.orderMakerAmount, c.orderTakerAmount, c.swapTakerAmount)?
        }
        IAmountCalculatorCalls::getTakerAmount(c) => {
            get_taker_amount(c.orderMakerAmount, c.orderTakerAmount, c.swapMakerAmount)?
        }
    };
    Ok(amount.abi_encode().into())
}

impl LimitOrderProtocol {
    /// Resolve one side of a fill through `getter`.
    ///
    /// * `order_expected` - nominal amount on the requested side
    /// * `amount` - requested amount
    /// * `order_result` - nominal amount on the solved side
    pub fn resolve_amount(
        &self,
        host: &dyn Host,
        getter: &[u8],
        order_expected: U256,
        amount: U256,
        order_result: U256,
    ) -> Result<U256> {
        let Some(descriptor) = CallDescriptor::decode_strict(getter)? else {
            if amount != order_expected {
                return Err(ProtocolError::WrongAmount);
            }
            return Ok(order_result);
        };

        let calldata = descriptor.calldata_with_amount(amount);
        let output = self.static_call_at(host, descriptor.target, &calldata, 0)?;
        if output.len() != 32 {
            return Err(ProtocolError::InvalidGetterReturn);
        }
        Ok(U256::from_be_slice(&output))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
