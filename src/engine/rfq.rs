//! RFQ orders.
//!
//! RFQ orders are single-use quotes. Instead of a remaining-amount record they
//! consume one bit in the maker's invalidator bitmap, addressed by the low 64
//! bits of `info`:
//!
//! ```text
//! info = | unused (128) | expiration (64) | slot (56) | bit (8) |
//! ```
//!
//! A fill may take the whole quote or a proportional part of it; either way
//! the quote is spent.

use alloy::primitives::{Address, B256, U256};
use tracing::{debug, info};

use crate::engine::amounts::{get_maker_amount, get_taker_amount};
use crate::engine::LimitOrderProtocol;
use crate::error::{ProtocolError, Result};
use crate::hashing::verify_signature;
use crate::host::Host;
use crate::types::{invalidator_bit, invalidator_slot, Event, OrderRFQ};

/// Outcome of an RFQ fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RfqFill {
    /// Hash of the filled quote
    pub order_hash: B256,
    /// Maker units transferred
    pub making_amount: U256,
    /// Taker units transferred
    pub taking_amount: U256,
}

impl LimitOrderProtocol {
    /// Fill an RFQ order, sending the maker asset to the caller
    pub fn fill_order_rfq(
        &mut self,
        host: &mut dyn Host,
        caller: Address,
        order: &OrderRFQ,
        signature: &[u8],
        making_amount: U256,
        taking_amount: U256,
    ) -> Result<RfqFill> {
        self.fill_order_rfq_to(
            host,
            caller,
            order,
            signature,
            making_amount,
            taking_amount,
            caller,
        )
    }

    /// Fill an RFQ order, sending the maker asset to `target`.
    ///
    /// Both amounts zero takes the whole quote; one zero solves it
    /// proportionally; both non-zero is rejected.
    #[allow(clippy::too_many_arguments)]
    pub fn fill_order_rfq_to(
        &mut self,
        host: &mut dyn Host,
        caller: Address,
        order: &OrderRFQ,
        signature: &[u8],
        making_amount: U256,
        taking_amount: U256,
        target: Address,
    ) -> Result<RfqFill> {
        self.transact(host, "fill_order_rfq", |exchange, host| {
            if target.is_zero() {
                return Err(ProtocolError::ZeroTarget);
            }
            if !order.allowedSender.is_zero() && order.allowedSender != caller {
                return Err(ProtocolError::PrivateOrder);
            }

            let order_hash = exchange.hash_order_rfq(order);
            if !verify_signature(&*host, exchange, order.maker, order_hash, signature) {
                return Err(ProtocolError::BadSignature);
            }

            let expiration = order.expiration();
            if expiration != 0 && host.block_timestamp() > expiration {
                return Err(ProtocolError::OrderExpired);
            }
            exchange.invalidate(order.maker, order.info)?;

            let (making, taking) = solve_rfq_amounts(order, making_amount, taking_amount)?;
            if making.is_zero() || taking.is_zero() {
                return Err(ProtocolError::ZeroSwap);
            }

            exchange.transfer_asset(host, order.makerAsset, order.maker, target, making, &[])?;
            exchange.transfer_asset(host, order.takerAsset, caller, order.maker, taking, &[])?;

            exchange.state_mut().emit(Event::OrderFilledRFQ {
                order_hash,
                making_amount: making,
            });
            debug!(order_hash = %order_hash, %making, %taking, "rfq order filled");

            Ok(RfqFill {
                order_hash,
                making_amount: making,
                taking_amount: taking,
            })
        })
    }

    /// Spend the quote identified by `info` without filling it
    pub fn cancel_order_rfq(&mut self, caller: Address, order_info: U256) -> Result<()> {
        self.invalidate(caller, order_info)?;
        info!(maker = %caller, order_id = %(order_info & U256::from(u64::MAX)), "rfq order cancelled");
        Ok(())
    }

    fn invalidate(&mut self, maker: Address, order_info: U256) -> Result<()> {
        let slot = invalidator_slot(order_info);
        let bit = invalidator_bit(order_info);
        let bitmap = self.invalidator_for_order_rfq(maker, slot);
        if !(bitmap & bit).is_zero() {
            return Err(ProtocolError::InvalidatedOrder);
        }
        self.state_mut().set_invalidator(maker, slot, bitmap | bit);
        Ok(())
    }
}

fn solve_rfq_amounts(order: &OrderRFQ, making: U256, taking: U256) -> Result<(U256, U256)> {
    match (making.is_zero(), taking.is_zero()) {
        (true, true) => Ok((order.makingAmount, order.takingAmount)),
        (false, true) => {
            if making > order.makingAmount {
                return Err(ProtocolError::MakingAmountExceeded);
            }
            let taking = get_taker_amount(order.makingAmount, order.takingAmount, making)?;
            Ok((making, taking))
        }
        (true, false) => {
            if taking > order.takingAmount {
                return Err(ProtocolError::TakingAmountExceeded);
            }
            let making = get_maker_amount(order.makingAmount, order.takingAmount, taking)?;
            Ok((making, taking))
        }
        (false, false) => Err(ProtocolError::InvalidAmountSpecification),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
