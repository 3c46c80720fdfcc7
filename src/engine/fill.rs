//! Limit order fills and cancellation.
//!
//! ## Fill Sequence
//!
//! 1. Hash the order and load its sentinel (`OrderExhausted` when filled)
//! 2. Check `allowedSender`
//! 3. First fill only: verify the signature, seed the remaining amount from
//!    `makingAmount`, run the permit once and re-check the sentinel
//! 4. Evaluate the predicate
//! 5. Solve the missing amount, clamp to the remaining amount and check the
//!    taker's threshold as a rate (never a worse price than quoted)
//! 6. Store `remaining + 1` and emit `OrderFilled`
//! 7. Transfer maker asset, extra interaction, taker asset, order interaction

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol_types::SolCall;
use tracing::{debug, info};

use crate::abi::{IInteractionReceiver, IERC20};
use crate::engine::LimitOrderProtocol;
use crate::error::{ProtocolError, Result};
use crate::hashing::verify_signature;
use crate::host::Host;
use crate::types::{CallDescriptor, Event, Order, ORDER_FILLED, ORDER_UNSEEN};

/// Amounts and routing for one fill.
///
/// Exactly one of `making_amount` / `taking_amount` is non-zero; it is the
/// side the taker drives. `threshold_amount` bounds the solved side:
///
/// - driving making: maximum taking amount for the requested making amount
/// - driving taking: minimum making amount for the requested taking amount
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillRequest {
    /// Requested maker units (0 when driving the taking side)
    pub making_amount: U256,
    /// Requested taker units (0 when driving the making side)
    pub taking_amount: U256,
    /// Slippage bound on the solved side
    pub threshold_amount: U256,
    /// Recipient of the maker asset (`None` = caller)
    pub target: Option<Address>,
    /// Extra interaction descriptor notified after the maker transfer
    pub interaction: Bytes,
}

impl FillRequest {
    /// Buy `making` maker units paying at most `max_taking`
    pub fn making(making: U256, max_taking: U256) -> Self {
        Self {
            making_amount: making,
            threshold_amount: max_taking,
            ..Self::default()
        }
    }

    /// Pay `taking` taker units receiving at least `min_making`
    pub fn taking(taking: U256, min_making: U256) -> Self {
        Self {
            taking_amount: taking,
            threshold_amount: min_making,
            ..Self::default()
        }
    }

    /// Send the maker asset to `target` instead of the caller
    pub fn to(mut self, target: Address) -> Self {
        self.target = Some(target);
        self
    }

    /// Notify `descriptor.target` between the two transfers
    pub fn with_interaction(mut self, descriptor: &CallDescriptor) -> Self {
        self.interaction = descriptor.encode();
        self
    }
}

/// Outcome of a successful fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillResult {
    /// Hash of the filled order
    pub order_hash: B256,
    /// Maker units transferred
    pub making_amount: U256,
    /// Taker units transferred
    pub taking_amount: U256,
    /// Maker units left after the fill
    pub remaining: U256,
}

impl LimitOrderProtocol {
    /// Fill `order` on behalf of `caller`.
    ///
    /// # Arguments
    ///
    /// * `host` - Execution environment (tokens, getters, receivers)
    /// * `caller` - The taker
    /// * `order` - Maker-signed order
    /// * `signature` - 65-byte ECDSA or ERC-1271 signature over the order hash
    /// * `request` - Amounts, threshold, target and extra interaction
    ///
    /// # Returns
    ///
    /// The consumed amounts. On error nothing is applied.
    pub fn fill_order(
        &mut self,
        host: &mut dyn Host,
        caller: Address,
        order: &Order,
        signature: &[u8],
        request: &FillRequest,
    ) -> Result<FillResult> {
        self.transact(host, "fill_order", |exchange, host| {
            exchange.fill_in_place(host, caller, order, signature, request)
        })
    }

    /// Run a taker-supplied permit, then fill.
    ///
    /// `permit` is a descriptor (target + call data) and must carry at least a
    /// target address.
    pub fn fill_order_to_with_permit(
        &mut self,
        host: &mut dyn Host,
        caller: Address,
        order: &Order,
        signature: &[u8],
        request: &FillRequest,
        permit: &[u8],
    ) -> Result<FillResult> {
        let permit = CallDescriptor::decode(permit).ok_or(ProtocolError::PermitTooShort)?;
        self.transact(host, "fill_order_to_with_permit", |exchange, host| {
            exchange.execute_call(host, permit.target, &permit.data)?;
            exchange.fill_in_place(host, caller, order, signature, request)
        })
    }

    /// Cancel `order`. Only its maker may do so.
    ///
    /// The emitted event carries the raw sentinel from before the cancel, so a
    /// partially filled order's remaining amount stays observable.
    pub fn cancel_order(&mut self, caller: Address, order: &Order) -> Result<()> {
        if order.maker != caller {
            return Err(ProtocolError::AccessDenied);
        }
        let order_hash = self.hash_order(order);
        let remaining_raw = self.remaining_raw(&order_hash);
        if remaining_raw == ORDER_FILLED {
            return Err(ProtocolError::AlreadyFilled);
        }

        let state = self.state_mut();
        state.set_remaining_raw(order_hash, ORDER_FILLED);
        state.emit(Event::OrderCanceled {
            maker: order.maker,
            order_hash,
            remaining_raw,
        });
        info!(order_hash = %order_hash, %remaining_raw, "order cancelled");
        Ok(())
    }

    fn fill_in_place(
        &mut self,
        host: &mut dyn Host,
        caller: Address,
        order: &Order,
        signature: &[u8],
        request: &FillRequest,
    ) -> Result<FillResult> {
        let target = request.target.unwrap_or(caller);
        if target.is_zero() {
            return Err(ProtocolError::ZeroTarget);
        }

        let order_hash = self.hash_order(order);
        let raw = self.remaining_raw(&order_hash);
        if raw == ORDER_FILLED {
            return Err(ProtocolError::OrderExhausted);
        }
        if !order.allows(caller) {
            return Err(ProtocolError::PrivateOrder);
        }

        let remaining = if raw == ORDER_UNSEEN {
            if !verify_signature(&*host, self, order.maker, order_hash, signature) {
                return Err(ProtocolError::BadSignature);
            }
            if let Some(permit) = CallDescriptor::decode(&order.permit) {
                self.execute_call(host, permit.target, &permit.data)?;
                if self.remaining_raw(&order_hash) != ORDER_UNSEEN {
                    return Err(ProtocolError::ReentrancyDetected);
                }
            }
            order.makingAmount
        } else {
            raw - U256::from(1u64)
        };

        if !self.check_predicate(&*host, order)? {
            return Err(ProtocolError::PredicateFailed);
        }
        // amount shape is checked once the order is known to be live
        if request.making_amount.is_zero() == request.taking_amount.is_zero() {
            return Err(ProtocolError::InvalidAmountSpecification);
        }

        let (making, taking) = self.solve_amounts(&*host, order, request, remaining)?;
        if making.is_zero() || taking.is_zero() {
            return Err(ProtocolError::ZeroSwap);
        }

        // making <= remaining after clamping
        let left = remaining - making;
        let state = self.state_mut();
        state.set_remaining_raw(order_hash, left + U256::from(1u64));
        state.emit(Event::OrderFilled {
            maker: order.maker,
            order_hash,
            remaining: left,
        });
        debug!(
            order_hash = %order_hash,
            %making,
            %taking,
            remaining = %left,
            "order filled"
        );

        self.transfer_asset(
            host,
            order.makerAsset,
            order.maker,
            target,
            making,
            &order.makerAssetData,
        )?;
        if let Some(extra) = CallDescriptor::decode(&request.interaction) {
            self.notify_fill(host, &extra, caller, order, making, taking)?;
        }
        self.transfer_asset(
            host,
            order.takerAsset,
            caller,
            order.payout_address(),
            taking,
            &order.takerAssetData,
        )?;
        if let Some(interaction) = CallDescriptor::decode(&order.interaction) {
            self.notify_fill(host, &interaction, caller, order, making, taking)?;
        }

        Ok(FillResult {
            order_hash,
            making_amount: making,
            taking_amount: taking,
            remaining: left,
        })
    }

    /// Resolve both sides of the swap against `remaining`.
    fn solve_amounts(
        &self,
        host: &dyn Host,
        order: &Order,
        request: &FillRequest,
        remaining: U256,
    ) -> Result<(U256, U256)> {
        let threshold = request.threshold_amount;

        if request.taking_amount.is_zero() {
            let requested = request.making_amount;
            let making = requested.min(remaining);
            let taking = self.resolve_amount(
                host,
                &order.getTakerAmount,
                order.makingAmount,
                making,
                order.takingAmount,
            )?;
            // taking / making <= threshold / requested
            if checked_mul(taking, requested)? > checked_mul(threshold, making)? {
                return Err(ProtocolError::TakingAmountTooHigh);
            }
            return Ok((making, taking));
        }

        let requested = request.taking_amount;
        let mut taking = requested;
        let mut making = self.resolve_amount(
            host,
            &order.getMakerAmount,
            order.takingAmount,
            taking,
            order.makingAmount,
        )?;
        if making > remaining {
            making = remaining;
            taking = self.resolve_amount(
                host,
                &order.getTakerAmount,
                order.makingAmount,
                making,
                order.takingAmount,
            )?;
        }
        // making / taking >= threshold / requested
        if checked_mul(making, requested)? < checked_mul(threshold, taking)? {
            return Err(ProtocolError::MakingAmountTooLow);
        }
        Ok((making, taking))
    }

    /// `transferFrom(from, to, amount)` with `asset_data` appended.
    pub(crate) fn transfer_asset(
        &mut self,
        host: &mut dyn Host,
        asset: Address,
        from: Address,
        to: Address,
        amount: U256,
        asset_data: &[u8],
    ) -> Result<()> {
        let mut input = IERC20::transferFromCall { from, to, amount }.abi_encode();
        input.extend_from_slice(asset_data);

        let caller = self.address();
        let output = host
            .call(self, caller, asset, &input)
            .map_err(|revert| ProtocolError::AssetCallFailed {
                asset,
                reason: revert.reason,
            })?;
        if output.is_empty() || is_true_word(&output) {
            return Ok(());
        }
        Err(ProtocolError::AssetCallFailed {
            asset,
            reason: format!("returned 0x{}", hex::encode(&output)),
        })
    }

    /// State-changing call issued by the exchange
    pub(crate) fn execute_call(
        &mut self,
        host: &mut dyn Host,
        target: Address,
        input: &[u8],
    ) -> Result<Bytes> {
        let caller = self.address();
        host.call(self, caller, target, input)
            .map_err(|revert| ProtocolError::call_failed(target, revert))
    }

    fn notify_fill(
        &mut self,
        host: &mut dyn Host,
        descriptor: &CallDescriptor,
        taker: Address,
        order: &Order,
        making: U256,
        taking: U256,
    ) -> Result<()> {
        let call = IInteractionReceiver::notifyFillOrderCall {
            taker,
            makerAsset: order.makerAsset,
            takerAsset: order.takerAsset,
            makingAmount: making,
            takingAmount: taking,
            interactiveData: descriptor.data.clone(),
        };
        self.execute_call(host, descriptor.target, &call.abi_encode())?;
        Ok(())
    }
}

fn checked_mul(a: U256, b: U256) -> Result<U256> {
    a.checked_mul(b).ok_or(ProtocolError::ArithmeticOverflow)
}

/// Output whose first word is 1 (ABI `true`); trailing bytes are ignored
pub(crate) fn is_true_word(output: &[u8]) -> bool {
    output.len() >= 32 && U256::from_be_slice(&output[..32]) == U256::from(1u64)
}

// ============================================================================
// Unit Tests
// ============================================================================
