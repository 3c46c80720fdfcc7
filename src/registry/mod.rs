//! Order registry: a bulletin board for signed orders.
//!
//! Makers (or anyone holding a maker's signature) broadcast orders here so
//! takers can discover them. The registry never touches fill state; it only
//! re-checks the signature and stores the order.
//!
//! ## Overlays
//!
//! - [`FeePolicy`]: charge `makingAmount * rate_bps / 10_000` of the maker
//!   asset from the submitter to a recipient
//! - [`RewardDistributor`]: notified after every successful broadcast
//!
//! Both are optional and only the registry owner may change them.
//!
//! ## Storage
//!
//! Entries live in a slab with an order hash index, the same arena layout the
//! exchange uses for remaining-amount records.

use std::collections::HashMap;

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol_types::SolCall;
use slab::Slab;
use tracing::info;

use crate::abi::IERC20;
use crate::engine::{is_true_word, mul_div_floor, LimitOrderProtocol};
use crate::error::{ProtocolError, Result, Revert};
use crate::hashing::verify_signature;
use crate::host::Host;
use crate::types::Order;

/// Fee rates are expressed against this denominator (basis points)
pub const FEE_DENOMINATOR: u64 = 10_000;

/// Broadcast fee charged in the order's maker asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeePolicy {
    /// Fee rate in basis points of `makingAmount`
    pub rate_bps: u64,
    /// Fee recipient
    pub recipient: Address,
}

impl FeePolicy {
    /// Fee owed for broadcasting `order` (rounded down)
    pub fn fee_for(&self, order: &Order) -> Result<U256> {
        mul_div_floor(
            order.makingAmount,
            U256::from(self.rate_bps),
            U256::from(FEE_DENOMINATOR),
        )
    }
}

/// Hook run after a successful broadcast.
pub trait RewardDistributor {
    /// `submitter` broadcast `order` under `order_hash`
    fn on_broadcast(
        &mut self,
        submitter: Address,
        order_hash: B256,
        order: &Order,
    ) -> std::result::Result<(), Revert>;
}

/// A stored order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    /// Exchange hash of the order
    pub order_hash: B256,
    /// The order
    pub order: Order,
    /// Maker signature
    pub signature: Bytes,
    /// Who broadcast it
    pub submitter: Address,
}

/// Signed-order bulletin board bound to one exchange deployment.
pub struct OrderRegistry {
    address: Address,
    owner: Address,
    fee_policy: Option<FeePolicy>,
    distributor: Option<Box<dyn RewardDistributor>>,
    entries: Slab<RegistryEntry>,
    index: HashMap<B256, usize>,
}

impl OrderRegistry {
    /// Registry deployed at `address` and owned by `owner`
    pub fn new(address: Address, owner: Address) -> Self {
        Self {
            address,
            owner,
            fee_policy: None,
            distributor: None,
            entries: Slab::new(),
            index: HashMap::new(),
        }
    }

    /// Deployment address (the spender for broadcast fees)
    #[inline]
    pub fn address(&self) -> Address {
        self.address
    }

    /// Current owner
    #[inline]
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Active fee policy
    #[inline]
    pub fn fee_policy(&self) -> Option<FeePolicy> {
        self.fee_policy
    }

    /// Number of stored orders
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no order has been broadcast
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // ========================================================================
    // Owner operations
    // ========================================================================

    fn ensure_owner(&self, caller: Address) -> Result<()> {
        if caller != self.owner {
            return Err(ProtocolError::AccessDenied);
        }
        Ok(())
    }

    /// Replace the fee policy (`None` disables fees)
    pub fn set_fee_policy(&mut self, caller: Address, policy: Option<FeePolicy>) -> Result<()> {
        self.ensure_owner(caller)?;
        self.fee_policy = policy;
        info!(?policy, "registry fee policy updated");
        Ok(())
    }

    /// Replace the reward distributor (`None` disables rewards)
    pub fn set_reward_distributor(
        &mut self,
        caller: Address,
        distributor: Option<Box<dyn RewardDistributor>>,
    ) -> Result<()> {
        self.ensure_owner(caller)?;
        info!(enabled = distributor.is_some(), "registry reward distributor updated");
        self.distributor = distributor;
        Ok(())
    }

    /// Hand ownership to `new_owner`
    pub fn transfer_ownership(&mut self, caller: Address, new_owner: Address) -> Result<()> {
        self.ensure_owner(caller)?;
        self.owner = new_owner;
        Ok(())
    }

    // ========================================================================
    // Broadcast
    // ========================================================================

    /// Store `order` after checking `signature` against the exchange hash.
    ///
    /// # Errors
    ///
    /// - `BadSignature` if the maker did not sign the order
    /// - `AlreadyBroadcast` if the hash is already stored
    /// - `AssetCallFailed` if the fee transfer fails
    /// - `CallFailed` if the reward distributor reverts
    ///
    /// On error nothing is stored and no fee is taken.
    pub fn broadcast(
        &mut self,
        host: &mut dyn Host,
        exchange: &mut LimitOrderProtocol,
        caller: Address,
        order: &Order,
        signature: &[u8],
    ) -> Result<B256> {
        exchange.transact(host, "broadcast", |exchange, host| {
            let order_hash = exchange.hash_order(order);
            if !verify_signature(&*host, exchange, order.maker, order_hash, signature) {
                return Err(ProtocolError::BadSignature);
            }
            if self.index.contains_key(&order_hash) {
                return Err(ProtocolError::AlreadyBroadcast);
            }

            if let Some(policy) = self.fee_policy {
                let fee = policy.fee_for(order)?;
                if !fee.is_zero() && !policy.recipient.is_zero() {
                    self.collect_fee(host, exchange, order.makerAsset, caller, policy.recipient, fee)?;
                }
            }

            let registry = self.address;
            if let Some(distributor) = self.distributor.as_mut() {
                distributor
                    .on_broadcast(caller, order_hash, order)
                    .map_err(|revert| ProtocolError::call_failed(registry, revert))?;
            }

            let key = self.entries.insert(RegistryEntry {
                order_hash,
                order: order.clone(),
                signature: Bytes::copy_from_slice(signature),
                submitter: caller,
            });
            self.index.insert(order_hash, key);
            info!(order_hash = %order_hash, maker = %order.maker, "order broadcast");
            Ok(order_hash)
        })
    }

    fn collect_fee(
        &self,
        host: &mut dyn Host,
        exchange: &mut LimitOrderProtocol,
        asset: Address,
        payer: Address,
        recipient: Address,
        fee: U256,
    ) -> Result<()> {
        let input = IERC20::transferFromCall {
            from: payer,
            to: recipient,
            amount: fee,
        }
        .abi_encode();
        let output = host
            .call(exchange, self.address, asset, &input)
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

    // ========================================================================
    // Lookups
    // ========================================================================

    fn entry(&self, order_hash: &B256) -> Option<&RegistryEntry> {
        self.index
            .get(order_hash)
            .and_then(|&key| self.entries.get(key))
    }

    /// Stored order for `order_hash`
    pub fn order_by_hash(&self, order_hash: &B256) -> Option<&Order> {
        self.entry(order_hash).map(|entry| &entry.order)
    }

    /// Stored signature for `order_hash`
    pub fn signature_by_hash(&self, order_hash: &B256) -> Option<&Bytes> {
        self.entry(order_hash).map(|entry| &entry.signature)
    }

    /// Stored orders of `maker`, in broadcast order
    pub fn orders_by_maker(&self, maker: Address) -> Vec<&RegistryEntry> {
        self.entries
            .iter()
            .map(|(_, entry)| entry)
            .filter(|entry| entry.order.maker == maker)
            .collect()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
