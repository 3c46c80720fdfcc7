//! Order types for the limit order protocol.
//!
//! ## EIP-712 Layout
//!
//! Both order kinds are `sol!` structs so their structured-data hash is the
//! one a wallet produces when the maker signs them. Fixed-size fields are
//! encoded in place; every `bytes` field contributes `keccak256(field)`.
//!
//! ## Order Identity
//!
//! The hash is a pure function of the field values. Two orders with identical
//! fields are the same order: re-signing one is a no-op against existing state.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

use crate::abi::IAmountCalculator;
use crate::types::descriptor::{cut_last_arg, CallDescriptor};

sol! {
    /// A limit order: partially fillable, tracked by remaining amount.
    #[derive(Debug, Default, PartialEq, Eq, Hash)]
    struct Order {
        uint256 salt;
        address makerAsset;
        address takerAsset;
        address maker;
        address receiver;
        address allowedSender;
        uint256 makingAmount;
        uint256 takingAmount;
        bytes makerAssetData;
        bytes takerAssetData;
        bytes getMakerAmount;
        bytes getTakerAmount;
        bytes predicate;
        bytes permit;
        bytes interaction;
    }

    /// An RFQ order: single use, tracked by an invalidator bitmap.
    #[derive(Debug, Default, PartialEq, Eq, Hash)]
    struct OrderRFQ {
        uint256 info;
        address makerAsset;
        address takerAsset;
        address maker;
        address allowedSender;
        uint256 makingAmount;
        uint256 takingAmount;
    }
}

// ============================================================================
// Limit order helpers
// ============================================================================

impl Order {
    /// Address receiving the taker asset (receiver, or maker when unset)
    pub fn payout_address(&self) -> Address {
        if self.receiver.is_zero() {
            self.maker
        } else {
            self.receiver
        }
    }

    /// Whether `caller` may fill this order
    pub fn allows(&self, caller: Address) -> bool {
        self.allowedSender.is_zero() || self.allowedSender == caller
    }
}

/// Which amount getters an order carries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Getters {
    /// Built-in proportional calculator on the exchange itself
    #[default]
    Proportional,
    /// Empty getters: only the full order size can be filled
    Exact,
    /// Arbitrary curried descriptors (maker side, taker side)
    Custom {
        /// Resolves making amount from a taking amount
        maker: Bytes,
        /// Resolves taking amount from a making amount
        taker: Bytes,
    },
}

/// Curried `getMakerAmount(making, taking, _)` self-call descriptor
pub fn proportional_maker_getter(exchange: Address, making: U256, taking: U256) -> Bytes {
    let call = IAmountCalculator::getMakerAmountCall {
        orderMakerAmount: making,
        orderTakerAmount: taking,
        swapTakerAmount: U256::ZERO,
    };
    CallDescriptor::new(exchange, cut_last_arg(&call.abi_encode())).encode()
}

/// Curried `getTakerAmount(making, taking, _)` self-call descriptor
pub fn proportional_taker_getter(exchange: Address, making: U256, taking: U256) -> Bytes {
    let call = IAmountCalculator::getTakerAmountCall {
        orderMakerAmount: making,
        orderTakerAmount: taking,
        swapMakerAmount: U256::ZERO,
    };
    CallDescriptor::new(exchange, cut_last_arg(&call.abi_encode())).encode()
}

/// Builder for limit orders.
///
/// ## Example
///
/// ```
/// use alloy::primitives::{Address, U256};
/// use limit_order_protocol::types::OrderBuilder;
///
/// let exchange = Address::repeat_byte(0xEE);
/// let order = OrderBuilder::new(exchange, Address::repeat_byte(1))
///     .assets(Address::repeat_byte(2), Address::repeat_byte(3))
///     .amounts(U256::from(100), U256::from(200))
///     .salt(U256::from(7))
///     .build();
///
/// assert_eq!(order.makingAmount, U256::from(100));
/// assert!(!order.getTakerAmount.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct OrderBuilder {
    exchange: Address,
    order: Order,
    getters: Getters,
}

impl OrderBuilder {
    /// Start an order for `maker` on the exchange deployed at `exchange`
    pub fn new(exchange: Address, maker: Address) -> Self {
        Self {
            exchange,
            order: Order {
                maker,
                ..Order::default()
            },
            getters: Getters::default(),
        }
    }

    /// Maker and taker assets
    pub fn assets(mut self, maker_asset: Address, taker_asset: Address) -> Self {
        self.order.makerAsset = maker_asset;
        self.order.takerAsset = taker_asset;
        self
    }

    /// Nominal full-size amounts
    pub fn amounts(mut self, making: U256, taking: U256) -> Self {
        self.order.makingAmount = making;
        self.order.takingAmount = taking;
        self
    }

    /// Uniqueness salt
    pub fn salt(mut self, salt: U256) -> Self {
        self.order.salt = salt;
        self
    }

    /// Payout address for the taker asset
    pub fn receiver(mut self, receiver: Address) -> Self {
        self.order.receiver = receiver;
        self
    }

    /// Restrict the order to a single taker
    pub fn allowed_sender(mut self, sender: Address) -> Self {
        self.order.allowedSender = sender;
        self
    }

    /// Extra payload appended to the maker asset transfer call
    pub fn maker_asset_data(mut self, data: impl Into<Bytes>) -> Self {
        self.order.makerAssetData = data.into();
        self
    }

    /// Extra payload appended to the taker asset transfer call
    pub fn taker_asset_data(mut self, data: impl Into<Bytes>) -> Self {
        self.order.takerAssetData = data.into();
        self
    }

    /// Amount getters
    pub fn getters(mut self, getters: Getters) -> Self {
        self.getters = getters;
        self
    }

    /// Predicate descriptor
    pub fn predicate(mut self, predicate: impl Into<Bytes>) -> Self {
        self.order.predicate = predicate.into();
        self
    }

    /// One-time permit descriptor executed on first fill
    pub fn permit(mut self, permit: &CallDescriptor) -> Self {
        self.order.permit = permit.encode();
        self
    }

    /// Post-fill maker notification
    pub fn interaction(mut self, interaction: &CallDescriptor) -> Self {
        self.order.interaction = interaction.encode();
        self
    }

    /// Finish the order, materializing the getter descriptors
    pub fn build(self) -> Order {
        let mut order = self.order;
        let (maker_getter, taker_getter) = match self.getters {
            Getters::Proportional => (
                proportional_maker_getter(self.exchange, order.makingAmount, order.takingAmount),
                proportional_taker_getter(self.exchange, order.makingAmount, order.takingAmount),
            ),
            Getters::Exact => (Bytes::new(), Bytes::new()),
            Getters::Custom { maker, taker } => (maker, taker),
        };
        order.getMakerAmount = maker_getter;
        order.getTakerAmount = taker_getter;
        order
    }
}

// ============================================================================
// RFQ order helpers
// ============================================================================

impl OrderRFQ {
    /// Pack an expiration timestamp and order id into the `info` word
    pub fn pack_info(expiration: u64, order_id: u64) -> U256 {
        (U256::from(expiration) << 64usize) | U256::from(order_id)
    }

    /// Expiration timestamp (0 = never)
    pub fn expiration(&self) -> u64 {
        let low128 = self.info & U256::from(u128::MAX);
        (low128 >> 64usize).to::<u64>()
    }

    /// Maker-chosen order id (low 64 bits of `info`)
    pub fn order_id(&self) -> u64 {
        (self.info & U256::from(u64::MAX)).to::<u64>()
    }
}

/// Invalidator slot for an RFQ `info` word
pub fn invalidator_slot(info: U256) -> u64 {
    (info & U256::from(u64::MAX)).to::<u64>() >> 8
}

/// Invalidator bit mask for an RFQ `info` word
pub fn invalidator_bit(info: U256) -> U256 {
    let shift = (info & U256::from(0xffu64)).to::<usize>();
    U256::from(1u64) << shift
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange() -> Address {
        Address::repeat_byte(0xEE)
    }

    #[test]
    fn test_payout_address() {
        let mut order = Order {
            maker: Address::repeat_byte(1),
            ..Order::default()
        };
        assert_eq!(order.payout_address(), Address::repeat_byte(1));

        order.receiver = Address::repeat_byte(2);
        assert_eq!(order.payout_address(), Address::repeat_byte(2));
    }

    #[test]
    fn test_allows() {
        let mut order = Order::default();
        assert!(order.allows(Address::repeat_byte(9)));

        order.allowedSender = Address::repeat_byte(5);
        assert!(order.allows(Address::repeat_byte(5)));
        assert!(!order.allows(Address::repeat_byte(9)));
    }

    #[test]
    fn test_builder_proportional_getters() {
        let order = OrderBuilder::new(exchange(), Address::repeat_byte(1))
            .amounts(U256::from(100), U256::from(300))
            .build();

        let taker = CallDescriptor::decode(&order.getTakerAmount).unwrap();
        assert_eq!(taker.target, exchange());
        // selector + two curried words
        assert_eq!(taker.data.len(), 4 + 64);
        assert_eq!(&taker.data[..4], &IAmountCalculator::getTakerAmountCall::SELECTOR);
    }

    #[test]
    fn test_builder_exact_getters() {
        let order = OrderBuilder::new(exchange(), Address::repeat_byte(1))
            .getters(Getters::Exact)
            .build();
        assert!(order.getMakerAmount.is_empty());
        assert!(order.getTakerAmount.is_empty());
    }

    #[test]
    fn test_rfq_info_packing() {
        let order = OrderRFQ {
            info: OrderRFQ::pack_info(1_700_000_000, 0x1234),
            ..OrderRFQ::default()
        };
        assert_eq!(order.expiration(), 1_700_000_000);
        assert_eq!(order.order_id(), 0x1234);
        assert_eq!(invalidator_slot(order.info), 0x12);
        assert_eq!(invalidator_bit(order.info), U256::from(1u64) << 0x34usize);
    }
}
