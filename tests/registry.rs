//! Order registry broadcast, fees and rewards.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use alloy::primitives::{Address, B256, U256};

use common::{key, u, Fixture, INITIAL_BALANCE};
use limit_order_protocol::error::{ProtocolError, Revert};
use limit_order_protocol::hashing::sign_digest;
use limit_order_protocol::registry::{FeePolicy, OrderRegistry, RewardDistributor};
use limit_order_protocol::types::Order;

const REGISTRY: Address = Address::new([0x5A; 20]);
const OWNER: Address = Address::new([0x0A; 20]);
const FEE_RECIPIENT: Address = Address::new([0x5E; 20]);

/// Records every broadcast it is told about
struct Recorder(Rc<RefCell<Vec<(Address, B256)>>>);

impl RewardDistributor for Recorder {
    fn on_broadcast(
        &mut self,
        submitter: Address,
        order_hash: B256,
        _order: &Order,
    ) -> Result<(), Revert> {
        self.0.borrow_mut().push((submitter, order_hash));
        Ok(())
    }
}

/// Rejects every broadcast
struct Closed;

impl RewardDistributor for Closed {
    fn on_broadcast(&mut self, _: Address, _: B256, _: &Order) -> Result<(), Revert> {
        Err(Revert::new("rewards closed"))
    }
}

fn registry() -> OrderRegistry {
    OrderRegistry::new(REGISTRY, OWNER)
}

#[test]
fn test_broadcast_and_lookup() {
    let mut fx = Fixture::new();
    let mut registry = registry();
    let order = fx.order(100, 200).build();
    let signature = fx.sign(&order);

    let hash = registry
        .broadcast(&mut fx.sandbox, &mut fx.exchange, fx.taker, &order, &signature)
        .unwrap();

    assert_eq!(hash, fx.exchange.hash_order(&order));
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.order_by_hash(&hash), Some(&order));
    assert_eq!(registry.signature_by_hash(&hash), Some(&signature));

    let listed = registry.orders_by_maker(fx.maker_address());
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].submitter, fx.taker);
    assert!(registry.orders_by_maker(fx.taker).is_empty());

    // broadcasting never touches fill state
    assert!(fx.exchange.remaining_raw(&hash).is_zero());
}

#[test]
fn test_stored_order_is_fillable() {
    let mut fx = Fixture::new();
    let mut registry = registry();
    let order = fx.order(100, 100).build();
    let signature = fx.sign(&order);
    let hash = registry
        .broadcast(&mut fx.sandbox, &mut fx.exchange, fx.taker, &order, &signature)
        .unwrap();

    let stored = registry.order_by_hash(&hash).unwrap().clone();
    let stored_sig = registry.signature_by_hash(&hash).unwrap().clone();
    let fill = fx
        .exchange
        .fill_order(
            &mut fx.sandbox,
            fx.taker,
            &stored,
            &stored_sig,
            &limit_order_protocol::engine::FillRequest::making(u(40), u(40)),
        )
        .unwrap();
    assert_eq!(fill.order_hash, hash);
}

#[test]
fn test_duplicate_and_bad_signature() {
    let mut fx = Fixture::new();
    let mut registry = registry();
    let order = fx.order(100, 200).build();
    let signature = fx.sign(&order);

    registry
        .broadcast(&mut fx.sandbox, &mut fx.exchange, fx.taker, &order, &signature)
        .unwrap();
    assert_eq!(
        registry.broadcast(&mut fx.sandbox, &mut fx.exchange, fx.taker, &order, &signature),
        Err(ProtocolError::AlreadyBroadcast)
    );

    let other = fx.order(100, 200).salt(u(1)).build();
    let forged = sign_digest(&key(0x33), fx.exchange.hash_order(&other)).unwrap();
    assert_eq!(
        registry.broadcast(&mut fx.sandbox, &mut fx.exchange, fx.taker, &other, &forged),
        Err(ProtocolError::BadSignature)
    );
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_fee_is_charged_to_submitter() {
    let mut fx = Fixture::new();
    let mut registry = registry();
    registry
        .set_fee_policy(
            OWNER,
            Some(FeePolicy {
                rate_bps: 25,
                recipient: FEE_RECIPIENT,
            }),
        )
        .unwrap();

    let maker = fx.maker_address();
    let asset = fx.maker_asset;
    fx.sandbox.approve(asset, maker, REGISTRY, U256::MAX).unwrap();

    let order = fx.order(100_000, 100_000).build();
    let signature = fx.sign(&order);
    registry
        .broadcast(&mut fx.sandbox, &mut fx.exchange, maker, &order, &signature)
        .unwrap();

    assert_eq!(fx.balance(asset, FEE_RECIPIENT), u(250));
    assert_eq!(fx.balance(asset, maker), u(INITIAL_BALANCE - 250));
}

#[test]
fn test_fee_without_allowance_fails() {
    let mut fx = Fixture::new();
    let mut registry = registry();
    registry
        .set_fee_policy(
            OWNER,
            Some(FeePolicy {
                rate_bps: 100,
                recipient: FEE_RECIPIENT,
            }),
        )
        .unwrap();

    let maker = fx.maker_address();
    let order = fx.order(1_000, 1_000).build();
    let signature = fx.sign(&order);
    let result = registry.broadcast(&mut fx.sandbox, &mut fx.exchange, maker, &order, &signature);

    assert!(matches!(
        result,
        Err(ProtocolError::AssetCallFailed { asset, .. }) if asset == fx.maker_asset
    ));
    assert!(registry.is_empty());
}

#[test]
fn test_distributor_is_notified() {
    let mut fx = Fixture::new();
    let mut registry = registry();
    let seen = Rc::new(RefCell::new(Vec::new()));
    registry
        .set_reward_distributor(OWNER, Some(Box::new(Recorder(Rc::clone(&seen)))))
        .unwrap();

    let order = fx.order(100, 200).build();
    let signature = fx.sign(&order);
    let hash = registry
        .broadcast(&mut fx.sandbox, &mut fx.exchange, fx.taker, &order, &signature)
        .unwrap();

    assert_eq!(*seen.borrow(), vec![(fx.taker, hash)]);
}

#[test]
fn test_rejecting_distributor_rolls_back_fee() {
    let mut fx = Fixture::new();
    let mut registry = registry();
    registry
        .set_fee_policy(
            OWNER,
            Some(FeePolicy {
                rate_bps: 100,
                recipient: FEE_RECIPIENT,
            }),
        )
        .unwrap();
    registry
        .set_reward_distributor(OWNER, Some(Box::new(Closed)))
        .unwrap();

    let maker = fx.maker_address();
    let asset = fx.maker_asset;
    fx.sandbox.approve(asset, maker, REGISTRY, U256::MAX).unwrap();

    let order = fx.order(1_000, 1_000).build();
    let signature = fx.sign(&order);
    assert_eq!(
        registry.broadcast(&mut fx.sandbox, &mut fx.exchange, maker, &order, &signature),
        Err(ProtocolError::CallFailed {
            target: REGISTRY,
            reason: "rewards closed".into()
        })
    );

    assert!(fx.balance(asset, FEE_RECIPIENT).is_zero());
    assert!(registry.is_empty());
}

#[test]
fn test_owner_controls_overlays() {
    let mut registry = registry();
    let stranger = Address::repeat_byte(0x42);

    assert_eq!(
        registry.set_reward_distributor(stranger, Some(Box::new(Closed))),
        Err(ProtocolError::AccessDenied)
    );
    registry.transfer_ownership(OWNER, stranger).unwrap();
    assert_eq!(registry.owner(), stranger);
    registry.set_reward_distributor(stranger, None).unwrap();
}
