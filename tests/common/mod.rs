//! Shared fixture for integration tests.
//!
//! One exchange deployed in a sandbox, two funded tokens, a maker key and a
//! taker account with unlimited allowances towards the exchange.

#![allow(dead_code)]

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::signers::local::PrivateKeySigner;

use limit_order_protocol::config::ProtocolConfig;
use limit_order_protocol::engine::{FillRequest, FillResult, LimitOrderProtocol};
use limit_order_protocol::error::Result;
use limit_order_protocol::hashing::sign_digest;
use limit_order_protocol::sandbox::{Sandbox, TokenFlavor};
use limit_order_protocol::types::{Order, OrderBuilder};

/// Exchange deployment address
pub const EXCHANGE: Address = Address::new([0xEE; 20]);

/// Initial balance of both parties in both tokens
pub const INITIAL_BALANCE: u64 = 1_000_000;

pub fn key(byte: u8) -> PrivateKeySigner {
    PrivateKeySigner::from_bytes(&B256::repeat_byte(byte)).expect("valid key")
}

pub fn u(v: u64) -> U256 {
    U256::from(v)
}

pub struct Fixture {
    pub exchange: LimitOrderProtocol,
    pub sandbox: Sandbox,
    pub maker: PrivateKeySigner,
    pub taker: Address,
    pub maker_asset: Address,
    pub taker_asset: Address,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_flavors(TokenFlavor::Standard, TokenFlavor::Standard)
    }

    pub fn with_flavors(maker_flavor: TokenFlavor, taker_flavor: TokenFlavor) -> Self {
        let exchange = LimitOrderProtocol::new(ProtocolConfig::new(1, EXCHANGE));
        let mut sandbox = Sandbox::new();
        let maker = key(0x11);
        let taker = key(0x22).address();

        let maker_asset = sandbox.deploy_token(maker_flavor);
        let taker_asset = sandbox.deploy_token(taker_flavor);

        sandbox
            .mint(maker_asset, maker.address(), u(INITIAL_BALANCE))
            .unwrap();
        sandbox.mint(taker_asset, taker, u(INITIAL_BALANCE)).unwrap();
        sandbox
            .approve(maker_asset, maker.address(), EXCHANGE, U256::MAX)
            .unwrap();
        sandbox
            .approve(taker_asset, taker, EXCHANGE, U256::MAX)
            .unwrap();

        Self {
            exchange,
            sandbox,
            maker,
            taker,
            maker_asset,
            taker_asset,
        }
    }

    /// Order builder pre-filled with maker, assets and amounts
    pub fn order(&self, making: u64, taking: u64) -> OrderBuilder {
        OrderBuilder::new(EXCHANGE, self.maker.address())
            .assets(self.maker_asset, self.taker_asset)
            .amounts(u(making), u(taking))
    }

    pub fn sign(&self, order: &Order) -> Bytes {
        sign_digest(&self.maker, self.exchange.hash_order(order)).expect("signing")
    }

    pub fn fill(&mut self, order: &Order, request: &FillRequest) -> Result<FillResult> {
        let signature = self.sign(order);
        self.exchange
            .fill_order(&mut self.sandbox, self.taker, order, &signature, request)
    }

    pub fn balance(&self, token: Address, owner: Address) -> U256 {
        self.sandbox.balance_of(token, owner)
    }

    pub fn maker_address(&self) -> Address {
        self.maker.address()
    }
}

/// One ABI word
pub fn word(v: u64) -> Bytes {
    Bytes::copy_from_slice(&U256::from(v).to_be_bytes::<32>())
}
