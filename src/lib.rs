//! # Limit Order Protocol
//!
//! Signed off-chain limit orders with on-chain partial fills.
//!
//! ## Architecture
//!
//! The protocol consists of:
//! - **Types**: Orders, RFQ orders, call descriptors, events
//! - **Engine**: Fill state machine, amount getters, predicates, nonces, RFQ
//! - **Hashing**: EIP-712 order hashes, ECDSA and ERC-1271 signatures
//! - **Storage**: Journaled remaining-amount records with an SSZ state root
//! - **Host**: The execution environment tokens and callbacks live in
//! - **Registry**: Bulletin board for signed orders with an optional fee
//!
//! ## Design Principles
//!
//! 1. **Determinism**: All operations produce identical results for identical inputs
//! 2. **No Floating Point**: All math is 256-bit integer arithmetic
//! 3. **Exact-once**: An order never yields more than its `makingAmount`
//! 4. **Synchronous Execution**: External calls are nested, never concurrent
//!
//! ## Example
//!
//! ```
//! use alloy::primitives::{Address, B256, U256};
//! use alloy::signers::local::PrivateKeySigner;
//! use limit_order_protocol::config::ProtocolConfig;
//! use limit_order_protocol::engine::{FillRequest, LimitOrderProtocol};
//! use limit_order_protocol::hashing::sign_digest;
//! use limit_order_protocol::sandbox::{Sandbox, TokenFlavor};
//! use limit_order_protocol::types::OrderBuilder;
//!
//! let exchange_address = Address::repeat_byte(0xEE);
//! let mut exchange = LimitOrderProtocol::new(ProtocolConfig::new(1, exchange_address));
//! let mut sandbox = Sandbox::new();
//!
//! let maker = PrivateKeySigner::from_bytes(&B256::repeat_byte(0x11)).unwrap();
//! let taker = Address::repeat_byte(0x22);
//! let weth = sandbox.deploy_token(TokenFlavor::Standard);
//! let dai = sandbox.deploy_token(TokenFlavor::Standard);
//!
//! sandbox.mint(weth, maker.address(), U256::from(100)).unwrap();
//! sandbox.mint(dai, taker, U256::from(100)).unwrap();
//! sandbox.approve(weth, maker.address(), exchange_address, U256::MAX).unwrap();
//! sandbox.approve(dai, taker, exchange_address, U256::MAX).unwrap();
//!
//! let order = OrderBuilder::new(exchange_address, maker.address())
//!     .assets(weth, dai)
//!     .amounts(U256::from(100), U256::from(100))
//!     .build();
//! let signature = sign_digest(&maker, exchange.hash_order(&order)).unwrap();
//!
//! let fill = exchange
//!     .fill_order(&mut sandbox, taker, &order, &signature, &FillRequest::making(U256::from(30), U256::from(30)))
//!     .unwrap();
//! assert_eq!(fill.remaining, U256::from(70));
//! assert_eq!(sandbox.balance_of(weth, taker), U256::from(30));
//! ```

// ============================================================================
// Module declarations
// ============================================================================

/// ABI bindings for outbound calls and self-call helpers
pub mod abi;

/// Deployment configuration
pub mod config;

/// Error types
pub mod error;

/// Core data types: Order, OrderRFQ, CallDescriptor, Event
pub mod types;

/// Journaled protocol storage
pub mod storage;

/// Execution environment abstraction
pub mod host;

/// EIP-712 hashing and signature verification
pub mod hashing;

/// Fill engine: limit orders, RFQ orders, predicates, nonces
pub mod engine;

/// Signed-order bulletin board
pub mod registry;

/// In-memory reference host
pub mod sandbox;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use config::ProtocolConfig;
pub use engine::{FillRequest, FillResult, LimitOrderProtocol, PredicateBuilder, RfqFill};
pub use error::{ProtocolError, Result, Revert};
pub use host::Host;
pub use registry::{FeePolicy, OrderRegistry, RewardDistributor};
pub use types::{CallDescriptor, Event, Getters, Order, OrderBuilder, OrderRFQ};
