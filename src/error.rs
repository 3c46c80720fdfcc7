//! Error types for the limit order protocol.
//!
//! Every failure is fatal to the enclosing top-level call: the transaction is
//! rolled back and the error tag surfaces to the caller unchanged.

use alloy::primitives::Address;
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Failure reported by an external callable unit (token, getter, receiver...).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct Revert {
    /// Human readable revert reason
    pub reason: String,
}

impl Revert {
    /// Create a revert with the given reason
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl From<ProtocolError> for Revert {
    fn from(err: ProtocolError) -> Self {
        Self::new(err.to_string())
    }
}

/// Protocol-level errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Exactly one of making/taking must be zero (limit orders), or not both
    /// non-zero (RFQ orders).
    #[error("only one amount should be 0")]
    InvalidAmountSpecification,

    /// The order is fully filled or cancelled.
    #[error("remaining amount is 0")]
    OrderExhausted,

    /// The order is restricted to another taker.
    #[error("private order")]
    PrivateOrder,

    /// The signature does not belong to the order maker.
    #[error("bad signature")]
    BadSignature,

    /// The permit callback filled the same order before the first fill finished.
    #[error("reentrancy detected")]
    ReentrancyDetected,

    /// The order predicate evaluated to false.
    #[error("predicate returned false")]
    PredicateFailed,

    /// A getter did not return exactly one 256-bit word.
    #[error("invalid getAmount return")]
    InvalidGetterReturn,

    /// The predicate did not return exactly one boolean word.
    #[error("invalid predicate return")]
    InvalidPredicateReturn,

    /// One of the resolved amounts is zero.
    #[error("can't swap 0 amount")]
    ZeroSwap,

    /// An asset transfer reverted or returned something other than `true`.
    #[error("asset call failed on {asset}: {reason}")]
    AssetCallFailed {
        /// Asset the transfer was issued against
        asset: Address,
        /// Revert reason or return value description
        reason: String,
    },

    /// Caller is not allowed to perform the operation.
    #[error("access denied")]
    AccessDenied,

    /// Cancel of an order that is already filled or cancelled.
    #[error("already filled")]
    AlreadyFilled,

    /// Remaining amount requested for an order that was never filled.
    #[error("unknown order")]
    UnknownOrder,

    /// Fill target is the zero address.
    #[error("zero target is forbidden")]
    ZeroTarget,

    /// Solved taking amount exceeds the taker's threshold.
    #[error("taking amount too high")]
    TakingAmountTooHigh,

    /// Solved making amount is below the taker's threshold.
    #[error("making amount too low")]
    MakingAmountTooLow,

    /// Getter-less order filled with something other than its full size.
    #[error("wrong amount")]
    WrongAmount,

    /// 256-bit arithmetic overflow.
    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    /// Proportional getter on an order with a zero nominal amount.
    #[error("division by zero")]
    DivisionByZero,

    /// A non-empty descriptor is too short to carry a target address.
    #[error("malformed call descriptor ({len} bytes)")]
    MalformedCallDescriptor {
        /// Length of the offending descriptor
        len: usize,
    },

    /// Taker-supplied permit is shorter than an address.
    #[error("permit length too low")]
    PermitTooShort,

    /// A getter, predicate, permit or interaction call reverted.
    #[error("call to {target} failed: {reason}")]
    CallFailed {
        /// Callee address
        target: Address,
        /// Revert reason
        reason: String,
    },

    /// A self-call used a selector the exchange does not expose.
    #[error("unknown self-call selector 0x{0}")]
    UnknownSelector(String),

    /// Predicate tree nests deeper than the configured bound.
    #[error("predicate nesting exceeds {0}")]
    PredicateTooDeep(usize),

    /// RFQ order past its expiration.
    #[error("order expired")]
    OrderExpired,

    /// RFQ order already filled or cancelled.
    #[error("invalidated order")]
    InvalidatedOrder,

    /// RFQ making amount above the order size.
    #[error("making amount exceeded")]
    MakingAmountExceeded,

    /// RFQ taking amount above the order size.
    #[error("taking amount exceeded")]
    TakingAmountExceeded,

    /// The registry already holds an order with this hash.
    #[error("order already broadcast")]
    AlreadyBroadcast,

    /// Deterministic encoding failed.
    #[error("encoding error: {0}")]
    Encoding(String),
}

impl ProtocolError {
    /// Wrap a revert coming back from `target`
    pub fn call_failed(target: Address, revert: Revert) -> Self {
        Self::CallFailed {
            target,
            reason: revert.reason,
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
