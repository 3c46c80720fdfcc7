//! Core data types for the limit order protocol
//!
//! ## Types
//!
//! - [`Order`]: A signed, partially fillable limit order
//! - [`OrderRFQ`]: A signed, single-use RFQ order
//! - [`CallDescriptor`]: Curried call data embedded in orders
//! - [`Event`]: Events emitted by the exchange
//! - [`RemainingEntry`]: SSZ form of a remaining-amount record
//!
//! ## Amounts
//!
//! All amounts are raw `U256` base units. See [`amount`] for conversion
//! from and to human readable decimal strings.

mod descriptor;
mod event;
mod order;
mod record;
pub mod amount;

// Re-export all types at module level
pub use descriptor::{cut_last_arg, CallDescriptor, ADDRESS_LEN};
pub use event::Event;
pub use order::{
    invalidator_bit, invalidator_slot, proportional_maker_getter, proportional_taker_getter,
    Getters, Order, OrderBuilder, OrderRFQ,
};
pub use record::{state_root, RemainingEntry, RemainingState, ORDER_FILLED, ORDER_UNSEEN};
