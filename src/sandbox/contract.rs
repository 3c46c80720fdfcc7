//! Programmable accounts for the sandbox.
//!
//! A [`Contract`] receives the sandbox and the exchange along with every call,
//! so it can move tokens, answer views or re-enter the exchange. Contract
//! internal state (counters, flags) lives behind interior mutability and is
//! not rolled back with the sandbox ledgers.

use alloy::primitives::{Address, Bytes};

use crate::engine::LimitOrderProtocol;
use crate::error::Revert;
use crate::sandbox::Sandbox;

/// Context handed to a state-changing call.
pub struct CallEnv<'a> {
    /// The sandbox (usable as the `Host` for reentrant calls)
    pub host: &'a mut Sandbox,
    /// The exchange, mutably
    pub exchange: &'a mut LimitOrderProtocol,
    /// Address of the contract being called
    pub address: Address,
}

/// Context handed to a read-only call.
pub struct StaticEnv<'a> {
    /// The sandbox
    pub host: &'a Sandbox,
    /// The exchange, read-only
    pub exchange: &'a LimitOrderProtocol,
    /// Address of the contract being called
    pub address: Address,
}

impl CallEnv<'_> {
    /// Downgrade to a read-only context
    pub fn as_static(&self) -> StaticEnv<'_> {
        StaticEnv {
            host: &*self.host,
            exchange: &*self.exchange,
            address: self.address,
        }
    }
}

/// Code deployed at a sandbox address.
pub trait Contract {
    /// State-changing entry point
    fn call(&self, env: &mut CallEnv<'_>, caller: Address, input: &[u8]) -> Result<Bytes, Revert>;

    /// Read-only entry point
    fn static_call(&self, _env: &StaticEnv<'_>, _input: &[u8]) -> Result<Bytes, Revert> {
        Err(Revert::new("state-changing function called statically"))
    }
}

/// Contract backed by a closure over [`CallEnv`].
pub struct Callback<F>(F);

impl<F> Callback<F>
where
    F: Fn(&mut CallEnv<'_>, Address, &[u8]) -> Result<Bytes, Revert>,
{
    /// Wrap `f` as contract code
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Contract for Callback<F>
where
    F: Fn(&mut CallEnv<'_>, Address, &[u8]) -> Result<Bytes, Revert>,
{
    fn call(&self, env: &mut CallEnv<'_>, caller: Address, input: &[u8]) -> Result<Bytes, Revert> {
        (self.0)(env, caller, input)
    }
}

/// View-only contract backed by a closure over [`StaticEnv`].
pub struct View<F>(F);

impl<F> View<F>
where
    F: Fn(&StaticEnv<'_>, &[u8]) -> Result<Bytes, Revert>,
{
    /// Wrap `f` as view-only contract code
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Contract for View<F>
where
    F: Fn(&StaticEnv<'_>, &[u8]) -> Result<Bytes, Revert>,
{
    fn call(&self, env: &mut CallEnv<'_>, _caller: Address, input: &[u8]) -> Result<Bytes, Revert> {
        (self.0)(&env.as_static(), input)
    }

    fn static_call(&self, env: &StaticEnv<'_>, input: &[u8]) -> Result<Bytes, Revert> {
        (self.0)(env, input)
    }
}
