//! Reference in-memory [`Host`].
//!
//! ## Accounts
//!
//! - Tokens: [`TokenLedger`] instances answering `transferFrom`, `approve`
//!   and `balanceOf`
//! - Contracts: [`Contract`] trait objects (getters, predicates, receivers,
//!   permit targets, contract signers)
//! - Anything else has no code: calls to it revert
//!
//! ## Transactions
//!
//! Checkpoints snapshot every token ledger. Nested checkpoints are strictly
//! LIFO, matching the exchange's transaction nesting.
//!
//! ## Example
//!
//! ```
//! use alloy::primitives::{Address, U256};
//! use limit_order_protocol::sandbox::{Sandbox, TokenFlavor};
//!
//! let mut sandbox = Sandbox::new();
//! let token = sandbox.deploy_token(TokenFlavor::Standard);
//! let alice = Address::repeat_byte(1);
//!
//! sandbox.mint(token, alice, U256::from(100)).unwrap();
//! assert_eq!(sandbox.balance_of(token, alice), U256::from(100));
//! ```

mod contract;
mod token;

pub use contract::{CallEnv, Callback, Contract, StaticEnv, View};
pub use token::{TokenFlavor, TokenLedger};

use std::collections::HashMap;
use std::rc::Rc;

use alloy::primitives::{Address, Bytes, U256};

use crate::engine::LimitOrderProtocol;
use crate::error::Revert;
use crate::host::{Host, HostCheckpoint};

/// Default block timestamp of a fresh sandbox
pub const GENESIS_TIMESTAMP: u64 = 1_700_000_000;

/// In-memory chain: token ledgers, contracts and a block clock.
pub struct Sandbox {
    timestamp: u64,
    next_account: u64,
    tokens: HashMap<Address, TokenLedger>,
    contracts: HashMap<Address, Rc<dyn Contract>>,
    snapshots: Vec<HashMap<Address, TokenLedger>>,
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Sandbox {
    /// Empty sandbox at [`GENESIS_TIMESTAMP`]
    pub fn new() -> Self {
        Self {
            timestamp: GENESIS_TIMESTAMP,
            next_account: 1,
            tokens: HashMap::new(),
            contracts: HashMap::new(),
            snapshots: Vec::new(),
        }
    }

    // ========================================================================
    // Clock
    // ========================================================================

    /// Set the block timestamp
    pub fn set_timestamp(&mut self, timestamp: u64) {
        self.timestamp = timestamp;
    }

    /// Move the block timestamp forward
    pub fn advance_time(&mut self, seconds: u64) {
        self.timestamp = self.timestamp.saturating_add(seconds);
    }

    // ========================================================================
    // Deployment
    // ========================================================================

    fn fresh_address(&mut self) -> Address {
        let mut bytes = [0u8; 20];
        bytes[0] = 0xC0;
        bytes[12..].copy_from_slice(&self.next_account.to_be_bytes());
        self.next_account += 1;
        Address::from(bytes)
    }

    /// Deploy a token at a fresh address
    pub fn deploy_token(&mut self, flavor: TokenFlavor) -> Address {
        let address = self.fresh_address();
        self.tokens.insert(address, TokenLedger::new(flavor));
        address
    }

    /// Deploy `contract` at a fresh address
    pub fn deploy(&mut self, contract: impl Contract + 'static) -> Address {
        let address = self.fresh_address();
        self.deploy_at(address, contract);
        address
    }

    /// Deploy `contract` at `address`, replacing any code already there
    pub fn deploy_at(&mut self, address: Address, contract: impl Contract + 'static) {
        self.contracts.insert(address, Rc::new(contract));
    }

    // ========================================================================
    // Token helpers
    // ========================================================================

    fn token_mut(&mut self, token: Address) -> Result<&mut TokenLedger, Revert> {
        self.tokens
            .get_mut(&token)
            .ok_or_else(|| Revert::new(format!("no token at {token}")))
    }

    /// Credit `amount` of `token` to `to`
    pub fn mint(&mut self, token: Address, to: Address, amount: U256) -> Result<(), Revert> {
        self.token_mut(token)?.mint(to, amount)
    }

    /// Set the allowance `owner` grants `spender` on `token`
    pub fn approve(
        &mut self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), Revert> {
        self.token_mut(token)?.approve(owner, spender, amount);
        Ok(())
    }

    /// Balance of `owner` (zero for unknown tokens)
    pub fn balance_of(&self, token: Address, owner: Address) -> U256 {
        self.tokens
            .get(&token)
            .map(|ledger| ledger.balance_of(&owner))
            .unwrap_or_default()
    }

    /// Allowance `owner` granted `spender` (zero for unknown tokens)
    pub fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256 {
        self.tokens
            .get(&token)
            .map(|ledger| ledger.allowance(&owner, &spender))
            .unwrap_or_default()
    }
}

impl Host for Sandbox {
    fn block_timestamp(&self) -> u64 {
        self.timestamp
    }

    fn is_contract(&self, account: Address) -> bool {
        self.tokens.contains_key(&account) || self.contracts.contains_key(&account)
    }

    fn call(
        &mut self,
        exchange: &mut LimitOrderProtocol,
        caller: Address,
        target: Address,
        input: &[u8],
    ) -> Result<Bytes, Revert> {
        if let Some(ledger) = self.tokens.get_mut(&target) {
            return ledger.execute(caller, input);
        }
        let Some(contract) = self.contracts.get(&target).cloned() else {
            return Err(Revert::new(format!("no code at {target}")));
        };
        let mut env = CallEnv {
            host: self,
            exchange,
            address: target,
        };
        contract.call(&mut env, caller, input)
    }

    fn static_call(
        &self,
        exchange: &LimitOrderProtocol,
        target: Address,
        input: &[u8],
    ) -> Result<Bytes, Revert> {
        if let Some(ledger) = self.tokens.get(&target) {
            return ledger.view(input);
        }
        let Some(contract) = self.contracts.get(&target) else {
            return Err(Revert::new(format!("no code at {target}")));
        };
        let env = StaticEnv {
            host: self,
            exchange,
            address: target,
        };
        contract.static_call(&env, input)
    }

    fn checkpoint(&mut self) -> HostCheckpoint {
        self.snapshots.push(self.tokens.clone());
        self.snapshots.len() - 1
    }

    fn commit(&mut self, checkpoint: HostCheckpoint) {
        self.snapshots.truncate(checkpoint);
    }

    fn revert_to(&mut self, checkpoint: HostCheckpoint) {
        if let Some(tokens) = self.snapshots.drain(checkpoint..).next() {
            self.tokens = tokens;
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
