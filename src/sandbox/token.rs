//! In-memory ERC-20 style token ledger.

use std::collections::HashMap;

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::{SolCall, SolValue};

use crate::abi::IERC20;
use crate::error::Revert;

/// Length of `transferFrom` call data without trailing asset data
const TRANSFER_FROM_LEN: usize = 4 + 3 * 32;

/// How a token reports the outcome of `transferFrom`/`approve`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenFlavor {
    /// Returns `true` on success, reverts on failure
    #[default]
    Standard,
    /// Returns nothing on success, reverts on failure
    NoReturnValue,
    /// Returns `true` on success, `false` (no revert) on failure
    ReturnsFalse,
}

/// Balances and allowances of one token.
#[derive(Debug, Clone, Default)]
pub struct TokenLedger {
    flavor: TokenFlavor,
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
}

impl TokenLedger {
    /// Empty ledger
    pub fn new(flavor: TokenFlavor) -> Self {
        Self {
            flavor,
            ..Self::default()
        }
    }

    /// Balance of `owner`
    #[inline]
    pub fn balance_of(&self, owner: &Address) -> U256 {
        self.balances.get(owner).copied().unwrap_or_default()
    }

    /// Allowance `owner` granted `spender`
    #[inline]
    pub fn allowance(&self, owner: &Address, spender: &Address) -> U256 {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or_default()
    }

    /// Credit `amount` to `to`
    pub fn mint(&mut self, to: Address, amount: U256) -> Result<(), Revert> {
        let balance = self
            .balance_of(&to)
            .checked_add(amount)
            .ok_or_else(|| Revert::new("mint overflow"))?;
        self.balances.insert(to, balance);
        Ok(())
    }

    /// Set the allowance `owner` grants `spender`
    pub fn approve(&mut self, owner: Address, spender: Address, amount: U256) {
        self.allowances.insert((owner, spender), amount);
    }

    /// Move `amount` from `from` to `to` on behalf of `spender`
    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), Revert> {
        let allowance = self.allowance(&from, &spender);
        if allowance < amount {
            return Err(Revert::new("insufficient allowance"));
        }
        let from_balance = self.balance_of(&from);
        if from_balance < amount {
            return Err(Revert::new("insufficient balance"));
        }

        self.allowances.insert((from, spender), allowance - amount);
        self.balances.insert(from, from_balance - amount);
        let to_balance = self.balance_of(&to);
        self.balances.insert(to, to_balance + amount);
        Ok(())
    }

    /// Execute a state-changing call from `caller`
    pub fn execute(&mut self, caller: Address, input: &[u8]) -> Result<Bytes, Revert> {
        let selector = input.get(..4).ok_or_else(|| Revert::new("missing selector"))?;

        if selector == IERC20::transferFromCall::SELECTOR {
            // trailing asset data is ignored
            let head = &input[..input.len().min(TRANSFER_FROM_LEN)];
            let call = IERC20::transferFromCall::abi_decode(head)
                .map_err(|e| Revert::new(e.to_string()))?;
            let outcome = self.transfer_from(caller, call.from, call.to, call.amount);
            return self.report(outcome);
        }
        if selector == IERC20::approveCall::SELECTOR {
            let call =
                IERC20::approveCall::abi_decode(input).map_err(|e| Revert::new(e.to_string()))?;
            self.approve(caller, call.spender, call.amount);
            return self.report(Ok(()));
        }
        self.view(input)
    }

    /// Answer a read-only call
    pub fn view(&self, input: &[u8]) -> Result<Bytes, Revert> {
        let call =
            IERC20::balanceOfCall::abi_decode(input).map_err(|_| Revert::new("unknown selector"))?;
        Ok(self.balance_of(&call.account).abi_encode().into())
    }

    fn report(&self, outcome: Result<(), Revert>) -> Result<Bytes, Revert> {
        match (self.flavor, outcome) {
            (TokenFlavor::Standard, Ok(())) | (TokenFlavor::ReturnsFalse, Ok(())) => {
                Ok(true.abi_encode().into())
            }
            (TokenFlavor::NoReturnValue, Ok(())) => Ok(Bytes::new()),
            (TokenFlavor::ReturnsFalse, Err(_)) => Ok(false.abi_encode().into()),
            (_, Err(revert)) => Err(revert),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
