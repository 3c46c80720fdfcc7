//! ABI bindings for every call the exchange issues or answers.
//!
//! Outbound: token transfers, ERC-1271 checks, fill notifications.
//! Inbound (self-calls): amount calculator, predicate helpers, views.

use alloy::sol;

sol! {
    /// Token surface used for transfers (extra asset data is appended raw).
    interface IERC20 {
        function transferFrom(address from, address to, uint256 amount) external returns (bool);
        function approve(address spender, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
    }

    /// Contract signer validation.
    interface IERC1271 {
        function isValidSignature(bytes32 hash, bytes signature) external view returns (bytes4 magicValue);
    }

    /// Proportional getters, curried with the runtime amount as last argument.
    interface IAmountCalculator {
        function getMakerAmount(uint256 orderMakerAmount, uint256 orderTakerAmount, uint256 swapTakerAmount) external view returns (uint256);
        function getTakerAmount(uint256 orderMakerAmount, uint256 orderTakerAmount, uint256 swapMakerAmount) external view returns (uint256);
    }

    /// Predicate algebra. Every `bytes` argument is a call descriptor
    /// (20-byte target followed by call data).
    interface IPredicateHelper {
        function and(bytes[] calls) external view returns (bool);
        function or(bytes[] calls) external view returns (bool);
        function not(bytes call) external view returns (bool);
        function eq(uint256 value, bytes call) external view returns (bool);
        function lt(uint256 value, bytes call) external view returns (bool);
        function gt(uint256 value, bytes call) external view returns (bool);
        function timestampBelow(uint256 time) external view returns (bool);
        function nonceEquals(address makerAddress, uint256 makerNonce) external view returns (bool);
        function arbitraryStaticCall(address target, bytes data) external view returns (uint256);
    }

    /// Read-only views reachable through self-calls.
    interface IExchangeViews {
        function nonce(address maker) external view returns (uint256);
        function remainingRaw(bytes32 orderHash) external view returns (uint256);
    }

    /// Fill notification sent to interaction targets.
    interface IInteractionReceiver {
        function notifyFillOrder(
            address taker,
            address makerAsset,
            address takerAsset,
            uint256 makingAmount,
            uint256 takingAmount,
            bytes interactiveData
        ) external;
    }
}

/// ERC-1271 success value (`isValidSignature.selector`)
pub const ERC1271_MAGIC_VALUE: [u8; 4] = [0x16, 0x26, 0xba, 0x7e];

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::sol_types::SolCall;

    #[test]
    fn test_erc1271_magic_matches_selector() {
        assert_eq!(IERC1271::isValidSignatureCall::SELECTOR, ERC1271_MAGIC_VALUE);
    }

    #[test]
    fn test_transfer_from_selector() {
        // keccak256("transferFrom(address,address,uint256)")[..4]
        assert_eq!(IERC20::transferFromCall::SELECTOR, [0x23, 0xb8, 0x72, 0xdd]);
    }
}
