//! Order hashing and signature verification.
//!
//! ## Hashing
//!
//! Orders are hashed with EIP-712: `keccak256(0x1901 ‖ domainSeparator ‖
//! hashStruct(order))`. The domain (name, version, chain id, verifying
//! contract) comes from [`ProtocolConfig`], so a hash is only valid for one
//! deployment.
//!
//! ## Signatures
//!
//! Two signer kinds are accepted:
//!
//! 1. Plain keys: a 65-byte `r ‖ s ‖ v` signature recovering to the signer
//! 2. Contracts: `isValidSignature(digest, signature)` returning the ERC-1271
//!    magic value
//!
//! The recoverable check runs first; the ERC-1271 call is only made when it
//! fails and the signer has code.

use std::borrow::Cow;

use alloy::primitives::{Address, Bytes, Signature, B256, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use alloy::sol_types::{Eip712Domain, SolCall, SolStruct};

use crate::abi::{IERC1271, ERC1271_MAGIC_VALUE};
use crate::config::ProtocolConfig;
use crate::engine::LimitOrderProtocol;
use crate::host::Host;
use crate::types::{Order, OrderRFQ};

/// Length of a recoverable secp256k1 signature
pub const SIGNATURE_LEN: usize = 65;

/// Largest accepted `s` (secp256k1 order / 2)
const SECP256K1_HALF_ORDER: U256 = U256::from_limbs([
    0xdfe9_2f46_681b_20a0,
    0x5d57_6e73_57a4_501d,
    0xffff_ffff_ffff_ffff,
    0x7fff_ffff_ffff_ffff,
]);

/// EIP-712 hasher bound to one deployment.
#[derive(Debug, Clone)]
pub struct OrderHasher {
    domain: Eip712Domain,
    separator: B256,
}

impl OrderHasher {
    /// Build the domain from a config
    pub fn new(config: &ProtocolConfig) -> Self {
        let domain = Eip712Domain::new(
            Some(Cow::Owned(config.name.clone())),
            Some(Cow::Owned(config.version.clone())),
            Some(U256::from(config.chain_id)),
            Some(config.verifying_contract),
            None,
        );
        let separator = domain.separator();
        Self { domain, separator }
    }

    /// The EIP-712 domain
    #[inline]
    pub fn domain(&self) -> &Eip712Domain {
        &self.domain
    }

    /// Cached domain separator
    #[inline]
    pub fn domain_separator(&self) -> B256 {
        self.separator
    }

    /// Digest a maker signs for a limit order
    pub fn hash_order(&self, order: &Order) -> B256 {
        order.eip712_signing_hash(&self.domain)
    }

    /// Digest a maker signs for an RFQ order
    pub fn hash_order_rfq(&self, order: &OrderRFQ) -> B256 {
        order.eip712_signing_hash(&self.domain)
    }
}

/// Check `signature` over `digest` for `signer`.
///
/// Recoverable signatures must be canonical: `v` is 27 or 28 and `s` lies in
/// the lower half of the curve order. Malleated forms fall through to the
/// ERC-1271 check.
pub fn verify_signature(
    host: &dyn Host,
    exchange: &LimitOrderProtocol,
    signer: Address,
    digest: B256,
    signature: &[u8],
) -> bool {
    if recovers_to(signer, digest, signature) {
        return true;
    }
    if !host.is_contract(signer) {
        return false;
    }

    let call = IERC1271::isValidSignatureCall {
        hash: digest,
        signature: Bytes::copy_from_slice(signature),
    };
    match host.static_call(exchange, signer, &call.abi_encode()) {
        Ok(output) => is_magic_word(&output),
        Err(_) => false,
    }
}

/// Whether a canonical 65-byte signature recovers to `signer`
pub fn recovers_to(signer: Address, digest: B256, signature: &[u8]) -> bool {
    if signature.len() != SIGNATURE_LEN || !is_canonical(signature) {
        return false;
    }
    let Ok(signature) = Signature::try_from(signature) else {
        return false;
    };
    signature
        .recover_address_from_prehash(&digest)
        .is_ok_and(|recovered| recovered == signer)
}

fn is_canonical(signature: &[u8]) -> bool {
    let s = U256::from_be_slice(&signature[32..64]);
    matches!(signature[64], 27 | 28) && s <= SECP256K1_HALF_ORDER
}

fn is_magic_word(output: &[u8]) -> bool {
    output.len() >= 32
        && output[..4] == ERC1271_MAGIC_VALUE
        && output[4..32].iter().all(|&b| b == 0)
}

/// Sign a digest with a local key, producing `r ‖ s ‖ v` bytes
pub fn sign_digest(signer: &PrivateKeySigner, digest: B256) -> Result<Bytes, alloy::signers::Error> {
    let signature = signer.sign_hash_sync(&digest)?;
    Ok(Bytes::copy_from_slice(&signature.as_bytes()))
}

// ============================================================================
// Unit Tests
// ============================================================================
