//! Call descriptors: curried "target + call data" blobs embedded in orders.
//!
//! Getters, predicates, permits and interactions all share one layout:
//!
//! ```text
//! | target (20 bytes) | call data (n bytes) |
//! ```
//!
//! Getters are invoked with the runtime amount appended to the call data as a
//! single big-endian 256-bit word.

use alloy::primitives::{Address, Bytes, U256};

use crate::error::{ProtocolError, Result};

/// Number of bytes taken by the target prefix
pub const ADDRESS_LEN: usize = 20;

/// A decoded call descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallDescriptor {
    /// Callee address
    pub target: Address,
    /// Fixed call data prefix
    pub data: Bytes,
}

impl CallDescriptor {
    /// Create a descriptor
    pub fn new(target: Address, data: impl Into<Bytes>) -> Self {
        Self {
            target,
            data: data.into(),
        }
    }

    /// Decode, treating an empty blob as "absent" and short blobs as malformed.
    ///
    /// Used for getters and predicates where a non-empty blob must be callable.
    pub fn decode_strict(raw: &[u8]) -> Result<Option<Self>> {
        if raw.is_empty() {
            return Ok(None);
        }
        Self::decode(raw)
            .map(Some)
            .ok_or(ProtocolError::MalformedCallDescriptor { len: raw.len() })
    }

    /// Decode, returning `None` for anything shorter than an address.
    ///
    /// Used for permits and interactions where short blobs are ignored.
    pub fn decode(raw: &[u8]) -> Option<Self> {
        if raw.len() < ADDRESS_LEN {
            return None;
        }
        let (target, data) = raw.split_at(ADDRESS_LEN);
        Some(Self {
            target: Address::from_slice(target),
            data: Bytes::copy_from_slice(data),
        })
    }

    /// Encode back into the packed on-order layout
    pub fn encode(&self) -> Bytes {
        let mut out = Vec::with_capacity(ADDRESS_LEN + self.data.len());
        out.extend_from_slice(self.target.as_slice());
        out.extend_from_slice(&self.data);
        out.into()
    }

    /// Call data with `amount` appended as the final argument
    pub fn calldata_with_amount(&self, amount: U256) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len() + 32);
        out.extend_from_slice(&self.data);
        out.extend_from_slice(&amount.to_be_bytes::<32>());
        out
    }
}

/// Drop the trailing 32-byte argument of an ABI-encoded call.
///
/// Turns a fully encoded getter call into its curried prefix.
pub fn cut_last_arg(calldata: &[u8]) -> Bytes {
    let keep = calldata.len().saturating_sub(32);
    Bytes::copy_from_slice(&calldata[..keep])
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode() {
        let descriptor = CallDescriptor::new(Address::repeat_byte(0xAA), vec![1u8, 2, 3]);
        let raw = descriptor.encode();

        assert_eq!(raw.len(), 23);
        assert_eq!(CallDescriptor::decode(&raw), Some(descriptor));
    }

    #[test]
    fn test_decode_target_only() {
        let raw = Address::repeat_byte(0x01).to_vec();
        let descriptor = CallDescriptor::decode(&raw).unwrap();
        assert!(descriptor.data.is_empty());
    }

    #[test]
    fn test_decode_short_blob() {
        assert_eq!(CallDescriptor::decode(&[0u8; 19]), None);
        assert_eq!(CallDescriptor::decode_strict(&[]), Ok(None));
        assert_eq!(
            CallDescriptor::decode_strict(&[0u8; 5]),
            Err(ProtocolError::MalformedCallDescriptor { len: 5 })
        );
    }

    #[test]
    fn test_calldata_with_amount() {
        let descriptor = CallDescriptor::new(Address::ZERO, vec![0xde, 0xad]);
        let calldata = descriptor.calldata_with_amount(U256::from(258u64));

        assert_eq!(calldata.len(), 34);
        assert_eq!(&calldata[..2], &[0xde, 0xad]);
        assert_eq!(calldata[32], 0x01);
        assert_eq!(calldata[33], 0x02);
    }

    #[test]
    fn test_cut_last_arg() {
        let full = [7u8; 68];
        assert_eq!(cut_last_arg(&full).len(), 36);
        assert!(cut_last_arg(&[1u8; 10]).is_empty());
    }
}
