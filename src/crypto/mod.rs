//! Cryptographic operations for Ethereum key and address derivation.
//!
//! This module provides:
//! - Secure random key generation using secp256k1
//! - Account address derivation using Keccak-256
//! - Contract address derivation (`keccak256(rlp([sender, nonce]))[12..]`)
//! - EIP-55 checksum rendering

mod account;
mod address;
mod contract;
mod keypair;

pub use account::Account;
pub use address::Address;
pub use contract::{contract_address, rlp_sender_nonce, MAX_RLP_LEN};
pub use keypair::Keypair;

use tiny_keccak::{Hasher, Keccak};

/// Keccak-256 of arbitrary bytes (output 32 bytes).
#[inline]
pub fn keccak256(input: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(input);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

/// Errors raised when decoding externally supplied key material or addresses.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("invalid hex string: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid secp256k1 secret key: {0}")]
    InvalidSecretKey(#[from] secp256k1::Error),
}

/// Decodes a hex string with an optional `0x` prefix into exactly `N` bytes.
pub(crate) fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], KeyError> {
    let s = s.trim();
    let s = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    let bytes = hex::decode(s)?;
    let actual = bytes.len();
    bytes
        .try_into()
        .map_err(|_| KeyError::InvalidLength { expected: N, actual })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak_empty() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_decode_fixed_prefix_optional() {
        let a: [u8; 2] = decode_fixed("0xbeef").unwrap();
        let b: [u8; 2] = decode_fixed("BEEF").unwrap();
        assert_eq!(a, [0xbe, 0xef]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_decode_fixed_wrong_length() {
        let err = decode_fixed::<20>("0xbeef").unwrap_err();
        assert!(matches!(
            err,
            KeyError::InvalidLength {
                expected: 20,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_decode_fixed_bad_hex() {
        assert!(matches!(
            decode_fixed::<2>("0xzzzz"),
            Err(KeyError::InvalidHex(_))
        ));
    }
}
