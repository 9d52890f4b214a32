//! Ethereum address representation and rendering.

use std::fmt;
use std::str::FromStr;

use super::{decode_fixed, keccak256, KeyError};

/// An Ethereum address (20 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 20]);

impl Address {
    /// Creates an address from raw bytes.
    #[inline]
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Returns the address as raw bytes.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns the address as a lowercase hex string (without 0x prefix).
    #[inline]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Returns the plain lowercase rendering with 0x prefix.
    pub fn to_hex_prefixed(&self) -> String {
        let mut out = String::with_capacity(42);
        out.push_str("0x");
        out.push_str(&self.to_hex());
        out
    }

    /// Returns the address with checksum encoding (EIP-55).
    ///
    /// Each letter of the lowercase hex form is uppercased when the nibble at
    /// the same position of `keccak256(lowercase_hex)` is 8 or more.
    pub fn to_checksum(&self) -> String {
        let hex_addr = self.to_hex();
        let hash = keccak256(hex_addr.as_bytes());

        let mut checksum = String::with_capacity(42);
        checksum.push_str("0x");

        for (i, c) in hex_addr.chars().enumerate() {
            let hash_byte = hash[i / 2];
            let hash_nibble = if i % 2 == 0 {
                hash_byte >> 4
            } else {
                hash_byte & 0x0f
            };

            if c.is_ascii_alphabetic() && hash_nibble >= 8 {
                checksum.push(c.to_ascii_uppercase());
            } else {
                checksum.push(c);
            }
        }

        checksum
    }
}

impl FromStr for Address {
    type Err = KeyError;

    /// Parses `0x`-prefixed or bare hex. Casing is not validated.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<20>(s).map(Self)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_checksum())
    }
}
