//! Accounts: an address with optional key material.

use std::collections::BTreeMap;

use super::{contract_address, Address, KeyError, Keypair};

/// An address being searched, with the keypair it came from when known.
///
/// Accounts built from a bare address (for contract scanning) carry no key.
#[derive(Debug, Clone)]
pub struct Account {
    address: Address,
    key: Option<Keypair>,
}

impl Account {
    /// Creates a fresh random account.
    #[inline]
    pub fn generate() -> Self {
        Keypair::generate().into()
    }

    /// Decodes an account from a hex private key.
    pub fn from_private_key(private_key: &str) -> Result<Self, KeyError> {
        Keypair::from_hex(private_key).map(Into::into)
    }

    /// Creates a keyless account from a hex address.
    pub fn from_address(address: &str) -> Result<Self, KeyError> {
        Ok(Self {
            address: address.parse()?,
            key: None,
        })
    }

    /// Returns the account address.
    #[inline]
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Returns the keypair, if this account was built from key material.
    pub fn key(&self) -> Option<&Keypair> {
        self.key.as_ref()
    }

    /// Address of the contract this account creates with nonce `nonce`.
    #[inline]
    pub fn contract(&self, nonce: u64) -> Address {
        contract_address(&self.address, nonce)
    }

    /// The first `depth` contract addresses, keyed by 1-based ordinal.
    pub fn contracts(&self, depth: usize) -> BTreeMap<usize, Address> {
        (0..depth)
            .map(|i| (i + 1, self.contract(i as u64)))
            .collect()
    }

    /// Uncompressed public key hex, when the key is known.
    pub fn public_key_hex(&self) -> Option<String> {
        self.key.as_ref().map(Keypair::public_key_hex)
    }

    /// Private key hex, when the key is known.
    pub fn private_key_hex(&self) -> Option<String> {
        self.key.as_ref().map(Keypair::private_key_hex)
    }
}

impl From<Keypair> for Account {
    fn from(key: Keypair) -> Self {
        Self {
            address: *key.address(),
            key: Some(key),
        }
    }
}
