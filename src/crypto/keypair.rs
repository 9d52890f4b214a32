//! Ethereum keypair generation and encoding.

use secp256k1::{PublicKey, SecretKey, SECP256K1};

use super::{decode_fixed, keccak256, Address, KeyError};

/// A secp256k1 keypair together with its derived Ethereum address.
#[derive(Debug, Clone)]
pub struct Keypair {
    secret_key: SecretKey,
    public_key: PublicKey,
    /// The derived Ethereum address
    address: Address,
}

impl Keypair {
    /// Generates a new random keypair.
    ///
    /// Uses a cryptographically secure random number generator.
    #[inline]
    pub fn generate() -> Self {
        let (secret_key, public_key) = SECP256K1.generate_keypair(&mut rand::thread_rng());
        Self::from_parts(secret_key, public_key)
    }

    /// Builds a keypair from raw secret key bytes.
    pub fn from_secret_key(secret_bytes: [u8; 32]) -> Result<Self, KeyError> {
        let secret_key = SecretKey::from_slice(&secret_bytes)?;
        let public_key = PublicKey::from_secret_key(SECP256K1, &secret_key);
        Ok(Self::from_parts(secret_key, public_key))
    }

    /// Decodes a hex private key (optional `0x` prefix, 32 bytes).
    pub fn from_hex(private_key: &str) -> Result<Self, KeyError> {
        Self::from_secret_key(decode_fixed::<32>(private_key)?)
    }

    fn from_parts(secret_key: SecretKey, public_key: PublicKey) -> Self {
        let address = Self::derive_address(&public_key);
        Self {
            secret_key,
            public_key,
            address,
        }
    }

    /// Derives an Ethereum address from a secp256k1 public key.
    ///
    /// Process:
    /// 1. Serialize the public key in uncompressed form (65 bytes)
    /// 2. Remove the first byte (0x04 prefix)
    /// 3. Hash the remaining 64 bytes with Keccak-256
    /// 4. Take the last 20 bytes of the hash
    #[inline]
    pub fn derive_address(public_key: &PublicKey) -> Address {
        let public_key_bytes = public_key.serialize_uncompressed();
        let hash = keccak256(&public_key_bytes[1..]);

        let mut address_bytes = [0u8; 20];
        address_bytes.copy_from_slice(&hash[12..]);

        Address::from_bytes(address_bytes)
    }

    /// Returns the private key as `0x`-prefixed hex.
    pub fn private_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.secret_key.secret_bytes()))
    }

    /// Returns the uncompressed public key (including the `04` tag) as `0x`-prefixed hex.
    pub fn public_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.public_key.serialize_uncompressed()))
    }

    /// Returns the private key bytes.
    pub fn private_key_bytes(&self) -> [u8; 32] {
        self.secret_key.secret_bytes()
    }

    /// Returns a reference to the derived address.
    #[inline]
    pub fn address(&self) -> &Address {
        &self.address
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_one() -> [u8; 32] {
        let mut secret = [0u8; 32];
        secret[31] = 1;
        secret
    }

    #[test]
    fn test_keypair_generation() {
        let a = Keypair::generate();
        let b = Keypair::generate();
        assert_eq!(a.private_key_bytes().len(), 32);
        assert_ne!(a.private_key_bytes(), b.private_key_bytes());
    }

    #[test]
    fn test_deterministic_address() {
        let keypair = Keypair::from_secret_key(key_one()).unwrap();

        // Address for private key = 1 is well-known
        assert_eq!(
            keypair.address().to_hex(),
            "7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
    }

    #[test]
    fn test_key_encodings() {
        let keypair = Keypair::from_secret_key(key_one()).unwrap();
        assert_eq!(
            keypair.private_key_hex(),
            "0x0000000000000000000000000000000000000000000000000000000000000001"
        );
        // Generator point G, uncompressed.
        assert_eq!(
            keypair.public_key_hex(),
            "0x0479be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798\
             483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8"
        );
    }

    #[test]
    fn test_from_hex_roundtrip() {
        let keypair = Keypair::generate();
        let decoded = Keypair::from_hex(&keypair.private_key_hex()).unwrap();
        assert_eq!(decoded.address(), keypair.address());
    }

    #[test]
    fn test_zero_key_rejected() {
        assert!(matches!(
            Keypair::from_secret_key([0u8; 32]),
            Err(KeyError::InvalidSecretKey(_))
        ));
    }

    #[test]
    fn test_from_hex_wrong_length() {
        assert!(matches!(
            Keypair::from_hex("0x01"),
            Err(KeyError::InvalidLength {
                expected: 32,
                actual: 1
            })
        ));
    }
}
