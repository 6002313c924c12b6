//! Base-58 public key validation.

use std::fmt;
use std::str::FromStr;

use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Decoded length of a valid public key.
pub const PUBKEY_BYTES: usize = 32;

/// A validated 32-byte public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; PUBKEY_BYTES]);

impl PublicKey {
    pub fn as_bytes(&self) -> &[u8; PUBKEY_BYTES] {
        &self.0
    }
}

impl From<[u8; PUBKEY_BYTES]> for PublicKey {
    fn from(bytes: [u8; PUBKEY_BYTES]) -> Self {
        Self(bytes)
    }
}

impl FromStr for PublicKey {
    type Err = BlockchainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BlockchainError::InvalidAddress(s.to_string());
        let decoded = bs58::decode(s).into_vec().map_err(|_| invalid())?;
        let bytes: [u8; PUBKEY_BYTES] = decoded.try_into().map_err(|_| invalid())?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

/// Check that `address` is a base-58 encoded 32-byte public key.
pub fn validate(address: &str) -> BlockchainResult<PublicKey> {
    address.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_keys_accepted() {
        for key in [
            "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA",
            "11111111111111111111111111111111",
            "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
        ] {
            let pubkey = validate(key).unwrap();
            assert_eq!(pubkey.to_string(), key);
        }
    }

    #[test]
    fn test_every_32_byte_value_accepted() {
        for seed in [0u8, 1, 7, 128, 255] {
            let bytes = [seed; PUBKEY_BYTES];
            let encoded = bs58::encode(bytes).into_string();
            assert_eq!(validate(&encoded).unwrap().as_bytes(), &bytes);
        }
    }

    #[test]
    fn test_wrong_length_rejected() {
        for len in (0..=64).filter(|&l| l != PUBKEY_BYTES) {
            let encoded = bs58::encode(vec![42u8; len]).into_string();
            let err = validate(&encoded).unwrap_err();
            assert!(matches!(err, BlockchainError::InvalidAddress(_)), "length {}", len);
        }
    }

    #[test]
    fn test_non_base58_rejected() {
        for input in ["0OIl", "not a key", "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5D0"] {
            assert!(validate(input).is_err(), "{}", input);
        }
    }
}
