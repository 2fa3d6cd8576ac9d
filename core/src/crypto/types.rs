//! crypto/types.rs
//! Algorithm identifiers understood by the crypto layer.

use num_enum::TryFromPrimitive;

use crate::constants::{aead_ids, hash_ids, pubkey_ids, symmetric_ids};
use crate::types::PgpError;
use crate::utils::enum_name_or_hex;

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum SymmetricAlgorithm {
    Aes128 = symmetric_ids::AES128,
    Aes192 = symmetric_ids::AES192,
    Aes256 = symmetric_ids::AES256,
}

impl SymmetricAlgorithm {
    pub fn from_id(id: u8) -> Result<Self, PgpError> {
        Self::try_from_primitive(id).map_err(|_| {
            PgpError::UnsupportedAlgorithm(format!(
                "symmetric cipher {}",
                enum_name_or_hex::<SymmetricAlgorithm>(id)
            ))
        })
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn key_len(self) -> usize {
        match self {
            SymmetricAlgorithm::Aes128 => 16,
            SymmetricAlgorithm::Aes192 => 24,
            SymmetricAlgorithm::Aes256 => 32,
        }
    }
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum HashAlgorithm {
    Sha256 = hash_ids::SHA256,
    Sha384 = hash_ids::SHA384,
    Sha512 = hash_ids::SHA512,
}

impl HashAlgorithm {
    pub fn from_id(id: u8) -> Result<Self, PgpError> {
        Self::try_from_primitive(id).map_err(|_| {
            PgpError::UnsupportedAlgorithm(format!("hash {}", enum_name_or_hex::<HashAlgorithm>(id)))
        })
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn digest_len(self) -> usize {
        match self {
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }

    /// Salt size required for v6 signatures made with this hash.
    pub fn salt_len(self) -> usize {
        match self {
            HashAlgorithm::Sha256 => 16,
            HashAlgorithm::Sha384 => 24,
            HashAlgorithm::Sha512 => 32,
        }
    }
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum AeadAlgorithm {
    Eax = aead_ids::EAX,
    Ocb = aead_ids::OCB,
    Gcm = aead_ids::GCM,
}

impl AeadAlgorithm {
    pub fn from_id(id: u8) -> Result<Self, PgpError> {
        Self::try_from_primitive(id).map_err(|_| {
            PgpError::UnsupportedAlgorithm(format!("AEAD mode {}", enum_name_or_hex::<AeadAlgorithm>(id)))
        })
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn nonce_len(self) -> usize {
        match self {
            AeadAlgorithm::Eax => 16,
            AeadAlgorithm::Ocb => 15,
            AeadAlgorithm::Gcm => 12,
        }
    }

    /// Derived IV size: the nonce minus the 8-byte chunk index.
    pub fn iv_len(self) -> usize {
        self.nonce_len() - 8
    }
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum PublicKeyAlgorithm {
    X25519 = pubkey_ids::X25519,
    Ed25519 = pubkey_ids::ED25519,
}

impl PublicKeyAlgorithm {
    pub fn from_id(id: u8) -> Result<Self, PgpError> {
        Self::try_from_primitive(id).map_err(|_| {
            PgpError::UnsupportedAlgorithm(format!(
                "public key algorithm {}",
                enum_name_or_hex::<PublicKeyAlgorithm>(id)
            ))
        })
    }

    pub fn id(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_ids_are_unsupported() {
        assert!(matches!(SymmetricAlgorithm::from_id(3), Err(PgpError::UnsupportedAlgorithm(_))));
        assert!(matches!(HashAlgorithm::from_id(2), Err(PgpError::UnsupportedAlgorithm(_))));
        assert!(matches!(AeadAlgorithm::from_id(4), Err(PgpError::UnsupportedAlgorithm(_))));
        assert_eq!(AeadAlgorithm::from_id(2).unwrap(), AeadAlgorithm::Ocb);
    }

    #[test]
    fn salt_sizes_follow_hash() {
        assert_eq!(HashAlgorithm::Sha256.salt_len(), 16);
        assert_eq!(HashAlgorithm::Sha384.salt_len(), 24);
        assert_eq!(HashAlgorithm::Sha512.salt_len(), 32);
    }
}
