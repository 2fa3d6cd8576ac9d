//! keys/material.rs
//! Key material: an Ed25519 signing key with an X25519 encryption subkey.

use std::fmt;

use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::constants::CURVE25519_KEY_LEN;
use crate::crypto::ecdh::x25519_public_from_secret;
use crate::crypto::types::PublicKeyAlgorithm;
use crate::keys::fingerprint::Fingerprint;
use crate::keys::protect::{LockParams, LockedSecret};
use crate::types::PgpError;
use crate::utils::unix_now;

type KeyBytes = [u8; CURVE25519_KEY_LEN];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKeyMaterial {
    user_id: String,
    created: u32,
    signing: KeyBytes,
    encryption: KeyBytes,
}

impl PublicKeyMaterial {
    pub fn new(user_id: &str, created: u32, signing: KeyBytes, encryption: KeyBytes) -> Result<Self, PgpError> {
        VerifyingKey::from_bytes(&signing)
            .map_err(|_| PgpError::MissingKey(format!("invalid Ed25519 public key for {}", user_id)))?;
        Ok(Self { user_id: user_id.to_string(), created, signing, encryption })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn created(&self) -> u32 {
        self.created
    }

    pub fn signing_key_bytes(&self) -> &KeyBytes {
        &self.signing
    }

    pub fn encryption_key_bytes(&self) -> &KeyBytes {
        &self.encryption
    }

    pub fn signing_fingerprint(&self) -> Fingerprint {
        Fingerprint::of_v6_key(self.created, PublicKeyAlgorithm::Ed25519, &self.signing)
    }

    pub fn encryption_fingerprint(&self) -> Fingerprint {
        Fingerprint::of_v6_key(self.created, PublicKeyAlgorithm::X25519, &self.encryption)
    }

    pub fn verifying_key(&self) -> Result<VerifyingKey, PgpError> {
        VerifyingKey::from_bytes(&self.signing)
            .map_err(|_| PgpError::MissingKey(format!("invalid Ed25519 public key for {}", self.user_id)))
    }

    /// Keyring lookup rule: the requested id is a substring of the key's user id.
    pub fn matches_user_id(&self, query: &str) -> bool {
        self.user_id.contains(query)
    }
}

/// Public part plus passphrase-locked secrets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyMaterial {
    public: PublicKeyMaterial,
    locked: LockedSecret,
}

impl KeyMaterial {
    pub fn from_secrets(
        user_id: &str,
        created: u32,
        signing_secret: &KeyBytes,
        encryption_secret: &KeyBytes,
        passphrase: &str,
        params: LockParams,
    ) -> Result<Self, PgpError> {
        let signing = SigningKey::from_bytes(signing_secret).verifying_key().to_bytes();
        let encryption = x25519_public_from_secret(encryption_secret);
        let public = PublicKeyMaterial::new(user_id, created, signing, encryption)?;

        let mut secrets = Zeroizing::new([0u8; 2 * CURVE25519_KEY_LEN]);
        secrets[..CURVE25519_KEY_LEN].copy_from_slice(signing_secret);
        secrets[CURVE25519_KEY_LEN..].copy_from_slice(encryption_secret);
        let locked = LockedSecret::seal(&secrets[..], passphrase, public.signing_fingerprint().as_bytes(), params)?;
        Ok(Self { public, locked })
    }

    /// Fresh random key pair, created now.
    pub fn generate(user_id: &str, passphrase: &str, params: LockParams) -> Result<Self, PgpError> {
        let mut signing = Zeroizing::new([0u8; CURVE25519_KEY_LEN]);
        let mut encryption = Zeroizing::new([0u8; CURVE25519_KEY_LEN]);
        OsRng.fill_bytes(&mut signing[..]);
        OsRng.fill_bytes(&mut encryption[..]);
        Self::from_secrets(user_id, unix_now(), &signing, &encryption, passphrase, params)
    }

    pub fn public(&self) -> &PublicKeyMaterial {
        &self.public
    }

    pub(crate) fn from_parts(public: PublicKeyMaterial, locked: LockedSecret) -> Self {
        Self { public, locked }
    }

    pub(crate) fn locked(&self) -> &LockedSecret {
        &self.locked
    }

    pub fn unlock(&self, passphrase: &str) -> Result<UnlockedKey, PgpError> {
        let secrets = self.locked.open(passphrase, self.public.signing_fingerprint().as_bytes())?;
        if secrets.len() != 2 * CURVE25519_KEY_LEN {
            return Err(PgpError::BadPassphrase("secret key blob has wrong size".into()));
        }
        let mut sign = [0u8; CURVE25519_KEY_LEN];
        sign.copy_from_slice(&secrets[..CURVE25519_KEY_LEN]);
        let signing = SigningKey::from_bytes(&sign);
        let mut decryption = Zeroizing::new([0u8; CURVE25519_KEY_LEN]);
        decryption.copy_from_slice(&secrets[CURVE25519_KEY_LEN..]);
        zeroize::Zeroize::zeroize(&mut sign);

        if signing.verifying_key().to_bytes() != self.public.signing {
            return Err(PgpError::BadPassphrase("unlocked secret does not match public key".into()));
        }
        Ok(UnlockedKey { public: self.public.clone(), signing, decryption })
    }
}

/// Secret keys usable for one call. Dropped (and zeroed) at the end of it.
pub struct UnlockedKey {
    public: PublicKeyMaterial,
    signing: SigningKey,
    decryption: Zeroizing<KeyBytes>,
}

impl UnlockedKey {
    pub fn public(&self) -> &PublicKeyMaterial {
        &self.public
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing
    }

    pub(crate) fn decryption_secret(&self) -> &KeyBytes {
        &self.decryption
    }
}

impl fmt::Debug for UnlockedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnlockedKey")
            .field("user_id", &self.public.user_id)
            .field("signing_fingerprint", &self.public.signing_fingerprint())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlock_recovers_matching_secrets() {
        let key = KeyMaterial::from_secrets("Alice <alice@example.org>", 1, &[1; 32], &[2; 32], "pw", LockParams::light()).unwrap();
        let unlocked = key.unlock("pw").unwrap();
        assert_eq!(unlocked.public(), key.public());
        assert_eq!(x25519_public_from_secret(unlocked.decryption_secret()), *key.public().encryption_key_bytes());
        assert!(matches!(key.unlock("wrong"), Err(PgpError::BadPassphrase(_))));
    }

    #[test]
    fn user_id_substring_match() {
        let key = KeyMaterial::from_secrets("Alice <alice@example.org>", 1, &[1; 32], &[2; 32], "pw", LockParams::light()).unwrap();
        assert!(key.public().matches_user_id("alice@example.org"));
        assert!(!key.public().matches_user_id("bob"));
        assert_ne!(key.public().signing_fingerprint(), key.public().encryption_fingerprint());
    }
}
