//! keys/protect.rs
//! Passphrase protection of secret key material.
//!
//! KEK = Argon2id(passphrase, salt 16) -> 32 bytes
//! blob = AES-256-GCM(KEK, nonce 12, secret, aad = signing fingerprint)

use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::crypto::aead::AeadImpl;
use crate::crypto::types::SymmetricAlgorithm;
use crate::types::PgpError;

const LOCK_SALT_LEN: usize = 16;
const LOCK_NONCE_LEN: usize = 12;

/// Argon2id cost parameters.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockParams {
    pub m_cost_kib: u32,
    pub t_cost: u32,
    pub p_cost: u32,
}

impl Default for LockParams {
    fn default() -> Self {
        Self {
            m_cost_kib: Params::DEFAULT_M_COST,
            t_cost: Params::DEFAULT_T_COST,
            p_cost: Params::DEFAULT_P_COST,
        }
    }
}

impl LockParams {
    /// Minimal cost, for tests and throwaway keys only.
    pub fn light() -> Self {
        Self { m_cost_kib: 256, t_cost: 1, p_cost: 1 }
    }

    fn derive(&self, passphrase: &str, salt: &[u8]) -> Result<Zeroizing<[u8; 32]>, PgpError> {
        let params = Params::new(self.m_cost_kib, self.t_cost, self.p_cost, Some(32))
            .map_err(|e| PgpError::Config(format!("invalid Argon2 parameters: {}", e)))?;
        let argon = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let mut kek = Zeroizing::new([0u8; 32]);
        argon
            .hash_password_into(passphrase.as_bytes(), salt, &mut kek[..])
            .map_err(|e| PgpError::BadPassphrase(format!("key derivation failed: {}", e)))?;
        Ok(kek)
    }
}

/// Secret bytes sealed under a passphrase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedSecret {
    params: LockParams,
    salt: [u8; LOCK_SALT_LEN],
    nonce: [u8; LOCK_NONCE_LEN],
    ciphertext: Vec<u8>,
}

impl LockedSecret {
    pub fn seal(secret: &[u8], passphrase: &str, aad: &[u8], params: LockParams) -> Result<Self, PgpError> {
        let mut salt = [0u8; LOCK_SALT_LEN];
        let mut nonce = [0u8; LOCK_NONCE_LEN];
        OsRng.fill_bytes(&mut salt);
        OsRng.fill_bytes(&mut nonce);

        let kek = params.derive(passphrase, &salt)?;
        let ciphertext = AeadImpl::new(SymmetricAlgorithm::Aes256, &kek[..])?.seal(&nonce, aad, secret)?;
        Ok(Self { params, salt, nonce, ciphertext })
    }

    /// Wrong passphrase and corrupted blobs are indistinguishable: both are `BadPassphrase`.
    pub fn open(&self, passphrase: &str, aad: &[u8]) -> Result<Zeroizing<Vec<u8>>, PgpError> {
        let kek = self.params.derive(passphrase, &self.salt)?;
        let aead = AeadImpl::new(SymmetricAlgorithm::Aes256, &kek[..])?;
        aead.open(&self.nonce, aad, &self.ciphertext)
            .map(Zeroizing::new)
            .map_err(|_| PgpError::BadPassphrase("passphrase does not unlock the secret key".into()))
    }

    pub fn params(&self) -> LockParams {
        self.params
    }
}
