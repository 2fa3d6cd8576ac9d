//! crypto/aead.rs
//! AEAD interface for the encrypted data packet and locked secrets.
//!
//! - Key size is chosen by the symmetric algorithm (128/192/256).
//! - Nonce size is chosen by the mode: EAX 16, OCB 15, GCM 12 bytes. Chunk
//!   nonces are the derived IV followed by the 8-byte chunk index.
//! - Tag verification fails closed; no partial plaintext is ever returned.

use aes_gcm::aead::consts::{U12, U15};
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::aes::{Aes128, Aes192, Aes256};
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm};
use eax::Eax;
use ocb3::Ocb3;

use crate::constants::AEAD_TAG_LEN;
use crate::crypto::types::{AeadAlgorithm, SymmetricAlgorithm};
use crate::types::PgpError;

pub type Aes192Gcm = AesGcm<Aes192, U12>;
pub type Aes128Ocb = Ocb3<Aes128, U15>;
pub type Aes192Ocb = Ocb3<Aes192, U15>;
pub type Aes256Ocb = Ocb3<Aes256, U15>;

/// AEAD cipher selected by the message's mode and symmetric algorithm.
pub enum AeadImpl {
    Aes128Gcm(Aes128Gcm),
    Aes192Gcm(Aes192Gcm),
    Aes256Gcm(Aes256Gcm),
    Aes128Ocb(Aes128Ocb),
    Aes192Ocb(Aes192Ocb),
    Aes256Ocb(Aes256Ocb),
    Aes128Eax(Eax<Aes128>),
    Aes192Eax(Eax<Aes192>),
    Aes256Eax(Eax<Aes256>),
}

macro_rules! with_cipher {
    ($aead:expr, $c:ident => $body:expr) => {
        match $aead {
            AeadImpl::Aes128Gcm($c) => $body,
            AeadImpl::Aes192Gcm($c) => $body,
            AeadImpl::Aes256Gcm($c) => $body,
            AeadImpl::Aes128Ocb($c) => $body,
            AeadImpl::Aes192Ocb($c) => $body,
            AeadImpl::Aes256Ocb($c) => $body,
            AeadImpl::Aes128Eax($c) => $body,
            AeadImpl::Aes192Eax($c) => $body,
            AeadImpl::Aes256Eax($c) => $body,
        }
    };
}

impl AeadImpl {
    /// AES-GCM with the given key size.
    pub fn new(alg: SymmetricAlgorithm, key: &[u8]) -> Result<Self, PgpError> {
        Self::for_mode(AeadAlgorithm::Gcm, alg, key)
    }

    pub fn for_mode(mode: AeadAlgorithm, alg: SymmetricAlgorithm, key: &[u8]) -> Result<Self, PgpError> {
        let bad_len = || {
            PgpError::DecryptionFailed(format!(
                "invalid key length for {:?}: expected {}, got {}",
                alg,
                alg.key_len(),
                key.len()
            ))
        };
        if key.len() != alg.key_len() {
            return Err(bad_len());
        }
        let cipher = match (mode, alg) {
            (AeadAlgorithm::Gcm, SymmetricAlgorithm::Aes128) => Aes128Gcm::new_from_slice(key).map(Self::Aes128Gcm),
            (AeadAlgorithm::Gcm, SymmetricAlgorithm::Aes192) => Aes192Gcm::new_from_slice(key).map(Self::Aes192Gcm),
            (AeadAlgorithm::Gcm, SymmetricAlgorithm::Aes256) => Aes256Gcm::new_from_slice(key).map(Self::Aes256Gcm),
            (AeadAlgorithm::Ocb, SymmetricAlgorithm::Aes128) => Aes128Ocb::new_from_slice(key).map(Self::Aes128Ocb),
            (AeadAlgorithm::Ocb, SymmetricAlgorithm::Aes192) => Aes192Ocb::new_from_slice(key).map(Self::Aes192Ocb),
            (AeadAlgorithm::Ocb, SymmetricAlgorithm::Aes256) => Aes256Ocb::new_from_slice(key).map(Self::Aes256Ocb),
            (AeadAlgorithm::Eax, SymmetricAlgorithm::Aes128) => Eax::<Aes128>::new_from_slice(key).map(Self::Aes128Eax),
            (AeadAlgorithm::Eax, SymmetricAlgorithm::Aes192) => Eax::<Aes192>::new_from_slice(key).map(Self::Aes192Eax),
            (AeadAlgorithm::Eax, SymmetricAlgorithm::Aes256) => Eax::<Aes256>::new_from_slice(key).map(Self::Aes256Eax),
        };
        cipher.map_err(|_| bad_len())
    }

    pub fn mode(&self) -> AeadAlgorithm {
        match self {
            AeadImpl::Aes128Gcm(_) | AeadImpl::Aes192Gcm(_) | AeadImpl::Aes256Gcm(_) => AeadAlgorithm::Gcm,
            AeadImpl::Aes128Ocb(_) | AeadImpl::Aes192Ocb(_) | AeadImpl::Aes256Ocb(_) => AeadAlgorithm::Ocb,
            AeadImpl::Aes128Eax(_) | AeadImpl::Aes192Eax(_) | AeadImpl::Aes256Eax(_) => AeadAlgorithm::Eax,
        }
    }

    fn check_nonce(&self, nonce: &[u8]) -> Result<(), PgpError> {
        let want = self.mode().nonce_len();
        if nonce.len() != want {
            return Err(PgpError::DecryptionFailed(format!(
                "{:?} nonce must be {} bytes, got {}",
                self.mode(),
                want,
                nonce.len()
            )));
        }
        Ok(())
    }

    /// Seal plaintext. Empty plaintext is valid (final authentication tag).
    pub fn seal(&self, nonce: &[u8], aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, PgpError> {
        self.check_nonce(nonce)?;
        let payload = Payload { msg: plaintext, aad };
        let out = with_cipher!(self, c => c.encrypt(GenericArray::from_slice(nonce), payload));
        out.map_err(|_| PgpError::DecryptionFailed(format!("{:?} seal failed", self.mode())))
    }

    /// Open ciphertext||tag.
    pub fn open(&self, nonce: &[u8], aad: &[u8], ciphertext_and_tag: &[u8]) -> Result<Vec<u8>, PgpError> {
        self.check_nonce(nonce)?;
        if ciphertext_and_tag.len() < AEAD_TAG_LEN {
            return Err(PgpError::DecryptionFailed("ciphertext shorter than tag".into()));
        }
        let payload = Payload { msg: ciphertext_and_tag, aad };
        let out = with_cipher!(self, c => c.decrypt(GenericArray::from_slice(nonce), payload));
        out.map_err(|_| PgpError::DecryptionFailed("authentication tag mismatch".into()))
    }
}

/// Build the chunk nonce: IV || BE64(index).
pub fn chunk_nonce(iv: &[u8], index: u64) -> Vec<u8> {
    let mut nonce = Vec::with_capacity(iv.len() + 8);
    nonce.extend_from_slice(iv);
    nonce.extend_from_slice(&index.to_be_bytes());
    nonce
}
