//! signature/sign.rs
//! Streaming v6 signature creation (Ed25519 over the document digest).

use ed25519_dalek::Signer;
use log::debug;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::constants::{ED25519_SIGNATURE_LEN, SIG_TYPE_BINARY};
use crate::crypto::digest::DigestState;
use crate::crypto::types::{HashAlgorithm, PublicKeyAlgorithm};
use crate::keys::material::UnlockedKey;
use crate::packet::one_pass::OnePassSignature;
use crate::packet::signature::{SignaturePacket, Subpacket};
use crate::types::PgpError;
use crate::utils::unix_now;

/// Signing state for one document.
///
/// The salt is hashed first, then every data byte fed to `update`, then the
/// hashed prefix of the signature packet and its trailer.
pub struct SignatureContext<'k> {
    key: &'k UnlockedKey,
    user_id: String,
    hash: HashAlgorithm,
    salt: Vec<u8>,
    created: u32,
    state: DigestState,
    data_len: u64,
}

impl<'k> SignatureContext<'k> {
    pub fn new(key: &'k UnlockedKey, user_id: &str, hash: HashAlgorithm) -> Result<Self, PgpError> {
        let mut salt = vec![0u8; hash.salt_len()];
        OsRng.fill_bytes(&mut salt);
        let mut state = DigestState::new(hash);
        state.update(&salt);
        debug!(
            "[SIGN] context for {} ({}), hash {:?}",
            user_id,
            key.public().signing_fingerprint(),
            hash
        );
        Ok(Self { key, user_id: user_id.to_string(), hash, salt, created: unix_now(), state, data_len: 0 })
    }

    /// One-pass signature packet announcing this signature.
    pub fn one_pass(&self) -> OnePassSignature {
        OnePassSignature {
            sig_type: SIG_TYPE_BINARY,
            hash: self.hash,
            pubkey: PublicKeyAlgorithm::Ed25519,
            salt: self.salt.clone(),
            issuer: self.key.public().signing_fingerprint(),
            last: true,
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        self.state.update(data);
        self.data_len += data.len() as u64;
    }

    pub fn data_len(&self) -> u64 {
        self.data_len
    }

    pub fn finalize(self) -> Result<SignaturePacket, PgpError> {
        let mut packet = SignaturePacket {
            sig_type: SIG_TYPE_BINARY,
            pubkey: PublicKeyAlgorithm::Ed25519,
            hash: self.hash,
            hashed: vec![
                Subpacket::creation_time(self.created),
                Subpacket::issuer_fingerprint(&self.key.public().signing_fingerprint()),
                Subpacket::signer_user_id(&self.user_id),
            ],
            unhashed: Vec::new(),
            left16: [0; 2],
            salt: self.salt,
            signature: [0; ED25519_SIGNATURE_LEN],
        };

        let mut state = self.state;
        let prefix = packet.hashed_prefix();
        state.update(&prefix);
        state.update(&SignaturePacket::hash_trailer(prefix.len()));
        let digest = state.finalize();

        let sig = self.key.signing_key().try_sign(&digest)
            .map_err(|e| PgpError::SignatureVerificationFailed(format!("signing failed: {}", e)))?;
        packet.left16 = [digest[0], digest[1]];
        packet.signature = sig.to_bytes();
        debug!("[SIGN] signed {} bytes", self.data_len);
        Ok(packet)
    }
}
