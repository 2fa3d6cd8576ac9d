//! keys/fingerprint.rs
//! v6 key fingerprints: SHA-256 over 0x9B || BE32(len) || key packet body.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{CURVE25519_KEY_LEN, FINGERPRINT_LEN, KEY_VERSION_6};
use crate::crypto::digest::sha256;
use crate::crypto::types::PublicKeyAlgorithm;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(pub [u8; FINGERPRINT_LEN]);

impl Fingerprint {
    /// Fingerprint of a v6 key packet holding a 32-byte curve25519 key.
    pub fn of_v6_key(created: u32, alg: PublicKeyAlgorithm, key: &[u8; CURVE25519_KEY_LEN]) -> Self {
        let body = v6_key_body(created, alg, key);
        let len = (body.len() as u32).to_be_bytes();
        Fingerprint(sha256(&[&[0x9B], &len, &body]))
    }

    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }

    /// The leading 8 octets, for display next to short key ids.
    pub fn key_id(&self) -> [u8; 8] {
        let mut id = [0u8; 8];
        id.copy_from_slice(&self.0[..8]);
        id
    }

    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        <[u8; FINGERPRINT_LEN]>::try_from(bytes).ok().map(Fingerprint)
    }
}

/// Public key packet body: version, creation time, algorithm, BE32 material length, material.
pub(crate) fn v6_key_body(created: u32, alg: PublicKeyAlgorithm, key: &[u8; CURVE25519_KEY_LEN]) -> Vec<u8> {
    let mut body = Vec::with_capacity(10 + CURVE25519_KEY_LEN);
    body.push(KEY_VERSION_6);
    body.extend_from_slice(&created.to_be_bytes());
    body.push(alg.id());
    body.extend_from_slice(&(CURVE25519_KEY_LEN as u32).to_be_bytes());
    body.extend_from_slice(key);
    body
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(self.0))
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_depends_on_algorithm_and_time() {
        let key = [5u8; 32];
        let a = Fingerprint::of_v6_key(1, PublicKeyAlgorithm::Ed25519, &key);
        let b = Fingerprint::of_v6_key(1, PublicKeyAlgorithm::X25519, &key);
        let c = Fingerprint::of_v6_key(2, PublicKeyAlgorithm::Ed25519, &key);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.to_string().len(), 64);
    }
}
