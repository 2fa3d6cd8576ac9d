//! crypto/ecdh.rs
//! X25519 session key wrapping for public-key encrypted session key packets.
//!
//! shared = X25519(ephemeral_secret, recipient_public)
//! KEK    = HKDF-SHA256(ephemeral_public || recipient_public || shared, "OpenPGP X25519")
//! wrapped = AES-128 key wrap (RFC 3394) of the raw session key.

use aes_kw::KekAes128;
use rand::rngs::OsRng;
use rand::RngCore;
use x25519_dalek::{x25519, X25519_BASEPOINT_BYTES};
use zeroize::Zeroizing;

use crate::crypto::kdf::derive_x25519_kek;
use crate::types::PgpError;

/// Output of wrapping a session key for one recipient.
#[derive(Debug, Clone)]
pub struct WrappedSessionKey {
    pub ephemeral: [u8; 32],
    pub wrapped: Vec<u8>,
}

pub fn x25519_public_from_secret(secret: &[u8; 32]) -> [u8; 32] {
    x25519(*secret, X25519_BASEPOINT_BYTES)
}

fn shared_secret(secret: &[u8; 32], public: &[u8; 32]) -> Result<Zeroizing<[u8; 32]>, PgpError> {
    let shared = Zeroizing::new(x25519(*secret, *public));
    // Low-order points give an all-zero shared secret.
    if shared.iter().all(|&b| b == 0) {
        return Err(PgpError::DecryptionFailed("degenerate X25519 shared secret".into()));
    }
    Ok(shared)
}

pub fn wrap_session_key(recipient: &[u8; 32], session_key: &[u8]) -> Result<WrappedSessionKey, PgpError> {
    let mut eph_secret = Zeroizing::new([0u8; 32]);
    OsRng.fill_bytes(&mut eph_secret[..]);
    let ephemeral = x25519_public_from_secret(&eph_secret);

    let shared = shared_secret(&eph_secret, recipient)?;
    let kek = derive_x25519_kek(&ephemeral, recipient, &shared)?;

    let mut wrapped = vec![0u8; session_key.len() + 8];
    KekAes128::from(*kek)
        .wrap(session_key, &mut wrapped)
        .map_err(|e| PgpError::DecryptionFailed(format!("session key wrap failed: {}", e)))?;

    Ok(WrappedSessionKey { ephemeral, wrapped })
}

pub fn unwrap_session_key(
    secret: &[u8; 32],
    recipient_public: &[u8; 32],
    ephemeral: &[u8; 32],
    wrapped: &[u8],
) -> Result<Zeroizing<Vec<u8>>, PgpError> {
    if wrapped.len() < 24 || wrapped.len() % 8 != 0 {
        return Err(PgpError::DecryptionFailed(format!(
            "wrapped session key has invalid length {}",
            wrapped.len()
        )));
    }
    let shared = shared_secret(secret, ephemeral)?;
    let kek = derive_x25519_kek(ephemeral, recipient_public, &shared)?;

    let mut session_key = Zeroizing::new(vec![0u8; wrapped.len() - 8]);
    KekAes128::from(*kek)
        .unwrap(wrapped, &mut session_key)
        .map_err(|_| PgpError::DecryptionFailed("session key unwrap failed".into()))?;
    Ok(session_key)
}
