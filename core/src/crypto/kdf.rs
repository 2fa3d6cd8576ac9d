//! crypto/kdf.rs
//! HKDF-SHA256 derivations used by the message format.
//!
//! - Message key + IV for the AEAD encrypted data packet.
//! - Key encryption key for X25519 session key wrapping.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::constants::{X25519_KDF_INFO, X25519_KEK_LEN};
use crate::types::PgpError;

/// Key material for one AEAD encrypted data packet.
pub struct MessageKeys {
    pub key: Zeroizing<Vec<u8>>,
    pub iv: Vec<u8>,
}

/// Derive `key_len` bytes of message key followed by `iv_len` bytes of IV.
/// - IKM: session key
/// - salt: the packet's 32-byte salt
/// - info: the packet's header octets
pub fn derive_message_keys(
    session_key: &[u8],
    salt: &[u8],
    info: &[u8],
    key_len: usize,
    iv_len: usize,
) -> Result<MessageKeys, PgpError> {
    let hk = Hkdf::<Sha256>::new(Some(salt), session_key);
    let mut okm = Zeroizing::new(vec![0u8; key_len + iv_len]);
    hk.expand(info, &mut okm)
        .map_err(|_| PgpError::DecryptionFailed("HKDF expand failed (message key)".into()))?;

    Ok(MessageKeys {
        key: Zeroizing::new(okm[..key_len].to_vec()),
        iv: okm[key_len..].to_vec(),
    })
}

/// KEK = HKDF-SHA256(ikm = ephemeral || recipient || shared, no salt, "OpenPGP X25519").
pub fn derive_x25519_kek(
    ephemeral: &[u8; 32],
    recipient: &[u8; 32],
    shared: &[u8; 32],
) -> Result<Zeroizing<[u8; X25519_KEK_LEN]>, PgpError> {
    let mut ikm = Zeroizing::new([0u8; 96]);
    ikm[..32].copy_from_slice(ephemeral);
    ikm[32..64].copy_from_slice(recipient);
    ikm[64..].copy_from_slice(shared);

    let hk = Hkdf::<Sha256>::new(None, &ikm[..]);
    let mut kek = Zeroizing::new([0u8; X25519_KEK_LEN]);
    hk.expand(X25519_KDF_INFO, &mut kek[..])
        .map_err(|_| PgpError::DecryptionFailed("HKDF expand failed (X25519 KEK)".into()))?;
    Ok(kek)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_keys_depend_on_info() {
        let a = derive_message_keys(&[1u8; 32], &[2u8; 32], b"info-a", 32, 4).unwrap();
        let b = derive_message_keys(&[1u8; 32], &[2u8; 32], b"info-b", 32, 4).unwrap();
        assert_eq!(a.key.len(), 32);
        assert_ne!(a.key.as_slice(), b.key.as_slice());
        assert_ne!(a.iv, b.iv);
    }

    #[test]
    fn kek_is_deterministic() {
        let a = derive_x25519_kek(&[1; 32], &[2; 32], &[3; 32]).unwrap();
        let b = derive_x25519_kek(&[1; 32], &[2; 32], &[3; 32]).unwrap();
        assert_eq!(*a, *b);
    }
}
