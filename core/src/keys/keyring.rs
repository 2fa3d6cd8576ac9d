//! keys/keyring.rs
//! Keyring file format: JSON with hex-encoded public keys and locked secrets.
//!
//! {
//!   "public": [ { "user_id", "created", "signing", "encryption" } ],
//!   "secret": [ { "public": { ... }, "locked": { ... } } ]
//! }
//!
//! Unreadable or malformed keyrings surface as `MissingKey`: no key can be
//! resolved from that source.

use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::constants::CURVE25519_KEY_LEN;
use crate::keys::material::{KeyMaterial, PublicKeyMaterial};
use crate::keys::protect::LockedSecret;
use crate::types::PgpError;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PublicRecord {
    user_id: String,
    created: u32,
    signing: String,
    encryption: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SecretRecord {
    public: PublicRecord,
    locked: LockedSecret,
}

/// Serialized form of a keyring.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeyringFile {
    #[serde(default)]
    public: Vec<PublicRecord>,
    #[serde(default)]
    secret: Vec<SecretRecord>,
}

fn unreadable(what: impl std::fmt::Display) -> PgpError {
    PgpError::MissingKey(format!("unreadable keyring: {}", what))
}

fn key_from_hex(field: &str, text: &str) -> Result<[u8; CURVE25519_KEY_LEN], PgpError> {
    let bytes = hex::decode(text).map_err(|e| unreadable(format!("{}: {}", field, e)))?;
    bytes
        .try_into()
        .map_err(|_| unreadable(format!("{} must be {} bytes", field, CURVE25519_KEY_LEN)))
}

impl PublicRecord {
    fn from_key(key: &PublicKeyMaterial) -> Self {
        Self {
            user_id: key.user_id().to_string(),
            created: key.created(),
            signing: hex::encode(key.signing_key_bytes()),
            encryption: hex::encode(key.encryption_key_bytes()),
        }
    }

    fn to_key(&self) -> Result<PublicKeyMaterial, PgpError> {
        PublicKeyMaterial::new(
            &self.user_id,
            self.created,
            key_from_hex("signing", &self.signing)?,
            key_from_hex("encryption", &self.encryption)?,
        )
    }
}

impl KeyringFile {
    pub fn new(secret: &[KeyMaterial], public: &[PublicKeyMaterial]) -> Self {
        Self {
            public: public.iter().map(PublicRecord::from_key).collect(),
            secret: secret
                .iter()
                .map(|k| SecretRecord { public: PublicRecord::from_key(k.public()), locked: k.locked().clone() })
                .collect(),
        }
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, PgpError> {
        serde_json::from_slice(bytes).map_err(unreadable)
    }

    pub fn read(path: &Path) -> Result<Self, PgpError> {
        debug!("[KEYS] reading keyring {}", path.display());
        let bytes = std::fs::read(path).map_err(|e| unreadable(format!("{}: {}", path.display(), e)))?;
        Self::from_slice(&bytes)
    }

    pub fn to_vec(&self) -> Result<Vec<u8>, PgpError> {
        serde_json::to_vec_pretty(self).map_err(|e| PgpError::Config(format!("keyring serialization failed: {}", e)))
    }

    /// Decode every entry; the secret halves stay locked.
    pub fn into_keys(self) -> Result<(Vec<KeyMaterial>, Vec<PublicKeyMaterial>), PgpError> {
        let secret = self
            .secret
            .into_iter()
            .map(|r| Ok(KeyMaterial::from_parts(r.public.to_key()?, r.locked)))
            .collect::<Result<Vec<_>, PgpError>>()?;
        let public = self.public.iter().map(PublicRecord::to_key).collect::<Result<Vec<_>, PgpError>>()?;
        Ok((secret, public))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::protect::LockParams;

    #[test]
    fn keys_survive_serialization() {
        let key = KeyMaterial::from_secrets("K <k@example.org>", 5, &[1; 32], &[2; 32], "pw", LockParams::light()).unwrap();
        let bytes = KeyringFile::new(&[key.clone()], &[key.public().clone()]).to_vec().unwrap();
        let (secret, public) = KeyringFile::from_slice(&bytes).unwrap().into_keys().unwrap();
        assert_eq!(secret, vec![key.clone()]);
        assert_eq!(public, vec![key.public().clone()]);
        assert!(secret[0].unlock("pw").is_ok());
    }

    #[test]
    fn bad_hex_is_missing_key() {
        let text = br#"{"public":[{"user_id":"x","created":0,"signing":"zz","encryption":"00"}]}"#;
        let err = KeyringFile::from_slice(text).unwrap().into_keys().unwrap_err();
        assert!(matches!(err, PgpError::MissingKey(_)));
    }
}
