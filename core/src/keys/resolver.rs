//! keys/resolver.rs
//! Key lookup seam between the message pipelines and wherever keys live.

use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::keys::keyring::KeyringFile;
use crate::keys::material::{KeyMaterial, PublicKeyMaterial};
use crate::types::PgpError;

/// Where a key is to be looked up.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeySource {
    /// The resolver's own keyring.
    #[default]
    Keyring,
    /// A JSON keyring file.
    File(PathBuf),
    /// JSON keyring bytes.
    Blob(Vec<u8>),
}

/// Supplies keys for one call. Implementations own the key storage format.
pub trait KeyResolver {
    /// Public key whose user id matches `user_id`; `Ok(None)` if absent.
    fn public_key(&self, source: &KeySource, user_id: &str) -> Result<Option<PublicKeyMaterial>, PgpError>;

    /// Locked key pair whose user id matches `user_id`; `Ok(None)` if absent.
    fn key_pair(&self, source: &KeySource, user_id: &str) -> Result<Option<KeyMaterial>, PgpError>;
}

/// Keyring held in memory.
///
/// `KeySource::Keyring` looks in this keyring; `File` and `Blob` sources are
/// loaded for the lookup and dropped afterwards.
#[derive(Clone, Debug, Default)]
pub struct MemoryKeyring {
    secret: Vec<KeyMaterial>,
    public: Vec<PublicKeyMaterial>,
}

impl MemoryKeyring {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, key: KeyMaterial) -> Self {
        self.secret.push(key);
        self
    }

    pub fn with_public(mut self, key: PublicKeyMaterial) -> Self {
        self.public.push(key);
        self
    }

    pub fn len(&self) -> usize {
        self.secret.len() + self.public.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, PgpError> {
        let (secret, public) = KeyringFile::from_slice(bytes)?.into_keys()?;
        Ok(Self { secret, public })
    }

    pub fn load(path: &Path) -> Result<Self, PgpError> {
        let (secret, public) = KeyringFile::read(path)?.into_keys()?;
        Ok(Self { secret, public })
    }

    /// Serialize in the format `load` and `from_slice` read.
    pub fn to_vec(&self) -> Result<Vec<u8>, PgpError> {
        KeyringFile::new(&self.secret, &self.public).to_vec()
    }

    fn find_public(&self, user_id: &str) -> Option<PublicKeyMaterial> {
        self.public
            .iter()
            .find(|k| k.matches_user_id(user_id))
            .or_else(|| self.secret.iter().map(KeyMaterial::public).find(|k| k.matches_user_id(user_id)))
            .cloned()
    }

    fn find_pair(&self, user_id: &str) -> Option<KeyMaterial> {
        self.secret.iter().find(|k| k.public().matches_user_id(user_id)).cloned()
    }

    fn lookup<T>(&self, source: &KeySource, find: impl Fn(&Self) -> Option<T>) -> Result<Option<T>, PgpError> {
        match source {
            KeySource::Keyring => Ok(find(self)),
            KeySource::File(path) => Ok(find(&Self::load(path)?)),
            KeySource::Blob(bytes) => {
                debug!("[KEYS] reading {} byte keyring blob", bytes.len());
                Ok(find(&Self::from_slice(bytes)?))
            }
        }
    }
}

impl KeyResolver for MemoryKeyring {
    fn public_key(&self, source: &KeySource, user_id: &str) -> Result<Option<PublicKeyMaterial>, PgpError> {
        self.lookup(source, |ring| ring.find_public(user_id))
    }

    fn key_pair(&self, source: &KeySource, user_id: &str) -> Result<Option<KeyMaterial>, PgpError> {
        self.lookup(source, |ring| ring.find_pair(user_id))
    }
}
