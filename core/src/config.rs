//! config.rs
//! Format configuration, per-call overrides and the resolved per-call view.
//!
//! `FormatConfig` is long-lived and can be loaded from JSON.
//! `CallOverrides` carries per-call values; any field left `None` falls back
//! to the configured default. `CallConfig` is the immutable result used by
//! one encode or decode call.

use serde::{Deserialize, Serialize};

use crate::compression::types::CompressionAlgorithm;
use crate::constants::{
    DEFAULT_AEAD, DEFAULT_BUFFER_SIZE, DEFAULT_CHUNK_SIZE_OCTET, DEFAULT_COMPRESSION, DEFAULT_HASH, DEFAULT_SYMMETRIC,
    MAX_BUFFER_SIZE, MAX_CHUNK_SIZE_OCTET,
};
use crate::crypto::types::{AeadAlgorithm, HashAlgorithm, SymmetricAlgorithm};
use crate::keys::resolver::KeySource;
use crate::packet::literal::LiteralMetadata;
use crate::provider;
use crate::types::PgpError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Recipient (encode) or own key (decode) user id.
    pub key_user_id: Option<String>,
    pub key_source: Option<KeySource>,
    /// Passphrase for the private key used when decoding.
    pub password: Option<String>,

    pub signature_key_user_id: Option<String>,
    pub signature_key_source: Option<KeySource>,
    pub signature_password: Option<String>,

    pub armored: bool,
    /// Must stay `true`; unprotected encryption is not produced.
    pub integrity: bool,
    pub symmetric_algorithm: u8,
    pub hash_algorithm: u8,
    pub compression_algorithm: u8,
    /// AEAD mode of the encrypted data packet (1 EAX, 2 OCB, 3 GCM).
    pub aead_algorithm: u8,
    /// AEAD chunk size octet (chunk = 2^(c + 6) bytes).
    pub chunk_size_octet: u8,
    pub buffer_size: usize,
    /// Reject unsigned messages on decode.
    pub require_signature: bool,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            key_user_id: None,
            key_source: None,
            password: None,
            signature_key_user_id: None,
            signature_key_source: None,
            signature_password: None,
            armored: false,
            integrity: true,
            symmetric_algorithm: DEFAULT_SYMMETRIC,
            hash_algorithm: DEFAULT_HASH,
            compression_algorithm: DEFAULT_COMPRESSION,
            aead_algorithm: DEFAULT_AEAD,
            chunk_size_octet: DEFAULT_CHUNK_SIZE_OCTET,
            buffer_size: DEFAULT_BUFFER_SIZE,
            require_signature: false,
        }
    }
}

impl FormatConfig {
    pub fn from_json(text: &str) -> Result<Self, PgpError> {
        let cfg: Self = serde_json::from_str(text).map_err(|e| PgpError::Config(format!("invalid JSON: {}", e)))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_json(&self) -> Result<String, PgpError> {
        serde_json::to_string_pretty(self).map_err(|e| PgpError::Config(e.to_string()))
    }

    /// Structural checks that do not depend on algorithm support.
    pub fn validate(&self) -> Result<(), PgpError> {
        if self.buffer_size == 0 || self.buffer_size > MAX_BUFFER_SIZE {
            return Err(PgpError::Config(format!(
                "buffer_size must be in 1..={}, got {}",
                MAX_BUFFER_SIZE, self.buffer_size
            )));
        }
        if self.chunk_size_octet > MAX_CHUNK_SIZE_OCTET {
            return Err(PgpError::Config(format!(
                "chunk_size_octet must be at most {}, got {}",
                MAX_CHUNK_SIZE_OCTET, self.chunk_size_octet
            )));
        }
        Ok(())
    }

    /// Merge call overrides over the configured defaults and resolve algorithm ids.
    pub fn resolve(&self, overrides: &CallOverrides) -> Result<CallConfig, PgpError> {
        self.validate()?;
        // v6 encryption is SEIPDv2 only; the profile has no unprotected data packet.
        if !self.integrity {
            return Err(PgpError::UnsupportedAlgorithm(
                "integrity = false: v6 messages have no non-integrity-protected data packet".into(),
            ));
        }
        let provider = provider::install();

        let pick = |o: &Option<String>, d: &Option<String>| o.clone().or_else(|| d.clone());

        let signer_source = overrides.signature_key_source.clone().or_else(|| self.signature_key_source.clone());
        let verifier = pick(&overrides.signature_key_user_id, &self.signature_key_user_id)
            .map(|user_id| (signer_source.clone().unwrap_or_default(), user_id));

        let (signer, signing_skipped) = match (
            pick(&overrides.signature_key_user_id, &self.signature_key_user_id),
            pick(&overrides.signature_password, &self.signature_password),
        ) {
            (Some(user_id), Some(passphrase)) => {
                let source = signer_source.unwrap_or_default();
                (Some(SignerCredentials { source, user_id, passphrase }), false)
            }
            (None, None) => (None, signer_source.is_some()),
            _ => (None, true),
        };

        if let Some(name) = &overrides.file_name {
            LiteralMetadata::validate_file_name(name)?;
        }

        Ok(CallConfig {
            key_user_id: pick(&overrides.key_user_id, &self.key_user_id),
            key_source: overrides
                .key_source
                .clone()
                .or_else(|| self.key_source.clone())
                .unwrap_or_default(),
            password: pick(&overrides.password, &self.password),
            signer,
            signing_skipped,
            verifier,
            armored: overrides.armored.unwrap_or(self.armored),
            algorithms: AlgorithmSelectors {
                symmetric: provider.symmetric(overrides.symmetric_algorithm.unwrap_or(self.symmetric_algorithm))?,
                hash: provider.hash(overrides.hash_algorithm.unwrap_or(self.hash_algorithm))?,
                compression: provider
                    .compression(overrides.compression_algorithm.unwrap_or(self.compression_algorithm))?,
                aead: provider.aead(overrides.aead_algorithm.unwrap_or(self.aead_algorithm))?,
            },
            chunk_size_octet: self.chunk_size_octet,
            file_name: overrides.file_name.clone(),
            buffer_size: self.buffer_size,
            require_signature: overrides.require_signature.unwrap_or(self.require_signature),
        })
    }
}

/// Per-call values taking precedence over `FormatConfig`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallOverrides {
    pub key_user_id: Option<String>,
    pub key_source: Option<KeySource>,
    pub password: Option<String>,
    pub signature_key_user_id: Option<String>,
    pub signature_key_source: Option<KeySource>,
    pub signature_password: Option<String>,
    pub symmetric_algorithm: Option<u8>,
    pub hash_algorithm: Option<u8>,
    pub compression_algorithm: Option<u8>,
    pub aead_algorithm: Option<u8>,
    pub armored: Option<bool>,
    /// Literal file name; `_CONSOLE` when absent.
    pub file_name: Option<String>,
    pub require_signature: Option<bool>,
}

impl CallOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_user_id(mut self, v: &str) -> Self {
        self.key_user_id = Some(v.to_string());
        self
    }

    pub fn password(mut self, v: &str) -> Self {
        self.password = Some(v.to_string());
        self
    }

    pub fn signature_key_user_id(mut self, v: &str) -> Self {
        self.signature_key_user_id = Some(v.to_string());
        self
    }

    pub fn signature_key_source(mut self, v: KeySource) -> Self {
        self.signature_key_source = Some(v);
        self
    }

    pub fn signature_password(mut self, v: &str) -> Self {
        self.signature_password = Some(v.to_string());
        self
    }

    pub fn symmetric_algorithm(mut self, id: u8) -> Self {
        self.symmetric_algorithm = Some(id);
        self
    }

    pub fn hash_algorithm(mut self, id: u8) -> Self {
        self.hash_algorithm = Some(id);
        self
    }

    pub fn compression_algorithm(mut self, id: u8) -> Self {
        self.compression_algorithm = Some(id);
        self
    }

    pub fn aead_algorithm(mut self, id: u8) -> Self {
        self.aead_algorithm = Some(id);
        self
    }

    pub fn armored(mut self, v: bool) -> Self {
        self.armored = Some(v);
        self
    }

    pub fn file_name(mut self, v: &str) -> Self {
        self.file_name = Some(v.to_string());
        self
    }

    pub fn require_signature(mut self, v: bool) -> Self {
        self.require_signature = Some(v);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlgorithmSelectors {
    pub symmetric: SymmetricAlgorithm,
    pub hash: HashAlgorithm,
    pub compression: CompressionAlgorithm,
    pub aead: AeadAlgorithm,
}

/// Complete signer credentials. Signing only happens when all three are present.
#[derive(Clone, PartialEq, Eq)]
pub struct SignerCredentials {
    pub source: KeySource,
    pub user_id: String,
    pub passphrase: String,
}

impl std::fmt::Debug for SignerCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignerCredentials")
            .field("source", &self.source)
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

/// Immutable per-call configuration.
#[derive(Debug, Clone)]
pub struct CallConfig {
    pub key_user_id: Option<String>,
    pub key_source: KeySource,
    pub password: Option<String>,
    pub signer: Option<SignerCredentials>,
    /// Some but not all signer credentials were given.
    pub signing_skipped: bool,
    /// Where to look up the expected signer when a signed message is decoded.
    pub verifier: Option<(KeySource, String)>,
    pub armored: bool,
    pub algorithms: AlgorithmSelectors,
    pub chunk_size_octet: u8,
    pub file_name: Option<String>,
    pub buffer_size: usize,
    pub require_signature: bool,
}

impl CallConfig {
    pub fn literal_metadata(&self) -> LiteralMetadata {
        match &self.file_name {
            Some(name) => LiteralMetadata::named(name),
            None => LiteralMetadata::console(),
        }
    }
}
