//! provider.rs
//! Process-wide algorithm provider.
//!
//! Installed at most once; every later call returns the same instance.
//! Algorithm selectors are resolved through it so that ids the provider
//! does not carry fail as `UnsupportedAlgorithm` before any output is written.

use std::sync::OnceLock;

use log::info;

use crate::compression::types::CompressionAlgorithm;
use crate::crypto::types::{AeadAlgorithm, HashAlgorithm, SymmetricAlgorithm};
use crate::types::PgpError;

#[derive(Debug)]
pub struct Provider {
    name: &'static str,
    symmetric: Vec<SymmetricAlgorithm>,
    hashes: Vec<HashAlgorithm>,
    compression: Vec<CompressionAlgorithm>,
    aead: Vec<AeadAlgorithm>,
}

static PROVIDER: OnceLock<Provider> = OnceLock::new();

/// Install the provider if absent and return it.
pub fn install() -> &'static Provider {
    PROVIDER.get_or_init(|| {
        let p = Provider::builtin();
        info!(
            "[PROVIDER] installed {}: {} ciphers, {} hashes, {} compression algorithms",
            p.name,
            p.symmetric.len(),
            p.hashes.len(),
            p.compression.len()
        );
        p
    })
}

pub fn is_installed() -> bool {
    PROVIDER.get().is_some()
}

impl Provider {
    fn builtin() -> Self {
        Self {
            name: "rustcrypto",
            symmetric: vec![SymmetricAlgorithm::Aes128, SymmetricAlgorithm::Aes192, SymmetricAlgorithm::Aes256],
            hashes: vec![HashAlgorithm::Sha256, HashAlgorithm::Sha384, HashAlgorithm::Sha512],
            compression: vec![
                CompressionAlgorithm::Uncompressed,
                CompressionAlgorithm::Zip,
                CompressionAlgorithm::Zlib,
            ],
            aead: vec![AeadAlgorithm::Eax, AeadAlgorithm::Ocb, AeadAlgorithm::Gcm],
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn symmetric(&self, id: u8) -> Result<SymmetricAlgorithm, PgpError> {
        let alg = SymmetricAlgorithm::from_id(id)?;
        if !self.symmetric.contains(&alg) {
            return Err(PgpError::UnsupportedAlgorithm(format!("{:?} not provided by {}", alg, self.name)));
        }
        Ok(alg)
    }

    pub fn hash(&self, id: u8) -> Result<HashAlgorithm, PgpError> {
        let alg = HashAlgorithm::from_id(id)?;
        if !self.hashes.contains(&alg) {
            return Err(PgpError::UnsupportedAlgorithm(format!("{:?} not provided by {}", alg, self.name)));
        }
        Ok(alg)
    }

    pub fn aead(&self, id: u8) -> Result<AeadAlgorithm, PgpError> {
        let alg = AeadAlgorithm::from_id(id)?;
        if !self.aead.contains(&alg) {
            return Err(PgpError::UnsupportedAlgorithm(format!("{:?} not provided by {}", alg, self.name)));
        }
        Ok(alg)
    }

    pub fn compression(&self, id: u8) -> Result<CompressionAlgorithm, PgpError> {
        let alg = CompressionAlgorithm::from_id(id)?;
        if !self.compression.contains(&alg) {
            return Err(PgpError::UnsupportedAlgorithm(format!("{:?} not provided by {}", alg, self.name)));
        }
        Ok(alg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_is_idempotent() {
        let a = install() as *const Provider;
        let b = install() as *const Provider;
        assert_eq!(a, b);
        assert!(is_installed());
    }

    #[test]
    fn resolves_known_ids() {
        let p = install();
        assert_eq!(p.symmetric(9).unwrap(), SymmetricAlgorithm::Aes256);
        assert_eq!(p.hash(10).unwrap(), HashAlgorithm::Sha512);
        assert!(p.symmetric(3).is_err());
        assert!(p.compression(3).is_err());
        assert_eq!(p.aead(2).unwrap(), AeadAlgorithm::Ocb);
        assert!(p.aead(0).is_err());
    }
}
