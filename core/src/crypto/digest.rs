//! crypto/digest.rs
//! Incremental hashing for signatures.

use digest::Digest as _;
use sha2::{Sha256, Sha384, Sha512};

use crate::crypto::types::HashAlgorithm;

/// Internal hashing state.
#[derive(Clone)]
pub enum DigestState {
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
}

impl DigestState {
    pub fn new(alg: HashAlgorithm) -> Self {
        match alg {
            HashAlgorithm::Sha256 => DigestState::Sha256(Sha256::new()),
            HashAlgorithm::Sha384 => DigestState::Sha384(Sha384::new()),
            HashAlgorithm::Sha512 => DigestState::Sha512(Sha512::new()),
        }
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        match self {
            DigestState::Sha256(_) => HashAlgorithm::Sha256,
            DigestState::Sha384(_) => HashAlgorithm::Sha384,
            DigestState::Sha512(_) => HashAlgorithm::Sha512,
        }
    }

    #[inline]
    pub fn update(&mut self, data: &[u8]) {
        match self {
            DigestState::Sha256(h) => h.update(data),
            DigestState::Sha384(h) => h.update(data),
            DigestState::Sha512(h) => h.update(data),
        }
    }

    #[inline]
    pub fn finalize(self) -> Vec<u8> {
        match self {
            DigestState::Sha256(h) => h.finalize().to_vec(),
            DigestState::Sha384(h) => h.finalize().to_vec(),
            DigestState::Sha512(h) => h.finalize().to_vec(),
        }
    }
}

/// One-shot SHA-256, used for v6 fingerprints.
pub fn sha256(parts: &[&[u8]]) -> [u8; 32] {
    let mut h = Sha256::new();
    for p in parts {
        h.update(p);
    }
    h.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lengths_match_algorithm() {
        for alg in [HashAlgorithm::Sha256, HashAlgorithm::Sha384, HashAlgorithm::Sha512] {
            let mut st = DigestState::new(alg);
            st.update(b"abc");
            assert_eq!(st.algorithm(), alg);
            assert_eq!(st.finalize().len(), alg.digest_len());
        }
    }

    #[test]
    fn incremental_equals_oneshot() {
        let mut st = DigestState::new(HashAlgorithm::Sha256);
        st.update(b"ab");
        st.update(b"c");
        assert_eq!(st.finalize(), sha256(&[b"abc"]).to_vec());
    }
}
