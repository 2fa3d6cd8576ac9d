//! signature/verify.rs
//! Streaming v6 signature verification against a one-pass signature.

use ed25519_dalek::{Signature, VerifyingKey};
use log::debug;

use crate::crypto::digest::DigestState;
use crate::crypto::types::PublicKeyAlgorithm;
use crate::keys::fingerprint::Fingerprint;
use crate::keys::material::PublicKeyMaterial;
use crate::packet::one_pass::OnePassSignature;
use crate::packet::signature::SignaturePacket;
use crate::signature::VerifiedSignature;
use crate::types::PgpError;

fn failed(msg: impl Into<String>) -> PgpError {
    PgpError::SignatureVerificationFailed(msg.into())
}

pub struct SignatureVerifier {
    ops: OnePassSignature,
    key: VerifyingKey,
    signer: Fingerprint,
    state: DigestState,
}

impl SignatureVerifier {
    /// Start verifying a one-pass signed document with the expected signer's key.
    pub fn new(ops: OnePassSignature, signer: &PublicKeyMaterial) -> Result<Self, PgpError> {
        if ops.pubkey != PublicKeyAlgorithm::Ed25519 {
            return Err(PgpError::UnsupportedAlgorithm(format!("one-pass signature with {:?}", ops.pubkey)));
        }
        let fingerprint = signer.signing_fingerprint();
        if ops.issuer != fingerprint {
            return Err(failed(format!(
                "message signed by {}, expected {} ({})",
                ops.issuer,
                fingerprint,
                signer.user_id()
            )));
        }
        let mut state = DigestState::new(ops.hash);
        state.update(&ops.salt);
        Ok(Self { ops, key: signer.verifying_key()?, signer: fingerprint, state })
    }

    pub fn update(&mut self, data: &[u8]) {
        self.state.update(data);
    }

    pub fn verify(self, sig: &SignaturePacket) -> Result<VerifiedSignature, PgpError> {
        if sig.sig_type != self.ops.sig_type {
            return Err(failed("signature type differs from one-pass signature"));
        }
        if sig.hash != self.ops.hash {
            return Err(failed("hash algorithm differs from one-pass signature"));
        }
        if sig.salt != self.ops.salt {
            return Err(failed("salt differs from one-pass signature"));
        }
        if let Some(issuer) = sig.issuer_fingerprint() {
            if issuer != self.signer {
                return Err(failed(format!("issuer {} does not match signer {}", issuer, self.signer)));
            }
        }
        if let Some(sp) = sig.hashed.iter().find(|sp| sp.critical && !sp.is_known()) {
            return Err(failed(format!("unknown critical subpacket {}", sp.kind)));
        }

        let mut state = self.state;
        let prefix = sig.hashed_prefix();
        state.update(&prefix);
        state.update(&SignaturePacket::hash_trailer(prefix.len()));
        let digest = state.finalize();

        if digest[..2] != sig.left16 {
            return Err(failed("digest prefix mismatch"));
        }
        let signature = Signature::from_bytes(&sig.signature);
        self.key
            .verify_strict(&digest, &signature)
            .map_err(|_| failed("Ed25519 signature does not verify"))?;

        debug!("[VERIFY] good signature from {}", self.signer);
        Ok(VerifiedSignature {
            signer: self.signer,
            user_id: sig.signer_user_id(),
            created: sig.creation_time(),
        })
    }
}
