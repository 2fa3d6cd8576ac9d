//! signature/mod.rs
//! Signature engine: one-pass signing and verification.

pub mod sign;
pub mod verify;

pub use sign::SignatureContext;
pub use verify::SignatureVerifier;

use chrono::{DateTime, Utc};

use crate::keys::fingerprint::Fingerprint;
use crate::utils::timestamp_to_datetime;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedSignature {
    pub signer: Fingerprint,
    /// Signer's user id subpacket, if the signature carries one.
    pub user_id: Option<String>,
    pub created: Option<u32>,
}

impl VerifiedSignature {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created.and_then(timestamp_to_datetime)
    }
}

/// Outcome of signature processing for a decoded message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignatureStatus {
    Unsigned,
    Verified(VerifiedSignature),
}

impl SignatureStatus {
    pub fn is_verified(&self) -> bool {
        matches!(self, SignatureStatus::Verified(_))
    }
}
