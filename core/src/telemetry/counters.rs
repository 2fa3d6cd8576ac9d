//! telemetry/counters.rs
//! Mutable counters used during encode/decode.
//!
//! Summary: Collects packet counts and byte counts at each layer.
//! Converted into immutable TelemetrySnapshot at pipeline end.
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::packet::types::Tag;

/// Deterministic counters collected during stream processing
#[derive(Default, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TelemetryCounters {
    pub packets_session_key: u64,
    pub packets_encrypted: u64,
    pub packets_compressed: u64,
    pub packets_one_pass: u64,
    pub packets_literal: u64,
    pub packets_signature: u64,
    pub packets_skipped: u64,
    pub aead_chunks: u64,
    pub bytes_plaintext: u64,
    pub bytes_compressed: u64,
    pub bytes_ciphertext: u64,
}

impl TelemetryCounters {
    /// Record one packet written or read.
    pub fn add_packet(&mut self, tag: Tag) {
        match tag {
            Tag::PublicKeyEncryptedSessionKey => self.packets_session_key += 1,
            Tag::SymEncryptedIntegrityProtectedData => self.packets_encrypted += 1,
            Tag::CompressedData => self.packets_compressed += 1,
            Tag::OnePassSignature => self.packets_one_pass += 1,
            Tag::LiteralData => self.packets_literal += 1,
            Tag::Signature => self.packets_signature += 1,
            Tag::Marker | Tag::Padding | Tag::SymmetricallyEncryptedData => self.packets_skipped += 1,
        }
    }

    pub fn add_plaintext(&mut self, n: usize) {
        self.bytes_plaintext += n as u64;
    }

    pub fn total_packets(&self) -> u64 {
        self.packets_session_key
            + self.packets_encrypted
            + self.packets_compressed
            + self.packets_one_pass
            + self.packets_literal
            + self.packets_signature
            + self.packets_skipped
    }

    /// Bytes the envelope adds on top of the compressed payload.
    pub fn overhead_bytes(&self) -> u64 {
        self.bytes_ciphertext.saturating_sub(self.bytes_compressed)
    }

    pub fn merge(&mut self, other: &TelemetryCounters) {
        *self += other.clone();
    }
}

impl AddAssign for TelemetryCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.packets_session_key += rhs.packets_session_key;
        self.packets_encrypted   += rhs.packets_encrypted;
        self.packets_compressed  += rhs.packets_compressed;
        self.packets_one_pass    += rhs.packets_one_pass;
        self.packets_literal     += rhs.packets_literal;
        self.packets_signature   += rhs.packets_signature;
        self.packets_skipped     += rhs.packets_skipped;
        self.aead_chunks         += rhs.aead_chunks;

        self.bytes_plaintext     += rhs.bytes_plaintext;
        self.bytes_compressed    += rhs.bytes_compressed;
        self.bytes_ciphertext    += rhs.bytes_ciphertext;
    }
}
