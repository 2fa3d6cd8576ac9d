//! types.rs
//! Unified error type for encode/decode.
//!
//! Lower layers that sit behind `std::io::Read`/`Write` carry a `PgpError`
//! inside an `io::Error`; `From<io::Error>` unpacks it again at the pipeline
//! boundary so callers always see the original kind.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PgpError {
    /// No usable key for the configured user id / source, or the recipient
    /// in the message does not match the resolved key.
    #[error("missing key: {0}")]
    MissingKey(String),

    /// Private key extraction failed for a signer.
    #[error("bad passphrase: {0}")]
    BadPassphrase(String),

    /// Structure of the message is not what the reader expects.
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// Session key recovery or AEAD authentication failed.
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("signature verification failed: {0}")]
    SignatureVerificationFailed(String),

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Invalid configuration or call overrides.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[source] io::Error),
}

impl PgpError {
    /// Wrap into an `io::Error` so the error can travel through `Read`/`Write` stages.
    pub fn into_io(self) -> io::Error {
        match self {
            PgpError::Io(e) => e,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }

    /// Short stable name of the variant, used in logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            PgpError::MissingKey(_) => "missing_key",
            PgpError::BadPassphrase(_) => "bad_passphrase",
            PgpError::MalformedMessage(_) => "malformed_message",
            PgpError::DecryptionFailed(_) => "decryption_failed",
            PgpError::SignatureVerificationFailed(_) => "signature_verification_failed",
            PgpError::UnsupportedAlgorithm(_) => "unsupported_algorithm",
            PgpError::Config(_) => "config",
            PgpError::Io(_) => "io",
        }
    }
}

impl From<io::Error> for PgpError {
    fn from(e: io::Error) -> Self {
        let kind = e.kind();
        if e.get_ref().map_or(false, |inner| inner.is::<PgpError>()) {
            if let Some(inner) = e.into_inner() {
                if let Ok(pgp) = inner.downcast::<PgpError>() {
                    return *pgp;
                }
            }
            return PgpError::Io(io::Error::from(kind));
        }
        // Short reads only happen while parsing packet structure.
        if kind == io::ErrorKind::UnexpectedEof {
            return PgpError::MalformedMessage(format!("unexpected end of data: {}", e));
        }
        PgpError::Io(e)
    }
}

/// Shorthand used by parsers: an `io::Error` carrying `MalformedMessage`.
pub(crate) fn malformed_io(msg: impl Into<String>) -> io::Error {
    PgpError::MalformedMessage(msg.into()).into_io()
}
