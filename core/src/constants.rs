//! constants.rs
//! Wire-level constants for the OpenPGP message profile produced and consumed here.

/// Working buffer used when pumping plaintext through the encode chain.
pub const DEFAULT_BUFFER_SIZE: usize = 16 * 1024; // 16 KiB
/// Upper bound accepted for a configured working buffer.
pub const MAX_BUFFER_SIZE: usize = 16 * 1024 * 1024;

/// Partial body parts are always 2^13 bytes when streaming.
pub const PARTIAL_BODY_EXP: u8 = 13;
pub const PARTIAL_BODY_LEN: usize = 1 << PARTIAL_BODY_EXP; // 8 KiB

/// Packets read whole into memory (PKESK, OPS, signature) may not exceed this.
pub const MAX_CONTROL_PACKET_LEN: u64 = 64 * 1024;

/// AEAD chunk size octet: chunk = 2^(c + 6). 10 -> 64 KiB.
pub const DEFAULT_CHUNK_SIZE_OCTET: u8 = 10;
pub const MAX_CHUNK_SIZE_OCTET: u8 = 16;

pub const SEIPD_VERSION_2: u8 = 2;
pub const SEIPD_SALT_LEN: usize = 32;
pub const AEAD_TAG_LEN: usize = 16;

pub const PKESK_VERSION_6: u8 = 6;
pub const OPS_VERSION_6: u8 = 6;
pub const SIGNATURE_VERSION_6: u8 = 6;
pub const KEY_VERSION_6: u8 = 6;

pub const FINGERPRINT_LEN: usize = 32;
pub const CURVE25519_KEY_LEN: usize = 32;
pub const ED25519_SIGNATURE_LEN: usize = 64;

/// HKDF info for the X25519 key encryption key.
pub const X25519_KDF_INFO: &[u8] = b"OpenPGP X25519";
/// AES key wrap KEK size for X25519 recipients.
pub const X25519_KEK_LEN: usize = 16;

/// Literal file name meaning "no file, console data".
pub const CONSOLE_FILENAME: &str = "_CONSOLE";
pub const MAX_FILENAME_LEN: usize = 255;

/// Signature type for a signature over binary document data.
pub const SIG_TYPE_BINARY: u8 = 0x00;

/// Symmetric cipher identifiers (RFC 9580 registry).
pub mod symmetric_ids {
    pub const AES128: u8 = 7;
    pub const AES192: u8 = 8;
    pub const AES256: u8 = 9;
}

/// Hash identifiers.
pub mod hash_ids {
    pub const SHA256: u8 = 8;
    pub const SHA384: u8 = 9;
    pub const SHA512: u8 = 10;
}

/// Compression identifiers.
pub mod compression_ids {
    pub const UNCOMPRESSED: u8 = 0;
    pub const ZIP: u8 = 1;
    pub const ZLIB: u8 = 2;
    pub const BZIP2: u8 = 3;
}

/// Public key algorithm identifiers.
pub mod pubkey_ids {
    pub const X25519: u8 = 25;
    pub const ED25519: u8 = 27;
}

/// AEAD mode identifiers.
pub mod aead_ids {
    pub const EAX: u8 = 1;
    pub const OCB: u8 = 2;
    pub const GCM: u8 = 3;
}

/// Signature subpacket types.
pub mod subpacket_ids {
    pub const CREATION_TIME: u8 = 2;
    pub const SIGNER_USER_ID: u8 = 28;
    pub const ISSUER_FINGERPRINT: u8 = 33;
}

/// ASCII armor framing for messages.
pub mod armor {
    pub const BEGIN_MESSAGE: &str = "-----BEGIN PGP MESSAGE-----";
    pub const END_MESSAGE: &str = "-----END PGP MESSAGE-----";
    /// Raw bytes per armored line (64 base64 characters).
    pub const LINE_BYTES: usize = 48;
    pub const CRC24_INIT: u32 = 0x00B7_04CE;
    pub const CRC24_POLY: u32 = 0x0186_4CFB;
}

/// Defaults for the format configuration.
pub const DEFAULT_SYMMETRIC: u8 = symmetric_ids::AES256;
pub const DEFAULT_HASH: u8 = hash_ids::SHA256;
pub const DEFAULT_COMPRESSION: u8 = compression_ids::ZIP;
pub const DEFAULT_AEAD: u8 = aead_ids::GCM;
