//! compression/types.rs
//! Compression algorithm identifiers carried in the compressed data packet.

use num_enum::TryFromPrimitive;

use crate::constants::compression_ids;
use crate::types::PgpError;
use crate::utils::enum_name_or_hex;

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum CompressionAlgorithm {
    Uncompressed = compression_ids::UNCOMPRESSED,
    /// Raw deflate (RFC 1951).
    Zip = compression_ids::ZIP,
    /// Deflate with zlib framing (RFC 1950).
    Zlib = compression_ids::ZLIB,
    Bzip2 = compression_ids::BZIP2,
}

impl CompressionAlgorithm {
    /// Resolve an id, rejecting anything without a codec here.
    pub fn from_id(id: u8) -> Result<Self, PgpError> {
        match Self::try_from_primitive(id) {
            Ok(CompressionAlgorithm::Bzip2) | Err(_) => Err(PgpError::UnsupportedAlgorithm(format!(
                "compression {}",
                enum_name_or_hex::<CompressionAlgorithm>(id)
            ))),
            Ok(alg) => Ok(alg),
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }
}
