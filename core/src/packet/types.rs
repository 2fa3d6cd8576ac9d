//! packet/types.rs
//! Packet tags and header model.

use num_enum::TryFromPrimitive;

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum Tag {
    PublicKeyEncryptedSessionKey = 1,
    Signature = 2,
    OnePassSignature = 4,
    CompressedData = 8,
    SymmetricallyEncryptedData = 9,
    Marker = 10,
    LiteralData = 11,
    SymEncryptedIntegrityProtectedData = 18,
    Padding = 21,
}

/// Length of the body following a header.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BodyLength {
    /// Whole body length is known.
    Fixed(u64),
    /// First part of a partial body; more length octets follow the part.
    Partial(u64),
    /// Old-format "until end of input".
    Indeterminate,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PacketHeader {
    /// Raw tag value, unknown tags are kept so they can be reported.
    pub tag: u8,
    pub length: BodyLength,
    pub old_format: bool,
}

impl PacketHeader {
    pub fn tag(&self) -> Option<Tag> {
        Tag::try_from_primitive(self.tag).ok()
    }

    pub fn is(&self, tag: Tag) -> bool {
        self.tag == tag as u8
    }
}
