//! packet/header.rs
//! New-format packet header encoding; new- and old-format decoding.
//!
//! New format: 0xC0 | tag, then
//!   len < 192          -> 1 octet
//!   len < 8384         -> 2 octets: ((len - 192) >> 8) + 192, (len - 192) & 0xFF
//!   otherwise          -> 0xFF + 4-octet BE
//!   partial part 2^e   -> 224 + e
//! Old format: 0x80 | tag << 2 | length type (0: 1 octet, 1: 2, 2: 4, 3: indeterminate)

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::packet::types::{BodyLength, PacketHeader, Tag};
use crate::types::malformed_io;

pub fn write_length<W: Write + ?Sized>(w: &mut W, len: usize) -> io::Result<()> {
    if len < 192 {
        w.write_u8(len as u8)
    } else if len < 8384 {
        let v = len - 192;
        w.write_u8(((v >> 8) + 192) as u8)?;
        w.write_u8((v & 0xFF) as u8)
    } else {
        let len = u32::try_from(len).map_err(|_| malformed_io("packet body exceeds 4 GiB"))?;
        w.write_u8(0xFF)?;
        w.write_u32::<BigEndian>(len)
    }
}

/// Partial length octet for a part of 2^exp bytes.
pub fn write_partial_length<W: Write + ?Sized>(w: &mut W, exp: u8) -> io::Result<()> {
    debug_assert!(exp <= 30);
    w.write_u8(224 + exp)
}

/// Header with a definite length.
pub fn write_header<W: Write + ?Sized>(w: &mut W, tag: Tag, len: usize) -> io::Result<()> {
    w.write_u8(0xC0 | tag as u8)?;
    write_length(w, len)
}

/// Write a complete packet with a definite length.
pub fn write_packet<W: Write + ?Sized>(w: &mut W, tag: Tag, body: &[u8]) -> io::Result<()> {
    write_header(w, tag, body.len())?;
    w.write_all(body)
}

/// Decode a new-format length starting at `first`.
pub(crate) fn read_new_length<R: Read + ?Sized>(r: &mut R, first: u8) -> io::Result<BodyLength> {
    match first {
        0..=191 => Ok(BodyLength::Fixed(first as u64)),
        192..=223 => {
            let second = r.read_u8()?;
            Ok(BodyLength::Fixed((((first as u64) - 192) << 8) + second as u64 + 192))
        }
        224..=254 => Ok(BodyLength::Partial(1u64 << (first & 0x1F))),
        255 => Ok(BodyLength::Fixed(r.read_u32::<BigEndian>()? as u64)),
    }
}

/// Read a packet header. `Ok(None)` at a clean end of input.
pub fn read_header<R: Read + ?Sized>(r: &mut R) -> io::Result<Option<PacketHeader>> {
    let mut first = [0u8; 1];
    loop {
        match r.read(&mut first) {
            Ok(0) => return Ok(None),
            Ok(_) => break,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    let ctb = first[0];
    if ctb & 0x80 == 0 {
        return Err(malformed_io(format!("invalid packet header octet 0x{:02x}", ctb)));
    }

    if ctb & 0x40 != 0 {
        let tag = ctb & 0x3F;
        let first_len = r.read_u8()?;
        let length = read_new_length(r, first_len)?;
        return Ok(Some(PacketHeader { tag, length, old_format: false }));
    }

    let tag = (ctb >> 2) & 0x0F;
    let length = match ctb & 0x03 {
        0 => BodyLength::Fixed(r.read_u8()? as u64),
        1 => BodyLength::Fixed(r.read_u16::<BigEndian>()? as u64),
        2 => BodyLength::Fixed(r.read_u32::<BigEndian>()? as u64),
        _ => BodyLength::Indeterminate,
    };
    Ok(Some(PacketHeader { tag, length, old_format: true }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(len: usize) -> Vec<u8> {
        let mut v = Vec::new();
        write_length(&mut v, len).unwrap();
        v
    }

    #[test]
    fn length_encoding_boundaries() {
        assert_eq!(encoded(0), vec![0]);
        assert_eq!(encoded(191), vec![191]);
        assert_eq!(encoded(192), vec![192, 0]);
        assert_eq!(encoded(8383), vec![223, 255]);
        assert_eq!(encoded(8384), vec![255, 0, 0, 0x20, 0xC0]);
    }

    #[test]
    fn old_format_header() {
        // tag 11, two-octet length
        let data = [0x80 | (11 << 2) | 1, 0x01, 0x00];
        let h = read_header(&mut &data[..]).unwrap().unwrap();
        assert_eq!(h.tag(), Some(Tag::LiteralData));
        assert_eq!(h.length, BodyLength::Fixed(256));
        assert!(h.old_format);
    }

    #[test]
    fn partial_length_octet() {
        let data = [0xC0 | 18, 224 + 13];
        let h = read_header(&mut &data[..]).unwrap().unwrap();
        assert_eq!(h.length, BodyLength::Partial(8192));
    }

    #[test]
    fn missing_high_bit_is_malformed() {
        assert!(read_header(&mut &[0x3Fu8, 0][..]).is_err());
        assert!(read_header(&mut &[][..]).unwrap().is_none());
    }
}
