//! packet/literal.rs
//! Literal data packet: format octet, file name, date, then the data.

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, Utc};

use crate::constants::{CONSOLE_FILENAME, MAX_FILENAME_LEN};
use crate::packet::types::Tag;
use crate::packet::writer::PacketWriter;
use crate::types::{malformed_io, PgpError};
use crate::utils::{timestamp_to_datetime, unix_now};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LiteralFormat {
    Binary,
    Text,
    Utf8,
}

impl LiteralFormat {
    pub fn octet(self) -> u8 {
        match self {
            LiteralFormat::Binary => b'b',
            LiteralFormat::Text => b't',
            LiteralFormat::Utf8 => b'u',
        }
    }

    pub fn from_octet(b: u8) -> Option<Self> {
        match b {
            b'b' => Some(LiteralFormat::Binary),
            b't' => Some(LiteralFormat::Text),
            b'u' => Some(LiteralFormat::Utf8),
            _ => None,
        }
    }
}

/// Literal packet metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiteralMetadata {
    pub format: LiteralFormat,
    pub file_name: String,
    pub date: u32,
}

impl LiteralMetadata {
    /// Binary literal named `_CONSOLE`, dated now.
    pub fn console() -> Self {
        Self::named(CONSOLE_FILENAME)
    }

    pub fn named(file_name: &str) -> Self {
        Self {
            format: LiteralFormat::Binary,
            file_name: file_name.to_string(),
            date: unix_now(),
        }
    }

    pub fn is_console(&self) -> bool {
        self.file_name == CONSOLE_FILENAME
    }

    pub fn modified(&self) -> Option<DateTime<Utc>> {
        timestamp_to_datetime(self.date)
    }

    pub fn validate_file_name(name: &str) -> Result<(), PgpError> {
        if name.len() > MAX_FILENAME_LEN {
            return Err(PgpError::Config(format!(
                "literal file name is {} bytes, limit is {}",
                name.len(),
                MAX_FILENAME_LEN
            )));
        }
        Ok(())
    }

    fn write_header<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let name = self.file_name.as_bytes();
        if name.len() > MAX_FILENAME_LEN {
            return Err(PgpError::Config("literal file name too long".into()).into_io());
        }
        w.write_u8(self.format.octet())?;
        w.write_u8(name.len() as u8)?;
        w.write_all(name)?;
        w.write_u32::<BigEndian>(self.date)
    }

    /// Parse the literal header at the start of a packet body.
    pub fn read_header<R: Read>(r: &mut R) -> io::Result<Self> {
        let fmt = r.read_u8()?;
        let format = LiteralFormat::from_octet(fmt)
            .ok_or_else(|| malformed_io(format!("unknown literal format octet 0x{:02x}", fmt)))?;
        let name_len = r.read_u8()? as usize;
        let mut name = vec![0u8; name_len];
        r.read_exact(&mut name)?;
        let date = r.read_u32::<BigEndian>()?;
        Ok(Self {
            format,
            file_name: String::from_utf8_lossy(&name).into_owned(),
            date,
        })
    }
}

/// Streams literal data into a literal packet.
pub struct LiteralWriter<W: Write> {
    packet: PacketWriter<W>,
    written: u64,
}

impl<W: Write> LiteralWriter<W> {
    pub fn new(inner: W, meta: &LiteralMetadata) -> io::Result<Self> {
        let mut packet = PacketWriter::new(inner, Tag::LiteralData)?;
        meta.write_header(&mut packet)?;
        Ok(Self { packet, written: 0 })
    }

    pub fn data_len(&self) -> u64 {
        self.written
    }

    pub fn finish(self) -> io::Result<W> {
        self.packet.finish()
    }
}

impl<W: Write> Write for LiteralWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.packet.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.packet.flush()
    }
}
