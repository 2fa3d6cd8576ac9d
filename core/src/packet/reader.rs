//! packet/reader.rs
//! Bounded reader over one packet body, following partial length parts.

use std::io::{self, Read};

use byteorder::ReadBytesExt;

use crate::packet::header::read_new_length;
use crate::packet::types::{BodyLength, PacketHeader};
use crate::types::malformed_io;

pub struct BodyReader<R: Read> {
    inner: R,
    remaining: u64,
    more_parts: bool,
    indeterminate: bool,
}

impl<R: Read> BodyReader<R> {
    pub fn new(inner: R, length: BodyLength) -> Self {
        let (remaining, more_parts, indeterminate) = match length {
            BodyLength::Fixed(n) => (n, false, false),
            BodyLength::Partial(n) => (n, true, false),
            BodyLength::Indeterminate => (0, false, true),
        };
        Self { inner, remaining, more_parts, indeterminate }
    }

    fn next_part(&mut self) -> io::Result<()> {
        let first = self.inner.read_u8()?;
        match read_new_length(&mut self.inner, first)? {
            BodyLength::Fixed(n) => {
                self.remaining = n;
                self.more_parts = false;
            }
            BodyLength::Partial(n) => {
                self.remaining = n;
                self.more_parts = true;
            }
            BodyLength::Indeterminate => return Err(malformed_io("indeterminate length inside partial body")),
        }
        Ok(())
    }

    /// Discard whatever is left of the body.
    pub fn skip_rest(&mut self) -> io::Result<u64> {
        io::copy(self, &mut io::sink())
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for BodyReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.indeterminate {
            return self.inner.read(buf);
        }
        while self.remaining == 0 {
            if !self.more_parts {
                return Ok(0);
            }
            self.next_part()?;
        }
        let want = (buf.len() as u64).min(self.remaining) as usize;
        let n = self.inner.read(&mut buf[..want])?;
        if n == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "packet body truncated"));
        }
        self.remaining -= n as u64;
        Ok(n)
    }
}

/// Read a whole (small) packet body into memory.
pub fn read_body_to_vec<R: Read>(r: R, header: &PacketHeader, limit: u64) -> io::Result<Vec<u8>> {
    let mut body = Vec::new();
    let read = BodyReader::new(r, header.length).take(limit + 1).read_to_end(&mut body)?;
    if read as u64 > limit {
        return Err(malformed_io(format!("packet with tag {} exceeds {} bytes", header.tag, limit)));
    }
    Ok(body)
}
