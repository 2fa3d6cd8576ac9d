//! packet/writer.rs
//! Streaming packet body writer.
//!
//! Body bytes are buffered into 8 KiB parts. A full part is only emitted
//! (with a partial length octet) once more data arrives, so the last part
//! always goes out with a definite length on `finish`, possibly zero.

use std::io::{self, Write};

use byteorder::WriteBytesExt;

use crate::constants::{PARTIAL_BODY_EXP, PARTIAL_BODY_LEN};
use crate::packet::header::{write_length, write_partial_length};
use crate::packet::types::Tag;

pub struct PacketWriter<W: Write> {
    inner: W,
    tag: Tag,
    part: Vec<u8>,
    partial_parts: u64,
}

impl<W: Write> PacketWriter<W> {
    /// Writes the header octet immediately; lengths follow as parts fill.
    pub fn new(mut inner: W, tag: Tag) -> io::Result<Self> {
        inner.write_u8(0xC0 | tag as u8)?;
        Ok(Self {
            inner,
            tag,
            part: Vec::with_capacity(PARTIAL_BODY_LEN),
            partial_parts: 0,
        })
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn partial_parts(&self) -> u64 {
        self.partial_parts
    }

    fn emit_part(&mut self) -> io::Result<()> {
        write_partial_length(&mut self.inner, PARTIAL_BODY_EXP)?;
        self.inner.write_all(&self.part)?;
        self.part.clear();
        self.partial_parts += 1;
        Ok(())
    }

    /// Emit the final definite-length part and return the inner writer.
    pub fn finish(mut self) -> io::Result<W> {
        write_length(&mut self.inner, self.part.len())?;
        self.inner.write_all(&self.part)?;
        self.part.clear();
        Ok(self.inner)
    }
}

impl<W: Write> Write for PacketWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut consumed = 0;
        while consumed < buf.len() {
            if self.part.len() == PARTIAL_BODY_LEN {
                self.emit_part()?;
            }
            let take = (PARTIAL_BODY_LEN - self.part.len()).min(buf.len() - consumed);
            self.part.extend_from_slice(&buf[consumed..consumed + take]);
            consumed += take;
        }
        Ok(consumed)
    }

    /// Never emits a partial length; only pushes already written parts downstream.
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_body_uses_definite_length() {
        let mut w = PacketWriter::new(Vec::new(), Tag::LiteralData).unwrap();
        w.write_all(b"hello").unwrap();
        w.flush().unwrap();
        let out = w.finish().unwrap();
        assert_eq!(out, [&[0xCB, 5][..], b"hello"].concat());
    }

    #[test]
    fn second_full_part_is_held_for_final_length() {
        let mut w = PacketWriter::new(Vec::new(), Tag::CompressedData).unwrap();
        w.write_all(&vec![1u8; PARTIAL_BODY_LEN * 2]).unwrap();
        assert_eq!(w.partial_parts(), 1);
        let out = w.finish().unwrap();
        assert_eq!(out[1], 224 + PARTIAL_BODY_EXP);
        // second part is held back and closed with a two-octet definite length
        let second = 2 + PARTIAL_BODY_LEN;
        assert_eq!(&out[second..second + 2], &[223, 64]);
        assert_eq!(out.len(), 2 + PARTIAL_BODY_LEN + 2 + PARTIAL_BODY_LEN);
    }

    #[test]
    fn empty_body() {
        let w = PacketWriter::new(Vec::new(), Tag::LiteralData).unwrap();
        assert_eq!(w.finish().unwrap(), vec![0xCB, 0]);
    }
}
