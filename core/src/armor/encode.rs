//! armor/encode.rs
//! ASCII armor output: BEGIN line, blank line, 64-column base64, END line.
//! No checksum line is written.

use std::io::{self, Write};

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::constants::armor::{BEGIN_MESSAGE, END_MESSAGE, LINE_BYTES};

pub struct ArmorWriter<W: Write> {
    inner: W,
    pending: Vec<u8>,
}

fn write_line<W: Write>(w: &mut W, raw: &[u8]) -> io::Result<()> {
    w.write_all(STANDARD.encode(raw).as_bytes())?;
    w.write_all(b"\n")
}

impl<W: Write> ArmorWriter<W> {
    pub fn new(mut inner: W) -> io::Result<Self> {
        inner.write_all(BEGIN_MESSAGE.as_bytes())?;
        inner.write_all(b"\n\n")?;
        Ok(Self { inner, pending: Vec::with_capacity(LINE_BYTES) })
    }

    pub fn finish(mut self) -> io::Result<W> {
        if !self.pending.is_empty() {
            write_line(&mut self.inner, &self.pending)?;
            self.pending.clear();
        }
        self.inner.write_all(END_MESSAGE.as_bytes())?;
        self.inner.write_all(b"\n")?;
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> Write for ArmorWriter<W> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut rest = data;
        if !self.pending.is_empty() {
            let take = (LINE_BYTES - self.pending.len()).min(rest.len());
            self.pending.extend_from_slice(&rest[..take]);
            rest = &rest[take..];
            if self.pending.len() < LINE_BYTES {
                return Ok(data.len());
            }
            write_line(&mut self.inner, &self.pending)?;
            self.pending.clear();
        }
        let mut lines = rest.chunks_exact(LINE_BYTES);
        for line in &mut lines {
            write_line(&mut self.inner, line)?;
        }
        self.pending.extend_from_slice(lines.remainder());
        Ok(data.len())
    }

    /// Flushes complete lines only; a partial line stays buffered.
    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Final output stage: raw binary or armored.
pub enum ArmorSink<W: Write> {
    Binary(W),
    Armored(ArmorWriter<W>),
}

impl<W: Write> ArmorSink<W> {
    pub fn new(inner: W, armored: bool) -> io::Result<Self> {
        if armored {
            Ok(Self::Armored(ArmorWriter::new(inner)?))
        } else {
            Ok(Self::Binary(inner))
        }
    }

    pub fn finish(self) -> io::Result<W> {
        match self {
            Self::Binary(mut w) => {
                w.flush()?;
                Ok(w)
            }
            Self::Armored(a) => a.finish(),
        }
    }
}

impl<W: Write> Write for ArmorSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Binary(w) => w.write(buf),
            Self::Armored(a) => a.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Binary(w) => w.flush(),
            Self::Armored(a) => a.flush(),
        }
    }
}
