//! armor/decode.rs
//! Armor removal and input format detection.
//!
//! Tolerates leading text, armor header lines and arbitrary line lengths.
//! A `=XXXX` checksum line is verified when present.

use std::io::{self, BufRead, BufReader, Read};

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::constants::armor::{BEGIN_MESSAGE, END_MESSAGE};
use crate::types::{malformed_io, PgpError};
use crate::utils::Crc24;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ArmorState {
    Preamble,
    Headers,
    Body,
    Done,
}

pub struct ArmorReader<R: BufRead> {
    inner: R,
    state: ArmorState,
    line: Vec<u8>,
    carry: String,
    out: Vec<u8>,
    out_pos: usize,
    crc: Crc24,
    checksum: Option<u32>,
}

impl<R: BufRead> ArmorReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            state: ArmorState::Preamble,
            line: Vec::with_capacity(80),
            carry: String::new(),
            out: Vec::new(),
            out_pos: 0,
            crc: Crc24::new(),
            checksum: None,
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn next_line(&mut self) -> io::Result<Option<String>> {
        self.line.clear();
        if self.inner.read_until(b'\n', &mut self.line)? == 0 {
            return Ok(None);
        }
        let text = std::str::from_utf8(&self.line).map_err(|_| malformed_io("armor contains non-UTF-8 text"))?;
        Ok(Some(text.trim().to_string()))
    }

    fn decode_body(&mut self, line: &str) -> io::Result<()> {
        self.carry.push_str(line);
        let usable = self.carry.len() / 4 * 4;
        if usable == 0 {
            return Ok(());
        }
        let raw = STANDARD
            .decode(&self.carry[..usable])
            .map_err(|e| malformed_io(format!("invalid base64 in armor: {}", e)))?;
        self.carry.drain(..usable);
        self.crc.update(&raw);
        self.out = raw;
        self.out_pos = 0;
        Ok(())
    }

    fn finish_body(&mut self) -> io::Result<()> {
        if !self.carry.is_empty() {
            return Err(malformed_io("armor body ends in the middle of a base64 group"));
        }
        if let Some(expected) = self.checksum {
            let actual = self.crc.finalize();
            if expected != actual {
                return Err(malformed_io(format!(
                    "armor checksum mismatch: expected {:06X}, computed {:06X}",
                    expected, actual
                )));
            }
        }
        self.state = ArmorState::Done;
        Ok(())
    }

    /// Consume one input line, possibly producing decoded bytes.
    fn advance(&mut self) -> io::Result<()> {
        let line = match self.next_line()? {
            Some(l) => l,
            None => {
                return Err(match self.state {
                    ArmorState::Preamble => malformed_io("no armor header line found"),
                    _ => malformed_io("armor ended before END line"),
                })
            }
        };
        match self.state {
            ArmorState::Preamble => {
                if line == BEGIN_MESSAGE {
                    self.state = ArmorState::Headers;
                } else if line.starts_with("-----BEGIN PGP") {
                    return Err(malformed_io(format!("unexpected armor kind: {}", line)));
                }
            }
            ArmorState::Headers => {
                if line.is_empty() {
                    self.state = ArmorState::Body;
                } else if !line.contains(": ") {
                    // no blank separator line; this is already body data
                    self.state = ArmorState::Body;
                    self.decode_body(&line)?;
                }
            }
            ArmorState::Body => {
                if line == END_MESSAGE {
                    self.finish_body()?;
                } else if line.starts_with("-----") {
                    return Err(malformed_io(format!("unexpected armor line: {}", line)));
                } else if let Some(sum) = line.strip_prefix('=') {
                    let raw = STANDARD
                        .decode(sum)
                        .map_err(|_| malformed_io("invalid armor checksum line"))?;
                    if raw.len() != 3 {
                        return Err(malformed_io("invalid armor checksum length"));
                    }
                    self.checksum = Some(u32::from_be_bytes([0, raw[0], raw[1], raw[2]]));
                } else if !line.is_empty() {
                    self.decode_body(&line)?;
                }
            }
            ArmorState::Done => {}
        }
        Ok(())
    }
}

impl<R: BufRead> Read for ArmorReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            if self.out_pos < self.out.len() {
                let n = (self.out.len() - self.out_pos).min(buf.len());
                buf[..n].copy_from_slice(&self.out[self.out_pos..self.out_pos + n]);
                self.out_pos += n;
                return Ok(n);
            }
            if self.state == ArmorState::Done || buf.is_empty() {
                return Ok(0);
            }
            self.advance()?;
        }
    }
}

/// Decoder input with armor detected from the first octet.
pub enum MessageSource<R: Read> {
    Binary(BufReader<R>),
    Armored(ArmorReader<BufReader<R>>),
}

impl<R: Read> MessageSource<R> {
    /// Binary packets always start with the high bit set; anything else is read as armor.
    pub fn detect(input: R) -> Result<Self, PgpError> {
        let mut reader = BufReader::new(input);
        let first = reader.fill_buf()?.first().copied();
        match first {
            None => Err(PgpError::MalformedMessage("empty input".into())),
            Some(b) if b & 0x80 != 0 => Ok(Self::Binary(reader)),
            Some(_) => Ok(Self::Armored(ArmorReader::new(reader))),
        }
    }

    pub fn is_armored(&self) -> bool {
        matches!(self, Self::Armored(_))
    }

    pub fn into_inner(self) -> R {
        match self {
            Self::Binary(r) => r.into_inner(),
            Self::Armored(r) => r.into_inner().into_inner(),
        }
    }
}

impl<R: Read> Read for MessageSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Binary(r) => r.read(buf),
            Self::Armored(r) => r.read(buf),
        }
    }
}
