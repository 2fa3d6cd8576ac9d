//! compression/stream.rs
//! Streaming compressor/decompressor used inside the compressed data packet.

use std::io::{self, Read, Write};

use flate2::read::{DeflateDecoder, ZlibDecoder};
use flate2::write::{DeflateEncoder, ZlibEncoder};
use flate2::Compression;

use crate::compression::types::CompressionAlgorithm;
use crate::types::PgpError;

pub enum CompressWriter<W: Write> {
    Stored(W),
    Zip(DeflateEncoder<W>),
    Zlib(ZlibEncoder<W>),
}

impl<W: Write> CompressWriter<W> {
    pub fn new(alg: CompressionAlgorithm, inner: W) -> Result<Self, PgpError> {
        let level = Compression::default();
        match alg {
            CompressionAlgorithm::Uncompressed => Ok(Self::Stored(inner)),
            CompressionAlgorithm::Zip => Ok(Self::Zip(DeflateEncoder::new(inner, level))),
            CompressionAlgorithm::Zlib => Ok(Self::Zlib(ZlibEncoder::new(inner, level))),
            CompressionAlgorithm::Bzip2 => Err(PgpError::UnsupportedAlgorithm("compression Bzip2".into())),
        }
    }

    /// Write the compressed stream trailer and hand back the inner writer.
    pub fn finish(self) -> io::Result<W> {
        match self {
            Self::Stored(w) => Ok(w),
            Self::Zip(e) => e.finish(),
            Self::Zlib(e) => e.finish(),
        }
    }
}

impl<W: Write> Write for CompressWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stored(w) => w.write(buf),
            Self::Zip(e) => e.write(buf),
            Self::Zlib(e) => e.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stored(w) => w.flush(),
            Self::Zip(e) => e.flush(),
            Self::Zlib(e) => e.flush(),
        }
    }
}

pub enum DecompressReader<R: Read> {
    Stored(R),
    Zip(DeflateDecoder<R>),
    Zlib(ZlibDecoder<R>),
}

impl<R: Read> DecompressReader<R> {
    pub fn new(alg: CompressionAlgorithm, inner: R) -> Result<Self, PgpError> {
        match alg {
            CompressionAlgorithm::Uncompressed => Ok(Self::Stored(inner)),
            CompressionAlgorithm::Zip => Ok(Self::Zip(DeflateDecoder::new(inner))),
            CompressionAlgorithm::Zlib => Ok(Self::Zlib(ZlibDecoder::new(inner))),
            CompressionAlgorithm::Bzip2 => Err(PgpError::UnsupportedAlgorithm("compression Bzip2".into())),
        }
    }
}

impl<R: Read> Read for DecompressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let res = match self {
            Self::Stored(r) => return r.read(buf),
            Self::Zip(d) => d.read(buf),
            Self::Zlib(d) => d.read(buf),
        };
        // Corrupt deflate data surfaces as a plain io error from flate2.
        res.map_err(|e| match e.kind() {
            io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData
                if e.get_ref().map_or(true, |inner| !inner.is::<PgpError>()) =>
            {
                PgpError::MalformedMessage(format!("corrupt compressed data: {}", e)).into_io()
            }
            _ => e,
        })
    }
}
