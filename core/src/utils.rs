use std::fmt;

use chrono::{DateTime, Utc};
use num_enum::TryFromPrimitive;

use crate::constants::armor::{CRC24_INIT, CRC24_POLY};

pub fn enum_name_or_hex<T>(raw: T::Primitive) -> String
where
    T: TryFromPrimitive + fmt::Debug,
    T::Primitive: fmt::LowerHex,
{
    match T::try_from_primitive(raw) {
        Ok(variant) => format!("{:?}", variant),
        Err(_) => format!("0x{:x}", raw),
    }
}

/// Current time as an OpenPGP 32-bit timestamp.
pub fn unix_now() -> u32 {
    let now = Utc::now().timestamp();
    now.clamp(0, u32::MAX as i64) as u32
}

pub fn timestamp_to_datetime(ts: u32) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts as i64, 0)
}

/// Incremental CRC-24 as used by the armor checksum line.
#[derive(Debug, Clone, Copy)]
pub struct Crc24 {
    crc: u32,
}

impl Default for Crc24 {
    fn default() -> Self {
        Self { crc: CRC24_INIT }
    }
}

impl Crc24 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, data: &[u8]) {
        for &b in data {
            self.crc ^= (b as u32) << 16;
            for _ in 0..8 {
                self.crc <<= 1;
                if self.crc & 0x0100_0000 != 0 {
                    self.crc ^= CRC24_POLY;
                }
            }
        }
    }

    pub fn finalize(&self) -> u32 {
        self.crc & 0x00FF_FFFF
    }
}

/// Constant-time equality for short secrets and tags.
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc24_of_empty_is_init() {
        assert_eq!(Crc24::new().finalize(), CRC24_INIT);
    }

    #[test]
    fn crc24_incremental_matches_oneshot() {
        let mut a = Crc24::new();
        a.update(b"hello ");
        a.update(b"world");
        let mut b = Crc24::new();
        b.update(b"hello world");
        assert_eq!(a.finalize(), b.finalize());
    }
}
