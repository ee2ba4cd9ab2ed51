use chrono::{DateTime, NaiveDateTime};
use serde::{Serialize, Serializer};
use std::{
    fmt::{self, Debug, Display},
    str::FromStr,
};

use crate::config::NarrowEncoding;

/// Seconds between 1601-01-01 and 1970-01-01.
const WINDOWS_EPOCH: i64 = 11644473600;
const TICKS_PER_SECOND: u64 = 10_000_000;

/// Converts a FILETIME (100 ns ticks since 1601-01-01 UTC) to a calendar time.
pub fn filetime_to_datetime(ticks: u64) -> Option<NaiveDateTime> {
    let seconds = (ticks / TICKS_PER_SECOND) as i64 - WINDOWS_EPOCH;
    let nanos = (ticks % TICKS_PER_SECOND) as u32 * 100;
    DateTime::from_timestamp(seconds, nanos).map(|datetime| datetime.naive_utc())
}

/// Decodes UTF-16LE bytes. A trailing odd byte is dropped.
pub fn decode_utf16le(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

/// Decodes a NUL-padded UTF-16LE buffer, stopping at the first NUL unit.
pub fn decode_utf16le_padded(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .take_while(|&unit| unit != 0)
        .collect();
    String::from_utf16_lossy(&units)
}

pub fn decode_narrow(bytes: &[u8], encoding: NarrowEncoding) -> String {
    match encoding {
        NarrowEncoding::Latin1 => bytes.iter().map(|&byte| byte as char).collect(),
        NarrowEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Decodes a NUL-padded narrow buffer, stopping at the first NUL byte.
pub fn decode_narrow_padded(bytes: &[u8], encoding: NarrowEncoding) -> String {
    let nul = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    decode_narrow(&bytes[..nul], encoding)
}

/// Serializes a `bitflags` set as the list of its set flag names.
pub fn serialize_flag_names<F, S>(flags: &F, serializer: S) -> Result<S::Ok, S::Error>
where
    F: bitflags::Flags,
    S: Serializer,
{
    serializer.collect_seq(flags.iter_names().map(|(name, _)| name))
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Guid {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

impl Guid {
    /// On-disk layout: first three fields little-endian, last eight bytes as-is.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        let mut data4 = [0u8; 8];
        data4.copy_from_slice(&bytes[8..]);
        Guid {
            data1: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            data2: u16::from_le_bytes([bytes[4], bytes[5]]),
            data3: u16::from_le_bytes([bytes[6], bytes[7]]),
            data4,
        }
    }

    pub fn to_bytes(&self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        bytes[..4].copy_from_slice(&self.data1.to_le_bytes());
        bytes[4..6].copy_from_slice(&self.data2.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.data3.to_le_bytes());
        bytes[8..].copy_from_slice(&self.data4);
        bytes
    }
}

impl Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08X}-{:04X}-{:04X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}",
            self.data1,
            self.data2,
            self.data3,
            self.data4[0],
            self.data4[1],
            self.data4[2],
            self.data4[3],
            self.data4[4],
            self.data4[5],
            self.data4[6],
            self.data4[7]
        )
    }
}

impl Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Serialize for Guid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GuidStringParseError {
    #[error("Invalid format")]
    InvalidFormat,
    #[error("Invalid length")]
    InvalidLength,
    #[error("Invalid integer: {0}")]
    ParseIntError(#[from] std::num::ParseIntError),
}

impl FromStr for Guid {
    type Err = GuidStringParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('-').collect();
        if parts.len() != 5 {
            return Err(GuidStringParseError::InvalidFormat);
        }
        let lengths = [8, 4, 4, 4, 12];
        if parts.iter().zip(lengths).any(|(part, len)| part.len() != len) {
            return Err(GuidStringParseError::InvalidLength);
        }

        let data1 = u32::from_str_radix(parts[0], 16)?;
        let data2 = u16::from_str_radix(parts[1], 16)?;
        let data3 = u16::from_str_radix(parts[2], 16)?;

        let tail = format!("{}{}", parts[3], parts[4]);
        let mut data4 = [0u8; 8];
        for (index, byte) in data4.iter_mut().enumerate() {
            let digits = tail
                .get(index * 2..index * 2 + 2)
                .ok_or(GuidStringParseError::InvalidFormat)?;
            *byte = u8::from_str_radix(digits, 16)?;
        }

        Ok(Guid {
            data1,
            data2,
            data3,
            data4,
        })
    }
}
