// abif: Decoder for Applied Biosystems AB1 trace files.
//
// Copyright 2025 Tommi Mäklin [tommi@maklin.fi].
//
// Copyrights in this project are retained by contributors. No copyright assignment
// is required to contribute to this project.
//
// Except as otherwise noted (below and/or in individual files), this
// project is licensed under the Apache License, Version 2.0
// <LICENSE-APACHE> or <http://www.apache.org/licenses/LICENSE-2.0> or
// the MIT license, <LICENSE-MIT> or <http://opensource.org/licenses/MIT>,
// at your option.
//

//! Decodes the payload of a single directory entry into a [TaggedValue].
//!
//! The payload of a record is found in one of two places:
//!
//!   - Records of at most 4 bytes keep their payload right-justified in the
//!     directory entry's data field. The data block is never touched.
//!   - Longer records store an absolute file offset in the data field. The
//!     payload is a slice of the buffered data block, which starts right
//!     after the [file header](crate::headers::file::HEADER_SIZE).
//!
//! Text and byte payloads borrow from the data block or the descriptor;
//! numeric arrays are materialized into vectors.

use bstr::{BStr, ByteSlice};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::catalog::{DecodeCategory, TagName};
use crate::error::{Cause, Result};
use crate::headers::directory::RecordDescriptor;
use crate::headers::file::HEADER_SIZE;

/// Instrument scan rate, stored in the user-defined `Rate` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanRate {
    /// Milliseconds between two scans.
    pub scan_period: u32,
    pub first_scan_line: u32,
    pub last_scan_line: u32,
}

impl ScanRate {
    /// Seconds between two consecutive scans.
    pub fn spacing(&self) -> f64 {
        self.scan_period as f64 / 1000.0
    }

    /// Scans per second. None when the scan period is zero.
    pub fn sampling_rate(&self) -> Option<f64> {
        if self.scan_period == 0 {
            None
        } else {
            Some(1000.0 / self.scan_period as f64)
        }
    }
}

/// A decoded record payload.
#[derive(Debug, Clone, PartialEq)]
pub enum TaggedValue<'a> {
    Date(NaiveDate),
    Time(NaiveTime),
    Floats(Vec<f32>),
    Shorts(Vec<i16>),
    Ints(Vec<i32>),
    /// Contents of a length-prefixed string, padding excluded.
    PascalString(&'a BStr),
    /// Every byte of a fixed-length character record.
    Ascii(&'a BStr),
    ScanRate(ScanRate),
    Bytes(&'a [u8]),
}

impl<'a> TaggedValue<'a> {
    /// String contents with trailing NUL and space padding removed.
    pub fn as_text(&self) -> Option<&'a BStr> {
        match self {
            TaggedValue::PascalString(text) | TaggedValue::Ascii(text) => {
                let text: &'a BStr = *text;
                Some(text.trim_end_with(|c| c == '\0' || c == ' ').as_bstr())
            },
            _ => None,
        }
    }

    /// Raw bytes of a fixed-length character or byte record.
    pub fn as_bytes(&self) -> Option<&'a [u8]> {
        match self {
            TaggedValue::Ascii(text) => {
                let text: &'a BStr = *text;
                let bytes: &'a [u8] = text;
                Some(bytes)
            },
            TaggedValue::Bytes(bytes) => Some(*bytes),
            _ => None,
        }
    }

    pub fn as_shorts(&self) -> Option<&[i16]> {
        match self {
            TaggedValue::Shorts(values) => Some(values.as_slice()),
            _ => None,
        }
    }

    pub fn as_ints(&self) -> Option<&[i32]> {
        match self {
            TaggedValue::Ints(values) => Some(values.as_slice()),
            _ => None,
        }
    }

    pub fn as_floats(&self) -> Option<&[f32]> {
        match self {
            TaggedValue::Floats(values) => Some(values.as_slice()),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            TaggedValue::Date(date) => Some(*date),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<NaiveTime> {
        match self {
            TaggedValue::Time(time) => Some(*time),
            _ => None,
        }
    }

    pub fn as_scan_rate(&self) -> Option<ScanRate> {
        match self {
            TaggedValue::ScanRate(rate) => Some(*rate),
            _ => None,
        }
    }

    /// The first integer of a short or int array.
    pub fn first_integer(&self) -> Option<i64> {
        match self {
            TaggedValue::Shorts(values) => values.first().map(|x| *x as i64),
            TaggedValue::Ints(values) => values.first().map(|x| *x as i64),
            _ => None,
        }
    }
}

/// Combines a run date and run time record into one timestamp.
pub fn timestamp(date: NaiveDate, time: NaiveTime) -> NaiveDateTime {
    date.and_time(time)
}

/// Locates the payload bytes of `desc`.
///
/// Returns a bounds error if a non-inline record reaches outside `block`.
pub fn payload<'a>(
    desc: &'a RecordDescriptor,
    block: &'a [u8],
) -> Result<&'a [u8]> {
    let len = desc.record_length as usize;
    if desc.is_inline() {
        return Ok(&desc.data_field[(4 - len)..])
    }

    let start = desc.offset() as u64;
    let end = start + desc.record_length as u64;
    let block_start = HEADER_SIZE as u64;
    let block_end = block_start + block.len() as u64;
    if start < block_start || end > block_end {
        return Err(Cause::OutOfBounds {
            tag: desc.tag, number: desc.number,
            start, end, block_start, block_end,
        }.into())
    }

    let from = (start - block_start) as usize;
    Ok(&block[from..(from + len)])
}

fn invalid(desc: &RecordDescriptor, reason: String) -> Cause {
    Cause::InvalidValue { tag: desc.tag, number: desc.number, reason }
}

fn decode_array<T, const N: usize>(
    desc: &RecordDescriptor,
    bytes: &[u8],
    from_be: fn([u8; N]) -> T,
) -> Result<Vec<T>> {
    let expected = desc.element_count as u64 * desc.element_size as u64;
    if desc.element_size as usize != N || expected != desc.record_length as u64 {
        return Err(Cause::LengthMismatch {
            tag: desc.tag, number: desc.number,
            count: desc.element_count, size: desc.element_size, length: desc.record_length,
        }.into())
    }

    let values = bytes.chunks_exact(N).map(|chunk| {
        let mut arr: [u8; N] = [0; N];
        arr.copy_from_slice(chunk);
        from_be(arr)
    }).collect();

    Ok(values)
}

fn decode_date(
    desc: &RecordDescriptor,
    bytes: &[u8],
) -> Result<NaiveDate> {
    if bytes.len() < 4 {
        return Err(invalid(desc, format!("a date needs 4 bytes, got {}", bytes.len())).into())
    }
    let year = i16::from_be_bytes([bytes[0], bytes[1]]) as i32;
    let (month, day) = (bytes[2] as u32, bytes[3] as u32);
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| invalid(desc, format!("{:04}-{:02}-{:02} is not a date", year, month, day)).into())
}

fn decode_time(
    desc: &RecordDescriptor,
    bytes: &[u8],
) -> Result<NaiveTime> {
    if bytes.len() < 4 {
        return Err(invalid(desc, format!("a time needs 4 bytes, got {}", bytes.len())).into())
    }
    let (hour, minute, second, hundredths) = (bytes[0] as u32, bytes[1] as u32, bytes[2] as u32, bytes[3] as u32);
    if hundredths > 99 {
        return Err(invalid(desc, format!("{} hundredths of a second", hundredths)).into())
    }
    NaiveTime::from_hms_milli_opt(hour, minute, second, hundredths * 10)
        .ok_or_else(|| invalid(desc, format!("{:02}:{:02}:{:02} is not a time", hour, minute, second)).into())
}

fn decode_pascal_string<'a>(
    desc: &RecordDescriptor,
    bytes: &'a [u8],
) -> Result<&'a BStr> {
    let Some((len, rest)) = bytes.split_first() else {
        return Ok(b"".as_bstr())
    };
    let len = *len as usize;
    if len > rest.len() {
        return Err(invalid(desc, format!("length prefix {} exceeds the {} byte record", len, bytes.len())).into())
    }
    Ok(rest[..len].as_bstr())
}

fn decode_scan_rate(
    desc: &RecordDescriptor,
    bytes: &[u8],
) -> Result<ScanRate> {
    if bytes.len() < 12 {
        return Err(invalid(desc, format!("a scan rate needs 12 bytes, got {}", bytes.len())).into())
    }
    let word = |i: usize| u32::from_be_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
    Ok(ScanRate { scan_period: word(0), first_scan_line: word(4), last_scan_line: word(8) })
}

/// Decodes the payload of `desc` according to its [DecodeCategory].
pub fn decode<'a>(
    desc: &'a RecordDescriptor,
    block: &'a [u8],
) -> Result<TaggedValue<'a>> {
    let bytes = payload(desc, block)?;
    let value = match desc.category() {
        DecodeCategory::Date => TaggedValue::Date(decode_date(desc, bytes)?),
        DecodeCategory::Time => TaggedValue::Time(decode_time(desc, bytes)?),
        DecodeCategory::FloatArray => TaggedValue::Floats(decode_array(desc, bytes, f32::from_be_bytes)?),
        DecodeCategory::ShortArray => TaggedValue::Shorts(decode_array(desc, bytes, i16::from_be_bytes)?),
        DecodeCategory::IntArray => TaggedValue::Ints(decode_array(desc, bytes, i32::from_be_bytes)?),
        DecodeCategory::PascalString => TaggedValue::PascalString(decode_pascal_string(desc, bytes)?),
        DecodeCategory::UserDefined => match desc.tag {
            TagName::Rate => TaggedValue::ScanRate(decode_scan_rate(desc, bytes)?),
            _ => TaggedValue::Bytes(bytes),
        },
        DecodeCategory::AsciiString => TaggedValue::Ascii(bytes.as_bstr()),
        DecodeCategory::ByteArray => TaggedValue::Bytes(bytes),
    };
    Ok(value)
}

// Tests
#[cfg(test)]
mod tests {
    use crate::catalog::{DataType, TagName};
    use crate::headers::directory::RecordDescriptor;

    fn descriptor(tag: &[u8; 4], data_type: u16, element_size: u16, count: u32, data_field: [u8; 4]) -> RecordDescriptor {
        RecordDescriptor {
            tag: TagName::from_bytes(*tag), number: 1,
            data_type: DataType::from_u16(data_type), element_size,
            element_count: count, record_length: count * element_size as u32,
            data_field,
        }
    }

    #[test]
    fn inline_payload_ignores_the_data_block() {
        use super::{decode, TaggedValue};
        use bstr::ByteSlice;

        // The data field would be offset 0x03616263 if it were an offset.
        let desc = descriptor(b"SMPL", 18, 1, 4, [3, b'a', b'b', b'c']);
        let got = decode(&desc, &[]).unwrap();

        assert_eq!(got, TaggedValue::PascalString(b"abc".as_bstr()));
    }

    #[test]
    fn short_inline_payload_is_right_justified() {
        use super::decode;

        let desc = descriptor(b"LANE", 4, 2, 1, [0, 0, 0, 7]);
        assert_eq!(decode(&desc, &[]).unwrap().as_shorts().unwrap(), &[7]);

        let desc = descriptor(b"LANE", 4, 2, 1, [0xff, 0xff, 0, 7]);
        assert_eq!(decode(&desc, &[]).unwrap().as_shorts().unwrap(), &[7]);

        let desc = descriptor(b"FWO_", 2, 1, 3, [0, b'G', b'T', b'A']);
        assert_eq!(decode(&desc, &[]).unwrap().as_bytes().unwrap(), b"GTA");
    }

    #[test]
    fn offset_payload_is_read_from_the_block() {
        use super::decode;

        let mut block = vec![0_u8; 10];
        block.extend_from_slice(&[0, 1, 0xff, 0xfe, 0x7f, 0xff]);
        let offset = (34 + 10) as u32;
        let desc = descriptor(b"PLOC", 4, 2, 3, offset.to_be_bytes());

        let got = decode(&desc, &block).unwrap();

        assert_eq!(got.as_shorts().unwrap(), &[1, -2, i16::MAX]);
    }

    #[test]
    fn out_of_range_offset_is_a_bounds_error() {
        use super::decode;
        use crate::error::{Cause, ErrorKind};

        let block = vec![0_u8; 16];
        let desc = descriptor(b"PLOC", 4, 2, 4, (34_u32 + 10).to_be_bytes());
        let got = decode(&desc, &block).unwrap_err();

        assert_eq!(got.kind(), ErrorKind::Bounds);
        assert!(matches!(got.cause(), Cause::OutOfBounds { start: 44, end: 52, block_start: 34, block_end: 50, .. }));

        let desc = descriptor(b"PLOC", 4, 2, 4, 10_u32.to_be_bytes());
        assert_eq!(decode(&desc, &block).unwrap_err().kind(), ErrorKind::Bounds);
    }

    #[test]
    fn short_category_wins_for_two_byte_longs() {
        use super::{decode, TaggedValue};

        let desc = descriptor(b"ASPt", 5, 2, 1, [0, 0, 0x01, 0x00]);
        assert_eq!(decode(&desc, &[]).unwrap(), TaggedValue::Shorts(vec![256]));

        let desc = descriptor(b"Scan", 5, 4, 1, [0, 0, 0x30, 0x39]);
        assert_eq!(decode(&desc, &[]).unwrap(), TaggedValue::Ints(vec![12345]));
    }

    #[test]
    fn length_mismatch_is_rejected() {
        use super::decode;
        use crate::error::Cause;

        let mut desc = descriptor(b"PLOC", 4, 2, 2, [0, 0, 1, 2]);
        desc.record_length = 3;
        let got = decode(&desc, &[]).unwrap_err();

        assert!(matches!(got.cause(), Cause::LengthMismatch { count: 2, size: 2, length: 3, .. }));
    }

    #[test]
    fn floats() {
        use super::decode;

        let mut block = Vec::new();
        block.extend_from_slice(&1.5_f32.to_be_bytes());
        block.extend_from_slice(&(-0.25_f32).to_be_bytes());
        let desc = descriptor(b"NOIS", 7, 4, 2, 34_u32.to_be_bytes());

        assert_eq!(decode(&desc, &block).unwrap().as_floats().unwrap(), &[1.5, -0.25]);
    }

    #[test]
    fn date_and_time() {
        use super::{decode, timestamp};
        use chrono::{NaiveDate, NaiveTime};

        let date = descriptor(b"RUND", 10, 4, 1, [0x07, 0xe8, 3, 9]);
        let time = descriptor(b"RUNT", 11, 4, 1, [14, 5, 59, 50]);

        let date = decode(&date, &[]).unwrap().as_date().unwrap();
        let time = decode(&time, &[]).unwrap().as_time().unwrap();

        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(time, NaiveTime::from_hms_milli_opt(14, 5, 59, 500).unwrap());
        assert_eq!(timestamp(date, time).to_string(), "2024-03-09 14:05:59.500");
    }

    #[test]
    fn invalid_date_is_a_format_error() {
        use super::decode;
        use crate::error::ErrorKind;

        let date = descriptor(b"RUND", 10, 4, 1, [0x07, 0xe8, 13, 1]);

        assert_eq!(decode(&date, &[]).unwrap_err().kind(), ErrorKind::Format);
    }

    #[test]
    fn pascal_string_ignores_padding() {
        use super::decode;

        let block = b"\x05hello  \0\0xyz".to_vec();
        let desc = descriptor(b"CMNT", 18, 1, block.len() as u32, 34_u32.to_be_bytes());

        let got = decode(&desc, &block).unwrap();

        assert_eq!(got.as_text().unwrap(), "hello");
    }

    #[test]
    fn pascal_string_prefix_past_the_end() {
        use super::decode;
        use crate::error::Cause;

        let desc = descriptor(b"CMNT", 18, 1, 3, [0, 9, b'a', b'b']);

        assert!(matches!(decode(&desc, &[]).unwrap_err().cause(), Cause::InvalidValue { .. }));
    }

    #[test]
    fn ascii_keeps_every_byte_until_trimmed() {
        use super::{decode, TaggedValue};
        use bstr::ByteSlice;

        let block = b"3730xl\0\0".to_vec();
        let desc = descriptor(b"MODL", 2, 1, 8, 34_u32.to_be_bytes());

        let got = decode(&desc, &block).unwrap();

        assert_eq!(got, TaggedValue::Ascii(b"3730xl\0\0".as_bstr()));
        assert_eq!(got.as_text().unwrap(), "3730xl");
    }

    #[test]
    fn user_defined_by_tag_name() {
        use super::{decode, ScanRate, TaggedValue};

        let mut block = Vec::new();
        for word in [200_u32, 1, 9000] {
            block.extend_from_slice(&word.to_be_bytes());
        }
        let rate = descriptor(b"Rate", 1024, 1, 12, 34_u32.to_be_bytes());
        let other = descriptor(b"User", 1024, 1, 12, 34_u32.to_be_bytes());

        let got = decode(&rate, &block).unwrap().as_scan_rate().unwrap();

        assert_eq!(got, ScanRate { scan_period: 200, first_scan_line: 1, last_scan_line: 9000 });
        assert_eq!(got.spacing(), 0.2);
        assert_eq!(got.sampling_rate(), Some(5.0));
        assert_eq!(decode(&other, &block).unwrap(), TaggedValue::Bytes(&block));
    }

    #[test]
    fn unknown_types_are_bytes() {
        use super::{decode, TaggedValue};

        let desc = descriptor(b"B1Pt", 9, 1, 2, [0, 0, 1, 2]);

        assert_eq!(decode(&desc, &[]).unwrap(), TaggedValue::Bytes(&[1, 2]));
    }
}
