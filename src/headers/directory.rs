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
use std::io::Read;

use bincode::{Encode, Decode};
use bincode::decode_from_slice;

use crate::catalog::{DataType, DecodeCategory, TagName};
use crate::error::{Cause, Result};

/// Encoded size of a [DirEntry].
pub const DIR_ENTRY_SIZE: usize = 28;

/// A tag directory entry as it is stored on the wire.
#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: [u8; 4],
    pub number: u32,
    pub element_type: u16,
    pub element_size: u16,
    pub num_elements: u32,
    pub data_size: u32,
    /// Inline payload or big-endian offset, see [RecordDescriptor::is_inline].
    pub data_field: [u8; 4],
    pub spare: u32,
}

/// A directory entry with its tag name and data type resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDescriptor {
    pub tag: TagName,
    pub number: u32,
    pub data_type: DataType,
    pub element_size: u16,
    pub element_count: u32,
    pub record_length: u32,
    pub data_field: [u8; 4],
}

impl RecordDescriptor {
    pub fn category(&self) -> DecodeCategory {
        DecodeCategory::resolve(self.data_type, self.element_size)
    }

    /// Payloads of at most 4 bytes are stored in the data field itself.
    pub fn is_inline(&self) -> bool {
        self.record_length <= 4
    }

    /// Absolute file offset of the payload. Meaningless for inline records.
    pub fn offset(&self) -> u32 {
        u32::from_be_bytes(self.data_field)
    }
}

impl From<DirEntry> for RecordDescriptor {
    fn from(entry: DirEntry) -> Self {
        RecordDescriptor {
            tag: TagName::from_bytes(entry.name),
            number: entry.number,
            data_type: DataType::from_u16(entry.element_type),
            element_size: entry.element_size,
            element_count: entry.num_elements,
            record_length: entry.data_size,
            data_field: entry.data_field,
        }
    }
}

pub fn decode_dir_entry(
    entry_bytes: &[u8],
) -> Result<DirEntry> {
    Ok(decode_from_slice(entry_bytes, super::config())?.0)
}

pub fn read_dir_entry<R: Read>(
    conn: &mut R,
) -> Result<DirEntry> {
    let mut entry_bytes: [u8; DIR_ENTRY_SIZE] = [0_u8; DIR_ENTRY_SIZE];
    conn.read_exact(&mut entry_bytes).map_err(|err| Cause::from_read(err, "a tag directory entry"))?;
    decode_dir_entry(&entry_bytes)
}

#[cfg(test)]
pub fn encode_dir_entry(
    entry: &DirEntry,
) -> Vec<u8> {
    let mut bytes: Vec<u8> = Vec::new();
    let nbytes = bincode::encode_into_std_write(entry, &mut bytes, super::config()).unwrap();
    assert_eq!(nbytes, DIR_ENTRY_SIZE);
    bytes
}
