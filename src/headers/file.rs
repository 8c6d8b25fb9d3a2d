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

use crate::error::{Cause, Result};
use crate::headers::directory::DirEntry;

pub const MAGIC: [u8; 4] = *b"ABIF";

/// Bytes consumed by [read_file_header]: magic, version and directory locator.
pub const HEADER_SIZE: usize = 34;

/// Header fields following the magic number.
#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub version: u16,
    pub directory: DirEntry,
}

impl FileHeader {
    pub fn entry_count(&self) -> u32 {
        self.directory.num_elements
    }

    pub fn directory_offset(&self) -> u32 {
        u32::from_be_bytes(self.directory.data_field)
    }

    /// Number of bytes between the header and the tag directory.
    pub fn data_block_len(&self) -> Result<usize> {
        let offset = self.directory_offset();
        (offset as usize).checked_sub(HEADER_SIZE).ok_or_else(|| {
            Cause::DirectoryBeforeHeader { offset, header_size: HEADER_SIZE as u32 }.into()
        })
    }
}

pub fn decode_file_header(
    header_bytes: &[u8],
) -> Result<FileHeader> {
    Ok(decode_from_slice(header_bytes, super::config())?.0)
}

/// Reads and verifies the magic number, then the rest of the header.
pub fn read_file_header<R: Read>(
    conn: &mut R,
) -> Result<FileHeader> {
    let mut magic: [u8; 4] = [0_u8; 4];
    conn.read_exact(&mut magic).map_err(|err| Cause::from_read(err, "the magic number"))?;
    if magic != MAGIC {
        return Err(Cause::BadMagic { found: magic }.into())
    }

    let mut header_bytes: [u8; HEADER_SIZE - 4] = [0_u8; HEADER_SIZE - 4];
    conn.read_exact(&mut header_bytes).map_err(|err| Cause::from_read(err, "the file header"))?;
    let res = decode_file_header(&header_bytes)?;
    Ok(res)
}

#[cfg(test)]
pub fn encode_file_header(
    header: &FileHeader,
) -> Vec<u8> {
    let mut bytes: Vec<u8> = MAGIC.to_vec();
    let nbytes = bincode::encode_into_std_write(header, &mut bytes, super::config()).unwrap();
    assert_eq!(nbytes + 4, HEADER_SIZE);
    bytes
}
