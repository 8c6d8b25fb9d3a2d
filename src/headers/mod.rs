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

//! File header and tag directory entries of the AB1 format.
//!
//! Consists of [FileHeader](file::FileHeader) and
//! [DirEntry](directory::DirEntry) structs, both of which have a fixed
//! encoded size and are decoded with the same big-endian fixed-width bincode
//! configuration returned by [config].
//!
//! ## File layout
//!
//! An AB1 file is laid out as:
//!
//! ```text
//! offset 0    magic "ABIF"                        4 bytes
//! offset 4    version                             2 bytes
//! offset 6    directory locator (a DirEntry)     28 bytes
//! offset 34   data block                         directory offset - 34 bytes
//!             tag directory                      entry count * 28 bytes
//! ```
//!
//! ### FileHeader
//!
//! The header is the magic number, the format version, and one directory
//! entry named `tdir` that locates the tag directory:
//!
//! - its element count is the number of directory entries.
//! - its data field is the absolute offset of the first directory entry.
//!
//! An encoded FileHeader is always 34 bytes long. Real files pad the header
//! to 128 bytes; the padding is read as the start of the data block.
//!
//! ### DirEntry
//!
//! Every field of the file is described by one 28 byte directory entry:
//!
//! - Tag name (4 characters).
//! - Tag number, telling repeated entries of the same name apart.
//! - Element type code and element size (2 bytes each).
//! - Number of elements.
//! - Length of the payload in bytes.
//! - Data field: the payload itself if it is at most 4 bytes long, an
//!   absolute file offset to it otherwise.
//! - A spare field that is not used.
//!

pub mod directory;
pub mod file;

use bincode::config::{BigEndian, Configuration, Fixint};

/// Bincode configuration for the fixed-width big-endian header structs.
pub fn config() -> Configuration<BigEndian, Fixint> {
    bincode::config::standard()
        .with_fixed_int_encoding()
        .with_big_endian()
}
