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

//! abif is a library and a command-line client for reading the AB1 trace
//! files written by Applied Biosystems capillary sequencers.
//!
//! An AB1 file is a tag directory: a list of fixed-size entries, each naming
//! a field (base calls, peak locations, dye channel traces, run dates,
//! instrument settings...) and pointing at its payload. Most fields are
//! stored twice, once as edited by the user and once as originally called by
//! the instrument. abif decodes the directory and assembles:
//!
//!   - base calls and per-channel quality values, current and original.
//!   - processed traces for the A, C, G and T channels.
//!   - peak locations.
//!   - raw photometric and gel diagnostic channels.
//!   - a key/value metadata block in the layout used by the `io_lib` tools.
//!
//! ## Usage
//!
//! ### Command line
//!
//! The abif CLI supports the following subcommands:
//!   - `abif info` print the metadata block of each file.
//!   - `abif directory` list the tag directory entries of each file.
//!   - `abif bases` print the base calls and quality values of each file.
//!
//! ### Rust API
//!
//! [decode_from_read] and [decode_from_path] decode a whole file into a
//! [Chromatogram]. [read_metadata] only builds the metadata block and works
//! on files that lack the sequence fields.
//!
//! For other consumers, implement [ChromatogramVisitor] (and optionally
//! [Ab1ChromatogramVisitor](visitor::Ab1ChromatogramVisitor)) and decode
//! through a source:
//!
//!   - [Ab1Stream](session::Ab1Stream): a single-use [Read], decoded at most once.
//!   - [Ab1File](session::Ab1File): a path, gzip compressed or not, decoded any number of times.
//!
//! Lower level access to the directory is available through
//! [Ab1Session](session::Ab1Session) and [GroupedRecords](grouped::GroupedRecords).
//!
//! ## Errors
//!
//! Every failure is a [DecodeError]. Its [cause](DecodeError::cause) tells
//! what went wrong and [kind](DecodeError::kind) whether the file is
//! malformed, points outside its data block, or lacks a required tag.
//!
//! ## File format
//!
//! See [headers] for the layout of the header and the tag directory, and
//! [catalog] for the tags and data types abif understands.
//!

use std::io::Read;
use std::path::Path;

use indexmap::IndexMap;

pub mod assembly;
pub mod catalog;
pub mod chromatogram;
pub mod error;
pub mod grouped;
pub mod headers;
pub mod nucleotide;
pub mod record;
pub mod session;
pub mod visitor;

#[cfg(test)]
mod testutil;

pub use chromatogram::Chromatogram;
pub use error::{DecodeError, Result};
pub use visitor::ChromatogramVisitor;

use chromatogram::ChromatogramBuilder;
use session::{Ab1File, Ab1Session, Ab1Stream};

/// Decode an AB1 file from [Read](std::io::Read).
///
/// ## Usage
///
/// ```rust,no_run
/// use abif::decode_from_read;
/// use abif::nucleotide::format_sequence;
/// use std::fs::File;
///
/// let conn = File::open("trace.ab1").unwrap();
/// let chromatogram = decode_from_read(conn).unwrap();
///
/// println!("{}", format_sequence(&chromatogram.basecalls));
/// ```
pub fn decode_from_read<R: Read>(
    conn: R,
) -> Result<Chromatogram> {
    let mut builder = ChromatogramBuilder::new();
    Ab1Stream::new(conn).decode(&mut builder)?;
    Ok(builder.build())
}

/// Decode an AB1 file, optionally gzip compressed, from a path.
///
/// ## Usage
///
/// ```rust,no_run
/// use abif::decode_from_path;
///
/// let chromatogram = decode_from_path("trace.ab1.gz").unwrap();
/// let quality = chromatogram.quality();
///
/// assert_eq!(quality.len(), chromatogram.basecalls.len());
/// ```
pub fn decode_from_path<P: AsRef<Path>>(
    path: P,
) -> Result<Chromatogram> {
    let mut builder = ChromatogramBuilder::new();
    Ab1File::new(path).decode(&mut builder)?;
    Ok(builder.build())
}

/// Read the metadata block of an AB1 file from [Read](std::io::Read).
///
/// Channel order and base calls are not required.
///
/// ## Usage
///
/// ```rust
/// use abif::read_metadata;
/// use std::io::Cursor;
///
/// // Header: magic, version and a directory locator pointing at offset 34
/// let mut bytes: Vec<u8> = b"ABIF".to_vec();
/// bytes.extend_from_slice(&101_u16.to_be_bytes());
/// bytes.extend_from_slice(b"tdir");
/// bytes.extend_from_slice(&1_u32.to_be_bytes());
/// bytes.extend_from_slice(&1023_u16.to_be_bytes());
/// bytes.extend_from_slice(&28_u16.to_be_bytes());
/// bytes.extend_from_slice(&1_u32.to_be_bytes());  // entries
/// bytes.extend_from_slice(&28_u32.to_be_bytes());
/// bytes.extend_from_slice(&34_u32.to_be_bytes()); // directory offset
/// bytes.extend_from_slice(&0_u32.to_be_bytes());
///
/// // Sample name "abc" as a Pascal string stored in the entry itself
/// bytes.extend_from_slice(b"SMPL");
/// bytes.extend_from_slice(&1_u32.to_be_bytes());
/// bytes.extend_from_slice(&18_u16.to_be_bytes());
/// bytes.extend_from_slice(&1_u16.to_be_bytes());
/// bytes.extend_from_slice(&4_u32.to_be_bytes());
/// bytes.extend_from_slice(&4_u32.to_be_bytes());
/// bytes.extend_from_slice(b"\x03abc");
/// bytes.extend_from_slice(&0_u32.to_be_bytes());
///
/// let metadata = read_metadata(&mut Cursor::new(bytes)).unwrap();
///
/// assert_eq!(metadata["NAME"], "abc");
/// ```
pub fn read_metadata<R: Read>(
    conn: &mut R,
) -> Result<IndexMap<String, String>> {
    Ab1Session::read(conn)?.metadata()
}
