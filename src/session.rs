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

//! Decode sessions and the sources they are read from.
//!
//! An [Ab1Session] holds everything read from one file: the header, the
//! buffered data block and the grouped tag directory. Sessions do not share
//! state and release the data block when dropped.
//!
//! Two sources create sessions:
//!
//!   - [Ab1Stream] wraps a single-use [Read]. Decoding consumes it, so a
//!     stream can not be decoded twice.
//!   - [Ab1File] wraps a path and opens a fresh reader for every decode.
//!     Gzip compressed files are decompressed on the fly.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use indexmap::IndexMap;

use crate::assembly::{assemble, channel_order, basecalls, Assembled, RecordLookup};
use crate::assembly::metadata::legacy_metadata;
use crate::error::{Cause, ErrorKind, Result};
use crate::grouped::GroupedRecords;
use crate::headers::directory::{read_dir_entry, RecordDescriptor};
use crate::headers::file::{read_file_header, FileHeader};
use crate::visitor::{dispatch, ChromatogramVisitor};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// One pass over an AB1 file.
#[derive(Debug, Clone)]
pub struct Ab1Session {
    header: FileHeader,
    block: Vec<u8>,
    records: GroupedRecords,
}

impl Ab1Session {
    /// Reads the header, the data block and the tag directory from `conn`.
    pub fn read<R: Read>(
        conn: &mut R,
    ) -> Result<Self> {
        let header = read_file_header(conn)?;
        let block_len = header.data_block_len()?;

        let mut block: Vec<u8> = Vec::new();
        conn.take(block_len as u64).read_to_end(&mut block)?;
        if block.len() < block_len {
            return Err(Cause::Truncated { context: "the data block" }.into())
        }

        let mut records = GroupedRecords::new();
        for _ in 0..header.entry_count() {
            let desc = RecordDescriptor::from(read_dir_entry(conn)?);
            log::debug!("{}{}: {} x {} bytes, type {:?}", desc.tag, desc.number, desc.element_count, desc.element_size, desc.data_type);
            records.add(desc);
        }
        log::info!("Read {} directory entries and a {} byte data block", records.len(), block.len());

        Ok(Ab1Session { header, block, records })
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn records(&self) -> &GroupedRecords {
        &self.records
    }

    pub fn block(&self) -> &[u8] {
        &self.block
    }

    pub fn into_parts(self) -> (GroupedRecords, Vec<u8>) {
        (self.records, self.block)
    }

    pub fn lookup(&self) -> RecordLookup {
        RecordLookup::new(&self.records, &self.block)
    }

    pub fn assemble(&self) -> Result<Assembled> {
        assemble(&self.records, &self.block)
    }

    /// The legacy metadata block without requiring the sequence tags.
    ///
    /// Channel order and original base calls are included when present. A
    /// missing or unusable `FWO_` leaves its keys out, any other decode error
    /// is returned.
    pub fn metadata(&self) -> Result<IndexMap<String, String>> {
        let lookup = self.lookup();
        let order = match channel_order(&lookup) {
            Ok(order) => Some(order),
            Err(err) if err.kind() == ErrorKind::Schema => {
                log::debug!("Metadata without channel order: {}", err);
                None
            },
            Err(err) => return Err(err),
        };
        let original = basecalls(&lookup, 2)?;
        legacy_metadata(&lookup, order.as_ref(), original.as_deref())
    }

    /// Assembles the fields and hands them to `visitor`.
    pub fn decode(&self, visitor: &mut dyn ChromatogramVisitor) -> Result<()> {
        let assembled = self.assemble()?;
        dispatch(&assembled, visitor);
        Ok(())
    }
}

/// A single-use byte stream holding one AB1 file.
pub struct Ab1Stream<R: Read> {
    conn: R,
}

impl<R: Read> Ab1Stream<R> {
    pub fn new(conn: R) -> Self {
        Ab1Stream { conn }
    }

    pub fn into_session(mut self) -> Result<Ab1Session> {
        Ab1Session::read(&mut self.conn)
    }

    pub fn decode(self, visitor: &mut dyn ChromatogramVisitor) -> Result<()> {
        self.into_session()?.decode(visitor)
    }
}

/// An AB1 file on disk, optionally gzip compressed.
#[derive(Debug, Clone)]
pub struct Ab1File {
    path: PathBuf,
}

impl Ab1File {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Ab1File { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens an independent reader, decompressing if the file is gzipped.
    pub fn open(&self) -> Result<Box<dyn Read>> {
        let mut conn = BufReader::new(File::open(&self.path)?);
        let is_gzip = conn.fill_buf()?.starts_with(&GZIP_MAGIC);
        if is_gzip {
            log::debug!("{} is gzip compressed", self.path.display());
            Ok(Box::new(MultiGzDecoder::new(conn)))
        } else {
            Ok(Box::new(conn))
        }
    }

    pub fn session(&self) -> Result<Ab1Session> {
        Ab1Session::read(&mut self.open()?)
    }

    pub fn decode(&self, visitor: &mut dyn ChromatogramVisitor) -> Result<()> {
        self.session()?.decode(visitor)
    }
}
