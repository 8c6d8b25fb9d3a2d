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

//! Writes small synthetic AB1 files for tests.

use crate::grouped::GroupedRecords;
use crate::headers::directory::{encode_dir_entry, DirEntry, DIR_ENTRY_SIZE};
use crate::headers::file::{encode_file_header, FileHeader, HEADER_SIZE};
use crate::session::Ab1Session;

struct SyntheticRecord {
    tag: [u8; 4],
    number: u32,
    element_type: u16,
    element_size: u16,
    payload: Vec<u8>,
}

#[derive(Default)]
pub struct SyntheticFile {
    records: Vec<SyntheticRecord>,
}

impl SyntheticFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(mut self, tag: &[u8; 4], number: u32, element_type: u16, element_size: u16, payload: Vec<u8>) -> Self {
        self.records.push(SyntheticRecord { tag: *tag, number, element_type, element_size, payload });
        self
    }

    pub fn pstring(self, tag: &[u8; 4], number: u32, text: &str) -> Self {
        let mut payload = vec![text.len() as u8];
        payload.extend_from_slice(text.as_bytes());
        self.record(tag, number, 18, 1, payload)
    }

    pub fn chars(self, tag: &[u8; 4], number: u32, text: &[u8]) -> Self {
        self.record(tag, number, 2, 1, text.to_vec())
    }

    pub fn shorts(self, tag: &[u8; 4], number: u32, values: &[i16]) -> Self {
        let payload = values.iter().flat_map(|x| x.to_be_bytes()).collect();
        self.record(tag, number, 4, 2, payload)
    }

    pub fn ints(self, tag: &[u8; 4], number: u32, values: &[i32]) -> Self {
        let payload = values.iter().flat_map(|x| x.to_be_bytes()).collect();
        self.record(tag, number, 5, 4, payload)
    }

    pub fn floats(self, tag: &[u8; 4], number: u32, values: &[f32]) -> Self {
        let payload = values.iter().flat_map(|x| x.to_be_bytes()).collect();
        self.record(tag, number, 7, 4, payload)
    }

    pub fn date(self, number: u32, year: i16, month: u8, day: u8) -> Self {
        let mut payload = year.to_be_bytes().to_vec();
        payload.extend_from_slice(&[month, day]);
        self.record(b"RUND", number, 10, 4, payload)
    }

    pub fn time(self, number: u32, hour: u8, minute: u8, second: u8) -> Self {
        self.record(b"RUNT", number, 11, 4, vec![hour, minute, second, 0])
    }

    pub fn scan_rate(self, scan_period: u32, first: u32, last: u32) -> Self {
        let payload = [scan_period, first, last].iter().flat_map(|x| x.to_be_bytes()).collect();
        self.record(b"Rate", 1, 1024, 12, payload)
    }

    /// Data block first, then the directory. Payloads of at most 4 bytes are
    /// stored right-justified in the entry.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut block: Vec<u8> = Vec::new();
        let mut entries: Vec<DirEntry> = Vec::with_capacity(self.records.len());

        for record in self.records.iter() {
            let len = record.payload.len();
            let mut data_field = [0_u8; 4];
            if len <= 4 {
                data_field[(4 - len)..].copy_from_slice(&record.payload);
            } else {
                data_field = ((HEADER_SIZE + block.len()) as u32).to_be_bytes();
                block.extend_from_slice(&record.payload);
            }
            entries.push(DirEntry {
                name: record.tag,
                number: record.number,
                element_type: record.element_type,
                element_size: record.element_size,
                num_elements: (len / record.element_size as usize) as u32,
                data_size: len as u32,
                data_field,
                spare: 0,
            });
        }

        let header = FileHeader {
            version: 101,
            directory: DirEntry {
                name: *b"tdir",
                number: 1,
                element_type: 1023,
                element_size: DIR_ENTRY_SIZE as u16,
                num_elements: entries.len() as u32,
                data_size: (entries.len() * DIR_ENTRY_SIZE) as u32,
                data_field: ((HEADER_SIZE + block.len()) as u32).to_be_bytes(),
                spare: 0,
            },
        };

        let mut bytes = encode_file_header(&header);
        bytes.extend_from_slice(&block);
        entries.iter().for_each(|entry| bytes.extend(encode_dir_entry(entry)));
        bytes
    }

    pub fn session(&self) -> Ab1Session {
        Ab1Session::read(&mut std::io::Cursor::new(self.to_bytes())).unwrap()
    }

    /// Grouping index and data block of the file.
    pub fn index(&self) -> (GroupedRecords, Vec<u8>) {
        self.session().into_parts()
    }
}

/// A file with every tag the assembly reads, channels in GTAC order.
pub fn sample_file() -> SyntheticFile {
    let mut file = SyntheticFile::new()
        .pstring(b"SMPL", 1, "sample-01")
        .chars(b"FWO_", 1, b"GTAC")
        .chars(b"PBAS", 1, b"ACGTN")
        .chars(b"PBAS", 2, b"ACGTA")
        .record(b"PCON", 1, 2, 1, vec![10, 20, 30, 40, 50])
        .record(b"PCON", 2, 2, 1, vec![11, 21, 31, 41, 51])
        .shorts(b"PLOC", 1, &[3, 9, 15, 21, 27])
        .shorts(b"PLOC", 2, &[4, 10, 16, 22, 28])
        .shorts(b"S/N%", 1, &[100, 200, 300, 400])
        .floats(b"NOIS", 1, &[1.5, 2.5, 3.5, 4.5])
        .shorts(b"LANE", 1, &[7])
        .scan_rate(250, 0, 8000)
        .date(1, 2024, 3, 5)
        .date(2, 2024, 3, 5)
        .time(1, 9, 15, 0)
        .time(2, 11, 2, 30)
        .pstring(b"MCHN", 1, "3730xl")
        .pstring(b"SVER", 1, "Data Collection 3.0")
        .pstring(b"SVER", 2, "KB 1.4.0")
        .pstring(b"SVER", 3, "Ignored")
        .ints(b"LsrP", 1, &[25000]);

    for slot in 1..=12_i16 {
        file = file.shorts(b"DATA", slot as u32, &[slot, slot * 10, slot * 100]);
    }
    file
}
