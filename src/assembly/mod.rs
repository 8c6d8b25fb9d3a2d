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

//! Turns the grouped tag directory into chromatogram fields.
//!
//! Every step is a function of the [GroupedRecords] and the data block only.
//! [assemble] runs all of them and fails if the channel order or the base
//! calls are missing; the [metadata] block can also be built on its own.
//!
//! ## Tags read
//!
//! | Field              | Tag                   | Lookup                      |
//! |--------------------|-----------------------|-----------------------------|
//! | channel order      | `FWO_`                | preferred                   |
//! | base calls         | `PBAS`                | 1, falling back to 2        |
//! | original calls     | `PBAS`                | 2                           |
//! | quality            | `PCON`                | same number as the calls    |
//! | peaks              | `PLOC`                | 1 and 2                     |
//! | traces             | `DATA`                | slots 0 to 11               |
//! | scale factors      | `S/N%`                | preferred                   |
//! | noise              | `NOIS`                | preferred                   |

use indexmap::IndexMap;

use crate::catalog::{DecodeCategory, TagName};
use crate::error::{Cause, Result};
use crate::grouped::{GroupedRecords, Selector};
use crate::nucleotide::{parse_sequence, ChannelOrder, Channels, Nucleotide};
use crate::record::{decode, ScanRate, TaggedValue};

pub mod metadata;
pub mod quality;
pub mod traces;

const TEXT: &[DecodeCategory] = &[DecodeCategory::PascalString, DecodeCategory::AsciiString];
const CHARS: &[DecodeCategory] = &[DecodeCategory::AsciiString, DecodeCategory::ByteArray];
const INTEGERS: &[DecodeCategory] = &[DecodeCategory::ShortArray, DecodeCategory::IntArray];

/// Decoding lookups over one file's index and data block.
#[derive(Debug, Clone, Copy)]
pub struct RecordLookup<'a> {
    records: &'a GroupedRecords,
    block: &'a [u8],
}

impl<'a> RecordLookup<'a> {
    pub fn new(records: &'a GroupedRecords, block: &'a [u8]) -> Self {
        RecordLookup { records, block }
    }

    pub fn records(&self) -> &'a GroupedRecords {
        self.records
    }

    /// Decodes the selected entry of `tag`, trying each category in turn.
    pub fn value(
        &self,
        categories: &[DecodeCategory],
        tag: TagName,
        selector: Selector,
    ) -> Result<Option<TaggedValue<'a>>> {
        let records: &'a GroupedRecords = self.records;
        match records.select_in(categories, tag, selector) {
            Some(desc) => Ok(Some(decode(desc, self.block)?)),
            None => Ok(None),
        }
    }

    /// Trimmed text of a Pascal string or character record.
    pub fn text(&self, tag: TagName, selector: Selector) -> Result<Option<String>> {
        let value = self.value(TEXT, tag, selector)?;
        Ok(value.and_then(|x| x.as_text()).map(|x| x.to_string()))
    }

    /// Untrimmed bytes of a character or byte record.
    pub fn chars(&self, tag: TagName, selector: Selector) -> Result<Option<&'a [u8]>> {
        let value = self.value(CHARS, tag, selector)?;
        Ok(value.and_then(|x| x.as_bytes()))
    }

    pub fn integer(&self, tag: TagName, selector: Selector) -> Result<Option<i64>> {
        let value = self.value(INTEGERS, tag, selector)?;
        Ok(value.and_then(|x| x.first_integer()))
    }

    pub fn shorts(&self, tag: TagName, selector: Selector) -> Result<Option<Vec<i16>>> {
        match self.value(&[DecodeCategory::ShortArray], tag, selector)? {
            Some(TaggedValue::Shorts(values)) => Ok(Some(values)),
            _ => Ok(None),
        }
    }

    pub fn floats(&self, tag: TagName, selector: Selector) -> Result<Option<Vec<f32>>> {
        match self.value(&[DecodeCategory::FloatArray], tag, selector)? {
            Some(TaggedValue::Floats(values)) => Ok(Some(values)),
            _ => Ok(None),
        }
    }

    pub fn scan_rate(&self) -> Result<Option<ScanRate>> {
        let value = self.value(&[DecodeCategory::UserDefined], TagName::Rate, Selector::Preferred)?;
        Ok(value.and_then(|x| x.as_scan_rate()))
    }
}

/// Everything [dispatch](crate::visitor::dispatch) hands to a visitor.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembled {
    pub channel_order: ChannelOrder,
    pub basecalls: Vec<Nucleotide>,
    pub original_basecalls: Option<Vec<Nucleotide>>,
    pub scale_factors: Option<Channels<i16>>,
    pub noise: Option<Channels<f32>>,
    pub diagnostics: traces::DiagnosticTraces,
    pub traces: Option<Channels<Vec<i16>>>,
    pub peaks: Option<Vec<i16>>,
    pub original_peaks: Option<Vec<i16>>,
    pub confidence: Channels<Vec<u8>>,
    pub original_confidence: Option<Channels<Vec<u8>>>,
    pub metadata: IndexMap<String, String>,
}

/// Reads the filter-wheel order from `FWO_`.
pub fn channel_order(lookup: &RecordLookup) -> Result<ChannelOrder> {
    let symbols = lookup.chars(TagName::Fwo, Selector::Preferred)?
        .ok_or(Cause::MissingTag { tag: TagName::Fwo })?;
    ChannelOrder::from_ascii(symbols).ok_or_else(|| {
        Cause::InvalidChannelOrder(String::from_utf8_lossy(symbols).into_owned()).into()
    })
}

/// Base calls stored under `PBAS` with tag number `number`.
pub fn basecalls(lookup: &RecordLookup, number: u32) -> Result<Option<Vec<Nucleotide>>> {
    let selector = if number == 1 { Selector::Current } else { Selector::Original };
    let value = lookup.value(
        &[DecodeCategory::AsciiString, DecodeCategory::PascalString],
        TagName::Basecalls,
        selector,
    )?;
    Ok(value.and_then(|x| x.as_text()).map(|x| parse_sequence(x)))
}

/// Runs every assembly step.
pub fn assemble(
    records: &GroupedRecords,
    block: &[u8],
) -> Result<Assembled> {
    let lookup = RecordLookup::new(records, block);

    let channel_order = channel_order(&lookup)?;
    log::debug!("Channel order {}", channel_order);

    let original_basecalls = basecalls(&lookup, 2)?;
    let (basecalls, number) = match basecalls(&lookup, 1)? {
        Some(bases) => (bases, 1),
        None => {
            let bases = original_basecalls.clone().ok_or(Cause::MissingTag { tag: TagName::Basecalls })?;
            log::debug!("No current base calls, using the original ones");
            (bases, 2)
        },
    };
    log::debug!("Read {} base calls", basecalls.len());

    let confidence = quality::confidence(&lookup, number, &basecalls)?;
    let original_confidence = match original_basecalls.as_ref() {
        Some(bases) => Some(quality::confidence(&lookup, 2, bases)?),
        None => None,
    };

    let metadata = metadata::legacy_metadata(&lookup, Some(&channel_order), original_basecalls.as_deref())?;

    Ok(Assembled {
        scale_factors: traces::scale_factors(&lookup, &channel_order)?,
        noise: traces::noise(&lookup, &channel_order)?,
        diagnostics: traces::diagnostic_traces(&lookup)?,
        traces: traces::processed_traces(&lookup, &channel_order)?,
        peaks: lookup.shorts(TagName::PeakLocations, Selector::Current)?,
        original_peaks: lookup.shorts(TagName::PeakLocations, Selector::Original)?,
        channel_order,
        basecalls,
        original_basecalls,
        confidence,
        original_confidence,
        metadata,
    })
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn assemble_sample_file() {
        use super::assemble;
        use crate::nucleotide::{format_sequence, Nucleotide};
        use crate::testutil::sample_file;

        let (records, block) = sample_file().index();
        let got = assemble(&records, &block).unwrap();

        assert_eq!(got.channel_order.to_string(), "GTAC");
        assert_eq!(format_sequence(&got.basecalls), "ACGTN");
        assert_eq!(format_sequence(got.original_basecalls.as_ref().unwrap()), "ACGTA");
        assert_eq!(got.peaks.unwrap(), vec![3, 9, 15, 21, 27]);
        assert_eq!(got.original_peaks.unwrap(), vec![4, 10, 16, 22, 28]);
        assert_eq!(got.confidence.a, vec![10, 0, 0, 0, 0]);
        assert_eq!(got.confidence.t, vec![0, 0, 0, 40, 50]);
        assert_eq!(got.original_confidence.unwrap().a, vec![11, 0, 0, 0, 51]);
        assert_eq!(*got.scale_factors.unwrap().get(Nucleotide::G), 100);
        assert_eq!(got.metadata["NBAS"], "5");
    }

    #[test]
    fn missing_channel_order_is_a_schema_error() {
        use super::assemble;
        use crate::catalog::TagName;
        use crate::error::{Cause, ErrorKind};
        use crate::testutil::SyntheticFile;

        let (records, block) = SyntheticFile::new().chars(b"PBAS", 1, b"ACGT").index();
        let got = assemble(&records, &block).unwrap_err();

        assert_eq!(got.kind(), ErrorKind::Schema);
        assert!(matches!(got.cause(), Cause::MissingTag { tag: TagName::Fwo }));
    }

    #[test]
    fn invalid_channel_order_is_a_schema_error() {
        use super::assemble;
        use crate::error::{Cause, ErrorKind};
        use crate::testutil::SyntheticFile;

        let (records, block) = SyntheticFile::new()
            .chars(b"FWO_", 1, b"GGAC")
            .chars(b"PBAS", 1, b"ACGT")
            .index();
        let got = assemble(&records, &block).unwrap_err();

        assert_eq!(got.kind(), ErrorKind::Schema);
        assert!(matches!(got.cause(), Cause::InvalidChannelOrder(order) if order == "GGAC"));
    }

    #[test]
    fn missing_basecalls_is_a_schema_error() {
        use super::assemble;
        use crate::catalog::TagName;
        use crate::error::Cause;
        use crate::testutil::SyntheticFile;

        let (records, block) = SyntheticFile::new().chars(b"FWO_", 1, b"ACGT").index();
        let got = assemble(&records, &block).unwrap_err();

        assert!(matches!(got.cause(), Cause::MissingTag { tag: TagName::Basecalls }));
    }

    #[test]
    fn original_basecalls_stand_in_for_current() {
        use super::assemble;
        use crate::nucleotide::format_sequence;
        use crate::testutil::SyntheticFile;

        let (records, block) = SyntheticFile::new()
            .chars(b"FWO_", 1, b"ACGT")
            .chars(b"PBAS", 2, b"GATTACA")
            .record(b"PCON", 2, 2, 1, vec![5, 6, 7, 8, 9, 10, 11])
            .index();
        let got = assemble(&records, &block).unwrap();

        assert_eq!(format_sequence(&got.basecalls), "GATTACA");
        assert_eq!(got.confidence.g, vec![5, 0, 0, 0, 0, 0, 0]);
        assert!(got.peaks.is_none());
        assert!(got.traces.is_none());
    }

    #[test]
    fn pascal_string_basecalls_are_accepted() {
        use super::assemble;
        use crate::nucleotide::format_sequence;
        use crate::testutil::SyntheticFile;

        let (records, block) = SyntheticFile::new()
            .chars(b"FWO_", 1, b"ACGT")
            .pstring(b"PBAS", 1, "CCGGA")
            .index();
        let got = assemble(&records, &block).unwrap();

        assert_eq!(format_sequence(&got.basecalls), "CCGGA");
        assert_eq!(got.confidence.c, vec![0, 0, 0, 0, 0]);
    }

    #[test]
    fn corrupt_record_aborts_assembly() {
        use super::assemble;
        use crate::error::ErrorKind;
        use crate::testutil::SyntheticFile;

        let (records, block) = SyntheticFile::new()
            .chars(b"FWO_", 1, b"ACGT")
            .chars(b"PBAS", 1, b"ACGT")
            .record(b"LANE", 1, 4, 2, vec![0, 1, 0])
            .index();
        let got = assemble(&records, &block).unwrap_err();

        assert_eq!(got.kind(), ErrorKind::Format);
    }
}
