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

//! The legacy key/value metadata block.
//!
//! Keys and their order match the comment block written by the `io_lib`
//! tools, so both key spelling and order are fixed. Fields whose source
//! tags are absent are left out.
//!
//! | Key    | Source                       |
//! |--------|------------------------------|
//! | `NAME` | `SMPL`                       |
//! | `LANE` | `LANE`                       |
//! | `SIGN` | `S/N%`                       |
//! | `NOIS` | `NOIS`                       |
//! | `SPAC` | `Rate`, seconds per scan     |
//! | `SMRT` | `Rate`, scans per second     |
//! | `RUND` | `RUND` and `RUNT` 1 and 2    |
//! | `DATE` | `RUND` and `RUNT` 1 and 2    |
//! | `DYEP` | `PDMF`                       |
//! | `MACH` | `MCHN`                       |
//! | `MODL` | `MODL`                       |
//! | `VER1` | `SVER` 1                     |
//! | `VER2` | `SVER` 2                     |
//! | `COMM` | `CMNT`                       |
//! | `TUBE` | `TUBE`                       |
//! | `RMOD` | `RMdN`                       |
//! | `MTXF` | `MTXF`                       |
//! | `PROT` | `RPrN`                       |
//! | `PRTV` | `RPrV`                       |
//! | `LASR` | `LsrP`                       |
//! | `SCAN` | `Scan`                       |
//! | `LNTD` | `LNTD`                       |
//! | `ASPT` | `ASPt`                       |
//! | `AEPT` | `AEPt`                       |
//! | `NBAS` | original base calls          |
//! | `FWO_` | channel order                |

use chrono::NaiveDateTime;
use indexmap::IndexMap;

use crate::catalog::{DecodeCategory, TagName};
use crate::error::Result;
use crate::grouped::Selector;
use crate::nucleotide::{ChannelOrder, Channels, Nucleotide};
use crate::record::timestamp;

use super::traces::{noise, scale_factors};
use super::RecordLookup;

const TEXT_FIELDS: &[(&str, TagName)] = &[
    ("DYEP", TagName::DyePrimer),
    ("MACH", TagName::Machine),
    ("MODL", TagName::Model),
];

const MORE_TEXT_FIELDS: &[(&str, TagName)] = &[
    ("COMM", TagName::Comment),
    ("TUBE", TagName::Tube),
    ("RMOD", TagName::RunModule),
    ("MTXF", TagName::MatrixFile),
    ("PROT", TagName::RunProtocol),
    ("PRTV", TagName::RunProtocolVersion),
];

const INTEGER_FIELDS: &[(&str, TagName)] = &[
    ("LASR", TagName::LaserPower),
    ("SCAN", TagName::Scan),
    ("LNTD", TagName::LengthToDetector),
    ("ASPT", TagName::AnalysisStart),
    ("AEPT", TagName::AnalysisEnd),
];

fn format_channels<T, F: Fn(&T) -> String>(channels: &Channels<T>, f: F) -> String {
    channels.iter()
        .map(|(base, value)| format!("{}={}", base, f(value)))
        .collect::<Vec<String>>()
        .join(",")
}

/// Start and end of the run from `RUND` and `RUNT` numbers 1 and 2.
pub fn run_interval(lookup: &RecordLookup) -> Result<Option<(NaiveDateTime, NaiveDateTime)>> {
    let date = |n: u32| -> Result<_> {
        Ok(lookup.value(&[DecodeCategory::Date], TagName::RunDate, Selector::Number(n))?.and_then(|x| x.as_date()))
    };
    let time = |n: u32| -> Result<_> {
        Ok(lookup.value(&[DecodeCategory::Time], TagName::RunTime, Selector::Number(n))?.and_then(|x| x.as_time()))
    };
    match (date(1)?, time(1)?, date(2)?, time(2)?) {
        (Some(start_date), Some(start_time), Some(end_date), Some(end_time)) => {
            Ok(Some((timestamp(start_date, start_time), timestamp(end_date, end_time))))
        },
        _ => Ok(None),
    }
}

/// Builds the metadata block.
///
/// `order` is needed for `SIGN`, `NOIS` and `FWO_`; `original_bases` for
/// `NBAS`. Without them those keys are left out.
pub fn legacy_metadata(
    lookup: &RecordLookup,
    order: Option<&ChannelOrder>,
    original_bases: Option<&[Nucleotide]>,
) -> Result<IndexMap<String, String>> {
    let mut meta: IndexMap<String, String> = IndexMap::new();
    let mut put = |key: &str, value: String| {
        meta.insert(key.to_string(), value);
    };

    if let Some(name) = lookup.text(TagName::SampleName, Selector::Preferred)? {
        put("NAME", name);
    }
    if let Some(lane) = lookup.integer(TagName::Lane, Selector::Preferred)? {
        put("LANE", lane.to_string());
    }

    if let Some(order) = order {
        if let Some(signal) = scale_factors(lookup, order)? {
            put("SIGN", format_channels(&signal, |x| x.to_string()));
        }
        if let Some(noise) = noise(lookup, order)? {
            put("NOIS", format_channels(&noise, |x| format!("{:.6}", x)));
        }
    }

    if let Some(rate) = lookup.scan_rate()? {
        put("SPAC", format!("{:.4}", rate.spacing()));
        if let Some(hz) = rate.sampling_rate() {
            put("SMRT", format!("{:.2}", hz));
        }
    }

    if let Some((start, end)) = run_interval(lookup)? {
        put("RUND", format!("{} - {}", start.format("%Y%m%d.%H%M%S"), end.format("%Y%m%d.%H%M%S")));
        put("DATE", format!("{} to {}", start.format("%a %d %b %H:%M:%S %Y"), end.format("%a %d %b %H:%M:%S %Y")));
    }

    for (key, tag) in TEXT_FIELDS {
        if let Some(text) = lookup.text(*tag, Selector::Preferred)? {
            put(*key, text);
        }
    }
    for (key, number) in [("VER1", 1), ("VER2", 2)] {
        if let Some(text) = lookup.text(TagName::SoftwareVersion, Selector::Number(number))? {
            put(key, text);
        }
    }
    for (key, tag) in MORE_TEXT_FIELDS {
        if let Some(text) = lookup.text(*tag, Selector::Preferred)? {
            put(*key, text);
        }
    }
    for (key, tag) in INTEGER_FIELDS {
        if let Some(value) = lookup.integer(*tag, Selector::Preferred)? {
            put(*key, value.to_string());
        }
    }

    if let Some(bases) = original_bases {
        put("NBAS", bases.len().to_string());
    }
    if let Some(order) = order {
        put("FWO_", order.to_string());
    }

    log::debug!("Assembled {} metadata fields", meta.len());
    Ok(meta)
}

/// Renders the block as `KEY=value` lines.
pub fn format_legacy_block(meta: &IndexMap<String, String>) -> String {
    meta.iter().map(|(key, value)| format!("{}={}\n", key, value)).collect()
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn sample_file_metadata() {
        use super::legacy_metadata;
        use crate::assembly::RecordLookup;
        use crate::nucleotide::{parse_sequence, ChannelOrder};
        use crate::testutil::sample_file;

        let (records, block) = sample_file().index();
        let lookup = RecordLookup::new(&records, &block);
        let order = ChannelOrder::from_ascii(b"GTAC").unwrap();
        let bases = parse_sequence(b"ACGTA");

        let got = legacy_metadata(&lookup, Some(&order), Some(&bases)).unwrap();

        let keys: Vec<&str> = got.keys().map(|x| x.as_str()).collect();
        assert_eq!(keys, vec![
            "NAME", "LANE", "SIGN", "NOIS", "SPAC", "SMRT", "RUND", "DATE",
            "MACH", "VER1", "VER2", "LASR", "NBAS", "FWO_",
        ]);
        assert_eq!(got["NAME"], "sample-01");
        assert_eq!(got["LANE"], "7");
        assert_eq!(got["SIGN"], "A=300,C=400,G=100,T=200");
        assert_eq!(got["NOIS"], "A=3.500000,C=4.500000,G=1.500000,T=2.500000");
        assert_eq!(got["SPAC"], "0.2500");
        assert_eq!(got["SMRT"], "4.00");
        assert_eq!(got["RUND"], "20240305.091500 - 20240305.110230");
        assert_eq!(got["DATE"], "Tue 05 Mar 09:15:00 2024 to Tue 05 Mar 11:02:30 2024");
        assert_eq!(got["VER1"], "Data Collection 3.0");
        assert_eq!(got["VER2"], "KB 1.4.0");
        assert_eq!(got["LASR"], "25000");
        assert_eq!(got["NBAS"], "5");
        assert_eq!(got["FWO_"], "GTAC");
    }

    #[test]
    fn original_version_is_preferred() {
        use super::legacy_metadata;
        use crate::assembly::RecordLookup;
        use crate::testutil::SyntheticFile;

        let (records, block) = SyntheticFile::new()
            .pstring(b"SMPL", 1, "edited")
            .pstring(b"SMPL", 2, "as-called")
            .chars(b"CMNT", 1, b"run 4\0\0  ")
            .index();
        let got = legacy_metadata(&RecordLookup::new(&records, &block), None, None).unwrap();

        assert_eq!(got["NAME"], "as-called");
        assert_eq!(got["COMM"], "run 4");
        assert!(!got.contains_key("FWO_"));
        assert!(!got.contains_key("NBAS"));
    }

    #[test]
    fn inline_pascal_string_sample_name() {
        use super::legacy_metadata;
        use crate::assembly::RecordLookup;
        use crate::testutil::SyntheticFile;

        let (records, block) = SyntheticFile::new()
            .record(b"SMPL", 1, 18, 1, b"\x03abc".to_vec())
            .index();
        assert!(block.is_empty());

        let got = legacy_metadata(&RecordLookup::new(&records, &block), None, None).unwrap();

        assert_eq!(got.len(), 1);
        assert_eq!(got["NAME"], "abc");
    }

    #[test]
    fn zero_scan_period_has_no_sampling_rate() {
        use super::legacy_metadata;
        use crate::assembly::RecordLookup;
        use crate::testutil::SyntheticFile;

        let (records, block) = SyntheticFile::new().scan_rate(0, 0, 0).index();
        let got = legacy_metadata(&RecordLookup::new(&records, &block), None, None).unwrap();

        assert_eq!(got["SPAC"], "0.0000");
        assert!(!got.contains_key("SMRT"));
    }

    #[test]
    fn incomplete_run_interval_is_left_out() {
        use super::legacy_metadata;
        use crate::assembly::RecordLookup;
        use crate::testutil::SyntheticFile;

        let (records, block) = SyntheticFile::new()
            .date(1, 2024, 3, 5)
            .time(1, 9, 0, 0)
            .date(2, 2024, 3, 5)
            .index();
        let got = legacy_metadata(&RecordLookup::new(&records, &block), None, None).unwrap();

        assert!(!got.contains_key("RUND"));
        assert!(!got.contains_key("DATE"));
    }

    #[test]
    fn format_legacy_block_lines() {
        use super::format_legacy_block;
        use indexmap::IndexMap;

        let mut meta = IndexMap::new();
        meta.insert("NAME".to_string(), "abc".to_string());
        meta.insert("LANE".to_string(), "3".to_string());

        assert_eq!(format_legacy_block(&meta), "NAME=abc\nLANE=3\n");
    }
}
