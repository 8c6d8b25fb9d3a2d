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

//! Per-channel quality values.
//!
//! AB1 files store one quality byte per called base. [demultiplex] spreads
//! them over four channel arrays of the same length: each byte goes to the
//! channel of its base call and the other three channels get a zero.

use crate::catalog::TagName;
use crate::error::Result;
use crate::grouped::Selector;
use crate::nucleotide::{Channels, Nucleotide};

use super::RecordLookup;

pub fn demultiplex(
    bases: &[Nucleotide],
    quality: &[u8],
) -> Channels<Vec<u8>> {
    let mut channels: Channels<Vec<u8>> = Channels {
        a: vec![0; bases.len()],
        c: vec![0; bases.len()],
        g: vec![0; bases.len()],
        t: vec![0; bases.len()],
    };
    bases.iter().enumerate().for_each(|(i, base)| {
        // Missing quality bytes stay 0.
        if let Some(value) = quality.get(i) {
            channels.get_mut(*base)[i] = *value;
        }
    });
    channels
}

/// Demultiplexed `PCON` values with tag number `number` for `bases`.
pub fn confidence(
    lookup: &RecordLookup,
    number: u32,
    bases: &[Nucleotide],
) -> Result<Channels<Vec<u8>>> {
    let selector = if number == 1 { Selector::Current } else { Selector::Original };
    let quality = lookup.chars(TagName::Confidence, selector)?.unwrap_or_default();
    if quality.len() != bases.len() {
        log::warn!("PCON{} has {} values for {} base calls", number, quality.len(), bases.len());
    }
    Ok(demultiplex(bases, quality))
}
