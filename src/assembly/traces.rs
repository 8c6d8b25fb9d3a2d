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

//! Channel data from the 12 `DATA` slots and the per-channel quadruples.
//!
//! `DATA` entries are read by position:
//!
//! | Slot  | Contents                                           |
//! |-------|----------------------------------------------------|
//! | 0-3   | raw photometric data, one per optical filter       |
//! | 4     | gel voltage                                        |
//! | 5     | gel current                                        |
//! | 6     | electrophoretic power                              |
//! | 7     | gel temperature                                    |
//! | 8-11  | processed traces in filter-wheel order             |

use crate::catalog::TagName;
use crate::error::Result;
use crate::grouped::Selector;
use crate::nucleotide::{ChannelOrder, Channels};

use super::RecordLookup;

/// Instrument diagnostic channels, `None` where the slot is absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagnosticTraces {
    pub photometric: [Option<Vec<i16>>; 4],
    pub gel_voltage: Option<Vec<i16>>,
    pub gel_current: Option<Vec<i16>>,
    pub electrophoretic_power: Option<Vec<i16>>,
    pub gel_temperature: Option<Vec<i16>>,
}

fn slot(
    lookup: &RecordLookup,
    i: usize,
) -> Result<Option<Vec<i16>>> {
    let data = lookup.shorts(TagName::Data, Selector::Slot(i))?;
    if data.is_none() {
        log::warn!("DATA slot {} is missing", i);
    }
    Ok(data)
}

pub fn diagnostic_traces(
    lookup: &RecordLookup,
) -> Result<DiagnosticTraces> {
    Ok(DiagnosticTraces {
        photometric: [slot(lookup, 0)?, slot(lookup, 1)?, slot(lookup, 2)?, slot(lookup, 3)?],
        gel_voltage: slot(lookup, 4)?,
        gel_current: slot(lookup, 5)?,
        electrophoretic_power: slot(lookup, 6)?,
        gel_temperature: slot(lookup, 7)?,
    })
}

/// Slots 8 to 11 moved to A, C, G, T order. None unless all four exist.
pub fn processed_traces(
    lookup: &RecordLookup,
    order: &ChannelOrder,
) -> Result<Option<Channels<Vec<i16>>>> {
    let wire = [slot(lookup, 8)?, slot(lookup, 9)?, slot(lookup, 10)?, slot(lookup, 11)?];
    match wire {
        [Some(w0), Some(w1), Some(w2), Some(w3)] => Ok(Some(order.remap([w0, w1, w2, w3]))),
        _ => Ok(None),
    }
}

/// Remaps a filter-wheel ordered quadruple. None unless there are exactly 4 values.
pub fn remap_quadruple<T: Copy>(
    order: &ChannelOrder,
    values: &[T],
) -> Option<Channels<T>> {
    match values {
        [w0, w1, w2, w3] => Some(order.remap([*w0, *w1, *w2, *w3])),
        _ => None,
    }
}

/// Signal strength per channel from `S/N%`.
pub fn scale_factors(
    lookup: &RecordLookup,
    order: &ChannelOrder,
) -> Result<Option<Channels<i16>>> {
    let values = lookup.shorts(TagName::SignalStrength, Selector::Preferred)?;
    Ok(values.and_then(|x| remap_quadruple(order, &x)))
}

/// Noise per channel from `NOIS`.
pub fn noise(
    lookup: &RecordLookup,
    order: &ChannelOrder,
) -> Result<Option<Channels<f32>>> {
    let values = lookup.floats(TagName::Noise, Selector::Preferred)?;
    Ok(values.and_then(|x| remap_quadruple(order, &x)))
}
