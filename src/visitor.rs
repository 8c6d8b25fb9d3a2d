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

//! Consumer callbacks for decoded chromatograms.
//!
//! [ChromatogramVisitor] is the contract shared with other trace formats.
//! Consumers that also want the AB1-only fields implement
//! [Ab1ChromatogramVisitor] and return themselves from
//! [ChromatogramVisitor::as_ab1].
//!
//! [dispatch] calls the visitor in this order, with `*` marking extension
//! callbacks:
//!
//!   1. channel order*
//!   2. base calls, then original base calls*
//!   3. scale factors*
//!   4. photometric data 0 to 3*, gel voltage*, gel current*,
//!      electrophoretic power*, gel temperature*
//!   5. traces A, C, G, T
//!   6. peaks, then original peaks*
//!   7. confidence A, C, G, T, then original confidence A, C, G, T*
//!   8. comments
//!   9. end
//!
//! Fields missing from the file are skipped.

use indexmap::IndexMap;

use crate::assembly::Assembled;
use crate::nucleotide::{ChannelOrder, Channels, Nucleotide};

pub trait ChromatogramVisitor {
    fn visit_basecalls(&mut self, bases: &[Nucleotide]);

    fn visit_trace(&mut self, base: Nucleotide, positions: &[i16]);

    fn visit_peaks(&mut self, peaks: &[i16]);

    fn visit_confidence(&mut self, base: Nucleotide, values: &[u8]);

    fn visit_comments(&mut self, comments: &IndexMap<String, String>);

    fn visit_end(&mut self) {}

    /// Returns the AB1 extension of this visitor, if it has one.
    fn as_ab1(&mut self) -> Option<&mut dyn Ab1ChromatogramVisitor> {
        None
    }
}

/// Callbacks for fields only AB1 files have.
pub trait Ab1ChromatogramVisitor {
    fn visit_channel_order(&mut self, order: &ChannelOrder);

    fn visit_original_basecalls(&mut self, bases: &[Nucleotide]);

    fn visit_scale_factors(&mut self, factors: &Channels<i16>);

    /// Raw data of optical filter `filter` (0 to 3).
    fn visit_photometric_data(&mut self, filter: usize, data: &[i16]);

    fn visit_gel_voltage(&mut self, data: &[i16]);

    fn visit_gel_current(&mut self, data: &[i16]);

    fn visit_electrophoretic_power(&mut self, data: &[i16]);

    fn visit_gel_temperature(&mut self, data: &[i16]);

    fn visit_original_peaks(&mut self, peaks: &[i16]);

    fn visit_original_confidence(&mut self, base: Nucleotide, values: &[u8]);
}

fn extension<F>(visitor: &mut dyn ChromatogramVisitor, extended: bool, f: F)
where
    F: FnOnce(&mut dyn Ab1ChromatogramVisitor),
{
    if extended {
        if let Some(ext) = visitor.as_ab1() {
            f(ext);
        }
    }
}

/// Hands `assembled` to `visitor` in the fixed callback order.
pub fn dispatch(
    assembled: &Assembled,
    visitor: &mut dyn ChromatogramVisitor,
) {
    let extended = visitor.as_ab1().is_some();
    log::debug!("Visitor {} AB1 extensions", if extended { "supports" } else { "does not support" });

    extension(visitor, extended, |ext| ext.visit_channel_order(&assembled.channel_order));

    visitor.visit_basecalls(&assembled.basecalls);
    if let Some(bases) = assembled.original_basecalls.as_ref() {
        extension(visitor, extended, |ext| ext.visit_original_basecalls(bases));
    }
    if let Some(factors) = assembled.scale_factors.as_ref() {
        extension(visitor, extended, |ext| ext.visit_scale_factors(factors));
    }

    let diagnostics = &assembled.diagnostics;
    extension(visitor, extended, |ext| {
        diagnostics.photometric.iter().enumerate().for_each(|(filter, data)| {
            if let Some(data) = data {
                ext.visit_photometric_data(filter, data);
            }
        });
        if let Some(data) = diagnostics.gel_voltage.as_ref() {
            ext.visit_gel_voltage(data);
        }
        if let Some(data) = diagnostics.gel_current.as_ref() {
            ext.visit_gel_current(data);
        }
        if let Some(data) = diagnostics.electrophoretic_power.as_ref() {
            ext.visit_electrophoretic_power(data);
        }
        if let Some(data) = diagnostics.gel_temperature.as_ref() {
            ext.visit_gel_temperature(data);
        }
    });

    if let Some(traces) = assembled.traces.as_ref() {
        traces.iter().for_each(|(base, positions)| visitor.visit_trace(base, positions));
    }

    if let Some(peaks) = assembled.peaks.as_ref() {
        visitor.visit_peaks(peaks);
    }
    if let Some(peaks) = assembled.original_peaks.as_ref() {
        extension(visitor, extended, |ext| ext.visit_original_peaks(peaks));
    }

    assembled.confidence.iter().for_each(|(base, values)| visitor.visit_confidence(base, values));
    if let Some(confidence) = assembled.original_confidence.as_ref() {
        extension(visitor, extended, |ext| {
            confidence.iter().for_each(|(base, values)| ext.visit_original_confidence(base, values));
        });
    }

    visitor.visit_comments(&assembled.metadata);
    visitor.visit_end();
}
