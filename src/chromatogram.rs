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

//! A chromatogram value and the visitor that builds it.

use indexmap::IndexMap;

use crate::nucleotide::{ChannelOrder, Channels, Nucleotide};
use crate::visitor::{Ab1ChromatogramVisitor, ChromatogramVisitor};

/// AB1-only fields of a [Chromatogram].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ab1Fields {
    pub channel_order: Option<ChannelOrder>,
    pub original_basecalls: Option<Vec<Nucleotide>>,
    pub scale_factors: Option<Channels<i16>>,
    pub photometric: [Vec<i16>; 4],
    pub gel_voltage: Vec<i16>,
    pub gel_current: Vec<i16>,
    pub electrophoretic_power: Vec<i16>,
    pub gel_temperature: Vec<i16>,
    pub original_peaks: Option<Vec<i16>>,
    pub original_confidence: Option<Channels<Vec<u8>>>,
}

/// A decoded trace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chromatogram {
    pub basecalls: Vec<Nucleotide>,
    pub traces: Channels<Vec<i16>>,
    pub peaks: Vec<i16>,
    pub confidence: Channels<Vec<u8>>,
    pub comments: IndexMap<String, String>,
    pub ab1: Ab1Fields,
}

impl Chromatogram {
    /// Sample name from the `NAME` comment.
    pub fn name(&self) -> Option<&str> {
        self.comments.get("NAME").map(|x| x.as_str())
    }

    /// Quality of each base call, read from the channel of its base.
    pub fn quality(&self) -> Vec<u8> {
        collapse(&self.basecalls, &self.confidence)
    }

    /// Like [quality](Self::quality) for the original base calls.
    pub fn original_quality(&self) -> Option<Vec<u8>> {
        let bases = self.ab1.original_basecalls.as_ref()?;
        let confidence = self.ab1.original_confidence.as_ref()?;
        Some(collapse(bases, confidence))
    }
}

fn collapse(bases: &[Nucleotide], confidence: &Channels<Vec<u8>>) -> Vec<u8> {
    bases.iter().enumerate()
        .map(|(i, base)| confidence.get(*base).get(i).copied().unwrap_or(0))
        .collect()
}

/// Collects visitor callbacks into a [Chromatogram].
#[derive(Debug, Default)]
pub struct ChromatogramBuilder {
    chromatogram: Chromatogram,
    finished: bool,
}

impl ChromatogramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once [visit_end](ChromatogramVisitor::visit_end) was called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn build(self) -> Chromatogram {
        self.chromatogram
    }
}

impl ChromatogramVisitor for ChromatogramBuilder {
    fn visit_basecalls(&mut self, bases: &[Nucleotide]) {
        self.chromatogram.basecalls = bases.to_vec();
    }

    fn visit_trace(&mut self, base: Nucleotide, positions: &[i16]) {
        *self.chromatogram.traces.get_mut(base) = positions.to_vec();
    }

    fn visit_peaks(&mut self, peaks: &[i16]) {
        self.chromatogram.peaks = peaks.to_vec();
    }

    fn visit_confidence(&mut self, base: Nucleotide, values: &[u8]) {
        *self.chromatogram.confidence.get_mut(base) = values.to_vec();
    }

    fn visit_comments(&mut self, comments: &IndexMap<String, String>) {
        self.chromatogram.comments = comments.clone();
    }

    fn visit_end(&mut self) {
        self.finished = true;
    }

    fn as_ab1(&mut self) -> Option<&mut dyn Ab1ChromatogramVisitor> {
        Some(self)
    }
}

impl Ab1ChromatogramVisitor for ChromatogramBuilder {
    fn visit_channel_order(&mut self, order: &ChannelOrder) {
        self.chromatogram.ab1.channel_order = Some(*order);
    }

    fn visit_original_basecalls(&mut self, bases: &[Nucleotide]) {
        self.chromatogram.ab1.original_basecalls = Some(bases.to_vec());
    }

    fn visit_scale_factors(&mut self, factors: &Channels<i16>) {
        self.chromatogram.ab1.scale_factors = Some(factors.clone());
    }

    fn visit_photometric_data(&mut self, filter: usize, data: &[i16]) {
        if let Some(slot) = self.chromatogram.ab1.photometric.get_mut(filter) {
            *slot = data.to_vec();
        }
    }

    fn visit_gel_voltage(&mut self, data: &[i16]) {
        self.chromatogram.ab1.gel_voltage = data.to_vec();
    }

    fn visit_gel_current(&mut self, data: &[i16]) {
        self.chromatogram.ab1.gel_current = data.to_vec();
    }

    fn visit_electrophoretic_power(&mut self, data: &[i16]) {
        self.chromatogram.ab1.electrophoretic_power = data.to_vec();
    }

    fn visit_gel_temperature(&mut self, data: &[i16]) {
        self.chromatogram.ab1.gel_temperature = data.to_vec();
    }

    fn visit_original_peaks(&mut self, peaks: &[i16]) {
        self.chromatogram.ab1.original_peaks = Some(peaks.to_vec());
    }

    fn visit_original_confidence(&mut self, base: Nucleotide, values: &[u8]) {
        let channels = self.chromatogram.ab1.original_confidence.get_or_insert_with(Channels::default);
        *channels.get_mut(base) = values.to_vec();
    }
}
