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

//! Nucleotide symbols and per-channel containers.
//!
//! The instrument records its four dye channels in filter-wheel order, which
//! is given by the `FWO_` tag and need not be A, C, G, T. [ChannelOrder]
//! turns wire-ordered quadruples into [Channels] keyed by nucleotide.

use std::fmt;

/// A base call symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nucleotide {
    A,
    C,
    G,
    T,
    R,
    Y,
    K,
    M,
    S,
    W,
    B,
    D,
    H,
    V,
    N,
    Gap,
}

impl Nucleotide {
    /// The four dye channels in canonical order.
    pub const CHANNELS: [Nucleotide; 4] = [Nucleotide::A, Nucleotide::C, Nucleotide::G, Nucleotide::T];

    /// Parses an IUPAC symbol, case insensitive. Anything unknown is N.
    pub fn from_ascii(byte: u8) -> Self {
        match byte.to_ascii_uppercase() {
            b'A' => Nucleotide::A,
            b'C' => Nucleotide::C,
            b'G' => Nucleotide::G,
            b'T' | b'U' => Nucleotide::T,
            b'R' => Nucleotide::R,
            b'Y' => Nucleotide::Y,
            b'K' => Nucleotide::K,
            b'M' => Nucleotide::M,
            b'S' => Nucleotide::S,
            b'W' => Nucleotide::W,
            b'B' => Nucleotide::B,
            b'D' => Nucleotide::D,
            b'H' => Nucleotide::H,
            b'V' => Nucleotide::V,
            b'-' | b'*' => Nucleotide::Gap,
            _ => Nucleotide::N,
        }
    }

    pub fn to_ascii(&self) -> u8 {
        match self {
            Nucleotide::A => b'A',
            Nucleotide::C => b'C',
            Nucleotide::G => b'G',
            Nucleotide::T => b'T',
            Nucleotide::R => b'R',
            Nucleotide::Y => b'Y',
            Nucleotide::K => b'K',
            Nucleotide::M => b'M',
            Nucleotide::S => b'S',
            Nucleotide::W => b'W',
            Nucleotide::B => b'B',
            Nucleotide::D => b'D',
            Nucleotide::H => b'H',
            Nucleotide::V => b'V',
            Nucleotide::N => b'N',
            Nucleotide::Gap => b'-',
        }
    }

    /// The dye channel a called base is reported in.
    ///
    /// A, C and G have their own channel; every other symbol falls to T.
    pub fn channel(&self) -> Nucleotide {
        match self {
            Nucleotide::A => Nucleotide::A,
            Nucleotide::C => Nucleotide::C,
            Nucleotide::G => Nucleotide::G,
            _ => Nucleotide::T,
        }
    }
}

impl fmt::Display for Nucleotide {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_ascii() as char)
    }
}

pub fn parse_sequence(bytes: &[u8]) -> Vec<Nucleotide> {
    bytes.iter().map(|byte| Nucleotide::from_ascii(*byte)).collect()
}

pub fn format_sequence(seq: &[Nucleotide]) -> String {
    seq.iter().map(|base| base.to_ascii() as char).collect()
}

/// One value per dye channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Channels<T> {
    pub a: T,
    pub c: T,
    pub g: T,
    pub t: T,
}

impl<T> Channels<T> {
    /// Value of the channel `base` is reported in, see [Nucleotide::channel].
    pub fn get(&self, base: Nucleotide) -> &T {
        match base.channel() {
            Nucleotide::A => &self.a,
            Nucleotide::C => &self.c,
            Nucleotide::G => &self.g,
            _ => &self.t,
        }
    }

    pub fn get_mut(&mut self, base: Nucleotide) -> &mut T {
        match base.channel() {
            Nucleotide::A => &mut self.a,
            Nucleotide::C => &mut self.c,
            Nucleotide::G => &mut self.g,
            _ => &mut self.t,
        }
    }

    /// Channels in A, C, G, T order.
    pub fn iter(&self) -> impl Iterator<Item = (Nucleotide, &T)> {
        Nucleotide::CHANNELS.into_iter().zip([&self.a, &self.c, &self.g, &self.t])
    }

    pub fn map<U, F: FnMut(T) -> U>(self, mut f: F) -> Channels<U> {
        Channels { a: f(self.a), c: f(self.c), g: f(self.g), t: f(self.t) }
    }
}

/// Physical channel order of the instrument, decoded from `FWO_`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelOrder([Nucleotide; 4]);

impl ChannelOrder {
    /// Returns None unless `symbols` is a permutation of ACGT.
    pub fn from_ascii(symbols: &[u8]) -> Option<Self> {
        if symbols.len() != 4 {
            return None
        }
        let mut order = [Nucleotide::N; 4];
        for (slot, byte) in order.iter_mut().zip(symbols) {
            *slot = Nucleotide::from_ascii(*byte);
        }
        let is_permutation = Nucleotide::CHANNELS.iter().all(|base| order.contains(base));
        if is_permutation {
            Some(ChannelOrder(order))
        } else {
            None
        }
    }

    pub fn bases(&self) -> [Nucleotide; 4] {
        self.0
    }

    /// Moves wire-ordered values to the channel of their nucleotide.
    pub fn remap<T>(&self, wire: [T; 4]) -> Channels<T> {
        let [w0, w1, w2, w3] = wire;
        let mut slots: Channels<Option<T>> = Channels { a: None, c: None, g: None, t: None };
        for (base, value) in self.0.into_iter().zip([w0, w1, w2, w3]) {
            *slots.get_mut(base) = Some(value);
        }
        match slots {
            Channels { a: Some(a), c: Some(c), g: Some(g), t: Some(t) } => Channels { a, c, g, t },
            _ => unreachable!("channel order is not a permutation"),
        }
    }
}

impl fmt::Display for ChannelOrder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.iter().try_for_each(|base| write!(f, "{}", base))
    }
}
