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

//! Closed catalogs of tag names and data types.
//!
//! Every directory entry names its field with a 4 character [TagName] and its
//! wire representation with a [DataType] code. The pair (data type, element
//! size) resolves to the [DecodeCategory] that decides both how the payload
//! is decoded and which group of the
//! [GroupedRecords](crate::grouped::GroupedRecords) the entry lands in.
//!
//! How repeated entries of one tag are told apart is recorded once in
//! [ACCESS_TABLE].

use std::fmt;

macro_rules! tag_names {
    ($( $(#[$doc:meta])* $variant:ident => $code:literal, )*) => {
        /// A 4 character tag name.
        ///
        /// Tags the decoder interprets get their own variant, everything else
        /// is kept verbatim in [TagName::Other].
        #[non_exhaustive]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum TagName {
            $( $(#[$doc])* $variant, )*
            Other([u8; 4]),
        }

        impl TagName {
            pub fn from_bytes(bytes: [u8; 4]) -> Self {
                match &bytes {
                    $( $code => TagName::$variant, )*
                    _ => TagName::Other(bytes),
                }
            }

            pub fn as_bytes(&self) -> [u8; 4] {
                match self {
                    $( TagName::$variant => *$code, )*
                    TagName::Other(bytes) => *bytes,
                }
            }
        }
    };
}

tag_names! {
    /// Analysis end scan point.
    AnalysisEnd => b"AEPt",
    /// Analysis start scan point.
    AnalysisStart => b"ASPt",
    /// Comment about the sample.
    Comment => b"CMNT",
    /// Container (plate) name.
    Container => b"CTNM",
    /// Trace data. Slots 1-4 raw, 5-8 gel diagnostics, 9-12 processed.
    Data => b"DATA",
    /// Dye set name.
    DyeSet => b"DySN",
    /// Filter wheel order.
    Fwo => b"FWO_",
    /// Gel type.
    GelType => b"GTyp",
    /// Lane or capillary number.
    Lane => b"LANE",
    /// Length to detector in cm.
    LengthToDetector => b"LNTD",
    /// Laser power.
    LaserPower => b"LsrP",
    /// Machine name.
    Machine => b"MCHN",
    /// Instrument model.
    Model => b"MODL",
    /// Matrix file name.
    MatrixFile => b"MTXF",
    /// Noise per channel.
    Noise => b"NOIS",
    /// Base calls.
    Basecalls => b"PBAS",
    /// Per base quality values.
    Confidence => b"PCON",
    /// Dye primer mobility file.
    DyePrimer => b"PDMF",
    /// Peak locations.
    PeakLocations => b"PLOC",
    /// Scan rate.
    Rate => b"Rate",
    /// Run module name.
    RunModule => b"RMdN",
    /// Run protocol name.
    RunProtocol => b"RPrN",
    /// Run protocol version.
    RunProtocolVersion => b"RPrV",
    /// Run date. 1 is the start, 2 the end of the run.
    RunDate => b"RUND",
    /// Run time. 1 is the start, 2 the end of the run.
    RunTime => b"RUNT",
    /// Signal strength per channel, used as the scale factors.
    SignalStrength => b"S/N%",
    /// Number of scans.
    Scan => b"Scan",
    /// Sample name.
    SampleName => b"SMPL",
    /// Average peak spacing.
    Spacing => b"SPAC",
    /// Software versions. 1 data collection, 2 base caller, 3 firmware.
    SoftwareVersion => b"SVER",
    /// Tube or well.
    Tube => b"TUBE",
    /// The directory entry embedded in the file header.
    Directory => b"tdir",
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let bytes = self.as_bytes();
        for byte in bytes {
            if byte.is_ascii_graphic() || byte == b' ' {
                write!(f, "{}", byte as char)?;
            } else {
                write!(f, "\\x{:02x}", byte)?;
            }
        }
        Ok(())
    }
}

/// Element type codes of the directory entries.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Byte,
    Char,
    Word,
    Short,
    Long,
    Rational,
    Float,
    Double,
    Date,
    Time,
    Thumb,
    Bool,
    Point,
    Rect,
    VPoint,
    VRect,
    PString,
    CString,
    Tag,
    /// Codes 1024 and up.
    User(u16),
    Unknown(u16),
}

impl DataType {
    pub fn from_u16(val: u16) -> Self {
        match val {
            1 => DataType::Byte,
            2 => DataType::Char,
            3 => DataType::Word,
            4 => DataType::Short,
            5 => DataType::Long,
            6 => DataType::Rational,
            7 => DataType::Float,
            8 => DataType::Double,
            10 => DataType::Date,
            11 => DataType::Time,
            12 => DataType::Thumb,
            13 => DataType::Bool,
            14 => DataType::Point,
            15 => DataType::Rect,
            16 => DataType::VPoint,
            17 => DataType::VRect,
            18 => DataType::PString,
            19 => DataType::CString,
            20 => DataType::Tag,
            1024..=u16::MAX => DataType::User(val),
            _ => DataType::Unknown(val),
        }
    }

    pub fn to_u16(&self) -> u16 {
        match self {
            DataType::Byte => 1,
            DataType::Char => 2,
            DataType::Word => 3,
            DataType::Short => 4,
            DataType::Long => 5,
            DataType::Rational => 6,
            DataType::Float => 7,
            DataType::Double => 8,
            DataType::Date => 10,
            DataType::Time => 11,
            DataType::Thumb => 12,
            DataType::Bool => 13,
            DataType::Point => 14,
            DataType::Rect => 15,
            DataType::VPoint => 16,
            DataType::VRect => 17,
            DataType::PString => 18,
            DataType::CString => 19,
            DataType::Tag => 20,
            DataType::User(val) | DataType::Unknown(val) => *val,
        }
    }
}

/// How a record's payload is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DecodeCategory {
    Date,
    Time,
    FloatArray,
    ShortArray,
    IntArray,
    PascalString,
    UserDefined,
    AsciiString,
    ByteArray,
}

impl DecodeCategory {
    /// Resolves the category of a directory entry.
    ///
    /// Integer types with 2 byte elements are short arrays regardless of
    /// whether the code says word, short or long.
    pub fn resolve(data_type: DataType, element_size: u16) -> Self {
        match data_type {
            DataType::Date => DecodeCategory::Date,
            DataType::Time => DecodeCategory::Time,
            DataType::Float => DecodeCategory::FloatArray,
            DataType::Word | DataType::Short | DataType::Long => {
                if element_size == 2 {
                    DecodeCategory::ShortArray
                } else {
                    DecodeCategory::IntArray
                }
            },
            DataType::PString => DecodeCategory::PascalString,
            DataType::User(_) => DecodeCategory::UserDefined,
            DataType::Char | DataType::CString => DecodeCategory::AsciiString,
            _ => DecodeCategory::ByteArray,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, DecodeCategory::PascalString | DecodeCategory::AsciiString)
    }
}

/// How the entries sharing a tag name are told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Tag number 1 is the current (edited) value, 2 the original one.
    Versioned,
    /// Entries are addressed by their position in the directory.
    Positional,
    /// The tag number is a role index, e.g. run start and run end.
    Numbered,
}

/// Tags that are not [Access::Versioned].
pub const ACCESS_TABLE: &[(TagName, Access)] = &[
    (TagName::Data, Access::Positional),
    (TagName::SoftwareVersion, Access::Numbered),
    (TagName::RunDate, Access::Numbered),
    (TagName::RunTime, Access::Numbered),
];

pub fn access(tag: TagName) -> Access {
    ACCESS_TABLE
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, access)| *access)
        .unwrap_or(Access::Versioned)
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn tag_names_round_trip_through_bytes() {
        use super::TagName;

        assert_eq!(TagName::from_bytes(*b"PBAS"), TagName::Basecalls);
        assert_eq!(TagName::from_bytes(*b"S/N%"), TagName::SignalStrength);
        assert_eq!(TagName::from_bytes(*b"XYZ1"), TagName::Other(*b"XYZ1"));
        assert_eq!(TagName::Fwo.as_bytes(), *b"FWO_");
        assert_eq!(TagName::Other(*b"XYZ1").to_string(), "XYZ1");
    }

    #[test]
    fn unprintable_tag_names_are_escaped() {
        use super::TagName;

        assert_eq!(TagName::from_bytes([b'A', 0, b'B', 1]).to_string(), "A\\x00B\\x01");
    }

    #[test]
    fn integer_categories_depend_on_element_size() {
        use super::{DataType, DecodeCategory};

        assert_eq!(DecodeCategory::resolve(DataType::Short, 2), DecodeCategory::ShortArray);
        assert_eq!(DecodeCategory::resolve(DataType::Long, 2), DecodeCategory::ShortArray);
        assert_eq!(DecodeCategory::resolve(DataType::Long, 4), DecodeCategory::IntArray);
        assert_eq!(DecodeCategory::resolve(DataType::Word, 4), DecodeCategory::IntArray);
    }

    #[test]
    fn remaining_categories() {
        use super::{DataType, DecodeCategory};

        assert_eq!(DecodeCategory::resolve(DataType::from_u16(10), 4), DecodeCategory::Date);
        assert_eq!(DecodeCategory::resolve(DataType::from_u16(11), 4), DecodeCategory::Time);
        assert_eq!(DecodeCategory::resolve(DataType::from_u16(7), 4), DecodeCategory::FloatArray);
        assert_eq!(DecodeCategory::resolve(DataType::from_u16(18), 1), DecodeCategory::PascalString);
        assert_eq!(DecodeCategory::resolve(DataType::from_u16(2), 1), DecodeCategory::AsciiString);
        assert_eq!(DecodeCategory::resolve(DataType::from_u16(19), 1), DecodeCategory::AsciiString);
        assert_eq!(DecodeCategory::resolve(DataType::from_u16(1024), 1), DecodeCategory::UserDefined);
        assert_eq!(DecodeCategory::resolve(DataType::from_u16(1), 1), DecodeCategory::ByteArray);
        assert_eq!(DecodeCategory::resolve(DataType::from_u16(8), 8), DecodeCategory::ByteArray);
        assert_eq!(DecodeCategory::resolve(DataType::from_u16(9), 1), DecodeCategory::ByteArray);
    }

    #[test]
    fn data_type_codes_round_trip() {
        use super::DataType;

        for code in [1_u16, 2, 4, 5, 7, 10, 11, 18, 19, 1024, 1030, 9, 99] {
            assert_eq!(DataType::from_u16(code).to_u16(), code);
        }
    }

    #[test]
    fn access_table_lookup() {
        use super::{access, Access, TagName};

        assert_eq!(access(TagName::Data), Access::Positional);
        assert_eq!(access(TagName::RunDate), Access::Numbered);
        assert_eq!(access(TagName::SoftwareVersion), Access::Numbered);
        assert_eq!(access(TagName::Basecalls), Access::Versioned);
        assert_eq!(access(TagName::Other(*b"ABCD")), Access::Versioned);
    }
}
