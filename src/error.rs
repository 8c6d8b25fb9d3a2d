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

//! The single failure type returned by every decode entry point.
//!
//! All failures surface as [DecodeError], which wraps the low-level [Cause].
//! Callers that only care whether the file could be decoded can treat any
//! [DecodeError] alike; [Cause::kind] classifies the cause for diagnostics.

use thiserror::Error;

use crate::catalog::TagName;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Broad classification of a [Cause].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad magic number, truncated input or a malformed fixed-width field.
    Format,
    /// A record points outside the buffered data block.
    Bounds,
    /// A tag required by field assembly is missing or unusable.
    Schema,
}

/// The low-level reason a decode failed.
#[derive(Debug, Error)]
pub enum Cause {
    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    #[error("input ended before {context} could be read")]
    Truncated {
        context: &'static str,
    },

    #[error("expected magic number ABIF, found {found:?}")]
    BadMagic {
        found: [u8; 4],
    },

    #[error("malformed header: {0}")]
    HeaderEncoding(#[from] bincode::error::DecodeError),

    #[error("tag directory offset {offset} lies inside the {header_size} byte header")]
    DirectoryBeforeHeader {
        offset: u32,
        header_size: u32,
    },

    #[error("record {tag}{number} claims file bytes {start}..{end} outside the data block at {block_start}..{block_end}")]
    OutOfBounds {
        tag: TagName,
        number: u32,
        start: u64,
        end: u64,
        block_start: u64,
        block_end: u64,
    },

    #[error("record {tag}{number} has {count} elements of {size} bytes but a length of {length}")]
    LengthMismatch {
        tag: TagName,
        number: u32,
        count: u32,
        size: u16,
        length: u32,
    },

    #[error("record {tag}{number} holds an invalid value: {reason}")]
    InvalidValue {
        tag: TagName,
        number: u32,
        reason: String,
    },

    #[error("required tag {tag} is missing")]
    MissingTag {
        tag: TagName,
    },

    #[error("filter wheel order {0:?} is not a permutation of ACGT")]
    InvalidChannelOrder(String),
}

impl Cause {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Cause::Io(_)
            | Cause::Truncated { .. }
            | Cause::BadMagic { .. }
            | Cause::HeaderEncoding(_)
            | Cause::DirectoryBeforeHeader { .. }
            | Cause::LengthMismatch { .. }
            | Cause::InvalidValue { .. } => ErrorKind::Format,
            Cause::OutOfBounds { .. } => ErrorKind::Bounds,
            Cause::MissingTag { .. } | Cause::InvalidChannelOrder(_) => ErrorKind::Schema,
        }
    }

    /// Maps an I/O error to [Cause::Truncated] when it signals end of input.
    pub(crate) fn from_read(err: std::io::Error, context: &'static str) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            Cause::Truncated { context }
        } else {
            Cause::Io(err)
        }
    }
}

/// An AB1 file could not be decoded.
#[derive(Debug, Error)]
#[error("could not decode AB1 trace: {cause}")]
pub struct DecodeError {
    #[source]
    cause: Cause,
}

impl DecodeError {
    pub fn cause(&self) -> &Cause {
        &self.cause
    }

    pub fn kind(&self) -> ErrorKind {
        self.cause.kind()
    }
}

impl From<Cause> for DecodeError {
    fn from(cause: Cause) -> Self {
        DecodeError { cause }
    }
}

impl From<std::io::Error> for DecodeError {
    fn from(err: std::io::Error) -> Self {
        DecodeError { cause: Cause::Io(err) }
    }
}

impl From<bincode::error::DecodeError> for DecodeError {
    fn from(err: bincode::error::DecodeError) -> Self {
        DecodeError { cause: Cause::HeaderEncoding(err) }
    }
}
