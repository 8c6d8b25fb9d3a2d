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

//! Directory entries grouped by decode category and tag name.
//!
//! [GroupedRecords] is filled once while the tag directory is read and is
//! read-only afterwards. Within a group, entries keep their directory order.
//!
//! Lookups go through [GroupedRecords::select], which checks the requested
//! [Selector] against the tag's [Access] pattern from the
//! [catalog](crate::catalog::ACCESS_TABLE).

use indexmap::IndexMap;

use crate::catalog::{access, Access, DecodeCategory, TagName};
use crate::headers::directory::RecordDescriptor;

/// Directory entries sharing a tag name and decode category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaggedRecords {
    records: Vec<RecordDescriptor>,
}

impl TaggedRecords {
    pub fn add(&mut self, desc: RecordDescriptor) {
        self.records.push(desc);
    }

    /// First entry with tag number 1.
    pub fn current_version(&self) -> Option<&RecordDescriptor> {
        self.numbered(1)
    }

    /// First entry with tag number 2.
    pub fn original_version(&self) -> Option<&RecordDescriptor> {
        self.numbered(2)
    }

    pub fn numbered(&self, number: u32) -> Option<&RecordDescriptor> {
        self.records.iter().find(|desc| desc.number == number)
    }

    /// The `i`th entry in directory order, whatever its tag number.
    pub fn get(&self, i: usize) -> Option<&RecordDescriptor> {
        self.records.get(i)
    }

    /// The original version if there is one, otherwise the first entry.
    pub fn preferred(&self) -> Option<&RecordDescriptor> {
        self.original_version().or_else(|| self.records.first())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecordDescriptor> {
        self.records.iter()
    }
}

/// Which entry of a group to look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    Current,
    Original,
    Preferred,
    Slot(usize),
    Number(u32),
}

impl Selector {
    fn fits(&self, access: Access) -> bool {
        match self {
            Selector::Current | Selector::Original | Selector::Preferred => access == Access::Versioned,
            Selector::Slot(_) => access == Access::Positional,
            Selector::Number(_) => access == Access::Numbered,
        }
    }
}

/// Index of all directory entries of one file.
#[derive(Debug, Clone, Default)]
pub struct GroupedRecords {
    groups: IndexMap<(DecodeCategory, TagName), TaggedRecords>,
    n_records: usize,
}

impl GroupedRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, desc: RecordDescriptor) {
        self.n_records += 1;
        self.groups.entry((desc.category(), desc.tag)).or_default().add(desc);
    }

    pub fn records(&self, category: DecodeCategory, tag: TagName) -> Option<&TaggedRecords> {
        self.groups.get(&(category, tag))
    }

    /// Looks up one entry of `tag` within `category`.
    ///
    /// Returns None if there is no such entry, or if `selector` does not fit
    /// the tag's access pattern.
    pub fn select(
        &self,
        category: DecodeCategory,
        tag: TagName,
        selector: Selector,
    ) -> Option<&RecordDescriptor> {
        if !selector.fits(access(tag)) {
            log::warn!("{:?} lookup does not apply to tag {}", selector, tag);
            return None
        }
        let records = self.records(category, tag)?;
        match selector {
            Selector::Current => records.current_version(),
            Selector::Original => records.original_version(),
            Selector::Preferred => records.preferred(),
            Selector::Slot(i) => records.get(i),
            Selector::Number(n) => records.numbered(n),
        }
    }

    /// Like [select](Self::select), trying each of `categories` in turn.
    ///
    /// [Selector::Preferred] looks for the original version in every
    /// category before falling back to the first entry.
    pub fn select_in(
        &self,
        categories: &[DecodeCategory],
        tag: TagName,
        selector: Selector,
    ) -> Option<&RecordDescriptor> {
        let find = |selector: Selector| {
            categories.iter().find_map(|category| self.select(*category, tag, selector))
        };
        match selector {
            Selector::Preferred => find(Selector::Original).or_else(|| find(Selector::Preferred)),
            _ => find(selector),
        }
    }

    /// Pascal strings first, then fixed-length text.
    pub fn select_text(&self, tag: TagName, selector: Selector) -> Option<&RecordDescriptor> {
        self.select_in(&[DecodeCategory::PascalString, DecodeCategory::AsciiString], tag, selector)
    }

    /// Short arrays first, then int arrays.
    pub fn select_integer(&self, tag: TagName, selector: Selector) -> Option<&RecordDescriptor> {
        self.select_in(&[DecodeCategory::ShortArray, DecodeCategory::IntArray], tag, selector)
    }

    /// Total number of entries added.
    pub fn len(&self) -> usize {
        self.n_records
    }

    pub fn is_empty(&self) -> bool {
        self.n_records == 0
    }

    /// Groups in the order their first entry appeared in the directory.
    pub fn iter(&self) -> impl Iterator<Item = (&(DecodeCategory, TagName), &TaggedRecords)> {
        self.groups.iter()
    }
}
