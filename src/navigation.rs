//! Marker search along a single axis.
//!
//! A [`PresenceProfile`] records, for every slice along one orientation,
//! whether that slice holds at least one marker. All navigation queries are
//! answered from it with one search routine; they differ only in the window
//! searched, the scan order and the value returned when nothing is found.
//! Indices are 1-based throughout.

use std::ops::RangeInclusive;

use ndarray::Array3;
use ndarray::Axis;
use rayon::prelude::*;

use crate::enums::Orientation;

/// Order in which [`PresenceProfile::find`] visits a window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scan {
    /// Lowest index first.
    Ascending,
    /// Highest index first.
    Descending,
    /// Closest to the given index first; on equal distance the index after
    /// it beats the one before it.
    Closest(usize),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PresenceProfile {
    present: Vec<bool>,
}

impl PresenceProfile {
    /// OR-reduce the two axes not selected by `orientation`.
    pub fn from_labels(data: &Array3<u8>, orientation: Orientation) -> Self {
        let present = data
            .axis_iter(Axis(orientation.array_axis()))
            .into_par_iter()
            .map(|slice| slice.iter().any(|&v| v != 0))
            .collect();
        Self { present }
    }

    pub fn from_flags(present: Vec<bool>) -> Self {
        Self { present }
    }

    /// Number of slices along the axis.
    pub fn extent(&self) -> usize {
        self.present.len()
    }

    pub fn has_marker(&self, index: usize) -> bool {
        index >= 1 && self.present.get(index - 1).copied().unwrap_or(false)
    }

    /// First marked index in `range` in the order given by `scan`. Bounds
    /// outside `1..=extent` are ignored.
    pub fn find(&self, range: RangeInclusive<usize>, scan: Scan) -> Option<usize> {
        let lo = (*range.start()).max(1);
        let hi = (*range.end()).min(self.extent());
        if lo > hi {
            return None;
        }
        let mut marked = (lo..=hi).filter(|&i| self.present[i - 1]);
        match scan {
            Scan::Ascending => marked.next(),
            Scan::Descending => marked.next_back(),
            Scan::Closest(current) => {
                marked.min_by_key(|&i| (i.abs_diff(current), i <= current))
            }
        }
    }

    /// Nearest marker before `current`, looking back at most `max_skip`
    /// slices. Falls back to the far end of the window.
    pub fn previous(&self, current: usize, max_skip: usize) -> usize {
        let limit = current.saturating_sub(max_skip).max(1);
        self.find(limit..=current.saturating_sub(1), Scan::Descending)
            .unwrap_or(limit)
    }

    /// Nearest marker after `current`, looking ahead at most `max_skip`
    /// slices. Falls back to the far end of the window.
    pub fn next(&self, current: usize, max_skip: usize) -> usize {
        let limit = current.saturating_add(max_skip).min(self.extent());
        self.find(current.saturating_add(1)..=limit, Scan::Ascending)
            .unwrap_or(limit)
    }

    /// Marker closest to `current` anywhere on the axis, or 1 if there is none.
    pub fn nearest(&self, current: usize) -> usize {
        self.find(1..=self.extent(), Scan::Closest(current))
            .unwrap_or(1)
    }

    pub fn first(&self) -> usize {
        self.find(1..=self.extent(), Scan::Ascending).unwrap_or(1)
    }

    /// Last marked index, or the extent if there is none.
    pub fn last(&self) -> usize {
        self.find(1..=self.extent(), Scan::Descending)
            .unwrap_or(self.extent())
    }
}
