//! Static row partitioning of the interior rows `[1, height-1)`.
//!
//! Every worker gets `floor((height-2) / workers)` rows in index order and the
//! last worker absorbs the remainder. With more workers than interior rows the
//! leading workers get empty ranges; they still take part in the merge.

use crate::error::{LbpError, Result};
use std::fmt;
use std::str::FromStr;

/// Half-open range of global row indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RowRange {
    pub start: u32,
    pub end: u32,
}

impl RowRange {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn contains(&self, row: u32) -> bool {
        self.start <= row && row < self.end
    }
}

impl fmt::Display for RowRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// How the interior rows are spread across workers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Strategy {
    /// One worker on the caller thread.
    #[default]
    NoSplit,
    /// Workers borrow the one shared grid.
    SharedGridSplit,
    /// Workers own a private copy of their rows plus halo rows.
    HaloSliceSplit,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::NoSplit, Strategy::SharedGridSplit, Strategy::HaloSliceSplit];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::NoSplit => "lbp",
            Strategy::SharedGridSplit => "multi-lbp",
            Strategy::HaloSliceSplit => "multi-split-lbp",
        }
    }

    pub fn overlap(self) -> bool {
        matches!(self, Strategy::HaloSliceSplit)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = LbpError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lbp" | "none" | "no-split" => Ok(Strategy::NoSplit),
            "multi-lbp" | "multi-lbp-mpi" | "shared" | "shared-grid" => Ok(Strategy::SharedGridSplit),
            "multi-split-lbp" | "split" | "halo" | "halo-slice" => Ok(Strategy::HaloSliceSplit),
            other => Err(LbpError::Configuration(format!(
                "invalid algorithm '{other}', expected one of: lbp, multi-lbp, multi-lbp-mpi, multi-split-lbp"
            ))),
        }
    }
}

/// One worker's share of the image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub worker_index: usize,
    /// Global rows whose descriptors this worker emits.
    pub rows: RowRange,
    /// Global rows copied into the worker's private slice, when overlapping.
    pub halo: Option<RowRange>,
}

/// Rows `[start-1, end+1)` clamped to `[0, height)`.
pub fn halo_bounds(rows: RowRange, height: u32) -> RowRange {
    let start = rows.start.saturating_sub(1);
    let end = rows.end.saturating_add(1).min(height).max(start);
    RowRange { start, end }
}

/// Split the interior rows of a `height`-row grid across `workers`.
pub fn plan(height: u32, workers: usize, overlap: bool) -> Result<Vec<Assignment>> {
    if workers == 0 {
        return Err(LbpError::InvalidPartition(workers));
    }
    if height < 3 {
        return Err(LbpError::TooFewRows { height });
    }
    let total = (height - 2) as usize;
    let segment = total / workers;
    let last = workers - 1;

    let assignments = (0..workers)
        .map(|k| {
            // k * segment <= total, so these fit in u32.
            let start = 1 + (k * segment) as u32;
            let end = if k == last { height - 1 } else { start + segment as u32 };
            let rows = RowRange { start, end };
            let halo = overlap.then(|| halo_bounds(rows, height));
            Assignment { worker_index: k, rows, halo }
        })
        .collect();
    Ok(assignments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_split() {
        let a = plan(10, 4, false).unwrap();
        let rows: Vec<_> = a.iter().map(|a| (a.rows.start, a.rows.end)).collect();
        assert_eq!(rows, vec![(1, 3), (3, 5), (5, 7), (7, 9)]);
        assert!(a.iter().all(|a| a.halo.is_none()));
    }

    #[test]
    fn last_worker_absorbs_remainder() {
        let a = plan(12, 3, false).unwrap();
        let rows: Vec<_> = a.iter().map(|a| (a.rows.start, a.rows.end)).collect();
        assert_eq!(rows, vec![(1, 4), (4, 7), (7, 11)]);
    }

    #[test]
    fn surplus_workers_get_empty_ranges() {
        let a = plan(5, 6, false).unwrap();
        assert_eq!(a.len(), 6);
        assert!(a[..5].iter().all(|a| a.rows.is_empty()));
        assert_eq!(a[5].rows, RowRange { start: 1, end: 4 });
    }

    #[test]
    fn halo_rows_for_six_by_six_two_workers() {
        let a = plan(6, 2, true).unwrap();
        assert_eq!(a[0].rows, RowRange { start: 1, end: 3 });
        assert_eq!(a[0].halo, Some(RowRange { start: 0, end: 4 }));
        assert_eq!(a[1].rows, RowRange { start: 3, end: 5 });
        assert_eq!(a[1].halo, Some(RowRange { start: 2, end: 6 }));
    }

    #[test]
    fn zero_workers_rejected() {
        assert!(matches!(plan(10, 0, false), Err(LbpError::InvalidPartition(0))));
    }

    #[test]
    fn short_height_reports_only_height() {
        let err = plan(2, 1, true).unwrap_err();
        assert!(matches!(err, LbpError::TooFewRows { height: 2 }));
        assert!(err.is_rejection());
        assert_eq!(err.to_string(), "image must have at least 3 rows to partition, got 2");
    }

    #[test]
    fn strategy_names_round_trip() {
        for s in Strategy::ALL {
            assert_eq!(s.name().parse::<Strategy>().unwrap(), s);
        }
        assert_eq!("multi-lbp-mpi".parse::<Strategy>().unwrap(), Strategy::SharedGridSplit);
        assert!(matches!("fast-lbp".parse::<Strategy>(), Err(LbpError::Configuration(_))));
    }
}
