//! A worker turns one row range into its run of descriptors.

use crate::grid::GridView;
use crate::kernel;
use crate::partition::RowRange;

/// Descriptors for one worker's rows, in row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkerResult {
    pub worker_index: usize,
    pub patterns: Vec<u8>,
}

/// Compute every interior pixel of the global rows `rows`.
///
/// `view` may be the full grid or a halo slice; global rows are translated
/// through `view.origin()` before indexing, and neighbours are read from the
/// same local frame as the centre.
pub fn run<G: GridView + ?Sized>(view: &G, rows: RowRange, worker_index: usize) -> WorkerResult {
    let w = view.width();
    let mut patterns = Vec::with_capacity(rows.len() * w.saturating_sub(2));
    let origin = view.origin();
    for global in rows.start as usize..rows.end as usize {
        let local = global - origin;
        kernel::row_patterns(view.row(local - 1), view.row(local), view.row(local + 1), &mut patterns);
    }
    WorkerResult { worker_index, patterns }
}
